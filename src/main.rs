use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docxide_quiz::{Error, ParseOptions};

#[derive(Parser)]
#[command(name = "docxide-quiz", version, about = "Compile a DOCX exam paper into JSON questions")]
struct Cli {
    /// Input .docx file
    input: PathBuf,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,

    /// Keep superscript/subscript runs as plain text instead of ^{..}/_{..}
    #[arg(long)]
    plain_scripts: bool,

    /// Drop <b>..</b> tags from output text
    #[arg(long)]
    no_bold: bool,

    /// Prefix for question ids
    #[arg(long, default_value = "q-")]
    id_prefix: String,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn exit_code(err: &Error) -> u8 {
    match err {
        Error::Archive(_) => 2,
        Error::Markup(_) => 3,
        Error::NoQuestions => 4,
        Error::Io(_) => 1,
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let options = ParseOptions {
        vert_align_as_math: !cli.plain_scripts,
        keep_bold: !cli.no_bold,
        id_prefix: cli.id_prefix.clone(),
    };
    let questions = docxide_quiz::parse_file(&cli.input, &options)?;

    let json = if cli.compact {
        serde_json::to_string(&questions)
    } else {
        serde_json::to_string_pretty(&questions)
    }
    .map_err(std::io::Error::from)?;

    match &cli.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }

    let flagged = questions.iter().filter(|q| !q.warnings.is_empty()).count();
    eprintln!(
        "Parsed {} questions from {} ({} need review)",
        questions.len(),
        cli.input.display(),
        flagged
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}
