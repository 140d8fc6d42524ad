mod docx;
mod error;
pub mod latex;
mod model;
mod quiz;
mod stream;

pub use error::Error;
pub use model::{ParseOptions, Question, QuestionType, Warning};

use std::path::Path;
use std::time::Instant;

/// Compile a DOCX exam paper into its questions, using default options.
pub fn parse(input: &[u8]) -> Result<Vec<Question>, Error> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &[u8], options: &ParseOptions) -> Result<Vec<Question>, Error> {
    let t0 = Instant::now();

    let walked = docx::read(input, options)?;
    let t_read = t0.elapsed();

    let stream = stream::assemble(&walked.paragraphs);
    let questions = quiz::compile(&stream, &walked.images, options)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: read={:.1}ms, compile={:.1}ms, total={:.1}ms ({} questions, {} images)",
        t_read.as_secs_f64() * 1000.0,
        (t_total - t_read).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        questions.len(),
        walked.images.len(),
    );

    Ok(questions)
}

pub fn parse_file(input: &Path, options: &ParseOptions) -> Result<Vec<Question>, Error> {
    let bytes = std::fs::read(input).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, input.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_with_options(&bytes, options)
}
