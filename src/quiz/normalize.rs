use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(amp|lt|gt|quot|apos|#39);").expect("valid entity regex"));
static EMPTY_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<b>(\s*)</b>").expect("valid empty bold regex"));
static INLINE_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(.*?)\$").expect("valid inline math regex"));
static DISPLAYSTYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\displaystyle\s*").expect("valid displaystyle regex"));

fn unescape_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            _ => "'",
        })
        .into_owned()
}

fn rewrap_math(caps: &Captures) -> String {
    let formula = caps[1].trim();
    if formula.is_empty() {
        return caps[0].to_string();
    }
    let formula = DISPLAYSTYLE.replace_all(formula, "");
    if formula.contains('&') && !formula.contains("\\begin{") {
        format!("$ \\displaystyle \\begin{{aligned}} {formula} \\end{{aligned}} $")
    } else {
        format!("$ \\displaystyle {formula} $")
    }
}

/// Final clean-up of one output string: entities, emphasis left empty by
/// marker removal, boundary whitespace and the stray `.`/`．` a marker leaves
/// behind, then every `$..$` segment in display style (multi-step `&`
/// derivations wrapped in `aligned`).
pub(crate) fn normalize(text: &str) -> String {
    let text = unescape_entities(text);
    let text = trim_leading(&text);
    let text = EMPTY_BOLD.replace_all(&text, "$1");
    let text = text.trim_start_matches(is_stray).trim_end();
    INLINE_MATH.replace_all(text, rewrap_math).into_owned()
}

fn is_stray(c: char) -> bool {
    c.is_whitespace() || c == '.' || c == '．'
}

/// A bold marker that runs on into the stem leaves `<b> Cho ...`; trim inside
/// the opening tag as well.
fn trim_leading(text: &str) -> String {
    let text = text.trim_start_matches(is_stray);
    match text.strip_prefix("<b>") {
        Some(rest) => format!("<b>{}", rest.trim_start_matches(is_stray)),
        None => text.to_string(),
    }
}
