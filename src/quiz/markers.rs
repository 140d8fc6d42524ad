use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static QUESTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t\x{A0}]*Câu[ \t\x{A0}]+(\d+)[ \t\x{A0}]*[:.]")
        .expect("valid question marker regex")
});
static SOLUTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Lời\s*giải[ \t\x{A0}]*[:.]?").expect("valid solution marker regex")
});

/// "Câu N:" opens a question, "Lời giải" opens its explanation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum MarkerKind {
    /// `number` is whatever the document wrote, if it fits in a u32.
    QuestionBoundary { number: Option<u32> },
    SolutionBoundary,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Marker {
    pub(crate) kind: MarkerKind,
    pub(crate) range: Range<usize>,
}

/// Marker events in stream order. Each question boundary is followed by at
/// most one solution boundary, the first one before the next question.
pub(crate) fn scan(text: &str) -> Vec<Marker> {
    let questions: Vec<Marker> = QUESTION_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Marker {
                kind: MarkerKind::QuestionBoundary {
                    number: caps.get(1).and_then(|n| n.as_str().parse().ok()),
                },
                range: whole.range(),
            })
        })
        .collect();

    let mut markers = Vec::with_capacity(questions.len() * 2);
    for (i, question) in questions.iter().enumerate() {
        let block_end = questions.get(i + 1).map_or(text.len(), |q| q.range.start);
        let block_start = question.range.end;
        markers.push(question.clone());
        if let Some(m) = SOLUTION_MARKER.find(&text[block_start..block_end]) {
            markers.push(Marker {
                kind: MarkerKind::SolutionBoundary,
                range: block_start + m.start()..block_start + m.end(),
            });
        }
    }
    log::debug!(
        "Found {} question markers, {} solution markers",
        questions.len(),
        markers.len() - questions.len()
    );
    markers
}
