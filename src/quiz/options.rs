use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::QuestionType;
use crate::stream::Stream;

static TRUE_FALSE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-d])\)").expect("valid true/false marker regex"));
static CHOICE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-D])[ \t\x{A0}]*[.)]").expect("valid choice marker regex")
});

/// One lettered option: the `A.` / `a)` marker and the text up to the next one.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OptionSlot {
    pub(crate) marker: Range<usize>,
    pub(crate) body: Range<usize>,
}

#[derive(Debug)]
pub(crate) struct Layout {
    pub(crate) kind: QuestionType,
    pub(crate) stem: Range<usize>,
    pub(crate) options: Vec<OptionSlot>,
    /// Markers found when too few were present to form options.
    pub(crate) lone_markers: usize,
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct AnswerKey {
    pub(crate) encoded: String,
    pub(crate) index: Option<usize>,
}

fn starts_clear(text: &str, at: usize) -> bool {
    text[..at].chars().next_back().is_none_or(char::is_whitespace)
}

fn ends_clear(text: &str, at: usize) -> bool {
    text[at..].chars().next().is_none_or(char::is_whitespace)
}

/// `a)` .. `d)` at the start of the region or after whitespace.
fn true_false_markers(stream: &Stream, region: &Range<usize>) -> Vec<Range<usize>> {
    let text = &stream.text[region.clone()];
    TRUE_FALSE_MARKER
        .find_iter(text)
        .filter(|m| starts_clear(text, m.start()))
        .map(|m| region.start + m.start()..region.start + m.end())
        .collect()
}

/// `A.` .. `D)` standing alone between whitespace, or opening a bold/underline
/// span (then glued text is fine: `<b>A.</b>5`). A letter in the middle of
/// emphasized text, like the `D.` of a bold `ABCD.`, is not a marker.
fn choice_markers(stream: &Stream, region: &Range<usize>) -> Vec<Range<usize>> {
    let text = &stream.text[region.clone()];
    CHOICE_MARKER
        .find_iter(text)
        .filter(|m| {
            let absolute = region.start + m.start()..region.start + m.end();
            let clear_before = starts_clear(text, m.start());
            (clear_before && ends_clear(text, m.end()))
                || (clear_before && stream.is_emphasized(&absolute))
                || stream.opens_emphasis(&absolute)
        })
        .map(|m| region.start + m.start()..region.start + m.end())
        .collect()
}

fn slice(kind: QuestionType, markers: Vec<Range<usize>>, region: &Range<usize>) -> Layout {
    let stem = region.start..markers[0].start;
    let options = markers
        .iter()
        .enumerate()
        .map(|(i, marker)| OptionSlot {
            marker: marker.clone(),
            body: marker.end..markers.get(i + 1).map_or(region.end, |next| next.start),
        })
        .collect();
    Layout {
        kind,
        stem,
        options,
        lone_markers: 0,
    }
}

/// Decide the question type of a stem-plus-options region and cut it into
/// stem and option ranges. True/false markers win over lettered choices.
pub(crate) fn classify(stream: &Stream, region: &Range<usize>) -> Layout {
    let true_false = true_false_markers(stream, region);
    if true_false.len() >= 2 {
        return slice(QuestionType::TrueFalse, true_false, region);
    }
    let choices = choice_markers(stream, region);
    if choices.len() >= 2 {
        return slice(QuestionType::Mcq, choices, region);
    }
    Layout {
        kind: QuestionType::ShortAnswer,
        stem: region.clone(),
        options: Vec::new(),
        lone_markers: true_false.len().max(choices.len()),
    }
}

fn option_letter(index: usize) -> String {
    char::from(b'A' + index.min(25) as u8).to_string()
}

/// Underlined options are the correct ones. Letters are positional, so a
/// document lettering its options "A, B, B, D" still yields "C" for the third.
pub(crate) fn answer_key(stream: &Stream, layout: &Layout) -> AnswerKey {
    let marked =
        |slot: &OptionSlot| stream.is_underlined(&slot.marker) || stream.is_underlined(&slot.body);
    match layout.kind {
        QuestionType::Mcq => {
            let index = layout.options.iter().position(marked);
            AnswerKey {
                encoded: index.map(option_letter).unwrap_or_default(),
                index,
            }
        }
        QuestionType::TrueFalse => AnswerKey {
            encoded: layout
                .options
                .iter()
                .map(|slot| if marked(slot) { "Đ" } else { "S" })
                .collect::<Vec<_>>()
                .join(","),
            index: None,
        },
        QuestionType::ShortAnswer => AnswerKey::default(),
    }
}
