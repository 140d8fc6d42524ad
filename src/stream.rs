use std::fmt::Write;
use std::ops::Range;

use crate::docx::Paragraph;
use crate::model::{Emphasis, Token};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Mark {
    Emphasis(Emphasis),
    /// Covers the `[IMG_n]` placeholder text of pool image `n`.
    Image(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Span {
    pub(crate) range: Range<usize>,
    pub(crate) mark: Mark,
}

/// Walker tokens flattened into one text. Emphasis and image positions are
/// byte-range spans next to the text, so marker regexes run over plain
/// `text`. Spans are sorted by start and never overlap.
#[derive(Debug, Default)]
pub(crate) struct Stream {
    pub(crate) text: String,
    pub(crate) spans: Vec<Span>,
}

pub(crate) fn assemble(paragraphs: &[Paragraph]) -> Stream {
    let mut stream = Stream::default();
    for para in paragraphs {
        let mut pieces: Vec<(String, Option<Mark>)> = Vec::new();
        for token in &para.tokens {
            render_token(token, &mut pieces);
        }

        if pieces.iter().all(|(text, _)| text.is_empty()) {
            if para.has_elements {
                stream.text.push('\n');
            }
            continue;
        }

        trim_pieces(&mut pieces);
        if pieces.is_empty() {
            continue;
        }
        for (text, mark) in pieces {
            stream.push(&text, mark);
        }
        stream.text.push('\n');
    }
    log::debug!(
        "Assembled {} bytes of text with {} spans",
        stream.text.len(),
        stream.spans.len()
    );
    stream
}

fn render_token(token: &Token, pieces: &mut Vec<(String, Option<Mark>)>) {
    let emphasis_mark = |e: &Emphasis| (!e.is_plain()).then_some(Mark::Emphasis(*e));
    match token {
        Token::Text { text, emphasis } => pieces.push((text.clone(), emphasis_mark(emphasis))),
        Token::Math {
            latex,
            display: true,
            emphasis,
        } => {
            pieces.push((" ".into(), None));
            pieces.push((
                format!("$ \\displaystyle {} $", latex.trim()),
                emphasis_mark(emphasis),
            ));
            pieces.push((" ".into(), None));
        }
        Token::Math {
            latex,
            display: false,
            emphasis,
        } => pieces.push((format!("$ {latex} $"), emphasis_mark(emphasis))),
        Token::Image(index) => {
            pieces.push((" ".into(), None));
            pieces.push((format!("[IMG_{index}]"), Some(Mark::Image(*index))));
            pieces.push((" ".into(), None));
        }
        Token::LineBreak => pieces.push(("\n".into(), None)),
    }
}

/// Trim whitespace off the paragraph as a whole, dropping pieces that empty out.
fn trim_pieces(pieces: &mut Vec<(String, Option<Mark>)>) {
    while let Some((text, _)) = pieces.first_mut() {
        let trimmed = text.trim_start();
        if trimmed.is_empty() {
            pieces.remove(0);
        } else {
            *text = trimmed.to_string();
            break;
        }
    }
    while let Some((text, _)) = pieces.last_mut() {
        let trimmed = text.trim_end();
        if trimmed.is_empty() {
            pieces.pop();
        } else {
            text.truncate(trimmed.len());
            break;
        }
    }
}

impl Stream {
    fn push(&mut self, text: &str, mark: Option<Mark>) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(text);
        let end = self.text.len();
        let Some(mark) = mark else {
            return;
        };
        // Merge consecutive runs that carry the same emphasis
        if let (Mark::Emphasis(_), Some(last)) = (mark, self.spans.last_mut())
            && last.mark == mark
            && last.range.end == start
        {
            last.range.end = end;
            return;
        }
        self.spans.push(Span {
            range: start..end,
            mark,
        });
    }

    fn overlapping(&self, range: &Range<usize>) -> impl Iterator<Item = &Span> {
        let (start, end) = (range.start, range.end);
        self.spans
            .iter()
            .skip_while(move |s| s.range.end <= start)
            .take_while(move |s| s.range.start < end)
    }

    /// Whether any underlined text inside `range` is more than whitespace.
    pub(crate) fn is_underlined(&self, range: &Range<usize>) -> bool {
        self.overlapping(range).any(|span| {
            let Mark::Emphasis(e) = span.mark else {
                return false;
            };
            let start = span.range.start.max(range.start);
            let end = span.range.end.min(range.end);
            e.underline && !self.text[start..end].trim().is_empty()
        })
    }

    pub(crate) fn is_emphasized(&self, range: &Range<usize>) -> bool {
        self.overlapping(range)
            .any(|span| matches!(span.mark, Mark::Emphasis(e) if !e.is_plain()))
    }

    /// Whether a bold/underline span begins at `range.start`, give or take
    /// whitespace inside the span.
    pub(crate) fn opens_emphasis(&self, range: &Range<usize>) -> bool {
        self.overlapping(range).any(|span| {
            matches!(span.mark, Mark::Emphasis(e) if !e.is_plain())
                && span.range.start <= range.start
                && self.text[span.range.start..range.start].trim().is_empty()
        })
    }

    /// Text of `range` with image spans renumbered through `local_image`,
    /// and bold spans wrapped in `<b>..</b>` when `keep_bold` is set.
    pub(crate) fn render(
        &self,
        range: &Range<usize>,
        keep_bold: bool,
        mut local_image: impl FnMut(usize) -> usize,
    ) -> String {
        let mut out = String::with_capacity(range.len());
        let mut cursor = range.start;
        for span in self.overlapping(range) {
            let start = span.range.start.max(range.start);
            let end = span.range.end.min(range.end);
            match span.mark {
                Mark::Image(pool_index) => {
                    if start != span.range.start || end != span.range.end {
                        continue;
                    }
                    out.push_str(&self.text[cursor..start]);
                    let _ = write!(out, "[IMG_{}]", local_image(pool_index));
                    cursor = end;
                }
                Mark::Emphasis(e) if e.bold && keep_bold => {
                    out.push_str(&self.text[cursor..start]);
                    out.push_str("<b>");
                    out.push_str(&self.text[start..end]);
                    out.push_str("</b>");
                    cursor = end;
                }
                Mark::Emphasis(_) => {}
            }
        }
        out.push_str(&self.text[cursor..range.end]);
        out
    }
}
