mod markers;
mod normalize;
mod options;

use std::collections::HashMap;
use std::ops::Range;

use crate::error::Error;
use crate::model::{ParseOptions, PoolImage, Question, QuestionType, Warning};
use crate::stream::Stream;

use markers::{Marker, MarkerKind};
use normalize::normalize;

/// One question's slice of the stream, before classification.
#[derive(Debug, PartialEq)]
struct Block {
    ordinal: usize,
    source_number: Option<u32>,
    /// Stem plus options, up to the solution marker.
    body: Range<usize>,
    solution: Option<Range<usize>>,
}

fn segment(markers: &[Marker], text_len: usize) -> Vec<Block> {
    let starts: Vec<usize> = markers
        .iter()
        .enumerate()
        .filter(|(_, m)| matches!(m.kind, MarkerKind::QuestionBoundary { .. }))
        .map(|(i, _)| i)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(ordinal, &at)| {
            let question = &markers[at];
            let block_end = starts
                .get(ordinal + 1)
                .map_or(text_len, |&next| markers[next].range.start);
            let source_number = match question.kind {
                MarkerKind::QuestionBoundary { number } => number,
                MarkerKind::SolutionBoundary => None,
            };
            let solution_marker = markers
                .get(at + 1)
                .filter(|m| m.kind == MarkerKind::SolutionBoundary);
            let (body, solution) = match solution_marker {
                Some(m) => (
                    question.range.end..m.range.start,
                    Some(m.range.end..block_end),
                ),
                None => (question.range.end..block_end, None),
            };
            Block {
                ordinal: ordinal + 1,
                source_number,
                body,
                solution,
            }
        })
        .collect()
}

/// Question-local image numbering, in order of first appearance.
struct LocalImages<'p> {
    pool: &'p [PoolImage],
    local: HashMap<usize, usize>,
    images: Vec<String>,
}

impl<'p> LocalImages<'p> {
    fn new(pool: &'p [PoolImage]) -> Self {
        LocalImages {
            pool,
            local: HashMap::new(),
            images: Vec::new(),
        }
    }

    fn index_of(&mut self, pool_index: usize) -> usize {
        if let Some(&local) = self.local.get(&pool_index) {
            return local;
        }
        let local = self.images.len();
        self.images.push(
            self.pool
                .get(pool_index)
                .map(PoolImage::data_uri)
                .unwrap_or_default(),
        );
        self.local.insert(pool_index, local);
        local
    }
}

fn build_question(
    stream: &Stream,
    pool: &[PoolImage],
    block: &Block,
    options: &ParseOptions,
) -> Question {
    let layout = options::classify(stream, &block.body);
    let key = options::answer_key(stream, &layout);

    let mut images = LocalImages::new(pool);
    let mut render = |range: &Range<usize>| {
        normalize(&stream.render(range, options.keep_bold, |i| images.index_of(i)))
    };
    let content = render(&layout.stem);
    let option_texts: Vec<String> = layout.options.iter().map(|slot| render(&slot.body)).collect();
    let explanation = block.solution.as_ref().map(&mut render).unwrap_or_default();

    let id = format!("{}{}", options.id_prefix, block.ordinal);
    let mut warnings = Vec::new();
    if layout.lone_markers == 1 {
        warnings.push(Warning::AmbiguousOptions {
            markers: layout.lone_markers,
        });
    }
    for (index, text) in option_texts.iter().enumerate() {
        if text.is_empty() {
            warnings.push(Warning::EmptyOption { index });
        }
    }
    if layout.kind == QuestionType::Mcq && key.index.is_none() {
        log::warn!("Question {id} has no underlined option; answer key left empty");
        warnings.push(Warning::UnresolvedAnswer);
    }

    Question {
        id,
        source_number: block.source_number,
        content,
        kind: layout.kind,
        options: option_texts,
        correct_answer: key.encoded,
        correct_option_index: key.index,
        explanation,
        images: images.images,
        warnings,
    }
}

/// Segment the stream into questions and finish each one.
pub(crate) fn compile(
    stream: &Stream,
    pool: &[PoolImage],
    options: &ParseOptions,
) -> Result<Vec<Question>, Error> {
    let markers = markers::scan(&stream.text);
    let blocks = segment(&markers, stream.text.len());
    if blocks.is_empty() {
        return Err(Error::NoQuestions);
    }
    let questions: Vec<Question> = blocks
        .iter()
        .map(|block| build_question(stream, pool, block, options))
        .collect();
    log::debug!(
        "Compiled {} questions ({} with warnings)",
        questions.len(),
        questions.iter().filter(|q| !q.warnings.is_empty()).count()
    );
    Ok(questions)
}
