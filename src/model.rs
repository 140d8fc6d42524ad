use serde::{Deserialize, Serialize};

/// Run-level emphasis. Bold and underline carry meaning here (question
/// markers, answer keys), not just appearance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Emphasis {
    pub bold: bool,
    pub underline: bool,
}

impl Emphasis {
    pub fn is_plain(self) -> bool {
        !self.bold && !self.underline
    }
}

/// One unit of walker output, in document order.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Text {
        text: String,
        emphasis: Emphasis,
    },
    /// `display` is set for OMML formulas; vertAlign runs produce bare scripts.
    Math {
        latex: String,
        display: bool,
        emphasis: Emphasis,
    },
    /// Index into the document-wide image pool.
    Image(usize),
    LineBreak,
}

/// An embedded image, in the order it was met during the walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolImage {
    pub index: usize,
    pub mime: &'static str,
    pub base64: String,
}

impl PoolImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "TRUE_FALSE")]
    TrueFalse,
    #[serde(rename = "SHORT_ANSWER")]
    ShortAnswer,
}

/// Non-fatal issues a reviewer should look at before the question is saved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// Multiple choice question with no underlined option.
    UnresolvedAnswer,
    /// Only one lettered marker was found, so the block was kept as short answer.
    AmbiguousOptions { markers: usize },
    /// An option has no text once markers are stripped.
    EmptyOption { index: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    /// Number written in the document ("Câu 9:" → 9); ids do not use it.
    pub source_number: Option<u32>,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub options: Vec<String>,
    /// "A".."D" for MCQ, "Đ,S,..." for TRUE_FALSE, empty otherwise.
    pub correct_answer: String,
    pub correct_option_index: Option<usize>,
    pub explanation: String,
    /// Data URIs; `[IMG_n]` placeholders in the text index into this list.
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Treat superscript/subscript runs as `^{..}` / `_{..}` math.
    pub vert_align_as_math: bool,
    /// Render bold spans as `<b>..</b>` in output text.
    pub keep_bold: bool,
    pub id_prefix: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            vert_align_as_math: true,
            keep_bold: true,
            id_prefix: "q-".to_string(),
        }
    }
}
