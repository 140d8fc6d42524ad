use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The input is not a readable ZIP package, or `word/document.xml` is missing.
    Archive(String),
    /// `word/document.xml` or its relationship manifest is not well-formed XML.
    Markup(String),
    /// The document parsed, but no "Câu N:" marker was found.
    NoQuestions,
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Archive(msg) => write!(f, "unreadable archive: {msg}"),
            Error::Markup(msg) => write!(f, "unreadable markup: {msg}"),
            Error::NoQuestions => write!(
                f,
                "no questions found (expected markers like \"Câu 1:\", \"Câu 2:\")"
            ),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Archive(e.to_string())
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Markup(e.to_string())
    }
}
