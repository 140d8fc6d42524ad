use crate::docx::math::{self, MathNode};
use crate::error::Error;

pub use crate::docx::math::fix_greek_spacing;

/// Convert an OMML fragment, e.g. an `m:oMath` or `m:f` element with its
/// `xmlns:m` declaration, to LaTeX. Only malformed XML is an error.
pub fn omml_to_latex(xml: &str) -> Result<String, Error> {
    let doc = roxmltree::Document::parse(xml)?;
    Ok(math::to_latex(&MathNode::from_xml(doc.root_element())))
}
