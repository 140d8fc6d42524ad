mod images;
pub(crate) mod math;
mod rels;

use std::io::{Cursor, Read};

use crate::error::Error;
use crate::model::{Emphasis, ParseOptions, PoolImage, Token};

use images::ImagePool;
use math::{MATH_NS, MathNode};
use rels::RelationshipMap;

pub(super) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(super) const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(super) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";

/// A named entry pulled out of the package.
pub(crate) struct RawEntry {
    pub(crate) path: String,
    pub(crate) bytes: Vec<u8>,
}

impl RawEntry {
    fn xml_text(&self) -> Result<&str, Error> {
        let text = std::str::from_utf8(&self.bytes)
            .map_err(|e| Error::Markup(format!("{}: {}", self.path, e)))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
    }
}

pub(crate) struct Package<'a> {
    zip: zip::ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    pub(crate) fn open(bytes: &'a [u8]) -> Result<Self, Error> {
        let zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::Archive(format!("file is not a ZIP archive ({e})")))?;
        Ok(Package { zip })
    }

    /// `Ok(None)` when the entry does not exist; a damaged entry is an error.
    pub(crate) fn entry(&mut self, path: &str) -> Result<Option<RawEntry>, Error> {
        let mut file = match self.zip.by_name(path) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(Error::Archive(format!("{path}: {e}"))),
        };
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)
            .map_err(|e| Error::Archive(format!("{path}: {e}")))?;
        Ok(Some(RawEntry {
            path: path.to_string(),
            bytes,
        }))
    }
}

/// Walker output for one `w:p`.
pub(crate) struct Paragraph {
    pub(crate) tokens: Vec<Token>,
    /// The paragraph had element children (even just `w:pPr`).
    pub(crate) has_elements: bool,
}

pub(crate) struct Walked {
    pub(crate) paragraphs: Vec<Paragraph>,
    pub(crate) images: Vec<PoolImage>,
}

pub(super) fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

pub(super) fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

/// Parse a WML boolean toggle element (e.g., w:b).
/// Present with no val, or a val other than "0"/"false"/"off", means true.
pub(super) fn wml_bool(parent: roxmltree::Node, name: &str) -> Option<bool> {
    wml(parent, name).map(|n| {
        n.attribute((WML_NS, "val"))
            .is_none_or(|v| v != "0" && v != "false" && v != "off")
    })
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

/// Open the package, resolve relationships and walk `word/document.xml`.
pub(crate) fn read(bytes: &[u8], options: &ParseOptions) -> Result<Walked, Error> {
    let mut package = Package::open(bytes)?;

    let document = package.entry(DOCUMENT_PART)?.ok_or_else(|| {
        Error::Archive("missing word/document.xml (is this a DOCX file?)".into())
    })?;

    let rels = match package.entry(DOCUMENT_RELS)? {
        Some(entry) => RelationshipMap::parse(entry.xml_text()?)?,
        None => {
            log::debug!("No {DOCUMENT_RELS}; images will not resolve");
            RelationshipMap::default()
        }
    };

    let xml = roxmltree::Document::parse(document.xml_text()?)?;
    let root = xml.root_element();
    let body = wml(root, "body").ok_or_else(|| Error::Markup("missing w:body".into()))?;

    let mut walker = Walker {
        package: &mut package,
        rels: &rels,
        pool: ImagePool::default(),
        vert_align_as_math: options.vert_align_as_math,
    };

    let mut paragraphs = Vec::new();
    for node in body.descendants().filter(|n| is_wml(*n, "p")) {
        let mut tokens = Vec::new();
        walker.paragraph_children(node, &mut tokens)?;
        paragraphs.push(Paragraph {
            tokens,
            has_elements: node.children().any(|n| n.is_element()),
        });
    }

    let images = walker.pool.into_images();
    log::debug!(
        "Walked {} paragraphs, {} relationships, {} images",
        paragraphs.len(),
        rels.len(),
        images.len()
    );
    Ok(Walked { paragraphs, images })
}

struct Walker<'w, 'a> {
    package: &'w mut Package<'a>,
    rels: &'w RelationshipMap,
    pool: ImagePool,
    vert_align_as_math: bool,
}

impl Walker<'_, '_> {
    fn paragraph_children(
        &mut self,
        parent: roxmltree::Node,
        out: &mut Vec<Token>,
    ) -> Result<(), Error> {
        for child in parent.children().filter(|n| n.is_element()) {
            let ns = child.tag_name().namespace();
            let name = child.tag_name().name();
            if ns == Some(MATH_NS) {
                if name == "oMath" || name == "oMathPara" {
                    let latex = math::to_latex(&MathNode::from_xml(child));
                    let latex = latex.trim();
                    if !latex.is_empty() {
                        out.push(Token::Math {
                            latex: latex.to_string(),
                            display: true,
                            emphasis: Emphasis::default(),
                        });
                    }
                }
                continue;
            }
            if ns != Some(WML_NS) {
                continue;
            }
            match name {
                "r" => self.run(child, out)?,
                "hyperlink" => {
                    let text: String = child
                        .descendants()
                        .filter(|n| is_wml(*n, "t"))
                        .filter_map(|n| n.text())
                        .collect();
                    if !text.is_empty() {
                        out.push(Token::Text {
                            text,
                            emphasis: Emphasis::default(),
                        });
                    }
                }
                "sdt" => {
                    if let Some(content) = wml(child, "sdtContent") {
                        self.paragraph_children(content, out)?;
                    }
                }
                "ins" | "smartTag" | "fldSimple" | "customXml" => {
                    self.paragraph_children(child, out)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn run(&mut self, run_node: roxmltree::Node, out: &mut Vec<Token>) -> Result<(), Error> {
        let rpr = wml(run_node, "rPr");

        let emphasis = Emphasis {
            bold: rpr.and_then(|n| wml_bool(n, "b")).unwrap_or(false),
            underline: rpr
                .and_then(|n| wml(n, "u"))
                .is_some_and(|u| u.attribute((WML_NS, "val")) != Some("none")),
        };

        let script = if self.vert_align_as_math {
            rpr.and_then(|n| wml_attr(n, "vertAlign"))
                .and_then(|v| match v {
                    "superscript" => Some('^'),
                    "subscript" => Some('_'),
                    _ => None,
                })
        } else {
            None
        };

        let flush = |pending: &mut String, out: &mut Vec<Token>| {
            if pending.is_empty() {
                return;
            }
            let text = std::mem::take(pending);
            out.push(match script {
                Some(op) => Token::Math {
                    latex: format!("{op}{{{text}}}"),
                    display: false,
                    emphasis,
                },
                None => Token::Text { text, emphasis },
            });
        };

        let mut pending_text = String::new();
        for child in run_node.children() {
            if child.tag_name().namespace() != Some(WML_NS) {
                continue;
            }
            match child.tag_name().name() {
                "t" => {
                    if let Some(t) = child.text() {
                        // Word treats newlines in w:t as whitespace; only w:br breaks lines
                        pending_text.push_str(&t.replace('\n', " "));
                    }
                }
                "tab" => pending_text.push('\t'),
                "br" | "cr" => {
                    let kind = child.attribute((WML_NS, "type"));
                    if kind != Some("page") && kind != Some("column") {
                        flush(&mut pending_text, out);
                        out.push(Token::LineBreak);
                    }
                }
                "drawing" => {
                    flush(&mut pending_text, out);
                    for blip in child
                        .descendants()
                        .filter(|n| n.tag_name().name() == "blip" && n.tag_name().namespace() == Some(DML_NS))
                    {
                        let Some(rel_id) = blip
                            .attribute((REL_NS, "embed"))
                            .or_else(|| blip.attribute((REL_NS, "link")))
                        else {
                            continue;
                        };
                        if let Some(index) = self.image(rel_id)? {
                            out.push(Token::Image(index));
                        }
                    }
                }
                _ => {}
            }
        }
        flush(&mut pending_text, out);
        Ok(())
    }

    fn image(&mut self, rel_id: &str) -> Result<Option<usize>, Error> {
        let Some(path) = self.rels.get(rel_id) else {
            log::warn!("Image relationship {rel_id} is not in the manifest, skipping");
            return Ok(None);
        };
        let Some(entry) = self.package.entry(path)? else {
            log::warn!("Image {path} ({rel_id}) is missing from the package, skipping");
            return Ok(None);
        };
        Ok(Some(self.pool.push(&entry)))
    }
}
