#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

const DOCUMENT_HEAD: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
    r#" xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math""#,
    r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
    r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
    r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
    r#" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
    "<w:body>"
);
const DOCUMENT_TAIL: &str = "</w:body></w:document>";

pub const MATH_NS_DECL: &str =
    r#"xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math""#;

/// Smallest byte strings the PNG/JPEG sniffers recognise, plus a tag so two
/// images can be told apart after base64 encoding.
pub fn png(tag: &str) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(tag.as_bytes());
    bytes
}

pub fn jpeg(tag: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(tag.as_bytes());
    bytes
}

/// Route library logs through the test harness; `RUST_LOG=debug` shows them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn run_with(props: &str, text: &str) -> String {
    let rpr = if props.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{props}</w:rPr>")
    };
    format!(
        r#"<w:r>{rpr}<w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape(text)
    )
}

pub fn run(text: &str) -> String {
    run_with("", text)
}

pub fn bold(text: &str) -> String {
    run_with("<w:b/>", text)
}

pub fn underline(text: &str) -> String {
    run_with(r#"<w:u w:val="single"/>"#, text)
}

pub fn styled(props: &str, text: &str) -> String {
    run_with(props, text)
}

pub fn superscript(text: &str) -> String {
    run_with(r#"<w:vertAlign w:val="superscript"/>"#, text)
}

pub fn subscript(text: &str) -> String {
    run_with(r#"<w:vertAlign w:val="subscript"/>"#, text)
}

/// An `m:oMath` holding the given OMML children.
pub fn math(inner: &str) -> String {
    format!("<m:oMath>{inner}</m:oMath>")
}

/// An `m:r` math run.
pub fn mr(text: &str) -> String {
    format!("<m:r><m:t>{}</m:t></m:r>", escape(text))
}

pub fn drawing(rel_id: &str) -> String {
    format!(
        concat!(
            "<w:r><w:drawing><wp:inline>",
            r#"<wp:extent cx="952500" cy="952500"/>"#,
            "<a:graphic><a:graphicData><pic:pic><pic:blipFill>",
            r#"<a:blip r:embed="{}"/>"#,
            "</pic:blipFill></pic:pic></a:graphicData></a:graphic>",
            "</wp:inline></w:drawing></w:r>"
        ),
        rel_id
    )
}

#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    rels: Vec<(String, String)>,
    media: Vec<(String, Vec<u8>)>,
    rels_override: Option<String>,
    without_document: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph made of already-built run / math / hyperlink XML.
    pub fn paragraph(mut self, content: &str) -> Self {
        self.body.push_str(&format!("<w:p>{content}</w:p>"));
        self
    }

    /// A paragraph with a single plain run.
    pub fn text(self, text: &str) -> Self {
        let run = run(text);
        self.paragraph(&run)
    }

    pub fn raw_body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Register `rel_id` → `target` and store `bytes` at `zip_path`.
    pub fn image(mut self, rel_id: &str, target: &str, zip_path: &str, bytes: Vec<u8>) -> Self {
        self.rels.push((rel_id.to_string(), target.to_string()));
        self.media.push((zip_path.to_string(), bytes));
        self
    }

    pub fn relationship(mut self, rel_id: &str, target: &str) -> Self {
        self.rels.push((rel_id.to_string(), target.to_string()));
        self
    }

    pub fn rels_xml(mut self, xml: &str) -> Self {
        self.rels_override = Some(xml.to_string());
        self
    }

    pub fn without_document(mut self) -> Self {
        self.without_document = true;
        self
    }

    pub fn document_xml(&self) -> String {
        format!("{DOCUMENT_HEAD}{}{DOCUMENT_TAIL}", self.body)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut files: Vec<(String, Vec<u8>)> = Vec::new();
        if !self.without_document {
            files.push(("word/document.xml".into(), self.document_xml().into_bytes()));
        }
        let rels = match &self.rels_override {
            Some(xml) => Some(xml.clone()),
            None if !self.rels.is_empty() => {
                let mut xml = String::from(concat!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
                ));
                for (id, target) in &self.rels {
                    xml.push_str(&format!(
                        r#"<Relationship Id="{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="{}"/>"#,
                        escape(target)
                    ));
                }
                xml.push_str("</Relationships>");
                Some(xml)
            }
            None => None,
        };
        if let Some(rels) = rels {
            files.push(("word/_rels/document.xml.rels".into(), rels.into_bytes()));
        }
        files.extend(self.media.iter().cloned());
        zip_bytes(&files)
    }
}

pub fn zip_bytes(files: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, bytes) in files {
        zip.start_file(name.as_str(), options).expect("start zip entry");
        zip.write_all(bytes).expect("write zip entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

/// Wrap OMML children in an `m:oMath` root that declares the math namespace.
pub fn omml_fragment(inner: &str) -> String {
    format!("<m:oMath {MATH_NS_DECL}>{inner}</m:oMath>")
}
