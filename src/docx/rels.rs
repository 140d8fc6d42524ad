use std::collections::HashMap;

use crate::error::Error;

/// Relationship id → package path, e.g. `rId5` → `word/media/image1.png`.
#[derive(Debug, Default)]
pub(crate) struct RelationshipMap {
    targets: HashMap<String, String>,
}

impl RelationshipMap {
    pub(crate) fn parse(xml_content: &str) -> Result<Self, Error> {
        let xml = roxmltree::Document::parse(xml_content)?;
        let mut targets = HashMap::new();
        for node in xml.root_element().children() {
            if node.tag_name().name() != "Relationship" {
                continue;
            }
            if node.attribute("TargetMode") == Some("External") {
                continue;
            }
            if let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target")) {
                targets.insert(id.to_string(), normalize_target(target));
            }
        }
        Ok(RelationshipMap { targets })
    }

    pub(crate) fn get(&self, id: &str) -> Option<&str> {
        self.targets.get(id).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.targets.len()
    }
}

/// Targets are relative to `word/` unless they start with `/`.
fn normalize_target(target: &str) -> String {
    let path = target.replace('\\', "/");
    if let Some(absolute) = path.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut relative = path.as_str();
    while let Some(rest) = relative
        .strip_prefix("../")
        .or_else(|| relative.strip_prefix("./"))
    {
        relative = rest;
    }
    if relative.starts_with("word/") {
        relative.to_string()
    } else {
        format!("word/{relative}")
    }
}
