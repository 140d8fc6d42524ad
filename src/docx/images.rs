use base64::Engine;

use crate::model::PoolImage;

use super::RawEntry;

/// Every image met during the walk, in encounter order. Indices never change
/// once handed out; per-question numbering happens after segmentation.
#[derive(Default)]
pub(crate) struct ImagePool {
    images: Vec<PoolImage>,
}

impl ImagePool {
    pub(crate) fn push(&mut self, entry: &RawEntry) -> usize {
        let index = self.images.len();
        self.images.push(PoolImage {
            index,
            mime: mime_type(&entry.path, &entry.bytes),
            base64: base64::engine::general_purpose::STANDARD.encode(&entry.bytes),
        });
        log::debug!(
            "Pooled image {} from {} ({} bytes)",
            index,
            entry.path,
            entry.bytes.len()
        );
        index
    }

    pub(crate) fn into_images(self) -> Vec<PoolImage> {
        self.images
    }
}

fn mime_type(path: &str, data: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(data) {
        return format.to_mime_type();
    }
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "image/jpeg",
    }
}
