use serde::Serialize;
use std::sync::Arc;

/// Image picked by the user. Bytes are shared so the in-flight request and the
/// preview registry never copy them.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File name without its extension, e.g. `flood_aerial` for `flood_aerial.jpg`.
    pub fn stem(&self) -> &str {
        let name = self.name.rsplit(['/', '\\']).next().unwrap_or(&self.name);
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }
}

/// Local URL pointing at the selected bytes, valid until revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewHandle {
    pub id: u64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
    /// EXIF orientation, 1 when absent.
    pub orientation: u32,
    pub location: Option<GeoPoint>,
    pub date_taken: Option<String>,
}

/// Everything the controller keeps about the current pick.
#[derive(Debug, Clone)]
pub struct Selection {
    pub file: SelectedFile,
    pub preview: PreviewHandle,
    pub info: ImageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_last_extension_and_directories() {
        let file = SelectedFile::new("flood_aerial.jpg", "image/jpeg", vec![1u8, 2, 3]);
        assert_eq!(file.stem(), "flood_aerial");

        let nested = SelectedFile::new("C:\\scans\\region.v2.png", "image/png", Vec::new());
        assert_eq!(nested.stem(), "region.v2");

        let dotfile = SelectedFile::new(".hidden", "image/png", Vec::new());
        assert_eq!(dotfile.stem(), ".hidden");
        assert!(dotfile.is_empty());
        assert_eq!(file.len(), 3);
    }
}
