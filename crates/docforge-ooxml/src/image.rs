//! Embedded image support
//!
//! Adding an image touches four places at once: the media part, the
//! document relationships, the content types manifest, and (usually) a new
//! drawing-bearing paragraph. Media parts are named `image{N}.{ext}` with N
//! taken from the document's monotonic counter, so re-opened documents keep
//! allocating collision-free names.

use std::io::Cursor;

use crate::archive::MEDIA_PREFIX;
use crate::document::{
    AnchorConfig, Block, Document, Drawing, DrawingKind, Paragraph, ParagraphProperties, Run,
};
use crate::error::{DocxError, Result};
use crate::relationships::TYPE_IMAGE;

/// EMU per pixel at 96 DPI
pub const EMU_PER_PIXEL: i64 = 9525;
/// EMU per millimetre
pub const EMU_PER_MM: f64 = 36000.0;

/// Supported embedded image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// File extension used for the media part name
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    /// MIME type for the content types manifest
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

/// Requested display size, in millimetres
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSize {
    pub width_mm: Option<f64>,
    pub height_mm: Option<f64>,
    /// Derive the unset dimension from the pixel aspect ratio
    pub keep_aspect_ratio: bool,
}

/// Placement and sizing options for an added image
#[derive(Debug, Clone, Default)]
pub struct ImageConfig {
    pub size: Option<ImageSize>,
    pub alt_text: Option<String>,
    /// Paragraph justification for inline images (`left`, `center`, ...)
    pub alignment: Option<String>,
    /// Floating placement; `None` embeds the image inline
    pub anchor: Option<AnchorConfig>,
}

/// Everything recorded about an added image
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Number used in the media part name
    pub id: u32,
    /// Relationship id referencing the media part
    pub rel_id: String,
    pub format: ImageFormat,
    /// Intrinsic size in pixels
    pub width: u32,
    pub height: u32,
    /// Display size in EMU
    pub extent_cx: i64,
    pub extent_cy: i64,
}

/// Sniff the format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    match image::guess_format(data) {
        Ok(image::ImageFormat::Png) => Ok(ImageFormat::Png),
        Ok(image::ImageFormat::Jpeg) => Ok(ImageFormat::Jpeg),
        Ok(image::ImageFormat::Gif) => Ok(ImageFormat::Gif),
        Ok(other) => Err(DocxError::Image(format!(
            "unsupported image format: {:?}",
            other
        ))),
        Err(e) => Err(DocxError::Image(format!("unrecognized image data: {}", e))),
    }
}

/// Decode intrinsic pixel dimensions without decoding the full image
pub fn dimensions(data: &[u8]) -> Result<(u32, u32)> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| DocxError::Image(format!("failed to read image header: {}", e)))?
        .into_dimensions()
        .map_err(|e| DocxError::Image(format!("failed to decode image dimensions: {}", e)))
}

/// Compute the display size in EMU
///
/// Defaults to the intrinsic pixel size at 96 DPI; an explicit size in mm
/// overrides it, with single-dimension aspect-ratio scaling.
pub fn display_size(width_px: u32, height_px: u32, size: Option<&ImageSize>) -> (i64, i64) {
    let mut cx = width_px as i64 * EMU_PER_PIXEL;
    let mut cy = height_px as i64 * EMU_PER_PIXEL;

    if let Some(size) = size {
        match (size.width_mm, size.height_mm) {
            (Some(w), Some(h)) => {
                cx = (w * EMU_PER_MM) as i64;
                cy = (h * EMU_PER_MM) as i64;
            }
            (Some(w), None) if size.keep_aspect_ratio && width_px > 0 => {
                cx = (w * EMU_PER_MM) as i64;
                cy = (cx as f64 * height_px as f64 / width_px as f64) as i64;
            }
            (None, Some(h)) if size.keep_aspect_ratio && height_px > 0 => {
                cy = (h * EMU_PER_MM) as i64;
                cx = (cy as f64 * width_px as f64 / height_px as f64) as i64;
            }
            _ => {}
        }
    }

    (cx, cy)
}

impl Document {
    /// Register image data as a media part without adding any body content
    ///
    /// Used by the template renderer, which builds and places its own
    /// drawing paragraphs.
    pub fn add_image_part(&mut self, data: &[u8], size: Option<&ImageSize>) -> Result<ImageInfo> {
        let format = detect_format(data)?;
        let (width, height) = dimensions(data)?;

        let id = self.allocate_image_id();
        let file_name = format!("image{}.{}", id, format.extension());
        let rel_id = self
            .document_rels
            .add(TYPE_IMAGE, &format!("media/{}", file_name));
        self.archive
            .set(format!("{}{}", MEDIA_PREFIX, file_name), data.to_vec());
        self.content_types
            .ensure_default(format.extension(), format.content_type());

        let (extent_cx, extent_cy) = display_size(width, height, size);
        Ok(ImageInfo {
            id,
            rel_id,
            format,
            width,
            height,
            extent_cx,
            extent_cy,
        })
    }

    /// Add an image and append a drawing paragraph to the body
    pub fn add_image_from_data(&mut self, data: &[u8], config: &ImageConfig) -> Result<ImageInfo> {
        let info = self.add_image_part(data, config.size.as_ref())?;
        let paragraph = build_image_paragraph(&info, config);
        self.body.blocks.push(Block::Paragraph(paragraph));
        Ok(info)
    }

    /// Add an image from a file on disk
    pub fn add_image_from_file<P: AsRef<std::path::Path>>(
        &mut self,
        path: P,
        config: &ImageConfig,
    ) -> Result<ImageInfo> {
        let data = std::fs::read(path)?;
        self.add_image_from_data(&data, config)
    }
}

/// Build the paragraph holding an image's drawing run
pub(crate) fn build_image_paragraph(info: &ImageInfo, config: &ImageConfig) -> Paragraph {
    let drawing = Drawing {
        kind: match &config.anchor {
            Some(anchor) => DrawingKind::Anchor(anchor.clone()),
            None => DrawingKind::Inline,
        },
        extent_cx: info.extent_cx,
        extent_cy: info.extent_cy,
        name: format!("Picture {}", info.id),
        descr: config.alt_text.clone().unwrap_or_default(),
        embed_id: info.rel_id.clone(),
    };

    let properties = config.alignment.as_ref().map(|alignment| ParagraphProperties {
        justification: Some(alignment.clone()),
        ..Default::default()
    });

    Paragraph {
        properties,
        runs: vec![Run::drawing(drawing)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::png_bytes;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&png_bytes(1, 1)).unwrap(), ImageFormat::Png);
        assert!(detect_format(b"definitely not an image").is_err());
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(dimensions(&png_bytes(2, 3)).unwrap(), (2, 3));
    }

    #[test]
    fn test_display_size_defaults_to_96dpi() {
        assert_eq!(display_size(96, 48, None), (96 * 9525, 48 * 9525));
    }

    #[test]
    fn test_display_size_explicit_mm() {
        let size = ImageSize {
            width_mm: Some(10.0),
            height_mm: Some(20.0),
            keep_aspect_ratio: false,
        };
        assert_eq!(display_size(100, 100, Some(&size)), (360000, 720000));
    }

    #[test]
    fn test_display_size_aspect_ratio() {
        let size = ImageSize {
            width_mm: Some(10.0),
            height_mm: None,
            keep_aspect_ratio: true,
        };
        let (cx, cy) = display_size(200, 100, Some(&size));
        assert_eq!(cx, 360000);
        assert_eq!(cy, 180000);
    }

    #[test]
    fn test_add_image_registers_everything() {
        let mut doc = Document::new();
        let info = doc
            .add_image_from_data(&png_bytes(4, 4), &ImageConfig::default())
            .unwrap();

        assert_eq!(info.id, 0);
        assert_eq!(info.rel_id, "rId2");
        assert!(doc.archive.contains("word/media/image0.png"));
        assert!(doc.content_types.has_default("png"));
        let rel = doc.document_rels.get("rId2").unwrap();
        assert_eq!(rel.target, "media/image0.png");
        assert!(matches!(doc.body.blocks.last(), Some(Block::Paragraph(p)) if p.runs[0].drawing.is_some()));
    }

    #[test]
    fn test_image_ids_are_monotonic() {
        let mut doc = Document::new();
        let first = doc
            .add_image_from_data(&png_bytes(1, 1), &ImageConfig::default())
            .unwrap();
        let second = doc
            .add_image_from_data(&png_bytes(1, 1), &ImageConfig::default())
            .unwrap();
        assert_eq!(first.id, 0);
        assert_eq!(second.id, 1);
        assert_ne!(first.rel_id, second.rel_id);
    }

    #[test]
    fn test_anchor_config_produces_floating_drawing() {
        let info = ImageInfo {
            id: 1,
            rel_id: "rId3".to_string(),
            format: ImageFormat::Png,
            width: 10,
            height: 10,
            extent_cx: 95250,
            extent_cy: 95250,
        };
        let config = ImageConfig {
            anchor: Some(AnchorConfig::default()),
            ..Default::default()
        };
        let paragraph = build_image_paragraph(&info, &config);
        let drawing = paragraph.runs[0].drawing.as_ref().unwrap();
        assert!(matches!(drawing.kind, DrawingKind::Anchor(_)));
    }
}
