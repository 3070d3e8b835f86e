//! Content types manifest (`[Content_Types].xml`)
//!
//! Maps file extensions (defaults) and individual part paths (overrides) to
//! MIME types. Word refuses packages whose parts are not declared here, so
//! every media format and regenerated part must be registered before save.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;
use crate::xml::{escape_xml, get_attr};

/// MIME type of the main document part
pub const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
/// MIME type of the styles part
pub const CT_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
/// MIME type of relationship parts
pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
/// MIME type for plain XML parts
pub const CT_XML: &str = "application/xml";

/// A `<Default>` entry: extension to MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultEntry {
    pub extension: String,
    pub content_type: String,
}

/// An `<Override>` entry: part path to MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub part_name: String,
    pub content_type: String,
}

/// The content types registry, insertion-ordered
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    pub defaults: Vec<DefaultEntry>,
    pub overrides: Vec<OverrideEntry>,
}

impl ContentTypes {
    /// Registry for a freshly created package
    pub fn standard() -> Self {
        let mut ct = Self::default();
        ct.ensure_default("rels", CT_RELATIONSHIPS);
        ct.ensure_default("xml", CT_XML);
        ct.ensure_override("/word/document.xml", CT_DOCUMENT);
        ct.ensure_override("/word/styles.xml", CT_STYLES);
        ct
    }

    /// Parse `[Content_Types].xml`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut ct = ContentTypes::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match e.local_name().as_ref() {
                        b"Default" => {
                            if let Some(entry) = parse_default(e) {
                                ct.defaults.push(entry);
                            }
                        }
                        b"Override" => {
                            if let Some(entry) = parse_override(e) {
                                ct.overrides.push(entry);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
            buf.clear();
        }

        Ok(ct)
    }

    /// Register a default entry; re-adding an existing extension is a no-op
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if self.defaults.iter().any(|d| d.extension == extension) {
            return;
        }
        self.defaults.push(DefaultEntry {
            extension: extension.to_string(),
            content_type: content_type.to_string(),
        });
    }

    /// Register an override entry; re-adding an existing part is a no-op
    pub fn ensure_override(&mut self, part_name: &str, content_type: &str) {
        if self.overrides.iter().any(|o| o.part_name == part_name) {
            return;
        }
        self.overrides.push(OverrideEntry {
            part_name: part_name.to_string(),
            content_type: content_type.to_string(),
        });
    }

    /// Whether an extension has a default entry
    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults.iter().any(|d| d.extension == extension)
    }

    /// Serialize to `[Content_Types].xml`, defaults before overrides
    pub fn serialize(&self) -> String {
        let mut out = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for d in &self.defaults {
            out.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(&d.extension),
                escape_xml(&d.content_type)
            ));
        }
        for o in &self.overrides {
            out.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(&o.part_name),
                escape_xml(&o.content_type)
            ));
        }
        out.push_str("</Types>");
        out
    }
}

fn parse_default(e: &BytesStart) -> Option<DefaultEntry> {
    Some(DefaultEntry {
        extension: get_attr(e, b"Extension")?,
        content_type: get_attr(e, b"ContentType")?,
    })
}

fn parse_override(e: &BytesStart) -> Option<OverrideEntry> {
    Some(OverrideEntry {
        part_name: get_attr(e, b"PartName")?,
        content_type: get_attr(e, b"ContentType")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let ct = ContentTypes::standard();
        assert!(ct.has_default("rels"));
        assert!(ct.has_default("xml"));
        assert!(ct.overrides.iter().any(|o| o.part_name == "/word/document.xml"));
        assert!(ct.overrides.iter().any(|o| o.part_name == "/word/styles.xml"));
    }

    #[test]
    fn test_parse() {
        let xml = br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

        let ct = ContentTypes::parse(xml).unwrap();
        assert_eq!(ct.defaults.len(), 2);
        assert_eq!(ct.defaults[1].extension, "png");
        assert_eq!(ct.overrides.len(), 1);
        assert_eq!(ct.overrides[0].part_name, "/word/document.xml");
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut ct = ContentTypes::standard();
        let defaults_before = ct.defaults.len();
        ct.ensure_default("rels", CT_RELATIONSHIPS);
        ct.ensure_override("/word/document.xml", CT_DOCUMENT);
        assert_eq!(ct.defaults.len(), defaults_before);

        ct.ensure_default("png", "image/png");
        ct.ensure_default("png", "image/png");
        assert_eq!(
            ct.defaults.iter().filter(|d| d.extension == "png").count(),
            1
        );
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut ct = ContentTypes::standard();
        ct.ensure_default("jpeg", "image/jpeg");
        let xml = ct.serialize();

        let parsed = ContentTypes::parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.defaults, ct.defaults);
        assert_eq!(parsed.overrides, ct.overrides);
    }

    #[test]
    fn test_serialize_defaults_before_overrides() {
        let ct = ContentTypes::standard();
        let xml = ct.serialize();
        let default_pos = xml.find("<Default").unwrap();
        let override_pos = xml.find("<Override").unwrap();
        assert!(default_pos < override_pos);
    }
}
