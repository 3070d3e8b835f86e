//! Relationship registry (`.rels` parts)
//!
//! Relationships link one part to another: the package root to the main
//! document, a run's drawing to its media part, the document to its styles.
//! Ids follow the `rIdN` convention and must stay unique within one part.
//!
//! The main document's relationships carry one hard rule: `rId1` is
//! reserved for the styles relationship. Parsing filters styles entries out
//! and serialization re-emits `rId1 -> styles.xml` first, so dynamically
//! allocated ids always start at `rId2`.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::xml::{escape_xml, get_attr};

/// Relationship type URI for the main document part
pub const TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
/// Relationship type URI for the styles part
pub const TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
/// Relationship type URI for embedded images
pub const TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
/// Relationship type URI for headers
pub const TYPE_HEADER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
/// Relationship type URI for footers
pub const TYPE_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

const RELS_XMLNS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// A single relationship entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// Insertion-ordered set of relationships with collision-free id allocation
#[derive(Debug, Clone)]
pub struct Relationships {
    entries: Vec<Relationship>,
    next_id: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new()
    }
}

impl Relationships {
    /// Empty registry; the first allocated id is `rId1`
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Empty document-level registry; `rId1` stays reserved for styles
    pub fn for_document() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 2,
        }
    }

    /// Registry for a new package root: `rId1 -> word/document.xml`
    pub fn standard_root() -> Self {
        let mut rels = Self::new();
        rels.add(TYPE_OFFICE_DOCUMENT, "word/document.xml");
        rels
    }

    /// Parse a `.rels` part
    ///
    /// Tracks the highest numeric `rIdN` suffix so ids allocated afterwards
    /// never collide with existing ones.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_inner(xml, false)
    }

    /// Parse the main document's `.rels` part
    ///
    /// Styles relationships are dropped here; serialization adds the
    /// canonical `rId1 -> styles.xml` entry back.
    pub fn parse_document(xml: &[u8]) -> Result<Self> {
        Self::parse_inner(xml, true)
    }

    fn parse_inner(xml: &[u8], filter_styles: bool) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();
        let mut max_id = if filter_styles { 1 } else { 0 };
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let id = get_attr(e, b"Id").unwrap_or_default();
                        let rel_type = get_attr(e, b"Type").unwrap_or_default();
                        let target = get_attr(e, b"Target").unwrap_or_default();

                        if let Some(n) = numeric_suffix(&id) {
                            max_id = max_id.max(n);
                        }
                        if filter_styles && rel_type == TYPE_STYLES {
                            continue;
                        }
                        entries.push(Relationship { id, rel_type, target });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(e.into()),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            entries,
            next_id: max_id + 1,
        })
    }

    /// Add a relationship, returning the allocated `rIdN`
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = format!("rId{}", self.next_id);
        self.next_id += 1;
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
        });
        id
    }

    /// Look up a relationship by id
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize entries as-is (package root form)
    pub fn serialize(&self) -> String {
        let mut out = self.serialize_open();
        self.serialize_entries(&mut out);
        out.push_str("</Relationships>");
        out
    }

    /// Serialize the document-level part: `rId1 -> styles.xml` first, then
    /// all dynamic entries in insertion order
    pub fn serialize_document(&self) -> String {
        let mut out = self.serialize_open();
        out.push_str(&format!(
            r#"<Relationship Id="rId1" Type="{}" Target="styles.xml"/>"#,
            TYPE_STYLES
        ));
        self.serialize_entries(&mut out);
        out.push_str("</Relationships>");
        out
    }

    fn serialize_open(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"{}\">",
            RELS_XMLNS
        )
    }

    fn serialize_entries(&self, out: &mut String) {
        for r in &self.entries {
            out.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                escape_xml(&r.id),
                escape_xml(&r.rel_type),
                escape_xml(&r.target)
            ));
        }
    }
}

/// Extract N from an `rIdN` id, if it has that shape
fn numeric_suffix(id: &str) -> Option<u32> {
    id.strip_prefix("rId")?.parse().ok()
}
