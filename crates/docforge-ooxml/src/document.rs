//! Document object graph and package lifecycle
//!
//! [`Document`] is the root aggregate: it owns the body block tree, the
//! part store, both relationship registries, the content types manifest,
//! and the image-id counter. Everything in the graph is plainly `Clone` —
//! template rendering relies on total deep clones with no shared mutable
//! state between the original and the copy.

use std::io::{Read, Seek};
use std::path::Path;

use crate::archive::{
    DocxArchive, CONTENT_TYPES_PATH, DOCUMENT_PATH, DOCUMENT_RELS_PATH, MEDIA_PREFIX,
    ROOT_RELS_PATH, STYLES_PATH,
};
use crate::content_types::ContentTypes;
use crate::error::Result;
use crate::parser;
use crate::relationships::Relationships;
use crate::serializer;
use crate::styles;

/// A word-processing package held fully in memory
#[derive(Debug, Clone)]
pub struct Document {
    /// Body block sequence
    pub body: Body,
    /// Raw part store (media, headers, everything not modeled is preserved)
    pub archive: DocxArchive,
    /// Package root relationships (`_rels/.rels`)
    pub root_rels: Relationships,
    /// Main document relationships (`word/_rels/document.xml.rels`)
    pub document_rels: Relationships,
    /// Content types manifest
    pub content_types: ContentTypes,
    /// Next free image number for `word/media/image{N}.*`
    next_image_id: u32,
}

/// Ordered sequence of body-level blocks
#[derive(Debug, Clone, Default)]
pub struct Body {
    pub blocks: Vec<Block>,
}

/// A body-level element
///
/// Closed set: the codec and the template engine match exhaustively, so a
/// new variant forces every consumer to handle it.
#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    SectionProperties(SectionProperties),
    BookmarkStart { id: String, name: String },
    BookmarkEnd { id: String },
    Sdt(Sdt),
    MathParagraph(MathParagraph),
}

/// A paragraph: optional properties plus an ordered run sequence
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub properties: Option<ParagraphProperties>,
    pub runs: Vec<Run>,
}

/// Paragraph-level formatting (`w:pPr`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProperties {
    pub style_id: Option<String>,
    pub justification: Option<String>,
    pub spacing: Option<Spacing>,
    pub indent: Option<Indent>,
    pub outline_level: Option<u8>,
    pub keep_next: bool,
    pub keep_lines: bool,
    pub page_break_before: bool,
    pub widow_control: bool,
    pub numbering: Option<Numbering>,
}

/// Spacing before/after and line height, in twentieths of a point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spacing {
    pub before: Option<u32>,
    pub after: Option<u32>,
    pub line: Option<u32>,
}

/// Indentation in twentieths of a point; negative values hang
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Indent {
    pub left: Option<i64>,
    pub right: Option<i64>,
    pub first_line: Option<i64>,
}

/// Numbering reference (`w:numPr`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numbering {
    pub num_id: u32,
    pub level: u32,
}

/// The smallest styled unit of text
///
/// Exactly one content variant is populated in practice; an empty `text`
/// never serializes a `w:t` element.
#[derive(Debug, Clone, Default)]
pub struct Run {
    pub properties: Option<RunProperties>,
    pub text: String,
    pub break_: Option<Break>,
    pub drawing: Option<Box<Drawing>>,
    pub field_char: Option<FieldChar>,
    pub instr_text: Option<String>,
}

/// Run-level formatting (`w:rPr`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProperties {
    /// Font family, applied to ascii/hAnsi/eastAsia alike
    pub fonts: Option<String>,
    pub bold: bool,
    pub bold_cs: bool,
    pub italic: bool,
    pub italic_cs: bool,
    pub underline: Option<String>,
    pub strike: bool,
    pub color: Option<String>,
    /// Size in half-points
    pub size: Option<u32>,
    pub size_cs: Option<u32>,
    pub highlight: Option<String>,
}

/// A line, page or column break (`w:br`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Break {
    pub break_type: Option<String>,
}

/// Field character marker (`w:fldChar`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChar {
    pub char_type: String,
}

/// A table block
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub properties: Option<TableProperties>,
    /// Column widths in twentieths of a point (`w:tblGrid`)
    pub grid: Vec<u32>,
    pub rows: Vec<TableRow>,
}

/// Table-level formatting (`w:tblPr`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableProperties {
    pub style_id: Option<String>,
    pub width: Option<TableWidth>,
    pub justification: Option<String>,
    pub look: Option<String>,
    pub borders: Option<TableBorders>,
}

/// A width with its measuring mode (`w:w` + `w:type`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableWidth {
    pub value: String,
    pub width_type: String,
}

/// Border set for a table (`w:tblBorders`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableBorders {
    pub top: Option<BorderSpec>,
    pub left: Option<BorderSpec>,
    pub bottom: Option<BorderSpec>,
    pub right: Option<BorderSpec>,
    pub inside_h: Option<BorderSpec>,
    pub inside_v: Option<BorderSpec>,
}

/// One border edge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderSpec {
    pub style: String,
    pub size: u32,
    pub color: String,
}

/// A table row
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// A table cell: paragraphs and nested tables, interleaved in order
#[derive(Debug, Clone, Default)]
pub struct TableCell {
    pub properties: Option<TableCellProperties>,
    pub content: Vec<TableCellContent>,
}

/// Cell-level formatting (`w:tcPr`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCellProperties {
    pub width: Option<TableWidth>,
    /// Shading fill color (`w:shd w:fill`)
    pub shading: Option<String>,
}

/// Content of a table cell; nesting depth is unbounded
#[derive(Debug, Clone)]
pub enum TableCellContent {
    Paragraph(Paragraph),
    Table(Table),
}

/// A structured document tag; only the content blocks are modeled
#[derive(Debug, Clone, Default)]
pub struct Sdt {
    pub blocks: Vec<Block>,
}

/// An OMML math paragraph, preserved as raw markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathParagraph {
    pub omml: String,
}

/// Section layout (`w:sectPr`); serialized as the body's final child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProperties {
    /// Page width in twentieths of a point
    pub page_width: u32,
    pub page_height: u32,
    pub margin_top: i64,
    pub margin_right: i64,
    pub margin_bottom: i64,
    pub margin_left: i64,
    pub header_margin: u32,
    pub footer_margin: u32,
    pub gutter: u32,
    pub cols_space: u32,
    pub doc_grid_line_pitch: u32,
}

impl Default for SectionProperties {
    /// A4 portrait with one-inch margins
    fn default() -> Self {
        Self {
            page_width: 11906,
            page_height: 16838,
            margin_top: 1440,
            margin_right: 1440,
            margin_bottom: 1440,
            margin_left: 1440,
            header_margin: 851,
            footer_margin: 992,
            gutter: 0,
            cols_space: 425,
            doc_grid_line_pitch: 312,
        }
    }
}

/// Inline or anchored picture carried by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawing {
    pub kind: DrawingKind,
    /// Display width in EMU
    pub extent_cx: i64,
    /// Display height in EMU
    pub extent_cy: i64,
    pub name: String,
    pub descr: String,
    /// Relationship id of the media part (`r:embed`)
    pub embed_id: String,
}

/// Placement of a drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawingKind {
    Inline,
    Anchor(AnchorConfig),
}

/// Layout of a floating (anchored) drawing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorConfig {
    pub position: ImagePosition,
    pub wrap: ImageWrap,
    pub offset_x_emu: i64,
    pub offset_y_emu: i64,
}

/// Horizontal placement of a floating image relative to the margin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImagePosition {
    Left,
    Right,
    #[default]
    Center,
}

/// Text wrapping mode of a floating image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageWrap {
    None,
    #[default]
    Square,
    Tight,
    TopAndBottom,
}

impl Run {
    /// A plain text run with no properties
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A text run with the given properties
    pub fn styled(text: impl Into<String>, properties: RunProperties) -> Self {
        Self {
            properties: Some(properties),
            text: text.into(),
            ..Default::default()
        }
    }

    /// A run carrying a drawing
    pub fn drawing(drawing: Drawing) -> Self {
        Self {
            drawing: Some(Box::new(drawing)),
            ..Default::default()
        }
    }
}

impl Paragraph {
    /// A paragraph with a single plain run
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            properties: None,
            runs: vec![Run::text(text)],
        }
    }

    /// Concatenated text of all runs
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the paragraph contains no text and no drawings
    pub fn is_empty(&self) -> bool {
        self.runs
            .iter()
            .all(|r| r.text.is_empty() && r.drawing.is_none())
    }
}

impl TableCell {
    /// A cell holding a single plain paragraph
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            properties: None,
            content: vec![TableCellContent::Paragraph(Paragraph::with_text(text))],
        }
    }

    /// Concatenated text of the cell's paragraphs (nested tables excluded)
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            if let TableCellContent::Paragraph(p) = item {
                out.push_str(&p.plain_text());
            }
        }
        out
    }
}

impl TableRow {
    /// Concatenated text of every cell in the row
    pub fn plain_text(&self) -> String {
        self.cells.iter().map(|c| c.plain_text()).collect()
    }
}

impl Body {
    /// Iterate over paragraphs in declaration order (tables excluded)
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// The effective section properties: the last one declared, if any
    pub fn section(&self) -> Option<&SectionProperties> {
        self.blocks.iter().rev().find_map(|b| match b {
            Block::SectionProperties(s) => Some(s),
            _ => None,
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty package with default parts pre-populated
    pub fn new() -> Self {
        Self {
            body: Body {
                blocks: vec![Block::SectionProperties(SectionProperties::default())],
            },
            archive: DocxArchive::new(),
            root_rels: Relationships::standard_root(),
            document_rels: Relationships::for_document(),
            content_types: ContentTypes::standard(),
            next_image_id: 0,
        }
    }

    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(DocxArchive::open(path)?)
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(DocxArchive::from_bytes(bytes)?)
    }

    /// Open a package from any seekable reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_archive(DocxArchive::from_reader(reader)?)
    }

    fn from_archive(archive: DocxArchive) -> Result<Self> {
        // word/document.xml is the one part whose absence is fatal
        let body = parser::parse_document_xml(archive.document_xml()?)?;

        // Optional parts fall back to built-in defaults
        let content_types = match archive.get(CONTENT_TYPES_PATH) {
            Some(xml) => ContentTypes::parse(xml)?,
            None => ContentTypes::standard(),
        };
        let root_rels = match archive.get(ROOT_RELS_PATH) {
            Some(xml) => Relationships::parse(xml)?,
            None => Relationships::standard_root(),
        };
        let document_rels = match archive.get(DOCUMENT_RELS_PATH) {
            Some(xml) => Relationships::parse_document(xml)?,
            None => Relationships::for_document(),
        };

        let next_image_id = next_image_id_from_media(&archive);

        Ok(Self {
            body,
            archive,
            root_rels,
            document_rels,
            content_types,
            next_image_id,
        })
    }

    /// Serialize the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.assembled_archive().to_bytes()
    }

    /// Serialize the package to a file path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.assembled_archive().save(path)
    }

    /// Regenerate the parts the codec owns; everything else is kept as-is
    fn assembled_archive(&self) -> DocxArchive {
        let mut archive = self.archive.clone();
        archive.set_string(DOCUMENT_PATH, serializer::serialize_document_xml(&self.body));
        archive.set_string(CONTENT_TYPES_PATH, self.content_types.serialize());
        archive.set_string(ROOT_RELS_PATH, self.root_rels.serialize());
        archive.set_string(DOCUMENT_RELS_PATH, self.document_rels.serialize_document());
        // A styles part carried by the opened package wins over the default:
        // template documents keep their docDefaults byte-for-byte
        if !archive.contains(STYLES_PATH) {
            archive.set_string(STYLES_PATH, styles::DEFAULT_STYLES_XML);
        }
        archive
    }

    /// Append a plain paragraph and return a mutable reference to it
    pub fn add_paragraph(&mut self, text: impl Into<String>) -> &mut Paragraph {
        self.body
            .blocks
            .push(Block::Paragraph(Paragraph::with_text(text)));
        match self.body.blocks.last_mut() {
            Some(Block::Paragraph(p)) => p,
            _ => unreachable!("just pushed a paragraph"),
        }
    }

    /// Append a table block
    pub fn add_table(&mut self, table: Table) {
        self.body.blocks.push(Block::Table(table));
    }

    /// Text of all body paragraphs, one line each
    pub fn body_text(&self) -> String {
        let lines: Vec<String> = self.body.paragraphs().map(|p| p.plain_text()).collect();
        lines.join("\n")
    }

    /// Allocate the next image number
    pub(crate) fn allocate_image_id(&mut self) -> u32 {
        let id = self.next_image_id;
        self.next_image_id += 1;
        id
    }

    #[cfg(test)]
    pub(crate) fn peek_image_id(&self) -> u32 {
        self.next_image_id
    }
}

/// Scan `word/media/image{N}.*` names for the highest N; next id is N+1
fn next_image_id_from_media(archive: &DocxArchive) -> u32 {
    let mut next = 0;
    for path in archive.media_files() {
        let name = &path[MEDIA_PREFIX.len()..];
        if let Some(rest) = name.strip_prefix("image") {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() || !rest[digits.len()..].starts_with('.') {
                continue;
            }
            if let Ok(n) = digits.parse::<u32>() {
                next = next.max(n + 1);
            }
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_defaults() {
        let doc = Document::new();
        assert_eq!(doc.body.blocks.len(), 1);
        assert!(matches!(doc.body.blocks[0], Block::SectionProperties(_)));
        assert!(doc.content_types.has_default("rels"));
        assert_eq!(doc.root_rels.get("rId1").unwrap().target, "word/document.xml");
        assert_eq!(doc.peek_image_id(), 0);
    }

    #[test]
    fn test_add_paragraph_and_body_text() {
        let mut doc = Document::new();
        doc.add_paragraph("first");
        doc.add_paragraph("second");
        assert_eq!(doc.body_text(), "first\nsecond");
    }

    #[test]
    fn test_paragraph_plain_text_spans_runs() {
        let para = Paragraph {
            properties: None,
            runs: vec![Run::text("Hello "), Run::text("world")],
        };
        assert_eq!(para.plain_text(), "Hello world");
        assert!(!para.is_empty());
        assert!(Paragraph::default().is_empty());
    }

    #[test]
    fn test_section_last_one_wins() {
        let mut body = Body::default();
        body.blocks.push(Block::SectionProperties(SectionProperties {
            page_width: 1,
            ..Default::default()
        }));
        body.blocks.push(Block::Paragraph(Paragraph::with_text("x")));
        body.blocks.push(Block::SectionProperties(SectionProperties {
            page_width: 2,
            ..Default::default()
        }));
        assert_eq!(body.section().unwrap().page_width, 2);
    }

    #[test]
    fn test_image_id_scan_skips_gaps() {
        let mut archive = DocxArchive::new();
        archive.set("word/media/image0.png", vec![0]);
        archive.set("word/media/image7.jpeg", vec![0]);
        archive.set("word/media/photo.png", vec![0]);
        assert_eq!(next_image_id_from_media(&archive), 8);
    }

    #[test]
    fn test_image_id_scan_empty_media() {
        let archive = DocxArchive::new();
        assert_eq!(next_image_id_from_media(&archive), 0);
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let mut doc = Document::new();
        doc.add_paragraph("original");
        let mut copy = doc.clone();
        if let Some(Block::Paragraph(p)) = copy.body.blocks.last_mut() {
            p.runs[0].text = "changed".to_string();
        }
        assert_eq!(doc.body_text(), "original");
        assert_eq!(copy.body_text(), "changed");
    }
}
