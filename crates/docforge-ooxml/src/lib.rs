//! # docforge-ooxml
//!
//! WordprocessingML (DOCX) packages as a typed document graph, plus a
//! placeholder template engine on top.
//!
//! This crate provides functionality to:
//! - Open and save DOCX packages, preserving parts it does not model
//! - Parse `word/document.xml` into paragraphs, runs, tables and drawings
//! - Build documents programmatically and embed images
//! - Render `{{...}}` templates to text or to styled documents
//!
//! ## Example: Reading a Document
//!
//! ```no_run
//! use docforge_ooxml::Document;
//!
//! let doc = Document::open("letter.docx")?;
//! for paragraph in doc.body.paragraphs() {
//!     println!("{}", paragraph.plain_text());
//! }
//! # Ok::<(), docforge_ooxml::DocxError>(())
//! ```
//!
//! ## Example: Rendering a Template
//!
//! ```no_run
//! use docforge_ooxml::{Document, TemplateData, TemplateEngine};
//!
//! let engine = TemplateEngine::new();
//! let template = Document::open("invoice_template.docx")?;
//! engine.load_template_from_document("invoice", &template)?;
//!
//! let mut data = TemplateData::new();
//! data.set_variable("customer", "ACME Corp");
//! let rendered = engine.render_to_document("invoice", &data)?;
//! rendered.save("invoice.docx")?;
//! # Ok::<(), docforge_ooxml::DocxError>(())
//! ```

pub mod archive;
pub mod content_types;
pub mod data;
pub mod document;
pub mod error;
pub mod image;
pub mod relationships;
pub mod styles;
pub mod template;

mod parser;
mod render;
mod scanner;
mod serializer;
mod xml;

#[cfg(test)]
pub(crate) mod test_utils;

pub use archive::DocxArchive;
pub use content_types::ContentTypes;
pub use data::{ImageReference, TemplateData};
pub use document::{
    Block, Body, Document, Paragraph, ParagraphProperties, Run, RunProperties, Sdt,
    SectionProperties, Table, TableCell, TableCellContent, TableRow,
};
pub use error::{DocxError, Result};
pub use image::{ImageConfig, ImageFormat, ImageInfo, ImageSize};
pub use relationships::Relationships;
pub use template::{Template, TemplateEngine};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
