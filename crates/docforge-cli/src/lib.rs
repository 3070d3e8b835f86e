//! docforge CLI - command-line interface library
//!
//! This library provides the CLI functionality for docforge, including:
//! - New: create a DOCX file from the command line
//! - Text: print the body text of a DOCX file
//! - Validate: check a template for balance errors
//! - Render: fill a template with JSON data and write a DOCX
//!
//! # Binary Usage
//!
//! ```bash
//! # Create a document
//! docforge new out.docx --text "First paragraph"
//!
//! # Render a template with data
//! docforge render invoice.docx --data invoice.json --output final.docx
//!
//! # Validate a template
//! docforge validate invoice.docx
//! ```

pub mod app;

// Re-export main entry point and commands
pub use app::{new_command, render_command, run_cli, text_command, validate_command};
