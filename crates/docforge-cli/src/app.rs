//! CLI application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use docforge_ooxml::{Document, TemplateData, TemplateEngine};

#[derive(Parser)]
#[command(name = "docforge")]
#[command(author, version, about = "DOCX documents from templates and data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new DOCX file
    New {
        /// Output DOCX file
        output: PathBuf,

        /// Paragraph text, one paragraph per argument
        #[arg(short, long)]
        text: Vec<String>,
    },

    /// Print the body text of a DOCX file
    Text {
        /// Input DOCX file
        input: PathBuf,
    },

    /// Validate a template file
    Validate {
        /// Template file: a DOCX package or plain text
        template: PathBuf,
    },

    /// Render a template with JSON data into a DOCX file
    Render {
        /// Template file: a DOCX package or plain text
        template: PathBuf,

        /// Output DOCX file
        #[arg(short, long)]
        output: PathBuf,

        /// JSON data file; arrays become lists, booleans conditions
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::New { output, text } => {
            new_command(&output, &text)?;
        }
        Commands::Text { input } => {
            text_command(&input)?;
        }
        Commands::Validate { template } => {
            validate_command(&template)?;
        }
        Commands::Render {
            template,
            output,
            data,
        } => {
            render_command(&template, &output, data.as_deref())?;
        }
    }

    Ok(())
}

/// Execute the new command
pub fn new_command(output: &Path, text: &[String]) -> Result<()> {
    let mut doc = Document::new();
    for line in text {
        doc.add_paragraph(line.as_str());
    }
    doc.save(output)
        .with_context(|| format!("Failed to write DOCX file: {}", output.display()))?;

    println!("Created: {}", output.display());
    Ok(())
}

/// Execute the text command
pub fn text_command(input: &Path) -> Result<()> {
    let doc = Document::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))?;
    println!("{}", doc.body_text());
    Ok(())
}

/// Execute the validate command
pub fn validate_command(template: &Path) -> Result<()> {
    let engine = TemplateEngine::new();
    load_template(&engine, "template", template)?;
    engine.validate_template("template")?;

    println!("Valid: {}", template.display());
    Ok(())
}

/// Execute the render command
pub fn render_command(template: &Path, output: &Path, data_file: Option<&Path>) -> Result<()> {
    let engine = TemplateEngine::new();
    load_template(&engine, "template", template)?;

    let data = match data_file {
        Some(path) => template_data_from_json(path)?,
        None => TemplateData::new(),
    };

    let rendered = engine
        .render_to_document("template", &data)
        .with_context(|| format!("Failed to render template: {}", template.display()))?;
    rendered
        .save(output)
        .with_context(|| format!("Failed to write DOCX file: {}", output.display()))?;

    println!("Rendered: {}", output.display());
    Ok(())
}

/// Load a template into the engine, as a document or as plain text
fn load_template(engine: &TemplateEngine, name: &str, path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Template file not found: {}", path.display());
    }

    if is_docx(path) {
        let doc = Document::open(path)
            .with_context(|| format!("Failed to open DOCX template: {}", path.display()))?;
        engine
            .load_template_from_document(name, &doc)
            .with_context(|| format!("Failed to load template: {}", path.display()))?;
    } else {
        engine
            .load_template_from_file(name, path)
            .with_context(|| format!("Failed to load template: {}", path.display()))?;
    }
    Ok(())
}

fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("docx") || e.eq_ignore_ascii_case("dotx"))
        .unwrap_or(false)
}

/// Build template data from a JSON object file
fn template_data_from_json(path: &Path) -> Result<TemplateData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in data file: {}", path.display()))?;
    TemplateData::from_struct(&value)
        .with_context(|| format!("Unusable data file: {}", path.display()))
}
