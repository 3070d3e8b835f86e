//! Template registry and parsed template model
//!
//! Templates are loaded once, parsed into a [`Template`], and cached by
//! name in a [`TemplateEngine`]. Rendering never mutates a cached template;
//! the engine hands out `Arc` clones so renders can run concurrently.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::data::TemplateData;
use crate::document::Document;
use crate::error::{DocxError, Result};
use crate::render;
use crate::scanner::{self, Tag, TagKind};

/// Construct kind recorded for a template block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `{{#block "name"}}...{{/block}}`
    Block,
    /// `{{#if cond}}...{{/if}}`
    If,
    /// `{{#each list}}...{{/each}}`
    Each,
    /// `{{#image name}}`
    Image,
}

/// A top-level construct found while parsing a template
#[derive(Debug, Clone)]
pub struct TemplateBlock {
    pub kind: BlockKind,
    pub name: String,
    /// Text between the opening and closing tags; empty for images
    pub body: String,
    /// True when this block redefines one declared by the cached parent
    pub overridden: bool,
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub source: String,
    /// Distinct `{{variable}}` names in first-appearance order
    pub variables: Vec<String>,
    pub blocks: Vec<TemplateBlock>,
    /// Named-block lookup into `blocks`
    pub block_map: HashMap<String, usize>,
    /// Parent template named by `{{extends "..."}}`, if any
    pub parent: Option<String>,
    /// Document the template was loaded from, kept for styled rendering
    base: Option<Document>,
}

impl Template {
    /// Parse template text into its variable and block inventory
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let source = source.into();
        validate_source(&source)?;

        let tags = scanner::scan_tags(&source);
        let mut variables = Vec::new();
        let mut parent = None;
        for tag in &tags {
            match &tag.kind {
                TagKind::Var(name) => {
                    if !variables.contains(name) {
                        variables.push(name.clone());
                    }
                }
                TagKind::Extends(target) => {
                    if parent.is_none() {
                        parent = Some(target.clone());
                    }
                }
                _ => {}
            }
        }

        let mut blocks = Vec::new();
        let mut block_map = HashMap::new();

        let mut i = 0;
        while i < tags.len() {
            let tag = &tags[i];
            match &tag.kind {
                TagKind::Var(_) | TagKind::Extends(_) => {
                    i += 1;
                }
                TagKind::Image(name) => {
                    blocks.push(TemplateBlock {
                        kind: BlockKind::Image,
                        name: name.clone(),
                        body: String::new(),
                        overridden: false,
                    });
                    i += 1;
                }
                TagKind::If(_) | TagKind::Each(_) | TagKind::Block(_) => {
                    let close = scanner::find_matching(&tags, i).ok_or_else(|| {
                        DocxError::Template(format!(
                            "unclosed {} in template {}",
                            construct_name(&tag.kind),
                            name
                        ))
                    })?;
                    let body = source[tag.end..tags[close].start].to_string();
                    let (kind, block_name) = match &tag.kind {
                        TagKind::If(c) => (BlockKind::If, c.clone()),
                        TagKind::Each(l) => (BlockKind::Each, l.clone()),
                        TagKind::Block(n) => (BlockKind::Block, n.clone()),
                        _ => unreachable!(),
                    };
                    if kind == BlockKind::Block {
                        block_map.insert(block_name.clone(), blocks.len());
                    }
                    blocks.push(TemplateBlock {
                        kind,
                        name: block_name,
                        body,
                        overridden: false,
                    });
                    // nested tags belong to this construct
                    i = close + 1;
                }
                TagKind::Else | TagKind::EndIf | TagKind::EndEach | TagKind::EndBlock => {
                    i += 1;
                }
            }
        }

        Ok(Template {
            name,
            source,
            variables,
            blocks,
            block_map,
            parent,
            base: None,
        })
    }

    pub fn base_document(&self) -> Option<&Document> {
        self.base.as_ref()
    }
}

fn construct_name(kind: &TagKind) -> &'static str {
    match kind {
        TagKind::If(_) => "{{#if}}",
        TagKind::Each(_) => "{{#each}}",
        TagKind::Block(_) => "{{#block}}",
        _ => "tag",
    }
}

/// Check delimiter and construct balance before parsing
pub fn validate_source(source: &str) -> Result<()> {
    let opens = source.matches("{{").count();
    let closes = source.matches("}}").count();
    if opens != closes {
        return Err(DocxError::Template(format!(
            "unbalanced placeholder delimiters: {} opening vs {} closing",
            opens, closes
        )));
    }

    let tags = scanner::scan_tags(source);
    check_balance(&tags, "{{#if}}", "{{/if}}", |k| matches!(k, TagKind::If(_)), |k| {
        matches!(k, TagKind::EndIf)
    })?;
    check_balance(
        &tags,
        "{{#each}}",
        "{{/each}}",
        |k| matches!(k, TagKind::Each(_)),
        |k| matches!(k, TagKind::EndEach),
    )?;
    check_balance(
        &tags,
        "{{#block}}",
        "{{/block}}",
        |k| matches!(k, TagKind::Block(_)),
        |k| matches!(k, TagKind::EndBlock),
    )?;
    Ok(())
}

fn check_balance(
    tags: &[Tag],
    open_name: &str,
    close_name: &str,
    opens: impl Fn(&TagKind) -> bool,
    closes: impl Fn(&TagKind) -> bool,
) -> Result<()> {
    let open_count = tags.iter().filter(|t| opens(&t.kind)).count();
    let close_count = tags.iter().filter(|t| closes(&t.kind)).count();
    if open_count != close_count {
        return Err(DocxError::Template(format!(
            "unbalanced construct: {} {} vs {} {}",
            open_count, open_name, close_count, close_name
        )));
    }
    Ok(())
}

/// Caching template registry
///
/// All lookups go through the cache; `{{extends}}` parents are resolved
/// against it at render time, so parents must be loaded before rendering a
/// child that extends them.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    cache: RwLock<HashMap<String, Arc<Template>>>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and cache template text under a name
    pub fn load_template(&self, name: &str, source: &str) -> Result<Arc<Template>> {
        let mut template = Template::parse(name, source)?;
        self.mark_overridden(&mut template);
        let template = Arc::new(template);
        self.insert(name, Arc::clone(&template));
        Ok(template)
    }

    /// Load template text from a file
    pub fn load_template_from_file<P: AsRef<Path>>(
        &self,
        name: &str,
        path: P,
    ) -> Result<Arc<Template>> {
        let source = std::fs::read_to_string(path)?;
        self.load_template(name, &source)
    }

    /// Load a template from a document, keeping the document for styled
    /// rendering
    pub fn load_template_from_document(&self, name: &str, doc: &Document) -> Result<Arc<Template>> {
        let mut template = Template::parse(name, document_template_source(doc))?;
        template.base = Some(doc.clone());
        self.mark_overridden(&mut template);
        let template = Arc::new(template);
        self.insert(name, Arc::clone(&template));
        Ok(template)
    }

    /// Fetch a cached template by name
    pub fn get_template(&self, name: &str) -> Result<Arc<Template>> {
        self.read_cache()
            .get(name)
            .cloned()
            .ok_or_else(|| DocxError::TemplateNotFound(name.to_string()))
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.read_cache().contains_key(name)
    }

    pub fn remove_template(&self, name: &str) -> bool {
        self.write_cache().remove(name).is_some()
    }

    /// Names of all cached templates, sorted
    pub fn list_templates(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_cache().keys().cloned().collect();
        names.sort();
        names
    }

    /// Re-run source validation for a cached template
    pub fn validate_template(&self, name: &str) -> Result<()> {
        let template = self.get_template(name)?;
        validate_source(&template.source)
    }

    /// Render a template to plain text
    pub fn render(&self, name: &str, data: &TemplateData) -> Result<String> {
        let template = self.get_template(name)?;
        let source = self.resolve_inheritance(&template)?;
        Ok(render::render_string(&source, data))
    }

    /// Render a template to a document
    ///
    /// Templates loaded from a document render onto a copy of it, keeping
    /// styles, tables, and untouched parts. Text templates (and templates
    /// using inheritance) render to a fresh document, one paragraph per
    /// line.
    pub fn render_to_document(&self, name: &str, data: &TemplateData) -> Result<Document> {
        let template = self.get_template(name)?;

        match (&template.parent, template.base.as_ref()) {
            (None, Some(base)) => {
                let mut doc = base.clone();
                render::render_document(&mut doc, data)?;
                Ok(doc)
            }
            _ => {
                let source = self.resolve_inheritance(&template)?;
                let rendered = render::render_string(&source, data);
                let mut doc = Document::new();
                for line in rendered.split('\n') {
                    doc.add_paragraph(line);
                }
                render::apply_image_placeholders(&mut doc, data)?;
                Ok(doc)
            }
        }
    }

    /// Flatten an inheritance chain into a single source text
    ///
    /// Walks up through `{{extends}}` parents, substituting each child's
    /// named blocks into its parent. Parent blocks the child does not
    /// redefine keep their own bodies.
    fn resolve_inheritance(&self, template: &Template) -> Result<String> {
        let Some(parent_name) = &template.parent else {
            return Ok(template.source.clone());
        };
        let parent = self.get_template(parent_name)?;
        let parent_source = self.resolve_inheritance(&parent)?;

        let tags = scanner::scan_tags(&parent_source);
        let mut out = String::with_capacity(parent_source.len());
        let mut cursor = 0;
        let mut i = 0;
        while i < tags.len() {
            if let TagKind::Block(block_name) = &tags[i].kind {
                if let Some(close) = scanner::find_matching(&tags, i) {
                    if let Some(&idx) = template.block_map.get(block_name) {
                        out.push_str(&parent_source[cursor..tags[i].start]);
                        out.push_str(&template.blocks[idx].body);
                        cursor = tags[close].end;
                    }
                    i = close + 1;
                    continue;
                }
            }
            i += 1;
        }
        out.push_str(&parent_source[cursor..]);
        Ok(out)
    }

    /// Flag child blocks that shadow a block of an already-cached parent
    fn mark_overridden(&self, template: &mut Template) {
        let Some(parent_name) = &template.parent else {
            return;
        };
        let Ok(parent) = self.get_template(parent_name) else {
            return;
        };
        for block in &mut template.blocks {
            if block.kind == BlockKind::Block && parent.block_map.contains_key(&block.name) {
                block.overridden = true;
            }
        }
    }

    fn insert(&self, name: &str, template: Arc<Template>) {
        self.write_cache().insert(name.to_string(), template);
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Template>>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<Template>>> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Template text of a document: paragraph lines plus one line per table
/// row, cells tab-separated
fn document_template_source(doc: &Document) -> String {
    use crate::document::Block;

    let mut lines = Vec::new();
    for block in &doc.body.blocks {
        match block {
            Block::Paragraph(p) => lines.push(p.plain_text()),
            Block::Table(table) => {
                for row in &table.rows {
                    let cells: Vec<String> =
                        row.cells.iter().map(|c| c.plain_text()).collect();
                    lines.push(cells.join("\t"));
                }
            }
            _ => {}
        }
    }
    lines.join("\n")
}
