//! Template rendering
//!
//! Two render paths share the same scanner and data model. The string path
//! works on flat text: loops expand first (outermost in), then variables,
//! then conditionals. The document path renders onto a copy of the
//! template's document, substituting placeholder occurrences run by run so
//! character formatting survives: the replacement text takes the style of
//! the run the placeholder started in, and runs a placeholder does not
//! touch keep their own text and style.

use serde_json::Value;

use crate::data::{value_to_string, TemplateData};
use crate::document::{
    Block, Document, Paragraph, Run, RunProperties, Table, TableCellContent, TableRow,
};
use crate::error::Result;
use crate::image::{build_image_paragraph, ImageConfig};
use crate::scanner::{self, TagKind};

/// Textual marker accepted alongside `{{#image name}}`
const IMAGE_MARKER_OPEN: &str = "[IMAGE:";

// ---------------------------------------------------------------------------
// string path

/// Render flat template text
pub(crate) fn render_string(source: &str, data: &TemplateData) -> String {
    let text = strip_structure_tags(source);
    let text = render_loops(&text, data, None);
    let text = render_variables(&text, data);
    render_conditionals(&text, data)
}

/// Drop `{{extends}}` tags and `{{#block}}`/`{{/block}}` markers
///
/// Block bodies stay in place; only the markers disappear. Overridden
/// bodies were already spliced in during inheritance resolution.
fn strip_structure_tags(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for tag in scanner::scan_tags(source) {
        if matches!(
            tag.kind,
            TagKind::Extends(_) | TagKind::Block(_) | TagKind::EndBlock
        ) {
            out.push_str(&source[cursor..tag.start]);
            cursor = tag.end;
        }
    }
    out.push_str(&source[cursor..]);
    out
}

/// Expand `{{#each}}` constructs, outermost first
///
/// `ctx` carries the current loop item so nested loops can draw their list
/// from an item field. A name that resolves to no list renders nothing.
fn render_loops(source: &str, data: &TemplateData, ctx: Option<&Value>) -> String {
    let tags = scanner::scan_tags(source);
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut i = 0;

    while i < tags.len() {
        let TagKind::Each(list_name) = &tags[i].kind else {
            i += 1;
            continue;
        };
        let Some(close) = scanner::find_matching(&tags, i) else {
            i += 1;
            continue;
        };

        out.push_str(&source[cursor..tags[i].start]);
        let body = &source[tags[i].end..tags[close].start];
        if let Some(items) = lookup_list(data, ctx, list_name) {
            let len = items.len();
            for (idx, item) in items.iter().enumerate() {
                let expanded = render_loops(body, data, Some(item));
                out.push_str(&substitute_item_vars(&expanded, item, idx, len));
            }
        }
        cursor = tags[close].end;
        i = close + 1;
    }

    out.push_str(&source[cursor..]);
    out
}

fn lookup_list<'a>(
    data: &'a TemplateData,
    ctx: Option<&'a Value>,
    name: &str,
) -> Option<&'a [Value]> {
    if let Some(Value::Object(map)) = ctx {
        if let Some(Value::Array(items)) = map.get(name) {
            return Some(items);
        }
    }
    if let Some(items) = data.list(name) {
        return Some(items);
    }
    if let Some(Value::Array(items)) = data.variable(name) {
        return Some(items);
    }
    None
}

/// Replace per-item placeholders inside one loop iteration
fn substitute_item_vars(text: &str, item: &Value, index: usize, len: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for tag in scanner::scan_tags(text) {
        let TagKind::Var(name) = &tag.kind else {
            continue;
        };
        let Some(value) = item_value(name, item, index, len) else {
            continue;
        };
        out.push_str(&text[cursor..tag.start]);
        out.push_str(&value);
        cursor = tag.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn item_value(name: &str, item: &Value, index: usize, len: usize) -> Option<String> {
    match name {
        "this" => Some(value_to_string(item)),
        "@index" => Some(index.to_string()),
        "@first" => Some((index == 0).to_string()),
        "@last" => Some((index + 1 == len).to_string()),
        field => item.get(field).map(value_to_string),
    }
}

/// Replace `{{name}}` occurrences known to the data set
///
/// Unknown names stay in the output verbatim.
fn render_variables(source: &str, data: &TemplateData) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for tag in scanner::scan_tags(source) {
        let TagKind::Var(name) = &tag.kind else {
            continue;
        };
        let Some(value) = data.variable(name) else {
            continue;
        };
        out.push_str(&source[cursor..tag.start]);
        out.push_str(&value_to_string(value));
        cursor = tag.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Resolve `{{#if}}` constructs, recursing into the kept branch
fn render_conditionals(source: &str, data: &TemplateData) -> String {
    let tags = scanner::scan_tags(source);
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut i = 0;

    while i < tags.len() {
        let TagKind::If(condition) = &tags[i].kind else {
            i += 1;
            continue;
        };
        let Some(close) = scanner::find_matching(&tags, i) else {
            i += 1;
            continue;
        };

        out.push_str(&source[cursor..tags[i].start]);
        let (then_branch, else_branch) = match scanner::find_else(&tags, i, close) {
            Some(e) => (
                &source[tags[i].end..tags[e].start],
                &source[tags[e].end..tags[close].start],
            ),
            None => (&source[tags[i].end..tags[close].start], ""),
        };
        let kept = if data.is_truthy(condition) {
            then_branch
        } else {
            else_branch
        };
        out.push_str(&render_conditionals(kept, data));
        cursor = tags[close].end;
        i = close + 1;
    }

    out.push_str(&source[cursor..]);
    out
}

// ---------------------------------------------------------------------------
// document path

/// Render template data onto a document in place
pub(crate) fn render_document(doc: &mut Document, data: &TemplateData) -> Result<()> {
    let mut blocks = std::mem::take(&mut doc.body.blocks);

    expand_block_loops(&mut blocks, data, None);
    for block in &mut blocks {
        if let Block::Table(table) = block {
            expand_table_rows(table, data);
        }
    }
    for block in &mut blocks {
        process_block(block, data);
    }

    doc.body.blocks = blocks;
    apply_image_placeholders(doc, data)
}

/// Expand loops whose markers sit on paragraphs of their own
///
/// The opening paragraph holds just `{{#each x}}` and the closing one just
/// `{{/each}}`; everything between, paragraphs and tables alike, is the
/// body duplicated per item. A missing list removes markers and body.
fn expand_block_loops(blocks: &mut Vec<Block>, data: &TemplateData, ctx: Option<&Value>) {
    let mut i = 0;
    while i < blocks.len() {
        let Some(list_name) = loop_open_marker(&blocks[i]) else {
            i += 1;
            continue;
        };
        let Some(close) = find_loop_close(blocks, i) else {
            i += 1;
            continue;
        };

        let body: Vec<Block> = blocks[i + 1..close].to_vec();
        let mut expanded = Vec::new();
        if let Some(items) = lookup_list(data, ctx, &list_name) {
            let len = items.len();
            for (idx, item) in items.iter().enumerate() {
                let mut clone = body.clone();
                expand_block_loops(&mut clone, data, Some(item));
                for block in &mut clone {
                    substitute_item_vars_in_block(block, item, idx, len);
                }
                expanded.append(&mut clone);
            }
        }

        let expanded_len = expanded.len();
        blocks.splice(i..=close, expanded);
        i += expanded_len;
    }
}

/// List name if this block is a lone `{{#each x}}` marker paragraph
fn loop_open_marker(block: &Block) -> Option<String> {
    let Block::Paragraph(p) = block else {
        return None;
    };
    let text = p.plain_text();
    let tags = scanner::scan_tags(text.trim());
    match tags.as_slice() {
        [tag] if tag.start == 0 && tag.end == text.trim().len() => match &tag.kind {
            TagKind::Each(name) => Some(name.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn loop_close_marker(block: &Block) -> bool {
    matches!(block, Block::Paragraph(p) if p.plain_text().trim() == "{{/each}}")
}

fn find_loop_close(blocks: &[Block], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (i, block) in blocks.iter().enumerate().skip(open + 1) {
        if loop_open_marker(block).is_some() {
            depth += 1;
        } else if loop_close_marker(block) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn substitute_item_vars_in_block(block: &mut Block, item: &Value, index: usize, len: usize) {
    let lookup = |name: &str| item_value(name, item, index, len);
    match block {
        Block::Paragraph(p) => substitute_in_paragraph(p, &lookup),
        Block::Table(table) => {
            for row in &mut table.rows {
                for cell in &mut row.cells {
                    for content in &mut cell.content {
                        if let TableCellContent::Paragraph(p) = content {
                            substitute_in_paragraph(p, &lookup);
                        }
                    }
                }
            }
        }
        Block::Sdt(sdt) => {
            for inner in &mut sdt.blocks {
                substitute_item_vars_in_block(inner, item, index, len);
            }
        }
        _ => {}
    }
}

/// Duplicate rows carrying `{{#each}}` markers, one copy per item
///
/// Both markers must appear in the row, the opening one inside a single
/// cell's text. Cells of each copy are rebuilt as one paragraph whose run
/// takes the style of the template cell's first run. A missing list drops
/// the row.
fn expand_table_rows(table: &mut Table, data: &TemplateData) {
    let rows = std::mem::take(&mut table.rows);
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(list_name) = row_loop_name(&row) else {
            out.push(row);
            continue;
        };
        let Some(items) = lookup_list(data, None, &list_name) else {
            continue;
        };
        let len = items.len();
        for (idx, item) in items.iter().enumerate() {
            out.push(instantiate_row(&row, item, idx, len, data));
        }
    }

    table.rows = out;
}

/// List name when a row holds a complete `{{#each}}` construct
fn row_loop_name(row: &TableRow) -> Option<String> {
    let mut name = None;
    for cell in &row.cells {
        for tag in scanner::scan_tags(&cell.plain_text()) {
            if let TagKind::Each(list) = tag.kind {
                name = Some(list);
                break;
            }
        }
    }
    let name = name?;
    let row_text = row.plain_text();
    scanner::scan_tags(&row_text)
        .iter()
        .any(|t| t.kind == TagKind::EndEach)
        .then_some(name)
}

fn instantiate_row(
    row: &TableRow,
    item: &Value,
    index: usize,
    len: usize,
    data: &TemplateData,
) -> TableRow {
    let mut new_row = row.clone();
    for cell in &mut new_row.cells {
        let text = strip_each_markers(&cell.plain_text());
        let text = substitute_item_vars(&text, item, index, len);
        let text = render_variables(&text, data);

        let (paragraph_properties, run_properties) = cell
            .content
            .iter()
            .find_map(|c| match c {
                TableCellContent::Paragraph(p) => Some((
                    p.properties.clone(),
                    p.runs.first().and_then(|r| r.properties.clone()),
                )),
                TableCellContent::Table(_) => None,
            })
            .unwrap_or((None, None));

        cell.content = vec![TableCellContent::Paragraph(Paragraph {
            properties: paragraph_properties,
            runs: vec![Run {
                properties: run_properties,
                text,
                ..Default::default()
            }],
        })];
    }
    new_row
}

fn strip_each_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for tag in scanner::scan_tags(text) {
        if matches!(tag.kind, TagKind::Each(_) | TagKind::EndEach) {
            out.push_str(&text[cursor..tag.start]);
            cursor = tag.end;
        }
    }
    out.push_str(&text[cursor..]);
    out
}

fn process_block(block: &mut Block, data: &TemplateData) {
    match block {
        Block::Paragraph(p) => process_paragraph(p, data),
        Block::Table(table) => process_table(table, data),
        Block::Sdt(sdt) => {
            for inner in &mut sdt.blocks {
                process_block(inner, data);
            }
        }
        _ => {}
    }
}

fn process_table(table: &mut Table, data: &TemplateData) {
    for row in &mut table.rows {
        for cell in &mut row.cells {
            for content in &mut cell.content {
                match content {
                    TableCellContent::Paragraph(p) => process_paragraph(p, data),
                    TableCellContent::Table(nested) => process_table(nested, data),
                }
            }
        }
    }
}

/// Render loops, variables and conditionals within one paragraph
fn process_paragraph(paragraph: &mut Paragraph, data: &TemplateData) {
    let text = paragraph.plain_text();
    let tags = scanner::scan_tags(&text);

    // a loop completed inside the paragraph collapses it to a single run
    let has_loop = tags
        .iter()
        .enumerate()
        .any(|(i, t)| matches!(t.kind, TagKind::Each(_)) && scanner::find_matching(&tags, i).is_some());
    if has_loop {
        rebuild_paragraph(paragraph, render_loops(&text, data, None));
    }

    substitute_in_paragraph(paragraph, &|name| data.variable(name).map(value_to_string));

    let text = paragraph.plain_text();
    let tags = scanner::scan_tags(&text);
    let has_conditional = tags
        .iter()
        .enumerate()
        .any(|(i, t)| matches!(t.kind, TagKind::If(_)) && scanner::find_matching(&tags, i).is_some());
    if has_conditional {
        rebuild_paragraph(paragraph, render_conditionals(&text, data));
    }
}

/// Replace a paragraph's runs with a single run styled like its first
fn rebuild_paragraph(paragraph: &mut Paragraph, text: String) {
    let properties = first_run_properties(paragraph);
    paragraph.runs = vec![Run {
        properties,
        text,
        ..Default::default()
    }];
}

fn first_run_properties(paragraph: &Paragraph) -> Option<RunProperties> {
    paragraph
        .runs
        .iter()
        .find(|r| !r.text.is_empty())
        .or_else(|| paragraph.runs.first())
        .and_then(|r| r.properties.clone())
}

/// Substitute placeholder occurrences run by run
///
/// The paragraph text is viewed as one string with each run owning a byte
/// range. Replacement text is emitted as a run styled like the run the
/// placeholder starts in; text a placeholder spans in later runs is
/// dropped. Runs without text (drawings, breaks) pass through untouched.
fn substitute_in_paragraph(paragraph: &mut Paragraph, lookup: &dyn Fn(&str) -> Option<String>) {
    let text = paragraph.plain_text();
    let replacements: Vec<(usize, usize, String)> = scanner::scan_tags(&text)
        .into_iter()
        .filter_map(|tag| match tag.kind {
            TagKind::Var(name) => lookup(&name).map(|value| (tag.start, tag.end, value)),
            _ => None,
        })
        .collect();
    if replacements.is_empty() {
        return;
    }

    let mut new_runs: Vec<Run> = Vec::new();
    let mut reps = replacements.into_iter().peekable();
    let mut skip_until = 0usize;
    let mut pos = 0usize;

    for run in &paragraph.runs {
        if run.text.is_empty() {
            new_runs.push(run.clone());
            continue;
        }
        let run_start = pos;
        let run_end = pos + run.text.len();
        pos = run_end;

        let mut cursor = run_start.max(skip_until);
        while cursor < run_end {
            let next = reps
                .peek()
                .filter(|(start, _, _)| *start < run_end)
                .map(|(start, end, _)| (*start, *end));
            match next {
                Some((rep_start, rep_end)) => {
                    if rep_start > cursor {
                        new_runs.push(run_slice(run, &run.text[cursor - run_start..rep_start - run_start]));
                    }
                    let (_, _, value) = reps.next().unwrap_or_default();
                    if !value.is_empty() {
                        new_runs.push(run_slice(run, &value));
                    }
                    skip_until = rep_end;
                    cursor = rep_end.min(run_end);
                }
                None => {
                    new_runs.push(run_slice(run, &run.text[cursor - run_start..]));
                    cursor = run_end;
                }
            }
        }
    }

    paragraph.runs = new_runs
        .into_iter()
        .filter(|r| {
            !r.text.is_empty()
                || r.drawing.is_some()
                || r.break_.is_some()
                || r.field_char.is_some()
                || r.instr_text.is_some()
        })
        .collect();
}

fn run_slice(run: &Run, text: &str) -> Run {
    Run {
        properties: run.properties.clone(),
        text: text.to_string(),
        ..Default::default()
    }
}

/// Expand image placeholders into drawing paragraphs
///
/// Runs last: every surviving `{{#image name}}` or `[IMAGE:name]` marker
/// splits its paragraph, registers the image payload as a media part, and
/// puts a drawing paragraph in the gap. A name with no supplied image
/// leaves a visible `[image not found: name]` run instead.
pub(crate) fn apply_image_placeholders(doc: &mut Document, data: &TemplateData) -> Result<()> {
    let blocks = std::mem::take(&mut doc.body.blocks);
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            Block::Paragraph(p) => expand_image_paragraph(doc, p, data, &mut out)?,
            other => out.push(other),
        }
    }
    doc.body.blocks = out;
    Ok(())
}

fn expand_image_paragraph(
    doc: &mut Document,
    paragraph: Paragraph,
    data: &TemplateData,
    out: &mut Vec<Block>,
) -> Result<()> {
    let text = paragraph.plain_text();
    let Some((start, end, name)) = find_image_marker(&text) else {
        out.push(Block::Paragraph(paragraph));
        return Ok(());
    };

    let style = first_run_properties(&paragraph);
    let before = &text[..start];
    if !before.is_empty() {
        out.push(Block::Paragraph(Paragraph {
            properties: paragraph.properties.clone(),
            runs: vec![Run {
                properties: style.clone(),
                text: before.to_string(),
                ..Default::default()
            }],
        }));
    }

    match data.image(&name) {
        Some(image) => {
            let info = doc.add_image_part(&image.data, image.size.as_ref())?;
            let config = ImageConfig {
                size: image.size.clone(),
                alignment: image.alignment.clone(),
                ..Default::default()
            };
            out.push(Block::Paragraph(build_image_paragraph(&info, &config)));
        }
        None => {
            out.push(Block::Paragraph(Paragraph {
                properties: paragraph.properties.clone(),
                runs: vec![Run {
                    properties: style.clone(),
                    text: format!("[image not found: {}]", name),
                    ..Default::default()
                }],
            }));
        }
    }

    let after = &text[end..];
    if !after.is_empty() {
        // a paragraph may hold several markers
        let rest = Paragraph {
            properties: paragraph.properties,
            runs: vec![Run {
                properties: style,
                text: after.to_string(),
                ..Default::default()
            }],
        };
        expand_image_paragraph(doc, rest, data, out)?;
    }
    Ok(())
}

fn find_image_marker(text: &str) -> Option<(usize, usize, String)> {
    for tag in scanner::scan_tags(text) {
        if let TagKind::Image(name) = tag.kind {
            return Some((tag.start, tag.end, name));
        }
    }
    let start = text.find(IMAGE_MARKER_OPEN)?;
    let close = text[start..].find(']')? + start;
    let name = text[start + IMAGE_MARKER_OPEN.len()..close].trim().to_string();
    Some((start, close + 1, name))
}
