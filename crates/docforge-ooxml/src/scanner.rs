//! Placeholder scanner
//!
//! A single linear pass over template text yields the positions and kinds
//! of every `{{...}}` tag. Matching of opening and closing tags is done
//! afterwards by depth counting over the tag list, so nested constructs of
//! the same kind pair up correctly. An unterminated `{{` is not an error;
//! the rest of the text is treated as a literal.

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// What a `{{...}}` tag means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKind {
    /// `{{name}}`
    Var(String),
    /// `{{#if condition}}`
    If(String),
    /// `{{else}}`
    Else,
    /// `{{/if}}`
    EndIf,
    /// `{{#each list}}`
    Each(String),
    /// `{{/each}}`
    EndEach,
    /// `{{#image name}}`
    Image(String),
    /// `{{#block "name"}}`
    Block(String),
    /// `{{/block}}`
    EndBlock,
    /// `{{extends "parent"}}`
    Extends(String),
}

/// A tag found in template text, with byte offsets of the full `{{...}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub start: usize,
    pub end: usize,
    pub kind: TagKind,
}

impl Tag {
    /// True for tags that open a construct needing a matching close
    pub fn opens_construct(&self) -> bool {
        matches!(
            self.kind,
            TagKind::If(_) | TagKind::Each(_) | TagKind::Block(_)
        )
    }
}

/// Find every tag in the input, left to right
pub fn scan_tags(input: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(found) = input[pos..].find(OPEN) {
        let start = pos + found;
        let Some(close) = input[start + OPEN.len()..].find(CLOSE) else {
            break;
        };
        let body_start = start + OPEN.len();
        let body_end = body_start + close;
        let end = body_end + CLOSE.len();

        tags.push(Tag {
            start,
            end,
            kind: classify(&input[body_start..body_end]),
        });
        pos = end;
    }

    tags
}

fn classify(body: &str) -> TagKind {
    let body = body.trim();

    if let Some(rest) = body.strip_prefix("#if ") {
        return TagKind::If(rest.trim().to_string());
    }
    if let Some(rest) = body.strip_prefix("#each ") {
        return TagKind::Each(rest.trim().to_string());
    }
    if let Some(rest) = body.strip_prefix("#image ") {
        return TagKind::Image(rest.trim().to_string());
    }
    if let Some(rest) = body.strip_prefix("#block ") {
        return TagKind::Block(unquote(rest.trim()).to_string());
    }
    if let Some(rest) = body.strip_prefix("extends ") {
        return TagKind::Extends(unquote(rest.trim()).to_string());
    }
    match body {
        "/if" => TagKind::EndIf,
        "/each" => TagKind::EndEach,
        "/block" => TagKind::EndBlock,
        "else" => TagKind::Else,
        _ => TagKind::Var(body.to_string()),
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// Index of the tag closing the construct opened at `open_idx`
///
/// Counts nesting depth over tags of the same family, so an `{{#if}}`
/// inside an `{{#if}}` does not steal the outer `{{/if}}`.
pub fn find_matching(tags: &[Tag], open_idx: usize) -> Option<usize> {
    let same_family = |kind: &TagKind| -> Option<bool> {
        // Some(true) opens, Some(false) closes, None is unrelated
        match (&tags[open_idx].kind, kind) {
            (TagKind::If(_), TagKind::If(_)) => Some(true),
            (TagKind::If(_), TagKind::EndIf) => Some(false),
            (TagKind::Each(_), TagKind::Each(_)) => Some(true),
            (TagKind::Each(_), TagKind::EndEach) => Some(false),
            (TagKind::Block(_), TagKind::Block(_)) => Some(true),
            (TagKind::Block(_), TagKind::EndBlock) => Some(false),
            _ => None,
        }
    };

    let mut depth = 0usize;
    for (i, tag) in tags.iter().enumerate().skip(open_idx) {
        match same_family(&tag.kind) {
            Some(true) => depth += 1,
            Some(false) => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            None => {}
        }
    }
    None
}

/// Index of the `{{else}}` splitting the construct `tags[open_idx..=close_idx]`
///
/// Only an else at the construct's own nesting level counts.
pub fn find_else(tags: &[Tag], open_idx: usize, close_idx: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tag) in tags.iter().enumerate().take(close_idx).skip(open_idx + 1) {
        match tag.kind {
            TagKind::If(_) => depth += 1,
            TagKind::EndIf => depth -= 1,
            TagKind::Else if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}
