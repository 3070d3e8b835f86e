//! XML codec, serialize direction: object graph into `word/document.xml`
//!
//! The OOXML schema is order-sensitive, so every element is written by hand
//! in a fixed sequence instead of deriving emission from field order. The
//! two invariants that matter most:
//!
//! * the body's section properties are emitted last, no matter where they
//!   sit in the block sequence (last declaration wins when there are
//!   several);
//! * run content follows `rPr, t, br, drawing, fldChar, instrText`, with an
//!   empty `w:t` never emitted, and `w:rPr` children follow one fixed
//!   sub-order.

use crate::document::{
    AnchorConfig, Block, Body, BorderSpec, Drawing, DrawingKind, ImagePosition, ImageWrap,
    Paragraph, ParagraphProperties, Run, RunProperties, Sdt, SectionProperties, Table, TableCell,
    TableCellContent, TableRow,
};
use crate::xml::escape_xml;

const NAMESPACES: &str = concat!(
    r#" xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
    r#" xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordml""#,
    r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
    r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
    r#" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#,
    r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
);

const MATH_XMLNS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

/// Serialize a body into the full main document part
pub(crate) fn serialize_document_xml(body: &Body) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    out.push_str("<w:document");
    out.push_str(NAMESPACES);
    out.push_str("><w:body>");

    // Partition: every non-section block in declaration order, then the
    // last declared section properties as the final child
    let mut section: Option<&SectionProperties> = None;
    for block in &body.blocks {
        match block {
            Block::SectionProperties(s) => section = Some(s),
            other => write_block(&mut out, other),
        }
    }
    if let Some(section) = section {
        write_section_properties(&mut out, section);
    }

    out.push_str("</w:body></w:document>");
    out
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph(p) => write_paragraph(out, p),
        Block::Table(t) => write_table(out, t),
        Block::SectionProperties(s) => write_section_properties(out, s),
        Block::BookmarkStart { id, name } => {
            out.push_str(&format!(
                r#"<w:bookmarkStart w:id="{}" w:name="{}"/>"#,
                escape_xml(id),
                escape_xml(name)
            ));
        }
        Block::BookmarkEnd { id } => {
            out.push_str(&format!(r#"<w:bookmarkEnd w:id="{}"/>"#, escape_xml(id)));
        }
        Block::Sdt(sdt) => write_sdt(out, sdt),
        Block::MathParagraph(math) => {
            out.push_str(&format!(
                r#"<m:oMathPara xmlns:m="{}">{}</m:oMathPara>"#,
                MATH_XMLNS, math.omml
            ));
        }
    }
}

pub(crate) fn write_paragraph(out: &mut String, paragraph: &Paragraph) {
    out.push_str("<w:p>");
    if let Some(props) = &paragraph.properties {
        write_paragraph_properties(out, props);
    }
    for run in &paragraph.runs {
        write_run(out, run);
    }
    out.push_str("</w:p>");
}

fn write_paragraph_properties(out: &mut String, props: &ParagraphProperties) {
    out.push_str("<w:pPr>");
    if let Some(style) = &props.style_id {
        out.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape_xml(style)));
    }
    if props.keep_next {
        out.push_str("<w:keepNext/>");
    }
    if props.keep_lines {
        out.push_str("<w:keepLines/>");
    }
    if props.page_break_before {
        out.push_str("<w:pageBreakBefore/>");
    }
    if props.widow_control {
        out.push_str("<w:widowControl/>");
    }
    if let Some(numbering) = &props.numbering {
        out.push_str(&format!(
            r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
            numbering.level, numbering.num_id
        ));
    }
    if let Some(spacing) = &props.spacing {
        out.push_str("<w:spacing");
        if let Some(before) = spacing.before {
            out.push_str(&format!(r#" w:before="{}""#, before));
        }
        if let Some(after) = spacing.after {
            out.push_str(&format!(r#" w:after="{}""#, after));
        }
        if let Some(line) = spacing.line {
            out.push_str(&format!(r#" w:line="{}" w:lineRule="auto""#, line));
        }
        out.push_str("/>");
    }
    if let Some(indent) = &props.indent {
        out.push_str("<w:ind");
        if let Some(left) = indent.left {
            out.push_str(&format!(r#" w:left="{}""#, left));
        }
        if let Some(right) = indent.right {
            out.push_str(&format!(r#" w:right="{}""#, right));
        }
        if let Some(first_line) = indent.first_line {
            out.push_str(&format!(r#" w:firstLine="{}""#, first_line));
        }
        out.push_str("/>");
    }
    if let Some(jc) = &props.justification {
        out.push_str(&format!(r#"<w:jc w:val="{}"/>"#, escape_xml(jc)));
    }
    if let Some(level) = props.outline_level {
        out.push_str(&format!(r#"<w:outlineLvl w:val="{}"/>"#, level));
    }
    out.push_str("</w:pPr>");
}

pub(crate) fn write_run(out: &mut String, run: &Run) {
    out.push_str("<w:r>");
    if let Some(props) = &run.properties {
        write_run_properties(out, props);
    }
    // Empty text never produces a w:t element
    if !run.text.is_empty() {
        let needs_preserve = run.text.starts_with(char::is_whitespace)
            || run.text.ends_with(char::is_whitespace);
        if needs_preserve {
            out.push_str(&format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape_xml(&run.text)
            ));
        } else {
            out.push_str(&format!("<w:t>{}</w:t>", escape_xml(&run.text)));
        }
    }
    if let Some(break_) = &run.break_ {
        match &break_.break_type {
            Some(t) => out.push_str(&format!(r#"<w:br w:type="{}"/>"#, escape_xml(t))),
            None => out.push_str("<w:br/>"),
        }
    }
    if let Some(drawing) = &run.drawing {
        write_drawing(out, drawing);
    }
    if let Some(field) = &run.field_char {
        out.push_str(&format!(
            r#"<w:fldChar w:fldCharType="{}"/>"#,
            escape_xml(&field.char_type)
        ));
    }
    if let Some(instr) = &run.instr_text {
        out.push_str(&format!(
            r#"<w:instrText xml:space="preserve">{}</w:instrText>"#,
            escape_xml(instr)
        ));
    }
    out.push_str("</w:r>");
}

/// Fixed sub-order: rFonts, b, bCs, i, iCs, u, strike, color, sz, szCs, highlight
fn write_run_properties(out: &mut String, props: &RunProperties) {
    out.push_str("<w:rPr>");
    if let Some(fonts) = &props.fonts {
        let f = escape_xml(fonts);
        out.push_str(&format!(
            r#"<w:rFonts w:ascii="{f}" w:hAnsi="{f}" w:eastAsia="{f}"/>"#
        ));
    }
    if props.bold {
        out.push_str("<w:b/>");
    }
    if props.bold_cs {
        out.push_str("<w:bCs/>");
    }
    if props.italic {
        out.push_str("<w:i/>");
    }
    if props.italic_cs {
        out.push_str("<w:iCs/>");
    }
    if let Some(underline) = &props.underline {
        out.push_str(&format!(r#"<w:u w:val="{}"/>"#, escape_xml(underline)));
    }
    if props.strike {
        out.push_str("<w:strike/>");
    }
    if let Some(color) = &props.color {
        out.push_str(&format!(r#"<w:color w:val="{}"/>"#, escape_xml(color)));
    }
    if let Some(size) = props.size {
        out.push_str(&format!(r#"<w:sz w:val="{}"/>"#, size));
    }
    if let Some(size_cs) = props.size_cs {
        out.push_str(&format!(r#"<w:szCs w:val="{}"/>"#, size_cs));
    }
    if let Some(highlight) = &props.highlight {
        out.push_str(&format!(r#"<w:highlight w:val="{}"/>"#, escape_xml(highlight)));
    }
    out.push_str("</w:rPr>");
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<w:tbl>");
    if let Some(props) = &table.properties {
        out.push_str("<w:tblPr>");
        if let Some(style) = &props.style_id {
            out.push_str(&format!(r#"<w:tblStyle w:val="{}"/>"#, escape_xml(style)));
        }
        if let Some(width) = &props.width {
            out.push_str(&format!(
                r#"<w:tblW w:w="{}" w:type="{}"/>"#,
                escape_xml(&width.value),
                escape_xml(&width.width_type)
            ));
        }
        if let Some(jc) = &props.justification {
            out.push_str(&format!(r#"<w:jc w:val="{}"/>"#, escape_xml(jc)));
        }
        if let Some(borders) = &props.borders {
            out.push_str("<w:tblBorders>");
            write_border(out, "w:top", borders.top.as_ref());
            write_border(out, "w:left", borders.left.as_ref());
            write_border(out, "w:bottom", borders.bottom.as_ref());
            write_border(out, "w:right", borders.right.as_ref());
            write_border(out, "w:insideH", borders.inside_h.as_ref());
            write_border(out, "w:insideV", borders.inside_v.as_ref());
            out.push_str("</w:tblBorders>");
        }
        if let Some(look) = &props.look {
            out.push_str(&format!(r#"<w:tblLook w:val="{}"/>"#, escape_xml(look)));
        }
        out.push_str("</w:tblPr>");
    }
    if !table.grid.is_empty() {
        out.push_str("<w:tblGrid>");
        for width in &table.grid {
            out.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, width));
        }
        out.push_str("</w:tblGrid>");
    }
    for row in &table.rows {
        write_table_row(out, row);
    }
    out.push_str("</w:tbl>");
}

fn write_border(out: &mut String, tag: &str, border: Option<&BorderSpec>) {
    if let Some(b) = border {
        out.push_str(&format!(
            r#"<{tag} w:val="{}" w:sz="{}" w:space="0" w:color="{}"/>"#,
            escape_xml(&b.style),
            b.size,
            escape_xml(&b.color)
        ));
    }
}

fn write_table_row(out: &mut String, row: &TableRow) {
    out.push_str("<w:tr>");
    for cell in &row.cells {
        write_table_cell(out, cell);
    }
    out.push_str("</w:tr>");
}

fn write_table_cell(out: &mut String, cell: &TableCell) {
    out.push_str("<w:tc>");
    if let Some(props) = &cell.properties {
        out.push_str("<w:tcPr>");
        if let Some(width) = &props.width {
            out.push_str(&format!(
                r#"<w:tcW w:w="{}" w:type="{}"/>"#,
                escape_xml(&width.value),
                escape_xml(&width.width_type)
            ));
        }
        if let Some(fill) = &props.shading {
            out.push_str(&format!(
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                escape_xml(fill)
            ));
        }
        out.push_str("</w:tcPr>");
    }
    // A cell must end with a paragraph; guard against empty content
    if cell.content.is_empty() {
        out.push_str("<w:p/>");
    }
    for item in &cell.content {
        match item {
            TableCellContent::Paragraph(p) => write_paragraph(out, p),
            TableCellContent::Table(t) => {
                write_table(out, t);
                // OOXML requires a paragraph after a nested table
                out.push_str("<w:p/>");
            }
        }
    }
    out.push_str("</w:tc>");
}

fn write_sdt(out: &mut String, sdt: &Sdt) {
    out.push_str("<w:sdt><w:sdtContent>");
    for block in &sdt.blocks {
        write_block(out, block);
    }
    out.push_str("</w:sdtContent></w:sdt>");
}

fn write_section_properties(out: &mut String, section: &SectionProperties) {
    out.push_str("<w:sectPr>");
    out.push_str(&format!(
        r#"<w:pgSz w:w="{}" w:h="{}"/>"#,
        section.page_width, section.page_height
    ));
    out.push_str(&format!(
        r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="{}"/>"#,
        section.margin_top,
        section.margin_right,
        section.margin_bottom,
        section.margin_left,
        section.header_margin,
        section.footer_margin,
        section.gutter
    ));
    out.push_str(&format!(r#"<w:cols w:space="{}"/>"#, section.cols_space));
    out.push_str(&format!(
        r#"<w:docGrid w:linePitch="{}"/>"#,
        section.doc_grid_line_pitch
    ));
    out.push_str("</w:sectPr>");
}

fn write_drawing(out: &mut String, drawing: &Drawing) {
    match &drawing.kind {
        DrawingKind::Inline => write_inline_drawing(out, drawing),
        DrawingKind::Anchor(config) => write_anchor_drawing(out, drawing, config),
    }
}

/// Numeric id for wp:docPr / pic:cNvPr, derived from the embed id
fn drawing_numeric_id(drawing: &Drawing) -> u32 {
    drawing
        .embed_id
        .strip_prefix("rId")
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}

fn write_inline_drawing(out: &mut String, drawing: &Drawing) {
    out.push_str(r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#);
    out.push_str(&format!(
        r#"<wp:extent cx="{}" cy="{}"/>"#,
        drawing.extent_cx, drawing.extent_cy
    ));
    write_doc_pr(out, drawing);
    write_graphic(out, drawing);
    out.push_str("</wp:inline></w:drawing>");
}

fn write_anchor_drawing(out: &mut String, drawing: &Drawing, config: &AnchorConfig) {
    out.push_str(&format!(
        r#"<w:drawing><wp:anchor distT="0" distB="0" distL="0" distR="0" simplePos="0" relativeHeight="251658240" behindDoc="0" locked="0" layoutInCell="1" allowOverlap="1"><wp:simplePos x="0" y="0"/>{}{}"#,
        position_h(config),
        position_v(config),
    ));
    out.push_str(&format!(
        r#"<wp:extent cx="{}" cy="{}"/><wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
        drawing.extent_cx, drawing.extent_cy
    ));
    write_wrap(out, config);
    write_doc_pr(out, drawing);
    out.push_str(
        r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
    );
    write_graphic(out, drawing);
    out.push_str("</wp:anchor></w:drawing>");
}

fn position_h(config: &AnchorConfig) -> String {
    let inner = if config.offset_x_emu != 0 {
        format!("<wp:posOffset>{}</wp:posOffset>", config.offset_x_emu)
    } else {
        let align = match config.position {
            ImagePosition::Left => "left",
            ImagePosition::Right => "right",
            ImagePosition::Center => "center",
        };
        format!("<wp:align>{}</wp:align>", align)
    };
    format!(r#"<wp:positionH relativeFrom="margin">{}</wp:positionH>"#, inner)
}

fn position_v(config: &AnchorConfig) -> String {
    let inner = if config.offset_y_emu != 0 {
        format!("<wp:posOffset>{}</wp:posOffset>", config.offset_y_emu)
    } else {
        "<wp:align>top</wp:align>".to_string()
    };
    format!(r#"<wp:positionV relativeFrom="margin">{}</wp:positionV>"#, inner)
}

fn write_wrap(out: &mut String, config: &AnchorConfig) {
    let wrap_text = match config.position {
        ImagePosition::Left => "right",
        ImagePosition::Right => "left",
        ImagePosition::Center => "bothSides",
    };
    match config.wrap {
        ImageWrap::None => out.push_str("<wp:wrapNone/>"),
        ImageWrap::Square => out.push_str(&format!(
            r#"<wp:wrapSquare wrapText="{}" distT="0" distB="0" distL="114300" distR="114300"/>"#,
            wrap_text
        )),
        ImageWrap::Tight => out.push_str(&format!(
            concat!(
                r#"<wp:wrapTight wrapText="{}" distL="114300" distR="114300">"#,
                r#"<wp:wrapPolygon edited="0"><wp:start x="0" y="0"/>"#,
                r#"<wp:lineTo x="0" y="21600"/><wp:lineTo x="21600" y="21600"/>"#,
                r#"<wp:lineTo x="21600" y="0"/><wp:lineTo x="0" y="0"/>"#,
                r#"</wp:wrapPolygon></wp:wrapTight>"#
            ),
            wrap_text
        )),
        ImageWrap::TopAndBottom => out.push_str(r#"<wp:wrapTopAndBottom distT="0" distB="0"/>"#),
    }
}

fn write_doc_pr(out: &mut String, drawing: &Drawing) {
    out.push_str(&format!(
        r#"<wp:docPr id="{}" name="{}" descr="{}"/>"#,
        drawing_numeric_id(drawing),
        escape_xml(&drawing.name),
        escape_xml(&drawing.descr)
    ));
}

fn write_graphic(out: &mut String, drawing: &Drawing) {
    let id = drawing_numeric_id(drawing);
    out.push_str(&format!(
        concat!(
            r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
            r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="{name}" descr="{descr}"/>"#,
            r#"<pic:cNvPicPr><a:picLocks noChangeAspect="1"/></pic:cNvPicPr></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{embed}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic>"#
        ),
        id = id,
        name = escape_xml(&drawing.name),
        descr = escape_xml(&drawing.descr),
        embed = escape_xml(&drawing.embed_id),
        cx = drawing.extent_cx,
        cy = drawing.extent_cy,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Break, FieldChar, Numbering, Spacing};
    use crate::parser::parse_document_xml;

    fn body_of(blocks: Vec<Block>) -> Body {
        Body { blocks }
    }

    #[test]
    fn test_sect_pr_is_emitted_last() {
        let body = body_of(vec![
            Block::SectionProperties(SectionProperties::default()),
            Block::Paragraph(Paragraph::with_text("first")),
            Block::Paragraph(Paragraph::with_text("second")),
        ]);
        let xml = serialize_document_xml(&body);
        let sect_pos = xml.find("<w:sectPr>").unwrap();
        let last_para_pos = xml.rfind("second").unwrap();
        assert!(sect_pos > last_para_pos);
        assert!(xml.ends_with("</w:sectPr></w:body></w:document>"));
    }

    #[test]
    fn test_multiple_sect_pr_last_one_wins() {
        let mut custom = SectionProperties::default();
        custom.page_width = 99999;
        let body = body_of(vec![
            Block::SectionProperties(SectionProperties::default()),
            Block::Paragraph(Paragraph::with_text("x")),
            Block::SectionProperties(custom),
        ]);
        let xml = serialize_document_xml(&body);
        assert_eq!(xml.matches("<w:sectPr>").count(), 1);
        assert!(xml.contains(r#"<w:pgSz w:w="99999""#));
    }

    #[test]
    fn test_empty_text_suppressed() {
        let run = Run {
            properties: Some(RunProperties {
                bold: true,
                ..Default::default()
            }),
            break_: Some(Break { break_type: None }),
            ..Default::default()
        };
        let mut out = String::new();
        write_run(&mut out, &run);
        assert!(!out.contains("<w:t"));
        assert!(out.contains("<w:br/>"));
    }

    #[test]
    fn test_text_whitespace_preserved() {
        let mut out = String::new();
        write_run(&mut out, &Run::text("Hello "));
        assert!(out.contains(r#"<w:t xml:space="preserve">Hello </w:t>"#));

        let mut out = String::new();
        write_run(&mut out, &Run::text("Hello"));
        assert!(out.contains("<w:t>Hello</w:t>"));
    }

    #[test]
    fn test_run_properties_fixed_order() {
        let props = RunProperties {
            highlight: Some("yellow".to_string()),
            size: Some(24),
            color: Some("FF0000".to_string()),
            bold: true,
            italic: true,
            fonts: Some("Arial".to_string()),
            ..Default::default()
        };
        let mut out = String::new();
        write_run_properties(&mut out, &props);

        let order = ["<w:rFonts", "<w:b/>", "<w:i/>", "<w:color", "<w:sz ", "<w:highlight"];
        let mut last = 0;
        for needle in order {
            let pos = out.find(needle).unwrap_or_else(|| panic!("missing {}", needle));
            assert!(pos >= last, "{} out of order in {}", needle, out);
            last = pos;
        }
    }

    #[test]
    fn test_run_content_order() {
        let run = Run {
            properties: Some(RunProperties {
                bold: true,
                ..Default::default()
            }),
            text: "field".to_string(),
            field_char: Some(FieldChar {
                char_type: "begin".to_string(),
            }),
            instr_text: Some(" PAGE ".to_string()),
            ..Default::default()
        };
        let mut out = String::new();
        write_run(&mut out, &run);

        let rpr = out.find("<w:rPr>").unwrap();
        let t = out.find("<w:t>").unwrap();
        let fld = out.find("<w:fldChar").unwrap();
        let instr = out.find("<w:instrText").unwrap();
        assert!(rpr < t && t < fld && fld < instr);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut out = String::new();
        write_run(&mut out, &Run::text("a < b & c"));
        assert!(out.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_paragraph_properties_order() {
        let props = ParagraphProperties {
            style_id: Some("Heading1".to_string()),
            justification: Some("center".to_string()),
            spacing: Some(Spacing {
                before: Some(240),
                after: Some(120),
                line: None,
            }),
            numbering: Some(Numbering { num_id: 2, level: 0 }),
            outline_level: Some(0),
            keep_next: true,
            ..Default::default()
        };
        let mut out = String::new();
        write_paragraph_properties(&mut out, &props);

        let style = out.find("<w:pStyle").unwrap();
        let keep = out.find("<w:keepNext/>").unwrap();
        let num = out.find("<w:numPr>").unwrap();
        let spacing = out.find("<w:spacing").unwrap();
        let jc = out.find("<w:jc").unwrap();
        let outline = out.find("<w:outlineLvl").unwrap();
        assert!(style < keep && keep < num && num < spacing && spacing < jc && jc < outline);
    }

    #[test]
    fn test_round_trip_structure() {
        let body = body_of(vec![
            Block::Paragraph(Paragraph {
                properties: Some(ParagraphProperties {
                    style_id: Some("Heading1".to_string()),
                    ..Default::default()
                }),
                runs: vec![
                    Run::styled(
                        "Hello ",
                        RunProperties {
                            bold: true,
                            ..Default::default()
                        },
                    ),
                    Run::text("world"),
                ],
            }),
            Block::BookmarkStart {
                id: "0".to_string(),
                name: "anchor".to_string(),
            },
            Block::BookmarkEnd { id: "0".to_string() },
            Block::SectionProperties(SectionProperties::default()),
        ]);

        let xml = serialize_document_xml(&body);
        let reparsed = parse_document_xml(xml.as_bytes()).unwrap();

        assert_eq!(reparsed.blocks.len(), body.blocks.len());
        let Block::Paragraph(p) = &reparsed.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.plain_text(), "Hello world");
        assert_eq!(p.runs[0].text, "Hello ");
        assert!(p.runs[0].properties.as_ref().unwrap().bold);
        assert_eq!(
            p.properties.as_ref().unwrap().style_id.as_deref(),
            Some("Heading1")
        );
        assert_eq!(reparsed.section(), Some(&SectionProperties::default()));
    }

    #[test]
    fn test_table_round_trip() {
        let table = Table {
            properties: Some(crate::document::TableProperties {
                style_id: Some("TableGrid".to_string()),
                width: Some(crate::document::TableWidth {
                    value: "5000".to_string(),
                    width_type: "pct".to_string(),
                }),
                ..Default::default()
            }),
            grid: vec![4788, 4788],
            rows: vec![TableRow {
                cells: vec![TableCell::with_text("a"), TableCell::with_text("b")],
            }],
        };
        let body = body_of(vec![Block::Table(table)]);
        let xml = serialize_document_xml(&body);
        let reparsed = parse_document_xml(xml.as_bytes()).unwrap();

        let Block::Table(t) = &reparsed.blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(t.grid, vec![4788, 4788]);
        assert_eq!(t.rows[0].cells.len(), 2);
        assert_eq!(t.rows[0].cells[0].plain_text(), "a");
        assert_eq!(
            t.properties.as_ref().unwrap().style_id.as_deref(),
            Some("TableGrid")
        );
    }

    #[test]
    fn test_inline_drawing_round_trip() {
        let drawing = Drawing {
            kind: DrawingKind::Inline,
            extent_cx: 914400,
            extent_cy: 457200,
            name: "Picture 3".to_string(),
            descr: "logo".to_string(),
            embed_id: "rId3".to_string(),
        };
        let body = body_of(vec![Block::Paragraph(Paragraph {
            properties: None,
            runs: vec![Run::drawing(drawing.clone())],
        })]);
        let xml = serialize_document_xml(&body);
        assert!(xml.contains(r#"<a:blip r:embed="rId3"/>"#));

        let reparsed = parse_document_xml(xml.as_bytes()).unwrap();
        let Block::Paragraph(p) = &reparsed.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs[0].drawing.as_deref(), Some(&drawing));
    }

    #[test]
    fn test_anchor_drawing_round_trip() {
        let drawing = Drawing {
            kind: DrawingKind::Anchor(AnchorConfig {
                position: ImagePosition::Right,
                wrap: ImageWrap::Square,
                offset_x_emu: 0,
                offset_y_emu: 0,
            }),
            extent_cx: 914400,
            extent_cy: 914400,
            name: "Picture 4".to_string(),
            descr: String::new(),
            embed_id: "rId4".to_string(),
        };
        let body = body_of(vec![Block::Paragraph(Paragraph {
            properties: None,
            runs: vec![Run::drawing(drawing.clone())],
        })]);
        let xml = serialize_document_xml(&body);
        assert!(xml.contains("<wp:anchor"));
        assert!(xml.contains(r#"wrapText="left""#));

        let reparsed = parse_document_xml(xml.as_bytes()).unwrap();
        let Block::Paragraph(p) = &reparsed.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs[0].drawing.as_deref(), Some(&drawing));
    }

    #[test]
    fn test_sdt_round_trip() {
        let body = body_of(vec![Block::Sdt(Sdt {
            blocks: vec![Block::Paragraph(Paragraph::with_text("tagged"))],
        })]);
        let xml = serialize_document_xml(&body);
        let reparsed = parse_document_xml(xml.as_bytes()).unwrap();
        let Block::Sdt(sdt) = &reparsed.blocks[0] else {
            panic!("expected sdt");
        };
        assert_eq!(sdt.blocks.len(), 1);
    }
}
