//! XML codec, parse direction: `word/document.xml` bytes into the object graph
//!
//! One recursive-descent frame per element type over a streaming
//! `quick_xml` reader. Unknown elements at any level are skipped as opaque
//! subtrees, which is what keeps partial schema coverage safe: anything the
//! model does not know simply disappears instead of failing the parse.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::{
    AnchorConfig, Block, Body, BorderSpec, Break, Drawing, DrawingKind, FieldChar, ImagePosition,
    ImageWrap, Indent, MathParagraph, Numbering, Paragraph, ParagraphProperties, Run,
    RunProperties, Sdt, SectionProperties, Spacing, Table, TableBorders, TableCell,
    TableCellContent, TableCellProperties, TableProperties, TableRow, TableWidth,
};
use crate::error::{DocxError, Result};
use crate::xml::get_attr;

type SliceReader<'a> = Reader<&'a [u8]>;

/// Parse the main document part into a body block sequence
pub(crate) fn parse_document_xml(xml: &[u8]) -> Result<Body> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut body = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"body" => {
                body = Some(Body {
                    blocks: parse_blocks(&mut reader, xml, b"body")?,
                });
            }
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"body" => {
                body = Some(Body::default());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    body.ok_or_else(|| DocxError::InvalidStructure("document has no w:body element".to_string()))
}

/// Parse block-level children until the named closing tag
///
/// Shared by `w:body` and `w:sdtContent`, which carry the same content model.
fn parse_blocks(reader: &mut SliceReader, xml: &[u8], end: &[u8]) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => blocks.push(Block::Paragraph(parse_paragraph(reader)?)),
                b"tbl" => blocks.push(Block::Table(parse_table(reader)?)),
                b"sectPr" => {
                    blocks.push(Block::SectionProperties(parse_section_properties(reader)?))
                }
                b"sdt" => blocks.push(Block::Sdt(parse_sdt(reader, xml)?)),
                b"oMathPara" => {
                    let close = e.to_end().into_owned();
                    let mut skip = Vec::new();
                    let span = reader.read_to_end_into(close.name(), &mut skip)?;
                    blocks.push(Block::MathParagraph(MathParagraph {
                        omml: String::from_utf8_lossy(&xml[span.start as usize..span.end as usize])
                            .into_owned(),
                    }));
                }
                _ => skip_element(reader, e)?,
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"p" => blocks.push(Block::Paragraph(Paragraph::default())),
                b"sectPr" => {
                    blocks.push(Block::SectionProperties(SectionProperties::default()))
                }
                b"bookmarkStart" => blocks.push(Block::BookmarkStart {
                    id: get_attr(e, b"w:id").unwrap_or_default(),
                    name: get_attr(e, b"w:name").unwrap_or_default(),
                }),
                b"bookmarkEnd" => blocks.push(Block::BookmarkEnd {
                    id: get_attr(e, b"w:id").unwrap_or_default(),
                }),
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == end => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(format!(
                    "unexpected end of document inside {}",
                    String::from_utf8_lossy(end)
                )))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(blocks)
}

fn parse_paragraph(reader: &mut SliceReader) -> Result<Paragraph> {
    let mut paragraph = Paragraph::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"pPr" => paragraph.properties = Some(parse_paragraph_properties(reader)?),
                b"r" => paragraph.runs.push(parse_run(reader)?),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"r" => {
                paragraph.runs.push(Run::default());
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"p" => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:p".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraph)
}

fn parse_paragraph_properties(reader: &mut SliceReader) -> Result<ParagraphProperties> {
    let mut props = ParagraphProperties::default();
    let mut buf = Vec::new();
    let mut in_num_pr = false;
    let mut num_id = None;
    let mut num_level = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"pStyle" => props.style_id = get_attr(e, b"w:val"),
                    b"jc" => props.justification = get_attr(e, b"w:val"),
                    b"spacing" => {
                        props.spacing = Some(Spacing {
                            before: parse_num(get_attr(e, b"w:before")),
                            after: parse_num(get_attr(e, b"w:after")),
                            line: parse_num(get_attr(e, b"w:line")),
                        });
                    }
                    b"ind" => {
                        props.indent = Some(Indent {
                            left: parse_num(get_attr(e, b"w:left"))
                                .or_else(|| parse_num(get_attr(e, b"w:start"))),
                            right: parse_num(get_attr(e, b"w:right"))
                                .or_else(|| parse_num(get_attr(e, b"w:end"))),
                            first_line: parse_num(get_attr(e, b"w:firstLine")),
                        });
                    }
                    b"outlineLvl" => props.outline_level = parse_num(get_attr(e, b"w:val")),
                    b"keepNext" => props.keep_next = on_off(e),
                    b"keepLines" => props.keep_lines = on_off(e),
                    b"pageBreakBefore" => props.page_break_before = on_off(e),
                    b"widowControl" => props.widow_control = on_off(e),
                    b"numPr" => in_num_pr = true,
                    b"ilvl" if in_num_pr => num_level = parse_num(get_attr(e, b"w:val")),
                    b"numId" if in_num_pr => num_id = parse_num(get_attr(e, b"w:val")),
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"numPr" => in_num_pr = false,
                b"pPr" => break,
                _ => {}
            },
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:pPr".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    if let Some(num_id) = num_id {
        props.numbering = Some(Numbering {
            num_id,
            level: num_level.unwrap_or(0),
        });
    }

    Ok(props)
}

fn parse_run(reader: &mut SliceReader) -> Result<Run> {
    let mut run = Run::default();
    let mut buf = Vec::new();
    // Which text-bearing element we are currently inside, if any
    enum TextSink {
        None,
        Text,
        Instr,
    }
    let mut sink = TextSink::None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"rPr" => run.properties = Some(parse_run_properties(reader)?),
                b"t" => sink = TextSink::Text,
                b"instrText" => {
                    sink = TextSink::Instr;
                    if run.instr_text.is_none() {
                        run.instr_text = Some(String::new());
                    }
                }
                b"drawing" => run.drawing = Some(Box::new(parse_drawing(reader)?)),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"br" => {
                    run.break_ = Some(Break {
                        break_type: get_attr(e, b"w:type"),
                    })
                }
                b"fldChar" => {
                    run.field_char = Some(FieldChar {
                        char_type: get_attr(e, b"w:fldCharType").unwrap_or_default(),
                    })
                }
                b"t" => {}
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().unwrap_or_default();
                match sink {
                    TextSink::Text => run.text.push_str(&text),
                    TextSink::Instr => {
                        if let Some(instr) = run.instr_text.as_mut() {
                            instr.push_str(&text);
                        }
                    }
                    TextSink::None => {}
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" | b"instrText" => sink = TextSink::None,
                b"r" => break,
                _ => {}
            },
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:r".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(run)
}

fn parse_run_properties(reader: &mut SliceReader) -> Result<RunProperties> {
    let mut props = RunProperties::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"rFonts" => {
                    props.fonts = get_attr(e, b"w:ascii").or_else(|| get_attr(e, b"w:hAnsi"))
                }
                b"b" => props.bold = on_off(e),
                b"bCs" => props.bold_cs = on_off(e),
                b"i" => props.italic = on_off(e),
                b"iCs" => props.italic_cs = on_off(e),
                b"u" => props.underline = get_attr(e, b"w:val").or(Some("single".to_string())),
                b"strike" => props.strike = on_off(e),
                b"color" => props.color = get_attr(e, b"w:val"),
                b"sz" => props.size = parse_num(get_attr(e, b"w:val")),
                b"szCs" => props.size_cs = parse_num(get_attr(e, b"w:val")),
                b"highlight" => props.highlight = get_attr(e, b"w:val"),
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"rPr" => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:rPr".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(props)
}

fn parse_table(reader: &mut SliceReader) -> Result<Table> {
    let mut table = Table::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"tblPr" => table.properties = Some(parse_table_properties(reader)?),
                b"tblGrid" => table.grid = parse_table_grid(reader)?,
                b"tr" => table.rows.push(parse_table_row(reader)?),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"tbl" => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:tbl".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(table)
}

fn parse_table_properties(reader: &mut SliceReader) -> Result<TableProperties> {
    let mut props = TableProperties::default();
    let mut buf = Vec::new();
    let mut in_borders = false;
    let mut borders = TableBorders::default();
    let mut saw_border = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tblStyle" => props.style_id = get_attr(e, b"w:val"),
                b"tblW" => props.width = parse_width(e),
                b"jc" => props.justification = get_attr(e, b"w:val"),
                b"tblLook" => props.look = get_attr(e, b"w:val"),
                b"tblBorders" => in_borders = true,
                b"top" if in_borders => set_border(&mut borders.top, e, &mut saw_border),
                b"left" if in_borders => set_border(&mut borders.left, e, &mut saw_border),
                b"bottom" if in_borders => set_border(&mut borders.bottom, e, &mut saw_border),
                b"right" if in_borders => set_border(&mut borders.right, e, &mut saw_border),
                b"insideH" if in_borders => set_border(&mut borders.inside_h, e, &mut saw_border),
                b"insideV" if in_borders => set_border(&mut borders.inside_v, e, &mut saw_border),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"tblBorders" => in_borders = false,
                b"tblPr" => break,
                _ => {}
            },
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:tblPr".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    if saw_border {
        props.borders = Some(borders);
    }
    Ok(props)
}

fn parse_table_grid(reader: &mut SliceReader) -> Result<Vec<u32>> {
    let mut grid = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"gridCol" =>
            {
                if let Some(w) = parse_num(get_attr(e, b"w:w")) {
                    grid.push(w);
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"tblGrid" => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:tblGrid".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(grid)
}

fn parse_table_row(reader: &mut SliceReader) -> Result<TableRow> {
    let mut row = TableRow::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"tc" => row.cells.push(parse_table_cell(reader)?),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"tr" => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:tr".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(row)
}

fn parse_table_cell(reader: &mut SliceReader) -> Result<TableCell> {
    let mut cell = TableCell::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"tcPr" => cell.properties = Some(parse_cell_properties(reader)?),
                b"p" => cell
                    .content
                    .push(TableCellContent::Paragraph(parse_paragraph(reader)?)),
                b"tbl" => cell
                    .content
                    .push(TableCellContent::Table(parse_table(reader)?)),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"p" => {
                cell.content
                    .push(TableCellContent::Paragraph(Paragraph::default()));
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"tc" => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:tc".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(cell)
}

fn parse_cell_properties(reader: &mut SliceReader) -> Result<TableCellProperties> {
    let mut props = TableCellProperties::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tcW" => props.width = parse_width(e),
                b"shd" => props.shading = get_attr(e, b"w:fill"),
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"tcPr" => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:tcPr".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(props)
}

fn parse_section_properties(reader: &mut SliceReader) -> Result<SectionProperties> {
    let mut section = SectionProperties::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"pgSz" => {
                    if let Some(w) = parse_num(get_attr(e, b"w:w")) {
                        section.page_width = w;
                    }
                    if let Some(h) = parse_num(get_attr(e, b"w:h")) {
                        section.page_height = h;
                    }
                }
                b"pgMar" => {
                    if let Some(v) = parse_num(get_attr(e, b"w:top")) {
                        section.margin_top = v;
                    }
                    if let Some(v) = parse_num(get_attr(e, b"w:right")) {
                        section.margin_right = v;
                    }
                    if let Some(v) = parse_num(get_attr(e, b"w:bottom")) {
                        section.margin_bottom = v;
                    }
                    if let Some(v) = parse_num(get_attr(e, b"w:left")) {
                        section.margin_left = v;
                    }
                    if let Some(v) = parse_num(get_attr(e, b"w:header")) {
                        section.header_margin = v;
                    }
                    if let Some(v) = parse_num(get_attr(e, b"w:footer")) {
                        section.footer_margin = v;
                    }
                    if let Some(v) = parse_num(get_attr(e, b"w:gutter")) {
                        section.gutter = v;
                    }
                }
                b"cols" => {
                    if let Some(v) = parse_num(get_attr(e, b"w:space")) {
                        section.cols_space = v;
                    }
                }
                b"docGrid" => {
                    if let Some(v) = parse_num(get_attr(e, b"w:linePitch")) {
                        section.doc_grid_line_pitch = v;
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sectPr" => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:sectPr".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(section)
}

fn parse_sdt(reader: &mut SliceReader, xml: &[u8]) -> Result<Sdt> {
    let mut sdt = Sdt::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"sdtContent" => sdt.blocks = parse_blocks(reader, xml, b"sdtContent")?,
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sdt" => break,
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:sdt".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(sdt)
}

/// Recover embed id, geometry and placement from a `w:drawing` subtree
///
/// The DrawingML tree is deep (inline/anchor, graphic, graphicData, pic);
/// rather than mirroring every level, this walks the subtree watching for
/// the handful of elements the model keeps.
fn parse_drawing(reader: &mut SliceReader) -> Result<Drawing> {
    let mut drawing = Drawing {
        kind: DrawingKind::Inline,
        extent_cx: 0,
        extent_cy: 0,
        name: String::new(),
        descr: String::new(),
        embed_id: String::new(),
    };
    let mut anchor = AnchorConfig::default();
    let mut is_anchor = false;
    // 0 = none, 1 = horizontal, 2 = vertical
    let mut pos_axis = 0u8;
    let mut in_pos_offset = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"anchor" => is_anchor = true,
                b"extent" => {
                    drawing.extent_cx = parse_num(get_attr(e, b"cx")).unwrap_or(0);
                    drawing.extent_cy = parse_num(get_attr(e, b"cy")).unwrap_or(0);
                }
                b"docPr" => {
                    drawing.name = get_attr(e, b"name").unwrap_or_default();
                    drawing.descr = get_attr(e, b"descr").unwrap_or_default();
                }
                b"blip" => {
                    if let Some(embed) = get_attr(e, b"r:embed") {
                        drawing.embed_id = embed;
                    }
                }
                b"positionH" => pos_axis = 1,
                b"positionV" => pos_axis = 2,
                b"posOffset" => in_pos_offset = true,
                b"align" => {}
                b"wrapNone" => anchor.wrap = ImageWrap::None,
                b"wrapSquare" => anchor.wrap = ImageWrap::Square,
                b"wrapTight" => anchor.wrap = ImageWrap::Tight,
                b"wrapTopAndBottom" => anchor.wrap = ImageWrap::TopAndBottom,
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().unwrap_or_default();
                let text = text.trim();
                if in_pos_offset {
                    let offset = text.parse().unwrap_or(0);
                    match pos_axis {
                        1 => anchor.offset_x_emu = offset,
                        2 => anchor.offset_y_emu = offset,
                        _ => {}
                    }
                } else if pos_axis == 1 {
                    match text {
                        "left" => anchor.position = ImagePosition::Left,
                        "right" => anchor.position = ImagePosition::Right,
                        "center" => anchor.position = ImagePosition::Center,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"positionH" | b"positionV" => pos_axis = 0,
                b"posOffset" => in_pos_offset = false,
                b"drawing" => break,
                _ => {}
            },
            Ok(Event::Eof) => {
                return Err(DocxError::InvalidStructure(
                    "unexpected end of document inside w:drawing".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    if is_anchor {
        drawing.kind = DrawingKind::Anchor(anchor);
    }
    Ok(drawing)
}

/// Skip an unrecognized element and its whole subtree
fn skip_element(reader: &mut SliceReader, start: &BytesStart) -> Result<()> {
    let close = start.to_end().into_owned();
    let mut buf = Vec::new();
    reader.read_to_end_into(close.name(), &mut buf)?;
    Ok(())
}

/// `w:val`-style toggles: absent or anything but 0/false means on
fn on_off(e: &BytesStart) -> bool {
    !matches!(get_attr(e, b"w:val").as_deref(), Some("0") | Some("false"))
}

fn parse_width(e: &BytesStart) -> Option<TableWidth> {
    Some(TableWidth {
        value: get_attr(e, b"w:w")?,
        width_type: get_attr(e, b"w:type").unwrap_or_else(|| "dxa".to_string()),
    })
}

fn set_border(slot: &mut Option<BorderSpec>, e: &BytesStart, saw: &mut bool) {
    *saw = true;
    *slot = Some(BorderSpec {
        style: get_attr(e, b"w:val").unwrap_or_else(|| "single".to_string()),
        size: parse_num(get_attr(e, b"w:sz")).unwrap_or(4),
        color: get_attr(e, b"w:color").unwrap_or_else(|| "auto".to_string()),
    });
}

fn parse_num<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}
