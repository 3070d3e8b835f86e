//! Template engine tests through the public API
//!
//! Covers the full pipeline: load a template (text or document), render
//! with data, and check the resulting text or document structure.

use std::io::Cursor;

use docforge_ooxml::{
    Block, Document, DocxError, ImageReference, Paragraph, Run, RunProperties, Table, TableCell,
    TableRow, TemplateData, TemplateEngine,
};
use serde_json::json;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::new(width, height);
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

mod text_rendering {
    use super::*;

    #[test]
    fn variables_conditionals_and_loops_together() {
        let engine = TemplateEngine::new();
        engine
            .load_template(
                "report",
                "Report for {{customer}}\n\
                 {{#if overdue}}OVERDUE{{else}}on time{{/if}}\n\
                 {{#each lines}}{{@index}}: {{name}} x{{qty}}\n{{/each}}",
            )
            .unwrap();

        let mut data = TemplateData::new();
        data.set_variable("customer", "ACME");
        data.set_condition("overdue", false);
        data.set_list(
            "lines",
            vec![json!({"name": "bolt", "qty": 4}), json!({"name": "nut", "qty": 2})],
        );

        let out = engine.render("report", &data).unwrap();
        assert_eq!(
            out,
            "Report for ACME\non time\n0: bolt x4\n1: nut x2\n"
        );
    }

    #[test]
    fn unknown_variables_pass_through() {
        let engine = TemplateEngine::new();
        engine.load_template("t", "{{known}} and {{unknown}}").unwrap();
        let mut data = TemplateData::new();
        data.set_variable("known", "yes");
        assert_eq!(engine.render("t", &data).unwrap(), "yes and {{unknown}}");
    }

    #[test]
    fn inheritance_renders_child_blocks_in_parent_layout() {
        let engine = TemplateEngine::new();
        engine
            .load_template(
                "layout",
                "== {{#block \"title\"}}Untitled{{/block}} ==\n{{#block \"content\"}}{{/block}}\n-- footer --",
            )
            .unwrap();
        engine
            .load_template(
                "page",
                "{{extends \"layout\"}}{{#block \"title\"}}Home{{/block}}{{#block \"content\"}}Welcome, {{user}}.{{/block}}",
            )
            .unwrap();

        let mut data = TemplateData::new();
        data.set_variable("user", "Ada");
        assert_eq!(
            engine.render("page", &data).unwrap(),
            "== Home ==\nWelcome, Ada.\n-- footer --"
        );
    }

    #[test]
    fn rendering_unknown_template_fails() {
        let engine = TemplateEngine::new();
        assert!(matches!(
            engine.render("ghost", &TemplateData::new()),
            Err(DocxError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn unbalanced_template_is_rejected_at_load() {
        let engine = TemplateEngine::new();
        assert!(engine.load_template("bad", "{{#if x}}no close").is_err());
        assert!(engine.load_template("bad2", "{{oops}").is_err());
        assert!(!engine.has_template("bad"));
    }

    #[test]
    fn from_struct_data_feeds_a_render() {
        #[derive(serde::Serialize)]
        struct Ctx {
            name: String,
            premium: bool,
            tags: Vec<String>,
        }

        let engine = TemplateEngine::new();
        engine
            .load_template(
                "t",
                "{{name}}{{#if premium}} [premium]{{/if}}:{{#each tags}} {{this}}{{/each}}",
            )
            .unwrap();

        let data = TemplateData::from_struct(&Ctx {
            name: "Ada".to_string(),
            premium: true,
            tags: vec!["a".to_string(), "b".to_string()],
        })
        .unwrap();
        assert_eq!(engine.render("t", &data).unwrap(), "Ada [premium]: a b");
    }
}

mod document_rendering {
    use super::*;

    fn styled_template_document() -> Document {
        let mut doc = Document::new();
        let p = doc.add_paragraph("");
        p.runs = vec![
            Run::styled(
                "Dear ",
                RunProperties {
                    bold: true,
                    ..Default::default()
                },
            ),
            Run::styled(
                "{{name}},",
                RunProperties {
                    italic: true,
                    ..Default::default()
                },
            ),
        ];
        doc.add_paragraph("{{#if vip}}A table is reserved for you.{{/if}}");
        doc
    }

    #[test]
    fn document_render_keeps_run_styling() {
        let engine = TemplateEngine::new();
        engine
            .load_template_from_document("letter", &styled_template_document())
            .unwrap();

        let mut data = TemplateData::new();
        data.set_variable("name", "Ada");
        data.set_condition("vip", true);
        let rendered = engine.render_to_document("letter", &data).unwrap();

        let first = rendered.body.paragraphs().next().unwrap();
        assert_eq!(first.plain_text(), "Dear Ada,");
        assert_eq!(first.runs.len(), 3);
        assert!(first.runs[0].properties.as_ref().unwrap().bold);
        assert!(first.runs[1].properties.as_ref().unwrap().italic);
        assert!(first.runs[2].properties.as_ref().unwrap().italic);
        assert_eq!(
            rendered.body_text(),
            "Dear Ada,\nA table is reserved for you."
        );
    }

    #[test]
    fn rendered_document_survives_save_and_reopen() {
        let engine = TemplateEngine::new();
        engine
            .load_template_from_document("letter", &styled_template_document())
            .unwrap();

        let mut data = TemplateData::new();
        data.set_variable("name", "Grace");
        data.set_condition("vip", false);
        let rendered = engine.render_to_document("letter", &data).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.docx");
        rendered.save(&path).unwrap();
        let reopened = Document::open(&path).unwrap();
        assert_eq!(reopened.body_text(), "Dear Grace,\n");
    }

    #[test]
    fn table_row_loop_expands_per_item() {
        let mut doc = Document::new();
        let mut table = Table::default();
        table.rows.push(TableRow {
            cells: vec![TableCell::with_text("Item"), TableCell::with_text("Qty")],
        });
        table.rows.push(TableRow {
            cells: vec![
                TableCell::with_text("{{#each lines}}{{name}}"),
                TableCell::with_text("{{qty}}{{/each}}"),
            ],
        });
        doc.add_table(table);

        let engine = TemplateEngine::new();
        engine.load_template_from_document("invoice", &doc).unwrap();

        let mut data = TemplateData::new();
        data.set_list(
            "lines",
            vec![
                json!({"name": "bolt", "qty": 4}),
                json!({"name": "nut", "qty": 2}),
                json!({"name": "washer", "qty": 7}),
            ],
        );
        let rendered = engine.render_to_document("invoice", &data).unwrap();

        let table = rendered
            .body
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0].cells[0].plain_text(), "Item");
        assert_eq!(table.rows[2].cells[0].plain_text(), "nut");
        assert_eq!(table.rows[3].cells[1].plain_text(), "7");
    }

    #[test]
    fn paragraph_loop_expands_and_missing_list_disappears() {
        let mut doc = Document::new();
        doc.add_paragraph("Attendees:");
        doc.add_paragraph("{{#each people}}");
        doc.add_paragraph("* {{this}}");
        doc.add_paragraph("{{/each}}");
        doc.add_paragraph("{{#each ghosts}}");
        doc.add_paragraph("never rendered");
        doc.add_paragraph("{{/each}}");

        let engine = TemplateEngine::new();
        engine.load_template_from_document("list", &doc).unwrap();

        let mut data = TemplateData::new();
        data.set_list("people", vec!["Ada", "Grace"]);
        let rendered = engine.render_to_document("list", &data).unwrap();
        assert_eq!(rendered.body_text(), "Attendees:\n* Ada\n* Grace");
    }

    #[test]
    fn image_placeholder_becomes_a_drawing() {
        let mut doc = Document::new();
        doc.add_paragraph("Signature: {{#image signature}}");

        let engine = TemplateEngine::new();
        engine.load_template_from_document("form", &doc).unwrap();

        let mut data = TemplateData::new();
        data.set_image(
            "signature",
            ImageReference {
                data: png_bytes(8, 4),
                ..Default::default()
            },
        );
        let rendered = engine.render_to_document("form", &data).unwrap();

        let paragraphs: Vec<&Paragraph> = rendered.body.paragraphs().collect();
        assert!(paragraphs
            .iter()
            .any(|p| p.runs.iter().any(|r| r.drawing.is_some())));
        assert!(rendered.archive.contains("word/media/image0.png"));

        // the drawing survives a save/open cycle
        let reopened = Document::from_bytes(&rendered.to_bytes().unwrap()).unwrap();
        assert!(reopened
            .body
            .paragraphs()
            .any(|p| p.runs.iter().any(|r| r.drawing.is_some())));
        assert!(reopened.archive.contains("word/media/image0.png"));
    }

    #[test]
    fn missing_image_leaves_a_visible_marker() {
        let mut doc = Document::new();
        doc.add_paragraph("{{#image nowhere}}");

        let engine = TemplateEngine::new();
        engine.load_template_from_document("form", &doc).unwrap();
        let rendered = engine
            .render_to_document("form", &TemplateData::new())
            .unwrap();
        assert_eq!(rendered.body_text(), "[image not found: nowhere]");
    }

    #[test]
    fn text_template_renders_to_fresh_document() {
        let engine = TemplateEngine::new();
        engine
            .load_template("memo", "To: {{to}}\nFrom: {{from}}")
            .unwrap();

        let mut data = TemplateData::new();
        data.set_variable("to", "All");
        data.set_variable("from", "Ops");
        let rendered = engine.render_to_document("memo", &data).unwrap();
        assert_eq!(rendered.body_text(), "To: All\nFrom: Ops");
    }
}

mod engine_management {
    use super::*;

    #[test]
    fn templates_can_be_listed_and_removed() {
        let engine = TemplateEngine::new();
        engine.load_template("b", "B").unwrap();
        engine.load_template("a", "A").unwrap();

        assert_eq!(engine.list_templates(), vec!["a", "b"]);
        assert!(engine.validate_template("a").is_ok());
        assert!(engine.remove_template("a"));
        assert!(!engine.remove_template("a"));
        assert_eq!(engine.list_templates(), vec!["b"]);
    }

    #[test]
    fn reloading_replaces_the_cached_template() {
        let engine = TemplateEngine::new();
        engine.load_template("t", "old {{x}}").unwrap();
        engine.load_template("t", "new {{x}}").unwrap();

        let mut data = TemplateData::new();
        data.set_variable("x", "!");
        assert_eq!(engine.render("t", &data).unwrap(), "new !");
    }

    #[test]
    fn template_inventory_is_exposed() {
        let engine = TemplateEngine::new();
        let template = engine
            .load_template("t", "{{a}} {{#if c}}{{b}}{{/if}} {{a}}")
            .unwrap();
        assert_eq!(template.variables, vec!["a", "b"]);
        assert_eq!(template.blocks.len(), 1);
        assert!(template.parent.is_none());
    }
}
