//! Small XML helpers shared by the parser and registries

use quick_xml::events::BytesStart;

/// Read an attribute by qualified name (e.g. `w:val`) or bare name
pub(crate) fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name {
            return attr.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

/// Read an attribute by local name, ignoring any namespace prefix
pub(crate) fn get_attr_local(e: &BytesStart, local: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == local {
            return attr.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

/// Escape text for use in XML content or attribute values
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    fn first_start(xml: &[u8]) -> BytesStart<'static> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) | Event::Empty(e) => return e.into_owned(),
                Event::Eof => panic!("no element"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_get_attr_qualified() {
        let e = first_start(br#"<w:pStyle w:val="Heading1"/>"#);
        assert_eq!(get_attr(&e, b"w:val").as_deref(), Some("Heading1"));
        assert_eq!(get_attr(&e, b"w:missing"), None);
    }

    #[test]
    fn test_get_attr_local() {
        let e = first_start(br#"<w:pStyle w:val="Heading1"/>"#);
        assert_eq!(get_attr_local(&e, b"val").as_deref(), Some("Heading1"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
