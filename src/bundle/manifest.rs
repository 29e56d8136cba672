//! Manifest parsing.
//!
//! A manifest lists its attachments as `<bifogadfil><filnamn>NAME</filnamn></bifogadfil>`
//! elements anywhere in the document. Names are returned in document order,
//! exactly as written (entities resolved, no trimming).
//!
//! The document is read as bytes and decoded per its BOM or `encoding`
//! declaration, so Latin-1 and other legacy encodings work as well as UTF-8.
//!
//! A `filnamn` that is empty names no file and is dropped; the bundle moves
//! without it instead of waiting on an entry that can never appear.

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::fs;
use std::path::{Component, Path};

use super::{ATTACHMENT_ELEMENT, NAME_ELEMENT};
use crate::errors::BundleError;

/// An attachment element still open while reading.
struct Frame {
    depth: usize,
    slot: usize,
    named: bool,
}

/// Read `path` and return the attachment names it references.
pub fn read_attachments(path: &Path) -> Result<Vec<String>, BundleError> {
    let content = fs::read(path).map_err(|e| read_error(path, e.to_string()))?;
    let names = parse_attachments(&content).map_err(|reason| read_error(path, reason))?;
    if let Some(bad) = names.iter().find(|n| !is_plain_file_name(n)) {
        return Err(read_error(path, format!("attachment name '{bad}' is not a plain file name")));
    }
    Ok(names)
}

fn read_error(path: &Path, reason: String) -> BundleError {
    BundleError::Read {
        path: path.to_path_buf(),
        reason,
    }
}

/// A name usable as a single entry inside the bundle's directory.
fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Parse a raw manifest document. Errors carry a human-readable reason.
pub fn parse_attachments(content: &[u8]) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_reader(content);
    let mut slots: Vec<Option<String>> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    // (depth of the name element, text collected so far)
    let mut capture: Option<(usize, String)> = None;
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("malformed xml at byte {}: {e}", reader.error_position()))?;
        match event {
            Event::Start(e) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
                let local = e.local_name();
                if capture.is_none()
                    && local.as_ref() == NAME_ELEMENT
                    && frames.last().is_some_and(|f| f.depth + 1 == depth && !f.named)
                {
                    capture = Some((depth, String::new()));
                }
                if local.as_ref() == ATTACHMENT_ELEMENT {
                    slots.push(None);
                    frames.push(Frame { depth, slot: slots.len() - 1, named: false });
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    roots += 1;
                }
                let local = e.local_name();
                if local.as_ref() == NAME_ELEMENT
                    && let Some(frame) = frames.last_mut()
                    && frame.depth == depth
                {
                    // An empty first name element still counts as "the" name.
                    frame.named = true;
                }
            }
            Event::End(_) => {
                if let Some((_, text)) = capture.take_if(|(d, _)| *d == depth)
                    && let Some(frame) = frames.last_mut()
                {
                    frame.named = true;
                    slots[frame.slot] = Some(text);
                }
                if frames.last().is_some_and(|f| f.depth == depth) {
                    frames.pop();
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if let Some((_, buf)) = capture.as_mut() {
                    let raw = decode(reader.decoder(), &t)?;
                    buf.push_str(&unescape_text(&raw)?);
                }
            }
            Event::CData(t) => {
                if let Some((_, buf)) = capture.as_mut() {
                    buf.push_str(&decode(reader.decoder(), &t)?);
                }
            }
            Event::GeneralRef(r) => {
                if let Some((_, buf)) = capture.as_mut() {
                    let entity = format!("&{};", decode(reader.decoder(), &r)?);
                    buf.push_str(&unescape_text(&entity)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        if roots > 1 {
            return Err("multiple root elements".into());
        }
    }

    if depth != 0 {
        return Err("unexpected end of document (unclosed elements)".into());
    }
    if roots == 0 {
        return Err("root element is missing".into());
    }

    Ok(slots
        .into_iter()
        .flatten()
        .filter(|name| !name.is_empty())
        .collect())
}

fn decode<'b>(decoder: Decoder, bytes: &'b [u8]) -> Result<Cow<'b, str>, String> {
    decoder
        .decode(bytes)
        .map_err(|e| format!("text is not valid in the declared encoding: {e}"))
}

fn unescape_text(raw: &str) -> Result<Cow<'_, str>, String> {
    unescape(raw).map_err(|e| format!("bad entity reference: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn names_in_document_order() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<arende>
  <bifogadfil><filnamn>attach1.pdf</filnamn></bifogadfil>
  <handlingar>
    <bifogadfil><typ>x</typ><filnamn>scan.PDF</filnamn></bifogadfil>
  </handlingar>
  <bifogadfil><filnamn>attach1.pdf</filnamn></bifogadfil>
</arende>"#;
        assert_eq!(
            parse_attachments(xml.as_bytes()).unwrap(),
            vec!["attach1.pdf", "scan.PDF", "attach1.pdf"]
        );
    }

    #[test]
    fn zero_attachments_is_fine() {
        assert!(parse_attachments(b"<arende/>").unwrap().is_empty());
        assert!(parse_attachments(b"<arende><annat/></arende>").unwrap().is_empty());
    }

    #[test]
    fn first_name_child_wins_and_nested_names_are_ignored() {
        let xml = "<a><bifogadfil><filnamn>one.pdf</filnamn><filnamn>two.pdf</filnamn>\
                   <meta><filnamn>deep.pdf</filnamn></meta></bifogadfil></a>";
        assert_eq!(parse_attachments(xml.as_bytes()).unwrap(), vec!["one.pdf"]);
    }

    #[test]
    fn missing_or_empty_names_are_skipped() {
        let xml = "<a><bifogadfil/><bifogadfil><filnamn/></bifogadfil>\
                   <bifogadfil><filnamn></filnamn></bifogadfil><bifogadfil><x/></bifogadfil></a>";
        assert!(parse_attachments(xml.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn empty_name_is_dropped_and_the_rest_of_the_bundle_stands() {
        let xml = "<a><bifogadfil><filnamn></filnamn></bifogadfil>\
                   <bifogadfil><filnamn>kept.pdf</filnamn></bifogadfil></a>";
        assert_eq!(parse_attachments(xml.as_bytes()).unwrap(), vec!["kept.pdf"]);
    }

    #[test]
    fn latin1_manifest_is_decoded_from_its_declaration() {
        let mut doc = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<arende><bifogadfil><filnamn>bilaga_".to_vec();
        doc.push(0xE5);
        doc.extend_from_slice(b".pdf</filnamn></bifogadfil></arende>");
        assert_eq!(parse_attachments(&doc).unwrap(), vec!["bilaga_\u{e5}.pdf"]);
    }

    #[test]
    fn utf8_bom_is_accepted() {
        let mut doc = vec![0xEF, 0xBB, 0xBF];
        doc.extend_from_slice("<a><bifogadfil><filnamn>bilaga_å.pdf</filnamn></bifogadfil></a>".as_bytes());
        assert_eq!(parse_attachments(&doc).unwrap(), vec!["bilaga_å.pdf"]);
    }

    #[test]
    fn latin1_manifest_file_reads_through() {
        let td = tempdir().unwrap();
        let m = td.path().join("m.xml");
        let doc = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a><bifogadfil><filnamn>\xC4rende.pdf</filnamn></bifogadfil></a>".to_vec();
        fs::write(&m, &doc).unwrap();
        assert_eq!(read_attachments(&m).unwrap(), vec!["\u{c4}rende.pdf"]);
    }

    #[test]
    fn entities_and_cdata_are_resolved() {
        let xml = "<a><bifogadfil><filnamn>R&amp;D&#32;1.pdf</filnamn></bifogadfil>\
                   <bifogadfil><filnamn><![CDATA[b<c.pdf]]></filnamn></bifogadfil></a>";
        assert_eq!(parse_attachments(xml.as_bytes()).unwrap(), vec!["R&D 1.pdf", "b<c.pdf"]);
    }

    #[test]
    fn truncated_document_is_rejected() {
        let xml = "<a><bifogadfil><filnamn>attach1.pdf</filnamn></bifogadfil>";
        assert!(parse_attachments(xml.as_bytes()).is_err());
        assert!(parse_attachments(b"").is_err());
        assert!(parse_attachments(b"<a></b>").is_err());
    }

    #[test]
    fn path_like_names_make_a_read_error() {
        let td = tempdir().unwrap();
        let m = td.path().join("m.xml");
        fs::write(&m, "<a><bifogadfil><filnamn>../escape.pdf</filnamn></bifogadfil></a>").unwrap();
        let err = read_attachments(&m).unwrap_err();
        assert!(matches!(err, BundleError::Read { .. }));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("sub/a.pdf"));
        assert!(is_plain_file_name("a.pdf"));
    }

    #[test]
    fn unreadable_manifest_is_a_read_error() {
        let td = tempdir().unwrap();
        let err = read_attachments(&td.path().join("gone.xml")).unwrap_err();
        assert_eq!(err.diagnostic_id(), 10);
        assert_eq!(err.target(), td.path().join("gone.xml"));
    }
}
