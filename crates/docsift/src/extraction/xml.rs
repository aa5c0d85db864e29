//! Streaming XML text extraction using `quick-xml`.
//!
//! Character data and CDATA sections are collected in document order; each
//! run is whitespace-trimmed and runs are joined with a single space. Element
//! names, attributes, comments and processing instructions are dropped.

use crate::error::{DocsiftError, Result};
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;

pub fn extract_xml_text(xml_bytes: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml_bytes);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut content = String::new();
    // Text split by entity references is reassembled here before trimming.
    let mut run = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => {
                run.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    run.push(ch);
                } else if let Ok(name) = e.decode()
                    && let Some(resolved) = resolve_predefined_entity(&name)
                {
                    run.push_str(resolved);
                }
            }
            Ok(Event::CData(e)) => {
                flush_run(&mut content, &mut run);
                let data = String::from_utf8_lossy(&e);
                push_piece(&mut content, &data);
            }
            Ok(Event::Eof) => break,
            Ok(_) => flush_run(&mut content, &mut run),
            Err(e) => {
                return Err(DocsiftError::backend_with_source(
                    "convert application/xml",
                    format!("XML parsing error at position {}", reader.buffer_position()),
                    e,
                ));
            }
        }
        buf.clear();
    }
    flush_run(&mut content, &mut run);

    Ok(content)
}

fn flush_run(content: &mut String, run: &mut String) {
    push_piece(content, run);
    run.clear();
}

fn push_piece(content: &mut String, piece: &str) {
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return;
    }
    if !content.is_empty() {
        content.push(' ');
    }
    content.push_str(trimmed);
}
