//! DOCX (Word) adapter.
//!
//! Reads the WordprocessingML parts directly. Text is emitted in a fixed
//! structural order: header parts, then footer parts, then body paragraphs,
//! then paragraphs inside table cells. Images are the image relationships of
//! the main document part.

use crate::core::config::ValidatedOptions;
use crate::error::Result;
use crate::extraction::package::{ImageBudget, OoxmlPackage, parse_xml, rels_path_for, resolve_target};
use crate::types::{Extraction, Image};
use roxmltree::Node;
use std::collections::HashSet;

const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const MAIN_PART: &str = "word/document.xml";

/// Extract text and filtered images from DOCX bytes.
pub fn extract_docx(bytes: &[u8], options: &ValidatedOptions) -> Result<Extraction> {
    let mut package = OoxmlPackage::open(bytes, "read docx")?;

    let document_xml = package.read_string(MAIN_PART)?;
    let document = parse_xml(&document_xml, MAIN_PART)?;

    let mut text = String::new();

    for kind in ["header", "footer"] {
        for part in numbered_parts(&package.entry_names(), kind) {
            let xml = package.read_string(&part)?;
            let doc = parse_xml(&xml, &part)?;
            for paragraph in doc.descendants().filter(|n| is_w(n, "p")) {
                push_paragraph(&mut text, &paragraph);
            }
        }
    }

    let (body, cells): (Vec<Node>, Vec<Node>) = document
        .descendants()
        .filter(|n| is_w(n, "p"))
        .partition(|p| !p.ancestors().any(|a| is_w(&a, "tbl")));

    for paragraph in body.iter().chain(cells.iter()) {
        push_paragraph(&mut text, paragraph);
    }

    let images = collect_images(&mut package, options)?;

    tracing::debug!(
        "DOCX extraction: {} body paragraphs, {} table paragraphs, {} images kept",
        body.len(),
        cells.len(),
        images.len()
    );

    Ok(Extraction::new(images, text))
}

/// Image parts related to the main document, in relationship order.
fn collect_images(package: &mut OoxmlPackage<'_>, options: &ValidatedOptions) -> Result<Vec<Image>> {
    let relationships = package.image_relationships(&rels_path_for(MAIN_PART))?;

    let mut budget = ImageBudget::new(options.max_image_count, options.image_min_size);
    let mut seen = HashSet::new();
    for rel in relationships {
        if budget.is_full() {
            break;
        }
        let path = resolve_target(MAIN_PART, &rel.target);
        if seen.insert(path.clone()) {
            budget.offer(package, &path);
        }
    }

    Ok(budget.into_images())
}

fn is_w(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NAMESPACE)
}

/// Append one paragraph's runs followed by a newline.
fn push_paragraph(out: &mut String, paragraph: &Node<'_, '_>) {
    for node in paragraph.descendants() {
        if is_w(&node, "t") {
            if let Some(text) = node.text() {
                out.push_str(text);
            }
        } else if is_w(&node, "tab") {
            out.push('\t');
        } else if is_w(&node, "br") || is_w(&node, "cr") {
            out.push('\n');
        }
    }
    out.push('\n');
}

/// `word/header1.xml`, `word/header2.xml`, ... ordered by their number.
fn numbered_parts(entries: &[String], kind: &str) -> Vec<String> {
    let prefix = format!("word/{}", kind);
    let mut parts: Vec<(u32, String)> = entries
        .iter()
        .filter_map(|name| {
            let number = name.strip_prefix(&prefix)?.strip_suffix(".xml")?;
            let index = if number.is_empty() { 0 } else { number.parse().ok()? };
            Some((index, name.clone()))
        })
        .collect();
    parts.sort();
    parts.into_iter().map(|(_, name)| name).collect()
}
