//! Builders for the synthetic documents used by the integration tests.
//!
//! OOXML packages are written with `zip::ZipWriter`, PDFs with `lopdf`'s object
//! model. Image payloads are pseudo-random so JPEG re-encoding can't shrink
//! them below the size thresholds the tests use.

#![allow(dead_code)]

use docsift::{DocsiftError, Result, TextConverter};
use lopdf::content::{Content, Operation};
use lopdf::{Document as PdfDocument, Object, Stream, dictionary};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const IMAGE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const SHEET_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub const SST_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

/// Deterministic noise, `len` bytes.
pub fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Write `entries` into an in-memory zip archive, in order.
pub fn zip_package(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, body) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn relationships(rels: &[(String, &str, String)]) -> Vec<u8> {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in rels {
        xml.push_str(&format!(r#"<Relationship Id="{id}" Type="{kind}" Target="{target}"/>"#));
    }
    xml.push_str("</Relationships>");
    xml.into_bytes()
}

fn paragraphs(texts: &[&str]) -> String {
    texts
        .iter()
        .map(|t| format!("<w:p><w:r><w:t>{t}</w:t></w:r></w:p>"))
        .collect()
}

/// A word-processing package.
///
/// `media` entries are stored as `word/media/<name>` and linked from the main
/// part in the given order.
#[derive(Default)]
pub struct DocxBuilder<'a> {
    pub headers: Vec<&'a str>,
    pub footers: Vec<&'a str>,
    pub body: Vec<&'a str>,
    pub cells: Vec<&'a str>,
    pub media: Vec<(&'a str, Vec<u8>)>,
}

impl DocxBuilder<'_> {
    pub fn build(&self) -> Vec<u8> {
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();

        let table = if self.cells.is_empty() {
            String::new()
        } else {
            let cells: String = self
                .cells
                .iter()
                .map(|c| format!("<w:tc>{}</w:tc>", paragraphs(&[c])))
                .collect();
            format!("<w:tbl><w:tr>{cells}</w:tr></w:tbl>")
        };
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="{W_NS}"><w:body>{}{}</w:body></w:document>"#,
            paragraphs(&self.body),
            table
        );
        entries.push(("word/document.xml".to_string(), document.into_bytes()));

        for (i, text) in self.headers.iter().enumerate() {
            let part = format!(r#"<w:hdr xmlns:w="{W_NS}">{}</w:hdr>"#, paragraphs(&[text]));
            entries.push((format!("word/header{}.xml", i + 1), part.into_bytes()));
        }
        for (i, text) in self.footers.iter().enumerate() {
            let part = format!(r#"<w:ftr xmlns:w="{W_NS}">{}</w:ftr>"#, paragraphs(&[text]));
            entries.push((format!("word/footer{}.xml", i + 1), part.into_bytes()));
        }

        let rels: Vec<(String, &str, String)> = self
            .media
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (format!("rId{}", i + 1), IMAGE_REL, format!("media/{name}")))
            .collect();
        entries.push(("word/_rels/document.xml.rels".to_string(), relationships(&rels)));
        for (name, body) in &self.media {
            entries.push((format!("word/media/{name}"), body.clone()));
        }

        let borrowed: Vec<(&str, Vec<u8>)> = entries.iter().map(|(n, b)| (n.as_str(), b.clone())).collect();
        zip_package(&borrowed)
    }
}

/// A presentation whose slides each reference the named media files.
pub fn build_pptx(slides: &[Vec<&str>], media: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut entries: Vec<(String, Vec<u8>)> = Vec::new();

    let slide_rels: Vec<(String, &str, String)> = (0..slides.len())
        .map(|i| (format!("rId{}", i + 1), SLIDE_REL, format!("slides/slide{}.xml", i + 1)))
        .collect();
    entries.push((
        "ppt/presentation.xml".to_string(),
        br#"<?xml version="1.0" encoding="UTF-8"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#.to_vec(),
    ));
    entries.push(("ppt/_rels/presentation.xml.rels".to_string(), relationships(&slide_rels)));

    for (i, refs) in slides.iter().enumerate() {
        entries.push((
            format!("ppt/slides/slide{}.xml", i + 1),
            br#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#.to_vec(),
        ));
        let rels: Vec<(String, &str, String)> = refs
            .iter()
            .enumerate()
            .map(|(j, name)| (format!("rId{}", j + 1), IMAGE_REL, format!("../media/{name}")))
            .collect();
        entries.push((format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), relationships(&rels)));
    }

    for (name, body) in media {
        entries.push((format!("ppt/media/{name}"), body.clone()));
    }

    let borrowed: Vec<(&str, Vec<u8>)> = entries.iter().map(|(n, b)| (n.as_str(), b.clone())).collect();
    zip_package(&borrowed)
}

/// A workbook of string-only sheets plus extra archive entries.
///
/// Each sheet is a list of rows, each row a list of cell strings.
pub fn build_xlsx(sheets: &[Vec<Vec<&str>>], extra: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut strings: Vec<String> = Vec::new();
    let mut sheet_parts: Vec<String> = Vec::new();

    for sheet in sheets {
        let mut rows = String::new();
        for (r, row) in sheet.iter().enumerate() {
            let mut cells = String::new();
            for (c, value) in row.iter().enumerate() {
                let column = (b'A' + c as u8) as char;
                cells.push_str(&format!(r#"<c r="{column}{}" t="s"><v>{}</v></c>"#, r + 1, strings.len()));
                strings.push((*value).to_string());
            }
            rows.push_str(&format!(r#"<row r="{}">{cells}</row>"#, r + 1));
        }
        sheet_parts.push(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{rows}</sheetData></worksheet>"#
        ));
    }

    let shared: String = strings.iter().map(|s| format!("<si><t>{s}</t></si>")).collect();
    let shared = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{shared}</sst>"#,
        strings.len()
    );

    let sheet_list: String = (0..sheets.len())
        .map(|i| format!(r#"<sheet name="Sheet{0}" sheetId="{0}" r:id="rId{0}"/>"#, i + 1))
        .collect();
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_list}</sheets></workbook>"#
    );

    let mut rels: Vec<(String, &str, String)> = (0..sheets.len())
        .map(|i| (format!("rId{}", i + 1), SHEET_REL, format!("worksheets/sheet{}.xml", i + 1)))
        .collect();
    rels.push((format!("rId{}", sheets.len() + 1), SST_REL, "sharedStrings.xml".to_string()));

    let content_types = br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;
    let root_rels = br#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    let mut entries: Vec<(String, Vec<u8>)> = vec![
        ("[Content_Types].xml".to_string(), content_types.to_vec()),
        ("_rels/.rels".to_string(), root_rels.to_vec()),
        ("xl/workbook.xml".to_string(), workbook.into_bytes()),
        ("xl/_rels/workbook.xml.rels".to_string(), relationships(&rels)),
        ("xl/sharedStrings.xml".to_string(), shared.into_bytes()),
    ];
    for (i, part) in sheet_parts.into_iter().enumerate() {
        entries.push((format!("xl/worksheets/sheet{}.xml", i + 1), part.into_bytes()));
    }
    for (name, body) in extra {
        entries.push(((*name).to_string(), body.clone()));
    }

    let borrowed: Vec<(&str, Vec<u8>)> = entries.iter().map(|(n, b)| (n.as_str(), b.clone())).collect();
    zip_package(&borrowed)
}

/// Content of one synthetic PDF page.
#[derive(Debug, Clone, Copy)]
pub enum PdfPage {
    /// A line of text and no images.
    Text,
    /// `count` uncompressed RGB images of `side` x `side` pixels.
    Images { count: usize, side: u32 },
    /// One image whose sample buffer is shorter than its dimensions require.
    Truncated,
}

/// Large enough that the JPEG re-encoding stays over [`PDF_MIN_SIZE`].
pub const NOISY_SIDE: u32 = 64;

/// Size threshold that noisy images pass and 1x1 images fail.
pub const PDF_MIN_SIZE: i64 = 2000;

/// Build a PDF with one page per entry of `pages`.
pub fn build_pdf(pages: &[PdfPage]) -> Vec<u8> {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::new();
    for (index, page) in pages.iter().enumerate() {
        let mut operations = Vec::new();
        let mut xobjects = lopdf::Dictionary::new();

        match *page {
            PdfPage::Text => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("Td", vec![72.into(), 720.into()]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Page {}", index + 1))],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            PdfPage::Truncated => {
                let image_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => i64::from(NOISY_SIDE),
                        "Height" => i64::from(NOISY_SIDE),
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8,
                    },
                    noise(10, 99),
                ));
                xobjects.set("Im1", image_id);
                operations.push(Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]));
            }
            PdfPage::Images { count, side } => {
                for n in 0..count {
                    let samples = noise((side * side * 3) as usize, (index * 31 + n) as u32 + 7);
                    let image_id = doc.add_object(Stream::new(
                        dictionary! {
                            "Type" => "XObject",
                            "Subtype" => "Image",
                            "Width" => i64::from(side),
                            "Height" => i64::from(side),
                            "ColorSpace" => "DeviceRGB",
                            "BitsPerComponent" => 8,
                        },
                        samples,
                    ));
                    let name = format!("Im{}", n + 1);
                    xobjects.set(name.clone(), image_id);
                    operations.push(Operation::new("q", vec![]));
                    operations.push(Operation::new(
                        "cm",
                        vec![
                            i64::from(side).into(),
                            0.into(),
                            0.into(),
                            i64::from(side).into(),
                            0.into(),
                            0.into(),
                        ],
                    ));
                    operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
                    operations.push(Operation::new("Q", vec![]));
                }
            }
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => xobjects,
        };
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let page_tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
    };
    doc.objects.insert(pages_id, Object::Dictionary(page_tree));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Converter returning a fixed string, so PDF text doesn't depend on a real
/// text extraction library.
pub struct FixedText(pub &'static str);

impl TextConverter for FixedText {
    fn convert(&self, _bytes: &[u8], _mime_type: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Converter that always fails.
pub struct FailingText;

impl TextConverter for FailingText {
    fn convert(&self, _bytes: &[u8], mime_type: &str) -> Result<String> {
        Err(DocsiftError::backend("convert text", format!("refusing {mime_type}")))
    }
}

/// Converter that panics with an out-of-range index.
pub struct PanickingText;

impl TextConverter for PanickingText {
    fn convert(&self, bytes: &[u8], _mime_type: &str) -> Result<String> {
        let index = bytes.len() + 10;
        Ok(bytes[index].to_string())
    }
}
