//! PPTX (PowerPoint) adapter.
//!
//! Collects the images each slide references, slide by slide. Slide text is
//! not extracted by this adapter.

use crate::core::config::ValidatedOptions;
use crate::error::Result;
use crate::extraction::package::{ImageBudget, OoxmlPackage, parse_xml, rels_path_for, resolve_target};
use crate::types::Extraction;
use std::collections::HashSet;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

pub fn extract_pptx(bytes: &[u8], options: &ValidatedOptions) -> Result<Extraction> {
    let mut package = OoxmlPackage::open(bytes, "read pptx")?;
    let slides = find_slide_paths(&mut package);

    let mut budget = ImageBudget::new(options.max_image_count, options.image_min_size);
    let mut seen = HashSet::new();

    'slides: for slide_path in &slides {
        let relationships = match package.image_relationships(&rels_path_for(slide_path)) {
            Ok(rels) => rels,
            Err(e) => {
                tracing::debug!("Skipping relationships of {}: {}", slide_path, e);
                continue;
            }
        };

        for rel in relationships {
            if budget.is_full() {
                break 'slides;
            }
            let path = resolve_target(slide_path, &rel.target);
            if seen.insert(path.clone()) {
                budget.offer(&mut package, &path);
            }
        }
    }

    let images = budget.into_images();
    tracing::debug!("PPTX extraction: {} slides, {} images kept", slides.len(), images.len());

    Ok(Extraction::images_only(images))
}

/// Slide parts in presentation order.
///
/// Uses `ppt/_rels/presentation.xml.rels` when it parses; otherwise falls
/// back to `ppt/slides/slideN.xml` entries ordered by `N`.
fn find_slide_paths(package: &mut OoxmlPackage<'_>) -> Vec<String> {
    let rels_path = rels_path_for(PRESENTATION_PART);
    if package.contains(&rels_path)
        && let Ok(xml) = package.read_string(&rels_path)
        && let Ok(paths) = parse_presentation_rels(&xml)
        && !paths.is_empty()
    {
        return paths;
    }

    let mut numbered: Vec<(u32, String)> = package
        .entry_names()
        .into_iter()
        .filter_map(|name| {
            let number = name.strip_prefix("ppt/slides/slide")?.strip_suffix(".xml")?.parse().ok()?;
            Some((number, name))
        })
        .collect();
    numbered.sort();
    numbered.into_iter().map(|(_, name)| name).collect()
}

fn parse_presentation_rels(xml: &str) -> Result<Vec<String>> {
    let doc = parse_xml(xml, "presentation relationships")?;

    Ok(doc
        .descendants()
        .filter(|node| node.has_tag_name("Relationship"))
        .filter(|node| node.attribute("Type").is_some_and(|t| t.ends_with("/slide")))
        .filter_map(|node| node.attribute("Target"))
        .map(|target| resolve_target(PRESENTATION_PART, target))
        .collect())
}
