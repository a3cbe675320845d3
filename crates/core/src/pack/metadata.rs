//! Pack metadata documents: `songs.xml`, `images.xml` and `info.xml`.

use std::path::Path;

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// One `<song>` entry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SongRecord {
    pub loop_name: String,
    pub title: String,
    pub rhythm: String,
    /// Empty when the song has no buildup.
    pub buildup: String,
    pub buildup_rhythm: String,
    pub source: Option<String>,
    pub beat_duration: Option<f64>,
    pub buildup_beat_duration: Option<f64>,
}

/// One `<image>` entry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ImageRecord {
    pub name: String,
    pub align: String,
    pub full_name: Option<String>,
    pub source: Option<String>,
}

/// Descriptive information from `info.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackInfo {
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

pub(crate) fn parse_songs(xml: &str, path: &Path) -> Result<Vec<SongRecord>, CatalogError> {
    let doc = parse_document(xml, path, "songs")?;
    doc.root_element()
        .children()
        .filter(|node| node.has_tag_name("song"))
        .enumerate()
        .map(|(index, node)| -> Result<SongRecord, CatalogError> {
            let missing = |field| CatalogError::MissingField {
                path: path.to_path_buf(),
                index,
                field,
            };
            let loop_name = node
                .attribute("name")
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| missing("name"))?;
            let title = child_text(node, "title").ok_or_else(|| missing("title"))?;
            let rhythm = child_raw_text(node, "rhythm").ok_or_else(|| missing("rhythm"))?;

            Ok(SongRecord {
                loop_name: loop_name.to_string(),
                title: title.to_string(),
                rhythm: rhythm.to_string(),
                buildup: child_text(node, "buildup").unwrap_or_default().to_string(),
                buildup_rhythm: child_raw_text(node, "buildupRhythm")
                    .unwrap_or_default()
                    .to_string(),
                source: child_text(node, "source").map(str::to_string),
                beat_duration: child_number(node, "beatDuration", path)?,
                buildup_beat_duration: child_number(node, "buildupBeatDuration", path)?,
            })
        })
        .collect()
}

pub(crate) fn parse_images(xml: &str, path: &Path) -> Result<Vec<ImageRecord>, CatalogError> {
    let doc = parse_document(xml, path, "images")?;
    doc.root_element()
        .children()
        .filter(|node| node.has_tag_name("image"))
        .enumerate()
        .map(|(index, node)| -> Result<ImageRecord, CatalogError> {
            let name = node
                .attribute("name")
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| CatalogError::MissingField {
                    path: path.to_path_buf(),
                    index,
                    field: "name",
                })?;

            Ok(ImageRecord {
                name: name.to_string(),
                align: child_text(node, "align").unwrap_or("center").to_string(),
                full_name: child_text(node, "fullname").map(str::to_string),
                source: child_text(node, "source").map(str::to_string),
            })
        })
        .collect()
}

pub(crate) fn parse_info(xml: &str, path: &Path) -> Result<PackInfo, CatalogError> {
    let doc = parse_document(xml, path, "info")?;
    let root = doc.root_element();
    let field = |tag: &str| child_text(root, tag).map(str::to_string);
    Ok(PackInfo {
        name: field("name"),
        author: field("author"),
        description: field("description"),
        link: field("link"),
    })
}

fn parse_document<'a>(
    xml: &'a str,
    path: &Path,
    root: &str,
) -> Result<Document<'a>, CatalogError> {
    let doc = Document::parse(xml).map_err(|err| CatalogError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let found = doc.root_element().tag_name().name();
    if found != root {
        return Err(CatalogError::Parse {
            path: path.to_path_buf(),
            message: format!("expected <{root}> root element, found <{found}>"),
        });
    }
    Ok(doc)
}

/// Trimmed text of the first child element named `tag`. An element that is
/// present but empty yields `Some("")`.
fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child_raw_text(node, tag).map(str::trim)
}

/// Untrimmed text of the first child element named `tag`. Beatmaps go
/// through here: every character, whitespace included, is a beat slot.
fn child_raw_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .map(|child| child.text().unwrap_or_default())
}

/// Optional non-negative, finite number.
fn child_number(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
) -> Result<Option<f64>, CatalogError> {
    let text = match child_text(node, tag) {
        None | Some("") => return Ok(None),
        Some(text) => text,
    };
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(CatalogError::Parse {
            path: path.to_path_buf(),
            message: format!("<{tag}> is not a non-negative number: `{text}`"),
        }),
    }
}
