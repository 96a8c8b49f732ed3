// src/converters/elements.rs

pub mod chart;
pub mod geometry;
pub mod image;
pub mod shape;
pub mod table;
pub mod text;

use super::fill;
use super::theme::ThemeMapping;
use crate::models::elements::{FontStyle, FontWeight, TextAlign, TextDecoration, TextStyle};
use crate::options::ConvertOptions;
use crate::package::PptxPackage;
use crate::xml;
use roxmltree::Node;
use uuid::Uuid;

/// Everything an extractor needs besides the node itself.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub package: &'a PptxPackage,
    pub theme: &'a ThemeMapping,
    /// Part name of the slide being converted; owner of its relationships.
    pub slide_part: &'a str,
    pub options: &'a ConvertOptions,
}

/// A fresh element id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Style of a text run, with its resolved colour.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStyle {
    pub style: TextStyle,
    pub color: Option<String>,
}

impl RunStyle {
    /// The style of a paragraph without runs.
    pub fn default_for(options: &ConvertOptions) -> Self {
        Self {
            style: TextStyle {
                font_size: options.default_font_size,
                font_family: options.default_font_family.clone(),
                font_weight: FontWeight::Normal,
                font_style: FontStyle::Normal,
                text_decoration: TextDecoration::None,
            },
            color: None,
        }
    }
}

/// Reads `a:rPr` of a run. Attributes that are absent keep the defaults of `options`.
///
/// Theme font references (`+mn-lt`, `+mj-lt`) are not resolved and fall back to the
/// default family.
pub fn read_run_style(
    r_pr: Option<Node<'_, '_>>,
    theme: &ThemeMapping,
    options: &ConvertOptions,
) -> RunStyle {
    let mut run = RunStyle::default_for(options);
    let Some(r_pr) = r_pr else {
        return run;
    };

    if let Some(sz) = xml::attr(r_pr, "sz").and_then(|s| s.trim().parse::<f64>().ok()) {
        run.style.font_size = geometry::round_even(sz / 100.0);
    }
    if let Some(face) = xml::child(r_pr, "latin").and_then(|latin| xml::attr(latin, "typeface")) {
        if !face.is_empty() && !face.starts_with('+') {
            run.style.font_family = face.to_string();
        }
    }
    if xml::attr_bool(r_pr, "b").unwrap_or(false) {
        run.style.font_weight = FontWeight::Bold;
    }
    if xml::attr_bool(r_pr, "i").unwrap_or(false) {
        run.style.font_style = FontStyle::Italic;
    }
    let underline = xml::attr(r_pr, "u").is_some_and(|u| u != "none");
    let strike = xml::attr(r_pr, "strike").is_some_and(|s| s != "noStrike");
    run.style.text_decoration = if underline {
        TextDecoration::Underline
    } else if strike {
        TextDecoration::LineThrough
    } else {
        TextDecoration::None
    };

    run.color = xml::child(r_pr, "solidFill").and_then(|f| fill::resolve_first_color(f, theme));
    run
}

/// Style of the first `a:r` of a paragraph.
pub fn first_run_style(
    paragraph: Node<'_, '_>,
    theme: &ThemeMapping,
    options: &ConvertOptions,
) -> RunStyle {
    match xml::child(paragraph, "r") {
        Some(run) => read_run_style(xml::child(run, "rPr"), theme, options),
        None => RunStyle::default_for(options),
    }
}

/// `a:pPr@algn` of a paragraph.
pub fn paragraph_align(paragraph: Node<'_, '_>) -> TextAlign {
    xml::child(paragraph, "pPr")
        .and_then(|p_pr| xml::attr(p_pr, "algn"))
        .map(TextAlign::from_ooxml)
        .unwrap_or(TextAlign::Left)
}

/// Concatenated text of the `a:r` runs of a paragraph. Fields and breaks are not runs.
pub fn paragraph_run_text(paragraph: Node<'_, '_>) -> String {
    xml::children(paragraph, "r")
        .filter_map(|run| xml::child(run, "t"))
        .filter_map(|t| t.text())
        .collect()
}

/// Full text of a paragraph: runs, fields and line breaks.
pub fn paragraph_full_text(paragraph: Node<'_, '_>) -> String {
    let mut out = String::new();
    for node in xml::element_children(paragraph) {
        match node.tag_name().name() {
            "r" | "fld" => {
                if let Some(text) = xml::child(node, "t").and_then(|t| t.text()) {
                    out.push_str(text);
                }
            }
            "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// Paragraphs of a text body joined with newlines.
pub fn text_body_text(tx_body: Node<'_, '_>) -> String {
    xml::children(tx_body, "p")
        .map(paragraph_full_text)
        .collect::<Vec<_>>()
        .join("\n")
}
