use super::geometry::{emu_to_pt, round_even, Placement};
use super::{new_id, ExtractContext};
use crate::converters::color::BLACK;
use crate::converters::fill;
use crate::models::elements::{ShapeElement, ShapeType};
use crate::models::fill::FillKind;
use crate::xml;
use log::debug;
use roxmltree::Node;

/// Width and height closer than this (in EMU) count as equal.
pub const SQUARE_TOLERANCE_EMU: f64 = 1000.0;

pub const TRANSPARENT: &str = "transparent";

fn is_square(cx: f64, cy: f64) -> bool {
    (cx - cy).abs() < SQUARE_TOLERANCE_EMU
}

fn rect_kind(cx: f64, cy: f64) -> ShapeType {
    if is_square(cx, cy) {
        ShapeType::Square
    } else {
        ShapeType::Rectangle
    }
}

/// Maps a preset geometry name. `None` for presets outside the supported set.
fn preset_kind(prst: &str, cx: f64, cy: f64) -> Option<ShapeType> {
    let kind = match prst {
        "rect" => rect_kind(cx, cy),
        "ellipse" => ShapeType::Circle,
        "triangle" | "rtTriangle" => ShapeType::Triangle,
        "star5" => ShapeType::Star,
        "pentagon" | "homePlate" => ShapeType::Pentagon,
        "hexagon" => ShapeType::Hexagon,
        "roundRect" | "round1Rect" | "round2SameRect" | "round2DiagRect" | "snipRoundRect" => {
            ShapeType::RoundedRectangle
        }
        "line" | "lineInv" | "straightConnector1" => ShapeType::Line,
        p if p.contains("Connector") => ShapeType::Line,
        _ => return None,
    };
    Some(kind)
}

/// Vertex count of the first path of a custom geometry.
fn freeform_vertices(cust_geom: Node<'_, '_>) -> Option<usize> {
    let path = xml::path(cust_geom, &["pathLst", "path"])?;
    Some(
        xml::element_children(path)
            .filter(|segment| matches!(segment.tag_name().name(), "moveTo" | "lnTo"))
            .count(),
    )
}

fn freeform_kind(vertices: usize, cx: f64, cy: f64) -> ShapeType {
    match vertices {
        3 => ShapeType::Triangle,
        5 => ShapeType::Pentagon,
        6 => ShapeType::Hexagon,
        10 => ShapeType::Star,
        _ => rect_kind(cx, cy),
    }
}

/// Anything unrecognised is classified by its proportions.
fn fallback_kind(cx: f64, cy: f64) -> ShapeType {
    if cx < SQUARE_TOLERANCE_EMU || cy < SQUARE_TOLERANCE_EMU {
        ShapeType::Line
    } else if is_square(cx, cy) {
        ShapeType::Circle
    } else {
        ShapeType::Rectangle
    }
}

/// Classifies a `p:sp` or `p:cxnSp` using its slide-space size.
pub fn shape_type(shape: Node<'_, '_>, placement: &Placement) -> ShapeType {
    let (cx, cy) = (placement.rect.cx, placement.rect.cy);
    if xml::is(shape, "cxnSp") {
        return ShapeType::Line;
    }
    let Some(sp_pr) = xml::child(shape, "spPr") else {
        return fallback_kind(cx, cy);
    };
    if let Some(prst) = xml::child(sp_pr, "prstGeom").and_then(|g| xml::attr(g, "prst")) {
        return preset_kind(prst, cx, cy).unwrap_or_else(|| {
            debug!("Preset geometry {prst} classified by its proportions");
            fallback_kind(cx, cy)
        });
    }
    if let Some(vertices) = xml::child(sp_pr, "custGeom").and_then(freeform_vertices) {
        return freeform_kind(vertices, cx, cy);
    }
    fallback_kind(cx, cy)
}

/// Fill colour of the shape: its own fill, else the style's `fillRef`. `noFill` is `None`.
pub fn fill_color(shape: Node<'_, '_>, ctx: &ExtractContext<'_>) -> Option<String> {
    let explicit = xml::child(shape, "spPr").and_then(|sp_pr| {
        fill::fill_element(sp_pr).map(|(kind, _)| (sp_pr, kind))
    });
    match explicit {
        Some((_, FillKind::None)) => None,
        Some((sp_pr, _)) => {
            let spec = fill::resolve_fill(sp_pr, ctx.theme, Some((ctx.package, ctx.slide_part)));
            fill::representative_color(&spec, ctx.theme)
        }
        None => xml::path(shape, &["style", "fillRef"])
            .and_then(|fill_ref| fill::resolve_first_color(fill_ref, ctx.theme)),
    }
}

/// Border colour and width in points of `spPr/a:ln`.
pub fn border(shape: Node<'_, '_>, ctx: &ExtractContext<'_>) -> (String, f64) {
    let Some(ln) = xml::path(shape, &["spPr", "ln"]) else {
        return (TRANSPARENT.to_string(), 0.0);
    };
    let width = xml::attr_i64(ln, "w")
        .map(|w| emu_to_pt(w as f64))
        .unwrap_or(0.0);
    let color = match fill::fill_element(ln) {
        Some((FillKind::None, _)) => TRANSPARENT.to_string(),
        Some(_) => {
            let spec = fill::resolve_fill(ln, ctx.theme, None);
            fill::representative_color(&spec, ctx.theme).unwrap_or_else(|| BLACK.to_string())
        }
        None => BLACK.to_string(),
    };
    (color, width)
}

/// Builds the shape element. Text-bearing shapes are handled by the text extractor.
pub fn extract_shape(
    shape: Node<'_, '_>,
    placement: &Placement,
    ctx: &ExtractContext<'_>,
) -> ShapeElement {
    let (border_color, border_width) = border(shape, ctx);
    ShapeElement {
        id: new_id(),
        shape_type: shape_type(shape, placement),
        frame: placement.frame(),
        fill_color: fill_color(shape, ctx),
        border_color: Some(border_color),
        border_width: round_even(border_width),
        rotation: placement.rotation,
    }
}
