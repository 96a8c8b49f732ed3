// src/converters/fill.rs

use super::theme::ThemeMapping;
use crate::models::colors::ColorReference;
use crate::models::fill::{FillKind, FillSpec, GradientStop};
use crate::package::{self, PptxPackage, Relationships};
use crate::xml;
use log::debug;
use roxmltree::Node;

/// Default `prst` of a pattern fill without one.
pub const DEFAULT_PATTERN: &str = "pct50";
/// Angle used when a gradient has no `lin` element: top to bottom.
pub const DEFAULT_GRADIENT_ANGLE: f64 = 90.0;

const POSITION_SCALE: f64 = 100_000.0;
const ANGLE_SCALE: f64 = 60_000.0;

// --- Colour elements ---

/// The `prstClr` names understood here. Others do not resolve.
fn preset_color(name: &str) -> Option<&'static str> {
    match name {
        "black" => Some("#000000"),
        "white" => Some("#ffffff"),
        "red" => Some("#ff0000"),
        "green" => Some("#00ff00"),
        "blue" => Some("#0000ff"),
        "yellow" => Some("#ffff00"),
        "cyan" => Some("#00ffff"),
        "magenta" => Some("#ff00ff"),
        _ => None,
    }
}

fn modifier(color: Node<'_, '_>, name: &str) -> Option<i64> {
    xml::child(color, name).and_then(|m| xml::attr_i64(m, "val"))
}

/// Reads a single colour element (`srgbClr`, `schemeClr`, `sysClr`, `prstClr`).
pub fn read_color(color: Node<'_, '_>) -> ColorReference {
    let direct = |value: Option<&str>| match value.and_then(super::color::normalize_hex) {
        Some(hex) => ColorReference::Direct { hex },
        None => ColorReference::None,
    };
    match color.tag_name().name() {
        "srgbClr" => direct(xml::attr(color, "val")),
        "sysClr" => direct(xml::attr(color, "lastClr")),
        "prstClr" => match xml::attr(color, "val").and_then(preset_color) {
            Some(hex) => ColorReference::Direct {
                hex: hex.to_string(),
            },
            None => ColorReference::None,
        },
        "schemeClr" => match xml::attr(color, "val") {
            Some(name) => ColorReference::Scheme {
                name: name.to_string(),
                tint: modifier(color, "tint"),
                shade: modifier(color, "shade"),
                lum_mod: modifier(color, "lumMod"),
            },
            None => ColorReference::None,
        },
        _ => ColorReference::None,
    }
}

/// The first child of `container` that reads as a colour.
pub fn first_color(container: Node<'_, '_>) -> ColorReference {
    xml::element_children(container)
        .map(read_color)
        .find(|reference| !reference.is_none())
        .unwrap_or_default()
}

/// Resolves the first colour child of `container` to `#rrggbb`.
pub fn resolve_first_color(container: Node<'_, '_>, theme: &ThemeMapping) -> Option<String> {
    xml::element_children(container)
        .map(read_color)
        .filter(|reference| !reference.is_none())
        .find_map(|reference| theme.resolve(&reference))
}

// --- Classification ---

fn kind_of(node: Node<'_, '_>) -> Option<FillKind> {
    match node.tag_name().name() {
        "solidFill" => Some(FillKind::Solid),
        "gradFill" => Some(FillKind::Gradient),
        "blipFill" => Some(FillKind::Image),
        "pattFill" => Some(FillKind::Pattern),
        "noFill" | "grpFill" => Some(FillKind::None),
        _ => None,
    }
}

/// The first fill container among the direct children of a properties element, with its
/// node. `noFill` counts as a container and yields [`FillKind::None`].
pub fn fill_element<'a, 'input>(props: Node<'a, 'input>) -> Option<(FillKind, Node<'a, 'input>)> {
    xml::element_children(props).find_map(|child| kind_of(child).map(|kind| (kind, child)))
}

/// Kind of fill declared by a properties element.
pub fn classify_fill(props: Node<'_, '_>) -> FillKind {
    fill_element(props)
        .map(|(kind, _)| kind)
        .unwrap_or(FillKind::None)
}

// --- Resolution ---

/// The colour reference of a `solidFill`.
pub fn resolve_solid(fill: Node<'_, '_>) -> Option<ColorReference> {
    let reference = first_color(fill);
    (!reference.is_none()).then_some(reference)
}

/// A gradient with its stops in document order. Stops whose colour does not resolve are
/// dropped; fewer than two remaining stops is no gradient.
pub fn resolve_gradient(fill: Node<'_, '_>, theme: &ThemeMapping) -> Option<FillSpec> {
    let stops: Vec<GradientStop> = xml::descendants(fill, "gs")
        .filter_map(|gs| {
            let position = xml::attr(gs, "pos")
                .and_then(|p| p.trim().parse::<f64>().ok())
                .map(|p| p / POSITION_SCALE)
                .unwrap_or(0.0);
            let color = resolve_first_color(gs, theme)?;
            Some(GradientStop { position, color })
        })
        .collect();

    if stops.len() < 2 {
        debug!("Gradient with {} usable stop(s) ignored", stops.len());
        return None;
    }

    let angle = xml::descendant(fill, "lin")
        .and_then(|lin| xml::attr(lin, "ang"))
        .and_then(|a| a.trim().parse::<f64>().ok())
        .map(|a| (a / ANGLE_SCALE).rem_euclid(360.0))
        .unwrap_or(DEFAULT_GRADIENT_ANGLE);

    Some(FillSpec::Gradient { angle, stops })
}

/// A pattern fill; both the foreground and the background colour must resolve.
pub fn resolve_pattern(fill: Node<'_, '_>, theme: &ThemeMapping) -> Option<FillSpec> {
    let pattern_type = xml::attr(fill, "prst").unwrap_or(DEFAULT_PATTERN).to_string();
    let fg = xml::child(fill, "fgClr").and_then(|c| resolve_first_color(c, theme));
    let bg = xml::child(fill, "bgClr").and_then(|c| resolve_first_color(c, theme));
    match (fg, bg) {
        (Some(fg), Some(bg)) => Some(FillSpec::Pattern {
            pattern_type,
            fg,
            bg,
        }),
        _ => {
            debug!("Pattern {pattern_type} without both colours ignored");
            None
        }
    }
}

/// Bytes of a picture fill, resolved through the relationships of `owner_part`.
///
/// Lookup order: the owner's own `.rels`, then `ppt/_rels/<file>.rels`, then every `.rels`
/// part in the archive.
pub fn resolve_image(
    fill: Node<'_, '_>,
    package: &PptxPackage,
    owner_part: &str,
) -> Option<FillSpec> {
    let blip = if xml::is(fill, "blip") {
        fill
    } else {
        xml::descendant(fill, "blip")?
    };
    let rel_id = xml::attr(blip, "embed")?;
    let (bytes, part) = read_related_media(package, owner_part, rel_id)?;
    let mime = package::sniff_media_type(&bytes, Some(&part)).to_string();
    Some(FillSpec::Image { bytes, mime })
}

fn owner_of_rels(rels_part: &str) -> String {
    // `dir/_rels/file.xml.rels` -> `dir/file.xml`
    let without_ext = rels_part.strip_suffix(".rels").unwrap_or(rels_part);
    match without_ext.rsplit_once("_rels/") {
        Some((dir, file)) => format!("{dir}{file}"),
        None => without_ext.to_string(),
    }
}

fn read_via(
    package: &PptxPackage,
    rels: &Relationships,
    owner: &str,
    rel_id: &str,
) -> Option<(Vec<u8>, String)> {
    let rel = rels.get(rel_id).filter(|rel| !rel.external)?;
    let part = package.resolve_target(owner, &rel.target);
    let bytes = package.read_part(&part)?;
    Some((bytes, part))
}

/// Reads the media part that `owner_part` references as `rel_id`, with the fallbacks used
/// for atypically packaged decks.
pub fn read_related_media(
    package: &PptxPackage,
    owner_part: &str,
    rel_id: &str,
) -> Option<(Vec<u8>, String)> {
    if let Some(found) = read_via(package, &package.relationships(owner_part), owner_part, rel_id) {
        return Some(found);
    }

    let file_name = owner_part.rsplit('/').next().unwrap_or(owner_part);
    let parent_rels = format!("ppt/_rels/{file_name}.rels");
    if let Some(rels) = package.read_xml(&parent_rels).and_then(|t| Relationships::parse(&t)) {
        if let Some(found) = read_via(package, &rels, &format!("ppt/{file_name}"), rel_id) {
            debug!("Resolved {rel_id} of {owner_part} through {parent_rels}");
            return Some(found);
        }
    }

    let all_rels: Vec<String> = package
        .part_names()
        .filter(|name| name.ends_with(".rels"))
        .map(str::to_string)
        .collect();
    for rels_part in all_rels {
        let Some(rels) = package.read_xml(&rels_part).and_then(|t| Relationships::parse(&t)) else {
            continue;
        };
        if let Some(found) = read_via(package, &rels, &owner_of_rels(&rels_part), rel_id) {
            debug!("Resolved {rel_id} of {owner_part} by scanning {rels_part}");
            return Some(found);
        }
    }

    debug!("Relationship {rel_id} of {owner_part} does not resolve to a part");
    None
}

/// Resolves the fill of a properties element. `owner_part` is needed for picture fills only.
pub fn resolve_fill(
    props: Node<'_, '_>,
    theme: &ThemeMapping,
    package: Option<(&PptxPackage, &str)>,
) -> FillSpec {
    let Some((kind, fill)) = fill_element(props) else {
        return FillSpec::None;
    };
    let resolved = match kind {
        FillKind::Solid => resolve_solid(fill).map(FillSpec::Solid),
        FillKind::Gradient => resolve_gradient(fill, theme),
        FillKind::Pattern => resolve_pattern(fill, theme),
        FillKind::Image => package.and_then(|(pkg, owner)| resolve_image(fill, pkg, owner)),
        FillKind::None => None,
    };
    resolved.unwrap_or(FillSpec::None)
}

/// One colour that stands for a fill in a flat renderer: the solid colour, the first gradient
/// stop, or the pattern foreground.
pub fn representative_color(spec: &FillSpec, theme: &ThemeMapping) -> Option<String> {
    match spec {
        FillSpec::Solid(reference) => theme.resolve(reference),
        FillSpec::Gradient { stops, .. } => stops.first().map(|stop| stop.color.clone()),
        FillSpec::Pattern { fg, .. } => Some(fg.clone()),
        FillSpec::Image { .. } | FillSpec::None => None,
    }
}
