use crate::models::elements::Frame;
use crate::xml;
use roxmltree::Node;

pub const PT_PER_INCH: f64 = 72.0;
pub const EMU_PER_INCH: f64 = 914_400.0;
/// 12700 EMU per point.
pub const EMU_PER_PT: f64 = EMU_PER_INCH / PT_PER_INCH;
/// Rotation unit of `xfrm@rot`.
pub const ROT_UNITS_PER_DEGREE: f64 = 60_000.0;

pub fn emu_to_pt(emu: f64) -> f64 {
    emu / EMU_PER_INCH * PT_PER_INCH
}

/// Rounds half to even, the way the canvas coordinates have always been rounded.
pub fn round_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// A rectangle in slide EMU. Kept as `f64` because group scaling produces fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmuRect {
    pub x: f64,
    pub y: f64,
    pub cx: f64,
    pub cy: f64,
}

/// Position, size and rotation of a shape, already mapped to slide space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub rect: EmuRect,
    /// Whole degrees, truncated.
    pub rotation: i64,
}

impl Placement {
    /// Bounding box in points, each value rounded.
    pub fn frame(&self) -> Frame {
        Frame {
            x: round_even(emu_to_pt(self.rect.x)),
            y: round_even(emu_to_pt(self.rect.y)),
            width: round_even(emu_to_pt(self.rect.cx)),
            height: round_even(emu_to_pt(self.rect.cy)),
        }
    }
}

/// Maps a group's child coordinate space (`chOff`/`chExt`) onto its parent's (`off`/`ext`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupTransform {
    scale_x: f64,
    scale_y: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Default for GroupTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl GroupTransform {
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Builds the transform of a `grpSpPr/xfrm`. Missing child extents mean no scaling.
    pub fn from_group_xfrm(xfrm: Node<'_, '_>) -> Self {
        let pair = |name: &str, a: &str, b: &str| {
            xml::child(xfrm, name).map(|n| {
                (
                    xml::attr_i64(n, a).unwrap_or(0) as f64,
                    xml::attr_i64(n, b).unwrap_or(0) as f64,
                )
            })
        };
        let (off_x, off_y) = pair("off", "x", "y").unwrap_or((0.0, 0.0));
        let (ext_x, ext_y) = pair("ext", "cx", "cy").unwrap_or((0.0, 0.0));
        let (ch_off_x, ch_off_y) = pair("chOff", "x", "y").unwrap_or((off_x, off_y));
        let (ch_ext_x, ch_ext_y) = pair("chExt", "cx", "cy").unwrap_or((ext_x, ext_y));
        let scale = |ext: f64, ch_ext: f64| if ch_ext > 0.0 { ext / ch_ext } else { 1.0 };
        let scale_x = scale(ext_x, ch_ext_x);
        let scale_y = scale(ext_y, ch_ext_y);
        Self {
            scale_x,
            scale_y,
            offset_x: off_x - ch_off_x * scale_x,
            offset_y: off_y - ch_off_y * scale_y,
        }
    }

    /// `self ∘ inner`: first map through `inner`, then through `self`.
    pub fn then_inner(&self, inner: &GroupTransform) -> Self {
        Self {
            scale_x: self.scale_x * inner.scale_x,
            scale_y: self.scale_y * inner.scale_y,
            offset_x: self.offset_x + self.scale_x * inner.offset_x,
            offset_y: self.offset_y + self.scale_y * inner.offset_y,
        }
    }

    pub fn apply(&self, rect: EmuRect) -> EmuRect {
        EmuRect {
            x: self.offset_x + rect.x * self.scale_x,
            y: self.offset_y + rect.y * self.scale_y,
            cx: rect.cx * self.scale_x,
            cy: rect.cy * self.scale_y,
        }
    }
}

/// Reads an `xfrm` element. Requires both `off` and `ext`.
pub fn read_xfrm(xfrm: Node<'_, '_>) -> Option<Placement> {
    let off = xml::child(xfrm, "off")?;
    let ext = xml::child(xfrm, "ext")?;
    let rect = EmuRect {
        x: xml::attr_i64(off, "x")? as f64,
        y: xml::attr_i64(off, "y")? as f64,
        cx: xml::attr_i64(ext, "cx")? as f64,
        cy: xml::attr_i64(ext, "cy")? as f64,
    };
    let rotation = xml::attr_i64(xfrm, "rot")
        .map(|rot| (rot as f64 / ROT_UNITS_PER_DEGREE).trunc() as i64)
        .unwrap_or(0);
    Some(Placement { rect, rotation })
}

/// The `xfrm` of any shape-tree child: `spPr/xfrm` for shapes, pictures and connectors,
/// `xfrm` for graphic frames, `grpSpPr/xfrm` for groups.
pub fn xfrm_of<'a, 'input>(shape: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    match shape.tag_name().name() {
        "graphicFrame" => xml::child(shape, "xfrm"),
        "grpSp" => xml::path(shape, &["grpSpPr", "xfrm"]),
        _ => xml::path(shape, &["spPr", "xfrm"]),
    }
}

/// Slide-space placement of a shape; `None` when it has no explicit `xfrm` (inherited
/// placeholder geometry is not resolved).
pub fn placement_of(shape: Node<'_, '_>, transform: &GroupTransform) -> Option<Placement> {
    let local = read_xfrm(xfrm_of(shape)?)?;
    Some(Placement {
        rect: transform.apply(local.rect),
        rotation: local.rotation,
    })
}
