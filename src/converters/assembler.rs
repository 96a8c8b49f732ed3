// src/converters/assembler.rs

use super::background::BackgroundChainResolver;
use super::elements::geometry::{emu_to_pt, placement_of, round_even, GroupTransform};
use super::elements::{chart, image, new_id, shape, table, text, ExtractContext};
use super::theme::ThemeMapping;
use crate::errors::Result;
use crate::models::elements::{Element, Frame};
use crate::models::presentation::PresentationDocument;
use crate::models::slide::Slide;
use crate::options::ConvertOptions;
use crate::package::{PptxPackage, DEFAULT_SLIDE_SIZE_EMU};
use crate::xml;
use log::{debug, info, warn};
use roxmltree::{Document, Node};
use std::path::Path;

/// Factors from slide points to canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    /// # Arguments
    /// * `slide_size_emu` - Slide width and height in EMU.
    /// * `options` - Supplies the canvas size.
    pub fn for_slide(slide_size_emu: (i64, i64), options: &ConvertOptions) -> Self {
        let (cx, cy) = if slide_size_emu.0 > 0 && slide_size_emu.1 > 0 {
            slide_size_emu
        } else {
            DEFAULT_SLIDE_SIZE_EMU
        };
        Self {
            x: options.canvas_width / emu_to_pt(cx as f64),
            y: options.canvas_height / emu_to_pt(cy as f64),
        }
    }

    fn sx(&self, value: i64) -> i64 {
        round_even(value as f64 * self.x)
    }

    fn sy(&self, value: i64) -> i64 {
        round_even(value as f64 * self.y)
    }

    fn frame(&self, frame: Frame) -> Frame {
        Frame {
            x: self.sx(frame.x),
            y: self.sy(frame.y),
            width: self.sx(frame.width),
            height: self.sy(frame.height),
        }
    }

    /// Scales positions, sizes, font sizes and border widths of an element in place.
    pub fn apply(&self, element: &mut Element) {
        match element {
            Element::Text(e) => {
                e.frame = self.frame(e.frame);
                e.style.font_size = self.sx(e.style.font_size);
            }
            Element::Shape(e) => {
                e.frame = self.frame(e.frame);
                e.border_width = self.sx(e.border_width);
            }
            Element::Image(e) => e.frame = self.frame(e.frame),
            Element::Table(e) => {
                e.frame = self.frame(e.frame);
                e.cell_width = self.sx(e.cell_width);
                e.cell_height = self.sy(e.cell_height);
                for cell in e.data.iter_mut().flatten() {
                    cell.style.font_size = self.sx(cell.style.font_size);
                    cell.border_width = self.sx(cell.border_width);
                }
            }
            Element::Chart(e) => e.frame = self.frame(e.frame),
        }
    }
}

/// Elements of one slide, split so charts can be appended last.
#[derive(Default)]
struct Collected {
    elements: Vec<Element>,
    charts: Vec<Element>,
}

/// Converts every slide of one package. The theme is read once and shared by all slides.
pub struct SlideAssembler<'a> {
    package: &'a PptxPackage,
    options: &'a ConvertOptions,
    theme: ThemeMapping,
    scale: Scale,
}

impl<'a> SlideAssembler<'a> {
    pub fn new(package: &'a PptxPackage, options: &'a ConvertOptions) -> Self {
        let theme = ThemeMapping::from_package(package);
        let scale = Scale::for_slide(package.slide_size_emu(), options);
        debug!("Canvas scale {:.4} x {:.4}", scale.x, scale.y);
        Self {
            package,
            options,
            theme,
            scale,
        }
    }

    pub fn theme(&self) -> &ThemeMapping {
        &self.theme
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Converts all slides in presentation order.
    pub fn assemble(&self) -> Result<PresentationDocument> {
        let slide_parts = self.package.slide_parts()?;
        info!("Converting {} slide(s)", slide_parts.len());
        let backgrounds = BackgroundChainResolver::new(self.package, &self.theme)
            .rasterize_images(self.options.rasterize_image_backgrounds);

        let slides = slide_parts
            .iter()
            .map(|part| {
                let elements = self.slide_elements(part);
                let background = backgrounds.resolve(part);
                Slide::new(new_id(), elements, background)
            })
            .collect();
        Ok(PresentationDocument::new(slides))
    }

    /// Scaled elements of one slide. Unreadable slides have none.
    pub fn slide_elements(&self, slide_part: &str) -> Vec<Element> {
        let Some(text) = self.package.read_xml(slide_part) else {
            warn!("Slide {slide_part} could not be read");
            return Vec::new();
        };
        let doc = match Document::parse(&text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Slide {slide_part} is not valid XML, emitting it empty: {e}");
                return Vec::new();
            }
        };
        let Some(tree) = xml::path(doc.root_element(), &["cSld", "spTree"]) else {
            return Vec::new();
        };

        let ctx = ExtractContext {
            package: self.package,
            theme: &self.theme,
            slide_part,
            options: self.options,
        };
        let mut collected = Collected::default();
        collect_tree(tree, &GroupTransform::identity(), &ctx, &mut collected);

        let mut elements = collected.elements;
        elements.append(&mut collected.charts);
        for element in &mut elements {
            self.scale.apply(element);
        }
        debug!("{slide_part}: {} element(s)", elements.len());
        elements
    }
}

fn collect_tree(
    tree: Node<'_, '_>,
    transform: &GroupTransform,
    ctx: &ExtractContext<'_>,
    out: &mut Collected,
) {
    for child in xml::element_children(tree) {
        match child.tag_name().name() {
            "grpSp" => {
                let inner = xml::path(child, &["grpSpPr", "xfrm"])
                    .map(GroupTransform::from_group_xfrm)
                    .unwrap_or_default();
                collect_tree(child, &transform.then_inner(&inner), ctx, out);
            }
            "AlternateContent" => {
                if let Some(fallback) = xml::child(child, "Fallback") {
                    collect_tree(fallback, transform, ctx, out);
                }
            }
            "sp" | "cxnSp" | "pic" | "graphicFrame" => collect_shape(child, transform, ctx, out),
            _ => {}
        }
    }
}

/// Dispatches one shape: chart (deferred), table, image, text, then plain shape.
fn collect_shape(
    node: Node<'_, '_>,
    transform: &GroupTransform,
    ctx: &ExtractContext<'_>,
    out: &mut Collected,
) {
    let Some(placement) = placement_of(node, transform) else {
        debug!(
            "Skipping {} without explicit geometry on {}",
            node.tag_name().name(),
            ctx.slide_part
        );
        return;
    };

    if xml::is(node, "graphicFrame") {
        if chart::is_chart(node) {
            out.charts
                .extend(chart::extract_chart(node, &placement, ctx).map(Element::Chart));
        } else if let Some(t) = table::extract_table(node, &placement, ctx) {
            out.elements.push(Element::Table(t));
        } else if image::has_image(node) {
            out.elements
                .extend(image::extract_image(node, &placement, ctx).map(Element::Image));
        }
        return;
    }

    if image::has_image(node) {
        out.elements
            .extend(image::extract_image(node, &placement, ctx).map(Element::Image));
    } else if text::has_text(node) {
        out.elements.extend(
            text::extract_text(node, &placement, ctx)
                .into_iter()
                .map(Element::Text),
        );
    } else if !xml::is(node, "pic") {
        out.elements
            .push(Element::Shape(shape::extract_shape(node, &placement, ctx)));
    }
}

/// Converts an opened package.
pub fn convert_package(
    package: &PptxPackage,
    options: &ConvertOptions,
) -> Result<PresentationDocument> {
    SlideAssembler::new(package, options).assemble()
}

/// Converts a `.pptx` file.
///
/// # Arguments
/// * `path` - Path of the presentation.
/// * `options` - Canvas size and conversion switches.
///
/// # Returns
/// The document, or an error when the archive or `ppt/presentation.xml` is unusable.
pub fn convert_pptx(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<PresentationDocument> {
    let package = PptxPackage::open(path)?;
    convert_package(&package, options)
}

/// Converts a `.pptx` held in memory.
pub fn convert_pptx_bytes(
    bytes: impl Into<Vec<u8>>,
    options: &ConvertOptions,
) -> Result<PresentationDocument> {
    let package = PptxPackage::from_bytes(bytes)?;
    convert_package(&package, options)
}
