//! Resolves a slide's background by walking slide → layout → master.
//!
//! Each level is tried twice, as an ordered list of strategies: first the full XML reading of
//! `bgPr` (solid, gradient, pattern, picture, with theme colours), then a strict direct-RGB
//! reading of `cSld/bg/bgPr/solidFill/srgbClr`. The first strategy that produces a colour or an
//! image wins; if none does, the background is white.

pub mod raster;

use super::color;
use super::fill;
use super::theme::ThemeMapping;
use crate::models::background::BackgroundResolution;
use crate::models::fill::FillSpec;
use crate::package::{self, PptxPackage};
use crate::xml;
use log::{debug, warn};
use roxmltree::Document;

/// A level of the inheritance chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainLevel {
    Slide,
    Layout,
    Master,
}

/// One way of reading a background at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `bgPr` read through the fill resolver.
    Xml(ChainLevel),
    /// Only `cSld/bg/bgPr/solidFill/srgbClr@val`.
    DirectRgb(ChainLevel),
}

/// Resolution order. Slide XML must come before any direct-RGB reading because the latter
/// cannot see theme colours.
pub const CHAIN: [Strategy; 6] = [
    Strategy::Xml(ChainLevel::Slide),
    Strategy::Xml(ChainLevel::Layout),
    Strategy::Xml(ChainLevel::Master),
    Strategy::DirectRgb(ChainLevel::Slide),
    Strategy::DirectRgb(ChainLevel::Layout),
    Strategy::DirectRgb(ChainLevel::Master),
];

/// The part path and text of one level, read once per slide.
struct LevelSource {
    part: String,
    xml: Option<String>,
}

struct ChainSources {
    slide: LevelSource,
    layout: Option<LevelSource>,
    master: Option<LevelSource>,
}

impl ChainSources {
    fn get(&self, level: ChainLevel) -> Option<&LevelSource> {
        match level {
            ChainLevel::Slide => Some(&self.slide),
            ChainLevel::Layout => self.layout.as_ref(),
            ChainLevel::Master => self.master.as_ref(),
        }
    }
}

/// Walks the background chain of slides in one package.
pub struct BackgroundChainResolver<'a> {
    package: &'a PptxPackage,
    theme: &'a ThemeMapping,
    rasterize_images: bool,
}

impl<'a> BackgroundChainResolver<'a> {
    pub fn new(package: &'a PptxPackage, theme: &'a ThemeMapping) -> Self {
        Self {
            package,
            theme,
            rasterize_images: false,
        }
    }

    /// Re-render picture backgrounds as a cover-fit 1920×1080 PNG instead of passing the
    /// original bytes through.
    pub fn rasterize_images(mut self, rasterize: bool) -> Self {
        self.rasterize_images = rasterize;
        self
    }

    fn load(&self, part: String) -> LevelSource {
        let xml = self.package.read_xml(&part);
        if xml.is_none() {
            debug!("Background source {part} is missing");
        }
        LevelSource { part, xml }
    }

    fn sources(&self, slide_part: &str) -> ChainSources {
        let layout_part = self.package.layout_for(slide_part);
        let master_part = layout_part
            .as_deref()
            .and_then(|layout| self.package.master_for(layout));
        ChainSources {
            slide: self.load(slide_part.to_string()),
            layout: layout_part.map(|part| self.load(part)),
            master: master_part.map(|part| self.load(part)),
        }
    }

    /// Resolves the background of `slide_part`. Always succeeds.
    pub fn resolve(&self, slide_part: &str) -> BackgroundResolution {
        let sources = self.sources(slide_part);
        for strategy in CHAIN {
            let level = match strategy {
                Strategy::Xml(level) | Strategy::DirectRgb(level) => level,
            };
            let Some(source) = sources.get(level) else {
                continue;
            };
            let Some(text) = source.xml.as_deref() else {
                continue;
            };
            let found = match strategy {
                Strategy::Xml(_) => self.from_xml(text, &source.part),
                Strategy::DirectRgb(_) => direct_rgb(text),
            };
            if let Some(background) = found {
                debug!("Background of {slide_part} resolved by {strategy:?}");
                return background;
            }
        }
        debug!("No background found for {slide_part}, using white");
        BackgroundResolution::default()
    }

    /// Reads the first `bgPr` of a part. `owner_part` scopes picture relationships.
    pub fn from_xml(&self, part_xml: &str, owner_part: &str) -> Option<BackgroundResolution> {
        let doc = match Document::parse(part_xml) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Skipping background of unparsable part {owner_part}: {e}");
                return None;
            }
        };
        let bg_pr = xml::descendant(doc.root(), "bgPr")?;
        let spec = fill::resolve_fill(bg_pr, self.theme, Some((self.package, owner_part)));
        self.from_fill(&spec)
    }

    /// Turns a resolved fill into a background. Solid colours must resolve; gradients and
    /// patterns are rasterized; pictures keep their bytes unless rasterization is enabled.
    pub fn from_fill(&self, spec: &FillSpec) -> Option<BackgroundResolution> {
        match spec {
            FillSpec::Solid(reference) => self.theme.resolve(reference).map(BackgroundResolution::solid),
            FillSpec::Gradient { angle, stops } => {
                raster::to_data_url(&raster::render_gradient(stops, *angle))
                    .map(BackgroundResolution::image)
            }
            FillSpec::Pattern {
                pattern_type,
                fg,
                bg,
            } => raster::to_data_url(&raster::render_pattern(pattern_type, fg, bg))
                .map(BackgroundResolution::image),
            FillSpec::Image { bytes, mime } => {
                if self.rasterize_images {
                    raster::to_data_url(&raster::render_image(bytes)).map(BackgroundResolution::image)
                } else {
                    Some(BackgroundResolution::image(package::data_url(mime, bytes)))
                }
            }
            FillSpec::None => None,
        }
    }
}

/// The strict direct-RGB reading: `cSld/bg/bgPr/solidFill/srgbClr@val` as a 24-bit integer.
pub fn direct_rgb(part_xml: &str) -> Option<BackgroundResolution> {
    let doc = Document::parse(part_xml).ok()?;
    let srgb = xml::path(
        doc.root_element(),
        &["cSld", "bg", "bgPr", "solidFill", "srgbClr"],
    )?;
    let value = u32::from_str_radix(xml::attr(srgb, "val")?.trim(), 16).ok()?;
    Some(BackgroundResolution::solid(color::to_hex(color::decode_int(
        value & 0x00ff_ffff,
    ))))
}
