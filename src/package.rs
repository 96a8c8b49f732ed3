// src/package.rs

use crate::errors::{ConversionError, Result};
use crate::xml;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use roxmltree::Document;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// 720 x 405 pt, the 16:9 default used when `sldSz` is missing.
pub const DEFAULT_SLIDE_SIZE_EMU: (i64, i64) = (9_144_000, 5_143_500);

// Relationship type suffixes (the full URIs differ between transitional and strict OOXML).
pub const REL_SLIDE: &str = "slide";
pub const REL_SLIDE_LAYOUT: &str = "slideLayout";
pub const REL_SLIDE_MASTER: &str = "slideMaster";
pub const REL_THEME: &str = "theme";
pub const REL_PACKAGE: &str = "package";

/// Upper bound on the buffer reserved before a part is read.
const MAX_PREALLOC_BYTES: u64 = 8 * 1024 * 1024;

/// Any seekable byte source the archive can be read from.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

// --- Relationships ---

/// One `<Relationship>` entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Matches the last path segment of the relationship type URI, e.g. `slideLayout`.
    pub fn has_type(&self, suffix: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(suffix)
    }
}

/// The relationships of one owner part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Parses a `.rels` document. Malformed input yields `None`.
    pub fn parse(rels_xml: &str) -> Option<Self> {
        let doc = match Document::parse(xml::strip_bom(rels_xml)) {
            Ok(doc) => doc,
            Err(e) => {
                debug!("Unparsable relationships part: {e}");
                return None;
            }
        };
        let entries = xml::descendants(doc.root_element(), "Relationship")
            .filter_map(|node| {
                Some(Relationship {
                    id: xml::attr(node, "Id")?.to_string(),
                    rel_type: xml::attr(node, "Type").unwrap_or_default().to_string(),
                    target: xml::attr(node, "Target")?.to_string(),
                    external: xml::attr(node, "TargetMode")
                        .is_some_and(|mode| mode.eq_ignore_ascii_case("External")),
                })
            })
            .collect();
        Some(Self { entries })
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.id == id)
    }

    pub fn first_of_type(&self, suffix: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.has_type(suffix))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// --- Part naming ---

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file_name)) => format!("{dir}/_rels/{file_name}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolves `target` against the directory of `owner_part`, collapsing `.` and `..` segments.
/// Absolute targets (`/ppt/media/x.png`) are rooted at the package root.
pub fn resolve_relative(owner_part: &str, target: &str) -> String {
    let target = target.replace('\\', "/");
    let target = target.split('#').next().unwrap_or_default();
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute);
    }
    let base_dir = owner_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(&format!("{base_dir}/{target}"))
}

/// The older rule that assumes every target lives under `ppt/`: `../x` and `x` map to `ppt/x`.
pub fn legacy_target(target: &str) -> String {
    let target = target.replace('\\', "/");
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if let Some(rest) = target.strip_prefix("../") {
        format!("ppt/{rest}")
    } else {
        format!("ppt/{target}")
    }
}

fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

// --- Media helpers ---

/// Media type from the leading bytes, then the part extension, defaulting to PNG.
pub fn sniff_media_type(bytes: &[u8], part_name: Option<&str>) -> &'static str {
    if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        return "image/jpeg";
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return "image/png";
    }
    if bytes.starts_with(b"GIF8") {
        return "image/gif";
    }
    let extension = part_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("emf") => "image/emf",
        Some("wmf") => "image/wmf",
        _ => "image/png",
    }
}

/// Initial buffer size for a part. The declared size comes from the archive and is not trusted.
fn prealloc_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOC_BYTES) as usize
}

/// `data:<mime>;base64,<payload>`
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

// --- Package ---

/// An opened presentation archive.
///
/// The archive is read lazily through interior mutability so the package can be shared by
/// reference across every resolver of a conversion. Dropping the package releases the
/// underlying file on every exit path.
pub struct PptxPackage {
    archive: RefCell<ZipArchive<Box<dyn ReadSeek>>>,
    names: Vec<String>,
    name_set: HashSet<String>,
}

impl std::fmt::Debug for PptxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PptxPackage")
            .field("parts", &self.names.len())
            .finish()
    }
}

impl PptxPackage {
    /// Opens a `.pptx` file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Opens a `.pptx` held in memory (uploads, WASM).
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes.into()))
    }

    pub fn from_reader<R: Read + Seek + 'static>(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(Box::new(reader) as Box<dyn ReadSeek>)?;
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let name_set = names.iter().cloned().collect();
        Ok(Self {
            archive: RefCell::new(archive),
            names,
            name_set,
        })
    }

    /// Every entry name of the archive, in central-directory order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, part: &str) -> bool {
        self.name_set.contains(part)
    }

    /// Raw bytes of a part, or `None` if it is missing or unreadable.
    pub fn read_part(&self, part: &str) -> Option<Vec<u8>> {
        if !self.contains(part) {
            return None;
        }
        let mut archive = self.archive.borrow_mut();
        let mut entry = match archive.by_name(part) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot open package part {part}: {e}");
                return None;
            }
        };
        let mut buf = Vec::with_capacity(prealloc_capacity(entry.size()));
        match entry.read_to_end(&mut buf) {
            Ok(_) => Some(buf),
            Err(e) => {
                warn!("Cannot read package part {part}: {e}");
                None
            }
        }
    }

    /// A part decoded as text, with any byte-order mark removed.
    pub fn read_xml(&self, part: &str) -> Option<String> {
        let bytes = self.read_part(part)?;
        let text = String::from_utf8_lossy(&bytes);
        Some(xml::strip_bom(&text).to_string())
    }

    /// The relationships owned by `part`; empty when the `.rels` sibling is absent or broken.
    pub fn relationships(&self, part: &str) -> Relationships {
        self.read_xml(&rels_path_for(part))
            .and_then(|text| Relationships::parse(&text))
            .unwrap_or_default()
    }

    /// Resolves a relationship target owned by `owner_part` to an archive path.
    ///
    /// The relative interpretation wins when it names an existing entry, then the legacy
    /// `ppt/`-rooted one. When neither exists the relative path is returned.
    pub fn resolve_target(&self, owner_part: &str, target: &str) -> String {
        let relative = resolve_relative(owner_part, target);
        if self.contains(&relative) {
            return relative;
        }
        let legacy = legacy_target(target);
        if self.contains(&legacy) {
            debug!("Resolved {target} from {owner_part} through the ppt/ fallback");
            return legacy;
        }
        relative
    }

    /// Archive path of the part that `owner_part` references by relationship id.
    pub fn related_part(&self, owner_part: &str, rel_id: &str) -> Option<String> {
        let rels = self.relationships(owner_part);
        let rel = rels.get(rel_id)?;
        if rel.external {
            return None;
        }
        Some(self.resolve_target(owner_part, &rel.target))
    }

    /// Archive path of the first relationship of the given type owned by `owner_part`.
    pub fn related_part_of_type(&self, owner_part: &str, rel_type: &str) -> Option<String> {
        let rels = self.relationships(owner_part);
        let rel = rels.first_of_type(rel_type).filter(|rel| !rel.external)?;
        Some(self.resolve_target(owner_part, &rel.target))
    }

    /// The layout a slide is based on.
    pub fn layout_for(&self, slide_part: &str) -> Option<String> {
        self.related_part_of_type(slide_part, REL_SLIDE_LAYOUT)
    }

    /// The master a layout is based on.
    pub fn master_for(&self, layout_part: &str) -> Option<String> {
        self.related_part_of_type(layout_part, REL_SLIDE_MASTER)
    }

    /// Reads and parses `ppt/presentation.xml`. This is the only part whose absence or
    /// corruption fails the whole conversion.
    fn presentation_xml(&self) -> Result<String> {
        if !self.contains(PRESENTATION_PART) {
            return Err(ConversionError::MissingPart(PRESENTATION_PART.to_string()));
        }
        let text = self
            .read_xml(PRESENTATION_PART)
            .ok_or_else(|| ConversionError::MissingPart(PRESENTATION_PART.to_string()))?;
        Document::parse(&text)?;
        Ok(text)
    }

    /// Slide parts in presentation order.
    ///
    /// The order comes from `sldIdLst` through the presentation relationships. Decks without
    /// a usable list fall back to every `ppt/slides/slideN.xml`, sorted by `N`.
    pub fn slide_parts(&self) -> Result<Vec<String>> {
        let text = self.presentation_xml()?;
        let doc = Document::parse(&text)?;
        let rels = self.relationships(PRESENTATION_PART);

        let ordered: Vec<String> = xml::descendants(doc.root_element(), "sldId")
            .filter_map(|sld_id| {
                // `id` is the numeric slide id; the relationship id is the namespaced `r:id`.
                let rel_id = sld_id
                    .attributes()
                    .find(|a| a.name() == "id" && a.namespace().is_some())?
                    .value();
                let rel = rels.get(rel_id).filter(|rel| rel.has_type(REL_SLIDE))?;
                Some(self.resolve_target(PRESENTATION_PART, &rel.target))
            })
            .filter(|part| self.contains(part))
            .collect();

        if !ordered.is_empty() {
            return Ok(ordered);
        }

        debug!("No usable sldIdLst, scanning ppt/slides/");
        let mut numbered: Vec<(u32, String)> = self
            .part_names()
            .filter_map(|name| {
                let n = name
                    .strip_prefix("ppt/slides/slide")?
                    .strip_suffix(".xml")?
                    .parse::<u32>()
                    .ok()?;
                Some((n, name.to_string()))
            })
            .collect();
        numbered.sort_by_key(|(n, _)| *n);
        Ok(numbered.into_iter().map(|(_, name)| name).collect())
    }

    /// Slide dimensions in EMU from `sldSz`, or the 16:9 default.
    pub fn slide_size_emu(&self) -> (i64, i64) {
        let Ok(text) = self.presentation_xml() else {
            return DEFAULT_SLIDE_SIZE_EMU;
        };
        let Ok(doc) = Document::parse(&text) else {
            return DEFAULT_SLIDE_SIZE_EMU;
        };
        xml::descendant(doc.root_element(), "sldSz")
            .and_then(|size| {
                let cx = xml::attr_i64(size, "cx")?;
                let cy = xml::attr_i64(size, "cy")?;
                (cx > 0 && cy > 0).then_some((cx, cy))
            })
            .unwrap_or(DEFAULT_SLIDE_SIZE_EMU)
    }

    /// The first slide master, from the presentation relationships or by name.
    pub fn first_master(&self) -> Option<String> {
        self.related_part_of_type(PRESENTATION_PART, REL_SLIDE_MASTER)
            .filter(|part| self.contains(part))
            .or_else(|| self.first_part_under("ppt/slideMasters/"))
    }

    /// The theme part: the first master's theme, else the first `ppt/theme/` entry.
    pub fn theme_part(&self) -> Option<String> {
        self.first_master()
            .and_then(|master| self.related_part_of_type(&master, REL_THEME))
            .filter(|part| self.contains(part))
            .or_else(|| self.first_part_under("ppt/theme/"))
    }

    fn first_part_under(&self, prefix: &str) -> Option<String> {
        let mut candidates: Vec<&str> = self
            .part_names()
            .filter(|name| name.starts_with(prefix) && name.ends_with(".xml"))
            .filter(|name| !name[prefix.len()..].contains('/'))
            .collect();
        candidates.sort();
        candidates.first().map(|name| name.to_string())
    }
}
