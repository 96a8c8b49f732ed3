// src/test_support.rs

use crate::package::PptxPackage;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart""#;

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/";

pub fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn rels_xml(rels: &[(&str, &str, &str)]) -> String {
    let mut out = format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{REL_NS}">"#);
    for (id, rel_type, target) in rels {
        out.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL_TYPE_BASE}{rel_type}" Target="{target}"/>"#
        ));
    }
    out.push_str("</Relationships>");
    out
}

/// `<p:bg>` with a solid sRGB fill.
pub fn solid_bg(hex: &str) -> String {
    format!(r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{hex}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#)
}

/// `<p:bg>` with a two-stop linear gradient.
pub fn gradient_bg(from: &str, to: &str, angle: i64) -> String {
    format!(
        r#"<p:bg><p:bgPr><a:gradFill><a:gsLst><a:gs pos="0"><a:srgbClr val="{from}"/></a:gs><a:gs pos="100000"><a:srgbClr val="{to}"/></a:gs></a:gsLst><a:lin ang="{angle}" scaled="0"/></a:gradFill><a:effectLst/></p:bgPr></p:bg>"#
    )
}

/// Wraps shape-tree children into a `<p:cSld>` with an optional background.
pub fn c_sld(background: &str, shapes: &str) -> String {
    format!(
        r#"<p:cSld>{background}<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld>"#
    )
}

/// A `<p:sp>` with geometry in EMU and arbitrary `spPr` fill/line markup and text body.
pub fn shape(id: u32, (x, y, cx, cy): (i64, i64, i64, i64), sp_pr_extra: &str, tx_body: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Shape {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>{sp_pr_extra}</p:spPr>{tx_body}</p:sp>"#
    )
}

pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

struct SlideFixture {
    body: String,
    rels: Vec<(String, String, String)>,
}

/// Builds a minimal but structurally complete deck: presentation, one master, one layout,
/// one theme and any number of slides.
pub struct DeckBuilder {
    theme: Option<Vec<(String, String)>>,
    master_body: String,
    master_rels: Vec<(String, String, String)>,
    layout_body: String,
    layout_rels: Vec<(String, String, String)>,
    slides: Vec<SlideFixture>,
    parts: Vec<(String, Vec<u8>)>,
    reversed: bool,
}

impl Default for DeckBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckBuilder {
    pub fn new() -> Self {
        let theme = [
            ("dk1", "sys:000000"),
            ("lt1", "sys:FFFFFF"),
            ("dk2", "44546A"),
            ("lt2", "E7E6E6"),
            ("accent1", "4472C4"),
            ("accent2", "ED7D31"),
            ("accent3", "A5A5A5"),
            ("accent4", "FFC000"),
            ("accent5", "5B9BD5"),
            ("accent6", "70AD47"),
            ("hlink", "0563C1"),
            ("folHlink", "954F72"),
        ]
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
        Self {
            theme: Some(theme),
            master_body: c_sld("", ""),
            master_rels: Vec::new(),
            layout_body: c_sld("", ""),
            layout_rels: Vec::new(),
            slides: Vec::new(),
            parts: Vec::new(),
            reversed: false,
        }
    }

    /// Overrides scheme slots; values are `RRGGBB` or `sys:RRGGBB` for a `sysClr`.
    pub fn theme_color(mut self, name: &str, value: &str) -> Self {
        let theme = self.theme.get_or_insert_with(Vec::new);
        match theme.iter_mut().find(|(slot, _)| slot == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => theme.push((name.to_string(), value.to_string())),
        }
        self
    }

    pub fn without_theme(mut self) -> Self {
        self.theme = None;
        self
    }

    pub fn master_background(mut self, bg: &str) -> Self {
        self.master_body = c_sld(bg, "");
        self
    }

    pub fn layout_background(mut self, bg: &str) -> Self {
        self.layout_body = c_sld(bg, "");
        self
    }

    pub fn layout_rel(mut self, id: &str, rel_type: &str, target: &str) -> Self {
        self.layout_rels
            .push((id.to_string(), rel_type.to_string(), target.to_string()));
        self
    }

    pub fn master_rel(mut self, id: &str, rel_type: &str, target: &str) -> Self {
        self.master_rels
            .push((id.to_string(), rel_type.to_string(), target.to_string()));
        self
    }

    /// Adds a slide; `body` is the content of `<p:sld>` (usually a `<p:cSld>`).
    pub fn slide(self, body: &str) -> Self {
        self.slide_with_rels(body, &[])
    }

    /// Adds a slide with extra relationships (`rId1` is reserved for the layout).
    pub fn slide_with_rels(mut self, body: &str, rels: &[(&str, &str, &str)]) -> Self {
        self.slides.push(SlideFixture {
            body: body.to_string(),
            rels: rels
                .iter()
                .map(|(id, t, target)| (id.to_string(), t.to_string(), target.to_string()))
                .collect(),
        });
        self
    }

    pub fn part(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.parts.push((name.to_string(), bytes.into()));
        self
    }

    pub fn media(self, name: &str, bytes: Vec<u8>) -> Self {
        self.part(name, bytes)
    }

    pub fn reverse_slide_order(mut self) -> Self {
        self.reversed = true;
        self
    }

    fn theme_xml(colors: &[(String, String)]) -> String {
        let mut scheme = String::new();
        for (name, value) in colors {
            let color = match value.strip_prefix("sys:") {
                Some(last) => format!(r#"<a:sysClr val="windowText" lastClr="{last}"/>"#),
                None => format!(r#"<a:srgbClr val="{value}"/>"#),
            };
            scheme.push_str(&format!("<a:{name}>{color}</a:{name}>"));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><a:theme {NS} name="Office Theme"><a:themeElements><a:clrScheme name="Office">{scheme}</a:clrScheme><a:fontScheme name="Office"/></a:themeElements></a:theme>"#
        )
    }

    pub fn build(self) -> Vec<u8> {
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        let mut push = |name: &str, text: String| entries.push((name.to_string(), text.into_bytes()));

        let mut pres_rels = vec![(
            "rIdM1".to_string(),
            "slideMaster".to_string(),
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        let mut sld_ids = Vec::new();
        for i in 1..=self.slides.len() {
            pres_rels.push((format!("rIdS{i}"), "slide".to_string(), format!("slides/slide{i}.xml")));
            sld_ids.push(format!(r#"<p:sldId id="{}" r:id="rIdS{i}"/>"#, 255 + i));
        }
        if self.reversed {
            sld_ids.reverse();
        }
        push(
            "ppt/presentation.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rIdM1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
                sld_ids.concat()
            ),
        );
        let pres_rel_refs: Vec<(&str, &str, &str)> = pres_rels
            .iter()
            .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
            .collect();
        push("ppt/_rels/presentation.xml.rels", rels_xml(&pres_rel_refs));

        if let Some(theme) = &self.theme {
            push("ppt/theme/theme1.xml", Self::theme_xml(theme));
        }

        push(
            "ppt/slideMasters/slideMaster1.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><p:sldMaster {NS}>{}</p:sldMaster>"#, self.master_body),
        );
        let mut master_rels = vec![
            ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
        ];
        if self.theme.is_some() {
            master_rels.push(("rId2", "theme", "../theme/theme1.xml"));
        }
        master_rels.extend(self.master_rels.iter().map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str())));
        push("ppt/slideMasters/_rels/slideMaster1.xml.rels", rels_xml(&master_rels));

        push(
            "ppt/slideLayouts/slideLayout1.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><p:sldLayout {NS}>{}</p:sldLayout>"#, self.layout_body),
        );
        let mut layout_rels = vec![("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")];
        layout_rels.extend(self.layout_rels.iter().map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str())));
        push("ppt/slideLayouts/_rels/slideLayout1.xml.rels", rels_xml(&layout_rels));

        for (index, slide) in self.slides.iter().enumerate() {
            let n = index + 1;
            push(
                &format!("ppt/slides/slide{n}.xml"),
                format!(r#"<?xml version="1.0" encoding="UTF-8"?><p:sld {NS}>{}</p:sld>"#, slide.body),
            );
            let mut rels = vec![("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")];
            rels.extend(slide.rels.iter().map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str())));
            push(&format!("ppt/slides/_rels/slide{n}.xml.rels"), rels_xml(&rels));
        }

        entries.extend(self.parts);
        let refs: Vec<(&str, Vec<u8>)> = entries
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.clone()))
            .collect();
        zip_bytes(&refs)
    }

    pub fn package(self) -> PptxPackage {
        PptxPackage::from_bytes(self.build()).unwrap()
    }
}

/// A cell of a fixture worksheet.
pub enum Cell {
    Text(&'static str),
    Number(f64),
}

/// A single-sheet workbook readable by `calamine`.
pub fn xlsx_bytes(sheet_name: &str, rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut shared: Vec<&str> = Vec::new();
    let mut sheet_data = String::new();
    for (r, row) in rows.iter().enumerate() {
        sheet_data.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            match cell {
                Cell::Text(text) => {
                    let index = shared.len();
                    shared.push(text);
                    sheet_data.push_str(&format!(r#"<c r="{reference}" t="s"><v>{index}</v></c>"#));
                }
                Cell::Number(value) => {
                    sheet_data.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#));
                }
            }
        }
        sheet_data.push_str("</row>");
    }
    let strings: String = shared
        .iter()
        .map(|s| format!("<si><t>{s}</t></si>"))
        .collect();

    const MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    zip_bytes(&[
        (
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/></Types>"#.to_vec(),
        ),
        (
            "_rels/.rels",
            rels_xml(&[("rId1", "officeDocument", "xl/workbook.xml")]).into_bytes(),
        ),
        (
            "xl/workbook.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{MAIN}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{sheet_name}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
            )
            .into_bytes(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            rels_xml(&[
                ("rId1", "worksheet", "worksheets/sheet1.xml"),
                ("rId2", "sharedStrings", "sharedStrings.xml"),
            ])
            .into_bytes(),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{MAIN}"><sheetData>{sheet_data}</sheetData></worksheet>"#
            )
            .into_bytes(),
        ),
        (
            "xl/sharedStrings.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="{MAIN}" count="{n}" uniqueCount="{n}">{strings}</sst>"#,
                n = shared.len()
            )
            .into_bytes(),
        ),
    ])
}
