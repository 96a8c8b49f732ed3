// src/converters/elements/chart.rs

use super::geometry::Placement;
use super::{new_id, ExtractContext};
use crate::converters::fill;
use crate::models::elements::{ChartElement, ChartSeries, ChartType, ChartValue};
use crate::package::{PptxPackage, REL_PACKAGE};
use crate::xml;
use calamine::{Data, Range, Reader, Xlsx};
use indexmap::IndexMap;
use log::{debug, warn};
use roxmltree::{Document, Node};
use std::io::Cursor;

pub const DEFAULT_CHART_NAME: &str = "chart name";
pub const DEFAULT_SERIES_NAME: &str = "Series";
pub const CHART_BACKGROUND: &str = "#ffffff";

/// Colours of series without their own fill, by index.
pub const DEFAULT_PALETTE: [&str; 7] = [
    "#10b981", "#0ea5e9", "#8b5cf6", "#f59e0b", "#f43f5e", "#06b6d4", "#84cc16",
];

fn palette(index: usize) -> String {
    DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()].to_string()
}

/// Categories and named series of a chart, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub series: IndexMap<String, Vec<ChartValue>>,
}

/// The `c:chart` reference of a graphic frame.
pub fn chart_reference<'a, 'input>(frame: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    xml::path(frame, &["graphic", "graphicData", "chart"])
}

pub fn is_chart(frame: Node<'_, '_>) -> bool {
    chart_reference(frame).is_some()
}

pub fn detect_chart_type(chart_root: Node<'_, '_>) -> ChartType {
    let has = |name: &str| xml::descendant(chart_root, name).is_some();
    if has("barChart") || has("bar3DChart") {
        ChartType::Bar
    } else if has("lineChart") || has("line3DChart") {
        ChartType::Line
    } else if has("pieChart") || has("pie3DChart") || has("doughnutChart") {
        ChartType::Pie
    } else {
        ChartType::Unknown
    }
}

pub fn chart_title(chart_root: Node<'_, '_>) -> String {
    xml::descendant(chart_root, "title")
        .and_then(|title| xml::descendant(title, "t"))
        .and_then(|t| t.text())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_CHART_NAME.to_string())
}

fn series_nodes<'a, 'input: 'a>(
    chart_root: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    xml::descendants(chart_root, "ser")
}

fn series_name(ser: Node<'_, '_>) -> String {
    xml::child(ser, "tx")
        .and_then(|tx| xml::descendant(tx, "v"))
        .and_then(|v| v.text())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_SERIES_NAME.to_string())
}

/// `c:pt/c:v` texts of a cache, in document order.
fn cache_points<'a>(cache: Node<'a, '_>) -> Vec<&'a str> {
    xml::descendants(cache, "pt")
        .filter_map(|pt| xml::child(pt, "v"))
        .filter_map(|v| v.text())
        .collect()
}

fn parse_value(text: &str) -> ChartValue {
    match text.trim().parse::<f64>() {
        Ok(number) => ChartValue::Number(number),
        Err(_) => ChartValue::Text(text.to_string()),
    }
}

/// Categories from the first `c:cat` cache with points, series values from `c:numCache`.
pub fn read_cached_data(chart_root: Node<'_, '_>) -> ChartData {
    let categories = xml::descendants(chart_root, "cat")
        .filter_map(|cat| {
            xml::descendant(cat, "strCache").or_else(|| xml::descendant(cat, "numCache"))
        })
        .map(cache_points)
        .find(|points| !points.is_empty())
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut series = IndexMap::new();
    for ser in series_nodes(chart_root) {
        let values = xml::child(ser, "val")
            .map(|val| {
                xml::descendants(val, "numCache")
                    .flat_map(cache_points)
                    .map(parse_value)
                    .collect()
            })
            .unwrap_or_default();
        series.insert(series_name(ser), values);
    }
    ChartData { categories, series }
}

// --- Embedded workbook ---

/// A parsed `Sheet1!$A$2:$A$5` reference. Rows and columns are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub sheet: Option<String>,
    pub start: (u32, u32),
    pub end: (u32, u32),
}

fn parse_cell(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let col = letters
        .chars()
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)?
                .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
        })?
        .checked_sub(1)?;
    let row = digits.parse::<u32>().ok()?.checked_sub(1)?;
    Some((row, col))
}

/// Parses a chart data reference (`c:f`).
pub fn parse_range(formula: &str) -> Option<CellRange> {
    let formula = formula.trim();
    let (sheet, cells) = match formula.rsplit_once('!') {
        Some((sheet, cells)) => {
            let sheet = sheet
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .map(|s| s.replace("''", "'"))
                .unwrap_or_else(|| sheet.to_string());
            (Some(sheet), cells)
        }
        None => (None, formula),
    };
    let (first, last) = cells.split_once(':').unwrap_or((cells, cells));
    let start = parse_cell(first)?;
    let end = parse_cell(last)?;
    Some(CellRange {
        sheet,
        start: (start.0.min(end.0), start.1.min(end.1)),
        end: (start.0.max(end.0), start.1.max(end.1)),
    })
}

/// An embedded workbook with its sheets loaded on demand.
pub struct EmbeddedWorkbook {
    workbook: Xlsx<Cursor<Vec<u8>>>,
    sheets: IndexMap<String, Range<Data>>,
}

impl EmbeddedWorkbook {
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        match Xlsx::new(Cursor::new(bytes)) {
            Ok(workbook) => Some(Self {
                workbook,
                sheets: IndexMap::new(),
            }),
            Err(e) => {
                warn!("Embedded chart workbook could not be opened: {e}");
                None
            }
        }
    }

    /// The named sheet, or the first sheet when the name is absent or unknown.
    fn sheet(&mut self, name: Option<&str>) -> Option<&Range<Data>> {
        let names = self.workbook.sheet_names();
        let name = name
            .filter(|n| names.iter().any(|s| s == n))
            .map(str::to_string)
            .or_else(|| names.first().cloned())?;
        if !self.sheets.contains_key(&name) {
            match self.workbook.worksheet_range(&name) {
                Ok(range) => {
                    self.sheets.insert(name.clone(), range);
                }
                Err(e) => {
                    warn!("Sheet {name} of embedded workbook unreadable: {e}");
                    return None;
                }
            }
        }
        self.sheets.get(&name)
    }

    /// Cells of the first column of `range`, top to bottom.
    pub fn column(&mut self, range: &CellRange) -> Vec<Data> {
        let Some(sheet) = self.sheet(range.sheet.as_deref()) else {
            return Vec::new();
        };
        (range.start.0..=range.end.0)
            .map(|row| {
                sheet
                    .get_value((row, range.start.1))
                    .cloned()
                    .unwrap_or(Data::Empty)
            })
            .collect()
    }
}

fn data_to_value(cell: &Data) -> ChartValue {
    match cell {
        Data::Float(f) => ChartValue::Number(*f),
        Data::Int(i) => ChartValue::Number(*i as f64),
        Data::Bool(b) => ChartValue::Number(if *b { 1.0 } else { 0.0 }),
        Data::Empty => ChartValue::default(),
        Data::String(s) => ChartValue::Text(s.clone()),
        other => ChartValue::Text(other.to_string()),
    }
}

fn data_to_label(cell: &Data) -> String {
    match cell {
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn formula<'a>(ser: Node<'a, '_>, container: &str) -> Option<&'a str> {
    xml::child(ser, container)
        .and_then(|c| xml::descendant(c, "f"))
        .and_then(|f| f.text())
}

/// Reads categories and series through the ranges the chart references. Categories come
/// from the first series that yields any.
pub fn read_workbook_data(chart_root: Node<'_, '_>, workbook: &mut EmbeddedWorkbook) -> ChartData {
    let mut data = ChartData::default();
    for ser in series_nodes(chart_root) {
        if data.categories.is_empty() {
            if let Some(range) = formula(ser, "cat").and_then(parse_range) {
                data.categories = workbook.column(&range).iter().map(data_to_label).collect();
            }
        }
        let values = formula(ser, "val")
            .and_then(parse_range)
            .map(|range| workbook.column(&range).iter().map(data_to_value).collect())
            .unwrap_or_default();
        data.series.insert(series_name(ser), values);
    }
    data
}

/// The workbook behind a chart part: the first relationship whose target is under
/// `embeddings`.
pub fn embedded_workbook(package: &PptxPackage, chart_part: &str) -> Option<EmbeddedWorkbook> {
    let rels = package.relationships(chart_part);
    let rel = rels
        .iter()
        .find(|rel| {
            !rel.external && (rel.has_type(REL_PACKAGE) || rel.target.contains("embeddings"))
        })?;
    let part = package.resolve_target(chart_part, &rel.target);
    let bytes = package.read_part(&part)?;
    debug!("Chart {chart_part} reads its data from {part}");
    EmbeddedWorkbook::from_bytes(bytes)
}

/// Series colours from each series' own solid fill; `None` where there is none.
pub fn series_colors(chart_root: Node<'_, '_>, ctx: &ExtractContext<'_>) -> Vec<Option<String>> {
    series_nodes(chart_root)
        .map(|ser| {
            xml::child(ser, "spPr")
                .and_then(|sp_pr| xml::child(sp_pr, "solidFill"))
                .and_then(|solid| fill::resolve_first_color(solid, ctx.theme))
        })
        .collect()
}

/// Builds the chart element from its parts.
pub fn build_chart(
    chart_type: ChartType,
    chart_name: String,
    data: ChartData,
    colors: &[Option<String>],
    placement: &Placement,
) -> ChartElement {
    let color_at = |i: usize| {
        colors
            .get(i)
            .cloned()
            .flatten()
            .unwrap_or_else(|| palette(i))
    };
    let mut element = ChartElement {
        id: new_id(),
        chart_type,
        frame: placement.frame(),
        chart_name,
        background_color: CHART_BACKGROUND.to_string(),
        rotation: placement.rotation,
        labels: data.categories,
        show_x_axis: None,
        show_y_axis: None,
        series: None,
        values: None,
        bar_colors: None,
        color: None,
    };

    match chart_type {
        ChartType::Pie => {
            let values = data.series.into_values().next().unwrap_or_default();
            let bar_colors: Vec<String> = (0..values.len()).map(color_at).collect();
            element.color = Some(bar_colors.first().cloned().unwrap_or_else(|| palette(0)));
            element.values = Some(values);
            element.bar_colors = Some(bar_colors);
        }
        ChartType::Bar | ChartType::Line | ChartType::Unknown => {
            element.show_x_axis = Some(true);
            element.show_y_axis = Some(chart_type == ChartType::Line);
            element.series = Some(
                data.series
                    .into_iter()
                    .enumerate()
                    .map(|(i, (name, values))| ChartSeries {
                        bar_colors: vec![color_at(i); values.len().max(1)],
                        name,
                        values,
                    })
                    .collect(),
            );
        }
    }
    element
}

/// Extracts the chart of a graphic frame; `None` when the chart part is missing or invalid.
pub fn extract_chart(
    frame: Node<'_, '_>,
    placement: &Placement,
    ctx: &ExtractContext<'_>,
) -> Option<ChartElement> {
    let rel_id = chart_reference(frame).and_then(|c| xml::attr(c, "id"))?;
    let Some(chart_part) = ctx.package.related_part(ctx.slide_part, rel_id) else {
        warn!("Chart {rel_id} of {} has no part", ctx.slide_part);
        return None;
    };
    let text = ctx.package.read_xml(&chart_part)?;
    let doc = match Document::parse(xml::strip_bom(&text)) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Chart part {chart_part} is not valid XML: {e}");
            return None;
        }
    };
    let root = doc.root_element();

    let data = match embedded_workbook(ctx.package, &chart_part) {
        Some(mut workbook) => read_workbook_data(root, &mut workbook),
        None => read_cached_data(root),
    };
    let colors = series_colors(root, ctx);
    Some(build_chart(
        detect_chart_type(root),
        chart_title(root),
        data,
        &colors,
        placement,
    ))
}
