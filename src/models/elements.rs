// src/models/elements.rs

use serde::{Deserialize, Serialize};

/// A typed visual element of a Presentera slide.
/// The JSON representation is discriminated by a `type` field (`"text"`, `"shape"`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Shape(ShapeElement),
    Image(ImageElement),
    Table(TableElement),
    Chart(ChartElement),
}

/// Bounding box in canvas units, rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    /// Maps a DrawingML `algn` value; anything unrecognised is left-aligned.
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "ctr" => TextAlign::Center,
            "r" => TextAlign::Right,
            "just" | "justLow" | "dist" | "thaiDist" => TextAlign::Justify,
            _ => TextAlign::Left,
        }
    }
}

/// Run-level typography shared by text elements and table cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: i64,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
}

/// One paragraph of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: String,
    pub content: String,
    #[serde(flatten)]
    pub frame: Frame,
    #[serde(flatten)]
    pub style: TextStyle,
    pub text_align: TextAlign,
    /// `#rrggbb`, or `null` when the run colour is inherited.
    pub color: Option<String>,
    pub rotation: i64,
}

/// The closed set of shape kinds the canvas editor can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeType {
    Rectangle,
    Circle,
    Square,
    RoundedRectangle,
    Line,
    Triangle,
    Star,
    Pentagon,
    Hexagon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    pub id: String,
    pub shape_type: ShapeType,
    #[serde(flatten)]
    pub frame: Frame,
    pub fill_color: Option<String>,
    /// `#rrggbb` or `"transparent"`.
    pub border_color: Option<String>,
    pub border_width: i64,
    pub rotation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub id: String,
    #[serde(flatten)]
    pub frame: Frame,
    /// `data:<mime>;base64,...`
    pub src: String,
    pub rotation: i64,
    pub locked: bool,
    pub is_background: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub text: String,
    pub bg_color: String,
    pub text_color: String,
    pub border_color: String,
    pub border_width: i64,
    #[serde(flatten)]
    pub style: TextStyle,
    pub align: TextAlign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableElement {
    pub id: String,
    #[serde(flatten)]
    pub frame: Frame,
    pub rows: usize,
    pub cols: usize,
    pub cell_width: i64,
    pub cell_height: i64,
    /// Row-major cell grid.
    pub data: Vec<Vec<TableCell>>,
    pub rotation: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Unknown,
}

/// A data point: numeric when the source is numeric, text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartValue {
    Number(f64),
    Text(String),
}

impl Default for ChartValue {
    fn default() -> Self {
        ChartValue::Number(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<ChartValue>,
    /// One colour per value (at least one).
    pub bar_colors: Vec<String>,
}

/// A chart. Bar, line and unknown charts carry `series` and the axis flags; pie charts carry
/// the first series as flat `values` with per-slice `barColors` and a primary `color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartElement {
    pub id: String,
    pub chart_type: ChartType,
    #[serde(flatten)]
    pub frame: Frame,
    pub chart_name: String,
    pub background_color: String,
    pub rotation: i64,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub show_x_axis: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub show_y_axis: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub series: Option<Vec<ChartSeries>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub values: Option<Vec<ChartValue>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bar_colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shape_serializes_with_type_tag_and_flat_frame() {
        let element = Element::Shape(ShapeElement {
            id: "s1".into(),
            shape_type: ShapeType::RoundedRectangle,
            frame: Frame {
                x: 1,
                y: 2,
                width: 3,
                height: 4,
            },
            fill_color: Some("#ff0000".into()),
            border_color: Some("transparent".into()),
            border_width: 0,
            rotation: 0,
        });
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["type"], "shape");
        assert_eq!(value["shapeType"], "roundedRectangle");
        assert_eq!(value["x"], 1);
        assert_eq!(value["height"], 4);
        assert_eq!(value["borderColor"], "transparent");
    }

    #[test]
    fn text_style_enums_use_css_spelling() {
        let style = TextStyle {
            font_size: 12,
            font_family: "Arial".into(),
            font_weight: FontWeight::Bold,
            font_style: FontStyle::Italic,
            text_decoration: TextDecoration::LineThrough,
        };
        let value = serde_json::to_value(style).unwrap();
        assert_eq!(
            value,
            json!({
                "fontSize": 12,
                "fontFamily": "Arial",
                "fontWeight": "bold",
                "fontStyle": "italic",
                "textDecoration": "line-through"
            })
        );
    }

    #[test]
    fn pie_chart_omits_series_fields() {
        let chart = Element::Chart(ChartElement {
            id: "c".into(),
            chart_type: ChartType::Pie,
            frame: Frame::default(),
            chart_name: "chart name".into(),
            background_color: "#ffffff".into(),
            rotation: 0,
            labels: vec!["a".into()],
            show_x_axis: None,
            show_y_axis: None,
            series: None,
            values: Some(vec![ChartValue::Number(3.0)]),
            bar_colors: Some(vec!["#10b981".into()]),
            color: Some("#10b981".into()),
        });
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["chartType"], "pie");
        assert!(value.get("series").is_none());
        assert!(value.get("showXAxis").is_none());
        assert_eq!(value["values"][0], 3.0);
    }

    #[test]
    fn alignment_mapping() {
        assert_eq!(TextAlign::from_ooxml("ctr"), TextAlign::Center);
        assert_eq!(TextAlign::from_ooxml("just"), TextAlign::Justify);
        assert_eq!(TextAlign::from_ooxml("r"), TextAlign::Right);
        assert_eq!(TextAlign::from_ooxml("l"), TextAlign::Left);
        assert_eq!(TextAlign::from_ooxml("bogus"), TextAlign::Left);
    }
}
