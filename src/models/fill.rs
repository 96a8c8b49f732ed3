use super::colors::ColorReference;
use serde::{Deserialize, Serialize};

/// The fill container found in a style-properties fragment (`spPr`, `bgPr`, `tcPr`, `rPr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillKind {
    Solid,
    Gradient,
    Image,
    Pattern,
    None,
}

/// One colour stop of a gradient. `position` is normalized to `0.0..=1.0` for well-formed
/// input, but out-of-range values are kept as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientStop {
    pub position: f64,
    pub color: String,
}

/// A resolved fill.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FillSpec {
    /// Solid colour; the reference is resolved against the theme by the consumer.
    Solid(ColorReference),
    /// Linear gradient. `angle` is in degrees, `0.0..360.0`; stops keep document order.
    Gradient {
        angle: f64,
        stops: Vec<GradientStop>,
    },
    /// Preset pattern (`pct50`, `dkDnDiag`, ...) with resolved colours.
    Pattern {
        pattern_type: String,
        fg: String,
        bg: String,
    },
    /// Picture fill with the bytes of the referenced media part.
    Image {
        bytes: Vec<u8>,
        mime: String,
    },
    #[default]
    None,
}
