use crate::errors::{ConversionError, Result};
use serde::{Deserialize, Serialize};

/// Width of the Presentera editor canvas.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1024.0;
/// Height of the Presentera editor canvas.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 576.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE_PT: i64 = 12;

/// Settings of one conversion. Use [`ConvertOptionsBuilder`] to validate custom values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Re-render picture backgrounds as cover-fit PNGs instead of embedding the original bytes.
    pub rasterize_image_backgrounds: bool,
    /// Colour table cells without an explicit fill with the banded header/odd/even palette.
    pub table_fallback_palette: bool,
    pub default_font_family: String,
    pub default_font_size: i64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            rasterize_image_backgrounds: false,
            table_fallback_palette: true,
            default_font_family: DEFAULT_FONT_FAMILY.to_string(),
            default_font_size: DEFAULT_FONT_SIZE_PT,
        }
    }
}

impl ConvertOptions {
    pub fn builder() -> ConvertOptionsBuilder {
        ConvertOptionsBuilder::new()
    }
}

/// Builder for [`ConvertOptions`].
#[derive(Default)]
pub struct ConvertOptionsBuilder {
    options: ConvertOptions,
}

impl ConvertOptionsBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the canvas size slides are scaled to.
    pub fn canvas_size(mut self, width: f64, height: f64) -> Self {
        self.options.canvas_width = width;
        self.options.canvas_height = height;
        self
    }

    pub fn rasterize_image_backgrounds(mut self, rasterize: bool) -> Self {
        self.options.rasterize_image_backgrounds = rasterize;
        self
    }

    pub fn table_fallback_palette(mut self, enabled: bool) -> Self {
        self.options.table_fallback_palette = enabled;
        self
    }

    pub fn default_font_family(mut self, family: impl Into<String>) -> Self {
        self.options.default_font_family = family.into();
        self
    }

    pub fn default_font_size(mut self, size_pt: i64) -> Self {
        self.options.default_font_size = size_pt;
        self
    }

    /// Builds the options.
    /// Returns an error if the canvas size is not positive and finite.
    pub fn build(self) -> Result<ConvertOptions> {
        let ConvertOptions {
            canvas_width,
            canvas_height,
            ..
        } = self.options;
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(canvas_width) || !valid(canvas_height) {
            return Err(ConversionError::InvalidInput(format!(
                "canvas size must be positive, got {canvas_width}x{canvas_height}"
            )));
        }
        if self.options.default_font_size <= 0 {
            return Err(ConversionError::InvalidInput(format!(
                "default font size must be positive, got {}",
                self.options.default_font_size
            )));
        }
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_presentera_canvas() {
        let options = ConvertOptions::default();
        assert_eq!(options.canvas_width, 1024.0);
        assert_eq!(options.canvas_height, 576.0);
        assert!(options.table_fallback_palette);
        assert!(!options.rasterize_image_backgrounds);
        assert_eq!(options.default_font_family, "Arial");
        assert_eq!(options.default_font_size, 12);
    }

    #[test]
    fn builder_sets_fields() {
        let options = ConvertOptions::builder()
            .canvas_size(1920.0, 1080.0)
            .rasterize_image_backgrounds(true)
            .table_fallback_palette(false)
            .default_font_family("Calibri")
            .default_font_size(18)
            .build()
            .unwrap();
        assert_eq!(options.canvas_width, 1920.0);
        assert!(options.rasterize_image_backgrounds);
        assert!(!options.table_fallback_palette);
        assert_eq!(options.default_font_family, "Calibri");
        assert_eq!(options.default_font_size, 18);
    }

    #[test]
    fn rejects_non_positive_canvas() {
        let err = ConvertOptions::builder()
            .canvas_size(0.0, 576.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInput(_)));
        assert!(ConvertOptions::builder()
            .canvas_size(1024.0, f64::NAN)
            .build()
            .is_err());
    }
}
