use serde::{Deserialize, Serialize};

/// A colour as written in a DrawingML colour element, before theme resolution.
///
/// `Scheme` keeps the `tint`, `shade` and `lumMod` modifiers verbatim (in
/// PowerPoint's 1/100000 units); they are applied only when the reference is
/// resolved against a theme.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ColorReference {
    /// A literal colour, already normalized to `#rrggbb`.
    Direct { hex: String },
    /// A reference to one of the theme's scheme slots (`accent1`, `bg1`, ...).
    Scheme {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tint: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        shade: Option<i64>,
        /// Captured but never applied.
        #[serde(skip_serializing_if = "Option::is_none")]
        lum_mod: Option<i64>,
    },
    /// No colour could be read from the element.
    #[default]
    None,
}

impl ColorReference {
    /// Shorthand for a scheme reference without modifiers.
    pub fn scheme(name: impl Into<String>) -> Self {
        ColorReference::Scheme {
            name: name.into(),
            tint: None,
            shade: None,
            lum_mod: None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ColorReference::None)
    }
}
