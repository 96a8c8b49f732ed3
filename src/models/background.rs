use serde::{Deserialize, Serialize};

/// CSS `background-size` values emitted for image backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSize {
    Cover,
}

/// CSS `background-position` values emitted for image backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundPosition {
    Center,
}

/// CSS `background-repeat` values emitted for image backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundRepeat {
    NoRepeat,
}

/// The background of one slide after walking the slide → layout → master chain.
///
/// Exactly one of `color` and `image` is set. The CSS hints accompany `image` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundResolution {
    pub color: Option<String>,
    pub image: Option<String>,
    pub size: Option<BackgroundSize>,
    pub position: Option<BackgroundPosition>,
    pub repeat: Option<BackgroundRepeat>,
}

impl BackgroundResolution {
    pub fn solid(hex: impl Into<String>) -> Self {
        Self {
            color: Some(hex.into()),
            image: None,
            size: None,
            position: None,
            repeat: None,
        }
    }

    /// An image background drawn with `cover` / `center` / `no-repeat`.
    pub fn image(data_url: impl Into<String>) -> Self {
        Self {
            color: None,
            image: Some(data_url.into()),
            size: Some(BackgroundSize::Cover),
            position: Some(BackgroundPosition::Center),
            repeat: Some(BackgroundRepeat::NoRepeat),
        }
    }

    pub fn is_image(&self) -> bool {
        self.image.is_some()
    }
}

impl Default for BackgroundResolution {
    fn default() -> Self {
        Self::solid("#ffffff")
    }
}
