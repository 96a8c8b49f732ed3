use super::background::{BackgroundPosition, BackgroundRepeat, BackgroundResolution, BackgroundSize};
use super::elements::Element;
use serde::{Deserialize, Serialize};

/// One slide of the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: String,
    pub elements: Vec<Element>,
    /// Always `null`; previews are rendered by the editor.
    pub thumbnail: Option<String>,
    pub background_color: Option<String>,
    pub background_image: Option<String>,
    pub background_size: Option<BackgroundSize>,
    pub background_position: Option<BackgroundPosition>,
    pub background_repeat: Option<BackgroundRepeat>,
}

impl Slide {
    pub fn new(id: String, elements: Vec<Element>, background: BackgroundResolution) -> Self {
        Self {
            id,
            elements,
            thumbnail: None,
            background_color: background.color,
            background_image: background.image,
            background_size: background.size,
            background_position: background.position,
            background_repeat: background.repeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_background_emits_css_hints() {
        let slide = Slide::new(
            "id".into(),
            Vec::new(),
            BackgroundResolution::image("data:image/png;base64,AA=="),
        );
        let value = serde_json::to_value(&slide).unwrap();
        assert_eq!(value["backgroundColor"], serde_json::Value::Null);
        assert_eq!(value["backgroundSize"], "cover");
        assert_eq!(value["backgroundPosition"], "center");
        assert_eq!(value["backgroundRepeat"], "no-repeat");
        assert_eq!(value["thumbnail"], serde_json::Value::Null);
    }

    #[test]
    fn solid_background_leaves_image_fields_null() {
        let slide = Slide::new("id".into(), Vec::new(), BackgroundResolution::solid("#123456"));
        let value = serde_json::to_value(&slide).unwrap();
        assert_eq!(value["backgroundColor"], "#123456");
        assert_eq!(value["backgroundImage"], serde_json::Value::Null);
        assert_eq!(value["backgroundRepeat"], serde_json::Value::Null);
    }
}
