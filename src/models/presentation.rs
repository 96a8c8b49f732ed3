use crate::errors::Result;
use crate::models::slide::Slide;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const DOCUMENT_VERSION: &str = "1.0";

/// The root of the Presentera JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationDocument {
    /// Slides in presentation order.
    pub slides: Vec<Slide>,
    pub current_slide_index: usize,
    pub version: String,
    /// UTC timestamp, ISO-8601 with a trailing `Z`.
    pub exported_at: String,
}

impl PresentationDocument {
    /// Wraps slides into a document stamped with the current time.
    pub fn new(slides: Vec<Slide>) -> Self {
        Self {
            slides,
            current_slide_index: 0,
            version: DOCUMENT_VERSION.to_string(),
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_header_fields() {
        let doc = PresentationDocument::new(Vec::new());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["currentSlideIndex"], 0);
        assert_eq!(value["version"], "1.0");
        let exported = value["exportedAt"].as_str().unwrap();
        assert!(exported.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(exported).is_ok());
    }

    #[test]
    fn compact_and_pretty_output() {
        let doc = PresentationDocument::new(Vec::new());
        assert!(!doc.to_json_string(false).unwrap().contains('\n'));
        assert!(doc.to_json_string(true).unwrap().contains('\n'));
    }
}
