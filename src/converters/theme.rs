use super::color::{self, BLACK, WHITE};
use crate::models::colors::ColorReference;
use crate::package::PptxPackage;
use crate::xml;
use indexmap::IndexMap;
use log::{debug, warn};
use roxmltree::Document;

/// Maps the usage aliases onto the slot that stores the colour.
fn alias_of(name: &str) -> Option<&'static str> {
    match name {
        "bg1" => Some("lt1"),
        "tx1" => Some("dk1"),
        "bg2" => Some("lt2"),
        "tx2" => Some("dk2"),
        _ => None,
    }
}

/// Colour every deck is expected to define, used when the theme does not.
fn universal_fallback(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "lt1" | "bg1" | "lt2" | "bg2" => Some(WHITE),
        "dk1" | "tx1" | "dk2" | "tx2" => Some(BLACK),
        _ => None,
    }
}

/// Scheme slot name → `#rrggbb`, in theme order. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeMapping {
    colors: IndexMap<String, String>,
}

impl ThemeMapping {
    /// Parses the first `clrScheme` of a theme part. Any failure yields an empty mapping.
    pub fn from_theme_xml(theme_xml: &str) -> Self {
        let doc = match Document::parse(xml::strip_bom(theme_xml)) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Theme part is not valid XML, continuing without theme colours: {e}");
                return Self::default();
            }
        };
        let Some(scheme) = xml::descendant(doc.root(), "clrScheme") else {
            debug!("Theme has no clrScheme");
            return Self::default();
        };

        let mut colors = IndexMap::new();
        for slot in xml::element_children(scheme) {
            let found = xml::element_children(slot).find_map(|value| {
                if xml::is(value, "srgbClr") {
                    xml::attr(value, "val")
                } else if xml::is(value, "sysClr") {
                    xml::attr(value, "lastClr")
                } else {
                    None
                }
            });
            match found.and_then(color::normalize_hex) {
                Some(hex) => {
                    colors.insert(slot.tag_name().name().to_string(), hex);
                }
                None => debug!("Scheme slot {} has no usable colour", slot.tag_name().name()),
            }
        }
        Self { colors }
    }

    /// Loads the mapping for a package: the first master's theme, else the first theme part.
    pub fn from_package(package: &PptxPackage) -> Self {
        let Some(theme_part) = package.theme_part() else {
            debug!("Package has no theme part");
            return Self::default();
        };
        match package.read_xml(&theme_part) {
            Some(text) => {
                let mapping = Self::from_theme_xml(&text);
                debug!("Loaded {} scheme colours from {theme_part}", mapping.len());
                mapping
            }
            None => Self::default(),
        }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let colors = pairs
            .into_iter()
            .filter_map(|(name, hex)| Some((name.to_string(), color::normalize_hex(hex)?)))
            .collect();
        Self { colors }
    }

    /// The stored colour of a slot or alias, without any fallback.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.colors
            .get(name)
            .or_else(|| alias_of(name).and_then(|slot| self.colors.get(slot)))
            .map(String::as_str)
    }

    /// Base colour of a scheme name: the theme's value, then the white/black fallback for
    /// the background and text slots. Unknown names do not resolve.
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.get(name)
            .or_else(|| universal_fallback(name))
            .map(str::to_string)
    }

    /// Resolves a colour reference to `#rrggbb`, applying tint then shade to scheme colours.
    ///
    /// `lumMod` is carried on the reference but not applied.
    pub fn resolve(&self, reference: &ColorReference) -> Option<String> {
        match reference {
            ColorReference::Direct { hex } => color::normalize_hex(hex),
            ColorReference::Scheme {
                name, tint, shade, ..
            } => match self.lookup(name) {
                Some(base) => Some(color::apply_modifiers(&base, *tint, *shade)),
                None => {
                    debug!("Unresolved scheme colour {name}");
                    None
                }
            },
            ColorReference::None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DeckBuilder;

    const THEME: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="T">
      <a:themeElements>
        <a:clrScheme name="Custom">
          <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
          <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
          <a:dk2><a:srgbClr val="1F497D"/></a:dk2>
          <a:lt2><a:srgbClr val="EEECE1"/></a:lt2>
          <a:accent1><a:srgbClr val="FF0000"/></a:accent1>
          <a:accent2><a:prstClr val="red"/></a:accent2>
        </a:clrScheme>
        <a:clrScheme name="Ignored"><a:accent1><a:srgbClr val="00FF00"/></a:accent1></a:clrScheme>
      </a:themeElements>
    </a:theme>"#;

    #[test]
    fn reads_first_scheme_srgb_and_sys_colours() {
        let mapping = ThemeMapping::from_theme_xml(THEME);
        assert_eq!(mapping.get("accent1"), Some("#ff0000"));
        assert_eq!(mapping.get("dk1"), Some("#000000"));
        assert_eq!(mapping.get("lt2"), Some("#eeece1"));
        // A slot without srgbClr/sysClr is omitted, not defaulted.
        assert_eq!(mapping.get("accent2"), None);
        assert_eq!(mapping.len(), 5);
    }

    #[test]
    fn aliases_resolve_through_their_slot() {
        let mapping = ThemeMapping::from_theme_xml(THEME);
        assert_eq!(mapping.get("tx2"), Some("#1f497d"));
        assert_eq!(mapping.get("bg2"), Some("#eeece1"));
    }

    #[test]
    fn malformed_theme_yields_empty_mapping() {
        assert!(ThemeMapping::from_theme_xml("<a:theme").is_empty());
        assert!(ThemeMapping::from_theme_xml("<theme/>").is_empty());
    }

    #[test]
    fn empty_mapping_falls_back_for_standard_slots() {
        let empty = ThemeMapping::default();
        assert_eq!(empty.lookup("lt1").as_deref(), Some("#ffffff"));
        assert_eq!(empty.lookup("bg2").as_deref(), Some("#ffffff"));
        assert_eq!(empty.lookup("dk1").as_deref(), Some("#000000"));
        assert_eq!(empty.lookup("tx1").as_deref(), Some("#000000"));
        assert_eq!(empty.lookup("accent9"), None);
        assert_eq!(empty.resolve(&ColorReference::scheme("accent1")), None);
    }

    #[test]
    fn resolves_scheme_with_tint() {
        let mapping = ThemeMapping::from_pairs([("accent1", "FF0000")]);
        let reference = ColorReference::Scheme {
            name: "accent1".into(),
            tint: Some(40000),
            shade: None,
            lum_mod: Some(75000),
        };
        assert_eq!(mapping.resolve(&reference).as_deref(), Some("#ff6666"));
    }

    #[test]
    fn resolves_direct_and_none() {
        let mapping = ThemeMapping::default();
        assert_eq!(
            mapping
                .resolve(&ColorReference::Direct { hex: "ABCDEF".into() })
                .as_deref(),
            Some("#abcdef")
        );
        assert_eq!(mapping.resolve(&ColorReference::None), None);
    }

    #[test]
    fn loads_theme_from_package() {
        let package = DeckBuilder::new()
            .theme_color("accent1", "FF0000")
            .slide("<p:cSld/>")
            .package();
        let mapping = ThemeMapping::from_package(&package);
        assert_eq!(mapping.get("accent1"), Some("#ff0000"));
        assert_eq!(mapping.get("lt1"), Some("#ffffff"));

        let themeless = DeckBuilder::new().without_theme().slide("<p:cSld/>").package();
        assert!(ThemeMapping::from_package(&themeless).is_empty());
    }
}
