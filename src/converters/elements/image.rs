use super::geometry::Placement;
use super::{new_id, ExtractContext};
use crate::converters::fill;
use crate::models::elements::ImageElement;
use crate::models::fill::{FillKind, FillSpec};
use crate::package;
use crate::xml;
use log::warn;
use roxmltree::Node;

/// The node holding the picture's `a:blip`: `blipFill` of a `p:pic`, any blip inside a
/// graphic frame, or a picture fill of a shape's `spPr`.
pub fn image_source<'a, 'input>(shape: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    match shape.tag_name().name() {
        "pic" => xml::child(shape, "blipFill"),
        "graphicFrame" => xml::descendant(shape, "blip"),
        _ => {
            let sp_pr = xml::child(shape, "spPr")?;
            match fill::fill_element(sp_pr)? {
                (FillKind::Image, blip_fill) => Some(blip_fill),
                _ => None,
            }
        }
    }
}

pub fn has_image(shape: Node<'_, '_>) -> bool {
    image_source(shape).is_some_and(|source| {
        xml::is(source, "blip") || xml::descendant(source, "blip").is_some()
    })
}

/// Extracts a picture; `None` when its bytes cannot be found in the package.
pub fn extract_image(
    shape: Node<'_, '_>,
    placement: &Placement,
    ctx: &ExtractContext<'_>,
) -> Option<ImageElement> {
    let source = image_source(shape)?;
    let (bytes, mime) = match fill::resolve_image(source, ctx.package, ctx.slide_part) {
        Some(FillSpec::Image { bytes, mime }) => (bytes, mime),
        _ => {
            warn!("Picture on {} has no readable image data", ctx.slide_part);
            return None;
        }
    };
    Some(ImageElement {
        id: new_id(),
        frame: placement.frame(),
        src: package::data_url(&mime, &bytes),
        rotation: placement.rotation,
        locked: false,
        is_background: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::elements::geometry::{placement_of, GroupTransform};
    use crate::converters::theme::ThemeMapping;
    use crate::options::ConvertOptions;
    use crate::test_support::{png_bytes, shape, DeckBuilder, NS};
    use roxmltree::Document;

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";

    fn run(shape_xml: &str) -> (bool, Option<ImageElement>) {
        let package = DeckBuilder::new()
            .slide_with_rels(
                "<p:cSld/>",
                &[
                    ("rId2", "image", "../media/image1.png"),
                    ("rId3", "image", "../media/anim.gif"),
                ],
            )
            .media("ppt/media/image1.png", png_bytes(1, 1, [0, 0, 0, 255]))
            .media("ppt/media/anim.gif", GIF.to_vec())
            .package();
        let theme = ThemeMapping::default();
        let options = ConvertOptions::default();
        let ctx = ExtractContext {
            package: &package,
            theme: &theme,
            slide_part: "ppt/slides/slide1.xml",
            options: &options,
        };
        let text = format!(r#"<p:spTree {NS}>{shape_xml}</p:spTree>"#);
        let doc = Document::parse(&text).unwrap();
        let node = xml::element_children(doc.root_element()).next().unwrap();
        let placement = placement_of(node, &GroupTransform::identity()).unwrap();
        (has_image(node), extract_image(node, &placement, &ctx))
    }

    #[test]
    fn picture_becomes_png_data_url() {
        let pic = r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm rot="-5400000"><a:off x="0" y="12700"/><a:ext cx="914400" cy="914400"/></a:xfrm><a:prstGeom prst="rect"/></p:spPr></p:pic>"#;
        let (detected, image) = run(pic);
        assert!(detected);
        let image = image.unwrap();
        assert!(image.src.starts_with("data:image/png;base64,"));
        assert_eq!((image.frame.y, image.frame.width), (1, 72));
        assert_eq!(image.rotation, -90);
        assert!(!image.locked);
        assert!(!image.is_background);
    }

    #[test]
    fn shape_with_picture_fill_is_an_image() {
        let fill = r#"<a:blipFill><a:blip r:embed="rId3"/><a:stretch/></a:blipFill>"#;
        let (detected, image) = run(&shape(6, (0, 0, 100, 100), fill, ""));
        assert!(detected);
        assert!(image.unwrap().src.starts_with("data:image/gif;base64,"));
    }

    #[test]
    fn missing_media_yields_nothing() {
        let fill = r#"<a:blipFill><a:blip r:embed="rId99"/></a:blipFill>"#;
        let (detected, image) = run(&shape(6, (0, 0, 100, 100), fill, ""));
        assert!(detected);
        assert!(image.is_none());

        let (detected, _) = run(&shape(7, (0, 0, 100, 100), "<a:solidFill/>", ""));
        assert!(!detected);
    }
}
