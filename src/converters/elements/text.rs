use super::geometry::Placement;
use super::{
    first_run_style, new_id, paragraph_align, paragraph_run_text, text_body_text,
    ExtractContext, RunStyle,
};
use crate::models::elements::{TextAlign, TextElement};
use crate::xml;
use roxmltree::Node;

/// The `txBody` of a shape, if it has one.
pub fn text_body<'a, 'input>(shape: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    xml::child(shape, "txBody")
}

/// Whether a shape carries any non-blank text, counting fields and breaks.
pub fn has_text(shape: Node<'_, '_>) -> bool {
    text_body(shape).is_some_and(|body| !text_body_text(body).trim().is_empty())
}

/// Extracts the paragraphs of a shape's text frame. Every element shares the shape's frame.
///
/// When no paragraph has non-blank run text but the frame still shows text (fields only,
/// for example), a single element with the whole frame text is returned.
pub fn extract_text(
    shape: Node<'_, '_>,
    placement: &Placement,
    ctx: &ExtractContext<'_>,
) -> Vec<TextElement> {
    let Some(body) = text_body(shape) else {
        return Vec::new();
    };
    let mut elements: Vec<TextElement> = xml::children(body, "p")
        .filter_map(|p| {
            let content = paragraph_run_text(p);
            (!content.trim().is_empty()).then(|| paragraph_element(content, Some(p), placement, ctx))
        })
        .collect();

    if elements.is_empty() {
        let full = text_body_text(body);
        if !full.trim().is_empty() {
            elements.push(paragraph_element(
                full,
                xml::child(body, "p"),
                placement,
                ctx,
            ));
        }
    }
    elements
}

fn paragraph_element(
    content: String,
    paragraph: Option<Node<'_, '_>>,
    placement: &Placement,
    ctx: &ExtractContext<'_>,
) -> TextElement {
    let (run, text_align) = match paragraph {
        Some(p) => (
            first_run_style(p, ctx.theme, ctx.options),
            paragraph_align(p),
        ),
        None => (RunStyle::default_for(ctx.options), TextAlign::Left),
    };
    TextElement {
        id: new_id(),
        content,
        frame: placement.frame(),
        style: run.style,
        text_align,
        color: run.color,
        rotation: placement.rotation,
    }
}
