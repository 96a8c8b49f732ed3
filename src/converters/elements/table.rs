use super::geometry::{emu_to_pt, round_even, Placement};
use super::{first_run_style, new_id, paragraph_align, text_body_text, ExtractContext};
use crate::converters::fill;
use crate::models::elements::{TableCell, TableElement, TextAlign};
use crate::xml;
use roxmltree::Node;

pub const DEFAULT_CELL_BG: &str = "#FFFFFF";
pub const DEFAULT_CELL_TEXT: &str = "#000000";
pub const DEFAULT_CELL_BORDER: &str = "#FFFFFF";
pub const DEFAULT_CELL_BORDER_WIDTH: i64 = 2;

pub const HEADER_ROW_BG: &str = "#2196F3";
pub const ODD_ROW_BG: &str = "#BBDEFB";
pub const EVEN_ROW_BG: &str = "#E3F2FD";

const BORDER_SIDES: [&str; 4] = ["lnL", "lnR", "lnT", "lnB"];

/// Banded background of a row without explicit cell fills.
pub fn fallback_row_color(row: usize) -> &'static str {
    match row {
        0 => HEADER_ROW_BG,
        r if r % 2 == 1 => ODD_ROW_BG,
        _ => EVEN_ROW_BG,
    }
}

/// The `a:tbl` of a graphic frame.
pub fn table_of<'a, 'input>(frame: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    xml::path(frame, &["graphic", "graphicData", "tbl"])
}

fn cell_background(tc_pr: Option<Node<'_, '_>>, row: usize, ctx: &ExtractContext<'_>) -> String {
    let explicit = tc_pr.and_then(|props| {
        let spec = fill::resolve_fill(props, ctx.theme, None);
        fill::representative_color(&spec, ctx.theme)
    });
    match explicit {
        Some(color) => color,
        None if ctx.options.table_fallback_palette => fallback_row_color(row).to_string(),
        None => DEFAULT_CELL_BG.to_string(),
    }
}

fn line_width(ln: Node<'_, '_>) -> Option<i64> {
    xml::attr_i64(ln, "w").map(|w| round_even(emu_to_pt(w as f64)))
}

/// Colour and width of the first border side with a resolvable solid line.
fn cell_border(tc_pr: Option<Node<'_, '_>>, ctx: &ExtractContext<'_>) -> (String, i64) {
    let Some(tc_pr) = tc_pr else {
        return (DEFAULT_CELL_BORDER.to_string(), DEFAULT_CELL_BORDER_WIDTH);
    };
    let sides: Vec<Node<'_, '_>> = BORDER_SIDES
        .iter()
        .filter_map(|side| xml::child(tc_pr, side))
        .collect();

    let colored = sides.iter().find_map(|&ln| {
        let solid = xml::child(ln, "solidFill")?;
        let color = fill::resolve_first_color(solid, ctx.theme)?;
        Some((color, ln))
    });
    match colored {
        Some((color, ln)) => (color, line_width(ln).unwrap_or(DEFAULT_CELL_BORDER_WIDTH)),
        None => (
            DEFAULT_CELL_BORDER.to_string(),
            sides
                .iter()
                .find_map(|&ln| line_width(ln))
                .unwrap_or(DEFAULT_CELL_BORDER_WIDTH),
        ),
    }
}

fn extract_cell(tc: Node<'_, '_>, row: usize, ctx: &ExtractContext<'_>) -> TableCell {
    let tc_pr = xml::child(tc, "tcPr");
    let body = xml::child(tc, "txBody");
    let first_paragraph = body.and_then(|b| xml::child(b, "p"));

    let run = match first_paragraph {
        Some(p) => first_run_style(p, ctx.theme, ctx.options),
        None => super::RunStyle::default_for(ctx.options),
    };
    let (border_color, border_width) = cell_border(tc_pr, ctx);

    TableCell {
        text: body
            .map(|b| text_body_text(b).trim().to_string())
            .unwrap_or_default(),
        bg_color: cell_background(tc_pr, row, ctx),
        text_color: run.color.unwrap_or_else(|| DEFAULT_CELL_TEXT.to_string()),
        border_color,
        border_width,
        style: run.style,
        align: first_paragraph
            .map(paragraph_align)
            .unwrap_or(TextAlign::Left),
    }
}

/// Extracts a table; `None` when the frame carries no `a:tbl`.
pub fn extract_table(
    frame: Node<'_, '_>,
    placement: &Placement,
    ctx: &ExtractContext<'_>,
) -> Option<TableElement> {
    let tbl = table_of(frame)?;
    let data: Vec<Vec<TableCell>> = xml::children(tbl, "tr")
        .enumerate()
        .map(|(r, tr)| {
            xml::children(tr, "tc")
                .map(|tc| extract_cell(tc, r, ctx))
                .collect()
        })
        .collect();

    let rows = data.len();
    let cols = data.first().map(Vec::len).unwrap_or(0);
    let bounds = placement.frame();
    let per = |total: i64, count: usize| {
        if count > 0 {
            round_even(total as f64 / count as f64)
        } else {
            0
        }
    };

    Some(TableElement {
        id: new_id(),
        frame: bounds,
        rows,
        cols,
        cell_width: per(bounds.width, cols),
        cell_height: per(bounds.height, rows),
        data,
        rotation: placement.rotation,
    })
}
