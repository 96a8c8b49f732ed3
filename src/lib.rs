pub mod converters;
pub mod errors;
pub mod models;
pub mod options;
pub mod package;
pub mod xml;

#[cfg(test)]
mod test_support;

pub use converters::assembler::{convert_package, convert_pptx, convert_pptx_bytes, SlideAssembler};
pub use errors::{ConversionError, Result};
pub use models::presentation::PresentationDocument;
pub use options::ConvertOptions;

use wasm_bindgen::prelude::*;

/// Converts `.pptx` bytes to a compact Presentera JSON string with default options.
#[wasm_bindgen(js_name = convertPptxToJson)]
pub fn convert_pptx_to_json(bytes: &[u8]) -> std::result::Result<String, JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    convert_pptx_bytes(bytes.to_vec(), &ConvertOptions::default())
        .and_then(|doc| doc.to_json_string(false))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
