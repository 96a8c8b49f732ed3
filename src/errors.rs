use thiserror::Error;

/// Represents the document-level failures of a PPTX conversion.
///
/// Anything below the whole-document level (a missing image, an unparsable
/// layout, an unknown scheme colour) is recovered where it happens and never
/// surfaces here.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The input is not a readable ZIP container.
    #[error("Failed to read presentation archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An I/O error occurred while opening or reading the input file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A part that the whole conversion depends on could not be parsed.
    #[error("Failed to parse XML part: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A part that every presentation must contain is absent.
    #[error("Missing required package part: {0}")]
    MissingPart(String),

    /// The output document could not be serialized.
    #[error("Failed to serialize JSON document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid options or arguments were provided by the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A type alias for `Result<T, ConversionError>` for convenience within the crate.
pub type Result<T> = std::result::Result<T, ConversionError>;
