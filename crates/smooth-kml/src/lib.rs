//! Smooth KML - Application Library
//!
//! Reads a KML file of area outlines, removes sparsely populated areas, thins every polygon
//! with [`boundary_thinning`], replaces bulky attribute data by plain `<name>` elements and
//! writes the smaller file.

pub mod document;
pub mod kml;
pub mod logging;
mod run;
pub mod settings;

pub use document::{Document, Element, Node};
pub use kml::{ProcessOptions, ProcessReport, SmoothingStats, process};
pub use run::{RunReport, run};
pub use settings::Settings;

use boundary_thinning::ThinError;

/// Error types for document processing
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output is not valid UTF-8: {0}")]
    Encoding(std::str::Utf8Error),

    #[error("Invalid coordinates element #{index}: {source}")]
    Coordinates {
        index: usize,
        #[source]
        source: ThinError,
    },

    #[error("Invalid population value: {0:?}")]
    InvalidPopulation(String),

    #[error("Unbalanced document: unclosed or unexpected end tag")]
    UnbalancedDocument,

    #[error("Invalid params file: {0}")]
    Params(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocumentError>;
