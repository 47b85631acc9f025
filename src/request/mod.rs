//! Input boundary: JSON requests with Android-style attributes

pub mod descriptor;
pub mod units;

pub use descriptor::{NumberOrString, ParsedRequest, RequestDescriptor, ViewDescriptor};
pub use units::{parse_dimension, Dimension, DimensionToken, Unit, UnitConverter};

use crate::error::ParseError;
use crate::layout::LayoutConfig;

/// Parse a JSON request into a typed layout request
pub fn parse_request(source: &str, config: &LayoutConfig) -> Result<ParsedRequest, ParseError> {
    RequestDescriptor::from_json(source)?.to_request(config)
}
