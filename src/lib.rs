//! Layout Solver - resolves anchor-constrained rectangle layouts
//!
//! A request lists rectangles (views) inside a `parent` container. Each view
//! pins its edges to edges of other views with margins, optionally forming
//! chains, and the solver computes absolute integer geometry for all of them.
//!
//! # Example
//!
//! ```rust
//! use layout_solver::{solve_json, LayoutConfig};
//!
//! let tree = solve_json(
//!     r#"{"layout": [
//!         {"android:id": "parent", "android:layout_width": "1000px",
//!          "android:layout_height": "1000px"},
//!         {"android:id": "box", "android:layout_width": "100px",
//!          "android:layout_height": "50px",
//!          "app:layout_constraintLeft_toLeftOf": "parent",
//!          "app:layout_constraintRight_toRightOf": "parent"}
//!     ]}"#,
//!     &LayoutConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(tree.components[0].location.x, 450);
//! ```

pub mod emitter;
pub mod error;
pub mod layout;
pub mod request;
pub mod service;

pub use emitter::{emit, Component, ContentFrame, LayoutTree, CONTENT_FRAME_NAME};
pub use error::ParseError;
pub use layout::{compute_layout, ComputedLayout, LayoutConfig, LayoutError, LayoutRequest};
pub use request::{parse_request, ParsedRequest, RequestDescriptor};

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while solving one request
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

impl Error {
    /// Message including "did you mean" hints where available
    pub fn detailed_message(&self) -> String {
        match self {
            Error::Parse(e) => format!("parse error: {e}"),
            Error::Layout(e) => format!("layout error: {}", e.detailed_message()),
        }
    }
}

/// Solve a typed request
pub fn solve(request: &LayoutRequest, config: &LayoutConfig) -> Result<LayoutTree, Error> {
    let layout = compute_layout(request, config)?;
    Ok(emit(layout, request.x_offset, request.y_offset, Vec::new())?)
}

/// Solve a parsed request, keeping its parse warnings
pub fn solve_parsed(parsed: ParsedRequest, config: &LayoutConfig) -> Result<LayoutTree, Error> {
    let request = parsed.request;
    let layout = compute_layout(&request, config)?;
    Ok(emit(
        layout,
        request.x_offset,
        request.y_offset,
        parsed.warnings,
    )?)
}

/// Parse and solve a JSON request
pub fn solve_json(source: &str, config: &LayoutConfig) -> Result<LayoutTree, Error> {
    solve_parsed(parse_request(source, config)?, config)
}

/// Outcome of one request as reported to callers: a layout or an error message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResponse {
    #[serde(flatten)]
    pub tree: Option<LayoutTree>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LayoutResponse {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<LayoutTree, Error>> for LayoutResponse {
    fn from(result: Result<LayoutTree, Error>) -> Self {
        match result {
            Ok(tree) => LayoutResponse {
                tree: Some(tree),
                error: None,
            },
            Err(e) => {
                let message = e.detailed_message();
                tracing::warn!(error = %message, "request failed");
                LayoutResponse {
                    tree: None,
                    error: Some(message),
                }
            }
        }
    }
}

/// Solve a typed request, reporting failure as data
pub fn resolve(request: &LayoutRequest, config: &LayoutConfig) -> LayoutResponse {
    solve(request, config).into()
}

/// Parse and solve a JSON request, reporting failure as data
pub fn resolve_json(source: &str, config: &LayoutConfig) -> LayoutResponse {
    solve_json(source, config).into()
}

/// Solve an already-decoded JSON request, reporting failure as data
pub fn resolve_value(value: serde_json::Value, config: &LayoutConfig) -> LayoutResponse {
    RequestDescriptor::from_value(value)
        .and_then(|descriptor| descriptor.to_request(config))
        .map_err(Error::from)
        .and_then(|parsed| solve_parsed(parsed, config))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout::{ElementSpec, Rect, Side, SizeSpec, CONTAINER_ID};

    fn container() -> ElementSpec {
        ElementSpec::new(CONTAINER_ID, SizeSpec::Fixed(1000), SizeSpec::Fixed(1000))
    }

    #[test]
    fn test_solve_applies_offset() {
        let request = LayoutRequest::new(vec![
            container(),
            ElementSpec::new("box", SizeSpec::Fixed(200), SizeSpec::Fixed(100))
                .with_margin(Side::Left, 10)
                .constrain(Side::Left, CONTAINER_ID, Side::Left),
        ])
        .with_offset(0, 50);

        let tree = solve(&request, &LayoutConfig::default()).unwrap();
        assert_eq!(tree.content_frame.location, Rect::new(0, 50, 1000, 1000));
        assert_eq!(tree.component("box").unwrap().location, Rect::new(10, 50, 200, 100));
    }

    #[test]
    fn test_resolve_reports_errors_as_data() {
        let request = LayoutRequest::new(vec![
            container(),
            ElementSpec::new("box", SizeSpec::Fixed(1), SizeSpec::Fixed(1)).constrain(
                Side::Left,
                "bx",
                Side::Left,
            ),
        ]);
        let response = resolve(&request, &LayoutConfig::default());
        assert!(!response.is_ok());
        let error = response.error.unwrap();
        assert!(error.contains("'bx'"));
        assert!(error.contains("did you mean: box"));
    }

    #[test]
    fn test_response_serialization() {
        let ok = resolve_json(
            r#"{"layout": [{"android:id": "parent", "android:layout_width": "10px",
                "android:layout_height": "10px"}]}"#,
            &LayoutConfig::default(),
        );
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["content_frame"]["location"], serde_json::json!([0, 0, 10, 10]));

        let failed = resolve_json("not json", &LayoutConfig::default());
        let json = serde_json::to_value(&failed).unwrap();
        assert!(json["error"].as_str().unwrap().starts_with("parse error"));
        assert!(json.get("components").is_none());
    }

    #[test]
    fn test_resolve_value() {
        let value = serde_json::json!({
            "layout": [
                {"android:id": "parent", "android:layout_width": "100px",
                 "android:layout_height": "100px"},
                {"android:id": "a", "android:layout_width": "10.5dp",
                 "android:layout_height": "10px"}
            ]
        });
        let response = resolve_value(value, &LayoutConfig::default());
        let tree = response.tree.unwrap();
        assert_eq!(tree.components[0].location, Rect::new(0, 0, 21, 10));
        assert_eq!(tree.warnings.len(), 1);
    }
}
