//! Layout engine for computing element positions and sizes
//!
//! This module takes a typed [`LayoutRequest`], registers its elements,
//! builds the anchor graph and resolves it into a [`ComputedLayout`] with
//! one rectangle per element.

pub mod chain;
pub mod config;
pub mod error;
pub mod graph;
pub mod registry;
pub mod resolver;
pub mod solver;
pub mod types;

pub use chain::{detect_chains, Chain, ChainSet};
pub use config::LayoutConfig;
pub use error::LayoutError;
pub use graph::{AnchorGraph, Edge};
pub use registry::{Element, ElementRegistry};
pub use resolver::{resolve_layout, Resolution, ResolutionState};
pub use types::*;

/// Final geometry of one non-container element
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedElement {
    pub id: String,
    pub bounds: Rect,
}

/// Result of laying out a request, before output offsets are applied
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedLayout {
    /// Full container frame at the origin
    pub frame: Rect,
    /// Container frame minus padding
    pub content: Rect,
    /// Every element except the container, in input order
    pub elements: Vec<PlacedElement>,
    pub warnings: Vec<String>,
}

impl ComputedLayout {
    pub fn get(&self, id: &str) -> Option<&PlacedElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}

fn check_range(what: impl FnOnce() -> String, value: i32) -> Result<(), LayoutError> {
    match checked_pixels(i64::from(value)) {
        Some(_) => Ok(()),
        None => Err(LayoutError::out_of_range(what(), i64::from(value))),
    }
}

/// Reject declared sizes, margins and padding beyond the pixel range
fn check_spec(spec: &ElementSpec) -> Result<(), LayoutError> {
    for axis in Axis::ALL {
        if let SizeSpec::Fixed(size) = spec.size(axis) {
            check_range(|| format!("{axis} size of '{}'", spec.id), size)?;
        }
        for side in [axis.leading(), axis.trailing()] {
            check_range(|| format!("{side} margin of '{}'", spec.id), spec.margins.get(side))?;
            check_range(|| format!("{side} padding of '{}'", spec.id), spec.padding.get(side))?;
        }
    }
    Ok(())
}

/// Register every element of `request`, in input order
pub fn build_registry(request: &LayoutRequest) -> Result<ElementRegistry, LayoutError> {
    let mut registry = ElementRegistry::new();
    for spec in &request.elements {
        check_spec(spec)?;
        let element = registry.register(spec.id.as_str(), spec.width, spec.height)?;
        element.margins = spec.margins;
        for axis in Axis::ALL {
            element.set_bias(axis, spec.bias(axis));
            element.set_chain_style(axis, spec.chain_style(axis));
        }
    }
    if registry.container().is_none() {
        return Err(LayoutError::MissingContainer);
    }
    Ok(registry)
}

/// Build the anchor graph from every declared constraint.
///
/// Returns the graph and a warning for each constraint that replaced an
/// earlier one on the same side. Constraints declared on the container
/// are ignored.
pub fn build_graph(
    registry: &ElementRegistry,
    request: &LayoutRequest,
) -> Result<(AnchorGraph, Vec<String>), LayoutError> {
    let mut graph = AnchorGraph::new();
    let mut warnings = Vec::new();

    for spec in &request.elements {
        if spec.id == CONTAINER_ID {
            if !spec.constraints.is_empty() {
                tracing::debug!(count = spec.constraints.len(), "ignoring container constraints");
            }
            continue;
        }
        for constraint in &spec.constraints {
            let source = Anchor::new(spec.id.as_str(), constraint.side);
            let margin = spec.margins.get(constraint.side);
            if let Some(replaced) = graph.connect(registry, &source, &constraint.target, margin)? {
                let previous = &registry.element(replaced.target.element).id;
                warnings.push(format!(
                    "'{source}' was constrained to {previous}.{}; replaced by {}",
                    replaced.target.side, constraint.target
                ));
            }
        }
    }

    Ok((graph, warnings))
}

/// Lay out a request
pub fn compute_layout(
    request: &LayoutRequest,
    config: &LayoutConfig,
) -> Result<ComputedLayout, LayoutError> {
    check_range(|| "x_offset".to_string(), request.x_offset)?;
    check_range(|| "y_offset".to_string(), request.y_offset)?;
    let mut registry = build_registry(request)?;
    let (graph, mut warnings) = build_graph(&registry, request)?;
    let mut padding = request
        .elements
        .iter()
        .find(|spec| spec.id == CONTAINER_ID)
        .map(|spec| spec.padding)
        .unwrap_or_default();
    for side in [Side::Left, Side::Top, Side::Right, Side::Bottom] {
        if padding.get(side) < 0 {
            warnings.push(format!(
                "negative {side} padding {} on '{CONTAINER_ID}' treated as 0",
                padding.get(side)
            ));
            padding.set(side, 0);
        }
    }

    let resolution = resolve_layout(&mut registry, &graph, padding, config)?;
    warnings.extend(resolution.warnings);

    let elements = registry
        .iter()
        .filter(|(_, element)| !element.is_container())
        .map(|(_, element)| {
            let bounds = element.geometry().ok_or_else(|| {
                LayoutError::Internal(format!("element '{}' left unresolved", element.id))
            })?;
            Ok(PlacedElement {
                id: element.id.clone(),
                bounds,
            })
        })
        .collect::<Result<Vec<_>, LayoutError>>()?;

    tracing::debug!(
        elements = elements.len(),
        edges = graph.len(),
        warnings = warnings.len(),
        "layout computed"
    );

    Ok(ComputedLayout {
        frame: resolution.frame,
        content: resolution.content,
        elements,
        warnings,
    })
}

/// Edit distance between two strings, for "did you mean" suggestions
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Up to three candidates within `max_distance` edits of `target`, closest first
pub(crate) fn find_similar<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut close: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist > 0 && dist <= max_distance).then_some((dist, name))
        })
        .collect();

    close.sort_unstable();
    close
        .into_iter()
        .take(3)
        .map(|(_, name)| name.to_string())
        .collect()
}
