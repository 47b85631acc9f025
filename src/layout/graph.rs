//! Anchor graph: directed anchor-to-anchor constraint edges with margins
//!
//! Every anchor has at most one outgoing edge. Horizontal anchors only
//! connect to horizontal anchors and vertical to vertical. The graph is
//! built once per request and is read-only afterwards.

use std::collections::HashMap;

use super::error::LayoutError;
use super::registry::ElementRegistry;
use super::types::{Anchor, AnchorRef, Axis, ElementIndex};

/// `source` is held at `margin` pixels from `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: AnchorRef,
    pub target: AnchorRef,
    pub margin: i32,
}

/// Per-request constraint graph over element anchors
#[derive(Debug, Default)]
pub struct AnchorGraph {
    edges: HashMap<AnchorRef, Edge>,
}

impl AnchorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the edge `source -> target`.
    ///
    /// Returns the edge it replaced, if `source` was already constrained.
    pub fn connect(
        &mut self,
        registry: &ElementRegistry,
        source: &Anchor,
        target: &Anchor,
        margin: i32,
    ) -> Result<Option<Edge>, LayoutError> {
        if source.side.axis() != target.side.axis() {
            return Err(LayoutError::AxisMismatch {
                from: source.to_string(),
                to: target.to_string(),
            });
        }
        let source_idx = registry.index_of(&source.element)?;
        let target_idx = registry.index_of(&target.element).map_err(|e| match e {
            LayoutError::UnknownElement { id, suggestions } => {
                LayoutError::dangling(source.to_string(), id, suggestions)
            }
            other => other,
        })?;

        let edge = Edge {
            source: AnchorRef::new(source_idx, source.side),
            target: AnchorRef::new(target_idx, target.side),
            margin: margin.max(0),
        };
        Ok(self.edges.insert(edge.source, edge))
    }

    /// The edge leaving `anchor`, if constrained
    pub fn outgoing(&self, anchor: AnchorRef) -> Option<&Edge> {
        self.edges.get(&anchor)
    }

    /// Edge leaving the leading anchor of `element` on `axis`
    pub fn leading_edge(&self, element: ElementIndex, axis: Axis) -> Option<&Edge> {
        self.outgoing(AnchorRef::new(element, axis.leading()))
    }

    /// Edge leaving the trailing anchor of `element` on `axis`
    pub fn trailing_edge(&self, element: ElementIndex, axis: Axis) -> Option<&Edge> {
        self.outgoing(AnchorRef::new(element, axis.trailing()))
    }

    /// True if at least one anchor of `element` on `axis` is constrained
    pub fn is_constrained(&self, element: ElementIndex, axis: Axis) -> bool {
        self.leading_edge(element, axis).is_some() || self.trailing_edge(element, axis).is_some()
    }

    /// True if both the leading and trailing anchors on `axis` are constrained
    pub fn has_opposing_pair(&self, element: ElementIndex, axis: Axis) -> bool {
        self.leading_edge(element, axis).is_some() && self.trailing_edge(element, axis).is_some()
    }

    /// Edges leaving `element` on `axis`, leading first
    pub fn edges_of(&self, element: ElementIndex, axis: Axis) -> impl Iterator<Item = &Edge> {
        self.leading_edge(element, axis)
            .into_iter()
            .chain(self.trailing_edge(element, axis))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{Side, SizeSpec};

    fn registry() -> ElementRegistry {
        let mut registry = ElementRegistry::new();
        for id in ["parent", "a", "b"] {
            registry
                .register(id, SizeSpec::Fixed(10), SizeSpec::Fixed(10))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_connect_and_query() {
        let registry = registry();
        let mut graph = AnchorGraph::new();
        graph
            .connect(
                &registry,
                &Anchor::new("a", Side::Left),
                &Anchor::new("parent", Side::Left),
                8,
            )
            .unwrap();

        let a = registry.index_of("a").unwrap();
        let edge = graph.outgoing(AnchorRef::new(a, Side::Left)).unwrap();
        assert_eq!(edge.margin, 8);
        assert_eq!(edge.target.element, registry.container().unwrap());
        assert!(graph.is_constrained(a, Axis::Horizontal));
        assert!(!graph.is_constrained(a, Axis::Vertical));
        assert!(!graph.has_opposing_pair(a, Axis::Horizontal));

        graph
            .connect(
                &registry,
                &Anchor::new("a", Side::Right),
                &Anchor::new("b", Side::Left),
                0,
            )
            .unwrap();
        assert!(graph.has_opposing_pair(a, Axis::Horizontal));
        assert_eq!(graph.edges_of(a, Axis::Horizontal).count(), 2);
    }

    #[test]
    fn test_axis_mismatch() {
        let registry = registry();
        let mut graph = AnchorGraph::new();
        let err = graph
            .connect(
                &registry,
                &Anchor::new("a", Side::Left),
                &Anchor::new("b", Side::Top),
                0,
            )
            .unwrap_err();
        assert!(matches!(err, LayoutError::AxisMismatch { .. }));
        assert!(err.to_string().contains("a.left"));
    }

    #[test]
    fn test_dangling_reference() {
        let registry = registry();
        let mut graph = AnchorGraph::new();
        let err = graph
            .connect(
                &registry,
                &Anchor::new("a", Side::Top),
                &Anchor::new("c", Side::Bottom),
                0,
            )
            .unwrap_err();
        match err {
            LayoutError::DanglingReference { from, target, .. } => {
                assert_eq!(from, "a.top");
                assert_eq!(target, "c");
            }
            other => panic!("Expected DanglingReference, got: {:?}", other),
        }
    }

    #[test]
    fn test_reconnect_replaces_edge() {
        let registry = registry();
        let mut graph = AnchorGraph::new();
        let first = graph
            .connect(
                &registry,
                &Anchor::new("a", Side::Right),
                &Anchor::new("parent", Side::Right),
                0,
            )
            .unwrap();
        assert!(first.is_none());
        let replaced = graph
            .connect(
                &registry,
                &Anchor::new("a", Side::Right),
                &Anchor::new("b", Side::Left),
                4,
            )
            .unwrap();
        assert!(replaced.is_some());
        assert_eq!(graph.len(), 1);
    }
}
