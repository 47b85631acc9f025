//! Chain detection
//!
//! Two elements A and B are linked on an axis when A's trailing anchor is
//! constrained to B's leading anchor and B's leading anchor is constrained
//! back to A's trailing anchor. A chain is a maximal run of such links.

use std::collections::{HashMap, HashSet};

use super::config::LayoutConfig;
use super::graph::AnchorGraph;
use super::registry::ElementRegistry;
use super::types::{AnchorRef, Axis, ChainStyle, ElementIndex};

/// A run of two or more mutually linked elements on one axis
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub axis: Axis,
    /// Members from head to tail
    pub members: Vec<ElementIndex>,
    pub style: ChainStyle,
    /// Placement of a packed block inside the chain span
    pub bias: f64,
}

impl Chain {
    pub fn head(&self) -> ElementIndex {
        self.members[0]
    }

    pub fn tail(&self) -> ElementIndex {
        self.members[self.members.len() - 1]
    }
}

/// All chains of one axis, with per-element membership
#[derive(Debug, Default)]
pub struct ChainSet {
    chains: Vec<Chain>,
    membership: HashMap<ElementIndex, usize>,
}

impl ChainSet {
    pub fn get(&self, chain: usize) -> &Chain {
        &self.chains[chain]
    }

    /// Index of the chain `element` belongs to
    pub fn chain_of(&self, element: ElementIndex) -> Option<usize> {
        self.membership.get(&element).copied()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Element linked after `element` on `axis`, if any
fn next_link(graph: &AnchorGraph, element: ElementIndex, axis: Axis) -> Option<ElementIndex> {
    let edge = graph.trailing_edge(element, axis)?;
    if edge.target.side != axis.leading() || edge.target.element == element {
        return None;
    }
    let back = graph.outgoing(edge.target)?;
    (back.target == AnchorRef::new(element, axis.trailing())).then_some(edge.target.element)
}

/// Element linked before `element` on `axis`, if any
fn prev_link(graph: &AnchorGraph, element: ElementIndex, axis: Axis) -> Option<ElementIndex> {
    let edge = graph.leading_edge(element, axis)?;
    if edge.target.side != axis.trailing() || edge.target.element == element {
        return None;
    }
    let back = graph.outgoing(edge.target)?;
    (back.target == AnchorRef::new(element, axis.leading())).then_some(edge.target.element)
}

/// Find every chain on `axis`.
///
/// Style and bias come from the head element, falling back to the config
/// defaults. Closed rings of links are not chains and are left to the
/// general resolver.
pub fn detect_chains(
    registry: &ElementRegistry,
    graph: &AnchorGraph,
    axis: Axis,
    config: &LayoutConfig,
) -> ChainSet {
    let mut set = ChainSet::default();
    let container = registry.container();

    for (idx, _) in registry.iter() {
        if Some(idx) == container || set.membership.contains_key(&idx) {
            continue;
        }

        // Walk back to the head
        let mut head = idx;
        let mut seen = HashSet::from([idx]);
        let mut ring = false;
        while let Some(prev) = prev_link(graph, head, axis) {
            if Some(prev) == container {
                break;
            }
            if !seen.insert(prev) {
                ring = true;
                break;
            }
            head = prev;
        }
        if ring {
            continue;
        }

        // Walk forward from the head
        let mut members = vec![head];
        let mut current = head;
        let mut visited = HashSet::from([head]);
        while let Some(next) = next_link(graph, current, axis) {
            if Some(next) == container || !visited.insert(next) {
                break;
            }
            members.push(next);
            current = next;
        }
        if members.len() < 2 || members.iter().any(|m| set.membership.contains_key(m)) {
            continue;
        }

        let head_element = registry.element(head);
        let chain = Chain {
            axis,
            style: head_element
                .chain_style(axis)
                .unwrap_or(config.default_chain_style),
            bias: head_element.bias(axis).unwrap_or(config.default_bias),
            members,
        };
        tracing::debug!(
            %axis,
            head = %head_element.id,
            len = chain.members.len(),
            style = ?chain.style,
            "detected chain"
        );
        let chain_idx = set.chains.len();
        for member in &chain.members {
            set.membership.insert(*member, chain_idx);
        }
        set.chains.push(chain);
    }

    set
}
