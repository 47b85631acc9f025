//! Resolution of anchor constraints into element geometry
//!
//! Each axis is resolved independently:
//!
//! 1. The container's content box seeds the only initially known anchors.
//! 2. Direct propagation: elements and chains whose edge targets are known
//!    are placed, repeatedly, until nothing more can be placed.
//! 3. Whatever is left depends on itself. Each such component must be
//!    attached to a known anchor somewhere; it is then solved as a linear
//!    system with kasuari.
//!
//! Bias, chain distribution and MatchConstraint sizing are applied while
//! placing. All rounding is half-up. Intermediate arithmetic is done in
//! `i64`; a span that does not fit the pixel range fails the request.

use std::collections::{BTreeMap, HashMap};

use super::chain::{detect_chains, Chain, ChainSet};
use super::config::LayoutConfig;
use super::error::LayoutError;
use super::graph::{AnchorGraph, Edge};
use super::registry::{Element, ElementRegistry};
use super::solver::{
    ConstraintSolver, ConstraintSource, LinearConstraint, Position, SolverError, SolverVariable,
};
use super::types::{
    checked_pixels, round_half_up, AnchorRef, Axis, AxisSpan, ChainStyle, ElementIndex, Insets,
    Rect, SizeSpec, CONTAINER_ID,
};

/// Outcome of resolving a whole request
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Full container frame, origin at (0, 0)
    pub frame: Rect,
    /// Container frame minus padding
    pub content: Rect,
    /// Degenerate fallbacks and other non-fatal observations
    pub warnings: Vec<String>,
}

/// Resolve every element of `registry` on both axes.
///
/// The container's frame is recorded as its geometry; all other elements
/// are positioned inside the padded content box.
pub fn resolve_layout(
    registry: &mut ElementRegistry,
    graph: &AnchorGraph,
    padding: Insets,
    config: &LayoutConfig,
) -> Result<Resolution, LayoutError> {
    let container = registry.container().ok_or(LayoutError::MissingContainer)?;
    let mut warnings = Vec::new();

    let width = container_extent(registry.element(container), Axis::Horizontal, &mut warnings);
    let height = container_extent(registry.element(container), Axis::Vertical, &mut warnings);
    let frame = Rect::new(0, 0, width, height);
    let content = Rect::new(
        padding.left,
        padding.top,
        (width - padding.left - padding.right).max(0),
        (height - padding.top - padding.bottom).max(0),
    );
    registry.set_geometry(CONTAINER_ID, frame)?;

    for axis in Axis::ALL {
        let chains = detect_chains(registry, graph, axis, config);
        AxisResolver::new(
            axis,
            registry,
            graph,
            chains,
            content.span(axis),
            config,
            &mut warnings,
        )
        .run()?;
    }

    Ok(Resolution {
        frame,
        content,
        warnings,
    })
}

fn container_extent(container: &Element, axis: Axis, warnings: &mut Vec<String>) -> i32 {
    match container.size(axis) {
        SizeSpec::Fixed(size) => size.max(0),
        other => {
            warnings.push(format!(
                "container {axis} size is {other:?}; treating it as 0"
            ));
            0
        }
    }
}

/// Lifecycle of a placement unit on one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    /// Part of a self-dependent component being solved
    Resolving,
    Resolved,
    Unsatisfiable,
}

/// Something placed in one step: a lone element or a whole chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Element(ElementIndex),
    Chain(usize),
}

struct AxisResolver<'a> {
    axis: Axis,
    registry: &'a mut ElementRegistry,
    graph: &'a AnchorGraph,
    chains: ChainSet,
    content: AxisSpan,
    config: &'a LayoutConfig,
    warnings: &'a mut Vec<String>,
    units: Vec<Unit>,
    states: Vec<ResolutionState>,
}

impl<'a> AxisResolver<'a> {
    fn new(
        axis: Axis,
        registry: &'a mut ElementRegistry,
        graph: &'a AnchorGraph,
        chains: ChainSet,
        content: AxisSpan,
        config: &'a LayoutConfig,
        warnings: &'a mut Vec<String>,
    ) -> Self {
        let container = registry.container();
        let mut units = Vec::new();
        let mut seen_chains = Vec::new();
        for (idx, _) in registry.iter() {
            if Some(idx) == container {
                continue;
            }
            match chains.chain_of(idx) {
                Some(chain) if !seen_chains.contains(&chain) => {
                    seen_chains.push(chain);
                    units.push(Unit::Chain(chain));
                }
                Some(_) => {}
                None => units.push(Unit::Element(idx)),
            }
        }
        let states = vec![ResolutionState::Unresolved; units.len()];

        Self {
            axis,
            registry,
            graph,
            chains,
            content,
            config,
            warnings,
            units,
            states,
        }
    }

    fn run(mut self) -> Result<(), LayoutError> {
        self.propagate()?;

        let pending: Vec<usize> = (0..self.units.len())
            .filter(|&u| self.states[u] == ResolutionState::Unresolved)
            .collect();
        if !pending.is_empty() {
            tracing::debug!(axis = %self.axis, units = pending.len(), "solving self-dependent units");
            self.solve_residual(&pending)?;
        }
        Ok(())
    }

    /// Place every unit whose targets are known, until a fixed point
    fn propagate(&mut self) -> Result<(), LayoutError> {
        loop {
            let mut progressed = false;
            for u in 0..self.units.len() {
                if self.states[u] != ResolutionState::Unresolved {
                    continue;
                }
                let placed = match self.units[u] {
                    Unit::Element(idx) => self.try_place_element(idx)?,
                    Unit::Chain(chain) => self.try_place_chain(chain)?,
                };
                if placed {
                    self.states[u] = ResolutionState::Resolved;
                    progressed = true;
                }
            }
            if !progressed {
                return Ok(());
            }
        }
    }

    /// Position of a known anchor on this axis
    fn anchor_position(&self, anchor: AnchorRef) -> Option<i64> {
        if Some(anchor.element) == self.registry.container() {
            return Some(if anchor.side.is_leading() {
                i64::from(self.content.start)
            } else {
                self.content.end()
            });
        }
        let span = self.registry.element(anchor.element).span(self.axis)?;
        Some(if anchor.side.is_leading() {
            i64::from(span.start)
        } else {
            span.end()
        })
    }

    /// Low bound implied by a leading edge; `Err(())` while its target is unknown
    fn low_bound(&self, edge: Option<&Edge>) -> Result<Option<i64>, ()> {
        match edge {
            Some(edge) => self
                .anchor_position(edge.target)
                .map(|p| Some(p + i64::from(edge.margin)))
                .ok_or(()),
            None => Ok(None),
        }
    }

    /// High bound implied by a trailing edge; `Err(())` while its target is unknown
    fn high_bound(&self, edge: Option<&Edge>) -> Result<Option<i64>, ()> {
        match edge {
            Some(edge) => self
                .anchor_position(edge.target)
                .map(|p| Some(p - i64::from(edge.margin)))
                .ok_or(()),
            None => Ok(None),
        }
    }

    fn match_parent_start(&self, element: &Element) -> i64 {
        i64::from(self.content.start) + i64::from(element.margins.get(self.axis.leading()))
    }

    fn match_parent_size(&self, element: &Element) -> i64 {
        let margins = element.margins;
        (i64::from(self.content.size)
            - i64::from(margins.get(self.axis.leading()))
            - i64::from(margins.get(self.axis.trailing())))
        .max(0)
    }

    /// Narrow a computed span of `idx`, failing the request if it leaves the pixel range
    fn checked_span(
        &self,
        idx: ElementIndex,
        start: i64,
        size: i64,
    ) -> Result<AxisSpan, LayoutError> {
        let id = &self.registry.element(idx).id;
        let start = checked_pixels(start).ok_or_else(|| {
            LayoutError::out_of_range(format!("{} position of '{id}'", self.axis), start)
        })?;
        let size = checked_pixels(size).ok_or_else(|| {
            LayoutError::out_of_range(format!("{} size of '{id}'", self.axis), size)
        })?;
        Ok(AxisSpan::new(start, size))
    }

    fn try_place_element(&mut self, idx: ElementIndex) -> Result<bool, LayoutError> {
        let axis = self.axis;
        let element = self.registry.element(idx);

        let span = if element.size(axis) == SizeSpec::MatchParent {
            self.checked_span(
                idx,
                self.match_parent_start(element),
                self.match_parent_size(element),
            )?
        } else {
            let low = self.low_bound(self.graph.leading_edge(idx, axis));
            let high = self.high_bound(self.graph.trailing_edge(idx, axis));
            let (Ok(low), Ok(high)) = (low, high) else {
                return Ok(false);
            };
            self.place(idx, low, high)?
        };

        tracing::debug!(
            axis = %axis,
            id = %self.registry.element(idx).id,
            start = span.start,
            size = span.size,
            "placed element"
        );
        self.registry.set_span(idx, axis, span)?;
        Ok(true)
    }

    /// Span of a non-chain element between its (optional) bounds
    fn place(
        &mut self,
        idx: ElementIndex,
        low: Option<i64>,
        high: Option<i64>,
    ) -> Result<AxisSpan, LayoutError> {
        let element = self.registry.element(idx);
        let content_start = i64::from(self.content.start);
        let (start, size) = match element.size(self.axis) {
            SizeSpec::Fixed(size) => {
                let size = i64::from(size);
                match (low, high) {
                    (Some(lo), Some(hi)) => {
                        // Overflowing elements stay on the leading edge
                        let extra = (hi - lo - size).max(0);
                        let bias = element.bias(self.axis).unwrap_or(self.config.default_bias);
                        (lo + round_half_up(extra as f64 * bias), size)
                    }
                    (Some(lo), None) => (lo, size),
                    (None, Some(hi)) => (hi - size, size),
                    (None, None) => (content_start, size),
                }
            }
            SizeSpec::MatchConstraint => match (low, high) {
                (Some(lo), Some(hi)) => (lo, (hi - lo).max(0)),
                (lo, hi) => {
                    let message = format!(
                        "'{}' matches constraints on the {} axis without two opposing anchors; size collapsed to 0",
                        element.id, self.axis
                    );
                    tracing::warn!("{message}");
                    self.warnings.push(message);
                    (lo.or(hi).unwrap_or(content_start), 0)
                }
            },
            SizeSpec::MatchParent => (
                self.match_parent_start(element),
                self.match_parent_size(element),
            ),
        };
        self.checked_span(idx, start, size)
    }

    /// Declared size of a chain member; `None` for MatchConstraint
    fn member_size(&self, member: ElementIndex) -> Option<i64> {
        let element = self.registry.element(member);
        match element.size(self.axis) {
            SizeSpec::Fixed(size) => Some(i64::from(size)),
            SizeSpec::MatchParent => Some(self.match_parent_size(element)),
            SizeSpec::MatchConstraint => None,
        }
    }

    /// Margins between consecutive chain members
    fn chain_gaps(&self, chain: &Chain) -> Vec<i64> {
        chain
            .members
            .windows(2)
            .map(|pair| {
                let after = self.graph.trailing_edge(pair[0], self.axis).map_or(0, |e| e.margin);
                let before = self.graph.leading_edge(pair[1], self.axis).map_or(0, |e| e.margin);
                i64::from(after) + i64::from(before)
            })
            .collect()
    }

    fn try_place_chain(&mut self, chain_idx: usize) -> Result<bool, LayoutError> {
        let chain = self.chains.get(chain_idx).clone();
        let start = self.low_bound(self.graph.leading_edge(chain.head(), self.axis));
        let end = self.high_bound(self.graph.trailing_edge(chain.tail(), self.axis));
        let (Ok(start), Ok(end)) = (start, end) else {
            return Ok(false);
        };

        let sizes: Vec<Option<i64>> = chain.members.iter().map(|m| self.member_size(*m)).collect();
        let gaps = self.chain_gaps(&chain);
        let outcome = distribute_chain(
            chain.style,
            chain.bias,
            start,
            end,
            i64::from(self.content.start),
            &sizes,
            &gaps,
        );
        if outcome.collapsed_flex {
            let message = format!(
                "chain headed by '{}' is missing an outer anchor on the {} axis; flexible members collapsed to 0",
                self.registry.element(chain.head()).id,
                self.axis
            );
            tracing::warn!("{message}");
            self.warnings.push(message);
        }

        for (member, (start, size)) in chain.members.iter().zip(outcome.spans) {
            let span = self.checked_span(*member, start, size)?;
            self.registry.set_span(*member, self.axis, span)?;
        }
        Ok(true)
    }

    /// Anchor position as a solver term: constant if known, else a variable
    fn solver_position(&self, anchor: AnchorRef) -> Position {
        match self.anchor_position(anchor) {
            Some(p) => Position::constant(p as f64),
            None => {
                let id = self.registry.element(anchor.element).id.as_str();
                if anchor.side.is_leading() {
                    Position::start(id)
                } else {
                    Position::end(id)
                }
            }
        }
    }

    fn solver_low(&self, edge: Option<&Edge>) -> Option<Position> {
        edge.map(|e| self.solver_position(e.target).offset(f64::from(e.margin)))
    }

    fn solver_high(&self, edge: Option<&Edge>) -> Option<Position> {
        edge.map(|e| self.solver_position(e.target).offset(-f64::from(e.margin)))
    }

    fn unit_members(&self, unit: Unit) -> Vec<ElementIndex> {
        match unit {
            Unit::Element(idx) => vec![idx],
            Unit::Chain(chain) => self.chains.get(chain).members.clone(),
        }
    }

    /// Solve the units that depend on each other
    fn solve_residual(&mut self, pending: &[usize]) -> Result<(), LayoutError> {
        for &u in pending {
            self.states[u] = ResolutionState::Resolving;
        }

        let unit_of: HashMap<ElementIndex, usize> = pending
            .iter()
            .flat_map(|&u| self.unit_members(self.units[u]).into_iter().map(move |m| (m, u)))
            .collect();

        // Group units into components and check each one is attached to a known anchor
        let mut components = UnionFind::new(self.units.len());
        let mut anchored = vec![false; self.units.len()];
        for (&member, &u) in &unit_of {
            for edge in self.graph.edges_of(member, self.axis) {
                match unit_of.get(&edge.target.element) {
                    Some(&other) => components.union(u, other),
                    None => anchored[u] = true,
                }
            }
        }
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for &u in pending {
            groups.entry(components.find(u)).or_default().push(u);
        }
        for units in groups.values() {
            if units.iter().any(|&u| anchored[u]) {
                continue;
            }
            for &u in units {
                self.states[u] = ResolutionState::Unsatisfiable;
            }
            let mut members: Vec<ElementIndex> = units
                .iter()
                .flat_map(|&u| self.unit_members(self.units[u]))
                .collect();
            members.sort_unstable();
            return Err(LayoutError::unsatisfiable(
                self.axis,
                self.ids(&members),
                "elements depend only on each other and are not attached to the container or any placed element",
            ));
        }

        let mut solver = ConstraintSolver::new();
        for &u in pending {
            let constraints = match self.units[u] {
                Unit::Element(idx) => self.element_equations(idx),
                Unit::Chain(chain) => self.chain_equations(chain),
            };
            for constraint in constraints {
                if let Err(e) = solver.add_constraint(constraint) {
                    for &u in pending {
                        self.states[u] = ResolutionState::Unsatisfiable;
                    }
                    return Err(self.solver_failure(e, pending));
                }
            }
        }
        let solution = solver.solve()?;

        let mut members: Vec<ElementIndex> = unit_of.keys().copied().collect();
        members.sort_unstable();
        for member in members {
            let id = self.registry.element(member).id.clone();
            let span = self.checked_span(
                member,
                round_half_up(solution.start(&id)),
                round_half_up(solution.size(&id)).max(0),
            )?;
            tracing::debug!(axis = %self.axis, %id, start = span.start, size = span.size, "solved element");
            self.registry.set_span(member, self.axis, span)?;
        }
        for &u in pending {
            self.states[u] = ResolutionState::Resolved;
        }
        Ok(())
    }

    fn solver_failure(&self, error: SolverError, pending: &[usize]) -> LayoutError {
        match error {
            SolverError::Unsatisfiable { reason, .. } => {
                let mut members: Vec<ElementIndex> = pending
                    .iter()
                    .flat_map(|&u| self.unit_members(self.units[u]))
                    .collect();
                members.sort_unstable();
                LayoutError::unsatisfiable(self.axis, self.ids(&members), reason)
            }
            other => LayoutError::Solver(other),
        }
    }

    fn ids(&self, members: &[ElementIndex]) -> Vec<String> {
        members
            .iter()
            .map(|m| self.registry.element(*m).id.clone())
            .collect()
    }

    fn fixed_size(&self, id: &str, size: i64) -> LinearConstraint {
        LinearConstraint::Fixed {
            variable: SolverVariable::size(id),
            value: size as f64,
            source: ConstraintSource::size(format!("{id}.size = {size}")),
        }
    }

    fn equal(&self, left: Position, right: Position, description: String) -> LinearConstraint {
        LinearConstraint::Equal {
            left,
            right,
            source: ConstraintSource::edge(description),
        }
    }

    fn element_equations(&self, idx: ElementIndex) -> Vec<LinearConstraint> {
        let axis = self.axis;
        let element = self.registry.element(idx);
        let id = element.id.as_str();
        let low = self.solver_low(self.graph.leading_edge(idx, axis));
        let high = self.solver_high(self.graph.trailing_edge(idx, axis));
        let lead_name = axis.leading();
        let trail_name = axis.trailing();

        let mut equations = Vec::new();
        match element.size(axis) {
            SizeSpec::Fixed(size) => {
                equations.push(self.fixed_size(id, i64::from(size)));
                match (low, high) {
                    (Some(low), Some(high)) => {
                        // Overflowing elements stay on the leading bound
                        equations.push(LinearConstraint::AtLeast {
                            left: Position::start(id),
                            right: low.clone(),
                            source: ConstraintSource::edge(format!("{id}.{lead_name}")),
                        });
                        equations.push(LinearConstraint::Balanced {
                            lead: Position::start(id),
                            low,
                            trail: Position::end(id),
                            high,
                            bias: element.bias(axis).unwrap_or(self.config.default_bias),
                            source: ConstraintSource::bias(format!("{id} biased on {axis} axis")),
                        });
                    }
                    (Some(low), None) => equations.push(self.equal(
                        Position::start(id),
                        low,
                        format!("{id}.{lead_name}"),
                    )),
                    (None, Some(high)) => equations.push(self.equal(
                        Position::end(id),
                        high,
                        format!("{id}.{trail_name}"),
                    )),
                    (None, None) => equations.push(self.equal(
                        Position::start(id),
                        Position::constant(f64::from(self.content.start)),
                        format!("{id}.{lead_name}"),
                    )),
                }
            }
            SizeSpec::MatchConstraint => {
                if low.is_none() || high.is_none() {
                    equations.push(self.fixed_size(id, 0));
                }
                if let Some(low) = low {
                    let description = format!("{id}.{lead_name}");
                    equations.push(self.equal(Position::start(id), low, description));
                }
                if let Some(high) = high {
                    let description = format!("{id}.{trail_name}");
                    equations.push(self.equal(Position::end(id), high, description));
                }
            }
            SizeSpec::MatchParent => {
                // Normally placed during propagation
                equations.push(self.fixed_size(id, self.match_parent_size(element)));
                equations.push(self.equal(
                    Position::start(id),
                    Position::constant(self.match_parent_start(element) as f64),
                    format!("{id}.{lead_name}"),
                ));
            }
        }
        equations
    }

    /// A chain being solved behaves as a packed block
    fn chain_equations(&self, chain_idx: usize) -> Vec<LinearConstraint> {
        let chain = self.chains.get(chain_idx);
        let axis = self.axis;
        let ids = self.ids(&chain.members);
        let sizes: Vec<Option<i64>> = chain.members.iter().map(|m| self.member_size(*m)).collect();
        let gaps = self.chain_gaps(chain);

        let mut equations = Vec::new();
        for (id, size) in ids.iter().zip(&sizes) {
            if let Some(size) = size {
                equations.push(self.fixed_size(id, *size));
            }
        }
        for (pair, gap) in ids.windows(2).zip(&gaps) {
            equations.push(LinearConstraint::Equal {
                left: Position::start(pair[1].as_str()),
                right: Position::end(pair[0].as_str()).offset(*gap as f64),
                source: ConstraintSource::chain(format!("{} follows {}", pair[1], pair[0])),
            });
        }

        let flex: Vec<&String> = ids
            .iter()
            .zip(&sizes)
            .filter(|(_, size)| size.is_none())
            .map(|(id, _)| id)
            .collect();

        let head = ids[0].as_str();
        let tail = ids[ids.len() - 1].as_str();
        let low = self.solver_low(self.graph.leading_edge(chain.head(), axis));
        let high = self.solver_high(self.graph.trailing_edge(chain.tail(), axis));
        let both = low.is_some() && high.is_some();

        if both && !flex.is_empty() {
            for other in flex.iter().skip(1) {
                equations.push(LinearConstraint::SameSize {
                    a: flex[0].clone(),
                    b: (*other).clone(),
                    source: ConstraintSource::chain(format!("{other} shares space with {}", flex[0])),
                });
            }
        } else {
            for id in &flex {
                equations.push(self.fixed_size(id, 0));
            }
        }

        match (low, high) {
            (Some(low), Some(high)) if flex.is_empty() => {
                equations.push(LinearConstraint::AtLeast {
                    left: Position::start(head),
                    right: low.clone(),
                    source: ConstraintSource::chain(format!("{head}.{}", axis.leading())),
                });
                equations.push(LinearConstraint::Balanced {
                    lead: Position::start(head),
                    low,
                    trail: Position::end(tail),
                    high,
                    bias: chain.bias,
                    source: ConstraintSource::bias(format!(
                        "chain {head}..{tail} biased on {axis} axis"
                    )),
                });
            }
            (None, None) => equations.push(self.equal(
                Position::start(head),
                Position::constant(f64::from(self.content.start)),
                format!("{head}.{}", axis.leading()),
            )),
            (low, high) => {
                if let Some(low) = low {
                    equations.push(self.equal(
                        Position::start(head),
                        low,
                        format!("{head}.{}", axis.leading()),
                    ));
                }
                if let Some(high) = high {
                    equations.push(self.equal(
                        Position::end(tail),
                        high,
                        format!("{tail}.{}", axis.trailing()),
                    ));
                }
            }
        }
        equations
    }
}

/// Placement of a chain's members
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChainOutcome {
    /// `(start, size)` per member, not yet narrowed to pixels
    pub spans: Vec<(i64, i64)>,
    /// Flexible members had no span to share and were given size 0
    pub collapsed_flex: bool,
}

/// Distribute chain members between `start` and `end`.
///
/// `sizes` holds each member's fixed size (`None` for MatchConstraint) and
/// `gaps` the margins between consecutive members. MatchConstraint members
/// share the free space evenly, the first one taking any remainder. A chain
/// with only one outer bound packs against it; with none it packs from
/// `fallback_start`.
pub(crate) fn distribute_chain(
    style: ChainStyle,
    bias: f64,
    start: Option<i64>,
    end: Option<i64>,
    fallback_start: i64,
    sizes: &[Option<i64>],
    gaps: &[i64],
) -> ChainOutcome {
    let n = sizes.len();
    let fixed_sum: i64 = sizes.iter().flatten().sum();
    let gap_sum: i64 = gaps.iter().sum();
    let flex_count = sizes.iter().filter(|s| s.is_none()).count() as i64;

    let (origin, free, style, bias) = match (start, end) {
        (Some(s), Some(e)) => (s, (e - s - fixed_sum - gap_sum).max(0), style, bias),
        (Some(s), None) => (s, 0, ChainStyle::Packed, 0.0),
        (None, Some(e)) => (e - fixed_sum - gap_sum, 0, ChainStyle::Packed, 0.0),
        (None, None) => (fallback_start, 0, ChainStyle::Packed, 0.0),
    };
    let collapsed_flex = flex_count > 0 && (start.is_none() || end.is_none());

    let mut resolved_sizes = Vec::with_capacity(n);
    let mut first_flex = true;
    for size in sizes {
        resolved_sizes.push(match size {
            Some(size) => *size,
            None => {
                let share = free / flex_count;
                if first_flex {
                    first_flex = false;
                    share + free % flex_count
                } else {
                    share
                }
            }
        });
    }

    let lead_offset = |i: usize| -> f64 {
        if flex_count > 0 {
            return 0.0;
        }
        let free = free as f64;
        match style {
            ChainStyle::Spread => free * (i + 1) as f64 / (n + 1) as f64,
            ChainStyle::SpreadInside if n > 1 => free * i as f64 / (n - 1) as f64,
            ChainStyle::SpreadInside => 0.0,
            ChainStyle::Packed => free * bias,
        }
    };

    let mut spans = Vec::with_capacity(n);
    let mut consumed = 0;
    for (i, size) in resolved_sizes.iter().enumerate() {
        spans.push((origin + round_half_up(lead_offset(i)) + consumed, *size));
        consumed += size + gaps.get(i).copied().unwrap_or(0);
    }

    ChainOutcome {
        spans,
        collapsed_flex,
    }
}

/// Minimal disjoint-set over unit indices
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower index wins so results do not depend on visiting order
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}
