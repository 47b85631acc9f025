//! Element registry: one entry per element id, in input order

use std::collections::HashMap;

use super::error::LayoutError;
use super::find_similar;
use super::types::{
    Axis, AxisSpan, ChainStyle, ElementIndex, Insets, Rect, SizeSpec, CONTAINER_ID,
};

/// A registered element and its resolved geometry
#[derive(Debug, Clone)]
pub struct Element {
    pub id: String,
    pub width: SizeSpec,
    pub height: SizeSpec,
    pub margins: Insets,
    bias: [Option<f64>; 2],
    chain_style: [Option<ChainStyle>; 2],
    spans: [Option<AxisSpan>; 2],
}

impl Element {
    fn new(id: String, width: SizeSpec, height: SizeSpec) -> Self {
        Self {
            id,
            width,
            height,
            margins: Insets::default(),
            bias: [None; 2],
            chain_style: [None; 2],
            spans: [None; 2],
        }
    }

    pub fn size(&self, axis: Axis) -> SizeSpec {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn bias(&self, axis: Axis) -> Option<f64> {
        self.bias[axis.index()]
    }

    pub fn set_bias(&mut self, axis: Axis, bias: Option<f64>) {
        self.bias[axis.index()] = bias.map(|b| b.clamp(0.0, 1.0));
    }

    pub fn chain_style(&self, axis: Axis) -> Option<ChainStyle> {
        self.chain_style[axis.index()]
    }

    pub fn set_chain_style(&mut self, axis: Axis, style: Option<ChainStyle>) {
        self.chain_style[axis.index()] = style;
    }

    /// Resolved extent on `axis`, if any
    pub fn span(&self, axis: Axis) -> Option<AxisSpan> {
        self.spans[axis.index()]
    }

    /// Resolved rectangle once both axes are known
    pub fn geometry(&self) -> Option<Rect> {
        match (self.spans[0], self.spans[1]) {
            (Some(h), Some(v)) => Some(Rect::from_spans(h, v)),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.id == CONTAINER_ID
    }
}

/// Holds every element of one request
#[derive(Debug, Default)]
pub struct ElementRegistry {
    elements: Vec<Element>,
    index: HashMap<String, ElementIndex>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new element; fails on a repeated id
    pub fn register(
        &mut self,
        id: impl Into<String>,
        width: SizeSpec,
        height: SizeSpec,
    ) -> Result<&mut Element, LayoutError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(LayoutError::DuplicateId { id });
        }
        let idx = self.elements.len();
        self.index.insert(id.clone(), idx);
        self.elements.push(Element::new(id, width, height));
        Ok(&mut self.elements[idx])
    }

    /// Look up an element by id
    pub fn get(&self, id: &str) -> Result<&Element, LayoutError> {
        self.index_of(id).map(|idx| &self.elements[idx])
    }

    /// Look up an element's index by id
    pub fn index_of(&self, id: &str) -> Result<ElementIndex, LayoutError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| LayoutError::unknown(id, self.suggest(id)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Element by index; indices come from this registry
    pub fn element(&self, idx: ElementIndex) -> &Element {
        &self.elements[idx]
    }

    pub fn container(&self) -> Option<ElementIndex> {
        self.index.get(CONTAINER_ID).copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in registration order
    pub fn iter(&self) -> impl Iterator<Item = (ElementIndex, &Element)> {
        self.elements.iter().enumerate()
    }

    /// Record the resolved extent of one element on one axis.
    ///
    /// Each axis of each element is assigned exactly once per resolution.
    pub fn set_span(
        &mut self,
        idx: ElementIndex,
        axis: Axis,
        span: AxisSpan,
    ) -> Result<(), LayoutError> {
        let element = self
            .elements
            .get_mut(idx)
            .ok_or_else(|| LayoutError::Internal(format!("no element at index {idx}")))?;
        let slot = &mut element.spans[axis.index()];
        if slot.is_some() {
            return Err(LayoutError::Internal(format!(
                "{axis} geometry of '{}' assigned twice",
                element.id
            )));
        }
        *slot = Some(span);
        Ok(())
    }

    /// Record a full rectangle for an element
    pub fn set_geometry(&mut self, id: &str, rect: Rect) -> Result<(), LayoutError> {
        let idx = self.index_of(id)?;
        self.set_span(idx, Axis::Horizontal, rect.span(Axis::Horizontal))?;
        self.set_span(idx, Axis::Vertical, rect.span(Axis::Vertical))
    }

    fn suggest(&self, id: &str) -> Vec<String> {
        find_similar(self.index.keys().map(String::as_str), id, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = ElementRegistry::new();
        registry
            .register("box", SizeSpec::Fixed(10), SizeSpec::MatchConstraint)
            .unwrap();
        let element = registry.get("box").unwrap();
        assert_eq!(element.width, SizeSpec::Fixed(10));
        assert_eq!(element.size(Axis::Vertical), SizeSpec::MatchConstraint);
        assert!(element.geometry().is_none());
    }

    #[test]
    fn test_duplicate_id() {
        let mut registry = ElementRegistry::new();
        registry
            .register("a", SizeSpec::Fixed(1), SizeSpec::Fixed(1))
            .unwrap();
        let err = registry
            .register("a", SizeSpec::Fixed(1), SizeSpec::Fixed(1))
            .unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateId { id } if id == "a"));
    }

    #[test]
    fn test_unknown_element_suggests() {
        let mut registry = ElementRegistry::new();
        registry
            .register("button", SizeSpec::Fixed(1), SizeSpec::Fixed(1))
            .unwrap();
        match registry.get("buton").unwrap_err() {
            LayoutError::UnknownElement { id, suggestions } => {
                assert_eq!(id, "buton");
                assert_eq!(suggestions, vec!["button".to_string()]);
            }
            other => panic!("Expected UnknownElement, got: {:?}", other),
        }
    }

    #[test]
    fn test_set_geometry_once() {
        let mut registry = ElementRegistry::new();
        registry
            .register("a", SizeSpec::Fixed(5), SizeSpec::Fixed(6))
            .unwrap();
        registry.set_geometry("a", Rect::new(1, 2, 5, 6)).unwrap();
        assert_eq!(
            registry.get("a").unwrap().geometry(),
            Some(Rect::new(1, 2, 5, 6))
        );

        let err = registry.set_geometry("a", Rect::new(0, 0, 5, 6)).unwrap_err();
        assert!(matches!(err, LayoutError::Internal(_)));
    }

    #[test]
    fn test_bias_is_clamped() {
        let mut registry = ElementRegistry::new();
        let element = registry
            .register("a", SizeSpec::Fixed(5), SizeSpec::Fixed(6))
            .unwrap();
        element.set_bias(Axis::Horizontal, Some(1.5));
        assert_eq!(element.bias(Axis::Horizontal), Some(1.0));
        assert_eq!(element.bias(Axis::Vertical), None);
    }
}
