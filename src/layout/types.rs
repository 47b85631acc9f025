//! Core types for the layout engine

use std::fmt;

use serde::Serialize;

/// Id reserved for the container element
pub const CONTAINER_ID: &str = "parent";

/// Largest magnitude accepted for any size, margin, offset or computed
/// coordinate
pub const MAX_PIXELS: i32 = 1 << 28;

/// Index of an element inside the registry (input order)
pub type ElementIndex = usize;

/// Layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// The side where elements start on this axis (left / top)
    pub fn leading(self) -> Side {
        match self {
            Axis::Horizontal => Side::Left,
            Axis::Vertical => Side::Top,
        }
    }

    /// The side where elements end on this axis (right / bottom)
    pub fn trailing(self) -> Side {
        match self {
            Axis::Horizontal => Side::Right,
            Axis::Vertical => Side::Bottom,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "horizontal"),
            Axis::Vertical => write!(f, "vertical"),
        }
    }
}

/// A named edge of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::Horizontal,
            Side::Top | Side::Bottom => Axis::Vertical,
        }
    }

    /// True for left and top
    pub fn is_leading(self) -> bool {
        matches!(self, Side::Left | Side::Top)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An anchor as declared by the caller: element id plus side
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub element: String,
    pub side: Side,
}

impl Anchor {
    pub fn new(element: impl Into<String>, side: Side) -> Self {
        Self {
            element: element.into(),
            side,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.element, self.side)
    }
}

/// An anchor resolved against the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorRef {
    pub element: ElementIndex,
    pub side: Side,
}

impl AnchorRef {
    pub fn new(element: ElementIndex, side: Side) -> Self {
        Self { element, side }
    }
}

/// How an element's extent on one axis is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec {
    /// Declared size in pixels
    Fixed(i32),
    /// Fills the container's content box (minus own margins)
    MatchParent,
    /// Derived from the element's constraints
    MatchConstraint,
}

/// Distribution style of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainStyle {
    Spread,
    SpreadInside,
    #[default]
    Packed,
}

impl ChainStyle {
    /// Map a declared attribute value to a style.
    ///
    /// Unrecognized values fall back to `Packed`; callers rely on this.
    pub fn from_attribute(value: &str) -> Self {
        match value {
            "spread" | "CHAIN_SPREAD" => ChainStyle::Spread,
            "spread_inside" | "CHAIN_SPREAD_INSIDE" => ChainStyle::SpreadInside,
            _ => ChainStyle::Packed,
        }
    }
}

/// Four per-side integer values (margins, padding)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn get(&self, side: Side) -> i32 {
        match side {
            Side::Left => self.left,
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, side: Side, value: i32) {
        match side {
            Side::Left => self.left = value,
            Side::Top => self.top = value,
            Side::Right => self.right = value,
            Side::Bottom => self.bottom = value,
        }
    }
}

/// Resolved extent of an element on one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSpan {
    pub start: i32,
    pub size: i32,
}

impl AxisSpan {
    pub fn new(start: i32, size: i32) -> Self {
        Self { start, size }
    }

    /// Trailing position; widened so it cannot overflow
    pub fn end(&self) -> i64 {
        i64::from(self.start) + i64::from(self.size)
    }
}

/// A resolved rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_spans(horizontal: AxisSpan, vertical: AxisSpan) -> Self {
        Self::new(horizontal.start, vertical.start, horizontal.size, vertical.size)
    }

    /// Shift by an offset; `None` if a coordinate would leave the pixel range
    pub fn translate(&self, dx: i32, dy: i32) -> Option<Rect> {
        let x = checked_pixels(i64::from(self.x) + i64::from(dx))?;
        let y = checked_pixels(i64::from(self.y) + i64::from(dy))?;
        Some(Rect::new(x, y, self.width, self.height))
    }

    pub fn span(&self, axis: Axis) -> AxisSpan {
        match axis {
            Axis::Horizontal => AxisSpan::new(self.x, self.width),
            Axis::Vertical => AxisSpan::new(self.y, self.height),
        }
    }
}

/// Serialized as `[x, y, width, height]`
impl Serialize for Rect {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.x, self.y, self.width, self.height].serialize(serializer)
    }
}

/// A directional constraint as declared on an element
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec {
    /// Side of the declaring element
    pub side: Side,
    /// Anchor the side is attached to
    pub target: Anchor,
}

/// Typed description of one element, as consumed by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    pub id: String,
    pub width: SizeSpec,
    pub height: SizeSpec,
    pub margins: Insets,
    pub padding: Insets,
    /// Constraints in declaration order; a later one replaces an earlier one on the same side
    pub constraints: Vec<ConstraintSpec>,
    pub horizontal_bias: Option<f64>,
    pub vertical_bias: Option<f64>,
    pub horizontal_chain_style: Option<ChainStyle>,
    pub vertical_chain_style: Option<ChainStyle>,
}

impl ElementSpec {
    pub fn new(id: impl Into<String>, width: SizeSpec, height: SizeSpec) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            margins: Insets::default(),
            padding: Insets::default(),
            constraints: Vec::new(),
            horizontal_bias: None,
            vertical_bias: None,
            horizontal_chain_style: None,
            vertical_chain_style: None,
        }
    }

    /// Attach `side` of this element to `target_side` of `target`
    pub fn constrain(mut self, side: Side, target: impl Into<String>, target_side: Side) -> Self {
        self.constraints.push(ConstraintSpec {
            side,
            target: Anchor::new(target, target_side),
        });
        self
    }

    pub fn with_margin(mut self, side: Side, value: i32) -> Self {
        self.margins.set(side, value);
        self
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_bias(mut self, axis: Axis, bias: f64) -> Self {
        match axis {
            Axis::Horizontal => self.horizontal_bias = Some(bias),
            Axis::Vertical => self.vertical_bias = Some(bias),
        }
        self
    }

    pub fn with_chain_style(mut self, axis: Axis, style: ChainStyle) -> Self {
        match axis {
            Axis::Horizontal => self.horizontal_chain_style = Some(style),
            Axis::Vertical => self.vertical_chain_style = Some(style),
        }
        self
    }

    pub fn size(&self, axis: Axis) -> SizeSpec {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn bias(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Horizontal => self.horizontal_bias,
            Axis::Vertical => self.vertical_bias,
        }
    }

    pub fn chain_style(&self, axis: Axis) -> Option<ChainStyle> {
        match axis {
            Axis::Horizontal => self.horizontal_chain_style,
            Axis::Vertical => self.vertical_chain_style,
        }
    }
}

/// A complete layout request: elements in input order plus output offset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutRequest {
    pub elements: Vec<ElementSpec>,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl LayoutRequest {
    pub fn new(elements: Vec<ElementSpec>) -> Self {
        Self {
            elements,
            x_offset: 0,
            y_offset: 0,
        }
    }

    pub fn with_offset(mut self, x_offset: i32, y_offset: i32) -> Self {
        self.x_offset = x_offset;
        self.y_offset = y_offset;
        self
    }
}

/// Round to the nearest integer, ties rounding up.
///
/// Saturates far outside the pixel range; callers narrow the result with
/// [`checked_pixels`].
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Narrow a computed value to pixels, rejecting anything beyond [`MAX_PIXELS`]
pub fn checked_pixels(value: i64) -> Option<i32> {
    let limit = i64::from(MAX_PIXELS);
    if (-limit..=limit).contains(&value) {
        i32::try_from(value).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(399.5), 400);
        assert_eq!(round_half_up(399.49), 399);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-1.5), -1);
        assert_eq!(round_half_up(9.999_999_9), 10);
    }

    #[test]
    fn test_side_axis() {
        assert_eq!(Side::Left.axis(), Axis::Horizontal);
        assert_eq!(Side::Bottom.axis(), Axis::Vertical);
        assert!(Side::Top.is_leading());
        assert!(!Side::Right.is_leading());
        assert_eq!(Axis::Vertical.trailing(), Side::Bottom);
    }

    #[test]
    fn test_chain_style_fallback() {
        assert_eq!(ChainStyle::from_attribute("spread"), ChainStyle::Spread);
        assert_eq!(
            ChainStyle::from_attribute("CHAIN_SPREAD_INSIDE"),
            ChainStyle::SpreadInside
        );
        assert_eq!(ChainStyle::from_attribute("packed"), ChainStyle::Packed);
        assert_eq!(ChainStyle::from_attribute("sprad"), ChainStyle::Packed);
    }

    #[test]
    fn test_rect_serializes_as_array() {
        let rect = Rect::new(10, 20, 200, 100);
        assert_eq!(serde_json::to_string(&rect).unwrap(), "[10,20,200,100]");
    }

    #[test]
    fn test_rect_translate() {
        let rect = Rect::new(1, 2, 3, 4).translate(10, 20);
        assert_eq!(rect, Some(Rect::new(11, 22, 3, 4)));
        assert_eq!(Rect::new(MAX_PIXELS, 0, 1, 1).translate(1, 0), None);
        assert_eq!(Rect::new(0, 0, 1, 1).translate(0, i32::MIN), None);
    }

    #[test]
    fn test_checked_pixels() {
        assert_eq!(checked_pixels(-5), Some(-5));
        assert_eq!(checked_pixels(i64::from(MAX_PIXELS)), Some(MAX_PIXELS));
        assert_eq!(checked_pixels(i64::from(MAX_PIXELS) + 1), None);
        assert_eq!(checked_pixels(i64::MIN), None);
        assert_eq!(checked_pixels(round_half_up(1e30)), None);
    }

    #[test]
    fn test_span_end_is_widened() {
        let span = AxisSpan::new(i32::MAX, i32::MAX);
        assert_eq!(span.end(), 2 * i64::from(i32::MAX));
    }
}
