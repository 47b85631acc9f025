//! JSON schema of a layout request and its conversion into typed specs

use serde::Deserialize;

use super::units::UnitConverter;
use crate::error::ParseError;
use crate::layout::{
    Axis, ChainStyle, ElementSpec, Insets, LayoutConfig, LayoutRequest, Side,
};

/// A bias attribute may arrive as a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    String(String),
}

/// One view, keyed by Android attribute names. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ViewDescriptor {
    #[serde(rename = "android:id")]
    pub id: String,
    #[serde(rename = "android:layout_width")]
    pub width: String,
    #[serde(rename = "android:layout_height")]
    pub height: String,

    #[serde(rename = "android:layout_marginLeft")]
    pub margin_left: Option<String>,
    #[serde(rename = "android:layout_marginTop")]
    pub margin_top: Option<String>,
    #[serde(rename = "android:layout_marginRight")]
    pub margin_right: Option<String>,
    #[serde(rename = "android:layout_marginBottom")]
    pub margin_bottom: Option<String>,

    #[serde(rename = "android:paddingLeft")]
    pub padding_left: Option<String>,
    #[serde(rename = "android:paddingTop")]
    pub padding_top: Option<String>,
    #[serde(rename = "android:paddingRight")]
    pub padding_right: Option<String>,
    #[serde(rename = "android:paddingBottom")]
    pub padding_bottom: Option<String>,

    #[serde(rename = "app:layout_constraintRight_toRightOf")]
    pub right_to_right: Option<String>,
    #[serde(rename = "app:layout_constraintRight_toLeftOf")]
    pub right_to_left: Option<String>,
    #[serde(rename = "app:layout_constraintLeft_toRightOf")]
    pub left_to_right: Option<String>,
    #[serde(rename = "app:layout_constraintLeft_toLeftOf")]
    pub left_to_left: Option<String>,
    #[serde(rename = "app:layout_constraintTop_toTopOf")]
    pub top_to_top: Option<String>,
    #[serde(rename = "app:layout_constraintTop_toBottomOf")]
    pub top_to_bottom: Option<String>,
    #[serde(rename = "app:layout_constraintBottom_toTopOf")]
    pub bottom_to_top: Option<String>,
    #[serde(rename = "app:layout_constraintBottom_toBottomOf")]
    pub bottom_to_bottom: Option<String>,

    #[serde(rename = "app:layout_constraintHorizontal_bias")]
    pub horizontal_bias: Option<NumberOrString>,
    #[serde(rename = "app:layout_constraintVertical_bias")]
    pub vertical_bias: Option<NumberOrString>,
    #[serde(rename = "app:layout_constraintHorizontal_chainStyle")]
    pub horizontal_chain_style: Option<String>,
    #[serde(rename = "app:layout_constraintVertical_chainStyle")]
    pub vertical_chain_style: Option<String>,
}

impl ViewDescriptor {
    /// Declared edges in application order; a later edge on the same side wins
    fn edges(&self) -> [(Side, Side, Option<&str>); 8] {
        [
            (Side::Right, Side::Right, self.right_to_right.as_deref()),
            (Side::Right, Side::Left, self.right_to_left.as_deref()),
            (Side::Left, Side::Right, self.left_to_right.as_deref()),
            (Side::Left, Side::Left, self.left_to_left.as_deref()),
            (Side::Top, Side::Top, self.top_to_top.as_deref()),
            (Side::Top, Side::Bottom, self.top_to_bottom.as_deref()),
            (Side::Bottom, Side::Top, self.bottom_to_top.as_deref()),
            (Side::Bottom, Side::Bottom, self.bottom_to_bottom.as_deref()),
        ]
    }

    fn margins(&self) -> [(Side, &'static str, Option<&str>); 4] {
        [
            (Side::Left, "android:layout_marginLeft", self.margin_left.as_deref()),
            (Side::Top, "android:layout_marginTop", self.margin_top.as_deref()),
            (Side::Right, "android:layout_marginRight", self.margin_right.as_deref()),
            (Side::Bottom, "android:layout_marginBottom", self.margin_bottom.as_deref()),
        ]
    }

    fn paddings(&self) -> [(Side, &'static str, Option<&str>); 4] {
        [
            (Side::Left, "android:paddingLeft", self.padding_left.as_deref()),
            (Side::Top, "android:paddingTop", self.padding_top.as_deref()),
            (Side::Right, "android:paddingRight", self.padding_right.as_deref()),
            (Side::Bottom, "android:paddingBottom", self.padding_bottom.as_deref()),
        ]
    }

    /// Convert into a typed element spec
    pub fn to_spec(
        &self,
        converter: &UnitConverter,
        warnings: &mut Vec<String>,
    ) -> Result<ElementSpec, ParseError> {
        let width = converter.size("android:layout_width", &self.width, warnings)?;
        let height = converter.size("android:layout_height", &self.height, warnings)?;
        let mut spec = ElementSpec::new(self.id.as_str(), width, height);

        for (side, key, value) in self.margins() {
            if let Some(value) = value {
                spec.margins.set(side, converter.pixels(key, value, warnings)?);
            }
        }
        let mut padding = Insets::default();
        for (side, key, value) in self.paddings() {
            if let Some(value) = value {
                let pixels = converter.pixels(key, value, warnings)?;
                if pixels < 0 {
                    return Err(ParseError::malformed(key, value, "padding cannot be negative"));
                }
                padding.set(side, pixels);
            }
        }
        spec.padding = padding;

        for (side, target_side, target) in self.edges() {
            if let Some(target) = target {
                spec = spec.constrain(side, target, target_side);
            }
        }

        let biases = [
            (Axis::Horizontal, "app:layout_constraintHorizontal_bias", &self.horizontal_bias),
            (Axis::Vertical, "app:layout_constraintVertical_bias", &self.vertical_bias),
        ];
        for (axis, key, bias) in biases {
            if let Some(bias) = bias {
                spec = spec.with_bias(axis, parse_bias(key, bias)?);
            }
        }

        let styles = [
            (Axis::Horizontal, &self.horizontal_chain_style),
            (Axis::Vertical, &self.vertical_chain_style),
        ];
        for (axis, style) in styles {
            if let Some(style) = style {
                spec = spec.with_chain_style(axis, ChainStyle::from_attribute(style));
            }
        }

        Ok(spec)
    }
}

fn parse_bias(key: &str, value: &NumberOrString) -> Result<f64, ParseError> {
    let (bias, text) = match value {
        NumberOrString::Number(n) => (Some(*n), n.to_string()),
        NumberOrString::String(s) => (s.trim().parse::<f64>().ok(), s.clone()),
    };
    match bias {
        Some(b) if b.is_finite() => Ok(b),
        _ => Err(ParseError::malformed(key, text, "bias must be a number")),
    }
}

/// Top-level request object
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestDescriptor {
    pub layout: Vec<ViewDescriptor>,
    #[serde(default)]
    pub x_offset: i32,
    #[serde(default)]
    pub y_offset: i32,
}

/// A typed request plus the warnings raised while converting it
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub request: LayoutRequest,
    pub warnings: Vec<String>,
}

impl RequestDescriptor {
    pub fn from_json(source: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ParseError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Convert every view, in input order
    pub fn to_request(&self, config: &LayoutConfig) -> Result<ParsedRequest, ParseError> {
        let converter = UnitConverter::new(config.density_scale);
        let mut warnings = Vec::new();
        let elements = self
            .layout
            .iter()
            .map(|view| view.to_spec(&converter, &mut warnings))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ParsedRequest {
            request: LayoutRequest::new(elements).with_offset(self.x_offset, self.y_offset),
            warnings,
        })
    }
}
