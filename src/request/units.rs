//! Lexer and conversion for dimension strings such as `12dp`, `24px` or
//! `match_parent`

use logos::Logos;

use crate::error::ParseError;
use crate::layout::{checked_pixels, round_half_up, SizeSpec, MAX_PIXELS};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t]+")]
pub enum DimensionToken {
    #[token("match_parent")]
    #[token("fill_parent")]
    MatchParent,

    #[token("wrap_content")]
    WrapContent,

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[token("dp")]
    #[token("dip")]
    Dp,

    #[token("px")]
    Px,
}

/// Unit of a numeric dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Density-independent; scaled by the configured density
    Dp,
    /// Raw pixels
    Px,
}

/// A parsed dimension string
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    MatchParent,
    Value { amount: f64, unit: Unit },
}

/// Tokenize and parse a dimension string
pub fn parse_dimension(key: &str, text: &str) -> Result<Dimension, ParseError> {
    let malformed = |reason: &str| ParseError::malformed(key, text, reason);

    let mut tokens = Vec::new();
    for token in DimensionToken::lexer(text) {
        tokens.push(token.map_err(|_| malformed("unrecognized characters"))?);
    }

    match tokens.as_slice() {
        [DimensionToken::MatchParent] => Ok(Dimension::MatchParent),
        [DimensionToken::WrapContent] => Err(malformed("wrap_content is not supported")),
        [DimensionToken::Number(amount), DimensionToken::Dp] => Ok(Dimension::Value {
            amount: *amount,
            unit: Unit::Dp,
        }),
        [DimensionToken::Number(amount), DimensionToken::Px] => Ok(Dimension::Value {
            amount: *amount,
            unit: Unit::Px,
        }),
        [DimensionToken::Number(_)] => Err(malformed("missing unit (expected dp, dip or px)")),
        [] => Err(malformed("empty value")),
        _ => Err(malformed("expected a number followed by dp, dip or px")),
    }
}

/// Converts dimension strings to integer pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    density_scale: f64,
}

impl UnitConverter {
    pub fn new(density_scale: f64) -> Self {
        Self { density_scale }
    }

    /// Pixel value of a numeric dimension.
    ///
    /// Non-integral density values are rounded and reported in `warnings`.
    pub fn pixels(
        &self,
        key: &str,
        text: &str,
        warnings: &mut Vec<String>,
    ) -> Result<i32, ParseError> {
        match parse_dimension(key, text)? {
            Dimension::MatchParent => Err(ParseError::malformed(
                key,
                text,
                "match_parent is only valid for sizes",
            )),
            Dimension::Value { amount, unit } => self.convert(key, text, amount, unit, warnings),
        }
    }

    /// Size specification of a width or height attribute
    pub fn size(
        &self,
        key: &str,
        text: &str,
        warnings: &mut Vec<String>,
    ) -> Result<SizeSpec, ParseError> {
        match parse_dimension(key, text)? {
            Dimension::MatchParent => Ok(SizeSpec::MatchParent),
            Dimension::Value { amount, unit: Unit::Dp } if amount == 0.0 => {
                Ok(SizeSpec::MatchConstraint)
            }
            Dimension::Value { amount, unit } => {
                let pixels = self.convert(key, text, amount, unit, warnings)?;
                if pixels < 0 {
                    return Err(ParseError::malformed(key, text, "sizes cannot be negative"));
                }
                Ok(SizeSpec::Fixed(pixels))
            }
        }
    }

    fn convert(
        &self,
        key: &str,
        text: &str,
        amount: f64,
        unit: Unit,
        warnings: &mut Vec<String>,
    ) -> Result<i32, ParseError> {
        let exact = match unit {
            Unit::Px if amount.fract() != 0.0 => {
                return Err(ParseError::malformed(
                    key,
                    text,
                    "pixel values must be integers",
                ))
            }
            Unit::Px => amount,
            Unit::Dp => amount * self.density_scale,
        };
        let pixels = checked_pixels(round_half_up(exact)).ok_or_else(|| {
            ParseError::malformed(
                key,
                text,
                format!("value exceeds the supported range of ±{MAX_PIXELS} pixels"),
            )
        })?;

        if unit == Unit::Dp && amount.fract() != 0.0 {
            let message = format!("imprecise value for '{key}': {text} rounded to {pixels}px");
            tracing::warn!("{message}");
            warnings.push(message);
        }
        Ok(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<DimensionToken> {
        DimensionToken::lexer(input).filter_map(Result::ok).collect()
    }

    #[test]
    fn test_tokens() {
        assert_eq!(
            lex("12dp"),
            vec![DimensionToken::Number(12.0), DimensionToken::Dp]
        );
        assert_eq!(
            lex("1.5 dip"),
            vec![DimensionToken::Number(1.5), DimensionToken::Dp]
        );
        assert_eq!(lex("fill_parent"), vec![DimensionToken::MatchParent]);
        assert_eq!(
            lex("-4px"),
            vec![DimensionToken::Number(-4.0), DimensionToken::Px]
        );
    }

    #[test]
    fn test_sizes() {
        let converter = UnitConverter::new(2.0);
        let mut warnings = Vec::new();
        assert_eq!(
            converter.size("w", "match_parent", &mut warnings).unwrap(),
            SizeSpec::MatchParent
        );
        assert_eq!(
            converter.size("w", "0dp", &mut warnings).unwrap(),
            SizeSpec::MatchConstraint
        );
        assert_eq!(
            converter.size("w", "0dip", &mut warnings).unwrap(),
            SizeSpec::MatchConstraint
        );
        assert_eq!(
            converter.size("w", "0px", &mut warnings).unwrap(),
            SizeSpec::Fixed(0)
        );
        assert_eq!(
            converter.size("w", "48dp", &mut warnings).unwrap(),
            SizeSpec::Fixed(96)
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_imprecise_density_value_warns() {
        let converter = UnitConverter::new(2.0);
        let mut warnings = Vec::new();
        assert_eq!(converter.pixels("m", "2.25dp", &mut warnings).unwrap(), 5);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("imprecise"));
    }

    #[test]
    fn test_malformed_values() {
        let converter = UnitConverter::new(2.0);
        let mut warnings = Vec::new();
        for text in ["12", "dp", "12em", "", "1.5px", "wrap_content", "-3dp"] {
            let result = converter.size("android:layout_width", text, &mut warnings);
            assert!(
                matches!(result, Err(ParseError::MalformedValue { .. })),
                "{text:?} should be rejected"
            );
        }
        assert!(converter
            .pixels("android:layout_marginLeft", "match_parent", &mut warnings)
            .is_err());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let converter = UnitConverter::new(2.0);
        let mut warnings = Vec::new();
        for text in ["2147483647px", "99999999999px", "-99999999999px", "200000000dp"] {
            match converter.pixels("android:layout_marginTop", text, &mut warnings) {
                Err(ParseError::MalformedValue { reason, .. }) => {
                    assert!(reason.contains("supported range"), "{text}: {reason}")
                }
                other => panic!("Expected MalformedValue for {text:?}, got: {:?}", other),
            }
        }
        assert_eq!(
            converter.size("w", "268435456px", &mut warnings).unwrap(),
            SizeSpec::Fixed(MAX_PIXELS)
        );
        assert!(warnings.is_empty());
    }
}
