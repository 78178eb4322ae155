//! Typed data expressions evaluated by the rendering engine.
//!
//! Expressions are never evaluated here. They serialize into the engine's array notation,
//! e.g. `Expression::get("point_count")` becomes `["get","point_count"]`.

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

/// Interpolation curve of an [`Expression::Interpolate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpolation {
    /// Linear interpolation between stops.
    Linear,
    /// Exponential interpolation with the given base.
    Exponential(f64),
}

/// Literal value inside an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Number.
    Number(f64),
    /// String.
    String(String),
    /// Boolean.
    Bool(bool),
}

/// Data-driven expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant value.
    Literal(Literal),
    /// Feature property value.
    Get(String),
    /// Variable bound by an enclosing [`Expression::Let`].
    Var(String),
    /// Current zoom level.
    Zoom,
    /// Asserts the value is a number, falling back to the second expression.
    Number(Box<Expression>, Box<Expression>),
    /// Asserts the value is a boolean, falling back to the second expression.
    Boolean(Box<Expression>, Box<Expression>),
    /// Binds a variable for the body expression.
    Let {
        /// Variable name.
        name: String,
        /// Bound value.
        value: Box<Expression>,
        /// Expression the variable is visible in.
        body: Box<Expression>,
    },
    /// Product of all operands.
    Mul(Vec<Expression>),
    /// First operand raised to the power of the second.
    Pow(Box<Expression>, Box<Expression>),
    /// Interpolates between stops of the input value.
    Interpolate {
        /// Interpolation curve.
        interpolation: Interpolation,
        /// Input value, usually [`Expression::Zoom`].
        input: Box<Expression>,
        /// `(input, output)` pairs with increasing inputs.
        stops: Vec<(f64, Expression)>,
    },
    /// Value of the first branch whose condition holds, or the fallback.
    Case {
        /// `(condition, output)` pairs.
        branches: Vec<(Expression, Expression)>,
        /// Output if no condition holds.
        fallback: Box<Expression>,
    },
}

impl Expression {
    /// Numeric literal.
    pub fn number(value: f64) -> Self {
        Self::Literal(Literal::Number(value))
    }

    /// String literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Boolean literal.
    pub fn bool(value: bool) -> Self {
        Self::Literal(Literal::Bool(value))
    }

    /// Property lookup.
    pub fn get(property: impl Into<String>) -> Self {
        Self::Get(property.into())
    }

    /// Variable lookup.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Literal::Number(v) => serializer.serialize_f64(*v),
            Literal::String(v) => serializer.serialize_str(v),
            Literal::Bool(v) => serializer.serialize_bool(*v),
        }
    }
}

impl Serialize for Interpolation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Interpolation::Linear => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element("linear")?;
                seq.end()
            }
            Interpolation::Exponential(base) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("exponential")?;
                seq.serialize_element(base)?;
                seq.end()
            }
        }
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expression::Literal(literal) => literal.serialize(serializer),
            Expression::Get(property) => operator(serializer, "get", &[property]),
            Expression::Var(name) => operator(serializer, "var", &[name]),
            Expression::Zoom => operator::<_, ()>(serializer, "zoom", &[]),
            Expression::Number(value, fallback) => {
                operator(serializer, "number", &[value, fallback])
            }
            Expression::Boolean(value, fallback) => {
                operator(serializer, "boolean", &[value, fallback])
            }
            Expression::Let { name, value, body } => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element("let")?;
                seq.serialize_element(name)?;
                seq.serialize_element(value)?;
                seq.serialize_element(body)?;
                seq.end()
            }
            Expression::Mul(operands) => {
                let mut seq = serializer.serialize_seq(Some(operands.len() + 1))?;
                seq.serialize_element("*")?;
                for operand in operands {
                    seq.serialize_element(operand)?;
                }
                seq.end()
            }
            Expression::Pow(base, exponent) => operator(serializer, "^", &[base, exponent]),
            Expression::Interpolate {
                interpolation,
                input,
                stops,
            } => {
                let mut seq = serializer.serialize_seq(Some(3 + stops.len() * 2))?;
                seq.serialize_element("interpolate")?;
                seq.serialize_element(interpolation)?;
                seq.serialize_element(input)?;
                for (stop, output) in stops {
                    seq.serialize_element(stop)?;
                    seq.serialize_element(output)?;
                }
                seq.end()
            }
            Expression::Case { branches, fallback } => {
                let mut seq = serializer.serialize_seq(Some(2 + branches.len() * 2))?;
                seq.serialize_element("case")?;
                for (condition, output) in branches {
                    seq.serialize_element(condition)?;
                    seq.serialize_element(output)?;
                }
                seq.serialize_element(fallback)?;
                seq.end()
            }
        }
    }
}

fn operator<S: Serializer, T: Serialize>(
    serializer: S,
    name: &str,
    args: &[T],
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(args.len() + 1))?;
    seq.serialize_element(name)?;
    for arg in args {
        seq.serialize_element(arg)?;
    }
    seq.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_json(expression: &Expression) -> String {
        serde_json::to_string(expression).unwrap()
    }

    #[test]
    fn simple_operators() {
        assert_eq!(to_json(&Expression::get("clustered")), r#"["get","clustered"]"#);
        assert_eq!(to_json(&Expression::Zoom), r#"["zoom"]"#);
        assert_eq!(to_json(&Expression::string("red")), r#""red""#);
        assert_eq!(
            to_json(&Expression::Boolean(
                Box::new(Expression::get("clustered")),
                Box::new(Expression::bool(false)),
            )),
            r#"["boolean",["get","clustered"],false]"#
        );
    }

    #[test]
    fn case_places_fallback_last() {
        let expression = Expression::Case {
            branches: vec![(Expression::get("a"), Expression::string("x"))],
            fallback: Box::new(Expression::string("y")),
        };
        insta::assert_snapshot!(to_json(&expression), @r#"["case",["get","a"],"x","y"]"#);
    }

    #[test]
    fn interpolate_flattens_stops() {
        let expression = Expression::Interpolate {
            interpolation: Interpolation::Linear,
            input: Box::new(Expression::Zoom),
            stops: vec![(0.0, 1.0.into()), (10.0, Expression::var("r"))],
        };
        insta::assert_snapshot!(
            to_json(&expression),
            @r#"["interpolate",["linear"],["zoom"],0.0,1.0,10.0,["var","r"]]"#
        );
    }
}
