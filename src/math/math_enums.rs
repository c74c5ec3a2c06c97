use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric literal (MathML `<cn>`), keeping the MathML number type it was written with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MathNumber {
    Real(f64),
    Integer(i64),
    ENotation { mantissa: f64, exponent: i32 },
    Rational { numerator: i64, denominator: i64 },
}

impl MathNumber {
    /// Numeric value of this literal.
    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            MathNumber::Real(value) => *value,
            MathNumber::Integer(value) => *value as f64,
            MathNumber::ENotation { mantissa, exponent } => mantissa * 10f64.powi(*exponent),
            MathNumber::Rational {
                numerator,
                denominator,
            } => *numerator as f64 / *denominator as f64,
        }
    }

    /// Value of the MathML `type` attribute (`None` for the default `real`).
    #[must_use]
    pub fn mathml_type(&self) -> Option<&'static str> {
        match self {
            MathNumber::Real(_) => None,
            MathNumber::Integer(_) => Some("integer"),
            MathNumber::ENotation { .. } => Some("e-notation"),
            MathNumber::Rational { .. } => Some("rational"),
        }
    }

    /// True when the literal is written with a leading minus sign.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        match *self {
            MathNumber::Real(value) => !value.is_nan() && value.is_sign_negative(),
            MathNumber::Integer(value) => value < 0,
            MathNumber::ENotation { mantissa, .. } => mantissa.is_sign_negative(),
            MathNumber::Rational { numerator, .. } => numerator < 0,
        }
    }

    /// Negated literal of the same kind.
    #[must_use]
    pub fn negate(&self) -> MathNumber {
        match *self {
            MathNumber::Real(value) => MathNumber::Real(-value),
            MathNumber::Integer(value) => MathNumber::Integer(-value),
            MathNumber::ENotation { mantissa, exponent } => MathNumber::ENotation {
                mantissa: -mantissa,
                exponent,
            },
            MathNumber::Rational {
                numerator,
                denominator,
            } => MathNumber::Rational {
                numerator: -numerator,
                denominator,
            },
        }
    }
}

impl fmt::Display for MathNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathNumber::Real(value) if value.is_nan() => write!(f, "NaN"),
            MathNumber::Real(value) if value.is_infinite() && *value > 0.0 => write!(f, "INF"),
            MathNumber::Real(value) if value.is_infinite() => write!(f, "-INF"),
            // Debug formatting keeps the decimal point, so the literal parses back as real.
            MathNumber::Real(value) => write!(f, "{value:?}"),
            MathNumber::Integer(value) => write!(f, "{value}"),
            MathNumber::ENotation { mantissa, exponent } => write!(f, "{mantissa:?}e{exponent}"),
            MathNumber::Rational {
                numerator,
                denominator,
            } => write!(f, "({numerator} / {denominator})"),
        }
    }
}

/// Named MathML constants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum MathConstant {
    Pi,
    ExponentialE,
    True,
    False,
    Infinity,
    NotANumber,
}

impl MathConstant {
    /// The MathML element name of this constant.
    #[must_use]
    pub fn mathml_name(&self) -> &'static str {
        match self {
            MathConstant::Pi => "pi",
            MathConstant::ExponentialE => "exponentiale",
            MathConstant::True => "true",
            MathConstant::False => "false",
            MathConstant::Infinity => "infinity",
            MathConstant::NotANumber => "notanumber",
        }
    }

    #[must_use]
    pub fn from_mathml_name(name: &str) -> Option<MathConstant> {
        match name {
            "pi" => Some(MathConstant::Pi),
            "exponentiale" => Some(MathConstant::ExponentialE),
            "true" => Some(MathConstant::True),
            "false" => Some(MathConstant::False),
            "infinity" => Some(MathConstant::Infinity),
            "notanumber" => Some(MathConstant::NotANumber),
            _ => None,
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            MathConstant::Pi => std::f64::consts::PI,
            MathConstant::ExponentialE => std::f64::consts::E,
            MathConstant::True => 1.0,
            MathConstant::False => 0.0,
            MathConstant::Infinity => f64::INFINITY,
            MathConstant::NotANumber => f64::NAN,
        }
    }
}

impl fmt::Display for MathConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathConstant::Infinity => write!(f, "INF"),
            MathConstant::NotANumber => write!(f, "NaN"),
            other => write!(f, "{}", other.mathml_name()),
        }
    }
}

impl TryFrom<&str> for MathConstant {
    type Error = ();

    /// Resolve a constant name used in infix formulas.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pi" => Ok(MathConstant::Pi),
            "exponentiale" => Ok(MathConstant::ExponentialE),
            "true" => Ok(MathConstant::True),
            "false" => Ok(MathConstant::False),
            "INF" | "inf" | "infinity" => Ok(MathConstant::Infinity),
            "NaN" | "nan" | "notanumber" => Ok(MathConstant::NotANumber),
            _ => Err(()),
        }
    }
}

/// SED-ML aggregate functions, written in MathML as `<csymbol>` with a SED-ML definition URL.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum AggregateFn {
    Min,
    Max,
    Sum,
    Product,
}

impl AggregateFn {
    /// The `definitionURL` identifying this function.
    #[must_use]
    pub fn definition_url(&self) -> &'static str {
        match self {
            AggregateFn::Min => "http://sed-ml.org/#min",
            AggregateFn::Max => "http://sed-ml.org/#max",
            AggregateFn::Sum => "http://sed-ml.org/#sum",
            AggregateFn::Product => "http://sed-ml.org/#product",
        }
    }

    #[must_use]
    pub fn from_definition_url(url: &str) -> Option<AggregateFn> {
        match url.trim() {
            "http://sed-ml.org/#min" => Some(AggregateFn::Min),
            "http://sed-ml.org/#max" => Some(AggregateFn::Max),
            "http://sed-ml.org/#sum" => Some(AggregateFn::Sum),
            "http://sed-ml.org/#product" => Some(AggregateFn::Product),
            _ => None,
        }
    }

    /// Reduce a list of values with this function. Empty input yields the neutral element
    /// for `sum`/`product` and `NaN` for `min`/`max`.
    #[must_use]
    pub fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            AggregateFn::Min if values.is_empty() => f64::NAN,
            AggregateFn::Max if values.is_empty() => f64::NAN,
            AggregateFn::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateFn::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregateFn::Sum => values.iter().sum(),
            AggregateFn::Product => values.iter().product(),
        }
    }
}

impl TryFrom<&str> for AggregateFn {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "min" => Ok(AggregateFn::Min),
            "max" => Ok(AggregateFn::Max),
            "sum" => Ok(AggregateFn::Sum),
            "product" => Ok(AggregateFn::Product),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFn::Min => write!(f, "min"),
            AggregateFn::Max => write!(f, "max"),
            AggregateFn::Sum => write!(f, "sum"),
            AggregateFn::Product => write!(f, "product"),
        }
    }
}

/// Number of operands accepted by a [`MathOperator`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    #[must_use]
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Between(low, high) => low <= count && count <= high,
        }
    }
}

/// Operators admissible as the head of a MathML `<apply>`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum MathOperator {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
    /// Optional degree is stored as the first of two operands.
    Root,
    Abs,
    Exp,
    Ln,
    /// Optional base is stored as the first of two operands.
    Log,
    Floor,
    Ceiling,
    Factorial,
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Sinh,
    Cosh,
    Tanh,
    Arcsin,
    Arccos,
    Arctan,
    Eq,
    Neq,
    Gt,
    Lt,
    Geq,
    Leq,
    And,
    Or,
    Xor,
    Not,
    Aggregate(AggregateFn),
}

const NAMED_OPERATORS: [(MathOperator, &str); 35] = [
    (MathOperator::Plus, "plus"),
    (MathOperator::Minus, "minus"),
    (MathOperator::Times, "times"),
    (MathOperator::Divide, "divide"),
    (MathOperator::Power, "power"),
    (MathOperator::Root, "root"),
    (MathOperator::Abs, "abs"),
    (MathOperator::Exp, "exp"),
    (MathOperator::Ln, "ln"),
    (MathOperator::Log, "log"),
    (MathOperator::Floor, "floor"),
    (MathOperator::Ceiling, "ceiling"),
    (MathOperator::Factorial, "factorial"),
    (MathOperator::Sin, "sin"),
    (MathOperator::Cos, "cos"),
    (MathOperator::Tan, "tan"),
    (MathOperator::Sec, "sec"),
    (MathOperator::Csc, "csc"),
    (MathOperator::Cot, "cot"),
    (MathOperator::Sinh, "sinh"),
    (MathOperator::Cosh, "cosh"),
    (MathOperator::Tanh, "tanh"),
    (MathOperator::Arcsin, "arcsin"),
    (MathOperator::Arccos, "arccos"),
    (MathOperator::Arctan, "arctan"),
    (MathOperator::Eq, "eq"),
    (MathOperator::Neq, "neq"),
    (MathOperator::Gt, "gt"),
    (MathOperator::Lt, "lt"),
    (MathOperator::Geq, "geq"),
    (MathOperator::Leq, "leq"),
    (MathOperator::And, "and"),
    (MathOperator::Or, "or"),
    (MathOperator::Xor, "xor"),
    (MathOperator::Not, "not"),
];

impl MathOperator {
    /// The MathML element name of this operator, or `None` for SED-ML aggregates
    /// (those are written as `<csymbol>`).
    #[must_use]
    pub fn mathml_name(&self) -> Option<&'static str> {
        NAMED_OPERATORS
            .iter()
            .find(|(op, _)| op == self)
            .map(|(_, name)| *name)
    }

    #[must_use]
    pub fn from_mathml_name(name: &str) -> Option<MathOperator> {
        NAMED_OPERATORS
            .iter()
            .find(|(_, op_name)| *op_name == name)
            .map(|(op, _)| *op)
    }

    /// Resolve a function name used in infix formulas.
    #[must_use]
    pub fn from_function_name(name: &str) -> Option<MathOperator> {
        match name {
            "pow" => Some(MathOperator::Power),
            "sqrt" => Some(MathOperator::Root),
            "log10" => Some(MathOperator::Log),
            "ceil" => Some(MathOperator::Ceiling),
            "asin" => Some(MathOperator::Arcsin),
            "acos" => Some(MathOperator::Arccos),
            "atan" => Some(MathOperator::Arctan),
            name => AggregateFn::try_from(name)
                .map(MathOperator::Aggregate)
                .ok()
                .or_else(|| MathOperator::from_mathml_name(name)),
        }
    }

    /// Number of operands the operator accepts.
    #[must_use]
    pub fn arity(&self) -> Arity {
        match self {
            MathOperator::Plus | MathOperator::Times => Arity::AtLeast(0),
            MathOperator::And | MathOperator::Or | MathOperator::Xor => Arity::AtLeast(0),
            MathOperator::Minus | MathOperator::Root | MathOperator::Log => Arity::Between(1, 2),
            MathOperator::Divide | MathOperator::Power | MathOperator::Neq => Arity::Exactly(2),
            MathOperator::Eq
            | MathOperator::Gt
            | MathOperator::Lt
            | MathOperator::Geq
            | MathOperator::Leq => Arity::AtLeast(2),
            MathOperator::Aggregate(_) => Arity::AtLeast(1),
            _ => Arity::Exactly(1),
        }
    }

    /// Infix symbol of arithmetic operators.
    #[must_use]
    pub fn infix_symbol(&self) -> Option<char> {
        match self {
            MathOperator::Plus => Some('+'),
            MathOperator::Minus => Some('-'),
            MathOperator::Times => Some('*'),
            MathOperator::Divide => Some('/'),
            MathOperator::Power => Some('^'),
            _ => None,
        }
    }
}

impl fmt::Display for MathOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathOperator::Aggregate(op) => write!(f, "{op}"),
            op => write!(f, "{}", op.mathml_name().unwrap_or("?")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names_round_trip() {
        for (op, name) in NAMED_OPERATORS {
            assert_eq!(MathOperator::from_mathml_name(name), Some(op));
            assert_eq!(op.mathml_name(), Some(name));
        }
        let min = MathOperator::Aggregate(AggregateFn::Min);
        assert_eq!(min.mathml_name(), None);
        assert_eq!(MathOperator::from_function_name("min"), Some(min));
        assert_eq!(
            MathOperator::from_function_name("ceil"),
            Some(MathOperator::Ceiling)
        );
        assert_eq!(
            MathOperator::from_function_name("plus"),
            Some(MathOperator::Plus)
        );
        assert_eq!(MathOperator::from_function_name("foo"), None);
    }

    #[test]
    fn arity_rules() {
        assert!(MathOperator::Plus.arity().accepts(0));
        assert!(MathOperator::Minus.arity().accepts(1));
        assert!(!MathOperator::Minus.arity().accepts(3));
        assert!(!MathOperator::Divide.arity().accepts(1));
        assert!(MathOperator::Sin.arity().accepts(1));
        assert!(!MathOperator::Aggregate(AggregateFn::Sum).arity().accepts(0));
    }

    #[test]
    fn number_values() {
        assert_eq!(MathNumber::Integer(3).value(), 3.0);
        let e = MathNumber::ENotation {
            mantissa: 1.5,
            exponent: 2,
        };
        assert!((e.value() - 150.0).abs() < 1e-9);
        let r = MathNumber::Rational {
            numerator: 1,
            denominator: 4,
        };
        assert_eq!(r.value(), 0.25);
        assert_eq!(MathNumber::Real(2.0).to_string(), "2.0");
        assert_eq!(MathNumber::Integer(-2).negate(), MathNumber::Integer(2));
    }

    #[test]
    fn aggregate_reduction() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(AggregateFn::Min.reduce(&values), 1.0);
        assert_eq!(AggregateFn::Max.reduce(&values), 3.0);
        assert_eq!(AggregateFn::Sum.reduce(&values), 6.0);
        assert_eq!(AggregateFn::Product.reduce(&values), 6.0);
        assert_eq!(AggregateFn::Sum.reduce(&[]), 0.0);
        assert!(AggregateFn::Max.reduce(&[]).is_nan());
    }
}
