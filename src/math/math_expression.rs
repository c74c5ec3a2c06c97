use crate::math::formula_parser::parse_formula;
use crate::math::{
    InvalidFormula, MathConstant, MathNodeData, MathNumber, MathOperator,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A math expression tree, as stored in `<math>` elements of compute changes and
/// data generators.
///
/// The tree is stored using an atomic reference counter such that it can be cloned
/// without data duplication. Expressions are immutable; use the `mk_*` constructors
/// to build new trees.
#[derive(Clone, Debug, PartialEq)]
pub struct MathExpression(Arc<MathNodeData>);

/// Utility data access.
impl MathExpression {
    /// Get a reference to the underlying [`MathNodeData`].
    #[must_use]
    pub fn as_data(&self) -> &MathNodeData {
        self.0.as_ref()
    }

    /// Build an infix formula representation of this expression.
    #[must_use]
    pub fn to_formula(&self) -> String {
        self.to_string()
    }

    /// Return the numeric literal if this expression is one.
    #[must_use]
    pub fn as_number(&self) -> Option<MathNumber> {
        match self.as_data() {
            MathNodeData::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Return the identifier name if this expression is a plain `<ci>`.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self.as_data() {
            MathNodeData::Identifier(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Collect all identifiers (`<ci>` names) used anywhere in this expression.
    #[must_use]
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        self.collect_identifiers(&mut result);
        result
    }

    fn collect_identifiers(&self, result: &mut BTreeSet<String>) {
        match self.as_data() {
            MathNodeData::Identifier(name) => {
                result.insert(name.clone());
            }
            MathNodeData::Number(_) | MathNodeData::Constant(_) => {}
            MathNodeData::Apply(_, args) => {
                for arg in args {
                    arg.collect_identifiers(result);
                }
            }
            MathNodeData::Piecewise { pieces, otherwise } => {
                for (value, condition) in pieces {
                    value.collect_identifiers(result);
                    condition.collect_identifiers(result);
                }
                if let Some(otherwise) = otherwise {
                    otherwise.collect_identifiers(result);
                }
            }
        }
    }

    /// Check that every operator has an admissible number of operands, identifiers are
    /// not blank, rationals have a non-zero denominator, and piecewise expressions have
    /// at least one branch.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self.as_data() {
            MathNodeData::Number(MathNumber::Rational { denominator, .. }) => *denominator != 0,
            MathNodeData::Number(_) | MathNodeData::Constant(_) => true,
            MathNodeData::Identifier(name) => !name.trim().is_empty(),
            MathNodeData::Apply(op, args) => {
                op.arity().accepts(args.len()) && args.iter().all(MathExpression::is_well_formed)
            }
            MathNodeData::Piecewise { pieces, otherwise } => {
                (!pieces.is_empty() || otherwise.is_some())
                    && pieces
                        .iter()
                        .all(|(value, condition)| value.is_well_formed() && condition.is_well_formed())
                    && otherwise.as_ref().is_none_or(MathExpression::is_well_formed)
            }
        }
    }
}

/// Utility constructors.
impl MathExpression {
    /// Create a real-valued literal.
    #[must_use]
    pub fn mk_real(value: f64) -> MathExpression {
        MathNodeData::Number(MathNumber::Real(value)).into()
    }

    /// Create an integer literal.
    #[must_use]
    pub fn mk_integer(value: i64) -> MathExpression {
        MathNodeData::Number(MathNumber::Integer(value)).into()
    }

    /// Create a literal of any [`MathNumber`] kind.
    #[must_use]
    pub fn mk_number(value: MathNumber) -> MathExpression {
        MathNodeData::Number(value).into()
    }

    /// Create an identifier (`<ci>`) node.
    #[must_use]
    pub fn mk_identifier(name: &str) -> MathExpression {
        MathNodeData::Identifier(name.to_string()).into()
    }

    /// Create a named constant node.
    #[must_use]
    pub fn mk_constant(constant: MathConstant) -> MathExpression {
        MathNodeData::Constant(constant).into()
    }

    /// Apply `op` to the given operands. Operand counts are not checked here;
    /// see [`MathExpression::is_well_formed`].
    #[must_use]
    pub fn mk_apply(op: MathOperator, args: &[MathExpression]) -> MathExpression {
        MathNodeData::Apply(op, args.to_vec()).into()
    }

    /// Shorthand for a two-operand application.
    #[must_use]
    pub fn mk_binary(
        op: MathOperator,
        left: &MathExpression,
        right: &MathExpression,
    ) -> MathExpression {
        MathExpression::mk_apply(op, &[left.clone(), right.clone()])
    }

    /// Create a piecewise expression.
    #[must_use]
    pub fn mk_piecewise(
        pieces: &[(MathExpression, MathExpression)],
        otherwise: Option<&MathExpression>,
    ) -> MathExpression {
        MathNodeData::Piecewise {
            pieces: pieces.to_vec(),
            otherwise: otherwise.cloned(),
        }
        .into()
    }
}

impl MathExpression {
    /// Parse a new [`MathExpression`] from an infix formula, e.g. `"2 * k1 + sin(x)"`.
    pub fn parse(formula: &str) -> Result<MathExpression, InvalidFormula> {
        parse_formula(formula)
            .map_err(|e| InvalidFormula::from_parser_error(e, formula.to_string()))
    }
}

impl TryFrom<&str> for MathExpression {
    type Error = InvalidFormula;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        MathExpression::parse(value)
    }
}

impl AsRef<MathNodeData> for MathExpression {
    fn as_ref(&self) -> &MathNodeData {
        self.as_data()
    }
}

impl From<MathNodeData> for MathExpression {
    fn from(value: MathNodeData) -> Self {
        MathExpression(Arc::new(value))
    }
}

fn write_arguments(f: &mut Formatter<'_>, args: &[MathExpression]) -> std::fmt::Result {
    if let Some(first) = args.first() {
        write!(f, "{first}")?;
    }
    for arg in args.iter().skip(1) {
        write!(f, ", {arg}")?;
    }
    Ok(())
}

impl Display for MathExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.as_data() {
            // Rationals already render inside parentheses.
            MathNodeData::Number(number)
                if number.is_negative() && !matches!(number, MathNumber::Rational { .. }) =>
            {
                write!(f, "({number})")
            }
            MathNodeData::Number(number) => write!(f, "{number}"),
            MathNodeData::Identifier(name) if MathConstant::try_from(name.as_str()).is_ok() => {
                write!(f, "ci({name})")
            }
            MathNodeData::Identifier(name) => write!(f, "{name}"),
            MathNodeData::Constant(constant) => write!(f, "{constant}"),
            MathNodeData::Apply(MathOperator::Plus, args) if args.is_empty() => write!(f, "0"),
            MathNodeData::Apply(MathOperator::Times, args) if args.is_empty() => write!(f, "1"),
            MathNodeData::Apply(MathOperator::Minus, args) if args.len() == 1 => {
                if args[0].as_number().is_some() {
                    write!(f, "(-({}))", args[0])
                } else {
                    write!(f, "(-{})", args[0])
                }
            }
            MathNodeData::Apply(MathOperator::Root, args) if args.len() == 1 => {
                write!(f, "sqrt({})", args[0])
            }
            MathNodeData::Apply(MathOperator::Log, args) if args.len() == 1 => {
                write!(f, "log10({})", args[0])
            }
            MathNodeData::Apply(op, args) => {
                if let Some(symbol) = op.infix_symbol()
                    && args.len() >= 2
                {
                    write!(f, "({}", args[0])?;
                    for arg in args.iter().skip(1) {
                        write!(f, " {symbol} {arg}")?;
                    }
                    write!(f, ")")
                } else {
                    // Also covers infix operators applied to a single operand, e.g. `plus(x)`.
                    write!(f, "{op}(")?;
                    write_arguments(f, args)?;
                    write!(f, ")")
                }
            }
            MathNodeData::Piecewise { pieces, otherwise } => {
                write!(f, "piecewise(")?;
                let mut first = true;
                for (value, condition) in pieces {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}, {condition}")?;
                    first = false;
                }
                if let Some(otherwise) = otherwise {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{otherwise}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Serialize for MathExpression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl<'de> Deserialize<'de> for MathExpression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        MathExpression::try_from(value.as_str()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::math::{AggregateFn, MathConstant, MathExpression, MathNumber, MathOperator};

    fn x() -> MathExpression {
        MathExpression::mk_identifier("x")
    }

    #[test]
    fn display_renders_parseable_formula() {
        let expr = MathExpression::mk_binary(
            MathOperator::Plus,
            &MathExpression::mk_binary(MathOperator::Times, &MathExpression::mk_integer(2), &x()),
            &MathExpression::mk_apply(MathOperator::Sin, &[x()]),
        );
        assert_eq!(expr.to_string(), "((2 * x) + sin(x))");
        assert_eq!(MathExpression::parse(&expr.to_string()).unwrap(), expr);
    }

    #[test]
    fn special_forms_display() {
        let neg = MathExpression::mk_apply(MathOperator::Minus, &[x()]);
        assert_eq!(neg.to_string(), "(-x)");
        let sqrt = MathExpression::mk_apply(MathOperator::Root, &[x()]);
        assert_eq!(sqrt.to_string(), "sqrt(x)");
        let log = MathExpression::mk_apply(MathOperator::Log, &[x()]);
        assert_eq!(log.to_string(), "log10(x)");
        let max = MathExpression::mk_apply(MathOperator::Aggregate(AggregateFn::Max), &[x()]);
        assert_eq!(max.to_string(), "max(x)");
        let pw = MathExpression::mk_piecewise(
            &[(
                MathExpression::mk_integer(1),
                MathExpression::mk_binary(MathOperator::Gt, &x(), &MathExpression::mk_integer(0)),
            )],
            Some(&MathExpression::mk_constant(MathConstant::Pi)),
        );
        assert_eq!(pw.to_string(), "piecewise(1, gt(x, 0), pi)");
        assert_eq!(MathExpression::parse(&pw.to_string()).unwrap(), pw);
    }

    #[test]
    fn negative_operands_keep_their_grouping() {
        let square = MathExpression::mk_binary(
            MathOperator::Power,
            &MathExpression::mk_integer(-2),
            &MathExpression::mk_integer(2),
        );
        assert_eq!(square.to_string(), "((-2) ^ 2)");
        assert_eq!(MathExpression::parse(&square.to_string()).unwrap(), square);

        let scaled = MathExpression::mk_binary(
            MathOperator::Power,
            &MathExpression::mk_number(MathNumber::ENotation {
                mantissa: -1.5,
                exponent: 3,
            }),
            &x(),
        );
        assert_eq!(MathExpression::parse(&scaled.to_string()).unwrap(), scaled);

        let negated =
            MathExpression::mk_apply(MathOperator::Minus, &[MathExpression::mk_integer(2)]);
        assert_eq!(negated.to_string(), "(-(2))");
        assert_eq!(MathExpression::parse(&negated.to_string()).unwrap(), negated);
    }

    #[test]
    fn constant_named_identifiers_survive_json() {
        for name in ["pi", "true", "exponentiale", "INF"] {
            let expr = MathExpression::mk_binary(
                MathOperator::Times,
                &MathExpression::mk_identifier(name),
                &MathExpression::mk_constant(MathConstant::Pi),
            );
            let json = serde_json::to_string(&expr).unwrap();
            let back: MathExpression = serde_json::from_str(&json).unwrap();
            assert_eq!(back, expr, "identifier `{name}`");
            let ids: Vec<String> = back.identifiers().into_iter().collect();
            assert_eq!(ids, vec![name.to_string()]);
        }
    }

    #[test]
    fn identifiers_are_collected() {
        let expr = MathExpression::parse("a * b + max(c, a)").unwrap();
        let ids: Vec<String> = expr.identifiers().into_iter().collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn well_formedness() {
        assert!(MathExpression::parse("x / 2").unwrap().is_well_formed());
        let bad = MathExpression::mk_apply(MathOperator::Divide, &[x()]);
        assert!(!bad.is_well_formed());
        let nested_bad = MathExpression::mk_apply(MathOperator::Plus, &[x(), bad]);
        assert!(!nested_bad.is_well_formed());
        let empty_piecewise = MathExpression::mk_piecewise(&[], None);
        assert!(!empty_piecewise.is_well_formed());
    }

    #[test]
    fn serde_uses_formula_strings() {
        let expr = MathExpression::parse("k * (x - 1)").unwrap();
        let json = serde_json::to_string(&expr).unwrap();
        assert_eq!(json, "\"(k * (x - 1))\"");
        let back: MathExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
        assert!(serde_json::from_str::<MathExpression>("\"1 +\"").is_err());
    }
}
