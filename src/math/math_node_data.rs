use crate::math::{MathConstant, MathExpression, MathNumber, MathOperator};

/// Enum of possible node types in a math expression tree.
///
/// In particular, a node can be:
///     - A numeric literal (`<cn>`).
///     - An identifier (`<ci>`), referencing a variable or parameter.
///     - A named constant (`<pi/>`, `<true/>`, ...).
///     - An application of a [`MathOperator`] to a list of operands (`<apply>`).
///     - A `<piecewise>` expression with `(value, condition)` pieces and an optional
///       `otherwise` branch.
#[derive(Clone, Debug, PartialEq)]
pub enum MathNodeData {
    Number(MathNumber),
    Identifier(String),
    Constant(MathConstant),
    Apply(MathOperator, Vec<MathExpression>),
    Piecewise {
        pieces: Vec<(MathExpression, MathExpression)>,
        otherwise: Option<MathExpression>,
    },
}
