use crate::math::{AggregateFn, MathExpression, MathNodeData, MathOperator};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Supplies identifier values when evaluating a [`MathExpression`].
///
/// `series` optionally exposes the full value series of an identifier; aggregate
/// functions applied to a single identifier reduce over that series when available.
pub trait EvaluationContext {
    fn value(&self, id: &str) -> Option<f64>;

    fn series(&self, _id: &str) -> Option<&[f64]> {
        None
    }
}

impl EvaluationContext for HashMap<String, f64> {
    fn value(&self, id: &str) -> Option<f64> {
        self.get(id).copied()
    }
}

impl EvaluationContext for BTreeMap<String, f64> {
    fn value(&self, id: &str) -> Option<f64> {
        self.get(id).copied()
    }
}

/// An error raised when a [`MathExpression`] cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathEvaluationError {
    #[error("Identifier `{0}` has no value")]
    UnknownIdentifier(String),
    #[error("Operator `{operator}` cannot be applied to {count} operand(s)")]
    WrongArity { operator: String, count: usize },
    #[error("Operator `{operator}` is not defined for `{value}`")]
    InvalidArgument { operator: String, value: String },
    #[error("No piece of a piecewise expression applies and there is no `otherwise`")]
    NoMatchingPiece,
}

fn truth(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

fn is_true(value: f64) -> bool {
    value != 0.0
}

/// All consecutive pairs satisfy `relation`.
fn chain(values: &[f64], relation: impl Fn(f64, f64) -> bool) -> f64 {
    truth(values.windows(2).all(|pair| relation(pair[0], pair[1])))
}

fn factorial(value: f64) -> Result<f64, MathEvaluationError> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(MathEvaluationError::InvalidArgument {
            operator: MathOperator::Factorial.to_string(),
            value: value.to_string(),
        });
    }
    // Values above 170! overflow to infinity anyway.
    let n = value.min(171.0) as u32;
    Ok((1..=n).map(f64::from).product())
}

impl MathExpression {
    /// Evaluate this expression in `f64`, resolving identifiers through `context`.
    ///
    /// Booleans are represented as `1.0`/`0.0`, any non-zero value counts as true.
    /// Division by zero follows IEEE semantics.
    pub fn evaluate<C: EvaluationContext + ?Sized>(
        &self,
        context: &C,
    ) -> Result<f64, MathEvaluationError> {
        match self.as_data() {
            MathNodeData::Number(number) => Ok(number.value()),
            MathNodeData::Constant(constant) => Ok(constant.value()),
            MathNodeData::Identifier(name) => context
                .value(name)
                .ok_or_else(|| MathEvaluationError::UnknownIdentifier(name.clone())),
            MathNodeData::Piecewise { pieces, otherwise } => {
                for (value, condition) in pieces {
                    if is_true(condition.evaluate(context)?) {
                        return value.evaluate(context);
                    }
                }
                match otherwise {
                    Some(otherwise) => otherwise.evaluate(context),
                    None => Err(MathEvaluationError::NoMatchingPiece),
                }
            }
            MathNodeData::Apply(op, args) => {
                if !op.arity().accepts(args.len()) {
                    return Err(MathEvaluationError::WrongArity {
                        operator: op.to_string(),
                        count: args.len(),
                    });
                }
                if let MathOperator::Aggregate(function) = op {
                    return evaluate_aggregate(*function, args, context);
                }
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(context))
                    .collect::<Result<Vec<_>, _>>()?;
                apply_operator(*op, &values)
            }
        }
    }
}

fn evaluate_aggregate<C: EvaluationContext + ?Sized>(
    function: AggregateFn,
    args: &[MathExpression],
    context: &C,
) -> Result<f64, MathEvaluationError> {
    if let [single] = args
        && let Some(id) = single.as_identifier()
        && let Some(series) = context.series(id)
    {
        return Ok(function.reduce(series));
    }
    let values = args
        .iter()
        .map(|arg| arg.evaluate(context))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(function.reduce(&values))
}

/// Apply `op` to already evaluated operands. Arity has been checked by the caller.
fn apply_operator(op: MathOperator, values: &[f64]) -> Result<f64, MathEvaluationError> {
    let first = values.first().copied().unwrap_or(f64::NAN);
    let result = match op {
        MathOperator::Plus => values.iter().sum(),
        MathOperator::Times => values.iter().product(),
        MathOperator::Minus if values.len() == 1 => -first,
        MathOperator::Minus => first - values[1],
        MathOperator::Divide => first / values[1],
        MathOperator::Power => first.powf(values[1]),
        MathOperator::Root if values.len() == 1 => first.sqrt(),
        // Degree comes first.
        MathOperator::Root => values[1].powf(1.0 / first),
        MathOperator::Log if values.len() == 1 => first.log10(),
        // Base comes first.
        MathOperator::Log => values[1].log(first),
        MathOperator::Abs => first.abs(),
        MathOperator::Exp => first.exp(),
        MathOperator::Ln => first.ln(),
        MathOperator::Floor => first.floor(),
        MathOperator::Ceiling => first.ceil(),
        MathOperator::Factorial => factorial(first)?,
        MathOperator::Sin => first.sin(),
        MathOperator::Cos => first.cos(),
        MathOperator::Tan => first.tan(),
        MathOperator::Sec => 1.0 / first.cos(),
        MathOperator::Csc => 1.0 / first.sin(),
        MathOperator::Cot => 1.0 / first.tan(),
        MathOperator::Sinh => first.sinh(),
        MathOperator::Cosh => first.cosh(),
        MathOperator::Tanh => first.tanh(),
        MathOperator::Arcsin => first.asin(),
        MathOperator::Arccos => first.acos(),
        MathOperator::Arctan => first.atan(),
        MathOperator::Eq => chain(values, |a, b| a == b),
        MathOperator::Neq => truth(first != values[1]),
        MathOperator::Gt => chain(values, |a, b| a > b),
        MathOperator::Lt => chain(values, |a, b| a < b),
        MathOperator::Geq => chain(values, |a, b| a >= b),
        MathOperator::Leq => chain(values, |a, b| a <= b),
        MathOperator::And => truth(values.iter().all(|v| is_true(*v))),
        MathOperator::Or => truth(values.iter().any(|v| is_true(*v))),
        MathOperator::Xor => truth(values.iter().filter(|v| is_true(**v)).count() % 2 == 1),
        MathOperator::Not => truth(!is_true(first)),
        MathOperator::Aggregate(function) => function.reduce(values),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SeriesContext {
        point: HashMap<String, f64>,
        series: HashMap<String, Vec<f64>>,
    }

    impl EvaluationContext for SeriesContext {
        fn value(&self, id: &str) -> Option<f64> {
            self.point.value(id)
        }

        fn series(&self, id: &str) -> Option<&[f64]> {
            self.series.get(id).map(Vec::as_slice)
        }
    }

    fn bindings(values: &[(&str, f64)]) -> HashMap<String, f64> {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn eval(formula: &str, values: &[(&str, f64)]) -> Result<f64, MathEvaluationError> {
        MathExpression::parse(formula).unwrap().evaluate(&bindings(values))
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("1 + 2 * 3", &[]), Ok(7.0));
        assert_eq!(eval("2 ^ 3 ^ 2", &[]), Ok(512.0));
        assert_eq!(eval("-x ^ 2", &[("x", 3.0)]), Ok(-9.0));
        assert_eq!(eval("k * (x - 1)", &[("k", 2.0), ("x", 4.0)]), Ok(6.0));
        assert_eq!(eval("1 / 0", &[]), Ok(f64::INFINITY));
        assert_eq!(eval("factorial(5)", &[]), Ok(120.0));
        for formula in ["log(2, 8)", "log10(1000)", "root(3, 27)"] {
            let value = eval(formula, &[]).unwrap();
            assert!((value - 3.0).abs() < 1e-9, "{formula} = {value}");
        }
    }

    #[test]
    fn logic_and_piecewise() {
        assert_eq!(eval("and(gt(x, 1), lt(x, 3))", &[("x", 2.0)]), Ok(1.0));
        assert_eq!(eval("xor(true, true, true)", &[]), Ok(1.0));
        assert_eq!(eval("geq(3, 2, 2)", &[]), Ok(1.0));
        assert_eq!(eval("piecewise(10, lt(t, 5), 20)", &[("t", 7.0)]), Ok(20.0));
        assert_eq!(
            eval("piecewise(10, lt(t, 5))", &[("t", 7.0)]),
            Err(MathEvaluationError::NoMatchingPiece)
        );
    }

    #[test]
    fn evaluation_errors() {
        assert_eq!(
            eval("a + b", &[("a", 1.0)]),
            Err(MathEvaluationError::UnknownIdentifier("b".to_string()))
        );
        assert!(matches!(
            eval("factorial(2.5)", &[]),
            Err(MathEvaluationError::InvalidArgument { .. })
        ));
        let bad = MathExpression::mk_apply(MathOperator::Divide, &[MathExpression::mk_integer(1)]);
        assert!(matches!(
            bad.evaluate(&HashMap::new()),
            Err(MathEvaluationError::WrongArity { count: 1, .. })
        ));
    }

    #[test]
    fn aggregates_reduce_over_series() {
        let context = SeriesContext {
            point: bindings(&[("S1", 2.0)]),
            series: HashMap::from([("S1".to_string(), vec![1.0, 2.0, 5.0])]),
        };
        let expr = MathExpression::parse("S1 / max(S1)").unwrap();
        assert_eq!(expr.evaluate(&context), Ok(0.4));
        let expr = MathExpression::parse("sum(S1, 1)").unwrap();
        assert_eq!(expr.evaluate(&context), Ok(3.0));
    }
}
