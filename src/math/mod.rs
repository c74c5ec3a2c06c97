//! Math expressions used by compute changes and data generators.
//!
//! A [`MathExpression`] can be read from (and written to) MathML, parsed from an infix
//! formula such as `"2 * k1 + sin(x)"`, and evaluated over numeric bindings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod evaluation;
mod formula_parser;
mod formula_token;
mod math_enums;
mod math_expression;
mod math_node_data;

pub use evaluation::{EvaluationContext, MathEvaluationError};
pub use math_enums::{AggregateFn, Arity, MathConstant, MathNumber, MathOperator};
pub use math_expression::MathExpression;
pub use math_node_data::MathNodeData;

/// A parser error produced while tokenizing or parsing an infix formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParserError {
    pub position: usize,
    pub message: String,
}

impl ParserError {
    pub fn at(position: usize, message: String) -> ParserError {
        ParserError { position, message }
    }
}

/// An error raised when an infix formula is invalid and cannot be parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Error)]
#[error("Invalid formula `{formula}`: {message} at position `{position}`")]
pub struct InvalidFormula {
    pub formula: String,
    pub position: usize,
    pub message: String,
}

impl InvalidFormula {
    pub(crate) fn from_parser_error(error: ParserError, formula: String) -> InvalidFormula {
        InvalidFormula {
            formula,
            position: error.position,
            message: error.message,
        }
    }
}
