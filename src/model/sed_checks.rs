use crate::math::MathExpression;
use crate::utils::is_valid_sid;
use crate::{ErrorReporter, SedErrorCode};
use std::collections::BTreeSet;
use thiserror::Error;

/// Identifier problems shared by all elements with a SId `id`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedIdError {
    #[error("(`{element}`) Required attribute `id` is missing")]
    Missing { element: &'static str },
    #[error("(`{element}` id: `{id}`) Id does not follow the SId syntax")]
    InvalidSyntax { element: &'static str, id: String },
    #[error("(`{element}` id: `{id}`) Id must be unique within its scope")]
    NotUnique { element: &'static str, id: String },
}

impl SedIdError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedIdError::Missing { .. } => SedErrorCode::MissingRequiredAttribute,
            SedIdError::InvalidSyntax { .. } => SedErrorCode::InvalidIdSyntax,
            SedIdError::NotUnique { .. } => SedErrorCode::DuplicateComponentId,
        }
    }
}

/// Problems with the `<math>` of a compute change or a data generator.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedMathError {
    #[error("(`{element}` id: `{id}`) Math contains an operator with a wrong number of operands")]
    NotWellFormed { element: &'static str, id: String },
    #[error("(`{element}` id: `{id}`) Math refers to `{identifier}`, which is not declared")]
    UndeclaredIdentifier {
        element: &'static str,
        id: String,
        identifier: String,
    },
}

impl SedMathError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedMathError::NotWellFormed { .. } => SedErrorCode::OpsNeedCorrectNumberOfArgs,
            SedMathError::UndeclaredIdentifier { .. } => SedErrorCode::UndeclaredMathIdentifier,
        }
    }
}

/// Check presence, syntax, and uniqueness of an element `id`. The `occurrences` value is the
/// number of elements in the relevant scope that use this `id` (including the element itself).
pub(crate) fn check_sid<R: ErrorReporter<SedIdError>>(
    element: &'static str,
    id: &str,
    occurrences: usize,
    reporter: &mut R,
) {
    if id.is_empty() {
        reporter.report(SedIdError::Missing { element });
    } else if !is_valid_sid(id) {
        reporter.report(SedIdError::InvalidSyntax {
            element,
            id: id.to_string(),
        });
    } else if occurrences > 1 {
        reporter.report(SedIdError::NotUnique {
            element,
            id: id.to_string(),
        });
    }
}

/// Check that `math` is well-formed and only uses `declared` identifiers.
pub(crate) fn check_math<'a, R: ErrorReporter<SedMathError>>(
    element: &'static str,
    id: &str,
    math: &MathExpression,
    declared: impl IntoIterator<Item = &'a str>,
    reporter: &mut R,
) {
    if !math.is_well_formed() {
        reporter.report(SedMathError::NotWellFormed {
            element,
            id: id.to_string(),
        });
    }
    let declared = declared.into_iter().collect::<BTreeSet<_>>();
    for identifier in math.identifiers() {
        if !declared.contains(identifier.as_str()) {
            reporter.report(SedMathError::UndeclaredIdentifier {
                element,
                id: id.to_string(),
                identifier,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VecReporter;

    #[test]
    fn id_checks() {
        let mut reporter = VecReporter::default();
        check_sid("model", "", 0, &mut reporter);
        check_sid("model", "1abc", 1, &mut reporter);
        check_sid("model", "m1", 2, &mut reporter);
        check_sid("model", "m2", 1, &mut reporter);
        let codes = reporter
            .into_errors()
            .iter()
            .map(SedIdError::code)
            .collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![
                SedErrorCode::MissingRequiredAttribute,
                SedErrorCode::InvalidIdSyntax,
                SedErrorCode::DuplicateComponentId,
            ]
        );
    }

    #[test]
    fn math_checks() {
        let math = MathExpression::parse("p1 * S1 + k").unwrap();
        let mut reporter = VecReporter::default();
        check_math("dataGenerator", "dg", &math, ["p1", "S1"], &mut reporter);
        assert_eq!(
            reporter.into_errors(),
            vec![SedMathError::UndeclaredIdentifier {
                element: "dataGenerator",
                id: "dg".to_string(),
                identifier: "k".to_string(),
            }]
        );
    }
}
