use crate::model::sed_checks::{SedIdError, check_sid};
use crate::{ContextualValidation, ErrorReporter, SedBase, SedErrorCode, SedIdentified};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

/// A named constant (`<parameter>`) usable in the math of compute changes and data
/// generators. The `value` is required.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SedParameter {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub value: f64,
}

impl SedParameter {
    #[must_use]
    pub fn new(id: &str, value: f64) -> SedParameter {
        SedParameter {
            id: id.to_string(),
            value,
            ..Default::default()
        }
    }
}

impl SedIdentified for SedParameter {
    fn sed_id(&self) -> &str {
        self.id.as_str()
    }
}

/// Parameters are validated against the list they are stored in.
impl ContextualValidation<Vec<SedParameter>> for SedParameter {
    type Error = SedParameterError;

    fn validate_all<R: ErrorReporter<Self::Error>>(
        &self,
        context: &Vec<SedParameter>,
        reporter: &mut R,
    ) {
        let found_self = context.iter().any(|p| std::ptr::eq(p, self));
        assert!(
            found_self,
            "Validation called on a parameter that is not part of the provided list"
        );
        let occurrences = context.iter().filter(|p| p.id == self.id).count();
        check_sid("parameter", &self.id, occurrences, &mut reporter.wrap());
    }
}

/// Possible validation errors for [`SedParameter`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedParameterError {
    #[error(transparent)]
    Id(#[from] SedIdError),
}

impl SedParameterError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedParameterError::Id(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{SedIdError, SedParameterError};
    use crate::{ContextualValidation, SedParameter};

    #[test]
    fn parameter_ids() {
        let parameters = vec![
            SedParameter::new("p1", 1.0),
            SedParameter::new("p1", 2.0),
            SedParameter::new("p 2", 3.0),
        ];
        assert!(parameters[0].validate(&parameters).is_err());
        assert_eq!(
            parameters[2].validate(&parameters).unwrap_err(),
            vec![SedParameterError::Id(SedIdError::InvalidSyntax {
                element: "parameter",
                id: "p 2".to_string(),
            })]
        );
        let single = vec![SedParameter::new("k", 0.5)];
        assert!(single[0].validate(&single).is_ok());
    }
}
