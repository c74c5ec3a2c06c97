use crate::model::sed_checks::{SedIdError, check_sid};
use crate::{ContextualValidation, ErrorReporter, SedBase, SedDocument, SedErrorCode, SedIdentified};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

/// A reference to a quantity of a model (`<variable>`), used by data generators and
/// compute changes.
///
/// The quantity is identified either by an XPath `target` into the model source, or by
/// an implicit `symbol` such as `urn:sedml:symbol:time`. In data generators, the
/// `task_reference` names the task producing the values. In compute changes, the optional
/// `model_reference` names the model the `target` applies to.
///
/// Expected invariants (checked during validation):
///  - `id` is a valid SId, unique among the sibling variables.
///  - Exactly one of `target` and `symbol` is set.
///  - In a data generator, `task_reference` is set and names a task of the document.
///  - In a compute change, `model_reference` (if set) names a model of the document.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedVariable {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub target: Option<String>,
    pub symbol: Option<String>,
    pub task_reference: Option<String>,
    pub model_reference: Option<String>,
}

/// The implicit symbol for simulation time.
pub const SEDML_SYMBOL_TIME: &str = "urn:sedml:symbol:time";

impl SedVariable {
    /// A variable referencing an XPath `target`.
    #[must_use]
    pub fn new_target(id: &str, target: &str) -> SedVariable {
        SedVariable {
            id: id.to_string(),
            target: Some(target.to_string()),
            ..Default::default()
        }
    }

    /// A variable referencing an implicit `symbol`.
    #[must_use]
    pub fn new_symbol(id: &str, symbol: &str) -> SedVariable {
        SedVariable {
            id: id.to_string(),
            symbol: Some(symbol.to_string()),
            ..Default::default()
        }
    }

    /// Builder-style setter of `task_reference`.
    #[must_use]
    pub fn with_task(mut self, task_reference: &str) -> SedVariable {
        self.task_reference = Some(task_reference.to_string());
        self
    }

    /// Builder-style setter of `model_reference`.
    #[must_use]
    pub fn with_model(mut self, model_reference: &str) -> SedVariable {
        self.model_reference = Some(model_reference.to_string());
        self
    }

    pub fn set_target(&mut self, target: &str) {
        self.target = Some(target.to_string());
    }

    pub fn unset_target(&mut self) {
        self.target = None;
    }

    pub fn set_symbol(&mut self, symbol: &str) {
        self.symbol = Some(symbol.to_string());
    }

    pub fn unset_symbol(&mut self) {
        self.symbol = None;
    }
}

impl SedIdentified for SedVariable {
    fn sed_id(&self) -> &str {
        self.id.as_str()
    }
}

/// The kind of element that owns a [`SedVariable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableOwner {
    DataGenerator,
    ComputeChange,
}

/// Everything a [`SedVariable`] needs to be validated: the enclosing document, the list
/// it is stored in, and the kind of element owning that list.
pub struct VariableContext<'a> {
    pub document: &'a SedDocument,
    pub siblings: &'a [SedVariable],
    pub owner: VariableOwner,
}

impl ContextualValidation<VariableContext<'_>> for SedVariable {
    type Error = SedVariableError;

    fn validate_all<R: ErrorReporter<Self::Error>>(
        &self,
        context: &VariableContext<'_>,
        reporter: &mut R,
    ) {
        let found_self = context.siblings.iter().any(|v| std::ptr::eq(v, self));
        assert!(
            found_self,
            "Validation called on a variable that is not part of the provided list"
        );
        let occurrences = context.siblings.iter().filter(|v| v.id == self.id).count();
        check_sid("variable", &self.id, occurrences, &mut reporter.wrap());

        if self.target.is_some() == self.symbol.is_some() {
            reporter.report(SedVariableError::InvalidTargetOrSymbol {
                id: self.id.clone(),
            });
        }

        match context.owner {
            VariableOwner::DataGenerator => match &self.task_reference {
                None => reporter.report(SedVariableError::MissingTaskReference {
                    id: self.id.clone(),
                }),
                Some(task) if context.document.get_task_by_id(task).is_none() => {
                    reporter.report(SedVariableError::UnresolvedReference {
                        id: self.id.clone(),
                        attribute: "taskReference",
                        reference: task.clone(),
                    });
                }
                Some(_) => {}
            },
            VariableOwner::ComputeChange => {
                if let Some(model) = &self.model_reference
                    && context.document.get_model_by_id(model).is_none()
                {
                    reporter.report(SedVariableError::UnresolvedReference {
                        id: self.id.clone(),
                        attribute: "modelReference",
                        reference: model.clone(),
                    });
                }
            }
        }
    }
}

/// Possible validation errors for [`SedVariable`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedVariableError {
    #[error(transparent)]
    Id(#[from] SedIdError),
    #[error("(Variable id: `{id}`) Exactly one of `target` and `symbol` must be set")]
    InvalidTargetOrSymbol { id: String },
    #[error("(Variable id: `{id}`) Variables of a data generator must set `taskReference`")]
    MissingTaskReference { id: String },
    #[error("(Variable id: `{id}`) Attribute `{attribute}` references unknown `{reference}`")]
    UnresolvedReference {
        id: String,
        attribute: &'static str,
        reference: String,
    },
}

impl SedVariableError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedVariableError::Id(e) => e.code(),
            SedVariableError::InvalidTargetOrSymbol { .. } => {
                SedErrorCode::InvalidVariableTargetOrSymbol
            }
            SedVariableError::MissingTaskReference { .. } => SedErrorCode::MissingRequiredAttribute,
            SedVariableError::UnresolvedReference { .. } => SedErrorCode::UnresolvedReference,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::tests::simple_document;
    use crate::model::{SedIdError, SedVariableError, VariableContext, VariableOwner};
    use crate::{ContextualValidation, SedVariable};

    #[test]
    fn data_generator_variables() {
        let document = simple_document();
        let variables = vec![
            SedVariable::new_target("v1", "/sbml:sbml/sbml:model").with_task("task1"),
            SedVariable::new_target("v2", "/x").with_task("nope"),
            SedVariable::new_symbol("v1", "urn:sedml:symbol:time"),
        ];
        let context = VariableContext {
            document: &document,
            siblings: &variables,
            owner: VariableOwner::DataGenerator,
        };
        assert!(variables[0].validate(&context).is_err());
        let issues = variables[0].validate(&context).unwrap_err();
        assert_eq!(
            issues,
            vec![SedVariableError::Id(SedIdError::NotUnique {
                element: "variable",
                id: "v1".to_string()
            })]
        );
        assert_eq!(
            variables[1].validate(&context).unwrap_err(),
            vec![SedVariableError::UnresolvedReference {
                id: "v2".to_string(),
                attribute: "taskReference",
                reference: "nope".to_string(),
            }]
        );
        assert_eq!(variables[2].validate(&context).unwrap_err().len(), 2);
    }

    #[test]
    fn compute_change_variables() {
        let document = simple_document();
        let mut both = SedVariable::new_target("v", "/x").with_model("model1");
        both.set_symbol("urn:sedml:symbol:time");
        let variables = vec![both, SedVariable::new_target("w", "/y").with_model("unknown")];
        let context = VariableContext {
            document: &document,
            siblings: &variables,
            owner: VariableOwner::ComputeChange,
        };
        assert_eq!(
            variables[0].validate(&context).unwrap_err(),
            vec![SedVariableError::InvalidTargetOrSymbol { id: "v".to_string() }]
        );
        assert_eq!(variables[1].validate(&context).unwrap_err().len(), 1);
    }

    #[test]
    #[should_panic]
    fn cannot_validate_outside_of_list() {
        let document = simple_document();
        let variable = SedVariable::new_target("v", "/x");
        let context = VariableContext {
            document: &document,
            siblings: &[],
            owner: VariableOwner::ComputeChange,
        };
        let _ = variable.validate(&context);
    }
}
