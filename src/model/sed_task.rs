use crate::model::sed_checks::{SedIdError, check_sid};
use crate::{
    ContextualValidation, ErrorReporter, SedBase, SedDocument, SedErrorCode, SedIdentified,
    SedModel, SedSimulation,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

/// A task (`<task>`) links a [`SedModel`] with the [`SedSimulation`] that is run on it.
///
/// Expected invariants (checked during validation):
///  - `id` is a valid SId unique within the enclosing [`SedDocument`].
///  - `model_reference` and `simulation_reference` are set and resolve.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedTask {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub model_reference: String,
    pub simulation_reference: String,
}

impl SedTask {
    #[must_use]
    pub fn new(id: &str, model_reference: &str, simulation_reference: &str) -> SedTask {
        SedTask {
            id: id.to_string(),
            model_reference: model_reference.to_string(),
            simulation_reference: simulation_reference.to_string(),
            ..Default::default()
        }
    }

    /// Find the referenced model in the enclosing [`SedDocument`], assuming it exists.
    #[must_use]
    pub fn find_model<'a>(&self, document: &'a SedDocument) -> Option<&'a SedModel> {
        document.get_model_by_id(&self.model_reference)
    }

    /// Find the referenced simulation in the enclosing [`SedDocument`], assuming it exists.
    #[must_use]
    pub fn find_simulation<'a>(&self, document: &'a SedDocument) -> Option<&'a SedSimulation> {
        document.get_simulation_by_id(&self.simulation_reference)
    }
}

impl SedIdentified for SedTask {
    fn sed_id(&self) -> &str {
        self.id.as_str()
    }
}

impl ContextualValidation<SedDocument> for SedTask {
    type Error = SedTaskError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        let found_self = context.tasks.iter().any(|t| std::ptr::eq(t, self));
        assert!(
            found_self,
            "Validation called on a task that is not part of the SedDocument"
        );

        let occurrences = context.count_document_id(&self.id);
        check_sid("task", &self.id, occurrences, &mut reporter.wrap());

        let references = [
            ("modelReference", &self.model_reference, self.find_model(context).is_some()),
            (
                "simulationReference",
                &self.simulation_reference,
                self.find_simulation(context).is_some(),
            ),
        ];
        for (attribute, reference, resolved) in references {
            if reference.is_empty() {
                reporter.report(SedTaskError::MissingAttribute {
                    id: self.id.clone(),
                    attribute,
                });
            } else if !resolved {
                reporter.report(SedTaskError::UnresolvedReference {
                    id: self.id.clone(),
                    attribute,
                    reference: reference.clone(),
                });
            }
        }
    }
}

/// Possible validation errors for [`SedTask`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedTaskError {
    #[error(transparent)]
    Id(#[from] SedIdError),
    #[error("(Task id: `{id}`) Required attribute `{attribute}` is missing")]
    MissingAttribute { id: String, attribute: &'static str },
    #[error("(Task id: `{id}`) Attribute `{attribute}` references unknown `{reference}`")]
    UnresolvedReference {
        id: String,
        attribute: &'static str,
        reference: String,
    },
}

impl SedTaskError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedTaskError::Id(e) => e.code(),
            SedTaskError::MissingAttribute { .. } => SedErrorCode::MissingRequiredAttribute,
            SedTaskError::UnresolvedReference { .. } => SedErrorCode::UnresolvedReference,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::tests::simple_document;
    use crate::model::SedTaskError;
    use crate::{ContextualValidation, SedDocument, SedTask};

    #[test]
    fn task_references() {
        let document = simple_document();
        let task = document.get_task(0).unwrap();
        assert_eq!(task.find_model(&document).map(|m| m.id.as_str()), Some("model1"));
        assert_eq!(
            task.find_simulation(&document).map(|s| s.id.as_str()),
            Some("sim1")
        );
        assert!(task.validate(&document).is_ok());
    }

    #[test]
    fn unresolved_references() {
        let mut document = SedDocument::default();
        document.add_task(SedTask::new("t", "", "sim"));
        let issues = document.tasks[0].validate(&document).unwrap_err();
        assert_eq!(
            issues,
            vec![
                SedTaskError::MissingAttribute {
                    id: "t".to_string(),
                    attribute: "modelReference"
                },
                SedTaskError::UnresolvedReference {
                    id: "t".to_string(),
                    attribute: "simulationReference",
                    reference: "sim".to_string()
                },
            ]
        );
    }

    #[test]
    #[should_panic]
    fn cannot_validate_when_not_in_document() {
        let task = SedTask::new("t", "m", "s");
        let _ = task.validate(&SedDocument::default());
    }
}
