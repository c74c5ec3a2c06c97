use crate::model::sed_checks::{SedIdError, check_sid};
use crate::model::sed_list::sed_list_accessors;
use crate::model::SedChangeError;
use crate::{
    ContextualValidation, ErrorReporter, SedBase, SedChange, SedChangeAttribute, SedDocument,
    SedErrorCode, SedIdentified,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashSet;
use thiserror::Error;

/// Language URN of SBML models (any level/version).
pub const SEDML_LANGUAGE_SBML: &str = "urn:sedml:language:sbml";
/// Language URN of CellML models (any version).
pub const SEDML_LANGUAGE_CELLML: &str = "urn:sedml:language:cellml";

/// A model (`<model>`) used in the simulation experiment, together with the
/// [`SedChange`] list that is applied to it before simulation.
///
/// The `source` is either a URI of the model file, or the `id` of another model of the same
/// document (the model is then derived from that model, applying its own changes on top).
///
/// Expected invariants (checked during validation):
///  - `id` is a valid SId unique within the enclosing [`SedDocument`].
///  - `source` is set, and if it names another model, the chain of derived models
///    does not form a cycle.
///  - `language` (if set) is a known SED-ML language URN (a warning otherwise).
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SedModel {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub language: Option<String>,
    pub source: String,
    pub changes: Vec<SedChange>,
}

impl SedModel {
    /// Create a new model with the given `id` and `source`.
    #[must_use]
    pub fn new(id: &str, source: &str) -> SedModel {
        SedModel {
            id: id.to_string(),
            source: source.to_string(),
            ..Default::default()
        }
    }

    /// Builder-style setter of `language`.
    #[must_use]
    pub fn with_language(mut self, language: &str) -> SedModel {
        self.language = Some(language.to_string());
        self
    }

    /// If `source` is the id of another model in `document`, return that model.
    #[must_use]
    pub fn is_derived_from<'a>(&self, document: &'a SedDocument) -> Option<&'a SedModel> {
        if self.source == self.id {
            return None;
        }
        document.get_model_by_id(&self.source)
    }

    /// True if the chain of source models starting with this model loops back onto itself.
    #[must_use]
    pub fn has_circular_source(&self, document: &SedDocument) -> bool {
        let mut visited = HashSet::new();
        visited.insert(self.id.as_str());
        let mut current = self.source.as_str();
        while let Some(model) = document.get_model_by_id(current) {
            if !visited.insert(model.id.as_str()) {
                return true;
            }
            current = model.source.as_str();
        }
        false
    }

    /// Check that `language` is one of the SED-ML language URNs
    /// (`urn:sedml:language:sbml`, `urn:sedml:language:sbml.level-3.version-1`,
    /// `urn:sedml:language:cellml`, `urn:sedml:language:cellml.1_0`, ...).
    ///
    /// A missing language is also considered known.
    #[must_use]
    pub fn language_urn_is_known(&self) -> bool {
        let Some(language) = &self.language else {
            return true;
        };
        let sbml_suffix = language.strip_prefix(SEDML_LANGUAGE_SBML);
        let cellml_suffix = language.strip_prefix(SEDML_LANGUAGE_CELLML);
        match (sbml_suffix, cellml_suffix) {
            (Some(""), _) | (_, Some("")) => true,
            (Some(suffix), _) => is_sbml_level_version_suffix(suffix),
            (_, Some(suffix)) => is_cellml_version_suffix(suffix),
            _ => false,
        }
    }

    sed_list_accessors!(
        changes: SedChange,
        add_change,
        get_change,
        get_change_by_target,
        remove_change,
        remove_change_by_target,
        num_changes
    );

    /// Append a new `<changeAttribute>` and return a reference to it.
    pub fn create_change_attribute(
        &mut self,
        target: &str,
        new_value: &str,
    ) -> &mut SedChangeAttribute {
        self.changes.push(SedChange::ChangeAttribute(SedChangeAttribute::new(
            target, new_value,
        )));
        let last = self.changes.len() - 1;
        match &mut self.changes[last] {
            SedChange::ChangeAttribute(change) => change,
            _ => unreachable!("The last change was just inserted."),
        }
    }
}

/// `.level-L.version-V`
fn is_sbml_level_version_suffix(suffix: &str) -> bool {
    let Some(rest) = suffix.strip_prefix(".level-") else {
        return false;
    };
    let Some((level, version)) = rest.split_once(".version-") else {
        return false;
    };
    is_number(level) && is_number(version)
}

/// `.1_0`, `.1_1`, `.2_0`
fn is_cellml_version_suffix(suffix: &str) -> bool {
    let Some(rest) = suffix.strip_prefix('.') else {
        return false;
    };
    let Some((major, minor)) = rest.split_once('_') else {
        return false;
    };
    is_number(major) && is_number(minor)
}

fn is_number(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

impl SedIdentified for SedModel {
    fn sed_id(&self) -> &str {
        self.id.as_str()
    }
}

/// Changes are addressed by their `target`.
impl SedIdentified for SedChange {
    fn sed_id(&self) -> &str {
        self.target()
    }
}

impl ContextualValidation<SedDocument> for SedModel {
    type Error = SedModelError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        let found_self = context.models.iter().any(|m| std::ptr::eq(m, self));
        assert!(
            found_self,
            "Validation called on a model that is not part of the SedDocument"
        );

        let occurrences = context.count_document_id(&self.id);
        check_sid("model", &self.id, occurrences, &mut reporter.wrap());

        if self.source.trim().is_empty() {
            reporter.report(SedModelError::MissingSource {
                id: self.id.clone(),
            });
        } else if self.source == self.id || self.has_circular_source(context) {
            reporter.report(SedModelError::CircularSource {
                id: self.id.clone(),
                model_source: self.source.clone(),
            });
        }

        if !self.language_urn_is_known() {
            reporter.report(SedModelError::UnknownLanguage {
                id: self.id.clone(),
                language: self.language.clone().unwrap_or_default(),
            });
        }

        for change in &self.changes {
            change.validate_all(context, &mut reporter.wrap());
        }
    }
}

/// Possible validation errors for [`SedModel`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedModelError {
    #[error(transparent)]
    Id(#[from] SedIdError),
    #[error("(Model id: `{id}`) Required attribute `source` is missing")]
    MissingSource { id: String },
    #[error("(Model id: `{id}`) Source `{model_source}` refers back to this model")]
    CircularSource { id: String, model_source: String },
    #[error("(Model id: `{id}`) Language `{language}` is not a known SED-ML language URN")]
    UnknownLanguage { id: String, language: String },
    #[error(transparent)]
    Change(#[from] SedChangeError),
}

impl SedModelError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedModelError::Id(e) => e.code(),
            SedModelError::MissingSource { .. } => SedErrorCode::MissingRequiredAttribute,
            SedModelError::CircularSource { .. } => SedErrorCode::UnresolvedReference,
            SedModelError::UnknownLanguage { .. } => SedErrorCode::UnknownModelLanguage,
            SedModelError::Change(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::tests::simple_document;
    use crate::model::{SedIdError, SedModelError};
    use crate::{ContextualValidation, SedDocument, SedModel};

    #[test]
    fn language_urns() {
        let known = [
            "urn:sedml:language:sbml",
            "urn:sedml:language:sbml.level-3.version-2",
            "urn:sedml:language:cellml",
            "urn:sedml:language:cellml.1_1",
        ];
        for language in known {
            assert!(SedModel::new("m", "m.xml").with_language(language).language_urn_is_known());
        }
        let unknown = [
            "urn:sedml:language:sbmlx",
            "urn:sedml:language:sbml.level-3",
            "urn:sedml:language:cellml.1",
            "urn:sedml:language:neuroml",
        ];
        for language in unknown {
            assert!(!SedModel::new("m", "m.xml").with_language(language).language_urn_is_known());
        }
        assert!(SedModel::new("m", "m.xml").language_urn_is_known());
    }

    #[test]
    fn derived_models() {
        let mut document = simple_document();
        document.add_model(SedModel::new("model2", "model1"));
        let derived = document.get_model_by_id("model2").unwrap();
        assert_eq!(
            derived.is_derived_from(&document).map(|m| m.id.as_str()),
            Some("model1")
        );
        assert!(!derived.has_circular_source(&document));
        assert!(derived.validate(&document).is_ok());
    }

    #[test]
    fn circular_sources() {
        let mut document = SedDocument::default();
        document.add_model(SedModel::new("a", "b"));
        document.add_model(SedModel::new("b", "a"));
        let a = document.get_model(0).unwrap();
        assert!(a.has_circular_source(&document));
        let issues = a.validate(&document).unwrap_err();
        assert_eq!(
            issues,
            vec![SedModelError::CircularSource {
                id: "a".to_string(),
                model_source: "b".to_string(),
            }]
        );
        assert_eq!(
            issues[0].to_string(),
            "(Model id: `a`) Source `b` refers back to this model"
        );
        assert!(std::error::Error::source(&issues[0]).is_none());
    }

    #[test]
    fn model_errors() {
        let mut document = simple_document();
        document.add_model(SedModel::new("model1", "").with_language("urn:foo"));
        let duplicate = document.get_model(1).unwrap();
        let issues = duplicate.validate(&document).unwrap_err();
        assert_eq!(
            issues,
            vec![
                SedModelError::Id(SedIdError::NotUnique {
                    element: "model",
                    id: "model1".to_string()
                }),
                SedModelError::MissingSource {
                    id: "model1".to_string()
                },
                SedModelError::UnknownLanguage {
                    id: "model1".to_string(),
                    language: "urn:foo".to_string()
                },
            ]
        );
    }

    #[test]
    fn create_change_attribute() {
        let mut model = SedModel::new("m", "m.xml");
        model.create_change_attribute("/x/@value", "2").set_new_value("3");
        assert_eq!(model.num_changes(), 1);
        assert_eq!(model.get_change_by_target("/x/@value").map(|c| c.target()), Some("/x/@value"));
    }
}
