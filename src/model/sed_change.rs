use crate::math::{EvaluationContext, MathEvaluationError, MathExpression};
use crate::model::sed_checks::{SedMathError, check_math};
use crate::model::sed_list::sed_list_accessors;
use crate::model::{
    SedOperationError, SedParameterError, SedTypeCode, SedVariableError, VariableContext,
    VariableOwner,
};
use crate::{
    ContextualValidation, ErrorReporter, SedBase, SedDocument, SedErrorCode, SedParameter,
    SedVariable,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashMap;
use thiserror::Error;

/// A modification of a model source before it is simulated.
///
/// All change kinds address the modified part of the model by an XPath `target`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SedChange {
    ChangeAttribute(SedChangeAttribute),
    ChangeXml(SedChangeXml),
    AddXml(SedAddXml),
    RemoveXml(SedRemoveXml),
    ComputeChange(SedComputeChange),
}

/// `<changeAttribute>`: replace the value of the targeted attribute with `new_value`.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedChangeAttribute {
    #[serde(flatten)]
    pub base: SedBase,
    pub target: String,
    pub new_value: Option<String>,
}

/// `<changeXML>`: replace the targeted XML with the raw `new_xml` markup.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedChangeXml {
    #[serde(flatten)]
    pub base: SedBase,
    pub target: String,
    pub new_xml: String,
}

/// `<addXML>`: insert the raw `new_xml` markup as a child of the target.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedAddXml {
    #[serde(flatten)]
    pub base: SedBase,
    pub target: String,
    pub new_xml: String,
}

/// `<removeXML>`: remove the targeted XML.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedRemoveXml {
    #[serde(flatten)]
    pub base: SedBase,
    pub target: String,
}

/// `<computeChange>`: set the target to the value of `math`, computed from `variables`
/// (model quantities) and `parameters`.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SedComputeChange {
    #[serde(flatten)]
    pub base: SedBase,
    pub target: String,
    pub variables: Vec<SedVariable>,
    pub parameters: Vec<SedParameter>,
    pub math: Option<MathExpression>,
}

impl SedChange {
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            SedChange::ChangeAttribute(x) => &x.target,
            SedChange::ChangeXml(x) => &x.target,
            SedChange::AddXml(x) => &x.target,
            SedChange::RemoveXml(x) => &x.target,
            SedChange::ComputeChange(x) => &x.target,
        }
    }

    pub fn set_target(&mut self, target: &str) {
        let value = target.to_string();
        match self {
            SedChange::ChangeAttribute(x) => x.target = value,
            SedChange::ChangeXml(x) => x.target = value,
            SedChange::AddXml(x) => x.target = value,
            SedChange::RemoveXml(x) => x.target = value,
            SedChange::ComputeChange(x) => x.target = value,
        }
    }

    #[must_use]
    pub fn base(&self) -> &SedBase {
        match self {
            SedChange::ChangeAttribute(x) => &x.base,
            SedChange::ChangeXml(x) => &x.base,
            SedChange::AddXml(x) => &x.base,
            SedChange::RemoveXml(x) => &x.base,
            SedChange::ComputeChange(x) => &x.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut SedBase {
        match self {
            SedChange::ChangeAttribute(x) => &mut x.base,
            SedChange::ChangeXml(x) => &mut x.base,
            SedChange::AddXml(x) => &mut x.base,
            SedChange::RemoveXml(x) => &mut x.base,
            SedChange::ComputeChange(x) => &mut x.base,
        }
    }

    /// The XML element name of this change kind.
    #[must_use]
    pub fn element_name(&self) -> &'static str {
        match self {
            SedChange::ChangeAttribute(_) => "changeAttribute",
            SedChange::ChangeXml(_) => "changeXML",
            SedChange::AddXml(_) => "addXML",
            SedChange::RemoveXml(_) => "removeXML",
            SedChange::ComputeChange(_) => "computeChange",
        }
    }

    #[must_use]
    pub fn type_code(&self) -> SedTypeCode {
        match self {
            SedChange::ChangeAttribute(_) => SedTypeCode::ChangeAttribute,
            SedChange::ChangeXml(_) => SedTypeCode::ChangeXml,
            SedChange::AddXml(_) => SedTypeCode::AddXml,
            SedChange::RemoveXml(_) => SedTypeCode::RemoveXml,
            SedChange::ComputeChange(_) => SedTypeCode::ComputeChange,
        }
    }
}

impl SedChangeAttribute {
    #[must_use]
    pub fn new(target: &str, new_value: &str) -> SedChangeAttribute {
        SedChangeAttribute {
            target: target.to_string(),
            new_value: Some(new_value.to_string()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    pub fn set_new_value(&mut self, value: &str) {
        self.new_value = Some(value.to_string());
    }

    pub fn unset_new_value(&mut self) {
        self.new_value = None;
    }
}

impl SedChangeXml {
    #[must_use]
    pub fn new(target: &str, new_xml: &str) -> SedChangeXml {
        SedChangeXml {
            target: target.to_string(),
            new_xml: new_xml.to_string(),
            ..Default::default()
        }
    }
}

impl SedAddXml {
    #[must_use]
    pub fn new(target: &str, new_xml: &str) -> SedAddXml {
        SedAddXml {
            target: target.to_string(),
            new_xml: new_xml.to_string(),
            ..Default::default()
        }
    }
}

impl SedRemoveXml {
    #[must_use]
    pub fn new(target: &str) -> SedRemoveXml {
        SedRemoveXml {
            target: target.to_string(),
            ..Default::default()
        }
    }
}

impl SedComputeChange {
    #[must_use]
    pub fn new(target: &str) -> SedComputeChange {
        SedComputeChange {
            target: target.to_string(),
            ..Default::default()
        }
    }

    sed_list_accessors!(
        variables: SedVariable,
        add_variable,
        get_variable,
        get_variable_by_id,
        remove_variable,
        remove_variable_by_id,
        num_variables
    );

    sed_list_accessors!(
        parameters: SedParameter,
        add_parameter,
        get_parameter,
        get_parameter_by_id,
        remove_parameter,
        remove_parameter_by_id,
        num_parameters
    );

    /// Append a new variable with the given `id` and return a reference to it.
    pub fn create_variable(&mut self, id: &str) -> &mut SedVariable {
        self.variables.push(SedVariable {
            id: id.to_string(),
            ..Default::default()
        });
        let last = self.variables.len() - 1;
        &mut self.variables[last]
    }

    /// Append a new parameter and return a reference to it.
    pub fn create_parameter(&mut self, id: &str, value: f64) -> &mut SedParameter {
        self.parameters.push(SedParameter::new(id, value));
        let last = self.parameters.len() - 1;
        &mut self.parameters[last]
    }

    /// Set the math of this change. Expressions that are not well-formed are rejected.
    pub fn set_math(&mut self, math: MathExpression) -> Result<(), SedOperationError> {
        if !math.is_well_formed() {
            return Err(SedOperationError::InvalidObject {
                reason: format!("Math `{math}` is not well-formed"),
            });
        }
        self.math = Some(math);
        Ok(())
    }

    pub fn unset_math(&mut self) {
        self.math = None;
    }

    /// Compute the new value of the target. Values of `variables` are supplied by the
    /// caller through `bindings`, parameters are bound automatically (a binding with the same
    /// id takes precedence).
    ///
    /// Returns `None` if the change has no math.
    pub fn evaluate(
        &self,
        bindings: &HashMap<String, f64>,
    ) -> Option<Result<f64, MathEvaluationError>> {
        let math = self.math.as_ref()?;
        let context = ParameterBindings {
            bindings,
            parameters: &self.parameters,
        };
        Some(math.evaluate(&context))
    }
}

/// Caller bindings with a fallback to parameter values.
pub(crate) struct ParameterBindings<'a> {
    pub bindings: &'a HashMap<String, f64>,
    pub parameters: &'a [SedParameter],
}

impl EvaluationContext for ParameterBindings<'_> {
    fn value(&self, id: &str) -> Option<f64> {
        self.bindings.get(id).copied().or_else(|| {
            self.parameters
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.value)
        })
    }
}

impl ContextualValidation<SedDocument> for SedChange {
    type Error = SedChangeError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        if self.target().trim().is_empty() {
            reporter.report(SedChangeError::MissingTarget {
                element: self.element_name(),
            });
        }

        match self {
            SedChange::ChangeAttribute(change) => {
                if change.new_value.is_none() {
                    reporter.report(SedChangeError::MissingNewValue {
                        target: change.target.clone(),
                    });
                }
            }
            SedChange::ChangeXml(SedChangeXml { target, new_xml, .. })
            | SedChange::AddXml(SedAddXml { target, new_xml, .. }) => {
                if new_xml.trim().is_empty() {
                    reporter.report(SedChangeError::MissingNewXml {
                        element: self.element_name(),
                        target: target.clone(),
                    });
                }
            }
            SedChange::RemoveXml(_) => {}
            SedChange::ComputeChange(change) => change.validate_all(context, reporter),
        }
    }
}

impl ContextualValidation<SedDocument> for SedComputeChange {
    type Error = SedChangeError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        let variable_context = VariableContext {
            document: context,
            siblings: &self.variables,
            owner: VariableOwner::ComputeChange,
        };
        for variable in &self.variables {
            variable.validate_all(&variable_context, &mut reporter.wrap());
        }
        for parameter in &self.parameters {
            parameter.validate_all(&self.parameters, &mut reporter.wrap());
        }

        match &self.math {
            None => reporter.report(SedChangeError::MissingMath {
                target: self.target.clone(),
            }),
            Some(math) => {
                let declared = self
                    .variables
                    .iter()
                    .map(|v| v.id.as_str())
                    .chain(self.parameters.iter().map(|p| p.id.as_str()));
                check_math(
                    "computeChange",
                    &self.target,
                    math,
                    declared,
                    &mut reporter.wrap(),
                );
            }
        }
    }
}

/// Possible validation errors for [`SedChange`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedChangeError {
    #[error("(`{element}`) Required attribute `target` is missing")]
    MissingTarget { element: &'static str },
    #[error("(Change target: `{target}`) Required attribute `newValue` is missing")]
    MissingNewValue { target: String },
    #[error("(`{element}` target: `{target}`) Required element `newXML` is missing or empty")]
    MissingNewXml {
        element: &'static str,
        target: String,
    },
    #[error("(Change target: `{target}`) Required element `math` is missing")]
    MissingMath { target: String },
    #[error(transparent)]
    Math(#[from] SedMathError),
    #[error(transparent)]
    Variable(#[from] SedVariableError),
    #[error(transparent)]
    Parameter(#[from] SedParameterError),
}

impl SedChangeError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedChangeError::MissingTarget { .. } | SedChangeError::MissingNewValue { .. } => {
                SedErrorCode::MissingRequiredAttribute
            }
            SedChangeError::MissingNewXml { .. } | SedChangeError::MissingMath { .. } => {
                SedErrorCode::MissingRequiredElement
            }
            SedChangeError::Math(e) => e.code(),
            SedChangeError::Variable(e) => e.code(),
            SedChangeError::Parameter(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::math::{MathExpression, MathOperator};
    use crate::model::tests::simple_document;
    use crate::model::{SedChangeError, SedMathError, SedOperationError};
    use crate::{
        ContextualValidation, SedChange, SedChangeAttribute, SedChangeXml, SedComputeChange,
        SedRemoveXml, SedVariable,
    };
    use std::collections::HashMap;

    #[test]
    fn set_math_rejects_malformed() {
        let mut change = SedComputeChange::new("/x");
        let bad = MathExpression::mk_apply(MathOperator::Divide, &[MathExpression::mk_integer(1)]);
        assert!(matches!(
            change.set_math(bad),
            Err(SedOperationError::InvalidObject { .. })
        ));
        assert!(change.math.is_none());
        change.set_math(MathExpression::parse("k * 2").unwrap()).unwrap();
        assert!(change.math.is_some());
        change.unset_math();
        assert!(change.math.is_none());
    }

    #[test]
    fn compute_change_evaluation() {
        let mut change = SedComputeChange::new("/x");
        change.create_parameter("k", 3.0);
        change.create_variable("s").set_target("/y");
        change.set_math(MathExpression::parse("k * s").unwrap()).unwrap();
        let bindings = HashMap::from([("s".to_string(), 2.0)]);
        assert_eq!(change.evaluate(&bindings), Some(Ok(6.0)));
        let bindings = HashMap::from([("s".to_string(), 2.0), ("k".to_string(), 10.0)]);
        assert_eq!(change.evaluate(&bindings), Some(Ok(20.0)));
        assert!(SedComputeChange::new("/x").evaluate(&bindings).is_none());
    }

    #[test]
    fn list_accessors() {
        let mut change = SedComputeChange::new("/x");
        change.add_variable(SedVariable::new_target("a", "/a"));
        change.add_variable(SedVariable::new_target("b", "/b"));
        assert_eq!(change.num_variables(), 2);
        assert_eq!(change.get_variable(1).map(|v| v.id.as_str()), Some("b"));
        assert!(change.get_variable(2).is_none());
        assert!(change.remove_variable_by_id("a").is_some());
        assert!(change.remove_variable(3).is_none());
        assert_eq!(change.get_variable_by_id("b").map(|v| v.id.as_str()), Some("b"));
    }

    #[test]
    fn change_validation() {
        let document = simple_document();
        let ok = SedChange::ChangeAttribute(SedChangeAttribute::new("/x/@value", "1"));
        assert!(ok.validate(&document).is_ok());

        let mut missing = SedChangeAttribute::new("", "1");
        missing.unset_new_value();
        let issues = SedChange::ChangeAttribute(missing).validate(&document).unwrap_err();
        assert_eq!(
            issues,
            vec![
                SedChangeError::MissingTarget {
                    element: "changeAttribute"
                },
                SedChangeError::MissingNewValue {
                    target: String::new()
                },
            ]
        );

        let empty_xml = SedChange::ChangeXml(SedChangeXml::new("/x", "  "));
        assert_eq!(empty_xml.validate(&document).unwrap_err().len(), 1);
        assert!(SedChange::RemoveXml(SedRemoveXml::new("/x")).validate(&document).is_ok());

        let mut compute = SedComputeChange::new("/x");
        compute.set_math(MathExpression::parse("a + 1").unwrap()).unwrap();
        let issues = SedChange::ComputeChange(compute).validate(&document).unwrap_err();
        assert_eq!(
            issues,
            vec![SedChangeError::Math(SedMathError::UndeclaredIdentifier {
                element: "computeChange",
                id: "/x".to_string(),
                identifier: "a".to_string(),
            })]
        );
    }
}
