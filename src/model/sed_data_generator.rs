use crate::math::{EvaluationContext, MathEvaluationError, MathExpression};
use crate::model::sed_checks::{SedIdError, SedMathError, check_math, check_sid};
use crate::model::sed_list::sed_list_accessors;
use crate::model::{SedOperationError, SedParameterError, SedVariableError, VariableContext, VariableOwner};
use crate::{
    ContextualValidation, ErrorReporter, SedBase, SedDocument, SedErrorCode, SedIdentified,
    SedParameter, SedVariable,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashMap;
use thiserror::Error;

/// A data generator (`<dataGenerator>`) post-processes simulation results: its `math`
/// combines `variables` (values produced by tasks) and `parameters` into a new data series
/// that outputs refer to.
///
/// Expected invariants (checked during validation):
///  - `id` is a valid SId unique within the enclosing [`SedDocument`].
///  - `math` is set, well-formed, and only references ids of `variables` and `parameters`.
///  - Every variable names an existing task.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SedDataGenerator {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub variables: Vec<SedVariable>,
    pub parameters: Vec<SedParameter>,
    pub math: Option<MathExpression>,
}

impl SedDataGenerator {
    #[must_use]
    pub fn new(id: &str) -> SedDataGenerator {
        SedDataGenerator {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// A data generator that simply exposes one variable of a task (the most common form).
    #[must_use]
    pub fn new_simple(id: &str, variable: SedVariable) -> SedDataGenerator {
        let math = MathExpression::mk_identifier(&variable.id);
        SedDataGenerator {
            id: id.to_string(),
            variables: vec![variable],
            math: Some(math),
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

    /// Set the math of this data generator. Expressions that are not well-formed are rejected.
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

    /// Evaluate the math pointwise over the value series of the variables.
    ///
    /// `series` maps variable ids to their simulated values. The result has one value per
    /// point of the shortest variable series (a single value if there are no variables).
    /// Aggregate functions applied to a single variable (e.g. `max(S1)`) reduce over the whole
    /// series of that variable. Parameters are bound automatically.
    ///
    /// Returns `None` if the data generator has no math.
    pub fn evaluate(
        &self,
        series: &HashMap<String, Vec<f64>>,
    ) -> Option<Result<Vec<f64>, MathEvaluationError>> {
        let math = self.math.as_ref()?;
        let mut length = if self.variables.is_empty() { 1 } else { usize::MAX };
        for variable in &self.variables {
            match series.get(&variable.id) {
                Some(values) => length = length.min(values.len()),
                None => {
                    return Some(Err(MathEvaluationError::UnknownIdentifier(
                        variable.id.clone(),
                    )));
                }
            }
        }
        log::debug!(
            "Evaluating data generator `{}` over {length} point(s).",
            self.id
        );

        let result = (0..length)
            .map(|index| {
                let context = SeriesPoint {
                    series,
                    index,
                    parameters: &self.parameters,
                };
                math.evaluate(&context)
            })
            .collect::<Result<Vec<_>, _>>();
        Some(result)
    }
}

/// One point of the evaluated series, with full series available for aggregates.
struct SeriesPoint<'a> {
    series: &'a HashMap<String, Vec<f64>>,
    index: usize,
    parameters: &'a [SedParameter],
}

impl EvaluationContext for SeriesPoint<'_> {
    fn value(&self, id: &str) -> Option<f64> {
        if let Some(values) = self.series.get(id) {
            return values.get(self.index).copied();
        }
        self.parameters
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.value)
    }

    fn series(&self, id: &str) -> Option<&[f64]> {
        self.series.get(id).map(Vec::as_slice)
    }
}

impl SedIdentified for SedDataGenerator {
    fn sed_id(&self) -> &str {
        self.id.as_str()
    }
}

impl ContextualValidation<SedDocument> for SedDataGenerator {
    type Error = SedDataGeneratorError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        let found_self = context.data_generators.iter().any(|d| std::ptr::eq(d, self));
        assert!(
            found_self,
            "Validation called on a data generator that is not part of the SedDocument"
        );

        let occurrences = context.count_document_id(&self.id);
        check_sid("dataGenerator", &self.id, occurrences, &mut reporter.wrap());

        let variable_context = VariableContext {
            document: context,
            siblings: &self.variables,
            owner: VariableOwner::DataGenerator,
        };
        for variable in &self.variables {
            variable.validate_all(&variable_context, &mut reporter.wrap());
        }
        for parameter in &self.parameters {
            parameter.validate_all(&self.parameters, &mut reporter.wrap());
        }

        match &self.math {
            None => reporter.report(SedDataGeneratorError::MissingMath {
                id: self.id.clone(),
            }),
            Some(math) => {
                let declared = self
                    .variables
                    .iter()
                    .map(|v| v.id.as_str())
                    .chain(self.parameters.iter().map(|p| p.id.as_str()));
                check_math("dataGenerator", &self.id, math, declared, &mut reporter.wrap());
            }
        }
    }
}

/// Possible validation errors for [`SedDataGenerator`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedDataGeneratorError {
    #[error(transparent)]
    Id(#[from] SedIdError),
    #[error("(Data generator id: `{id}`) Required element `math` is missing")]
    MissingMath { id: String },
    #[error(transparent)]
    Math(#[from] SedMathError),
    #[error(transparent)]
    Variable(#[from] SedVariableError),
    #[error(transparent)]
    Parameter(#[from] SedParameterError),
}

impl SedDataGeneratorError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedDataGeneratorError::Id(e) => e.code(),
            SedDataGeneratorError::MissingMath { .. } => SedErrorCode::MissingRequiredElement,
            SedDataGeneratorError::Math(e) => e.code(),
            SedDataGeneratorError::Variable(e) => e.code(),
            SedDataGeneratorError::Parameter(e) => e.code(),
        }
    }
}
