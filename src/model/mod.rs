//! The typed SED-ML object model.
//!
//! A [`SedDocument`] owns lists of models, simulations, tasks, data generators and outputs.
//! Elements reference each other by SId, and these references are only checked during
//! validation (see [`crate::ContextualValidation`]).

use crate::SedErrorCode;
use thiserror::Error;

mod sed_base;
mod sed_change;
mod sed_checks;
mod sed_data_generator;
mod sed_document;
mod sed_element;
pub(crate) mod sed_list;
mod sed_model;
mod sed_output;
mod sed_parameter;
mod sed_simulation;
mod sed_task;
mod sed_variable;

pub use sed_base::SedBase;
pub use sed_change::{
    SedAddXml, SedChange, SedChangeAttribute, SedChangeError, SedChangeXml, SedComputeChange,
    SedRemoveXml,
};
pub use sed_checks::{SedIdError, SedMathError};
pub use sed_data_generator::{SedDataGenerator, SedDataGeneratorError};
pub use sed_document::{SedDocument, SedDocumentError};
pub use sed_element::{SedElementRef, SedTypeCode};
pub use sed_list::{SedIdentified, SedListOf};
pub use sed_model::{SEDML_LANGUAGE_CELLML, SEDML_LANGUAGE_SBML, SedModel, SedModelError};
pub use sed_output::{
    SedCurve, SedDataSet, SedOutput, SedOutputError, SedPlot2D, SedPlot3D, SedReport, SedSurface,
};
pub use sed_parameter::{SedParameter, SedParameterError};
pub use sed_simulation::{
    SedAlgorithm, SedAlgorithmParameter, SedSimulation, SedSimulationError, SimulationKind,
};
pub use sed_task::{SedTask, SedTaskError};
pub use sed_variable::{
    SEDML_SYMBOL_TIME, SedVariable, SedVariableError, VariableContext, VariableOwner,
};

/// Errors of operations that modify the object model and refuse invalid input.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedOperationError {
    #[error("Invalid object: {reason}")]
    InvalidObject { reason: String },
    #[error("Level {level} version {version} is not a valid SED-ML combination")]
    InvalidLevelVersion { level: u32, version: u32 },
    #[error("Invalid namespace prefix `{prefix}`")]
    InvalidNamespacePrefix { prefix: String },
}

impl SedOperationError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedOperationError::InvalidObject { .. } => SedErrorCode::UnknownError,
            SedOperationError::InvalidLevelVersion { .. } => {
                SedErrorCode::InvalidTargetLevelVersion
            }
            SedOperationError::InvalidNamespacePrefix { .. } => {
                SedErrorCode::InvalidNamespaceOnSed
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::{
        SedBase, SedDataGenerator, SedDocument, SedModel, SedOutput, SedPlot2D, SedReport,
        SedSimulation, SedTask, SedVariable,
    };

    /// A small, valid L1V1 document:
    /// `model1` <- `task1` -> `sim1`, data generator `dg1` over `task1`, a plot and a report.
    pub fn simple_document() -> SedDocument {
        let mut document = SedDocument::default();
        document.add_model(
            SedModel::new("model1", "model1.xml").with_language("urn:sedml:language:sbml"),
        );
        document.add_simulation(
            SedSimulation::new_uniform_time_course("sim1", 0.0, 0.0, 10.0, 100)
                .with_algorithm("KISAO:0000019"),
        );
        document.add_task(SedTask::new("task1", "model1", "sim1"));

        let variable = SedVariable::new_target(
            "S1",
            "/sbml:sbml/sbml:model/sbml:listOfSpecies/sbml:species[@id='S1']",
        )
        .with_task("task1");
        let mut dg = SedDataGenerator::new_simple("dg1", variable);
        dg.base = SedBase::with_metaid("meta_dg1");
        document.add_data_generator(dg);

        let mut plot = SedPlot2D::new("plot1");
        plot.create_curve("c1", "dg1", "dg1");
        document.add_output(SedOutput::Plot2D(plot));

        let mut report = SedReport::new("report1");
        report.create_data_set("ds1", "S1", "dg1");
        document.add_output(SedOutput::Report(report));
        document
    }
}
