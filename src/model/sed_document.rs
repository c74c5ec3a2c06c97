use crate::model::sed_list::sed_list_accessors;
use crate::model::{
    SedDataGeneratorError, SedModelError, SedOperationError, SedOutputError,
    SedSimulationError, SedTaskError,
};
use crate::xml::SedNamespaces;
use crate::{
    ContextualValidation, ErrorReporter, SedBase, SedDataGenerator, SedError, SedErrorCode,
    SedModel, SedOutput, SedPlot2D, SedPlot3D, SedReport, SedSimulation, SedTask, Validation,
    VecReporter, utils::is_valid_metaid,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The root of a SED-ML description (`<sedML>`).
///
/// A document owns all elements of the simulation experiment: which models are used
/// (and how they are changed), which simulations are run on them (tasks), how the
/// results are post-processed (data generators), and what is finally shown (outputs).
/// Each list is kept in document order.
///
/// The level and version of the document (L1V1 by default) are part of `namespaces`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SedDocument {
    #[serde(flatten)]
    pub base: SedBase,
    pub namespaces: SedNamespaces,
    pub models: Vec<SedModel>,
    pub simulations: Vec<SedSimulation>,
    pub tasks: Vec<SedTask>,
    pub data_generators: Vec<SedDataGenerator>,
    pub outputs: Vec<SedOutput>,
}

impl SedDocument {
    /// Create an empty document of the given SED-ML level and version.
    ///
    /// The combination is not checked here; invalid combinations are reported by validation.
    /// Use [`SedDocument::set_level_and_version`] to change them with a check.
    #[must_use]
    pub fn new(level: u32, version: u32) -> SedDocument {
        SedDocument {
            namespaces: SedNamespaces::new(level, version),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.namespaces.level()
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.namespaces.version()
    }

    /// Change the level and version of this document. Only supported combinations are
    /// accepted. The content itself is not converted.
    pub fn set_level_and_version(
        &mut self,
        level: u32,
        version: u32,
    ) -> Result<(), SedOperationError> {
        let namespaces = SedNamespaces::new(level, version);
        if !namespaces.is_valid_combination() {
            return Err(SedOperationError::InvalidLevelVersion { level, version });
        }
        self.namespaces.set_level(level);
        self.namespaces.set_version(version);
        Ok(())
    }

    sed_list_accessors!(
        models: SedModel,
        add_model,
        get_model,
        get_model_by_id,
        remove_model,
        remove_model_by_id,
        num_models
    );

    sed_list_accessors!(
        simulations: SedSimulation,
        add_simulation,
        get_simulation,
        get_simulation_by_id,
        remove_simulation,
        remove_simulation_by_id,
        num_simulations
    );

    sed_list_accessors!(
        tasks: SedTask,
        add_task,
        get_task,
        get_task_by_id,
        remove_task,
        remove_task_by_id,
        num_tasks
    );

    sed_list_accessors!(
        data_generators: SedDataGenerator,
        add_data_generator,
        get_data_generator,
        get_data_generator_by_id,
        remove_data_generator,
        remove_data_generator_by_id,
        num_data_generators
    );

    sed_list_accessors!(
        outputs: SedOutput,
        add_output,
        get_output,
        get_output_by_id,
        remove_output,
        remove_output_by_id,
        num_outputs
    );

    /// Append a new model and return a reference to it.
    pub fn create_model(&mut self, id: &str, source: &str) -> &mut SedModel {
        self.models.push(SedModel::new(id, source));
        let last = self.models.len() - 1;
        &mut self.models[last]
    }

    /// Append a new simulation and return a reference to it.
    pub fn create_simulation(&mut self, simulation: SedSimulation) -> &mut SedSimulation {
        self.simulations.push(simulation);
        let last = self.simulations.len() - 1;
        &mut self.simulations[last]
    }

    /// Append a new task and return a reference to it.
    pub fn create_task(&mut self, id: &str, model: &str, simulation: &str) -> &mut SedTask {
        self.tasks.push(SedTask::new(id, model, simulation));
        let last = self.tasks.len() - 1;
        &mut self.tasks[last]
    }

    /// Append a new (empty) data generator and return a reference to it.
    pub fn create_data_generator(&mut self, id: &str) -> &mut SedDataGenerator {
        self.data_generators.push(SedDataGenerator::new(id));
        let last = self.data_generators.len() - 1;
        &mut self.data_generators[last]
    }

    /// Append a new, empty 2D plot and return a reference to it.
    pub fn create_plot_2d(&mut self, id: &str) -> &mut SedOutput {
        self.create_output(SedOutput::Plot2D(SedPlot2D::new(id)))
    }

    /// Append a new, empty 3D plot and return a reference to it.
    pub fn create_plot_3d(&mut self, id: &str) -> &mut SedOutput {
        self.create_output(SedOutput::Plot3D(SedPlot3D::new(id)))
    }

    /// Append a new, empty report and return a reference to it.
    pub fn create_report(&mut self, id: &str) -> &mut SedOutput {
        self.create_output(SedOutput::Report(SedReport::new(id)))
    }

    fn create_output(&mut self, output: SedOutput) -> &mut SedOutput {
        self.outputs.push(output);
        let last = self.outputs.len() - 1;
        &mut self.outputs[last]
    }

    /// Number of elements in the document-wide SId scope that use `id`.
    ///
    /// The scope covers models, simulations, tasks, data generators and outputs, together
    /// with curves, surfaces and data sets of outputs. Variables and parameters are scoped
    /// by their enclosing list.
    pub(crate) fn count_document_id(&self, id: &str) -> usize {
        let top_level = self.models.iter().filter(|m| m.id == id).count()
            + self.simulations.iter().filter(|s| s.id == id).count()
            + self.tasks.iter().filter(|t| t.id == id).count()
            + self.data_generators.iter().filter(|d| d.id == id).count()
            + self.outputs.iter().filter(|o| o.id() == id).count();
        let nested = self
            .outputs
            .iter()
            .flat_map(SedOutput::child_ids)
            .filter(|child| *child == id)
            .count();
        top_level + nested
    }
}

impl SedDocument {
    /// Create a document from its JSON dump (see [`SedDocument::to_json_string`]).
    pub fn from_json_string(json: &str) -> Result<SedDocument, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Dump the object model into a JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Dump the object model into a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl SedDocument {
    /// Validate the document and return all problems as [`SedError`] diagnostics.
    ///
    /// Unlike [`Validation::validate`], the result also contains warnings (such as unknown
    /// model languages), so an empty result is not required for a usable document.
    #[must_use]
    pub fn check(&self) -> Vec<SedError> {
        let mut reporter = VecReporter::default();
        self.validate_all(&mut reporter);
        reporter
            .into_errors()
            .into_iter()
            .map(|error| SedError::new(error.code(), error.to_string()))
            .collect()
    }
}

impl Validation for SedDocument {
    type Error = SedDocumentError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, reporter: &mut R) {
        if !self.namespaces.is_valid_combination() {
            reporter.report(SedDocumentError::InvalidLevelVersion {
                level: self.level(),
                version: self.version(),
            });
        }

        let mut metaids: HashMap<&str, usize> = HashMap::new();
        for element in self.elements() {
            if let Some(metaid) = element.metaid() {
                *metaids.entry(metaid).or_default() += 1;
                if !is_valid_metaid(metaid) {
                    reporter.report(SedDocumentError::InvalidMetaid {
                        metaid: metaid.to_string(),
                    });
                }
            }
        }
        // Reported once per duplicate value, in document order.
        for element in self.elements() {
            if let Some(metaid) = element.metaid()
                && let Some(count) = metaids.get_mut(metaid)
                && *count > 1
            {
                *count = 0;
                reporter.report(SedDocumentError::MetaidNotUnique {
                    metaid: metaid.to_string(),
                });
            }
        }

        for model in &self.models {
            model.validate_all(self, &mut reporter.wrap());
        }
        for simulation in &self.simulations {
            simulation.validate_all(self, &mut reporter.wrap());
        }
        for task in &self.tasks {
            task.validate_all(self, &mut reporter.wrap());
        }
        for data_generator in &self.data_generators {
            data_generator.validate_all(self, &mut reporter.wrap());
        }
        for output in &self.outputs {
            output.validate_all(self, &mut reporter.wrap());
        }
    }
}

/// Possible validation errors for [`SedDocument`], including all errors of its elements.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedDocumentError {
    #[error("Level {level} version {version} is not a valid SED-ML combination")]
    InvalidLevelVersion { level: u32, version: u32 },
    #[error("Metaid `{metaid}` is used by more than one element")]
    MetaidNotUnique { metaid: String },
    #[error("Metaid `{metaid}` is not a valid XML ID")]
    InvalidMetaid { metaid: String },
    #[error(transparent)]
    Model(#[from] SedModelError),
    #[error(transparent)]
    Simulation(#[from] SedSimulationError),
    #[error(transparent)]
    Task(#[from] SedTaskError),
    #[error(transparent)]
    DataGenerator(#[from] SedDataGeneratorError),
    #[error(transparent)]
    Output(#[from] SedOutputError),
}

impl SedDocumentError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedDocumentError::InvalidLevelVersion { .. } => SedErrorCode::InvalidSedLevelVersion,
            SedDocumentError::MetaidNotUnique { .. } => SedErrorCode::DuplicateMetaId,
            SedDocumentError::InvalidMetaid { .. } => SedErrorCode::InvalidMetaidSyntax,
            SedDocumentError::Model(e) => e.code(),
            SedDocumentError::Simulation(e) => e.code(),
            SedDocumentError::Task(e) => e.code(),
            SedDocumentError::DataGenerator(e) => e.code(),
            SedDocumentError::Output(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::tests::simple_document;
    use crate::model::{SedDocumentError, SedIdError, SedOperationError, SedTaskError};
    use crate::{
        SedBase, SedDocument, SedErrorCode, SedModel, SedSimulation, SedTask, SimulationKind,
        Validation,
    };

    #[test]
    fn simple_document_is_valid() {
        let document = simple_document();
        assert!(document.validate().is_ok());
        assert!(document.check().is_empty());
        assert_eq!(document.num_models(), 1);
        assert_eq!(document.num_outputs(), 2);
    }

    #[test]
    fn level_and_version() {
        let mut document = SedDocument::default();
        assert_eq!((document.level(), document.version()), (1, 1));
        document.set_level_and_version(1, 2).unwrap();
        assert_eq!(document.version(), 2);
        assert_eq!(
            document.set_level_and_version(3, 1),
            Err(SedOperationError::InvalidLevelVersion {
                level: 3,
                version: 1
            })
        );
        assert_eq!(document.version(), 2);

        let document = SedDocument::new(2, 5);
        assert_eq!(
            document.validate().unwrap_err(),
            vec![SedDocumentError::InvalidLevelVersion {
                level: 2,
                version: 5
            }]
        );
    }

    #[test]
    fn create_and_remove() {
        let mut document = SedDocument::default();
        document.create_model("m", "m.xml").name = Some("Model".to_string());
        document.create_simulation(SedSimulation::new("s", SimulationKind::SteadyState));
        document.create_task("t", "m", "s");
        document.create_data_generator("d");
        document.create_report("r");
        assert_eq!(document.get_model_by_id("m").and_then(|m| m.name.as_deref()), Some("Model"));
        assert_eq!(document.num_tasks(), 1);
        assert_eq!(document.num_data_generators(), 1);
        assert!(document.get_output(0).is_some());

        assert!(document.remove_task_by_id("t").is_some());
        assert!(document.remove_task_by_id("t").is_none());
        assert!(document.remove_model(4).is_none());
        assert!(document.remove_output(0).is_some());
        assert_eq!(document.num_outputs(), 0);
    }

    #[test]
    fn document_wide_id_scope() {
        let mut document = simple_document();
        document.add_task(SedTask::new("sim1", "model1", "sim1"));
        let issues = document.validate().unwrap_err();
        assert!(issues.contains(&SedDocumentError::Task(SedTaskError::Id(
            SedIdError::NotUnique {
                element: "task",
                id: "sim1".to_string()
            }
        ))));
        assert_eq!(document.count_document_id("sim1"), 2);
        assert_eq!(document.count_document_id("c1"), 1);
        assert_eq!(document.count_document_id("S1"), 0);
    }

    #[test]
    fn metaid_checks() {
        let mut document = simple_document();
        document.base = SedBase::with_metaid("meta_dg1");
        let mut model = SedModel::new("model2", "model1");
        model.base = SedBase::with_metaid("1bad");
        document.add_model(model);

        let issues = document.validate().unwrap_err();
        assert_eq!(
            issues,
            vec![
                SedDocumentError::InvalidMetaid {
                    metaid: "1bad".to_string()
                },
                SedDocumentError::MetaidNotUnique {
                    metaid: "meta_dg1".to_string()
                },
            ]
        );
        let codes = document.check().iter().map(|e| e.code).collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![SedErrorCode::InvalidMetaidSyntax, SedErrorCode::DuplicateMetaId]
        );
    }

    #[test]
    fn json_round_trip() {
        let document = simple_document();
        let json = document.to_json_string().unwrap();
        assert_eq!(SedDocument::from_json_string(&json).unwrap(), document);
        let pretty = document.to_json_string_pretty().unwrap();
        assert!(pretty.contains("\"meta_dg1\""));
        assert_eq!(SedDocument::from_json_string(&pretty).unwrap(), document);
        assert!(SedDocument::from_json_string("{").is_err());
    }
}
