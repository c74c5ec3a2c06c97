use crate::model::sed_checks::{SedIdError, check_sid};
use crate::model::SedTypeCode;
use crate::utils::is_valid_kisao_id;
use crate::{ContextualValidation, ErrorReporter, SedBase, SedDocument, SedErrorCode, SedIdentified};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

/// A simulation setup (`<uniformTimeCourse>`, `<oneStep>` or `<steadyState>`) with
/// the [`SedAlgorithm`] that should perform it.
///
/// Expected invariants (checked during validation):
///  - `id` is a valid SId unique within the enclosing [`SedDocument`].
///  - `algorithm` is set and has a valid KiSAO id.
///  - Uniform time course: `initial_time <= output_start_time <= output_end_time`
///    and `number_of_points >= 1`.
///  - One step: `step > 0`.
///  - One step, steady state and algorithm parameters require SED-ML L1V2.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SedSimulation {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub algorithm: Option<SedAlgorithm>,
    pub kind: SimulationKind,
}

/// The simulation type together with its type-specific attributes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum SimulationKind {
    UniformTimeCourse {
        initial_time: f64,
        output_start_time: f64,
        output_end_time: f64,
        number_of_points: i32,
    },
    OneStep {
        step: f64,
    },
    SteadyState,
}

/// The simulation algorithm, identified by a KiSAO term (`KISAO:0000019`).
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedAlgorithm {
    #[serde(flatten)]
    pub base: SedBase,
    pub kisao_id: String,
    pub parameters: Vec<SedAlgorithmParameter>,
}

/// A setting of the algorithm (`<algorithmParameter>`), again identified by a KiSAO term.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedAlgorithmParameter {
    #[serde(flatten)]
    pub base: SedBase,
    pub kisao_id: String,
    pub value: String,
}

impl SimulationKind {
    #[must_use]
    pub fn element_name(&self) -> &'static str {
        match self {
            SimulationKind::UniformTimeCourse { .. } => "uniformTimeCourse",
            SimulationKind::OneStep { .. } => "oneStep",
            SimulationKind::SteadyState => "steadyState",
        }
    }

    #[must_use]
    pub fn type_code(&self) -> SedTypeCode {
        match self {
            SimulationKind::UniformTimeCourse { .. } => SedTypeCode::UniformTimeCourse,
            SimulationKind::OneStep { .. } => SedTypeCode::OneStep,
            SimulationKind::SteadyState => SedTypeCode::SteadyState,
        }
    }

    /// True if the simulation kind exists in the given SED-ML level and version.
    #[must_use]
    pub fn is_available_in(&self, level: u32, version: u32) -> bool {
        match self {
            SimulationKind::UniformTimeCourse { .. } => true,
            SimulationKind::OneStep { .. } | SimulationKind::SteadyState => {
                level > 1 || version >= 2
            }
        }
    }
}

impl SedSimulation {
    #[must_use]
    pub fn new_uniform_time_course(
        id: &str,
        initial_time: f64,
        output_start_time: f64,
        output_end_time: f64,
        number_of_points: i32,
    ) -> SedSimulation {
        SedSimulation::new(
            id,
            SimulationKind::UniformTimeCourse {
                initial_time,
                output_start_time,
                output_end_time,
                number_of_points,
            },
        )
    }

    #[must_use]
    pub fn new_one_step(id: &str, step: f64) -> SedSimulation {
        SedSimulation::new(id, SimulationKind::OneStep { step })
    }

    #[must_use]
    pub fn new_steady_state(id: &str) -> SedSimulation {
        SedSimulation::new(id, SimulationKind::SteadyState)
    }

    #[must_use]
    pub fn new(id: &str, kind: SimulationKind) -> SedSimulation {
        SedSimulation {
            base: SedBase::default(),
            id: id.to_string(),
            name: None,
            algorithm: None,
            kind,
        }
    }

    /// Builder-style setter of the algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, kisao_id: &str) -> SedSimulation {
        self.algorithm = Some(SedAlgorithm::new(kisao_id));
        self
    }

    #[must_use]
    pub fn element_name(&self) -> &'static str {
        self.kind.element_name()
    }

    /// The output time points of a uniform time course: `number_of_points + 1` equally
    /// spaced values from `output_start_time` to `output_end_time`, produced lazily.
    ///
    /// Returns `None` for other simulation kinds, or when `number_of_points < 1`.
    pub fn uniform_time_points(&self) -> Option<impl Iterator<Item = f64> + use<>> {
        let SimulationKind::UniformTimeCourse {
            output_start_time,
            output_end_time,
            number_of_points,
            ..
        } = self.kind
        else {
            return None;
        };
        if number_of_points < 1 {
            return None;
        }
        let step = (output_end_time - output_start_time) / f64::from(number_of_points);
        let points = (0..number_of_points)
            .map(move |i| output_start_time + step * f64::from(i))
            .chain(std::iter::once(output_end_time));
        Some(points)
    }
}

impl SedAlgorithm {
    #[must_use]
    pub fn new(kisao_id: &str) -> SedAlgorithm {
        SedAlgorithm {
            kisao_id: kisao_id.to_string(),
            ..Default::default()
        }
    }

    pub fn add_parameter(&mut self, kisao_id: &str, value: &str) {
        self.parameters.push(SedAlgorithmParameter {
            base: SedBase::default(),
            kisao_id: kisao_id.to_string(),
            value: value.to_string(),
        });
    }

    /// The first parameter with the given KiSAO id.
    #[must_use]
    pub fn get_parameter(&self, kisao_id: &str) -> Option<&SedAlgorithmParameter> {
        self.parameters.iter().find(|p| p.kisao_id == kisao_id)
    }
}

impl SedIdentified for SedSimulation {
    fn sed_id(&self) -> &str {
        self.id.as_str()
    }
}

impl ContextualValidation<SedDocument> for SedSimulation {
    type Error = SedSimulationError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        let found_self = context.simulations.iter().any(|s| std::ptr::eq(s, self));
        assert!(
            found_self,
            "Validation called on a simulation that is not part of the SedDocument"
        );

        let occurrences = context.count_document_id(&self.id);
        check_sid(self.element_name(), &self.id, occurrences, &mut reporter.wrap());

        let (level, version) = (context.level(), context.version());
        if !self.kind.is_available_in(level, version) {
            reporter.report(SedSimulationError::NotInLevelVersion {
                id: self.id.clone(),
                element: self.element_name(),
                level,
                version,
            });
        }

        match self.kind {
            SimulationKind::UniformTimeCourse {
                initial_time,
                output_start_time,
                output_end_time,
                number_of_points,
            } => {
                // NaN fails both comparisons.
                let ordered = initial_time <= output_start_time
                    && output_start_time <= output_end_time;
                if !ordered {
                    reporter.report(SedSimulationError::UnorderedTimes {
                        id: self.id.clone(),
                    });
                }
                if number_of_points < 1 {
                    reporter.report(SedSimulationError::InvalidNumberOfPoints {
                        id: self.id.clone(),
                        number_of_points,
                    });
                }
            }
            SimulationKind::OneStep { step } => {
                if !(step > 0.0) {
                    reporter.report(SedSimulationError::InvalidStep {
                        id: self.id.clone(),
                        step: step.to_string(),
                    });
                }
            }
            SimulationKind::SteadyState => {}
        }

        let Some(algorithm) = &self.algorithm else {
            reporter.report(SedSimulationError::MissingAlgorithm {
                id: self.id.clone(),
            });
            return;
        };

        if !is_valid_kisao_id(&algorithm.kisao_id) {
            reporter.report(SedSimulationError::InvalidKisaoId {
                id: self.id.clone(),
                kisao_id: algorithm.kisao_id.clone(),
            });
        }

        if !algorithm.parameters.is_empty() && level == 1 && version < 2 {
            reporter.report(SedSimulationError::NotInLevelVersion {
                id: self.id.clone(),
                element: "algorithmParameter",
                level,
                version,
            });
        }

        for parameter in &algorithm.parameters {
            if !is_valid_kisao_id(&parameter.kisao_id) {
                reporter.report(SedSimulationError::InvalidKisaoId {
                    id: self.id.clone(),
                    kisao_id: parameter.kisao_id.clone(),
                });
            }
        }
    }
}

/// Possible validation errors for [`SedSimulation`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedSimulationError {
    #[error(transparent)]
    Id(#[from] SedIdError),
    #[error("(Simulation id: `{id}`) Required element `algorithm` is missing")]
    MissingAlgorithm { id: String },
    #[error("(Simulation id: `{id}`) `{kisao_id}` is not a valid KiSAO term reference")]
    InvalidKisaoId { id: String, kisao_id: String },
    #[error(
        "(Simulation id: `{id}`) Times must satisfy `initialTime <= outputStartTime <= outputEndTime`"
    )]
    UnorderedTimes { id: String },
    #[error("(Simulation id: `{id}`) `numberOfPoints` must be positive, found `{number_of_points}`")]
    InvalidNumberOfPoints { id: String, number_of_points: i32 },
    #[error("(Simulation id: `{id}`) `step` must be positive, found `{step}`")]
    InvalidStep { id: String, step: String },
    #[error("(Simulation id: `{id}`) Element `{element}` is not available in SED-ML L{level}V{version}")]
    NotInLevelVersion {
        id: String,
        element: &'static str,
        level: u32,
        version: u32,
    },
}

impl SedSimulationError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedSimulationError::Id(e) => e.code(),
            SedSimulationError::MissingAlgorithm { .. } => SedErrorCode::MissingRequiredElement,
            SedSimulationError::InvalidKisaoId { .. } => SedErrorCode::InvalidKisaoId,
            SedSimulationError::UnorderedTimes { .. }
            | SedSimulationError::InvalidNumberOfPoints { .. }
            | SedSimulationError::InvalidStep { .. } => SedErrorCode::InvalidSimulationTimes,
            SedSimulationError::NotInLevelVersion { .. } => SedErrorCode::ElementNotInLevelVersion,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::SedSimulationError;
    use crate::{ContextualValidation, SedDocument, SedSimulation};

    #[test]
    fn uniform_time_points() {
        let sim = SedSimulation::new_uniform_time_course("s", 0.0, 0.0, 10.0, 4);
        let points: Option<Vec<f64>> = sim.uniform_time_points().map(Iterator::collect);
        assert_eq!(points, Some(vec![0.0, 2.5, 5.0, 7.5, 10.0]));
        let sim = SedSimulation::new_uniform_time_course("s", 0.0, 1.0, 2.0, 0);
        assert!(sim.uniform_time_points().is_none());
        assert!(SedSimulation::new_steady_state("s").uniform_time_points().is_none());
    }

    #[test]
    fn huge_time_courses_are_not_materialized() {
        let sim = SedSimulation::new_uniform_time_course("s", 0.0, 0.0, 1.0, i32::MAX);
        let mut points = sim.uniform_time_points().unwrap();
        let expected = i32::MAX as usize + 1;
        assert_eq!(points.size_hint(), (expected, Some(expected)));
        assert_eq!(points.next(), Some(0.0));
        assert_eq!(points.next(), Some(1.0 / f64::from(i32::MAX)));
    }

    #[test]
    fn valid_simulation() {
        let mut document = SedDocument::new(1, 2);
        document.add_simulation(
            SedSimulation::new_uniform_time_course("sim", 0.0, 0.0, 10.0, 100)
                .with_algorithm("KISAO:0000019"),
        );
        document.add_simulation(SedSimulation::new_one_step("step", 0.5).with_algorithm("KISAO:0000019"));
        for sim in &document.simulations {
            assert!(sim.validate(&document).is_ok());
        }
    }

    #[test]
    fn invalid_simulations() {
        let mut document = SedDocument::new(1, 1);
        document.add_simulation(SedSimulation::new_uniform_time_course("a", 5.0, 0.0, 10.0, 0));
        let mut one_step = SedSimulation::new_one_step("b", 0.0).with_algorithm("KISAO:19");
        if let Some(algorithm) = &mut one_step.algorithm {
            algorithm.add_parameter("KISAO:0000211", "1e-6");
        }
        document.add_simulation(one_step);

        let issues = document.simulations[0].validate(&document).unwrap_err();
        assert_eq!(
            issues,
            vec![
                SedSimulationError::UnorderedTimes { id: "a".to_string() },
                SedSimulationError::InvalidNumberOfPoints {
                    id: "a".to_string(),
                    number_of_points: 0
                },
                SedSimulationError::MissingAlgorithm { id: "a".to_string() },
            ]
        );

        let issues = document.simulations[1].validate(&document).unwrap_err();
        assert_eq!(
            issues,
            vec![
                SedSimulationError::NotInLevelVersion {
                    id: "b".to_string(),
                    element: "oneStep",
                    level: 1,
                    version: 1
                },
                SedSimulationError::InvalidStep {
                    id: "b".to_string(),
                    step: "0".to_string()
                },
                SedSimulationError::InvalidKisaoId {
                    id: "b".to_string(),
                    kisao_id: "KISAO:19".to_string()
                },
                SedSimulationError::NotInLevelVersion {
                    id: "b".to_string(),
                    element: "algorithmParameter",
                    level: 1,
                    version: 1
                },
            ]
        );
    }
}
