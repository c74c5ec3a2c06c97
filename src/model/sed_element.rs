use crate::{
    SedAlgorithm, SedAlgorithmParameter, SedBase, SedChange, SedCurve, SedDataGenerator,
    SedDataSet, SedDocument, SedModel, SedOutput, SedParameter, SedSimulation, SedSurface,
    SedTask, SedVariable,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Type codes of all SED-ML elements.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SedTypeCode {
    Document,
    Model,
    ChangeAttribute,
    ChangeXml,
    AddXml,
    RemoveXml,
    ComputeChange,
    Variable,
    Parameter,
    UniformTimeCourse,
    OneStep,
    SteadyState,
    Algorithm,
    AlgorithmParameter,
    Task,
    DataGenerator,
    Plot2D,
    Plot3D,
    Report,
    Curve,
    Surface,
    DataSet,
}

impl SedTypeCode {
    /// The XML element name of elements with this type code.
    #[must_use]
    pub fn element_name(&self) -> &'static str {
        match self {
            SedTypeCode::Document => "sedML",
            SedTypeCode::Model => "model",
            SedTypeCode::ChangeAttribute => "changeAttribute",
            SedTypeCode::ChangeXml => "changeXML",
            SedTypeCode::AddXml => "addXML",
            SedTypeCode::RemoveXml => "removeXML",
            SedTypeCode::ComputeChange => "computeChange",
            SedTypeCode::Variable => "variable",
            SedTypeCode::Parameter => "parameter",
            SedTypeCode::UniformTimeCourse => "uniformTimeCourse",
            SedTypeCode::OneStep => "oneStep",
            SedTypeCode::SteadyState => "steadyState",
            SedTypeCode::Algorithm => "algorithm",
            SedTypeCode::AlgorithmParameter => "algorithmParameter",
            SedTypeCode::Task => "task",
            SedTypeCode::DataGenerator => "dataGenerator",
            SedTypeCode::Plot2D => "plot2D",
            SedTypeCode::Plot3D => "plot3D",
            SedTypeCode::Report => "report",
            SedTypeCode::Curve => "curve",
            SedTypeCode::Surface => "surface",
            SedTypeCode::DataSet => "dataSet",
        }
    }
}

impl Display for SedTypeCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.element_name())
    }
}

/// A borrowed reference to any element of a [`SedDocument`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SedElementRef<'a> {
    Document(&'a SedDocument),
    Model(&'a SedModel),
    Change(&'a SedChange),
    Variable(&'a SedVariable),
    Parameter(&'a SedParameter),
    Simulation(&'a SedSimulation),
    Algorithm(&'a SedAlgorithm),
    AlgorithmParameter(&'a SedAlgorithmParameter),
    Task(&'a SedTask),
    DataGenerator(&'a SedDataGenerator),
    Output(&'a SedOutput),
    Curve(&'a SedCurve),
    Surface(&'a SedSurface),
    DataSet(&'a SedDataSet),
}

impl<'a> SedElementRef<'a> {
    #[must_use]
    pub fn type_code(&self) -> SedTypeCode {
        match self {
            SedElementRef::Document(_) => SedTypeCode::Document,
            SedElementRef::Model(_) => SedTypeCode::Model,
            SedElementRef::Change(x) => x.type_code(),
            SedElementRef::Variable(_) => SedTypeCode::Variable,
            SedElementRef::Parameter(_) => SedTypeCode::Parameter,
            SedElementRef::Simulation(x) => x.kind.type_code(),
            SedElementRef::Algorithm(_) => SedTypeCode::Algorithm,
            SedElementRef::AlgorithmParameter(_) => SedTypeCode::AlgorithmParameter,
            SedElementRef::Task(_) => SedTypeCode::Task,
            SedElementRef::DataGenerator(_) => SedTypeCode::DataGenerator,
            SedElementRef::Output(x) => x.type_code(),
            SedElementRef::Curve(_) => SedTypeCode::Curve,
            SedElementRef::Surface(_) => SedTypeCode::Surface,
            SedElementRef::DataSet(_) => SedTypeCode::DataSet,
        }
    }

    #[must_use]
    pub fn element_name(&self) -> &'static str {
        self.type_code().element_name()
    }

    /// The SId of the element, if this element kind has one (and it is set).
    #[must_use]
    pub fn id(&self) -> Option<&'a str> {
        let id = match *self {
            SedElementRef::Model(x) => x.id.as_str(),
            SedElementRef::Variable(x) => x.id.as_str(),
            SedElementRef::Parameter(x) => x.id.as_str(),
            SedElementRef::Simulation(x) => x.id.as_str(),
            SedElementRef::Task(x) => x.id.as_str(),
            SedElementRef::DataGenerator(x) => x.id.as_str(),
            SedElementRef::Output(x) => x.id(),
            SedElementRef::Curve(x) => x.id.as_str(),
            SedElementRef::Surface(x) => x.id.as_str(),
            SedElementRef::DataSet(x) => x.id.as_str(),
            SedElementRef::Document(_)
            | SedElementRef::Change(_)
            | SedElementRef::Algorithm(_)
            | SedElementRef::AlgorithmParameter(_) => return None,
        };
        if id.is_empty() { None } else { Some(id) }
    }

    #[must_use]
    pub fn base(&self) -> &'a SedBase {
        match *self {
            SedElementRef::Document(x) => &x.base,
            SedElementRef::Model(x) => &x.base,
            SedElementRef::Change(x) => x.base(),
            SedElementRef::Variable(x) => &x.base,
            SedElementRef::Parameter(x) => &x.base,
            SedElementRef::Simulation(x) => &x.base,
            SedElementRef::Algorithm(x) => &x.base,
            SedElementRef::AlgorithmParameter(x) => &x.base,
            SedElementRef::Task(x) => &x.base,
            SedElementRef::DataGenerator(x) => &x.base,
            SedElementRef::Output(x) => x.base(),
            SedElementRef::Curve(x) => &x.base,
            SedElementRef::Surface(x) => &x.base,
            SedElementRef::DataSet(x) => &x.base,
        }
    }

    #[must_use]
    pub fn metaid(&self) -> Option<&'a str> {
        self.base().metaid.as_deref()
    }
}

impl SedDocument {
    /// All elements of this document (including the document itself), in document order.
    #[must_use]
    pub fn elements(&self) -> Vec<SedElementRef<'_>> {
        let mut result = vec![SedElementRef::Document(self)];
        for model in &self.models {
            result.push(SedElementRef::Model(model));
            for change in &model.changes {
                result.push(SedElementRef::Change(change));
                if let SedChange::ComputeChange(change) = change {
                    result.extend(change.variables.iter().map(SedElementRef::Variable));
                    result.extend(change.parameters.iter().map(SedElementRef::Parameter));
                }
            }
        }
        for simulation in &self.simulations {
            result.push(SedElementRef::Simulation(simulation));
            if let Some(algorithm) = &simulation.algorithm {
                result.push(SedElementRef::Algorithm(algorithm));
                result.extend(
                    algorithm
                        .parameters
                        .iter()
                        .map(SedElementRef::AlgorithmParameter),
                );
            }
        }
        result.extend(self.tasks.iter().map(SedElementRef::Task));
        for data_generator in &self.data_generators {
            result.push(SedElementRef::DataGenerator(data_generator));
            result.extend(data_generator.variables.iter().map(SedElementRef::Variable));
            result.extend(data_generator.parameters.iter().map(SedElementRef::Parameter));
        }
        for output in &self.outputs {
            result.push(SedElementRef::Output(output));
            match output {
                SedOutput::Plot2D(plot) => {
                    result.extend(plot.curves.iter().map(SedElementRef::Curve));
                }
                SedOutput::Plot3D(plot) => {
                    result.extend(plot.surfaces.iter().map(SedElementRef::Surface));
                }
                SedOutput::Report(report) => {
                    result.extend(report.data_sets.iter().map(SedElementRef::DataSet));
                }
            }
        }
        result
    }

    /// Find the first element (in document order) with the given SId.
    #[must_use]
    pub fn find_element_by_id(&self, id: &str) -> Option<SedElementRef<'_>> {
        self.elements().into_iter().find(|e| e.id() == Some(id))
    }

    /// Find the first element (in document order) with the given `metaid`.
    #[must_use]
    pub fn find_element_by_metaid(&self, metaid: &str) -> Option<SedElementRef<'_>> {
        self.elements()
            .into_iter()
            .find(|e| e.metaid() == Some(metaid))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::tests::simple_document;
    use crate::{SedElementRef, SedTypeCode};

    #[test]
    fn element_lookup() {
        let document = simple_document();
        let task = document.find_element_by_id("task1").unwrap();
        assert_eq!(task.type_code(), SedTypeCode::Task);
        assert_eq!(task.element_name(), "task");
        assert!(matches!(
            document.find_element_by_id("sim1"),
            Some(SedElementRef::Simulation(_))
        ));
        assert!(document.find_element_by_id("nothing").is_none());

        let by_metaid = document.find_element_by_metaid("meta_dg1").unwrap();
        assert_eq!(by_metaid.id(), Some("dg1"));
    }

    #[test]
    fn element_order() {
        let document = simple_document();
        let codes = document
            .elements()
            .iter()
            .map(SedElementRef::type_code)
            .collect::<Vec<_>>();
        assert_eq!(codes.first(), Some(&SedTypeCode::Document));
        assert_eq!(codes.get(1), Some(&SedTypeCode::Model));
        assert!(codes.contains(&SedTypeCode::Algorithm));
        assert!(codes.contains(&SedTypeCode::Curve));
    }
}
