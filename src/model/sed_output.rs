use crate::model::sed_checks::{SedIdError, check_sid};
use crate::model::SedTypeCode;
use crate::{ContextualValidation, ErrorReporter, SedBase, SedDocument, SedErrorCode, SedIdentified};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

/// An output of the experiment: a 2D plot, a 3D plot, or a report (table).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedOutput {
    Plot2D(SedPlot2D),
    Plot3D(SedPlot3D),
    Report(SedReport),
}

/// `<plot2D>` with a list of curves.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedPlot2D {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub curves: Vec<SedCurve>,
}

/// `<plot3D>` with a list of surfaces.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedPlot3D {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub surfaces: Vec<SedSurface>,
}

/// `<report>` with a list of data sets (columns).
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedReport {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub data_sets: Vec<SedDataSet>,
}

/// A `<curve>` of a 2D plot. Both data references name data generators.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedCurve {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub log_x: bool,
    pub log_y: bool,
    pub x_data_reference: String,
    pub y_data_reference: String,
}

/// A `<surface>` of a 3D plot. All data references name data generators.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedSurface {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub log_x: bool,
    pub log_y: bool,
    pub log_z: bool,
    pub x_data_reference: String,
    pub y_data_reference: String,
    pub z_data_reference: String,
}

/// A `<dataSet>` (column) of a report, labelled with `label`.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedDataSet {
    #[serde(flatten)]
    pub base: SedBase,
    pub id: String,
    pub name: Option<String>,
    pub label: String,
    pub data_reference: String,
}

impl SedOutput {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            SedOutput::Plot2D(x) => &x.id,
            SedOutput::Plot3D(x) => &x.id,
            SedOutput::Report(x) => &x.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            SedOutput::Plot2D(x) => x.name.as_deref(),
            SedOutput::Plot3D(x) => x.name.as_deref(),
            SedOutput::Report(x) => x.name.as_deref(),
        }
    }

    #[must_use]
    pub fn base(&self) -> &SedBase {
        match self {
            SedOutput::Plot2D(x) => &x.base,
            SedOutput::Plot3D(x) => &x.base,
            SedOutput::Report(x) => &x.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut SedBase {
        match self {
            SedOutput::Plot2D(x) => &mut x.base,
            SedOutput::Plot3D(x) => &mut x.base,
            SedOutput::Report(x) => &mut x.base,
        }
    }

    #[must_use]
    pub fn element_name(&self) -> &'static str {
        match self {
            SedOutput::Plot2D(_) => "plot2D",
            SedOutput::Plot3D(_) => "plot3D",
            SedOutput::Report(_) => "report",
        }
    }

    #[must_use]
    pub fn type_code(&self) -> SedTypeCode {
        match self {
            SedOutput::Plot2D(_) => SedTypeCode::Plot2D,
            SedOutput::Plot3D(_) => SedTypeCode::Plot3D,
            SedOutput::Report(_) => SedTypeCode::Report,
        }
    }

    /// Ids of the curves, surfaces or data sets of this output.
    #[must_use]
    pub fn child_ids(&self) -> Vec<&str> {
        match self {
            SedOutput::Plot2D(x) => x.curves.iter().map(|c| c.id.as_str()).collect(),
            SedOutput::Plot3D(x) => x.surfaces.iter().map(|s| s.id.as_str()).collect(),
            SedOutput::Report(x) => x.data_sets.iter().map(|d| d.id.as_str()).collect(),
        }
    }
}

impl SedPlot2D {
    #[must_use]
    pub fn new(id: &str) -> SedPlot2D {
        SedPlot2D {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Append a new linear-scale curve and return a reference to it.
    pub fn create_curve(&mut self, id: &str, x_data: &str, y_data: &str) -> &mut SedCurve {
        self.curves.push(SedCurve::new(id, x_data, y_data));
        let last = self.curves.len() - 1;
        &mut self.curves[last]
    }
}

impl SedPlot3D {
    #[must_use]
    pub fn new(id: &str) -> SedPlot3D {
        SedPlot3D {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Append a new linear-scale surface and return a reference to it.
    pub fn create_surface(
        &mut self,
        id: &str,
        x_data: &str,
        y_data: &str,
        z_data: &str,
    ) -> &mut SedSurface {
        self.surfaces.push(SedSurface {
            id: id.to_string(),
            x_data_reference: x_data.to_string(),
            y_data_reference: y_data.to_string(),
            z_data_reference: z_data.to_string(),
            ..Default::default()
        });
        let last = self.surfaces.len() - 1;
        &mut self.surfaces[last]
    }
}

impl SedReport {
    #[must_use]
    pub fn new(id: &str) -> SedReport {
        SedReport {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Append a new data set and return a reference to it.
    pub fn create_data_set(&mut self, id: &str, label: &str, data: &str) -> &mut SedDataSet {
        self.data_sets.push(SedDataSet {
            id: id.to_string(),
            label: label.to_string(),
            data_reference: data.to_string(),
            ..Default::default()
        });
        let last = self.data_sets.len() - 1;
        &mut self.data_sets[last]
    }
}

impl SedCurve {
    #[must_use]
    pub fn new(id: &str, x_data: &str, y_data: &str) -> SedCurve {
        SedCurve {
            id: id.to_string(),
            x_data_reference: x_data.to_string(),
            y_data_reference: y_data.to_string(),
            ..Default::default()
        }
    }
}

impl SedIdentified for SedOutput {
    fn sed_id(&self) -> &str {
        self.id()
    }
}

impl SedIdentified for SedCurve {
    fn sed_id(&self) -> &str {
        self.id.as_str()
    }
}

impl SedIdentified for SedSurface {
    fn sed_id(&self) -> &str {
        self.id.as_str()
    }
}

impl SedIdentified for SedDataSet {
    fn sed_id(&self) -> &str {
        self.id.as_str()
    }
}

/// Report a missing or unresolved data generator reference.
fn check_data_reference<R: ErrorReporter<SedOutputError>>(
    element: &'static str,
    id: &str,
    attribute: &'static str,
    reference: &str,
    document: &SedDocument,
    reporter: &mut R,
) {
    if reference.is_empty() {
        reporter.report(SedOutputError::MissingAttribute {
            element,
            id: id.to_string(),
            attribute,
        });
    } else if document.get_data_generator_by_id(reference).is_none() {
        reporter.report(SedOutputError::UnresolvedReference {
            element,
            id: id.to_string(),
            attribute,
            reference: reference.to_string(),
        });
    }
}

impl ContextualValidation<SedDocument> for SedOutput {
    type Error = SedOutputError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        let found_self = context.outputs.iter().any(|o| std::ptr::eq(o, self));
        assert!(
            found_self,
            "Validation called on an output that is not part of the SedDocument"
        );

        let occurrences = context.count_document_id(self.id());
        check_sid(self.element_name(), self.id(), occurrences, &mut reporter.wrap());

        match self {
            SedOutput::Plot2D(plot) => {
                for curve in &plot.curves {
                    curve.validate_all(context, reporter);
                }
            }
            SedOutput::Plot3D(plot) => {
                for surface in &plot.surfaces {
                    surface.validate_all(context, reporter);
                }
            }
            SedOutput::Report(report) => {
                for data_set in &report.data_sets {
                    data_set.validate_all(context, reporter);
                }
            }
        }
    }
}

impl ContextualValidation<SedDocument> for SedCurve {
    type Error = SedOutputError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        let found_self = context.outputs.iter().any(|o| match o {
            SedOutput::Plot2D(output) => output.curves.iter().any(|x| std::ptr::eq(x, self)),
            _ => false,
        });
        assert!(
            found_self,
            "Validation called on a curve that is not part of the SedDocument"
        );

        let occurrences = context.count_document_id(&self.id);
        check_sid("curve", &self.id, occurrences, &mut reporter.wrap());
        let references = [
            ("xDataReference", &self.x_data_reference),
            ("yDataReference", &self.y_data_reference),
        ];
        for (attribute, reference) in references {
            check_data_reference("curve", &self.id, attribute, reference, context, reporter);
        }
    }
}

impl ContextualValidation<SedDocument> for SedSurface {
    type Error = SedOutputError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        let found_self = context.outputs.iter().any(|o| match o {
            SedOutput::Plot3D(output) => output.surfaces.iter().any(|x| std::ptr::eq(x, self)),
            _ => false,
        });
        assert!(
            found_self,
            "Validation called on a surface that is not part of the SedDocument"
        );

        let occurrences = context.count_document_id(&self.id);
        check_sid("surface", &self.id, occurrences, &mut reporter.wrap());
        let references = [
            ("xDataReference", &self.x_data_reference),
            ("yDataReference", &self.y_data_reference),
            ("zDataReference", &self.z_data_reference),
        ];
        for (attribute, reference) in references {
            check_data_reference("surface", &self.id, attribute, reference, context, reporter);
        }
    }
}

impl ContextualValidation<SedDocument> for SedDataSet {
    type Error = SedOutputError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &SedDocument, reporter: &mut R) {
        let found_self = context.outputs.iter().any(|o| match o {
            SedOutput::Report(output) => output.data_sets.iter().any(|x| std::ptr::eq(x, self)),
            _ => false,
        });
        assert!(
            found_self,
            "Validation called on a data set that is not part of the SedDocument"
        );

        let occurrences = context.count_document_id(&self.id);
        check_sid("dataSet", &self.id, occurrences, &mut reporter.wrap());
        if self.label.is_empty() {
            reporter.report(SedOutputError::MissingAttribute {
                element: "dataSet",
                id: self.id.clone(),
                attribute: "label",
            });
        }
        check_data_reference(
            "dataSet",
            &self.id,
            "dataReference",
            &self.data_reference,
            context,
            reporter,
        );
    }
}

/// Possible validation errors for [`SedOutput`] and its curves, surfaces and data sets.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SedOutputError {
    #[error(transparent)]
    Id(#[from] SedIdError),
    #[error("(`{element}` id: `{id}`) Required attribute `{attribute}` is missing")]
    MissingAttribute {
        element: &'static str,
        id: String,
        attribute: &'static str,
    },
    #[error("(`{element}` id: `{id}`) Attribute `{attribute}` references unknown data generator `{reference}`")]
    UnresolvedReference {
        element: &'static str,
        id: String,
        attribute: &'static str,
        reference: String,
    },
}

impl SedOutputError {
    #[must_use]
    pub fn code(&self) -> SedErrorCode {
        match self {
            SedOutputError::Id(e) => e.code(),
            SedOutputError::MissingAttribute { .. } => SedErrorCode::MissingRequiredAttribute,
            SedOutputError::UnresolvedReference { .. } => SedErrorCode::UnresolvedReference,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::tests::simple_document;
    use crate::model::{SedIdError, SedOutputError};
    use crate::{
        ContextualValidation, SedCurve, SedDataSet, SedDocument, SedOutput, SedPlot2D, SedPlot3D,
        SedReport,
    };

    #[test]
    fn simple_outputs_are_valid() {
        let document = simple_document();
        for output in &document.outputs {
            assert!(output.validate(&document).is_ok());
        }
    }

    #[test]
    fn child_ids_share_document_scope() {
        let mut document = simple_document();
        let mut plot = SedPlot2D::new("plot_b");
        plot.create_curve("model1", "dg1", "dg1");
        document.add_output(SedOutput::Plot2D(plot));
        let output = document.get_output_by_id("plot_b").unwrap();
        assert_eq!(output.child_ids(), vec!["model1"]);
        assert_eq!(
            output.validate(&document).unwrap_err(),
            vec![SedOutputError::Id(SedIdError::NotUnique {
                element: "curve",
                id: "model1".to_string()
            })]
        );
    }

    #[test]
    fn unresolved_and_missing_references() {
        let mut document = simple_document();
        let mut surface_plot = SedPlot3D::new("p3");
        surface_plot.create_surface("s", "dg1", "nope", "");
        document.add_output(SedOutput::Plot3D(surface_plot));
        let mut report = SedReport::new("r2");
        report.create_data_set("ds_x", "", "dg1");
        document.add_output(SedOutput::Report(report));

        let issues = document
            .get_output_by_id("p3")
            .unwrap()
            .validate(&document)
            .unwrap_err();
        assert_eq!(
            issues,
            vec![
                SedOutputError::UnresolvedReference {
                    element: "surface",
                    id: "s".to_string(),
                    attribute: "yDataReference",
                    reference: "nope".to_string(),
                },
                SedOutputError::MissingAttribute {
                    element: "surface",
                    id: "s".to_string(),
                    attribute: "zDataReference",
                },
            ]
        );

        let issues = document
            .get_output_by_id("r2")
            .unwrap()
            .validate(&document)
            .unwrap_err();
        assert_eq!(
            issues,
            vec![SedOutputError::MissingAttribute {
                element: "dataSet",
                id: "ds_x".to_string(),
                attribute: "label",
            }]
        );
    }

    #[test]
    fn nested_elements_validate_in_place() {
        let document = simple_document();
        for output in &document.outputs {
            match output {
                SedOutput::Plot2D(plot) => {
                    for curve in &plot.curves {
                        assert!(curve.validate(&document).is_ok());
                    }
                }
                SedOutput::Report(report) => {
                    for data_set in &report.data_sets {
                        assert!(data_set.validate(&document).is_ok());
                    }
                }
                SedOutput::Plot3D(_) => {}
            }
        }
    }

    #[test]
    #[should_panic]
    fn cannot_validate_detached_curve() {
        let document = simple_document();
        let curve = SedCurve::new("c", "dg1", "dg1");
        let _ = curve.validate(&document);
    }

    #[test]
    #[should_panic]
    fn cannot_validate_detached_data_set() {
        let data_set = SedDataSet {
            id: "d".to_string(),
            ..Default::default()
        };
        let _ = data_set.validate(&SedDocument::default());
    }
}
