//! Serialization of the object model into SED-ML XML text.
//!
//! Lists are only written when they are non-empty and required string attributes are
//! only written when they are set (non-empty), so that reading the output gives back
//! an equal document.

use crate::model::SedChange;
use crate::utils::format_double;
use crate::xml::WriteOptions;
use crate::xml::mathml::write_math;
use crate::{
    SedAlgorithm, SedBase, SedComputeChange, SedCurve, SedDataGenerator, SedDataSet,
    SedDocument, SedModel, SedOutput, SedParameter, SedSimulation, SedSurface, SedTask,
    SedVariable, SimulationKind,
};

/// Escape text content for XML.
pub(crate) fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value for XML. Like [`xml_escape`] but also encodes quotes,
/// newlines and tabs, which attribute normalization would otherwise destroy.
pub(crate) fn xml_escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Attribute list of one element, in output order.
pub(crate) type Attributes = Vec<(&'static str, String)>;

/// Push a string attribute if it is set (non-empty).
fn push_required(attributes: &mut Attributes, name: &'static str, value: &str) {
    if !value.is_empty() {
        attributes.push((name, value.to_string()));
    }
}

fn push_optional(attributes: &mut Attributes, name: &'static str, value: Option<&str>) {
    if let Some(value) = value {
        attributes.push((name, value.to_string()));
    }
}

/// A minimal streaming XML writer with configurable indentation.
pub(crate) struct XmlWriter<'a> {
    out: String,
    options: &'a WriteOptions,
    depth: usize,
}

impl<'a> XmlWriter<'a> {
    pub fn new(options: &'a WriteOptions) -> XmlWriter<'a> {
        XmlWriter {
            out: String::with_capacity(4096),
            options,
            depth: 0,
        }
    }

    fn line_start(&mut self) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..(self.depth * self.options.indent) {
            self.out.push(' ');
        }
    }

    fn write_tag(&mut self, name: &str, attributes: &[(&str, String)]) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attributes {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&xml_escape_attr(value));
            self.out.push('"');
        }
    }

    pub fn declaration(&mut self) {
        self.out
            .push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    }

    /// Start tag of an element with children.
    pub fn open(&mut self, name: &str, attributes: &[(&str, String)]) {
        self.line_start();
        self.write_tag(name, attributes);
        self.out.push('>');
        self.depth += 1;
    }

    pub fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line_start();
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    /// An element without children.
    pub fn empty(&mut self, name: &str, attributes: &[(&str, String)]) {
        self.line_start();
        self.write_tag(name, attributes);
        self.out.push_str("/>");
    }

    /// An element with (escaped) text content.
    pub fn text(&mut self, name: &str, attributes: &[(&str, String)], text: &str) {
        self.line_start();
        self.write_tag(name, attributes);
        self.out.push('>');
        self.out.push_str(&xml_escape(text));
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    /// An element with raw (unescaped) markup content.
    pub fn raw(&mut self, name: &str, attributes: &[(&str, String)], markup: &str) {
        self.line_start();
        self.write_tag(name, attributes);
        self.out.push('>');
        self.out.push_str(markup);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    pub fn finish(mut self) -> String {
        self.out.push('\n');
        self.out
    }
}

/// Write the whole document.
pub(crate) fn write_document(document: &SedDocument, options: &WriteOptions) -> String {
    let mut writer = XmlWriter::new(options);
    if options.xml_declaration {
        writer.declaration();
    }

    let mut root: Vec<(String, String)> =
        vec![("xmlns".to_string(), document.namespaces.declared_uri())];
    for (prefix, uri) in document.namespaces.namespaces() {
        root.push((format!("xmlns:{prefix}"), uri.clone()));
    }
    if let Some(metaid) = &document.base.metaid {
        root.push(("metaid".to_string(), metaid.clone()));
    }
    root.push(("level".to_string(), document.level().to_string()));
    root.push(("version".to_string(), document.version().to_string()));
    let attributes = root
        .iter()
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect::<Vec<_>>();

    writer.open("sedML", &attributes);
    write_base_children(&mut writer, &document.base);
    write_list(&mut writer, "listOfSimulations", &document.simulations, write_simulation);
    write_list(&mut writer, "listOfModels", &document.models, write_model);
    write_list(&mut writer, "listOfTasks", &document.tasks, write_task);
    write_list(
        &mut writer,
        "listOfDataGenerators",
        &document.data_generators,
        write_data_generator,
    );
    write_list(&mut writer, "listOfOutputs", &document.outputs, write_output);
    writer.close("sedML");
    log::debug!(
        "Wrote SED-ML L{}V{} document.",
        document.level(),
        document.version()
    );
    writer.finish()
}

fn write_list<T>(
    writer: &mut XmlWriter,
    name: &str,
    items: &[T],
    write_item: fn(&mut XmlWriter, &T),
) {
    if items.is_empty() {
        return;
    }
    writer.open(name, &[]);
    for item in items {
        write_item(writer, item);
    }
    writer.close(name);
}

fn write_base_children(writer: &mut XmlWriter, base: &SedBase) {
    if let Some(notes) = &base.notes {
        writer.raw("notes", &[], notes);
    }
    if let Some(annotation) = &base.annotation {
        writer.raw("annotation", &[], annotation);
    }
}

fn has_base_children(base: &SedBase) -> bool {
    base.notes.is_some() || base.annotation.is_some()
}

/// Start an element with `metaid` (if set) followed by `attributes`. Returns `false` if the
/// element was written as an empty element because it has no children.
fn open_element(
    writer: &mut XmlWriter,
    name: &str,
    base: &SedBase,
    attributes: Attributes,
    has_children: bool,
) -> bool {
    let mut all = Attributes::new();
    push_optional(&mut all, "metaid", base.metaid.as_deref());
    all.extend(attributes);
    if has_children || has_base_children(base) {
        writer.open(name, &all);
        write_base_children(writer, base);
        true
    } else {
        writer.empty(name, &all);
        false
    }
}

fn write_model(writer: &mut XmlWriter, model: &SedModel) {
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", &model.id);
    push_optional(&mut attributes, "name", model.name.as_deref());
    push_optional(&mut attributes, "language", model.language.as_deref());
    push_required(&mut attributes, "source", &model.source);
    let has_children = !model.changes.is_empty();
    if open_element(writer, "model", &model.base, attributes, has_children) {
        write_list(writer, "listOfChanges", &model.changes, write_change);
        writer.close("model");
    }
}

fn write_change(writer: &mut XmlWriter, change: &SedChange) {
    let name = change.element_name();
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "target", change.target());
    match change {
        SedChange::ChangeAttribute(change) => {
            push_optional(&mut attributes, "newValue", change.new_value.as_deref());
            if open_element(writer, name, &change.base, attributes, false) {
                writer.close(name);
            }
        }
        SedChange::ChangeXml(change) => {
            open_element(writer, name, &change.base, attributes, true);
            writer.raw("newXML", &[], &change.new_xml);
            writer.close(name);
        }
        SedChange::AddXml(change) => {
            open_element(writer, name, &change.base, attributes, true);
            writer.raw("newXML", &[], &change.new_xml);
            writer.close(name);
        }
        SedChange::RemoveXml(change) => {
            if open_element(writer, name, &change.base, attributes, false) {
                writer.close(name);
            }
        }
        SedChange::ComputeChange(change) => write_compute_change(writer, change, attributes),
    }
}

fn write_compute_change(writer: &mut XmlWriter, change: &SedComputeChange, attributes: Attributes) {
    let has_children =
        !change.variables.is_empty() || !change.parameters.is_empty() || change.math.is_some();
    if open_element(writer, "computeChange", &change.base, attributes, has_children) {
        write_list(writer, "listOfVariables", &change.variables, write_variable);
        write_list(writer, "listOfParameters", &change.parameters, write_parameter);
        if let Some(math) = &change.math {
            write_math(writer, math);
        }
        writer.close("computeChange");
    }
}

fn write_variable(writer: &mut XmlWriter, variable: &SedVariable) {
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", &variable.id);
    push_optional(&mut attributes, "name", variable.name.as_deref());
    push_optional(&mut attributes, "symbol", variable.symbol.as_deref());
    push_optional(&mut attributes, "target", variable.target.as_deref());
    push_optional(&mut attributes, "taskReference", variable.task_reference.as_deref());
    push_optional(&mut attributes, "modelReference", variable.model_reference.as_deref());
    if open_element(writer, "variable", &variable.base, attributes, false) {
        writer.close("variable");
    }
}

fn write_parameter(writer: &mut XmlWriter, parameter: &SedParameter) {
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", &parameter.id);
    push_optional(&mut attributes, "name", parameter.name.as_deref());
    attributes.push(("value", format_double(parameter.value)));
    if open_element(writer, "parameter", &parameter.base, attributes, false) {
        writer.close("parameter");
    }
}

fn write_simulation(writer: &mut XmlWriter, simulation: &SedSimulation) {
    let name = simulation.element_name();
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", &simulation.id);
    push_optional(&mut attributes, "name", simulation.name.as_deref());
    match simulation.kind {
        SimulationKind::UniformTimeCourse {
            initial_time,
            output_start_time,
            output_end_time,
            number_of_points,
        } => {
            attributes.push(("initialTime", format_double(initial_time)));
            attributes.push(("outputStartTime", format_double(output_start_time)));
            attributes.push(("outputEndTime", format_double(output_end_time)));
            attributes.push(("numberOfPoints", number_of_points.to_string()));
        }
        SimulationKind::OneStep { step } => {
            attributes.push(("step", format_double(step)));
        }
        SimulationKind::SteadyState => {}
    }
    let has_children = simulation.algorithm.is_some();
    if open_element(writer, name, &simulation.base, attributes, has_children) {
        if let Some(algorithm) = &simulation.algorithm {
            write_algorithm(writer, algorithm);
        }
        writer.close(name);
    }
}

fn write_algorithm(writer: &mut XmlWriter, algorithm: &SedAlgorithm) {
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "kisaoID", &algorithm.kisao_id);
    let has_children = !algorithm.parameters.is_empty();
    if open_element(writer, "algorithm", &algorithm.base, attributes, has_children) {
        write_list(
            writer,
            "listOfAlgorithmParameters",
            &algorithm.parameters,
            |writer, parameter| {
                let mut attributes = Attributes::new();
                push_required(&mut attributes, "kisaoID", &parameter.kisao_id);
                attributes.push(("value", parameter.value.clone()));
                if open_element(writer, "algorithmParameter", &parameter.base, attributes, false)
                {
                    writer.close("algorithmParameter");
                }
            },
        );
        writer.close("algorithm");
    }
}

fn write_task(writer: &mut XmlWriter, task: &SedTask) {
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", &task.id);
    push_optional(&mut attributes, "name", task.name.as_deref());
    push_required(&mut attributes, "modelReference", &task.model_reference);
    push_required(&mut attributes, "simulationReference", &task.simulation_reference);
    if open_element(writer, "task", &task.base, attributes, false) {
        writer.close("task");
    }
}

fn write_data_generator(writer: &mut XmlWriter, data_generator: &SedDataGenerator) {
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", &data_generator.id);
    push_optional(&mut attributes, "name", data_generator.name.as_deref());
    let has_children = !data_generator.variables.is_empty()
        || !data_generator.parameters.is_empty()
        || data_generator.math.is_some();
    if open_element(writer, "dataGenerator", &data_generator.base, attributes, has_children) {
        write_list(writer, "listOfVariables", &data_generator.variables, write_variable);
        write_list(writer, "listOfParameters", &data_generator.parameters, write_parameter);
        if let Some(math) = &data_generator.math {
            write_math(writer, math);
        }
        writer.close("dataGenerator");
    }
}

fn write_output(writer: &mut XmlWriter, output: &SedOutput) {
    let name = output.element_name();
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", output.id());
    push_optional(&mut attributes, "name", output.name());
    let has_children = !output.child_ids().is_empty();
    if open_element(writer, name, output.base(), attributes, has_children) {
        match output {
            SedOutput::Plot2D(plot) => {
                write_list(writer, "listOfCurves", &plot.curves, write_curve);
            }
            SedOutput::Plot3D(plot) => {
                write_list(writer, "listOfSurfaces", &plot.surfaces, write_surface);
            }
            SedOutput::Report(report) => {
                write_list(writer, "listOfDataSets", &report.data_sets, write_data_set);
            }
        }
        writer.close(name);
    }
}

fn write_curve(writer: &mut XmlWriter, curve: &SedCurve) {
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", &curve.id);
    push_optional(&mut attributes, "name", curve.name.as_deref());
    attributes.push(("logX", curve.log_x.to_string()));
    push_required(&mut attributes, "xDataReference", &curve.x_data_reference);
    attributes.push(("logY", curve.log_y.to_string()));
    push_required(&mut attributes, "yDataReference", &curve.y_data_reference);
    if open_element(writer, "curve", &curve.base, attributes, false) {
        writer.close("curve");
    }
}

fn write_surface(writer: &mut XmlWriter, surface: &SedSurface) {
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", &surface.id);
    push_optional(&mut attributes, "name", surface.name.as_deref());
    attributes.push(("logX", surface.log_x.to_string()));
    push_required(&mut attributes, "xDataReference", &surface.x_data_reference);
    attributes.push(("logY", surface.log_y.to_string()));
    push_required(&mut attributes, "yDataReference", &surface.y_data_reference);
    attributes.push(("logZ", surface.log_z.to_string()));
    push_required(&mut attributes, "zDataReference", &surface.z_data_reference);
    if open_element(writer, "surface", &surface.base, attributes, false) {
        writer.close("surface");
    }
}

fn write_data_set(writer: &mut XmlWriter, data_set: &SedDataSet) {
    let mut attributes = Attributes::new();
    push_required(&mut attributes, "id", &data_set.id);
    push_optional(&mut attributes, "name", data_set.name.as_deref());
    push_required(&mut attributes, "label", &data_set.label);
    push_required(&mut attributes, "dataReference", &data_set.data_reference);
    if open_element(writer, "dataSet", &data_set.base, attributes, false) {
        writer.close("dataSet");
    }
}

#[cfg(test)]
mod tests {
    use super::{xml_escape, xml_escape_attr};
    use crate::model::tests::simple_document;
    use crate::xml::WriteOptions;
    use crate::{SedChange, SedChangeXml, SedDocument, SedErrorCode};

    #[test]
    fn escaping() {
        assert_eq!(xml_escape("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(xml_escape_attr("say \"hi\"\n"), "say &quot;hi&quot;&#xA;");
    }

    #[test]
    fn empty_document() {
        let xml = SedDocument::default().to_xml_string();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <sedML xmlns=\"http://sed-ml.org/\" level=\"1\" version=\"1\">\n\
             </sedML>\n"
        );
    }

    #[test]
    fn indentation_and_lists() {
        let document = simple_document();
        let xml = document.to_xml_string();
        assert!(xml.contains("\n  <listOfSimulations>\n    <uniformTimeCourse id=\"sim1\""));
        assert!(xml.contains("<algorithm kisaoID=\"KISAO:0000019\"/>"));
        assert!(xml.contains("<dataGenerator metaid=\"meta_dg1\" id=\"dg1\">"));
        assert!(xml.contains("<math xmlns=\"http://www.w3.org/1998/Math/MathML\">"));
        assert!(!xml.contains("listOfChanges"));
        let simulations = xml.find("listOfSimulations").unwrap_or(usize::MAX);
        let models = xml.find("listOfModels").unwrap_or(0);
        assert!(simulations < models);

        let options = WriteOptions {
            indent: 0,
            xml_declaration: false,
        };
        let flat = document.to_xml_string_with(&options);
        assert!(flat.starts_with("<sedML"));
        assert!(flat.contains("\n<listOfModels>\n<model "));
    }

    #[test]
    fn unsupported_level_version_keeps_a_namespace() {
        let document = SedDocument::new(2, 5);
        let xml = document.to_xml_string();
        assert!(xml.contains(
            "<sedML xmlns=\"http://sed-ml.org/sed-ml/level2/version5\" level=\"2\" version=\"5\""
        ));
        let error = SedDocument::from_xml_string(&xml).unwrap_err();
        assert_eq!(error.code, SedErrorCode::InvalidSedLevelVersion);
    }

    #[test]
    fn raw_markup_and_namespaces() {
        let mut document = SedDocument::new(1, 2);
        document
            .namespaces
            .add_namespace("http://www.sbml.org/sbml/level2", "sbml")
            .unwrap();
        let model = document.create_model("m", "m.xml");
        model.base.set_notes("<p xmlns=\"http://www.w3.org/1999/xhtml\">A &amp; B</p>");
        model.add_change(SedChange::ChangeXml(SedChangeXml::new(
            "/sbml:sbml/sbml:model",
            "<parameter id=\"p\"/>",
        )));
        let xml = document.to_xml_string();
        assert!(xml.contains(
            "<sedML xmlns=\"http://sed-ml.org/sed-ml/level1/version2\" \
             xmlns:sbml=\"http://www.sbml.org/sbml/level2\" level=\"1\" version=\"2\">"
        ));
        assert!(xml.contains("<notes><p xmlns=\"http://www.w3.org/1999/xhtml\">A &amp; B</p></notes>"));
        assert!(xml.contains("<newXML><parameter id=\"p\"/></newXML>"));
    }
}
