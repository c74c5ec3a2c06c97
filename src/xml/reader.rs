//! Conversion of a parsed SED-ML XML tree into the object model.
//!
//! Structural problems (malformed XML, wrong root, unparsable numbers) abort reading with a
//! located [`SedXmlError`]. Missing string attributes are not read errors: they are left
//! empty and reported by validation. Unknown elements and attributes are skipped with a
//! warning, unless [`ReadOptions::strict`] is set.

use crate::model::SedChange;
use crate::utils::{parse_double, parse_xml_bool};
use crate::xml::mathml::read_math;
use crate::xml::writer::xml_escape_attr;
use crate::xml::{
    ReadOptions, SedNamespaces, SedXmlError, get_level_version, get_sed_namespace_uri,
    parse_sed_namespace_uri_scheme,
};
use crate::{
    SedAddXml, SedAlgorithm, SedAlgorithmParameter, SedBase, SedChangeAttribute, SedChangeXml,
    SedComputeChange, SedCurve, SedDataGenerator, SedDataSet, SedDocument, SedErrorCode,
    SedModel, SedOutput, SedParameter, SedPlot2D, SedPlot3D, SedRemoveXml, SedReport,
    SedSimulation, SedSurface, SedTask, SedVariable, SimulationKind,
};
use roxmltree::Node;
use std::collections::HashSet;

/// Read a whole SED-ML document.
pub(crate) fn read_document(xml: &str, options: &ReadOptions) -> Result<SedDocument, SedXmlError> {
    let tree = roxmltree::Document::parse(xml).map_err(|e| {
        let position = e.pos();
        SedXmlError::new(
            SedErrorCode::L3NotSchemaConformant,
            format!("Document is not well-formed XML: {e}"),
        )
        .at(position.row, position.col)
    })?;
    let root = tree.root_element();

    let namespace = root.tag_name().namespace().unwrap_or_default();
    let Some((level, version)) = get_level_version(namespace) else {
        if let Some((level, version)) = parse_sed_namespace_uri_scheme(namespace)
            && get_sed_namespace_uri(level, version).is_none()
        {
            return Err(SedXmlError::new(
                SedErrorCode::InvalidSedLevelVersion,
                format!("SED-ML Level {level} Version {version} is not supported"),
            )
            .at_node(root));
        }
        return Err(SedXmlError::new(
            SedErrorCode::InvalidNamespaceOnSed,
            format!("The root element is not in a SED-ML namespace (found `{namespace}`)"),
        )
        .at_node(root));
    };
    if root.tag_name().name() != "sedML" {
        return Err(SedXmlError::new(
            SedErrorCode::InvalidNamespaceOnSed,
            format!(
                "The root element must be `<sedML>`, found `<{}>`",
                root.tag_name().name()
            ),
        )
        .at_node(root));
    }
    check_level_version(root, "level", level)?;
    check_level_version(root, "version", version)?;

    let reader = Reader {
        options,
        namespace,
    };
    let mut namespaces = SedNamespaces::new(level, version);
    for declaration in root.namespaces() {
        if let Some(prefix) = declaration.name()
            && prefix != "xml"
        {
            namespaces
                .add_namespace(declaration.uri(), prefix)
                .map_err(|e| {
                    SedXmlError::new(SedErrorCode::InvalidNamespaceOnSed, e.to_string())
                        .at_node(root)
                })?;
        }
    }

    reader.check_attributes(root, &["level", "version"])?;
    let mut document = SedDocument {
        base: reader.read_base(root)?,
        namespaces,
        ..Default::default()
    };
    for child in reader.children(
        root,
        &[
            "listOfSimulations",
            "listOfModels",
            "listOfTasks",
            "listOfDataGenerators",
            "listOfOutputs",
        ],
    ) {
        let child = child?;
        match child.tag_name().name() {
            "listOfSimulations" => {
                document.simulations = reader.read_list(
                    child,
                    &["uniformTimeCourse", "oneStep", "steadyState"],
                    |node| reader.read_simulation(node),
                )?;
            }
            "listOfModels" => {
                document.models = reader.read_list(child, &["model"], |node| reader.read_model(node))?;
            }
            "listOfTasks" => {
                document.tasks = reader.read_list(child, &["task"], |node| reader.read_task(node))?;
            }
            "listOfDataGenerators" => {
                document.data_generators = reader.read_list(child, &["dataGenerator"], |node| {
                    reader.read_data_generator(node)
                })?;
            }
            _ => {
                document.outputs = reader.read_list(
                    child,
                    &["plot2D", "plot3D", "report"],
                    |node| reader.read_output(node),
                )?;
            }
        }
    }
    log::debug!(
        "Read SED-ML L{level}V{version} document with {} model(s), {} simulation(s), {} task(s), \
         {} data generator(s) and {} output(s).",
        document.models.len(),
        document.simulations.len(),
        document.tasks.len(),
        document.data_generators.len(),
        document.outputs.len(),
    );
    Ok(document)
}

/// Check the `level` or `version` attribute of the root against the namespace.
fn check_level_version(root: Node, attribute: &str, expected: u32) -> Result<(), SedXmlError> {
    let (missing_code, positive_code) = if attribute == "level" {
        (
            SedErrorCode::MissingOrInconsistentLevel,
            SedErrorCode::LevelPositiveInteger,
        )
    } else {
        (
            SedErrorCode::MissingOrInconsistentVersion,
            SedErrorCode::VersionPositiveInteger,
        )
    };
    let Some(value) = root.attribute(attribute) else {
        return Err(
            SedXmlError::new(missing_code, format!("Missing attribute `{attribute}`"))
                .at_node(root),
        );
    };
    match value.trim().parse::<u32>() {
        Ok(value) if value > 0 && value == expected => Ok(()),
        Ok(value) if value > 0 => Err(SedXmlError::new(
            missing_code,
            format!("Attribute `{attribute}` is {value}, but the namespace declares {expected}"),
        )
        .at_node(root)),
        _ => Err(SedXmlError::new(
            positive_code,
            format!("Attribute `{attribute}` must be a positive integer, found `{value}`"),
        )
        .at_node(root)),
    }
}

/// The raw markup between the start and end tag of `node`, trimmed.
///
/// Namespaces in scope at `node` that the document root does not declare are re-declared
/// on every top-level element of the fragment.
fn inner_markup(node: Node) -> String {
    let (Some(first), Some(last)) = (node.first_child(), node.last_child()) else {
        return String::new();
    };
    let input = node.document().input_text();
    let root = node.document().root_element();
    let mut missing = node
        .namespaces()
        .map(|ns| (ns.name(), ns.uri()))
        .filter(|(prefix, _)| *prefix != Some("xml"))
        .filter(|binding| !root.namespaces().any(|ns| (ns.name(), ns.uri()) == *binding))
        .collect::<Vec<_>>();
    missing.sort_unstable();

    let mut markup = String::new();
    let mut position = first.range().start;
    if !missing.is_empty() {
        for child in node.children().filter(Node::is_element) {
            let start = child.range().start;
            let tag = input.get(start..).unwrap_or_default();
            let name_end = start
                + tag
                    .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
                    .unwrap_or(tag.len());
            let tag_end = child
                .first_child()
                .map_or(child.range().end, |c| c.range().start);
            let start_tag = input.get(start..tag_end).unwrap_or_default();
            markup.push_str(input.get(position..name_end).unwrap_or_default());
            for (prefix, uri) in &missing {
                let attribute = prefix.map_or_else(|| "xmlns".to_string(), |p| format!("xmlns:{p}"));
                if !declares(start_tag, &attribute) {
                    markup.push_str(&format!(" {attribute}=\"{}\"", xml_escape_attr(uri)));
                }
            }
            position = name_end;
        }
    }
    markup.push_str(input.get(position..last.range().end).unwrap_or_default());
    markup.trim().to_string()
}

/// True if the raw `start_tag` already carries the `attribute` declaration.
fn declares(start_tag: &str, attribute: &str) -> bool {
    start_tag.match_indices(attribute).any(|(i, _)| {
        let before = start_tag[..i].chars().next_back();
        let after = start_tag[i + attribute.len()..].trim_start().chars().next();
        before.is_some_and(char::is_whitespace) && after == Some('=')
    })
}

fn string_attribute(node: Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

fn optional_attribute(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn missing_attribute(node: Node, name: &str) -> SedXmlError {
    SedXmlError::new(
        SedErrorCode::MissingRequiredAttribute,
        format!(
            "Element `<{}>` is missing the required attribute `{name}`",
            node.tag_name().name()
        ),
    )
    .at_node(node)
}

fn invalid_attribute(node: Node, name: &str, value: &str, expected: &str) -> SedXmlError {
    SedXmlError::new(
        SedErrorCode::NotSchemaConformant,
        format!(
            "Attribute `{name}` of `<{}>` must be {expected}, found `{value}`",
            node.tag_name().name()
        ),
    )
    .at_node(node)
}

fn double_attribute(node: Node, name: &str) -> Result<f64, SedXmlError> {
    let value = node.attribute(name).ok_or_else(|| missing_attribute(node, name))?;
    parse_double(value).ok_or_else(|| invalid_attribute(node, name, value, "a double"))
}

fn integer_attribute(node: Node, name: &str) -> Result<i32, SedXmlError> {
    let value = node.attribute(name).ok_or_else(|| missing_attribute(node, name))?;
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| invalid_attribute(node, name, value, "an integer"))
}

fn bool_attribute(node: Node, name: &str) -> Result<bool, SedXmlError> {
    let value = node.attribute(name).ok_or_else(|| missing_attribute(node, name))?;
    parse_xml_bool(value).ok_or_else(|| invalid_attribute(node, name, value, "a boolean"))
}

struct Reader<'a> {
    options: &'a ReadOptions,
    /// SED-ML namespace of the document.
    namespace: &'a str,
}

impl Reader<'_> {
    fn is_sed(&self, node: Node) -> bool {
        node.tag_name().namespace() == Some(self.namespace)
    }

    /// Skip an unknown element, or fail in strict mode.
    fn unknown_element(&self, node: Node, parent: Node) -> Result<(), SedXmlError> {
        let name = node.tag_name().name();
        let parent = parent.tag_name().name();
        if self.options.strict {
            return Err(SedXmlError::new(
                SedErrorCode::UnrecognizedElement,
                format!("Unrecognized element `<{name}>` in `<{parent}>`"),
            )
            .at_node(node));
        }
        log::warn!("Skipping unrecognized element `<{name}>` in `<{parent}>`.");
        Ok(())
    }

    /// Check that `node` only uses `allowed` attributes (and `metaid`). Attributes of other
    /// namespaces are always allowed.
    fn check_attributes(&self, node: Node, allowed: &[&str]) -> Result<(), SedXmlError> {
        let element = node.tag_name().name();
        for attribute in node.attributes() {
            let name = attribute.name();
            if attribute.namespace().is_some() || name == "metaid" || allowed.contains(&name) {
                continue;
            }
            if self.options.strict {
                let code = if element == "sedML" {
                    SedErrorCode::AllowedAttributesOnSed
                } else {
                    SedErrorCode::UnknownCoreAttribute
                };
                return Err(SedXmlError::new(
                    code,
                    format!("Unknown attribute `{name}` on `<{element}>`"),
                )
                .at_node(node));
            }
            log::warn!("Skipping unknown attribute `{name}` on `<{element}>`.");
        }
        Ok(())
    }

    /// `metaid`, `<notes>` and `<annotation>` of any element.
    fn read_base(&self, node: Node) -> Result<SedBase, SedXmlError> {
        let mut base = SedBase {
            metaid: optional_attribute(node, "metaid"),
            ..Default::default()
        };
        let (mut has_notes, mut has_annotation) = (false, false);
        for child in node.children().filter(|c| c.is_element() && self.is_sed(*c)) {
            match child.tag_name().name() {
                "notes" if has_notes => {
                    return Err(SedXmlError::new(
                        SedErrorCode::OnlyOneNotesElementAllowed,
                        "Only one `<notes>` element is allowed",
                    )
                    .at_node(child));
                }
                "annotation" if has_annotation => {
                    return Err(SedXmlError::new(
                        SedErrorCode::MultipleAnnotations,
                        "Only one `<annotation>` element is allowed",
                    )
                    .at_node(child));
                }
                "notes" => {
                    has_notes = true;
                    base.set_notes(&inner_markup(child));
                }
                "annotation" => {
                    has_annotation = true;
                    base.set_annotation(&inner_markup(child));
                }
                _ => {}
            }
        }
        Ok(base)
    }

    /// Element children of `node` with one of the `expected` names, in document order.
    ///
    /// `<notes>` and `<annotation>` are left to [`Reader::read_base`], other children are
    /// unknown. Each `listOf*` child may appear only once. Children are checked lazily, so
    /// in strict mode the first offence in document order is the one reported.
    fn children<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        expected: &[&str],
    ) -> impl Iterator<Item = Result<Node<'a, 'input>, SedXmlError>> {
        let mut seen = HashSet::new();
        node.children().filter(Node::is_element).filter_map(move |child| {
            let name = child.tag_name().name();
            let known = self.is_sed(child) || name == "math";
            if known && (name == "notes" || name == "annotation") {
                return None;
            }
            if !known || !expected.contains(&name) {
                return self.unknown_element(child, node).err().map(Err);
            }
            if !seen.insert(name) {
                let code = if name.starts_with("listOf") {
                    SedErrorCode::OneOfEachListOf
                } else {
                    SedErrorCode::NotSchemaConformant
                };
                return Some(Err(SedXmlError::new(
                    code,
                    format!(
                        "Element `<{name}>` may appear only once in `<{}>`",
                        node.tag_name().name()
                    ),
                )
                .at_node(child)));
            }
            Some(Ok(child))
        })
    }

    /// Check that a leaf element has no element content besides notes and annotation.
    fn no_children(&self, node: Node) -> Result<(), SedXmlError> {
        self.children(node, &[]).try_for_each(|child| child.map(|_| ()))
    }

    /// The object model keeps no `<notes>` or `<annotation>` for `listOf*` containers, so
    /// they are dropped with a warning, or rejected in strict mode.
    fn list_base(&self, node: Node, list: Node) -> Result<(), SedXmlError> {
        let name = node.tag_name().name();
        let list = list.tag_name().name();
        if self.options.strict {
            return Err(SedXmlError::new(
                SedErrorCode::UnrecognizedElement,
                format!("`<{name}>` of `<{list}>` cannot be kept"),
            )
            .at_node(node));
        }
        log::warn!("Dropping `<{name}>` of `<{list}>`; list containers keep no notes or annotations.");
        Ok(())
    }

    /// Read the items of a `listOf*` element.
    fn read_list<T, F>(&self, node: Node, items: &[&str], read_item: F) -> Result<Vec<T>, SedXmlError>
    where
        F: Fn(Node) -> Result<T, SedXmlError>,
    {
        self.check_attributes(node, &[])?;
        let mut result = Vec::new();
        for child in node.children().filter(Node::is_element) {
            let name = child.tag_name().name();
            if self.is_sed(child) && (name == "notes" || name == "annotation") {
                self.list_base(child, node)?;
            } else if self.is_sed(child) && items.contains(&name) {
                result.push(read_item(child)?);
            } else {
                self.unknown_element(child, node)?;
            }
        }
        if result.is_empty() {
            let name = node.tag_name().name();
            if self.options.strict {
                return Err(SedXmlError::new(
                    SedErrorCode::EmptyListElement,
                    format!("Element `<{name}>` must not be empty"),
                )
                .at_node(node));
            }
            log::warn!("Element `<{name}>` is empty.");
        }
        Ok(result)
    }

    fn read_model(&self, node: Node) -> Result<SedModel, SedXmlError> {
        self.check_attributes(node, &["id", "name", "language", "source"])?;
        let mut model = SedModel {
            base: self.read_base(node)?,
            id: string_attribute(node, "id"),
            name: optional_attribute(node, "name"),
            language: optional_attribute(node, "language"),
            source: string_attribute(node, "source"),
            changes: Vec::new(),
        };
        for child in self.children(node, &["listOfChanges"]) {
            let child = child?;
            model.changes = self.read_list(
                child,
                &[
                    "changeAttribute",
                    "changeXML",
                    "addXML",
                    "removeXML",
                    "computeChange",
                ],
                |node| self.read_change(node),
            )?;
        }
        Ok(model)
    }

    fn read_change(&self, node: Node) -> Result<SedChange, SedXmlError> {
        let base = self.read_base(node)?;
        let target = string_attribute(node, "target");
        let change = match node.tag_name().name() {
            "changeAttribute" => {
                self.check_attributes(node, &["target", "newValue"])?;
                self.no_children(node)?;
                SedChange::ChangeAttribute(SedChangeAttribute {
                    base,
                    target,
                    new_value: optional_attribute(node, "newValue"),
                })
            }
            "changeXML" | "addXML" => {
                self.check_attributes(node, &["target"])?;
                let mut new_xml = String::new();
                for child in self.children(node, &["newXML"]) {
                    new_xml = inner_markup(child?);
                }
                if node.tag_name().name() == "changeXML" {
                    SedChange::ChangeXml(SedChangeXml {
                        base,
                        target,
                        new_xml,
                    })
                } else {
                    SedChange::AddXml(SedAddXml {
                        base,
                        target,
                        new_xml,
                    })
                }
            }
            "removeXML" => {
                self.check_attributes(node, &["target"])?;
                self.no_children(node)?;
                SedChange::RemoveXml(SedRemoveXml { base, target })
            }
            _ => {
                self.check_attributes(node, &["target"])?;
                let mut change = SedComputeChange {
                    base,
                    target,
                    ..Default::default()
                };
                for child in self.children(node, &["listOfVariables", "listOfParameters", "math"]) {
                    let child = child?;
                    match child.tag_name().name() {
                        "listOfVariables" => {
                            change.variables = self.read_list(child, &["variable"], |node| {
                                self.read_variable(node)
                            })?;
                        }
                        "listOfParameters" => {
                            change.parameters = self.read_list(child, &["parameter"], |node| {
                                self.read_parameter(node)
                            })?;
                        }
                        _ => change.math = Some(read_math(child)?),
                    }
                }
                SedChange::ComputeChange(change)
            }
        };
        Ok(change)
    }

    fn read_variable(&self, node: Node) -> Result<SedVariable, SedXmlError> {
        self.check_attributes(
            node,
            &["id", "name", "symbol", "target", "taskReference", "modelReference"],
        )?;
        self.no_children(node)?;
        Ok(SedVariable {
            base: self.read_base(node)?,
            id: string_attribute(node, "id"),
            name: optional_attribute(node, "name"),
            target: optional_attribute(node, "target"),
            symbol: optional_attribute(node, "symbol"),
            task_reference: optional_attribute(node, "taskReference"),
            model_reference: optional_attribute(node, "modelReference"),
        })
    }

    fn read_parameter(&self, node: Node) -> Result<SedParameter, SedXmlError> {
        self.check_attributes(node, &["id", "name", "value"])?;
        self.no_children(node)?;
        Ok(SedParameter {
            base: self.read_base(node)?,
            id: string_attribute(node, "id"),
            name: optional_attribute(node, "name"),
            value: double_attribute(node, "value")?,
        })
    }

    fn read_simulation(&self, node: Node) -> Result<SedSimulation, SedXmlError> {
        let kind = match node.tag_name().name() {
            "uniformTimeCourse" => {
                self.check_attributes(
                    node,
                    &[
                        "id",
                        "name",
                        "initialTime",
                        "outputStartTime",
                        "outputEndTime",
                        "numberOfPoints",
                    ],
                )?;
                SimulationKind::UniformTimeCourse {
                    initial_time: double_attribute(node, "initialTime")?,
                    output_start_time: double_attribute(node, "outputStartTime")?,
                    output_end_time: double_attribute(node, "outputEndTime")?,
                    number_of_points: integer_attribute(node, "numberOfPoints")?,
                }
            }
            "oneStep" => {
                self.check_attributes(node, &["id", "name", "step"])?;
                SimulationKind::OneStep {
                    step: double_attribute(node, "step")?,
                }
            }
            _ => {
                self.check_attributes(node, &["id", "name"])?;
                SimulationKind::SteadyState
            }
        };
        let mut simulation = SedSimulation {
            base: self.read_base(node)?,
            id: string_attribute(node, "id"),
            name: optional_attribute(node, "name"),
            algorithm: None,
            kind,
        };
        for child in self.children(node, &["algorithm"]) {
            let child = child?;
            simulation.algorithm = Some(self.read_algorithm(child)?);
        }
        Ok(simulation)
    }

    fn read_algorithm(&self, node: Node) -> Result<SedAlgorithm, SedXmlError> {
        self.check_attributes(node, &["kisaoID"])?;
        let mut algorithm = SedAlgorithm {
            base: self.read_base(node)?,
            kisao_id: string_attribute(node, "kisaoID"),
            parameters: Vec::new(),
        };
        for child in self.children(node, &["listOfAlgorithmParameters"]) {
            let child = child?;
            algorithm.parameters = self.read_list(child, &["algorithmParameter"], |node| {
                self.check_attributes(node, &["kisaoID", "value"])?;
                self.no_children(node)?;
                Ok(SedAlgorithmParameter {
                    base: self.read_base(node)?,
                    kisao_id: string_attribute(node, "kisaoID"),
                    value: string_attribute(node, "value"),
                })
            })?;
        }
        Ok(algorithm)
    }

    fn read_task(&self, node: Node) -> Result<SedTask, SedXmlError> {
        self.check_attributes(
            node,
            &["id", "name", "modelReference", "simulationReference"],
        )?;
        self.no_children(node)?;
        Ok(SedTask {
            base: self.read_base(node)?,
            id: string_attribute(node, "id"),
            name: optional_attribute(node, "name"),
            model_reference: string_attribute(node, "modelReference"),
            simulation_reference: string_attribute(node, "simulationReference"),
        })
    }

    fn read_data_generator(&self, node: Node) -> Result<SedDataGenerator, SedXmlError> {
        self.check_attributes(node, &["id", "name"])?;
        let mut data_generator = SedDataGenerator {
            base: self.read_base(node)?,
            id: string_attribute(node, "id"),
            name: optional_attribute(node, "name"),
            ..Default::default()
        };
        for child in self.children(node, &["listOfVariables", "listOfParameters", "math"]) {
            let child = child?;
            match child.tag_name().name() {
                "listOfVariables" => {
                    data_generator.variables =
                        self.read_list(child, &["variable"], |node| self.read_variable(node))?;
                }
                "listOfParameters" => {
                    data_generator.parameters =
                        self.read_list(child, &["parameter"], |node| self.read_parameter(node))?;
                }
                _ => data_generator.math = Some(read_math(child)?),
            }
        }
        Ok(data_generator)
    }

    fn read_output(&self, node: Node) -> Result<SedOutput, SedXmlError> {
        self.check_attributes(node, &["id", "name"])?;
        let base = self.read_base(node)?;
        let id = string_attribute(node, "id");
        let name = optional_attribute(node, "name");
        let output = match node.tag_name().name() {
            "plot2D" => {
                let mut plot = SedPlot2D {
                    base,
                    id,
                    name,
                    curves: Vec::new(),
                };
                for child in self.children(node, &["listOfCurves"]) {
                    let child = child?;
                    plot.curves = self.read_list(child, &["curve"], |node| self.read_curve(node))?;
                }
                SedOutput::Plot2D(plot)
            }
            "plot3D" => {
                let mut plot = SedPlot3D {
                    base,
                    id,
                    name,
                    surfaces: Vec::new(),
                };
                for child in self.children(node, &["listOfSurfaces"]) {
                    let child = child?;
                    plot.surfaces =
                        self.read_list(child, &["surface"], |node| self.read_surface(node))?;
                }
                SedOutput::Plot3D(plot)
            }
            _ => {
                let mut report = SedReport {
                    base,
                    id,
                    name,
                    data_sets: Vec::new(),
                };
                for child in self.children(node, &["listOfDataSets"]) {
                    let child = child?;
                    report.data_sets =
                        self.read_list(child, &["dataSet"], |node| self.read_data_set(node))?;
                }
                SedOutput::Report(report)
            }
        };
        Ok(output)
    }

    fn read_curve(&self, node: Node) -> Result<SedCurve, SedXmlError> {
        self.check_attributes(
            node,
            &["id", "name", "logX", "logY", "xDataReference", "yDataReference"],
        )?;
        self.no_children(node)?;
        Ok(SedCurve {
            base: self.read_base(node)?,
            id: string_attribute(node, "id"),
            name: optional_attribute(node, "name"),
            log_x: bool_attribute(node, "logX")?,
            log_y: bool_attribute(node, "logY")?,
            x_data_reference: string_attribute(node, "xDataReference"),
            y_data_reference: string_attribute(node, "yDataReference"),
        })
    }

    fn read_surface(&self, node: Node) -> Result<SedSurface, SedXmlError> {
        self.check_attributes(
            node,
            &[
                "id",
                "name",
                "logX",
                "logY",
                "logZ",
                "xDataReference",
                "yDataReference",
                "zDataReference",
            ],
        )?;
        self.no_children(node)?;
        Ok(SedSurface {
            base: self.read_base(node)?,
            id: string_attribute(node, "id"),
            name: optional_attribute(node, "name"),
            log_x: bool_attribute(node, "logX")?,
            log_y: bool_attribute(node, "logY")?,
            log_z: bool_attribute(node, "logZ")?,
            x_data_reference: string_attribute(node, "xDataReference"),
            y_data_reference: string_attribute(node, "yDataReference"),
            z_data_reference: string_attribute(node, "zDataReference"),
        })
    }

    fn read_data_set(&self, node: Node) -> Result<SedDataSet, SedXmlError> {
        self.check_attributes(node, &["id", "name", "label", "dataReference"])?;
        self.no_children(node)?;
        Ok(SedDataSet {
            base: self.read_base(node)?,
            id: string_attribute(node, "id"),
            name: optional_attribute(node, "name"),
            label: string_attribute(node, "label"),
            data_reference: string_attribute(node, "dataReference"),
        })
    }
}
