//! Conversion between MathML content markup and [`MathExpression`].

use crate::math::{AggregateFn, MathConstant, MathExpression, MathNodeData, MathNumber, MathOperator};
use crate::utils::{format_double, parse_double};
use crate::xml::writer::XmlWriter;
use crate::xml::{MATHML_XMLNS, SedXmlError, WriteOptions};
use crate::SedErrorCode;
use roxmltree::Node;

/// Parse a standalone `<math>` element.
pub fn read_mathml_string(xml: &str) -> Result<MathExpression, SedXmlError> {
    let document = roxmltree::Document::parse(xml).map_err(|e| {
        let position = e.pos();
        SedXmlError::new(SedErrorCode::L3NotSchemaConformant, e.to_string())
            .at(position.row, position.col)
    })?;
    read_math(document.root_element())
}

/// Render `math` as a standalone `<math>` element.
#[must_use]
pub fn write_mathml_string(math: &MathExpression) -> String {
    let options = WriteOptions {
        indent: 2,
        xml_declaration: false,
    };
    let mut writer = XmlWriter::new(&options);
    write_math(&mut writer, math);
    writer.finish()
}

fn math_error(node: Node, code: SedErrorCode, message: String) -> SedXmlError {
    SedXmlError::new(code, message).at_node(node)
}

fn element_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

/// Read the content of a `<math>` element.
pub(crate) fn read_math(node: Node) -> Result<MathExpression, SedXmlError> {
    if node.tag_name().name() != "math" || node.tag_name().namespace() != Some(MATHML_XMLNS) {
        return Err(math_error(
            node,
            SedErrorCode::InvalidMathElement,
            format!(
                "Expected `<math>` in the MathML namespace, found `{}`",
                node.tag_name().name()
            ),
        ));
    }
    let mut children = element_children(node);
    let (Some(content), None) = (children.next(), children.next()) else {
        return Err(math_error(
            node,
            SedErrorCode::BadMathML,
            "The `<math>` element must contain exactly one expression".to_string(),
        ));
    };
    read_node(content)
}

/// Check the attributes MathML restricts to particular elements.
fn check_attributes(node: Node) -> Result<(), SedXmlError> {
    let name = node.tag_name().name();
    if node.has_attribute("encoding") && name != "csymbol" {
        return Err(math_error(
            node,
            SedErrorCode::DisallowedMathMLEncodingUse,
            format!("Attribute `encoding` is not allowed on `<{name}>`"),
        ));
    }
    if node.has_attribute("definitionURL") && name != "csymbol" {
        return Err(math_error(
            node,
            SedErrorCode::DisallowedDefinitionURLUse,
            format!("Attribute `definitionURL` is not allowed on `<{name}>`"),
        ));
    }
    if node.has_attribute("type") && name != "cn" {
        return Err(math_error(
            node,
            SedErrorCode::DisallowedMathTypeAttributeUse,
            format!("Attribute `type` is not allowed on `<{name}>`"),
        ));
    }
    Ok(())
}

fn read_node(node: Node) -> Result<MathExpression, SedXmlError> {
    check_attributes(node)?;
    let name = node.tag_name().name();
    match name {
        "cn" => read_number(node).map(MathExpression::mk_number),
        "ci" => {
            let identifier = node.text().unwrap_or_default().trim();
            if identifier.is_empty() {
                return Err(math_error(
                    node,
                    SedErrorCode::BadMathML,
                    "Empty `<ci>` element".to_string(),
                ));
            }
            Ok(MathExpression::mk_identifier(identifier))
        }
        "apply" => read_apply(node),
        "piecewise" => read_piecewise(node),
        "csymbol" => Err(math_error(
            node,
            SedErrorCode::BadCsymbolDefinitionURLValue,
            format!(
                "Unsupported `<csymbol>` with definitionURL `{}`",
                node.attribute("definitionURL").unwrap_or_default()
            ),
        )),
        _ => {
            if let Some(constant) = MathConstant::from_mathml_name(name) {
                Ok(MathExpression::mk_constant(constant))
            } else if MathOperator::from_mathml_name(name).is_some() {
                Err(math_error(
                    node,
                    SedErrorCode::BadMathMLNodeType,
                    format!("Operator `<{name}>` used outside of `<apply>`"),
                ))
            } else {
                Err(math_error(
                    node,
                    SedErrorCode::DisallowedMathMLSymbol,
                    format!("Element `<{name}>` is not supported in MathML"),
                ))
            }
        }
    }
}

/// The text parts of a `<cn>` separated by `<sep/>`.
fn separated_parts(node: Node) -> Option<(String, String)> {
    let mut first = String::new();
    let mut second = String::new();
    let mut seen_separator = false;
    for child in node.children() {
        if child.is_element() {
            if child.tag_name().name() != "sep" || seen_separator {
                return None;
            }
            seen_separator = true;
        } else if let Some(text) = child.text() {
            if seen_separator {
                second.push_str(text);
            } else {
                first.push_str(text);
            }
        }
    }
    if seen_separator {
        Some((first.trim().to_string(), second.trim().to_string()))
    } else {
        None
    }
}

fn read_number(node: Node) -> Result<MathNumber, SedXmlError> {
    let text = node.text().unwrap_or_default().trim();
    match node.attribute("type").map(str::trim) {
        None | Some("real") => parse_double(text).map(MathNumber::Real).ok_or_else(|| {
            math_error(
                node,
                SedErrorCode::FailedMathMLReadOfDouble,
                format!("Invalid real number `{text}`"),
            )
        }),
        Some("integer") => text.parse::<i64>().map(MathNumber::Integer).map_err(|_| {
            math_error(
                node,
                SedErrorCode::FailedMathMLReadOfInteger,
                format!("Invalid integer `{text}`"),
            )
        }),
        Some("e-notation") => {
            let parsed = separated_parts(node).and_then(|(mantissa, exponent)| {
                Some(MathNumber::ENotation {
                    mantissa: parse_double(&mantissa)?,
                    exponent: exponent.parse::<i32>().ok()?,
                })
            });
            parsed.ok_or_else(|| {
                math_error(
                    node,
                    SedErrorCode::FailedMathMLReadOfExponential,
                    "Invalid e-notation number".to_string(),
                )
            })
        }
        Some("rational") => {
            let parsed = separated_parts(node).and_then(|(numerator, denominator)| {
                Some(MathNumber::Rational {
                    numerator: numerator.parse::<i64>().ok()?,
                    denominator: denominator.parse::<i64>().ok()?,
                })
            });
            parsed.ok_or_else(|| {
                math_error(
                    node,
                    SedErrorCode::FailedMathMLReadOfRational,
                    "Invalid rational number".to_string(),
                )
            })
        }
        Some(other) => Err(math_error(
            node,
            SedErrorCode::DisallowedMathTypeAttributeValue,
            format!("Unsupported `<cn>` type `{other}`"),
        )),
    }
}

fn read_operator(node: Node) -> Result<MathOperator, SedXmlError> {
    check_attributes(node)?;
    let name = node.tag_name().name();
    if name == "csymbol" {
        let url = node.attribute("definitionURL").unwrap_or_default();
        return AggregateFn::from_definition_url(url)
            .map(MathOperator::Aggregate)
            .ok_or_else(|| {
                math_error(
                    node,
                    SedErrorCode::BadCsymbolDefinitionURLValue,
                    format!("Unknown `<csymbol>` function with definitionURL `{url}`"),
                )
            });
    }
    match MathOperator::from_mathml_name(name) {
        Some(operator) => Ok(operator),
        None if MathConstant::from_mathml_name(name).is_some() || name == "cn" || name == "ci" => {
            Err(math_error(
                node,
                SedErrorCode::BadMathMLNodeType,
                format!("`<{name}>` cannot be applied as an operator"),
            ))
        }
        None => Err(math_error(
            node,
            SedErrorCode::DisallowedMathMLSymbol,
            format!("Element `<{name}>` is not supported in MathML"),
        )),
    }
}

/// The single expression inside a qualifier (`<degree>`, `<logbase>`) or `<otherwise>`.
fn read_single_child(node: Node) -> Result<MathExpression, SedXmlError> {
    let mut children = element_children(node);
    match (children.next(), children.next()) {
        (Some(child), None) => read_node(child),
        _ => Err(math_error(
            node,
            SedErrorCode::BadMathML,
            format!(
                "`<{}>` must contain exactly one expression",
                node.tag_name().name()
            ),
        )),
    }
}

fn read_apply(node: Node) -> Result<MathExpression, SedXmlError> {
    let mut children = element_children(node);
    let Some(head) = children.next() else {
        return Err(math_error(
            node,
            SedErrorCode::BadMathML,
            "Empty `<apply>` element".to_string(),
        ));
    };
    let operator = read_operator(head)?;

    let mut qualifier = None;
    let mut arguments = Vec::new();
    for child in children {
        match (child.tag_name().name(), operator) {
            ("degree", MathOperator::Root) | ("logbase", MathOperator::Log) => {
                qualifier = Some(read_single_child(child)?);
            }
            ("degree" | "logbase", _) => {
                return Err(math_error(
                    child,
                    SedErrorCode::BadMathML,
                    format!(
                        "Qualifier `<{}>` is not allowed for `{operator}`",
                        child.tag_name().name()
                    ),
                ));
            }
            _ => arguments.push(read_node(child)?),
        }
    }
    if let Some(qualifier) = qualifier {
        arguments.insert(0, qualifier);
    }
    Ok(MathExpression::mk_apply(operator, &arguments))
}

fn read_piecewise(node: Node) -> Result<MathExpression, SedXmlError> {
    let mut pieces = Vec::new();
    let mut otherwise = None;
    for child in element_children(node) {
        match child.tag_name().name() {
            "piece" => {
                let mut parts = element_children(child);
                let (Some(value), Some(condition), None) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    return Err(math_error(
                        child,
                        SedErrorCode::BadMathML,
                        "`<piece>` must contain a value and a condition".to_string(),
                    ));
                };
                pieces.push((read_node(value)?, read_node(condition)?));
            }
            "otherwise" if otherwise.is_none() => {
                otherwise = Some(read_single_child(child)?);
            }
            name => {
                return Err(math_error(
                    child,
                    SedErrorCode::BadMathML,
                    format!("Unexpected `<{name}>` in `<piecewise>`"),
                ));
            }
        }
    }
    Ok(MathExpression::mk_piecewise(&pieces, otherwise.as_ref()))
}

/// Write `math` wrapped in a `<math>` element.
pub(crate) fn write_math(writer: &mut XmlWriter, math: &MathExpression) {
    writer.open("math", &[("xmlns", MATHML_XMLNS.to_string())]);
    write_node(writer, math);
    writer.close("math");
}

fn write_number(writer: &mut XmlWriter, number: &MathNumber) {
    let attributes = number
        .mathml_type()
        .map(|kind| vec![("type", kind.to_string())])
        .unwrap_or_default();
    match *number {
        MathNumber::Real(value) => writer.text("cn", &attributes, &format_double(value)),
        MathNumber::Integer(value) => writer.text("cn", &attributes, &value.to_string()),
        MathNumber::ENotation { mantissa, exponent } => {
            let markup = format!("{}<sep/>{exponent}", format_double(mantissa));
            writer.raw("cn", &attributes, &markup);
        }
        MathNumber::Rational {
            numerator,
            denominator,
        } => {
            writer.raw("cn", &attributes, &format!("{numerator}<sep/>{denominator}"));
        }
    }
}

fn write_node(writer: &mut XmlWriter, math: &MathExpression) {
    match math.as_data() {
        MathNodeData::Number(number) => write_number(writer, number),
        MathNodeData::Identifier(name) => writer.text("ci", &[], name),
        MathNodeData::Constant(constant) => writer.empty(constant.mathml_name(), &[]),
        MathNodeData::Apply(operator, arguments) => {
            writer.open("apply", &[]);
            match (operator, operator.mathml_name()) {
                (_, Some(name)) => writer.empty(name, &[]),
                (MathOperator::Aggregate(function), None) => writer.text(
                    "csymbol",
                    &[
                        ("encoding", "text".to_string()),
                        ("definitionURL", function.definition_url().to_string()),
                    ],
                    &function.to_string(),
                ),
                (operator, None) => {
                    unreachable!("Every non-aggregate operator has a MathML name (`{operator}`).")
                }
            }
            let qualifier = match operator {
                MathOperator::Root if arguments.len() == 2 => Some("degree"),
                MathOperator::Log if arguments.len() == 2 => Some("logbase"),
                _ => None,
            };
            let mut arguments = arguments.iter();
            if let Some(qualifier) = qualifier
                && let Some(first) = arguments.next()
            {
                writer.open(qualifier, &[]);
                write_node(writer, first);
                writer.close(qualifier);
            }
            for argument in arguments {
                write_node(writer, argument);
            }
            writer.close("apply");
        }
        MathNodeData::Piecewise { pieces, otherwise } => {
            writer.open("piecewise", &[]);
            for (value, condition) in pieces {
                writer.open("piece", &[]);
                write_node(writer, value);
                write_node(writer, condition);
                writer.close("piece");
            }
            if let Some(otherwise) = otherwise {
                writer.open("otherwise", &[]);
                write_node(writer, otherwise);
                writer.close("otherwise");
            }
            writer.close("piecewise");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{read_mathml_string, write_mathml_string};
    use crate::SedErrorCode;
    use crate::math::MathExpression;
    use std::collections::HashMap;

    fn wrap(content: &str) -> String {
        format!("<math xmlns=\"http://www.w3.org/1998/Math/MathML\">{content}</math>")
    }

    #[test]
    fn formulas_survive_mathml() {
        let formulas = [
            "(2 * x) + sin(y)",
            "max(S1) - min(S1)",
            "log(2, x) + log10(x) + root(3, x) + sqrt(x)",
            "piecewise(1, gt(x, 0), 0)",
            "2.5e-3 * x ^ 2",
            "-x + pi",
        ];
        for formula in formulas {
            let math = MathExpression::parse(formula).unwrap();
            let mathml = write_mathml_string(&math);
            assert_eq!(read_mathml_string(&mathml).unwrap(), math, "{mathml}");
        }
    }

    #[test]
    fn writes_qualifiers_and_csymbols() {
        let math = MathExpression::parse("log(2, x) + sum(S1)").unwrap();
        let mathml = write_mathml_string(&math);
        assert!(mathml.starts_with("<math xmlns=\"http://www.w3.org/1998/Math/MathML\">"));
        assert!(mathml.contains("<logbase>\n        <cn type=\"integer\">2</cn>\n      </logbase>"));
        assert!(mathml.contains(
            "<csymbol encoding=\"text\" definitionURL=\"http://sed-ml.org/#sum\">sum</csymbol>"
        ));
    }

    #[test]
    fn every_operator_keeps_its_element() {
        let names = [
            "plus", "minus", "times", "divide", "power", "root", "abs", "exp", "ln", "log",
            "floor", "ceiling", "factorial", "sin", "cos", "tan", "sec", "csc", "cot", "sinh",
            "cosh", "tanh", "arcsin", "arccos", "arctan", "eq", "neq", "gt", "lt", "geq", "leq",
            "and", "or", "xor", "not",
        ];
        for name in names {
            let math = read_mathml_string(&wrap(&format!("<apply><{name}/><ci>x</ci></apply>")))
                .unwrap();
            let mathml = write_mathml_string(&math);
            assert!(mathml.contains(&format!("<{name}/>")), "{mathml}");
            assert_eq!(read_mathml_string(&mathml).unwrap(), math, "{name}");
        }
    }

    #[test]
    fn negative_bases_and_constant_names_round_trip() {
        let square = read_mathml_string(&wrap(
            "<apply><power/><cn type=\"integer\">-2</cn><cn type=\"integer\">2</cn></apply>",
        ))
        .unwrap();
        assert_eq!(square.to_string(), "((-2) ^ 2)");
        assert_eq!(MathExpression::parse(&square.to_string()).unwrap(), square);

        let shadowed = read_mathml_string(&wrap("<apply><times/><ci>pi</ci><pi/></apply>")).unwrap();
        assert_eq!(shadowed.to_string(), "(ci(pi) * pi)");
        let json = serde_json::to_string(&shadowed).unwrap();
        let back: MathExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shadowed);
        assert_eq!(read_mathml_string(&write_mathml_string(&back)).unwrap(), shadowed);
    }

    #[test]
    fn reads_number_types() {
        let math = read_mathml_string(&wrap("<cn type=\"e-notation\"> 1.5 <sep/> 3 </cn>")).unwrap();
        assert_eq!(math.to_string(), "1.5e3");
        let math = read_mathml_string(&wrap("<cn type=\"rational\">1<sep/>4</cn>")).unwrap();
        assert_eq!(math.evaluate(&HashMap::<String, f64>::new()), Ok(0.25));
        let math = read_mathml_string(&wrap("<cn> 7 </cn>")).unwrap();
        assert_eq!(math.to_string(), "7.0");
    }

    #[test]
    fn error_codes() {
        let cases = [
            ("<cn type=\"integer\">1.5</cn>", SedErrorCode::FailedMathMLReadOfInteger),
            ("<cn>abc</cn>", SedErrorCode::FailedMathMLReadOfDouble),
            ("<cn type=\"e-notation\">1</cn>", SedErrorCode::FailedMathMLReadOfExponential),
            ("<cn type=\"rational\">1<sep/>x</cn>", SedErrorCode::FailedMathMLReadOfRational),
            ("<cn type=\"complex\">1</cn>", SedErrorCode::DisallowedMathTypeAttributeValue),
            ("<ci type=\"real\">x</ci>", SedErrorCode::DisallowedMathTypeAttributeUse),
            ("<ci encoding=\"text\">x</ci>", SedErrorCode::DisallowedMathMLEncodingUse),
            ("<ci definitionURL=\"u\">x</ci>", SedErrorCode::DisallowedDefinitionURLUse),
            ("<apply><csymbol definitionURL=\"http://x\">f</csymbol><ci>x</ci></apply>", SedErrorCode::BadCsymbolDefinitionURLValue),
            ("<apply><lambda/><ci>x</ci></apply>", SedErrorCode::DisallowedMathMLSymbol),
            ("<apply><ci>f</ci><ci>x</ci></apply>", SedErrorCode::BadMathMLNodeType),
            ("<plus/>", SedErrorCode::BadMathMLNodeType),
            ("<ci>x</ci><ci>y</ci>", SedErrorCode::BadMathML),
            ("<apply/>", SedErrorCode::BadMathML),
        ];
        for (content, code) in cases {
            let error = read_mathml_string(&wrap(content)).unwrap_err();
            assert_eq!(error.code, code, "{content}");
            assert!(error.line > 0);
        }
        let error = read_mathml_string("<math><ci>x</ci></math>").unwrap_err();
        assert_eq!(error.code, SedErrorCode::InvalidMathElement);
        let error = read_mathml_string("<math").unwrap_err();
        assert_eq!(error.code, SedErrorCode::L3NotSchemaConformant);
    }
}
