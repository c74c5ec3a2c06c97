//! The SED-ML diagnostic table.
//!
//! Error identifiers follow the numbering of the libSBML error model that SED-ML tooling
//! historically mirrored: `10xxx` are XML, MathML and identifier problems, `20xxx` are
//! general consistency rules, `9xxxx` are level/version compatibility and internal
//! problems. Codes in the `30xxx` range are SED-ML specific consistency rules.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Severity of a [`SedError`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SedErrorSeverity {
    Info,
    Warning,
    Error,
    Fatal,
    /// The XML content does not conform to the SED-ML XML Schema.
    SchemaError,
    /// A general warning that does not fall into any specific rule.
    GeneralWarning,
}

impl Display for SedErrorSeverity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SedErrorSeverity::Info => "Informational",
            SedErrorSeverity::Warning => "Warning",
            SedErrorSeverity::Error => "Error",
            SedErrorSeverity::Fatal => "Fatal",
            SedErrorSeverity::SchemaError => "Schema error",
            SedErrorSeverity::GeneralWarning => "General warning",
        };
        f.write_str(text)
    }
}

/// Category of a [`SedError`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SedErrorCategory {
    Internal,
    /// General SED-ML problem not falling into another category.
    Sedml,
    /// Constructs that are not available in the declared level/version.
    SedmlL1Compat,
    GeneralConsistency,
    IdentifierConsistency,
    MathmlConsistency,
    InternalConsistency,
}

impl Display for SedErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SedErrorCategory::Internal => "Internal",
            SedErrorCategory::Sedml => "General SED-ML conformance",
            SedErrorCategory::SedmlL1Compat => "Translation to SED-ML L1V1",
            SedErrorCategory::GeneralConsistency => "SED-ML component consistency",
            SedErrorCategory::IdentifierConsistency => "SED-ML identifier consistency",
            SedErrorCategory::MathmlConsistency => "MathML consistency",
            SedErrorCategory::InternalConsistency => "Internal consistency",
        };
        f.write_str(text)
    }
}

macro_rules! sed_error_table {
    ($( $(#[$meta:meta])* $name:ident = $code:literal, $severity:ident, $category:ident, $message:literal; )*) => {
        /// Identifiers of all diagnostics this crate can produce.
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum SedErrorCode {
            $( $(#[$meta])* $name = $code, )*
        }

        impl SedErrorCode {
            /// Numeric identifier of this code.
            #[must_use]
            pub fn id(self) -> u32 {
                self as u32
            }

            /// Look up a code by its numeric identifier.
            #[must_use]
            pub fn from_id(id: u32) -> Option<SedErrorCode> {
                match id {
                    $( $code => Some(SedErrorCode::$name), )*
                    _ => None,
                }
            }

            /// Default severity of diagnostics with this code.
            #[must_use]
            pub fn severity(self) -> SedErrorSeverity {
                match self {
                    $( SedErrorCode::$name => SedErrorSeverity::$severity, )*
                }
            }

            /// Category of diagnostics with this code.
            #[must_use]
            pub fn category(self) -> SedErrorCategory {
                match self {
                    $( SedErrorCode::$name => SedErrorCategory::$category, )*
                }
            }

            /// Short, human-readable description of the rule.
            #[must_use]
            pub fn short_message(self) -> &'static str {
                match self {
                    $( SedErrorCode::$name => $message, )*
                }
            }
        }
    };
}

sed_error_table! {
    UnknownError = 10000, Fatal, Internal, "Encountered unknown internal error";
    NotUTF8 = 10101, Fatal, Sedml, "File does not use UTF-8 encoding";
    UnrecognizedElement = 10102, Error, Sedml, "Encountered unrecognized element";
    NotSchemaConformant = 10103, SchemaError, Sedml, "Document does not conform to the SED-ML XML schema";
    /// Historical name kept from the mirrored table; means "not well-formed XML".
    L3NotSchemaConformant = 10104, Fatal, Sedml, "Document is not well-formed XML";
    InvalidMathElement = 10201, Error, MathmlConsistency, "Invalid MathML";
    DisallowedMathMLSymbol = 10202, Error, MathmlConsistency, "Disallowed MathML symbol found";
    DisallowedMathMLEncodingUse = 10203, Error, MathmlConsistency, "Use of the MathML 'encoding' attribute is not allowed on this element";
    DisallowedDefinitionURLUse = 10204, Error, MathmlConsistency, "Use of the MathML 'definitionURL' attribute is not allowed on this element";
    BadCsymbolDefinitionURLValue = 10205, Error, MathmlConsistency, "Invalid <csymbol> 'definitionURL' attribute value";
    DisallowedMathTypeAttributeUse = 10206, Error, MathmlConsistency, "Use of the MathML 'type' attribute is not allowed on this element";
    DisallowedMathTypeAttributeValue = 10207, Error, MathmlConsistency, "Disallowed MathML 'type' attribute value";
    OpsNeedCorrectNumberOfArgs = 10218, Error, MathmlConsistency, "Incorrect number of arguments given to MathML operator";
    DuplicateComponentId = 10301, Error, IdentifierConsistency, "Duplicate 'id' attribute value";
    DuplicateMetaId = 10307, Error, IdentifierConsistency, "Duplicate 'metaid' attribute value";
    InvalidMetaidSyntax = 10309, Error, IdentifierConsistency, "Invalid syntax for a 'metaid' attribute value";
    InvalidIdSyntax = 10310, Error, IdentifierConsistency, "Invalid syntax for an 'id' attribute value";
    MissingAnnotationNamespace = 10401, Error, Sedml, "Missing declaration of the XML namespace for the annotation";
    MultipleAnnotations = 10404, Error, Sedml, "Only one <annotation> element is permitted inside a particular containing element";
    OnlyOneNotesElementAllowed = 10805, Error, Sedml, "Only one <notes> element is permitted inside a particular containing element";
    InvalidNamespaceOnSed = 20101, Fatal, GeneralConsistency, "Invalid XML namespace for the SED-ML container element";
    MissingOrInconsistentLevel = 20102, Fatal, GeneralConsistency, "Missing or inconsistent value for the 'level' attribute";
    MissingOrInconsistentVersion = 20103, Fatal, GeneralConsistency, "Missing or inconsistent value for the 'version' attribute";
    LevelPositiveInteger = 20105, Fatal, GeneralConsistency, "The 'level' attribute must have a positive integer value";
    VersionPositiveInteger = 20106, Fatal, GeneralConsistency, "The 'version' attribute must have a positive integer value";
    AllowedAttributesOnSed = 20108, Error, GeneralConsistency, "Invalid attribute on the SED-ML container element";
    EmptyListElement = 20203, Error, GeneralConsistency, "No empty listOf elements are allowed";
    OneOfEachListOf = 20205, Error, GeneralConsistency, "Only one of each kind of listOf element is allowed";
    GeneralWarningNotSpecified = 29999, GeneralWarning, GeneralConsistency, "Unknown error";
    MissingRequiredAttribute = 30101, Error, GeneralConsistency, "A required attribute is missing";
    MissingRequiredElement = 30102, Error, GeneralConsistency, "A required element is missing";
    UnresolvedReference = 30103, Error, IdentifierConsistency, "A reference does not resolve to an element of the expected kind";
    InvalidSimulationTimes = 30104, Error, GeneralConsistency, "Simulation time parameters are inconsistent";
    InvalidKisaoId = 30105, Error, GeneralConsistency, "Invalid KiSAO term reference";
    InvalidVariableTargetOrSymbol = 30106, Error, GeneralConsistency, "A variable must define exactly one of 'target' and 'symbol'";
    ElementNotInLevelVersion = 30107, Error, SedmlL1Compat, "Element is not available in the declared SED-ML level and version";
    UndeclaredMathIdentifier = 30108, Error, MathmlConsistency, "Math refers to an identifier that is not declared";
    UnknownModelLanguage = 30109, Warning, GeneralConsistency, "Model language is not a known SED-ML language URN";
    InvalidSedLevelVersion = 99101, Error, Sedml, "Invalid SED-ML level and version";
    BadMathML = 99219, Error, MathmlConsistency, "Invalid MathML expression";
    FailedMathMLReadOfDouble = 99220, Error, MathmlConsistency, "Missing or invalid floating-point number in MathML expression";
    FailedMathMLReadOfInteger = 99221, Error, MathmlConsistency, "Missing or invalid integer in MathML expression";
    FailedMathMLReadOfExponential = 99222, Error, MathmlConsistency, "Missing or invalid exponential expression in MathML";
    FailedMathMLReadOfRational = 99223, Error, MathmlConsistency, "Missing or invalid rational expression in MathML";
    BadMathMLNodeType = 99224, Error, MathmlConsistency, "Invalid MathML element";
    UnknownCoreAttribute = 99994, Error, Sedml, "Encountered an unknown attribute in the SED-ML namespace";
    InvalidTargetLevelVersion = 99997, Error, Internal, "Target level/version is not a valid SED-ML combination";
    SedCodesUpperBound = 99999, Error, Internal, "Upper bound of the SED-ML diagnostic codes";
}

impl Display for SedErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// One diagnostic produced while reading or validating a SED-ML document.
///
/// `line` and `column` are `0` when the diagnostic is not tied to a source location
/// (e.g. it was produced by validating an in-memory document).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SedError {
    pub code: SedErrorCode,
    pub severity: SedErrorSeverity,
    pub category: SedErrorCategory,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SedError {
    /// Create a diagnostic with the default severity and category of `code`.
    #[must_use]
    pub fn new(code: SedErrorCode, message: impl Into<String>) -> Self {
        SedError {
            code,
            severity: code.severity(),
            category: code.category(),
            message: message.into(),
            line: 0,
            column: 0,
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Numeric identifier of the diagnostic code.
    #[must_use]
    pub fn error_id(&self) -> u32 {
        self.code.id()
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(
            self.severity,
            SedErrorSeverity::Warning | SedErrorSeverity::GeneralWarning
        )
    }

    #[must_use]
    pub fn is_info(&self) -> bool {
        self.severity == SedErrorSeverity::Info
    }

    /// Errors, fatal errors and schema errors.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.is_warning() && !self.is_info()
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == SedErrorSeverity::Fatal
    }
}

impl Display for SedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.line > 0 {
            write!(f, "line {}:{}: ", self.line, self.column)?;
        }
        write!(f, "({} [{}]) {}", self.code, self.severity, self.message)
    }
}

impl std::error::Error for SedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_lookup_is_consistent() {
        for id in [10102, 10301, 20101, 30103, 99219] {
            let code = SedErrorCode::from_id(id).unwrap();
            assert_eq!(code.id(), id);
        }
        assert_eq!(SedErrorCode::from_id(12345), None);
    }

    #[test]
    fn severity_and_category_defaults() {
        let error = SedError::new(SedErrorCode::InvalidNamespaceOnSed, "bad namespace");
        assert!(error.is_fatal());
        assert!(error.is_error());
        assert_eq!(error.category, SedErrorCategory::GeneralConsistency);

        let warning = SedError::new(SedErrorCode::UnknownModelLanguage, "urn:foo");
        assert!(warning.is_warning());
        assert!(!warning.is_error());

        assert_eq!(
            SedErrorCode::ElementNotInLevelVersion.category(),
            SedErrorCategory::SedmlL1Compat
        );
    }

    #[test]
    fn display_includes_location() {
        let error = SedError::new(SedErrorCode::UnrecognizedElement, "Unknown `foo`").at(3, 7);
        assert_eq!(error.to_string(), "line 3:7: (10102 [Error]) Unknown `foo`");
        let error = SedError::new(SedErrorCode::DuplicateComponentId, "Duplicate `m1`");
        assert_eq!(error.to_string(), "(10301 [Error]) Duplicate `m1`");
    }
}
