//! Rust library for reading, writing, and validating SED-ML simulation experiment
//! descriptions (Level 1, Versions 1 and 2).
//!
//! The object model is rooted in [`SedDocument`]. Documents are read from and written to
//! SED-ML XML (see [`xml`]), can be dumped to JSON through `serde`, and are checked by
//! [`Validation::validate`] (or [`SedDocument::check`], which produces [`SedError`]
//! diagnostics).
//!
//! ```
//! use sedml::SedDocument;
//!
//! let mut document = SedDocument::default();
//! document.create_model("model1", "model1.xml");
//! let xml = document.to_xml_string();
//! let read = SedDocument::from_xml_string(&xml).unwrap();
//! assert_eq!(read, document);
//! ```

pub mod error;
pub mod math;
pub mod model;
pub mod utils;
pub mod validation;
pub mod xml;

pub use error::{SedError, SedErrorCategory, SedErrorCode, SedErrorSeverity};
pub use math::{InvalidFormula, MathEvaluationError, MathExpression};
pub use model::*;
pub use validation::{ContextualValidation, ErrorReporter, Validation, VecReporter};
pub use xml::{ReadOptions, SedFileError, SedNamespaces, SedXmlError, WriteOptions};
