use crate::model::SedOperationError;
use serde::{Deserialize, Serialize};

pub const SEDML_DEFAULT_LEVEL: u32 = 1;
pub const SEDML_DEFAULT_VERSION: u32 = 1;
/// Namespace of SED-ML Level 1 Version 1.
pub const SEDML_XMLNS_L1: &str = "http://sed-ml.org/";
/// Namespace of SED-ML Level 1 Version 2.
pub const SEDML_XMLNS_L1V2: &str = "http://sed-ml.org/sed-ml/level1/version2";
/// Namespace of MathML content markup.
pub const MATHML_XMLNS: &str = "http://www.w3.org/1998/Math/MathML";

/// The SED-ML namespace URI of a level/version combination, if it exists.
#[must_use]
pub fn get_sed_namespace_uri(level: u32, version: u32) -> Option<&'static str> {
    match (level, version) {
        (1, 1) => Some(SEDML_XMLNS_L1),
        (1, 2) => Some(SEDML_XMLNS_L1V2),
        _ => None,
    }
}

/// The level/version combination of a SED-ML namespace URI, if it is one.
#[must_use]
pub fn get_level_version(uri: &str) -> Option<(u32, u32)> {
    match uri {
        SEDML_XMLNS_L1 => Some((1, 1)),
        SEDML_XMLNS_L1V2 => Some((1, 2)),
        _ => None,
    }
}

/// The namespace URI a level/version combination has under the
/// `http://sed-ml.org/sed-ml/level{L}/version{V}` scheme, whether it is supported or not.
#[must_use]
pub fn sed_namespace_uri_scheme(level: u32, version: u32) -> String {
    format!("http://sed-ml.org/sed-ml/level{level}/version{version}")
}

/// Inverse of [`sed_namespace_uri_scheme`].
#[must_use]
pub fn parse_sed_namespace_uri_scheme(uri: &str) -> Option<(u32, u32)> {
    let rest = uri.strip_prefix("http://sed-ml.org/sed-ml/level")?;
    let (level, version) = rest.split_once("/version")?;
    Some((level.parse().ok()?, version.parse().ok()?))
}

/// All supported SED-ML namespace URIs.
#[must_use]
pub fn supported_namespaces() -> Vec<&'static str> {
    vec![SEDML_XMLNS_L1, SEDML_XMLNS_L1V2]
}

#[must_use]
pub fn is_sed_namespace(uri: &str) -> bool {
    get_level_version(uri).is_some()
}

/// SED-ML level and version of a document, together with additional namespace declarations
/// that are written on the `<sedML>` root (e.g. prefixes used by XPath targets).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SedNamespaces {
    level: u32,
    version: u32,
    /// `(prefix, uri)` pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    namespaces: Vec<(String, String)>,
}

impl Default for SedNamespaces {
    fn default() -> Self {
        SedNamespaces::new(SEDML_DEFAULT_LEVEL, SEDML_DEFAULT_VERSION)
    }
}

impl SedNamespaces {
    /// Create namespaces for the given level and version. The combination is not checked,
    /// see [`SedNamespaces::is_valid_combination`].
    #[must_use]
    pub fn new(level: u32, version: u32) -> SedNamespaces {
        SedNamespaces {
            level,
            version,
            namespaces: Vec::new(),
        }
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    /// The SED-ML namespace URI of this level and version.
    #[must_use]
    pub fn uri(&self) -> Option<&'static str> {
        get_sed_namespace_uri(self.level, self.version)
    }

    /// The namespace written on `<sedML>`: [`SedNamespaces::uri`], or the scheme URI of an
    /// unsupported combination.
    #[must_use]
    pub fn declared_uri(&self) -> String {
        self.uri().map_or_else(
            || sed_namespace_uri_scheme(self.level, self.version),
            str::to_string,
        )
    }

    #[must_use]
    pub fn is_valid_combination(&self) -> bool {
        self.uri().is_some()
    }

    /// Declare an additional namespace. A declaration with the same prefix is replaced.
    /// The empty (default) prefix is reserved for SED-ML.
    pub fn add_namespace(&mut self, uri: &str, prefix: &str) -> Result<(), SedOperationError> {
        let is_ncname = crate::utils::is_valid_metaid(prefix);
        if prefix.is_empty() || prefix == "xmlns" || !is_ncname {
            return Err(SedOperationError::InvalidNamespacePrefix {
                prefix: prefix.to_string(),
            });
        }
        match self.namespaces.iter_mut().find(|(p, _)| p == prefix) {
            Some(existing) => existing.1 = uri.to_string(),
            None => self
                .namespaces
                .push((prefix.to_string(), uri.to_string())),
        }
        Ok(())
    }

    /// Remove all declarations of the given namespace `uri`. Returns `true` if something
    /// was removed.
    pub fn remove_namespace(&mut self, uri: &str) -> bool {
        let before = self.namespaces.len();
        self.namespaces.retain(|(_, u)| u != uri);
        before != self.namespaces.len()
    }

    /// The additional `(prefix, uri)` declarations.
    #[must_use]
    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    #[must_use]
    pub fn get_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_version_uris() {
        assert_eq!(SedNamespaces::default().uri(), Some(SEDML_XMLNS_L1));
        assert_eq!(SedNamespaces::new(1, 2).uri(), Some(SEDML_XMLNS_L1V2));
        assert!(!SedNamespaces::new(2, 1).is_valid_combination());
        assert_eq!(get_level_version(SEDML_XMLNS_L1V2), Some((1, 2)));
        assert!(is_sed_namespace("http://sed-ml.org/"));
        assert!(!is_sed_namespace(MATHML_XMLNS));
        assert_eq!(supported_namespaces().len(), 2);
    }

    #[test]
    fn namespace_uri_scheme() {
        assert_eq!(sed_namespace_uri_scheme(1, 2), SEDML_XMLNS_L1V2);
        assert_eq!(parse_sed_namespace_uri_scheme(SEDML_XMLNS_L1V2), Some((1, 2)));
        assert_eq!(
            parse_sed_namespace_uri_scheme("http://sed-ml.org/sed-ml/level2/version5"),
            Some((2, 5))
        );
        assert_eq!(parse_sed_namespace_uri_scheme(SEDML_XMLNS_L1), None);
        assert_eq!(parse_sed_namespace_uri_scheme("http://sed-ml.org/sed-ml/levelx/version1"), None);
        assert_eq!(SedNamespaces::new(1, 1).declared_uri(), SEDML_XMLNS_L1);
        assert_eq!(
            SedNamespaces::new(2, 5).declared_uri(),
            "http://sed-ml.org/sed-ml/level2/version5"
        );
    }

    #[test]
    fn extra_namespaces() {
        let mut ns = SedNamespaces::default();
        ns.add_namespace("http://www.sbml.org/sbml/level2", "sbml").unwrap();
        ns.add_namespace("http://www.sbml.org/sbml/level3", "sbml").unwrap();
        assert_eq!(ns.namespaces().len(), 1);
        assert_eq!(ns.get_uri("sbml"), Some("http://www.sbml.org/sbml/level3"));
        assert!(matches!(
            ns.add_namespace("http://example.org", ""),
            Err(SedOperationError::InvalidNamespacePrefix { .. })
        ));
        assert!(ns.add_namespace("http://example.org", "1x").is_err());
        assert!(ns.remove_namespace("http://www.sbml.org/sbml/level3"));
        assert!(!ns.remove_namespace("http://www.sbml.org/sbml/level3"));
        assert!(ns.namespaces().is_empty());
    }
}
