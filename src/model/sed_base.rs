use crate::utils::take_if_not_blank;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Attributes and children shared by every SED-ML element.
///
/// `notes` and `annotation` hold the raw inner markup of the `<notes>` and
/// `<annotation>` elements exactly as it appeared in the document (trimmed). The content
/// is not interpreted, but it is written back unchanged.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SedBase {
    pub metaid: Option<String>,
    pub notes: Option<String>,
    pub annotation: Option<String>,
}

impl SedBase {
    #[must_use]
    pub fn with_metaid(metaid: &str) -> SedBase {
        SedBase {
            metaid: Some(metaid.to_string()),
            ..Default::default()
        }
    }

    /// Set notes markup. Blank markup unsets the notes.
    pub fn set_notes(&mut self, markup: &str) {
        self.notes = take_if_not_blank(markup);
    }

    /// Set annotation markup. Blank markup unsets the annotation.
    pub fn set_annotation(&mut self, markup: &str) {
        self.annotation = take_if_not_blank(markup);
    }

    /// Append markup to the existing annotation (e.g. another top-level annotation child).
    pub fn append_annotation(&mut self, markup: &str) {
        let Some(markup) = take_if_not_blank(markup) else {
            return;
        };
        self.annotation = Some(match self.annotation.take() {
            Some(existing) => format!("{existing}\n{markup}"),
            None => markup,
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metaid.is_none() && self.notes.is_none() && self.annotation.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::SedBase;

    #[test]
    fn blank_markup_unsets() {
        let mut base = SedBase::with_metaid("m1");
        base.set_notes("  <p>Hello</p> ");
        assert_eq!(base.notes.as_deref(), Some("<p>Hello</p>"));
        base.set_notes("   ");
        assert_eq!(base.notes, None);
        assert!(!base.is_empty());
    }

    #[test]
    fn annotations_are_appended() {
        let mut base = SedBase::default();
        base.append_annotation("<a:x/>");
        base.append_annotation("");
        base.append_annotation("<b:y/>");
        assert_eq!(base.annotation.as_deref(), Some("<a:x/>\n<b:y/>"));
    }
}
