/// Make a trimmed copy of the provided `String`, or `None` if the string is blank.
pub fn take_if_not_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Check that `value` follows the `SId` syntax: a letter or underscore, followed by
/// letters, digits, or underscores.
pub fn is_valid_sid(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check that `value` is a valid XML `ID` (i.e. an `NCName`), which is what `metaid` requires.
pub fn is_valid_metaid(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || ['_', '-', '.'].contains(&c))
}

/// Check that `value` is a KiSAO term reference in the `KISAO:0000019` format.
pub fn is_valid_kisao_id(value: &str) -> bool {
    let Some(number) = value.strip_prefix("KISAO:") else {
        return false;
    };
    number.len() == 7 && number.chars().all(|c| c.is_ascii_digit())
}

/// Format a double the way XML Schema expects it (`INF`, `-INF`, `NaN` for special values).
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        format!("{value}")
    }
}

/// Inverse of [`format_double`]. Also accepts any value accepted by `f64::from_str`.
pub fn parse_double(value: &str) -> Option<f64> {
    match value.trim() {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}

/// Parse an XML Schema boolean (`true`, `false`, `1`, `0`).
pub fn parse_xml_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sid_syntax() {
        assert!(is_valid_sid("model1"));
        assert!(is_valid_sid("_x"));
        assert!(!is_valid_sid(""));
        assert!(!is_valid_sid("1model"));
        assert!(!is_valid_sid("model-1"));
        assert!(!is_valid_sid("model 1"));
    }

    #[test]
    fn metaid_syntax() {
        assert!(is_valid_metaid("_meta.1-a"));
        assert!(!is_valid_metaid("1meta"));
        assert!(!is_valid_metaid("meta:1"));
    }

    #[test]
    fn kisao_syntax() {
        assert!(is_valid_kisao_id("KISAO:0000019"));
        assert!(!is_valid_kisao_id("KISAO:19"));
        assert!(!is_valid_kisao_id("kisao:0000019"));
    }

    #[test]
    fn special_doubles() {
        assert_eq!(format_double(f64::INFINITY), "INF");
        assert_eq!(format_double(2.5), "2.5");
        assert_eq!(parse_double("-INF"), Some(f64::NEG_INFINITY));
        assert!(parse_double("NaN").unwrap().is_nan());
        assert_eq!(parse_double(" 1e3 "), Some(1000.0));
        assert_eq!(parse_double("abc"), None);
        assert_eq!(parse_xml_bool("1"), Some(true));
        assert_eq!(parse_xml_bool("yes"), None);
    }
}
