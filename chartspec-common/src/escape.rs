/// Whether `col` can be used as a member name after `datum.` in an expression
pub fn is_identifier(col: &str) -> bool {
    let mut chars = col.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Expression that reads `col` from `object`, e.g. `datum.value` or `datum['unit price']`
pub fn member_access(object: &str, col: &str) -> String {
    if is_identifier(col) {
        format!("{object}.{col}")
    } else {
        format!(
            "{object}['{}']",
            col.replace('\\', "\\\\").replace('\'', "\\'")
        )
    }
}

/// Shorthand for [`member_access`] on `datum`
pub fn datum_field(col: &str) -> String {
    member_access("datum", col)
}

#[cfg(test)]
mod tests {
    use crate::escape::{datum_field, is_identifier, member_access};

    #[test]
    fn test_datum_field() {
        assert_eq!(datum_field("downloads"), "datum.downloads");
        assert_eq!(datum_field("rscMarkId"), "datum.rscMarkId");
        assert_eq!(datum_field("unit price"), "datum['unit price']");
        assert_eq!(datum_field("it's"), "datum['it\\'s']");
        assert_eq!(member_access("datum.datum", "x"), "datum.datum.x");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("rscSeriesId"));
        assert!(is_identifier("$value_2"));
        assert!(!is_identifier("2020"));
        assert!(!is_identifier("os.name"));
        assert!(!is_identifier(""));
    }
}
