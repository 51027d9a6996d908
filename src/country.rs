//! Domestic/international jurisdiction gate

/// Returns true iff a country code is present and differs from the home
/// country (case-insensitive). A missing or blank code is treated as
/// domestic: this is a fail-open policy choice toward the cheaper path,
/// not a detection certainty.
pub fn is_international(country: Option<&str>, home_country: &str) -> bool {
    match country {
        Some(code) => {
            let code = code.trim();
            !code.is_empty() && !code.eq_ignore_ascii_case(home_country.trim())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_country_is_domestic() {
        assert!(!is_international(None, "FR"));
        assert!(!is_international(Some(""), "FR"));
        assert!(!is_international(Some("   "), "FR"));
    }

    #[test]
    fn test_home_country_is_domestic() {
        assert!(!is_international(Some("FR"), "FR"));
        assert!(!is_international(Some("fr"), "FR"));
        assert!(!is_international(Some(" FR "), "FR"));
    }

    #[test]
    fn test_other_country_is_international() {
        assert!(is_international(Some("DE"), "FR"));
        assert!(is_international(Some("US"), "FR"));
    }

    #[test]
    fn test_configured_home_country() {
        assert!(!is_international(Some("BE"), "BE"));
        assert!(is_international(Some("FR"), "BE"));
    }
}
