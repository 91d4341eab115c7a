// File: swagship-core/src/validate.rs

/// Pulls the address token out of an RFC-2822-style mailbox string:
/// `Jane Doe <jane@example.com>` yields `jane@example.com`; a bare
/// address passes through unchanged.
pub fn address_token(raw: &str) -> &str {
    if let (Some(start), Some(end)) = (raw.rfind('<'), raw.rfind('>')) {
        if start < end {
            return raw[start + 1..end].trim();
        }
    }
    raw.trim()
}

/// Loose redemption-time check: the address portion must contain `@`.
pub fn email_has_at(raw: &str) -> bool {
    address_token(raw).contains('@')
}

/// Appends `<name> is required.` when the value is empty or blank.
pub fn require(problems: &mut Vec<String>, name: &str, value: &str) {
    if value.trim().is_empty() {
        problems.push(format!("{name} is required."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_address_passes() {
        assert!(email_has_at("jane@example.com"));
    }

    #[test]
    fn display_name_is_stripped() {
        assert_eq!(address_token("Jane Doe <jane@example.com>"), "jane@example.com");
        assert!(email_has_at("Jane Doe <jane@example.com>"));
    }

    #[test]
    fn missing_at_fails() {
        assert!(!email_has_at("jane.example.com"));
        assert!(!email_has_at("Jane Doe <jane.example.com>"));
        assert!(!email_has_at(""));
    }

    #[test]
    fn at_only_in_display_name_fails() {
        assert!(!email_has_at("jane@home <jane.example.com>"));
    }

    #[test]
    fn require_flags_blank_values() {
        let mut problems = Vec::new();
        require(&mut problems, "firstName", "  ");
        require(&mut problems, "lastName", "Doe");
        assert_eq!(problems, vec!["firstName is required.".to_string()]);
    }
}
