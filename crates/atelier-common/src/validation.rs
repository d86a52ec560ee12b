/// Field validation for the auth endpoints. Returns the list of failure
/// messages; an empty list means the input is acceptable.
pub fn validate_register(name: &str, email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if name.trim().len() < 2 {
        errors.push("Name must be at least 2 characters".to_string());
    }
    if !is_valid_email(email) {
        errors.push("Valid email required".to_string());
    }
    if password.len() < 6 {
        errors.push("Password must be at least 6 characters".to_string());
    }
    errors
}

pub fn validate_login(email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_valid_email(email) {
        errors.push("Valid email required".to_string());
    }
    if password.is_empty() {
        errors.push("Password required".to_string());
    }
    errors
}

/// Structural email check: exactly one `@`, non-empty local part, and a
/// domain containing a dot with no whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let Some(domain) = parts.next() else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let mut labels = domain.split('.');
    domain.contains('.') && labels.all(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.io"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plain"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b..com"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn test_register_valid() {
        assert!(validate_register("Ada", "ada@example.com", "secret1").is_empty());
    }

    #[test]
    fn test_register_short_name() {
        let errors = validate_register("A", "ada@example.com", "secret1");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Name"));
    }

    #[test]
    fn test_register_collects_all_failures() {
        let errors = validate_register("", "nope", "123");
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_login_requires_password() {
        let errors = validate_login("ada@example.com", "");
        assert_eq!(errors, vec!["Password required".to_string()]);
    }
}
