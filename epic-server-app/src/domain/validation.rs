use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// ASCII word characters only, matching what the registration form accepts.
pub static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$")
        .expect("email pattern must compile")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Flattens validator output into client-facing field paths such as
/// `teamMembers[1].email`, sorted for stable messages.
pub fn invalid_fields(errors: &ValidationErrors) -> Vec<String> {
    let mut fields = Vec::new();
    collect_fields(errors, "", &mut fields);
    fields.sort();
    fields
}

fn collect_fields(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, &camel_case(field));
        match kind {
            ValidationErrorsKind::Field(_) => out.push(path),
            ValidationErrorsKind::Struct(inner) => collect_fields(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_fields(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// snake_case to camelCase, the naming clients use on the wire.
pub fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("captain@example.com"));
        assert!(is_valid_email("first.last-name@mail.example.in"));
        assert!(is_valid_email(" padded@example.org "));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@example.toolong"));
        assert!(!is_valid_email("user..name@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("game_id"), "gameId");
        assert_eq!(camel_case("team_members"), "teamMembers");
        assert_eq!(camel_case("email"), "email");
    }

    #[test]
    fn test_non_blank() {
        assert!(non_blank("Alpha").is_ok());
        assert!(non_blank("   ").is_err());
        assert!(non_blank("").is_err());
    }
}
