//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation reports the same field-level messages.

use crate::ValidationErrors;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const BLANK: &str = "This field may not be blank.";

pub(crate) const EMAIL_MAX_LEN: usize = 255;
pub(crate) const ACCOUNT_NAME_MAX_LEN: usize = 255;
pub(crate) const PASSWORD_MIN_LEN: usize = 5;
pub(crate) const WALLET_NAME_MAX_LEN: usize = 200;
pub(crate) const CURRENCY_MAX_LEN: usize = 200;
pub(crate) const TAG_NAME_MAX_LEN: usize = 100;
pub(crate) const FLOW_MAX_LEN: usize = 20;
pub(crate) const CATEGORY_MAX_LEN: usize = 20;
pub(crate) const NOTE_MAX_LEN: usize = 500;

fn too_long(max_len: usize) -> String {
    format!("Ensure this field has no more than {max_len} characters.")
}

/// Validate a required, non-blank text field. Returns the trimmed value when
/// valid, records the problem in `errors` otherwise.
pub(crate) fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Option<String> {
    let Some(value) = value else {
        errors.add(field, REQUIRED);
        return None;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if trimmed.chars().count() > max_len {
        errors.add(field, too_long(max_len));
        return None;
    }
    Some(trimmed.to_string())
}

/// Validate an optional text field; blank input becomes `None`.
pub(crate) fn optional_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Option<String> {
    let trimmed = value.map(str::trim).filter(|s| !s.is_empty())?;
    if trimmed.chars().count() > max_len {
        errors.add(field, too_long(max_len));
        return None;
    }
    Some(trimmed.to_string())
}

/// Validate a password against the minimum length. Passwords are not trimmed.
pub(crate) fn password(errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
    match value {
        None => {
            errors.add("password", REQUIRED);
            None
        }
        Some("") => {
            errors.add("password", BLANK);
            None
        }
        Some(value) if value.chars().count() < PASSWORD_MIN_LEN => {
            errors.add(
                "password",
                format!("Ensure this field has at least {PASSWORD_MIN_LEN} characters."),
            );
            None
        }
        Some(value) => Some(value.to_string()),
    }
}

/// Lower-case the whole address.
pub(crate) fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Minimal `local@domain` shape check.
pub(crate) fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// Validate and normalize an email field.
pub(crate) fn email(errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
    let value = required_text(errors, "email", value, EMAIL_MAX_LEN)?;
    let normalized = normalize_email(&value);
    if !is_valid_email(&normalized) {
        errors.add("email", "Enter a valid email address.");
        return None;
    }
    Some(normalized)
}

/// A search keyword, case-folded with Unicode rules.
///
/// Both the keyword and every searched text go through `to_lowercase`, so
/// `É` matches `é`. `%`, `_` and `\` have no special meaning.
pub(crate) struct Keyword(String);

impl Keyword {
    /// `None` for a blank keyword.
    pub(crate) fn new(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (!raw.is_empty()).then(|| Self(raw.to_lowercase()))
    }

    pub(crate) fn found_in(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lower_cased() {
        let mut errors = ValidationErrors::new();
        let email = email(&mut errors, Some("JohnDoe@EMAIL.com"));
        assert_eq!(email.as_deref(), Some("johndoe@email.com"));
        assert!(errors.is_empty());
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("test@email.com"));
        assert!(!is_valid_email("one"));
        assert!(!is_valid_email("@email.com"));
        assert!(!is_valid_email("test@"));
        assert!(!is_valid_email("te st@email.com"));
        assert!(!is_valid_email("a@b@c"));
    }

    #[test]
    fn missing_and_blank_are_reported_differently() {
        let mut errors = ValidationErrors::new();
        assert_eq!(required_text(&mut errors, "name", None, 10), None);
        assert_eq!(required_text(&mut errors, "category", Some("   "), 10), None);

        assert_eq!(errors.field("name"), [REQUIRED.to_string()]);
        assert_eq!(errors.field("category"), [BLANK.to_string()]);
    }

    #[test]
    fn length_limits_count_chars() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            required_text(&mut errors, "flow", Some("ééééé"), 5).as_deref(),
            Some("ééééé")
        );
        assert_eq!(required_text(&mut errors, "flow", Some("abcdef"), 5), None);
        assert!(errors.contains("flow"));
    }

    #[test]
    fn optional_text_drops_blank() {
        let mut errors = ValidationErrors::new();
        assert_eq!(optional_text(&mut errors, "note", Some("  "), 500), None);
        assert_eq!(optional_text(&mut errors, "note", None, 500), None);
        assert_eq!(
            optional_text(&mut errors, "note", Some(" gas "), 500).as_deref(),
            Some("gas")
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn password_minimum_length() {
        let mut errors = ValidationErrors::new();
        assert_eq!(password(&mut errors, Some("p123")), None);
        assert!(errors.contains("password"));

        let mut errors = ValidationErrors::new();
        assert_eq!(password(&mut errors, Some("p1234")).as_deref(), Some("p1234"));
        assert!(errors.is_empty());
    }

    #[test]
    fn keyword_folds_case() {
        let keyword = Keyword::new("  ÉCLAIR ").unwrap();
        assert!(keyword.found_in("chocolate éclair"));
        assert!(keyword.found_in("Éclair"));
        assert!(!keyword.found_in("eclair"));

        let keyword = Keyword::new("ölwechsel").unwrap();
        assert!(keyword.found_in("ÖLWECHSEL"));
    }

    #[test]
    fn keyword_has_no_wildcards() {
        let keyword = Keyword::new("50%_off").unwrap();
        assert!(keyword.found_in("save 50%_OFF today"));
        assert!(!keyword.found_in("50 percent off"));
        assert!(Keyword::new("a\\b").unwrap().found_in("A\\B"));
        assert!(Keyword::new("   ").is_none());
    }
}
