// Validation utilities for request fields

use serde::Deserialize;
use validator::ValidationErrors;

/// Trim an optional field; blank becomes `None`
pub fn trim_optional_field(field: Option<&String>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Map a PATCH-style field onto a nullable column update.
/// Absent stays untouched, blank clears, anything else is trimmed and set.
pub fn clearable(field: Option<String>) -> Option<Option<String>> {
    field.map(|s| trim_optional_field(Some(&s)))
}

/// serde `deserialize_with` for nullable columns in update bodies.
/// Pair with `#[serde(default)]`: absent stays `None`, `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `validator` hook: accept only absolute http(s) URLs
pub fn validate_http_url(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    match url::Url::parse(value.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(())
        },
        _ => {
            let mut err = validator::ValidationError::new("url");
            err.message = Some("Must be an http(s) URL".into());
            Err(err)
        },
    }
}

/// Flatten validator output into "field: message" pairs
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_trim_fields() {
        assert_eq!(trim_optional_field(Some(&"  x ".to_string())), Some("x".to_string()));
        assert_eq!(trim_optional_field(Some(&" ".to_string())), None);
    }

    #[test]
    fn test_clearable() {
        assert_eq!(clearable(None), None);
        assert_eq!(clearable(Some("".into())), Some(None));
        assert_eq!(clearable(Some(" Berlin ".into())), Some(Some("Berlin".into())));
    }

    #[test]
    fn test_http_url() {
        assert!(validate_http_url("https://example.com/logo.png").is_ok());
        assert!(validate_http_url("ftp://example.com").is_err());
        assert!(validate_http_url("not a url").is_err());
    }

    #[test]
    fn test_describe_validation_errors() {
        let probe = Probe {
            name: "ab".into(),
            email: "nope".into(),
        };
        let errors = probe.validate().unwrap_err();
        let text = describe_validation_errors(&errors);
        assert!(text.contains("name: too short"));
        assert!(text.contains("email: email"));
    }
}
