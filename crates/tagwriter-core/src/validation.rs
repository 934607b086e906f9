//! # Validation Module
//!
//! Input validation for scan payloads and tag records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI                                                            │
//! │  ├── Disables "Write" until name and URL are filled in                  │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Scan payloads: must be an http/https URL                           │
//! │  ├── New tags: name, URL, password normalisation                        │
//! │  └── Edited records: lock/security invariants                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Inventory (tier checks before every mutation)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tagwriter_core::validation::validate_scan_payload;
//!
//! assert!(validate_scan_payload("https://example.com/menu").is_ok());
//! assert!(validate_scan_payload("WIFI:S:cafe;T:WPA;P:secret;;").is_err());
//! ```

use url::Url;

use crate::error::ValidationError;
use crate::types::{NewTag, SecurityLevel, TagRecord};
use crate::MAX_TAG_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// URL Validators
// =============================================================================

/// Parses `input` and accepts it only when the scheme is http or https.
fn parse_web_url(field: &str, input: &str) -> ValidationResult<Url> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::required(field));
    }

    let url = Url::parse(input).map_err(|e| ValidationError::invalid_format(field, e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::invalid_format(
            field,
            format!("scheme '{}' is not http or https", other),
        )),
    }
}

/// Validates a decoded QR payload.
///
/// ## Returns
/// The trimmed payload exactly as scanned. It is not re-serialised through
/// [`Url`], so the tag receives the same bytes the code carried.
pub fn validate_scan_payload(payload: &str) -> ValidationResult<String> {
    parse_web_url("payload", payload)?;
    Ok(payload.trim().to_string())
}

/// Validates a tag's target URL.
pub fn validate_tag_url(url: &str) -> ValidationResult<()> {
    parse_web_url("url", url).map(|_| ())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a tag display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most MAX_TAG_NAME_LEN characters
pub fn validate_tag_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_TAG_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_TAG_NAME_LEN,
        });
    }

    Ok(())
}

/// An empty or whitespace-only password means "no password".
pub fn normalize_password(password: Option<String>) -> Option<String> {
    password.filter(|p| !p.trim().is_empty())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates and normalises a creation request.
pub fn validate_new_tag(mut draft: NewTag) -> ValidationResult<NewTag> {
    validate_tag_name(&draft.name)?;
    validate_tag_url(&draft.url)?;

    draft.name = draft.name.trim().to_string();
    draft.url = draft.url.trim().to_string();
    draft.password = normalize_password(draft.password);

    Ok(draft)
}

/// Checks an edited record before it replaces the stored one.
pub fn validate_record(record: &TagRecord) -> ValidationResult<()> {
    validate_tag_name(&record.name)?;
    validate_tag_url(&record.url)?;

    if record.is_locked && !record.security_level.permits_lock() {
        return Err(ValidationError::Inconsistent {
            reason: format!(
                "locked tag cannot have security level {:?}",
                record.security_level
            ),
        });
    }

    if record.security_level == SecurityLevel::PasswordProtected && record.password.is_none() {
        return Err(ValidationError::Inconsistent {
            reason: "password-protected tag has no password".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TagType;
    use chrono::Utc;

    #[test]
    fn test_scan_payload_accepts_web_urls() {
        assert_eq!(
            validate_scan_payload("  https://example.com/a?b=c ").unwrap(),
            "https://example.com/a?b=c"
        );
        assert!(validate_scan_payload("http://example.com").is_ok());
        assert!(validate_scan_payload("HTTPS://EXAMPLE.COM").is_ok());
    }

    #[test]
    fn test_scan_payload_rejects_other_content() {
        for payload in [
            "",
            "hello world",
            "ftp://example.com/file",
            "mailto:someone@example.com",
            "tel:+15551234567",
            "WIFI:S:cafe;T:WPA;P:secret;;",
            "http://",
        ] {
            assert!(validate_scan_payload(payload).is_err(), "accepted {payload:?}");
        }
    }

    #[test]
    fn test_tag_name_rules() {
        assert!(validate_tag_name("Front Desk").is_ok());
        assert_eq!(
            validate_tag_name("   "),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );
        assert!(validate_tag_name(&"x".repeat(MAX_TAG_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_new_tag_normalisation() {
        let draft = NewTag::new("  Card ", " https://x.com ", TagType::Ntag213).password("  ");
        let draft = validate_new_tag(draft).unwrap();
        assert_eq!(draft.name, "Card");
        assert_eq!(draft.url, "https://x.com");
        assert_eq!(draft.password, None);
    }

    #[test]
    fn test_record_invariants() {
        let draft = NewTag::new("Card", "https://x.com", TagType::Ntag213);
        let mut record = TagRecord::from_new(draft, "id".to_string(), Utc::now());
        assert!(validate_record(&record).is_ok());

        record.is_locked = true;
        assert!(matches!(
            validate_record(&record),
            Err(ValidationError::Inconsistent { .. })
        ));

        record.security_level = SecurityLevel::PasswordProtected;
        assert!(validate_record(&record).is_err());

        record.password = Some("1234".to_string());
        assert!(validate_record(&record).is_ok());
    }
}
