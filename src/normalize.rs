//! Identifier and phone normalization.
//!
//! Identifiers are compared by exact string equality after trimming; no case folding,
//! no partial match. Phones are reduced to their digits for display.

/// Shown when a customer has no phone on record.
pub const PHONE_NOT_REGISTERED: &str = "No registrado";

/// Suffix left behind when a phone number was stored as a float.
const FLOAT_ARTIFACT: &str = ".0";

/// Normalize a raw identifier (query or cell) for exact matching.
pub fn normalize_identifier(raw: &str) -> &str {
    raw.trim()
}

/// Normalize a raw phone cell into its digits-only display form.
///
/// - absent → [`PHONE_NOT_REGISTERED`]
/// - a trailing `.0` is dropped, then every non-digit character is removed
///
/// A value with no digits at all yields an empty string, not the sentinel.
pub fn normalize_phone(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return PHONE_NOT_REGISTERED.to_string();
    };

    let without_artifact = raw.strip_suffix(FLOAT_ARTIFACT).unwrap_or(raw);
    let digits: String = without_artifact
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() && !raw.is_empty() {
        tracing::debug!("Phone value has no digits: {:?}", raw);
    }

    digits
}
