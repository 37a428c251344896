// ── Email validation ──
//
// A deliberately small syntactic check: local-part@domain, dotted domain,
// no whitespace. Deliverability is not our concern.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const MAX_LOCAL_LEN: usize = 64;
const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// An address that passed [`validate`]. Always trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidEmail(String);

impl ValidEmail {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trim and validate a candidate address.
pub fn validate(candidate: &str) -> Result<ValidEmail, CoreError> {
    let trimmed = candidate.trim();
    let invalid = |reason: &str| CoreError::InvalidEmail {
        input: trimmed.to_owned(),
        reason: reason.to_owned(),
    };

    if trimmed.is_empty() {
        return Err(invalid("is blank"));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid("contains whitespace"));
    }

    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(invalid("missing '@'"));
    };
    if domain.contains('@') {
        return Err(invalid("contains more than one '@'"));
    }

    check_local(local).map_err(invalid)?;
    check_domain(domain).map_err(invalid)?;

    Ok(ValidEmail(trimmed.to_owned()))
}

fn check_local(local: &str) -> Result<(), &'static str> {
    if local.is_empty() {
        return Err("local part is empty");
    }
    if local.len() > MAX_LOCAL_LEN {
        return Err("local part is too long");
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err("local part has a misplaced '.'");
    }
    if local.chars().any(char::is_control) {
        return Err("local part contains control characters");
    }
    Ok(())
}

fn check_domain(domain: &str) -> Result<(), &'static str> {
    if domain.is_empty() {
        return Err("domain is empty");
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err("domain is too long");
    }
    if !domain.contains('.') {
        return Err("domain has no '.'");
    }

    let labels: Vec<&str> = domain.split('.').collect();
    for label in &labels {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err("domain has an empty or oversized label");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err("domain label starts or ends with '-'");
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("domain contains invalid characters");
        }
    }

    // Split on '.' always yields at least one element.
    if labels.last().is_some_and(|tld| tld.len() < 2) {
        return Err("top-level domain is too short");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_address() {
        assert_eq!(validate("a@b.co").unwrap().as_str(), "a@b.co");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            validate("  ops@example.org \n").unwrap().as_str(),
            "ops@example.org"
        );
    }

    #[test]
    fn accepts_plus_tags_and_subdomains() {
        assert!(validate("first.last+wp@mail.example.co.uk").is_ok());
    }

    #[test]
    fn rejects_blank_and_whitespace_only() {
        assert!(validate("").is_err());
        assert!(validate(" ").is_err());
        assert!(validate("\t\n").is_err());
    }

    #[test]
    fn rejects_missing_at_or_domain_dot() {
        assert!(validate("nodomain").is_err());
        assert!(validate("user@localhost").is_err());
        assert!(validate("@example.com").is_err());
        assert!(validate("user@").is_err());
    }

    #[test]
    fn rejects_embedded_whitespace_and_double_at() {
        assert!(validate("us er@example.com").is_err());
        assert!(validate("a@b@example.com").is_err());
    }

    #[test]
    fn rejects_malformed_domains() {
        assert!(validate("a@example..com").is_err());
        assert!(validate("a@-example.com").is_err());
        assert!(validate("a@example.c").is_err());
        assert!(validate("a@exa_mple.com").is_err());
    }

    #[test]
    fn error_carries_reason() {
        let err = validate("nodomain").unwrap_err();
        assert_eq!(err.to_string(), "Invalid email 'nodomain': missing '@'");
    }
}
