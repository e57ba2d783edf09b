//! Named string formats.
//!
//! A [`StringValue`](crate::StringValue) may carry one `test`. The patterns are
//! fixed so that exported schemas mean the same thing to every consumer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
static PASSWORD_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
static IP_REGEX: OnceLock<Regex> = OnceLock::new();
static PATH_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn username_regex() -> &'static Regex {
    USERNAME_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]{3,16}$").unwrap())
}

// `regex` has no lookahead, so the lower/upper/digit requirements are checked
// separately in `is_strong_password`. Digits are ASCII-only on purpose.
fn password_regex() -> &'static Regex {
    PASSWORD_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]{8,}$").unwrap())
}

fn phone_regex() -> &'static Regex {
    PHONE_REGEX.get_or_init(|| Regex::new(r"^[0-9]{10}$").unwrap())
}

fn ip_regex() -> &'static Regex {
    IP_REGEX.get_or_init(|| {
        Regex::new(r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)(\.|$)){4}$").unwrap()
    })
}

fn path_regex() -> &'static Regex {
    PATH_REGEX.get_or_init(|| Regex::new(r"^/(?:[a-zA-Z0-9_]+/)?[a-zA-Z0-9_]*$").unwrap())
}

fn is_strong_password(value: &str) -> bool {
    password_regex().is_match(value)
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
}

/// Returns `true` if `value` parses as an absolute URL whose normalized form is
/// exactly `value`.
///
/// `https://example.com` is rejected because it normalizes to
/// `https://example.com/`.
pub fn is_absolute_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| url.as_str() == value)
        .unwrap_or(false)
}

/// Semantic format a string must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StringTest {
    /// `local@domain.tld`
    Email,
    /// 3 to 16 letters, digits or underscores
    Username,
    /// 8+ alphanumerics with at least one lower case, upper case and digit
    PasswordStrength,
    /// Exactly 10 digits
    PhoneNumber,
    /// Dotted-quad IPv4 address
    IpAddress,
    /// Absolute, already-normalized URL
    Url,
    /// `/`, `/segment` or `/segment/segment`
    Path,
}

impl StringTest {
    /// All tests, in declaration order.
    pub const ALL: [StringTest; 7] = [
        StringTest::Email,
        StringTest::Username,
        StringTest::PasswordStrength,
        StringTest::PhoneNumber,
        StringTest::IpAddress,
        StringTest::Url,
        StringTest::Path,
    ];

    /// Wire name of the test.
    pub fn as_str(&self) -> &'static str {
        match self {
            StringTest::Email => "email",
            StringTest::Username => "username",
            StringTest::PasswordStrength => "passwordStrength",
            StringTest::PhoneNumber => "phoneNumber",
            StringTest::IpAddress => "ipAddress",
            StringTest::Url => "url",
            StringTest::Path => "path",
        }
    }

    /// Check `value` against this format.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            StringTest::Email => email_regex().is_match(value),
            StringTest::Username => username_regex().is_match(value),
            StringTest::PasswordStrength => is_strong_password(value),
            StringTest::PhoneNumber => phone_regex().is_match(value),
            StringTest::IpAddress => ip_regex().is_match(value),
            StringTest::Url => is_absolute_url(value),
            StringTest::Path => path_regex().is_match(value),
        }
    }

    /// Rule phrase used in failure messages.
    pub(crate) fn rule(&self) -> &'static str {
        match self {
            StringTest::Email => "must be a valid email address",
            StringTest::Username => "must be a valid username",
            StringTest::PasswordStrength => "must be a strong password",
            StringTest::PhoneNumber => "must be a valid phone number",
            StringTest::IpAddress => "must be a valid IP address",
            StringTest::Url => "must be a valid URL",
            StringTest::Path => "must be a valid path",
        }
    }
}

impl fmt::Display for StringTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown test name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown string test \"{0}\"")]
pub struct UnknownStringTest(pub String);

impl FromStr for StringTest {
    type Err = UnknownStringTest;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StringTest::ALL
            .into_iter()
            .find(|test| test.as_str() == s)
            .ok_or_else(|| UnknownStringTest(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email() {
        assert!(StringTest::Email.matches("a@b.com"));
        assert!(StringTest::Email.matches("first.last+tag@example.co.uk"));
        assert!(!StringTest::Email.matches("not-an-email"));
        assert!(!StringTest::Email.matches("a b@c.com"));
        assert!(!StringTest::Email.matches("a@bcom"));
    }

    #[test]
    fn username() {
        assert!(StringTest::Username.matches("al_1"));
        assert!(!StringTest::Username.matches("al"));
        assert!(!StringTest::Username.matches("seventeen_chars_x"));
        assert!(!StringTest::Username.matches("bad-name"));
    }

    #[test]
    fn password_strength() {
        assert!(StringTest::PasswordStrength.matches("Passw0rdX"));
        assert!(!StringTest::PasswordStrength.matches("password1"));
        assert!(!StringTest::PasswordStrength.matches("PASSWORD1"));
        assert!(!StringTest::PasswordStrength.matches("Password"));
        assert!(!StringTest::PasswordStrength.matches("Pa55w0rd!"));
        assert!(!StringTest::PasswordStrength.matches("Pw0rd"));
    }

    #[test]
    fn phone_number() {
        assert!(StringTest::PhoneNumber.matches("0123456789"));
        assert!(!StringTest::PhoneNumber.matches("012345678"));
        assert!(!StringTest::PhoneNumber.matches("012-345-6789"));
        // Arabic-Indic digits are not phone digits
        assert!(!StringTest::PhoneNumber.matches("٠١٢٣٤٥٦٧٨٩"));
    }

    #[test]
    fn ip_address() {
        assert!(StringTest::IpAddress.matches("192.168.0.1"));
        assert!(StringTest::IpAddress.matches("255.255.255.255"));
        assert!(!StringTest::IpAddress.matches("256.1.1.1"));
        assert!(!StringTest::IpAddress.matches("1.2.3"));
    }

    #[test]
    fn url() {
        assert!(StringTest::Url.matches("https://example.com/"));
        assert!(StringTest::Url.matches("https://example.com/a?b=c"));
        assert!(!StringTest::Url.matches("https://example.com"));
        assert!(!StringTest::Url.matches("/relative/path"));
        assert!(!StringTest::Url.matches("HTTPS://example.com/"));
    }

    #[test]
    fn path() {
        assert!(StringTest::Path.matches("/"));
        assert!(StringTest::Path.matches("/users"));
        assert!(StringTest::Path.matches("/api/v1"));
        assert!(StringTest::Path.matches("/api/"));
        assert!(!StringTest::Path.matches("users"));
        assert!(!StringTest::Path.matches("/a/b/c"));
        assert!(!StringTest::Path.matches("/users/{id}"));
    }

    #[test]
    fn parses_wire_names() {
        for test in StringTest::ALL {
            assert_eq!(test.as_str().parse::<StringTest>(), Ok(test));
            let json = serde_json::to_string(&test).unwrap();
            assert_eq!(json, format!("\"{}\"", test.as_str()));
        }
        assert_eq!(
            "zip".parse::<StringTest>(),
            Err(UnknownStringTest("zip".to_string()))
        );
    }
}
