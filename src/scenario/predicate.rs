//! Field-path predicates over the target's JSON response
//!
//! Fields are addressed with JSON pointers (`/data/path`). A pointer that
//! resolves to nothing fails every check, including `not_equals`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

/// A single typed check against one field of the response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCheck {
    /// Field equals the given JSON value
    Equals { pointer: String, value: Value },
    /// Field exists and differs from the given JSON value
    NotEquals { pointer: String, value: Value },
    /// Field exists (any value, including null)
    Exists(String),
    /// Field is a string containing `substring`
    Contains { pointer: String, substring: String },
    /// Field is a string naming the path built by joining `segments`
    PathEquals {
        pointer: String,
        segments: Vec<PathBuf>,
    },
}

impl FieldCheck {
    pub fn equals(pointer: &str, value: impl Into<Value>) -> Self {
        Self::Equals {
            pointer: pointer.to_string(),
            value: value.into(),
        }
    }

    pub fn not_equals(pointer: &str, value: impl Into<Value>) -> Self {
        Self::NotEquals {
            pointer: pointer.to_string(),
            value: value.into(),
        }
    }

    pub fn exists(pointer: &str) -> Self {
        Self::Exists(pointer.to_string())
    }

    pub fn path_equals<I, P>(pointer: &str, segments: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::PathEquals {
            pointer: pointer.to_string(),
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The JSON pointer this check reads
    pub fn pointer(&self) -> &str {
        match self {
            Self::Equals { pointer, .. }
            | Self::NotEquals { pointer, .. }
            | Self::Contains { pointer, .. }
            | Self::PathEquals { pointer, .. } => pointer,
            Self::Exists(pointer) => pointer,
        }
    }

    /// Reject pointers `serde_json` could never resolve
    pub fn validate(&self) -> std::result::Result<(), String> {
        let pointer = self.pointer();
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(format!(
                "pointer '{pointer}' must be empty or start with '/'"
            ));
        }
        if let Self::PathEquals { segments, .. } = self {
            if segments.is_empty() {
                return Err(format!("path_equals on '{pointer}' needs at least one segment"));
            }
        }
        Ok(())
    }

    /// Check the response, explaining the mismatch on failure
    pub fn check(&self, response: &Value) -> std::result::Result<(), String> {
        let pointer = self.pointer();
        let actual = response
            .pointer(pointer)
            .ok_or_else(|| format!("field '{pointer}' is missing"))?;

        match self {
            Self::Equals { value, .. } => {
                if values_equal(actual, value) {
                    Ok(())
                } else {
                    Err(format!("field '{pointer}': expected {value}, got {actual}"))
                }
            }
            Self::NotEquals { value, .. } => {
                if values_equal(actual, value) {
                    Err(format!("field '{pointer}': expected anything but {value}"))
                } else {
                    Ok(())
                }
            }
            Self::Exists(_) => Ok(()),
            Self::Contains { substring, .. } => match actual.as_str() {
                Some(text) if text.contains(substring.as_str()) => Ok(()),
                Some(text) => Err(format!(
                    "field '{pointer}': '{text}' does not contain '{substring}'"
                )),
                None => Err(format!("field '{pointer}': expected a string, got {actual}")),
            },
            Self::PathEquals { segments, .. } => {
                let expected: PathBuf = segments.iter().collect();
                match actual.as_str() {
                    Some(text) if Path::new(text) == expected => Ok(()),
                    Some(text) => Err(format!(
                        "field '{pointer}': expected path '{}', got '{text}'",
                        expected.display()
                    )),
                    None => Err(format!("field '{pointer}': expected a path, got {actual}")),
                }
            }
        }
    }
}

/// Numbers compare by value, so `-1` and `-1.0` are equal
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                a == b
            } else if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                a == b
            } else {
                a.as_f64() == b.as_f64()
            }
        }
        _ => actual == expected,
    }
}

type CustomFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Success condition of a scenario
#[derive(Clone)]
pub enum Predicate {
    Check(FieldCheck),
    /// Every inner predicate holds
    All(Vec<Predicate>),
    /// Arbitrary test on the parsed response
    Custom { description: String, test: CustomFn },
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check(check) => f.debug_tuple("Check").field(check).finish(),
            Self::All(inner) => f.debug_tuple("All").field(inner).finish(),
            Self::Custom { description, .. } => {
                f.debug_struct("Custom").field("description", description).finish()
            }
        }
    }
}

impl From<FieldCheck> for Predicate {
    fn from(check: FieldCheck) -> Self {
        Self::Check(check)
    }
}

impl Predicate {
    /// Conjunction of field checks
    pub fn all(checks: impl IntoIterator<Item = FieldCheck>) -> Self {
        Self::All(checks.into_iter().map(Self::Check).collect())
    }

    /// Predicate backed by a closure
    pub fn custom<F>(description: &str, test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Custom {
            description: description.to_string(),
            test: Arc::new(test),
        }
    }

    /// Combine with another predicate
    pub fn and(self, other: impl Into<Predicate>) -> Self {
        match self {
            Self::All(mut inner) => {
                inner.push(other.into());
                Self::All(inner)
            }
            single => Self::All(vec![single, other.into()]),
        }
    }

    /// Check a parsed response, returning the first mismatch
    pub fn check(&self, response: &Value) -> std::result::Result<(), String> {
        match self {
            Self::Check(check) => check.check(response),
            Self::All(inner) => inner.iter().try_for_each(|p| p.check(response)),
            Self::Custom { description, test } => {
                if test(response) {
                    Ok(())
                } else {
                    Err(format!("condition not met: {description}"))
                }
            }
        }
    }

    pub fn evaluate(&self, response: &Value) -> bool {
        self.check(response).is_ok()
    }

    /// Evaluate against raw captured stdout
    ///
    /// Output that does not parse as JSON is a failed verdict.
    pub fn evaluate_output(&self, raw: &str) -> Verdict {
        match serde_json::from_str::<Value>(raw) {
            Ok(response) => match self.check(&response) {
                Ok(()) => Verdict::pass(),
                Err(reason) => Verdict::fail(reason),
            },
            Err(e) => Verdict::fail(format!("output is not valid JSON: {e}")),
        }
    }
}

/// Boolean verdict with the reason it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_predicate() -> Predicate {
        Predicate::all([
            FieldCheck::equals("/status", 0),
            FieldCheck::path_equals("/data/path", ["/tmp", "CLI_Regression_DB"]),
        ])
    }

    #[test]
    fn test_successful_create_response() {
        let verdict = create_predicate()
            .evaluate_output(r#"{"status":0,"data":{"path":"/tmp/CLI_Regression_DB"}}"#);
        assert_eq!(verdict, Verdict::pass());
    }

    #[test]
    fn test_failed_status() {
        let verdict = create_predicate().evaluate_output(
            r#"{"status":-1,"error":{"cause":"Library error: Directory already exists"}}"#,
        );
        assert!(!verdict.passed);
        assert!(verdict.reason.unwrap().contains("/status"));
    }

    #[test]
    fn test_wrong_path_with_success_status() {
        let verdict = create_predicate()
            .evaluate_output(r#"{"status":0,"data":{"path":"/var/tmp/CLI_Regression_DB"}}"#);
        assert!(!verdict.passed);
    }

    #[test]
    fn test_malformed_output_is_false() {
        for raw in ["", "not json", "{\"status\":0", "Created an empty database"] {
            let verdict = create_predicate().evaluate_output(raw);
            assert!(!verdict.passed, "accepted {raw:?}");
            assert!(verdict.reason.unwrap().contains("not valid JSON"));
        }
    }

    #[test]
    fn test_missing_field_fails_every_check() {
        let response = json!({ "status": 0 });
        let checks = [
            FieldCheck::equals("/data/path", "x"),
            FieldCheck::not_equals("/data/path", "x"),
            FieldCheck::exists("/data/path"),
            FieldCheck::Contains {
                pointer: "/data/path".to_string(),
                substring: "x".to_string(),
            },
            FieldCheck::path_equals("/data/path", ["/tmp"]),
        ];
        for check in checks {
            let err = check.check(&response).unwrap_err();
            assert!(err.contains("missing"), "{check:?}: {err}");
        }
    }

    #[test]
    fn test_non_object_response_is_false() {
        assert!(!create_predicate().evaluate_output("[0]").passed);
        assert!(!create_predicate().evaluate_output("0").passed);
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let response = json!({ "status": -1 });
        assert!(FieldCheck::equals("/status", -1i64).check(&response).is_ok());
        assert!(FieldCheck::not_equals("/status", 0).check(&response).is_ok());
        assert!(FieldCheck::equals("/status", 0).check(&response).is_err());
        assert!(FieldCheck::equals("/status", json!(-1.0)).check(&response).is_ok());
    }

    #[test]
    fn test_path_equals_ignores_redundant_separators() {
        let response = json!({ "data": { "path": "/tmp//CLI_Regression_DB" } });
        let check = FieldCheck::path_equals("/data/path", ["/tmp/", "CLI_Regression_DB"]);
        assert!(check.check(&response).is_ok());
    }

    #[test]
    fn test_path_equals_requires_string() {
        let response = json!({ "data": { "path": 42 } });
        let check = FieldCheck::path_equals("/data/path", ["/tmp"]);
        assert!(check.check(&response).is_err());
    }

    #[test]
    fn test_contains() {
        let response = json!({ "error": { "cause": "Library error: Directory already exists" } });
        let check = FieldCheck::Contains {
            pointer: "/error/cause".to_string(),
            substring: "already exists".to_string(),
        };
        assert!(check.check(&response).is_ok());
    }

    #[test]
    fn test_custom_and_combination() {
        let predicate = Predicate::from(FieldCheck::equals("/status", 0)).and(Predicate::custom(
            "data is an object",
            |v| v["data"].is_object(),
        ));

        assert!(predicate.evaluate(&json!({ "status": 0, "data": {} })));

        let err = predicate.check(&json!({ "status": 0 })).unwrap_err();
        assert_eq!(err, "condition not met: data is an object");
    }

    #[test]
    fn test_validate_pointer_syntax() {
        assert!(FieldCheck::exists("/status").validate().is_ok());
        assert!(FieldCheck::exists("").validate().is_ok());
        assert!(FieldCheck::exists("status").validate().is_err());
        assert!(FieldCheck::path_equals("/data/path", Vec::<PathBuf>::new())
            .validate()
            .is_err());
    }
}
