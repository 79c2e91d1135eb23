//! Column validators.
//!
//! Validators run at save time. A blank value on a column without
//! [`Validator::NotBlank`] skips the column entirely; see
//! [`Record::validate`](crate::Record::validate) for the full pipeline.

use std::sync::OnceLock;

use regex::Regex;

use fluidbean_engine::Value;

/// A save-time check on a column value.
#[derive(Clone)]
pub enum Validator {
    /// The value must not be null, empty, or whitespace-only.
    NotBlank,
    /// The value must look like an e-mail address.
    Email,
    /// A caller-supplied predicate with a name for error messages.
    Custom {
        name: &'static str,
        func: fn(&Value) -> bool,
    },
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("static email pattern")
    })
}

impl Validator {
    pub fn name(&self) -> &str {
        match self {
            Validator::NotBlank => "notblank",
            Validator::Email => "email",
            Validator::Custom { name, .. } => name,
        }
    }

    /// Check a value. `NotBlank` is handled separately in the pipeline and
    /// reports the blankness of the value here.
    pub fn check(&self, value: &Value) -> bool {
        match self {
            Validator::NotBlank => !value.is_blank(),
            Validator::Email => value
                .as_str()
                .is_some_and(|s| email_regex().is_match(s)),
            Validator::Custom { func, .. } => func(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notblank() {
        assert!(!Validator::NotBlank.check(&Value::Null));
        assert!(!Validator::NotBlank.check(&Value::from("  ")));
        assert!(Validator::NotBlank.check(&Value::from("x")));
        assert!(Validator::NotBlank.check(&Value::Int(0)));
    }

    #[test]
    fn test_email() {
        assert!(Validator::Email.check(&Value::from("ada@example.org")));
        assert!(Validator::Email.check(&Value::from("Ada.Lovelace+tag@Example.co.uk")));
        assert!(!Validator::Email.check(&Value::from("not-an-email")));
        assert!(!Validator::Email.check(&Value::from("a@b")));
        assert!(!Validator::Email.check(&Value::Int(5)));
    }

    #[test]
    fn test_custom() {
        fn positive(v: &Value) -> bool {
            v.as_i64().is_some_and(|i| i > 0)
        }
        let v = Validator::Custom {
            name: "positive",
            func: positive,
        };
        assert_eq!(v.name(), "positive");
        assert!(v.check(&Value::Int(3)));
        assert!(!v.check(&Value::Int(-3)));
    }
}
