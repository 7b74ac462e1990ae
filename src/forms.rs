//! # Form Input and Validation
//!
//! Each HTML form has a struct that is deserialized from the urlencoded body
//! and carries its own `Validator`. After validation the whole struct is
//! handed back to the template so the user's input and the error messages
//! can be re-rendered.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is a valid regex")
});

/// Snippet lifetimes offered by the create form, in days
pub const PERMITTED_EXPIRY_DAYS: [i64; 3] = [1, 7, 365];

/// Collected validation errors for one form
#[derive(Debug, Default, Clone, Serialize)]
pub struct Validator {
    pub non_field_errors: Vec<String>,
    pub field_errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn valid(&self) -> bool {
        self.non_field_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_string());
    }

    /// Record an error for `key`; the first error per field is kept
    pub fn add_field_error(&mut self, key: &str, message: &str) {
        self.field_errors
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn check_field(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_field_error(key, message);
        }
    }
}

pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

pub fn permitted<T: PartialEq>(value: &T, allowed: &[T]) -> bool {
    allowed.contains(value)
}

pub fn is_email(value: &str) -> bool {
    EMAIL_RX.is_match(value)
}

const BLANK: &str = "This field cannot be blank";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SnippetCreateForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub expires: i64,
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl SnippetCreateForm {
    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", BLANK);
        v.check_field(
            max_chars(&self.title, 100),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(not_blank(&self.content), "content", BLANK);
        v.check_field(
            permitted(&self.expires, &PERMITTED_EXPIRY_DAYS),
            "expires",
            "This field must equal 1, 7 or 365",
        );
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserSignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl UserSignupForm {
    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.name), "name", BLANK);
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(is_email(&self.email), "email", "This field must be a valid email address");
        v.check_field(not_blank(&self.password), "password", BLANK);
        v.check_field(
            min_chars(&self.password, 8),
            "password",
            "This field must be at least 8 characters long",
        );
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserLoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl UserLoginForm {
    pub fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(is_email(&self.email), "email", "This field must be a valid email address");
        v.check_field(not_blank(&self.password), "password", BLANK);
    }
}
