use std::sync::Arc;

use serde::Serialize;

use super::person::Person;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub property_name: String,
    pub error_message: String,
}

impl ValidationFailure {
    pub fn new(property_name: &str, error_message: &str) -> Self {
        Self {
            property_name: property_name.to_string(),
            error_message: error_message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationFailure>,
}

impl ValidationResult {
    pub fn new(errors: Vec<ValidationFailure>) -> Self {
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[async_trait::async_trait]
pub trait PersonValidator: ValidatorClone + Send + Sync {
    async fn validate(&self, person: &Person) -> ValidationResult;
}

pub trait ValidatorClone {
    fn clone_box(&self) -> Box<dyn PersonValidator>;
}

impl<T> ValidatorClone for T
where
    T: 'static + PersonValidator + Clone,
{
    fn clone_box(&self) -> Box<dyn PersonValidator> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn PersonValidator> {
    fn clone(&self) -> Box<dyn PersonValidator> {
        self.clone_box()
    }
}

type Check = Box<dyn Fn(&Person, &str) -> Option<String> + Send + Sync>;

/// One predicate over one property. `check` gets the person and the
/// property's display name and returns the failure message, if any.
struct FieldRule {
    property_name: &'static str,
    display_name: String,
    check: Check,
}

impl FieldRule {
    fn new<F>(property_name: &'static str, check: F) -> Self
    where
        F: Fn(&Person, &str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            property_name,
            display_name: display_name(property_name),
            check: Box::new(check),
        }
    }

    fn apply(&self, person: &Person) -> Option<ValidationFailure> {
        (self.check)(person, &self.display_name).map(|message| ValidationFailure {
            property_name: self.property_name.to_string(),
            error_message: message,
        })
    }
}

/// Validates a [`Person`] against a fixed, ordered rule list. Every rule runs;
/// failures come back in rule order.
#[derive(Clone)]
pub struct PersonRulesValidator {
    rules: Arc<Vec<FieldRule>>,
}

impl PersonRulesValidator {
    pub fn new() -> Self {
        let rules = vec![
            FieldRule::new("FirstName", |p, name| {
                not_null(name, p.first_name.as_deref())
            }),
            FieldRule::new("FirstName", |p, name| {
                length(name, p.first_name.as_deref(), 1, 10)
            }),
            FieldRule::new("LastName", |p, name| not_null(name, p.last_name.as_deref())),
            FieldRule::new("LastName", |p, name| {
                length(name, p.last_name.as_deref(), 1, 10)
            }),
            FieldRule::new("Age", |p, name| inclusive_between(name, p.age, 0, 120)),
        ];
        Self {
            rules: Arc::new(rules),
        }
    }
}

impl Default for PersonRulesValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersonValidator for PersonRulesValidator {
    async fn validate(&self, person: &Person) -> ValidationResult {
        ValidationResult::new(
            self.rules
                .iter()
                .filter_map(|rule| rule.apply(person))
                .collect(),
        )
    }
}

fn not_null(name: &str, value: Option<&str>) -> Option<String> {
    match value {
        Some(_) => None,
        None => Some(format!("'{}' must not be empty.", name)),
    }
}

// A null value is left to the not-null rule. Length is measured in UTF-16
// code units, so a character outside the BMP counts twice.
fn length(name: &str, value: Option<&str>, min: usize, max: usize) -> Option<String> {
    let entered = value?.encode_utf16().count();
    if entered < min || entered > max {
        return Some(format!(
            "'{}' must be between {} and {} characters. You entered {} characters.",
            name, min, max, entered
        ));
    }
    None
}

fn inclusive_between(name: &str, value: i32, from: i32, to: i32) -> Option<String> {
    if value < from || value > to {
        return Some(format!(
            "'{}' must be between {} and {}. You entered {}.",
            name, from, to, value
        ));
    }
    None
}

/// "FirstName" -> "First Name"
fn display_name(property_name: &str) -> String {
    let mut display = String::with_capacity(property_name.len() + 4);
    for (i, c) in property_name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            display.push(' ');
        }
        display.push(c);
    }
    display
}
