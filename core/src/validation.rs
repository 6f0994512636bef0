//! Validation rules for person records.
//!
//! Every field carries an ordered list of named [`Rule`]s. A field reports at
//! most one [`Violation`]: the first rule it fails. All fields are checked, so
//! a single [`ValidationError`] can name several fields at once.
//!
//! [`Rule::Unique`] cannot be decided from the draft alone. [`RuleSet::check`]
//! skips it and stores enforce it at write time, reporting the failure with
//! [`ValidationError::unique`] so callers see one error shape for every rule.
//!
//! # Example
//!
//! ```
//! use phonebook_core::person::PersonDraft;
//! use phonebook_core::validation::{Field, Rule, RuleSet};
//!
//! let err = RuleSet::person()
//!     .check(&PersonDraft::new("Ada Lovelace", "abcdefgh"))
//!     .unwrap_err();
//!
//! let violation = &err.violations()[0];
//! assert_eq!(violation.field, Field::Number);
//! assert_eq!(violation.rule, Rule::PhoneNumber);
//! ```

use crate::person::PersonDraft;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Minimum name length, in characters.
pub const NAME_MIN_LENGTH: usize = 3;

/// Minimum number length, in characters.
pub const NUMBER_MIN_LENGTH: usize = 8;

/// At least eight digits, optionally separated by `.`, `,`, `/`, `-` or space.
#[allow(clippy::expect_used)] // Constant pattern, covered by tests
static PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[.,/\- ]*[0-9]){8,}[.,/\- ]*$").expect("phone number pattern is valid")
});

static PERSON_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new()
        .field(
            Field::Name,
            vec![Rule::Required, Rule::MinLength(NAME_MIN_LENGTH), Rule::Unique],
        )
        .field(
            Field::Number,
            vec![
                Rule::Required,
                Rule::MinLength(NUMBER_MIN_LENGTH),
                Rule::PhoneNumber,
                Rule::Unique,
            ],
        )
});

/// A validated field of [`PersonDraft`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// `name`
    Name,
    /// `number`
    Number,
}

impl Field {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Number => "number",
        }
    }

    /// Reads this field's value out of a draft.
    #[must_use]
    pub fn value<'a>(&self, draft: &'a PersonDraft) -> &'a str {
        match self {
            Self::Name => &draft.name,
            Self::Number => &draft.number,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named constraint on a single field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Value must be present and non-empty.
    Required,
    /// Value must have at least this many characters.
    MinLength(usize),
    /// Value must look like a phone number.
    PhoneNumber,
    /// No other person may hold the same value. Enforced by the store.
    Unique,
}

impl Rule {
    /// Short rule name, stable for logs and clients.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength(_) => "minlength",
            Self::PhoneNumber => "pattern",
            Self::Unique => "unique",
        }
    }

    /// Evaluates the rule against a value.
    ///
    /// Returns `None` for [`Rule::Unique`], which needs the store to decide.
    #[must_use]
    pub fn accepts(&self, value: &str) -> Option<bool> {
        match self {
            Self::Required => Some(!value.is_empty()),
            Self::MinLength(min) => Some(value.chars().count() >= *min),
            Self::PhoneNumber => Some(PHONE_NUMBER.is_match(value)),
            Self::Unique => None,
        }
    }
}

/// One failed rule on one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Field that failed
    pub field: Field,
    /// Rule it failed
    pub rule: Rule,
    /// Offending value
    pub value: String,
}

impl Violation {
    /// Human-readable reason, without the field prefix.
    #[must_use]
    pub fn reason(&self) -> String {
        match self.rule {
            Rule::Required => format!("`{}` is required", self.field),
            Rule::MinLength(min) => format!(
                "`{}` is shorter than the minimum allowed length ({min})",
                self.value
            ),
            Rule::PhoneNumber => format!("`{}` is not a valid phone number", self.value),
            Rule::Unique => format!(
                "`{}` is already taken, expected `{}` to be unique",
                self.value, self.field
            ),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason())
    }
}

/// A draft failed one or more rules.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Person validation failed: {}", join(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Wraps a list of violations.
    #[must_use]
    pub const fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// A uniqueness failure reported by a store.
    #[must_use]
    pub fn unique(field: Field, value: impl Into<String>) -> Self {
        Self::new(vec![Violation {
            field,
            rule: Rule::Unique,
            value: value.into(),
        }])
    }

    /// All violations, in field order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns `true` if `field` failed `rule`.
    #[must_use]
    pub fn has(&self, field: Field, rule: Rule) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.rule == rule)
    }
}

/// Ordered rules per field.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    fields: Vec<(Field, Vec<Rule>)>,
}

impl RuleSet {
    /// An empty rule set.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds the rules for one field.
    #[must_use]
    pub fn field(mut self, field: Field, rules: Vec<Rule>) -> Self {
        self.fields.push((field, rules));
        self
    }

    /// The rules every persisted person must satisfy.
    #[must_use]
    pub fn person() -> &'static Self {
        &PERSON_RULES
    }

    /// Rules declared for `field`.
    #[must_use]
    pub fn rules(&self, field: Field) -> &[Rule] {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map_or(&[], |(_, rules)| rules.as_slice())
    }

    /// Fields whose uniqueness the store must enforce.
    pub fn unique_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields
            .iter()
            .filter(|(_, rules)| rules.contains(&Rule::Unique))
            .map(|(field, _)| *field)
    }

    /// Checks every field-local rule against `draft`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing the first failed rule of every
    /// field that failed one.
    pub fn check(&self, draft: &PersonDraft) -> Result<(), ValidationError> {
        let violations: Vec<Violation> = self
            .fields
            .iter()
            .filter_map(|(field, rules)| {
                let value = field.value(draft);
                rules
                    .iter()
                    .find(|rule| rule.accepts(value) == Some(false))
                    .map(|rule| Violation {
                        field: *field,
                        rule: *rule,
                        value: value.to_string(),
                    })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn check(name: &str, number: &str) -> Result<(), ValidationError> {
        RuleSet::person().check(&PersonDraft::new(name, number))
    }

    #[test]
    fn accepts_valid_drafts() {
        assert!(check("Ada Lovelace", "12-34-56789").is_ok());
        assert!(check("Ada L.", "090-1234567").is_ok());
        assert!(check("Bob", "040 123 4567").is_ok());
        assert!(check("Dan", "1.2.3.4.5.6.7.8").is_ok());
    }

    #[test]
    fn missing_values_report_required() {
        let err = check("", "").unwrap_err();
        assert!(err.has(Field::Name, Rule::Required));
        assert!(err.has(Field::Number, Rule::Required));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn short_name_reports_min_length() {
        let err = check("Al", "12345678").unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.has(Field::Name, Rule::MinLength(NAME_MIN_LENGTH)));
        assert_eq!(
            err.to_string(),
            "Person validation failed: name: `Al` is shorter than the minimum allowed length (3)"
        );
    }

    #[test]
    fn min_length_counts_characters() {
        assert!(check("Åsa", "12345678").is_ok());
    }

    #[test]
    fn short_number_stops_at_first_failed_rule() {
        let err = check("Ada Lovelace", "123").unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.has(Field::Number, Rule::MinLength(NUMBER_MIN_LENGTH)));
    }

    #[test]
    fn letters_fail_the_phone_pattern() {
        let err = check("Ada Lovelace", "abcdefgh").unwrap_err();
        assert!(err.has(Field::Number, Rule::PhoneNumber));
        assert_eq!(
            err.to_string(),
            "Person validation failed: number: `abcdefgh` is not a valid phone number"
        );
    }

    #[test]
    fn separators_do_not_count_as_digits() {
        assert!(check("Ada Lovelace", "1-2-3-4-5-6-7").is_err());
        assert!(check("Ada Lovelace", "12345678x").is_err());
        assert!(check("Ada Lovelace", "+358 40 1234567").is_err());
    }

    #[test]
    fn unique_is_left_to_the_store() {
        let fields: Vec<Field> = RuleSet::person().unique_fields().collect();
        assert_eq!(fields, vec![Field::Name, Field::Number]);
        assert_eq!(Rule::Unique.accepts("anything"), None);
    }

    #[test]
    fn unique_error_names_field_and_value() {
        let err = ValidationError::unique(Field::Name, "Arto Hellas");
        assert!(err.has(Field::Name, Rule::Unique));
        assert_eq!(
            err.to_string(),
            "Person validation failed: name: `Arto Hellas` is already taken, expected `name` to be unique"
        );
    }

    #[test]
    fn rules_are_listed_per_field() {
        let rules = RuleSet::person().rules(Field::Number);
        assert_eq!(rules.first(), Some(&Rule::Required));
        assert!(rules.contains(&Rule::PhoneNumber));
        assert!(RuleSet::new().rules(Field::Name).is_empty());
    }

    proptest! {
        #[test]
        fn digits_with_separators_are_accepted(
            digits in proptest::collection::vec(0u8..10, 8..16),
            separators in proptest::collection::vec(
                prop_oneof![Just(""), Just("-"), Just(" "), Just("."), Just("/"), Just(",")],
                16,
            ),
        ) {
            let number: String = digits
                .iter()
                .zip(separators.iter())
                .map(|(d, sep)| format!("{d}{sep}"))
                .collect();
            prop_assert!(Rule::PhoneNumber.accepts(&number) == Some(true));
            prop_assert!(check("Ada Lovelace", &number).is_ok());
        }

        #[test]
        fn fewer_than_eight_digits_are_rejected(number in "[0-9]{0,7}") {
            prop_assert!(Rule::PhoneNumber.accepts(&number) == Some(false));
        }

        #[test]
        fn names_of_three_or_more_chars_pass(name in "[a-zA-Z ]{3,30}") {
            prop_assert!(Rule::MinLength(NAME_MIN_LENGTH).accepts(&name) == Some(true));
        }
    }
}
