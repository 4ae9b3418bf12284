//! # Request Validation
//!
//! Field constraints are declared as [`FieldRule`] values grouped in a
//! [`RuleSet`]; [`RuleSet::validate`] walks a JSON payload and collects every
//! violation into [`FieldErrors`] keyed by field path (`services.0.quantity`).
//!
//! The concrete rule sets for each endpoint live in [`rules`].

pub mod rules;

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::{BookingResult, FieldErrors};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be present and non-null
    Required,
    /// May be omitted; when present it must be non-null and valid
    Sometimes,
    /// May be omitted or null
    Nullable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Uuid,
    Date,
    Time,
    Integer,
    OneOf(&'static [&'static str]),
    /// Array of objects, each checked against `items`
    List(&'static [FieldRule]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub presence: Presence,
    pub kind: FieldKind,
    /// Inclusive lower bound for integers
    pub min: Option<i64>,
    /// Inclusive upper bound for integers
    pub max: Option<i64>,
    /// Dates must not be earlier than the validation date
    pub not_before_today: bool,
    /// Times must be strictly after this sibling field, when it is valid
    pub after: Option<&'static str>,
    /// For lists: item field whose values must be unique
    pub distinct: Option<&'static str>,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self::with_presence(name, Presence::Required, kind)
    }

    pub const fn sometimes(name: &'static str, kind: FieldKind) -> Self {
        Self::with_presence(name, Presence::Sometimes, kind)
    }

    pub const fn nullable(name: &'static str, kind: FieldKind) -> Self {
        Self::with_presence(name, Presence::Nullable, kind)
    }

    const fn with_presence(name: &'static str, presence: Presence, kind: FieldKind) -> Self {
        Self {
            name,
            presence,
            kind,
            min: None,
            max: None,
            not_before_today: false,
            after: None,
            distinct: None,
        }
    }

    pub const fn min(self, min: i64) -> Self {
        Self {
            min: Some(min),
            ..self
        }
    }

    pub const fn max(self, max: i64) -> Self {
        Self {
            max: Some(max),
            ..self
        }
    }

    pub const fn not_before_today(self) -> Self {
        Self {
            not_before_today: true,
            ..self
        }
    }

    pub const fn after(self, field: &'static str) -> Self {
        Self {
            after: Some(field),
            ..self
        }
    }

    pub const fn distinct(self, field: &'static str) -> Self {
        Self {
            distinct: Some(field),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub fields: &'static [FieldRule],
}

impl RuleSet {
    pub const fn new(fields: &'static [FieldRule]) -> Self {
        Self { fields }
    }

    /// Validates `input` against every rule, relative to `today`.
    pub fn validate(&self, input: &Value, today: NaiveDate) -> BookingResult<()> {
        let mut errors = FieldErrors::new();

        match input.as_object() {
            Some(object) => check_object(self.fields, object, "", today, &mut errors),
            None => errors.add("body", "The request body must be a JSON object."),
        }

        errors.into_result()
    }
}

fn check_object(
    rules: &[FieldRule],
    object: &Map<String, Value>,
    prefix: &str,
    today: NaiveDate,
    errors: &mut FieldErrors,
) {
    for rule in rules {
        let path = format!("{}{}", prefix, rule.name);
        let value = object.get(rule.name);

        match (value, rule.presence) {
            (None, Presence::Required) | (Some(Value::Null), Presence::Required) => {
                errors.add(&path, format!("The {} field is required.", rule.name));
            }
            (Some(Value::Null), Presence::Sometimes) => {
                errors.add(&path, format!("The {} field must not be null.", rule.name));
            }
            (None, _) | (Some(Value::Null), Presence::Nullable) => {}
            (Some(value), _) => check_value(rule, value, object, &path, today, errors),
        }
    }
}

fn check_value(
    rule: &FieldRule,
    value: &Value,
    siblings: &Map<String, Value>,
    path: &str,
    today: NaiveDate,
    errors: &mut FieldErrors,
) {
    let name = rule.name;

    match rule.kind {
        FieldKind::Uuid => {
            if value.as_str().and_then(|s| Uuid::parse_str(s).ok()).is_none() {
                errors.add(path, format!("The {} field must be a valid UUID.", name));
            }
        }
        FieldKind::Date => match value.as_str().and_then(parse_date) {
            None => errors.add(
                path,
                format!("The {} field must be a valid date (YYYY-MM-DD).", name),
            ),
            Some(date) if rule.not_before_today && date < today => errors.add(
                path,
                format!("The {} field must be a date after or equal to today.", name),
            ),
            Some(_) => {}
        },
        FieldKind::Time => match value.as_str().and_then(parse_time) {
            None => errors.add(
                path,
                format!("The {} field must match the format H:i:s.", name),
            ),
            Some(time) => {
                let earlier = rule.after.and_then(|other| {
                    siblings
                        .get(other)
                        .and_then(Value::as_str)
                        .and_then(parse_time)
                        .map(|bound| (other, bound))
                });
                if let Some((other, bound)) = earlier {
                    if time <= bound {
                        errors.add(
                            path,
                            format!("The {} field must be a time after {}.", name, other),
                        );
                    }
                }
            }
        },
        FieldKind::Integer => match value.as_i64() {
            None => errors.add(path, format!("The {} field must be an integer.", name)),
            Some(n) => {
                if let Some(min) = rule.min.filter(|min| n < *min) {
                    errors.add(path, format!("The {} field must be at least {}.", name, min));
                }
                if let Some(max) = rule.max.filter(|max| n > *max) {
                    errors.add(
                        path,
                        format!("The {} field must not be greater than {}.", name, max),
                    );
                }
            }
        },
        FieldKind::OneOf(allowed) => {
            if !value.as_str().is_some_and(|s| allowed.contains(&s)) {
                errors.add(
                    path,
                    format!(
                        "The selected {} is invalid. Expected one of: {}.",
                        name,
                        allowed.join(", ")
                    ),
                );
            }
        }
        FieldKind::List(items) => match value.as_array() {
            None => errors.add(path, format!("The {} field must be an array.", name)),
            Some(entries) => {
                let mut seen = HashSet::new();
                for (index, entry) in entries.iter().enumerate() {
                    let item_path = format!("{}.{}", path, index);
                    let Some(object) = entry.as_object() else {
                        errors.add(&item_path, format!("Each {} entry must be an object.", name));
                        continue;
                    };

                    check_object(items, object, &format!("{}.", item_path), today, errors);

                    if let Some(key) = rule.distinct {
                        if let Some(value) = object.get(key).filter(|v| !v.is_null()) {
                            if !seen.insert(value.to_string()) {
                                errors.add(
                                    format!("{}.{}", item_path, key),
                                    format!("The {} field has a duplicate value.", key),
                                );
                            }
                        }
                    }
                }
            }
        },
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT).ok()
}
