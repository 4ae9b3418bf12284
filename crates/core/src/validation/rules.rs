//! Rule sets for each mutating endpoint.

use super::{FieldKind, FieldRule, RuleSet};

pub const STATUS_VALUES: &[&str] = &["pending", "confirmed", "rejected", "cancelled", "done"];

const RESERVATION_DETAIL: &[FieldRule] =
    &[FieldRule::required("space_service_id", FieldKind::Uuid)];

const BOOKING_SERVICE: &[FieldRule] = &[
    FieldRule::required("space_service_id", FieldKind::Uuid),
    FieldRule::required("quantity", FieldKind::Integer)
        .min(1)
        .max(i32::MAX as i64),
    FieldRule::required("price", FieldKind::Integer).min(0),
];

pub const CREATE_RESERVATION: RuleSet = RuleSet::new(&[
    FieldRule::required("user_id", FieldKind::Uuid),
    FieldRule::required("space_id", FieldKind::Uuid),
    FieldRule::required("date", FieldKind::Date).not_before_today(),
    FieldRule::required("start_time", FieldKind::Time),
    FieldRule::required("end_time", FieldKind::Time).after("start_time"),
    FieldRule::required("total_price", FieldKind::Integer).min(0),
    FieldRule::nullable("details", FieldKind::List(RESERVATION_DETAIL))
        .distinct("space_service_id"),
]);

pub const UPDATE_RESERVATION: RuleSet = RuleSet::new(&[
    FieldRule::sometimes("status", FieldKind::OneOf(STATUS_VALUES)),
    FieldRule::sometimes("date", FieldKind::Date).not_before_today(),
    FieldRule::sometimes("start_time", FieldKind::Time),
    FieldRule::sometimes("end_time", FieldKind::Time).after("start_time"),
    FieldRule::sometimes("total_price", FieldKind::Integer).min(0),
]);

pub const CREATE_BOOKING: RuleSet = RuleSet::new(&[
    FieldRule::required("user_id", FieldKind::Uuid),
    FieldRule::required("space_id", FieldKind::Uuid),
    FieldRule::required("date", FieldKind::Date).not_before_today(),
    FieldRule::required("start_time", FieldKind::Time),
    FieldRule::required("end_time", FieldKind::Time).after("start_time"),
    FieldRule::required("total_price", FieldKind::Integer).min(0),
    FieldRule::nullable("services", FieldKind::List(BOOKING_SERVICE))
        .distinct("space_service_id"),
]);

pub const UPDATE_BOOKING: RuleSet = RuleSet::new(&[
    FieldRule::sometimes("date", FieldKind::Date).not_before_today(),
    FieldRule::sometimes("start_time", FieldKind::Time),
    FieldRule::sometimes("end_time", FieldKind::Time).after("start_time"),
    FieldRule::sometimes("total_price", FieldKind::Integer).min(0),
]);
