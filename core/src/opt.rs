//! Constructors for optional request fields.
//!
//! Request records use `Option<T>` for every field the caller may leave out:
//! `None` drops the key from the JSON body, `Some(v)` sends `v` even when it
//! is `false`, `0` or `""`. These helpers keep call sites short:
//!
//! ```
//! use ticktick::{opt, priority, CreateTaskRequest};
//!
//! let request = CreateTaskRequest {
//!     content: opt::string("Prepare and send the weekly status report"),
//!     is_all_day: opt::boolean(false),
//!     priority: opt::int(priority::MEDIUM),
//!     ..CreateTaskRequest::new("Weekly report", "project-id")
//! };
//! assert_eq!(request.is_all_day, Some(false));
//! ```

use chrono::{DateTime, TimeZone};

use crate::time::Time;

pub fn string(value: impl Into<String>) -> Option<String> {
    Some(value.into())
}

pub fn int(value: i32) -> Option<i32> {
    Some(value)
}

pub fn int64(value: i64) -> Option<i64> {
    Some(value)
}

pub fn boolean(value: bool) -> Option<bool> {
    Some(value)
}

pub fn time<Tz: TimeZone>(value: DateTime<Tz>) -> Option<Time> {
    Some(Time::new(value))
}

/// Boxes a whole list. `Some(vec![])` is sent as `[]`, which clears the
/// field on the server.
pub fn list<T>(values: impl IntoIterator<Item = T>) -> Option<Vec<T>> {
    Some(values.into_iter().collect())
}
