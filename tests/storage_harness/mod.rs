//! Shared test harness for record service testing
//!
//! Provides `TestRecord`, whose fields cover every `FieldValue` variant and
//! which owns a `tags` association, plus helpers for building test data.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod record_service_tests;

use chrono::{DateTime, Utc};
use console::impl_record;
use uuid::Uuid;

impl_record!(
    TestTag,
    "test_tag",
    "test_tags",
    {
        label: String,
    }
);

impl_record!(
    TestRecord,
    "test_record",
    "test_records",
    {
        name: String,
        email: String,
        age: i64,
        score: f64,
        active: bool,
        joined: Option<DateTime<Utc>>,
    },
    associations {
        tags: TestTag,
    }
);

/// Build an unsaved test record
pub fn create_test_record(name: &str, email: &str, age: i64, score: f64, active: bool) -> TestRecord {
    TestRecord::new(
        name.to_string(),
        email.to_string(),
        age,
        score,
        active,
        Some(Utc::now()),
    )
}

/// Build a tag that already exists on the server
pub fn create_test_tag(label: &str) -> TestTag {
    TestTag::new(label.to_string()).with_id(Uuid::new_v4())
}

/// Build `count` unsaved records named `Record 00`, `Record 01`, ...
pub fn create_test_records(count: usize) -> Vec<TestRecord> {
    (0..count)
        .map(|i| {
            create_test_record(
                &format!("Record {i:02}"),
                &format!("record{i}@test.com"),
                20 + i as i64,
                i as f64 / 2.0,
                i % 2 == 0,
            )
        })
        .collect()
}
