//! Timestamp and soft-delete columns shared by every account table.
//!
//! Tables that carry `create_time`, `update_time` and `is_deleted` implement
//! [`Lifecycle`] on their model and [`SoftDelete`] on their entity. Their
//! `ActiveModelBehavior` calls [`stamp`] so timestamps are maintained on every
//! `insert`/`update` that goes through an active model.

use chrono::{SecondsFormat, Utc};
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter, Select, Set};

/// Current UTC time as RFC 3339 with fixed microsecond precision.
///
/// Fixed precision keeps lexicographic order equal to chronological order,
/// which the default orderings rely on.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Fills `create_time` on insert (unless the caller set it) and always
/// refreshes `update_time`.
pub fn stamp(
    create_time: &mut ActiveValue<String>,
    update_time: &mut ActiveValue<String>,
    insert: bool,
) {
    let now = now_timestamp();

    if insert && !create_time.is_set() {
        *create_time = Set(now.clone());
    }

    *update_time = Set(now);
}

/// Read access to the lifecycle columns of a record.
pub trait Lifecycle {
    fn create_time(&self) -> &str;

    fn update_time(&self) -> &str;

    fn is_deleted(&self) -> bool;

    fn is_active(&self) -> bool {
        !self.is_deleted()
    }
}

/// Two query entry points over a soft-deletable table.
///
/// `EntityTrait::find` keeps returning every row; `find_active` is the
/// default view callers should use when deleted rows must stay hidden.
pub trait SoftDelete: EntityTrait {
    fn deleted_column() -> Self::Column;

    fn find_active() -> Select<Self> {
        Self::find().filter(Self::deleted_column().eq(false))
    }

    fn find_deleted() -> Select<Self> {
        Self::find().filter(Self::deleted_column().eq(true))
    }
}
