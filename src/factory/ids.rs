use chrono::{DateTime, FixedOffset, Local};
use uuid::Uuid;

use crate::models::WorkoutId;

/// Source of record identifiers. Implementations must never hand out the same
/// id twice within a process.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> WorkoutId;
}

/// Random v4 UUIDs. Used by the real session.
#[derive(Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> WorkoutId {
        WorkoutId::new(Uuid::new_v4().to_string())
    }
}

/// Monotonic `"<prefix>-<n>"` ids, starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> WorkoutId {
        let id = WorkoutId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

/// Wall clock for record stamps. The offset it returns decides which calendar
/// day a workout label shows.
pub trait Clock: Send {
    fn now(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
