use std::collections::HashMap;

use thiserror::Error;

use crate::models::{Workout, WorkoutId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("workout {0} already exists")]
    DuplicateId(WorkoutId),

    #[error("workout {0} not found")]
    NotFound(WorkoutId),
}

/// Session-lifetime, append-only collection of workouts in insertion order.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    records: Vec<Workout>,
    index: HashMap<WorkoutId, usize>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: Workout) -> Result<&Workout, StoreError> {
        if self.index.contains_key(record.id()) {
            return Err(StoreError::DuplicateId(record.id().clone()));
        }

        let position = self.records.len();
        self.index.insert(record.id().clone(), position);
        self.records.push(record);
        Ok(&self.records[position])
    }

    pub fn find_by_id(&self, id: &str) -> Result<&Workout, StoreError> {
        self.index
            .get(id)
            .map(|&position| &self.records[position])
            .ok_or_else(|| StoreError::NotFound(WorkoutId::new(id)))
    }

    /// Bumps the record's click counter and returns the updated record.
    pub fn record_click(&mut self, id: &str) -> Result<&Workout, StoreError> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| StoreError::NotFound(WorkoutId::new(id)))?;
        let record = &mut self.records[position];
        record.register_click();
        Ok(&*record)
    }

    /// Records in insertion order. The iterator is cheap to clone, so the
    /// sequence can be walked again without touching the store.
    pub fn all(&self) -> std::slice::Iter<'_, Workout> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
