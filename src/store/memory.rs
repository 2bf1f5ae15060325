use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Repository, ScopeVersion, Snapshot, StoreError};
use crate::items::Schedulable;
use crate::schedule::{ItemId, Scope};

/// In-process store; version checks and writes happen under one lock
pub struct MemoryRepository<R> {
    rows: Mutex<Vec<R>>,
}

impl<R: Schedulable> MemoryRepository<R> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    pub fn with_rows(rows: Vec<R>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

impl<R: Schedulable> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn scope_rows<R: Schedulable>(rows: &[R], scope: Scope) -> Vec<R> {
    rows.iter().filter(|row| row.scope() == scope).cloned().collect()
}

#[async_trait]
impl<R: Schedulable> Repository<R> for MemoryRepository<R> {
    async fn fetch_scope(&self, scope: Scope) -> Result<Snapshot<R>, StoreError> {
        let rows = self.rows.lock();
        Ok(Snapshot::new(scope, scope_rows(&rows, scope)))
    }

    async fn fetch_all(&self) -> Result<Vec<R>, StoreError> {
        Ok(self.rows.lock().clone())
    }

    async fn get(&self, id: &ItemId) -> Result<Option<R>, StoreError> {
        Ok(self.rows.lock().iter().find(|row| row.id() == id).cloned())
    }

    async fn persist(&self, row: R, expected: Option<&ScopeVersion>) -> Result<R, StoreError> {
        let mut rows = self.rows.lock();

        if let Some(expected) = expected {
            let scope = row.scope();
            let actual = ScopeVersion::of(&scope_rows(&rows, scope));
            if actual != *expected {
                return Err(StoreError::Stale {
                    scope,
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        match rows.iter_mut().find(|existing| existing.id() == row.id()) {
            Some(existing) => *existing = row.clone(),
            None => rows.push(row.clone()),
        }
        Ok(row)
    }

    async fn delete(&self, id: &ItemId) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() != before)
    }
}
