use std::collections::HashMap;

use crate::core::errors::{LedgerError, LedgerResult};
use crate::domain::{EntityId, UNASSIGNED_ID};

use super::StoredEntity;

/// Keyed rows for one entity kind plus its id counter.
///
/// The counter only moves forward: deleted ids are never handed out again, and
/// explicit ids at or above the counter push it past themselves.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: HashMap<EntityId, T>,
    next_id: EntityId,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<T: StoredEntity> Table<T> {
    pub fn put(&mut self, mut entity: T) -> LedgerResult<T> {
        let id = entity.id();
        if id == UNASSIGNED_ID {
            let assigned = self.next_id;
            self.next_id = advance(assigned, T::KIND)?;
            entity.assign_id(assigned);
        } else if id >= self.next_id {
            self.next_id = advance(id, T::KIND)?;
        }
        self.rows.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    pub fn get(&self, id: EntityId) -> LedgerResult<&T> {
        self.rows
            .get(&id)
            .ok_or_else(|| LedgerError::not_found(T::KIND, id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Rows in map iteration order, which is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn update(&mut self, entity: T) -> LedgerResult<()> {
        match self.rows.get_mut(&entity.id()) {
            Some(slot) => {
                *slot = entity;
                Ok(())
            }
            None => Err(LedgerError::not_found(T::KIND, entity.id())),
        }
    }

    pub fn delete(&mut self, id: EntityId) -> LedgerResult<T> {
        self.rows
            .remove(&id)
            .ok_or_else(|| LedgerError::not_found(T::KIND, id))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn next_id(&self) -> EntityId {
        self.next_id
    }
}

fn advance(id: EntityId, kind: crate::domain::EntityKind) -> LedgerResult<EntityId> {
    id.checked_add(1)
        .ok_or_else(|| LedgerError::Storage(format!("{kind} id counter exhausted")))
}
