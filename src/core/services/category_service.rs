use std::sync::Arc;

use tracing::{info, warn};

use crate::core::errors::{LedgerError, LedgerResult};
use crate::core::time::Clock;
use crate::domain::validation::{require_name, validate_category};
use crate::domain::{Category, EntityId, EntityKind, OperationKind};
use crate::storage::EntityStore;

/// Category lifecycle. Guards the rule that operations share their category's kind.
pub struct CategoryService {
    store: Arc<EntityStore>,
    clock: Arc<dyn Clock>,
}

impl CategoryService {
    pub fn new(store: Arc<EntityStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn create(&self, name: &str, kind: OperationKind) -> LedgerResult<Category> {
        let name = name.trim();
        require_name(name, "category name must not be empty")?;

        let mut state = self.store.write();
        let mut category = Category::new(name, kind, self.clock.now());
        category.id = state.next_id::<Category>();
        validate_category(&category)?;
        let category = state.put(category)?;
        info!(category_id = category.id, kind = %kind, name = %category.name, "category created");
        Ok(category)
    }

    pub fn get(&self, id: EntityId) -> LedgerResult<Category> {
        self.store.get_by_id(id)
    }

    /// All categories ordered by id.
    pub fn list(&self) -> Vec<Category> {
        let mut categories = self.store.get_all::<Category>();
        categories.sort_by_key(|category| category.id);
        categories
    }

    pub fn list_by_kind(&self, kind: OperationKind) -> Vec<Category> {
        let mut categories: Vec<_> = self
            .store
            .read()
            .categories_of_kind(kind)
            .cloned()
            .collect();
        categories.sort_by_key(|category| category.id);
        categories
    }

    /// Renames and optionally retypes a category.
    ///
    /// Retyping is refused while any operation of the old kind references the category.
    pub fn update(&self, id: EntityId, name: &str, kind: OperationKind) -> LedgerResult<Category> {
        let name = name.trim();
        require_name(name, "category name must not be empty")?;

        let mut state = self.store.write();
        let mut category = state.get::<Category>(id)?.clone();
        if category.kind != kind
            && state
                .operations_for_category(id)
                .any(|operation| operation.kind != kind)
        {
            warn!(category_id = id, from = %category.kind, to = %kind, "category retype refused");
            return Err(LedgerError::kind_mismatch());
        }
        category.name = name.to_string();
        category.kind = kind;
        category.updated_at = self.clock.now();
        validate_category(&category)?;
        state.update(category.clone())?;
        info!(category_id = id, kind = %kind, name = %category.name, "category updated");
        Ok(category)
    }

    pub fn delete(&self, id: EntityId) -> LedgerResult<Category> {
        let mut state = self.store.write();
        state.get::<Category>(id)?;
        let references = state.references_to(EntityKind::Category, id);
        if references > 0 {
            warn!(category_id = id, references, "category delete refused");
            return Err(LedgerError::ReferentialIntegrity {
                kind: EntityKind::Category,
                id,
                references,
            });
        }
        let removed = state.delete::<Category>(id)?;
        info!(category_id = id, "category deleted");
        Ok(removed)
    }
}
