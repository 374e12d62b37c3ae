//! # Entity access
//!
//! Owner-scoped CRUD over one backend table per entity type.
//!
//! - Reads are always filtered by the entity's owner column, plus any extra
//!   scope filters attached with [`EntityAccess::scoped`] (e.g. `baby_id`).
//! - Creates check required fields before any remote call and stamp the owner
//!   column from the signed-in identity.
//! - Updates and deletes address a row by primary key only; row-level security
//!   is the backend's job.
//! - Every row coming back is decoded into its typed DTO here, so malformed rows
//!   become a [`SchemaError`] instead of leaking untyped JSON into views.
//!
//! [`EntityList`] layers list state on top: it re-fetches the whole list after
//! every successful mutation and tags each fetch with a sequence number so an
//! older response can never overwrite a newer one.

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;

use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::backend::{Filter, Order, Query, Row, TableApi};
use crate::error::{AccessError, SchemaError};

/// A create payload that knows which of its required fields are still empty.
pub trait Draft: Serialize {
    fn missing_fields(&self) -> Vec<&'static str>;
}

/// A typed row of one backend table.
pub trait Entity: DeserializeOwned + Clone + PartialEq + 'static {
    type Draft: Draft;
    type Patch: Serialize;

    const TABLE: &'static str;
    const OWNER_COLUMN: &'static str = "user_id";

    fn id(&self) -> &str;

    fn default_order() -> Option<Order> {
        Some(Order::desc("created_at"))
    }

    fn from_row(row: Row) -> Result<Self, SchemaError> {
        serde_json::from_value(Value::Object(row))
            .map_err(|e| SchemaError::new(Self::TABLE, e.to_string()))
    }
}

fn to_row<T: Serialize>(table: &'static str, value: &T) -> Result<Row, AccessError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(SchemaError::new(table, format!("expected an object, got {other}")).into()),
        Err(e) => Err(SchemaError::new(table, e.to_string()).into()),
    }
}

pub struct EntityAccess<E, B: ?Sized> {
    backend: Rc<B>,
    scope: Vec<Filter>,
    _entity: PhantomData<E>,
}

impl<E, B: ?Sized> Clone for EntityAccess<E, B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            scope: self.scope.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity, B: TableApi + ?Sized> EntityAccess<E, B> {
    pub fn new(backend: Rc<B>) -> Self {
        Self {
            backend,
            scope: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Narrow every list call with an extra filter.
    pub fn scoped(mut self, filter: Filter) -> Self {
        self.scope.push(filter);
        self
    }

    pub fn scope(&self) -> &[Filter] {
        &self.scope
    }

    pub async fn list(&self, owner: Option<&str>) -> Result<Vec<E>, AccessError> {
        let owner = owner.ok_or(AccessError::NotAuthenticated)?;

        let mut query = Query::new(E::TABLE).filter(Filter::eq(E::OWNER_COLUMN, owner));
        for filter in &self.scope {
            query = query.filter(filter.clone());
        }
        if let Some(order) = E::default_order() {
            query = query.order(order);
        }

        let rows = self.backend.select(&query).await?;
        debug!("📋 {} returned {} rows", E::TABLE, rows.len());
        rows.into_iter()
            .map(|row| E::from_row(row).map_err(AccessError::from))
            .collect()
    }

    pub async fn create(&self, draft: &E::Draft, owner: Option<&str>) -> Result<E, AccessError> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(AccessError::MissingFields(missing));
        }
        let owner = owner.ok_or(AccessError::NotAuthenticated)?;

        let mut row = to_row(E::TABLE, draft)?;
        row.insert(E::OWNER_COLUMN.to_string(), Value::String(owner.to_string()));

        let inserted = self.backend.insert(E::TABLE, row).await?;
        let entity = E::from_row(inserted)?;
        info!("✅ Created {} {}", E::TABLE, entity.id());
        Ok(entity)
    }

    pub async fn update(&self, id: &str, patch: &E::Patch) -> Result<E, AccessError> {
        let row = to_row(E::TABLE, patch)?;
        let mut updated = self
            .backend
            .update(E::TABLE, &[Filter::eq("id", id)], row)
            .await?;

        match updated.pop() {
            Some(row) => {
                info!("✏️ Updated {} {}", E::TABLE, id);
                Ok(E::from_row(row)?)
            }
            None => Err(AccessError::NotFound {
                table: E::TABLE,
                id: id.to_string(),
            }),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), AccessError> {
        let removed = self
            .backend
            .delete(E::TABLE, &[Filter::eq("id", id)])
            .await?;
        if removed.is_empty() {
            return Err(AccessError::NotFound {
                table: E::TABLE,
                id: id.to_string(),
            });
        }
        info!("🗑️ Deleted {} {}", E::TABLE, id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<E> {
    pub items: Vec<E>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<E> Default for ListState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

type ChangeListener<E> = Rc<dyn Fn(&ListState<E>)>;

/// Request counter for list refreshes. Lists that feed the same view share one,
/// so a list replaced by a newer one (new owner or scope) can no longer apply
/// its late responses.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence(Rc<Cell<u64>>);

impl RequestSequence {
    fn next(&self) -> u64 {
        let request = self.0.get() + 1;
        self.0.set(request);
        request
    }

    fn latest(&self) -> u64 {
        self.0.get()
    }
}

/// List state for one entity table, kept consistent with the backend.
pub struct EntityList<E, B: ?Sized> {
    access: EntityAccess<E, B>,
    owner: Option<String>,
    state: Rc<RefCell<ListState<E>>>,
    sequence: RequestSequence,
    on_change: Option<ChangeListener<E>>,
}

impl<E, B: ?Sized> Clone for EntityList<E, B> {
    fn clone(&self) -> Self {
        Self {
            access: self.access.clone(),
            owner: self.owner.clone(),
            state: self.state.clone(),
            sequence: self.sequence.clone(),
            on_change: self.on_change.clone(),
        }
    }
}

impl<E: Entity, B: TableApi + ?Sized> EntityList<E, B> {
    pub fn new(access: EntityAccess<E, B>, owner: Option<String>) -> Self {
        Self {
            access,
            owner,
            state: Rc::new(RefCell::new(ListState::default())),
            sequence: RequestSequence::default(),
            on_change: None,
        }
    }

    /// Draw request numbers from `sequence` instead of a private counter.
    pub fn sharing_sequence(mut self, sequence: RequestSequence) -> Self {
        self.sequence = sequence;
        self
    }

    /// Called with the new state every time it changes.
    pub fn on_change(mut self, listener: impl Fn(&ListState<E>) + 'static) -> Self {
        self.on_change = Some(Rc::new(listener));
        self
    }

    pub fn state(&self) -> ListState<E> {
        self.state.borrow().clone()
    }

    fn update_state(&self, apply: impl FnOnce(&mut ListState<E>)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            apply(&mut state);
            state.clone()
        };
        if let Some(listener) = &self.on_change {
            listener(&snapshot);
        }
    }

    /// Re-fetch the list. Returns false when a newer refresh superseded this one.
    pub async fn refresh(&self) -> bool {
        let request = self.sequence.next();
        self.update_state(|state| state.loading = true);

        let result = self.access.list(self.owner.as_deref()).await;

        if self.sequence.latest() != request {
            debug!(
                "⏭️ Dropping stale {} response #{} (latest is #{})",
                E::TABLE,
                request,
                self.sequence.latest()
            );
            return false;
        }

        self.update_state(|state| {
            state.loading = false;
            match result {
                Ok(items) => {
                    state.items = items;
                    state.error = None;
                }
                Err(e) => {
                    error!("❌ Failed to load {}: {}", E::TABLE, e);
                    state.error = Some(e.to_string());
                }
            }
        });
        true
    }

    pub async fn add(&self, draft: &E::Draft) -> Result<E, AccessError> {
        let created = self.access.create(draft, self.owner.as_deref()).await?;
        self.refresh().await;
        Ok(created)
    }

    pub async fn edit(&self, id: &str, patch: &E::Patch) -> Result<E, AccessError> {
        let updated = self.access.update(id, patch).await?;
        self.refresh().await;
        Ok(updated)
    }

    pub async fn remove(&self, id: &str) -> Result<(), AccessError> {
        self.access.delete(id).await?;
        self.refresh().await;
        Ok(())
    }
}
