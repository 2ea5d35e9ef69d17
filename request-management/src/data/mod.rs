//! Capability contracts between repositories, entities and data services
//!
//! Entities declare what they are by implementing small traits:
//! [`Identifiable`] for anything with an integer identity, [`Versioned`] for entities that
//! record who last changed them. Models add [`Model`] to project back onto their entity.
//!
//! A data service is anything implementing [`Readable`], [`Pageable`] and [`Writable`]
//! for an entity type; [`DataService`] is the blanket combination repositories ask for.
//! Data-service methods are synchronous. Repositories move the calls onto a blocking
//! worker so async callers are never stalled.
//!
//! Write methods return the backend's row count. Exactly `1` means success.

#[cfg(feature = "memory")]
pub mod memory;

use std::fmt;
use std::sync::Arc;

use crate::paging::DataPager;
use crate::repository::RepositoryResult;

/// Something with an integer identity and a name
pub trait Identifiable {
    fn id(&self) -> i32;
    fn set_id(&mut self, id: i32);
    fn name(&self) -> &str;
}

/// An entity carrying audit attribution
///
/// Implementing this trait is the declaration that an entity is versioned; version
/// repositories only accept entities that do.
pub trait Versioned: Identifiable {
    fn modified_user_name(&self) -> &str;
    fn set_modified_user_name(&mut self, user_name: String);
}

/// An application-facing projection of entity `E`
pub trait Model<E>: Identifiable {
    /// Build the entity this model persists as
    fn to_entity(&self) -> E;
}

/// Boolean filter over entities, evaluated by the data service
///
/// ```rust
/// use request_management::data::Predicate;
///
/// let positive = Predicate::new(|n: &i32| *n > 0);
/// assert!(positive.matches(&3));
/// assert!(!positive.matches(&-3));
/// assert!(Predicate::<i32>::all().matches(&-3));
/// ```
pub struct Predicate<E>(Arc<dyn Fn(&E) -> bool + Send + Sync>);

impl<E> Predicate<E> {
    pub fn new(f: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A predicate accepting every entity
    pub fn all() -> Self {
        Self(Arc::new(|_| true))
    }

    pub fn matches(&self, entity: &E) -> bool {
        (self.0)(entity)
    }
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> Default for Predicate<E> {
    fn default() -> Self {
        Self::all()
    }
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Lookups
///
/// `None` from a list method means the backend produced no list at all; repositories
/// normalize it to an empty `Vec`.
pub trait Readable<E> {
    /// Find the entity whose identity matches `template`
    fn select_by_id(&self, template: &E, with_children: bool) -> RepositoryResult<Option<E>>;

    /// All entities matching `predicate`
    fn select_by(&self, template: &E, predicate: &Predicate<E>) -> RepositoryResult<Option<Vec<E>>>;

    /// Entities whose `column_name` value is one of `ids`
    fn select_by_column_ids(
        &self,
        column_name: &str,
        ids: &[i32],
        with_children: bool,
    ) -> RepositoryResult<Option<Vec<E>>>;
}

/// Paged lookups
pub trait Pageable<E> {
    /// One page of entities matching `predicate` and the pager's filters
    ///
    /// Implementations update `pager.page_total` and `pager.total_counts`.
    fn select_paged(
        &self,
        pager: &mut DataPager,
        template: &E,
        predicate: &Predicate<E>,
    ) -> RepositoryResult<Vec<E>>;
}

/// Persistence
pub trait Writable<E> {
    /// Insert `entity`, assigning its identity; returns the row count
    fn insert(&self, entity: &mut E, with_children: bool) -> RepositoryResult<u64>;

    /// Update `entity`; returns the row count
    fn update(&self, entity: &mut E, with_children: bool) -> RepositoryResult<u64>;

    /// Delete `entity` by identity; returns the row count
    fn delete(&self, entity: &mut E, with_children: bool) -> RepositoryResult<u64>;
}

/// Everything a repository needs from a data service
pub trait DataService<E>: Readable<E> + Pageable<E> + Writable<E> + Send + Sync + 'static {}

impl<E, T> DataService<E> for T where T: Readable<E> + Pageable<E> + Writable<E> + Send + Sync + 'static {}
