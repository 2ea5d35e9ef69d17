//! Repository trait definition
//!
//! One trait covers both repository shapes. `Item` is what callers see: the entity itself
//! for [`CommonRepository`](super::CommonRepository), or an application model for
//! [`CommonModelRepository`](super::CommonModelRepository). Queries are always expressed
//! over the entity type `E`, since that is what the data service filters.
//!
//! Methods use RPITIT (Return Position Impl Trait In Traits) for async without
//! `async_trait`.
//!
//! # Example
//!
//! ```rust,ignore
//! use request_management::prelude::*;
//!
//! async fn rename(repo: &impl Repository<CallSheet, Item = CallSheet>, id: i32) -> RepositoryResult<bool> {
//!     let Some(mut sheet) = repo.get_by_id(id).await? else {
//!         return Ok(false);
//!     };
//!     sheet.name = format!("{} (revised)", sheet.name);
//!     repo.update(Some(&mut sheet)).await
//! }
//! ```

use std::future::Future;

use super::error::RepositoryError;
use crate::data::Predicate;
use crate::paging::{Pager, PagerResult};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Paged listing, lookup, writes and batch lookup over entity `E`
///
/// Writes take `Option<&mut Item>`: `None` stands for a missing input and yields
/// `Ok(false)` without touching the data service. A write succeeds when the data
/// service reports exactly one affected row; other counts are `Ok(false)`, not errors.
/// Data-service failures come back as `Err` unchanged.
pub trait Repository<E>: Send + Sync {
    /// What callers read and write
    type Item: Send;

    /// One page of items matching `predicate` and the pager's filters
    ///
    /// The returned pager carries the totals reported by the data service.
    fn get_paged_list(
        &self,
        pager: Pager,
        predicate: Predicate<E>,
    ) -> impl Future<Output = RepositoryResult<PagerResult<Self::Item>>> + Send;

    /// All items matching `predicate`; never `None`, empty when nothing matched
    fn get_list(
        &self,
        predicate: Predicate<E>,
    ) -> impl Future<Output = RepositoryResult<Vec<Self::Item>>> + Send;

    fn get_by_id(&self, id: i32) -> impl Future<Output = RepositoryResult<Option<Self::Item>>> + Send;

    /// Like [`get_by_id`](Self::get_by_id), loading related child records too
    fn get_by_id_with_children(
        &self,
        id: i32,
    ) -> impl Future<Output = RepositoryResult<Option<Self::Item>>> + Send;

    /// Insert `item`, writing the generated identity back onto it
    fn create(&self, item: Option<&mut Self::Item>) -> impl Future<Output = RepositoryResult<bool>> + Send;

    fn create_with_children(
        &self,
        item: Option<&mut Self::Item>,
    ) -> impl Future<Output = RepositoryResult<bool>> + Send;

    fn update(&self, item: Option<&mut Self::Item>) -> impl Future<Output = RepositoryResult<bool>> + Send;

    fn update_with_children(
        &self,
        item: Option<&mut Self::Item>,
    ) -> impl Future<Output = RepositoryResult<bool>> + Send;

    fn delete(&self, item: Option<&mut Self::Item>) -> impl Future<Output = RepositoryResult<bool>> + Send;

    fn delete_with_children(
        &self,
        item: Option<&mut Self::Item>,
    ) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Delete by bare identity
    fn delete_by_id(&self, id: i32) -> impl Future<Output = RepositoryResult<bool>> + Send;

    fn delete_with_children_by_id(&self, id: i32) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Items whose `column_name` value is one of `ids`; empty when nothing matched
    fn get_list_by_ids(
        &self,
        column_name: &str,
        ids: &[i32],
    ) -> impl Future<Output = RepositoryResult<Vec<Self::Item>>> + Send;

    fn get_list_with_children_by_ids(
        &self,
        column_name: &str,
        ids: &[i32],
    ) -> impl Future<Output = RepositoryResult<Vec<Self::Item>>> + Send;
}
