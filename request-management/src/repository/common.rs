//! Entity repositories
//!
//! [`CommonRepository`] passes entities straight through to the data service.
//! [`CommonVersionRepository`] is the same repository with an [`AuditStamp`] hook, so
//! every write of a versioned entity records who made it.
//!
//! ```rust
//! use std::sync::Arc;
//! use request_management::catalog::ThirdPartyBulkerCrew;
//! use request_management::data::memory::InMemoryDataService;
//! use request_management::identity::{CurrentUserService, NoIdentity};
//! use request_management::repository::{CommonRepository, CommonVersionRepository, Repository};
//!
//! # tokio_test_block(async {
//! let current_user = Arc::new(CurrentUserService::new(Arc::new(NoIdentity)));
//! current_user.set_current_username(Some("dispatch@example.com"));
//!
//! let repo: CommonVersionRepository<ThirdPartyBulkerCrew, _> = CommonRepository::versioned(
//!     Arc::new(InMemoryDataService::<ThirdPartyBulkerCrew>::new()),
//!     current_user,
//! );
//!
//! let mut crew = ThirdPartyBulkerCrew { name: "North".into(), ..Default::default() };
//! assert!(repo.create(Some(&mut crew)).await.unwrap());
//! assert_eq!(crew.modified_user_name, "dispatch");
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::hooks::{AuditStamp, Unstamped, WriteHook};
use super::offload::{entity_type, row_count_succeeded, DataServiceHandle, WriteKind};
use super::traits::{Repository, RepositoryResult};
use crate::config::DataServiceConfig;
use crate::data::{DataService, Identifiable, Predicate, Versioned};
use crate::identity::CurrentUser;
use crate::paging::{Pager, PagerResult};

/// Repository handing entities directly to a data service
///
/// `H` runs on each entity right before it is written; see [`WriteHook`].
pub struct CommonRepository<E, D, H = Unstamped> {
    data_service: DataServiceHandle<D>,
    hook: H,
    _entity: PhantomData<fn() -> E>,
}

/// Repository for versioned entities; writes carry the acting username
pub type CommonVersionRepository<E, D> = CommonRepository<E, D, AuditStamp>;

impl<E, D> CommonRepository<E, D, Unstamped>
where
    D: DataService<E>,
{
    pub fn new(data_service: Arc<D>) -> Self {
        Self::with_hook(data_service, Unstamped)
    }
}

impl<E, D> CommonRepository<E, D, AuditStamp>
where
    E: Versioned,
    D: DataService<E>,
{
    /// Repository stamping `modified_user_name` from `current_user` on every write
    pub fn versioned(data_service: Arc<D>, current_user: Arc<dyn CurrentUser>) -> Self {
        Self::with_hook(data_service, AuditStamp::new(current_user))
    }
}

impl<E, D, H> CommonRepository<E, D, H>
where
    D: DataService<E>,
    H: WriteHook<E>,
{
    pub fn with_hook(data_service: Arc<D>, hook: H) -> Self {
        Self {
            data_service: DataServiceHandle::new(data_service),
            hook,
            _entity: PhantomData,
        }
    }

    /// Run data-service calls inline instead of on the blocking pool
    #[must_use]
    pub fn offload_blocking(mut self, offload_blocking: bool) -> Self {
        self.data_service.set_offload_blocking(offload_blocking);
        self
    }

    #[must_use]
    pub fn with_config(self, config: &DataServiceConfig) -> Self {
        self.offload_blocking(config.offload_blocking)
    }
}

impl<E, D, H> CommonRepository<E, D, H>
where
    E: Identifiable + Clone + Send + Sync + 'static,
    D: DataService<E>,
    H: WriteHook<E>,
{
    async fn write(&self, kind: WriteKind, item: Option<&mut E>, with_children: bool) -> RepositoryResult<bool> {
        let Some(entity) = item else {
            tracing::debug!(
                entity_type = entity_type::<E>(),
                operation = %kind.operation(),
                "No entity supplied, write skipped"
            );
            return Ok(false);
        };

        self.hook.before_write(entity);
        let (count, written) = self
            .data_service
            .write(kind, entity.clone(), with_children)
            .await?;
        *entity = written;

        Ok(row_count_succeeded::<E>(kind, entity.id(), count))
    }

    async fn delete_id(&self, id: i32, with_children: bool) -> RepositoryResult<bool>
    where
        E: Default,
    {
        let mut entity = E::default();
        entity.set_id(id);
        self.hook.before_write(&mut entity);

        let (count, _) = self
            .data_service
            .write(WriteKind::Delete, entity, with_children)
            .await?;
        Ok(row_count_succeeded::<E>(WriteKind::Delete, id, count))
    }
}

impl<E, D, H> Repository<E> for CommonRepository<E, D, H>
where
    E: Identifiable + Default + Clone + Send + Sync + 'static,
    D: DataService<E>,
    H: WriteHook<E>,
{
    type Item = E;

    async fn get_paged_list(&self, mut pager: Pager, predicate: Predicate<E>) -> RepositoryResult<PagerResult<E>> {
        let (entities, data_pager) = self.data_service.select_paged(&pager, predicate).await?;
        pager.populate_from(&data_pager);
        Ok(PagerResult::new(entities, pager))
    }

    async fn get_list(&self, predicate: Predicate<E>) -> RepositoryResult<Vec<E>> {
        self.data_service.select_by(predicate).await
    }

    async fn get_by_id(&self, id: i32) -> RepositoryResult<Option<E>> {
        self.data_service.select_by_id(id, false).await
    }

    async fn get_by_id_with_children(&self, id: i32) -> RepositoryResult<Option<E>> {
        self.data_service.select_by_id(id, true).await
    }

    async fn create(&self, item: Option<&mut E>) -> RepositoryResult<bool> {
        self.write(WriteKind::Insert, item, false).await
    }

    async fn create_with_children(&self, item: Option<&mut E>) -> RepositoryResult<bool> {
        self.write(WriteKind::Insert, item, true).await
    }

    async fn update(&self, item: Option<&mut E>) -> RepositoryResult<bool> {
        self.write(WriteKind::Update, item, false).await
    }

    async fn update_with_children(&self, item: Option<&mut E>) -> RepositoryResult<bool> {
        self.write(WriteKind::Update, item, true).await
    }

    async fn delete(&self, item: Option<&mut E>) -> RepositoryResult<bool> {
        self.write(WriteKind::Delete, item, false).await
    }

    async fn delete_with_children(&self, item: Option<&mut E>) -> RepositoryResult<bool> {
        self.write(WriteKind::Delete, item, true).await
    }

    async fn delete_by_id(&self, id: i32) -> RepositoryResult<bool> {
        self.delete_id(id, false).await
    }

    async fn delete_with_children_by_id(&self, id: i32) -> RepositoryResult<bool> {
        self.delete_id(id, true).await
    }

    async fn get_list_by_ids(&self, column_name: &str, ids: &[i32]) -> RepositoryResult<Vec<E>> {
        self.data_service.select_by_column_ids(column_name, ids, false).await
    }

    async fn get_list_with_children_by_ids(&self, column_name: &str, ids: &[i32]) -> RepositoryResult<Vec<E>> {
        self.data_service.select_by_column_ids(column_name, ids, true).await
    }
}

impl<E, D, H: Clone> Clone for CommonRepository<E, D, H> {
    fn clone(&self) -> Self {
        Self {
            data_service: self.data_service.clone(),
            hook: self.hook.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E, D, H: fmt::Debug> fmt::Debug for CommonRepository<E, D, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommonRepository")
            .field("entity_type", &entity_type::<E>())
            .field("hook", &self.hook)
            .finish_non_exhaustive()
    }
}
