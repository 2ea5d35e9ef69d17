//! Model repositories
//!
//! [`CommonModelRepository`] exposes application models instead of entities. Reads map
//! entities through the [`MappingService`] and then let the [`ValidationService`] check
//! the results. Writes validate the model against [`RuleSet::Update`] first and only
//! touch the data service when validation passes.
//!
//! A rejected write and a missing model both come back as `Ok(false)`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::hooks::{AuditStamp, Unstamped, WriteHook};
use super::offload::{entity_type, row_count_succeeded, DataServiceHandle, WriteKind};
use super::traits::{Repository, RepositoryResult};
use crate::config::DataServiceConfig;
use crate::data::{DataService, Identifiable, Model, Predicate, Versioned};
use crate::identity::CurrentUser;
use crate::paging::{Pager, PagerResult};
use crate::services::{MappingService, RuleSet, ValidationService};

/// Rule sets every model write is validated against
const WRITE_RULE_SETS: [RuleSet; 1] = [RuleSet::Update];

/// Repository of models `M` persisted as entities `E`
pub struct CommonModelRepository<E, M, D, H = Unstamped> {
    data_service: DataServiceHandle<D>,
    mapper: Arc<dyn MappingService<E, M>>,
    validator: Arc<dyn ValidationService<M>>,
    hook: H,
    _entity: PhantomData<fn() -> E>,
}

/// Model repository over versioned entities; writes carry the acting username
pub type CommonModelVersionRepository<E, M, D> = CommonModelRepository<E, M, D, AuditStamp>;

impl<E, M, D> CommonModelRepository<E, M, D, Unstamped>
where
    E: Send + 'static,
    M: Send + 'static,
    D: DataService<E>,
{
    pub fn new(
        data_service: Arc<D>,
        mapper: Arc<dyn MappingService<E, M>>,
        validator: Arc<dyn ValidationService<M>>,
    ) -> Self {
        Self::with_hook(data_service, mapper, validator, Unstamped)
    }
}

impl<E, M, D> CommonModelRepository<E, M, D, AuditStamp>
where
    E: Versioned + Send + 'static,
    M: Send + 'static,
    D: DataService<E>,
{
    pub fn versioned(
        data_service: Arc<D>,
        mapper: Arc<dyn MappingService<E, M>>,
        validator: Arc<dyn ValidationService<M>>,
        current_user: Arc<dyn CurrentUser>,
    ) -> Self {
        Self::with_hook(data_service, mapper, validator, AuditStamp::new(current_user))
    }
}

impl<E, M, D, H> CommonModelRepository<E, M, D, H>
where
    E: Send + 'static,
    M: Send + 'static,
    D: DataService<E>,
    H: WriteHook<E>,
{
    pub fn with_hook(
        data_service: Arc<D>,
        mapper: Arc<dyn MappingService<E, M>>,
        validator: Arc<dyn ValidationService<M>>,
        hook: H,
    ) -> Self {
        Self {
            data_service: DataServiceHandle::new(data_service),
            mapper,
            validator,
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

impl<E, M, D, H> CommonModelRepository<E, M, D, H>
where
    E: Identifiable + Default + Send + Sync + 'static,
    M: Model<E> + Clone + Send + Sync + 'static,
    D: DataService<E>,
    H: WriteHook<E>,
{
    /// Validate a model and build the entity to persist; `None` when validation rejects it
    async fn entity_for(&self, model: &M) -> Option<E> {
        match self
            .validator
            .validate(model.clone(), &WRITE_RULE_SETS, true)
            .await
        {
            Ok(validated) => {
                let mut entity = validated.to_entity();
                self.hook.before_write(&mut entity);
                Some(entity)
            }
            Err(e) => {
                tracing::warn!(
                    entity_type = entity_type::<E>(),
                    model_id = model.id(),
                    error = %e,
                    "Model rejected by validation, write skipped"
                );
                None
            }
        }
    }

    async fn write(&self, kind: WriteKind, item: Option<&mut M>, with_children: bool) -> RepositoryResult<bool> {
        let Some(model) = item else {
            tracing::debug!(
                entity_type = entity_type::<E>(),
                operation = %kind.operation(),
                "No model supplied, write skipped"
            );
            return Ok(false);
        };

        let Some(entity) = self.entity_for(model).await else {
            return Ok(false);
        };

        let (count, written) = self.data_service.write(kind, entity, with_children).await?;
        if kind == WriteKind::Insert {
            model.set_id(written.id());
        }

        Ok(row_count_succeeded::<E>(kind, written.id(), count))
    }

    async fn delete_id(&self, id: i32, with_children: bool) -> RepositoryResult<bool> {
        let mut entity = E::default();
        entity.set_id(id);
        self.hook.before_write(&mut entity);

        let (count, _) = self
            .data_service
            .write(WriteKind::Delete, entity, with_children)
            .await?;
        Ok(row_count_succeeded::<E>(WriteKind::Delete, id, count))
    }

    /// Map entities to models, then run result validation
    ///
    /// The models come back alongside whether validation accepted them.
    async fn map_validated(&self, entities: Vec<E>) -> RepositoryResult<(Vec<M>, bool)> {
        let mut models = self.mapper.map_many(entities).await?;
        match self.validator.validate_results(&mut models).await {
            Ok(()) => Ok((models, true)),
            Err(e) => {
                tracing::warn!(
                    entity_type = entity_type::<E>(),
                    count = models.len(),
                    error = %e,
                    "Read results rejected by validation"
                );
                Ok((models, false))
            }
        }
    }

    /// List reads drop a batch that result validation rejected
    async fn validated_list(&self, entities: Vec<E>) -> RepositoryResult<Vec<M>> {
        let (models, accepted) = self.map_validated(entities).await?;
        Ok(if accepted { models } else { Vec::new() })
    }

    async fn map_optional(&self, entity: Option<E>) -> RepositoryResult<Option<M>> {
        match entity {
            Some(entity) => Ok(Some(self.mapper.map_one(entity).await?)),
            None => Ok(None),
        }
    }
}

impl<E, M, D, H> Repository<E> for CommonModelRepository<E, M, D, H>
where
    E: Identifiable + Default + Send + Sync + 'static,
    M: Model<E> + Clone + Send + Sync + 'static,
    D: DataService<E>,
    H: WriteHook<E>,
{
    type Item = M;

    async fn get_paged_list(&self, mut pager: Pager, predicate: Predicate<E>) -> RepositoryResult<PagerResult<M>> {
        let (entities, data_pager) = self.data_service.select_paged(&pager, predicate).await?;
        let (models, _) = self.map_validated(entities).await?;
        pager.populate_from(&data_pager);
        Ok(PagerResult::new(models, pager))
    }

    async fn get_list(&self, predicate: Predicate<E>) -> RepositoryResult<Vec<M>> {
        let entities = self.data_service.select_by(predicate).await?;
        self.validated_list(entities).await
    }

    async fn get_by_id(&self, id: i32) -> RepositoryResult<Option<M>> {
        let entity = self.data_service.select_by_id(id, false).await?;
        self.map_optional(entity).await
    }

    async fn get_by_id_with_children(&self, id: i32) -> RepositoryResult<Option<M>> {
        let entity = self.data_service.select_by_id(id, true).await?;
        self.map_optional(entity).await
    }

    async fn create(&self, item: Option<&mut M>) -> RepositoryResult<bool> {
        self.write(WriteKind::Insert, item, false).await
    }

    async fn create_with_children(&self, item: Option<&mut M>) -> RepositoryResult<bool> {
        self.write(WriteKind::Insert, item, true).await
    }

    async fn update(&self, item: Option<&mut M>) -> RepositoryResult<bool> {
        self.write(WriteKind::Update, item, false).await
    }

    async fn update_with_children(&self, item: Option<&mut M>) -> RepositoryResult<bool> {
        self.write(WriteKind::Update, item, true).await
    }

    async fn delete(&self, item: Option<&mut M>) -> RepositoryResult<bool> {
        self.write(WriteKind::Delete, item, false).await
    }

    async fn delete_with_children(&self, item: Option<&mut M>) -> RepositoryResult<bool> {
        self.write(WriteKind::Delete, item, true).await
    }

    async fn delete_by_id(&self, id: i32) -> RepositoryResult<bool> {
        self.delete_id(id, false).await
    }

    async fn delete_with_children_by_id(&self, id: i32) -> RepositoryResult<bool> {
        self.delete_id(id, true).await
    }

    async fn get_list_by_ids(&self, column_name: &str, ids: &[i32]) -> RepositoryResult<Vec<M>> {
        let entities = self
            .data_service
            .select_by_column_ids(column_name, ids, false)
            .await?;
        self.validated_list(entities).await
    }

    async fn get_list_with_children_by_ids(&self, column_name: &str, ids: &[i32]) -> RepositoryResult<Vec<M>> {
        let entities = self
            .data_service
            .select_by_column_ids(column_name, ids, true)
            .await?;
        self.validated_list(entities).await
    }
}

impl<E, M, D, H: Clone> Clone for CommonModelRepository<E, M, D, H> {
    fn clone(&self) -> Self {
        Self {
            data_service: self.data_service.clone(),
            mapper: Arc::clone(&self.mapper),
            validator: Arc::clone(&self.validator),
            hook: self.hook.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E, M, D, H: fmt::Debug> fmt::Debug for CommonModelRepository<E, M, D, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommonModelRepository")
            .field("entity_type", &entity_type::<E>())
            .field("model_type", &entity_type::<M>())
            .field("hook", &self.hook)
            .finish_non_exhaustive()
    }
}
