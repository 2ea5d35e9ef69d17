//! Async access to a synchronous data service

use std::sync::Arc;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::RepositoryResult;
use crate::data::{DataService, Identifiable, Predicate};
use crate::paging::{DataPager, Pager};

/// Which write a data-service call performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteKind {
    Insert,
    Update,
    Delete,
}

impl WriteKind {
    pub(crate) fn operation(self) -> RepositoryOperation {
        match self {
            Self::Insert => RepositoryOperation::Insert,
            Self::Update => RepositoryOperation::Update,
            Self::Delete => RepositoryOperation::Delete,
        }
    }
}

/// Short type name for log fields
pub(crate) fn entity_type<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Shared data service plus the policy for running its blocking calls
#[derive(Debug)]
pub(crate) struct DataServiceHandle<D> {
    service: Arc<D>,
    offload_blocking: bool,
}

impl<D> Clone for DataServiceHandle<D> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            offload_blocking: self.offload_blocking,
        }
    }
}

impl<D: Send + Sync + 'static> DataServiceHandle<D> {
    pub(crate) fn new(service: Arc<D>) -> Self {
        Self {
            service,
            offload_blocking: true,
        }
    }

    pub(crate) fn set_offload_blocking(&mut self, offload_blocking: bool) {
        self.offload_blocking = offload_blocking;
    }

    /// Run `f` against the data service, on the blocking pool unless offloading is off
    async fn call<T, F>(&self, operation: RepositoryOperation, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&D) -> RepositoryResult<T> + Send + 'static,
    {
        if !self.offload_blocking {
            return f(&self.service);
        }

        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| RepositoryError::from(e).with_operation(operation))?
    }

    pub(crate) async fn select_paged<E>(
        &self,
        pager: &Pager,
        predicate: Predicate<E>,
    ) -> RepositoryResult<(Vec<E>, DataPager)>
    where
        E: Default + Send + 'static,
        D: DataService<E>,
    {
        let mut data_pager = pager.to_data_pager();

        let (entities, data_pager) = self
            .call(RepositoryOperation::SelectPaged, move |service| {
                let entities = service.select_paged(&mut data_pager, &E::default(), &predicate)?;
                Ok((entities, data_pager))
            })
            .await?;

        tracing::debug!(
            entity_type = entity_type::<E>(),
            page_index = data_pager.page_index,
            returned = entities.len(),
            total_counts = data_pager.total_counts,
            "Selected page"
        );
        Ok((entities, data_pager))
    }

    pub(crate) async fn select_by<E>(&self, predicate: Predicate<E>) -> RepositoryResult<Vec<E>>
    where
        E: Default + Send + 'static,
        D: DataService<E>,
    {
        let entities = self
            .call(RepositoryOperation::SelectBy, move |service| {
                service.select_by(&E::default(), &predicate)
            })
            .await?
            .unwrap_or_default();

        tracing::debug!(entity_type = entity_type::<E>(), returned = entities.len(), "Selected list");
        Ok(entities)
    }

    pub(crate) async fn select_by_id<E>(&self, id: i32, with_children: bool) -> RepositoryResult<Option<E>>
    where
        E: Identifiable + Default + Send + 'static,
        D: DataService<E>,
    {
        let entity = self
            .call(RepositoryOperation::SelectById, move |service| {
                let mut template = E::default();
                template.set_id(id);
                service.select_by_id(&template, with_children)
            })
            .await?;

        tracing::debug!(
            entity_type = entity_type::<E>(),
            entity_id = id,
            with_children,
            found = entity.is_some(),
            "Selected by id"
        );
        Ok(entity)
    }

    pub(crate) async fn select_by_column_ids<E>(
        &self,
        column_name: &str,
        ids: &[i32],
        with_children: bool,
    ) -> RepositoryResult<Vec<E>>
    where
        E: Send + 'static,
        D: DataService<E>,
    {
        let column = column_name.to_string();
        let ids = ids.to_vec();
        let entities = self
            .call(RepositoryOperation::SelectByColumnIds, move |service| {
                service.select_by_column_ids(&column, &ids, with_children)
            })
            .await?
            .unwrap_or_default();

        tracing::debug!(
            entity_type = entity_type::<E>(),
            column = column_name,
            with_children,
            returned = entities.len(),
            "Selected by column ids"
        );
        Ok(entities)
    }

    /// Hand `entity` to the data service; returns the row count and the entity as the
    /// data service left it
    pub(crate) async fn write<E>(
        &self,
        kind: WriteKind,
        mut entity: E,
        with_children: bool,
    ) -> RepositoryResult<(u64, E)>
    where
        E: Identifiable + Send + 'static,
        D: DataService<E>,
    {
        self.call(kind.operation(), move |service| {
            let count = match kind {
                WriteKind::Insert => service.insert(&mut entity, with_children)?,
                WriteKind::Update => service.update(&mut entity, with_children)?,
                WriteKind::Delete => service.delete(&mut entity, with_children)?,
            };
            Ok((count, entity))
        })
        .await
    }
}

/// Exactly one affected row is success; anything else is logged and reported as failure
pub(crate) fn row_count_succeeded<E>(kind: WriteKind, entity_id: i32, count: u64) -> bool {
    if count == 1 {
        tracing::debug!(
            entity_type = entity_type::<E>(),
            operation = %kind.operation(),
            entity_id,
            "Write succeeded"
        );
        true
    } else {
        tracing::warn!(
            entity_type = entity_type::<E>(),
            operation = %kind.operation(),
            entity_id,
            rows = count,
            "Unexpected row count"
        );
        false
    }
}
