//! # request-management
//!
//! Data-access layer for Request Management: generic paged repositories over
//! business-entity data services, with entity-to-model mapping, validate-or-abort writes
//! and audit stamping of the acting user on versioned entities.
//!
//! ## Features
//!
//! - **Paging**: [`Pager`](paging::Pager) round-trips through the data service and comes
//!   back with totals inside a [`PagerResult`](paging::PagerResult)
//! - **Repositories**: one [`Repository`](repository::Repository) contract for entity and
//!   model repositories
//! - **Audit stamping**: version repositories record who wrote each row
//! - **Identity**: [`CurrentUserService`](identity::CurrentUserService) resolves the acting
//!   username from the request principal
//! - **In-memory data service** (feature `memory`, default): for tests and local work
//! - **JWT** (feature `jwt`): bearer tokens to principals
//!
//! ## Example
//!
//! ```rust,no_run
//! use request_management::prelude::*;
//! use request_management::catalog::CallSheet;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::builder()
//!         .config(config)
//!         .without_tracing()
//!         .build()?;
//!
//!     let repo = state.repository::<CallSheet, _>(Arc::new(InMemoryDataService::<CallSheet>::new()));
//!     let page = repo.get_paged_list(Pager::new(), Predicate::all()).await?;
//!     println!("{} call sheets", page.pager.total_counts);
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod identity;
pub mod observability;
pub mod paging;
pub mod repository;
pub mod services;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, DataServiceConfig, IdentityConfig, PagingConfig, ServiceConfig};
    pub use crate::error::{Error, Result};

    pub use crate::data::{DataService, Identifiable, Model, Pageable, Predicate, Readable, Versioned, Writable};

    #[cfg(feature = "memory")]
    pub use crate::data::memory::InMemoryDataService;

    pub use crate::identity::{
        CurrentUser, CurrentUserService, IdentityAccessor, NoIdentity, Principal, StaticIdentity,
        TaskLocalIdentity, TokenClaims,
    };

    #[cfg(feature = "jwt")]
    pub use crate::identity::JwtIdentityDecoder;

    pub use crate::observability::{init_tracing, shutdown_tracing};

    pub use crate::paging::{DataPager, FilterCondition, FilterValue, Pager, PagerResult};

    pub use crate::repository::{
        AuditStamp, CommonModelRepository, CommonModelVersionRepository, CommonRepository,
        CommonVersionRepository, Repository, RepositoryError, RepositoryErrorKind,
        RepositoryOperation, RepositoryResult, Unstamped, WriteHook,
    };

    pub use crate::services::{MappingService, RuleSet, ValidationError, ValidationService};

    pub use crate::state::{AppState, AppStateBuilder};

    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
