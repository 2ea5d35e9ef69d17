//! Generic repositories over business-entity data services
//!
//! This module provides one repository contract and two families of implementations,
//! giving a consistent interface to every entity the application persists.
//!
//! # Features
//!
//! - **Contract**: [`Repository`] for paged listing, lookup, writes and batch lookup
//! - **Entity repositories**: [`CommonRepository`] and its audit-stamping form
//!   [`CommonVersionRepository`]
//! - **Model repositories**: [`CommonModelRepository`] and
//!   [`CommonModelVersionRepository`], which map and validate
//! - **Write hooks**: [`WriteHook`] runs on each entity right before it is written
//! - **Errors**: [`RepositoryError`] with operation and kind
//!
//! Data-service calls are synchronous; repositories run them on tokio's blocking pool.
//!
//! # Example
//!
//! ```rust,ignore
//! use request_management::prelude::*;
//!
//! let repo = CommonRepository::new(Arc::new(call_sheet_service));
//! let page = repo
//!     .get_paged_list(Pager::with_page_size(20), Predicate::all())
//!     .await?;
//! println!("{} of {}", page.len(), page.pager.total_counts);
//! ```

mod common;
mod error;
mod hooks;
mod model;
mod offload;
mod traits;

pub use common::{CommonRepository, CommonVersionRepository};
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use hooks::{AuditStamp, Unstamped, WriteHook};
pub use model::{CommonModelRepository, CommonModelVersionRepository};
pub use traits::{Repository, RepositoryResult};
