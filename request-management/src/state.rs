//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::data::{DataService, Versioned};
use crate::error::Result;
use crate::identity::{CurrentUserService, IdentityAccessor, TaskLocalIdentity};
use crate::paging::Pager;
use crate::repository::{CommonRepository, CommonVersionRepository};

/// State shared by everything that builds repositories
///
/// Cloning is cheap; all fields are reference counted.
#[derive(Clone, Debug)]
pub struct AppState {
    config: Arc<Config>,
    current_user: Arc<CurrentUserService>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    /// Create state from a config, resolving identity from the request task-local
    pub fn new(config: Config) -> Self {
        Self::with_identity(config, Arc::new(TaskLocalIdentity))
    }

    fn with_identity(config: Config, accessor: Arc<dyn IdentityAccessor>) -> Self {
        let current_user = Arc::new(CurrentUserService::with_default_username(
            accessor,
            config.identity.default_username.clone(),
        ));
        Self {
            config: Arc::new(config),
            current_user,
        }
    }

    /// Create a builder for AppState
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The service answering "who is doing this?"
    pub fn current_user(&self) -> &Arc<CurrentUserService> {
        &self.current_user
    }

    /// A first-page pager using the configured default page size
    pub fn pager(&self) -> Pager {
        Pager::with_page_size(self.config.paging.default_page_size)
    }

    /// Entity repository configured from `data_service` settings
    pub fn repository<E, D>(&self, data_service: Arc<D>) -> CommonRepository<E, D>
    where
        D: DataService<E>,
    {
        CommonRepository::new(data_service).with_config(&self.config.data_service)
    }

    /// Version repository stamping writes with this state's current user
    pub fn version_repository<E, D>(&self, data_service: Arc<D>) -> CommonVersionRepository<E, D>
    where
        E: Versioned,
        D: DataService<E>,
    {
        CommonRepository::versioned(data_service, self.current_user.clone())
            .with_config(&self.config.data_service)
    }
}

/// Builder for AppState
pub struct AppStateBuilder {
    config: Option<Config>,
    identity: Option<Arc<dyn IdentityAccessor>>,
    enable_tracing: bool,
}

impl AppStateBuilder {
    /// Create a new builder with sensible defaults
    ///
    /// By default:
    /// - Config will be loaded from `Config::default()` if not provided
    /// - Identity comes from [`TaskLocalIdentity`]
    /// - Tracing will be auto-initialized if not already set up
    pub fn new() -> Self {
        Self {
            config: None,
            identity: None,
            enable_tracing: true,
        }
    }

    /// Set the configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set where the request identity comes from
    pub fn identity(mut self, accessor: Arc<dyn IdentityAccessor>) -> Self {
        self.identity = Some(accessor);
        self
    }

    /// Enable automatic tracing initialization (default: enabled)
    pub fn with_tracing(mut self) -> Self {
        self.enable_tracing = true;
        self
    }

    /// Disable automatic tracing initialization
    ///
    /// Use this if your application already has tracing configured before calling `build()`.
    pub fn without_tracing(mut self) -> Self {
        self.enable_tracing = false;
        self
    }

    /// Initialize tracing from config once per process
    fn init_tracing(config: &Config) {
        use std::sync::Once;
        static INIT: Once = Once::new();

        INIT.call_once(|| {
            if let Err(e) = crate::observability::init_tracing(config) {
                eprintln!("{}", e);
            }
        });
    }

    /// Build the AppState
    pub fn build(self) -> Result<AppState> {
        let config = self.config.unwrap_or_default();

        if self.enable_tracing {
            Self::init_tracing(&config);
        }

        let accessor = self.identity.unwrap_or_else(|| Arc::new(TaskLocalIdentity));
        let state = AppState::with_identity(config, accessor);
        tracing::debug!(
            service = %state.config.service.name,
            default_username = %state.config.identity.default_username,
            "Application state built"
        );
        Ok(state)
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{claim_types, CurrentUser, NoIdentity, Principal, StaticIdentity};

    #[test]
    fn test_default_state_uses_system_user() {
        let state = AppState::builder().without_tracing().build().unwrap();
        assert_eq!(state.current_user().current_username(), "SYSTEM");
        assert_eq!(state.config().paging.default_page_size, 8);
        assert_eq!(state.pager().page_size, 8);
        assert_eq!(state.pager().page_index, 1);
    }

    #[test]
    fn test_configured_default_username() {
        let mut config = Config::default();
        config.identity.default_username = "NIGHTLY".to_string();

        let state = AppState::builder()
            .config(config)
            .identity(Arc::new(NoIdentity))
            .without_tracing()
            .build()
            .unwrap();
        assert_eq!(state.current_user().current_username(), "NIGHTLY");
    }

    #[test]
    fn test_custom_identity_accessor() {
        let principal = Principal::authenticated().with_claim(claim_types::EMAIL, "sam@example.com");
        let state = AppState::builder()
            .identity(Arc::new(StaticIdentity::new(principal)))
            .without_tracing()
            .build()
            .unwrap();
        assert_eq!(state.current_user().current_username(), "sam");
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn test_version_repository_uses_state_identity() {
        use crate::catalog::StickDiagramTemplate;
        use crate::data::memory::InMemoryDataService;
        use crate::repository::Repository;

        let mut config = Config::default();
        config.data_service.offload_blocking = false;
        let state = AppState::builder().config(config).without_tracing().build().unwrap();

        let service = Arc::new(InMemoryDataService::<StickDiagramTemplate>::new());
        let repo = state.version_repository::<StickDiagramTemplate, _>(Arc::clone(&service));

        let mut template = StickDiagramTemplate {
            name: "Intermediate".to_string(),
            ..StickDiagramTemplate::default()
        };
        let created = TaskLocalIdentity::scope(
            Principal::authenticated().with_claim(claim_types::PREFERRED_USERNAME, "robin@corp.example"),
            repo.create(Some(&mut template)),
        )
        .await
        .unwrap();

        assert!(created);
        assert_eq!(service.get(template.id).unwrap().modified_user_name, "robin");
    }
}
