//! Resolution of the acting username

use std::sync::{Arc, PoisonError, RwLock};

use super::principal::{claim_types, IdentityAccessor, Principal};

/// Username used when nothing else identifies the caller
pub const SYSTEM_USERNAME: &str = "SYSTEM";

/// Claims consulted for an authenticated principal, in priority order
const USERNAME_CLAIMS: [&str; 4] = [
    claim_types::PREFERRED_USERNAME,
    claim_types::NAME,
    claim_types::EMAIL,
    claim_types::RAW_NAME,
];

/// Anything that can name the user on whose behalf work is done
pub trait CurrentUser: Send + Sync {
    /// The acting username; never empty
    fn current_username(&self) -> String;
}

/// Resolves the acting username from the request identity, with a settable fallback
///
/// For an authenticated principal the first non-empty value among `preferred_username`,
/// the standard name claim, the standard email claim, the bare `name` claim and the
/// principal's display name wins. Otherwise the fallback set through
/// [`set_current_username`](Self::set_current_username) is used, `"SYSTEM"` by default.
/// Either way an email-shaped value is cut down to its local part.
///
/// ```rust
/// use std::sync::Arc;
/// use request_management::identity::{
///     claim_types, CurrentUser, CurrentUserService, NoIdentity, Principal, StaticIdentity,
/// };
///
/// let service = CurrentUserService::new(Arc::new(NoIdentity));
/// assert_eq!(service.current_username(), "SYSTEM");
///
/// service.set_current_username(Some("mark@example.org"));
/// assert_eq!(service.current_username(), "mark");
///
/// let signed_in = CurrentUserService::new(Arc::new(StaticIdentity::new(
///     Principal::authenticated().with_claim(claim_types::PREFERRED_USERNAME, "bob@example.com"),
/// )));
/// assert_eq!(signed_in.current_username(), "bob");
/// ```
pub struct CurrentUserService {
    accessor: Arc<dyn IdentityAccessor>,
    default_username: String,
    fallback: RwLock<String>,
}

impl CurrentUserService {
    /// Create a service whose fallback starts as `"SYSTEM"`
    pub fn new(accessor: Arc<dyn IdentityAccessor>) -> Self {
        Self::with_default_username(accessor, SYSTEM_USERNAME)
    }

    /// Create a service with a different default fallback
    ///
    /// An empty default is replaced by `"SYSTEM"`.
    pub fn with_default_username(
        accessor: Arc<dyn IdentityAccessor>,
        default_username: impl Into<String>,
    ) -> Self {
        let mut default_username = default_username.into();
        if default_username.is_empty() {
            default_username = SYSTEM_USERNAME.to_string();
        }
        Self {
            accessor,
            fallback: RwLock::new(default_username.clone()),
            default_username,
        }
    }

    /// Store the username used when no authenticated identity is present
    ///
    /// `None` or an empty string resets the fallback to the default.
    pub fn set_current_username(&self, username: Option<&str>) {
        let value = match username {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.default_username.clone(),
        };
        tracing::debug!(username = %value, "Fallback username set");
        *self.fallback.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    fn from_principal(principal: &Principal) -> Option<String> {
        if !principal.is_authenticated() {
            return None;
        }

        USERNAME_CLAIMS
            .iter()
            .filter_map(|claim_type| principal.find_first(claim_type))
            .chain(principal.name())
            .find(|value| !value.is_empty())
            .map(str::to_owned)
    }
}

impl CurrentUser for CurrentUserService {
    fn current_username(&self) -> String {
        if let Some(username) = self
            .accessor
            .principal()
            .as_ref()
            .and_then(Self::from_principal)
        {
            return local_part(&username).to_string();
        }

        let fallback = self.fallback.read().unwrap_or_else(PoisonError::into_inner);
        local_part(&fallback).to_string()
    }
}

impl std::fmt::Debug for CurrentUserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUserService")
            .field("default_username", &self.default_username)
            .finish_non_exhaustive()
    }
}

/// Text before the first `@`, or the whole value if it does not contain one past
/// position zero
fn local_part(username: &str) -> &str {
    match username.find('@') {
        Some(at) if at > 0 => &username[..at],
        _ => username,
    }
}
