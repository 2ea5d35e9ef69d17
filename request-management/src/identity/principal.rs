//! Authenticated principals and the accessors that expose them

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Claim type identifiers consulted when resolving a username
pub mod claim_types {
    /// OpenID Connect preferred username (Azure AD puts the UPN here)
    pub const PREFERRED_USERNAME: &str = "preferred_username";
    /// Standard name claim
    pub const NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
    /// Standard email claim
    pub const EMAIL: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";
    /// Bare `name` claim as issued in JWT payloads
    pub const RAW_NAME: &str = "name";
}

/// A single claim on a principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// The identity behind the current request
///
/// ```rust
/// use request_management::identity::{claim_types, Principal};
///
/// let principal = Principal::authenticated()
///     .with_claim(claim_types::PREFERRED_USERNAME, "bob@example.com");
/// assert_eq!(
///     principal.find_first(claim_types::PREFERRED_USERNAME),
///     Some("bob@example.com")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Principal {
    authenticated: bool,
    name: Option<String>,
    claims: Vec<Claim>,
}

impl Principal {
    /// An authenticated principal with no claims yet
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    /// An unauthenticated principal
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.push(Claim::new(claim_type, value));
        self
    }

    /// Set the identity's own display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Value of the first claim of the given type
    pub fn find_first(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }
}

/// Read-only access to the principal of the request being served
pub trait IdentityAccessor: Send + Sync {
    /// The current principal, or `None` outside of any request
    fn principal(&self) -> Option<Principal>;
}

/// Accessor for contexts that never carry an identity (jobs, tools)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

impl IdentityAccessor for NoIdentity {
    fn principal(&self) -> Option<Principal> {
        None
    }
}

/// Accessor returning a fixed principal
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<Principal>);

impl StaticIdentity {
    pub fn new(principal: Principal) -> Self {
        Self(Some(principal))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl IdentityAccessor for StaticIdentity {
    fn principal(&self) -> Option<Principal> {
        self.0.clone()
    }
}

tokio::task_local! {
    static CURRENT_PRINCIPAL: Principal;
}

/// Accessor backed by a tokio task-local installed per request
///
/// Request handlers wrap their work in [`TaskLocalIdentity::scope`]; everything awaited
/// inside sees that principal. Work moved to another task (including blocking workers)
/// does not.
///
/// ```rust
/// use request_management::identity::{IdentityAccessor, Principal, TaskLocalIdentity};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let accessor = TaskLocalIdentity;
/// assert!(accessor.principal().is_none());
///
/// let seen = TaskLocalIdentity::scope(Principal::authenticated().with_name("Alice"), async {
///     accessor.principal().and_then(|p| p.name().map(str::to_owned))
/// })
/// .await;
/// assert_eq!(seen.as_deref(), Some("Alice"));
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskLocalIdentity;

impl TaskLocalIdentity {
    /// Run `future` with `principal` as the current identity
    pub async fn scope<F>(principal: Principal, future: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_PRINCIPAL.scope(principal, future).await
    }
}

impl IdentityAccessor for TaskLocalIdentity {
    fn principal(&self) -> Option<Principal> {
        CURRENT_PRINCIPAL.try_with(Clone::clone).ok()
    }
}
