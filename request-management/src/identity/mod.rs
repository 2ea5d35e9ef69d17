//! Request identity and the acting username
//!
//! [`CurrentUserService`] answers "who is doing this?" for audit stamping. It reads the
//! request's [`Principal`] through an [`IdentityAccessor`] and falls back to a settable
//! username for work that runs outside a request.

mod current_user;
mod principal;
mod token;

pub use current_user::{CurrentUser, CurrentUserService, SYSTEM_USERNAME};
pub use principal::{
    claim_types, Claim, IdentityAccessor, NoIdentity, Principal, StaticIdentity,
    TaskLocalIdentity,
};
pub use token::TokenClaims;

#[cfg(feature = "jwt")]
pub use token::JwtIdentityDecoder;
