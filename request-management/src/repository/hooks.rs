//! Write hooks
//!
//! A [`WriteHook`] sees every entity right before it is handed to the data service for
//! insert, update or delete. [`AuditStamp`] is the hook behind version repositories.

use std::fmt;
use std::sync::Arc;

use crate::data::Versioned;
use crate::identity::CurrentUser;

/// Last-moment adjustment of an entity about to be written
pub trait WriteHook<E>: Send + Sync {
    fn before_write(&self, entity: &mut E);
}

/// Leaves entities as they are
#[derive(Debug, Clone, Copy, Default)]
pub struct Unstamped;

impl<E> WriteHook<E> for Unstamped {
    fn before_write(&self, _entity: &mut E) {}
}

/// Overwrites `modified_user_name` with the acting username
///
/// The username is resolved at write time, once per write.
#[derive(Clone)]
pub struct AuditStamp {
    current_user: Arc<dyn CurrentUser>,
}

impl AuditStamp {
    pub fn new(current_user: Arc<dyn CurrentUser>) -> Self {
        Self { current_user }
    }
}

impl fmt::Debug for AuditStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditStamp").finish_non_exhaustive()
    }
}

impl<E: Versioned> WriteHook<E> for AuditStamp {
    fn before_write(&self, entity: &mut E) {
        let username = self.current_user.current_username();
        tracing::trace!(entity_id = entity.id(), username = %username, "Stamping modified user");
        entity.set_modified_user_name(username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Identifiable;

    #[derive(Default)]
    struct Row {
        id: i32,
        modified_user_name: String,
    }

    impl Identifiable for Row {
        fn id(&self) -> i32 {
            self.id
        }
        fn set_id(&mut self, id: i32) {
            self.id = id;
        }
        fn name(&self) -> &str {
            ""
        }
    }

    impl Versioned for Row {
        fn modified_user_name(&self) -> &str {
            &self.modified_user_name
        }
        fn set_modified_user_name(&mut self, user_name: String) {
            self.modified_user_name = user_name;
        }
    }

    struct Fixed(&'static str);

    impl CurrentUser for Fixed {
        fn current_username(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_audit_stamp_overwrites() {
        let mut row = Row {
            id: 3,
            modified_user_name: "previous".to_string(),
        };
        AuditStamp::new(Arc::new(Fixed("kim"))).before_write(&mut row);
        assert_eq!(row.modified_user_name(), "kim");
    }

    #[test]
    fn test_unstamped_is_noop() {
        let mut row = Row {
            id: 3,
            modified_user_name: "previous".to_string(),
        };
        Unstamped.before_write(&mut row);
        assert_eq!(row.modified_user_name, "previous");
    }
}
