//! Paged query results

use serde::{Deserialize, Serialize};

use super::pager::Pager;

/// One page of results together with the pager that produced it
///
/// Nothing ties `result` to `pager`; keeping them consistent is up to whoever fills
/// them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerResult<T> {
    pub result: Vec<T>,
    pub pager: Pager,
}

impl<T> PagerResult<T> {
    pub fn new(result: Vec<T>, pager: Pager) -> Self {
        Self { result, pager }
    }

    /// Project every item, keeping the pager
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagerResult<U> {
        PagerResult {
            result: self.result.into_iter().map(f).collect(),
            pager: self.pager,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }

    pub fn len(&self) -> usize {
        self.result.len()
    }
}

impl<T> Default for PagerResult<T> {
    fn default() -> Self {
        Self {
            result: Vec::new(),
            pager: Pager::new(),
        }
    }
}
