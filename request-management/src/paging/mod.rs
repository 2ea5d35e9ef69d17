//! Paging, sorting and filtering types
//!
//! - [`Pager`]: per-request paging descriptor, refreshed with totals after a query
//! - [`DataPager`]: the paging state handed to a data service
//! - [`FilterCondition`] / [`FilterValue`]: open-ended field filters
//! - [`PagerResult`]: a page of items plus the pager that produced it

mod filter;
mod pager;
mod result;

pub use filter::{operators, FilterCondition, FilterValue};
pub use pager::{DataPager, Pager, DEFAULT_PAGE_SIZE, FIRST_PAGE};
pub use result::PagerResult;
