//! Paging descriptor and its data-service counterpart
//!
//! A [`Pager`] is built by the caller for one request, copied into a [`DataPager`]
//! before the data service runs the paged query, and refreshed from it afterwards so the
//! caller sees the post-query totals.
//!
//! # Example
//!
//! ```rust
//! use request_management::paging::{DataPager, Pager};
//!
//! let mut pager = Pager::with_values(2, 20, 0, 0);
//! pager.order_by = "Name desc".to_string();
//!
//! let mut data_pager = DataPager::default();
//! pager.populate_to(Some(&mut data_pager));
//! assert_eq!(data_pager.page_index, 2);
//!
//! // The data service fills in the totals
//! data_pager.total_counts = 57;
//! data_pager.page_total = 3;
//!
//! pager.populate_from(&data_pager);
//! assert_eq!(pager.total_counts, 57);
//! ```

use serde::{Deserialize, Serialize};

use super::filter::FilterCondition;

/// Page index a fresh or reset pager points at
pub const FIRST_PAGE: i32 = 1;

/// Page size of a default-constructed pager
pub const DEFAULT_PAGE_SIZE: i32 = 8;

/// Paging, sorting and filtering state for one paged query
///
/// `page_index` is 1-based. The numeric fields are stored verbatim; nothing here clamps
/// or recomputes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pager {
    /// Current page (1-based)
    pub page_index: i32,
    /// Rows per page
    pub page_size: i32,
    /// Number of pages reported by the last query
    pub page_total: i32,
    /// Number of matching rows reported by the last query
    pub total_counts: i32,
    /// Sort expression understood by the data service (empty for none)
    pub order_by: String,
    /// Filter conditions applied to the data set, in order
    pub filter: Vec<FilterCondition>,
}

impl Pager {
    /// Create a pager on the first page with the default page size
    pub fn new() -> Self {
        Self {
            page_index: FIRST_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            page_total: 0,
            total_counts: 0,
            order_by: String::new(),
            filter: Vec::new(),
        }
    }

    /// Create a pager with explicit numeric state and no sort or filter
    pub fn with_values(page_index: i32, page_size: i32, page_total: i32, total_counts: i32) -> Self {
        Self {
            page_index,
            page_size,
            page_total,
            total_counts,
            order_by: String::new(),
            filter: Vec::new(),
        }
    }

    /// Create a first-page pager with a given page size
    pub fn with_page_size(page_size: i32) -> Self {
        Self {
            page_size,
            ..Self::new()
        }
    }

    /// Add a filter condition
    #[must_use]
    pub fn with_filter(mut self, condition: FilterCondition) -> Self {
        self.filter.push(condition);
        self
    }

    /// Set the sort expression
    #[must_use]
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    /// Reset to the first page and clear totals and sorting
    ///
    /// `page_size` and `filter` are kept.
    pub fn init(&mut self) {
        self.page_index = FIRST_PAGE;
        self.page_total = 0;
        self.total_counts = 0;
        self.order_by.clear();
    }

    /// Overwrite the tracked fields from a data-service pager
    ///
    /// Filters are not copied back; they only travel outward.
    pub fn populate_from(&mut self, source: &DataPager) {
        self.page_index = source.page_index;
        self.page_size = source.page_size;
        self.page_total = source.page_total;
        self.total_counts = source.total_counts;
        self.order_by.clone_from(&source.order_by);
    }

    /// Copy the tracked fields onto a data-service pager, if there is one
    pub fn populate_to(&self, target: Option<&mut DataPager>) {
        if let Some(target) = target {
            target.page_index = self.page_index;
            target.page_size = self.page_size;
            target.page_total = self.page_total;
            target.total_counts = self.total_counts;
            target.order_by.clone_from(&self.order_by);
        }
    }

    /// Build the data-service pager for a query, filters included
    pub fn to_data_pager(&self) -> DataPager {
        let mut data_pager = DataPager {
            filter: self.filter.clone(),
            ..DataPager::default()
        };
        self.populate_to(Some(&mut data_pager));
        data_pager
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new()
    }
}

/// Paging state in the shape the data service consumes and updates
///
/// A data service reads `page_index`, `page_size`, `order_by` and `filter`, and writes
/// `page_total` and `total_counts` after running the query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataPager {
    pub page_index: i32,
    pub page_size: i32,
    pub page_total: i32,
    pub total_counts: i32,
    pub order_by: String,
    pub filter: Vec<FilterCondition>,
}

impl DataPager {
    /// Zero-based row offset of the current page
    pub fn offset(&self) -> usize {
        let index = usize::try_from(self.page_index.max(FIRST_PAGE) - FIRST_PAGE).unwrap_or(0);
        index.saturating_mul(self.limit())
    }

    /// Row limit of the current page
    pub fn limit(&self) -> usize {
        usize::try_from(self.page_size).unwrap_or(0)
    }

    /// Record the totals of a query that matched `total` rows
    pub fn set_totals(&mut self, total: usize) {
        self.total_counts = i32::try_from(total).unwrap_or(i32::MAX);
        self.page_total = match self.limit() {
            0 => 0,
            size => i32::try_from(total.div_ceil(size)).unwrap_or(i32::MAX),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constructor_sets_defaults() {
        let pager = Pager::new();
        assert_eq!(pager.page_index, 1);
        assert_eq!(pager.page_size, 8);
        assert_eq!(pager.page_total, 0);
        assert_eq!(pager.total_counts, 0);
        assert_eq!(pager.order_by, "");
        assert!(pager.filter.is_empty());
        assert_eq!(Pager::default(), pager);
    }

    #[test]
    fn test_with_values_is_verbatim() {
        let pager = Pager::with_values(2, 15, 4, 60);
        assert_eq!(pager.page_index, 2);
        assert_eq!(pager.page_size, 15);
        assert_eq!(pager.page_total, 4);
        assert_eq!(pager.total_counts, 60);
        assert_eq!(pager.order_by, "");

        // No clamping, even for nonsense input
        let pager = Pager::with_values(0, -1, -2, -3);
        assert_eq!(pager.page_index, 0);
        assert_eq!(pager.page_size, -1);
    }

    #[test]
    fn test_init_keeps_page_size_and_filter() {
        let mut pager = Pager::with_values(3, 20, 5, 100)
            .with_order_by("name")
            .with_filter(FilterCondition::equal("Status", "Active"));
        pager.init();

        assert_eq!(pager.page_index, 1);
        assert_eq!(pager.page_total, 0);
        assert_eq!(pager.total_counts, 0);
        assert_eq!(pager.order_by, "");
        assert_eq!(pager.page_size, 20);
        assert_eq!(pager.filter.len(), 1);
    }

    #[test]
    fn test_populate_from_and_to() {
        let source = DataPager {
            page_index: 5,
            page_size: 50,
            page_total: 10,
            total_counts: 500,
            order_by: "email".to_string(),
            filter: Vec::new(),
        };

        let mut pager = Pager::new();
        pager.populate_from(&source);
        assert_eq!(pager.page_index, 5);
        assert_eq!(pager.page_size, 50);
        assert_eq!(pager.page_total, 10);
        assert_eq!(pager.total_counts, 500);
        assert_eq!(pager.order_by, "email");

        let mut target = DataPager::default();
        pager.populate_to(Some(&mut target));
        assert_eq!(target, source);

        pager.populate_to(None);
    }

    #[test]
    fn test_round_trip_through_data_pager() {
        let original = Pager::with_values(7, 25, 3, 61).with_order_by("JobDate desc");
        let mut data_pager = DataPager::default();
        original.populate_to(Some(&mut data_pager));

        let mut copy = Pager::new();
        copy.populate_from(&data_pager);

        assert_eq!(copy.page_index, original.page_index);
        assert_eq!(copy.page_size, original.page_size);
        assert_eq!(copy.page_total, original.page_total);
        assert_eq!(copy.total_counts, original.total_counts);
        assert_eq!(copy.order_by, original.order_by);
    }

    #[test]
    fn test_populate_from_leaves_filter_alone() {
        let mut pager = Pager::new().with_filter(FilterCondition::contains("Name", "well"));
        pager.populate_from(&DataPager::default());
        assert_eq!(pager.filter.len(), 1);
    }

    #[test]
    fn test_to_data_pager_carries_filters() {
        let pager = Pager::with_page_size(10).with_filter(FilterCondition::equal("Id", 3_i64));
        let data_pager = pager.to_data_pager();
        assert_eq!(data_pager.page_size, 10);
        assert_eq!(data_pager.filter, pager.filter);
    }

    #[test]
    fn test_data_pager_offset_and_totals() {
        let mut data_pager = Pager::with_values(3, 8, 0, 0).to_data_pager();
        assert_eq!(data_pager.offset(), 16);
        assert_eq!(data_pager.limit(), 8);

        data_pager.set_totals(17);
        assert_eq!(data_pager.total_counts, 17);
        assert_eq!(data_pager.page_total, 3);

        data_pager.page_size = 0;
        data_pager.set_totals(17);
        assert_eq!(data_pager.page_total, 0);
    }

    #[test]
    fn test_serde_camel_case() {
        let json = serde_json::to_value(Pager::new()).unwrap();
        assert_eq!(json["pageIndex"], 1);
        assert_eq!(json["pageSize"], 8);
        assert_eq!(json["orderBy"], "");

        let pager: Pager = serde_json::from_str(r#"{"pageIndex":4}"#).unwrap();
        assert_eq!(pager.page_index, 4);
        assert_eq!(pager.page_size, 8);
    }
}
