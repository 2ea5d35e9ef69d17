//! In-memory data service
//!
//! Stores entities in a concurrent map keyed by identity. Predicates run directly
//! against the stored values; pager filters and sort expressions run against the
//! entity's serde JSON form, so field names match the serialized names (compared
//! without case or underscores, so `ModifiedUserName` finds `modified_user_name`).
//!
//! Entities are stored whole, so the `with_children` flags make no difference here.
//!
//! ```rust
//! use request_management::catalog::CallSheet;
//! use request_management::data::memory::InMemoryDataService;
//! use request_management::data::{Predicate, Readable, Writable};
//!
//! let service = InMemoryDataService::<CallSheet>::new();
//! let mut sheet = CallSheet { name: "Pad 7".into(), ..CallSheet::default() };
//! assert_eq!(service.insert(&mut sheet, false).unwrap(), 1);
//! assert_eq!(sheet.id, 1);
//!
//! let all = service.select_by(&CallSheet::default(), &Predicate::all()).unwrap();
//! assert_eq!(all.map(|rows| rows.len()), Some(1));
//! ```

use std::cmp::Ordering;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use chrono::{DateTime, FixedOffset};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

use super::{Identifiable, Pageable, Predicate, Readable, Writable};
use crate::paging::{operators, DataPager, FilterCondition};
use crate::repository::{RepositoryError, RepositoryOperation, RepositoryResult};

/// Data service keeping entities in process memory
#[derive(Debug)]
pub struct InMemoryDataService<E> {
    rows: DashMap<i32, E>,
    // `i32::MAX + 1` marks the identity space as used up
    next_id: AtomicI64,
}

impl<E> InMemoryDataService<E>
where
    E: Identifiable + Clone + Serialize,
{
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Create a service pre-loaded with entities, keeping their identities
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let service = Self::new();
        for entity in entities {
            service
                .next_id
                .fetch_max(i64::from(entity.id()) + 1, AtomicOrdering::SeqCst);
            service.rows.insert(entity.id(), entity);
        }
        service
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Snapshot of a stored entity
    pub fn get(&self, id: i32) -> Option<E> {
        self.rows.get(&id).map(|row| row.value().clone())
    }

    /// All rows ordered by identity
    fn snapshot(&self) -> Vec<E> {
        let mut rows: Vec<E> = self.rows.iter().map(|row| row.value().clone()).collect();
        rows.sort_by_key(Identifiable::id);
        rows
    }

    /// Hand out the next identity, failing once the `i32` range is used up
    fn allocate_id(&self) -> RepositoryResult<i32> {
        self.next_id
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |current| {
                i32::try_from(current).ok()?;
                current.checked_add(1)
            })
            .ok()
            .and_then(|id| i32::try_from(id).ok())
            .ok_or_else(|| {
                RepositoryError::data_service(RepositoryOperation::Insert, "Identity space exhausted")
            })
    }

    fn to_json(entity: &E, operation: RepositoryOperation) -> RepositoryResult<Value> {
        serde_json::to_value(entity).map_err(|e| {
            RepositoryError::data_service(operation, format!("Failed to serialize entity: {}", e))
        })
    }
}

impl<E> Default for InMemoryDataService<E>
where
    E: Identifiable + Clone + Serialize,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Readable<E> for InMemoryDataService<E>
where
    E: Identifiable + Clone + Serialize,
{
    fn select_by_id(&self, template: &E, _with_children: bool) -> RepositoryResult<Option<E>> {
        Ok(self.get(template.id()))
    }

    fn select_by(&self, _template: &E, predicate: &Predicate<E>) -> RepositoryResult<Option<Vec<E>>> {
        Ok(Some(
            self.snapshot()
                .into_iter()
                .filter(|entity| predicate.matches(entity))
                .collect(),
        ))
    }

    fn select_by_column_ids(
        &self,
        column_name: &str,
        ids: &[i32],
        _with_children: bool,
    ) -> RepositoryResult<Option<Vec<E>>> {
        let mut found = Vec::new();
        for entity in self.snapshot() {
            let row = Self::to_json(&entity, RepositoryOperation::SelectByColumnIds)?;
            let matched = field_value(&row, column_name)
                .and_then(Value::as_i64)
                .is_some_and(|value| ids.iter().any(|id| i64::from(*id) == value));
            if matched {
                found.push(entity);
            }
        }
        Ok(Some(found))
    }
}

impl<E> Pageable<E> for InMemoryDataService<E>
where
    E: Identifiable + Clone + Serialize,
{
    fn select_paged(
        &self,
        pager: &mut DataPager,
        _template: &E,
        predicate: &Predicate<E>,
    ) -> RepositoryResult<Vec<E>> {
        if let Some(condition) = pager
            .filter
            .iter()
            .find(|condition| !SUPPORTED_OPERATORS.contains(&condition.operator.as_str()))
        {
            return Err(RepositoryError::data_service(
                RepositoryOperation::SelectPaged,
                format!(
                    "Unsupported filter operator '{}' on field '{}'",
                    condition.operator, condition.field
                ),
            ));
        }

        let mut rows = Vec::new();
        for entity in self.snapshot() {
            if !predicate.matches(&entity) {
                continue;
            }
            let json = Self::to_json(&entity, RepositoryOperation::SelectPaged)?;
            if pager.filter.iter().all(|condition| matches_condition(&json, condition)) {
                rows.push((json, entity));
            }
        }

        let sort_keys = parse_order_by(&pager.order_by);
        if !sort_keys.is_empty() {
            rows.sort_by(|(a, _), (b, _)| {
                sort_keys
                    .iter()
                    .map(|(field, descending)| {
                        let ordering = match (field_value(a, field), field_value(b, field)) {
                            (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
                            (None, Some(_)) => Ordering::Less,
                            (Some(_), None) => Ordering::Greater,
                            (None, None) => Ordering::Equal,
                        };
                        if *descending {
                            ordering.reverse()
                        } else {
                            ordering
                        }
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        pager.set_totals(rows.len());
        Ok(rows
            .into_iter()
            .skip(pager.offset())
            .take(pager.limit())
            .map(|(_, entity)| entity)
            .collect())
    }
}

impl<E> Writable<E> for InMemoryDataService<E>
where
    E: Identifiable + Clone + Serialize,
{
    fn insert(&self, entity: &mut E, _with_children: bool) -> RepositoryResult<u64> {
        let id = self.allocate_id()?;
        entity.set_id(id);
        self.rows.insert(id, entity.clone());
        Ok(1)
    }

    fn update(&self, entity: &mut E, _with_children: bool) -> RepositoryResult<u64> {
        match self.rows.get_mut(&entity.id()) {
            Some(mut row) => {
                *row = entity.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete(&self, entity: &mut E, _with_children: bool) -> RepositoryResult<u64> {
        Ok(u64::from(self.rows.remove(&entity.id()).is_some()))
    }
}

const SUPPORTED_OPERATORS: [&str; 9] = [
    operators::EQUAL,
    operators::NOT_EQUAL,
    operators::CONTAINS,
    operators::STARTS_WITH,
    operators::GREATER_THAN,
    operators::GREATER_THAN_OR_EQUAL,
    operators::LESS_THAN,
    operators::LESS_THAN_OR_EQUAL,
    operators::IN,
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn field_value<'a>(row: &'a Value, field: &str) -> Option<&'a Value> {
    let object = row.as_object()?;
    object.get(field).or_else(|| {
        let wanted = normalize(field);
        object
            .iter()
            .find(|(key, _)| normalize(key) == wanted)
            .map(|(_, value)| value)
    })
}

fn as_datetime(value: &Value) -> Option<DateTime<FixedOffset>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    if let (Some(x), Some(y)) = (as_datetime(a), as_datetime(b)) {
        return Some(x.cmp(&y));
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    compare(a, b) == Some(Ordering::Equal)
}

fn matches_condition(row: &Value, condition: &FilterCondition) -> bool {
    let expected = condition.value.to_json();
    let actual = field_value(row, &condition.field).unwrap_or(&Value::Null);

    let text = |value: &Value| value.as_str().map(str::to_lowercase);

    match condition.operator.as_str() {
        operators::EQUAL => values_equal(actual, &expected),
        operators::NOT_EQUAL => !values_equal(actual, &expected),
        operators::CONTAINS => match (text(actual), text(&expected)) {
            (Some(haystack), Some(needle)) => haystack.contains(&needle),
            _ => false,
        },
        operators::STARTS_WITH => match (text(actual), text(&expected)) {
            (Some(haystack), Some(prefix)) => haystack.starts_with(&prefix),
            _ => false,
        },
        operators::GREATER_THAN => compare(actual, &expected) == Some(Ordering::Greater),
        operators::GREATER_THAN_OR_EQUAL => matches!(
            compare(actual, &expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        operators::LESS_THAN => compare(actual, &expected) == Some(Ordering::Less),
        operators::LESS_THAN_OR_EQUAL => matches!(
            compare(actual, &expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        operators::IN => expected
            .as_array()
            .is_some_and(|items| items.iter().any(|item| values_equal(actual, item))),
        // Rejected in `select_paged` before any row is matched
        _ => false,
    }
}

/// Parse `"Name desc, Id"` into `[("Name", true), ("Id", false)]`
fn parse_order_by(order_by: &str) -> Vec<(String, bool)> {
    order_by
        .split(',')
        .filter_map(|part| {
            let mut tokens = part.split_whitespace();
            let field = tokens.next()?;
            let descending = tokens
                .next()
                .is_some_and(|direction| direction.eq_ignore_ascii_case("desc"));
            Some((field.to_string(), descending))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::{FilterValue, Pager};
    use crate::repository::RepositoryErrorKind;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Well {
        id: i32,
        name: String,
        depth: i64,
        region_id: i32,
    }

    impl Identifiable for Well {
        fn id(&self) -> i32 {
            self.id
        }
        fn set_id(&mut self, id: i32) {
            self.id = id;
        }
        fn name(&self) -> &str {
            &self.name
        }
    }

    fn well(id: i32, name: &str, depth: i64, region_id: i32) -> Well {
        Well {
            id,
            name: name.to_string(),
            depth,
            region_id,
        }
    }

    fn seeded() -> InMemoryDataService<Well> {
        InMemoryDataService::with_entities(vec![
            well(1, "Alpha", 900, 10),
            well(2, "Bravo", 1500, 20),
            well(3, "Charlie", 2100, 10),
            well(4, "Delta", 1200, 30),
            well(5, "Echo", 3000, 20),
        ])
    }

    #[test]
    fn test_insert_assigns_next_identity() {
        let service = seeded();
        let mut entity = well(0, "Foxtrot", 100, 10);
        assert_eq!(service.insert(&mut entity, false).unwrap(), 1);
        assert_eq!(entity.id, 6);
        assert_eq!(service.get(6).map(|w| w.name), Some("Foxtrot".to_string()));
    }

    #[test]
    fn test_update_and_delete_row_counts() {
        let service = seeded();
        let mut missing = well(99, "Nowhere", 0, 0);
        assert_eq!(service.update(&mut missing, false).unwrap(), 0);
        assert_eq!(service.delete(&mut missing, false).unwrap(), 0);

        let mut existing = well(2, "Bravo II", 1600, 20);
        assert_eq!(service.update(&mut existing, false).unwrap(), 1);
        assert_eq!(service.get(2).map(|w| w.depth), Some(1600));
        assert_eq!(service.delete(&mut existing, true).unwrap(), 1);
        assert_eq!(service.len(), 4);
    }

    #[test]
    fn test_select_by_predicate() {
        let service = seeded();
        let deep = Predicate::new(|w: &Well| w.depth > 1400);
        let rows = service.select_by(&Well::default(), &deep).unwrap().unwrap();
        let names: Vec<_> = rows.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Bravo", "Charlie", "Echo"]);
    }

    #[test]
    fn test_select_by_column_ids() {
        let service = seeded();
        let rows = service
            .select_by_column_ids("RegionId", &[10, 30], false)
            .unwrap()
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);

        let none = service.select_by_column_ids("missing", &[1], false).unwrap().unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_select_paged_sets_totals() {
        let service = seeded();
        let mut pager = Pager::with_values(2, 2, 0, 0).to_data_pager();
        let rows = service
            .select_paged(&mut pager, &Well::default(), &Predicate::all())
            .unwrap();

        assert_eq!(pager.total_counts, 5);
        assert_eq!(pager.page_total, 3);
        let ids: Vec<_> = rows.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_select_paged_filters_and_sorts() {
        let service = seeded();
        let mut pager = Pager::with_page_size(10)
            .with_filter(FilterCondition::greater_than_or_equal("Depth", 1200_i64))
            .with_filter(FilterCondition::in_list("region_id", vec![20, 30]))
            .with_order_by("depth desc")
            .to_data_pager();

        let rows = service
            .select_paged(&mut pager, &Well::default(), &Predicate::all())
            .unwrap();
        let names: Vec<_> = rows.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Echo", "Bravo", "Delta"]);
        assert_eq!(pager.total_counts, 3);
        assert_eq!(pager.page_total, 1);
    }

    #[test]
    fn test_text_operators_are_case_insensitive() {
        let service = seeded();
        let mut pager = Pager::new()
            .with_filter(FilterCondition::contains("Name", "HAR"))
            .to_data_pager();
        let rows = service
            .select_paged(&mut pager, &Well::default(), &Predicate::all())
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Charlie");

        let mut pager = Pager::new()
            .with_filter(FilterCondition::starts_with("name", "e"))
            .to_data_pager();
        let rows = service
            .select_paged(&mut pager, &Well::default(), &Predicate::all())
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let service = seeded();
        let mut pager = Pager::new()
            .with_filter(FilterCondition::equal("Name", "Alpha"))
            .with_filter(FilterCondition::new("Name", "soundsLike", "Alfa"))
            .to_data_pager();
        let err = service
            .select_paged(&mut pager, &Well::default(), &Predicate::all())
            .unwrap_err();
        assert_eq!(err.operation, RepositoryOperation::SelectPaged);
        assert_eq!(err.kind, RepositoryErrorKind::DataServiceError);
        assert!(err.message.contains("soundsLike"));
        assert_eq!(pager.total_counts, 0);

        let empty = InMemoryDataService::<Well>::new();
        assert!(empty
            .select_paged(&mut pager, &Well::default(), &Predicate::all())
            .is_err());
    }

    #[test]
    fn test_seeded_max_identity_exhausts_inserts() {
        let service = InMemoryDataService::with_entities(vec![well(i32::MAX, "Last", 0, 0)]);
        let mut entity = well(0, "Overflow", 0, 0);
        let err = service.insert(&mut entity, false).unwrap_err();
        assert_eq!(err.operation, RepositoryOperation::Insert);
        assert_eq!(err.kind, RepositoryErrorKind::DataServiceError);
        assert_eq!(entity.id, 0);
        assert_eq!(service.len(), 1);
        assert_eq!(service.get(i32::MAX).map(|w| w.name), Some("Last".to_string()));
    }

    #[test]
    fn test_identity_counter_does_not_wrap() {
        let service = InMemoryDataService::with_entities(vec![well(i32::MAX - 1, "Penultimate", 0, 0)]);
        let mut last = well(0, "Last", 0, 0);
        assert_eq!(service.insert(&mut last, false).unwrap(), 1);
        assert_eq!(last.id, i32::MAX);

        let mut overflow = well(0, "Overflow", 0, 0);
        assert!(service.insert(&mut overflow, false).is_err());
        assert!(service.insert(&mut overflow, false).is_err());
        assert_eq!(overflow.id, 0);
        assert_eq!(service.len(), 2);
        assert_eq!(service.get(i32::MIN), None);
    }

    #[test]
    fn test_datetime_comparison() {
        let earlier = Value::String("2024-01-01T00:00:00Z".into());
        let later = FilterValue::from(
            DateTime::parse_from_rfc3339("2024-02-01T00:00:00+00:00")
                .unwrap()
                .with_timezone(&chrono::Utc),
        )
        .to_json();
        assert_eq!(compare(&earlier, &later), Some(Ordering::Less));
    }

    #[test]
    fn test_parse_order_by() {
        assert_eq!(
            parse_order_by("Name desc, Id"),
            vec![("Name".to_string(), true), ("Id".to_string(), false)]
        );
        assert!(parse_order_by("").is_empty());
    }
}
