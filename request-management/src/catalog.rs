//! Request Management entities and their repositories
//!
//! Program requests and call sheets are plain entities. Third-party bulker crews and
//! stick diagram templates are versioned: their repositories stamp the acting username
//! on every write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{DataService, Identifiable, Versioned};
use crate::identity::CurrentUser;
use crate::repository::{CommonRepository, CommonVersionRepository};

macro_rules! identifiable {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl Identifiable for $entity {
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
        )+
    };
}

macro_rules! versioned {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl Versioned for $entity {
                fn modified_user_name(&self) -> &str {
                    &self.modified_user_name
                }

                fn set_modified_user_name(&mut self, user_name: String) {
                    self.modified_user_name = user_name;
                }
            }
        )+
    };
}

/// Engineering request for a program design
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramRequest {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub job_type: String,
    pub requested_by: String,
    pub requested_at: Option<DateTime<Utc>>,
}

/// Crew dispatch sheet for a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallSheet {
    pub id: i32,
    pub name: String,
    pub program_request_id: i32,
    pub crew_name: String,
    pub call_out_at: Option<DateTime<Utc>>,
}

/// Bulker crew supplied by a third party
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThirdPartyBulkerCrew {
    pub id: i32,
    pub name: String,
    pub supplier: String,
    pub unit_count: i32,
    pub modified_user_name: String,
}

/// Reusable wellbore stick diagram
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickDiagramTemplate {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub diagram: String,
    pub modified_user_name: String,
}

identifiable!(ProgramRequest, CallSheet, ThirdPartyBulkerCrew, StickDiagramTemplate);
versioned!(ThirdPartyBulkerCrew, StickDiagramTemplate);

pub type ProgramRequestRepository<D> = CommonRepository<ProgramRequest, D>;
pub type CallSheetRepository<D> = CommonRepository<CallSheet, D>;
pub type ThirdPartyBulkerCrewRepository<D> = CommonVersionRepository<ThirdPartyBulkerCrew, D>;
pub type StickDiagramTemplateRepository<D> = CommonVersionRepository<StickDiagramTemplate, D>;

pub fn program_request_repository<D>(data_service: Arc<D>) -> ProgramRequestRepository<D>
where
    D: DataService<ProgramRequest>,
{
    CommonRepository::new(data_service)
}

pub fn call_sheet_repository<D>(data_service: Arc<D>) -> CallSheetRepository<D>
where
    D: DataService<CallSheet>,
{
    CommonRepository::new(data_service)
}

pub fn third_party_bulker_crew_repository<D>(
    data_service: Arc<D>,
    current_user: Arc<dyn CurrentUser>,
) -> ThirdPartyBulkerCrewRepository<D>
where
    D: DataService<ThirdPartyBulkerCrew>,
{
    CommonRepository::versioned(data_service, current_user)
}

pub fn stick_diagram_template_repository<D>(
    data_service: Arc<D>,
    current_user: Arc<dyn CurrentUser>,
) -> StickDiagramTemplateRepository<D>
where
    D: DataService<StickDiagramTemplate>,
{
    CommonRepository::versioned(data_service, current_user)
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryDataService;
    use crate::data::Predicate;
    use crate::identity::{CurrentUserService, NoIdentity};
    use crate::paging::{FilterCondition, Pager};
    use crate::repository::Repository;

    fn request(id: i32, name: &str, job_type: &str) -> ProgramRequest {
        ProgramRequest {
            id,
            name: name.to_string(),
            job_type: job_type.to_string(),
            ..ProgramRequest::default()
        }
    }

    fn requests() -> Arc<InMemoryDataService<ProgramRequest>> {
        Arc::new(InMemoryDataService::with_entities(vec![
            request(1, "Request 1", "Cementing"),
            request(2, "Request 2", "Fracturing"),
            request(3, "Request 3", "Cementing"),
        ]))
    }

    fn current_user(name: &str) -> Arc<CurrentUserService> {
        let service = Arc::new(CurrentUserService::new(Arc::new(NoIdentity)));
        service.set_current_username(Some(name));
        service
    }

    #[tokio::test]
    async fn test_program_request_lookup() {
        let repo = program_request_repository(requests());

        let found = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(found.name, "Request 1");
        assert!(repo.get_by_id_with_children(10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_program_request_paging() {
        let repo = program_request_repository(requests());
        let pager = Pager::with_values(1, 10, 0, 0)
            .with_filter(FilterCondition::equal("jobType", "Cementing"))
            .with_order_by("Name desc");

        let page = repo.get_paged_list(pager, Predicate::all()).await.unwrap();
        assert_eq!(page.result.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(page.pager.total_counts, 2);
        assert_eq!(page.pager.page_total, 1);
        assert_eq!(page.pager.page_size, 10);
    }

    #[tokio::test]
    async fn test_call_sheets_by_program_request() {
        let service = Arc::new(InMemoryDataService::<CallSheet>::new());
        let repo = call_sheet_repository(Arc::clone(&service));

        for (request_id, crew) in [(1, "Red"), (2, "Blue"), (1, "Green")] {
            let mut sheet = CallSheet {
                name: format!("{} crew", crew),
                program_request_id: request_id,
                crew_name: crew.to_string(),
                ..CallSheet::default()
            };
            assert!(repo.create(Some(&mut sheet)).await.unwrap());
            assert!(sheet.id > 0);
        }

        let sheets = repo.get_list_by_ids("ProgramRequestId", &[1]).await.unwrap();
        assert_eq!(sheets.iter().map(|s| s.crew_name.as_str()).collect::<Vec<_>>(), vec!["Red", "Green"]);

        assert!(repo.delete_by_id(sheets[0].id).await.unwrap());
        assert!(!repo.delete_by_id(sheets[0].id).await.unwrap());
        assert_eq!(service.len(), 2);
    }

    #[tokio::test]
    async fn test_bulker_crew_writes_are_attributed() {
        let service = Arc::new(InMemoryDataService::<ThirdPartyBulkerCrew>::new());
        let repo = third_party_bulker_crew_repository(Arc::clone(&service), current_user("alex@sanjel.example"));

        let mut crew = ThirdPartyBulkerCrew {
            name: "North Haul".to_string(),
            supplier: "Acme Bulk".to_string(),
            unit_count: 4,
            ..ThirdPartyBulkerCrew::default()
        };
        assert!(repo.create(Some(&mut crew)).await.unwrap());
        assert_eq!(service.get(crew.id).unwrap().modified_user_name, "alex");

        crew.unit_count = 5;
        crew.modified_user_name = "forged".to_string();
        assert!(repo.update(Some(&mut crew)).await.unwrap());
        let stored = service.get(crew.id).unwrap();
        assert_eq!(stored.unit_count, 5);
        assert_eq!(stored.modified_user_name, "alex");
    }

    #[tokio::test]
    async fn test_stick_diagram_template_update_of_missing_row() {
        let service = Arc::new(InMemoryDataService::<StickDiagramTemplate>::new());
        let repo = stick_diagram_template_repository(service, current_user("SYSTEM"));

        let mut template = StickDiagramTemplate {
            id: 77,
            name: "Surface casing".to_string(),
            ..StickDiagramTemplate::default()
        };
        assert!(!repo.update(Some(&mut template)).await.unwrap());
        assert_eq!(template.modified_user_name, "SYSTEM");
        assert!(repo.get_list(Predicate::all()).await.unwrap().is_empty());
    }

    #[test]
    fn test_entities_serialize_with_audit_field() {
        let template = StickDiagramTemplate {
            id: 2,
            name: "Liner".to_string(),
            modified_user_name: "pat".to_string(),
            ..StickDiagramTemplate::default()
        };
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["modified_user_name"], "pat");
        assert_eq!(Identifiable::name(&template), "Liner");
    }
}
