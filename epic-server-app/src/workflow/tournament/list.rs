use std::sync::Arc;

use crate::{
    domain::tournament::{Tournament, TournamentFilter, TournamentRepository},
    services::retry::retry_once,
    workflow::tournament::TournamentError,
};

#[async_trait::async_trait]
pub trait ListTournamentsUseCase {
    async fn list_tournaments(
        &self,
        filter: TournamentFilter,
    ) -> Result<Vec<Tournament>, TournamentError>;
}

pub struct ListTournamentsUseCaseImpl<T: TournamentRepository> {
    tournament_repository: Arc<T>,
}

impl<T: TournamentRepository> ListTournamentsUseCaseImpl<T> {
    pub fn new(tournament_repository: Arc<T>) -> Self {
        Self {
            tournament_repository,
        }
    }
}

#[async_trait::async_trait]
impl<T: TournamentRepository + Send + Sync + 'static> ListTournamentsUseCase
    for ListTournamentsUseCaseImpl<T>
{
    async fn list_tournaments(
        &self,
        filter: TournamentFilter,
    ) -> Result<Vec<Tournament>, TournamentError> {
        retry_once("Listing tournaments", || {
            self.tournament_repository.list_tournaments(filter.clone())
        })
        .await
        .map_err(|e| TournamentError::storage("Error listing tournaments", e))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        domain::tournament::{TournamentSortBy, TournamentStatus},
        fixtures,
        memory::InMemoryTournamentRepository,
    };

    fn use_case() -> ListTournamentsUseCaseImpl<InMemoryTournamentRepository> {
        let mut early = fixtures::tournament(8, 2);
        early.name = "Early".to_string();
        early.start_date = fixtures::now() + Duration::days(2);
        early.registration_fee = 100;
        early.featured = true;

        let mut late = fixtures::tournament(8, 6);
        late.name = "Late".to_string();
        late.start_date = fixtures::now() + Duration::days(20);
        late.game = "Dota 2".to_string();

        let mut done = fixtures::tournament(8, 4);
        done.name = "Done".to_string();
        done.start_date = fixtures::now() - Duration::days(20);
        done.status = TournamentStatus::Completed;
        done.registration_fee = 900;

        ListTournamentsUseCaseImpl::new(Arc::new(InMemoryTournamentRepository::with_tournaments(
            [late, done, early],
        )))
    }

    async fn names(
        use_case: &ListTournamentsUseCaseImpl<InMemoryTournamentRepository>,
        filter: TournamentFilter,
    ) -> Vec<String> {
        use_case
            .list_tournaments(filter)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect()
    }

    #[tokio::test]
    async fn test_sorting() {
        let use_case = use_case();
        assert_eq!(
            names(&use_case, TournamentFilter::default()).await,
            ["Done", "Early", "Late"]
        );
        let by_prize = TournamentFilter {
            sort: TournamentSortBy::Prize,
            ..Default::default()
        };
        assert_eq!(names(&use_case, by_prize).await, ["Done", "Early", "Late"]);
        let by_popularity = TournamentFilter {
            sort: TournamentSortBy::Popularity,
            ..Default::default()
        };
        assert_eq!(
            names(&use_case, by_popularity).await,
            ["Late", "Done", "Early"]
        );
    }

    #[tokio::test]
    async fn test_filters_and_limit() {
        let use_case = use_case();
        let upcoming = TournamentFilter {
            status: Some(TournamentStatus::Upcoming),
            ..Default::default()
        };
        assert_eq!(names(&use_case, upcoming).await, ["Early", "Late"]);
        let dota = TournamentFilter {
            game: Some("Dota 2".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&use_case, dota).await, ["Late"]);
        let featured = TournamentFilter {
            featured: Some(true),
            ..Default::default()
        };
        assert_eq!(names(&use_case, featured).await, ["Early"]);
        let limited = TournamentFilter {
            limit: 1,
            ..Default::default()
        };
        assert_eq!(names(&use_case, limited).await, ["Done"]);
    }
}
