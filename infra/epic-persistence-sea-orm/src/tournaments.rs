use epic_persistence_sea_orm_entities::tournament;
use epic_server_app::domain::{
    RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, TournamentId,
    tournament::{
        Tournament, TournamentFilter, TournamentRepository, TournamentSortBy, TournamentStatus,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ExprTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, prelude::Expr,
};

use crate::mapping::{model_to_tournament, tournament_to_active_model};

pub struct TournamentRepositoryImpl {
    db: DatabaseConnection,
}

impl TournamentRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn exists(&self, id: TournamentId) -> Result<bool, DbErr> {
        Ok(tournament::Entity::find_by_id(id.0)
            .one(&self.db)
            .await?
            .is_some())
    }
}

#[async_trait::async_trait]
impl TournamentRepository for TournamentRepositoryImpl {
    async fn get_tournament(&self, id: TournamentId) -> Result<Tournament, RepoRetrieveError> {
        let model = tournament::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        model_to_tournament(model).map_err(RepoRetrieveError::StorageError)
    }

    async fn list_tournaments(&self, filter: TournamentFilter) -> Result<Vec<Tournament>, RepoError> {
        let mut query = tournament::Entity::find();
        if let Some(game) = &filter.game {
            query = query.filter(tournament::Column::Game.eq(game.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(tournament::Column::Status.eq(status.as_str()));
        }
        if let Some(team_size) = filter.team_size {
            query = query.filter(tournament::Column::TeamSize.eq(team_size as i32));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(tournament::Column::Featured.eq(featured));
        }
        query = match filter.sort {
            TournamentSortBy::StartDate => query.order_by_asc(tournament::Column::StartDate),
            TournamentSortBy::Prize => query.order_by_desc(tournament::Column::RegistrationFee),
            TournamentSortBy::Popularity => query.order_by_desc(tournament::Column::CurrentTeams),
        };

        let models = query
            .limit(filter.limit as u64)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        models
            .into_iter()
            .map(|m| model_to_tournament(m).map_err(RepoError::StorageError))
            .collect()
    }

    async fn create_tournament(&self, tournament: Tournament) -> Result<(), RepoCreateError> {
        let model = tournament_to_active_model(&tournament).map_err(RepoCreateError::StorageError)?;
        match model.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(RepoCreateError::Conflict),
                _ => Err(RepoCreateError::StorageError(e.to_string())),
            },
        }
    }

    async fn update_status(
        &self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<(), RepoUpdateError> {
        let res = tournament::Entity::update_many()
            .col_expr(tournament::Column::Status, Expr::value(status.as_str()))
            .filter(tournament::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if res.rows_affected == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }

    async fn increment_team_count(&self, id: TournamentId) -> Result<(), RepoUpdateError> {
        let res = tournament::Entity::update_many()
            .col_expr(
                tournament::Column::CurrentTeams,
                Expr::col(tournament::Column::CurrentTeams).add(1),
            )
            .filter(tournament::Column::Id.eq(id.0))
            .filter(
                Expr::col(tournament::Column::CurrentTeams)
                    .lt(Expr::col(tournament::Column::MaxTeams)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if res.rows_affected > 0 {
            return Ok(());
        }
        match self.exists(id).await {
            Ok(true) => Err(RepoUpdateError::Conflict),
            Ok(false) => Err(RepoUpdateError::NotFound),
            Err(e) => Err(RepoUpdateError::StorageError(e.to_string())),
        }
    }

    async fn decrement_team_count(&self, id: TournamentId) -> Result<(), RepoUpdateError> {
        let res = tournament::Entity::update_many()
            .col_expr(
                tournament::Column::CurrentTeams,
                Expr::col(tournament::Column::CurrentTeams).sub(1),
            )
            .filter(tournament::Column::Id.eq(id.0))
            .filter(tournament::Column::CurrentTeams.gt(0))
            .exec(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if res.rows_affected > 0 {
            return Ok(());
        }
        // Already at zero is fine; only a missing tournament is an error.
        match self.exists(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(RepoUpdateError::NotFound),
            Err(e) => Err(RepoUpdateError::StorageError(e.to_string())),
        }
    }

    async fn delete_tournament(&self, id: TournamentId) -> Result<(), RepoUpdateError> {
        let res = tournament::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if res.rows_affected == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use epic_server_app::domain::tournament::Organizer;

    use super::*;
    use crate::memory_db;

    pub(crate) fn sample(name: &str, max_teams: u32) -> Tournament {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        Tournament {
            id: TournamentId::new(),
            name: name.to_string(),
            game: "Valorant".to_string(),
            game_image: Some("https://cdn.example.com/valorant.png".to_string()),
            location: "Online".to_string(),
            description: "Weekly cup".to_string(),
            rules: "Best of three".to_string(),
            prize_pool: "10,000".to_string(),
            start_date: start,
            end_date: start + Duration::days(1),
            registration_deadline: start - Duration::days(1),
            team_size: 5,
            max_teams,
            current_teams: 0,
            status: TournamentStatus::Upcoming,
            registration_fee: 250,
            prizes: vec![epic_server_app::domain::tournament::Prize {
                position: 1,
                reward: "5,000".to_string(),
            }],
            schedule: vec![epic_server_app::domain::tournament::ScheduleEntry {
                stage: "Groups".to_string(),
                date: start,
                details: "Round robin".to_string(),
            }],
            organizer: Organizer {
                name: "Epic Esports".to_string(),
                contact: "org@epic.gg".to_string(),
                verified: true,
            },
            featured: true,
            stream_link: None,
            created_at: start - Duration::days(30),
        }
    }

    #[tokio::test]
    async fn test_round_trip_and_duplicate_name() {
        let repo = TournamentRepositoryImpl::new(memory_db().await);
        let tournament = sample("Summer Cup", 8);
        repo.create_tournament(tournament.clone()).await.unwrap();

        assert_eq!(repo.get_tournament(tournament.id).await.unwrap(), tournament);
        assert!(matches!(
            repo.create_tournament(sample("Summer Cup", 4)).await,
            Err(RepoCreateError::Conflict)
        ));
        assert!(matches!(
            repo.get_tournament(TournamentId::new()).await,
            Err(RepoRetrieveError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_increment_stops_at_capacity() {
        let repo = TournamentRepositoryImpl::new(memory_db().await);
        let tournament = sample("Tiny Cup", 2);
        repo.create_tournament(tournament.clone()).await.unwrap();

        repo.increment_team_count(tournament.id).await.unwrap();
        repo.increment_team_count(tournament.id).await.unwrap();
        assert!(matches!(
            repo.increment_team_count(tournament.id).await,
            Err(RepoUpdateError::Conflict)
        ));
        assert!(matches!(
            repo.increment_team_count(TournamentId::new()).await,
            Err(RepoUpdateError::NotFound)
        ));
        assert_eq!(
            repo.get_tournament(tournament.id).await.unwrap().current_teams,
            2
        );
    }

    #[tokio::test]
    async fn test_decrement_is_floored() {
        let repo = TournamentRepositoryImpl::new(memory_db().await);
        let tournament = sample("Floor Cup", 2);
        repo.create_tournament(tournament.clone()).await.unwrap();

        repo.increment_team_count(tournament.id).await.unwrap();
        repo.decrement_team_count(tournament.id).await.unwrap();
        repo.decrement_team_count(tournament.id).await.unwrap();
        assert_eq!(
            repo.get_tournament(tournament.id).await.unwrap().current_teams,
            0
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let repo = TournamentRepositoryImpl::new(memory_db().await);
        let mut cheap = sample("Cheap Cup", 8);
        cheap.registration_fee = 0;
        cheap.featured = false;
        let pricey = sample("Pricey Cup", 8);
        repo.create_tournament(cheap).await.unwrap();
        repo.create_tournament(pricey).await.unwrap();

        let by_prize = repo
            .list_tournaments(TournamentFilter {
                sort: TournamentSortBy::Prize,
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = by_prize.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Pricey Cup", "Cheap Cup"]);

        let featured = repo
            .list_tournaments(TournamentFilter {
                featured: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].name, "Pricey Cup");
    }

    #[tokio::test]
    async fn test_status_and_delete() {
        let repo = TournamentRepositoryImpl::new(memory_db().await);
        let tournament = sample("Status Cup", 8);
        repo.create_tournament(tournament.clone()).await.unwrap();

        repo.update_status(tournament.id, TournamentStatus::Ongoing)
            .await
            .unwrap();
        assert_eq!(
            repo.get_tournament(tournament.id).await.unwrap().status,
            TournamentStatus::Ongoing
        );
        repo.delete_tournament(tournament.id).await.unwrap();
        assert!(matches!(
            repo.delete_tournament(tournament.id).await,
            Err(RepoUpdateError::NotFound)
        ));
    }
}
