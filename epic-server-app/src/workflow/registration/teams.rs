use std::sync::Arc;

use crate::{
    domain::{
        TournamentId,
        registration::{
            Registration, RegistrationFilter, RegistrationRepository, RegistrationStatus,
        },
        tournament::TournamentRepository,
    },
    services::retry::retry_once,
    workflow::registration::{RegistrationError, list::ensure_tournament_exists},
};

/// Public roster: only approved teams are shown.
#[async_trait::async_trait]
pub trait ListTeamsUseCase {
    async fn list_teams(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<Registration>, RegistrationError>;
}

pub struct ListTeamsUseCaseImpl<T: TournamentRepository, R: RegistrationRepository> {
    tournament_repository: Arc<T>,
    registration_repository: Arc<R>,
}

impl<T: TournamentRepository, R: RegistrationRepository> ListTeamsUseCaseImpl<T, R> {
    pub fn new(tournament_repository: Arc<T>, registration_repository: Arc<R>) -> Self {
        Self {
            tournament_repository,
            registration_repository,
        }
    }
}

#[async_trait::async_trait]
impl<
    T: TournamentRepository + Send + Sync + 'static,
    R: RegistrationRepository + Send + Sync + 'static,
> ListTeamsUseCase for ListTeamsUseCaseImpl<T, R>
{
    async fn list_teams(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<Registration>, RegistrationError> {
        ensure_tournament_exists(self.tournament_repository.as_ref(), tournament_id).await?;
        let filter = RegistrationFilter {
            user_id: None,
            status: Some(RegistrationStatus::Approved),
        };
        retry_once("Listing teams", || {
            self.registration_repository
                .find_by_tournament(tournament_id, filter.clone())
        })
        .await
        .map_err(|e| RegistrationError::storage("Error listing teams", e))
    }
}
