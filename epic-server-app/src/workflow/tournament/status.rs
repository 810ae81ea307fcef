use std::sync::Arc;

use crate::{
    domain::{
        RepoUpdateError, TournamentId,
        tournament::{Tournament, TournamentRepository, TournamentStatus},
    },
    ports::authentication::Identity,
    workflow::tournament::{TournamentError, fetch_tournament},
};

#[async_trait::async_trait]
pub trait UpdateTournamentStatusUseCase {
    async fn update_status(
        &self,
        organizer: &Identity,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<Tournament, TournamentError>;
}

pub struct UpdateTournamentStatusUseCaseImpl<T: TournamentRepository> {
    tournament_repository: Arc<T>,
}

impl<T: TournamentRepository> UpdateTournamentStatusUseCaseImpl<T> {
    pub fn new(tournament_repository: Arc<T>) -> Self {
        Self {
            tournament_repository,
        }
    }
}

#[async_trait::async_trait]
impl<T: TournamentRepository + Send + Sync + 'static> UpdateTournamentStatusUseCase
    for UpdateTournamentStatusUseCaseImpl<T>
{
    async fn update_status(
        &self,
        organizer: &Identity,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<Tournament, TournamentError> {
        if !organizer.is_admin() {
            return Err(TournamentError::Forbidden);
        }
        let mut tournament = fetch_tournament(self.tournament_repository.as_ref(), id).await?;
        if !tournament.status.can_transition_to(status) {
            return Err(TournamentError::InvalidTransition);
        }
        match self.tournament_repository.update_status(id, status).await {
            Ok(()) => {}
            Err(RepoUpdateError::NotFound) => return Err(TournamentError::NotFound),
            Err(e) => return Err(TournamentError::storage("Error updating tournament status", e)),
        }
        log::info!("Tournament {} is now {}", id, status);
        tournament.status = status;
        Ok(tournament)
    }
}
