use std::sync::Arc;

use crate::{
    domain::{
        RepoCreateError, TournamentId,
        tournament::{NewTournament, Tournament, TournamentRepository},
    },
    ports::{authentication::Identity, clock::ClockPort},
    workflow::tournament::TournamentError,
};

#[async_trait::async_trait]
pub trait CreateTournamentUseCase {
    async fn create_tournament(
        &self,
        organizer: &Identity,
        tournament: NewTournament,
    ) -> Result<Tournament, TournamentError>;
}

pub struct CreateTournamentUseCaseImpl<T: TournamentRepository, C: ClockPort> {
    tournament_repository: Arc<T>,
    clock: Arc<C>,
}

impl<T: TournamentRepository, C: ClockPort> CreateTournamentUseCaseImpl<T, C> {
    pub fn new(tournament_repository: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            tournament_repository,
            clock,
        }
    }
}

#[async_trait::async_trait]
impl<T: TournamentRepository + Send + Sync + 'static, C: ClockPort + Send + Sync + 'static>
    CreateTournamentUseCase for CreateTournamentUseCaseImpl<T, C>
{
    async fn create_tournament(
        &self,
        organizer: &Identity,
        mut tournament: NewTournament,
    ) -> Result<Tournament, TournamentError> {
        if !organizer.is_admin() {
            return Err(TournamentError::Forbidden);
        }
        tournament.name = tournament.name.trim().to_string();
        let invalid = tournament.invalid_fields();
        if !invalid.is_empty() {
            return Err(TournamentError::ValidationError(invalid));
        }

        let tournament = tournament.into_tournament(TournamentId::new(), self.clock.now());
        match self
            .tournament_repository
            .create_tournament(tournament.clone())
            .await
        {
            Ok(()) => {}
            Err(RepoCreateError::Conflict) => return Err(TournamentError::AlreadyExists),
            Err(RepoCreateError::StorageError(e)) => {
                return Err(TournamentError::storage("Error creating tournament", e));
            }
        }
        log::info!(
            "Tournament {} ({}) created by {}",
            tournament.name,
            tournament.id,
            organizer.user_id
        );
        Ok(tournament)
    }
}
