use std::sync::Arc;

use crate::{
    domain::{
        RepoUpdateError, TournamentId, registration::RegistrationRepository,
        tournament::TournamentRepository,
    },
    ports::authentication::Identity,
    workflow::tournament::{TournamentError, fetch_tournament},
};

#[async_trait::async_trait]
pub trait DeleteTournamentUseCase {
    /// Removes the tournament together with all of its registrations.
    async fn delete_tournament(
        &self,
        organizer: &Identity,
        id: TournamentId,
    ) -> Result<(), TournamentError>;
}

pub struct DeleteTournamentUseCaseImpl<T: TournamentRepository, R: RegistrationRepository> {
    tournament_repository: Arc<T>,
    registration_repository: Arc<R>,
}

impl<T: TournamentRepository, R: RegistrationRepository> DeleteTournamentUseCaseImpl<T, R> {
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
> DeleteTournamentUseCase for DeleteTournamentUseCaseImpl<T, R>
{
    async fn delete_tournament(
        &self,
        organizer: &Identity,
        id: TournamentId,
    ) -> Result<(), TournamentError> {
        if !organizer.is_admin() {
            return Err(TournamentError::Forbidden);
        }
        fetch_tournament(self.tournament_repository.as_ref(), id).await?;

        // Tournament first, so registrations arriving during the sweep
        // already fail with NotFound.
        match self.tournament_repository.delete_tournament(id).await {
            Ok(()) => {}
            Err(RepoUpdateError::NotFound) => return Err(TournamentError::NotFound),
            Err(e) => return Err(TournamentError::storage("Error deleting tournament", e)),
        }
        let removed = self
            .registration_repository
            .delete_by_tournament(id)
            .await
            .map_err(|e| TournamentError::storage("Error deleting registrations", e))?;
        log::info!(
            "Tournament {} deleted by {} along with {} registrations",
            id,
            organizer.user_id,
            removed
        );
        Ok(())
    }
}
