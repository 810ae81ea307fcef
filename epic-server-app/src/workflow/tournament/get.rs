use std::sync::Arc;

use crate::{
    domain::{
        TournamentId,
        tournament::{Tournament, TournamentRepository},
    },
    workflow::tournament::{TournamentError, fetch_tournament},
};

#[async_trait::async_trait]
pub trait GetTournamentUseCase {
    async fn get_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError>;
}

pub struct GetTournamentUseCaseImpl<T: TournamentRepository> {
    tournament_repository: Arc<T>,
}

impl<T: TournamentRepository> GetTournamentUseCaseImpl<T> {
    pub fn new(tournament_repository: Arc<T>) -> Self {
        Self {
            tournament_repository,
        }
    }
}

#[async_trait::async_trait]
impl<T: TournamentRepository + Send + Sync + 'static> GetTournamentUseCase
    for GetTournamentUseCaseImpl<T>
{
    async fn get_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        fetch_tournament(self.tournament_repository.as_ref(), id).await
    }
}
