use crate::{
    domain::{
        RepoRetrieveError, TournamentId,
        tournament::{Tournament, TournamentRepository},
    },
    services::retry::retry_once,
};

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod status;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TournamentError {
    #[error("Tournament not found")]
    NotFound,
    #[error("A tournament with this name already exists")]
    AlreadyExists,
    #[error("Invalid fields: {}", .0.join(", "))]
    ValidationError(Vec<String>),
    #[error("Only administrators can manage tournaments")]
    Forbidden,
    #[error("Tournament status cannot move backwards")]
    InvalidTransition,
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl TournamentError {
    pub fn kind(&self) -> &'static str {
        match self {
            TournamentError::NotFound => "NotFound",
            TournamentError::AlreadyExists => "AlreadyExists",
            TournamentError::ValidationError(_) => "ValidationError",
            TournamentError::Forbidden => "Forbidden",
            TournamentError::InvalidTransition => "InvalidTransition",
            TournamentError::StorageUnavailable(_) => "StorageUnavailable",
        }
    }

    fn storage(context: &str, e: impl std::fmt::Display) -> Self {
        log::error!("{}: {}", context, e);
        TournamentError::StorageUnavailable(e.to_string())
    }
}

pub(crate) async fn fetch_tournament<T: TournamentRepository + Send + Sync>(
    tournament_repository: &T,
    tournament_id: TournamentId,
) -> Result<Tournament, TournamentError> {
    match retry_once("Fetching tournament", || {
        tournament_repository.get_tournament(tournament_id)
    })
    .await
    {
        Ok(tournament) => Ok(tournament),
        Err(RepoRetrieveError::NotFound) => Err(TournamentError::NotFound),
        Err(RepoRetrieveError::StorageError(e)) => {
            Err(TournamentError::storage("Error fetching tournament", e))
        }
    }
}
