use std::sync::Arc;

use crate::{
    domain::{
        RepoRetrieveError, TournamentId, UserId,
        registration::{Registration, RegistrationFilter, RegistrationRepository},
        tournament::TournamentRepository,
    },
    services::retry::retry_once,
    workflow::registration::RegistrationError,
};

#[async_trait::async_trait]
pub trait ListRegistrationsUseCase {
    /// Registrations of a tournament, oldest first, optionally narrowed to
    /// one user.
    async fn list_registrations(
        &self,
        tournament_id: TournamentId,
        user_id: Option<UserId>,
    ) -> Result<Vec<Registration>, RegistrationError>;
}

pub struct ListRegistrationsUseCaseImpl<T: TournamentRepository, R: RegistrationRepository> {
    tournament_repository: Arc<T>,
    registration_repository: Arc<R>,
}

impl<T: TournamentRepository, R: RegistrationRepository> ListRegistrationsUseCaseImpl<T, R> {
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
> ListRegistrationsUseCase for ListRegistrationsUseCaseImpl<T, R>
{
    async fn list_registrations(
        &self,
        tournament_id: TournamentId,
        user_id: Option<UserId>,
    ) -> Result<Vec<Registration>, RegistrationError> {
        ensure_tournament_exists(self.tournament_repository.as_ref(), tournament_id).await?;
        let filter = RegistrationFilter {
            user_id,
            status: None,
        };
        retry_once("Listing registrations", || {
            self.registration_repository
                .find_by_tournament(tournament_id, filter.clone())
        })
        .await
        .map_err(|e| RegistrationError::storage("Error listing registrations", e))
    }
}

pub(crate) async fn ensure_tournament_exists<T: TournamentRepository + Send + Sync>(
    tournament_repository: &T,
    tournament_id: TournamentId,
) -> Result<(), RegistrationError> {
    match retry_once("Fetching tournament", || {
        tournament_repository.get_tournament(tournament_id)
    })
    .await
    {
        Ok(_) => Ok(()),
        Err(RepoRetrieveError::NotFound) => Err(RegistrationError::NotFound),
        Err(RepoRetrieveError::StorageError(e)) => {
            Err(RegistrationError::storage("Error fetching tournament", e))
        }
    }
}
