use std::sync::Arc;

use crate::{
    domain::{
        RegistrationId, RepoUpdateError,
        registration::{Registration, RegistrationRepository, RegistrationStatus},
        tournament::TournamentRepository,
    },
    ports::authentication::Identity,
    workflow::registration::{RegistrationError, release_slot, withdraw::fetch_registration},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn target_status(&self) -> RegistrationStatus {
        match self {
            ReviewDecision::Approve => RegistrationStatus::Approved,
            ReviewDecision::Reject => RegistrationStatus::Rejected,
        }
    }
}

#[async_trait::async_trait]
pub trait ReviewRegistrationUseCase {
    async fn review(
        &self,
        registration_id: RegistrationId,
        reviewer: &Identity,
        decision: ReviewDecision,
    ) -> Result<Registration, RegistrationError>;
}

pub struct ReviewRegistrationUseCaseImpl<T: TournamentRepository, R: RegistrationRepository> {
    tournament_repository: Arc<T>,
    registration_repository: Arc<R>,
}

impl<T: TournamentRepository, R: RegistrationRepository> ReviewRegistrationUseCaseImpl<T, R> {
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
> ReviewRegistrationUseCase for ReviewRegistrationUseCaseImpl<T, R>
{
    async fn review(
        &self,
        registration_id: RegistrationId,
        reviewer: &Identity,
        decision: ReviewDecision,
    ) -> Result<Registration, RegistrationError> {
        if !reviewer.is_admin() {
            return Err(RegistrationError::Forbidden);
        }
        let mut registration =
            fetch_registration(self.registration_repository.as_ref(), registration_id).await?;
        let target = decision.target_status();
        if !registration.status.can_transition_to(target) {
            return Err(RegistrationError::InvalidTransition);
        }

        // Conditional on the status we read, so a concurrent review cannot
        // release the same slot twice.
        match self
            .registration_repository
            .update_status(registration_id, registration.status, target)
            .await
        {
            Ok(()) => {}
            Err(RepoUpdateError::NotFound) => return Err(RegistrationError::NotFound),
            Err(RepoUpdateError::Conflict) => return Err(RegistrationError::InvalidTransition),
            Err(RepoUpdateError::StorageError(e)) => {
                return Err(RegistrationError::storage("Error updating registration", e));
            }
        }

        if registration.is_active() && !target.is_active() {
            release_slot(
                self.tournament_repository.as_ref(),
                registration.tournament_id,
            )
            .await;
        }
        log::info!(
            "Registration {} moved from {} to {} by {}",
            registration_id,
            registration.status,
            target,
            reviewer.user_id
        );
        registration.status = target;
        Ok(registration)
    }
}
