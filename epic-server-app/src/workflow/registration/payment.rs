use std::sync::Arc;

use crate::{
    domain::{
        RegistrationId, RepoUpdateError,
        registration::{PaymentStatus, Registration, RegistrationRepository},
    },
    ports::authentication::Identity,
    workflow::registration::{RegistrationError, withdraw::fetch_registration},
};

#[async_trait::async_trait]
pub trait UpdatePaymentUseCase {
    async fn update_payment(
        &self,
        registration_id: RegistrationId,
        reviewer: &Identity,
        payment_status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> Result<Registration, RegistrationError>;
}

pub struct UpdatePaymentUseCaseImpl<R: RegistrationRepository> {
    registration_repository: Arc<R>,
}

impl<R: RegistrationRepository> UpdatePaymentUseCaseImpl<R> {
    pub fn new(registration_repository: Arc<R>) -> Self {
        Self {
            registration_repository,
        }
    }
}

#[async_trait::async_trait]
impl<R: RegistrationRepository + Send + Sync + 'static> UpdatePaymentUseCase
    for UpdatePaymentUseCaseImpl<R>
{
    async fn update_payment(
        &self,
        registration_id: RegistrationId,
        reviewer: &Identity,
        payment_status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> Result<Registration, RegistrationError> {
        if !reviewer.is_admin() {
            return Err(RegistrationError::Forbidden);
        }
        let transaction_id = transaction_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        match self
            .registration_repository
            .update_payment(registration_id, payment_status, transaction_id)
            .await
        {
            Ok(()) => {}
            Err(RepoUpdateError::NotFound) => return Err(RegistrationError::NotFound),
            Err(e) => return Err(RegistrationError::storage("Error updating payment", e)),
        }
        log::info!(
            "Payment of registration {} set to {} by {}",
            registration_id,
            payment_status.as_str(),
            reviewer.user_id
        );
        fetch_registration(self.registration_repository.as_ref(), registration_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{TournamentId, UserId, registration::RegistrationStatus},
        fixtures,
        memory::{InMemoryRegistrationRepository, InMemoryTournamentRepository},
        ports::{authentication::UserRole, clock::FixedClock},
        workflow::registration::register::{RegisterTeamUseCase, RegisterTeamUseCaseImpl},
    };

    #[tokio::test]
    async fn test_admin_marks_payment_paid() {
        let mut tournament = fixtures::tournament(4, 0);
        tournament.registration_fee = 500;
        let id: TournamentId = tournament.id;
        let tournaments = Arc::new(InMemoryTournamentRepository::with_tournaments([tournament]));
        let registrations = Arc::new(InMemoryRegistrationRepository::new());
        let mut request = fixtures::request("Alpha");
        request.transaction_id = Some("TXN-1".to_string());
        let registration = RegisterTeamUseCaseImpl::new(
            tournaments,
            registrations.clone(),
            Arc::new(FixedClock(fixtures::now())),
        )
        .register(id, &UserId::new("u-1"), request)
        .await
        .unwrap();

        let use_case = UpdatePaymentUseCaseImpl::new(registrations);
        let admin = Identity::new(UserId::new("root"), "root@epic.gg", UserRole::Admin);
        let updated = use_case
            .update_payment(registration.id, &admin, PaymentStatus::Paid, None)
            .await
            .unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.transaction_id.as_deref(), Some("TXN-1"));
        assert_eq!(updated.status, RegistrationStatus::Pending);

        let member = Identity::new(UserId::new("u-1"), "u-1@example.com", UserRole::Member);
        assert_eq!(
            use_case
                .update_payment(registration.id, &member, PaymentStatus::Refunded, None)
                .await,
            Err(RegistrationError::Forbidden)
        );
        assert_eq!(
            use_case
                .update_payment(RegistrationId::new(), &admin, PaymentStatus::Paid, None)
                .await,
            Err(RegistrationError::NotFound)
        );
    }
}
