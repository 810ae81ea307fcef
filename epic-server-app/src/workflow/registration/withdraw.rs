use std::sync::Arc;

use crate::{
    domain::{
        RegistrationId, RepoRetrieveError, RepoUpdateError,
        registration::{Registration, RegistrationRepository},
        tournament::TournamentRepository,
    },
    ports::authentication::Identity,
    services::retry::retry_once,
    workflow::registration::{RegistrationError, release_slot},
};

/// Status changes at most once after creation.
const MAX_DELETE_ATTEMPTS: u32 = 3;

#[async_trait::async_trait]
pub trait WithdrawRegistrationUseCase {
    async fn withdraw(
        &self,
        registration_id: RegistrationId,
        requester: &Identity,
    ) -> Result<(), RegistrationError>;
}

pub struct WithdrawRegistrationUseCaseImpl<T: TournamentRepository, R: RegistrationRepository> {
    tournament_repository: Arc<T>,
    registration_repository: Arc<R>,
}

impl<T: TournamentRepository, R: RegistrationRepository> WithdrawRegistrationUseCaseImpl<T, R> {
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
> WithdrawRegistrationUseCase for WithdrawRegistrationUseCaseImpl<T, R>
{
    async fn withdraw(
        &self,
        registration_id: RegistrationId,
        requester: &Identity,
    ) -> Result<(), RegistrationError> {
        let mut attempts = 0;
        let registration = loop {
            let registration =
                fetch_registration(self.registration_repository.as_ref(), registration_id).await?;
            if !registration.is_owned_by(&requester.user_id) && !requester.is_admin() {
                log::info!(
                    "{} tried to withdraw registration {} owned by {}",
                    requester.user_id,
                    registration_id,
                    registration.user_id
                );
                return Err(RegistrationError::Forbidden);
            }

            // Only deletes the status we read, so a review that lands in
            // between is never counted twice.
            match self
                .registration_repository
                .delete_registration(registration_id, registration.status)
                .await
            {
                Ok(()) => break registration,
                Err(RepoUpdateError::NotFound) => return Err(RegistrationError::NotFound),
                Err(RepoUpdateError::Conflict) if attempts < MAX_DELETE_ATTEMPTS => {
                    attempts += 1;
                    log::debug!(
                        "Registration {} changed status during withdrawal, retrying",
                        registration_id
                    );
                }
                Err(RepoUpdateError::Conflict) => {
                    return Err(RegistrationError::InvalidTransition);
                }
                Err(e) => {
                    return Err(RegistrationError::storage("Error deleting registration", e));
                }
            }
        };

        if registration.is_active() {
            release_slot(
                self.tournament_repository.as_ref(),
                registration.tournament_id,
            )
            .await;
        }
        log::info!(
            "Team {} withdrew from tournament {}",
            registration.team_name,
            registration.tournament_id
        );
        Ok(())
    }
}

pub(crate) async fn fetch_registration<R: RegistrationRepository + Send + Sync>(
    registration_repository: &R,
    registration_id: RegistrationId,
) -> Result<Registration, RegistrationError> {
    match retry_once("Fetching registration", || {
        registration_repository.get_registration(registration_id)
    })
    .await
    {
        Ok(registration) => Ok(registration),
        Err(RepoRetrieveError::NotFound) => Err(RegistrationError::NotFound),
        Err(RepoRetrieveError::StorageError(e)) => {
            Err(RegistrationError::storage("Error fetching registration", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::{
        domain::{
            RepoCreateError, RepoError, TournamentId, UserId,
            registration::{PaymentStatus, RegistrationFilter, RegistrationStatus},
        },
        fixtures,
        memory::{InMemoryRegistrationRepository, InMemoryTournamentRepository},
        ports::{authentication::UserRole, clock::FixedClock},
        workflow::registration::{
            register::{RegisterTeamUseCase, RegisterTeamUseCaseImpl},
            review::{ReviewDecision, ReviewRegistrationUseCase, ReviewRegistrationUseCaseImpl},
        },
    };

    struct Setup {
        tournaments: Arc<InMemoryTournamentRepository>,
        registrations: Arc<InMemoryRegistrationRepository>,
        tournament_id: TournamentId,
    }

    impl Setup {
        fn new(max_teams: u32) -> Self {
            let tournament = fixtures::tournament(max_teams, 0);
            Self {
                tournament_id: tournament.id,
                tournaments: Arc::new(InMemoryTournamentRepository::with_tournaments([
                    tournament,
                ])),
                registrations: Arc::new(InMemoryRegistrationRepository::new()),
            }
        }

        async fn register(&self, user: &str, team: &str) -> Result<Registration, RegistrationError> {
            RegisterTeamUseCaseImpl::new(
                self.tournaments.clone(),
                self.registrations.clone(),
                Arc::new(FixedClock(fixtures::now())),
            )
            .register(self.tournament_id, &UserId::new(user), fixtures::request(team))
            .await
        }

        fn withdraw_use_case(
            &self,
        ) -> WithdrawRegistrationUseCaseImpl<InMemoryTournamentRepository, InMemoryRegistrationRepository>
        {
            WithdrawRegistrationUseCaseImpl::new(self.tournaments.clone(), self.registrations.clone())
        }

        async fn current_teams(&self) -> u32 {
            self.tournaments
                .get_tournament(self.tournament_id)
                .await
                .unwrap()
                .current_teams
        }
    }

    fn member(user: &str) -> Identity {
        Identity::new(UserId::new(user), format!("{}@example.com", user), UserRole::Member)
    }

    #[tokio::test]
    async fn test_owner_withdraws_and_frees_slot() {
        let setup = Setup::new(2);
        let alpha = setup.register("u-1", "Alpha").await.unwrap();
        setup.register("u-2", "Beta").await.unwrap();
        assert_eq!(
            setup.register("u-3", "Gamma").await,
            Err(RegistrationError::TournamentFull)
        );

        setup
            .withdraw_use_case()
            .withdraw(alpha.id, &member("u-1"))
            .await
            .unwrap();
        assert_eq!(setup.current_teams().await, 1);
        assert!(setup.register("u-3", "Gamma").await.is_ok());
    }

    #[tokio::test]
    async fn test_stranger_cannot_withdraw() {
        let setup = Setup::new(2);
        let alpha = setup.register("u-1", "Alpha").await.unwrap();

        let result = setup
            .withdraw_use_case()
            .withdraw(alpha.id, &member("u-2"))
            .await;
        assert_eq!(result, Err(RegistrationError::Forbidden));
        assert_eq!(setup.current_teams().await, 1);
    }

    #[tokio::test]
    async fn test_admin_can_withdraw_anyone() {
        let setup = Setup::new(2);
        let alpha = setup.register("u-1", "Alpha").await.unwrap();
        let admin = Identity::new(UserId::new("root"), "root@epic.gg", UserRole::Admin);

        setup.withdraw_use_case().withdraw(alpha.id, &admin).await.unwrap();
        assert_eq!(setup.current_teams().await, 0);
    }

    #[tokio::test]
    async fn test_withdrawing_twice_is_not_found() {
        let setup = Setup::new(2);
        let alpha = setup.register("u-1", "Alpha").await.unwrap();
        let use_case = setup.withdraw_use_case();

        use_case.withdraw(alpha.id, &member("u-1")).await.unwrap();
        assert_eq!(
            use_case.withdraw(alpha.id, &member("u-1")).await,
            Err(RegistrationError::NotFound)
        );
        assert_eq!(setup.current_teams().await, 0);
    }

    #[tokio::test]
    async fn test_rejected_registration_does_not_release_again() {
        let setup = Setup::new(4);
        let alpha = setup.register("u-1", "Alpha").await.unwrap();
        setup.register("u-2", "Beta").await.unwrap();
        setup
            .registrations
            .update_status(alpha.id, RegistrationStatus::Pending, RegistrationStatus::Rejected)
            .await
            .unwrap();
        setup
            .tournaments
            .decrement_team_count(setup.tournament_id)
            .await
            .unwrap();

        setup
            .withdraw_use_case()
            .withdraw(alpha.id, &member("u-1"))
            .await
            .unwrap();
        assert_eq!(setup.current_teams().await, 1);
    }

    #[tokio::test]
    async fn test_counter_matches_registers_minus_withdraws() {
        let setup = Setup::new(20);
        let mut registered = Vec::new();
        for i in 0..7 {
            registered.push(
                setup
                    .register(&format!("u-{}", i), &format!("Team {}", i))
                    .await
                    .unwrap(),
            );
        }
        let use_case = setup.withdraw_use_case();
        for registration in registered.iter().take(3) {
            use_case
                .withdraw(registration.id, &member(registration.user_id.as_str()))
                .await
                .unwrap();
        }
        assert_eq!(setup.current_teams().await, 4);
    }

    /// Lets an admin reject the registration right after the first read,
    /// before the caller acts on what it read.
    struct RejectAfterFirstRead {
        inner: Arc<InMemoryRegistrationRepository>,
        review: ReviewRegistrationUseCaseImpl<
            InMemoryTournamentRepository,
            InMemoryRegistrationRepository,
        >,
        done: AtomicBool,
    }

    #[async_trait::async_trait]
    impl RegistrationRepository for RejectAfterFirstRead {
        async fn create_registration(
            &self,
            registration: Registration,
        ) -> Result<(), RepoCreateError> {
            self.inner.create_registration(registration).await
        }
        async fn get_registration(
            &self,
            id: RegistrationId,
        ) -> Result<Registration, RepoRetrieveError> {
            let registration = self.inner.get_registration(id).await?;
            if !self.done.swap(true, Ordering::SeqCst) {
                let admin = Identity::new(UserId::new("root"), "root@epic.gg", UserRole::Admin);
                self.review
                    .review(id, &admin, ReviewDecision::Reject)
                    .await
                    .unwrap();
            }
            Ok(registration)
        }
        async fn find_by_tournament_and_user(
            &self,
            tournament_id: TournamentId,
            user_id: &UserId,
        ) -> Result<Option<Registration>, RepoError> {
            self.inner
                .find_by_tournament_and_user(tournament_id, user_id)
                .await
        }
        async fn find_by_tournament(
            &self,
            tournament_id: TournamentId,
            filter: RegistrationFilter,
        ) -> Result<Vec<Registration>, RepoError> {
            self.inner.find_by_tournament(tournament_id, filter).await
        }
        async fn update_status(
            &self,
            id: RegistrationId,
            expected: RegistrationStatus,
            status: RegistrationStatus,
        ) -> Result<(), RepoUpdateError> {
            self.inner.update_status(id, expected, status).await
        }
        async fn update_payment(
            &self,
            id: RegistrationId,
            payment_status: PaymentStatus,
            transaction_id: Option<String>,
        ) -> Result<(), RepoUpdateError> {
            self.inner
                .update_payment(id, payment_status, transaction_id)
                .await
        }
        async fn delete_registration(
            &self,
            id: RegistrationId,
            expected: RegistrationStatus,
        ) -> Result<(), RepoUpdateError> {
            self.inner.delete_registration(id, expected).await
        }
        async fn delete_by_tournament(&self, tournament_id: TournamentId) -> Result<u64, RepoError> {
            self.inner.delete_by_tournament(tournament_id).await
        }
    }

    #[tokio::test]
    async fn test_reject_during_withdraw_releases_slot_once() {
        let setup = Setup::new(2);
        let alpha = setup.register("u-1", "Alpha").await.unwrap();
        setup.register("u-2", "Beta").await.unwrap();

        let racing = Arc::new(RejectAfterFirstRead {
            inner: setup.registrations.clone(),
            review: ReviewRegistrationUseCaseImpl::new(
                setup.tournaments.clone(),
                setup.registrations.clone(),
            ),
            done: AtomicBool::new(false),
        });
        WithdrawRegistrationUseCaseImpl::new(setup.tournaments.clone(), racing)
            .withdraw(alpha.id, &member("u-1"))
            .await
            .unwrap();

        assert_eq!(setup.current_teams().await, 1);
        assert!(setup.register("u-3", "Gamma").await.is_ok());
        assert_eq!(
            setup.register("u-4", "Delta").await,
            Err(RegistrationError::TournamentFull)
        );
        let active = setup
            .registrations
            .find_by_tournament(setup.tournament_id, RegistrationFilter::default())
            .await
            .unwrap()
            .into_iter()
            .filter(Registration::is_active)
            .count();
        assert_eq!(active, 2);
    }

    #[tokio::test]
    async fn test_delete_with_stale_status_conflicts() {
        let setup = Setup::new(2);
        let alpha = setup.register("u-1", "Alpha").await.unwrap();
        setup
            .registrations
            .update_status(alpha.id, RegistrationStatus::Pending, RegistrationStatus::Approved)
            .await
            .unwrap();
        assert!(matches!(
            setup
                .registrations
                .delete_registration(alpha.id, RegistrationStatus::Pending)
                .await,
            Err(RepoUpdateError::Conflict)
        ));
    }
}
