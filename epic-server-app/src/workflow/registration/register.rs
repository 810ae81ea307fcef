use std::sync::Arc;

use validator::Validate;

use crate::{
    domain::{
        RegistrationId, RepoCreateError, RepoRetrieveError, RepoUpdateError, TournamentId, UserId,
        registration::{
            PaymentMethod, PaymentStatus, Registration, RegistrationRepository,
            RegistrationStatus,
        },
        tournament::{Tournament, TournamentRepository, TournamentStatus},
        validation::invalid_fields,
    },
    ports::clock::ClockPort,
    services::retry::retry_once,
    workflow::registration::{RegistrationError, RegistrationRequest, release_slot},
};

#[async_trait::async_trait]
pub trait RegisterTeamUseCase {
    async fn register(
        &self,
        tournament_id: TournamentId,
        user_id: &UserId,
        request: RegistrationRequest,
    ) -> Result<Registration, RegistrationError>;
}

pub struct RegisterTeamUseCaseImpl<T: TournamentRepository, R: RegistrationRepository, C: ClockPort>
{
    tournament_repository: Arc<T>,
    registration_repository: Arc<R>,
    clock: Arc<C>,
}

impl<T: TournamentRepository, R: RegistrationRepository, C: ClockPort>
    RegisterTeamUseCaseImpl<T, R, C>
{
    pub fn new(tournament_repository: Arc<T>, registration_repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            tournament_repository,
            registration_repository,
            clock,
        }
    }
}

#[async_trait::async_trait]
impl<
    T: TournamentRepository + Send + Sync + 'static,
    R: RegistrationRepository + Send + Sync + 'static,
    C: ClockPort + Send + Sync + 'static,
> RegisterTeamUseCase for RegisterTeamUseCaseImpl<T, R, C>
{
    async fn register(
        &self,
        tournament_id: TournamentId,
        user_id: &UserId,
        request: RegistrationRequest,
    ) -> Result<Registration, RegistrationError> {
        let tournament = match retry_once("Fetching tournament", || {
            self.tournament_repository.get_tournament(tournament_id)
        })
        .await
        {
            Ok(tournament) => tournament,
            Err(RepoRetrieveError::NotFound) => return Err(RegistrationError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                return Err(RegistrationError::storage("Error fetching tournament", e));
            }
        };

        if tournament.status != TournamentStatus::Upcoming {
            log::debug!("Tournament {} is {}", tournament_id, tournament.status);
            return Err(RegistrationError::RegistrationClosed);
        }
        if tournament.is_full() {
            return Err(RegistrationError::TournamentFull);
        }
        if self.clock.now() > tournament.registration_deadline {
            log::debug!("Registration deadline of {} has passed", tournament_id);
            return Err(RegistrationError::RegistrationClosed);
        }

        let existing = retry_once("Checking existing registration", || {
            self.registration_repository
                .find_by_tournament_and_user(tournament_id, user_id)
        })
        .await
        .map_err(|e| RegistrationError::storage("Error checking existing registration", e))?;
        if existing.is_some() {
            return Err(RegistrationError::AlreadyRegistered);
        }

        let request = request.trimmed();
        let payment_method = validate_request(&tournament, &request)?;

        let registration = build_registration(
            &tournament,
            user_id,
            request,
            payment_method,
            self.clock.now(),
        );

        match self
            .tournament_repository
            .increment_team_count(tournament_id)
            .await
        {
            Ok(()) => {}
            Err(RepoUpdateError::Conflict) => return Err(RegistrationError::TournamentFull),
            Err(RepoUpdateError::NotFound) => return Err(RegistrationError::NotFound),
            Err(RepoUpdateError::StorageError(e)) => {
                return Err(RegistrationError::storage("Error reserving slot", e));
            }
        }

        if let Err(e) = self
            .registration_repository
            .create_registration(registration.clone())
            .await
        {
            release_slot(self.tournament_repository.as_ref(), tournament_id).await;
            return Err(match e {
                RepoCreateError::Conflict => self.explain_conflict(tournament_id, user_id).await,
                RepoCreateError::StorageError(e) => {
                    RegistrationError::storage("Error saving registration", e)
                }
            });
        }

        log::info!(
            "Team {} registered for tournament {} by {}",
            registration.team_name,
            tournament_id,
            user_id
        );
        Ok(registration)
    }
}

impl<
    T: TournamentRepository + Send + Sync + 'static,
    R: RegistrationRepository + Send + Sync + 'static,
    C: ClockPort + Send + Sync + 'static,
> RegisterTeamUseCaseImpl<T, R, C>
{
    /// The store rejected the insert: either the user got in first through a
    /// concurrent request or another team already holds the name.
    async fn explain_conflict(
        &self,
        tournament_id: TournamentId,
        user_id: &UserId,
    ) -> RegistrationError {
        match self
            .registration_repository
            .find_by_tournament_and_user(tournament_id, user_id)
            .await
        {
            Ok(Some(_)) => RegistrationError::AlreadyRegistered,
            Ok(None) => RegistrationError::ValidationError(vec!["teamName".to_string()]),
            Err(e) => RegistrationError::storage("Error checking existing registration", e),
        }
    }
}

/// Returns the payment method to store.
fn validate_request(
    tournament: &Tournament,
    request: &RegistrationRequest,
) -> Result<PaymentMethod, RegistrationError> {
    let mut fields = match request.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => invalid_fields(&errors),
    };
    if request.team_members.len() != tournament.members_per_team()
        && !fields.iter().any(|f| f == "teamMembers")
    {
        fields.push("teamMembers".to_string());
        fields.sort();
    }
    if !fields.is_empty() {
        return Err(RegistrationError::ValidationError(fields));
    }

    if !request.agreed_to_terms {
        return Err(RegistrationError::ValidationError(vec![
            "agreedToTerms".to_string(),
        ]));
    }

    if tournament.is_free() {
        return Ok(PaymentMethod::None);
    }
    let payment_method = request
        .parsed_payment_method()
        .filter(|m| *m != PaymentMethod::None);
    let mut fields = Vec::new();
    if payment_method.is_none() {
        fields.push("paymentMethod".to_string());
    }
    if request.transaction_id.is_none() {
        fields.push("transactionId".to_string());
    }
    match payment_method {
        Some(method) if fields.is_empty() => Ok(method),
        _ => Err(RegistrationError::ValidationError(fields)),
    }
}

fn build_registration(
    tournament: &Tournament,
    user_id: &UserId,
    request: RegistrationRequest,
    payment_method: PaymentMethod,
    now: chrono::DateTime<chrono::Utc>,
) -> Registration {
    let (payment_status, transaction_id) = if tournament.is_free() {
        (PaymentStatus::Free, None)
    } else {
        (PaymentStatus::Pending, request.transaction_id)
    };
    Registration {
        id: RegistrationId::new(),
        tournament_id: tournament.id,
        user_id: user_id.clone(),
        team_name: request.team_name,
        team_members: request.team_members,
        captain: request.captain,
        contact_info: request.contact_info,
        payment_method,
        payment_status,
        status: RegistrationStatus::Pending,
        transaction_id,
        notes: request.notes,
        agreed_to_terms: request.agreed_to_terms,
        registration_date: now,
    }
}
