use dashmap::DashMap;

use crate::domain::{
    RegistrationId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, TournamentId,
    UserId,
    registration::{
        PaymentStatus, Registration, RegistrationFilter, RegistrationRepository,
        RegistrationStatus,
    },
};

/// Registrations are grouped per tournament so that the duplicate checks and
/// the insert run under the same entry lock.
#[derive(Default)]
pub struct InMemoryRegistrationRepository {
    by_tournament: DashMap<TournamentId, Vec<Registration>>,
    index: DashMap<RegistrationId, TournamentId>,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self {
            by_tournament: DashMap::new(),
            index: DashMap::new(),
        }
    }

    fn with_registration<R>(
        &self,
        id: RegistrationId,
        f: impl FnOnce(&mut Registration) -> R,
    ) -> Option<R> {
        let tournament_id = *self.index.get(&id)?;
        let mut registrations = self.by_tournament.get_mut(&tournament_id)?;
        registrations.iter_mut().find(|r| r.id == id).map(f)
    }
}

#[async_trait::async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn create_registration(&self, registration: Registration) -> Result<(), RepoCreateError> {
        let mut registrations = self
            .by_tournament
            .entry(registration.tournament_id)
            .or_default();
        let clashes = registrations.iter().any(|existing| {
            existing.is_active()
                && (existing.team_name == registration.team_name
                    || existing.user_id == registration.user_id)
        });
        if clashes {
            return Err(RepoCreateError::Conflict);
        }
        self.index
            .insert(registration.id, registration.tournament_id);
        registrations.push(registration);
        Ok(())
    }

    async fn get_registration(
        &self,
        id: RegistrationId,
    ) -> Result<Registration, RepoRetrieveError> {
        self.with_registration(id, |r| r.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn find_by_tournament_and_user(
        &self,
        tournament_id: TournamentId,
        user_id: &UserId,
    ) -> Result<Option<Registration>, RepoError> {
        Ok(self.by_tournament.get(&tournament_id).and_then(|registrations| {
            registrations
                .iter()
                .find(|r| r.is_active() && &r.user_id == user_id)
                .cloned()
        }))
    }

    async fn find_by_tournament(
        &self,
        tournament_id: TournamentId,
        filter: RegistrationFilter,
    ) -> Result<Vec<Registration>, RepoError> {
        let mut registrations: Vec<Registration> = self
            .by_tournament
            .get(&tournament_id)
            .map(|registrations| {
                registrations
                    .iter()
                    .filter(|r| filter.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        registrations.sort_by_key(|r| r.registration_date);
        Ok(registrations)
    }

    async fn update_status(
        &self,
        id: RegistrationId,
        expected: RegistrationStatus,
        status: RegistrationStatus,
    ) -> Result<(), RepoUpdateError> {
        self.with_registration(id, |r| {
            if r.status != expected {
                return Err(RepoUpdateError::Conflict);
            }
            r.status = status;
            Ok(())
        })
        .ok_or(RepoUpdateError::NotFound)?
    }

    async fn update_payment(
        &self,
        id: RegistrationId,
        payment_status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> Result<(), RepoUpdateError> {
        self.with_registration(id, |r| {
            r.payment_status = payment_status;
            if transaction_id.is_some() {
                r.transaction_id = transaction_id;
            }
        })
        .ok_or(RepoUpdateError::NotFound)
    }

    async fn delete_registration(
        &self,
        id: RegistrationId,
        expected: RegistrationStatus,
    ) -> Result<(), RepoUpdateError> {
        let tournament_id = *self.index.get(&id).ok_or(RepoUpdateError::NotFound)?;
        let mut registrations = self
            .by_tournament
            .get_mut(&tournament_id)
            .ok_or(RepoUpdateError::NotFound)?;
        let position = registrations
            .iter()
            .position(|r| r.id == id)
            .ok_or(RepoUpdateError::NotFound)?;
        if registrations[position].status != expected {
            return Err(RepoUpdateError::Conflict);
        }
        registrations.remove(position);
        self.index.remove(&id);
        Ok(())
    }

    async fn delete_by_tournament(&self, tournament_id: TournamentId) -> Result<u64, RepoError> {
        let Some((_, registrations)) = self.by_tournament.remove(&tournament_id) else {
            return Ok(0);
        };
        for registration in &registrations {
            self.index.remove(&registration.id);
        }
        Ok(registrations.len() as u64)
    }
}
