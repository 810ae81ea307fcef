use dashmap::DashMap;

use crate::domain::{
    RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, TournamentId,
    tournament::{Tournament, TournamentFilter, TournamentRepository, TournamentStatus},
};

/// Names are claimed in their own map first, so two creates with the same
/// name cannot both pass.
#[derive(Default)]
pub struct InMemoryTournamentRepository {
    tournaments: DashMap<TournamentId, Tournament>,
    names: DashMap<String, TournamentId>,
}

impl InMemoryTournamentRepository {
    pub fn new() -> Self {
        Self {
            tournaments: DashMap::new(),
            names: DashMap::new(),
        }
    }

    pub fn with_tournaments(tournaments: impl IntoIterator<Item = Tournament>) -> Self {
        let repo = Self::new();
        for tournament in tournaments {
            repo.names.insert(tournament.name.clone(), tournament.id);
            repo.tournaments.insert(tournament.id, tournament);
        }
        repo
    }
}

#[async_trait::async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    async fn get_tournament(&self, id: TournamentId) -> Result<Tournament, RepoRetrieveError> {
        self.tournaments
            .get(&id)
            .map(|t| t.clone())
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_tournaments(&self, filter: TournamentFilter) -> Result<Vec<Tournament>, RepoError> {
        let mut tournaments: Vec<Tournament> = self
            .tournaments
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        filter.sort(&mut tournaments);
        tournaments.truncate(filter.limit);
        Ok(tournaments)
    }

    async fn create_tournament(&self, tournament: Tournament) -> Result<(), RepoCreateError> {
        match self.names.entry(tournament.name.clone()) {
            dashmap::Entry::Occupied(_) => return Err(RepoCreateError::Conflict),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(tournament.id);
            }
        }
        match self.tournaments.entry(tournament.id) {
            dashmap::Entry::Occupied(_) => {
                self.names.remove(&tournament.name);
                Err(RepoCreateError::Conflict)
            }
            dashmap::Entry::Vacant(slot) => {
                slot.insert(tournament);
                Ok(())
            }
        }
    }

    async fn update_status(
        &self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<(), RepoUpdateError> {
        let mut tournament = self.tournaments.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        tournament.status = status;
        Ok(())
    }

    async fn increment_team_count(&self, id: TournamentId) -> Result<(), RepoUpdateError> {
        // The entry guard holds the shard lock, so check and increment are one step.
        let mut tournament = self.tournaments.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        if tournament.current_teams >= tournament.max_teams {
            return Err(RepoUpdateError::Conflict);
        }
        tournament.current_teams += 1;
        Ok(())
    }

    async fn decrement_team_count(&self, id: TournamentId) -> Result<(), RepoUpdateError> {
        let mut tournament = self.tournaments.get_mut(&id).ok_or(RepoUpdateError::NotFound)?;
        tournament.current_teams = tournament.current_teams.saturating_sub(1);
        Ok(())
    }

    async fn delete_tournament(&self, id: TournamentId) -> Result<(), RepoUpdateError> {
        let (_, tournament) = self.tournaments.remove(&id).ok_or(RepoUpdateError::NotFound)?;
        self.names.remove_if(&tournament.name, |_, owner| *owner == id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn test_concurrent_creates_with_same_name() {
        let repo = Arc::new(InMemoryTournamentRepository::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = repo.clone();
                let mut tournament = fixtures::tournament(4, 0);
                tournament.name = "Winter Cup".to_string();
                tokio::spawn(async move { repo.create_tournament(tournament).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        let listed = repo
            .list_tournaments(TournamentFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_name_can_be_reused() {
        let repo = InMemoryTournamentRepository::new();
        let mut first = fixtures::tournament(4, 0);
        first.name = "Winter Cup".to_string();
        let first_id = first.id;
        repo.create_tournament(first).await.unwrap();

        let mut second = fixtures::tournament(4, 0);
        second.name = "Winter Cup".to_string();
        assert!(matches!(
            repo.create_tournament(second.clone()).await,
            Err(RepoCreateError::Conflict)
        ));

        repo.delete_tournament(first_id).await.unwrap();
        repo.create_tournament(second).await.unwrap();
    }
}
