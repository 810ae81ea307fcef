use chrono::{DateTime, Utc};
use validator::Validate;

use crate::domain::{
    RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, SortOrder, TournamentId,
};

#[async_trait::async_trait]
pub trait TournamentRepository {
    async fn get_tournament(&self, id: TournamentId) -> Result<Tournament, RepoRetrieveError>;
    async fn list_tournaments(&self, filter: TournamentFilter) -> Result<Vec<Tournament>, RepoError>;
    async fn create_tournament(&self, tournament: Tournament) -> Result<(), RepoCreateError>;
    async fn update_status(
        &self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<(), RepoUpdateError>;
    /// Takes one slot. Must be a single conditional update so two concurrent
    /// callers can never both pass the capacity check; `Conflict` means full.
    async fn increment_team_count(&self, id: TournamentId) -> Result<(), RepoUpdateError>;
    /// Gives one slot back, never going below zero.
    async fn decrement_team_count(&self, id: TournamentId) -> Result<(), RepoUpdateError>;
    async fn delete_tournament(&self, id: TournamentId) -> Result<(), RepoUpdateError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TournamentStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl TournamentStatus {
    pub const ALL: [TournamentStatus; 3] = [
        TournamentStatus::Upcoming,
        TournamentStatus::Ongoing,
        TournamentStatus::Completed,
    ];

    fn rank(&self) -> u8 {
        match self {
            TournamentStatus::Upcoming => 0,
            TournamentStatus::Ongoing => 1,
            TournamentStatus::Completed => 2,
        }
    }

    /// Status only ever moves forward.
    pub fn can_transition_to(&self, next: TournamentStatus) -> bool {
        next.rank() > self.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TournamentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(TournamentStatus::Upcoming),
            "ongoing" => Ok(TournamentStatus::Ongoing),
            "completed" => Ok(TournamentStatus::Completed),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Prize {
    pub position: u32,
    pub reward: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleEntry {
    pub stage: String,
    pub date: DateTime<Utc>,
    pub details: String,
}

#[derive(Clone, Debug, PartialEq, Validate)]
pub struct Organizer {
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub name: String,
    pub contact: String,
    pub verified: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub game: String,
    pub game_image: Option<String>,
    pub location: String,
    pub description: String,
    pub rules: String,
    pub prize_pool: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub team_size: u32,
    pub max_teams: u32,
    pub current_teams: u32,
    pub status: TournamentStatus,
    pub registration_fee: u32,
    pub prizes: Vec<Prize>,
    pub schedule: Vec<ScheduleEntry>,
    pub organizer: Organizer,
    pub featured: bool,
    pub stream_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_free(&self) -> bool {
        self.registration_fee == 0
    }

    pub fn is_full(&self) -> bool {
        self.current_teams >= self.max_teams
    }

    pub fn members_per_team(&self) -> usize {
        self.team_size.saturating_sub(1) as usize
    }
}

/// Everything an organizer supplies when creating a tournament.
#[derive(Clone, Debug, Validate)]
pub struct NewTournament {
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub name: String,
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub game: String,
    pub game_image: Option<String>,
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub location: String,
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub description: String,
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub rules: String,
    pub prize_pool: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub team_size: u32,
    #[validate(range(min = 1))]
    pub max_teams: u32,
    pub registration_fee: u32,
    pub prizes: Vec<Prize>,
    pub schedule: Vec<ScheduleEntry>,
    #[validate(nested)]
    pub organizer: Organizer,
    pub featured: bool,
    pub stream_link: Option<String>,
}

impl NewTournament {
    /// Field paths that fail the shape and date rules, sorted.
    pub fn invalid_fields(&self) -> Vec<String> {
        let mut fields = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => crate::domain::validation::invalid_fields(&errors),
        };
        if self.end_date < self.start_date {
            fields.push("endDate".to_string());
        }
        if self.registration_deadline > self.start_date {
            fields.push("registrationDeadline".to_string());
        }
        fields.sort();
        fields
    }

    pub fn into_tournament(self, id: TournamentId, created_at: DateTime<Utc>) -> Tournament {
        Tournament {
            id,
            name: self.name,
            game: self.game,
            game_image: self.game_image,
            location: self.location,
            description: self.description,
            rules: self.rules,
            prize_pool: self.prize_pool,
            start_date: self.start_date,
            end_date: self.end_date,
            registration_deadline: self.registration_deadline,
            team_size: self.team_size,
            max_teams: self.max_teams,
            current_teams: 0,
            status: TournamentStatus::Upcoming,
            registration_fee: self.registration_fee,
            prizes: self.prizes,
            schedule: self.schedule,
            organizer: self.organizer,
            featured: self.featured,
            stream_link: self.stream_link,
            created_at,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TournamentSortBy {
    StartDate,
    Prize,
    Popularity,
}

impl TournamentSortBy {
    pub fn default_order(&self) -> SortOrder {
        match self {
            TournamentSortBy::StartDate => SortOrder::Ascending,
            TournamentSortBy::Prize => SortOrder::Descending,
            TournamentSortBy::Popularity => SortOrder::Descending,
        }
    }
}

pub const DEFAULT_TOURNAMENT_LIMIT: usize = 100;

#[derive(Clone, Debug)]
pub struct TournamentFilter {
    pub game: Option<String>,
    pub status: Option<TournamentStatus>,
    pub team_size: Option<u32>,
    pub featured: Option<bool>,
    pub sort: TournamentSortBy,
    pub limit: usize,
}

impl Default for TournamentFilter {
    fn default() -> Self {
        Self {
            game: None,
            status: None,
            team_size: None,
            featured: None,
            sort: TournamentSortBy::StartDate,
            limit: DEFAULT_TOURNAMENT_LIMIT,
        }
    }
}

impl TournamentFilter {
    pub fn matches(&self, tournament: &Tournament) -> bool {
        self.game.as_ref().is_none_or(|g| g == &tournament.game)
            && self.status.is_none_or(|s| s == tournament.status)
            && self.team_size.is_none_or(|t| t == tournament.team_size)
            && self.featured.is_none_or(|f| f == tournament.featured)
    }

    /// Orders tournaments the same way the database query does.
    pub fn sort(&self, tournaments: &mut [Tournament]) {
        match self.sort {
            TournamentSortBy::StartDate => tournaments.sort_by_key(|t| t.start_date),
            TournamentSortBy::Prize => {
                tournaments.sort_by(|a, b| b.registration_fee.cmp(&a.registration_fee))
            }
            TournamentSortBy::Popularity => {
                tournaments.sort_by(|a, b| b.current_teams.cmp(&a.current_teams))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_moves_forward() {
        use TournamentStatus::*;
        assert!(Upcoming.can_transition_to(Ongoing));
        assert!(Upcoming.can_transition_to(Completed));
        assert!(Ongoing.can_transition_to(Completed));
        assert!(!Ongoing.can_transition_to(Upcoming));
        assert!(!Completed.can_transition_to(Ongoing));
        assert!(!Upcoming.can_transition_to(Upcoming));
    }

    #[test]
    fn test_status_parse() {
        for status in TournamentStatus::ALL {
            assert_eq!(status.as_str().parse::<TournamentStatus>(), Ok(status));
        }
        assert!("cancelled".parse::<TournamentStatus>().is_err());
    }
}
