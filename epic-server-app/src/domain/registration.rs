use chrono::{DateTime, Utc};
use validator::Validate;

use crate::domain::validation::EMAIL_PATTERN;
use crate::domain::{
    RegistrationId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, TournamentId,
    UserId,
};

#[async_trait::async_trait]
pub trait RegistrationRepository {
    /// Inserts a registration. Returns `Conflict` if the team name is taken in
    /// the tournament or the user already holds an active registration there.
    async fn create_registration(&self, registration: Registration) -> Result<(), RepoCreateError>;
    async fn get_registration(&self, id: RegistrationId)
    -> Result<Registration, RepoRetrieveError>;
    /// The user's active (pending or approved) registration, if any.
    async fn find_by_tournament_and_user(
        &self,
        tournament_id: TournamentId,
        user_id: &UserId,
    ) -> Result<Option<Registration>, RepoError>;
    /// Oldest first.
    async fn find_by_tournament(
        &self,
        tournament_id: TournamentId,
        filter: RegistrationFilter,
    ) -> Result<Vec<Registration>, RepoError>;
    /// Moves the registration to `status` only if it is still in `expected`;
    /// `Conflict` otherwise.
    async fn update_status(
        &self,
        id: RegistrationId,
        expected: RegistrationStatus,
        status: RegistrationStatus,
    ) -> Result<(), RepoUpdateError>;
    async fn update_payment(
        &self,
        id: RegistrationId,
        payment_status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> Result<(), RepoUpdateError>;
    /// Deletes the registration only if it is still in `expected`;
    /// `Conflict` otherwise.
    async fn delete_registration(
        &self,
        id: RegistrationId,
        expected: RegistrationStatus,
    ) -> Result<(), RepoUpdateError>;
    async fn delete_by_tournament(&self, tournament_id: TournamentId) -> Result<u64, RepoError>;
}

#[derive(Clone, Debug, Default)]
pub struct RegistrationFilter {
    pub user_id: Option<UserId>,
    pub status: Option<RegistrationStatus>,
}

impl RegistrationFilter {
    pub fn matches(&self, registration: &Registration) -> bool {
        self.user_id
            .as_ref()
            .is_none_or(|u| u == &registration.user_id)
            && self.status.is_none_or(|s| s == registration.status)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    /// Active registrations hold a slot in the tournament.
    pub fn is_active(&self) -> bool {
        !matches!(self, RegistrationStatus::Rejected)
    }

    pub fn can_transition_to(&self, next: RegistrationStatus) -> bool {
        matches!(
            (self, next),
            (
                RegistrationStatus::Pending,
                RegistrationStatus::Approved | RegistrationStatus::Rejected
            )
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RegistrationStatus::Pending),
            "approved" => Ok(RegistrationStatus::Approved),
            "rejected" => Ok(RegistrationStatus::Rejected),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Free,
    Refunded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Free => "free",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "free" => Ok(PaymentStatus::Free),
            "refunded" => Ok(PaymentStatus::Refunded),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Upi,
    Card,
    Other,
    None,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
            PaymentMethod::Other => "other",
            PaymentMethod::None => "none",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upi" => Ok(PaymentMethod::Upi),
            "card" => Ok(PaymentMethod::Card),
            "other" => Ok(PaymentMethod::Other),
            "none" => Ok(PaymentMethod::None),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Validate)]
pub struct TeamMember {
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub name: String,
    #[validate(regex(path = *EMAIL_PATTERN))]
    pub email: String,
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub game_id: String,
}

#[derive(Clone, Debug, PartialEq, Validate)]
pub struct Captain {
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub name: String,
    #[validate(regex(path = *EMAIL_PATTERN))]
    pub email: String,
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub phone: String,
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub game_id: String,
}

#[derive(Clone, Debug, PartialEq, Validate)]
pub struct ContactInfo {
    #[validate(regex(path = *EMAIL_PATTERN))]
    pub email: String,
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Registration {
    pub id: RegistrationId,
    pub tournament_id: TournamentId,
    pub user_id: UserId,
    pub team_name: String,
    pub team_members: Vec<TeamMember>,
    pub captain: Captain,
    pub contact_info: ContactInfo,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: RegistrationStatus,
    pub transaction_id: Option<String>,
    pub notes: String,
    pub agreed_to_terms: bool,
    pub registration_date: DateTime<Utc>,
}

impl Registration {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
