use validator::Validate;

use crate::domain::{
    RepoUpdateError, TournamentId,
    registration::{Captain, ContactInfo, PaymentMethod, TeamMember},
    tournament::TournamentRepository,
};

pub mod list;
pub mod payment;
pub mod register;
pub mod review;
pub mod teams;
pub mod withdraw;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Tournament or registration not found")]
    NotFound,
    #[error("Registration is closed for this tournament")]
    RegistrationClosed,
    #[error("Tournament is full")]
    TournamentFull,
    #[error("Already registered for this tournament")]
    AlreadyRegistered,
    #[error("Invalid fields: {}", .0.join(", "))]
    ValidationError(Vec<String>),
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Not allowed to modify this registration")]
    Forbidden,
    #[error("Registration cannot move to the requested status")]
    InvalidTransition,
}

impl RegistrationError {
    pub fn kind(&self) -> &'static str {
        match self {
            RegistrationError::NotFound => "NotFound",
            RegistrationError::RegistrationClosed => "RegistrationClosed",
            RegistrationError::TournamentFull => "TournamentFull",
            RegistrationError::AlreadyRegistered => "AlreadyRegistered",
            RegistrationError::ValidationError(_) => "ValidationError",
            RegistrationError::Unauthenticated => "Unauthenticated",
            RegistrationError::StorageUnavailable(_) => "StorageUnavailable",
            RegistrationError::Forbidden => "Forbidden",
            RegistrationError::InvalidTransition => "InvalidTransition",
        }
    }

    fn storage(context: &str, e: impl std::fmt::Display) -> Self {
        log::error!("{}: {}", context, e);
        RegistrationError::StorageUnavailable(e.to_string())
    }
}

/// Team details as submitted by the captain.
#[derive(Clone, Debug, Validate)]
pub struct RegistrationRequest {
    #[validate(custom(function = "crate::domain::validation::non_blank"))]
    pub team_name: String,
    #[validate(nested)]
    pub team_members: Vec<TeamMember>,
    #[validate(nested)]
    pub captain: Captain,
    #[validate(nested)]
    pub contact_info: ContactInfo,
    /// As submitted. Only read for paid tournaments.
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub notes: String,
    pub agreed_to_terms: bool,
}

impl RegistrationRequest {
    /// Strips surrounding whitespace from every free-text field.
    pub fn trimmed(self) -> Self {
        fn trim(s: String) -> String {
            s.trim().to_string()
        }
        Self {
            team_name: trim(self.team_name),
            team_members: self
                .team_members
                .into_iter()
                .map(|m| TeamMember {
                    name: trim(m.name),
                    email: trim(m.email),
                    game_id: trim(m.game_id),
                })
                .collect(),
            captain: Captain {
                name: trim(self.captain.name),
                email: trim(self.captain.email),
                phone: trim(self.captain.phone),
                game_id: trim(self.captain.game_id),
            },
            contact_info: ContactInfo {
                email: trim(self.contact_info.email),
                phone: trim(self.contact_info.phone),
            },
            payment_method: self.payment_method.map(trim).filter(|m| !m.is_empty()),
            transaction_id: self
                .transaction_id
                .map(trim)
                .filter(|t| !t.is_empty()),
            notes: trim(self.notes),
            agreed_to_terms: self.agreed_to_terms,
        }
    }

    /// The submitted payment method, `upi` when none was given. `None` when
    /// the value is not a known method.
    pub fn parsed_payment_method(&self) -> Option<PaymentMethod> {
        match self.payment_method.as_deref().map(str::trim) {
            None | Some("") => Some(PaymentMethod::Upi),
            Some(method) => method.parse().ok(),
        }
    }
}

/// Gives a slot back to the tournament. A failure leaves the counter one
/// too high, which is logged but not surfaced.
pub(crate) async fn release_slot<T: TournamentRepository + Send + Sync>(
    tournament_repository: &T,
    tournament_id: TournamentId,
) {
    match tournament_repository.decrement_team_count(tournament_id).await {
        Ok(()) | Err(RepoUpdateError::NotFound) => {}
        Err(e) => {
            log::warn!(
                "Failed to release slot of tournament {}: {}",
                tournament_id,
                e
            );
        }
    }
}
