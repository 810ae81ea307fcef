use epic_server_app::domain::{RegistrationId, TournamentId};

use crate::app::ServiceError;

pub mod registrations;
pub mod tournaments;

// Unparseable ids can never match a stored record, so they read as missing.
fn parse_tournament_id(id: &str) -> Result<TournamentId, ServiceError> {
    id.parse()
        .map_err(|_| ServiceError::NotFound(format!("Tournament '{}' not found", id)))
}

fn parse_registration_id(id: &str) -> Result<RegistrationId, ServiceError> {
    id.parse()
        .map_err(|_| ServiceError::NotFound(format!("Registration '{}' not found", id)))
}
