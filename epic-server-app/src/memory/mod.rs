//! In-process repositories. Used when the server runs without a database and
//! as the backing store in workflow tests.

mod registrations;
mod tournaments;

pub use registrations::InMemoryRegistrationRepository;
pub use tournaments::InMemoryTournamentRepository;
