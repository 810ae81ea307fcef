pub mod authentication;
pub mod clock;
