use std::sync::Arc;

use crate::{
    domain::{registration::RegistrationRepository, tournament::TournamentRepository},
    ports::{authentication::AuthenticationPort, clock::ClockPort},
    workflow::{
        registration::{
            list::{ListRegistrationsUseCase, ListRegistrationsUseCaseImpl},
            payment::{UpdatePaymentUseCase, UpdatePaymentUseCaseImpl},
            register::{RegisterTeamUseCase, RegisterTeamUseCaseImpl},
            review::{ReviewRegistrationUseCase, ReviewRegistrationUseCaseImpl},
            teams::{ListTeamsUseCase, ListTeamsUseCaseImpl},
            withdraw::{WithdrawRegistrationUseCase, WithdrawRegistrationUseCaseImpl},
        },
        tournament::{
            create::{CreateTournamentUseCase, CreateTournamentUseCaseImpl},
            delete::{DeleteTournamentUseCase, DeleteTournamentUseCaseImpl},
            get::{GetTournamentUseCase, GetTournamentUseCaseImpl},
            list::{ListTournamentsUseCase, ListTournamentsUseCaseImpl},
            status::{UpdateTournamentStatusUseCase, UpdateTournamentStatusUseCaseImpl},
        },
    },
};

pub mod domain;
pub mod memory;
pub mod ports;
pub mod services;
pub mod workflow;

#[cfg(test)]
mod fixtures;

pub struct Application {
    pub authentication: Arc<dyn AuthenticationPort + Send + Sync + 'static>,

    pub registration_register_use_case: Box<dyn RegisterTeamUseCase + Send + Sync + 'static>,
    pub registration_list_use_case: Box<dyn ListRegistrationsUseCase + Send + Sync + 'static>,
    pub registration_withdraw_use_case:
        Box<dyn WithdrawRegistrationUseCase + Send + Sync + 'static>,
    pub registration_review_use_case: Box<dyn ReviewRegistrationUseCase + Send + Sync + 'static>,
    pub registration_payment_use_case: Box<dyn UpdatePaymentUseCase + Send + Sync + 'static>,
    pub team_list_use_case: Box<dyn ListTeamsUseCase + Send + Sync + 'static>,

    pub tournament_create_use_case: Box<dyn CreateTournamentUseCase + Send + Sync + 'static>,
    pub tournament_get_use_case: Box<dyn GetTournamentUseCase + Send + Sync + 'static>,
    pub tournament_list_use_case: Box<dyn ListTournamentsUseCase + Send + Sync + 'static>,
    pub tournament_status_use_case:
        Box<dyn UpdateTournamentStatusUseCase + Send + Sync + 'static>,
    pub tournament_delete_use_case: Box<dyn DeleteTournamentUseCase + Send + Sync + 'static>,
}

pub fn build_application<
    T: TournamentRepository + Send + Sync + 'static,
    R: RegistrationRepository + Send + Sync + 'static,
    A: AuthenticationPort + Send + Sync + 'static,
    C: ClockPort + Send + Sync + 'static,
>(
    tournament_repository: Arc<T>,
    registration_repository: Arc<R>,
    authentication_port: Arc<A>,
    clock: Arc<C>,
) -> Application {
    Application {
        authentication: authentication_port,

        registration_register_use_case: Box::new(RegisterTeamUseCaseImpl::new(
            tournament_repository.clone(),
            registration_repository.clone(),
            clock.clone(),
        )),
        registration_list_use_case: Box::new(ListRegistrationsUseCaseImpl::new(
            tournament_repository.clone(),
            registration_repository.clone(),
        )),
        registration_withdraw_use_case: Box::new(WithdrawRegistrationUseCaseImpl::new(
            tournament_repository.clone(),
            registration_repository.clone(),
        )),
        registration_review_use_case: Box::new(ReviewRegistrationUseCaseImpl::new(
            tournament_repository.clone(),
            registration_repository.clone(),
        )),
        registration_payment_use_case: Box::new(UpdatePaymentUseCaseImpl::new(
            registration_repository.clone(),
        )),
        team_list_use_case: Box::new(ListTeamsUseCaseImpl::new(
            tournament_repository.clone(),
            registration_repository.clone(),
        )),

        tournament_create_use_case: Box::new(CreateTournamentUseCaseImpl::new(
            tournament_repository.clone(),
            clock.clone(),
        )),
        tournament_get_use_case: Box::new(GetTournamentUseCaseImpl::new(
            tournament_repository.clone(),
        )),
        tournament_list_use_case: Box::new(ListTournamentsUseCaseImpl::new(
            tournament_repository.clone(),
        )),
        tournament_status_use_case: Box::new(UpdateTournamentStatusUseCaseImpl::new(
            tournament_repository.clone(),
        )),
        tournament_delete_use_case: Box::new(DeleteTournamentUseCaseImpl::new(
            tournament_repository,
            registration_repository,
        )),
    }
}
