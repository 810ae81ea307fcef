use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use epic_server_app::{
    domain::registration::{
        Captain, ContactInfo, PaymentStatus, Registration, RegistrationStatus,
        TeamMember,
    },
    workflow::registration::{RegistrationError, RegistrationRequest, review::ReviewDecision},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    app::ServiceError,
    auth::Auth,
    http::{parse_registration_id, parse_tournament_id},
};

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonTeamMember {
    pub name: String,
    pub email: String,
    pub game_id: String,
}

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonCaptain {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub game_id: String,
}

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonContactInfo {
    pub email: String,
    pub phone: String,
}

/// Missing fields deserialize to empty values so that validation can name
/// every one of them instead of failing on the first.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonRegistrationRequest {
    team_name: String,
    team_members: Vec<JsonTeamMember>,
    captain: JsonCaptain,
    contact_info: JsonContactInfo,
    payment_method: Option<String>,
    transaction_id: Option<String>,
    notes: String,
    agreed_to_terms: bool,
}

impl From<JsonRegistrationRequest> for RegistrationRequest {
    fn from(r: JsonRegistrationRequest) -> Self {
        RegistrationRequest {
            team_name: r.team_name,
            team_members: r
                .team_members
                .into_iter()
                .map(|m| TeamMember {
                    name: m.name,
                    email: m.email,
                    game_id: m.game_id,
                })
                .collect(),
            captain: Captain {
                name: r.captain.name,
                email: r.captain.email,
                phone: r.captain.phone,
                game_id: r.captain.game_id,
            },
            contact_info: ContactInfo {
                email: r.contact_info.email,
                phone: r.contact_info.phone,
            },
            payment_method: r.payment_method,
            transaction_id: r.transaction_id,
            notes: r.notes,
            agreed_to_terms: r.agreed_to_terms,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRegistration {
    id: String,
    tournament_id: String,
    user_id: String,
    team_name: String,
    team_members: Vec<JsonTeamMember>,
    captain: JsonCaptain,
    contact_info: JsonContactInfo,
    payment_method: &'static str,
    payment_status: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
    notes: String,
    agreed_to_terms: bool,
    registration_date: DateTime<Utc>,
}

impl From<Registration> for JsonRegistration {
    fn from(r: Registration) -> Self {
        Self {
            id: r.id.to_string(),
            tournament_id: r.tournament_id.to_string(),
            user_id: r.user_id.to_string(),
            team_name: r.team_name,
            team_members: r
                .team_members
                .into_iter()
                .map(|m| JsonTeamMember {
                    name: m.name,
                    email: m.email,
                    game_id: m.game_id,
                })
                .collect(),
            captain: JsonCaptain {
                name: r.captain.name,
                email: r.captain.email,
                phone: r.captain.phone,
                game_id: r.captain.game_id,
            },
            contact_info: JsonContactInfo {
                email: r.contact_info.email,
                phone: r.contact_info.phone,
            },
            payment_method: r.payment_method.as_str(),
            payment_status: r.payment_status.as_str(),
            status: r.status.as_str(),
            transaction_id: r.transaction_id,
            notes: r.notes,
            agreed_to_terms: r.agreed_to_terms,
            registration_date: r.registration_date,
        }
    }
}

pub async fn register(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<JsonRegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JsonRegistration>), ServiceError> {
    let tournament_id = parse_tournament_id(&id)?;
    let Json(payload) =
        payload.map_err(|e| ServiceError::BadRequest(format!("Malformed request body: {}", e)))?;
    let request = RegistrationRequest::from(payload);
    let registration = state
        .app
        .registration_register_use_case
        .register(tournament_id, &identity.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(registration.into())))
}

/// Admins see every registration of the tournament, everyone else only
/// their own.
pub async fn list(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<JsonRegistration>>, ServiceError> {
    let tournament_id = parse_tournament_id(&id)?;
    let user_filter = (!identity.is_admin()).then(|| identity.user_id.clone());
    let registrations = state
        .app
        .registration_list_use_case
        .list_registrations(tournament_id, user_filter)
        .await?;
    Ok(Json(registrations.into_iter().map(Into::into).collect()))
}

pub async fn withdraw(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let registration_id = parse_registration_id(&id)?;
    state
        .app
        .registration_withdraw_use_case
        .withdraw(registration_id, &identity)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct JsonReview {
    status: String,
}

pub async fn review(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(review): Json<JsonReview>,
) -> Result<Json<JsonRegistration>, ServiceError> {
    let registration_id = parse_registration_id(&id)?;
    let decision = match review.status.parse::<RegistrationStatus>() {
        Ok(RegistrationStatus::Approved) => ReviewDecision::Approve,
        Ok(RegistrationStatus::Rejected) => ReviewDecision::Reject,
        Ok(RegistrationStatus::Pending) => {
            return Err(RegistrationError::InvalidTransition.into());
        }
        Err(()) => {
            return Err(ServiceError::BadRequest(format!(
                "Unknown status '{}'",
                review.status
            )));
        }
    };
    let registration = state
        .app
        .registration_review_use_case
        .review(registration_id, &identity, decision)
        .await?;
    Ok(Json(registration.into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPaymentUpdate {
    payment_status: String,
    transaction_id: Option<String>,
}

pub async fn update_payment(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<JsonPaymentUpdate>,
) -> Result<Json<JsonRegistration>, ServiceError> {
    let registration_id = parse_registration_id(&id)?;
    let payment_status = update.payment_status.parse::<PaymentStatus>().map_err(|()| {
        ServiceError::BadRequest(format!(
            "Unknown payment status '{}'",
            update.payment_status
        ))
    })?;
    let registration = state
        .app
        .registration_payment_use_case
        .update_payment(
            registration_id,
            &identity,
            payment_status,
            update.transaction_id,
        )
        .await?;
    Ok(Json(registration.into()))
}
