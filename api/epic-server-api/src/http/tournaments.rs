use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use epic_server_app::domain::{
    registration::Registration,
    tournament::{
        DEFAULT_TOURNAMENT_LIMIT, NewTournament, Organizer, Prize, ScheduleEntry, Tournament,
        TournamentFilter, TournamentSortBy, TournamentStatus,
    },
};
use serde::{Deserialize, Serialize};

use crate::{AppState, app::ServiceError, auth::Auth, http::parse_tournament_id};

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JsonPrize {
    pub position: u32,
    pub reward: String,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JsonScheduleEntry {
    pub stage: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub details: String,
}

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonOrganizer {
    pub name: String,
    pub contact: String,
    pub verified: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTournament {
    id: String,
    name: String,
    game: String,
    game_image: Option<String>,
    location: String,
    description: String,
    rules: String,
    prize_pool: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    registration_deadline: DateTime<Utc>,
    team_size: u32,
    max_teams: u32,
    current_teams: u32,
    status: &'static str,
    registration_fee: u32,
    prizes: Vec<JsonPrize>,
    schedule: Vec<JsonScheduleEntry>,
    organizer: JsonOrganizer,
    featured: bool,
    stream_link: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<Tournament> for JsonTournament {
    fn from(t: Tournament) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name,
            game: t.game,
            game_image: t.game_image,
            location: t.location,
            description: t.description,
            rules: t.rules,
            prize_pool: t.prize_pool,
            start_date: t.start_date,
            end_date: t.end_date,
            registration_deadline: t.registration_deadline,
            team_size: t.team_size,
            max_teams: t.max_teams,
            current_teams: t.current_teams,
            status: t.status.as_str(),
            registration_fee: t.registration_fee,
            prizes: t
                .prizes
                .into_iter()
                .map(|p| JsonPrize {
                    position: p.position,
                    reward: p.reward,
                })
                .collect(),
            schedule: t
                .schedule
                .into_iter()
                .map(|s| JsonScheduleEntry {
                    stage: s.stage,
                    date: s.date,
                    details: s.details,
                })
                .collect(),
            organizer: JsonOrganizer {
                name: t.organizer.name,
                contact: t.organizer.contact,
                verified: t.organizer.verified,
            },
            featured: t.featured,
            stream_link: t.stream_link,
            created_at: t.created_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonNewTournament {
    name: String,
    game: String,
    game_image: Option<String>,
    location: String,
    description: String,
    rules: String,
    #[serde(default)]
    prize_pool: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    registration_deadline: DateTime<Utc>,
    team_size: u32,
    max_teams: u32,
    #[serde(default)]
    registration_fee: u32,
    #[serde(default)]
    prizes: Vec<JsonPrize>,
    #[serde(default)]
    schedule: Vec<JsonScheduleEntry>,
    organizer: JsonOrganizer,
    #[serde(default)]
    featured: bool,
    stream_link: Option<String>,
}

impl From<JsonNewTournament> for NewTournament {
    fn from(t: JsonNewTournament) -> Self {
        Self {
            name: t.name,
            game: t.game,
            game_image: t.game_image,
            location: t.location,
            description: t.description,
            rules: t.rules,
            prize_pool: t.prize_pool,
            start_date: t.start_date,
            end_date: t.end_date,
            registration_deadline: t.registration_deadline,
            team_size: t.team_size,
            max_teams: t.max_teams,
            registration_fee: t.registration_fee,
            prizes: t
                .prizes
                .into_iter()
                .map(|p| Prize {
                    position: p.position,
                    reward: p.reward,
                })
                .collect(),
            schedule: t
                .schedule
                .into_iter()
                .map(|s| ScheduleEntry {
                    stage: s.stage,
                    date: s.date,
                    details: s.details,
                })
                .collect(),
            organizer: Organizer {
                name: t.organizer.name,
                contact: t.organizer.contact,
                verified: t.organizer.verified,
            },
            featured: t.featured,
            stream_link: t.stream_link,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTournamentQuery {
    game: Option<String>,
    status: Option<String>,
    team_size: Option<u32>,
    featured: Option<bool>,
    sort_by: Option<String>,
    limit: Option<usize>,
}

impl TryFrom<JsonTournamentQuery> for TournamentFilter {
    type Error = ServiceError;

    fn try_from(query: JsonTournamentQuery) -> Result<Self, Self::Error> {
        let status = query
            .status
            .filter(|s| !s.is_empty() && s != "all")
            .map(|s| {
                s.parse::<TournamentStatus>()
                    .map_err(|()| ServiceError::BadRequest(format!("Unknown status '{}'", s)))
            })
            .transpose()?;
        let sort = match query.sort_by.as_deref().map(str::trim) {
            None | Some("") | Some("startDate") => TournamentSortBy::StartDate,
            Some("prize") => TournamentSortBy::Prize,
            Some("popularity") => TournamentSortBy::Popularity,
            Some(other) => {
                return Err(ServiceError::BadRequest(format!(
                    "Unknown sort order '{}'",
                    other
                )));
            }
        };
        Ok(TournamentFilter {
            game: query.game.filter(|g| !g.is_empty() && g != "all"),
            status,
            team_size: query.team_size,
            featured: query.featured,
            sort,
            limit: query
                .limit
                .filter(|&l| l > 0)
                .map_or(DEFAULT_TOURNAMENT_LIMIT, |l| l.min(DEFAULT_TOURNAMENT_LIMIT)),
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<JsonTournamentQuery>,
) -> Result<Json<Vec<JsonTournament>>, ServiceError> {
    let filter = TournamentFilter::try_from(query)?;
    let tournaments = state
        .app
        .tournament_list_use_case
        .list_tournaments(filter)
        .await?;
    Ok(Json(tournaments.into_iter().map(Into::into).collect()))
}

pub async fn create(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Json(tournament): Json<JsonNewTournament>,
) -> Result<(StatusCode, Json<JsonTournament>), ServiceError> {
    let created = state
        .app
        .tournament_create_use_case
        .create_tournament(&identity, tournament.into())
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JsonTournament>, ServiceError> {
    let id = parse_tournament_id(&id)?;
    let tournament = state.app.tournament_get_use_case.get_tournament(id).await?;
    Ok(Json(tournament.into()))
}

#[derive(Deserialize)]
pub struct JsonStatusUpdate {
    status: String,
}

pub async fn update_status(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<JsonStatusUpdate>,
) -> Result<Json<JsonTournament>, ServiceError> {
    let id = parse_tournament_id(&id)?;
    let status = update.status.parse::<TournamentStatus>().map_err(|()| {
        ServiceError::BadRequest(format!("Unknown status '{}'", update.status))
    })?;
    let tournament = state
        .app
        .tournament_status_use_case
        .update_status(&identity, id, status)
        .await?;
    Ok(Json(tournament.into()))
}

pub async fn delete(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let id = parse_tournament_id(&id)?;
    state
        .app
        .tournament_delete_use_case
        .delete_tournament(&identity, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public roster entry. Contact details stay private.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTeam {
    id: String,
    team_name: String,
    captain: String,
    members: Vec<JsonTeamPlayer>,
    registration_date: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTeamPlayer {
    name: String,
    game_id: String,
}

impl From<Registration> for JsonTeam {
    fn from(r: Registration) -> Self {
        Self {
            id: r.id.to_string(),
            team_name: r.team_name,
            captain: r.captain.name,
            members: r
                .team_members
                .into_iter()
                .map(|m| JsonTeamPlayer {
                    name: m.name,
                    game_id: m.game_id,
                })
                .collect(),
            registration_date: r.registration_date,
        }
    }
}

pub async fn teams(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<JsonTeam>>, ServiceError> {
    let id = parse_tournament_id(&id)?;
    let teams = state.app.team_list_use_case.list_teams(id).await?;
    Ok(Json(teams.into_iter().map(Into::into).collect()))
}
