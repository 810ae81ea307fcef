use chrono::{DateTime, Utc};
use epic_persistence_sea_orm_entities::{registration, tournament};
use epic_server_app::domain::{
    RegistrationId, TournamentId, UserId,
    registration::{Captain, ContactInfo, Registration, TeamMember},
    tournament::{Organizer, Prize, ScheduleEntry, Tournament},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct JsonPrize {
    position: u32,
    reward: String,
}

#[derive(Serialize, Deserialize)]
struct JsonScheduleEntry {
    stage: String,
    date: DateTime<Utc>,
    details: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonTeamMember {
    name: String,
    email: String,
    game_id: String,
}

fn parse<T: std::str::FromStr>(column: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid {} '{}'", column, value))
}

fn count(column: &str, value: i32) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("Negative {} {}", column, value))
}

pub fn model_to_tournament(model: tournament::Model) -> Result<Tournament, String> {
    let prizes: Vec<JsonPrize> = serde_json::from_str(&model.prizes).map_err(|e| e.to_string())?;
    let schedule: Vec<JsonScheduleEntry> =
        serde_json::from_str(&model.schedule).map_err(|e| e.to_string())?;

    Ok(Tournament {
        id: TournamentId(model.id),
        name: model.name,
        game: model.game,
        game_image: model.game_image,
        location: model.location,
        description: model.description,
        rules: model.rules,
        prize_pool: model.prize_pool,
        start_date: model.start_date,
        end_date: model.end_date,
        registration_deadline: model.registration_deadline,
        team_size: count("team_size", model.team_size)?,
        max_teams: count("max_teams", model.max_teams)?,
        current_teams: count("current_teams", model.current_teams)?,
        status: parse("status", &model.status)?,
        registration_fee: count("registration_fee", model.registration_fee)?,
        prizes: prizes
            .into_iter()
            .map(|p| Prize {
                position: p.position,
                reward: p.reward,
            })
            .collect(),
        schedule: schedule
            .into_iter()
            .map(|s| ScheduleEntry {
                stage: s.stage,
                date: s.date,
                details: s.details,
            })
            .collect(),
        organizer: Organizer {
            name: model.organizer_name,
            contact: model.organizer_contact,
            verified: model.organizer_verified,
        },
        featured: model.featured,
        stream_link: model.stream_link,
        created_at: model.created_at,
    })
}

pub fn tournament_to_active_model(t: &Tournament) -> Result<tournament::ActiveModel, String> {
    let prizes: Vec<JsonPrize> = t
        .prizes
        .iter()
        .map(|p| JsonPrize {
            position: p.position,
            reward: p.reward.clone(),
        })
        .collect();
    let schedule: Vec<JsonScheduleEntry> = t
        .schedule
        .iter()
        .map(|s| JsonScheduleEntry {
            stage: s.stage.clone(),
            date: s.date,
            details: s.details.clone(),
        })
        .collect();

    Ok(tournament::ActiveModel {
        id: Set(t.id.0),
        name: Set(t.name.clone()),
        game: Set(t.game.clone()),
        game_image: Set(t.game_image.clone()),
        location: Set(t.location.clone()),
        description: Set(t.description.clone()),
        rules: Set(t.rules.clone()),
        prize_pool: Set(t.prize_pool.clone()),
        start_date: Set(t.start_date),
        end_date: Set(t.end_date),
        registration_deadline: Set(t.registration_deadline),
        team_size: Set(t.team_size as i32),
        max_teams: Set(t.max_teams as i32),
        current_teams: Set(t.current_teams as i32),
        status: Set(t.status.as_str().to_string()),
        registration_fee: Set(t.registration_fee as i32),
        prizes: Set(serde_json::to_string(&prizes).map_err(|e| e.to_string())?),
        schedule: Set(serde_json::to_string(&schedule).map_err(|e| e.to_string())?),
        organizer_name: Set(t.organizer.name.clone()),
        organizer_contact: Set(t.organizer.contact.clone()),
        organizer_verified: Set(t.organizer.verified),
        featured: Set(t.featured),
        stream_link: Set(t.stream_link.clone()),
        created_at: Set(t.created_at),
    })
}

pub fn model_to_registration(model: registration::Model) -> Result<Registration, String> {
    let members: Vec<JsonTeamMember> =
        serde_json::from_str(&model.team_members).map_err(|e| e.to_string())?;

    Ok(Registration {
        id: RegistrationId(model.id),
        tournament_id: TournamentId(model.tournament_id),
        user_id: UserId(model.user_id),
        team_name: model.team_name,
        team_members: members
            .into_iter()
            .map(|m| TeamMember {
                name: m.name,
                email: m.email,
                game_id: m.game_id,
            })
            .collect(),
        captain: Captain {
            name: model.captain_name,
            email: model.captain_email,
            phone: model.captain_phone,
            game_id: model.captain_game_id,
        },
        contact_info: ContactInfo {
            email: model.contact_email,
            phone: model.contact_phone,
        },
        payment_method: parse("payment_method", &model.payment_method)?,
        payment_status: parse("payment_status", &model.payment_status)?,
        status: parse("status", &model.status)?,
        transaction_id: model.transaction_id,
        notes: model.notes,
        agreed_to_terms: model.agreed_to_terms,
        registration_date: model.registration_date,
    })
}

pub fn registration_to_active_model(r: &Registration) -> Result<registration::ActiveModel, String> {
    let members: Vec<JsonTeamMember> = r
        .team_members
        .iter()
        .map(|m| JsonTeamMember {
            name: m.name.clone(),
            email: m.email.clone(),
            game_id: m.game_id.clone(),
        })
        .collect();
    let active = r.is_active();

    Ok(registration::ActiveModel {
        id: Set(r.id.0),
        tournament_id: Set(r.tournament_id.0),
        user_id: Set(r.user_id.0.clone()),
        team_name: Set(r.team_name.clone()),
        team_members: Set(serde_json::to_string(&members).map_err(|e| e.to_string())?),
        captain_name: Set(r.captain.name.clone()),
        captain_email: Set(r.captain.email.clone()),
        captain_phone: Set(r.captain.phone.clone()),
        captain_game_id: Set(r.captain.game_id.clone()),
        contact_email: Set(r.contact_info.email.clone()),
        contact_phone: Set(r.contact_info.phone.clone()),
        payment_method: Set(r.payment_method.as_str().to_string()),
        payment_status: Set(r.payment_status.as_str().to_string()),
        status: Set(r.status.as_str().to_string()),
        transaction_id: Set(r.transaction_id.clone()),
        notes: Set(r.notes.clone()),
        agreed_to_terms: Set(r.agreed_to_terms),
        registration_date: Set(r.registration_date),
        active_user: Set(active.then(|| r.user_id.0.clone())),
        active_team_name: Set(active.then(|| r.team_name.clone())),
    })
}
