use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    domain::{
        TournamentId,
        registration::{Captain, ContactInfo, TeamMember},
        tournament::{Organizer, Tournament, TournamentStatus},
    },
    workflow::registration::RegistrationRequest,
};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn tournament(max_teams: u32, current_teams: u32) -> Tournament {
    Tournament {
        id: TournamentId::new(),
        name: format!("Cup {}", uuid::Uuid::new_v4().simple()),
        game: "Valorant".to_string(),
        game_image: None,
        location: "Online".to_string(),
        description: "Weekly cup".to_string(),
        rules: "Best of three".to_string(),
        prize_pool: "10,000".to_string(),
        start_date: now() + Duration::days(7),
        end_date: now() + Duration::days(8),
        registration_deadline: now() + Duration::days(5),
        team_size: 3,
        max_teams,
        current_teams,
        status: TournamentStatus::Upcoming,
        registration_fee: 0,
        prizes: vec![],
        schedule: vec![],
        organizer: Organizer {
            name: "Epic Esports".to_string(),
            contact: "org@epic.gg".to_string(),
            verified: true,
        },
        featured: false,
        stream_link: None,
        created_at: now() - Duration::days(30),
    }
}

fn member(n: usize) -> TeamMember {
    TeamMember {
        name: format!("Player {}", n),
        email: format!("player{}@example.com", n),
        game_id: format!("player#{}", n),
    }
}

/// A well-formed request for a three-player team.
pub fn request(team_name: &str) -> RegistrationRequest {
    RegistrationRequest {
        team_name: team_name.to_string(),
        team_members: vec![member(1), member(2)],
        captain: Captain {
            name: "Captain".to_string(),
            email: "captain@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            game_id: "captain#1".to_string(),
        },
        contact_info: ContactInfo {
            email: "team@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
        },
        payment_method: Some("upi".to_string()),
        transaction_id: None,
        notes: String::new(),
        agreed_to_terms: true,
    }
}

pub fn new_tournament(name: &str) -> crate::domain::tournament::NewTournament {
    let t = tournament(16, 0);
    crate::domain::tournament::NewTournament {
        name: name.to_string(),
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
        prizes: t.prizes,
        schedule: t.schedule,
        organizer: t.organizer,
        featured: t.featured,
        stream_link: t.stream_link,
    }
}
