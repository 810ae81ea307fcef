use chrono::Duration;
use epic_auth_jwt::JwtAuthentication;
use epic_server_app::{
    domain::UserId,
    ports::authentication::{Identity, UserRole},
};

fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args.len() > 5 {
        eprintln!("Usage: issue_token <user-id> <email> [member|admin] [hours]");
        std::process::exit(1);
    }

    let role: UserRole = match args.get(3).map(String::as_str).unwrap_or("member").parse() {
        Ok(role) => role,
        Err(()) => {
            eprintln!("Role must be member or admin");
            std::process::exit(1);
        }
    };
    let hours: i64 = match args.get(4).map(|h| h.parse()).unwrap_or(Ok(24)) {
        Ok(hours) if hours > 0 => hours,
        _ => {
            eprintln!("Hours must be a positive number");
            std::process::exit(1);
        }
    };

    let secret = std::env::var("EPIC_JWT_SECRET").expect("EPIC_JWT_SECRET must be set");
    let auth = JwtAuthentication::new(secret.as_bytes());
    let identity = Identity::new(UserId::new(args[1].as_str()), args[2].as_str(), role);
    let token = auth
        .issue_token(&identity, Duration::hours(hours))
        .expect("Failed to sign token");
    println!("{}", token);
}
