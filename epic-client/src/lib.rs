use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("{kind}: {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
        fields: Vec<String>,
    },
}

impl ClientError {
    pub fn kind(&self) -> Option<&str> {
        match self {
            ClientError::Api { kind, .. } => Some(kind),
            ClientError::Request(_) => None,
        }
    }

    /// The request may or may not have been applied on the server.
    pub fn is_indeterminate(&self) -> bool {
        match self {
            ClientError::Request(e) => e.is_timeout(),
            ClientError::Api { status, .. } => *status == StatusCode::REQUEST_TIMEOUT.as_u16(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    fields: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    pub email: String,
    pub game_id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Captain {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub game_id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub team_name: String,
    pub team_members: Vec<TeamMember>,
    pub captain: Captain,
    pub contact_info: ContactInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub notes: String,
    pub agreed_to_terms: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub tournament_id: String,
    pub user_id: String,
    pub team_name: String,
    pub team_members: Vec<TeamMember>,
    pub captain: Captain,
    pub contact_info: ContactInfo,
    pub payment_method: String,
    pub payment_status: String,
    pub status: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub notes: String,
    pub agreed_to_terms: bool,
    pub registration_date: String,
}

impl Registration {
    pub fn is_active(&self) -> bool {
        self.status != "rejected"
    }
}

#[derive(Debug)]
pub enum RegisterOutcome {
    Registered(Registration),
    /// The server did not answer in time. Call [`EpicClient::reconcile`]
    /// before trying again.
    Unknown,
}

#[derive(Clone)]
pub struct EpicClient {
    http_url: String,
    http_client: reqwest::Client,
    token: String,
}

impl EpicClient {
    pub fn new(http_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(http_url, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        http_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_url: http_url.into().trim_end_matches('/').to_string(),
            http_client,
            token: token.into(),
        })
    }

    fn register_url(&self, tournament_id: &str) -> String {
        format!("{}/tournaments/{}/register", self.http_url, tournament_id)
    }

    /// Submits a registration. Timeouts are never retried blindly; a
    /// `StorageUnavailable` answer is retried once, after checking that the
    /// first attempt did not land.
    pub async fn register(
        &self,
        tournament_id: &str,
        form: &RegistrationForm,
    ) -> Result<RegisterOutcome, ClientError> {
        match self.try_register(tournament_id, form).await {
            Ok(registration) => Ok(RegisterOutcome::Registered(registration)),
            Err(e) if e.is_indeterminate() => {
                log::warn!("Registration for {} timed out", tournament_id);
                Ok(RegisterOutcome::Unknown)
            }
            Err(e) if e.kind() == Some("StorageUnavailable") => {
                if let Some(existing) = self.reconcile(tournament_id).await? {
                    return Ok(RegisterOutcome::Registered(existing));
                }
                log::info!("Retrying registration for {}", tournament_id);
                match self.try_register(tournament_id, form).await {
                    Ok(registration) => Ok(RegisterOutcome::Registered(registration)),
                    Err(e) if e.is_indeterminate() => Ok(RegisterOutcome::Unknown),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// The caller's active registration for the tournament, if the server
    /// has one.
    pub async fn reconcile(&self, tournament_id: &str) -> Result<Option<Registration>, ClientError> {
        let registrations = self.list_registrations(tournament_id).await?;
        Ok(registrations.into_iter().find(Registration::is_active))
    }

    pub async fn list_registrations(
        &self,
        tournament_id: &str,
    ) -> Result<Vec<Registration>, ClientError> {
        let response = self
            .http_client
            .get(self.register_url(tournament_id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn withdraw(&self, registration_id: &str) -> Result<(), ClientError> {
        let response = self
            .http_client
            .delete(format!("{}/registrations/{}", self.http_url, registration_id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(api_error(response).await)
    }

    async fn try_register(
        &self,
        tournament_id: &str,
        form: &RegistrationForm,
    ) -> Result<Registration, ClientError> {
        let response = self
            .http_client
            .post(self.register_url(tournament_id))
            .bearer_auth(&self.token)
            .json(form)
            .send()
            .await?;
        parse_response(response).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(api_error(response).await)
}

async fn api_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    ClientError::Api {
        status: status.as_u16(),
        kind: body.kind,
        message: body.error,
        fields: body.fields,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use axum::{
        Json, Router,
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::post,
    };
    use serde_json::{Value, json};

    use super::*;

    fn registration_json(status: &str) -> Value {
        json!({
            "id": "r-1",
            "tournamentId": "t-1",
            "userId": "alice",
            "teamName": "Alpha",
            "teamMembers": [],
            "captain": {"name": "A", "email": "a@example.com", "phone": "1", "gameId": "a#1"},
            "contactInfo": {"email": "a@example.com", "phone": "1"},
            "paymentMethod": "upi",
            "paymentStatus": "free",
            "status": status,
            "notes": "",
            "agreedToTerms": true,
            "registrationDate": "2025-03-01T12:00:00Z"
        })
    }

    fn unavailable() -> Response {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "down", "kind": "StorageUnavailable"})),
        )
            .into_response()
    }

    struct Server {
        url: String,
        posts: Arc<AtomicUsize>,
    }

    /// Serves the register endpoint: POSTs fail with 503 `failures` times,
    /// GET answers with `listed`.
    async fn serve(failures: usize, listed: Vec<Value>) -> Server {
        let posts = Arc::new(AtomicUsize::new(0));
        let counter = posts.clone();
        let router = Router::new().route(
            "/tournaments/{id}/register",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < failures {
                        unavailable()
                    } else {
                        (StatusCode::CREATED, Json(registration_json("pending"))).into_response()
                    }
                }
            })
            .get(move || {
                let listed = listed.clone();
                async move { Json(Value::Array(listed)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Server {
            url: format!("http://{}", addr),
            posts,
        }
    }

    #[tokio::test]
    async fn test_register_succeeds() {
        let server = serve(0, vec![]).await;
        let client = EpicClient::new(&server.url, "token").unwrap();
        let outcome = client
            .register("t-1", &RegistrationForm::default())
            .await
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::Registered(r) if r.team_name == "Alpha"));
        assert_eq!(server.posts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_retried_once() {
        let server = serve(1, vec![]).await;
        let client = EpicClient::new(&server.url, "token").unwrap();
        let outcome = client
            .register("t-1", &RegistrationForm::default())
            .await
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::Registered(_)));
        assert_eq!(server.posts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_after_second_attempt() {
        let server = serve(5, vec![]).await;
        let client = EpicClient::new(&server.url, "token").unwrap();
        let err = client
            .register("t-1", &RegistrationForm::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some("StorageUnavailable"));
        assert_eq!(server.posts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reconcile_finds_landed_registration() {
        let server = serve(1, vec![registration_json("rejected"), registration_json("pending")]).await;
        let client = EpicClient::new(&server.url, "token").unwrap();
        let outcome = client
            .register("t-1", &RegistrationForm::default())
            .await
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::Registered(r) if r.status == "pending"));
        assert_eq!(server.posts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_unknown() {
        let router = Router::new().route(
            "/tournaments/{id}/register",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::CREATED
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let client = EpicClient::with_timeout(
            format!("http://{}", addr),
            "token",
            Duration::from_millis(200),
        )
        .unwrap();
        let outcome = client
            .register("t-1", &RegistrationForm::default())
            .await
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::Unknown));
    }
}
