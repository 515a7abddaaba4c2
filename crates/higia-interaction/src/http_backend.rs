//! HttpBackendClient - REST client for the hygiene backend.
//!
//! Every request carries the stored bearer token when there is one. A 401
//! anywhere wipes the local token and user before the error reaches the
//! caller, so the next protected call goes out anonymous and the UI can send
//! the user back to login.

use async_trait::async_trait;
use higia_core::auth::{AuthBackend, LoginResponse, TokenStore, User};
use higia_core::cleaning::{CleaningBackend, CleaningSession};
use higia_core::config::ApiConfig;
use higia_core::sector::Sector;
use higia_core::{HigiaError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Backend client over HTTP/JSON.
#[derive(Clone)]
pub struct HttpBackendClient {
    client: Client,
    base_url: Url,
    store: Arc<dyn TokenStore>,
}

impl HttpBackendClient {
    /// Builds a client for `config.base_url` with `config.timeout()` applied
    /// to every request.
    pub fn new(config: &ApiConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|err| {
            HigiaError::config(format!("Invalid api.base_url '{}': {err}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(HigiaError::config(format!(
                "api.base_url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| HigiaError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            store,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HigiaError::config("api.base_url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, operation: &'static str, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        self.send(operation, self.client.get(url)).await
    }

    async fn post<B, T>(&self, operation: &'static str, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        self.send(operation, self.client.post(url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let request = match self.store.token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        tracing::debug!(operation, "Sending backend request");
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let message = error_message(&read_body(response).await);
            if let Err(err) = self.store.clear().await {
                tracing::warn!(operation, error = %err, "Failed to clear stored session after 401");
            }
            tracing::warn!(operation, "Backend rejected credentials; stored session cleared");
            return Err(HigiaError::Auth { message });
        }

        if !status.is_success() {
            let message = error_message(&read_body(response).await);
            tracing::warn!(
                operation,
                status = status.as_u16(),
                message = message.as_deref().unwrap_or(""),
                "Backend request failed"
            );
            return Err(HigiaError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|err| {
            if err.is_timeout() {
                HigiaError::Timeout
            } else {
                HigiaError::Serialization {
                    format: "JSON".to_string(),
                    message: format!("Failed to parse {operation} response: {err}"),
                }
            }
        })
    }
}

#[async_trait]
impl AuthBackend for HttpBackendClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            email,
            senha: password,
        };
        self.post("login", &["auth", "login"], &body).await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let body = RegisterRequest {
            nome: name,
            email,
            senha: password,
        };
        self.post("register", &["auth", "register"], &body).await
    }
}

#[async_trait]
impl CleaningBackend for HttpBackendClient {
    async fn find_sector_by_code(&self, code: &str) -> Result<Sector> {
        self.get("find_sector_by_code", &["setores", "codigo", code])
            .await
    }

    async fn start_session(&self, sector_code: &str) -> Result<CleaningSession> {
        let body = StartRequest { sector_code };
        self.post("start_session", &["higienizacao", "iniciar"], &body)
            .await
    }

    async fn finalize_session(&self, id: &str, notes: Option<&str>) -> Result<CleaningSession> {
        let body = FinalizeRequest { notes };
        self.post("finalize_session", &["higienizacao", "finalizar", id], &body)
            .await
    }

    async fn list_in_progress(&self) -> Result<Vec<CleaningSession>> {
        self.get("list_in_progress", &["higienizacao", "em-andamento"])
            .await
    }

    async fn list_history(&self) -> Result<Vec<CleaningSession>> {
        self.get("list_history", &["higienizacao", "historico"])
            .await
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    senha: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    nome: &'a str,
    email: &'a str,
    senha: &'a str,
}

#[derive(Serialize)]
struct StartRequest<'a> {
    #[serde(rename = "codigoSetor")]
    sector_code: &'a str,
}

#[derive(Serialize)]
struct FinalizeRequest<'a> {
    #[serde(rename = "observacoes", skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

fn map_transport_error(err: reqwest::Error) -> HigiaError {
    if err.is_timeout() {
        HigiaError::Timeout
    } else {
        HigiaError::Network(err.to_string())
    }
}

async fn read_body(response: Response) -> String {
    response.text().await.unwrap_or_default()
}

/// Pulls the user-facing message out of an error body.
///
/// The backend answers `{"statusCode": .., "message": .., "error": ..}` where
/// `message` is either a string or, for validation failures, a list of
/// strings. Anything else (HTML error pages, empty bodies) yields `None`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|item| item.as_str())
                .filter(|s| !s.trim().is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}
