//! Scripted backend shared by the unit tests in this crate.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use higia_core::auth::{AuthBackend, LoginResponse, User};
use higia_core::cleaning::{CleaningBackend, CleaningSession};
use higia_core::sector::Sector;
use higia_core::{HigiaError, Result};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Login(String),
    Register(String),
    FindSector(String),
    Start(String),
    Finalize(String, Option<String>),
    ListInProgress,
    ListHistory,
}

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
}

pub(crate) fn ana() -> User {
    User {
        id: "u1".into(),
        name: "Ana".into(),
        email: "user@x.com".into(),
        role: None,
    }
}

pub(crate) fn sector(code: &str) -> Sector {
    Sector {
        id: format!("sec-{code}"),
        code: code.into(),
        name: "Centro Cirúrgico".into(),
        location: Some("Bloco B".into()),
    }
}

pub(crate) fn session(id: &str, user_id: &str, started_at: DateTime<Utc>) -> CleaningSession {
    CleaningSession {
        id: id.into(),
        sector_id: Some("sec-SETOR-7".into()),
        sector: Some(sector("SETOR-7")),
        user_id: Some(user_id.into()),
        started_at,
        finished_at: None,
        notes: None,
    }
}

/// Records every call; individual operations can be told to fail.
#[derive(Default)]
pub(crate) struct MockBackend {
    calls: Mutex<Vec<Call>>,
    pub fail_lookup: Mutex<Option<HigiaError>>,
    pub fail_start: Mutex<Option<HigiaError>>,
    pub fail_finalize: Mutex<Option<HigiaError>>,
    pub in_progress: Mutex<Vec<CleaningSession>>,
    pub history: Mutex<Vec<CleaningSession>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.record(Call::Login(email.to_string()));
        if password == "secret" {
            Ok(LoginResponse {
                access_token: "tok-1".into(),
                user: ana(),
            })
        } else {
            Err(HigiaError::Auth {
                message: Some("Credenciais inválidas".into()),
            })
        }
    }

    async fn register(&self, name: &str, email: &str, _password: &str) -> Result<User> {
        self.record(Call::Register(email.to_string()));
        Ok(User {
            id: "u2".into(),
            name: name.into(),
            email: email.into(),
            role: None,
        })
    }
}

#[async_trait]
impl CleaningBackend for MockBackend {
    async fn find_sector_by_code(&self, code: &str) -> Result<Sector> {
        self.record(Call::FindSector(code.to_string()));
        match self.fail_lookup.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(sector(code)),
        }
    }

    async fn start_session(&self, sector_code: &str) -> Result<CleaningSession> {
        self.record(Call::Start(sector_code.to_string()));
        match self.fail_start.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(session("s1", "u1", t0())),
        }
    }

    async fn finalize_session(&self, id: &str, notes: Option<&str>) -> Result<CleaningSession> {
        self.record(Call::Finalize(id.to_string(), notes.map(str::to_string)));
        if let Some(err) = self.fail_finalize.lock().unwrap().clone() {
            return Err(err);
        }
        let mut closed = session(id, "u1", t0());
        closed.finished_at = Some(t0() + chrono::Duration::seconds(65));
        closed.notes = notes.map(str::to_string);
        Ok(closed)
    }

    async fn list_in_progress(&self) -> Result<Vec<CleaningSession>> {
        self.record(Call::ListInProgress);
        Ok(self.in_progress.lock().unwrap().clone())
    }

    async fn list_history(&self) -> Result<Vec<CleaningSession>> {
        self.record(Call::ListHistory);
        Ok(self.history.lock().unwrap().clone())
    }
}
