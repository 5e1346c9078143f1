use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::{
    domain::{HistoryId, UserId},
    protocol::{
        HealthResponse, HistoryRecord, HistoryResponse, SignInRequest, SignInResponse,
        SignUpRequest, SignUpResponse, StylizeResponse,
    },
};

use crate::{
    backend::{StudioBackend, StylizeRequest},
    error::BackendError,
    media::SelectedFile,
    session::Session,
};

#[derive(Debug, Clone)]
pub(crate) enum Call {
    Health,
    SignIn(SignInRequest),
    SignUp(SignUpRequest),
    Stylize(StylizeRequest),
    FetchHistory(UserId),
    DeleteHistory(HistoryId),
}

pub(crate) struct FakeBackend {
    sign_in: Result<SignInResponse, BackendError>,
    sign_up: Result<SignUpResponse, BackendError>,
    stylize: Result<StylizeResponse, BackendError>,
    history: Mutex<VecDeque<Result<HistoryResponse, BackendError>>>,
    delete: Result<(), BackendError>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        let unconfigured = || BackendError::Transport("not configured".into());
        Self {
            sign_in: Err(unconfigured()),
            sign_up: Err(unconfigured()),
            stylize: Err(unconfigured()),
            history: Mutex::new(VecDeque::new()),
            delete: Ok(()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn with_sign_in(mut self, reply: Result<SignInResponse, BackendError>) -> Self {
        self.sign_in = reply;
        self
    }

    pub(crate) fn with_sign_up(mut self, reply: Result<SignUpResponse, BackendError>) -> Self {
        self.sign_up = reply;
        self
    }

    pub(crate) fn with_stylize(mut self, reply: Result<StylizeResponse, BackendError>) -> Self {
        self.stylize = reply;
        self
    }

    /// Replies are served in order; the last one repeats.
    pub(crate) fn with_history(self, reply: Result<HistoryResponse, BackendError>) -> Self {
        self.history.lock().expect("history lock").push_back(reply);
        self
    }

    pub(crate) fn with_delete(mut self, reply: Result<(), BackendError>) -> Self {
        self.delete = reply;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn stylize_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Stylize(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl StudioBackend for FakeBackend {
    async fn health(&self) -> Result<HealthResponse, BackendError> {
        self.record(Call::Health);
        Ok(HealthResponse {
            message: "ok".into(),
        })
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, BackendError> {
        self.record(Call::SignIn(request.clone()));
        self.sign_in.clone()
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, BackendError> {
        self.record(Call::SignUp(request.clone()));
        self.sign_up.clone()
    }

    async fn stylize(&self, request: &StylizeRequest) -> Result<StylizeResponse, BackendError> {
        self.record(Call::Stylize(request.clone()));
        self.stylize.clone()
    }

    async fn fetch_history(&self, user_id: UserId) -> Result<HistoryResponse, BackendError> {
        self.record(Call::FetchHistory(user_id));
        let mut queue = self.history.lock().expect("history lock");
        if queue.len() > 1 {
            return queue.pop_front().expect("non-empty queue");
        }
        queue
            .front()
            .cloned()
            .unwrap_or_else(|| Ok(HistoryResponse::default()))
    }

    async fn delete_history(&self, id: HistoryId) -> Result<(), BackendError> {
        self.record(Call::DeleteHistory(id));
        self.delete.clone()
    }
}

pub(crate) fn session() -> Session {
    Session {
        user_id: UserId(7),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
    }
}

pub(crate) fn png_file() -> SelectedFile {
    SelectedFile::new("portrait.png", "image/png", vec![0x89, b'P', b'N', b'G'])
}

pub(crate) fn text_file() -> SelectedFile {
    SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec())
}

pub(crate) fn record(id: i64, style: &str, created_at: &str) -> HistoryRecord {
    HistoryRecord {
        id: HistoryId(id),
        style: style.into(),
        original_image: "T1JJRw==".into(),
        transformed_image: "UkVTVUxU".into(),
        created_at: created_at.into(),
    }
}
