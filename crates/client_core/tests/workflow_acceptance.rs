use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use client_core::{
    auth::{SignInForm, SignUpForm},
    catalog,
    history::HistoryStatus,
    media::SelectedFile,
    navigation::Page,
    AppContext, BackendError, ManualClock, StageKind, StudioBackend, StylizeRequest,
    WorkflowPolicy,
};
use shared::{
    domain::{HistoryId, StyleEndpoint, UserId},
    protocol::{
        HealthResponse, HistoryRecord, HistoryResponse, SignInRequest, SignInResponse,
        SignUpRequest, SignUpResponse, StylizeResponse,
    },
};

/// In-memory studio: remembers accounts and keeps a history list per user.
#[derive(Default)]
struct MemoryStudio {
    accounts: Mutex<Vec<SignUpRequest>>,
    history: Mutex<Vec<HistoryRecord>>,
    endpoints: Mutex<Vec<StyleEndpoint>>,
}

#[async_trait]
impl StudioBackend for MemoryStudio {
    async fn health(&self) -> Result<HealthResponse, BackendError> {
        Ok(HealthResponse {
            message: "ok".into(),
        })
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, BackendError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        let index = accounts
            .iter()
            .position(|a| a.email == request.email && a.password == request.password)
            .ok_or_else(|| BackendError::Status {
                status: 401,
                message: Some("Invalid email or password".into()),
            })?;
        let account = &accounts[index];
        Ok(SignInResponse {
            id: UserId(index as i64 + 1),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
        })
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, BackendError> {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if accounts.iter().any(|a| a.email == request.email) {
            return Err(BackendError::Status {
                status: 409,
                message: Some("User already exists".into()),
            });
        }
        accounts.push(request.clone());
        Ok(SignUpResponse {
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
        })
    }

    async fn stylize(&self, request: &StylizeRequest) -> Result<StylizeResponse, BackendError> {
        self.endpoints
            .lock()
            .expect("endpoints lock")
            .push(request.endpoint);
        let mut history = self.history.lock().expect("history lock");
        let id = history.len() as i64 + 1;
        history.push(HistoryRecord {
            id: HistoryId(id),
            style: request.endpoint.to_string(),
            original_image: "T1JJRw==".into(),
            transformed_image: "UkVTVUxU".into(),
            created_at: format!("2024-03-0{id} 10:00:00"),
        });
        Ok(StylizeResponse {
            image: Some("UkVTVUxU".into()),
            error: None,
        })
    }

    async fn fetch_history(&self, _user_id: UserId) -> Result<HistoryResponse, BackendError> {
        Ok(HistoryResponse {
            history: self.history.lock().expect("history lock").clone(),
        })
    }

    async fn delete_history(&self, id: HistoryId) -> Result<(), BackendError> {
        self.history
            .lock()
            .expect("history lock")
            .retain(|record| record.id != id);
        Ok(())
    }
}

fn settle(clock: &ManualClock, app: &mut AppContext) {
    clock.advance(Duration::from_millis(300));
    app.navigator_mut().poll();
    clock.advance(Duration::from_millis(50));
    app.navigator_mut().poll();
}

#[tokio::test]
async fn studio_session_from_sign_up_to_logout() {
    let studio = Arc::new(MemoryStudio::default());
    let clock = Arc::new(ManualClock::new());
    let mut app = AppContext::new(studio.clone(), clock.clone(), WorkflowPolicy::default());

    app.navigate(Page::SignUp);
    settle(&clock, &mut app);
    let sign_up = SignUpForm {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        password: "Engine42!".into(),
        confirm_password: "Engine42!".into(),
    };
    app.sign_up(&sign_up).await.expect("account created");
    assert!(app.sign_up(&sign_up).await.is_err());
    app.navigate(Page::SignIn);
    settle(&clock, &mut app);
    assert_eq!(app.page(), Page::SignIn);

    let sign_in = SignInForm {
        email: app.default_sign_in_email().to_string(),
        password: "Engine42!".into(),
    };
    app.sign_in(&sign_in).await.expect("signed in");
    settle(&clock, &mut app);
    assert_eq!(app.page(), Page::Dashboard);

    for title in ["Oil Painting", "Studio Ghibli"] {
        let style = *catalog::find_by_title(title).expect("catalog style");
        app.workflow_mut().select_style(style);
        app.workflow_mut()
            .upload_image(SelectedFile::new("me.png", "image/png", vec![1, 2, 3]))
            .expect("upload accepted");
        assert_eq!(app.transform().await, Ok(StageKind::ResultReady));
        app.workflow_mut().reset();
    }
    assert_eq!(
        *studio.endpoints.lock().expect("endpoints lock"),
        vec![StyleEndpoint::Oil, StyleEndpoint::Ghibli]
    );

    app.open_history().await.expect("history opens");
    let view = app.workflow().history().expect("history view");
    assert_eq!(view.status(), HistoryStatus::Loaded);
    let styles: Vec<_> = view.entries().iter().map(|e| e.style.as_str()).collect();
    assert_eq!(styles, ["ghibli", "oil"]);

    app.delete_history_entry(HistoryId(2)).await.expect("delete");
    app.delete_history_entry(HistoryId(1)).await.expect("delete");
    assert_eq!(
        app.workflow().history().map(|view| view.status()),
        Some(HistoryStatus::Empty)
    );

    app.logout();
    settle(&clock, &mut app);
    assert_eq!(app.page(), Page::Landing);
    assert!(app.session().is_none());
    assert_eq!(app.workflow().kind(), StageKind::Browsing);
}
