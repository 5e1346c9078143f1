//! Application context handed to every page: backend handle, navigation, session and the
//! dashboard workflow.

use std::sync::Arc;

use shared::domain::HistoryId;
use tracing::info;

use crate::{
    auth::{self, SignInForm, SignUpForm, SIGN_UP_SUCCESS_NOTICE},
    backend::StudioBackend,
    clock::Clock,
    error::{AuthError, WorkflowError},
    navigation::{NavigationEvent, Navigator, Page},
    session::Session,
    workflow::{DeleteOutcome, StageKind, TransformWorkflow, WorkflowPolicy},
};

pub struct AppContext {
    backend: Arc<dyn StudioBackend>,
    navigator: Navigator,
    session: Option<Session>,
    workflow: TransformWorkflow,
    remembered_email: String,
    notice: Option<String>,
}

impl AppContext {
    pub fn new(backend: Arc<dyn StudioBackend>, clock: Arc<dyn Clock>, policy: WorkflowPolicy) -> Self {
        Self {
            backend,
            navigator: Navigator::new(clock),
            session: None,
            workflow: TransformWorkflow::new(policy),
            remembered_email: String::new(),
            notice: None,
        }
    }

    pub fn backend(&self) -> &dyn StudioBackend {
        self.backend.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn display_name(&self) -> String {
        self.session
            .as_ref()
            .map(Session::display_name)
            .unwrap_or_else(|| "Guest".to_string())
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn page(&self) -> Page {
        self.navigator.page()
    }

    pub fn navigate(&mut self, page: Page) -> NavigationEvent {
        self.navigator.navigate(page)
    }

    pub fn workflow(&self) -> &TransformWorkflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut TransformWorkflow {
        &mut self.workflow
    }

    /// Email to pre-fill on the sign-in page, remembered from sign-up.
    pub fn default_sign_in_email(&self) -> &str {
        &self.remembered_email
    }

    /// The last user-facing message, consumed on read.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub async fn sign_in(&mut self, form: &SignInForm) -> Result<(), AuthError> {
        match auth::sign_in(self.backend.as_ref(), form).await {
            Ok(session) => {
                self.session = Some(session);
                self.navigate(Page::Dashboard);
                Ok(())
            }
            Err(err) => {
                if !err.is_local() {
                    self.notice = Some(err.message().to_string());
                }
                Err(err)
            }
        }
    }

    /// On success the user is sent to sign in; a conflict leaves them on the sign-up page.
    pub async fn sign_up(&mut self, form: &SignUpForm) -> Result<(), AuthError> {
        match auth::sign_up(self.backend.as_ref(), form).await {
            Ok(account) => {
                self.remembered_email = account.email;
                self.notice = Some(SIGN_UP_SUCCESS_NOTICE.to_string());
                self.navigate(Page::SignIn);
                Ok(())
            }
            Err(err) => {
                if !err.is_local() {
                    self.notice = Some(err.message().to_string());
                }
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user_id = session.user_id.0, "session ended");
        }
        self.workflow.clear();
        self.navigate(Page::Landing);
    }

    pub async fn transform(&mut self) -> Result<StageKind, WorkflowError> {
        self.workflow
            .transform(self.backend.as_ref(), self.session.as_ref())
            .await
    }

    pub async fn open_history(&mut self) -> Result<(), WorkflowError> {
        self.workflow
            .open_history(self.backend.as_ref(), self.session.as_ref())
            .await
    }

    pub async fn refresh_history(&mut self) -> Result<(), WorkflowError> {
        self.workflow
            .refresh_history(self.backend.as_ref(), self.session.as_ref())
            .await
    }

    pub async fn delete_history_entry(
        &mut self,
        id: HistoryId,
    ) -> Result<DeleteOutcome, WorkflowError> {
        self.workflow
            .delete_history_entry(self.backend.as_ref(), self.session.as_ref(), id)
            .await
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
