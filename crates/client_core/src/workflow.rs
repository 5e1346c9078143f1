//! Dashboard workflow: style selection, upload, transform, result, and the history view.
//!
//! The current [`Stage`] carries exactly the data that stage may hold, so a result can never
//! exist without the style and image that produced it. Every transition that replaces the
//! style or image bumps the workflow cycle; completions tagged with an older cycle are
//! dropped instead of being applied to the wrong image.

use std::mem;

use serde::Deserialize;
use shared::{
    domain::{HistoryId, StyleEndpoint, UserId},
    protocol::{HistoryResponse, StylizeResponse},
};
use tracing::{debug, info, warn};

use crate::{
    backend::{StudioBackend, StylizeRequest},
    catalog::Style,
    error::{BackendError, WorkflowError},
    history::{self, HistoryView},
    media::{normalize_image_payload, result_file_name, SelectedFile, UploadedImage},
    session::Session,
};

pub const TRANSFORM_FAILED: &str = "Something went wrong.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonImageUploadPolicy {
    /// Leave the state untouched and report nothing.
    #[default]
    Ignore,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteFailurePolicy {
    #[default]
    LogOnly,
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkflowPolicy {
    pub non_image_uploads: NonImageUploadPolicy,
    pub delete_failures: DeleteFailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub image_data: String,
    pub style_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Browsing,
    StyleSelected {
        style: Style,
    },
    ImageUploaded {
        style: Style,
        image: UploadedImage,
    },
    Processing {
        style: Style,
        image: UploadedImage,
    },
    ResultReady {
        style: Style,
        image: UploadedImage,
        result: TransformResult,
    },
    Failed {
        style: Style,
        image: UploadedImage,
        message: String,
    },
    History(HistoryView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Browsing,
    StyleSelected,
    ImageUploaded,
    Processing,
    ResultReady,
    Error,
    HistoryView,
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Self::Browsing => StageKind::Browsing,
            Self::StyleSelected { .. } => StageKind::StyleSelected,
            Self::ImageUploaded { .. } => StageKind::ImageUploaded,
            Self::Processing { .. } => StageKind::Processing,
            Self::ResultReady { .. } => StageKind::ResultReady,
            Self::Failed { .. } => StageKind::Error,
            Self::History(_) => StageKind::HistoryView,
        }
    }
}

/// Whether the backend accepted a history deletion. The snapshot is refreshed either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted,
    IgnoredNotImage,
}

/// An issued transform request, tagged with the cycle it belongs to.
#[derive(Debug, Clone)]
pub struct TransformTicket {
    cycle: u64,
    style_id: u32,
    request: StylizeRequest,
}

impl TransformTicket {
    pub fn request(&self) -> &StylizeRequest {
        &self.request
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryTicket {
    generation: u64,
    user_id: UserId,
}

pub struct TransformWorkflow {
    stage: Stage,
    policy: WorkflowPolicy,
    cycle: u64,
    history_generation: u64,
}

impl Default for TransformWorkflow {
    fn default() -> Self {
        Self::new(WorkflowPolicy::default())
    }
}

impl TransformWorkflow {
    pub fn new(policy: WorkflowPolicy) -> Self {
        Self {
            stage: Stage::Browsing,
            policy,
            cycle: 0,
            history_generation: 0,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn kind(&self) -> StageKind {
        self.stage.kind()
    }

    pub fn policy(&self) -> WorkflowPolicy {
        self.policy
    }

    pub fn selected_style(&self) -> Option<&Style> {
        match &self.stage {
            Stage::StyleSelected { style }
            | Stage::ImageUploaded { style, .. }
            | Stage::Processing { style, .. }
            | Stage::ResultReady { style, .. }
            | Stage::Failed { style, .. } => Some(style),
            Stage::Browsing | Stage::History(_) => None,
        }
    }

    pub fn uploaded_image(&self) -> Option<&UploadedImage> {
        match &self.stage {
            Stage::ImageUploaded { image, .. }
            | Stage::Processing { image, .. }
            | Stage::ResultReady { image, .. }
            | Stage::Failed { image, .. } => Some(image),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&TransformResult> {
        match &self.stage {
            Stage::ResultReady { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.stage {
            Stage::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn history(&self) -> Option<&HistoryView> {
        match &self.stage {
            Stage::History(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.stage, Stage::Processing { .. })
    }

    /// Whether the submit control should be enabled.
    pub fn can_transform(&self) -> bool {
        matches!(
            self.stage,
            Stage::ImageUploaded { .. } | Stage::ResultReady { .. } | Stage::Failed { .. }
        )
    }

    /// File name offered when downloading the current result.
    pub fn result_download_name(&self) -> Option<String> {
        match &self.stage {
            Stage::ResultReady { style, .. } => Some(result_file_name(style.title)),
            _ => None,
        }
    }

    fn enter(&mut self, stage: Stage) {
        self.cycle += 1;
        // Any pending history fetch belongs to the view being replaced.
        self.history_generation += 1;
        debug!(from = ?self.stage.kind(), to = ?stage.kind(), cycle = self.cycle, "workflow transition");
        self.stage = stage;
    }

    pub fn select_style(&mut self, style: Style) {
        self.enter(Stage::StyleSelected { style });
    }

    pub fn upload_image(&mut self, file: SelectedFile) -> Result<UploadOutcome, WorkflowError> {
        let style = *self.selected_style().ok_or(WorkflowError::NoStyleSelected)?;
        let media_type = file.media_type.clone();
        let Some(image) = UploadedImage::decode(file) else {
            debug!(%media_type, "ignoring non-image upload");
            return match self.policy.non_image_uploads {
                NonImageUploadPolicy::Ignore => Ok(UploadOutcome::IgnoredNotImage),
                NonImageUploadPolicy::Reject => {
                    Err(WorkflowError::UnsupportedMediaType(media_type))
                }
            };
        };
        self.enter(Stage::ImageUploaded { style, image });
        Ok(UploadOutcome::Accepted)
    }

    /// Moves to `Processing` and hands back the request to send. No request may be issued
    /// without a ticket, and a ticket requires both a style and an image.
    pub fn begin_transform(
        &mut self,
        session: Option<&Session>,
    ) -> Result<TransformTicket, WorkflowError> {
        match &self.stage {
            Stage::Processing { .. } => return Err(WorkflowError::AlreadyProcessing),
            Stage::Browsing | Stage::History(_) => return Err(WorkflowError::NoStyleSelected),
            Stage::StyleSelected { .. } => return Err(WorkflowError::NoImageUploaded),
            Stage::ImageUploaded { .. } | Stage::ResultReady { .. } | Stage::Failed { .. } => {}
        }
        let session = session.ok_or(WorkflowError::NotSignedIn)?;

        let (style, image) = match mem::replace(&mut self.stage, Stage::Browsing) {
            Stage::ImageUploaded { style, image }
            | Stage::ResultReady { style, image, .. }
            | Stage::Failed { style, image, .. } => (style, image),
            other => {
                self.stage = other;
                return Err(WorkflowError::NoImageUploaded);
            }
        };

        let request = StylizeRequest {
            endpoint: StyleEndpoint::from_title(style.title),
            media_type: image.media_type().to_string(),
            image: image.bytes().to_vec(),
            user_id: session.user_id,
        };
        self.enter(Stage::Processing { style, image });
        info!(
            endpoint = %request.endpoint,
            user_id = session.user_id.0,
            cycle = self.cycle,
            "transform submitted"
        );
        Ok(TransformTicket {
            cycle: self.cycle,
            style_id: style.id,
            request,
        })
    }

    /// Applies a backend reply. Returns `false` when the ticket is stale and was dropped.
    pub fn complete_transform(
        &mut self,
        ticket: TransformTicket,
        outcome: Result<StylizeResponse, BackendError>,
    ) -> bool {
        if ticket.cycle != self.cycle || !self.is_processing() {
            debug!(
                ticket_cycle = ticket.cycle,
                cycle = self.cycle,
                "dropping stale transform completion"
            );
            return false;
        }
        let (style, image) = match mem::replace(&mut self.stage, Stage::Browsing) {
            Stage::Processing { style, image } => (style, image),
            other => {
                self.stage = other;
                return false;
            }
        };

        let image_data = match &outcome {
            Ok(reply) => reply
                .image
                .as_deref()
                .filter(|payload| !payload.trim().is_empty())
                .map(normalize_image_payload),
            Err(_) => None,
        };

        // Completion belongs to the current cycle; the stage is replaced without a bump.
        self.stage = match (image_data, outcome) {
            (Some(image_data), _) => Stage::ResultReady {
                style,
                image,
                result: TransformResult {
                    image_data,
                    style_id: ticket.style_id,
                },
            },
            (None, Ok(reply)) => Stage::Failed {
                style,
                image,
                message: reply
                    .error
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| TRANSFORM_FAILED.to_string()),
            },
            (None, Err(err)) => {
                warn!(error = %err, "transform request failed");
                Stage::Failed {
                    style,
                    image,
                    message: err.user_message(TRANSFORM_FAILED),
                }
            }
        };
        debug!(to = ?self.stage.kind(), cycle = self.cycle, "transform completed");
        true
    }

    pub async fn transform(
        &mut self,
        backend: &dyn StudioBackend,
        session: Option<&Session>,
    ) -> Result<StageKind, WorkflowError> {
        let ticket = self.begin_transform(session)?;
        let outcome = backend.stylize(ticket.request()).await;
        self.complete_transform(ticket, outcome);
        Ok(self.kind())
    }

    /// Drops the image and any result, keeping the selected style.
    pub fn reset(&mut self) {
        let style = match &self.stage {
            Stage::ImageUploaded { style, .. }
            | Stage::Processing { style, .. }
            | Stage::ResultReady { style, .. }
            | Stage::Failed { style, .. } => *style,
            Stage::StyleSelected { .. } | Stage::Browsing | Stage::History(_) => return,
        };
        self.enter(Stage::StyleSelected { style });
    }

    pub fn change_style(&mut self) {
        self.enter(Stage::Browsing);
    }

    /// Clears everything, as on logout.
    pub fn clear(&mut self) {
        self.enter(Stage::Browsing);
    }

    /// Switches to the history view in its loading state. Follow with a fetch.
    pub fn enter_history(&mut self) {
        self.enter(Stage::History(HistoryView::loading()));
    }

    pub fn exit_history(&mut self) {
        if matches!(self.stage, Stage::History(_)) {
            self.enter(Stage::Browsing);
        }
    }

    pub fn begin_history_fetch(
        &mut self,
        session: Option<&Session>,
    ) -> Result<HistoryTicket, WorkflowError> {
        let session = session.ok_or(WorkflowError::NotSignedIn)?;
        let Stage::History(view) = &mut self.stage else {
            return Err(WorkflowError::NotInHistory);
        };
        view.set_loading();
        self.history_generation += 1;
        Ok(HistoryTicket {
            generation: self.history_generation,
            user_id: session.user_id,
        })
    }

    /// Applies a fetched snapshot. A failed fetch keeps the previous entries. Returns `false`
    /// when the view was closed or a newer fetch superseded this one.
    pub fn complete_history_fetch(
        &mut self,
        ticket: HistoryTicket,
        outcome: Result<HistoryResponse, BackendError>,
    ) -> bool {
        let current = self.history_generation;
        let Stage::History(view) = &mut self.stage else {
            debug!("dropping history fetch for a closed view");
            return false;
        };
        if ticket.generation != current {
            debug!(
                generation = ticket.generation,
                current, "dropping superseded history fetch"
            );
            return false;
        }
        match outcome {
            Ok(body) => {
                let entries = history::snapshot(body.history);
                debug!(user_id = ticket.user_id.0, entries = entries.len(), "history loaded");
                view.finish(Some(entries));
            }
            Err(err) => {
                warn!(user_id = ticket.user_id.0, error = %err, "failed to fetch history");
                view.finish(None);
            }
        }
        true
    }

    pub async fn refresh_history(
        &mut self,
        backend: &dyn StudioBackend,
        session: Option<&Session>,
    ) -> Result<(), WorkflowError> {
        let ticket = self.begin_history_fetch(session)?;
        let outcome = backend.fetch_history(ticket.user_id).await;
        self.complete_history_fetch(ticket, outcome);
        Ok(())
    }

    pub async fn open_history(
        &mut self,
        backend: &dyn StudioBackend,
        session: Option<&Session>,
    ) -> Result<(), WorkflowError> {
        if session.is_none() {
            return Err(WorkflowError::NotSignedIn);
        }
        self.enter_history();
        self.refresh_history(backend, session).await
    }

    /// Deletes one entry, then re-fetches the whole snapshot regardless of the outcome.
    pub async fn delete_history_entry(
        &mut self,
        backend: &dyn StudioBackend,
        session: Option<&Session>,
        id: HistoryId,
    ) -> Result<DeleteOutcome, WorkflowError> {
        if session.is_none() {
            return Err(WorkflowError::NotSignedIn);
        }
        if !matches!(self.stage, Stage::History(_)) {
            return Err(WorkflowError::NotInHistory);
        }

        let (outcome, notice) = match backend.delete_history(id).await {
            Ok(()) => (DeleteOutcome::Deleted, None),
            Err(err) => {
                warn!(history_id = id.0, error = %err, "failed to delete history entry");
                let notice = match self.policy.delete_failures {
                    DeleteFailurePolicy::LogOnly => None,
                    DeleteFailurePolicy::Surface => Some(format!(
                        "Could not delete entry: {}",
                        err.user_message("request rejected")
                    )),
                };
                (DeleteOutcome::Failed, notice)
            }
        };
        if let Stage::History(view) = &mut self.stage {
            view.set_notice(notice);
        }
        self.refresh_history(backend, session).await?;
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
