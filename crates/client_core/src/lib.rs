//! Client core for the DreamInk image-style studio.
//!
//! The dashboard workflow, auth forms, style catalog and page navigation are plain state
//! machines driven by the UI. All network access goes through [`StudioBackend`], so the
//! same flows run against [`HttpBackend`] or a test double.

pub mod app;
pub mod auth;
mod backend;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod history;
pub mod media;
pub mod navigation;
pub mod session;
pub mod settings;
pub mod workflow;

pub use app::AppContext;
pub use backend::{HttpBackend, StudioBackend, StylizeRequest};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, BackendError, WorkflowError, CONNECTIVITY_MESSAGE};
pub use session::Session;
pub use workflow::{DeleteOutcome, Stage, StageKind, TransformWorkflow, WorkflowPolicy};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
