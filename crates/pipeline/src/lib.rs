//! Orchestration of a full campaign submission and the asset lookups it
//! needs.

pub mod orchestrator;
pub mod resolve;
pub mod stage;

pub use orchestrator::{CampaignPipeline, PreparedSubmission, StageError};
pub use resolve::{check_pixel_permissions, resolve_timezone};
pub use stage::{CreatedIds, CreatedResourceRef, PartialFailure, PipelineOutcome, PipelineRun, Stage};
