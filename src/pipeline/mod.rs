//! Pipeline components: per-resource state, stage processor, upload fan-out, batch driver.

pub mod fanout;
pub mod metadata;
pub mod orchestrator;
pub mod processor;
pub mod state;

pub use fanout::{FanoutReport, UploadFanout};
pub use metadata::{FileMetadata, extract_metadata, is_archive, list_archive_contents};
pub use orchestrator::{BatchOrchestrator, BatchSummary, Pacer, ThreadPacer};
pub use processor::{
    ProcessorConfig, ResourceOutcome, ResourceProcessor, StageFailure, StageResult,
};
pub use state::{ResourcePhase, ResourceState};
