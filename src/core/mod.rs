pub mod archiver;
pub mod extractor;
pub mod paths;

pub use crate::domain::model::{
    ArchiveOutcome, ArchiveRequest, ExtractConflictPolicy, ExtractOutcome, ExtractRequest,
};
pub use crate::utils::error::Result;
