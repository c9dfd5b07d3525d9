//! Data models for YOLAT.

mod annotation;
mod category;
mod job;

pub use annotation::BoundingBox;
pub use category::{ClassDef, default_classes};
pub use job::{ImageRecord, JobMeta, JobPaths, JobSnapshot, JobSummary};
