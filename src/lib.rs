//! YOLAT - YOLO Annotation Tool
//!
//! A file-backed store of bounding-box annotation jobs with YOLO ZIP import
//! and export.

pub mod config;
pub mod constants;
pub mod data;
pub mod dataset;
pub mod format;
pub mod model;
pub mod storage;

pub use dataset::Dataset;
