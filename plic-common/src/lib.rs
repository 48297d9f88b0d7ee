//! # PLIC Common Library
//!
//! Shared code for the Pakistan Localization Image Checker:
//! - Analysis data model (image references, findings, results)
//! - Severity ranking used for presentation order
//! - Configuration loading and credential resolution
//! - Common error type

pub mod analysis;
pub mod config;
pub mod error;
pub mod image_ref;

pub use analysis::{AnalysisRequest, AnalysisResult, Finding, ImageInfo, ImageSource, IssueType, Severity};
pub use error::{Error, Result};
pub use image_ref::{ImageReference, MediaType};
