pub mod analysis;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod perception;
pub mod service;

pub use analysis::{AnalysisEngine, AnalysisReport};
pub use catalog::{ProductProfile, ReferenceCatalog};
pub use config::EngineConfig;
pub use error::{AppError, EngineError};
pub use perception::PerceptionResult;
pub use service::{AnalysisRequest, AnalysisService};
