//! Prompt selection for insurance document processing.
//!
//! A request names a situation, a processing level and a file type. The
//! service validates it and returns the id of the predefined prompt whose
//! criteria equal those three values exactly.
//!
//! # Example
//!
//! ```rust
//! use promptmatch::{MatchError, PromptService};
//! use serde_json::json;
//!
//! let svc = PromptService::default();
//!
//! let id = svc.process(&json!({
//!     "situation": "Commercial Auto",
//!     "level": "Structure",
//!     "file_type": "Summary Report",
//!     "data": "",
//! }));
//! assert_eq!(id, Ok("Prompt 1".to_string()));
//!
//! let err = svc.process(&json!({"situation": "Commercial Auto"}));
//! assert_eq!(err, Err(MatchError::MissingData));
//! ```

pub mod config;
pub mod criteria;
pub mod error;
pub mod matcher;
pub mod service;
pub mod validate;

pub use config::{ApiInfo, Config, ConfigFile, Profile, Vocabulary};
pub use criteria::{CriteriaTable, PromptCriteria};
pub use error::{ConfigError, MatchError};
pub use matcher::match_prompt;
pub use service::PromptService;
pub use validate::{MatchRequest, ValidationReport};
