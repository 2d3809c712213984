pub mod connectivity;
pub mod orchestrator;

pub use crate::domain::language::TargetLanguage;
pub use crate::domain::model::{
    ConnectivityState, Credential, Document, QuotaStatus, TranslationRequest, TranslationResult,
};
pub use crate::domain::ports::{ReachabilityProbe, TranslationService};
pub use crate::utils::error::Result;
