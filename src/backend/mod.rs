//! Remote translation backends.
//!
//! Both kinds are explicitly constructed at startup and handed to the
//! translators; nothing here is global. Implementations only report errors,
//! retry and sentinel policy live with the callers.

pub mod google;
pub mod openai;
pub mod types;

use crate::error::BackendError;

pub use google::GoogleBackend;
pub use openai::OpenAiBackend;

/// Translates one paragraph per call.
pub trait UnitBackend: Send + Sync {
    fn name(&self) -> &str;
    fn translate(&self, text: &str) -> Result<String, BackendError>;
}

/// Chat-style generative model: system instruction + user prompt → free text.
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &str;
    fn complete(&self, system: &str, user: &str) -> Result<String, BackendError>;
}

impl<T: UnitBackend + ?Sized> UnitBackend for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn translate(&self, text: &str) -> Result<String, BackendError> {
        (**self).translate(text)
    }
}

impl<T: ChatBackend + ?Sized> ChatBackend for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn complete(&self, system: &str, user: &str) -> Result<String, BackendError> {
        (**self).complete(system, user)
    }
}
