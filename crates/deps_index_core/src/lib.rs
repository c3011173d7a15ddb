pub mod document;
pub mod error;
pub mod in_memory;
pub mod provider;
pub mod resource_id;

pub use document::*;
pub use error::ProviderError;
pub use provider::*;
pub use resource_id::*;
