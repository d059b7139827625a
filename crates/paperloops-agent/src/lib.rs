mod actor;
mod backoff;
mod client;
mod prompts;
mod traits;

pub use actor::{Actor, GenerationMode, GenerationRequest, DEFAULT_MAX_OUTPUT_TOKENS};
pub use backoff::RetryPolicy;
pub use client::{ChatClient, ClientConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use prompts::ActorPrompts;
pub use traits::{GenerationError, TextGenerator};
