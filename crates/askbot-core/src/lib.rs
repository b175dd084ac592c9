pub mod config;
pub mod error;
pub mod exchange;
pub mod responder;
pub mod state;

// Re-export main types for convenience
pub use config::Config;
pub use error::AskError;
pub use exchange::{ChatSurface, ExchangeController, PendingExchange};
pub use responder::{AskReply, HttpResponder, Responder};
pub use state::{ChatMessage, Origin, Transcript};
