pub mod chat;
pub mod compose;
pub mod intent;
pub mod mobility;
pub mod places;
pub mod routes;

pub use chat::{ChatOutcome, ChatService};
pub use intent::extract_intent;
