pub mod api;
pub mod config;
pub mod functions;
pub mod middlewares;
pub mod queries;
pub mod utils;

pub use config::AppConfig;
pub use functions::{ChatOutcome, ChatService};
pub use queries::_structs::{Location, MobilityResponse};
