pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::ParkbotConfig;
pub use error::{ParkbotError, Result};
pub use store::{ConversationStore, MessageStore, RideCatalog, TicketCatalog};
pub use types::*;
