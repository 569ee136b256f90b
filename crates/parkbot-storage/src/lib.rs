//! Parkbot storage crate - SQLite persistence and in-memory stores.
//!
//! Provides a WAL-mode SQLite database with versioned migrations,
//! repository implementations of the dialogue engine's collaborator traits
//! (conversation states, chat messages, rides, ticket types), an in-memory
//! equivalent for tests and ephemeral runs, and first-run catalog seeding.

pub mod db;
pub mod memory;
pub mod migrations;
pub mod repository;
pub mod seed;

pub use db::Database;
pub use memory::{InMemoryCatalog, InMemoryConversations, InMemoryMessages};
pub use repository::{
    ConversationRepository, MessageRepository, RideRepository, TicketTypeRepository,
};
pub use seed::{default_rides, default_ticket_types, seed_if_empty, SeedReport};
