//! Dialogue engine for the park assistant.
//!
//! Classifies utterances into topic signals, runs the ticket-booking state
//! machine over a per-user conversation state, composes recommendation
//! replies from the live catalogs, and persists each turn.

pub mod compose;
pub mod dialogue;
pub mod error;
pub mod extract;
pub mod lexicon;
pub mod orchestrator;

pub use compose::{compose_recommendation, summarize_rides};
pub use dialogue::{reprompt_for, Dialogue, Step};
pub use error::ChatError;
pub use extract::{extract_composition, extract_number, extract_numbers};
pub use lexicon::Signals;
pub use orchestrator::TurnOrchestrator;
