//! In-memory implementations of the store traits.
//!
//! Used when `storage.in_memory` is set and by tests that do not need SQLite.
//! Nothing here survives a restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use parkbot_core::error::{ParkbotError, Result};
use parkbot_core::store::{ConversationStore, MessageStore, RideCatalog, TicketCatalog};
use parkbot_core::types::{ChatMessage, ConversationState, Ride, TicketType};

use crate::seed::{default_rides, default_ticket_types};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| ParkbotError::Storage(format!("Store lock poisoned: {}", e)))
}

/// Conversation states keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryConversations {
    states: Mutex<HashMap<String, ConversationState>>,
}

impl InMemoryConversations {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for InMemoryConversations {
    fn get(&self, user_id: &str) -> Result<Option<ConversationState>> {
        Ok(lock(&self.states)?.get(user_id).cloned())
    }

    fn put(&self, state: &ConversationState) -> Result<()> {
        lock(&self.states)?.insert(state.user_id.clone(), state.clone());
        Ok(())
    }
}

/// Chat log kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMessages {
    messages: Mutex<Vec<ChatMessage>>,
}

impl InMemoryMessages {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageStore for InMemoryMessages {
    fn append(&self, message: &ChatMessage) -> Result<()> {
        lock(&self.messages)?.push(message.clone());
        Ok(())
    }

    fn list_by_user(&self, user_id: &str) -> Result<Vec<ChatMessage>> {
        let mut messages: Vec<ChatMessage> = lock(&self.messages)?
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps append order for equal timestamps.
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}

/// Ride and ticket catalog held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    rides: Vec<Ride>,
    tickets: Vec<TicketType>,
}

impl InMemoryCatalog {
    pub fn new(rides: Vec<Ride>, tickets: Vec<TicketType>) -> Self {
        Self { rides, tickets }
    }

    /// Catalog populated with the default rides and ticket tiers.
    pub fn with_defaults() -> Self {
        Self::new(default_rides(), default_ticket_types())
    }
}

impl RideCatalog for InMemoryCatalog {
    fn list_all(&self) -> Result<Vec<Ride>> {
        Ok(self.rides.clone())
    }
}

impl TicketCatalog for InMemoryCatalog {
    fn list_all(&self) -> Result<Vec<TicketType>> {
        Ok(self.tickets.clone())
    }
}
