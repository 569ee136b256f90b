//! Turn orchestrator: central coordinator for one user request.
//!
//! Validates the request, loads the user's conversation state, runs the
//! dialogue, then saves the state and appends both chat messages.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use parkbot_core::config::ChatConfig;
use parkbot_core::store::{ConversationStore, MessageStore, RideCatalog, TicketCatalog};
use parkbot_core::types::{ChatMessage, ConversationState, Sender};

use crate::dialogue::Dialogue;
use crate::error::ChatError;

/// Runs turns for any number of users over shared stores.
pub struct TurnOrchestrator {
    dialogue: Dialogue,
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    config: ChatConfig,
}

impl TurnOrchestrator {
    pub fn new(
        config: &ChatConfig,
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        rides: Arc<dyn RideCatalog>,
        tickets: Arc<dyn TicketCatalog>,
    ) -> Self {
        Self {
            dialogue: Dialogue::new(rides, tickets),
            conversations,
            messages,
            user_locks: Mutex::new(HashMap::new()),
            config: config.clone(),
        }
    }

    /// Handle one utterance from `user_id` and return the bot's reply.
    ///
    /// Each call advances the conversation, so a failed call must not be
    /// retried blindly: the state may already have been saved.
    pub fn handle_turn(&self, user_id: &str, text: &str) -> Result<String, ChatError> {
        self.validate(user_id, text)?;

        if !self.config.serialize_user_turns {
            return self.run_turn(user_id, text);
        }

        let lock = self.user_lock(user_id)?;
        let result = match lock.lock() {
            Ok(_guard) => self.run_turn(user_id, text),
            Err(e) => Err(ChatError::Storage(format!("user lock poisoned: {}", e))),
        };
        self.release_user_lock(user_id, lock)?;
        result
    }

    fn run_turn(&self, user_id: &str, text: &str) -> Result<String, ChatError> {
        let mut state = self
            .conversations
            .get(user_id)?
            .unwrap_or_else(|| ConversationState::new(user_id));
        let previous = state.active_intent;

        let user_message = ChatMessage::new(user_id, text, Sender::User);
        let reply = self.dialogue.respond(&mut state, text)?;
        state.record_turn(text, &reply);

        debug!(
            user_id,
            from = ?previous,
            to = ?state.active_intent,
            "Turn handled"
        );

        self.conversations.put(&state)?;
        self.messages.append(&user_message)?;
        self.messages
            .append(&ChatMessage::new(user_id, reply.as_str(), Sender::Bot))?;

        Ok(reply)
    }

    /// Full chat history for a user, oldest first.
    pub fn history(&self, user_id: &str) -> Result<Vec<ChatMessage>, ChatError> {
        Ok(self.messages.list_by_user(user_id)?)
    }

    /// The latest `recent_limit` messages for a user, newest first.
    pub fn recent(&self, user_id: &str) -> Result<Vec<ChatMessage>, ChatError> {
        Ok(self
            .messages
            .recent_by_user(user_id, self.config.recent_limit)?)
    }

    fn validate(&self, user_id: &str, text: &str) -> Result<(), ChatError> {
        if user_id.trim().is_empty() {
            return Err(ChatError::EmptyUserId);
        }
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }
        Ok(())
    }

    fn user_lock(&self, user_id: &str) -> Result<Arc<Mutex<()>>, ChatError> {
        let mut locks = self
            .user_locks
            .lock()
            .map_err(|e| ChatError::Storage(format!("lock map poisoned: {}", e)))?;
        Ok(locks.entry(user_id.to_string()).or_default().clone())
    }

    /// Drop the caller's handle and forget the user's lock once no other
    /// turn holds or waits on it.
    fn release_user_lock(&self, user_id: &str, lock: Arc<Mutex<()>>) -> Result<(), ChatError> {
        drop(lock);
        let mut locks = self
            .user_locks
            .lock()
            .map_err(|e| ChatError::Storage(format!("lock map poisoned: {}", e)))?;
        if locks
            .get(user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(user_id);
        }
        Ok(())
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.user_locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}
