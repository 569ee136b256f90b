//! Collaborator contracts consumed by the dialogue engine.
//!
//! The engine reads and writes through these traits and never manages
//! durability or schemas itself. Implementations live in `parkbot-storage`.

use uuid::Uuid;

use crate::error::Result;
use crate::types::{ChatMessage, ConversationState, Ride, TicketType};

/// Per-user conversation state, keyed by user id.
pub trait ConversationStore: Send + Sync {
    fn get(&self, user_id: &str) -> Result<Option<ConversationState>>;

    /// Insert or replace the state for `state.user_id`.
    fn put(&self, state: &ConversationState) -> Result<()>;
}

/// Append-only chat message log.
pub trait MessageStore: Send + Sync {
    fn append(&self, message: &ChatMessage) -> Result<()>;

    /// All messages for a user, oldest first.
    fn list_by_user(&self, user_id: &str) -> Result<Vec<ChatMessage>>;

    /// The `limit` most recent messages for a user, newest first.
    fn recent_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let mut messages = self.list_by_user(user_id)?;
        messages.reverse();
        messages.truncate(limit);
        Ok(messages)
    }
}

pub trait RideCatalog: Send + Sync {
    fn list_all(&self) -> Result<Vec<Ride>>;

    /// Rides in `category`, compared case-insensitively, in catalog order.
    fn rides_by_category(&self, category: &str) -> Result<Vec<Ride>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|ride| ride.category.eq_ignore_ascii_case(category))
            .collect())
    }
}

pub trait TicketCatalog: Send + Sync {
    fn list_all(&self) -> Result<Vec<TicketType>>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<TicketType>> {
        Ok(self.list_all()?.into_iter().find(|ticket| ticket.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sender;
    use std::sync::Mutex;

    struct VecMessages(Mutex<Vec<ChatMessage>>);

    impl MessageStore for VecMessages {
        fn append(&self, message: &ChatMessage) -> Result<()> {
            self.0.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn list_by_user(&self, user_id: &str) -> Result<Vec<ChatMessage>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    struct VecCatalog {
        rides: Vec<Ride>,
        tickets: Vec<TicketType>,
    }

    impl RideCatalog for VecCatalog {
        fn list_all(&self) -> Result<Vec<Ride>> {
            Ok(self.rides.clone())
        }
    }

    impl TicketCatalog for VecCatalog {
        fn list_all(&self) -> Result<Vec<TicketType>> {
            Ok(self.tickets.clone())
        }
    }

    fn catalog() -> VecCatalog {
        VecCatalog {
            rides: vec![
                Ride::new("Sky Drop", "", "THRILL"),
                Ride::new("Carousel", "", "FAMILY"),
                Ride::new("Fire Loop", "", "THRILL"),
            ],
            tickets: vec![
                TicketType::new("Silver", "", 3, 299.0, true),
                TicketType::new("Gold", "", 6, 499.0, true),
            ],
        }
    }

    #[test]
    fn test_rides_by_category_default_filters_case_insensitively() {
        let catalog = catalog();
        let names: Vec<String> = catalog
            .rides_by_category("thrill")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Sky Drop", "Fire Loop"]);
        assert!(catalog.rides_by_category("water").unwrap().is_empty());
    }

    #[test]
    fn test_find_by_id_default() {
        let catalog = catalog();
        let gold = catalog.tickets[1].clone();
        assert_eq!(catalog.find_by_id(gold.id).unwrap(), Some(gold));
        assert!(catalog.find_by_id(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_recent_by_user_default_is_newest_first() {
        let store = VecMessages(Mutex::new(Vec::new()));
        for i in 0..7 {
            store
                .append(&ChatMessage::new("u1", format!("m{}", i), Sender::User))
                .unwrap();
        }
        store
            .append(&ChatMessage::new("u2", "other", Sender::User))
            .unwrap();

        let recent = store.recent_by_user("u1", 5).unwrap();
        let texts: Vec<&str> = recent.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m6", "m5", "m4", "m3", "m2"]);
    }

    #[test]
    fn test_recent_by_user_limit_larger_than_history() {
        let store = VecMessages(Mutex::new(Vec::new()));
        store
            .append(&ChatMessage::new("u1", "only", Sender::Bot))
            .unwrap();
        assert_eq!(store.recent_by_user("u1", 5).unwrap().len(), 1);
        assert!(store.recent_by_user("nobody", 5).unwrap().is_empty());
    }
}
