//! Repository implementations for SQLite-backed persistence.
//!
//! Each repository implements one of the collaborator traits from
//! `parkbot_core::store` over the shared [`Database`] using raw SQL.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use parkbot_core::error::ParkbotError;
use parkbot_core::store::{ConversationStore, MessageStore, RideCatalog, TicketCatalog};
use parkbot_core::types::{ChatMessage, ConversationState, FlowState, Ride, Sender, TicketType};

use crate::db::Database;

fn storage_err(e: rusqlite::Error) -> ParkbotError {
    ParkbotError::Storage(e.to_string())
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

// ============================================================================
// Conversation states
// ============================================================================

/// Repository for per-user conversation state.
pub struct ConversationRepository {
    db: Arc<Database>,
}

impl ConversationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Count stored conversation states.
    pub fn count(&self) -> Result<u64, ParkbotError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM conversation_states", [], |row| {
                    row.get(0)
                })
                .map_err(storage_err)?;
            Ok(count as u64)
        })
    }
}

impl ConversationStore for ConversationRepository {
    fn get(&self, user_id: &str) -> Result<Option<ConversationState>, ParkbotError> {
        self.db.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT user_id, active_intent, slots, transcript, last_interaction_time
                     FROM conversation_states WHERE user_id = ?1",
                    rusqlite::params![user_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, Option<String>>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, i64>(4)?,
                        ))
                    },
                )
                .optional()
                .map_err(storage_err)?;

            let Some((user_id, intent, slots, transcript, last_ms)) = row else {
                return Ok(None);
            };

            let active_intent = match intent {
                Some(tag) => Some(
                    tag.parse::<FlowState>()
                        .map_err(ParkbotError::Serialization)?,
                ),
                None => None,
            };

            Ok(Some(ConversationState {
                user_id,
                active_intent,
                slots: serde_json::from_str(&slots)?,
                transcript: serde_json::from_str(&transcript)?,
                last_interaction_time: from_millis(last_ms),
            }))
        })
    }

    fn put(&self, state: &ConversationState) -> Result<(), ParkbotError> {
        let slots = serde_json::to_string(&state.slots)?;
        let transcript = serde_json::to_string(&state.transcript)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversation_states
                     (user_id, active_intent, slots, transcript, last_interaction_time)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id) DO UPDATE SET
                     active_intent = excluded.active_intent,
                     slots = excluded.slots,
                     transcript = excluded.transcript,
                     last_interaction_time = excluded.last_interaction_time",
                rusqlite::params![
                    state.user_id,
                    state.active_intent.map(|s| s.as_str()),
                    slots,
                    transcript,
                    state.last_interaction_time.timestamp_millis(),
                ],
            )
            .map_err(|e| {
                ParkbotError::Storage(format!("Failed to save conversation state: {}", e))
            })?;
            Ok(())
        })
    }
}

// ============================================================================
// Chat messages
// ============================================================================

/// Repository for the append-only chat log.
pub struct MessageRepository {
    db: Arc<Database>,
}

impl MessageRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn query(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<ChatMessage>, ParkbotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(params, |row| Ok(row_to_message(row)))
                .map_err(storage_err)?;

            let mut messages = Vec::new();
            for row in rows {
                messages.push(row.map_err(storage_err)??);
            }
            Ok(messages)
        })
    }
}

impl MessageStore for MessageRepository {
    fn append(&self, message: &ChatMessage) -> Result<(), ParkbotError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_messages (id, user_id, text, sender, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    message.id.to_string(),
                    message.user_id,
                    message.text,
                    message.sender.to_string(),
                    message.timestamp.timestamp_millis(),
                ],
            )
            .map_err(|e| ParkbotError::Storage(format!("Failed to save message: {}", e)))?;
            Ok(())
        })
    }

    fn list_by_user(&self, user_id: &str) -> Result<Vec<ChatMessage>, ParkbotError> {
        self.query(
            "SELECT id, user_id, text, sender, timestamp FROM chat_messages
             WHERE user_id = ?1
             ORDER BY timestamp ASC, seq ASC",
            &[&user_id],
        )
    }

    fn recent_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>, ParkbotError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query(
            "SELECT id, user_id, text, sender, timestamp FROM chat_messages
             WHERE user_id = ?1
             ORDER BY timestamp DESC, seq DESC
             LIMIT ?2",
            &[&user_id, &limit],
        )
    }
}

// ============================================================================
// Rides
// ============================================================================

/// Repository for the ride catalog.
pub struct RideRepository {
    db: Arc<Database>,
}

impl RideRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn save(&self, ride: &Ride) -> Result<(), ParkbotError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO rides (id, name, description, category, active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    ride.id.to_string(),
                    ride.name,
                    ride.description,
                    ride.category,
                    ride.active as i32,
                ],
            )
            .map_err(|e| ParkbotError::Storage(format!("Failed to save ride: {}", e)))?;
            Ok(())
        })
    }

    pub fn count(&self) -> Result<u64, ParkbotError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM rides", [], |row| row.get(0))
                .map_err(storage_err)?;
            Ok(count as u64)
        })
    }

    fn select(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Ride>, ParkbotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(params, |row| Ok(row_to_ride(row)))
                .map_err(storage_err)?;

            let mut rides = Vec::new();
            for row in rows {
                rides.push(row.map_err(storage_err)??);
            }
            Ok(rides)
        })
    }
}

impl RideCatalog for RideRepository {
    fn list_all(&self) -> Result<Vec<Ride>, ParkbotError> {
        self.select(
            "SELECT id, name, description, category, active FROM rides
             ORDER BY created_at ASC, rowid ASC",
            &[],
        )
    }

    fn rides_by_category(&self, category: &str) -> Result<Vec<Ride>, ParkbotError> {
        self.select(
            "SELECT id, name, description, category, active FROM rides
             WHERE category = ?1 COLLATE NOCASE
             ORDER BY created_at ASC, rowid ASC",
            &[&category],
        )
    }
}

// ============================================================================
// Ticket types
// ============================================================================

/// Repository for the ticket-type catalog.
pub struct TicketTypeRepository {
    db: Arc<Database>,
}

impl TicketTypeRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn save(&self, ticket: &TicketType) -> Result<(), ParkbotError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ticket_types (id, name, description, ride_limit, price, free_for_children)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    ticket.id.to_string(),
                    ticket.name,
                    ticket.description,
                    ticket.ride_limit,
                    ticket.price,
                    ticket.free_for_children as i32,
                ],
            )
            .map_err(|e| ParkbotError::Storage(format!("Failed to save ticket type: {}", e)))?;
            Ok(())
        })
    }

    pub fn count(&self) -> Result<u64, ParkbotError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM ticket_types", [], |row| row.get(0))
                .map_err(storage_err)?;
            Ok(count as u64)
        })
    }
}

impl TicketCatalog for TicketTypeRepository {
    fn list_all(&self) -> Result<Vec<TicketType>, ParkbotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, name, description, ride_limit, price, free_for_children
                     FROM ticket_types
                     ORDER BY price ASC, rowid ASC",
                )
                .map_err(storage_err)?;
            let rows = stmt
                .query_map([], |row| Ok(row_to_ticket_type(row)))
                .map_err(storage_err)?;

            let mut tickets = Vec::new();
            for row in rows {
                tickets.push(row.map_err(storage_err)??);
            }
            Ok(tickets)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<TicketType>, ParkbotError> {
        self.db.with_conn(|conn| {
            let result = conn
                .query_row(
                    "SELECT id, name, description, ride_limit, price, free_for_children
                     FROM ticket_types WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                    |row| Ok(row_to_ticket_type(row)),
                )
                .optional()
                .map_err(storage_err)?;

            result.transpose()
        })
    }
}

// ============================================================================
// Helper functions for row-to-entity conversion.
// ============================================================================

fn parse_uuid(id: &str) -> Result<Uuid, ParkbotError> {
    Uuid::parse_str(id).map_err(|e| ParkbotError::Storage(format!("Invalid UUID: {}", e)))
}

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<ChatMessage, ParkbotError> {
    let id: String = row.get(0).map_err(storage_err)?;
    let user_id: String = row.get(1).map_err(storage_err)?;
    let text: String = row.get(2).map_err(storage_err)?;
    let sender: String = row.get(3).map_err(storage_err)?;
    let timestamp: i64 = row.get(4).map_err(storage_err)?;

    Ok(ChatMessage {
        id: parse_uuid(&id)?,
        user_id,
        text,
        sender: sender
            .parse::<Sender>()
            .map_err(ParkbotError::Storage)?,
        timestamp: from_millis(timestamp),
    })
}

fn row_to_ride(row: &rusqlite::Row<'_>) -> Result<Ride, ParkbotError> {
    let id: String = row.get(0).map_err(storage_err)?;
    let active: i32 = row.get(4).map_err(storage_err)?;

    Ok(Ride {
        id: parse_uuid(&id)?,
        name: row.get(1).map_err(storage_err)?,
        description: row.get(2).map_err(storage_err)?,
        category: row.get(3).map_err(storage_err)?,
        active: active != 0,
    })
}

fn row_to_ticket_type(row: &rusqlite::Row<'_>) -> Result<TicketType, ParkbotError> {
    let id: String = row.get(0).map_err(storage_err)?;
    let ride_limit: i64 = row.get(3).map_err(storage_err)?;
    let free_for_children: i32 = row.get(5).map_err(storage_err)?;

    Ok(TicketType {
        id: parse_uuid(&id)?,
        name: row.get(1).map_err(storage_err)?,
        description: row.get(2).map_err(storage_err)?,
        ride_limit: u32::try_from(ride_limit)
            .map_err(|e| ParkbotError::Storage(format!("Invalid ride limit: {}", e)))?,
        price: row.get(4).map_err(storage_err)?,
        free_for_children: free_for_children != 0,
    })
}
