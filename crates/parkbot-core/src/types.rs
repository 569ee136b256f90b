use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Flow state
// =============================================================================

/// Position of a user in the ticket dialogue.
///
/// Stored as `active_intent` on [`ConversationState`]; `None` there means no
/// flow is active. Variants prefixed with `Await` are questions the bot is
/// waiting on an answer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Greet,
    BuyTicket,
    AwaitGroupTypeClarification,
    AwaitFriendsAdultStatusConfirmation,
    AwaitFriendsCount,
    AwaitFriendsMixedComposition,
    AwaitFamilyComposition,
    AwaitChildrenHeightConfirmation,
    SuggestSoloTicketOptions,
    GroupDetails,
    GroupDetailsUpdated,
    TicketSuggestionProvided,
}

impl FlowState {
    pub const ALL: [FlowState; 12] = [
        FlowState::Greet,
        FlowState::BuyTicket,
        FlowState::AwaitGroupTypeClarification,
        FlowState::AwaitFriendsAdultStatusConfirmation,
        FlowState::AwaitFriendsCount,
        FlowState::AwaitFriendsMixedComposition,
        FlowState::AwaitFamilyComposition,
        FlowState::AwaitChildrenHeightConfirmation,
        FlowState::SuggestSoloTicketOptions,
        FlowState::GroupDetails,
        FlowState::GroupDetailsUpdated,
        FlowState::TicketSuggestionProvided,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Greet => "greet",
            FlowState::BuyTicket => "buy_ticket",
            FlowState::AwaitGroupTypeClarification => "await_group_type_clarification",
            FlowState::AwaitFriendsAdultStatusConfirmation => {
                "await_friends_adult_status_confirmation"
            }
            FlowState::AwaitFriendsCount => "await_friends_count",
            FlowState::AwaitFriendsMixedComposition => "await_friends_mixed_composition",
            FlowState::AwaitFamilyComposition => "await_family_composition",
            FlowState::AwaitChildrenHeightConfirmation => "await_children_height_confirmation",
            FlowState::SuggestSoloTicketOptions => "suggest_solo_ticket_options",
            FlowState::GroupDetails => "group_details",
            FlowState::GroupDetailsUpdated => "group_details_updated",
            FlowState::TicketSuggestionProvided => "ticket_suggestion_provided",
        }
    }

    /// Whether the bot is waiting on the answer to a specific question.
    pub fn is_await(&self) -> bool {
        matches!(
            self,
            FlowState::AwaitGroupTypeClarification
                | FlowState::AwaitFriendsAdultStatusConfirmation
                | FlowState::AwaitFriendsCount
                | FlowState::AwaitFriendsMixedComposition
                | FlowState::AwaitFamilyComposition
                | FlowState::AwaitChildrenHeightConfirmation
        )
    }

    /// Whether the state belongs to the ticket-purchase flow.
    pub fn is_ticket_flow(&self) -> bool {
        self.is_await()
            || matches!(
                self,
                FlowState::BuyTicket
                    | FlowState::GroupDetails
                    | FlowState::SuggestSoloTicketOptions
                    | FlowState::GroupDetailsUpdated
            )
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowState {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlowState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Unknown flow state: {}", s))
    }
}

// =============================================================================
// Slots
// =============================================================================

/// Who the visitor is coming with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Friends,
    Family,
    Solo,
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupType::Friends => write!(f, "friends"),
            GroupType::Family => write!(f, "family"),
            GroupType::Solo => write!(f, "solo"),
        }
    }
}

/// Ticket tiers the assistant knows how to recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassTier {
    Silver,
    Gold,
    Diamond,
}

impl PassTier {
    pub const ALL: [PassTier; 3] = [PassTier::Silver, PassTier::Gold, PassTier::Diamond];

    /// Display name as used in the ticket catalog.
    pub fn name(&self) -> &'static str {
        match self {
            PassTier::Silver => "Silver",
            PassTier::Gold => "Gold",
            PassTier::Diamond => "Diamond",
        }
    }
}

impl fmt::Display for PassTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PassTier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PassTier::ALL
            .iter()
            .copied()
            .find(|tier| tier.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown pass tier: {}", s))
    }
}

/// Group composition, with the facts that only make sense for that group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "group_type", rename_all = "snake_case")]
pub enum Party {
    Friends {
        /// Answer to "are all your friends adults?", once given.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        all_adults: Option<bool>,
    },
    Family,
    Solo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preferred_pass: Option<PassTier>,
    },
}

impl Party {
    pub fn friends() -> Self {
        Party::Friends { all_adults: None }
    }

    pub fn solo() -> Self {
        Party::Solo {
            preferred_pass: None,
        }
    }

    pub fn group_type(&self) -> GroupType {
        match self {
            Party::Friends { .. } => GroupType::Friends,
            Party::Family => GroupType::Family,
            Party::Solo { .. } => GroupType::Solo,
        }
    }
}

/// Information gathered across turns toward a ticket recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slots {
    pub party: Option<Party>,
    pub adults: u32,
    pub children: u32,
    /// Whether the children are short enough to enter for free.
    pub children_free: Option<bool>,
    pub last_user_utterance: Option<String>,
}

impl Slots {
    pub fn group_type(&self) -> Option<GroupType> {
        self.party.as_ref().map(Party::group_type)
    }

    pub fn is_empty(&self) -> bool {
        *self == Slots::default()
    }
}

// =============================================================================
// Conversation state
// =============================================================================

/// Per-user dialogue record, upserted once per turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub user_id: String,
    pub active_intent: Option<FlowState>,
    pub slots: Slots,
    /// Append-only "User: ..." / "Bot: ..." lines in turn order.
    pub transcript: Vec<String>,
    pub last_interaction_time: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            active_intent: None,
            slots: Slots::default(),
            transcript: Vec::new(),
            last_interaction_time: Utc::now(),
        }
    }

    /// Drop the active flow and every slot. The transcript is kept.
    pub fn reset(&mut self) {
        self.active_intent = None;
        self.slots = Slots::default();
    }

    pub fn is_awaiting(&self) -> bool {
        self.active_intent.is_some_and(|s| s.is_await())
    }

    pub fn touch(&mut self) {
        self.last_interaction_time = Utc::now();
    }

    /// Append one completed turn to the transcript.
    pub fn record_turn(&mut self, utterance: &str, reply: &str) {
        self.transcript.push(format!("User: {}", utterance));
        self.transcript.push(format!("Bot: {}", reply));
        self.touch();
    }
}

// =============================================================================
// Chat messages
// =============================================================================

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            _ => Err(format!("Unknown sender: {}", s)),
        }
    }
}

/// One immutable message in a user's chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(user_id: impl Into<String>, text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// Catalog entries
// =============================================================================

/// A ride in the park catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Upper-case label such as "THRILL" or "KIDS".
    pub category: String,
    pub active: bool,
}

impl Ride {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            active: true,
        }
    }
}

/// A purchasable ticket type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketType {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub ride_limit: u32,
    /// Price per person in rupees.
    pub price: f64,
    pub free_for_children: bool,
}

impl TicketType {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        ride_limit: u32,
        price: f64,
        free_for_children: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            ride_limit,
            price,
            free_for_children,
        }
    }

    /// The pass tier this ticket corresponds to, matched case-insensitively.
    pub fn tier(&self) -> Option<PassTier> {
        self.name.parse().ok()
    }
}
