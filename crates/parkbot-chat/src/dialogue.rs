//! Dialogue controller.
//!
//! One call to [`Dialogue::respond`] runs one turn against a loaded
//! [`ConversationState`]. Rules are tried in priority order and the first
//! that produces a reply wins:
//!
//! 1. greeting (ignored while an `Await*` question is open)
//! 2. ticket keyword, which (re)enters the ticket flow and may fast-forward
//!    on a group word in the same utterance
//! 3. in-flow handling, dispatched on (group type, flow state); a goodbye
//!    that leaves the open question unanswered skips it
//! 4. ride, food and opening-hours topics
//! 5. thanks
//! 6. goodbye
//! 7. re-prompt of the open `Await*` question
//! 8. default help text

use std::sync::Arc;

use tracing::trace;

use parkbot_core::error::Result;
use parkbot_core::store::{RideCatalog, TicketCatalog};
use parkbot_core::types::{ConversationState, FlowState, GroupType, Party, Slots};

use crate::compose::{compose_recommendation, summarize_rides, NO_RIDE_INFO};
use crate::extract::{extract_composition, extract_number};
use crate::lexicon::Signals;

// =============================================================================
// Reply texts
// =============================================================================

pub const WELCOME: &str = "Hey there! 😊 Welcome to Amusement Park Chat! You can ask about 🎢 rides, 🎟️ tickets, 🍔 food stalls, or park 🕒 timings.";
pub const FOOD_INFO: &str = "Hungry? 🍕 We have stalls like 'Pizza Paradise', 'Park Diner', and 'Spicy Grill'. Veg & non-veg options available!";
pub const HOURS_INFO: &str = "⏰ We're open daily from 11:00 AM to 7:00 PM during the summer season!";
pub const YOURE_WELCOME: &str = "You're welcome! 😊 Anything else you’d like to know?";
pub const GOODBYE: &str = "Goodbye! 🎉 Hope you have an amazing day at the park!";
pub const DEFAULT_REPLY: &str = "Hmm 🤔 I didn't quite get that. You can ask about 🎢 rides, 🎟️ tickets, 🍔 food stalls, or park 🕒 timings.";

const ASK_GROUP_TYPE: &str = "Are you visiting alone, with friends, or with family?";
const ASK_FRIENDS_ADULTS: &str = "Are all your friends adults?";
const ASK_FAMILY_COMPOSITION: &str = "How many adults and how many children will be joining?";
const SOLO_PASS_MENU: &str = "You can choose from Silver, Gold, or Diamond passes. Want help deciding?";

const ASK_FRIENDS_COUNT: &str = "Great! How many friends will be joining you?";
const ASK_FRIENDS_MIXED: &str =
    "Okay. Please tell me how many adults and how many children are in your group of friends.";
const FRIENDS_ADULTS_UNCLEAR: &str = "Sorry, I didn't catch that. Are all your friends adults? (yes/no)";
const FRIENDS_COUNT_UNCLEAR: &str = "Please tell me the number of friends joining you.";
const FRIENDS_MIXED_UNCLEAR: &str = "Please specify the number of adults and children among your friends.";
const FAMILY_COMPOSITION_UNCLEAR: &str = "Please tell me how many adults and children will be joining.";

const ASK_FRIENDS_HEIGHT: &str = "Are the children in your group shorter than 2.5 ft in height?";
const ASK_FAMILY_HEIGHT: &str = "Are the children shorter than 2.5 ft in height?";
const HEIGHT_UNCLEAR: &str = "Sorry, I didn't catch that. Are the children shorter than 2.5 ft? (yes/no)";

/// The fixed re-prompt for each open question.
///
/// Returns `Some` for exactly the `Await*` states.
pub fn reprompt_for(state: FlowState) -> Option<&'static str> {
    match state {
        FlowState::AwaitGroupTypeClarification => Some(ASK_GROUP_TYPE),
        FlowState::AwaitFriendsAdultStatusConfirmation => {
            Some("Are all your friends adults? (yes/no)")
        }
        FlowState::AwaitFriendsCount => Some(FRIENDS_COUNT_UNCLEAR),
        FlowState::AwaitFriendsMixedComposition => Some(FRIENDS_MIXED_UNCLEAR),
        FlowState::AwaitFamilyComposition => Some(ASK_FAMILY_COMPOSITION),
        FlowState::AwaitChildrenHeightConfirmation => {
            Some("Are the children shorter than 2.5 ft? (yes/no)")
        }
        FlowState::Greet
        | FlowState::BuyTicket
        | FlowState::SuggestSoloTicketOptions
        | FlowState::GroupDetails
        | FlowState::GroupDetailsUpdated
        | FlowState::TicketSuggestionProvided => None,
    }
}

// =============================================================================
// In-flow transition table
// =============================================================================

/// Outcome of an in-flow handler for one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Move to the given state and ask the given question.
    Ask(FlowState, &'static str),
    /// Stay put and ask again.
    Repeat(&'static str),
    /// Enough is known; build the ticket recommendation.
    Compose,
    /// No in-flow rule applies; later rules get the utterance.
    Pass,
}

/// Record the group type and return the state its first question belongs to.
fn fast_forward(slots: &mut Slots, group: GroupType) -> FlowState {
    match group {
        GroupType::Friends => {
            slots.party = Some(Party::friends());
            FlowState::AwaitFriendsAdultStatusConfirmation
        }
        GroupType::Family => {
            slots.party = Some(Party::Family);
            FlowState::AwaitFamilyComposition
        }
        GroupType::Solo => {
            slots.party = Some(Party::solo());
            slots.adults = 1;
            slots.children = 0;
            FlowState::SuggestSoloTicketOptions
        }
    }
}

fn clarify_group(slots: &mut Slots, signals: &Signals) -> Step {
    match signals.group {
        Some(group) => {
            let next = fast_forward(slots, group);
            let prompt = match group {
                GroupType::Friends => ASK_FRIENDS_ADULTS,
                GroupType::Family => ASK_FAMILY_COMPOSITION,
                GroupType::Solo => SOLO_PASS_MENU,
            };
            Step::Ask(next, prompt)
        }
        None => Step::Ask(FlowState::AwaitGroupTypeClarification, ASK_GROUP_TYPE),
    }
}

fn friends_adult_status(slots: &mut Slots, signals: &Signals) -> Step {
    let Some(answer) = signals.yes_no() else {
        return Step::Repeat(FRIENDS_ADULTS_UNCLEAR);
    };
    if let Some(Party::Friends { all_adults }) = slots.party.as_mut() {
        *all_adults = Some(answer);
    }
    if answer {
        Step::Ask(FlowState::AwaitFriendsCount, ASK_FRIENDS_COUNT)
    } else {
        Step::Ask(FlowState::AwaitFriendsMixedComposition, ASK_FRIENDS_MIXED)
    }
}

fn friends_count(slots: &mut Slots, utterance: &str) -> Step {
    let friends = extract_number(utterance, "");
    if friends == 0 {
        return Step::Repeat(FRIENDS_COUNT_UNCLEAR);
    }
    // The person asking comes along too.
    slots.adults = friends.saturating_add(1);
    slots.children = 0;
    Step::Compose
}

/// Shared by the mixed-friends and family composition questions. Friends
/// groups count the person asking as one more adult.
fn composition(slots: &mut Slots, utterance: &str, group: GroupType) -> Step {
    let (adults, children) = extract_composition(utterance);
    let (unclear, height_prompt, extra_adult) = match group {
        GroupType::Friends => (FRIENDS_MIXED_UNCLEAR, ASK_FRIENDS_HEIGHT, 1),
        _ => (FAMILY_COMPOSITION_UNCLEAR, ASK_FAMILY_HEIGHT, 0),
    };
    if adults == 0 && children == 0 {
        return Step::Repeat(unclear);
    }

    slots.adults = adults.saturating_add(extra_adult);
    slots.children = children;
    if children > 0 {
        Step::Ask(FlowState::AwaitChildrenHeightConfirmation, height_prompt)
    } else {
        Step::Compose
    }
}

fn children_height(slots: &mut Slots, signals: &Signals) -> Step {
    match signals.yes_no() {
        Some(free) => {
            slots.children_free = Some(free);
            Step::Compose
        }
        None => Step::Repeat(HEIGHT_UNCLEAR),
    }
}

fn solo_options(slots: &mut Slots, signals: &Signals) -> Step {
    if let (Some(tier), Some(Party::Solo { preferred_pass })) =
        (signals.tier, slots.party.as_mut())
    {
        *preferred_pass = Some(tier);
    }
    Step::Compose
}

/// Whether `step` records an answer to the question open in `flow`, as
/// opposed to asking again.
fn answers_question(flow: FlowState, step: Step, signals: &Signals) -> bool {
    match step {
        Step::Ask(next, _) => next != FlowState::AwaitGroupTypeClarification,
        Step::Compose if flow == FlowState::SuggestSoloTicketOptions => {
            signals.affirm || signals.tier.is_some()
        }
        Step::Compose => true,
        Step::Repeat(_) | Step::Pass => false,
    }
}

/// Pick the in-flow handler for the current (group type, flow state) pair.
pub fn in_flow_step(
    flow: FlowState,
    slots: &mut Slots,
    signals: &Signals,
    utterance: &str,
) -> Step {
    use FlowState::*;
    use GroupType::*;

    match (slots.group_type(), flow) {
        (None, _) | (Some(_), AwaitGroupTypeClarification) => clarify_group(slots, signals),
        (Some(Friends), AwaitFriendsAdultStatusConfirmation) => {
            friends_adult_status(slots, signals)
        }
        (Some(Friends), AwaitFriendsCount) => friends_count(slots, utterance),
        (Some(Friends), AwaitFriendsMixedComposition) => composition(slots, utterance, Friends),
        (Some(Family), AwaitFamilyComposition) => composition(slots, utterance, Family),
        (Some(Friends | Family), AwaitChildrenHeightConfirmation) => {
            children_height(slots, signals)
        }
        (Some(Solo), _) => solo_options(slots, signals),
        _ => Step::Pass,
    }
}

// =============================================================================
// Dialogue
// =============================================================================

/// Rule-based dialogue controller over the ride and ticket catalogs.
pub struct Dialogue {
    rides: Arc<dyn RideCatalog>,
    tickets: Arc<dyn TicketCatalog>,
}

impl Dialogue {
    pub fn new(rides: Arc<dyn RideCatalog>, tickets: Arc<dyn TicketCatalog>) -> Self {
        Self { rides, tickets }
    }

    /// Run one turn: update `state` for `utterance` and return the reply.
    ///
    /// Only catalog failures produce an error.
    pub fn respond(&self, state: &mut ConversationState, utterance: &str) -> Result<String> {
        let signals = Signals::classify(utterance);
        trace!(?signals, utterance, "Classified utterance");
        state.slots.last_user_utterance = Some(utterance.to_string());

        // 1. Greeting
        if signals.greeting && !state.is_awaiting() {
            state.reset();
            state.active_intent = Some(FlowState::Greet);
            return Ok(WELCOME.to_string());
        }

        // 2. Ticket keyword
        if signals.ticket {
            state.active_intent = Some(match signals.group {
                Some(group) => fast_forward(&mut state.slots, group),
                None => {
                    state.slots.party = None;
                    FlowState::BuyTicket
                }
            });
        }

        // 3. In-flow. A goodbye that does not answer the open question ends
        // the flow instead.
        let mut left_flow = false;
        if let Some(flow) = state.active_intent.filter(|flow| flow.is_ticket_flow()) {
            let mut slots = state.slots.clone();
            let step = in_flow_step(flow, &mut slots, &signals, utterance);
            if signals.farewell && !signals.ticket && !answers_question(flow, step, &signals) {
                left_flow = true;
            } else {
                state.slots = slots;
                if let Some(reply) = self.apply(state, step)? {
                    return Ok(reply);
                }
            }
        }

        // 4. Topics
        if !signals.ticket {
            if signals.ride {
                let rides = self.rides.list_all()?;
                return Ok(if rides.is_empty() {
                    NO_RIDE_INFO.to_string()
                } else {
                    summarize_rides(&rides)
                });
            }
            if signals.food {
                return Ok(FOOD_INFO.to_string());
            }
            if signals.time {
                return Ok(HOURS_INFO.to_string());
            }
        }

        // 5. Thanks, unless the user is also walking out of a flow
        if signals.thanks && !left_flow {
            if matches!(
                state.active_intent,
                Some(FlowState::TicketSuggestionProvided | FlowState::Greet)
            ) {
                state.reset();
            }
            return Ok(YOURE_WELCOME.to_string());
        }

        // 6. Goodbye
        if signals.farewell {
            state.reset();
            return Ok(GOODBYE.to_string());
        }

        // 7. Open question
        if let Some(prompt) = state.active_intent.and_then(reprompt_for) {
            return Ok(prompt.to_string());
        }

        // 8. Default
        Ok(DEFAULT_REPLY.to_string())
    }

    fn apply(&self, state: &mut ConversationState, step: Step) -> Result<Option<String>> {
        match step {
            Step::Ask(next, prompt) => {
                state.active_intent = Some(next);
                Ok(Some(prompt.to_string()))
            }
            Step::Repeat(prompt) => Ok(Some(prompt.to_string())),
            Step::Compose => {
                state.active_intent = Some(FlowState::GroupDetailsUpdated);
                let tickets = self.tickets.list_all()?;
                Ok(Some(compose_recommendation(state, &tickets)))
            }
            Step::Pass => Ok(None),
        }
    }
}
