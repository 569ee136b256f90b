//! Reply composition: ticket recommendations and the ride catalog summary.

use parkbot_core::types::{ConversationState, FlowState, GroupType, Ride, TicketType};

use crate::extract::extract_number;

pub const NO_RIDE_INFO: &str = "Sorry, we currently don't have ride info.";

const ASK_GROUP_SIZE: &str = "I can help you with tickets. How many people are in your group?";
const SOLO_GENERIC: &str =
    "- For a solo visitor, you might like our Silver, Gold or Diamond ticket. Gold is popular!";

const RIDE_AND_FOOD_LINES: [&str; 3] = [
    "🎢 Recommended rides for adults: Thunder Coaster, Sky Drop",
    "🎠 For children: Mini Carousel, Water Splash",
    "🍔 Food stalls nearby: Burger Bonanza, Candy Corner",
];

const CLOSING: &str = "Would you like to proceed with a booking or ask something else?";

/// Head counts the recommendation is built from.
///
/// When both counts are 0 the last utterance gets one more generic number
/// pass, credited to adults for friends and family groups. A solo visitor
/// always counts as one adult.
fn resolve_counts(state: &ConversationState) -> (u32, u32) {
    let slots = &state.slots;
    let group = slots.group_type();
    let mut adults = slots.adults;
    let children = slots.children;

    if adults == 0 && children == 0 {
        if let Some(last) = slots.last_user_utterance.as_deref() {
            let rescued = extract_number(last, "");
            if rescued > 0 && matches!(group, Some(GroupType::Friends | GroupType::Family)) {
                adults = rescued;
            }
        }
    }
    if adults == 0 && group == Some(GroupType::Solo) {
        adults = 1;
    }
    (adults, children)
}

/// Build the ticket recommendation for the slots gathered so far.
///
/// Prices come from `tickets`, keeping only the Silver, Gold and Diamond
/// tiers. Moves the flow to `TicketSuggestionProvided`, except when there is
/// neither a head count nor a group type, in which case it asks for the
/// group size and leaves the state alone.
pub fn compose_recommendation(state: &mut ConversationState, tickets: &[TicketType]) -> String {
    let (adults, children) = resolve_counts(state);
    let group = state.slots.group_type();

    let mut lines = vec!["Great! Based on your information:".to_string()];

    if adults > 0 {
        lines.push(format!(
            "- For {} adult(s), we recommend Gold Tickets.",
            adults
        ));
    }
    if children > 0 {
        if state.slots.children_free == Some(true) {
            lines.push(format!(
                "- {} child(ren) (below 2.5 ft) can enter for free!",
                children
            ));
        } else {
            lines.push(format!(
                "- For {} child(ren), we recommend Diamond Tickets.",
                children
            ));
        }
    }
    if adults == 0 && children == 0 {
        match group {
            Some(GroupType::Solo) => lines.push(SOLO_GENERIC.to_string()),
            None => return ASK_GROUP_SIZE.to_string(),
            Some(_) => {}
        }
    }

    let price_lines: Vec<String> = tickets
        .iter()
        .filter(|t| t.tier().is_some())
        .map(|t| format!("- {} Ticket: Rs {:.2}", t.name, t.price))
        .collect();
    if !price_lines.is_empty() {
        lines.push(String::new());
        lines.push("Ticket Price Examples (per person):".to_string());
        lines.extend(price_lines);
    }

    lines.push(String::new());
    lines.extend(RIDE_AND_FOOD_LINES.iter().map(|l| l.to_string()));
    lines.push(String::new());
    lines.push(CLOSING.to_string());

    state.active_intent = Some(FlowState::TicketSuggestionProvided);
    lines.join("\n")
}

/// "Thrill", "Kids", ...: first letter upper-case, the rest lower-case.
fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Summarise the ride catalog, one line per category.
///
/// Categories appear in the order they are first seen in `rides`.
pub fn summarize_rides(rides: &[Ride]) -> String {
    if rides.is_empty() {
        return NO_RIDE_INFO.to_string();
    }

    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for ride in rides {
        match groups.iter_mut().find(|(cat, _)| *cat == ride.category) {
            Some((_, names)) => names.push(ride.name.as_str()),
            None => groups.push((ride.category.as_str(), vec![ride.name.as_str()])),
        }
    }

    let details: Vec<String> = groups
        .iter()
        .map(|(category, names)| format!("{} Rides: {}.", capitalize(category), names.join(", ")))
        .collect();

    format!(
        "We have {} exciting rides at our amusement park across several categories:\n\n{}",
        rides.len(),
        details.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkbot_core::types::{Party, PassTier};

    fn catalog() -> Vec<TicketType> {
        vec![
            TicketType::new("Silver", "3 rides", 3, 299.0, true),
            TicketType::new("Gold", "6 rides", 6, 499.0, true),
            TicketType::new("Diamond", "12 rides", 12, 899.0, true),
            TicketType::new("VIP", "unlimited", 99, 1999.0, false),
        ]
    }

    fn state_with(party: Option<Party>, adults: u32, children: u32) -> ConversationState {
        let mut state = ConversationState::new("tester");
        state.slots.party = party;
        state.slots.adults = adults;
        state.slots.children = children;
        state
    }

    // =========================================================================
    // Recommendation
    // =========================================================================

    #[test]
    fn test_family_with_free_children() {
        let mut state = state_with(Some(Party::Family), 2, 1);
        state.slots.children_free = Some(true);

        let reply = compose_recommendation(&mut state, &catalog());

        assert!(reply.starts_with("Great! Based on your information:"));
        assert!(reply.contains("- For 2 adult(s), we recommend Gold Tickets."));
        assert!(reply.contains("- 1 child(ren) (below 2.5 ft) can enter for free!"));
        assert!(reply.contains("- Gold Ticket: Rs 499.00"));
        assert!(reply.ends_with(CLOSING));
        assert_eq!(state.active_intent, Some(FlowState::TicketSuggestionProvided));
    }

    #[test]
    fn test_children_not_free_get_diamond() {
        let mut state = state_with(Some(Party::Family), 1, 2);
        state.slots.children_free = Some(false);
        let reply = compose_recommendation(&mut state, &catalog());
        assert!(reply.contains("- For 2 child(ren), we recommend Diamond Tickets."));
        assert!(!reply.contains("can enter for free"));
    }

    #[test]
    fn test_unknown_tiers_are_not_priced() {
        let mut state = state_with(Some(Party::friends()), 3, 0);
        let reply = compose_recommendation(&mut state, &catalog());
        assert!(reply.contains("- Silver Ticket: Rs 299.00"));
        assert!(reply.contains("- Diamond Ticket: Rs 899.00"));
        assert!(!reply.contains("VIP"));
    }

    #[test]
    fn test_empty_catalog_skips_price_block() {
        let mut state = state_with(Some(Party::friends()), 3, 0);
        let reply = compose_recommendation(&mut state, &[]);
        assert!(!reply.contains("Ticket Price Examples"));
        assert!(reply.contains("Food stalls nearby"));
        assert_eq!(state.active_intent, Some(FlowState::TicketSuggestionProvided));
    }

    #[test]
    fn test_solo_defaults_to_one_adult() {
        let mut state = state_with(
            Some(Party::Solo {
                preferred_pass: Some(PassTier::Gold),
            }),
            0,
            0,
        );
        let reply = compose_recommendation(&mut state, &catalog());
        assert!(reply.contains("- For 1 adult(s), we recommend Gold Tickets."));
    }

    #[test]
    fn test_rescue_count_from_last_utterance() {
        let mut state = state_with(Some(Party::Family), 0, 0);
        state.slots.last_user_utterance = Some("we are 4".to_string());
        let reply = compose_recommendation(&mut state, &catalog());
        assert!(reply.contains("- For 4 adult(s), we recommend Gold Tickets."));
    }

    #[test]
    fn test_no_group_and_no_counts_asks_group_size() {
        let mut state = state_with(None, 0, 0);
        state.active_intent = Some(FlowState::GroupDetailsUpdated);
        let reply = compose_recommendation(&mut state, &catalog());
        assert_eq!(reply, ASK_GROUP_SIZE);
        assert_eq!(state.active_intent, Some(FlowState::GroupDetailsUpdated));
    }

    #[test]
    fn test_rescue_ignored_without_group() {
        let mut state = state_with(None, 0, 0);
        state.slots.last_user_utterance = Some("5 of us".to_string());
        assert_eq!(compose_recommendation(&mut state, &catalog()), ASK_GROUP_SIZE);
    }

    // =========================================================================
    // Ride summary
    // =========================================================================

    #[test]
    fn test_summarize_rides_groups_by_category() {
        let rides = vec![
            Ride::new("Sky Drop", "", "THRILL"),
            Ride::new("Magic Train", "", "KIDS"),
            Ride::new("Fire Loop", "", "THRILL"),
        ];
        let summary = summarize_rides(&rides);
        assert_eq!(
            summary,
            "We have 3 exciting rides at our amusement park across several categories:\n\n\
             Thrill Rides: Sky Drop, Fire Loop.\n\
             Kids Rides: Magic Train."
        );
    }

    #[test]
    fn test_summarize_empty_catalog() {
        assert_eq!(summarize_rides(&[]), NO_RIDE_INFO);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("THEMED"), "Themed");
        assert_eq!(capitalize("family"), "Family");
        assert_eq!(capitalize(""), "");
    }
}
