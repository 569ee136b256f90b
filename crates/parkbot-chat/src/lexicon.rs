//! Lexical matcher.
//!
//! Turns a raw utterance into a [`Signals`] value: one boolean per topic
//! plus the group type and pass tier it names, if any. Matching is
//! case-insensitive on word boundaries and has no side effects.

use regex::Regex;
use std::sync::LazyLock;

use parkbot_core::types::{GroupType, PassTier};

// =============================================================================
// Compiled patterns (compiled once, reused across calls)
// =============================================================================

struct TopicPatterns {
    greeting: Regex,
    ticket: Regex,
    ride: Regex,
    food: Regex,
    time: Regex,
    affirm: Regex,
    negate: Regex,
    thanks: Regex,
    farewell: Regex,
}

static TOPIC_PATTERNS: LazyLock<TopicPatterns> = LazyLock::new(|| {
    let mk = |p: &str| Regex::new(p).expect("Invalid topic regex");

    TopicPatterns {
        greeting: mk(r"(?i)\b(?:hello|hi|hey|good\s+morning|good\s+evening)\b"),
        ticket: mk(r"(?i)\b(?:tickets?|buy|purchase|entry|pass(?:es)?|bookings?)\b"),
        ride: mk(r"(?i)\b(?:rides?|rollercoasters?|attractions?|thrill)\b"),
        food: mk(r"(?i)\b(?:food|eat|restaurants?|snacks?|lunch|dinner|meals?)\b"),
        time: mk(r"(?i)\b(?:time|timings?|open|closing|hours)\b"),
        affirm: mk(r"(?i)\b(?:yes|yeah|yep)\b"),
        negate: mk(r"(?i)\b(?:no|nope)\b"),
        thanks: mk(r"(?i)\b(?:thanks|thank\s+you)\b"),
        farewell: mk(r"(?i)\b(?:bye|goodbye|see\s+you)\b"),
    }
});

// Checked in this order; the first group that matches wins.
static GROUP_PATTERNS: LazyLock<Vec<(GroupType, Regex)>> = LazyLock::new(|| {
    vec![
        (
            GroupType::Friends,
            Regex::new(r"(?i)\bfriend").expect("Invalid group regex"),
        ),
        (
            GroupType::Family,
            Regex::new(r"(?i)\bfamil(?:y|ies)\b").expect("Invalid group regex"),
        ),
        (
            GroupType::Solo,
            Regex::new(r"(?i)\b(?:alone|myself|just\s+me|solo)\b").expect("Invalid group regex"),
        ),
    ]
});

static TIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(silver|gold|diamond)\b").expect("Invalid tier regex"));

// =============================================================================
// Signals
// =============================================================================

/// Topic signals detected in one utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub greeting: bool,
    pub ticket: bool,
    pub ride: bool,
    pub food: bool,
    pub time: bool,
    pub affirm: bool,
    pub negate: bool,
    pub thanks: bool,
    pub farewell: bool,
    pub group: Option<GroupType>,
    pub tier: Option<PassTier>,
}

impl Signals {
    /// Classify an utterance.
    pub fn classify(text: &str) -> Self {
        let p = &*TOPIC_PATTERNS;
        Self {
            greeting: p.greeting.is_match(text),
            ticket: p.ticket.is_match(text),
            ride: p.ride.is_match(text),
            food: p.food.is_match(text),
            time: p.time.is_match(text),
            affirm: p.affirm.is_match(text),
            negate: p.negate.is_match(text),
            thanks: p.thanks.is_match(text),
            farewell: p.farewell.is_match(text),
            group: detect_group(text),
            tier: detect_tier(text),
        }
    }

    /// Yes/no answer, with "yes" taking precedence when both appear.
    pub fn yes_no(&self) -> Option<bool> {
        if self.affirm {
            Some(true)
        } else if self.negate {
            Some(false)
        } else {
            None
        }
    }
}

fn detect_group(text: &str) -> Option<GroupType> {
    GROUP_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(group, _)| *group)
}

fn detect_tier(text: &str) -> Option<PassTier> {
    TIER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Topic signals
    // =========================================================================

    #[test]
    fn test_greeting_words() {
        for text in ["hi", "Hello there", "HEY!", "good morning", "Good  evening folks"] {
            assert!(Signals::classify(text).greeting, "expected greeting: {}", text);
        }
    }

    #[test]
    fn test_greeting_requires_word_boundary() {
        assert!(!Signals::classify("this is a thing").greeting);
        assert!(!Signals::classify("which ride").greeting);
        assert!(!Signals::classify("they went home").greeting);
    }

    #[test]
    fn test_ticket_words() {
        assert!(Signals::classify("I want to buy a ticket").ticket);
        assert!(Signals::classify("two tickets please").ticket);
        assert!(Signals::classify("how much is entry").ticket);
        assert!(Signals::classify("day pass").ticket);
        assert!(!Signals::classify("passenger info").ticket);
    }

    #[test]
    fn test_ride_food_time_words() {
        let rides = Signals::classify("what rides do you have");
        assert!(rides.ride && !rides.food && !rides.time);

        let food = Signals::classify("where can we eat lunch");
        assert!(food.food && !food.ride);

        let time = Signals::classify("what are the opening hours");
        assert!(time.time);
        assert!(!Signals::classify("sometimes").time);
    }

    #[test]
    fn test_thanks_and_farewell() {
        assert!(Signals::classify("thanks a lot").thanks);
        assert!(Signals::classify("Thank you!").thanks);
        assert!(!Signals::classify("thankful").thanks);

        assert!(Signals::classify("bye").farewell);
        assert!(Signals::classify("goodbye now").farewell);
        assert!(Signals::classify("see you later").farewell);
        assert!(!Signals::classify("bypass").farewell);
    }

    // =========================================================================
    // Yes / no
    // =========================================================================

    #[test]
    fn test_yes_no() {
        assert_eq!(Signals::classify("yes they are").yes_no(), Some(true));
        assert_eq!(Signals::classify("yeah").yes_no(), Some(true));
        assert_eq!(Signals::classify("Nope").yes_no(), Some(false));
        assert_eq!(Signals::classify("no").yes_no(), Some(false));
        assert_eq!(Signals::classify("maybe").yes_no(), None);
    }

    #[test]
    fn test_negation_needs_whole_word() {
        assert_eq!(Signals::classify("not sure").yes_no(), None);
        assert_eq!(Signals::classify("I know").yes_no(), None);
        assert_eq!(Signals::classify("nothing").yes_no(), None);
    }

    #[test]
    fn test_yes_wins_over_no() {
        assert_eq!(Signals::classify("yes, no kids").yes_no(), Some(true));
    }

    // =========================================================================
    // Group type and tier
    // =========================================================================

    #[test]
    fn test_group_detection() {
        assert_eq!(
            Signals::classify("with my friends").group,
            Some(GroupType::Friends)
        );
        assert_eq!(
            Signals::classify("a friend and me").group,
            Some(GroupType::Friends)
        );
        assert_eq!(
            Signals::classify("for my family").group,
            Some(GroupType::Family)
        );
        assert_eq!(Signals::classify("just me").group, Some(GroupType::Solo));
        assert_eq!(Signals::classify("I'm going alone").group, Some(GroupType::Solo));
        assert_eq!(Signals::classify("by myself").group, Some(GroupType::Solo));
        assert_eq!(Signals::classify("two of us").group, None);
    }

    #[test]
    fn test_group_priority_friends_first() {
        assert_eq!(
            Signals::classify("family and friends").group,
            Some(GroupType::Friends)
        );
    }

    #[test]
    fn test_group_requires_word_start() {
        assert_eq!(Signals::classify("unfriendly").group, None);
        assert_eq!(Signals::classify("console").group, None);
    }

    #[test]
    fn test_tier_detection() {
        assert_eq!(Signals::classify("the GOLD one").tier, Some(PassTier::Gold));
        assert_eq!(
            Signals::classify("diamond or silver").tier,
            Some(PassTier::Diamond)
        );
        assert_eq!(Signals::classify("goldfish").tier, None);
    }

    #[test]
    fn test_classify_is_pure() {
        let a = Signals::classify("hi, tickets for my family");
        let b = Signals::classify("hi, tickets for my family");
        assert_eq!(a, b);
        assert!(a.greeting && a.ticket);
        assert_eq!(a.group, Some(GroupType::Family));
    }

    #[test]
    fn test_empty_utterance() {
        assert_eq!(Signals::classify(""), Signals::default());
    }
}
