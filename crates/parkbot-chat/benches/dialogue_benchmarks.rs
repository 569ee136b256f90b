//! Benchmarks for utterance classification and full dialogue turns.
//!
//! Classification runs on every turn before any rule fires, so it should
//! stay well under a millisecond. The turn benchmarks use the in-memory
//! stores to keep SQLite out of the measurement.

use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use parkbot_chat::{Dialogue, Signals, TurnOrchestrator};
use parkbot_core::config::ChatConfig;
use parkbot_core::types::ConversationState;
use parkbot_storage::{InMemoryCatalog, InMemoryConversations, InMemoryMessages};

const UTTERANCES: &[&str] = &[
    "hi",
    "I want to buy a ticket for my family",
    "2 adults and 1 child",
    "yes",
    "what rides do you have?",
    "where can we get lunch",
    "what time do you open",
    "thanks, see you",
    "we are coming with a few friends, all adults, 4 of them",
    "Hmm, not sure what I want yet",
];

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("single_utterance", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let signals = Signals::classify(UTTERANCES[idx % UTTERANCES.len()]);
            idx += 1;
            signals
        });
    });

    group.bench_function("all_utterances", |b| {
        b.iter(|| {
            UTTERANCES
                .iter()
                .map(|u| Signals::classify(u))
                .collect::<Vec<_>>()
        });
    });

    group.finish();
}

fn bench_turns(c: &mut Criterion) {
    let catalog = Arc::new(InMemoryCatalog::with_defaults());
    let dialogue = Dialogue::new(catalog.clone(), catalog.clone());

    let mut group = c.benchmark_group("turns");

    // A full family booking, from greeting to recommendation.
    group.bench_function("family_booking_dialogue", |b| {
        b.iter(|| {
            let mut state = ConversationState::new("bench");
            ["hi", "tickets for my family", "2 adults and 1 child", "yes"]
                .iter()
                .map(|text| dialogue.respond(&mut state, text).unwrap())
                .last()
        });
    });

    group.bench_function("ride_summary", |b| {
        let mut state = ConversationState::new("bench");
        b.iter(|| dialogue.respond(&mut state, "what rides are there").unwrap());
    });

    // Same booking through the orchestrator, including state and message
    // persistence.
    let orchestrator = TurnOrchestrator::new(
        &ChatConfig::default(),
        Arc::new(InMemoryConversations::new()),
        Arc::new(InMemoryMessages::new()),
        catalog.clone(),
        catalog,
    );
    group.bench_function("family_booking_orchestrated", |b| {
        let mut n = 0usize;
        b.iter(|| {
            let user = format!("bench-{}", n);
            n += 1;
            for text in ["hi", "tickets for my family", "2 adults and 1 child", "yes"] {
                orchestrator.handle_turn(&user, text).unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_classification, bench_turns);
criterion_main!(benches);
