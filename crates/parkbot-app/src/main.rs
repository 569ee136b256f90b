//! Parkbot application binary - composition root.
//!
//! 1. Parse CLI arguments and start logging
//! 2. Load configuration from TOML, then apply its log level
//! 3. Open the stores (SQLite or in-memory) and seed the catalog
//! 4. Run the requested command: an interactive chat, history or catalog
//!    listings

mod cli;
mod park;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use parkbot_chat::ChatError;
use parkbot_core::config::ParkbotConfig;
use parkbot_core::types::{ChatMessage, TicketType};
use uuid::Uuid;

use cli::{CliArgs, Command};
use park::Park;

/// Lines that end an interactive chat without being sent as a turn.
const QUIT_COMMANDS: &[&str] = &["/quit", "/exit"];

fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the stderr subscriber. The returned handle swaps the level once
/// the config file has been read.
fn init_tracing(level: &str) -> reload::Handle<EnvFilter, Registry> {
    let (filter, handle) = reload::Layer::new(log_filter(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

/// Read lines from stdin and run each one as a turn for `user`.
///
/// Turns run on the blocking pool since the stores are synchronous.
async fn chat_loop(park: Arc<Park>, user: String) -> Result<(), Box<dyn std::error::Error>> {
    println!("Chatting as '{}'. Type /quit to leave.", user);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim().to_string();
        if text.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&text.as_str()) {
            break;
        }

        let park_turn = Arc::clone(&park);
        let user_turn = user.clone();
        let result =
            tokio::task::spawn_blocking(move || park_turn.orchestrator.handle_turn(&user_turn, &text))
                .await?;

        match result {
            Ok(reply) => println!("parkbot> {}\n", reply),
            Err(ChatError::Storage(e)) => {
                tracing::error!(error = %e, "Turn failed");
                return Err(ChatError::Storage(e).into());
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    tracing::info!(user = %user, "Chat ended");
    Ok(())
}

fn print_messages(messages: &[ChatMessage]) {
    if messages.is_empty() {
        println!("No messages.");
        return;
    }
    for message in messages {
        println!(
            "[{}] {}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M:%S"),
            message.sender,
            message.text
        );
    }
}

fn print_rides(park: &Park, category: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let groups = park.ride_groups(category)?;
    if groups.is_empty() {
        println!("No rides found.");
        return Ok(());
    }
    for (category, rides) in groups {
        println!("{} ({})", category, rides.len());
        for ride in rides {
            println!("  {:<20} {}", ride.name, ride.description);
        }
    }
    Ok(())
}

fn print_ticket(ticket: &TicketType) {
    let children = if ticket.free_for_children {
        ", free for children under 2.5 ft"
    } else {
        ""
    };
    println!(
        "{:<8} Rs {:>8.2}  {} rides{}  [{}]",
        ticket.name, ticket.price, ticket.ride_limit, children, ticket.id
    );
}

fn print_tickets(park: &Park, id: Option<Uuid>) -> Result<(), Box<dyn std::error::Error>> {
    let tickets = match id {
        Some(id) => park.ticket(id)?.into_iter().collect(),
        None => park.ticket_types()?,
    };
    if tickets.is_empty() {
        println!("No ticket types found.");
        return Ok(());
    }
    for ticket in &tickets {
        print_ticket(ticket);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing, at the flag or env level until the config is read.
    let log_handle = init_tracing(&args.resolve_log_level("info"));
    tracing::info!("Starting Parkbot v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = ParkbotConfig::load_or_default(&config_file);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if args.in_memory {
        config.storage.in_memory = true;
    }
    log_handle.reload(log_filter(&args.resolve_log_level(&config.general.log_level)))?;

    // Storage.
    let park = Arc::new(Park::open(&config)?);

    match args.command() {
        Command::Chat { user } => chat_loop(park, user).await?,
        Command::History { user, recent } => {
            let messages = if recent {
                park.orchestrator.recent(&user)?
            } else {
                park.orchestrator.history(&user)?
            };
            print_messages(&messages);
        }
        Command::Rides { category } => print_rides(&park, category.as_deref())?,
        Command::Tickets { id } => print_tickets(&park, id)?,
    }

    Ok(())
}
