//! First-run catalog seeding.
//!
//! Each catalog is seeded independently, and only when it has no rows.

use tracing::info;

use parkbot_core::error::Result;
use parkbot_core::types::{Ride, TicketType};

use crate::repository::{RideRepository, TicketTypeRepository};

const DEFAULT_RIDES: &[(&str, &str, &str)] = &[
    ("The Thunderbolt", "A high-speed roller coaster with loops, steep drops, and adrenaline-pumping turns.", "THRILL"),
    ("Sky Drop", "Experience a sudden vertical drop from great height. Not for the faint of heart!", "THRILL"),
    ("Vortex Spinner", "A spinning coaster that twists you through a vortex of fun and fear.", "THRILL"),
    ("Storm Surge", "A rapid water rafting adventure through wild artificial rapids.", "THRILL"),
    ("Fire Loop", "A looping inverted coaster with flame-themed decor and wild inversions.", "THRILL"),
    ("Fantasy Carousel", "A magical merry-go-round ride with beautifully designed horses and music.", "FAMILY"),
    ("Jungle Safari Ride", "Ride through an artificial jungle filled with lifelike animal animatronics.", "FAMILY"),
    ("Adventure Boat", "A relaxing water ride that sails through miniature islands and waterfalls.", "FAMILY"),
    ("Haunted Mansion", "Explore spooky corridors and ghostly effects in this family-safe scary house.", "FAMILY"),
    ("Bumper Cars", "Classic fun for everyone. Bump into your friends and family!", "FAMILY"),
    ("Mini Ferris Wheel", "A kid-sized ferris wheel with a gentle height and colorful lights.", "KIDS"),
    ("Buggy Track", "Mini cars on a closed track that kids can drive around freely.", "KIDS"),
    ("Tiny Flyers", "Small flying swings perfect for young adventurers who want to soar.", "KIDS"),
    ("Magic Train", "A mini train that takes kids through magical tunnels and fairy tale lands.", "KIDS"),
    ("Ball Pit Zone", "A huge area filled with soft colorful balls and slides.", "KIDS"),
    ("Park Express Monorail", "Ride above the park with a full scenic view of attractions and zones.", "THEMED"),
    ("Sky Gliders", "Soar slowly over the park like a bird with suspended chair lifts.", "THEMED"),
    ("Lazy River", "Float along a peaceful water stream in an inflatable tube.", "THEMED"),
    ("4D Adventure Theater", "Enjoy immersive animated stories with motion chairs and real effects.", "THEMED"),
    ("Glow Tunnel Walk", "A walk-through tunnel with glowing lights, mirrors, and illusions.", "THEMED"),
];

/// (name, ride limit, price in rupees)
const DEFAULT_TICKETS: &[(&str, u32, f64)] = &[
    ("Silver", 3, 299.0),
    ("Gold", 6, 499.0),
    ("Diamond", 12, 899.0),
];

/// The twenty rides the park opens with, in catalog order.
pub fn default_rides() -> Vec<Ride> {
    DEFAULT_RIDES
        .iter()
        .map(|(name, description, category)| Ride::new(*name, *description, *category))
        .collect()
}

/// Silver, Gold and Diamond passes. Children ride free on all three.
pub fn default_ticket_types() -> Vec<TicketType> {
    DEFAULT_TICKETS
        .iter()
        .map(|(name, ride_limit, price)| {
            TicketType::new(
                *name,
                format!("Amusement park entry fee with {} rides", ride_limit),
                *ride_limit,
                *price,
                true,
            )
        })
        .collect()
}

/// Number of rows written by [`seed_if_empty`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub rides: usize,
    pub ticket_types: usize,
}

/// Populate the default catalog into whichever tables are empty.
pub fn seed_if_empty(rides: &RideRepository, tickets: &TicketTypeRepository) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if rides.count()? == 0 {
        for ride in default_rides() {
            rides.save(&ride)?;
            report.rides += 1;
        }
        info!(count = report.rides, "Seeded default rides");
    }

    if tickets.count()? == 0 {
        for ticket in default_ticket_types() {
            tickets.save(&ticket)?;
            report.ticket_types += 1;
        }
        info!(count = report.ticket_types, "Seeded default ticket types");
    }

    Ok(report)
}
