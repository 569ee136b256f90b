//! Service wiring: opens the configured stores, seeds the catalog and builds
//! the turn orchestrator on top of them.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use parkbot_chat::TurnOrchestrator;
use parkbot_core::config::ParkbotConfig;
use parkbot_core::store::{ConversationStore, MessageStore, RideCatalog, TicketCatalog};
use parkbot_core::types::{Ride, TicketType};
use parkbot_storage::{
    seed_if_empty, ConversationRepository, Database, InMemoryCatalog, InMemoryConversations,
    InMemoryMessages, MessageRepository, RideRepository, TicketTypeRepository,
};

/// Everything the commands need, wired to either SQLite or memory.
pub struct Park {
    pub orchestrator: TurnOrchestrator,
    pub rides: Arc<dyn RideCatalog>,
    pub tickets: Arc<dyn TicketCatalog>,
}

/// The four collaborators behind the orchestrator and the catalog commands.
struct Stores {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    rides: Arc<dyn RideCatalog>,
    tickets: Arc<dyn TicketCatalog>,
}

fn memory_stores(config: &ParkbotConfig) -> Stores {
    let catalog = Arc::new(if config.catalog.seed_on_empty {
        InMemoryCatalog::with_defaults()
    } else {
        InMemoryCatalog::default()
    });
    info!("Using in-memory stores");
    Stores {
        conversations: Arc::new(InMemoryConversations::new()),
        messages: Arc::new(InMemoryMessages::new()),
        rides: catalog.clone(),
        tickets: catalog,
    }
}

fn sqlite_stores(config: &ParkbotConfig) -> parkbot_core::Result<Stores> {
    let db = Arc::new(Database::new(&config.database_path())?);
    let rides = Arc::new(RideRepository::new(Arc::clone(&db)));
    let tickets = Arc::new(TicketTypeRepository::new(Arc::clone(&db)));
    if config.catalog.seed_on_empty {
        seed_if_empty(&rides, &tickets)?;
    }
    let conversations = Arc::new(ConversationRepository::new(Arc::clone(&db)));
    info!(conversations = conversations.count()?, "SQLite stores ready");
    Ok(Stores {
        conversations,
        messages: Arc::new(MessageRepository::new(db)),
        rides,
        tickets,
    })
}

impl Park {
    /// Open the stores described by `config`.
    pub fn open(config: &ParkbotConfig) -> parkbot_core::Result<Self> {
        let stores = if config.storage.in_memory {
            memory_stores(config)
        } else {
            sqlite_stores(config)?
        };

        let orchestrator = TurnOrchestrator::new(
            &config.chat,
            stores.conversations,
            stores.messages,
            Arc::clone(&stores.rides),
            Arc::clone(&stores.tickets),
        );
        Ok(Self {
            orchestrator,
            rides: stores.rides,
            tickets: stores.tickets,
        })
    }

    /// Rides grouped by category in catalog order. A category filter goes
    /// to the catalog's own query.
    pub fn ride_groups(
        &self,
        category: Option<&str>,
    ) -> parkbot_core::Result<Vec<(String, Vec<Ride>)>> {
        let rides = match category {
            Some(category) => self.rides.rides_by_category(category)?,
            None => self.rides.list_all()?,
        };

        let mut groups: Vec<(String, Vec<Ride>)> = Vec::new();
        for ride in rides {
            match groups.iter_mut().find(|(c, _)| *c == ride.category) {
                Some((_, rides)) => rides.push(ride),
                None => groups.push((ride.category.clone(), vec![ride])),
            }
        }
        Ok(groups)
    }

    pub fn ticket_types(&self) -> parkbot_core::Result<Vec<TicketType>> {
        self.tickets.list_all()
    }

    pub fn ticket(&self, id: Uuid) -> parkbot_core::Result<Option<TicketType>> {
        self.tickets.find_by_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_config(dir: &std::path::Path) -> ParkbotConfig {
        let mut config = ParkbotConfig::default();
        config.general.data_dir = dir.to_string_lossy().to_string();
        config
    }

    fn memory_config() -> ParkbotConfig {
        let mut config = ParkbotConfig::default();
        config.storage.in_memory = true;
        config
    }

    #[test]
    fn test_open_sqlite_seeds_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let config = sqlite_config(dir.path());
        let park = Park::open(&config).unwrap();

        assert!(config.database_path().exists());
        assert_eq!(park.rides.list_all().unwrap().len(), 20);
        assert_eq!(park.ticket_types().unwrap().len(), 3);
    }

    #[test]
    fn test_reopen_does_not_seed_twice() {
        let dir = tempfile::tempdir().unwrap();
        let config = sqlite_config(dir.path());
        drop(Park::open(&config).unwrap());

        let park = Park::open(&config).unwrap();
        assert_eq!(park.rides.list_all().unwrap().len(), 20);
        assert_eq!(park.ticket_types().unwrap().len(), 3);
    }

    #[test]
    fn test_open_without_seeding() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = sqlite_config(dir.path());
        config.catalog.seed_on_empty = false;
        let park = Park::open(&config).unwrap();
        assert!(park.rides.list_all().unwrap().is_empty());
        assert_eq!(
            park.orchestrator.handle_turn("alice", "which rides").unwrap(),
            parkbot_chat::compose::NO_RIDE_INFO
        );
    }

    #[test]
    fn test_open_in_memory() {
        let park = Park::open(&memory_config()).unwrap();
        assert_eq!(park.ticket_types().unwrap().len(), 3);
        park.orchestrator.handle_turn("bob", "hi").unwrap();
        assert_eq!(park.orchestrator.history("bob").unwrap().len(), 2);
    }

    #[test]
    fn test_open_in_memory_unseeded() {
        let mut config = memory_config();
        config.catalog.seed_on_empty = false;
        let park = Park::open(&config).unwrap();
        assert!(park.ticket_types().unwrap().is_empty());
    }

    #[test]
    fn test_ride_groups() {
        let park = Park::open(&memory_config()).unwrap();
        let all = park.ride_groups(None).unwrap();
        let categories: Vec<&str> = all.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(categories, vec!["THRILL", "FAMILY", "KIDS", "THEMED"]);
        assert_eq!(all.iter().map(|(_, r)| r.len()).sum::<usize>(), 20);

        let kids = park.ride_groups(Some("kids")).unwrap();
        assert_eq!(kids.len(), 1);
        assert_eq!(kids[0].0, "KIDS");
        assert!(park.ride_groups(Some("water")).unwrap().is_empty());
    }

    #[test]
    fn test_ride_groups_sqlite_category() {
        let dir = tempfile::tempdir().unwrap();
        let park = Park::open(&sqlite_config(dir.path())).unwrap();
        let thrill = park.ride_groups(Some("Thrill")).unwrap();
        assert_eq!(thrill.len(), 1);
        assert_eq!(thrill[0].0, "THRILL");
        assert_eq!(thrill[0].1.len(), 5);
    }

    /// Serves category queries only; a full listing fails.
    struct CategoryOnly;

    impl RideCatalog for CategoryOnly {
        fn list_all(&self) -> parkbot_core::Result<Vec<Ride>> {
            Err(parkbot_core::ParkbotError::Storage("full listing".into()))
        }

        fn rides_by_category(&self, category: &str) -> parkbot_core::Result<Vec<Ride>> {
            Ok(vec![Ride::new("Sky Drop", "", category.to_uppercase())])
        }
    }

    #[test]
    fn test_category_filter_uses_catalog_query() {
        let catalog = Arc::new(InMemoryCatalog::with_defaults());
        let rides: Arc<dyn RideCatalog> = Arc::new(CategoryOnly);
        let park = Park {
            orchestrator: TurnOrchestrator::new(
                &Default::default(),
                Arc::new(InMemoryConversations::new()),
                Arc::new(InMemoryMessages::new()),
                Arc::clone(&rides),
                catalog.clone(),
            ),
            rides,
            tickets: catalog,
        };

        let groups = park.ride_groups(Some("thrill")).unwrap();
        assert_eq!(groups[0].0, "THRILL");
        assert!(park.ride_groups(None).is_err());
    }

    #[test]
    fn test_ticket_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let park = Park::open(&sqlite_config(dir.path())).unwrap();
        let gold = park
            .ticket_types()
            .unwrap()
            .into_iter()
            .find(|t| t.name == "Gold")
            .unwrap();
        assert_eq!(park.ticket(gold.id).unwrap(), Some(gold));
        assert!(park.ticket(Uuid::new_v4()).unwrap().is_none());
    }
}
