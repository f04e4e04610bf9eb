use std::sync::Arc;

use weddingdesk_core::InMemoryEntityStore;
use weddingdesk_guests::{Guest, GuestDirectory, GuestImporter, Household, ImportOptions};
use weddingdesk_invitations::InvitationBook;
use weddingdesk_participants::ParticipantRoster;
use weddingdesk_vendors::VendorRegistry;

use crate::config::WeddingDeskConfig;

type InMemoryImporter = GuestImporter<InMemoryEntityStore<Household>, InMemoryEntityStore<Guest>>;

/// All module services of one process, backed by in-memory stores.
///
/// Every service is `Send + Sync`; share the desk itself through an `Arc`.
#[derive(Debug)]
pub struct WeddingDesk {
    guests: Arc<GuestDirectory>,
    importer: InMemoryImporter,
    invitations: InvitationBook,
    vendors: VendorRegistry,
    participants: ParticipantRoster,
}

impl WeddingDesk {
    pub fn new(config: &WeddingDeskConfig) -> Self {
        Self::with_import_options(config.import)
    }

    pub fn with_import_options(options: ImportOptions) -> Self {
        let guests = Arc::new(GuestDirectory::in_memory());
        tracing::debug!(delimiter = ?options.delimiter, "wedding desk services created");

        Self {
            importer: GuestImporter::with_options(guests.clone(), options),
            guests,
            invitations: InvitationBook::in_memory(),
            vendors: VendorRegistry::in_memory(),
            participants: ParticipantRoster::in_memory(),
        }
    }

    pub fn guests(&self) -> &GuestDirectory {
        &self.guests
    }

    pub fn importer(&self) -> &InMemoryImporter {
        &self.importer
    }

    pub fn invitations(&self) -> &InvitationBook {
        &self.invitations
    }

    pub fn vendors(&self) -> &VendorRegistry {
        &self.vendors
    }

    pub fn participants(&self) -> &ParticipantRoster {
        &self.participants
    }
}

impl Default for WeddingDesk {
    fn default() -> Self {
        Self::with_import_options(ImportOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use weddingdesk_core::WeddingId;

    use super::*;

    #[test]
    fn importer_writes_into_the_shared_directory() {
        let desk = WeddingDesk::default();
        let wedding = WeddingId::new("w1");

        let summary = desk
            .importer()
            .import(&wedding, "first_name,last_name\nAmal,Perera\n")
            .unwrap();

        assert_eq!(summary.guests_created, 1);
        assert_eq!(desk.guests().list_guests(&wedding).len(), 1);
    }

    #[test]
    fn import_options_come_from_config() {
        let config = WeddingDeskConfig {
            import: ImportOptions { delimiter: ';' },
            ..WeddingDeskConfig::default()
        };
        let desk = WeddingDesk::new(&config);
        assert_eq!(desk.importer().options().delimiter, ';');
    }

    #[test]
    fn desk_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WeddingDesk>();
    }
}
