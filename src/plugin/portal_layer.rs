//! Logic for handling portals being built and destroyed in the world and for keeping the
//! portal file in sync with the [PortalRegistry]
//!

use bevy::prelude::*;

use crate::prelude::*;

/// The host's world, inserted by the embedding app before the plugin starts
#[derive(Resource)]
pub struct HostBlockStore(
	/// Host implementation of the block queries
	Box<dyn BlockStore + Send + Sync>,
);

impl HostBlockStore {
	/// Create a new instance of [HostBlockStore]
	pub fn new(store: impl BlockStore + Send + Sync + 'static) -> Self {
		HostBlockStore(Box::new(store))
	}
	pub fn get(&self) -> &(dyn BlockStore + Send + Sync) {
		self.0.as_ref()
	}
}

/// Used to register a newly built portal
#[derive(Event)]
pub struct EventRegisterPortal(
	/// Unlinked portal to add
	Portal,
);

impl EventRegisterPortal {
	/// Create a new instance of [EventRegisterPortal]
	pub fn new(portal: Portal) -> Self {
		EventRegisterPortal(portal)
	}
	pub fn get(&self) -> &Portal {
		&self.0
	}
}

/// Used to remove the portal anchored at a location
#[derive(Event)]
pub struct EventDeregisterPortal(
	/// Anchor of the portal to remove
	BlockLocation,
);

impl EventDeregisterPortal {
	/// Create a new instance of [EventDeregisterPortal]
	pub fn new(location: BlockLocation) -> Self {
		EventDeregisterPortal(location)
	}
	pub fn get(&self) -> &BlockLocation {
		&self.0
	}
}

/// Used to write the portal file on demand
#[derive(Event, Default)]
pub struct EventSavePortals;

/// Populate the [PortalRegistry] from the portal file
#[cfg(not(tarpaulin_include))]
pub fn load_portals(
	config: Res<PortalsConfig>,
	host: Option<Res<HostBlockStore>>,
	mut registry: ResMut<PortalRegistry>,
) {
	let Some(host) = host else {
		error!("No HostBlockStore resource, portals cannot be loaded");
		return;
	};
	let store = config.get_store();
	match store.load(host.get(), &mut registry) {
		Ok(report) => {
			for warning in report.warnings.iter() {
				warn!("{}", warning);
			}
			info!(
				"Loaded {} portals from {}",
				report.loaded,
				store.get_file_path().display()
			);
		}
		Err(e) => error!("Failed loading portals: {}", e),
	}
}

/// Read [EventRegisterPortal] and add the portals to the [PortalRegistry]
#[cfg(not(tarpaulin_include))]
pub fn process_portal_registrations(
	mut events: EventReader<EventRegisterPortal>,
	mut registry: ResMut<PortalRegistry>,
) {
	for event in events.read() {
		if let Err(e) = registry.register(event.get().clone()) {
			warn!("Portal not registered: {}", e);
		}
	}
}

/// Read [EventDeregisterPortal] and drop the portals from the [PortalRegistry]
#[cfg(not(tarpaulin_include))]
pub fn process_portal_removals(
	mut events: EventReader<EventDeregisterPortal>,
	mut registry: ResMut<PortalRegistry>,
) {
	for event in events.read() {
		if registry.deregister(event.get()).is_none() {
			debug!("No portal to deregister at {}", event.get());
		}
	}
}

/// Write the portal file once per frame no matter how many [EventSavePortals] were sent
#[cfg(not(tarpaulin_include))]
pub fn save_on_request(
	mut events: EventReader<EventSavePortals>,
	config: Res<PortalsConfig>,
	registry: Res<PortalRegistry>,
) {
	if events.read().count() > 0 {
		save(&config, &registry);
	}
}

/// Write the portal file when the app is shutting down
#[cfg(not(tarpaulin_include))]
pub fn save_on_exit(
	mut exits: EventReader<AppExit>,
	config: Res<PortalsConfig>,
	registry: Res<PortalRegistry>,
) {
	if exits.read().count() > 0 && config.get_save_on_exit() {
		save(&config, &registry);
	}
}

/// Save and log the outcome, a failure leaves the registry as it is
fn save(config: &PortalsConfig, registry: &PortalRegistry) {
	let store = config.get_store();
	match store.save(registry) {
		Ok(count) => info!("Saved {} portals to {}", count, store.get_file_path().display()),
		Err(e) => error!("Failed saving portals: {}", e),
	}
}
