//! Defines the Bevy [Plugin] for ColorPortals
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod config;
pub mod portal_layer;

/// Orders the plugin systems so the portal file is written after the frame's registry changes
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Portals being built and destroyed
	Registry,
	/// Writing the portal file
	Persist,
}

/// Keeps a [PortalRegistry] of the portals in the world, loaded on start up and saved on
/// request and on exit. The app must insert a [portal_layer::HostBlockStore] for the portal
/// file to be loaded
#[derive(Default)]
pub struct ColorPortalsPlugin {
	/// Inserted as a resource when the plugin is built
	config: PortalsConfig,
}

impl ColorPortalsPlugin {
	/// Create a new instance of [ColorPortalsPlugin]
	pub fn new(config: PortalsConfig) -> Self {
		ColorPortalsPlugin { config }
	}
}

impl Plugin for ColorPortalsPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.insert_resource(self.config.clone())
			.init_resource::<PortalRegistry>()
			.add_event::<portal_layer::EventRegisterPortal>()
			.add_event::<portal_layer::EventDeregisterPortal>()
			.add_event::<portal_layer::EventSavePortals>()
			.configure_sets(Update, (OrderingSet::Registry, OrderingSet::Persist).chain())
			.add_systems(Startup, portal_layer::load_portals)
			.add_systems(
				Update,
				(
					(
						portal_layer::process_portal_registrations,
						portal_layer::process_portal_removals,
					)
						.chain()
						.in_set(OrderingSet::Registry),
					portal_layer::save_on_request.in_set(OrderingSet::Persist),
				),
			)
			.add_systems(Last, portal_layer::save_on_exit);
	}
}
