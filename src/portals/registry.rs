//! The [PortalRegistry] owns every live [Portal] keyed by the location of its marker sign.
//!
//! Portals of the same color and channel form a family. Whenever a family gains or loses a
//! member the whole family is relinked as a closed ring in ascending node order, a lone
//! portal links to nothing:
//!
//! ```text
//! family of 1:   A ──> None
//!
//! family of 3:   A(0) ──> B(1) ──> C(2)
//!                 ^                 │
//!                 └─────────────────┘
//! ```
//!
//! Relinking the whole family rather than patching the neighbours of the new portal means
//! a portal built with a node in the middle of its family is threaded in at the right place,
//! and removing a portal closes the gap it leaves behind.

use std::collections::{BTreeSet, HashMap};

use bevy::prelude::*;

use crate::{
	error::PortalError,
	portals::{
		location::BlockLocation,
		portal::{Portal, PortalColor},
		utilities::BlockFace,
		world::{BlockKind, BlockStore},
	},
};

/// How [PortalRegistry::get_by_key_block] treats a key block with several marker signs around it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerScan {
	/// Use the first marker found in [BlockFace::HORIZONTAL] order, even if no portal is
	/// registered on it, ignoring any others
	#[default]
	FirstMatch,
	/// Consider every marker with a registered portal and refuse to pick one when there are several
	RejectAmbiguous,
}

/// Every registered portal keyed by its anchor
#[derive(Resource, Clone, Debug, Default)]
pub struct PortalRegistry {
	/// Portals keyed by the location of their marker sign
	portals: HashMap<BlockLocation, Portal>,
}

impl PortalRegistry {
	/// Number of registered portals
	pub fn len(&self) -> usize {
		self.portals.len()
	}
	pub fn is_empty(&self) -> bool {
		self.portals.is_empty()
	}
	/// Iterate over all portals in no particular order
	pub fn iter(&self) -> impl Iterator<Item = &Portal> {
		self.portals.values()
	}
	/// Drop every portal
	pub fn clear(&mut self) {
		self.portals.clear();
	}
	/// Register a newly built portal and relink its family.
	///
	/// A location can hold only one portal, registering over an existing one is refused and
	/// leaves the registry untouched
	pub fn register(&mut self, portal: Portal) -> Result<(), PortalError> {
		let color = portal.get_color();
		let channel = portal.get_channel();
		self.insert(portal)?;
		self.relink_family(channel, color);
		Ok(())
	}
	/// Register a batch of portals, relinking each affected family once. Portals whose
	/// location is already taken are skipped and returned as errors
	pub fn register_family(&mut self, portals: Vec<Portal>) -> Vec<PortalError> {
		let mut families = BTreeSet::new();
		let mut rejected = Vec::new();
		for portal in portals {
			let key = (portal.get_color(), portal.get_channel());
			match self.insert(portal) {
				Ok(()) => {
					families.insert(key);
				}
				Err(e) => rejected.push(e),
			}
		}
		for (color, channel) in families {
			self.relink_family(channel, color);
		}
		rejected
	}
	/// Remove the portal anchored at `location` and close its family ring around the gap.
	/// Nothing happens if no portal is registered there
	pub fn deregister(&mut self, location: &BlockLocation) -> Option<Portal> {
		let removed = self.portals.remove(location)?;
		self.relink_family(removed.get_channel(), removed.get_color());
		debug!(
			"Deregistered portal {} {} at {}",
			removed.get_color(),
			removed.get_channel_node(),
			location
		);
		Some(removed)
	}
	/// Insert without touching any links
	fn insert(&mut self, portal: Portal) -> Result<(), PortalError> {
		if self.portals.contains_key(portal.get_location()) {
			return Err(PortalError::LocationOccupied(portal.get_location().clone()));
		}
		debug!(
			"Registered portal {} {} at {}",
			portal.get_color(),
			portal.get_channel_node(),
			portal.get_location()
		);
		self.portals.insert(portal.get_location().clone(), portal);
		Ok(())
	}
	/// Thread every member of the `(channel, color)` family into a closed ring in sorted order
	fn relink_family(&mut self, channel: i32, color: PortalColor) {
		let members: Vec<BlockLocation> = self
			.family_of(channel, color)
			.iter()
			.map(|p| p.get_location().clone())
			.collect();
		for (location, link) in ring_links(&members) {
			if let Some(portal) = self.portals.get_mut(&location) {
				portal.set_linked_portal(link);
			}
		}
	}
	/// Get the portal anchored exactly at `location`
	pub fn get(&self, location: &BlockLocation) -> Option<&Portal> {
		self.portals.get(location)
	}
	/// Get the portal a player stepping into the portal at `location` is sent to
	pub fn destination_of(&self, location: &BlockLocation) -> Option<&Portal> {
		let linked = self.get(location)?.get_linked_portal()?;
		self.get(linked)
	}
	/// Find the portal whose frame contains `location`.
	///
	/// A marker sign sits at the top of its frame so the search looks at anchors in the
	/// `3x3` columns around `location`, from its own height up to 3 blocks above it, and
	/// returns the first one whose footprint includes `location`. Anchors that would lie past
	/// the edge of the coordinate range are skipped
	pub fn get_by_occupied_block(&self, location: &BlockLocation) -> Option<&Portal> {
		for x in -1..=1 {
			for y in 0..4 {
				for z in -1..=1 {
					let Some(anchor) = location.offset(x, y, z) else {
						continue;
					};
					if let Some(portal) = self.portals.get(&anchor) {
						if portal.occupies(location) {
							return Some(portal);
						}
					}
				}
			}
		}
		None
	}
	/// Find the portal whose marker sign hangs on `key_block`. The four horizontal neighbours
	/// are inspected for a [BlockKind::WallSign] in [BlockFace::HORIZONTAL] order and `scan`
	/// decides what happens when more than one is found
	pub fn get_by_key_block(
		&self,
		store: &dyn BlockStore,
		key_block: &BlockLocation,
		scan: MarkerScan,
	) -> Result<Option<&Portal>, PortalError> {
		let mut markers = BlockFace::HORIZONTAL
			.iter()
			.filter_map(|face| face.relative(key_block))
			.filter(|location| store.block_kind_at(location) == BlockKind::WallSign);
		match scan {
			MarkerScan::FirstMatch => Ok(markers.next().and_then(|location| self.get(&location))),
			MarkerScan::RejectAmbiguous => {
				let found: Vec<&Portal> = markers.filter_map(|location| self.get(&location)).collect();
				match found.len() {
					0 => Ok(None),
					1 => Ok(Some(found[0])),
					count => Err(PortalError::AmbiguousKeyBlock {
						location: key_block.clone(),
						count,
					}),
				}
			}
		}
	}
	/// Every portal sharing the color and channel of `portal`, sorted, including `portal`
	/// itself when it is registered
	pub fn family(&self, portal: &Portal) -> Vec<&Portal> {
		self.family_of(portal.get_channel(), portal.get_color())
	}
	/// Every portal of the given channel and color sorted by node
	pub fn family_of(&self, channel: i32, color: PortalColor) -> Vec<&Portal> {
		let mut family: Vec<&Portal> = self
			.portals
			.values()
			.filter(|p| p.get_channel() == channel && p.get_color() == color)
			.collect();
		family.sort_by(|a, b| a.order(b));
		family
	}
	/// All portals sorted by `(color, channel, node)`
	pub fn ordered(&self) -> Vec<&Portal> {
		let mut list: Vec<&Portal> = self.portals.values().collect();
		list.sort_by(|a, b| a.order(b));
		list
	}
	/// Follow links from the portal at `start` until the ring closes or breaks. The start
	/// portal is the first element, each portal appears at most once
	pub fn walk_ring(&self, start: &BlockLocation) -> Vec<&Portal> {
		let mut ring = Vec::new();
		let Some(mut current) = self.get(start) else {
			return ring;
		};
		loop {
			ring.push(current);
			let next = current.get_linked_portal().and_then(|l| self.get(l));
			match next {
				Some(portal) if portal.get_location() != start && ring.len() <= self.len() => {
					current = portal;
				}
				_ => break,
			}
		}
		ring
	}
}

/// Links of a family already in ring order: each member points at the next and the last
/// back at the first. A single member points at nothing
pub fn ring_links(members: &[BlockLocation]) -> Vec<(BlockLocation, Option<BlockLocation>)> {
	if members.len() < 2 {
		return members.iter().map(|m| (m.clone(), None)).collect();
	}
	members
		.iter()
		.enumerate()
		.map(|(i, m)| (m.clone(), Some(members[(i + 1) % members.len()].clone())))
		.collect()
}
