//! The host server owns the world. The portals only ever ask it three things, captured by
//! the [BlockStore] trait: whether a world exists, what kind of block sits at a location and
//! which blocks a portal anchored at a location takes up.
//!

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::portals::{
	location::{BlockLocation, WorldId},
	portal::PortalColor,
};

/// The kinds of block the portals care about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BlockKind {
	#[default]
	Air,
	/// The marker a portal is anchored on
	WallSign,
	/// Colored building block of a portal frame
	Wool(PortalColor),
	Other,
}

/// Read access to the host's worlds
pub trait BlockStore {
	/// Resolve a world by name
	fn world_by_name(&self, name: &str) -> Option<WorldId>;
	/// Kind of block at `location`
	fn block_kind_at(&self, location: &BlockLocation) -> BlockKind;
	/// Footprint of a portal anchored at `anchor`
	fn occupied_locations(&self, anchor: &BlockLocation) -> Vec<BlockLocation>;
}

/// A [BlockStore] kept in memory, useful for tests and for hosts that mirror their world
#[derive(Clone, Debug, Default)]
pub struct MemoryBlockStore {
	/// Worlds known by name
	worlds: BTreeSet<String>,
	/// Any block not present is [BlockKind::Air]
	blocks: BTreeMap<BlockLocation, BlockKind>,
	/// Portal footprints keyed by anchor
	footprints: HashMap<BlockLocation, Vec<BlockLocation>>,
}

impl MemoryBlockStore {
	/// Create a new instance of [MemoryBlockStore] knowing the given worlds
	pub fn new<I, S>(worlds: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		MemoryBlockStore {
			worlds: worlds.into_iter().map(Into::into).collect(),
			..Default::default()
		}
	}
	pub fn add_world(&mut self, name: impl Into<String>) {
		self.worlds.insert(name.into());
	}
	/// Place a block, [BlockKind::Air] clears it
	pub fn set_block(&mut self, location: BlockLocation, kind: BlockKind) {
		if kind == BlockKind::Air {
			self.blocks.remove(&location);
		} else {
			self.blocks.insert(location, kind);
		}
	}
	/// Record the blocks a portal anchored at `anchor` takes up
	pub fn set_footprint(&mut self, anchor: BlockLocation, occupied: Vec<BlockLocation>) {
		self.footprints.insert(anchor, occupied);
	}
}

impl BlockStore for MemoryBlockStore {
	fn world_by_name(&self, name: &str) -> Option<WorldId> {
		self.worlds.get(name).map(|n| WorldId::new(n.as_str()))
	}
	fn block_kind_at(&self, location: &BlockLocation) -> BlockKind {
		self.blocks.get(location).copied().unwrap_or_default()
	}
	fn occupied_locations(&self, anchor: &BlockLocation) -> Vec<BlockLocation> {
		self.footprints.get(anchor).cloned().unwrap_or_default()
	}
}
