//! Serde shape of the portal file.
//!
//! ```yaml
//! portals:
//!   RED:
//!     1-0:
//!       name: Spawn
//!       location: world,10,64,-3
//!       creator: 2f1c0b8e-6d0b-4d4f-9a1e-6a9f3b8c2d11
//! ```
//!
//! Every value is kept as text, and every entry and color decodes on its own, so a single
//! broken entry can be reported and skipped without failing the whole document. Maps keep
//! insertion order, which is the order the entries are read back in.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::IgnoredAny};

/// `channel-node` key to entry
pub type ChannelEntries = IndexMap<String, StoredEntry>;

/// Yielded for a color whose value is not a map of entries
static UNREADABLE_COLOR: StoredEntry = StoredEntry::Invalid(Unreadable);

/// Root of the portal file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalsDocument {
	/// Color name to the portals of that color. An empty file or bare `portals:` reads as `None`
	#[serde(default)]
	pub portals: Option<IndexMap<String, Option<ColorEntries>>>,
}

/// Value stored under a color name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorEntries {
	/// A map of `channel-node` keys
	Channels(ChannelEntries),
	/// Anything else
	Invalid(Unreadable),
}

/// Value stored under a `channel-node` key
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredEntry {
	/// Decoded into the expected fields
	Valid(PortalEntry),
	/// Present but not shaped like a [PortalEntry]
	Invalid(Unreadable),
}

impl StoredEntry {
	/// The decoded entry, if it was readable
	pub fn as_entry(&self) -> Option<&PortalEntry> {
		match self {
			StoredEntry::Valid(entry) => Some(entry),
			StoredEntry::Invalid(_) => None,
		}
	}
}

/// Placeholder for a value of the wrong shape, it accepts any input and writes back as null
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unreadable;

impl<'de> Deserialize<'de> for Unreadable {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		IgnoredAny::deserialize(deserializer)?;
		Ok(Unreadable)
	}
}

impl Serialize for Unreadable {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_unit()
	}
}

/// One stored portal
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalEntry {
	/// Display name, may be empty
	#[serde(default)]
	pub name: String,
	/// `world,x,y,z` of the marker sign
	#[serde(default)]
	pub location: Option<String>,
	/// Uuid of the builder
	#[serde(default)]
	pub creator: Option<String>,
}

impl PortalsDocument {
	/// Add an entry under `color` and `key`, keeping first-seen order of both
	pub fn insert(&mut self, color: &str, key: String, entry: PortalEntry) {
		let slot = self
			.portals
			.get_or_insert_with(IndexMap::new)
			.entry(color.to_string())
			.or_insert(None);
		if !matches!(slot, Some(ColorEntries::Channels(_))) {
			*slot = Some(ColorEntries::Channels(IndexMap::new()));
		}
		if let Some(ColorEntries::Channels(channels)) = slot {
			channels.insert(key, StoredEntry::Valid(entry));
		}
	}
	/// Flatten to `(color, key, entry)` in file order. A color that is not a map yields a
	/// single unreadable entry with an empty key
	pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &StoredEntry)> {
		self.portals.iter().flatten().flat_map(|(color, slot)| {
			let (channels, unreadable) = match slot {
				Some(ColorEntries::Channels(channels)) => (Some(channels), None),
				Some(ColorEntries::Invalid(_)) => (None, Some((color.as_str(), "", &UNREADABLE_COLOR))),
				None => (None, None),
			};
			channels
				.into_iter()
				.flatten()
				.map(move |(key, entry)| (color.as_str(), key.as_str(), entry))
				.chain(unreadable)
		})
	}
	/// Number of stored entries
	pub fn len(&self) -> usize {
		self.entries().count()
	}
	/// Whether no entries are stored
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
