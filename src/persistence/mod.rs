//! Saving the [PortalRegistry] to disk and rebuilding it on start up.
//!
//! The file groups portals by color and then by `channel-node` (see [document]). Saving walks
//! the registry in portal order so each family is stored contiguously with ascending nodes.
//! Loading reads the entries back in file order, buffers each family and registers it once
//! the family changes, then registers the last family explicitly once the entries run out.
//!
//! Writes go to a temporary file next to the target which is then renamed over it, a crash
//! mid-save leaves the previous file intact.

pub mod document;

use std::{
	fs,
	io::Write,
	path::{Path, PathBuf},
};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use uuid::Uuid;

use crate::{
	error::PortalError,
	persistence::document::{PortalEntry, PortalsDocument},
	portals::{
		location::{split_location, BlockLocation},
		portal::{ChannelNode, Portal, PortalColor},
		registry::PortalRegistry,
		world::{BlockKind, BlockStore},
	},
};

/// Text format of the portal file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceFormat {
	/// `portals.yml`, the layout server admins are used to editing
	#[default]
	Yaml,
	/// `portals.ron`
	#[cfg(feature = "ron")]
	Ron,
}

impl PersistenceFormat {
	/// Name of the portal file in this format
	pub fn file_name(&self) -> &'static str {
		match self {
			PersistenceFormat::Yaml => "portals.yml",
			#[cfg(feature = "ron")]
			PersistenceFormat::Ron => "portals.ron",
		}
	}
	/// Render a document
	pub fn encode(&self, document: &PortalsDocument) -> Result<String, PortalError> {
		match self {
			PersistenceFormat::Yaml => {
				serde_yaml::to_string(document).map_err(|e| PortalError::Encode(e.to_string()))
			}
			#[cfg(feature = "ron")]
			PersistenceFormat::Ron => {
				ron::ser::to_string_pretty(document, ron::ser::PrettyConfig::default())
					.map_err(|e| PortalError::Encode(e.to_string()))
			}
		}
	}
	/// Parse a document read from `path`, blank text is an empty document
	pub fn decode(&self, text: &str, path: &Path) -> Result<PortalsDocument, PortalError> {
		if text.trim().is_empty() {
			return Ok(PortalsDocument::default());
		}
		let decode_error = |reason: String| PortalError::Decode {
			path: path.to_path_buf(),
			reason,
		};
		match self {
			PersistenceFormat::Yaml => serde_yaml::from_str(text).map_err(|e| decode_error(e.to_string())),
			#[cfg(feature = "ron")]
			PersistenceFormat::Ron => ron::de::from_str(text).map_err(|e| decode_error(e.to_string())),
		}
	}
}

/// A stored portal that was not restored
#[derive(Debug, Error)]
pub enum LoadWarning {
	/// The entry could not be parsed
	#[error("skipped portal {color} {key}: {error}")]
	Malformed {
		/// Color name the entry is stored under
		color: String,
		/// `channel-node` key, empty when the whole color was unreadable
		key: String,
		/// Why the entry was rejected
		error: PortalError,
	},
	/// The marker sign the entry points at is gone from the world
	#[error("skipped portal {color} {key}: no marker sign at {location}")]
	Stale {
		/// Color name the entry is stored under
		color: String,
		/// `channel-node` key of the entry
		key: String,
		/// Where the sign was expected
		location: BlockLocation,
	},
	/// The registry refused the portal
	#[error("skipped portal: {0}")]
	Rejected(PortalError),
}

/// Outcome of a load
#[derive(Debug, Default)]
pub struct LoadReport {
	/// Portals registered
	pub loaded: usize,
	/// Entries that were dropped and why
	pub warnings: Vec<LoadWarning>,
}

/// Reads and writes the portal file of a data directory
#[derive(Clone, Debug)]
pub struct PortalStore {
	/// Directory holding the portal file
	directory: PathBuf,
	/// Encoding of the portal file, also picks its name
	format: PersistenceFormat,
}

impl PortalStore {
	/// Create a new instance of [PortalStore]
	pub fn new(directory: impl Into<PathBuf>, format: PersistenceFormat) -> Self {
		PortalStore {
			directory: directory.into(),
			format,
		}
	}
	pub fn get_directory(&self) -> &Path {
		&self.directory
	}
	pub fn get_format(&self) -> PersistenceFormat {
		self.format
	}
	/// Full path of the portal file
	pub fn get_file_path(&self) -> PathBuf {
		self.directory.join(self.format.file_name())
	}
	/// Write every registered portal, replacing the previous file. Returns the number of
	/// portals written
	pub fn save(&self, registry: &PortalRegistry) -> Result<usize, PortalError> {
		let document = document_from_registry(registry);
		let text = self.format.encode(&document)?;
		fs::create_dir_all(&self.directory).map_err(|e| PortalError::io(&self.directory, e))?;
		let path = self.get_file_path();
		let mut file = NamedTempFile::new_in(&self.directory).map_err(|e| PortalError::io(&self.directory, e))?;
		let temp_path = file.path().to_path_buf();
		file.write_all(text.as_bytes()).map_err(|e| PortalError::io(&temp_path, e))?;
		file.as_file().sync_all().map_err(|e| PortalError::io(&temp_path, e))?;
		file.persist(&path).map_err(|e| PortalError::io(&path, e.error))?;
		Ok(registry.len())
	}
	/// Read the portal file and register its portals into `registry`.
	///
	/// A missing directory or file is an empty load. Failing to read or decode the file
	/// returns an error before the registry is touched
	pub fn load(&self, store: &dyn BlockStore, registry: &mut PortalRegistry) -> Result<LoadReport, PortalError> {
		let path = self.get_file_path();
		let text = match fs::read_to_string(&path) {
			Ok(text) => text,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!("No portal file at {}", path.display());
				return Ok(LoadReport::default());
			}
			Err(e) => return Err(PortalError::io(&path, e)),
		};
		let document = self.format.decode(&text, &path)?;
		Ok(load_document(&document, store, registry))
	}
}

/// Build the document of every registered portal in portal order
pub fn document_from_registry(registry: &PortalRegistry) -> PortalsDocument {
	let mut document = PortalsDocument::default();
	for portal in registry.ordered() {
		document.insert(
			portal.get_color().name(),
			portal.get_channel_node().to_string(),
			PortalEntry {
				name: portal.get_name().to_string(),
				location: Some(portal.get_location().to_string()),
				creator: Some(portal.get_creator().to_string()),
			},
		);
	}
	document
}

/// Register the portals of a document in file order, one family at a time
pub fn load_document(document: &PortalsDocument, store: &dyn BlockStore, registry: &mut PortalRegistry) -> LoadReport {
	let mut report = LoadReport::default();
	let mut family: Vec<Portal> = Vec::new();
	let mut family_key: Option<(PortalColor, i32)> = None;
	for (color_name, key, stored) in document.entries() {
		let parsed = stored
			.as_entry()
			.ok_or_else(|| PortalError::UnreadableEntry(key.to_string()))
			.and_then(|entry| portal_from_entry(color_name, key, entry, store));
		let portal = match parsed {
			Ok(portal) => portal,
			Err(error) => {
				report.warnings.push(LoadWarning::Malformed {
					color: color_name.to_string(),
					key: key.to_string(),
					error,
				});
				continue;
			}
		};
		if store.block_kind_at(portal.get_location()) != BlockKind::WallSign {
			report.warnings.push(LoadWarning::Stale {
				color: color_name.to_string(),
				key: key.to_string(),
				location: portal.get_location().clone(),
			});
			continue;
		}
		let portal_family = (portal.get_color(), portal.get_channel());
		if family_key != Some(portal_family) {
			flush_family(&mut family, registry, &mut report);
			family_key = Some(portal_family);
		}
		family.push(portal);
	}
	// no family change follows the last entry
	flush_family(&mut family, registry, &mut report);
	report
}

/// Register a finished family and empty the buffer
fn flush_family(family: &mut Vec<Portal>, registry: &mut PortalRegistry, report: &mut LoadReport) {
	if family.is_empty() {
		return;
	}
	let count = family.len();
	let rejected = registry.register_family(std::mem::take(family));
	report.loaded += count - rejected.len();
	report.warnings.extend(rejected.into_iter().map(LoadWarning::Rejected));
}

/// Parse one stored entry into an unlinked [Portal]
fn portal_from_entry(
	color_name: &str,
	key: &str,
	entry: &PortalEntry,
	store: &dyn BlockStore,
) -> Result<Portal, PortalError> {
	let color: PortalColor = color_name.parse()?;
	let channel_node: ChannelNode = key.parse()?;
	let location_text = entry.location.as_deref().ok_or_else(|| PortalError::MissingField {
		key: key.to_string(),
		field: "location",
	})?;
	let (world_name, x, y, z) = split_location(location_text)?;
	let world = store
		.world_by_name(world_name)
		.ok_or_else(|| PortalError::UnknownWorld(world_name.to_string()))?;
	let location = BlockLocation::new(world, x, y, z);
	let creator_text = entry.creator.as_deref().ok_or_else(|| PortalError::MissingField {
		key: key.to_string(),
		field: "creator",
	})?;
	let creator =
		Uuid::parse_str(creator_text.trim()).map_err(|_| PortalError::InvalidCreator(creator_text.to_string()))?;
	let occupied = store.occupied_locations(&location);
	Ok(Portal::new(
		creator,
		entry.name.clone(),
		color,
		channel_node.get_channel(),
		channel_node.get_node(),
		location,
	)
	.with_occupied_locations(occupied))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::portals::location::WorldId;

	const CREATOR: &str = "5b1a7f5e-2c7d-4c39-9d5f-3a8e1f7b9c20";

	fn at(x: i32) -> BlockLocation {
		BlockLocation::new(WorldId::new("world"), x, 64, 0)
	}
	fn signed_store(xs: &[i32]) -> MemoryStore {
		let mut store = MemoryStore::new(["world"]);
		for x in xs {
			store.set_block(at(*x), BlockKind::WallSign);
		}
		store
	}
	type MemoryStore = crate::portals::world::MemoryBlockStore;

	fn entry(x: i32) -> PortalEntry {
		PortalEntry {
			name: format!("portal {}", x),
			location: Some(format!("world,{},64,0", x)),
			creator: Some(CREATOR.to_string()),
		}
	}
	#[test]
	fn stale_entries_are_reported() {
		let store = signed_store(&[0]);
		let mut document = PortalsDocument::default();
		document.insert("RED", "1-0".to_string(), entry(0));
		document.insert("RED", "1-1".to_string(), entry(1));
		let mut registry = PortalRegistry::default();
		let report = load_document(&document, &store, &mut registry);
		assert_eq!(1, report.loaded);
		assert_eq!(1, registry.len());
		assert!(matches!(report.warnings[0], LoadWarning::Stale { .. }));
		assert!(registry.get(&at(0)).unwrap().get_linked_portal().is_none());
	}
	#[test]
	fn malformed_entries_are_skipped() {
		let store = signed_store(&[0, 1, 2, 3, 4, 5]);
		let mut document = PortalsDocument::default();
		document.insert("TEAL", "1-0".to_string(), entry(0));
		document.insert("RED", "one-0".to_string(), entry(1));
		document.insert("RED", "1-0".to_string(), PortalEntry { location: Some("world,x,64,0".to_string()), ..entry(2) });
		document.insert("RED", "1-1".to_string(), PortalEntry { location: Some("nether,3,64,0".to_string()), ..entry(3) });
		document.insert("RED", "1-2".to_string(), PortalEntry { creator: Some("nobody".to_string()), ..entry(4) });
		document.insert("RED", "1-3".to_string(), PortalEntry { creator: None, ..entry(5) });
		let mut registry = PortalRegistry::default();
		let report = load_document(&document, &store, &mut registry);
		assert_eq!(0, report.loaded);
		assert_eq!(6, report.warnings.len());
		assert!(report.warnings.iter().all(|w| matches!(w, LoadWarning::Malformed { .. })));
	}
	#[test]
	fn malformed_entry_does_not_split_family() {
		let store = signed_store(&[0, 1, 2]);
		let mut document = PortalsDocument::default();
		document.insert("RED", "1-0".to_string(), entry(0));
		document.insert("RED", "1-1".to_string(), PortalEntry { location: None, ..entry(1) });
		document.insert("RED", "1-2".to_string(), entry(2));
		let mut registry = PortalRegistry::default();
		let report = load_document(&document, &store, &mut registry);
		assert_eq!(2, report.loaded);
		assert_eq!(Some(&at(2)), registry.get(&at(0)).unwrap().get_linked_portal());
		assert_eq!(Some(&at(0)), registry.get(&at(2)).unwrap().get_linked_portal());
	}
	#[test]
	fn last_family_is_flushed() {
		let store = signed_store(&[0, 1, 2]);
		let mut document = PortalsDocument::default();
		document.insert("BLUE", "0-0".to_string(), entry(0));
		document.insert("BLUE", "4-0".to_string(), entry(1));
		document.insert("BLUE", "4-1".to_string(), entry(2));
		let mut registry = PortalRegistry::default();
		let report = load_document(&document, &store, &mut registry);
		assert_eq!(3, report.loaded);
		assert_eq!(Some(&at(2)), registry.get(&at(1)).unwrap().get_linked_portal());
		assert_eq!(Some(&at(1)), registry.get(&at(2)).unwrap().get_linked_portal());
		assert!(registry.get(&at(0)).unwrap().get_linked_portal().is_none());
	}
	#[test]
	fn duplicate_anchor_is_rejected() {
		let store = signed_store(&[0]);
		let mut document = PortalsDocument::default();
		document.insert("RED", "1-0".to_string(), entry(0));
		document.insert("RED", "1-1".to_string(), entry(0));
		let mut registry = PortalRegistry::default();
		let report = load_document(&document, &store, &mut registry);
		assert_eq!(1, report.loaded);
		assert!(matches!(report.warnings[0], LoadWarning::Rejected(PortalError::LocationOccupied(_))));
	}
	#[test]
	fn footprint_comes_from_store() {
		let mut store = signed_store(&[0]);
		store.set_footprint(at(0), vec![at(0).offset(0, -1, 1).unwrap()]);
		let mut document = PortalsDocument::default();
		document.insert("RED", "1-0".to_string(), entry(0));
		let mut registry = PortalRegistry::default();
		load_document(&document, &store, &mut registry);
		let result = registry.get_by_occupied_block(&at(0).offset(0, -1, 1).unwrap()).map(|p| p.get_location().clone());
		assert_eq!(Some(at(0)), result);
	}
	#[test]
	fn document_groups_by_color_then_channel_node() {
		let mut registry = PortalRegistry::default();
		let creator = Uuid::parse_str(CREATOR).unwrap();
		registry.register(Portal::new(creator, "b", PortalColor::Red, 1, 1, at(1))).unwrap();
		registry.register(Portal::new(creator, "a", PortalColor::Red, 1, 0, at(0))).unwrap();
		registry.register(Portal::new(creator, "w", PortalColor::White, 2, 0, at(2))).unwrap();
		let document = document_from_registry(&registry);
		let result: Vec<(&str, &str, &str)> = document
			.entries()
			.map(|(c, k, e)| (c, k, e.as_entry().unwrap().name.as_str()))
			.collect();
		let actual = vec![("WHITE", "2-0", "w"), ("RED", "1-0", "a"), ("RED", "1-1", "b")];
		assert_eq!(actual, result);
		let first = document.entries().next().and_then(|(_, _, e)| e.as_entry()).unwrap();
		assert_eq!(Some("world,2,64,0"), first.location.as_deref());
		assert_eq!(Some(CREATOR), first.creator.as_deref());
	}
	#[test]
	fn yaml_layout() {
		let mut document = PortalsDocument::default();
		document.insert("RED", "1-0".to_string(), entry(0));
		let text = PersistenceFormat::Yaml.encode(&document).unwrap();
		assert!(text.starts_with("portals:\n  RED:\n"));
		assert!(text.contains("1-0:"));
		assert!(text.contains("world,0,64,0"));
	}
	#[test]
	fn yaml_decodes_hand_written_file() {
		let text = "portals:\n  RED:\n    1-0:\n      name: Spawn\n      location: \"world,10,64,-3\"\n      creator: \"5b1a7f5e-2c7d-4c39-9d5f-3a8e1f7b9c20\"\n";
		let document = PersistenceFormat::Yaml.decode(text, Path::new("portals.yml")).unwrap();
		let (color, key, stored) = document.entries().next().unwrap();
		let entry = stored.as_entry().unwrap();
		assert_eq!(("RED", "1-0", "Spawn"), (color, key, entry.name.as_str()));
		assert_eq!(Some("world,10,64,-3"), entry.location.as_deref());
	}
	#[test]
	fn blank_and_bare_files_are_empty() {
		let path = Path::new("portals.yml");
		assert!(PersistenceFormat::Yaml.decode("", path).unwrap().is_empty());
		assert!(PersistenceFormat::Yaml.decode("portals:\n", path).unwrap().is_empty());
		assert!(PersistenceFormat::Yaml.decode("portals:\n  RED:\n", path).unwrap().is_empty());
	}
	#[test]
	fn garbage_is_a_decode_error() {
		let result = PersistenceFormat::Yaml.decode("portals: [1, 2", Path::new("portals.yml"));
		assert!(matches!(result, Err(PortalError::Decode { .. })));
	}
	#[test]
	fn mistyped_entry_spares_its_siblings() {
		let text = format!(
			"portals:\n  RED:\n    1-0:\n      name: a\n      location: world,0,64,0\n      creator: {CREATOR}\n    1-1:\n      location: [1, 2]\n"
		);
		let document = PersistenceFormat::Yaml.decode(&text, Path::new("portals.yml")).unwrap();
		assert_eq!(2, document.len());
		let mut registry = PortalRegistry::default();
		let report = load_document(&document, &signed_store(&[0]), &mut registry);
		assert_eq!(1, report.loaded);
		assert_eq!(1, registry.len());
		assert!(matches!(
			report.warnings.as_slice(),
			[LoadWarning::Malformed { key, error: PortalError::UnreadableEntry(_), .. }] if key == "1-1"
		));
	}
	#[test]
	fn color_that_is_not_a_map_is_skipped() {
		let text = format!(
			"portals:\n  BLUE: 7\n  RED:\n    1-0:\n      location: world,0,64,0\n      creator: {CREATOR}\n"
		);
		let document = PersistenceFormat::Yaml.decode(&text, Path::new("portals.yml")).unwrap();
		let mut registry = PortalRegistry::default();
		let report = load_document(&document, &signed_store(&[0]), &mut registry);
		assert_eq!(1, report.loaded);
		assert!(matches!(
			report.warnings.as_slice(),
			[LoadWarning::Malformed { color, .. }] if color == "BLUE"
		));
	}
	#[test]
	fn missing_file_is_empty_load() {
		let dir = tempfile::tempdir().unwrap();
		let portal_store = PortalStore::new(dir.path().join("Data"), PersistenceFormat::Yaml);
		let mut registry = PortalRegistry::default();
		let report = portal_store.load(&signed_store(&[]), &mut registry).unwrap();
		assert_eq!(0, report.loaded);
		assert!(registry.is_empty());
	}
	#[test]
	fn save_creates_directory_and_replaces_file() {
		let dir = tempfile::tempdir().unwrap();
		let portal_store = PortalStore::new(dir.path().join("Data"), PersistenceFormat::Yaml);
		let mut registry = PortalRegistry::default();
		registry.register(Portal::new(Uuid::nil(), "a", PortalColor::Red, 1, 0, at(0))).unwrap();
		assert_eq!(1, portal_store.save(&registry).unwrap());
		registry.clear();
		assert_eq!(0, portal_store.save(&registry).unwrap());
		let text = fs::read_to_string(portal_store.get_file_path()).unwrap();
		assert!(!text.contains("RED"));
		// only the portal file remains, the temporary file was renamed over it
		assert_eq!(1, fs::read_dir(portal_store.get_directory()).unwrap().count());
	}
	#[test]
	fn save_into_a_file_path_fails_cleanly() {
		let dir = tempfile::tempdir().unwrap();
		let blocker = dir.path().join("Data");
		fs::write(&blocker, "not a directory").unwrap();
		let portal_store = PortalStore::new(&blocker, PersistenceFormat::Yaml);
		let mut registry = PortalRegistry::default();
		registry.register(Portal::new(Uuid::nil(), "a", PortalColor::Red, 1, 0, at(0))).unwrap();
		assert!(matches!(portal_store.save(&registry), Err(PortalError::Io { .. })));
		assert_eq!(1, registry.len());
	}
	#[cfg(feature = "ron")]
	#[test]
	fn ron_round_trip_document() {
		let mut document = PortalsDocument::default();
		document.insert("RED", "1-0".to_string(), entry(0));
		document.insert("BLUE", "2-3".to_string(), entry(1));
		let text = PersistenceFormat::Ron.encode(&document).unwrap();
		let result = PersistenceFormat::Ron.decode(&text, Path::new("portals.ron")).unwrap();
		assert_eq!(document, result);
	}
}
