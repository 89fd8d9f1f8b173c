//! Settings of the [crate::prelude::ColorPortalsPlugin]
//!

use std::path::PathBuf;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceFormat, PortalStore};

/// Sub directory of [PortalsConfig::data_dir] holding the portal file
pub const DATA_SUBDIRECTORY: &str = "Data";

/// Where portals are stored and when they are saved
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalsConfig {
	/// Plugin data folder, the portal file lives in its `Data` sub directory
	data_dir: PathBuf,
	/// Encoding of the portal file
	format: PersistenceFormat,
	/// Write the portal file when the app exits
	save_on_exit: bool,
}

impl Default for PortalsConfig {
	fn default() -> Self {
		PortalsConfig {
			data_dir: PathBuf::from("plugins/ColorPortals"),
			format: PersistenceFormat::default(),
			save_on_exit: true,
		}
	}
}

impl PortalsConfig {
	/// Create a new instance of [PortalsConfig] rooted at `data_dir`
	pub fn new(data_dir: impl Into<PathBuf>) -> Self {
		PortalsConfig {
			data_dir: data_dir.into(),
			..Default::default()
		}
	}
	pub fn with_format(mut self, format: PersistenceFormat) -> Self {
		self.format = format;
		self
	}
	pub fn with_save_on_exit(mut self, save_on_exit: bool) -> Self {
		self.save_on_exit = save_on_exit;
		self
	}
	pub fn get_data_dir(&self) -> &PathBuf {
		&self.data_dir
	}
	pub fn get_format(&self) -> PersistenceFormat {
		self.format
	}
	pub fn get_save_on_exit(&self) -> bool {
		self.save_on_exit
	}
	/// The [PortalStore] reading and writing `<data_dir>/Data/<portal file>`
	pub fn get_store(&self) -> PortalStore {
		PortalStore::new(self.data_dir.join(DATA_SUBDIRECTORY), self.format)
	}
	/// From a `ron` file generate the [PortalsConfig], any missing field keeps its default
	#[cfg(feature = "ron")]
	pub fn from_ron(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::PortalError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|e| crate::error::PortalError::io(path, e))?;
		ron::de::from_str(&text).map_err(|e| crate::error::PortalError::Decode {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})
	}
}
