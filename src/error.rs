//! Errors raised while registering, looking up and persisting portals
//!

use std::path::PathBuf;

use thiserror::Error;

use crate::portals::location::BlockLocation;

/// Errors produced by the [crate::prelude::PortalRegistry] and the persistence layer
#[derive(Debug, Error)]
pub enum PortalError {
	/// Reading or writing the portal file failed
	#[error("I/O error on {path}: {source}")]
	Io {
		/// File or directory being accessed
		path: PathBuf,
		/// The underlying I/O error
		source: std::io::Error,
	},
	/// The registry could not be turned into a document
	#[error("failed encoding portals: {0}")]
	Encode(String),
	/// The portal file is not a valid document
	#[error("failed decoding {path}: {reason}")]
	Decode {
		/// File being decoded
		path: PathBuf,
		/// Parser message
		reason: String,
	},
	/// A portal is already registered at this anchor
	#[error("a portal is already registered at {0}")]
	LocationOccupied(BlockLocation),
	/// More than one portal marker surrounds a key block
	#[error("key block at {location} is touched by {count} portal markers")]
	AmbiguousKeyBlock {
		/// The structural block that was queried
		location: BlockLocation,
		/// Number of registered markers found around it
		count: usize,
	},
	/// A location string is not of the form `world,x,y,z`
	#[error("invalid location `{0}`")]
	InvalidLocation(String),
	/// A family key is not of the form `channel-node`
	#[error("invalid channel-node key `{0}`")]
	InvalidChannelNode(String),
	/// The color name does not match any [crate::prelude::PortalColor]
	#[error("unknown portal color `{0}`")]
	UnknownColor(String),
	/// The host does not know a world by this name
	#[error("unknown world `{0}`")]
	UnknownWorld(String),
	/// The creator is not a valid uuid
	#[error("invalid creator id `{0}`")]
	InvalidCreator(String),
	/// A stored value is not shaped like a portal entry
	#[error("entry `{0}` is not a portal entry")]
	UnreadableEntry(String),
	/// A stored entry lacks a required field
	#[error("entry `{key}` has no `{field}`")]
	MissingField {
		/// The `channel-node` key of the entry
		key: String,
		/// Name of the absent field
		field: &'static str,
	},
}

impl PortalError {
	/// Wrap an [std::io::Error] with the path it occurred on
	pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		PortalError::Io {
			path: path.into(),
			source,
		}
	}
}
