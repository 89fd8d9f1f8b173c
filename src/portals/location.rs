//! Portals are keyed by the block their marker sign sits on. A [BlockLocation] is that block:
//! a world name and an integer `(x, y, z)` coordinate. Its text form is `world,x,y,z`, which
//! is how anchors are written to the portal file.
//!

use std::fmt;

use crate::error::PortalError;

/// Name of a world known to the host
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorldId(
	/// Name as the host reports it
	String,
);

impl WorldId {
	/// Create a new instance of [WorldId]
	pub fn new(name: impl Into<String>) -> Self {
		WorldId(name.into())
	}
	/// Get the world name
	pub fn get(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for WorldId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Integer block coordinate within a world
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockLocation {
	/// World the block lives in
	world: WorldId,
	/// East-west axis
	x: i32,
	/// Vertical axis
	y: i32,
	/// North-south axis
	z: i32,
}

impl BlockLocation {
	/// Create a new instance of [BlockLocation]
	pub fn new(world: WorldId, x: i32, y: i32, z: i32) -> Self {
		BlockLocation { world, x, y, z }
	}
	pub fn get_world(&self) -> &WorldId {
		&self.world
	}
	pub fn get_x(&self) -> i32 {
		self.x
	}
	pub fn get_y(&self) -> i32 {
		self.y
	}
	pub fn get_z(&self) -> i32 {
		self.z
	}
	/// Get the `(x, y, z)` tuple
	pub fn get_xyz(&self) -> (i32, i32, i32) {
		(self.x, self.y, self.z)
	}
	/// A new location displaced by `(dx, dy, dz)` in the same world, `None` when that
	/// falls outside the coordinate range
	pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
		Some(BlockLocation {
			world: self.world.clone(),
			x: self.x.checked_add(dx)?,
			y: self.y.checked_add(dy)?,
			z: self.z.checked_add(dz)?,
		})
	}
}

impl fmt::Display for BlockLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{},{},{},{}", self.world, self.x, self.y, self.z)
	}
}

/// Split a `world,x,y,z` string into the world name and block coordinates.
///
/// The world is not resolved here, that needs the host (see
/// [crate::prelude::BlockStore::world_by_name]). Coordinates written with a fractional part
/// are floored to the containing block. Splitting happens from the right so world names
/// containing commas survive.
pub fn split_location(text: &str) -> Result<(&str, i32, i32, i32), PortalError> {
	let invalid = || PortalError::InvalidLocation(text.to_string());
	let mut parts = text.rsplitn(4, ',');
	let z = parts.next().ok_or_else(invalid)?;
	let y = parts.next().ok_or_else(invalid)?;
	let x = parts.next().ok_or_else(invalid)?;
	let world = parts.next().ok_or_else(invalid)?.trim();
	if world.is_empty() {
		return Err(invalid());
	}
	let x = parse_block_coordinate(x).ok_or_else(invalid)?;
	let y = parse_block_coordinate(y).ok_or_else(invalid)?;
	let z = parse_block_coordinate(z).ok_or_else(invalid)?;
	Ok((world, x, y, z))
}

/// Integer or floored decimal coordinate
fn parse_block_coordinate(text: &str) -> Option<i32> {
	let text = text.trim();
	if let Ok(value) = text.parse::<i32>() {
		return Some(value);
	}
	let value = text.parse::<f64>().ok()?;
	if !value.is_finite() || value < i32::MIN as f64 || value > i32::MAX as f64 {
		return None;
	}
	Some(value.floor() as i32)
}
