//! Useful block geometry used by the portals
//!

use serde::{Deserialize, Serialize};

use crate::portals::{location::BlockLocation, portal::PortalColor, world::BlockKind};

/// Convenience way of addressing the 6 faces of a block. Horizontal faces follow the strict
/// ordering `North, East, South, West` which is also the priority used when looking for a
/// portal marker around a key block
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BlockFace {
	North,
	East,
	South,
	West,
	Up,
	Down,
}

impl BlockFace {
	/// The four horizontal faces in priority order
	pub const HORIZONTAL: [BlockFace; 4] = [
		BlockFace::North,
		BlockFace::East,
		BlockFace::South,
		BlockFace::West,
	];
	/// Unit `(x, y, z)` step of the face. North is `-z` and east is `+x`
	pub fn offset(&self) -> (i32, i32, i32) {
		match self {
			BlockFace::North => (0, 0, -1),
			BlockFace::East => (1, 0, 0),
			BlockFace::South => (0, 0, 1),
			BlockFace::West => (-1, 0, 0),
			BlockFace::Up => (0, 1, 0),
			BlockFace::Down => (0, -1, 0),
		}
	}
	/// The block touching `location` on this face, `None` at the edge of the coordinate range
	pub fn relative(&self, location: &BlockLocation) -> Option<BlockLocation> {
		let (x, y, z) = self.offset();
		location.offset(x, y, z)
	}
	pub fn opposite(&self) -> BlockFace {
		match self {
			BlockFace::North => BlockFace::South,
			BlockFace::East => BlockFace::West,
			BlockFace::South => BlockFace::North,
			BlockFace::West => BlockFace::East,
			BlockFace::Up => BlockFace::Down,
			BlockFace::Down => BlockFace::Up,
		}
	}
}

/// Yaw a player should face when arriving through a portal facing `face`
pub fn face_to_yaw(face: BlockFace) -> f32 {
	match face {
		BlockFace::North => 0.0,
		BlockFace::East => 90.0,
		BlockFace::South => 180.0,
		BlockFace::West => 270.0,
		_ => 0.0,
	}
}

/// Legacy block data value of a wall sign attached facing `face`
pub fn direction_data(face: BlockFace) -> u8 {
	match face {
		BlockFace::North => 2,
		BlockFace::South => 5,
		BlockFace::West => 3,
		BlockFace::East => 4,
		_ => 0,
	}
}

/// Distance along each axis from `start` to `end`, paired with the face pointing that way.
/// Differences are taken in `i64` so opposite ends of the coordinate range still fit a `u32`.
///
/// A zero distance on the `z` axis reports as [BlockFace::North], on the `x` axis as
/// [BlockFace::East] and on the `y` axis as [BlockFace::Up]. Results are ordered `z`, `x`, `y`
pub fn cardinal_distances(start: &BlockLocation, end: &BlockLocation) -> Vec<(BlockFace, u32)> {
	let mut distances = Vec::with_capacity(3);
	let north_south = i64::from(start.get_z()) - i64::from(end.get_z());
	if north_south >= 0 {
		distances.push((BlockFace::North, north_south.unsigned_abs() as u32));
	} else {
		distances.push((BlockFace::South, north_south.unsigned_abs() as u32));
	}
	let east_west = i64::from(start.get_x()) - i64::from(end.get_x());
	if east_west <= 0 {
		distances.push((BlockFace::East, east_west.unsigned_abs() as u32));
	} else {
		distances.push((BlockFace::West, east_west.unsigned_abs() as u32));
	}
	let up_down = i64::from(start.get_y()) - i64::from(end.get_y());
	if up_down <= 0 {
		distances.push((BlockFace::Up, up_down.unsigned_abs() as u32));
	} else {
		distances.push((BlockFace::Down, up_down.unsigned_abs() as u32));
	}
	distances
}

/// Color of a wool block, `None` for anything else
pub fn wool_color(kind: BlockKind) -> Option<PortalColor> {
	match kind {
		BlockKind::Wool(color) => Some(color),
		_ => None,
	}
}

/// Whether `text` is an integer, used when reading channel numbers off a sign
pub fn is_integer(text: &str) -> bool {
	text.trim().parse::<i32>().is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::portals::location::WorldId;

	fn at(x: i32, y: i32, z: i32) -> BlockLocation {
		BlockLocation::new(WorldId::new("world"), x, y, z)
	}
	#[test]
	fn relative_north_is_negative_z() {
		let result = BlockFace::North.relative(&at(0, 0, 0));
		assert_eq!(Some(at(0, 0, -1)), result);
		assert_eq!(None, BlockFace::Up.relative(&at(0, i32::MAX, 0)));
	}
	#[test]
	fn opposite_faces() {
		for face in BlockFace::HORIZONTAL {
			assert_eq!(face, face.opposite().opposite());
			assert_ne!(face, face.opposite());
		}
	}
	#[test]
	fn yaw_of_faces() {
		let result: Vec<f32> = BlockFace::HORIZONTAL.iter().map(|f| face_to_yaw(*f)).collect();
		let actual = vec![0.0, 90.0, 180.0, 270.0];
		assert_eq!(actual, result);
		assert_eq!(0.0, face_to_yaw(BlockFace::Up));
	}
	#[test]
	fn data_of_faces() {
		let result: Vec<u8> = BlockFace::HORIZONTAL.iter().map(|f| direction_data(*f)).collect();
		let actual = vec![2, 4, 5, 3];
		assert_eq!(actual, result);
		assert_eq!(0, direction_data(BlockFace::Down));
	}
	#[test]
	fn distances_towards_south_west_down() {
		let result = cardinal_distances(&at(10, 70, 0), &at(4, 64, 3));
		let actual = vec![
			(BlockFace::South, 3),
			(BlockFace::West, 6),
			(BlockFace::Down, 6),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn distances_across_whole_range() {
		let result = cardinal_distances(&at(i32::MAX, i32::MIN, i32::MIN), &at(i32::MIN, i32::MAX, 1));
		let actual = vec![
			(BlockFace::South, 2_147_483_649),
			(BlockFace::West, u32::MAX),
			(BlockFace::Up, u32::MAX),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn distances_same_block() {
		let result = cardinal_distances(&at(1, 1, 1), &at(1, 1, 1));
		let actual = vec![
			(BlockFace::North, 0),
			(BlockFace::East, 0),
			(BlockFace::Up, 0),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn wool_only() {
		assert_eq!(Some(PortalColor::Lime), wool_color(BlockKind::Wool(PortalColor::Lime)));
		assert_eq!(None, wool_color(BlockKind::WallSign));
	}
	#[test]
	fn integers() {
		assert!(is_integer("42"));
		assert!(is_integer("-3"));
		assert!(!is_integer("4.2"));
		assert!(!is_integer("channel"));
	}
}
