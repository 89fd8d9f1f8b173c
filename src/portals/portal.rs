//! A [Portal] is one teleport endpoint. It is anchored on a wall sign, takes its [PortalColor]
//! from the wool it is built from and is numbered by a `channel` and a `node`. Portals that
//! share a color and channel form a family and are linked into a ring in node order, so
//! stepping into one sends a player to the next:
//!
//! ```text
//!  RED 1-0 ──> RED 1-1 ──> RED 1-2
//!     ^                       │
//!     └───────────────────────┘
//! ```
//!

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::PortalError, portals::location::BlockLocation};

/// The 16 dye colors a portal can be built from. Declaration order is the color component
/// of the portal ordering
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PortalColor {
	White,
	Orange,
	Magenta,
	LightBlue,
	Yellow,
	Lime,
	Pink,
	Gray,
	Silver,
	Cyan,
	Purple,
	Blue,
	Brown,
	Green,
	Red,
	Black,
}

impl PortalColor {
	/// Every color in declaration order
	pub const ALL: [PortalColor; 16] = [
		PortalColor::White,
		PortalColor::Orange,
		PortalColor::Magenta,
		PortalColor::LightBlue,
		PortalColor::Yellow,
		PortalColor::Lime,
		PortalColor::Pink,
		PortalColor::Gray,
		PortalColor::Silver,
		PortalColor::Cyan,
		PortalColor::Purple,
		PortalColor::Blue,
		PortalColor::Brown,
		PortalColor::Green,
		PortalColor::Red,
		PortalColor::Black,
	];
	/// Upper snake case name used as the color key in the portal file
	pub fn name(&self) -> &'static str {
		match self {
			PortalColor::White => "WHITE",
			PortalColor::Orange => "ORANGE",
			PortalColor::Magenta => "MAGENTA",
			PortalColor::LightBlue => "LIGHT_BLUE",
			PortalColor::Yellow => "YELLOW",
			PortalColor::Lime => "LIME",
			PortalColor::Pink => "PINK",
			PortalColor::Gray => "GRAY",
			PortalColor::Silver => "SILVER",
			PortalColor::Cyan => "CYAN",
			PortalColor::Purple => "PURPLE",
			PortalColor::Blue => "BLUE",
			PortalColor::Brown => "BROWN",
			PortalColor::Green => "GREEN",
			PortalColor::Red => "RED",
			PortalColor::Black => "BLACK",
		}
	}
}

impl fmt::Display for PortalColor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for PortalColor {
	type Err = PortalError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim();
		// newer servers call silver light gray
		if name == "LIGHT_GRAY" {
			return Ok(PortalColor::Silver);
		}
		PortalColor::ALL
			.iter()
			.find(|color| color.name() == name)
			.copied()
			.ok_or_else(|| PortalError::UnknownColor(s.to_string()))
	}
}

/// The `(channel, node)` pair of a portal, written as `channel-node` in the portal file
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelNode {
	/// Family grouping id
	channel: i32,
	/// Position within the family
	node: i32,
}

impl ChannelNode {
	/// Create a new instance of [ChannelNode]
	pub fn new(channel: i32, node: i32) -> Self {
		ChannelNode { channel, node }
	}
	pub fn get_channel(&self) -> i32 {
		self.channel
	}
	pub fn get_node(&self) -> i32 {
		self.node
	}
}

impl fmt::Display for ChannelNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.channel, self.node)
	}
}

impl FromStr for ChannelNode {
	type Err = PortalError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || PortalError::InvalidChannelNode(s.to_string());
		let text = s.trim();
		// skip the first char so a negative channel keeps its sign
		let split = text
			.char_indices()
			.skip(1)
			.find(|(_, c)| *c == '-')
			.map(|(i, _)| i)
			.ok_or_else(invalid)?;
		let channel = text[..split].parse::<i32>().map_err(|_| invalid())?;
		let node = text[split + 1..].parse::<i32>().map_err(|_| invalid())?;
		Ok(ChannelNode { channel, node })
	}
}

/// A single teleport endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Portal {
	/// Block of the marker sign, unique per portal
	location: BlockLocation,
	/// Wool color below the sign, first half of the family
	color: PortalColor,
	/// Second half of the family
	channel: i32,
	/// Position within the family ring, lower nodes come first
	node: i32,
	/// Free text label shown on the sign
	name: String,
	/// Player that built the portal
	creator: Uuid,
	/// The next portal of the family ring, `None` when the portal is alone in its family
	linked_portal: Option<BlockLocation>,
	/// Blocks the portal physically takes up in the world
	occupied: HashSet<BlockLocation>,
}

impl Portal {
	/// Create a new unlinked [Portal]. The anchor is part of its occupied blocks
	pub fn new(
		creator: Uuid,
		name: impl Into<String>,
		color: PortalColor,
		channel: i32,
		node: i32,
		location: BlockLocation,
	) -> Self {
		let mut occupied = HashSet::new();
		occupied.insert(location.clone());
		Portal {
			location,
			color,
			channel,
			node,
			name: name.into(),
			creator,
			linked_portal: None,
			occupied,
		}
	}
	/// Add the footprint of the portal as reported by the host
	pub fn with_occupied_locations(mut self, locations: impl IntoIterator<Item = BlockLocation>) -> Self {
		self.occupied.extend(locations);
		self
	}
	pub fn get_location(&self) -> &BlockLocation {
		&self.location
	}
	pub fn get_color(&self) -> PortalColor {
		self.color
	}
	pub fn get_channel(&self) -> i32 {
		self.channel
	}
	pub fn get_node(&self) -> i32 {
		self.node
	}
	pub fn get_channel_node(&self) -> ChannelNode {
		ChannelNode::new(self.channel, self.node)
	}
	pub fn get_name(&self) -> &str {
		&self.name
	}
	pub fn get_creator(&self) -> Uuid {
		self.creator
	}
	/// Anchor of the next portal in the family ring
	pub fn get_linked_portal(&self) -> Option<&BlockLocation> {
		self.linked_portal.as_ref()
	}
	pub(crate) fn set_linked_portal(&mut self, linked: Option<BlockLocation>) {
		self.linked_portal = linked;
	}
	pub fn get_occupied_locations(&self) -> &HashSet<BlockLocation> {
		&self.occupied
	}
	/// Whether `location` is one of the blocks making up this portal
	pub fn occupies(&self, location: &BlockLocation) -> bool {
		self.occupied.contains(location)
	}
	/// Whether both portals share a color and channel
	pub fn is_family_of(&self, other: &Portal) -> bool {
		self.color == other.color && self.channel == other.channel
	}
	/// Total order of portals: `(color, channel, node)` with the anchor breaking any tie
	pub fn order(&self, other: &Portal) -> Ordering {
		(self.color, self.channel, self.node, &self.location).cmp(&(
			other.color,
			other.channel,
			other.node,
			&other.location,
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::portals::location::WorldId;

	fn portal(color: PortalColor, channel: i32, node: i32, x: i32) -> Portal {
		let location = BlockLocation::new(WorldId::new("world"), x, 64, 0);
		Portal::new(Uuid::nil(), "test", color, channel, node, location)
	}
	#[test]
	fn color_names_round_trip() {
		for color in PortalColor::ALL {
			let result: PortalColor = color.name().parse().unwrap();
			assert_eq!(color, result);
		}
	}
	#[test]
	fn light_gray_is_silver() {
		let result: PortalColor = "LIGHT_GRAY".parse().unwrap();
		assert_eq!(PortalColor::Silver, result);
	}
	#[test]
	fn unknown_color() {
		let result = "TEAL".parse::<PortalColor>();
		assert!(matches!(result, Err(PortalError::UnknownColor(_))));
	}
	#[test]
	fn parse_channel_node() {
		let result: ChannelNode = "12-3".parse().unwrap();
		let actual = ChannelNode::new(12, 3);
		assert_eq!(actual, result);
	}
	#[test]
	fn parse_negative_channel() {
		let result: ChannelNode = "-4-0".parse().unwrap();
		let actual = ChannelNode::new(-4, 0);
		assert_eq!(actual, result);
	}
	#[test]
	fn parse_channel_node_rejects_missing_node() {
		assert!("7".parse::<ChannelNode>().is_err());
		assert!("7-".parse::<ChannelNode>().is_err());
		assert!("a-1".parse::<ChannelNode>().is_err());
	}
	#[test]
	fn channel_node_display() {
		let result = ChannelNode::new(3, 1).to_string();
		assert_eq!("3-1", result);
	}
	#[test]
	fn order_by_color_channel_node() {
		let mut portals = vec![
			portal(PortalColor::Red, 1, 1, 0),
			portal(PortalColor::White, 9, 0, 1),
			portal(PortalColor::Red, 0, 5, 2),
			portal(PortalColor::Red, 1, 0, 3),
		];
		portals.sort_by(|a, b| a.order(b));
		let result: Vec<(PortalColor, i32, i32)> = portals
			.iter()
			.map(|p| (p.get_color(), p.get_channel(), p.get_node()))
			.collect();
		let actual = vec![
			(PortalColor::White, 9, 0),
			(PortalColor::Red, 0, 5),
			(PortalColor::Red, 1, 0),
			(PortalColor::Red, 1, 1),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn anchor_is_occupied() {
		let p = portal(PortalColor::Blue, 0, 0, 5);
		assert!(p.occupies(p.get_location()));
	}
	#[test]
	fn family_requires_color_and_channel() {
		let a = portal(PortalColor::Red, 1, 0, 0);
		let b = portal(PortalColor::Red, 1, 4, 1);
		let c = portal(PortalColor::Blue, 1, 0, 2);
		assert!(a.is_family_of(&b));
		assert!(!a.is_family_of(&c));
	}
}
