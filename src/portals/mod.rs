//! Portals are teleport endpoints built in the world from colored wool with a sign as their
//! marker. The sign hangs on a key block of the frame and the portal is identified by the
//! location of that sign.
//!
//! ```text
//!       [S]        S - marker sign, the anchor of the portal
//!   [W][K][W]      K - key block the sign hangs on
//!   [W]   [W]      W - wool, its color is the color of the portal
//!   [W]   [W]
//!   [W][W][W]
//! ```
//!
//! Definitions:
//!
//! * Color - the dye color of the wool the portal is built from
//! * Channel - a number written on the sign, portals of the same color and channel belong together
//! * Node - the position of a portal within its channel
//! * Family - all portals sharing a color and channel, ordered by node. Stepping into a portal
//! sends a player to the next node of the family, the last node sends them back to the first
//! * Footprint - the blocks a portal takes up, reported by the host when the portal is built
//!

pub mod location;
pub mod portal;
pub mod registry;
pub mod utilities;
pub mod world;
