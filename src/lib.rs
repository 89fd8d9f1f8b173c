//! This is a plugin for Bevy to keep track of colored portals built from blocks, link portals
//! of the same color and channel into teleport rings and persist them between runs
//!

pub mod error;
pub mod persistence;
pub mod plugin;
pub mod portals;

pub mod prelude;
