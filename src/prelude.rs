//! `use bevy_color_portals_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::{
	error::*,
	persistence::{document::*, *},
	portals::{location::*, portal::*, registry::*, utilities::*, world::*},
};

#[doc(hidden)]
pub use crate::plugin::{config::*, portal_layer::*, *};
