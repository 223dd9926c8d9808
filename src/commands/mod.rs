//! Command implementations for the diecast CLI

mod lookup;
mod misc;
mod reconcile;

pub use lookup::*;
pub use misc::*;
pub use reconcile::*;
