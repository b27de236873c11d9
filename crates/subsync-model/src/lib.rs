//! Plain data shared by the subsync crates.
//!
//! Nothing here touches the filesystem or spawns processes; the types only describe
//! what was configured, what was decided for each item and how it ended.

mod domain;
pub use domain::*;
