//! Doom WAD loading: header/directory access ([`wad`]) plus the map-lump
//! parser built on top of it ([`level`]).

pub mod level;
pub mod wad;

pub use wad::{LumpInfo, Wad, WadError};
