#![warn(clippy::pedantic)]
#![allow(
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::missing_panics_doc
)]

//! A generalized Rubik's cuboid: six rectangular faces of arbitrary
//! `height × width × length`, glued together into the topology of a box, and
//! the face-turn moves that act on them.

pub mod color;
pub mod cube;
pub mod face;
pub mod moves;

pub use color::Color;
pub use cube::{Cube, CubeError, Dimensions, DimensionsParseError};
pub use face::{Face, Faces, Link, Side, TopologyError};
pub use moves::{
    Combined, FaceName, Move, MoveSet, ParseError, ParseMoveError, Turn, parse_sequence, simplify,
};
