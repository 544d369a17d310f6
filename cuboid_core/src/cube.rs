use std::{cmp::Ordering, fmt, hash::Hash, str::FromStr};

use itertools::Itertools;
use log::trace;
use thiserror::Error;

use crate::{
    Color,
    face::{Face, Faces, Side, TopologyError},
    moves::{FaceName, Move, MoveSet, ParseError, parse_sequence},
};

/// How the faces are glued together. For every face: its up, right, down and left neighbors, and which edge of that neighbor touches it.
const WIRING: [(FaceName, [(FaceName, Side); 4]); 6] = [
    (
        FaceName::Front,
        [
            (FaceName::Up, Side::Down),
            (FaceName::Right, Side::Left),
            (FaceName::Down, Side::Up),
            (FaceName::Left, Side::Right),
        ],
    ),
    (
        FaceName::Back,
        [
            (FaceName::Up, Side::Up),
            (FaceName::Left, Side::Left),
            (FaceName::Down, Side::Down),
            (FaceName::Right, Side::Right),
        ],
    ),
    (
        FaceName::Left,
        [
            (FaceName::Up, Side::Left),
            (FaceName::Front, Side::Left),
            (FaceName::Down, Side::Left),
            (FaceName::Back, Side::Right),
        ],
    ),
    (
        FaceName::Right,
        [
            (FaceName::Up, Side::Right),
            (FaceName::Back, Side::Left),
            (FaceName::Down, Side::Right),
            (FaceName::Front, Side::Right),
        ],
    ),
    (
        FaceName::Up,
        [
            (FaceName::Back, Side::Up),
            (FaceName::Right, Side::Up),
            (FaceName::Front, Side::Up),
            (FaceName::Left, Side::Up),
        ],
    ),
    (
        FaceName::Down,
        [
            (FaceName::Front, Side::Down),
            (FaceName::Right, Side::Down),
            (FaceName::Back, Side::Down),
            (FaceName::Left, Side::Down),
        ],
    ),
];

fn solved_color(face: FaceName) -> Color {
    match face {
        FaceName::Up => Color::White,
        FaceName::Left => Color::Green,
        FaceName::Front => Color::Red,
        FaceName::Right => Color::Blue,
        FaceName::Back => Color::Orange,
        FaceName::Down => Color::Yellow,
    }
}

/// The extents of a cuboid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub height: usize,
    pub width: usize,
    pub length: usize,
}

impl Dimensions {
    #[must_use]
    pub const fn new(height: usize, width: usize, length: usize) -> Dimensions {
        Dimensions {
            height,
            width,
            length,
        }
    }

    /// `(rows, cols)` of the given face
    #[must_use]
    pub fn shape(self, face: FaceName) -> (usize, usize) {
        match face {
            FaceName::Front | FaceName::Back => (self.height, self.width),
            FaceName::Left | FaceName::Right => (self.height, self.length),
            FaceName::Up | FaceName::Down => (self.length, self.width),
        }
    }
}

impl From<(usize, usize, usize)> for Dimensions {
    fn from((height, width, length): (usize, usize, usize)) -> Self {
        Dimensions::new(height, width, length)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.length)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid dimensions {0:?}, expected three positive integers written as HxWxL or H,W,L")]
pub struct DimensionsParseError(pub String);

impl FromStr for Dimensions {
    type Err = DimensionsParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = || DimensionsParseError(text.to_owned());

        let extents = text
            .split(['x', 'X', ','])
            .map(|extent| match extent.trim().parse::<usize>() {
                Ok(0) | Err(_) => Err(error()),
                Ok(extent) => Ok(extent),
            })
            .collect::<Result<Vec<_>, _>>()?;

        match extents[..] {
            [height, width, length] => Ok(Dimensions::new(height, width, length)),
            _ => Err(error()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeError {
    #[error("Move {illegal} is not permitted, choose one of {allowed}")]
    IllegalMove { illegal: Move, allowed: MoveSet },
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A cuboid puzzle in some state.
///
/// Cubes are values: applying a move produces a new cube and leaves the original alone. Two cubes are equal when every sticker matches, no matter how they were built or which moves they permit.
#[derive(Clone, Debug)]
pub struct Cube {
    faces: Faces,
    permitted: MoveSet,
}

impl Cube {
    /// The solved cuboid of the given dimensions.
    ///
    /// # Errors
    ///
    /// Fails if any of the dimensions is zero, or a face would be too large to store.
    pub fn from_dimensions(dims: Dimensions, permitted: MoveSet) -> Result<Cube, TopologyError> {
        let face = |name| Face::new(solved_color(name), dims.shape(name));

        Cube::from_faces(
            [
                face(FaceName::Up)?,
                face(FaceName::Left)?,
                face(FaceName::Front)?,
                face(FaceName::Right)?,
                face(FaceName::Back)?,
                face(FaceName::Down)?,
            ],
            permitted,
        )
    }

    /// The solved cuboid with every move permitted
    ///
    /// # Errors
    ///
    /// Fails if any of the dimensions is zero.
    pub fn solved(dims: Dimensions) -> Result<Cube, TopologyError> {
        Cube::from_dimensions(dims, MoveSet::ALL)
    }

    /// Glue six faces, given in `FaceName::ALL` order, into a cuboid.
    ///
    /// # Errors
    ///
    /// The front face decides the height and width and the left face the length; fails if any other face doesn't fit.
    pub fn from_faces(faces: [Face; 6], permitted: MoveSet) -> Result<Cube, TopologyError> {
        let mut faces = Faces::new(faces);

        let (height, width) = faces[FaceName::Front].shape();
        let (_, length) = faces[FaceName::Left].shape();
        let dims = Dimensions::new(height, width, length);

        for (name, face) in faces.iter() {
            let expected = dims.shape(name);
            if face.shape() != expected {
                return Err(TopologyError::MismatchedFaces {
                    face: name,
                    found: face.shape(),
                    expected,
                });
            }
        }

        for (target, neighbors) in WIRING {
            faces.attach(target, neighbors)?;
        }

        Ok(Cube { faces, permitted })
    }

    #[must_use]
    pub fn dims(&self) -> Dimensions {
        let (height, width) = self.faces[FaceName::Front].shape();
        let (_, length) = self.faces[FaceName::Left].shape();

        Dimensions::new(height, width, length)
    }

    #[must_use]
    pub fn permitted_moves(&self) -> MoveSet {
        self.permitted
    }

    #[must_use]
    pub fn with_permitted_moves(mut self, permitted: MoveSet) -> Cube {
        self.permitted = permitted;
        self
    }

    #[must_use]
    pub fn face(&self, name: FaceName) -> &Face {
        &self.faces[name]
    }

    /// The faces in up, left, front, right, back, down order
    pub fn faces(&self) -> impl Iterator<Item = (FaceName, &Face)> {
        self.faces.iter()
    }

    /// Whether every face shows a single color
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.faces().all(|(_, face)| face.is_uniform())
    }

    /// The cube after performing `move_`.
    ///
    /// # Errors
    ///
    /// Fails if the move isn't permitted or the face can't be turned that far.
    pub fn apply(&self, move_: Move) -> Result<Cube, CubeError> {
        let mut next = self.clone();
        next.apply_in_place(move_)?;
        Ok(next)
    }

    /// The cube after performing every move in order.
    ///
    /// # Errors
    ///
    /// Fails on the first move that can't be performed, in which case no partial result is produced.
    pub fn apply_sequence(&self, moves: &[Move]) -> Result<Cube, CubeError> {
        let mut next = self.clone();

        for &move_ in moves {
            next.apply_in_place(move_)?;
        }

        Ok(next)
    }

    /// Parse and perform a whitespace separated move sequence such as `"R2 U2"`.
    ///
    /// # Errors
    ///
    /// Fails if the text doesn't parse or any move can't be performed.
    pub fn apply_str(&self, moves: &str) -> Result<Cube, CubeError> {
        self.apply_sequence(&parse_sequence(moves)?)
    }

    fn apply_in_place(&mut self, move_: Move) -> Result<(), CubeError> {
        if !self.permitted.contains(move_) {
            return Err(CubeError::IllegalMove {
                illegal: move_,
                allowed: self.permitted,
            });
        }

        trace!("Turning {:?} by {move_}", move_.face());

        self.faces.rotate(move_.face(), move_.quarter_turns())?;

        Ok(())
    }
}

impl PartialEq for Cube {
    fn eq(&self, other: &Self) -> bool {
        self.faces == other.faces
    }
}

impl Eq for Cube {}

impl Hash for Cube {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.faces.hash(state);
    }
}

impl PartialOrd for Cube {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cube {
    fn cmp(&self, other: &Self) -> Ordering {
        self.faces.cmp(&other.faces)
    }
}

/// Prints the unfolded net: up on top, then left, front, right and back side by side, then down.
impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = " ".repeat(2 * self.dims().length + 1);
        let cap = |name: FaceName| {
            self.face(name)
                .rows()
                .map(|row| format!("{indent}{}", row.iter().join(" ")))
                .collect_vec()
        };

        let band = (0..self.dims().height)
            .map(|row| {
                [FaceName::Left, FaceName::Front, FaceName::Right, FaceName::Back]
                    .into_iter()
                    .map(|name| {
                        self.face(name)
                            .rows()
                            .nth(row)
                            .map(|row| row.iter().join(" "))
                            .unwrap_or_default()
                    })
                    .join("  ")
            })
            .collect_vec();

        let blocks = [cap(FaceName::Up), band, cap(FaceName::Down)];

        write!(
            f,
            "{}",
            blocks.iter().map(|block| block.join("\n")).join("\n\n")
        )
    }
}
