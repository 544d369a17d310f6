use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Index, IndexMut},
};

use itertools::Itertools;
use thiserror::Error;

use crate::{Color, moves::FaceName};

/// One of the four edges of a face, as seen when looking straight at it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Up,
    Right,
    Down,
    Left,
}

impl Side {
    /// Clockwise order, starting from the top
    pub const ALL: [Side; 4] = [Side::Up, Side::Right, Side::Down, Side::Left];
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Up => "up",
            Side::Right => "right",
            Side::Down => "down",
            Side::Left => "left",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("A face needs at least one row and one column, got {rows}x{cols}")]
    EmptyFace { rows: usize, cols: usize },
    #[error("A {rows}x{cols} face has too many stickers to store")]
    TooLarge { rows: usize, cols: usize },
    #[error("Row {row} has {found} stickers but the first row has {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{face:?} cannot be its own {direction} neighbor")]
    SelfContact { face: FaceName, direction: Side },
    #[error("{face:?} is attached to {neighbor:?} more than once")]
    DuplicateNeighbor { face: FaceName, neighbor: FaceName },
    #[error(
        "The {direction} edge of {face:?} has {expected} stickers but the {contact} edge of {neighbor:?} has {found}"
    )]
    ContactLength {
        face: FaceName,
        direction: Side,
        neighbor: FaceName,
        contact: Side,
        expected: usize,
        found: usize,
    },
    #[error("{face:?} is {found:?} but the front and left faces call for {expected:?}")]
    MismatchedFaces {
        face: FaceName,
        found: (usize, usize),
        expected: (usize, usize),
    },
    #[error("{0:?} is not attached to its neighbors and cannot be turned")]
    Detached(FaceName),
    #[error("{face:?} is {rows}x{cols}, only square faces can be turned by a quarter")]
    QuarterTurnOnRectangle {
        face: FaceName,
        rows: usize,
        cols: usize,
    },
}

/// Where a face touches one of its neighbors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    neighbor: FaceName,
    contact: Side,
    reversed: bool,
}

impl Link {
    #[must_use]
    pub fn neighbor(self) -> FaceName {
        self.neighbor
    }

    /// The edge of the neighbor that runs along this face
    #[must_use]
    pub fn contact(self) -> Side {
        self.contact
    }

    /// Whether the neighbor stores the shared edge in the opposite order to this face's own rows and columns
    #[must_use]
    pub fn reversed(self) -> bool {
        self.reversed
    }
}

/// Whether the strip read from a neighbor's `contact` edge runs against the row/column order of the face it lies on the `direction` side of.
///
/// This table belongs to the six-way wiring in `cube`, a different unfolding would need a different one.
fn contact_reversed(direction: Side, contact: Side) -> bool {
    matches!(
        (direction, contact),
        (Side::Up, Side::Up | Side::Right)
            | (Side::Right, Side::Up)
            | (Side::Down, Side::Down | Side::Left)
            | (Side::Left, Side::Down)
    )
}

/// Whether a strip on the `direction` side changes orientation while travelling `quarter_turns` positions clockwise.
///
/// Strips are held in the face's row/column order: a column that moves into a row position (or the reverse) flips on every other step.
fn flips_during_turn(direction: Side, quarter_turns: u8) -> bool {
    match direction {
        Side::Up | Side::Down => quarter_turns >= 2,
        Side::Right | Side::Left => quarter_turns == 1 || quarter_turns == 2,
    }
}

/// A rectangular grid of stickers along with links to the four faces around it
#[derive(Clone, Debug)]
pub struct Face {
    rows: usize,
    cols: usize,
    cells: Box<[Color]>,
    links: Option<[Link; 4]>,
}

impl Face {
    /// Create a detached face of a single color.
    ///
    /// # Errors
    ///
    /// Fails if either extent is zero, or if the grid has more stickers than fit in memory.
    pub fn new(color: Color, (rows, cols): (usize, usize)) -> Result<Face, TopologyError> {
        if rows == 0 || cols == 0 {
            return Err(TopologyError::EmptyFace { rows, cols });
        }

        let len = rows
            .checked_mul(cols)
            .filter(|&len| len <= isize::MAX.unsigned_abs())
            .ok_or(TopologyError::TooLarge { rows, cols })?;

        Ok(Face {
            rows,
            cols,
            cells: vec![color; len].into_boxed_slice(),
            links: None,
        })
    }

    /// Create a detached face from explicit rows of stickers.
    ///
    /// # Errors
    ///
    /// Fails if there are no stickers or the rows differ in length.
    pub fn from_rows<R: AsRef<[Color]>>(rows: &[R]) -> Result<Face, TopologyError> {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());

        if rows.is_empty() || cols == 0 {
            return Err(TopologyError::EmptyFace {
                rows: rows.len(),
                cols,
            });
        }

        if let Some((row, found)) = rows
            .iter()
            .map(|row| row.as_ref().len())
            .enumerate()
            .find(|&(_, len)| len != cols)
        {
            return Err(TopologyError::RaggedRows {
                row,
                expected: cols,
                found,
            });
        }

        Ok(Face {
            rows: rows.len(),
            cols,
            cells: rows
                .iter()
                .flat_map(|row| row.as_ref().iter().copied())
                .collect(),
            links: None,
        })
    }

    /// `(rows, cols)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<Color> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.cells.chunks(self.cols)
    }

    /// Whether every sticker has the same color
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.cells.iter().all_equal()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.links.is_some()
    }

    /// The neighbor on the given side, if the face is attached
    #[must_use]
    pub fn link(&self, direction: Side) -> Option<Link> {
        self.links.map(|links| links[direction as usize])
    }

    /// Number of stickers along the given edge
    #[must_use]
    pub fn edge_len(&self, side: Side) -> usize {
        match side {
            Side::Up | Side::Down => self.cols,
            Side::Right | Side::Left => self.rows,
        }
    }

    /// `(start, step)` of the cells that make up an edge
    fn edge_layout(&self, side: Side) -> (usize, usize) {
        match side {
            Side::Up => (0, 1),
            Side::Right => (self.cols - 1, self.cols),
            Side::Down => ((self.rows - 1) * self.cols, 1),
            Side::Left => (0, self.cols),
        }
    }

    /// The stickers along an edge, top to bottom or left to right
    #[must_use]
    pub fn edge(&self, side: Side) -> Vec<Color> {
        let (start, step) = self.edge_layout(side);

        (0..self.edge_len(side))
            .map(|i| self.cells[start + i * step])
            .collect()
    }

    fn set_edge(&mut self, side: Side, strip: &[Color]) {
        debug_assert_eq!(strip.len(), self.edge_len(side));

        let (start, step) = self.edge_layout(side);

        for (i, &color) in strip.iter().enumerate() {
            self.cells[start + i * step] = color;
        }
    }

    /// Turn the grid itself clockwise by 90°. A `rows × cols` grid becomes `cols × rows`.
    fn rotate_clockwise(&mut self) {
        let (rows, cols) = (self.rows, self.cols);

        let cells = (0..cols)
            .flat_map(|row| (0..rows).map(move |col| (row, col)))
            .map(|(row, col)| self.cells[(rows - 1 - col) * cols + row])
            .collect();

        self.cells = cells;
        self.rows = cols;
        self.cols = rows;
    }
}

impl Index<(usize, usize)> for Face {
    type Output = Color;

    fn index(&self, (row, col): (usize, usize)) -> &Color {
        assert!(row < self.rows && col < self.cols, "Sticker out of range");
        &self.cells[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Face {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Color {
        assert!(row < self.rows && col < self.cols, "Sticker out of range");
        &mut self.cells[row * self.cols + col]
    }
}

// Two faces are the same if their stickers are, regardless of how they are wired

impl PartialEq for Face {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.cells == other.cells
    }
}

impl Eq for Face {}

impl Hash for Face {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows.hash(state);
        self.cols.hash(state);
        self.cells.hash(state);
    }
}

impl PartialOrd for Face {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Face {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.rows, self.cols, &self.cells).cmp(&(other.rows, other.cols, &other.cells))
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.rows().map(|row| row.iter().join(" ")).join("\n")
        )
    }
}

/// The six faces of a cuboid. Neighbor links are indices into this arena, so the faces never reference each other directly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Faces([Face; 6]);

impl Faces {
    /// Gather six detached faces, given in `FaceName::ALL` order
    #[must_use]
    pub fn new(faces: [Face; 6]) -> Faces {
        Faces(faces)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FaceName, &Face)> {
        FaceName::ALL.into_iter().zip(&self.0)
    }

    /// Wire `target` to its neighbors, given in up, right, down, left order along with the edge of each neighbor that touches `target`.
    ///
    /// # Errors
    ///
    /// Fails if a neighbor is `target` itself or appears twice, or if a neighbor's touching edge is not as long as the matching edge of `target`. Nothing is changed on failure.
    pub fn attach(
        &mut self,
        target: FaceName,
        neighbors: [(FaceName, Side); 4],
    ) -> Result<(), TopologyError> {
        for (i, (direction, (neighbor, contact))) in Side::ALL.into_iter().zip(neighbors).enumerate() {
            if neighbor == target {
                return Err(TopologyError::SelfContact {
                    face: target,
                    direction,
                });
            }

            if neighbors[..i].iter().any(|&(seen, _)| seen == neighbor) {
                return Err(TopologyError::DuplicateNeighbor {
                    face: target,
                    neighbor,
                });
            }

            let expected = self[target].edge_len(direction);
            let found = self[neighbor].edge_len(contact);

            if expected != found {
                return Err(TopologyError::ContactLength {
                    face: target,
                    direction,
                    neighbor,
                    contact,
                    expected,
                    found,
                });
            }
        }

        let links = std::array::from_fn(|i| {
            let (neighbor, contact) = neighbors[i];
            Link {
                neighbor,
                contact,
                reversed: contact_reversed(Side::ALL[i], contact),
            }
        });

        self[target].links = Some(links);

        Ok(())
    }

    /// Turn `target` clockwise by `times` quarter turns, carrying the strips of stickers on the neighboring faces around with it.
    ///
    /// # Errors
    ///
    /// Fails if `target` is detached, or on an odd number of quarter turns of a face that isn't square. Nothing is changed on failure.
    pub fn rotate(&mut self, target: FaceName, times: u8) -> Result<(), TopologyError> {
        let quarter_turns = times % 4;

        let face = &self[target];
        let links = face.links.ok_or(TopologyError::Detached(target))?;

        if quarter_turns == 0 {
            return Ok(());
        }

        let (rows, cols) = face.shape();
        if quarter_turns % 2 == 1 && rows != cols {
            return Err(TopologyError::QuarterTurnOnRectangle {
                face: target,
                rows,
                cols,
            });
        }

        // Bring every strip into the target's row/column order, then into the orientation it will have after the turn
        let mut strips: [Vec<Color>; 4] = std::array::from_fn(|i| {
            let link = links[i];
            let mut strip = self[link.neighbor].edge(link.contact);

            if link.reversed != flips_during_turn(Side::ALL[i], quarter_turns) {
                strip.reverse();
            }

            strip
        });

        strips.rotate_right(usize::from(quarter_turns));

        for (link, mut strip) in links.into_iter().zip(strips) {
            if link.reversed {
                strip.reverse();
            }

            self[link.neighbor].set_edge(link.contact, &strip);
        }

        let face = &mut self[target];
        for _ in 0..quarter_turns {
            face.rotate_clockwise();
        }

        Ok(())
    }
}

impl Index<FaceName> for Faces {
    type Output = Face;

    fn index(&self, name: FaceName) -> &Face {
        &self.0[name.index()]
    }
}

impl IndexMut<FaceName> for Faces {
    fn index_mut(&mut self, name: FaceName) -> &mut Face {
        &mut self.0[name.index()]
    }
}
