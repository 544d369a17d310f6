use std::{
    fmt,
    ops::{BitOr, BitOrAssign},
    str::FromStr,
};

use itertools::Itertools;
use thiserror::Error;

use crate::cube::Dimensions;

/// One of the six faces of the cuboid. The declaration order is the order faces are compared, hashed and printed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaceName {
    Up,
    Left,
    Front,
    Right,
    Back,
    Down,
}

impl FaceName {
    pub const ALL: [FaceName; 6] = [
        FaceName::Up,
        FaceName::Left,
        FaceName::Front,
        FaceName::Right,
        FaceName::Back,
        FaceName::Down,
    ];

    /// Position of this face in the arena
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            FaceName::Up => 'U',
            FaceName::Left => 'L',
            FaceName::Front => 'F',
            FaceName::Right => 'R',
            FaceName::Back => 'B',
            FaceName::Down => 'D',
        }
    }

    #[must_use]
    pub fn from_letter(letter: char) -> Option<FaceName> {
        FaceName::ALL.into_iter().find(|face| face.letter() == letter)
    }
}

impl fmt::Display for FaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// How far a face is turned, in clockwise quarter turns
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Turn {
    Clockwise,
    Half,
    CounterClockwise,
}

impl Turn {
    pub const ALL: [Turn; 3] = [Turn::Clockwise, Turn::Half, Turn::CounterClockwise];

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self as u8 + 1
    }

    /// Returns `None` for a multiple of four, which is no turn at all
    #[must_use]
    pub const fn from_quarter_turns(quarter_turns: u8) -> Option<Turn> {
        match quarter_turns % 4 {
            1 => Some(Turn::Clockwise),
            2 => Some(Turn::Half),
            3 => Some(Turn::CounterClockwise),
            _ => None,
        }
    }

    #[must_use]
    pub const fn inverse(self) -> Turn {
        match self {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::Half => Turn::Half,
            Turn::CounterClockwise => Turn::Clockwise,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Turn::Clockwise => "",
            Turn::Half => "2",
            Turn::CounterClockwise => "'",
        }
    }
}

/// A turn of a single face
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    face: FaceName,
    turn: Turn,
}

/// The result of following one move by another
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combined {
    /// The moves turn different faces and cannot be merged
    Distinct,
    /// The moves cancel out
    Identity,
    /// The moves merge into a single turn of the same face
    Same(Move),
}

impl Move {
    /// Every move in canonical order: faces in `FaceName::ALL` order, each as clockwise, half and counter-clockwise turn.
    pub const ALL: [Move; MoveSet::CAPACITY] = {
        let mut out = [Move::new(FaceName::Up, Turn::Clockwise); MoveSet::CAPACITY];
        let mut i = 0;
        while i < MoveSet::CAPACITY {
            out[i] = Move::from_index(i);
            i += 1;
        }
        out
    };

    #[must_use]
    pub const fn new(face: FaceName, turn: Turn) -> Move {
        Move { face, turn }
    }

    #[must_use]
    pub const fn from_quarter_turns(face: FaceName, quarter_turns: u8) -> Option<Move> {
        match Turn::from_quarter_turns(quarter_turns) {
            Some(turn) => Some(Move::new(face, turn)),
            None => None,
        }
    }

    const fn from_index(index: usize) -> Move {
        Move::new(FaceName::ALL[index / 3], Turn::ALL[index % 3])
    }

    const fn index(self) -> usize {
        self.face.index() * 3 + self.turn as usize
    }

    #[must_use]
    pub fn face(self) -> FaceName {
        self.face
    }

    #[must_use]
    pub fn turn(self) -> Turn {
        self.turn
    }

    #[must_use]
    pub fn quarter_turns(self) -> u8 {
        self.turn.quarter_turns()
    }

    /// The move that undoes this one
    #[must_use]
    pub fn inverse(self) -> Move {
        Move::new(self.face, self.turn.inverse())
    }

    /// Turns of the same face commute, so following one by another adds their quarter turns mod 4.
    #[must_use]
    pub fn combine(self, then: Move) -> Combined {
        if self.face != then.face {
            return Combined::Distinct;
        }

        match Move::from_quarter_turns(self.face, self.quarter_turns() + then.quarter_turns()) {
            Some(merged) => Combined::Same(merged),
            None => Combined::Identity,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.face, self.turn.suffix())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized move {0:?}, expected a face letter from ULFRBD optionally followed by ', 2 or 2'")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.chars();

        let face = chars
            .next()
            .and_then(FaceName::from_letter)
            .ok_or_else(|| ParseMoveError(token.to_owned()))?;

        let turn = match chars.as_str() {
            "" => Turn::Clockwise,
            "2" | "2'" => Turn::Half,
            "'" => Turn::CounterClockwise,
            _ => return Err(ParseMoveError(token.to_owned())),
        };

        Ok(Move::new(face, turn))
    }
}

/// A move sequence contained a token that is not a move
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized move {token:?} at position {position}")]
pub struct ParseError {
    pub token: String,
    /// Index of the token in the whitespace separated sequence
    pub position: usize,
}

/// Parse a whitespace separated sequence of moves such as `"R2 U' F"`.
///
/// # Errors
///
/// Fails on the first token that is not a move.
pub fn parse_sequence(text: &str) -> Result<Vec<Move>, ParseError> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse().map_err(|_| ParseError {
                token: token.to_owned(),
                position,
            })
        })
        .collect()
}

/// Merge adjacent turns of the same face and drop the ones that cancel.
#[must_use]
pub fn simplify(moves: &[Move]) -> Vec<Move> {
    let mut out: Vec<Move> = Vec::with_capacity(moves.len());

    for &move_ in moves {
        let Some(last) = out.last_mut() else {
            out.push(move_);
            continue;
        };

        match last.combine(move_) {
            Combined::Same(merged) => *last = merged,
            Combined::Identity => {
                out.pop();
            }
            Combined::Distinct => out.push(move_),
        }
    }

    out
}

/// A set of moves, stored as one bit per entry of `Move::ALL`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveSet(u32);

impl MoveSet {
    pub const CAPACITY: usize = 18;

    pub const EMPTY: MoveSet = MoveSet(0);

    /// Every quarter and half turn of every face
    pub const ALL: MoveSet = MoveSet((1 << MoveSet::CAPACITY) - 1);

    /// Only the half turns, which are possible on every face regardless of its shape
    #[must_use]
    pub fn half_turns() -> MoveSet {
        FaceName::ALL
            .into_iter()
            .map(|face| Move::new(face, Turn::Half))
            .collect()
    }

    /// The moves that are geometrically possible on a cuboid of the given dimensions. Quarter turns need a square face.
    #[must_use]
    pub fn feasible(dims: Dimensions) -> MoveSet {
        Move::ALL
            .into_iter()
            .filter(|move_| {
                let (rows, cols) = dims.shape(move_.face());
                move_.turn() == Turn::Half || rows == cols
            })
            .collect()
    }

    #[must_use]
    pub fn contains(self, move_: Move) -> bool {
        self.0 & (1 << move_.index()) != 0
    }

    /// Returns whether the move was newly inserted
    pub fn insert(&mut self, move_: Move) -> bool {
        let fresh = !self.contains(move_);
        self.0 |= 1 << move_.index();
        fresh
    }

    pub fn remove(&mut self, move_: Move) -> bool {
        let present = self.contains(move_);
        self.0 &= !(1 << move_.index());
        present
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn union(self, other: MoveSet) -> MoveSet {
        MoveSet(self.0 | other.0)
    }

    /// Iterate in `Move::ALL` order
    pub fn iter(self) -> impl Iterator<Item = Move> {
        Move::ALL
            .into_iter()
            .filter(move |&move_| self.contains(move_))
    }
}

impl FromIterator<Move> for MoveSet {
    fn from_iter<T: IntoIterator<Item = Move>>(iter: T) -> Self {
        let mut set = MoveSet::EMPTY;
        set.extend(iter);
        set
    }
}

impl Extend<Move> for MoveSet {
    fn extend<T: IntoIterator<Item = Move>>(&mut self, iter: T) {
        for move_ in iter {
            self.insert(move_);
        }
    }
}

impl BitOr for MoveSet {
    type Output = MoveSet;

    fn bitor(self, rhs: MoveSet) -> MoveSet {
        self.union(rhs)
    }
}

impl BitOrAssign for MoveSet {
    fn bitor_assign(&mut self, rhs: MoveSet) {
        *self = self.union(rhs);
    }
}

impl FromStr for MoveSet {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(parse_sequence(text)?.into_iter().collect())
    }
}

impl fmt::Display for MoveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.iter().join(", "))
    }
}

impl fmt::Debug for MoveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(token: &str) -> Move {
        token.parse().unwrap()
    }

    #[test_log::test]
    fn parse_tokens() {
        assert_eq!(m("R"), Move::new(FaceName::Right, Turn::Clockwise));
        assert_eq!(m("U2"), Move::new(FaceName::Up, Turn::Half));
        assert_eq!(m("U2'"), Move::new(FaceName::Up, Turn::Half));
        assert_eq!(m("F'"), Move::new(FaceName::Front, Turn::CounterClockwise));

        for bad in ["", "X", "R3", "r", "R''", "RU"] {
            assert_eq!(bad.parse::<Move>(), Err(ParseMoveError(bad.to_owned())));
        }
    }

    #[test_log::test]
    fn parse_sequence_reports_position() {
        assert_eq!(
            parse_sequence("R2  U'\tD").unwrap(),
            vec![m("R2"), m("U'"), m("D")]
        );
        assert_eq!(parse_sequence("   ").unwrap(), Vec::<Move>::new());
        assert_eq!(
            parse_sequence("R2 U2 Q L"),
            Err(ParseError {
                token: "Q".to_owned(),
                position: 2,
            })
        );
    }

    #[test_log::test]
    fn display_round_trips() {
        for move_ in Move::ALL {
            assert_eq!(m(&move_.to_string()), move_);
        }
    }

    #[test_log::test]
    fn canonical_order() {
        assert_eq!(Move::ALL[0], m("U"));
        assert_eq!(Move::ALL[1], m("U2"));
        assert_eq!(Move::ALL[2], m("U'"));
        assert_eq!(Move::ALL[17], m("D'"));

        for (i, move_) in Move::ALL.into_iter().enumerate() {
            assert_eq!(move_.index(), i);
        }
    }

    #[test_log::test]
    fn inverse_and_combine() {
        for move_ in Move::ALL {
            assert_eq!(move_.inverse().inverse(), move_);
            assert_eq!(move_.combine(move_.inverse()), Combined::Identity);
            assert_eq!(move_.inverse().face(), move_.face());
        }

        assert_eq!(m("R").combine(m("R")), Combined::Same(m("R2")));
        assert_eq!(m("R2").combine(m("R")), Combined::Same(m("R'")));
        assert_eq!(m("R'").combine(m("R'")), Combined::Same(m("R2")));
        assert_eq!(m("R").combine(m("U")), Combined::Distinct);

        // Same face turns commute
        for a in Turn::ALL {
            for b in Turn::ALL {
                let a = Move::new(FaceName::Left, a);
                let b = Move::new(FaceName::Left, b);
                assert_eq!(a.combine(b), b.combine(a));
            }
        }
    }

    #[test_log::test]
    fn simplify_sequences() {
        let simplified = simplify(&parse_sequence("R R U U' R F2 F2 D").unwrap());
        assert_eq!(simplified, parse_sequence("R' D").unwrap());

        assert_eq!(simplify(&parse_sequence("U U U U").unwrap()), Vec::<Move>::new());
        assert_eq!(
            simplify(&parse_sequence("U D U").unwrap()),
            parse_sequence("U D U").unwrap()
        );
    }

    #[test_log::test]
    fn move_sets() {
        assert_eq!(MoveSet::ALL.len(), 18);
        assert!(MoveSet::EMPTY.is_empty());
        assert_eq!(MoveSet::ALL.iter().collect::<Vec<_>>(), Move::ALL);

        let halves = MoveSet::half_turns();
        assert_eq!(halves.len(), 6);
        assert!(halves.iter().all(|move_| move_.turn() == Turn::Half));

        let mut set: MoveSet = "R2 U2".parse().unwrap();
        assert_eq!(set.to_string(), "{U2, R2}");
        assert!(!set.insert(m("R2")));
        assert!(set.insert(m("D")));
        assert!(set.remove(m("D")));
        assert!(!set.remove(m("D")));
        assert_eq!(set | "L2".parse().unwrap(), "U2 L2 R2".parse().unwrap());

        set |= MoveSet::from_iter([m("F2"), m("U2")]);
        assert_eq!(set, "F2 U2 R2".parse().unwrap());
    }

    #[test_log::test]
    fn feasible_moves_respect_face_shapes() {
        let cube = MoveSet::feasible(Dimensions::new(3, 3, 3));
        assert_eq!(cube, MoveSet::ALL);

        // Only the 2x2 up and down faces are square
        let tower = MoveSet::feasible(Dimensions::new(3, 2, 2));
        assert_eq!(tower, "U U2 U' R2 L2 F2 B2 D D2 D'".parse().unwrap());

        let slab = MoveSet::feasible(Dimensions::new(3, 2, 1));
        assert_eq!(slab, MoveSet::half_turns());
    }
}
