use std::fmt;

use thiserror::Error;

/// The color of a single sticker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Green,
    Red,
    Yellow,
    Orange,
    Blue,
    White,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown color {0:?}, expected one of G R Y O B W")]
pub struct UnknownColor(pub char);

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Green,
        Color::Red,
        Color::Yellow,
        Color::Orange,
        Color::Blue,
        Color::White,
    ];

    /// The single letter used when printing a net of the cube
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Color::Green => 'G',
            Color::Red => 'R',
            Color::Yellow => 'Y',
            Color::Orange => 'O',
            Color::Blue => 'B',
            Color::White => 'W',
        }
    }
}

impl TryFrom<char> for Color {
    type Error = UnknownColor;

    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Color::ALL
            .into_iter()
            .find(|color| color.letter() == letter.to_ascii_uppercase())
            .ok_or(UnknownColor(letter))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn letters_round_trip() {
        for color in Color::ALL {
            assert_eq!(Color::try_from(color.letter()), Ok(color));
        }

        assert_eq!(Color::try_from('w'), Ok(Color::White));
        assert_eq!(Color::try_from('X'), Err(UnknownColor('X')));
    }

    #[test_log::test]
    fn ordinals_are_stable() {
        let mut sorted = Color::ALL;
        sorted.sort_unstable();
        assert_eq!(sorted, Color::ALL);
    }
}
