// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// A type whose values map to and from positions in a declared value list.
///
/// The wire form of an enum is its ordinal, written as an unsigned 16-bit value. Ordinals are
/// an index into the type's own declared order, so producer and consumer must agree on that
/// order - appending new values is wire-compatible, reordering existing ones is not.
pub trait Enumerated: Sized {
    /// The position of this value in the type's declared value list.
    fn ordinal(&self) -> usize;

    /// The value at `ordinal` in the type's declared value list, or `None` if the ordinal is
    /// out of range.
    fn from_ordinal(ordinal: usize) -> Option<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Eq, PartialEq)]
    enum Direction {
        North,
        East,
        South,
        West,
    }

    impl Enumerated for Direction {
        fn ordinal(&self) -> usize {
            match self {
                Self::North => 0,
                Self::East => 1,
                Self::South => 2,
                Self::West => 3,
            }
        }

        fn from_ordinal(ordinal: usize) -> Option<Self> {
            match ordinal {
                0 => Some(Self::North),
                1 => Some(Self::East),
                2 => Some(Self::South),
                3 => Some(Self::West),
                _ => None,
            }
        }
    }

    #[test]
    fn ordinals_round_trip() {
        for ordinal in 0..4 {
            let value = Direction::from_ordinal(ordinal).unwrap();
            assert_eq!(value.ordinal(), ordinal);
        }

        assert_eq!(Direction::from_ordinal(4), None);
    }
}
