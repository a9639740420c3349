//! A rank abstraction.
//!
//! A rank identifies one process in a fixed-size group of `P` processes. Ranks are always numbered
//! `0..P` and the numbering never changes during a computation.

use std::{
    fmt,
    fmt::{Debug, Display, Formatter},
    hash::Hash,
};

/// Represents a process rank.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rank(usize);

impl Rank {
    /// Construct a rank from its index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The index of this rank within its group.
    pub const fn index(&self) -> usize {
        self.0
    }

    /// All of the ranks in a group of the given size, in order.
    pub fn all(process_count: usize) -> Vec<Rank> {
        (0..process_count).map(Rank).collect()
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for Rank {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Rank({})", self.0)
    }
}

/// A message that was sent by a particular rank.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankMessage<T> {
    /// The sender rank.
    pub sender: Rank,

    /// The message itself.
    pub message: T,
}

impl<T> RankMessage<T> {
    /// Construct a new rank message.
    pub fn new(sender: Rank, message: T) -> Self {
        Self { sender, message }
    }

    /// Decompose this rank message into its sender and inner message.
    pub fn into_parts(self) -> (Rank, T) {
        (self.sender, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_ordering() {
        let ranks = Rank::all(3);
        assert_eq!(ranks, vec![Rank::new(0), Rank::new(1), Rank::new(2)]);
        assert!(Rank::new(0) < Rank::new(2));
    }

    #[test]
    fn rank_formatting() {
        let rank = Rank::new(7);
        assert_eq!(rank.to_string(), "7");
        assert_eq!(format!("{rank:?}"), "Rank(7)");
        assert_eq!(rank.index(), 7);
    }

    #[test]
    fn message_parts() {
        let message = RankMessage::new(Rank::new(2), 42u32);
        let (sender, contents) = message.into_parts();
        assert_eq!(sender, Rank::new(2));
        assert_eq!(contents, 42);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn message_serde() {
        let message = RankMessage::new(Rank::new(3), vec![1.5f64, -2.0]);
        let encoded = serde_json::to_string(&message).unwrap();
        let decoded: RankMessage<Vec<f64>> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, message);
    }
}
