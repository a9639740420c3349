//! This module provides [RankJar], a type that collects one item from every rank in a group.

use crate::Rank;

/// A jar where every rank puts an element.
#[derive(Debug, Clone)]
pub struct RankJar<T> {
    elements: Vec<(Rank, T)>,
    process_count: usize,
}

impl<T> RankJar<T> {
    /// Constructs a new jar that expects one element from each of `process_count` ranks.
    pub fn new(process_count: usize) -> Self {
        let elements = Vec::with_capacity(process_count);
        Self { elements, process_count }
    }

    /// Check whether this jar is full.
    ///
    /// A jar becomes full when every rank has put their element into it.
    pub fn is_full(&self) -> bool {
        self.elements.len() == self.process_count
    }

    /// Add an element for a rank.
    ///
    /// This returns an error if the rank is outside of the group or if it already provided an element.
    pub fn add_element(&mut self, rank: Rank, element: T) -> Result<(), RankJarError> {
        if rank.index() >= self.process_count {
            return Err(RankJarError::Unknown(rank, self.process_count));
        }
        match self.elements.binary_search_by(|element| element.0.cmp(&rank)) {
            Ok(_) => Err(RankJarError::Duplicate(rank)),
            Err(index) => {
                self.elements.insert(index, (rank, element));
                Ok(())
            }
        }
    }

    /// Consume this jar and take the elements.
    ///
    /// The returned elements *are guaranteed to be sorted by rank*.
    pub fn into_elements(self) -> impl Iterator<Item = (Rank, T)> {
        self.elements.into_iter()
    }
}

/// An error when adding an element to a [RankJar].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RankJarError {
    /// A single rank provided more than one element.
    #[error("rank {0} already provided element")]
    Duplicate(Rank),

    /// The rank is not part of the group.
    #[error("rank {0} is not part of a group of {1} ranks")]
    Unknown(Rank, usize),
}
