use crate::shared::{CallKey, Direction};

/**
 * Outstanding-call flags, one row per floor and one column per call direction
 * (`Up`, `Down`, no direction).
 *
 * A flag is raised when a call is accepted and lowered when the car serving it has closed its
 * doors. While raised, repeated calls with the same key are dropped.
 */
#[derive(Debug)]
pub struct PendingCalls {
    outstanding: Vec<[bool; 3]>,
}

impl PendingCalls {
    pub fn new(n_floors: u8) -> PendingCalls {
        PendingCalls {
            outstanding: vec![[false; 3]; n_floors as usize],
        }
    }

    pub fn is_outstanding(&self, key: CallKey) -> bool {
        self.outstanding
            .get(key.floor as usize)
            .map_or(false, |row| row[Direction::slot(key.direction)])
    }

    /// Raises the flag. Returns false if it was already raised.
    pub fn mark(&mut self, key: CallKey) -> bool {
        match self.outstanding.get_mut(key.floor as usize) {
            Some(row) => !std::mem::replace(&mut row[Direction::slot(key.direction)], true),
            None => false,
        }
    }

    /// Lowers the flag. Returns false if it was not raised.
    pub fn release(&mut self, key: CallKey) -> bool {
        match self.outstanding.get_mut(key.floor as usize) {
            Some(row) => std::mem::replace(&mut row[Direction::slot(key.direction)], false),
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.outstanding
            .iter()
            .map(|row| row.iter().filter(|flag| **flag).count())
            .sum()
    }
}
