//! Seating ring
//!
//! Players sit in a fixed circle. Left is the previous seat, right is the
//! next seat, and every offset wraps around the ring.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ScoreError};

/// Fewest players a game can seat.
pub const MIN_PLAYERS: usize = 3;

/// Most players a game can seat.
pub const MAX_PLAYERS: usize = 7;

/// Opaque player identifier assigned by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Validated circular seating order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PlayerId>", into = "Vec<PlayerId>")]
pub struct SeatingRing {
    seats: Vec<PlayerId>,
}

impl SeatingRing {
    /// Build a ring from seat order, rejecting bad sizes and duplicates.
    pub fn new(seats: Vec<PlayerId>) -> Result<Self> {
        if seats.len() < MIN_PLAYERS || seats.len() > MAX_PLAYERS {
            return Err(ScoreError::RingSize(seats.len()));
        }
        for (i, id) in seats.iter().enumerate() {
            if seats[..i].contains(id) {
                return Err(ScoreError::DuplicatePlayer(*id));
            }
        }
        Ok(Self { seats })
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Always false: a valid ring has at least `MIN_PLAYERS` seats.
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Players in seat order
    pub fn players(&self) -> &[PlayerId] {
        &self.seats
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.seats.contains(&player)
    }

    /// Seat index of `player`
    pub fn position(&self, player: PlayerId) -> Result<usize> {
        self.seats
            .iter()
            .position(|p| *p == player)
            .ok_or(ScoreError::UnknownPlayer(player))
    }

    /// Player `steps` seats away; negative steps go left.
    pub fn offset(&self, player: PlayerId, steps: isize) -> Result<PlayerId> {
        let n = self.seats.len() as isize;
        let i = self.position(player)? as isize;
        let j = (i + steps).rem_euclid(n);
        Ok(self.seats[j as usize])
    }

    pub fn left_of(&self, player: PlayerId) -> Result<PlayerId> {
        self.offset(player, -1)
    }

    pub fn right_of(&self, player: PlayerId) -> Result<PlayerId> {
        self.offset(player, 1)
    }

    /// (left, right) neighbors of `player`
    pub fn neighbors(&self, player: PlayerId) -> Result<(PlayerId, PlayerId)> {
        Ok((self.left_of(player)?, self.right_of(player)?))
    }
}

impl TryFrom<Vec<PlayerId>> for SeatingRing {
    type Error = ScoreError;

    fn try_from(seats: Vec<PlayerId>) -> Result<Self> {
        Self::new(seats)
    }
}

impl From<SeatingRing> for Vec<PlayerId> {
    fn from(ring: SeatingRing) -> Self {
        ring.seats
    }
}
