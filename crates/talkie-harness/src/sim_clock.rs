//! Virtual time for simulation.

use std::{
    ops::{Add, AddAssign},
    time::Duration,
};

/// A point on the simulated clock, measured from the start of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Start of the simulation.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Time since the start of the simulation.
    pub fn elapsed(self) -> Duration {
        self.0
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

impl AddAssign<Duration> for SimInstant {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}
