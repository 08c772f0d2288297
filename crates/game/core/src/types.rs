//! Primitive value types shared by every engine component.

use std::fmt;

/// Unique identifier for an actor (player) known to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Instant on the engine timeline, in milliseconds.
///
/// The origin is arbitrary (the runtime uses worker start); only differences
/// between timestamps are meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Whole seconds elapsed since `earlier`, rounded down.
    ///
    /// Saturates at zero when `earlier` lies in the future.
    pub const fn secs_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0) / 1000
    }

    pub const fn after_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    pub const fn after_secs(self, secs: u64) -> Self {
        self.after_millis(secs.saturating_mul(1000))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}

/// Identifies a spatial context (dimension). Locations in different worlds
/// never interact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldId(pub u16);

impl WorldId {
    pub const OVERWORLD: Self = Self(0);
}

/// Three-component vector used for offsets and velocities.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > f64::EPSILON {
            self.scale(1.0 / len)
        } else {
            Self::ZERO
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl std::ops::Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// A point inside a specific world.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(world: WorldId, x: f64, y: f64, z: f64) -> Self {
        Self { world, x, y, z }
    }

    pub fn same_world(&self, other: &Location) -> bool {
        self.world == other.world
    }

    /// Squared euclidean distance, or `None` across worlds.
    pub fn distance_squared(&self, other: &Location) -> Option<f64> {
        self.same_world(other).then(|| self.offset_to(other).length_squared())
    }

    /// Euclidean distance, or `None` across worlds.
    pub fn distance(&self, other: &Location) -> Option<f64> {
        self.distance_squared(other).map(f64::sqrt)
    }

    /// Vector pointing from `self` to `other`, ignoring worlds.
    pub fn offset_to(&self, other: &Location) -> Vector {
        Vector::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn translated(&self, by: Vector) -> Self {
        Self::new(self.world, self.x + by.x, self.y + by.y, self.z + by.z)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "w{}({:.1}, {:.1}, {:.1})",
            self.world.0, self.x, self.y, self.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secs_since_rounds_down() {
        let start = Timestamp::from_secs(10);
        assert_eq!(Timestamp::from_millis(10_999).secs_since(start), 0);
        assert_eq!(Timestamp::from_millis(11_000).secs_since(start), 1);
        assert_eq!(Timestamp::ZERO.secs_since(start), 0);
    }

    #[test]
    fn distance_is_undefined_across_worlds() {
        let a = Location::new(WorldId(0), 0.0, 0.0, 0.0);
        let b = Location::new(WorldId(1), 0.0, 0.0, 0.0);
        let c = Location::new(WorldId(0), 3.0, 4.0, 0.0);

        assert_eq!(a.distance(&b), None);
        assert_eq!(a.distance(&c), Some(5.0));
    }
}
