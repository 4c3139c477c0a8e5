//! Axis-aligned trigger volumes and the zones built on them.

use glam::Vec3;
use log::info;

use crate::entity::{Entity, EntityId};
use crate::scene::Scene;

/// An axis-aligned box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerVolume {
    /// Box centre.
    pub center: Vec3,
    /// Non-negative half size along each axis.
    pub half_extents: Vec3,
}

impl TriggerVolume {
    /// A box around `center`; negative extents are flipped.
    #[must_use]
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Volume of an entity's body bounds; a point for bodiless entities.
    #[must_use]
    pub fn of(entity: &Entity) -> Self {
        Self::new(entity.position, entity.half_extents())
    }

    /// Lowest corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    /// Highest corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Whether the two boxes overlap on every axis. Touching faces count.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec3;
    /// use playfield::trigger::TriggerVolume;
    /// let a = TriggerVolume::new(Vec3::ZERO, Vec3::ONE);
    /// let b = TriggerVolume::new(Vec3::new(2.0, 0.0, 0.0), Vec3::ONE);
    /// assert!(a.intersects(&b));
    /// ```
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min().cmple(other.max()).all() && self.max().cmpge(other.min()).all()
    }
}

/// An edge in a zone's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// The tracked entity started overlapping the zone.
    Entered {
        /// Zone entity.
        zone: EntityId,
        /// Tracked entity.
        entity: EntityId,
    },
    /// The tracked entity stopped overlapping the zone.
    Exited {
        /// Zone entity.
        zone: EntityId,
        /// Tracked entity.
        entity: EntityId,
    },
}

/// Watches one entity against a zone entity's box.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerZone {
    zone: EntityId,
    tracked: EntityId,
    half_extents: Vec3,
    occupied: bool,
}

impl TriggerZone {
    /// The zone box is centred on `zone` and follows it if it moves.
    #[must_use]
    pub fn new(zone: EntityId, tracked: EntityId, half_extents: Vec3) -> Self {
        Self {
            zone,
            tracked,
            half_extents,
            occupied: false,
        }
    }

    /// The zone entity.
    #[must_use]
    pub const fn zone(&self) -> EntityId {
        self.zone
    }

    /// The watched entity.
    #[must_use]
    pub const fn tracked(&self) -> EntityId {
        self.tracked
    }

    /// Level state as of the last [`TriggerZone::update`].
    #[must_use]
    pub const fn occupied(&self) -> bool {
        self.occupied
    }

    /// Re-evaluates the overlap, reporting the transition if any. A missing
    /// zone or tracked entity counts as no overlap.
    pub fn update(&mut self, scene: &Scene) -> Option<TriggerEvent> {
        let now = match (scene.get(self.zone), scene.get(self.tracked)) {
            (Some(zone), Some(tracked)) => TriggerVolume::new(zone.position, self.half_extents)
                .intersects(&TriggerVolume::of(tracked)),
            _ => false,
        };
        if now == self.occupied {
            return None;
        }
        self.occupied = now;
        let (zone, entity) = (self.zone, self.tracked);
        let event = if now {
            TriggerEvent::Entered { zone, entity }
        } else {
            TriggerEvent::Exited { zone, entity }
        };
        info!("{event:?}");
        Some(event)
    }
}
