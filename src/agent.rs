//! Movement seams between the world core and an external engine.
//!
//! The core decides *which* cell an agent should reach, never how it gets
//! there. On land that job belongs to an engine-side navigation service
//! behind the [`LandNav`] trait. On water the core supplies the route, and
//! [`SailVoyage`] plays it back as an explicit state machine advanced by an
//! external scheduler calling [`SailVoyage::tick`].

use glam::Vec3;

use crate::grid::GridMap;
use crate::pathfinding::SailPath;
use crate::world::Cell;

/// Contract of the external on-land navigation service.
///
/// Implementations move an agent toward the destination at a bounded speed
/// and report progress; the core only ever feeds them destination points.
pub trait LandNav {
    fn set_destination(&mut self, point: Vec3);
    fn remaining_distance(&self) -> f32;
    fn velocity(&self) -> Vec3;
}

/// Progress state reported by [`SailVoyage::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoyageStatus {
    Sailing,
    Arrived,
}

/// Waypoint playback over a sailing path.
///
/// Holds no engine callbacks: the scheduler owns the clock and calls `tick`
/// with its frame delta until `Arrived` comes back.
#[derive(Clone, Debug)]
pub struct SailVoyage {
    waypoints: Vec<Vec3>,
    next: usize,
    position: Vec3,
    speed: f32,
}

impl SailVoyage {
    /// Start a voyage along `path`, using each cell's world anchor as a
    /// waypoint. The agent starts at the first waypoint.
    pub fn from_path(path: &SailPath, cells: &GridMap<Cell>, speed: f32) -> Self {
        let waypoints: Vec<Vec3> = path
            .cells
            .iter()
            .map(|&coord| cells.get(coord).world_point)
            .collect();
        let position = waypoints.first().copied().unwrap_or(Vec3::ZERO);
        let next = if waypoints.len() <= 1 { waypoints.len() } else { 1 };
        Self {
            waypoints,
            next,
            position,
            speed: speed.max(0.0),
        }
    }

    /// Advance the voyage by `dt` seconds of travel at the bounded speed.
    pub fn tick(&mut self, dt: f32) -> VoyageStatus {
        let mut budget = self.speed * dt.max(0.0);
        while budget > 0.0 && self.next < self.waypoints.len() {
            let target = self.waypoints[self.next];
            let leg = target - self.position;
            let distance = leg.length();
            if distance <= budget {
                self.position = target;
                self.next += 1;
                budget -= distance;
            } else {
                self.position += leg / distance * budget;
                budget = 0.0;
            }
        }
        self.status()
    }

    pub fn status(&self) -> VoyageStatus {
        if self.next >= self.waypoints.len() {
            VoyageStatus::Arrived
        } else {
            VoyageStatus::Sailing
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Distance still to travel along the remaining waypoints.
    pub fn remaining_distance(&self) -> f32 {
        let mut total = 0.0;
        let mut from = self.position;
        for &wp in &self.waypoints[self.next.min(self.waypoints.len())..] {
            total += from.distance(wp);
            from = wp;
        }
        total
    }

    /// Current travel velocity; zero once arrived.
    pub fn velocity(&self) -> Vec3 {
        if self.next >= self.waypoints.len() {
            return Vec3::ZERO;
        }
        let leg = self.waypoints[self.next] - self.position;
        match leg.try_normalize() {
            Some(dir) => dir * self.speed,
            None => Vec3::ZERO,
        }
    }
}
