//! Core particle state for the rigid-body simulation.
//!
//! Defines the particle store:
//! - `Particle`          one sample of a rigid solid (or a free/wall particle)
//! - `TangentialContact` persistent frictional state carried by a particle
//! - `ParticleSystem`    the list of particles and the current simulation time `t`
//!
//! Bodies own no particle list; membership is the particle's `body` tag.

use std::fmt;

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

/// Identifier of a rigid body, dense in `0..n_bodies`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Frictional contact state of one particle (one active contact per particle)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentialContact {
    pub displacement: NVec3, // accumulated tangential slip
    pub velocity: NVec3,     // tangential relative velocity of the last contact
}

impl TangentialContact {
    pub fn zero() -> Self {
        Self {
            displacement: NVec3::zeros(),
            velocity: NVec3::zeros(),
        }
    }
}

impl Default for TangentialContact {
    fn default() -> Self {
        Self::zero()
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub id: usize,
    pub x: NVec3,                  // position
    pub v: NVec3,                  // velocity
    pub m: f64,                    // mass
    pub f: NVec3,                  // accumulated force, rebuilt every evaluation
    pub body: Option<BodyId>,      // owning body, None for free/wall particles
    pub radius: f64,               // contact radius
    pub contact: TangentialContact, // persistent frictional state
    pub number_density: f64,       // boundary number density for fluid coupling
}

impl Particle {
    /// Particle at rest with no force and no contact history
    pub fn new(id: usize, x: NVec3, m: f64, radius: f64, body: Option<BodyId>) -> Self {
        Self {
            id,
            x,
            v: NVec3::zeros(),
            m,
            f: NVec3::zeros(),
            body,
            radius,
            contact: TangentialContact::zero(),
            number_density: 0.0,
        }
    }

    pub fn with_velocity(mut self, v: NVec3) -> Self {
        self.v = v;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pub particles: Vec<Particle>, // every particle, rigid or not
    pub t: f64,                   // time
}

impl ParticleSystem {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles, t: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Zero the force accumulator of every particle
    pub fn clear_forces(&mut self) {
        for p in self.particles.iter_mut() {
            p.f = NVec3::zeros();
        }
    }

    /// Iterate over the particles owned by `body`
    pub fn members(&self, body: BodyId) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(move |p| p.body == Some(body))
    }

    /// Advance the persisted tangential displacement by the stored tangential
    /// velocity: xi += v_t * dt
    pub fn integrate_tangential_displacement(&mut self, dt: f64) {
        for p in self.particles.iter_mut() {
            p.contact.displacement += dt * p.contact.velocity;
        }
    }
}
