//! Per-particle force contributors
//!
//! A [`ForceSet`] zeroes every particle's force accumulator and lets each
//! registered [`ForceTerm`] add into it. The driver runs the set once per
//! integrator stage, before body aggregation.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::simulation::contact::{ContactModel, ContactOutcome, Neighbor, NeighborQuery};
use crate::simulation::coupling::{boundary_number_density, BoundaryCoupling, FluidParticle, Kernel};
use crate::simulation::states::{NVec3, ParticleSystem};

/// Trait for force sources acting on the particle store
/// Implementations add their contribution into `p.f` for each particle
pub trait ForceTerm {
    fn apply(&mut self, t: f64, sys: &mut ParticleSystem);
}

/// Collection of force terms (body force, contact, fluid coupling, ...)
pub struct ForceSet {
    terms: Vec<Box<dyn ForceTerm + Send + Sync>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term
    pub fn with(mut self, term: impl ForceTerm + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Rebuild all particle forces at time `t`
    pub fn accumulate_forces(&mut self, t: f64, sys: &mut ParticleSystem) {
        sys.clear_forces();
        for term in self.terms.iter_mut() {
            term.apply(t, sys);
        }
    }
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform body force: f_i += m_i g
pub struct BodyForce {
    pub gravity: NVec3,
}

impl ForceTerm for BodyForce {
    fn apply(&mut self, _t: f64, sys: &mut ParticleSystem) {
        for p in sys.particles.iter_mut() {
            p.f += p.m * self.gravity;
        }
    }
}

/// DEM contact between particles of different bodies
///
/// Every particle's contact is evaluated against the same snapshot of the
/// store; forces and frictional state are committed only after all
/// particles are done.
pub struct ContactForce<Q> {
    pub model: ContactModel,
    pub neighbors: Q,
    pub parallel: bool,
}

impl<Q: NeighborQuery + Sync> ContactForce<Q> {
    pub fn new(model: ContactModel, neighbors: Q, parallel: bool) -> Self {
        Self { model, neighbors, parallel }
    }

    fn evaluate(&self, sys: &ParticleSystem) -> Vec<ContactOutcome> {
        let one = |i: usize, scratch: &mut Vec<Neighbor>| {
            self.neighbors.neighbors(i, sys, scratch);
            self.model.particle_contact(i, sys, scratch)
        };

        #[cfg(feature = "parallel")]
        if self.parallel {
            return (0..sys.len())
                .into_par_iter()
                .map_init(Vec::new, |scratch, i| one(i, scratch))
                .collect();
        }

        let mut scratch = Vec::new();
        (0..sys.len()).map(|i| one(i, &mut scratch)).collect()
    }
}

impl<Q: NeighborQuery + Sync> ForceTerm for ContactForce<Q> {
    fn apply(&mut self, _t: f64, sys: &mut ParticleSystem) {
        let outcomes = self.evaluate(sys);
        for (p, out) in sys.particles.iter_mut().zip(outcomes) {
            p.f += out.force;
            p.contact = out.contact;
        }
    }
}

/// Boundary forces from a set of fluid particles
///
/// Owns the fluid particles so an external fluid scheme can advance them
/// between evaluations through [`FluidBoundary::fluid_mut`]. Each
/// application refreshes boundary number densities, clears the fluid's
/// boundary accelerations and exchanges pressure/viscosity terms.
pub struct FluidBoundary<K> {
    pub coupling: BoundaryCoupling,
    pub kernel: K,
    fluid: Vec<FluidParticle>,
}

impl<K: Kernel> FluidBoundary<K> {
    pub fn new(coupling: BoundaryCoupling, kernel: K, fluid: Vec<FluidParticle>) -> Self {
        Self { coupling, kernel, fluid }
    }

    pub fn fluid(&self) -> &[FluidParticle] {
        &self.fluid
    }

    pub fn fluid_mut(&mut self) -> &mut [FluidParticle] {
        &mut self.fluid
    }
}

impl<K: Kernel> ForceTerm for FluidBoundary<K> {
    fn apply(&mut self, _t: f64, sys: &mut ParticleSystem) {
        boundary_number_density(&self.kernel, self.coupling.h, sys);
        for f in self.fluid.iter_mut() {
            f.a = NVec3::zeros();
        }
        self.coupling.exchange(&self.kernel, &mut self.fluid, sys);
    }
}
