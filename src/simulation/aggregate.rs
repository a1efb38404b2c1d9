//! Body aggregation: particle contributions -> per-body mass properties
//!
//! Two passes:
//! 1. every particle adds its mass, first and second moments, force and
//!    torque (all about the origin) to its body's [`BodyMoments`]. This is
//!    particle-parallel; partial accumulators from different workers are
//!    combined by plain summation.
//! 2. every body turns its combined moments into center of mass, inertia
//!    about the center of mass and torque about the center of mass, then
//!    solves for its angular acceleration.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, RigidBodyError};
use crate::simulation::body::{Body, InertiaTensor};
use crate::simulation::rotation::angular_acceleration;
use crate::simulation::states::{BodyId, NVec3, Particle, ParticleSystem};

/// Particles handed to one rayon task in the parallel accumulation
#[cfg(feature = "parallel")]
const CHUNK: usize = 1024;

/// Origin-frame moment sums of one body (16 scalars)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyMoments {
    pub mass: f64,                // sum m
    pub first: NVec3,             // sum m x
    pub second: InertiaTensor,    // raw second moments about the origin
    pub force: NVec3,             // sum f
    pub torque: NVec3,            // sum x cross f
}

impl BodyMoments {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Add one particle's contribution
    pub fn add_particle(&mut self, p: &Particle) {
        let m = p.m;
        let (x, y, z) = (p.x.x, p.x.y, p.x.z);

        self.mass += m;
        self.first += m * p.x;

        self.second.xx += m * (y * y + z * z);
        self.second.yy += m * (x * x + z * z);
        self.second.zz += m * (x * x + y * y);
        self.second.xy -= m * x * y;
        self.second.xz -= m * x * z;
        self.second.yz -= m * y * z;

        self.force += p.f;
        self.torque += p.x.cross(&p.f);
    }

    /// Mass properties about the center of mass
    ///
    /// Fails with [`RigidBodyError::EmptyBody`] when the accumulated mass is
    /// not positive.
    pub fn finalize(&self, body: BodyId) -> Result<MassProperties> {
        let m = self.mass;
        if !(m > 0.0) {
            return Err(RigidBodyError::EmptyBody { body });
        }

        let c = self.first / m;

        // Parallel-axis theorem: I_cm = I_origin - m (|c|^2 E - c c^T)
        let raw = &self.second;
        let inertia = InertiaTensor {
            xx: raw.xx - m * (c.y * c.y + c.z * c.z),
            yy: raw.yy - m * (c.x * c.x + c.z * c.z),
            zz: raw.zz - m * (c.x * c.x + c.y * c.y),
            xy: raw.xy + m * c.x * c.y,
            xz: raw.xz + m * c.x * c.z,
            yz: raw.yz + m * c.y * c.z,
        };

        Ok(MassProperties {
            total_mass: m,
            cm: c,
            inertia,
            force: self.force,
            torque: self.torque - c.cross(&self.force),
        })
    }
}

impl Add for BodyMoments {
    type Output = BodyMoments;

    fn add(mut self, rhs: BodyMoments) -> BodyMoments {
        self += rhs;
        self
    }
}

impl AddAssign for BodyMoments {
    fn add_assign(&mut self, rhs: BodyMoments) {
        self.mass += rhs.mass;
        self.first += rhs.first;
        self.second.xx += rhs.second.xx;
        self.second.yy += rhs.second.yy;
        self.second.zz += rhs.second.zz;
        self.second.xy += rhs.second.xy;
        self.second.xz += rhs.second.xz;
        self.second.yz += rhs.second.yz;
        self.force += rhs.force;
        self.torque += rhs.torque;
    }
}

impl Sum for BodyMoments {
    fn sum<I: Iterator<Item = BodyMoments>>(iter: I) -> Self {
        iter.fold(BodyMoments::zero(), Add::add)
    }
}

/// Finalized per-body aggregates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    pub total_mass: f64,
    pub cm: NVec3,
    pub inertia: InertiaTensor,
    pub force: NVec3,
    pub torque: NVec3, // about cm
}

/// Pass 1 over a slice of particles, one accumulator per body
///
/// Particles without a body are skipped. Body ids must be below `n_bodies`.
pub fn accumulate_moments(particles: &[Particle], n_bodies: usize) -> Vec<BodyMoments> {
    let mut acc = vec![BodyMoments::zero(); n_bodies];
    for p in particles {
        if let Some(body) = p.body {
            acc[body.index()].add_particle(p);
        }
    }
    acc
}

/// Element-wise sum of two partial accumulator sets
///
/// This is the reduction barrier between pass 1 and pass 2; it is
/// associative and commutative, so partial sums from any number of workers
/// can be combined in any grouping.
pub fn combine_moments(mut a: Vec<BodyMoments>, b: Vec<BodyMoments>) -> Vec<BodyMoments> {
    if a.len() < b.len() {
        a.resize(b.len(), BodyMoments::zero());
    }
    for (acc, part) in a.iter_mut().zip(b) {
        *acc += part;
    }
    a
}

/// Pass 1 on rayon: per-chunk accumulators reduced with [`combine_moments`]
#[cfg(feature = "parallel")]
pub fn par_accumulate_moments(particles: &[Particle], n_bodies: usize) -> Vec<BodyMoments> {
    particles
        .par_chunks(CHUNK)
        .map(|chunk| accumulate_moments(chunk, n_bodies))
        .reduce(|| vec![BodyMoments::zero(); n_bodies], combine_moments)
}

/// Write finalized aggregates into `body` and solve for its angular acceleration
///
/// Angular velocity is read from the body's persisted state.
pub fn apply_mass_properties(body: &mut Body, props: &MassProperties) {
    body.total_mass = props.total_mass;
    body.cm = props.cm;
    body.inertia = props.inertia;
    body.force = props.force;
    body.torque = props.torque;
    body.ac = props.force / props.total_mass;
    body.omega_dot = angular_acceleration(&body.inertia, &body.torque, &body.omega);
}

/// Run both aggregation passes and the angular solve for every body
pub fn aggregate_bodies(bodies: &mut [Body], sys: &ParticleSystem, parallel: bool) -> Result<()> {
    let n = bodies.len();

    #[cfg(feature = "parallel")]
    let moments = if parallel {
        par_accumulate_moments(&sys.particles, n)
    } else {
        accumulate_moments(&sys.particles, n)
    };
    #[cfg(not(feature = "parallel"))]
    let moments = {
        let _ = parallel;
        accumulate_moments(&sys.particles, n)
    };

    for (body, acc) in bodies.iter_mut().zip(moments.iter()) {
        let props = acc.finalize(body.id)?;
        apply_mass_properties(body, &props);
    }

    debug!("aggregated {} bodies from {} particles at t = {:.6}", n, sys.len(), sys.t);
    Ok(())
}
