//! Fixed-step time integrators for rigid bodies and their particles
//!
//! Provides a single-stage Euler scheme and a two-stage Runge-Kutta scheme
//! behind [`RigidBodyIntegrator`], plus [`rigid_body_step`] which drives
//! either through one full step with an evaluation before every stage.
//!
//! An evaluation runs, in order:
//! 1. for each rigid particle: velocity from the current body motion
//! 2. particle forces
//! 3. body aggregation and the angular solve
//!
//! A stage then moves every particle with the velocity from step 1, moves
//! each body's center of mass with the matching body velocity and finally
//! advances the body velocities with the accelerations from step 3.

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::simulation::aggregate::aggregate_bodies;
use crate::simulation::body::Body;
use crate::simulation::engine::Engine;
use crate::simulation::forces::ForceSet;
use crate::simulation::kinematics::propagate_velocities;
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec3, Particle, ParticleSystem};

/// A multi-stage scheme advancing bodies and particles
pub trait RigidBodyIntegrator {
    /// Number of force evaluations per step
    fn stages(&self) -> usize;

    /// Time of the evaluation before stage `stage`, relative to the step start
    fn stage_offset(&self, stage: usize, dt: f64) -> f64;

    /// Called once at the start of every step, before the first evaluation
    fn initialize(&mut self, bodies: &[Body], sys: &ParticleSystem);

    /// Advance stage `stage` (0-based) using the particle velocities and body
    /// accelerations of the preceding evaluation and the full step size `dt`
    fn stage(&mut self, stage: usize, bodies: &mut [Body], sys: &mut ParticleSystem, dt: f64);
}

/// Apply `update` to every particle, on rayon when `parallel` is set
fn for_each_particle<F>(sys: &mut ParticleSystem, parallel: bool, update: F)
where
    F: Fn(usize, &mut Particle) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    if parallel {
        sys.particles
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, p)| update(i, p));
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for (i, p) in sys.particles.iter_mut().enumerate() {
        update(i, p);
    }
}

// =========================================================================================
// Euler
// =========================================================================================

/// Explicit Euler, one evaluation per step
#[derive(Debug, Clone, Default)]
pub struct EulerStep {
    pub parallel: bool,
}

impl EulerStep {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }
}

impl RigidBodyIntegrator for EulerStep {
    fn stages(&self) -> usize {
        1
    }

    fn stage_offset(&self, _stage: usize, _dt: f64) -> f64 {
        0.0
    }

    fn initialize(&mut self, _bodies: &[Body], _sys: &ParticleSystem) {}

    fn stage(&mut self, _stage: usize, bodies: &mut [Body], sys: &mut ParticleSystem, dt: f64) {
        // x_n+1 = x_n + dt u_n
        for_each_particle(sys, self.parallel, |_, p| p.x += dt * p.v);

        // cm_n+1 = cm_n + dt vc_n, vc_n+1 = vc_n + dt ac, w_n+1 = w_n + dt w_dot
        for b in bodies.iter_mut() {
            b.cm += dt * b.vc;
            b.vc += dt * b.ac;
            b.omega += dt * b.omega_dot;
        }
    }
}

// =========================================================================================
// Two-stage Runge-Kutta
// =========================================================================================

/// Two-stage Runge-Kutta (midpoint), two evaluations per step
///
/// Both stages start from the step-start snapshot: stage 0 goes half a step
/// with the start velocities and accelerations, stage 1 a full step with the
/// midpoint ones.
#[derive(Debug, Clone, Default)]
pub struct Rk2Step {
    pub parallel: bool,
    vc0: Vec<NVec3>,    // body linear velocity at step start
    omega0: Vec<NVec3>, // body angular velocity at step start
    cm0: Vec<NVec3>,    // body center of mass at step start
    x0: Vec<NVec3>,     // particle positions at step start
}

impl Rk2Step {
    pub fn new(parallel: bool) -> Self {
        Self {
            parallel,
            ..Self::default()
        }
    }

    fn advance(&self, bodies: &mut [Body], sys: &mut ParticleSystem, h: f64) {
        let x0 = &self.x0;
        for_each_particle(sys, self.parallel, |i, p| p.x = x0[i] + h * p.v);

        let snapshot = self.cm0.iter().zip(&self.vc0).zip(&self.omega0);
        for (b, ((cm0, vc0), omega0)) in bodies.iter_mut().zip(snapshot) {
            b.cm = cm0 + h * b.vc;
            b.vc = vc0 + h * b.ac;
            b.omega = omega0 + h * b.omega_dot;
        }
    }
}

impl RigidBodyIntegrator for Rk2Step {
    fn stages(&self) -> usize {
        2
    }

    fn stage_offset(&self, stage: usize, dt: f64) -> f64 {
        if stage == 0 { 0.0 } else { 0.5 * dt }
    }

    fn initialize(&mut self, bodies: &[Body], sys: &ParticleSystem) {
        self.vc0.clear();
        self.omega0.clear();
        self.cm0.clear();
        self.vc0.extend(bodies.iter().map(|b| b.vc));
        self.omega0.extend(bodies.iter().map(|b| b.omega));
        self.cm0.extend(bodies.iter().map(|b| b.cm));

        self.x0.clear();
        self.x0.extend(sys.particles.iter().map(|p| p.x));
    }

    fn stage(&mut self, stage: usize, bodies: &mut [Body], sys: &mut ParticleSystem, dt: f64) {
        let h = if stage == 0 { 0.5 * dt } else { dt };
        self.advance(bodies, sys, h);
    }
}

// =========================================================================================
// Step driver
// =========================================================================================

/// Rigid velocities -> forces -> aggregation -> angular solve, for the
/// current configuration at time `t`
///
/// Body centers of mass must match the current particle positions.
pub fn evaluate(bodies: &mut [Body], sys: &mut ParticleSystem, forces: &mut ForceSet, t: f64, parallel: bool) -> Result<()> {
    propagate_velocities(bodies, sys, parallel);
    forces.accumulate_forces(t, sys);
    aggregate_bodies(bodies, sys, parallel)
}

/// Advance the bodies and particles by one step of `params.dt`
///
/// Runs an evaluation before every stage, then the stage itself. Afterwards
/// rigid particle velocities are brought up to the final body motion, the
/// tangential contact history is integrated (if enabled) and `sys.t`
/// advanced.
pub fn rigid_body_step(
    integrator: &mut dyn RigidBodyIntegrator,
    bodies: &mut [Body],
    sys: &mut ParticleSystem,
    forces: &mut ForceSet,
    params: &Parameters,
    engine: &Engine,
) -> Result<()> {
    let dt = params.dt;
    let t0 = sys.t;

    integrator.initialize(bodies, sys);
    for stage in 0..integrator.stages() {
        let t = t0 + integrator.stage_offset(stage, dt);
        evaluate(bodies, sys, forces, t, engine.parallel)?;
        integrator.stage(stage, bodies, sys, dt);
        debug!("stage {} done, evaluated at t = {:.6}", stage, t);
    }
    propagate_velocities(bodies, sys, engine.parallel);

    if engine.tangential_history {
        sys.integrate_tangential_displacement(dt);
    }
    sys.t = t0 + dt;
    Ok(())
}
