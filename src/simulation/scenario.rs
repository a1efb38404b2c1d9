//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - particle store (`ParticleSystem`) and rigid bodies (`Body`) at t = 0
//! - active force set (`ForceSet`)
//! - the selected body integrator
//!
//! Everything that can be rejected is rejected here, before the first step.

use log::{info, warn};

use crate::configuration::config::{IntegratorConfig, ScenarioConfig};
use crate::error::{Result, RigidBodyError};
use crate::simulation::aggregate::aggregate_bodies;
use crate::simulation::body::Body;
use crate::simulation::contact::{ContactModel, DirectNeighbors};
use crate::simulation::coupling::{BoundaryCoupling, CubicSpline, FluidParticle};
use crate::simulation::engine::Engine;
use crate::simulation::forces::{BodyForce, ContactForce, FluidBoundary, ForceSet};
use crate::simulation::integrator::{rigid_body_step, EulerStep, Rk2Step, RigidBodyIntegrator};
use crate::simulation::kinematics::propagate_velocities;
use crate::simulation::params::Parameters;
use crate::simulation::states::{BodyId, NVec3, Particle, ParticleSystem};

/// The main runtime bundle: state, force laws and the stepping scheme
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: ParticleSystem,
    pub bodies: Vec<Body>,
    pub forces: ForceSet,
    pub integrator: Box<dyn RigidBodyIntegrator + Send + Sync>,
    pub steps: usize,       // completed steps
    warned_non_finite: bool, // a non-finite body has already been reported
}

impl Scenario {
    /// Map a [`ScenarioConfig`] onto runtime types and validate it
    pub fn build(cfg: ScenarioConfig) -> Result<Self> {
        // Engine (runtime) from EngineConfig
        let parallel = cfg.engine.parallel && cfg!(feature = "parallel");
        if cfg.engine.parallel && !parallel {
            warn!("parallel requested but the `parallel` feature is disabled; running serially");
        }
        let engine = Engine {
            integrator: cfg.engine.integrator,
            parallel,
            tangential_history: cfg.engine.tangential_history,
        };

        // Parameters (runtime) from ParametersConfig
        let p_cfg = &cfg.parameters;
        let parameters = Parameters {
            dt: p_cfg.dt,
            t_end: p_cfg.t_end,
            gravity: NVec3::new(p_cfg.gx, p_cfg.gy, p_cfg.gz),
            log_every: p_cfg.log_every,
        };

        // Bodies: ids are positions in the list
        let bodies: Vec<Body> = cfg
            .bodies
            .iter()
            .enumerate()
            .map(|(i, bc)| {
                Body::new(BodyId(i))
                    .with_velocity(NVec3::from(bc.v))
                    .with_angular_velocity(NVec3::from(bc.omega))
            })
            .collect();

        // Particles: map `ParticleConfig` -> runtime `Particle`
        let particles: Vec<Particle> = cfg
            .particles
            .iter()
            .enumerate()
            .map(|(i, pc)| {
                Particle::new(i, NVec3::from(pc.x), pc.m, pc.radius, pc.body.map(BodyId))
                    .with_velocity(NVec3::from(pc.v))
            })
            .collect();
        let system = ParticleSystem::new(particles);

        // Forces: body force first, then contact, then the optional fluid boundary
        let c_cfg = &cfg.contact;
        let model = ContactModel::new(c_cfg.kn, c_cfg.mu, c_cfg.en, c_cfg.m_eff)?;
        let max_radius = system.particles.iter().fold(0.0_f64, |r, p| r.max(p.radius));
        let cutoff = c_cfg.cutoff.unwrap_or(2.0 * max_radius);

        let mut forces = ForceSet::new()
            .with(BodyForce { gravity: parameters.gravity })
            .with(ContactForce::new(model, DirectNeighbors { cutoff }, engine.parallel));

        if let Some(f_cfg) = &cfg.fluid {
            if !(f_cfg.h > 0.0) {
                return Err(RigidBodyError::InvalidParameter { name: "h", value: f_cfg.h });
            }
            if !(f_cfg.rho0 > 0.0) {
                return Err(RigidBodyError::InvalidParameter { name: "rho0", value: f_cfg.rho0 });
            }
            let fluid: Vec<FluidParticle> = f_cfg
                .particles
                .iter()
                .map(|fc| {
                    let mut f = FluidParticle::new(NVec3::from(fc.x), fc.m, fc.rho);
                    f.v = NVec3::from(fc.v);
                    f.p = fc.p;
                    f
                })
                .collect();
            let coupling = BoundaryCoupling { rho0: f_cfg.rho0, nu: f_cfg.nu, h: f_cfg.h };
            forces = forces.with(FluidBoundary::new(coupling, CubicSpline, fluid));
        }

        Self::from_parts(engine, parameters, system, bodies, forces)
    }

    /// Assemble a scenario from runtime parts
    ///
    /// Checks parameters and body membership, computes the initial mass
    /// properties and gives every rigid particle its body's velocity.
    pub fn from_parts(
        engine: Engine,
        parameters: Parameters,
        mut system: ParticleSystem,
        mut bodies: Vec<Body>,
        forces: ForceSet,
    ) -> Result<Self> {
        parameters.validate()?;

        let count = bodies.len();
        for p in &system.particles {
            if let Some(body) = p.body {
                if body.index() >= count {
                    return Err(RigidBodyError::UnknownBody { body, count });
                }
            }
            if !(p.m >= 0.0 && p.m.is_finite()) {
                return Err(RigidBodyError::InvalidParameter { name: "particle mass", value: p.m });
            }
            if !(p.radius >= 0.0 && p.radius.is_finite()) {
                return Err(RigidBodyError::InvalidParameter { name: "particle radius", value: p.radius });
            }
        }
        for (i, b) in bodies.iter_mut().enumerate() {
            b.id = BodyId(i);
        }

        // Fails on any body without positive mass
        system.clear_forces();
        aggregate_bodies(&mut bodies, &system, engine.parallel)?;
        propagate_velocities(&bodies, &mut system, engine.parallel);

        let integrator: Box<dyn RigidBodyIntegrator + Send + Sync> = match engine.integrator {
            IntegratorConfig::Euler => Box::new(EulerStep::new(engine.parallel)),
            IntegratorConfig::Rk2 => Box::new(Rk2Step::new(engine.parallel)),
        };

        info!(
            "scenario: {} particles, {} bodies, {} force terms, {:?} integrator, dt = {}, parallel = {}",
            system.len(),
            bodies.len(),
            forces.len(),
            engine.integrator,
            parameters.dt,
            engine.parallel
        );

        Ok(Self {
            engine,
            parameters,
            system,
            bodies,
            forces,
            integrator,
            steps: 0,
            warned_non_finite: false,
        })
    }

    /// Advance one step of `parameters.dt`
    pub fn step(&mut self) -> Result<()> {
        let Scenario {
            engine,
            parameters,
            system,
            bodies,
            forces,
            integrator,
            ..
        } = self;
        rigid_body_step(integrator.as_mut(), bodies, system, forces, parameters, engine)?;
        self.steps += 1;

        if !self.warned_non_finite {
            if let Err(err) = self.check_finite() {
                warn!("at t = {:.6}: {}", self.system.t, err);
                self.warned_non_finite = true;
            }
        }

        let every = self.parameters.log_every;
        if every > 0 && self.steps % every == 0 {
            self.log_bodies();
        }
        Ok(())
    }

    /// Step until `t_end` is reached, returning the number of steps taken
    pub fn run(&mut self) -> Result<usize> {
        let start = self.steps;
        let half_dt = 0.5 * self.parameters.dt;
        while self.system.t + half_dt < self.parameters.t_end {
            self.step()?;
        }
        Ok(self.steps - start)
    }

    /// Recompute mass properties from the current particle positions without
    /// stepping, e.g. for reporting after a run
    pub fn refresh_mass_properties(&mut self) -> Result<()> {
        aggregate_bodies(&mut self.bodies, &self.system, self.engine.parallel)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    /// First non-finite body quantity, for an external monitoring layer
    pub fn check_finite(&self) -> Result<()> {
        self.bodies.iter().try_for_each(Body::check_finite)
    }

    /// Total kinetic energy of all bodies
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    fn log_bodies(&self) {
        for b in &self.bodies {
            info!(
                "t = {:.5} body {}: m = {:.4e}, cm = [{:.4}, {:.4}, {:.4}], v = [{:.4}, {:.4}, {:.4}], w = [{:.4}, {:.4}, {:.4}]",
                self.system.t,
                b.id,
                b.total_mass,
                b.cm.x, b.cm.y, b.cm.z,
                b.vc.x, b.vc.y, b.vc.z,
                b.omega.x, b.omega.y, b.omega.z,
            );
        }
    }
}
