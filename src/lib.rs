pub mod error;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use error::{Result, RigidBodyError};

pub use simulation::states::{BodyId, NVec3, Particle, ParticleSystem, TangentialContact};
pub use simulation::body::{Body, InertiaTensor};
pub use simulation::aggregate::{aggregate_bodies, accumulate_moments, combine_moments, BodyMoments, MassProperties};
#[cfg(feature = "parallel")]
pub use simulation::aggregate::par_accumulate_moments;
pub use simulation::rotation::angular_acceleration;
pub use simulation::kinematics::{propagate_velocities, rigid_velocity};
pub use simulation::contact::{ContactModel, ContactOutcome, DirectNeighbors, Neighbor, NeighborQuery, PairContact};
pub use simulation::coupling::{BoundaryCoupling, CubicSpline, FluidParticle, Kernel};
pub use simulation::forces::{BodyForce, ContactForce, FluidBoundary, ForceSet, ForceTerm};
pub use simulation::integrator::{rigid_body_step, EulerStep, Rk2Step, RigidBodyIntegrator};
pub use simulation::scenario::Scenario;

pub use configuration::config::{
    IntegratorConfig, EngineConfig, ParametersConfig, ContactConfig, BodyConfig, ParticleConfig, FluidConfig,
    FluidParticleConfig, ScenarioConfig,
};

pub use benchmark::benchmark::{bench_aggregate, bench_step, make_scenario};
