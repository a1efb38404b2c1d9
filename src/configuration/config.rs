//! Configuration types for loading rigid-body scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator choice, parallelism, contact history
//! - [`ParametersConfig`] – step size, end time, gravity
//! - [`ContactConfig`]    – DEM contact law coefficients
//! - [`BodyConfig`]       – initial motion of each rigid body
//! - [`ParticleConfig`]   – every particle, tagged with its owning body
//! - [`FluidConfig`]      – optional fluid particles coupled to the boundary
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A scenario with two bodies, one wall particle and default contact law:
//!
//! ```yaml
//! engine:
//!   integrator: "rk2"       # or "euler"
//!   parallel: true
//!
//! parameters:
//!   dt: 1.0e-4
//!   t_end: 0.1
//!   gy: -9.81               # gx, gz default to 0
//!
//! contact:
//!   kn: 1000.0              # all optional, defaults shown
//!   mu: 0.5
//!   en: 0.8
//!
//! bodies:
//!   - v: [0.0, 0.0, 0.0]
//!   - omega: [0.0, 0.0, 1.0]
//!
//! particles:
//!   - { x: [0.0, 0.0, 0.0], m: 1.0, radius: 0.05, body: 0 }
//!   - { x: [0.2, 0.0, 0.0], m: 1.0, radius: 0.05, body: 1 }
//!   - { x: [0.1, -1.0, 0.0], m: 1.0, radius: 0.5 }   # wall, no body
//! ```
//!
//! Scenario building maps this configuration into the runtime types and
//! validates it before any step is taken.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::contact::DEFAULT_EFFECTIVE_MASS;

/// Which integrator method used by the engine
/// integrator: "euler"` or `integrator: "rk2"
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // Explicit Euler, one force evaluation per step
    Euler,

    #[default]
    #[serde(rename = "rk2")] // Two-stage Runge–Kutta (midpoint), two force evaluations per step
    Rk2,
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub integrator: IntegratorConfig, // Time integrator for bodies and particles
    #[serde(default = "default_true")]
    pub parallel: bool, // `true` - particle loops on rayon, `false` - serial
    #[serde(default = "default_true")]
    pub tangential_history: bool, // integrate tangential contact displacement each step
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            integrator: IntegratorConfig::default(),
            parallel: true,
            tangential_history: true,
        }
    }
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64,    // time step size
    pub t_end: f64, // time end
    #[serde(default)]
    pub gx: f64, // gravity x
    #[serde(default)]
    pub gy: f64, // gravity y
    #[serde(default)]
    pub gz: f64, // gravity z
    #[serde(default)]
    pub log_every: usize, // steps between body diagnostics, 0 disables them
}

/// DEM contact law coefficients
#[derive(Deserialize, Debug, Clone)]
pub struct ContactConfig {
    #[serde(default = "default_kn")]
    pub kn: f64, // normal stiffness
    #[serde(default = "default_mu")]
    pub mu: f64, // friction coefficient
    #[serde(default = "default_en")]
    pub en: f64, // restitution coefficient
    #[serde(default = "default_m_eff")]
    pub m_eff: f64, // effective mass for the damping coefficients
    pub cutoff: Option<f64>, // neighbour search radius, defaults to twice the largest radius
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            kn: default_kn(),
            mu: default_mu(),
            en: default_en(),
            m_eff: default_m_eff(),
            cutoff: None,
        }
    }
}

/// Initial motion of one rigid body; its index in `bodies` is its id
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BodyConfig {
    #[serde(default)]
    pub v: [f64; 3], // initial linear velocity of the center of mass
    #[serde(default)]
    pub omega: [f64; 3], // initial angular velocity
}

/// One particle of the store
#[derive(Deserialize, Debug, Clone)]
pub struct ParticleConfig {
    pub x: [f64; 3], // position
    #[serde(default)]
    pub v: [f64; 3], // velocity, only used by particles without a body
    pub m: f64,      // mass
    pub radius: f64, // contact radius
    pub body: Option<usize>, // owning body index, absent for walls/free particles
}

/// One fluid particle coupled to the rigid boundary
#[derive(Deserialize, Debug, Clone)]
pub struct FluidParticleConfig {
    pub x: [f64; 3],
    #[serde(default)]
    pub v: [f64; 3],
    pub m: f64,
    pub rho: f64,
    #[serde(default)]
    pub p: f64,
}

/// Fluid coupling block
#[derive(Deserialize, Debug, Clone)]
pub struct FluidConfig {
    pub rho0: f64, // rest density
    #[serde(default)]
    pub nu: f64, // viscosity coefficient
    pub h: f64,    // smoothing length
    pub particles: Vec<FluidParticleConfig>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig, // Engine-level configuration
    pub parameters: ParametersConfig, // Global numerical and physical parameters
    #[serde(default)]
    pub contact: ContactConfig, // Contact law; defaults when omitted
    pub bodies: Vec<BodyConfig>, // Rigid bodies, ids are indices
    pub particles: Vec<ParticleConfig>, // Particle store
    pub fluid: Option<FluidConfig>, // Optional fluid coupling
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn default_true() -> bool {
    true
}

fn default_kn() -> f64 {
    1.0e3
}

fn default_mu() -> f64 {
    0.5
}

fn default_en() -> f64 {
    0.8
}

fn default_m_eff() -> f64 {
    DEFAULT_EFFECTIVE_MASS
}
