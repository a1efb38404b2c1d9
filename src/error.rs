//! Error types for the rigid-body core
//!
//! Configuration problems are rejected when a scenario is built; numerical
//! degeneracy (a singular inertia tensor) is not an error at solve time and
//! only shows up through [`RigidBodyError::NonFinite`] when a caller asks
//! for a finiteness check.

use thiserror::Error;

use crate::simulation::states::BodyId;

#[derive(Error, Debug)]
pub enum RigidBodyError {
    #[error("body {body} has no positive-mass particles")]
    EmptyBody { body: BodyId },

    #[error("restitution coefficient {en} gives non-finite contact damping")]
    NonFiniteDamping { en: f64 },

    #[error("invalid parameter `{name}` = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("particle references body {body} but only {count} bodies are declared")]
    UnknownBody { body: BodyId, count: usize },

    #[error("body {body} has non-finite {quantity}")]
    NonFinite { body: BodyId, quantity: &'static str },

    #[error("failed to parse scenario: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RigidBodyError>;
