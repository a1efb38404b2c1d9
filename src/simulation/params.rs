//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - integration step size and end time,
//! - body-force acceleration (gravity),
//! - diagnostics cadence

use crate::error::{Result, RigidBodyError};
use crate::simulation::states::NVec3;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64,          // step size
    pub t_end: f64,       // time end
    pub gravity: NVec3,   // body-force acceleration (gx, gy, gz)
    pub log_every: usize, // steps between diagnostic log lines, 0 = never
}

impl Parameters {
    /// Reject step sizes and end times that cannot drive a run
    pub fn validate(&self) -> Result<()> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(RigidBodyError::InvalidParameter { name: "dt", value: self.dt });
        }
        if !(self.t_end >= 0.0 && self.t_end.is_finite()) {
            return Err(RigidBodyError::InvalidParameter { name: "t_end", value: self.t_end });
        }
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(RigidBodyError::InvalidParameter { name: "gravity", value: self.gravity.norm() });
        }
        Ok(())
    }
}
