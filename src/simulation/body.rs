//! Rigid-body state
//!
//! A `Body` carries two kinds of fields:
//! - integrated state (`vc`, `omega`) that persists across steps
//! - aggregates (`total_mass`, `cm`, `inertia`, `force`, `torque`, `ac`,
//!   `omega_dot`) rebuilt from the member particles on every evaluation

use nalgebra::Matrix3;

use crate::error::{Result, RigidBodyError};
use crate::simulation::states::{BodyId, NVec3};

/// Symmetric 3x3 inertia tensor stored as its 6 independent entries
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InertiaTensor {
    pub xx: f64,
    pub yy: f64,
    pub zz: f64,
    pub xy: f64,
    pub xz: f64,
    pub yz: f64,
}

impl InertiaTensor {
    pub fn new(xx: f64, yy: f64, zz: f64, xy: f64, xz: f64, yz: f64) -> Self {
        Self { xx, yy, zz, xy, xz, yz }
    }

    pub fn diagonal(xx: f64, yy: f64, zz: f64) -> Self {
        Self::new(xx, yy, zz, 0.0, 0.0, 0.0)
    }

    /// Full 3x3 view
    pub fn to_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.xx, self.xy, self.xz,
            self.xy, self.yy, self.yz,
            self.xz, self.yz, self.zz,
        )
    }

    /// I * w
    pub fn mul_vec(&self, w: &NVec3) -> NVec3 {
        NVec3::new(
            self.xx * w.x + self.xy * w.y + self.xz * w.z,
            self.xy * w.x + self.yy * w.y + self.yz * w.z,
            self.xz * w.x + self.yz * w.y + self.zz * w.z,
        )
    }

    /// Cofactor matrix, which for a symmetric tensor is its own transpose
    /// and therefore equal to the adjugate
    pub fn adjugate(&self) -> InertiaTensor {
        InertiaTensor {
            xx: self.yy * self.zz - self.yz * self.yz,
            yy: self.xx * self.zz - self.xz * self.xz,
            zz: self.xx * self.yy - self.xy * self.xy,
            xy: self.xz * self.yz - self.xy * self.zz,
            xz: self.xy * self.yz - self.xz * self.yy,
            yz: self.xy * self.xz - self.xx * self.yz,
        }
    }

    /// Determinant by cofactor expansion along the first row
    pub fn determinant(&self) -> f64 {
        let adj = self.adjugate();
        self.xx * adj.xx + self.xy * adj.xy + self.xz * adj.xz
    }

    pub fn is_finite(&self) -> bool {
        [self.xx, self.yy, self.zz, self.xy, self.xz, self.yz]
            .iter()
            .all(|c| c.is_finite())
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub total_mass: f64,         // sum of member masses
    pub cm: NVec3,               // center of mass
    pub inertia: InertiaTensor,  // inertia about cm
    pub vc: NVec3,               // linear velocity of cm
    pub ac: NVec3,               // linear acceleration of cm
    pub omega: NVec3,            // angular velocity
    pub omega_dot: NVec3,        // angular acceleration
    pub force: NVec3,            // net force
    pub torque: NVec3,           // net torque about cm
}

impl Body {
    /// Body at rest; aggregates are filled in by the aggregator
    pub fn new(id: BodyId) -> Self {
        Self {
            id,
            total_mass: 0.0,
            cm: NVec3::zeros(),
            inertia: InertiaTensor::default(),
            vc: NVec3::zeros(),
            ac: NVec3::zeros(),
            omega: NVec3::zeros(),
            omega_dot: NVec3::zeros(),
            force: NVec3::zeros(),
            torque: NVec3::zeros(),
        }
    }

    pub fn with_velocity(mut self, vc: NVec3) -> Self {
        self.vc = vc;
        self
    }

    pub fn with_angular_velocity(mut self, omega: NVec3) -> Self {
        self.omega = omega;
        self
    }

    pub fn linear_momentum(&self) -> NVec3 {
        self.total_mass * self.vc
    }

    /// Angular momentum about the center of mass, I * w
    pub fn angular_momentum(&self) -> NVec3 {
        self.inertia.mul_vec(&self.omega)
    }

    /// Translational plus rotational kinetic energy
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.total_mass * self.vc.norm_squared()
            + 0.5 * self.omega.dot(&self.inertia.mul_vec(&self.omega))
    }

    /// Report the first non-finite quantity, if any
    pub fn check_finite(&self) -> Result<()> {
        let vectors = [
            ("center of mass", &self.cm),
            ("linear velocity", &self.vc),
            ("linear acceleration", &self.ac),
            ("angular velocity", &self.omega),
            ("angular acceleration", &self.omega_dot),
            ("torque", &self.torque),
        ];
        for (quantity, v) in vectors {
            if !v.iter().all(|c| c.is_finite()) {
                return Err(RigidBodyError::NonFinite { body: self.id, quantity });
            }
        }
        if !self.inertia.is_finite() {
            return Err(RigidBodyError::NonFinite { body: self.id, quantity: "inertia tensor" });
        }
        Ok(())
    }
}
