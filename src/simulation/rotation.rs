//! Angular acceleration from Euler's rigid-body equation
//!
//! Solves I * w_dot = tau - w x (I * w) for w_dot. The inertia tensor changes
//! every step, so it is inverted in closed form (adjugate over determinant)
//! on every call instead of being factorized once.

use crate::simulation::body::InertiaTensor;
use crate::simulation::states::NVec3;

/// Angular acceleration for inertia `inertia`, torque `torque` and angular
/// velocity `omega`
///
/// The determinant is divided by unconditionally: a singular tensor gives a
/// non-finite result which the caller has to detect.
pub fn angular_acceleration(inertia: &InertiaTensor, torque: &NVec3, omega: &NVec3) -> NVec3 {
    // Right-hand side: tau - w x (I w)
    let rhs = torque - omega.cross(&inertia.mul_vec(omega));

    let adj = inertia.adjugate();
    let inv_det = 1.0 / (inertia.xx * adj.xx + inertia.xy * adj.xy + inertia.xz * adj.xz);

    inv_det * adj.mul_vec(&rhs)
}
