//! Rigid kinematics: member particle velocities from body motion
//!
//! u_i = vc + omega x (x_i - cm). Free particles (no body) keep their own
//! velocity.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::simulation::body::Body;
use crate::simulation::states::{NVec3, Particle, ParticleSystem};

/// Velocity of a point rigidly attached to `body` at position `x`
#[inline]
pub fn rigid_velocity(body: &Body, x: &NVec3) -> NVec3 {
    body.vc + body.omega.cross(&(x - body.cm))
}

#[inline]
fn propagate_one(bodies: &[Body], p: &mut Particle) {
    if let Some(id) = p.body {
        p.v = rigid_velocity(&bodies[id.index()], &p.x);
    }
}

/// Overwrite every rigid particle's velocity from its body's motion
pub fn propagate_velocities(bodies: &[Body], sys: &mut ParticleSystem, parallel: bool) {
    #[cfg(feature = "parallel")]
    if parallel {
        sys.particles.par_iter_mut().for_each(|p| propagate_one(bodies, p));
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for p in sys.particles.iter_mut() {
        propagate_one(bodies, p);
    }
}
