//! Discrete-element contact between particles of different bodies
//!
//! Linear spring-dashpot law in the normal direction, a tangential
//! spring-dashpot clamped by Coulomb friction, and one persistent frictional
//! state per particle. Each ordered pair (i, j) contributes only to the
//! destination `i`; the reaction on `j` comes from evaluating (j, i).
//!
//! Neighbour finding is a seam ([`NeighborQuery`]); [`DirectNeighbors`] is
//! the all-pairs implementation used by default.

use std::f64::consts::PI;

use log::trace;

use crate::error::{Result, RigidBodyError};
use crate::simulation::states::{NVec3, ParticleSystem, TangentialContact};

/// Separations below this are treated as coincident and skipped
pub const COINCIDENT_EPS: f64 = 1e-9;

/// Effective mass used for the damping coefficients when none is configured
pub const DEFAULT_EFFECTIVE_MASS: f64 = PI * 0.5 * 0.5 * 1e-6 * 2120.0;

/// A candidate neighbour of a destination particle `i`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub j: usize,   // source particle index
    pub xij: NVec3, // x_i - x_j
    pub vij: NVec3, // v_i - v_j
    pub rij: f64,   // |x_i - x_j|
}

impl Neighbor {
    pub fn between(sys: &ParticleSystem, i: usize, j: usize) -> Self {
        let (pi, pj) = (&sys.particles[i], &sys.particles[j]);
        let xij = pi.x - pj.x;
        Self {
            j,
            xij,
            vij: pi.v - pj.v,
            rij: xij.norm(),
        }
    }
}

/// Neighbour-finding service
///
/// Fills `out` with the candidate neighbours of particle `i` (never `i`
/// itself). `out` is cleared first.
pub trait NeighborQuery {
    fn neighbors(&self, i: usize, sys: &ParticleSystem, out: &mut Vec<Neighbor>);
}

/// All-pairs neighbour search within a fixed cutoff, O(N^2) per evaluation
#[derive(Debug, Clone, Copy)]
pub struct DirectNeighbors {
    pub cutoff: f64,
}

impl NeighborQuery for DirectNeighbors {
    fn neighbors(&self, i: usize, sys: &ParticleSystem, out: &mut Vec<Neighbor>) {
        out.clear();
        let xi = sys.particles[i].x;
        let cutoff2 = self.cutoff * self.cutoff;
        for (j, pj) in sys.particles.iter().enumerate() {
            if j == i || (xi - pj.x).norm_squared() > cutoff2 {
                continue;
            }
            out.push(Neighbor::between(sys, i, j));
        }
    }
}

/// Force contributed by one overlapping pair to its destination particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairContact {
    pub normal: NVec3,
    pub tangential: NVec3,
    pub tangential_velocity: NVec3, // new persistent tangential velocity
}

impl PairContact {
    pub fn force(&self) -> NVec3 {
        self.normal + self.tangential
    }
}

/// Net contact result for one destination particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactOutcome {
    pub force: NVec3,
    pub contact: TangentialContact, // state to persist
}

#[derive(Debug, Clone, Copy)]
pub struct ContactModel {
    pub kn: f64,      // normal stiffness
    pub kt: f64,      // tangential stiffness, 2/7 kn
    pub mu: f64,      // friction coefficient
    pub en: f64,      // restitution coefficient
    pub gamma_n: f64, // normal damping
    pub gamma_t: f64, // tangential damping, gamma_n / 2
}

impl ContactModel {
    /// Build the law from stiffness, friction, restitution and effective mass
    pub fn new(kn: f64, mu: f64, en: f64, m_eff: f64) -> Result<Self> {
        if !(kn > 0.0 && kn.is_finite()) {
            return Err(RigidBodyError::InvalidParameter { name: "kn", value: kn });
        }
        if !(mu >= 0.0 && mu.is_finite()) {
            return Err(RigidBodyError::InvalidParameter { name: "mu", value: mu });
        }
        if !(m_eff > 0.0 && m_eff.is_finite()) {
            return Err(RigidBodyError::InvalidParameter { name: "m_eff", value: m_eff });
        }

        let ln_en = en.ln();
        let gamma_n = -2.0 * (kn * m_eff).sqrt() * ln_en / (PI * PI + ln_en * ln_en).sqrt();
        if !gamma_n.is_finite() {
            return Err(RigidBodyError::NonFiniteDamping { en });
        }
        // en > 1 gives negative damping
        if en > 1.0 {
            return Err(RigidBodyError::InvalidParameter { name: "en", value: en });
        }

        Ok(Self {
            kn,
            kt: 2.0 / 7.0 * kn,
            mu,
            en,
            gamma_n,
            gamma_t: 0.5 * gamma_n,
        })
    }

    /// Contact force on the destination of pair `nb`, or `None` when the
    /// particles do not overlap (or coincide)
    ///
    /// `ri`/`rj` are the contact radii, `state` the destination's persisted
    /// frictional state.
    pub fn pair_force(
        &self,
        ri: f64,
        rj: f64,
        nb: &Neighbor,
        state: &TangentialContact,
    ) -> Option<PairContact> {
        if nb.rij <= COINCIDENT_EPS {
            trace!("skipping coincident pair with particle {}", nb.j);
            return None;
        }
        let overlap = ri + rj - nb.rij;
        if overlap <= 0.0 {
            return None;
        }

        // Unit normal from i toward j
        let n = -nb.xij / nb.rij;

        // Normal part of the relative velocity
        let vn = nb.vij.dot(&n) * n;

        // Spring pushes i away from j, dashpot resists approach
        let f_n = -self.kn * overlap * n - self.gamma_n * vn;

        // Tangential relative velocity and its direction
        let vt = nb.vij - vn;
        let vt_norm = vt.norm();
        let t = if vt_norm > 0.0 { vt / vt_norm } else { NVec3::zeros() };

        let mut f_t = -self.kt * state.displacement - self.gamma_t * vt;

        // Coulomb: |f_t| <= mu |f_n|
        let f_t_max = self.mu * f_n.norm();
        if f_t.norm() > f_t_max {
            f_t = -f_t_max * t;
        }

        Some(PairContact {
            normal: f_n,
            tangential: f_t,
            tangential_velocity: vt,
        })
    }

    /// Sum the contacts of particle `i` over `neighbors`
    ///
    /// Pairs within the same body (or between two free particles) are
    /// ignored. The last overlapping pair sets the persisted tangential
    /// velocity; with no overlapping pair at all the frictional state is
    /// reset to zero.
    pub fn particle_contact(&self, i: usize, sys: &ParticleSystem, neighbors: &[Neighbor]) -> ContactOutcome {
        let p = &sys.particles[i];
        let mut force = NVec3::zeros();
        let mut velocity = None;

        for nb in neighbors {
            let q = &sys.particles[nb.j];
            if p.body == q.body {
                continue;
            }
            if let Some(c) = self.pair_force(p.radius, q.radius, nb, &p.contact) {
                trace!("particle {} touches {}: f = {:?}", p.id, q.id, c.force());
                force += c.force();
                velocity = Some(c.tangential_velocity);
            }
        }

        let contact = match velocity {
            Some(v) => TangentialContact {
                displacement: p.contact.displacement,
                velocity: v,
            },
            None => TangentialContact::zero(),
        };

        ContactOutcome { force, contact }
    }
}
