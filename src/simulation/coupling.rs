//! Two-way coupling between fluid particles and rigid boundary particles
//!
//! Rigid particles act as boundary samples for a surrounding SPH fluid
//! (Akinci et al. 2012, doi:10.1145/2185520.2185558). Each rigid particle
//! carries a number density V = sum_j W_ij over boundary neighbours; its
//! contribution to a fluid particle is weighted by rho0 / V. Pressure and
//! viscosity accelerations on the fluid are mirrored as forces on the
//! rigid particle, which then enter body aggregation like any other force.
//!
//! The fluid's own density, pressure and time integration live elsewhere;
//! this module only exchanges the boundary terms.

use crate::simulation::states::{NVec3, ParticleSystem};

/// SPH smoothing kernel
pub trait Kernel {
    /// W(r, h)
    fn w(&self, r: f64, h: f64) -> f64;

    /// Gradient of W with respect to x_i, for xij = x_i - x_j and r = |xij|
    fn grad_w(&self, xij: &NVec3, r: f64, h: f64) -> NVec3;

    /// Support radius as a multiple of h
    fn radius_scale(&self) -> f64;
}

/// 3D cubic spline (M4) kernel with support 2h
#[derive(Debug, Clone, Copy, Default)]
pub struct CubicSpline;

impl CubicSpline {
    fn sigma(h: f64) -> f64 {
        1.0 / (std::f64::consts::PI * h * h * h)
    }

    /// dW/dr
    fn dwdr(r: f64, h: f64) -> f64 {
        let q = r / h;
        let s = Self::sigma(h) / h;
        if q < 1.0 {
            s * (-3.0 * q + 2.25 * q * q)
        } else if q < 2.0 {
            let t = 2.0 - q;
            s * (-0.75 * t * t)
        } else {
            0.0
        }
    }
}

impl Kernel for CubicSpline {
    fn w(&self, r: f64, h: f64) -> f64 {
        let q = r / h;
        let s = Self::sigma(h);
        if q < 1.0 {
            s * (1.0 - 1.5 * q * q + 0.75 * q * q * q)
        } else if q < 2.0 {
            let t = 2.0 - q;
            s * 0.25 * t * t * t
        } else {
            0.0
        }
    }

    fn grad_w(&self, xij: &NVec3, r: f64, h: f64) -> NVec3 {
        if r <= 1e-12 {
            return NVec3::zeros();
        }
        (Self::dwdr(r, h) / r) * xij
    }

    fn radius_scale(&self) -> f64 {
        2.0
    }
}

/// Fluid particle as seen by the boundary terms
#[derive(Debug, Clone)]
pub struct FluidParticle {
    pub x: NVec3,   // position
    pub v: NVec3,   // velocity
    pub m: f64,     // mass
    pub rho: f64,   // density
    pub p: f64,     // pressure
    pub a: NVec3,   // boundary acceleration
}

impl FluidParticle {
    pub fn new(x: NVec3, m: f64, rho: f64) -> Self {
        Self {
            x,
            v: NVec3::zeros(),
            m,
            rho,
            p: 0.0,
            a: NVec3::zeros(),
        }
    }
}

/// Set the number density of every boundary particle: V_i = sum_j W(r_ij, h)
/// over all particles of the store, itself included
pub fn boundary_number_density<K: Kernel>(kernel: &K, h: f64, sys: &mut ParticleSystem) {
    let support2 = (kernel.radius_scale() * h).powi(2);
    let positions: Vec<NVec3> = sys.particles.iter().map(|p| p.x).collect();

    for (p, xi) in sys.particles.iter_mut().zip(&positions) {
        let mut nd = 0.0;
        for xj in &positions {
            let r2 = (xi - xj).norm_squared();
            if r2 < support2 {
                nd += kernel.w(r2.sqrt(), h);
            }
        }
        p.number_density = nd;
    }
}

/// Boundary pressure/viscosity exchange between fluid and rigid particles
#[derive(Debug, Clone, Copy)]
pub struct BoundaryCoupling {
    pub rho0: f64, // fluid rest density
    pub nu: f64,   // artificial viscosity coefficient
    pub h: f64,    // smoothing length
}

impl BoundaryCoupling {
    /// Add the boundary contribution rho0 / V_j * W_ij to each fluid density
    pub fn add_boundary_density<K: Kernel>(&self, kernel: &K, fluid: &mut [FluidParticle], sys: &ParticleSystem) {
        let support = kernel.radius_scale() * self.h;
        for fi in fluid.iter_mut() {
            for pj in &sys.particles {
                let r = (fi.x - pj.x).norm();
                if r < support {
                    fi.rho += self.rho0 / pj.number_density * kernel.w(r, self.h);
                }
            }
        }
    }

    /// Pressure and viscosity accelerations on the fluid from the boundary,
    /// with the reaction force -m_i a_ij added to each rigid particle
    ///
    /// Fluid accelerations are accumulated into `a`; boundary number
    /// densities must be current.
    pub fn exchange<K: Kernel>(&self, kernel: &K, fluid: &mut [FluidParticle], sys: &mut ParticleSystem) {
        let support = kernel.radius_scale() * self.h;
        let eps = 0.01 * self.h * self.h;

        for fi in fluid.iter_mut() {
            let inv_rho = 1.0 / fi.rho;
            for pj in sys.particles.iter_mut() {
                let xij = fi.x - pj.x;
                let r = xij.norm();
                if r >= support {
                    continue;
                }
                let dw = kernel.grad_w(&xij, r, self.h);
                let psi = self.rho0 / pj.number_density;

                // Pressure
                let mut a = -fi.p * inv_rho * inv_rho * psi * dw;

                // Viscosity, active only for approaching pairs
                let vij = fi.v - pj.v;
                let approach = vij.dot(&xij).min(0.0);
                a += self.nu * psi * inv_rho * approach / (r * r + eps) * dw;

                fi.a += a;
                pj.f -= fi.m * a;
            }
        }
    }
}
