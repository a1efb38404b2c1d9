use std::time::Instant;

use crate::configuration::config::IntegratorConfig;
use crate::error::Result;
use crate::simulation::aggregate::accumulate_moments;
#[cfg(feature = "parallel")]
use crate::simulation::aggregate::par_accumulate_moments;
use crate::simulation::body::Body;
use crate::simulation::contact::{ContactModel, DirectNeighbors, DEFAULT_EFFECTIVE_MASS};
use crate::simulation::engine::Engine;
use crate::simulation::forces::{BodyForce, ContactForce, ForceSet};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{BodyId, NVec3, Particle, ParticleSystem};

const SPACING: f64 = 0.1;

/// Helper to build `n_bodies` cubes of `side^3` particles each, laid out
/// along x with a small gap between neighbouring cubes
fn make_cubes(n_bodies: usize, side: usize) -> (ParticleSystem, Vec<Body>) {
    let mut particles = Vec::with_capacity(n_bodies * side * side * side);
    let pitch = (side as f64 + 1.0) * SPACING;

    for b in 0..n_bodies {
        let origin = NVec3::new(b as f64 * pitch, 0.0, 0.0);
        for i in 0..side {
            for j in 0..side {
                for k in 0..side {
                    let x = origin + SPACING * NVec3::new(i as f64, j as f64, k as f64);
                    // deterministic mass noise, no rand needed
                    let id = particles.len();
                    let m = 1.0 + 0.1 * (id as f64 * 0.37).sin().abs();
                    particles.push(Particle::new(id, x, m, 0.5 * SPACING, Some(BodyId(b))));
                }
            }
        }
    }

    let bodies = (0..n_bodies)
        .map(|b| Body::new(BodyId(b)).with_velocity(NVec3::new((b as f64 * 0.13).cos(), 0.0, 0.0)))
        .collect();

    (ParticleSystem::new(particles), bodies)
}

/// RK2 scenario of `n_bodies` cubes under gravity with contact, used by [`bench_step`]
pub fn make_scenario(n_bodies: usize, side: usize, parallel: bool) -> Result<Scenario> {
    let (system, bodies) = make_cubes(n_bodies, side);

    let engine = Engine {
        integrator: IntegratorConfig::Rk2,
        parallel,
        tangential_history: true,
    };
    let parameters = Parameters {
        dt: 1.0e-4,
        t_end: 1.0,
        gravity: NVec3::new(0.0, -9.81, 0.0),
        log_every: 0,
    };
    let model = ContactModel::new(1.0e3, 0.5, 0.8, DEFAULT_EFFECTIVE_MASS)?;
    let forces = ForceSet::new()
        .with(BodyForce { gravity: parameters.gravity })
        .with(ContactForce::new(model, DirectNeighbors { cutoff: 2.0 * SPACING }, parallel));

    Scenario::from_parts(engine, parameters, system, bodies, forces)
}

/// Mean wall time of `steps` steps in milliseconds
fn time_steps(scenario: &mut Scenario, steps: usize) -> Result<f64> {
    let t0 = Instant::now();
    for _ in 0..steps {
        scenario.step()?;
    }
    Ok(t0.elapsed().as_secs_f64() * 1000.0 / steps as f64)
}

/// Time pass 1 of body aggregation, serial vs rayon
pub fn bench_aggregate() {
    let sides = [4, 8, 16, 24, 32];
    let n_bodies = 16;

    for side in sides {
        let (sys, _) = make_cubes(n_bodies, side);
        let n = sys.len();

        // Warm up
        let _ = accumulate_moments(&sys.particles, n_bodies);

        let t0 = Instant::now();
        let serial = accumulate_moments(&sys.particles, n_bodies);
        let dt_serial = t0.elapsed().as_secs_f64();

        #[cfg(feature = "parallel")]
        let (dt_parallel, mass_gap) = {
            let _ = par_accumulate_moments(&sys.particles, n_bodies);
            let t1 = Instant::now();
            let par = par_accumulate_moments(&sys.particles, n_bodies);
            let dt = t1.elapsed().as_secs_f64();
            let gap = serial
                .iter()
                .zip(&par)
                .map(|(a, b)| (a.mass - b.mass).abs())
                .fold(0.0, f64::max);
            (dt, gap)
        };
        #[cfg(not(feature = "parallel"))]
        let (dt_parallel, mass_gap) = {
            let _ = &serial;
            (f64::NAN, 0.0)
        };

        println!(
            "N = {:7}, serial = {:8.6} s, parallel = {:8.6} s, max mass gap = {:.2e}",
            n, dt_serial, dt_parallel, mass_gap
        );
    }
}

/// Time full RK2 steps (forces, contact, aggregation, integration)
/// Paste output directly into a spreadsheet to graph
pub fn bench_step() {
    let steps = 5;
    println!("N,serial_ms,parallel_ms");

    for side in [2, 3, 4, 5, 6] {
        let n_bodies = 8;
        let timed = make_scenario(n_bodies, side, false).and_then(|mut serial| {
            let ms_serial = time_steps(&mut serial, steps)?;
            let mut parallel = make_scenario(n_bodies, side, true)?;
            let ms_parallel = time_steps(&mut parallel, steps)?;
            Ok((serial.system.len(), ms_serial, ms_parallel))
        });

        match timed {
            Ok((n, ms_serial, ms_parallel)) => println!("{},{:.6},{:.6}", n, ms_serial, ms_parallel),
            Err(err) => eprintln!("benchmark with side {side} failed: {err}"),
        }
    }
}
