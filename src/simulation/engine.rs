//! High-level runtime engine settings
//!
//! Selects the body integrator, whether particle-indexed work runs on the
//! rayon pool, and whether contact history is integrated between steps

use crate::configuration::config::IntegratorConfig;

#[derive(Debug, Clone)]
pub struct Engine {
    pub integrator: IntegratorConfig, // euler or rk2
    pub parallel: bool,               // false = serial, true = rayon (needs the `parallel` feature)
    pub tangential_history: bool,     // integrate tangential contact displacement every step
}
