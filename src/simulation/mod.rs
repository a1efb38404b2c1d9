pub mod states;
pub mod body;
pub mod params;
pub mod engine;
pub mod aggregate;
pub mod rotation;
pub mod kinematics;
pub mod contact;
pub mod coupling;
pub mod forces;
pub mod integrator;
pub mod scenario;
