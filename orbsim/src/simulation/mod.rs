pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod adaptive;
pub mod symplectic;
pub mod diagnostics;
pub mod trajectory;
pub mod initial;
pub mod scenario;
