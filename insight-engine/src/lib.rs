pub mod logging;
pub mod router;
pub mod subsystems;

pub use router::Engine;
