pub mod analysis;
pub mod radar;
pub mod serve;

// Re-export command functions for convenience
pub use analysis::{check, refresh};
pub use radar::{radar, RadarParams};
pub use serve::{seed, serve, ServeParams};
