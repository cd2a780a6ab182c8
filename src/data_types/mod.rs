pub mod matrix;
pub mod panel;
pub mod query;
pub mod settings;
pub mod wire;

// Re-export everything for convenience
pub use matrix::*;
pub use panel::*;
pub use query::*;
pub use settings::*;
pub use wire::*;
