//! Domain models for the dashboard engine

pub mod context;
pub mod declaration;
pub mod partner;
pub mod resolved;
pub mod snapshot;

pub use context::*;
pub use declaration::*;
pub use partner::*;
pub use resolved::*;
pub use snapshot::*;
