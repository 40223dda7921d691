//! ECS Components
//!
//! Session resources: the hidden cave, the explorer's status and the
//! explorer's beliefs.

pub mod cave;
pub mod explorer;
pub mod knowledge;

pub use cave::*;
pub use explorer::*;
pub use knowledge::*;
