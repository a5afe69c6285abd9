pub mod node;
pub mod registry;

pub use node::{Archetype, WindowId, WindowNode};
pub use registry::Registry;
