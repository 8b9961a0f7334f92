mod item;
mod length;
mod queue;

pub use item::*;
pub use length::*;
pub use queue::*;
