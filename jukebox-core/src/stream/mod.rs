mod reconciler;
mod state;

pub use reconciler::*;
pub use state::*;
