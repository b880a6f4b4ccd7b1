mod holder;
mod issuer;
mod state;

pub use holder::*;
pub use issuer::*;
pub use state::*;
