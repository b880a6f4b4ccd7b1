mod prover;
mod state;
mod verifier;

pub use prover::*;
pub use state::*;
pub use verifier::*;
