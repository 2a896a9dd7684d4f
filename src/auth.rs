//! Auth types, redacted tokens, the per-type auth gate, and explicit gating wrappers.

pub mod gate;
pub mod guard;
pub mod kind;
pub mod token;

pub use gate::*;
pub use guard::*;
pub use kind::*;
pub use token::*;
