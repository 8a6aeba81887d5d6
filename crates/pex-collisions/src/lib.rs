//! Collisions between the distributions bundled in a PEX and those already installed in the
//! environment it is materialized into.
//!
//! Only the packages a request explicitly manages (see [`ManagedPackages`]) are checked. A
//! collision is data, not an error: [`detect`] reports them, and [`resolve`] either refuses to
//! proceed or, when forced, replaces the environment's copies with the PEX's and verifies the
//! result.

pub use detect::{detect, detect_outdated, Conflict, Conflicts};
pub use diagnostic::{
    format_abort, format_outdated_abort, format_outdated_resolved, format_resolved,
};
pub use managed::ManagedPackages;
pub use resolve::{
    resolve, CollisionPolicy, Mismatch, ResolutionOutcome, ResolutionVerificationError,
    ResolveError,
};

mod detect;
mod diagnostic;
mod managed;
mod resolve;
