//! Canonical view models, independent of backend wire shapes.

mod matches;
mod overview;
mod question;

pub use matches::*;
pub use overview::*;
pub use question::*;
