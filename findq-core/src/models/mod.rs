//! Validated input types
//!
//! Boundary input is checked when these types are constructed, so the
//! repositories only ever see well-formed values. Invalid input returns
//! ValidationError, not panic.

pub mod coordinates;
pub mod description;
pub mod username;
pub mod validation;

pub use coordinates::Coordinates;
pub use description::Description;
pub use username::Username;
pub use validation::ValidationError;
