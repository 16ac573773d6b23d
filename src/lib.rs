//! Decimal vector algebra and relationships between lines in the plane.
//!
//! Every value is an immutable [`Dec`]-based type and every operation is a
//! pure function of its inputs, so the engine can be shared freely between
//! threads.

pub mod decimal;
pub mod error;
pub mod line;
pub mod vector;

pub use decimal::Dec;
pub use error::{GeometryError, Result};
pub use line::{Intersection, Line};
pub use vector::Vector;
