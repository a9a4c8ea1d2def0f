//! Representation codes and the values they decode into.

pub mod reprc;
pub mod value;

pub use reprc::RepresentationCode;
pub use value::{Attref, DateTime, Obname, Objref, Value};
