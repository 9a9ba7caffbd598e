//! Sample consumer of `fieldmapper`: request inputs mapped onto entities.

pub mod entities;
pub mod inputs;

include!(concat!(env!("OUT_DIR"), "/fieldmapper.rs"));
