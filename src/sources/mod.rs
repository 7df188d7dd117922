//! Concrete caption sources.

pub mod youtube;
