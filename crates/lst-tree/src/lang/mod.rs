//! Reference languages

pub mod properties;
pub mod properties_parser;
pub mod text;
