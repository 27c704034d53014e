pub mod core;
pub mod discovery;
pub mod flatten;
pub mod languages;
pub mod source;
