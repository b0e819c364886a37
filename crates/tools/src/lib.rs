pub mod errors;
pub mod fuzzy;
