//! Everything related to import / export of routing data.

pub mod json;
pub mod map_file;
