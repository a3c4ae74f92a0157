//! Domain services: inventory parsing, OS normalization, classification,
//! the compatibility matrix and report generation.

pub mod classification;
pub mod file_parser;
pub mod matrix;
pub mod os_normalizer;
pub mod os_patterns;
pub mod report;
