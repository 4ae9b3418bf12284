/// Maps domain errors onto HTTP responses
pub mod error_handling;
/// Path, body and query extractors with envelope rejections
pub mod extract;
