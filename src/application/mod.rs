//! Application services: page lifecycle, post loading and listing assembly.

pub mod error;
pub mod listing;
pub mod loader;
pub mod page;
pub mod stream;
