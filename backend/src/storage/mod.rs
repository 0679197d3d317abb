//! # Storage Module
//!
//! The seam between the pure domain and whatever document store the
//! embedding application uses. The domain never queries storage itself; it
//! is handed full collections read through these traits.

pub mod memory;
pub mod traits;

pub use memory::MemoryRepository;
pub use traits::{Document, Repository};
