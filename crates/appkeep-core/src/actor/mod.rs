//! Actor implementations

pub mod store;

pub use store::StoreActor;
