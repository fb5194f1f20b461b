//! Configuration storage adapters

mod json_store;

pub use json_store::JsonConfigStore;
