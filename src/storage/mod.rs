//! Storage implementations of the record services

pub mod in_memory;

pub use in_memory::InMemoryRecordService;
