//! Protocol exposures of the registered resources

pub mod rest;

pub use rest::RestExposure;
