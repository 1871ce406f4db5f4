//! Configuration models and environment loading.

pub mod settings;

pub use settings::{EventWindow, Settings};
