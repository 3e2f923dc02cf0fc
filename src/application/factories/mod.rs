//! # Factories

pub mod log_entry_factory;

pub use log_entry_factory::LogEntryFactory;
