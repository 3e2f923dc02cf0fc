//! # Data Transfer Objects

pub mod outcome;

pub use outcome::Outcome;
