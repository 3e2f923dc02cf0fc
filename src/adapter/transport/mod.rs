//! Upload Transport Implementations

pub mod simulated;

pub use simulated::SimulatedUploadTransport;
