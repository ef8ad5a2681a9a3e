// Core entity and result types
pub mod types;

// Domain-specific error types
pub mod errors;

// Per-category analysis thresholds
pub mod profiles;

// Port interfaces (persistence, calendar)
pub mod ports;
