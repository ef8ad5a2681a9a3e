// Holiday calendar implementation
pub mod calendar;

// File-backed persistence adapters
pub mod persistence;
