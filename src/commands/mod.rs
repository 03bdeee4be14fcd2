// Command handlers module
pub mod config;
pub mod dump;
pub mod watch;

// Re-exports for cleaner imports
pub use dump::execute as dump;
pub use watch::execute as watch;
