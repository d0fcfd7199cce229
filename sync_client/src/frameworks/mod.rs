// Frameworks layer: runtime bootstrap, configuration and the bundled headless adapter.

pub mod client;
pub mod config;
pub mod headless;
