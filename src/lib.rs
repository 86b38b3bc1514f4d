// Configuration loading and validation
pub mod config;

// Simulation world: entities, food, behavior and physics
pub mod world;

// Tick orchestration and snapshot distribution
pub mod engine;

// WebSocket transport
pub mod api;
