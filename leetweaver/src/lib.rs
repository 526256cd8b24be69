// Environment configuration
pub mod config;

// Judge session (browser-driven)
pub mod judge;

// Results ledger
pub mod ledger;

// Text generation backend
pub mod llm;

// Sandboxed local test execution
pub mod runner;

// Solver workflow module
pub mod solver;

// Binary wiring
pub mod bootstrap;
