pub mod batch;
pub mod cli;
pub mod config;
pub mod config_patch;
pub mod discovery;
pub mod error;
pub mod fine_tune;
pub mod metrics;
pub mod preprocess;
pub mod process;
pub mod projects;
pub mod restore;
pub mod results;
pub mod run_context;
pub mod schema;
pub mod splits;
pub mod stage;
pub mod workspace;
