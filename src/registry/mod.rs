// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use handlers::{
    generate_code, get_game, join_game, leave_game, list_games, register_game, unregister_game,
};

// Internal modules
pub mod cleanup_task;
pub mod code;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
