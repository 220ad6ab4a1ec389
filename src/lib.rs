//! Tetris simulation (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof:
//! `tetris_sim::{types, core, particles, session, engine}`.

pub use tetris_sim_core as core;
pub use tetris_sim_engine as engine;
pub use tetris_sim_particles as particles;
pub use tetris_sim_session as session;
pub use tetris_sim_types as types;
