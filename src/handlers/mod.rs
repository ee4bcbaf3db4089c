//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (analítica, batch calls, usuarios).
pub mod analysis_handler;
pub mod batch_call_handler;
pub mod system_handler;
pub mod user_handler;
