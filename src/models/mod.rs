//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod batch_call_model;
pub mod call_model;
pub mod user_model;
