//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod batch_call_service;
pub mod call_analytics_service;
pub mod phone_number;
pub mod twilio_client;
pub mod user_service;
