//! Factlens HTTP server library (used by the binary and integration
//! tests).

pub mod gateway;

pub use gateway::{HandlerState, create_router_with_state};
