//! API handlers for the médiathèque REST endpoints

pub mod health;
pub mod loans;
pub mod media;
pub mod members;
pub mod openapi;
pub mod stats;
