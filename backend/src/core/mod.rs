//! Core time management

pub mod time;
