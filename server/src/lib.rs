// src/lib.rs

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod media;
pub mod model;
pub mod response;
pub mod service;
pub mod store;
pub mod validation;
