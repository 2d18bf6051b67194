// src/lib.rs

//! ADE calendar feed URL resolver library

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod rpc;
pub mod services;
pub mod storage;
pub mod utils;
