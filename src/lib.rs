// src/lib.rs

//! ucsync library: U-Cursos material scraping and calendar publishing.

pub mod calendar;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;
