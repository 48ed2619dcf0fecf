// src/api/mod.rs
pub mod cancel;
pub mod dir_size;
pub mod dir_sizer;
pub mod error;
pub mod fs;
pub mod types;
