// src/lib.rs
pub mod api;
pub mod config;
pub mod dashboard;
pub mod server;

pub use api::{
    cancel::CancelFlag,
    dir_size::DirSizeService,
    dir_sizer::{
        cancel_all, cancel_dir_sizer, resolve_page, start_dir_sizer, DispatchSummary,
        HttpSizeSource, SizeEvent, SizeSource, DIR_SIZE_ROUTE,
    },
    error::{DispatchError, SizeError, UnreadableEntry},
    fs::{tally, EntryKind, FileSystem, LocalFs, MemoryFs, WalkEntry, WalkTally},
    types::{format_mb, SizeResult},
};
pub use config::{Config, ConfigError, MonitoredPath};
pub use server::{build_router, serve, AppState};
