//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod paths;
pub mod settings;
pub mod storage;

pub use paths::{
    ensure_data_dir, ensure_log_dir, get_data_dir, get_log_dir, get_storage_path,
};
pub use settings::{
    ensure_settings_file, ensure_settings_file_at, get_settings_path, load_settings,
    load_settings_from,
};
pub use storage::JsonFileStore;
