pub mod path_processing;
pub mod preferences;
pub mod text_processing;

pub use path_processing::{LOG_PATH_ENV, default_log_path, expand_tilde};
pub use preferences::{PREFERENCES_PATH_ENV, PreferencesError, PreferencesPayload, UserPreferences};
pub use text_processing::{
    format_file_size, is_letters_only, sanitize_letters_input, truncate_display_width, truncate_file_name,
};
