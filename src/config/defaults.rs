use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "mcmods.toml";

pub const ENV_PREFIX: &str = "MCMODS";

/// `./mcmods.toml` if present, else the platform config directory.
pub fn config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return local;
    }
    directories::ProjectDirs::from("", "", "mcmods")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}

pub fn api_url() -> String {
    crate::api::labrinth::LABRINTH_URL.to_string()
}

pub fn enabled() -> bool {
    true
}
