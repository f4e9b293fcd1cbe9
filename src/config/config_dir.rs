use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};

/// Points at a config file explicitly, wins over every other location.
pub const CONFIG_ENV: &str = "COURSEMATE_CONFIG";
const CONFIG_FILE: &str = "config.toml";

fn local_config() -> PathBuf {
    PathBuf::from(".").join(CONFIG_FILE)
}

/// `<base>/coursemate/config.toml`, where `base` is the platform config
/// directory.
fn user_config(base: Option<OsString>) -> Option<PathBuf> {
    let base = PathBuf::from(base?);
    Some(base.join(crate::APPLICATION_NAME).join(CONFIG_FILE))
}

fn platform_config_base() -> Option<OsString> {
    if cfg!(windows) {
        return std::env::var_os("APPDATA");
    }
    std::env::var_os("XDG_CONFIG_HOME")
        .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config").into()))
}

/// Resolves the config file: `$COURSEMATE_CONFIG`, then `./config.toml` for
/// local runs, then the per-user config dir, falling back to the local file.
pub fn find_config_file(use_local: bool) -> PathBuf {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(explicit);
    }
    if use_local {
        return local_config();
    }

    user_config(platform_config_base())
        .filter(|p| p.exists())
        .unwrap_or_else(local_config)
}

pub fn read_config_at(path: &Path) -> ConfigResult<Vec<u8>> {
    tracing::trace!("looking for config at: {}", path.display());
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }
    tracing::debug!("using {} as configuration file", path.display());
    Ok(std::fs::read(path)?)
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    read_config_at(&find_config_file(use_local))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn user_config_lives_under_app_dir() {
        let path = user_config(Some(OsString::from("/home/me/.config")));
        assert_eq!(
            path,
            Some(PathBuf::from("/home/me/.config/coursemate/config.toml"))
        );
        assert_eq!(user_config(None), None);
    }

    #[test]
    fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, b"[host]\nbindto = '0.0.0.0:1'").unwrap();

        assert_eq!(read_config_at(&path).unwrap(), b"[host]\nbindto = '0.0.0.0:1'");
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        match read_config_at(&path) {
            Err(ConfigError::ConfigNotFound(p)) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
