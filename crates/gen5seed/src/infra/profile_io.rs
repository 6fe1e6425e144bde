//! Profile file I/O
//!
//! Profiles are stored as a JSON array. Every profile is validated on load so
//! the searchers never see an inconsistent one.

use crate::domain::profile::{Profile, ProfileError};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Profile file errors
#[derive(Debug, Error)]
pub enum ProfileIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("profile {name:?}: {source}")]
    Invalid { name: String, source: ProfileError },

    #[error("profile {0:?} not found")]
    NotFound(String),
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    Ok(())
}

/// Load and validate every profile in `path`
pub fn load_profiles(path: impl AsRef<Path>) -> Result<Vec<Profile>, ProfileIoError> {
    let file = File::open(path.as_ref())?;
    let profiles: Vec<Profile> = serde_json::from_reader(BufReader::new(file))?;

    for profile in &profiles {
        profile.validate().map_err(|source| ProfileIoError::Invalid {
            name: profile.name.clone(),
            source,
        })?;
    }

    Ok(profiles)
}

/// Load the profile called `name` from `path`
pub fn load_profile(path: impl AsRef<Path>, name: &str) -> Result<Profile, ProfileIoError> {
    load_profiles(path)?
        .into_iter()
        .find(|profile| profile.name == name)
        .ok_or_else(|| ProfileIoError::NotFound(name.to_string()))
}

/// Save profiles as pretty-printed JSON
pub fn save_profiles(path: impl AsRef<Path>, profiles: &[Profile]) -> Result<(), ProfileIoError> {
    ensure_parent_dir(path.as_ref())?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, profiles)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::tests::sample_profile;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_profiles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles").join("gen5.json");

        let mut second = sample_profile();
        second.name = "white".to_string();
        second.timer0_min = 0x1000;
        second.timer0_max = 0x1002;

        save_profiles(&path, &[sample_profile(), second.clone()]).unwrap();
        let loaded = load_profiles(&path).unwrap();
        assert_eq!(loaded, vec![sample_profile(), second.clone()]);
        assert_eq!(load_profile(&path, "white").unwrap(), second);
    }

    #[test]
    fn test_missing_profile_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gen5.json");
        save_profiles(&path, &[sample_profile()]).unwrap();

        assert!(matches!(
            load_profile(&path, "black2"),
            Err(ProfileIoError::NotFound(name)) if name == "black2"
        ));
    }

    #[test]
    fn test_defaults_applied() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("minimal.json");
        fs::write(
            &path,
            r#"[{
                "name": "minimal",
                "version": "Black2",
                "ds_type": "ThreeDs",
                "mac": 1234,
                "nazo": [1, 2, 3, 4, 5],
                "timer0_min": 4000,
                "timer0_max": 4001,
                "vcount": 130,
                "tid": 1,
                "sid": 2
            }]"#,
        )
        .unwrap();

        let profile = load_profile(&path, "minimal").unwrap();
        assert_eq!(profile.gxstat, 6);
        assert_eq!(profile.keypresses, [true, false, false, false]);
        assert!(!profile.memory_link);
        assert!(!profile.skip_lr);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        let mut profile = sample_profile();
        profile.timer0_min = 0xC80;
        save_profiles(&path, &[profile]).unwrap();

        assert!(matches!(
            load_profiles(&path),
            Err(ProfileIoError::Invalid {
                source: ProfileError::EmptyTimer0Range { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_profiles(&path), Err(ProfileIoError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_profiles(dir.path().join("absent.json")),
            Err(ProfileIoError::Io(_))
        ));
    }
}
