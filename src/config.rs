use serde::{de::DeserializeOwned, Deserialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::*;

pub const DEFAULTS_FILE: &str = "defaults.json";

pub fn config_directory() -> Result<PathBuf> {
    let mut p = dirs::config_dir()
        .ok_or_else(|| anyhow!("unable to determine user config directory"))?;
    p.push("pbs-tools");
    Ok(p)
}

pub fn read_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let f = std::fs::File::open(path).context_read(path)?;
    serde_json::from_reader(std::io::BufReader::new(f))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Per-user overrides of the built-in job defaults.  Command-line flags take
/// precedence over everything in here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub name: Option<String>,
    pub time: Option<String>,
    pub queue: Option<String>,
    pub output: Option<String>,
    pub qsub: Option<String>,
    pub tmp_dir: Option<PathBuf>,
}

impl Defaults {
    /// Loads `defaults.json` from the user config directory, if there is one.
    pub fn load() -> Result<Defaults> {
        match config_directory() {
            Ok(mut p) => {
                p.push(DEFAULTS_FILE);
                Self::load_from(p)
            }
            Err(e) => {
                debug!("{:#}, using built-in defaults", e);
                Ok(Default::default())
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Defaults> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no defaults file");
            return Ok(Default::default());
        }
        let defaults = read_json(path)?;
        debug!(path = %path.display(), ?defaults, "loaded defaults file");
        Ok(defaults)
    }

    pub fn qsub(&self) -> &str {
        self.qsub.as_deref().unwrap_or(submit::QSUB)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.tmp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_builtin_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let d = Defaults::load_from(dir.path().join(DEFAULTS_FILE)).unwrap();
        assert_eq!(d, Defaults::default());
        assert_eq!(d.qsub(), "qsub");
        assert_eq!(d.tmp_dir(), std::env::temp_dir());
    }

    #[test]
    fn partial_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"queue": "inferno", "qsub": "/opt/pbs/bin/qsub"}}"#).unwrap();
        let d = Defaults::load_from(f.path()).unwrap();
        assert_eq!(d.queue.as_deref(), Some("inferno"));
        assert_eq!(d.name, None);
        assert_eq!(d.qsub(), "/opt/pbs/bin/qsub");
    }

    #[test]
    fn unknown_keys_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"walltime": "01:00:00"}}"#).unwrap();
        let err = Defaults::load_from(f.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse"));
    }
}
