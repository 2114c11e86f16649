use std::path::PathBuf;

use clap::Parser;
use tracing::warn;

use crate::*;

pub const DEFAULT_NAME: &str = "benchmark-csl";
pub const DEFAULT_TIME: &str = "12:00:00";
pub const DEFAULT_QUEUE: &str = "hive";
pub const DEFAULT_OUTPUT: &str = "benchmark-csl.out";

// Unset options fall back to the defaults file, then to the built-in defaults.
#[derive(Parser, Clone, Debug)]
pub struct JobOptions {
    /// Name of the script to be submitted.
    #[clap(short, long, value_name = "FILE", parse(from_os_str))]
    pub script: PathBuf,
    /// Name of the job [default: benchmark-csl]
    #[clap(short, long, value_name = "JOB")]
    pub name: Option<String>,
    /// Duration of the job [default: 12:00:00]
    #[clap(short = 'l', long, value_name = "HH:MM:SS")]
    pub time: Option<String>,
    /// Name of the queue [default: hive]
    #[clap(short, long, value_name = "NAME")]
    pub queue: Option<String>,
    /// Name of the output file [default: benchmark-csl.out]
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobRequest {
    pub script: PathBuf,
    pub name: String,
    pub duration: String,
    pub queue: String,
    pub output: String,
}

impl JobRequest {
    /// A request for `script` with every other field at its built-in default.
    pub fn new(script: impl Into<PathBuf>) -> Self {
        JobRequest {
            script: script.into(),
            name: DEFAULT_NAME.to_string(),
            duration: DEFAULT_TIME.to_string(),
            queue: DEFAULT_QUEUE.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
        }
    }

    pub fn resolve(options: JobOptions, defaults: &Defaults) -> Result<Self> {
        fn pick(flag: Option<String>, default: &Option<String>, builtin: &str) -> String {
            flag.or_else(|| default.clone())
                .unwrap_or_else(|| builtin.to_string())
        }

        let JobOptions {
            script,
            name,
            time,
            queue,
            output,
        } = options;

        let job = JobRequest {
            script,
            name: pick(name, &defaults.name, DEFAULT_NAME),
            duration: pick(time, &defaults.time, DEFAULT_TIME),
            queue: pick(queue, &defaults.queue, DEFAULT_QUEUE),
            output: pick(output, &defaults.output, DEFAULT_OUTPUT),
        };
        job.check()?;
        Ok(job)
    }

    fn check(&self) -> Result<()> {
        let meta = std::fs::metadata(&self.script).context_read(&self.script)?;
        if meta.is_dir() {
            bail!("{} is a directory, not a script", self.script.display())
        }
        // The scheduler gets the last word on walltimes.
        if let Err(e) = parse_walltime(&self.duration) {
            warn!("{}, passing it to the scheduler unchanged", e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> JobOptions {
        JobOptions::try_parse_from(std::iter::once("pbs-submit").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn script_is_required() {
        assert!(JobOptions::try_parse_from(["pbs-submit"]).is_err());
        assert!(JobOptions::try_parse_from(["pbs-submit", "-n", "job"]).is_err());
    }

    #[test]
    fn short_and_long_flags() {
        let short = options(&["-s", "a.sh", "-n", "j", "-l", "1:00:00", "-q", "q", "-o", "o.log"]);
        let long = options(&[
            "--script", "a.sh", "--name", "j", "--time", "1:00:00", "--queue", "q", "--output",
            "o.log",
        ]);
        for o in [short, long] {
            assert_eq!(o.script, PathBuf::from("a.sh"));
            assert_eq!(o.name.as_deref(), Some("j"));
            assert_eq!(o.time.as_deref(), Some("1:00:00"));
            assert_eq!(o.queue.as_deref(), Some("q"));
            assert_eq!(o.output.as_deref(), Some("o.log"));
        }
    }

    #[test]
    fn builtin_defaults() {
        let script = tempfile::NamedTempFile::new().unwrap();
        let o = options(&["-s", script.path().to_str().unwrap()]);
        let job = JobRequest::resolve(o, &Defaults::default()).unwrap();
        assert_eq!(job, JobRequest::new(script.path()));
        assert_eq!(job.name, "benchmark-csl");
        assert_eq!(job.duration, "12:00:00");
        assert_eq!(job.queue, "hive");
        assert_eq!(job.output, "benchmark-csl.out");
    }

    #[test]
    fn flags_override_defaults_file() {
        let script = tempfile::NamedTempFile::new().unwrap();
        let defaults = Defaults {
            name: Some("from-config".into()),
            queue: Some("inferno".into()),
            ..Default::default()
        };
        let o = options(&["-s", script.path().to_str().unwrap(), "-n", "from-flag"]);
        let job = JobRequest::resolve(o, &defaults).unwrap();
        assert_eq!(job.name, "from-flag");
        assert_eq!(job.queue, "inferno");
        assert_eq!(job.duration, DEFAULT_TIME);
    }

    #[test]
    fn malformed_time_is_passed_through() {
        let script = tempfile::NamedTempFile::new().unwrap();
        let o = options(&["-s", script.path().to_str().unwrap(), "-l", "two days"]);
        let job = JobRequest::resolve(o, &Defaults::default()).unwrap();
        assert_eq!(job.duration, "two days");
    }

    #[test]
    fn missing_script() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.sh");
        let o = options(&["-s", missing.to_str().unwrap()]);
        let err = JobRequest::resolve(o, &Defaults::default()).unwrap_err();
        assert!(err.to_string().contains("missing.sh"));
    }

    #[test]
    fn directory_is_not_a_script() {
        let dir = tempfile::tempdir().unwrap();
        let o = options(&["-s", dir.path().to_str().unwrap()]);
        assert!(JobRequest::resolve(o, &Defaults::default()).is_err());
    }
}
