use std::{fmt::Display, path::Path, process::Command};

use once_cell::sync::Lazy;
use regex::Regex;

pub use anyhow::{anyhow, bail, Context, Result};
pub use std::result::Result as StdResult;

mod config;
pub use config::*;

pub mod job;
pub mod script;
pub mod submit;

pub use job::{JobOptions, JobRequest};
pub use script::{assemble, render_preamble, AssembledScript};
pub use submit::{assemble_and_submit, DryRun, Qsub, SubmitError, Submitter};

/// Attaches the offending path to I/O errors.
pub trait IoContext<T> {
    fn context_read(self, path: impl AsRef<Path>) -> Result<T>;
    fn context_write(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T, E> IoContext<T> for StdResult<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context_read(self, path: impl AsRef<Path>) -> Result<T> {
        let path = path.as_ref();
        self.with_context(|| format!("failed to read {}", path.display()))
    }

    fn context_write(self, path: impl AsRef<Path>) -> Result<T> {
        let path = path.as_ref();
        self.with_context(|| format!("failed to write {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Walltime(String),
}

pub type ParseResult<T> = StdResult<T, ParseError>;

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Walltime(s) => write!(f, "unable to parse walltime ({})", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a PBS walltime of the form `[[HH:]MM:]SS` into seconds.
pub fn parse_walltime(s: &str) -> ParseResult<u64> {
    static WALLTIME: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?:(?:(?P<hours>\d+):)?(?P<mins>\d+):)?(?P<secs>\d+)$").unwrap()
    });
    let make_error = || ParseError::Walltime(s.to_string());

    let captures = WALLTIME.captures(s).ok_or_else(make_error)?;

    let parse_optional_field = |n| {
        captures
            .name(n)
            .map(|m| m.as_str().parse::<u64>().map_err(|_| make_error()))
            .unwrap_or(Ok(0))
    };

    let hrs = parse_optional_field("hours")?;
    let min = parse_optional_field("mins")?;
    let secs = parse_optional_field("secs")?;

    hrs.checked_mul(60)
        .and_then(|m| m.checked_add(min))
        .and_then(|m| m.checked_mul(60))
        .and_then(|s| s.checked_add(secs))
        .ok_or_else(make_error)
}

/// Renders a command the way a shell user would type it.
#[derive(Clone, Copy)]
pub struct DisplayCmd<'a>(pub &'a Command);

impl<'a> Display for DisplayCmd<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.get_program().to_string_lossy())?;
        for arg in self.0.get_args() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
