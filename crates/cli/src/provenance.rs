//! Provenance sidecars for embedding outputs.
//!
//! Every file written by `embed` gets `<stem>.provenance.json` next to it,
//! recording the code revision, library version, call site and the exact
//! arguments (including the seed) needed to regenerate it.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Run parameters attached to a sidecar.
pub struct Payload {
    pub params: Value,
    pub library: &'static str,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            library: randfeat::VERSION,
        }
    }
}

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

#[derive(Serialize)]
struct Sidecar<'a> {
    code_rev: String,
    randfeat_version: &'a str,
    callsite: Callsite,
    params: &'a Value,
    outputs: Vec<String>,
}

/// Write the sidecar for `artifact` and return its path.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = provenance_path(artifact);
    let caller = Location::caller();
    let doc = Sidecar {
        code_rev: current_git_rev(),
        randfeat_version: payload.library,
        callsite: Callsite {
            file: caller.file(),
            line: caller.line(),
        },
        params: &payload.params,
        outputs: vec![artifact.to_string_lossy().into_owned()],
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing provenance {}", path.display()))?;
    tracing::debug!(path = %path.display(), "provenance written");
    Ok(path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "embedding".to_string());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`, else `"unknown"`.
pub fn current_git_rev() -> String {
    let configured = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty());
    if let Some(rev) = configured {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
