use std::process::Command;

use anyhow::{Context, Result, bail};

/// Resolved caller identity: project plus a bearer token. Both are looked up
/// once per invocation; CLI runs are short-lived relative to token expiry.
#[derive(Clone)]
pub struct Credentials {
    pub project: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("project", &self.project)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Discover credentials: environment first, then the gcloud CLI.
pub fn discover() -> Result<Credentials> {
    let token = access_token()?;
    let project = project_id()?;
    Ok(Credentials { project, token })
}

/// Access token. Priority: `GOOGLE_OAUTH_ACCESS_TOKEN` env, then
/// `gcloud auth print-access-token`.
fn access_token() -> Result<String> {
    if let Ok(token) = std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN") {
        let token = token.trim().to_string();
        if !token.is_empty() {
            return Ok(token);
        }
    }

    gcloud_value(&["auth", "print-access-token"]).context(
        "Could not get default credentials. \
         Make sure you have run 'gcloud auth login' \
         (or set GOOGLE_OAUTH_ACCESS_TOKEN)",
    )
}

/// Project ID. Priority: `GOOGLE_CLOUD_PROJECT` / `GCLOUD_PROJECT` env, then
/// the active gcloud configuration.
fn project_id() -> Result<String> {
    for var in ["GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"] {
        if let Ok(project) = std::env::var(var) {
            let project = project.trim().to_string();
            if !project.is_empty() {
                return Ok(project);
            }
        }
    }

    let project = gcloud_value(&["config", "get-value", "project"])
        .context("Could not determine the project. Set GOOGLE_CLOUD_PROJECT or run 'gcloud config set project <id>'")?;
    if project.is_empty() || project == "(unset)" {
        bail!(
            "No default project configured. \
             Set GOOGLE_CLOUD_PROJECT or run 'gcloud config set project <id>'"
        );
    }
    Ok(project)
}

/// Run gcloud with the given args and return trimmed stdout.
fn gcloud_value(args: &[&str]) -> Result<String> {
    which::which("gcloud").map_err(|_| anyhow::anyhow!("gcloud CLI not found on PATH"))?;

    let output = Command::new("gcloud")
        .args(args)
        .output()
        .with_context(|| format!("Failed to run: gcloud {}", args.join(" ")))?;

    if !output.status.success() {
        bail!(
            "gcloud {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
