//! Select command

use std::path::Path;

use crate::error::{CliError, Result};
use chartpin_core::InvalidVersionPolicy;
use chartpin_repo::{
    ChartVersionSelector, CredentialChain, CredentialStore, Credentials, DockerConfig, Settings,
    StaticCredentials,
};

/// Options of `chartpin select`
#[derive(Debug)]
pub struct SelectArgs<'a> {
    pub repo_url: &'a str,
    pub chart: &'a str,
    pub constraint: &'a str,
    pub username: Option<&'a str>,
    pub password_env: &'a str,
    pub config: Option<&'a Path>,
    pub timeout: Option<u64>,
    pub skip_invalid: bool,
    pub json: bool,
}

/// Print the newest version of a chart that satisfies the constraint
pub async fn run(args: SelectArgs<'_>) -> Result<()> {
    let settings = load_settings(&args)?;
    let selector = ChartVersionSelector::new(&settings)?;
    let credentials = credential_chain(args.username, args.password_env)?;

    let selected = selector
        .select_version_with(args.repo_url, args.chart, args.constraint, &credentials)
        .await?;

    let Some(version) = selected else {
        return Err(CliError::NoMatch {
            chart: args.chart.to_string(),
            repo_url: args.repo_url.to_string(),
            constraint: args.constraint.to_string(),
        });
    };

    if args.json {
        let json = serde_json::json!({
            "repository": args.repo_url,
            "chart": args.chart,
            "constraint": args.constraint,
            "version": version,
        });
        let rendered =
            serde_json::to_string_pretty(&json).map_err(|e| CliError::internal(e.to_string()))?;
        println!("{}", rendered);
    } else {
        println!("{}", version);
    }

    Ok(())
}

fn load_settings(args: &SelectArgs<'_>) -> Result<Settings> {
    let mut settings = match args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| {
        CliError::input_with_help(
            format!("failed to load settings: {}", e),
            "Check the file passed with --config or $CHARTPIN_CONFIG",
        )
    })?;

    if let Some(timeout) = args.timeout {
        settings.timeout_seconds = timeout;
    }
    if args.skip_invalid {
        settings.invalid_versions = InvalidVersionPolicy::Skip;
    }

    tracing::debug!("Using settings {:?}", settings);
    Ok(settings)
}

/// Explicit credentials win; otherwise the credential store, then Docker's config
fn credential_chain(username: Option<&str>, password_env: &str) -> Result<CredentialChain> {
    if let Some(username) = username {
        let password = std::env::var(password_env).map_err(|_| {
            CliError::input_with_help(
                format!("--username given but ${} is not set", password_env),
                format!("export {}=<password>", password_env),
            )
        })?;
        let credentials = Credentials::new(username, password);
        return Ok(CredentialChain::new().with(StaticCredentials::new(Some(credentials))));
    }

    Ok(CredentialChain::new()
        .with(CredentialStore::load()?)
        .with(DockerConfig::load(None)?))
}
