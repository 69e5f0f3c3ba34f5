//! `roku apps ...`

use std::io::Write;

use tracing::info;

use super::output::{self, write_json};
use super::{CliError, Context};

pub async fn list(ctx: &mut Context, out: &mut dyn Write) -> Result<(), CliError> {
    let apps = ctx.device().await?.apps().await?;
    let sorted = apps.sorted_by_name();
    if ctx.json {
        return write_json(out, &sorted);
    }

    if sorted.is_empty() {
        writeln!(out, "No apps installed.")?;
    }
    for app in sorted {
        writeln!(out, "{}", output::app_line(app))?;
    }
    Ok(())
}

pub async fn active(ctx: &mut Context, out: &mut dyn Write) -> Result<(), CliError> {
    let active = ctx.device().await?.active_app().await?;
    if ctx.json {
        return write_json(out, &active.app);
    }
    writeln!(out, "{}", output::active_app(&active))?;
    Ok(())
}

/// Launch an installed app, matching id or name without regard to case.
pub async fn launch(ctx: &mut Context, query: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let query = non_empty(query)?;
    let device = ctx.device().await?;
    let apps = device.apps().await?;
    let app = apps
        .find(query)
        .ok_or_else(|| CliError::AppNotFound(query.to_string()))?;

    device.launch(&app.id).await?;
    writeln!(out, "App '{}' launched successfully.", app.name)?;
    Ok(())
}

/// Install an app by id unless something matching is already installed.
pub async fn add(ctx: &mut Context, query: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let query = non_empty(query)?;
    let device = ctx.device().await?;
    let apps = device.apps().await?;
    if let Some(app) = apps.find(query) {
        info!("'{}' matches installed app {} ({})", query, app.name, app.id);
        return Err(CliError::AlreadyInstalled(query.to_string()));
    }

    device.install(query).await?;
    writeln!(out, "App '{}' installed successfully.", query)?;
    Ok(())
}

fn non_empty(query: &str) -> Result<&str, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::EmptyApp);
    }
    Ok(query)
}
