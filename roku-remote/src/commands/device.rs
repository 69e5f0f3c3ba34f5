//! `roku device ...`

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use roku_discovery::DiscoveryError;
use roku_ecp::{ActionTable, EcpError};
use tracing::{debug, info};

use super::output::{self, write_json};
use super::{CliError, Context};
use crate::session::keymap::REMOTE_KEYMAP;
use crate::session::runner::DispatchFn;
use crate::session::terminal::run_interactive;
use crate::session::Session;

/// Search the network, remember what answered and pick a default.
pub async fn find(ctx: &mut Context, window: Duration, out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(out, "Scanning for Roku devices for {} seconds...", window.as_secs())?;
    out.flush()?;

    let search = tokio::task::spawn_blocking(move || roku_discovery::search(window));
    let found = tokio::select! {
        _ = ctx.cancel.cancelled() => return Err(EcpError::Cancelled.into()),
        joined = search => joined.map_err(|e| DiscoveryError::Network(e.to_string()))??,
    };

    if found.is_empty() {
        writeln!(out, "No Roku devices found on your network.")?;
        return Ok(());
    }

    for device in &found {
        info!("Found {} at {}", device.usn, device.location);
    }
    let addresses: Vec<String> = found.iter().map(|d| d.address.to_string()).collect();
    remember_devices(ctx, &addresses)?;

    match pick(ctx, "Select a Roku device", addresses).await? {
        Some(address) => save_host(ctx, &address, out),
        None => {
            writeln!(out, "Selection cancelled.")?;
            Ok(())
        }
    }
}

/// Pick the default among devices stored by a previous `find`.
pub async fn switch(ctx: &mut Context, out: &mut dyn Write) -> Result<(), CliError> {
    let devices = ctx.config.devices();
    if devices.is_empty() {
        writeln!(
            out,
            "No devices stored. Run 'roku device find' to discover and store devices."
        )?;
        return Ok(());
    }

    match pick(ctx, "Switch Roku device", devices).await? {
        Some(address) => save_host(ctx, &address, out),
        None => {
            writeln!(out, "Selection cancelled.")?;
            Ok(())
        }
    }
}

/// Store the discovered addresses without touching the selected host.
pub fn remember_devices(ctx: &mut Context, addresses: &[String]) -> Result<(), CliError> {
    ctx.config.set_devices(addresses)?;
    ctx.config.persist()?;
    debug!("Stored {} device(s)", addresses.len());
    Ok(())
}

/// Make `address` the default device and write the config file.
pub fn save_host(ctx: &mut Context, address: &str, out: &mut dyn Write) -> Result<(), CliError> {
    ctx.config.set_host(address)?;
    ctx.config.persist()?;
    writeln!(out, "Updated config file: {}", ctx.config.path().display())?;
    writeln!(out, "Default Roku device set to: {}", address)?;
    Ok(())
}

async fn pick(ctx: &Context, title: &str, addresses: Vec<String>) -> Result<Option<String>, CliError> {
    let session = Session::select(title, addresses, |address| address.clone());
    let session = run_interactive(session, None, &ctx.cancel)
        .await
        .map_err(CliError::Terminal)?;
    Ok(session.into_selected())
}

pub async fn describe(ctx: &mut Context, out: &mut dyn Write) -> Result<(), CliError> {
    let info = ctx.device().await?.describe().await?;
    if ctx.json {
        return write_json(out, &info);
    }
    write!(out, "{}", output::device_info(&info))?;
    Ok(())
}

pub async fn info(ctx: &mut Context, out: &mut dyn Write) -> Result<(), CliError> {
    let info = ctx.device().await?.info().await?;
    if ctx.json {
        return write_json(out, &info);
    }
    write!(out, "{}", output::root_info(&info))?;
    Ok(())
}

pub async fn live(ctx: &mut Context, out: &mut dyn Write) -> Result<(), CliError> {
    let player = ctx.device().await?.player().await?;
    if ctx.json {
        return write_json(out, &player);
    }
    write!(out, "{}", output::player(&player))?;
    Ok(())
}

/// Send a single named action.
pub async fn send(ctx: &mut Context, action: &str, out: &mut dyn Write) -> Result<(), CliError> {
    // Unknown names fail before the device is probed.
    ActionTable::standard().resolve(action)?;

    let device = ctx.device().await?;
    device.action(action).await?;
    writeln!(out, "Action '{}' sent to {}", action, device.address)?;
    Ok(())
}

/// Browse every action and send the one under the cursor on enter.
pub async fn send_interactive(ctx: &mut Context) -> Result<(), CliError> {
    let device = ctx.device().await?;
    let names = device.client().actions().names();
    let title = format!("Send an action to {}", device.address);

    let dispatch: DispatchFn<&'static str> = Arc::new(move |name: &'static str| {
        let device = device.clone();
        async move { device.action(name).await.map_err(|e| e.to_string()) }.boxed()
    });

    let session = Session::dispatch(title, names, |name| name.to_string());
    run_interactive(session, Some(dispatch), &ctx.cancel)
        .await
        .map_err(CliError::Terminal)?;
    Ok(())
}

/// Keyboard remote: every mapped key sends its action straight away.
pub async fn control(ctx: &mut Context) -> Result<(), CliError> {
    let device = ctx.device().await?;
    let title = format!("Roku remote: {}", device.address);

    let actions: Vec<&'static str> = REMOTE_KEYMAP.iter().map(|(_, _, action)| *action).collect();
    let bindings = REMOTE_KEYMAP
        .iter()
        .enumerate()
        .map(|(index, (key, legend, _))| (*key, *legend, index))
        .collect();

    let dispatch: DispatchFn<&'static str> = Arc::new(move |name: &'static str| {
        let device = device.clone();
        async move { device.action(name).await.map_err(|e| e.to_string()) }.boxed()
    });

    let session = Session::keypad(title, actions, |name| name.to_string(), bindings);
    run_interactive(session, Some(dispatch), &ctx.cancel)
        .await
        .map_err(CliError::Terminal)?;
    Ok(())
}

/// Type `text` into whatever field has focus.
pub async fn type_text(ctx: &mut Context, text: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let device = ctx.device().await?;
    device.input(text).await?;
    writeln!(out, "Text sent to {}", device.address)?;
    Ok(())
}

pub async fn search(ctx: &mut Context, keyword: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let device = ctx.device().await?;
    device.search(keyword).await?;
    writeln!(out, "Searching for '{}' on {}", keyword, device.address)?;
    Ok(())
}
