//! Human readable rendering of query results

use std::io::Write;
use std::time::Duration;

use roku_ecp::{ActiveApp, App, DeviceInfo, Info, Player};
use serde::Serialize;

use super::CliError;

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// `93784s` renders as `1d 2h 3m 4s`; leading zero units are dropped.
pub fn humanize(duration: Duration) -> String {
    let total = duration.as_secs();
    let units = [
        (total / 86_400, "d"),
        (total % 86_400 / 3_600, "h"),
        (total % 3_600 / 60, "m"),
        (total % 60, "s"),
    ];

    let parts: Vec<String> = units
        .iter()
        .skip_while(|(value, unit)| *value == 0 && *unit != "s")
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();
    parts.join(" ")
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}

pub fn device_info(info: &DeviceInfo) -> String {
    let uptime = info
        .uptime()
        .map(humanize)
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "Vendor: {}\nModel: {}\nNetwork: {}\nMAC: {}\nUptime: {}\nVersion: {}\n",
        or_unknown(&info.vendor_name),
        or_unknown(&info.model_name),
        or_unknown(&info.network_name),
        or_unknown(info.mac_address()),
        uptime,
        or_unknown(&info.software_version),
    )
}

pub fn root_info(info: &Info) -> String {
    let device = &info.device;
    let mut model = device.model_name.clone();
    if !device.model_number.is_empty() {
        model = format!("{} ({})", model, device.model_number);
    }
    format!(
        "Name: {}\nModel: {}\nSerial: {}\n",
        or_unknown(&device.friendly_name),
        or_unknown(&model),
        or_unknown(&device.serial_number),
    )
}

pub fn player(player: &Player) -> String {
    let mut text = format!("Player state: {}\n", or_unknown(&player.state));
    if player.has_error() {
        text.push_str(&format!("Error: {}\n", player.error));
    }
    if let Some(plugin) = &player.plugin {
        text.push_str(&format!("Plugin: {} (ID: {})\n", plugin.name, plugin.id));
    }
    if let Some(position) = player.position() {
        match player.duration() {
            Some(duration) => text.push_str(&format!(
                "Position: {} of {}\n",
                humanize(position),
                humanize(duration)
            )),
            None => text.push_str(&format!("Position: {}\n", humanize(position))),
        }
    }
    text.push_str(&format!("Live: {}\n", player.live.unwrap_or(false)));
    text
}

pub fn app_line(app: &App) -> String {
    format!("{} (ID: {})", app.name, app.id)
}

pub fn active_app(active: &ActiveApp) -> String {
    if active.is_home_screen() {
        return format!("Active App: {} (home screen)", or_unknown(&active.app.name));
    }
    let app = &active.app;
    format!("Active App: {} (ID: {}, Type: {})", app.name, app.id, app.kind)
}
