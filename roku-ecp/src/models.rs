//! Typed payloads decoded from ECP query responses.
//!
//! Every struct deserializes from the device's XML and serializes to plain
//! field names so the CLI can print it as JSON.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Decode an XML document into one of the payload types below.
pub fn from_xml<T: DeserializeOwned>(xml: &str) -> Result<T, quick_xml::DeError> {
    quick_xml::de::from_str(xml)
}

/// UPnP root description served at `/`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    #[serde(default)]
    pub spec_version: Option<SpecVersion>,
    pub device: RootDevice,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpecVersion {
    pub major: u32,
    pub minor: u32,
}

/// The `<device>` element of the root description.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RootDevice {
    pub device_type: String,
    pub friendly_name: String,
    pub manufacturer: String,
    #[serde(rename(deserialize = "manufacturerURL"))]
    pub manufacturer_url: String,
    pub model_description: String,
    pub model_name: String,
    pub model_number: String,
    #[serde(rename(deserialize = "modelURL"))]
    pub model_url: String,
    pub serial_number: String,
    #[serde(rename(deserialize = "UDN"))]
    pub udn: String,
    pub service_list: ServiceList,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ServiceList {
    #[serde(rename(deserialize = "service"), default)]
    pub services: Vec<ServiceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceEntry {
    pub service_type: String,
    pub service_id: String,
    #[serde(rename(deserialize = "controlURL"))]
    pub control_url: String,
    #[serde(rename(deserialize = "eventSubURL"))]
    pub event_sub_url: String,
    #[serde(rename(deserialize = "SCPDURL"))]
    pub scpd_url: String,
}

/// Detailed device descriptor served at `/query/device-info`.
///
/// Only the fields the CLI shows or that scripts commonly read are modelled;
/// unknown elements are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all(deserialize = "kebab-case"), default)]
pub struct DeviceInfo {
    pub udn: String,
    pub serial_number: String,
    pub device_id: String,
    pub vendor_name: String,
    pub model_name: String,
    pub model_number: String,
    pub model_region: String,
    pub is_tv: Option<bool>,
    pub is_stick: Option<bool>,
    pub supports_ethernet: Option<bool>,
    pub wifi_mac: String,
    pub ethernet_mac: String,
    pub network_type: String,
    pub network_name: String,
    pub friendly_device_name: String,
    pub friendly_model_name: String,
    pub default_device_name: String,
    pub user_device_name: String,
    #[serde(rename(deserialize = "user-device-location"))]
    pub user_device_location: String,
    pub build_number: String,
    pub software_version: String,
    pub software_build: String,
    pub secure_device: Option<bool>,
    pub language: String,
    pub country: String,
    pub locale: String,
    pub time_zone_name: String,
    pub time_zone_offset: Option<i32>,
    pub clock_format: String,
    pub uptime: Option<u64>,
    pub power_mode: String,
    pub supports_find_remote: Option<bool>,
    pub developer_enabled: Option<bool>,
    pub search_enabled: Option<bool>,
    pub voice_search_enabled: Option<bool>,
    pub support_url: String,
}

impl DeviceInfo {
    pub fn uptime(&self) -> Option<Duration> {
        self.uptime.map(Duration::from_secs)
    }

    /// Name the user gave the device, falling back to the factory name.
    pub fn display_name(&self) -> &str {
        [
            self.user_device_name.as_str(),
            self.friendly_device_name.as_str(),
            self.default_device_name.as_str(),
            self.model_name.as_str(),
        ]
        .into_iter()
        .find(|name| !name.is_empty())
        .unwrap_or("Roku")
    }

    /// MAC of whichever interface is in use.
    pub fn mac_address(&self) -> &str {
        if self.network_type == "ethernet" && !self.ethernet_mac.is_empty() {
            &self.ethernet_mac
        } else {
            &self.wifi_mac
        }
    }
}

/// Installed channel list served at `/query/apps`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Apps {
    #[serde(rename(deserialize = "app"), default)]
    pub apps: Vec<App>,
}

impl Apps {
    /// Find an app by id or name, ignoring ASCII case. Ids take precedence.
    pub fn find(&self, query: &str) -> Option<&App> {
        let query = query.trim();
        self.apps
            .iter()
            .find(|app| app.id.eq_ignore_ascii_case(query))
            .or_else(|| {
                self.apps
                    .iter()
                    .find(|app| app.name.eq_ignore_ascii_case(query))
            })
    }

    /// Apps ordered by name.
    pub fn sorted_by_name(&self) -> Vec<&App> {
        let mut apps: Vec<&App> = self.apps.iter().collect();
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        apps
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// A single channel entry, e.g. `<app id="12" type="appl" version="4.1.218">Netflix</app>`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct App {
    #[serde(rename(deserialize = "$text"), default)]
    pub name: String,
    #[serde(rename(deserialize = "@id"), default)]
    pub id: String,
    #[serde(rename(deserialize = "@type"), default)]
    pub kind: String,
    #[serde(rename(deserialize = "@subtype"), default)]
    pub sub_type: String,
    #[serde(rename(deserialize = "@version"), default)]
    pub version: String,
}

/// Foreground application served at `/query/active-app`.
///
/// On the home screen the device reports `<app>Roku</app>` with no id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ActiveApp {
    #[serde(default)]
    pub app: App,
}

impl ActiveApp {
    pub fn is_home_screen(&self) -> bool {
        self.app.id.is_empty()
    }
}

/// Media player state served at `/query/media-player`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Player {
    #[serde(rename(deserialize = "@error"), default)]
    pub error: String,
    #[serde(rename(deserialize = "@state"), default)]
    pub state: String,
    #[serde(default)]
    pub plugin: Option<Plugin>,
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(rename(deserialize = "is_live"), default)]
    pub live: Option<bool>,
}

impl Player {
    /// Playback position, parsed from values such as `"12345 ms"`.
    pub fn position(&self) -> Option<Duration> {
        self.position.as_deref().and_then(parse_millis)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration.as_deref().and_then(parse_millis)
    }

    /// Whether the device flagged a player error.
    pub fn has_error(&self) -> bool {
        !self.error.is_empty() && self.error != "false"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Plugin {
    #[serde(rename(deserialize = "@id"), default)]
    pub id: String,
    #[serde(rename(deserialize = "@bandwidth"), default)]
    pub bandwidth: String,
    #[serde(rename(deserialize = "@name"), default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Format {
    #[serde(rename(deserialize = "@audio"), default)]
    pub audio: String,
    #[serde(rename(deserialize = "@video"), default)]
    pub video: String,
    #[serde(rename(deserialize = "@captions"), default)]
    pub captions: String,
    #[serde(rename(deserialize = "@drm"), default)]
    pub drm: String,
}

fn parse_millis(value: &str) -> Option<Duration> {
    let digits = value.trim().trim_end_matches("ms").trim();
    digits.parse::<u64>().ok().map(Duration::from_millis)
}
