//! Commands run end to end against a mock device

use std::net::SocketAddr;
use std::time::Duration;

use mockito::{Matcher, Server, ServerGuard};
use roku_ecp::{EcpError, RetryPolicy};
use roku_remote::cli::{AppsCommand, Command, DeviceCommand};
use roku_remote::commands::{self, device, CliError};
use roku_remote::config::CONFIG_FILE_NAME;
use roku_remote::{ConfigStore, Context};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const APPS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<apps>
	<app id="tvinput.hdmi1" type="tvin" version="1.0.0">HDMI 1</app>
	<app id="837" type="appl" version="2.21.91005013">YouTube</app>
	<app id="12" type="appl" version="5.1.0">Netflix</app>
</apps>"#;

const ACTIVE_XML: &str = r#"<active-app><app id="837" type="appl" version="2.21">YouTube</app></active-app>"#;

const DEVICE_INFO_XML: &str = r#"<device-info>
	<vendor-name>Roku</vendor-name>
	<model-name>Roku Ultra</model-name>
	<network-type>wifi</network-type>
	<network-name>HomeNet</network-name>
	<wifi-mac>d8:31:34:33:2d:8e</wifi-mac>
	<software-version>11.5.0</software-version>
	<uptime>93784</uptime>
</device-info>"#;

const LIMITED_MODE_BODY: &str = "ECP command not allowed in Limited mode.";

fn server_addr(server: &ServerGuard) -> SocketAddr {
    server.host_with_port().parse().unwrap()
}

/// Context pointed at `addr`, with config stored in `dir`.
fn context_for(dir: &TempDir, addr: SocketAddr) -> Context {
    let mut config = ConfigStore::load(Some(dir.path().join(CONFIG_FILE_NAME))).unwrap();
    config.set_host(&addr.ip().to_string()).unwrap();
    Context::new(config, CancellationToken::new())
        .with_port(addr.port())
        .with_probe_timeout(Duration::from_secs(1))
        .with_retry(RetryPolicy::transport().with_max_attempts(1))
}

async fn run(ctx: &mut Context, command: Command) -> (Result<(), CliError>, String) {
    let mut out = Vec::new();
    let result = commands::run(command, ctx, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

async fn serve_apps(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/query/apps")
        .with_status(200)
        .with_body(APPS_XML)
        .create_async()
        .await
}

#[tokio::test]
async fn test_apps_list_sorted_by_name() {
    let mut server = Server::new_async().await;
    serve_apps(&mut server).await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server));

    let (result, out) = run(&mut ctx, Command::Apps(AppsCommand::List)).await;

    result.unwrap();
    assert_eq!(
        out,
        "HDMI 1 (ID: tvinput.hdmi1)\nNetflix (ID: 12)\nYouTube (ID: 837)\n"
    );
}

#[tokio::test]
async fn test_apps_list_json() {
    let mut server = Server::new_async().await;
    serve_apps(&mut server).await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server)).with_json(true);

    let (result, out) = run(&mut ctx, Command::Apps(AppsCommand::List)).await;

    result.unwrap();
    let apps: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(apps[1]["name"], "Netflix");
    assert_eq!(apps[1]["id"], "12");
}

#[tokio::test]
async fn test_apps_active() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/query/active-app")
        .with_status(200)
        .with_body(ACTIVE_XML)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server));

    let (result, out) = run(&mut ctx, Command::Apps(AppsCommand::Active)).await;

    result.unwrap();
    assert_eq!(out, "Active App: YouTube (ID: 837, Type: appl)\n");
}

#[tokio::test]
async fn test_apps_launch_by_name_ignoring_case() {
    let mut server = Server::new_async().await;
    serve_apps(&mut server).await;
    let launch = server
        .mock("POST", "/launch")
        .match_body(Matcher::UrlEncoded("id".into(), "12".into()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server));

    let command = Command::Apps(AppsCommand::Launch {
        app: " netflix ".to_string(),
    });
    let (result, out) = run(&mut ctx, command).await;

    result.unwrap();
    launch.assert_async().await;
    assert_eq!(out, "App 'Netflix' launched successfully.\n");
}

#[tokio::test]
async fn test_apps_launch_unknown_app() {
    let mut server = Server::new_async().await;
    serve_apps(&mut server).await;
    let launch = server
        .mock("POST", "/launch")
        .expect(0)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server));

    let command = Command::Apps(AppsCommand::Launch {
        app: "Hulu".to_string(),
    });
    let (result, _) = run(&mut ctx, command).await;

    assert!(matches!(result, Err(CliError::AppNotFound(ref name)) if name == "Hulu"));
    launch.assert_async().await;
}

#[tokio::test]
async fn test_apps_add_already_installed() {
    let mut server = Server::new_async().await;
    serve_apps(&mut server).await;
    let install = server
        .mock("POST", "/install")
        .expect(0)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server));

    let command = Command::Apps(AppsCommand::Add {
        app: "837".to_string(),
    });
    let (result, _) = run(&mut ctx, command).await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "app '837' is already installed");
    install.assert_async().await;
}

#[tokio::test]
async fn test_apps_add_installs_by_id() {
    let mut server = Server::new_async().await;
    serve_apps(&mut server).await;
    let install = server
        .mock("POST", "/install")
        .match_body(Matcher::UrlEncoded("id".into(), "2285".into()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server));

    let command = Command::Apps(AppsCommand::Add {
        app: "2285".to_string(),
    });
    let (result, out) = run(&mut ctx, command).await;

    result.unwrap();
    install.assert_async().await;
    assert_eq!(out, "App '2285' installed successfully.\n");
}

#[tokio::test]
async fn test_apps_add_blank_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = ConfigStore::load(Some(dir.path().join(CONFIG_FILE_NAME))).unwrap();
    let mut ctx = Context::new(config, CancellationToken::new());

    let command = Command::Apps(AppsCommand::Add {
        app: "   ".to_string(),
    });
    let (result, _) = run(&mut ctx, command).await;

    assert!(matches!(result, Err(CliError::EmptyApp)));
}

#[tokio::test]
async fn test_device_describe() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/query/device-info")
        .with_status(200)
        .with_body(DEVICE_INFO_XML)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server));

    let (result, out) = run(&mut ctx, Command::Device(DeviceCommand::Describe)).await;

    result.unwrap();
    assert_eq!(
        out,
        "Vendor: Roku\nModel: Roku Ultra\nNetwork: HomeNet\nMAC: d8:31:34:33:2d:8e\n\
         Uptime: 1d 2h 3m 4s\nVersion: 11.5.0\n"
    );
}

#[tokio::test]
async fn test_device_send_action() {
    let mut server = Server::new_async().await;
    let home = server
        .mock("POST", "/keypress/Home")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let addr = server_addr(&server);
    let mut ctx = context_for(&dir, addr);

    let command = Command::Device(DeviceCommand::Send {
        action: Some("home".to_string()),
    });
    let (result, out) = run(&mut ctx, command).await;

    result.unwrap();
    home.assert_async().await;
    assert_eq!(out, format!("Action 'home' sent to {}\n", addr.ip()));
}

#[tokio::test]
async fn test_device_send_unknown_action_checked_first() {
    // No host configured: the action name is rejected before host checks.
    let dir = TempDir::new().unwrap();
    let config = ConfigStore::load(Some(dir.path().join(CONFIG_FILE_NAME))).unwrap();
    let mut ctx = Context::new(config, CancellationToken::new());

    let command = Command::Device(DeviceCommand::Send {
        action: Some("teleport".to_string()),
    });
    let (result, _) = run(&mut ctx, command).await;

    assert!(matches!(
        result,
        Err(CliError::Ecp(EcpError::UnrecognizedAction(ref name))) if name == "teleport"
    ));
}

#[tokio::test]
async fn test_device_send_in_limited_mode() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/keypress/Home")
        .with_status(403)
        .with_body(LIMITED_MODE_BODY)
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server)).with_retry(RetryPolicy::transport());

    let command = Command::Device(DeviceCommand::Send {
        action: Some("home".to_string()),
    });
    let (result, _) = run(&mut ctx, command).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("Home button 5 times"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_device_type_text() {
    let mut server = Server::new_async().await;
    let input = server
        .mock("POST", "/input")
        .match_body(Matcher::UrlEncoded("text".into(), "hello world".into()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, server_addr(&server));

    let command = Command::Device(DeviceCommand::Type {
        text: "hello world".to_string(),
    });
    let (result, _) = run(&mut ctx, command).await;

    result.unwrap();
    input.assert_async().await;
}

#[tokio::test]
async fn test_missing_host_has_hint() {
    let dir = TempDir::new().unwrap();
    let config = ConfigStore::load(Some(dir.path().join(CONFIG_FILE_NAME))).unwrap();
    let mut ctx = Context::new(config, CancellationToken::new());

    let (result, _) = run(&mut ctx, Command::Apps(AppsCommand::List)).await;

    let err = result.unwrap_err();
    assert!(matches!(err, CliError::NoDeviceConfigured));
    assert!(err.hint().unwrap().contains("roku device find"));
}

#[tokio::test]
async fn test_unreachable_device() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let dir = TempDir::new().unwrap();
    let mut ctx = context_for(&dir, addr);

    let (result, _) = run(&mut ctx, Command::Device(DeviceCommand::Live)).await;

    assert!(matches!(result, Err(CliError::Unreachable { .. })));
}

#[tokio::test]
async fn test_switch_without_stored_devices() {
    let dir = TempDir::new().unwrap();
    let config = ConfigStore::load(Some(dir.path().join(CONFIG_FILE_NAME))).unwrap();
    let mut ctx = Context::new(config, CancellationToken::new());

    let (result, out) = run(&mut ctx, Command::Device(DeviceCommand::Switch)).await;

    result.unwrap();
    assert!(out.starts_with("No devices stored."));
}

#[test]
fn test_found_devices_and_selection_persist() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let config = ConfigStore::load(Some(path.clone())).unwrap();
    let mut ctx = Context::new(config, CancellationToken::new());
    let mut out = Vec::new();

    let found = vec!["192.168.1.20".to_string(), "192.168.1.21".to_string()];
    device::remember_devices(&mut ctx, &found).unwrap();
    device::save_host(&mut ctx, "192.168.1.21", &mut out).unwrap();

    let reloaded = ConfigStore::load(Some(path)).unwrap();
    assert_eq!(reloaded.devices(), found);
    assert_eq!(reloaded.host().as_deref(), Some("192.168.1.21"));
    let out = String::from_utf8(out).unwrap();
    assert!(out.ends_with("Default Roku device set to: 192.168.1.21\n"));
}
