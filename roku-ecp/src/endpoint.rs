/// The fixed set of ECP endpoints this client talks to
///
/// Queries are plain GETs that return an XML document; commands are POSTs
/// whose response body is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// UPnP root device description
    Root,
    /// Installed channel list
    Apps,
    /// Detailed device descriptor
    DeviceInfo,
    /// Foreground application
    ActiveApp,
    /// Media player state
    MediaPlayer,
    /// Text entry into the focused field
    Input,
    /// Global search
    Search,
    /// Press and release a key
    Keypress,
    /// Press and hold a key
    Keydown,
    /// Release a held key
    Keyup,
    /// Start an installed application
    Launch,
    /// Install an application from the channel store
    Install,
}

/// HTTP method used for an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Endpoint {
    /// Path relative to `http://<address>:8060`
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Root => "/",
            Endpoint::Apps => "/query/apps",
            Endpoint::DeviceInfo => "/query/device-info",
            Endpoint::ActiveApp => "/query/active-app",
            Endpoint::MediaPlayer => "/query/media-player",
            Endpoint::Input => "/input",
            Endpoint::Search => "/search",
            Endpoint::Keypress => "/keypress",
            Endpoint::Keydown => "/keydown",
            Endpoint::Keyup => "/keyup",
            Endpoint::Launch => "/launch",
            Endpoint::Install => "/install",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Root
            | Endpoint::Apps
            | Endpoint::DeviceInfo
            | Endpoint::ActiveApp
            | Endpoint::MediaPlayer => Method::Get,
            _ => Method::Post,
        }
    }

    /// Full path with a key fragment appended, e.g. `/keypress/Home`
    pub fn with_fragment(&self, fragment: &str) -> String {
        format!("{}{}", self.path(), fragment)
    }
}
