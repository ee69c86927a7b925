use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ratatui::style::Color;
use serde::Deserialize;
use tracing::warn;

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Theme {
    pub accent: Color,
    pub fg: Color,
    pub dim: Color,
    pub stale: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            fg: Color::Reset,
            dim: Color::DarkGray,
            stale: Color::Yellow,
        }
    }
}

// ---------------------------------------------------------------------------
// ProcmonConfig — where and how often to poll
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ProcmonConfig {
    /// Base URL of the procmon server; `/procmon` is appended.
    pub url: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ProcmonConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            interval_secs: 2,
            timeout_secs: 2,
        }
    }
}

impl ProcmonConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

// ---------------------------------------------------------------------------
// StatusBarConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct StatusBarConfig {
    pub separator: String,
    /// Draw under the prompt instead of on the alternate screen.
    pub inline: bool,
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self {
            separator: " │ ".to_string(),
            inline: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig — `procbar serve`
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: IpAddr,
    /// Reject clients outside loopback and private ranges.
    pub local_only: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            local_only: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub theme: Theme,
    pub procmon: ProcmonConfig,
    pub status_bar: StatusBarConfig,
    pub server: ServerConfig,
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("procbar").join("config.toml"))
    }

    /// Load the user config, falling back to defaults when it is missing or
    /// invalid.
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };

        let raw: RawConfig = match toml::from_str(&content) {
            Ok(r) => r,
            Err(e) => {
                warn!("invalid config at {}: {}", path.display(), e);
                return Self::default();
            }
        };

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut config = Self::default();

        // Theme
        if let Some(t) = raw.theme {
            for (value, slot) in [
                (t.accent, &mut config.theme.accent),
                (t.fg, &mut config.theme.fg),
                (t.dim, &mut config.theme.dim),
                (t.stale, &mut config.theme.stale),
            ] {
                if let Some(c) = value.as_deref().and_then(parse_color) {
                    *slot = c;
                }
            }
        }

        // Procmon
        if let Some(p) = raw.procmon {
            if let Some(url) = p.url {
                config.procmon.url = url;
            }
            if let Some(v) = p.interval_secs {
                config.procmon.interval_secs = v.max(1);
            }
            if let Some(v) = p.timeout_secs {
                config.procmon.timeout_secs = v.max(1);
            }
        }

        // Status bar
        if let Some(sb) = raw.status_bar {
            if let Some(sep) = sb.separator {
                config.status_bar.separator = sep;
            }
            if let Some(v) = sb.inline {
                config.status_bar.inline = v;
            }
        }

        // Server
        if let Some(s) = raw.server {
            if let Some(port) = s.port {
                config.server.port = port;
            }
            if let Some(bind) = s.bind {
                match bind.parse() {
                    Ok(ip) => config.server.bind = ip,
                    Err(_) => warn!("ignoring invalid server.bind address {:?}", bind),
                }
            }
            if let Some(v) = s.local_only {
                config.server.local_only = v;
            }
        }

        config
    }
}

// ---------------------------------------------------------------------------
// Raw TOML structs (all-optional for merge)
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct RawConfig {
    theme: Option<RawTheme>,
    procmon: Option<RawProcmon>,
    status_bar: Option<RawStatusBar>,
    server: Option<RawServer>,
}

#[derive(Deserialize, Default)]
struct RawTheme {
    accent: Option<String>,
    fg: Option<String>,
    dim: Option<String>,
    stale: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawProcmon {
    url: Option<String>,
    interval_secs: Option<u64>,
    timeout_secs: Option<u64>,
}

#[derive(Deserialize, Default)]
struct RawStatusBar {
    separator: Option<String>,
    inline: Option<bool>,
}

#[derive(Deserialize, Default)]
struct RawServer {
    port: Option<u16>,
    bind: Option<String>,
    local_only: Option<bool>,
}

// ---------------------------------------------------------------------------
// parse_color: "cyan", "dark_gray", "#ff0000", "#f00", "reset"
// ---------------------------------------------------------------------------

pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().to_lowercase();

    if let Some(hex) = s.strip_prefix('#') {
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        return match hex.len() {
            6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            3 => Some(Color::Rgb(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
            )),
            _ => None,
        };
    }

    match s.as_str() {
        "reset" => Some(Color::Reset),
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "white" => Some(Color::White),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "light_red" | "lightred" => Some(Color::LightRed),
        "light_green" | "lightgreen" => Some(Color::LightGreen),
        "light_yellow" | "lightyellow" => Some(Color::LightYellow),
        "light_blue" | "lightblue" => Some(Color::LightBlue),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
