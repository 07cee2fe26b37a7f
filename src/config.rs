//! User settings: `maxbf.toml` in the XDG config home, then environment.
//!
//! ```toml
//! [interpreter]
//! debug = true        # honour '#' tape dumps
//! dump_cells = 32
//! trace = false
//!
//! [colors]
//! error = "red"
//! location = "#5f87ff"
//! caret = "yellow"
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;
use nu_ansi_term::Color;

pub const DEFAULT_DUMP_CELLS: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub error: Color,
    pub location: Color,
    pub caret: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            error: Color::Red,
            location: Color::Blue,
            caret: Color::Yellow,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub debug: bool,
    pub trace: bool,
    pub dump_cells: usize,
    pub colors: Colors,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            trace: false,
            dump_cells: DEFAULT_DUMP_CELLS,
            colors: Colors::default(),
        }
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Settings from the config file with environment overrides, loaded once.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| {
        let mut settings = load_from_toml().unwrap_or_default();
        apply_env(&mut settings, |key| env::var(key).ok());
        settings
    })
}

fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("MAXBF_CONFIG") {
        return Some(PathBuf::from(path));
    }
    // On Linux: /home/<user>/.config, on Windows: C:\Users\<user>\.config
    let base_dirs = BaseDirs::new().ok()?;
    Some(base_dirs.config_home().join("maxbf.toml"))
}

fn load_from_toml() -> Option<Settings> {
    let content = fs::read_to_string(config_path()?).ok()?;
    Some(parse(&content))
}

/// Parse the small TOML subset the config file uses: `[section]` headers
/// and `key = value` lines. Unknown keys and bad values are ignored.
pub fn parse(content: &str) -> Settings {
    let mut section = String::new();
    let mut map: HashMap<(String, String), String> = HashMap::new();

    for line in content.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].trim().to_string();
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            map.insert((section.clone(), key.trim().to_string()), value.to_string());
        }
    }

    let get = |section: &str, key: &str| map.get(&(section.to_string(), key.to_string()));
    let mut cfg = Settings::default();

    if let Some(v) = get("interpreter", "debug").and_then(|v| parse_bool(v)) {
        cfg.debug = v;
    }
    if let Some(v) = get("interpreter", "trace").and_then(|v| parse_bool(v)) {
        cfg.trace = v;
    }
    if let Some(v) = get("interpreter", "dump_cells").and_then(|v| parse_cells(v)) {
        cfg.dump_cells = v;
    }

    macro_rules! set_color {
        ($field:ident) => {
            if let Some(c) = get("colors", stringify!($field)).and_then(|v| parse_color(v)) {
                cfg.colors.$field = c;
            }
        };
    }
    set_color!(error);
    set_color!(location);
    set_color!(caret);

    cfg
}

/// Layer `MAXBF_*` environment variables over file settings.
fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("MAXBF_DEBUG").and_then(|v| parse_bool(&v)) {
        settings.debug = v;
    }
    if let Some(v) = var("MAXBF_TRACE").and_then(|v| parse_bool(&v)) {
        settings.trace = v;
    }
    if let Some(v) = var("MAXBF_DUMP_CELLS").and_then(|v| parse_cells(&v)) {
        settings.dump_cells = v;
    }
}

/// A `#` starts a comment unless it sits inside a quoted value (`"#ff0000"`).
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_cells(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|&n| n > 0)
}

fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        return None;
    }

    Some(match s.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "purple" | "magenta" => Color::Purple,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "darkgray" | "dark_gray" | "darkgrey" | "dark_grey" => Color::DarkGray,
        "lightred" | "light_red" => Color::LightRed,
        "lightgreen" | "light_green" => Color::LightGreen,
        "lightyellow" | "light_yellow" => Color::LightYellow,
        "lightblue" | "light_blue" => Color::LightBlue,
        "lightcyan" | "light_cyan" => Color::LightCyan,
        "lightgray" | "light_gray" | "gray" | "grey" => Color::LightGray,
        _ => return None,
    })
}
