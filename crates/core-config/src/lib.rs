//! Editing settings consumed by the command core.
//!
//! Parses `modal.toml` (or an override path provided by the host) and extracts
//! the `[editing]` table. Missing fields take Vim's defaults. A file that fails
//! to parse falls back to defaults with a warning rather than failing startup.
//! Unknown fields are ignored so hosts may keep their own tables in the file.
//!
//! Values that would make indentation arithmetic degenerate (`shift_width = 0`,
//! `tab_stop = 0`) are clamped by `Config::normalize` and logged under the
//! `config` target.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "modal.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Copy the indent of the current line when opening a new one.
    #[serde(default = "Settings::default_auto_indent")]
    pub auto_indent: bool,
    /// Allow the caret past the last character in Normal mode.
    #[serde(default)]
    pub virtual_edit: bool,
    #[serde(default = "Settings::default_shift_width")]
    pub shift_width: usize,
    #[serde(default = "Settings::default_tab_stop")]
    pub tab_stop: usize,
    /// Shift with spaces instead of tabs.
    #[serde(default)]
    pub expand_tab: bool,
    /// Prefer the host's smart indenter over copying the previous indent.
    #[serde(default)]
    pub use_engine_indent: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_indent: Self::default_auto_indent(),
            virtual_edit: false,
            shift_width: Self::default_shift_width(),
            tab_stop: Self::default_tab_stop(),
            expand_tab: false,
            use_engine_indent: false,
        }
    }
}

impl Settings {
    const fn default_auto_indent() -> bool {
        true
    }
    const fn default_shift_width() -> usize {
        8
    }
    const fn default_tab_stop() -> usize {
        8
    }

    /// Whitespace for an indent of `width` display columns honouring
    /// `expand_tab` / `tab_stop`.
    pub fn indent_text(&self, width: usize) -> String {
        if self.expand_tab {
            return " ".repeat(width);
        }
        let tab_stop = self.tab_stop.max(1);
        let tabs = width / tab_stop;
        let spaces = width % tab_stop;
        let mut out = "\t".repeat(tabs);
        out.push_str(&" ".repeat(spaces));
        out
    }

    /// Display width of leading whitespace, expanding tabs to `tab_stop`.
    /// A zero `tab_stop` counts as one column.
    pub fn indent_width(&self, blank: &str) -> usize {
        let tab_stop = self.tab_stop.max(1);
        blank.chars().fold(0, |col, c| match c {
            '\t' => col + tab_stop - col % tab_stop,
            _ => col + 1,
        })
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub editing: Settings,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Working directory `modal.toml` first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("modal").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                raw: Some(content),
                file,
            };
            cfg.normalize();
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn settings(&self) -> &Settings {
        &self.file.editing
    }

    /// Clamp zero widths up to one. Returns true when anything changed.
    pub fn normalize(&mut self) -> bool {
        let s = &mut self.file.editing;
        let mut changed = false;
        if s.shift_width == 0 {
            info!(target: "config", field = "shift_width", raw = 0, clamped = 1, "setting_clamped");
            s.shift_width = 1;
            changed = true;
        }
        if s.tab_stop == 0 {
            info!(target: "config", field = "tab_stop", raw = 0, clamped = 1, "setting_clamped");
            s.tab_stop = 1;
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl Write for LockedWriter<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture<F: FnOnce()>(level: Level, f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        let out = buffer.lock().unwrap().clone();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn default_settings_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.settings(), &Settings::default());
        assert!(cfg.settings().auto_indent);
        assert_eq!(cfg.settings().shift_width, 8);
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_editing_table() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[editing]\nshift_width = 4\nexpand_tab = true\nvirtual_edit = true\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let s = cfg.settings();
        assert_eq!(s.shift_width, 4);
        assert!(s.expand_tab);
        assert!(s.virtual_edit);
        assert_eq!(s.tab_stop, 8);
        assert!(s.auto_indent);
    }

    #[test]
    fn unknown_tables_are_ignored() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[scroll]\nmargin = 3\n[editing]\ntab_stop = 4\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.settings().tab_stop, 4);
    }

    #[test]
    fn parse_error_falls_back_to_defaults_with_warning() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[editing\nshift_width = ").unwrap();
        let path = tmp.path().to_path_buf();
        let mut cfg = None;
        let log = capture(Level::WARN, || {
            cfg = Some(load_from(Some(path)).unwrap());
        });
        assert_eq!(cfg.unwrap().settings(), &Settings::default());
        assert!(log.contains("WARN config:"));
        assert!(log.contains("config_parse_failed"));
    }

    #[test]
    fn zero_widths_are_clamped_and_logged() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[editing]\nshift_width = 0\ntab_stop = 0\n").unwrap();
        let path = tmp.path().to_path_buf();
        let mut cfg = None;
        let log = capture(Level::INFO, || {
            cfg = Some(load_from(Some(path)).unwrap());
        });
        let cfg = cfg.unwrap();
        assert_eq!(cfg.settings().shift_width, 1);
        assert_eq!(cfg.settings().tab_stop, 1);
        assert!(log.contains("INFO config:"));
        assert!(log.contains("setting_clamped"));
    }

    #[test]
    fn indent_text_honours_expand_tab() {
        let mut s = Settings {
            tab_stop: 4,
            ..Settings::default()
        };
        assert_eq!(s.indent_text(6), "\t  ");
        s.expand_tab = true;
        assert_eq!(s.indent_text(6), "      ");
        assert_eq!(s.indent_width("\t  "), 6);
        assert_eq!(s.indent_width(" \t"), 4);
    }

    #[test]
    fn zero_tab_stop_in_code_built_settings() {
        let s = Settings {
            tab_stop: 0,
            ..Settings::default()
        };
        assert_eq!(s.indent_text(3), "\t\t\t");
        assert_eq!(s.indent_width(" \t"), 2);
        assert_eq!(s.indent_width("\t\t"), 2);
    }
}
