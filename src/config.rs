// Copyright 2026 Shoplens Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::scroll::ScrollConfig;
use crate::search::SortKey;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchSettings,
    pub scroll: ScrollSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_sort: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_sort: "relevance".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScrollSettingsFile")]
pub struct ScrollSettings {
    pub noise_threshold: f64,
    pub top_threshold: f64,
    pub bottom_bar: BarTiming,
    pub tab_bar: BarTiming,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        let bottom = ScrollConfig::bottom_bar();
        let tab = ScrollConfig::tab_bar();
        Self {
            noise_threshold: bottom.noise_threshold,
            top_threshold: bottom.top_threshold,
            bottom_bar: BarTiming::from_config(&bottom),
            tab_bar: BarTiming::from_config(&tab),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarTiming {
    pub idle_timeout_ms: u64,
    pub animation_ms: u64,
}

impl BarTiming {
    fn from_config(config: &ScrollConfig) -> Self {
        Self {
            idle_timeout_ms: config.idle_timeout.as_millis() as u64,
            animation_ms: config.animation.as_millis() as u64,
        }
    }
}

/// `[scroll]` as written on disk. Each bar table may be partial; missing
/// fields come from that bar's preset.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScrollSettingsFile {
    noise_threshold: Option<f64>,
    top_threshold: Option<f64>,
    bottom_bar: BarTimingFile,
    tab_bar: BarTimingFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BarTimingFile {
    idle_timeout_ms: Option<u64>,
    animation_ms: Option<u64>,
}

impl BarTimingFile {
    fn over(self, preset: BarTiming) -> BarTiming {
        BarTiming {
            idle_timeout_ms: self.idle_timeout_ms.unwrap_or(preset.idle_timeout_ms),
            animation_ms: self.animation_ms.unwrap_or(preset.animation_ms),
        }
    }
}

impl From<ScrollSettingsFile> for ScrollSettings {
    fn from(file: ScrollSettingsFile) -> Self {
        let preset = ScrollSettings::default();
        Self {
            noise_threshold: file.noise_threshold.unwrap_or(preset.noise_threshold),
            top_threshold: file.top_threshold.unwrap_or(preset.top_threshold),
            bottom_bar: file.bottom_bar.over(preset.bottom_bar),
            tab_bar: file.tab_bar.over(preset.tab_bar),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Bar {
    BottomBar,
    TabBar,
}

impl Config {
    pub fn default_sort(&self) -> SortKey {
        SortKey::parse_lenient(&self.search.default_sort)
    }

    pub fn scroll_config(&self, bar: Bar) -> ScrollConfig {
        let timing = match bar {
            Bar::BottomBar => self.scroll.bottom_bar,
            Bar::TabBar => self.scroll.tab_bar,
        };
        ScrollConfig {
            noise_threshold: self.scroll.noise_threshold,
            top_threshold: self.scroll.top_threshold,
            idle_timeout: Duration::from_millis(timing.idle_timeout_ms),
            animation: Duration::from_millis(timing.animation_ms),
        }
    }

    /// Clamps values the controller cannot honor.
    fn sanitize(&mut self) {
        self.scroll.noise_threshold = self.scroll.noise_threshold.max(0.0);
        self.scroll.top_threshold = self.scroll.top_threshold.max(0.0);
        for timing in [&mut self.scroll.bottom_bar, &mut self.scroll.tab_bar] {
            if timing.animation_ms > timing.idle_timeout_ms {
                timing.animation_ms = timing.idle_timeout_ms;
            }
        }
    }
}

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigCtx {
    pub path: Option<PathBuf>,
    pub config: Config,
}

impl ConfigCtx {
    /// Reads `explicit` if given (it must exist), else the global config file
    /// if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = read_config(path)?;
            return Ok(Self {
                path: Some(path.to_path_buf()),
                config,
            });
        }
        match global_config_path() {
            Some(path) if path.exists() => {
                let config = read_config(&path)?;
                Ok(Self {
                    path: Some(path),
                    config,
                })
            }
            _ => Ok(Self {
                path: None,
                config: Config::default(),
            }),
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return Some(PathBuf::from(appdata));
        }
        if let Ok(profile) = std::env::var("USERPROFILE") {
            return Some(PathBuf::from(profile).join("AppData").join("Roaming"));
        }
        return None;
    }

    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        return Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support"),
        );
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config"))
}

pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("shoplens").join("shoplens.toml"))
}

pub fn read_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut config: Config = toml::from_str(&text)
        .with_context(|| format!("parse {}", path.display()))?;
    config.sanitize();
    Ok(config)
}

pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let text = toml::to_string_pretty(config).context("serialize config")?;
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use tempfile::tempdir;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn config_path(config_root: &Path) -> PathBuf {
        let base = if cfg!(target_os = "macos") {
            config_root.join("Library").join("Application Support")
        } else {
            config_root.to_path_buf()
        };
        base.join("shoplens").join("shoplens.toml")
    }

    fn with_env<T>(config_root: &Path, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let old_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        let old_home = std::env::var("HOME").ok();
        let old_appdata = std::env::var("APPDATA").ok();
        set_env_var("XDG_CONFIG_HOME", config_root);
        set_env_var("HOME", config_root);
        set_env_var("APPDATA", config_root);
        let result = f();
        match old_xdg {
            Some(val) => set_env_var("XDG_CONFIG_HOME", val),
            None => remove_env_var("XDG_CONFIG_HOME"),
        }
        match old_home {
            Some(val) => set_env_var("HOME", val),
            None => remove_env_var("HOME"),
        }
        match old_appdata {
            Some(val) => set_env_var("APPDATA", val),
            None => remove_env_var("APPDATA"),
        }
        result
    }

    fn set_env_var(key: &str, value: impl AsRef<std::ffi::OsStr>) {
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn remove_env_var(key: &str) {
        unsafe {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn defaults_match_bar_presets() {
        let config = Config::default();
        assert_eq!(config.scroll_config(Bar::BottomBar), ScrollConfig::bottom_bar());
        assert_eq!(config.scroll_config(Bar::TabBar), ScrollConfig::tab_bar());
        assert_eq!(config.default_sort(), SortKey::Relevance);
    }

    #[test]
    fn load_without_global_file_uses_defaults() {
        let config_dir = tempdir().expect("config dir");
        with_env(config_dir.path(), || {
            let ctx = ConfigCtx::load(None).expect("load");
            assert!(ctx.path.is_none());
            assert_eq!(ctx.config, Config::default());
        });
    }

    #[test]
    fn load_reads_global_file() {
        let config_dir = tempdir().expect("config dir");
        let path = config_path(config_dir.path());
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(
            &path,
            "[search]\ndefault_sort = \"Price: Low to High\"\n\n[scroll.tab_bar]\nidle_timeout_ms = 2000\nanimation_ms = 300\n",
        )
        .expect("write");
        with_env(config_dir.path(), || {
            let ctx = ConfigCtx::load(None).expect("load");
            assert_eq!(ctx.path.as_deref(), Some(path.as_path()));
            assert_eq!(ctx.config.default_sort(), SortKey::PriceAsc);
            let tab = ctx.config.scroll_config(Bar::TabBar);
            assert_eq!(tab.idle_timeout, Duration::from_millis(2000));
            assert_eq!(tab.noise_threshold, 5.0);
        });
    }

    #[test]
    fn partial_bar_table_keeps_that_bars_preset() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("shoplens.toml");
        std::fs::write(&path, "[scroll.tab_bar]\nidle_timeout_ms = 2000\n").expect("write");
        let config = read_config(&path).expect("read");
        let tab = config.scroll_config(Bar::TabBar);
        assert_eq!(tab.idle_timeout, Duration::from_millis(2000));
        assert_eq!(tab.animation, ScrollConfig::tab_bar().animation);
        assert_eq!(config.scroll_config(Bar::BottomBar), ScrollConfig::bottom_bar());

        std::fs::write(&path, "[scroll.bottom_bar]\nanimation_ms = 120\n").expect("write");
        let config = read_config(&path).expect("read");
        let bottom = config.scroll_config(Bar::BottomBar);
        assert_eq!(bottom.idle_timeout, ScrollConfig::bottom_bar().idle_timeout);
        assert_eq!(bottom.animation, Duration::from_millis(120));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempdir().expect("tempdir");
        let err = ConfigCtx::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("read"));
    }

    #[test]
    fn read_config_clamps_out_of_range_values() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("shoplens.toml");
        std::fs::write(
            &path,
            "[scroll]\nnoise_threshold = -3.0\n\n[scroll.bottom_bar]\nidle_timeout_ms = 100\nanimation_ms = 400\n",
        )
        .expect("write");
        let config = read_config(&path).expect("read");
        assert_eq!(config.scroll.noise_threshold, 0.0);
        assert_eq!(config.scroll.bottom_bar.animation_ms, 100);
    }

    #[test]
    fn write_then_read_preserves_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("shoplens.toml");
        write_config(&path, &Config::default()).expect("write");
        assert_eq!(read_config(&path).expect("read"), Config::default());
    }
}
