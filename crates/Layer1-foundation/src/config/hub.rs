//! Hub Config - 통합 설정
//!
//! 글로벌(`<config_dir>/community-hub/hub.json`)과
//! 프로젝트(`.community-hub/hub.json`) 설정을 병합합니다.

use crate::event::EventBusConfig;
use crate::storage::{read_file, JsonStore};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 설정 파일명
pub const HUB_CONFIG_FILE: &str = "hub.json";

// ============================================================================
// Hub Config (통합)
// ============================================================================

/// Community Hub 통합 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 이벤트 버스 설정
    #[serde(default)]
    pub event_bus: EventBusConfig,

    /// 전역 테마
    #[serde(default)]
    pub theme: ThemeConfig,

    /// 시작 시 설치할 플러그인 (비어 있으면 등록된 전체)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_install: Vec<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            event_bus: EventBusConfig::default(),
            theme: ThemeConfig::default(),
            auto_install: Vec::new(),
        }
    }
}

impl HubConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut stores = Vec::with_capacity(2);
        if let Ok(global) = JsonStore::global() {
            stores.push(global);
        }
        if let Ok(project) = JsonStore::current_project() {
            stores.push(project);
        }
        Self::load_from(&stores)
    }

    /// 저장소 순서대로 설정 파일을 겹쳐 로드 (뒤가 앞을 덮어씀)
    pub fn load_from(stores: &[JsonStore]) -> Result<Self> {
        let mut config = Self::new();
        for store in stores {
            if let Some(patch) = store.load_optional::<HubConfigPatch>(HUB_CONFIG_FILE)? {
                debug!(path = %store.file_path(HUB_CONFIG_FILE).display(), "Loaded hub config");
                config.merge(patch);
            }
        }
        Ok(config)
    }

    /// 지정한 파일에서 로드 (확장자로 JSON/TOML 선택)
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        read_file(path.as_ref())
    }

    /// 프로젝트 설정 저장
    pub fn save_project(&self) -> Result<PathBuf> {
        JsonStore::current_project()?.save(HUB_CONFIG_FILE, self)
    }

    /// 파일에 적힌 값만 필드 단위로 덮어쓰기
    pub fn merge(&mut self, patch: HubConfigPatch) {
        if let Some(version) = patch.version {
            self.version = version;
        }
        if let Some(bus) = patch.event_bus {
            if let Some(size) = bus.history_size {
                self.event_bus.history_size = size;
            }
            if let Some(trace) = bus.trace_emissions {
                self.event_bus.trace_emissions = trace;
            }
        }
        if let Some(theme) = patch.theme {
            if let Some(name) = theme.name {
                self.theme.name = name;
            }
            self.theme.tokens.extend(theme.tokens);
        }
        if let Some(ids) = patch.auto_install {
            self.auto_install = ids;
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn history_size(mut self, size: usize) -> Self {
        self.event_bus.history_size = size;
        self
    }

    pub fn theme(mut self, theme: ThemeConfig) -> Self {
        self.theme = theme;
        self
    }

    pub fn auto_install(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.auto_install = ids.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// Hub Config Patch
// ============================================================================

/// 설정 파일 한 겹
///
/// 파일에 없는 키는 `None`으로 남아 아래 겹의 값을 유지합니다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubConfigPatch {
    version: Option<u32>,
    event_bus: Option<EventBusPatch>,
    theme: Option<ThemePatch>,
    auto_install: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventBusPatch {
    history_size: Option<usize>,
    trace_emissions: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct ThemePatch {
    name: Option<String>,
    #[serde(default)]
    tokens: BTreeMap<String, String>,
}

// ============================================================================
// Theme Config
// ============================================================================

/// 전역 테마 설정
///
/// 토큰 값의 의미는 뷰 레이어가 정합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    /// 테마 이름
    #[serde(default = "default_theme")]
    pub name: String,

    /// 테마 토큰 (예: "primary" -> "#4f46e5")
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: default_theme(),
            tokens: BTreeMap::new(),
        }
    }
}

impl ThemeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tokens: BTreeMap::new(),
        }
    }

    pub fn with_token(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Defaults
// ============================================================================

fn default_version() -> u32 {
    1
}

fn default_theme() -> String {
    "default".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.event_bus.history_size, 100);
        assert_eq!(config.theme.name, "default");
        assert!(config.auto_install.is_empty());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: HubConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HubConfig::default());
    }

    #[test]
    fn test_merge_overrides_only_set_values() {
        let mut base = HubConfig::new()
            .theme(ThemeConfig::new("midnight").with_token("primary", "#000"))
            .auto_install(["community"]);

        let patch: HubConfigPatch = serde_json::from_str(
            r##"{"eventBus": {"historySize": 10}, "theme": {"tokens": {"accent": "#f0f"}}}"##,
        )
        .unwrap();
        base.merge(patch);

        assert_eq!(base.event_bus.history_size, 10);
        assert_eq!(base.theme.name, "midnight");
        assert_eq!(base.theme.tokens.get("primary").unwrap(), "#000");
        assert_eq!(base.theme.tokens.get("accent").unwrap(), "#f0f");
        assert_eq!(base.auto_install, vec!["community".to_string()]);
    }

    #[test]
    fn test_project_layer_keeps_global_bus_settings() {
        let global_dir = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();
        let global = JsonStore::new(global_dir.path());
        let project = JsonStore::project(project_dir.path());

        std::fs::write(
            global.file_path(HUB_CONFIG_FILE),
            r#"{"version": 2, "eventBus": {"historySize": 10}, "autoInstall": ["community"]}"#,
        )
        .unwrap();
        std::fs::create_dir_all(project.base_dir()).unwrap();
        std::fs::write(
            project.file_path(HUB_CONFIG_FILE),
            r#"{"eventBus": {"traceEmissions": true}, "autoInstall": []}"#,
        )
        .unwrap();

        let config = HubConfig::load_from(&[global, project]).unwrap();
        assert_eq!(config.version, 2);
        assert_eq!(config.event_bus.history_size, 10);
        assert!(config.event_bus.trace_emissions);
        // 명시적인 빈 목록도 덮어씀
        assert!(config.auto_install.is_empty());
    }

    #[test]
    fn test_load_from_without_files_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = HubConfig::load_from(&[JsonStore::new(dir.path())]).unwrap();
        assert_eq!(config, HubConfig::default());
    }

    #[test]
    fn test_saved_config_reloads_as_patch() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::project(dir.path());
        let saved = HubConfig::new()
            .history_size(7)
            .theme(ThemeConfig::new("dark").with_token("primary", "#222"));
        store.save(HUB_CONFIG_FILE, &saved).unwrap();

        assert_eq!(HubConfig::load_from(&[store]).unwrap(), saved);
    }

    #[test]
    fn test_from_path_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"eventBus": {{"historySize": 25}}, "autoInstall": ["classroom"]}}"#
        )
        .unwrap();

        let config = HubConfig::from_path(&path).unwrap();
        assert_eq!(config.event_bus.history_size, 25);
        assert_eq!(config.auto_install, vec!["classroom".to_string()]);
    }

    #[test]
    fn test_from_path_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.toml");
        std::fs::write(
            &path,
            "autoInstall = [\"calendar\"]\n\n[theme]\nname = \"dark\"\n\n[theme.tokens]\nprimary = \"#111\"\n",
        )
        .unwrap();

        let config = HubConfig::from_path(&path).unwrap();
        assert_eq!(config.theme.name, "dark");
        assert_eq!(config.theme.tokens.get("primary").unwrap(), "#111");
        assert_eq!(config.auto_install, vec!["calendar".to_string()]);
    }

    #[test]
    fn test_from_path_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.yaml");
        std::fs::write(&path, "version: 1").unwrap();

        assert!(matches!(HubConfig::from_path(&path), Err(Error::Config(_))));
    }
}
