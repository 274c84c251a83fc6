//! Plugin Registry - 플러그인 카탈로그와 설치 상태
//!
//! 상태 전이: `Unregistered -> Registered -> Installed` (`uninstall`로 되돌림)

use super::descriptor::PluginDescriptor;
use super::resolver::{install_plan, DependencyGraph};
use super::theme::Theme;
use super::traits::{Props, RenderContext, SharedComponent};
use hub_foundation::{Error, Result};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// PluginState
// ============================================================================

/// 플러그인 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginState {
    /// 등록되지 않음
    Unregistered,

    /// 등록됨 (아직 설치 안됨)
    Registered,

    /// 설치됨
    Installed,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unregistered => write!(f, "unregistered"),
            Self::Registered => write!(f, "registered"),
            Self::Installed => write!(f, "installed"),
        }
    }
}

// ============================================================================
// InstallReport
// ============================================================================

/// `install_many` 결과
///
/// 각 ID를 독립적으로 시도하며, 하나의 실패가 나머지를 막지 않습니다.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// 새로 설치된 플러그인 (설치 순서, 의존성 포함)
    pub installed: Vec<String>,

    /// 실패한 요청 ID와 에러
    pub failed: Vec<(String, Error)>,
}

impl InstallReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// 첫 번째 실패를 에러로 변환
    pub fn into_result(self) -> Result<Vec<String>> {
        match self.failed.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(self.installed),
        }
    }

    pub(crate) fn record(&mut self, id: &str, outcome: Result<Vec<String>>) {
        match outcome {
            Ok(newly) => self.installed.extend(newly),
            Err(e) => {
                warn!(plugin_id = %id, error = %e, "Plugin installation failed");
                self.failed.push((id.to_string(), e));
            }
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

/// `register` 결과
#[derive(Debug)]
pub enum Registration {
    /// 처음 등록된 ID
    New,

    /// 기존 디스크립터를 교체함
    Replaced {
        previous: Arc<PluginDescriptor>,

        /// 교체 시점에 설치 상태였는지 (컴포넌트 훅을 다시 실행해야 함)
        installed: bool,
    },
}

// ============================================================================
// ThemedPlugin
// ============================================================================

/// 테마가 적용된 설치된 플러그인
#[derive(Clone)]
pub struct ThemedPlugin {
    descriptor: Arc<PluginDescriptor>,
    component: SharedComponent,
    theme: Theme,
}

impl ThemedPlugin {
    pub fn descriptor(&self) -> &Arc<PluginDescriptor> {
        &self.descriptor
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// 컴포넌트 참조 (같은 ID에 대해 항상 같은 인스턴스)
    pub fn component(&self) -> &SharedComponent {
        &self.component
    }

    /// 병합된 테마
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// 속성 묶음으로 렌더링
    pub fn render(&self, props: &Props) -> Result<String> {
        let ctx = RenderContext {
            plugin_id: &self.descriptor.id,
            props,
            theme: &self.theme,
        };
        self.component.render(&ctx)
    }
}

impl std::fmt::Debug for ThemedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemedPlugin")
            .field("id", &self.descriptor.id)
            .field("theme", &self.theme)
            .finish()
    }
}

// ============================================================================
// PluginRegistry
// ============================================================================

/// 등록 정보
struct PluginEntry {
    descriptor: Arc<PluginDescriptor>,

    /// 최초 등록 순서 (정렬 동률 처리용, 재등록 시 유지)
    seq: u64,
}

struct RegistryState {
    registered: HashMap<String, PluginEntry>,
    installed: HashSet<String>,
    /// 설치 완료 순서
    install_order: Vec<String>,
    next_seq: u64,
    /// 전역 테마
    theme: Theme,
}

impl RegistryState {
    fn sorted<'a>(&'a self, filter: impl Fn(&str) -> bool) -> Vec<Arc<PluginDescriptor>> {
        let mut entries: Vec<&'a PluginEntry> = self
            .registered
            .values()
            .filter(|e| filter(&e.descriptor.id))
            .collect();
        entries.sort_by_key(|e| (e.descriptor.order, e.seq));
        entries.iter().map(|e| Arc::clone(&e.descriptor)).collect()
    }

    /// `id`에 의존하는 설치된 플러그인 목록
    fn installed_dependents(&self, id: &str) -> Vec<String> {
        self.install_order
            .iter()
            .filter(|other| {
                self.registered
                    .get(other.as_str())
                    .is_some_and(|e| e.descriptor.dependencies.iter().any(|d| d == id))
            })
            .cloned()
            .collect()
    }
}

impl DependencyGraph for RegistryState {
    fn dependencies(&self, id: &str) -> Option<&[String]> {
        self.registered
            .get(id)
            .map(|e| e.descriptor.dependencies.as_slice())
    }

    fn is_installed(&self, id: &str) -> bool {
        self.installed.contains(id)
    }
}

/// 플러그인 레지스트리 - 등록/설치/조회
///
/// 모든 공개 연산은 하나의 락 안에서 끝까지 실행됩니다.
pub struct PluginRegistry {
    state: RwLock<RegistryState>,
}

impl PluginRegistry {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self::with_theme(Theme::new("default"))
    }

    /// 전역 테마와 함께 생성
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                registered: HashMap::new(),
                installed: HashSet::new(),
                install_order: Vec::new(),
                next_seq: 0,
                theme,
            }),
        }
    }

    // ========================================================================
    // 등록
    // ========================================================================

    /// 플러그인 등록
    ///
    /// 같은 ID가 이미 있으면 디스크립터를 교체합니다 (정렬 순서와 설치 상태는 유지).
    /// 설치된 플러그인을 교체했다면 호출자가 이전/새 컴포넌트의 훅을 처리해야 합니다.
    pub fn register(&self, descriptor: PluginDescriptor) -> Result<Registration> {
        descriptor.validate()?;

        let id = descriptor.id.clone();
        let descriptor = Arc::new(descriptor);
        let mut state = self.state.write();

        let installed = state.installed.contains(&id);
        if let Some(entry) = state.registered.get_mut(&id) {
            let previous = std::mem::replace(&mut entry.descriptor, descriptor);
            warn!(plugin_id = %id, installed, "Plugin re-registered; descriptor replaced");
            return Ok(Registration::Replaced {
                previous,
                installed,
            });
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state
            .registered
            .insert(id.clone(), PluginEntry { descriptor, seq });

        debug!(plugin_id = %id, "Registered plugin");
        Ok(Registration::New)
    }

    // ========================================================================
    // 설치
    // ========================================================================

    /// 플러그인 설치 (의존성 먼저)
    ///
    /// 새로 설치된 ID를 설치 순서대로 반환합니다. 이미 설치되어 있으면 빈 목록.
    /// 계획 단계에서 실패하면 아무것도 설치되지 않습니다.
    pub fn install(&self, id: &str) -> Result<Vec<String>> {
        let mut state = self.state.write();

        if !state.registered.contains_key(id) {
            return Err(Error::UnknownPlugin(id.to_string()));
        }
        if state.installed.contains(id) {
            return Ok(Vec::new());
        }

        let plan = install_plan(&*state, id)?;

        for plugin_id in &plan {
            state.installed.insert(plugin_id.clone());
            state.install_order.push(plugin_id.clone());
            if plugin_id == id {
                info!(plugin_id = %plugin_id, "Installed plugin");
            } else {
                info!(plugin_id = %plugin_id, required_by = %id, "Installed dependency");
            }
        }

        Ok(plan)
    }

    /// 여러 플러그인 설치 (best-effort)
    pub fn install_many<I, S>(&self, ids: I) -> InstallReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = InstallReport::default();
        for id in ids {
            let id = id.as_ref();
            report.record(id, self.install(id));
        }
        report
    }

    /// 플러그인 제거 (Installed -> Registered)
    ///
    /// 설치되어 있지 않으면 `Ok(false)`. 설치된 다른 플러그인이 의존하면 거부합니다.
    pub fn uninstall(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write();

        if !state.registered.contains_key(id) {
            return Err(Error::UnknownPlugin(id.to_string()));
        }
        if !state.installed.contains(id) {
            return Ok(false);
        }

        let dependents = state.installed_dependents(id);
        if !dependents.is_empty() {
            return Err(Error::PluginInUse {
                plugin: id.to_string(),
                dependents,
            });
        }

        state.installed.remove(id);
        state.install_order.retain(|p| p != id);
        info!(plugin_id = %id, "Uninstalled plugin");
        Ok(true)
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 등록된 모든 플러그인 (order 오름차순, 동률은 등록 순)
    pub fn all_plugins(&self) -> Vec<Arc<PluginDescriptor>> {
        self.state.read().sorted(|_| true)
    }

    /// 설치된 플러그인 (같은 정렬 규칙)
    pub fn installed_plugins(&self) -> Vec<Arc<PluginDescriptor>> {
        let state = self.state.read();
        state.sorted(|id| state.installed.contains(id))
    }

    /// 플러그인 조회 (설치 여부 무관)
    pub fn get(&self, id: &str) -> Option<Arc<PluginDescriptor>> {
        self.state
            .read()
            .registered
            .get(id)
            .map(|e| Arc::clone(&e.descriptor))
    }

    pub fn is_installed(&self, id: &str) -> bool {
        self.state.read().installed.contains(id)
    }

    /// 플러그인 상태
    pub fn state(&self, id: &str) -> PluginState {
        let state = self.state.read();
        if state.installed.contains(id) {
            PluginState::Installed
        } else if state.registered.contains_key(id) {
            PluginState::Registered
        } else {
            PluginState::Unregistered
        }
    }

    /// 설치 완료 순서
    pub fn installation_order(&self) -> Vec<String> {
        self.state.read().install_order.clone()
    }

    /// 테마가 적용된 플러그인
    ///
    /// 미등록 ID는 `UnknownPlugin`, 등록만 되고 설치되지 않았으면 `None`.
    pub fn themed_plugin(&self, id: &str) -> Result<Option<ThemedPlugin>> {
        let state = self.state.read();
        let entry = state
            .registered
            .get(id)
            .ok_or_else(|| Error::UnknownPlugin(id.to_string()))?;
        if !state.installed.contains(id) {
            return Ok(None);
        }

        let descriptor = Arc::clone(&entry.descriptor);
        let component = descriptor
            .component()
            .cloned()
            .ok_or_else(|| Error::Internal(format!("plugin '{}' has no component", id)))?;
        let theme = state.theme.merged(&descriptor.theme);

        Ok(Some(ThemedPlugin {
            descriptor,
            component,
            theme,
        }))
    }

    // ========================================================================
    // 테마
    // ========================================================================

    /// 전역 테마
    pub fn theme(&self) -> Theme {
        self.state.read().theme.clone()
    }

    /// 전역 테마 교체
    pub fn set_theme(&self, theme: Theme) {
        debug!(theme = %theme.name, "Global theme changed");
        self.state.write().theme = theme;
    }

    // ========================================================================
    // 유틸리티
    // ========================================================================

    /// 등록된 플러그인 수
    pub fn len(&self) -> usize {
        self.state.read().registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().registered.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
