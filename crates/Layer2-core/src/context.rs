//! Hub Context - 세션당 하나의 레지스트리 + 이벤트 버스
//!
//! 애플리케이션 시작 시 한 번 만들어 모든 소비자에게 참조로 전달합니다.
//! 레지스트리와 버스는 서로를 모르며, 둘을 잇는 일(설치 훅 호출, 설치 이벤트 발행)은
//! 여기서 합니다.

use crate::plugin::{
    InstallReport, PluginDescriptor, PluginRegistry, Registration, Theme, ThemedPlugin,
};
use hub_foundation::event::contracts::{
    PluginInstalled, PluginLifecyclePayload, PluginUninstalled,
};
use hub_foundation::{EventBus, HubConfig, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 호스트 셸이 레지스트리/버스 이벤트에 붙이는 출처 ID
pub const HOST_ORIGIN: &str = "hub";

/// 세션 컨텍스트
#[derive(Clone)]
pub struct HubContext {
    config: HubConfig,
    registry: Arc<PluginRegistry>,
    bus: Arc<EventBus>,
}

impl HubContext {
    /// 설정으로 생성
    pub fn new(config: HubConfig) -> Self {
        let bus = Arc::new(EventBus::with_config(config.event_bus.clone()));
        let registry = Arc::new(PluginRegistry::with_theme(Theme::from(&config.theme)));
        Self {
            config,
            registry,
            bus,
        }
    }

    // ========================================================================
    // 접근자
    // ========================================================================

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    // ========================================================================
    // 플러그인 라이프사이클
    // ========================================================================

    /// 플러그인 등록
    ///
    /// 설치된 플러그인을 다시 등록하면 이전 컴포넌트의 `on_uninstall`,
    /// 새 컴포넌트의 `on_install`을 차례로 실행해 구독을 옮깁니다.
    pub fn register(&self, descriptor: PluginDescriptor) -> Result<()> {
        let id = descriptor.id.clone();
        if let Registration::Replaced {
            previous,
            installed: true,
        } = self.registry.register(descriptor)?
        {
            self.reload(&id, &previous);
        }
        Ok(())
    }

    /// 플러그인 설치 후 새로 설치된 플러그인마다 `on_install` 훅 호출 + 이벤트 발행
    pub fn install(&self, id: &str) -> Result<Vec<String>> {
        let newly = self.registry.install(id)?;
        for plugin_id in &newly {
            self.after_install(plugin_id);
        }
        Ok(newly)
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

    /// 설정의 `autoInstall` 목록 설치 (비어 있으면 등록된 전체)
    pub fn install_configured(&self) -> InstallReport {
        if self.config.auto_install.is_empty() {
            let ids: Vec<String> = self
                .registry
                .all_plugins()
                .iter()
                .map(|d| d.id.clone())
                .collect();
            self.install_many(ids)
        } else {
            self.install_many(self.config.auto_install.clone())
        }
    }

    /// 플러그인 제거
    pub fn uninstall(&self, id: &str) -> Result<bool> {
        let removed = self.registry.uninstall(id)?;
        if removed {
            if let Some(component) = self.registry.get(id).and_then(|d| d.component().cloned()) {
                if let Err(e) = component.on_uninstall(self) {
                    warn!(plugin_id = %id, error = %e, "Plugin uninstall hook failed");
                }
            }
            self.announce::<PluginUninstalled>(id);
        }
        Ok(removed)
    }

    /// 테마가 적용된 플러그인
    pub fn themed_plugin(&self, id: &str) -> Result<Option<ThemedPlugin>> {
        self.registry.themed_plugin(id)
    }

    fn reload(&self, plugin_id: &str, previous: &PluginDescriptor) {
        if let Some(old) = previous.component() {
            if let Err(e) = old.on_uninstall(self) {
                warn!(plugin_id = %plugin_id, error = %e, "Plugin uninstall hook failed");
            }
        }
        if let Some(component) = self
            .registry
            .get(plugin_id)
            .and_then(|d| d.component().cloned())
        {
            if let Err(e) = component.on_install(self) {
                warn!(plugin_id = %plugin_id, error = %e, "Plugin install hook failed");
            }
        }
        info!(plugin_id = %plugin_id, "Reloaded installed plugin");
    }

    fn after_install(&self, plugin_id: &str) {
        if let Some(component) = self
            .registry
            .get(plugin_id)
            .and_then(|d| d.component().cloned())
        {
            // 훅 실패는 설치를 되돌리지 않음
            if let Err(e) = component.on_install(self) {
                warn!(plugin_id = %plugin_id, error = %e, "Plugin install hook failed");
            }
        }
        self.announce::<PluginInstalled>(plugin_id);
    }

    fn announce<C>(&self, plugin_id: &str)
    where
        C: hub_foundation::EventContract<Payload = PluginLifecyclePayload>,
    {
        let payload = PluginLifecyclePayload {
            plugin_id: plugin_id.to_string(),
        };
        if let Err(e) = self.bus.emit_typed::<C>(&payload, Some(HOST_ORIGIN)) {
            warn!(plugin_id = %plugin_id, error = %e, "Failed to publish lifecycle event");
        } else {
            debug!(plugin_id = %plugin_id, event = C::NAME, "Published lifecycle event");
        }
    }
}

impl Default for HubContext {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}
