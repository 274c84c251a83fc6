//! # hub-core
//!
//! Core runtime for Community Hub:
//! - Plugin: 디스크립터, 렌더링 컴포넌트, 의존성 해석, 테마 병합, 레지스트리
//! - Context: 세션당 하나의 레지스트리 + 이벤트 버스 묶음
//!
//! 이벤트 버스 자체는 `hub-foundation`에 있으며 여기서 다시 노출합니다.

pub mod context;
pub mod plugin;

pub use context::{HubContext, HOST_ORIGIN};
pub use plugin::{
    component_fn, FnComponent, InstallReport, PluginComponent, PluginDescriptor, PluginRegistry,
    PluginState, Props, Registration, RenderContext, SharedComponent, Theme, ThemedPlugin,
};

// Layer1 re-exports
pub use hub_foundation::{
    event, Error, EventBus, EventBusConfig, EventContract, HubConfig, HubEvent, Result,
    Subscription, ThemeConfig,
};
