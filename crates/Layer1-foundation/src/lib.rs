//! # hub-foundation
//!
//! Foundation layer for Community Hub:
//! - Error: 중앙 에러 타입 (레지스트리/리스너/설정)
//! - Event: 플러그인 간 이벤트 버스 + 잘 알려진 이벤트 계약
//! - Config: 통합 설정 (HubConfig, ThemeConfig)
//! - Storage: JsonStore (설정 파일)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  hub-core (PluginRegistry, HubContext)                  │
//! │                     │                                   │
//! │                     ▼                                   │
//! │  ┌───────────────┬───────────────┬─────────────────┐   │
//! │  │  EventBus     │  HubConfig    │  Error          │   │
//! │  │  (pub/sub)    │  (JsonStore)  │  (thiserror)    │   │
//! │  └───────────────┴───────────────┴─────────────────┘   │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{HubConfig, HubConfigPatch, ThemeConfig, HUB_CONFIG_FILE};

// ============================================================================
// Event (이벤트 버스)
// ============================================================================
pub use event::{
    EventBus, EventBusConfig, EventContract, EventId, EventName, HubEvent, ListenerId,
    Subscription, ANY_EVENT,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
