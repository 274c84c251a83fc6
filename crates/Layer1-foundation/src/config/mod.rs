//! Config - 통합 설정 관리
//!
//! - `hub.rs` - HubConfig 통합 설정 (이벤트 버스, 테마, 자동 설치)

mod hub;

pub use hub::{HubConfig, HubConfigPatch, ThemeConfig, HUB_CONFIG_FILE};
