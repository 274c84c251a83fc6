//! Plugin traits - 렌더링 컴포넌트 인터페이스
//!
//! 코어는 컴포넌트 내부를 알지 못하고, 참조를 저장했다가 뷰 레이어에 돌려줄 뿐입니다.

use super::theme::Theme;
use crate::context::HubContext;
use hub_foundation::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

/// 뷰 레이어가 컴포넌트에 넘기는 속성 묶음 (플러그인마다 형태가 다름)
pub type Props = Map<String, Value>;

/// 공유 컴포넌트 참조
pub type SharedComponent = Arc<dyn PluginComponent>;

// ============================================================================
// RenderContext
// ============================================================================

/// 렌더링 시 컴포넌트에 전달되는 컨텍스트
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// 렌더링 중인 플러그인 ID
    pub plugin_id: &'a str,

    /// 속성 묶음
    pub props: &'a Props,

    /// 전역 테마 + 플러그인 테마가 병합된 결과
    pub theme: &'a Theme,
}

impl<'a> RenderContext<'a> {
    /// 문자열 속성 조회
    pub fn prop_str(&self, key: &str) -> Option<&'a str> {
        self.props.get(key).and_then(Value::as_str)
    }
}

// ============================================================================
// PluginComponent Trait
// ============================================================================

/// 플러그인 컴포넌트 트레이트
///
/// 속성 묶음과 테마를 받아 화면 출력을 만듭니다.
pub trait PluginComponent: Send + Sync {
    /// 렌더링
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String>;

    /// 설치 직후 호출 (이벤트 구독 등록 등)
    fn on_install(&self, _ctx: &HubContext) -> Result<()> {
        Ok(())
    }

    /// 제거 직후 호출
    fn on_uninstall(&self, _ctx: &HubContext) -> Result<()> {
        Ok(())
    }
}

/// 클로저 기반 컴포넌트
pub struct FnComponent<F>(F);

impl<F> PluginComponent for FnComponent<F>
where
    F: Fn(&RenderContext<'_>) -> Result<String> + Send + Sync,
{
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        (self.0)(ctx)
    }
}

/// 클로저로 컴포넌트 생성
pub fn component_fn<F>(render: F) -> FnComponent<F>
where
    F: Fn(&RenderContext<'_>) -> Result<String> + Send + Sync,
{
    FnComponent(render)
}
