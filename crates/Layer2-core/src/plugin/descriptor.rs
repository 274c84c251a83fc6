//! Plugin Descriptor - 설치 가능한 기능 모듈의 등록 레코드

use super::traits::{PluginComponent, SharedComponent};
use hub_foundation::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 플러그인 디스크립터
///
/// `id`는 전역 고유 식별자이며, 같은 `id`로 다시 등록하면 디스크립터가 교체됩니다.
#[derive(Clone)]
pub struct PluginDescriptor {
    /// 고유 플러그인 ID (예: "classroom")
    pub id: String,

    /// 표시 이름
    pub name: String,

    /// 설명
    pub description: Option<String>,

    /// 내비게이션 아이콘 (코어는 해석하지 않음)
    pub icon: String,

    /// 내비게이션 정렬 가중치 (오름차순)
    pub order: i32,

    /// 먼저 설치되어야 하는 플러그인 ID 목록
    pub dependencies: Vec<String>,

    /// 플러그인 전용 테마 토큰 (전역 테마를 덮어씀)
    pub theme: BTreeMap<String, String>,

    /// 렌더링 컴포넌트
    pub component: Option<SharedComponent>,
}

impl PluginDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            icon: String::new(),
            order: 0,
            dependencies: Vec::new(),
            theme: BTreeMap::new(),
            component: None,
        }
    }

    pub fn with_component(mut self, component: impl PluginComponent + 'static) -> Self {
        self.component = Some(Arc::new(component));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    pub fn with_dependencies(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_theme_token(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.theme.insert(key.into(), value.into());
        self
    }

    pub fn component(&self) -> Option<&SharedComponent> {
        self.component.as_ref()
    }

    /// 필수 필드 검증
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("plugin id is required".to_string()));
        }
        if self.id.chars().any(char::is_whitespace) {
            return Err(Error::Validation(format!(
                "plugin id '{}' must not contain whitespace",
                self.id
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(format!(
                "plugin '{}' is missing a name",
                self.id
            )));
        }
        if self.component.is_none() {
            return Err(Error::Validation(format!(
                "plugin '{}' is missing a component",
                self.id
            )));
        }
        if let Some(dep) = self.dependencies.iter().find(|d| d.trim().is_empty()) {
            return Err(Error::Validation(format!(
                "plugin '{}' lists an empty dependency id '{}'",
                self.id, dep
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("icon", &self.icon)
            .field("order", &self.order)
            .field("dependencies", &self.dependencies)
            .field("has_component", &self.component.is_some())
            .finish()
    }
}
