//! Theme - 전역 테마와 플러그인 테마 병합

use hub_foundation::ThemeConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 해석된 테마
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// 테마 이름
    pub name: String,

    /// 테마 토큰
    pub tokens: BTreeMap<String, String>,
}

impl Theme {
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

    pub fn token(&self, key: &str) -> Option<&str> {
        self.tokens.get(key).map(String::as_str)
    }

    /// 플러그인 전용 토큰으로 덮어쓴 새 테마
    pub fn merged(&self, overrides: &BTreeMap<String, String>) -> Theme {
        let mut theme = self.clone();
        theme
            .tokens
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        theme
    }
}

impl From<&ThemeConfig> for Theme {
    fn from(config: &ThemeConfig) -> Self {
        Self {
            name: config.name.clone(),
            tokens: config.tokens.clone(),
        }
    }
}
