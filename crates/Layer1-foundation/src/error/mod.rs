//! Error types for Community Hub
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Community Hub 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 플러그인 레지스트리 관련
    // ========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Plugin '{plugin}' depends on '{dependency}', which is not registered")]
    MissingDependency { plugin: String, dependency: String },

    #[error("Dependency cycle detected: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("Plugin '{plugin}' is required by installed plugins: {}", .dependents.join(", "))]
    PluginInUse {
        plugin: String,
        dependents: Vec<String>,
    },

    // ========================================================================
    // 이벤트 버스 관련 (emit 밖으로 전파되지 않음)
    // ========================================================================
    #[error("Listener for '{event}' failed: {message}")]
    Listener { event: String, message: String },

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 레지스트리 연산에서 발생한 에러인지 확인
    pub fn is_registry_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::UnknownPlugin(_)
                | Error::MissingDependency { .. }
                | Error::DependencyCycle(_)
                | Error::PluginInUse { .. }
        )
    }

    /// 사용자에게 보여줄 수 있는 에러인지 확인
    ///
    /// 호스트는 이 에러들을 알림으로 표시하고 계속 동작해야 합니다.
    pub fn is_user_facing(&self) -> bool {
        self.is_registry_error() || matches!(self, Error::Config(_))
    }

    /// 누락된 의존성 에러 생성 헬퍼
    pub fn missing_dependency(plugin: impl Into<String>, dependency: impl Into<String>) -> Self {
        Error::MissingDependency {
            plugin: plugin.into(),
            dependency: dependency.into(),
        }
    }

    /// 리스너 에러 생성 헬퍼
    pub fn listener(event: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Listener {
            event: event.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_path() {
        let err = Error::DependencyCycle(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "Dependency cycle detected: a -> b -> a");
    }

    #[test]
    fn test_missing_dependency_names_both_ids() {
        let err = Error::missing_dependency("classroom", "course-builder");
        let msg = err.to_string();
        assert!(msg.contains("classroom"));
        assert!(msg.contains("course-builder"));
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::UnknownPlugin("x".into()).is_registry_error());
        assert!(Error::Validation("x".into()).is_user_facing());
        assert!(!Error::listener("x", "boom").is_registry_error());
        assert!(!Error::Internal("x".into()).is_user_facing());
    }
}
