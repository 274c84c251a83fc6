//! 설정 디렉토리 저장소
//!
//! 글로벌(`<config_dir>/community-hub/`)과 프로젝트(`./.community-hub/`) 두 위치를 다룹니다.
//! 읽기는 확장자로 형식을 고르고(JSON 기본, `.toml` 지원), 쓰기는 항상 JSON입니다.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// 앱 디렉토리 이름
const APP_DIR: &str = "community-hub";

/// 파일 하나를 확장자에 맞춰 역직렬화
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(toml::from_str(&content)?),
        Some("json") | None => Ok(serde_json::from_str(&content)?),
        Some(other) => Err(Error::Config(format!(
            "Unsupported config format '{}': {}",
            other,
            path.display()
        ))),
    }
}

/// 설정 파일 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 사용자 전역 위치
    pub fn global() -> Result<Self> {
        dirs::config_dir()
            .map(|dir| Self::new(dir.join(APP_DIR)))
            .ok_or_else(|| Error::Config("No user config directory on this platform".into()))
    }

    /// 프로젝트 루트 아래 숨김 디렉토리
    pub fn project(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(format!(".{APP_DIR}")))
    }

    pub fn current_project() -> Result<Self> {
        Ok(Self::project(std::env::current_dir()?))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.file_path(filename).is_file()
    }

    /// 읽기 (파싱 실패는 경로를 담은 `Error::Config`)
    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        let path = self.file_path(filename);
        read_file(&path).map_err(|e| match e {
            Error::Io(_) | Error::Config(_) => e,
            other => Error::Config(format!("{}: {}", path.display(), other)),
        })
    }

    /// 파일이 없으면 `None`
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        if !self.exists(filename) {
            return Ok(None);
        }
        self.load(filename).map(Some)
    }

    /// 임시 파일에 쓴 뒤 rename
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.base_dir)?;

        let path = self.file_path(filename);
        let tmp = self.file_path(&format!(".{filename}.tmp"));
        std::fs::write(&tmp, serde_json::to_string_pretty(data)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(path)
    }
}
