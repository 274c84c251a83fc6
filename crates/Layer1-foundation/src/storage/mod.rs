//! Storage module for Community Hub
//!
//! - `json`: 설정 디렉토리 저장/로드 (읽기 JSON/TOML, 쓰기 JSON)

mod json;

pub use json::{read_file, JsonStore};
