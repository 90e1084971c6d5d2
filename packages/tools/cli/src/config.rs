//! CLI 설정

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 기본 모델 alias
pub const DEFAULT_ALIAS: &str = "ReservationEvent";

/// CLI 설정 (`~/.rsv/config.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// 기본 권한 설정 파일
    pub permissions_file: Option<PathBuf>,

    /// 기본 모델 alias
    pub alias: Option<String>,
}

impl CliConfig {
    /// 설정 파일 경로
    fn config_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?;
        Ok(home.join(".rsv").join("config.json"))
    }

    /// 설정 로드
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: CliConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// 권한 설정 파일 결정 (CLI 옵션 > RSV_PERMISSIONS > 설정 파일)
    pub fn permissions_file(&self, flag: Option<&Path>) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| std::env::var_os("RSV_PERMISSIONS").map(PathBuf::from))
            .or_else(|| self.permissions_file.clone())
    }

    /// 모델 alias 결정
    pub fn alias(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.alias.clone())
            .unwrap_or_else(|| DEFAULT_ALIAS.to_string())
    }
}
