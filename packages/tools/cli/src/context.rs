//! 호출자 컨텍스트 결정
//!
//! CLI 옵션, 환경 변수, 권한 설정 파일로 `CallerContext`를 만듭니다.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;

use rsv_core::permissions::{CallerContext, Capability, ReservationPermissions};

use crate::config::CliConfig;

/// 호출자 옵션
#[derive(Debug, Clone, Default, Args)]
pub struct CallerArgs {
    /// Current user id
    #[arg(long = "user", global = true, env = "RSV_USER_ID")]
    pub user: Option<i64>,

    /// Current language id
    #[arg(long = "language", global = true, env = "RSV_LANGUAGE_ID")]
    pub language: Option<i64>,

    /// Multilingual site
    #[arg(long, global = true, env = "RSV_MULTILINGUAL")]
    pub multilingual: bool,

    /// Granted capability (repeatable, e.g. content_editable)
    #[arg(long = "capability", global = true, value_parser = parse_capability)]
    pub capabilities: Vec<Capability>,

    /// Room whose role capabilities apply
    #[arg(long, global = true)]
    pub room: Option<String>,

    /// Permissions file (YAML or JSON)
    #[arg(long, global = true)]
    pub permissions: Option<PathBuf>,
}

fn parse_capability(s: &str) -> Result<Capability, String> {
    s.parse().map_err(|e: rsv_core::Error| e.to_string())
}

/// 권한 설정 파일 로드 (확장자가 `.json`이면 JSON, 그 외 YAML)
pub fn load_permissions(path: &Path) -> anyhow::Result<ReservationPermissions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read permissions file {}", path.display()))?;
    let permissions = if path.extension().is_some_and(|ext| ext == "json") {
        ReservationPermissions::from_json(&content)?
    } else {
        ReservationPermissions::from_yaml(&content)?
    };
    Ok(permissions)
}

/// 호출자 컨텍스트 결정
///
/// `--room`이 있으면 권한 설정 파일에서 룸 권한을 읽고 `--capability`를 더합니다.
pub fn resolve_caller(args: &CallerArgs, config: &CliConfig) -> anyhow::Result<CallerContext> {
    let permissions = match &args.room {
        Some(_) => {
            let path = config
                .permissions_file(args.permissions.as_deref())
                .ok_or_else(|| {
                    anyhow::anyhow!("--room requires a permissions file. Use --permissions or set RSV_PERMISSIONS")
                })?;
            Some(load_permissions(&path)?)
        }
        None => None,
    };

    let caller = build_caller(args, permissions.as_ref());
    tracing::debug!(?caller, "resolved caller");
    Ok(caller)
}

fn build_caller(args: &CallerArgs, permissions: Option<&ReservationPermissions>) -> CallerContext {
    let mut caller = match (&args.room, permissions) {
        (Some(room), Some(permissions)) => CallerContext::for_room(room, permissions),
        _ => CallerContext::new(),
    };

    caller.user_id = args.user.map(Into::into);
    caller.language_id = args.language.map(Into::into);
    caller.multilingual = args.multilingual;
    caller.capabilities.extend(args.capabilities.iter().copied());
    caller
}
