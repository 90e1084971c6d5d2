//! 권한 설정 확인 명령어

use std::path::Path;

use serde_json::json;

use rsv_core::permissions::Capability;

use crate::context::load_permissions;
use crate::OutputFormat;

pub fn show(path: Option<&Path>, room: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    let path = path.ok_or_else(|| {
        anyhow::anyhow!("Permissions file not specified. Use --file, --permissions or RSV_PERMISSIONS")
    })?;
    let permissions = load_permissions(path)?;

    let mut rooms: Vec<&String> = match room {
        Some(room) => permissions.rooms.get_key_value(room).map(|(k, _)| k).into_iter().collect(),
        None => permissions.rooms.keys().collect(),
    };
    if rooms.is_empty() {
        anyhow::bail!("Room not found in {}", path.display());
    }
    rooms.sort();

    match format {
        OutputFormat::Json => {
            let output: serde_json::Map<_, _> = rooms
                .iter()
                .map(|id| {
                    let caps: Vec<&str> = permissions
                        .capabilities(id)
                        .iter()
                        .map(Capability::as_str)
                        .collect();
                    let entry = json!({
                        "role_key": permissions.room(id).map(|info| info.role_key.as_str()),
                        "capabilities": caps,
                        "block_permission_editable": permissions.can_edit_block_role_permissions(id),
                    });
                    (id.to_string(), entry)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            for id in rooms {
                let role = permissions
                    .room(id)
                    .map(|info| info.role_key.as_str())
                    .unwrap_or("(none)");
                println!("room {} ({}):", id, role);
                for cap in permissions.capabilities(id) {
                    println!("  {}", cap);
                }
            }
        }
    }
    Ok(())
}
