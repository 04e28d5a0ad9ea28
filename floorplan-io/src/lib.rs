use std::fs;
use std::path::{Path, PathBuf};

use floorplan_core::catalog::FurnitureDragData;
use floorplan_core::document::FloorPlan;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
    #[error("failed to encode document: {0}")]
    Encode(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<FloorPlan, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, plan: &FloorPlan, path: &Path) -> Result<(), IoError>;
}

/// JSON 文档读写。解码失败时不返回任何部分结果，调用方的文档保持不变。
#[derive(Debug, Clone, Copy)]
pub struct JsonFacade {
    pretty: bool,
}

impl JsonFacade {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// 输出单行 JSON，适合剪贴板或网络传输。
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// 解码并校验平面图。旧版文档缺失的字段取默认值，实体 ID 计数器会越过已有 ID。
    /// 重复或越界的 ID 视为无效文档。
    pub fn decode(&self, bytes: &[u8]) -> Result<FloorPlan, IoError> {
        let mut plan: FloorPlan = decode_json(bytes)?;
        plan.reconcile_ids()
            .and_then(|()| plan.validate())
            .map_err(|err| IoError::InvalidDocument(err.to_string()))?;
        Ok(plan)
    }

    pub fn encode(&self, plan: &FloorPlan) -> Result<Vec<u8>, IoError> {
        encode_json(plan, self.pretty)
    }
}

impl Default for JsonFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<FloorPlan, IoError> {
        let data = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = self.decode(&data)?;
        info!(
            path = %path.display(),
            walls = plan.wall_count(),
            furniture = plan.furniture_items().len(),
            "已读取平面图文档"
        );
        Ok(plan)
    }
}

impl DocumentSaver for JsonFacade {
    fn save(&self, plan: &FloorPlan, path: &Path) -> Result<(), IoError> {
        let data = self.encode(plan)?;
        fs::write(path, &data).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = data.len(), "已保存平面图文档");
        Ok(())
    }
}

/// 解析家具面板拖放负载（`{ furnitureId, name, width, height, category }`）。
pub fn decode_drag_payload(text: &str) -> Result<FurnitureDragData, IoError> {
    let payload: FurnitureDragData = decode_json(text.as_bytes())?;
    if !(payload.width >= 0.0 && payload.height >= 0.0) {
        return Err(IoError::InvalidDocument(format!(
            "拖放负载尺寸无效: {} x {}",
            payload.width, payload.height
        )));
    }
    debug!(furniture = payload.furniture_id.as_str(), "已解析拖放负载");
    Ok(payload)
}

pub fn encode_drag_payload(payload: &FurnitureDragData) -> Result<String, IoError> {
    let bytes = encode_json(payload, false)?;
    String::from_utf8(bytes).map_err(|err| IoError::Encode(err.to_string()))
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, IoError> {
    serde_json::from_slice(bytes).map_err(|err| IoError::InvalidDocument(err.to_string()))
}

fn encode_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<Vec<u8>, IoError> {
    let result = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    result.map_err(|err| IoError::Encode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use floorplan_core::catalog::FurniturePreset;

    use super::*;

    #[test]
    fn drag_payload_round_trip() {
        let payload = FurniturePreset::Sofa.to_drag_data();
        let text = encode_drag_payload(&payload).unwrap();
        assert!(text.contains("\"furnitureId\":\"sofa\""));
        assert_eq!(decode_drag_payload(&text).unwrap(), payload);
    }

    #[test]
    fn drag_payload_rejects_negative_size() {
        let text = r#"{"furnitureId":"x","name":"X","width":-1,"height":2,"category":"Storage"}"#;
        assert!(matches!(
            decode_drag_payload(text),
            Err(IoError::InvalidDocument(_))
        ));
        assert!(decode_drag_payload("{}").is_err());
    }

    #[test]
    fn compact_output_has_no_newlines() {
        let plan = FloorPlan::new("Compact");
        let bytes = JsonFacade::compact().encode(&plan).unwrap();
        assert!(!bytes.contains(&b'\n'));
        let pretty = JsonFacade::new().encode(&plan).unwrap();
        assert!(pretty.contains(&b'\n'));
    }
}
