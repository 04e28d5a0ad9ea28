use floorplan_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("文档读写失败: {0}")]
    Io(#[from] IoError),
    #[error("未知命令: {0}")]
    UnknownCommand(String),
}
