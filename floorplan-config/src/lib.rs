use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "FLOORPLAN_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

impl AppConfig {
    /// 从显式路径加载配置并校验。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `FLOORPLAN_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// 校验数值范围。网格尺寸在这里拦截，吸附计算不会遇到 0。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let editor = &self.editor;
        positive("editor.grid_size", editor.grid_size)?;
        if editor.max_history == 0 {
            return Err(ConfigError::invalid("editor.max_history", "必须大于 0"));
        }
        positive("editor.endpoint_hit_radius", editor.endpoint_hit_radius)?;
        positive("editor.body_hit_radius", editor.body_hit_radius)?;
        if !(editor.min_wall_length.is_finite() && editor.min_wall_length >= 0.0) {
            return Err(ConfigError::invalid("editor.min_wall_length", "不能为负数"));
        }
        positive("editor.min_zoom", editor.min_zoom)?;
        positive("editor.max_zoom", editor.max_zoom)?;
        if editor.min_zoom > editor.max_zoom {
            return Err(ConfigError::invalid(
                "editor.min_zoom",
                format!("不能大于 max_zoom ({})", editor.max_zoom),
            ));
        }
        positive("editor.zoom_step", editor.zoom_step)?;
        if !editor.rotation_step_degrees.is_finite() {
            return Err(ConfigError::invalid(
                "editor.rotation_step_degrees",
                "必须是有限数值",
            ));
        }
        positive("document.scale", self.document.scale)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("必须大于 0，实际为 {value}")))
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 编辑器行为参数，距离均为真实世界单位（英寸）。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid_size: f64,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub max_history: usize,
    pub endpoint_hit_radius: f64,
    pub body_hit_radius: f64,
    pub min_wall_length: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    pub rotation_step_degrees: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            show_grid: true,
            snap_to_grid: true,
            max_history: 50,
            endpoint_hit_radius: 20.0,
            body_hit_radius: 15.0,
            min_wall_length: 10.0,
            min_zoom: 0.25,
            max_zoom: 3.0,
            zoom_step: 0.25,
            rotation_step_degrees: 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSetting {
    #[default]
    Imperial,
    Metric,
}

/// 新建文档的默认参数与默认打开路径。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub default_path: Option<PathBuf>,
    pub scale: f64,
    pub unit: UnitSetting,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            default_path: None,
            scale: 4.0,
            unit: UnitSetting::Imperial,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    /// CLI 启动后依次执行的命令行，例如 `"place chair 40 40"`。
    #[serde(default)]
    pub script: Vec<String>,
    #[serde(default = "FrontendConfig::default_list_entities")]
    pub list_entities: bool,
}

impl FrontendConfig {
    fn default_list_entities() -> bool {
        true
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            script: Vec::new(),
            list_entities: Self::default_list_entities(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置项 {field} 无效: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn defaults_match_editor_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.editor.grid_size, 20.0);
        assert_eq!(cfg.editor.max_history, 50);
        assert_eq!(cfg.editor.min_zoom, 0.25);
        assert_eq!(cfg.editor.max_zoom, 3.0);
        assert_eq!(cfg.document.scale, 4.0);
        assert_eq!(cfg.document.unit, UnitSetting::Imperial);
        assert!(cfg.document.default_path.is_none());
        assert!(cfg.frontend.script.is_empty());
        assert!(cfg.frontend.list_entities);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_from_temp_file() {
        let file = write_config(
            r#"
            [logging]
            level = "debug"

            [editor]
            grid_size = 12.0
            snap_to_grid = false
            max_history = 10

            [document]
            default_path = "plans/home.json"
            unit = "metric"

            [frontend]
            script = ["place chair 40 40", "undo"]
            list_entities = false
            "#,
        );

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.editor.grid_size, 12.0);
        assert!(!cfg.editor.snap_to_grid);
        assert!(cfg.editor.show_grid);
        assert_eq!(cfg.editor.max_history, 10);
        assert_eq!(cfg.editor.body_hit_radius, 15.0);
        assert_eq!(
            cfg.document.default_path.as_deref(),
            Some(Path::new("plans/home.json"))
        );
        assert_eq!(cfg.document.unit, UnitSetting::Metric);
        assert_eq!(cfg.document.scale, 4.0);
        assert_eq!(cfg.frontend.script.len(), 2);
        assert!(!cfg.frontend.list_entities);
    }

    #[test]
    fn zero_grid_size_is_rejected() {
        let file = write_config("[editor]\ngrid_size = 0.0");
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "editor.grid_size",
                ..
            }
        ));
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.editor.min_zoom = 4.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid {
                field: "editor.min_zoom",
                ..
            })
        ));

        let mut cfg = AppConfig::default();
        cfg.editor.max_history = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.document.scale = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let file = write_config("[editor\ngrid_size = 1");
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let missing = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
