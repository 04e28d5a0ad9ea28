use std::env;
use std::path::{Path, PathBuf};

use floorplan_config::{AppConfig, DocumentConfig, EditorConfig, UnitSetting};
use floorplan_core::document::{FloorPlan, MeasurementUnit};
use floorplan_core::grid::GridSettings;
use floorplan_engine::editor::{DemoEntities, Editor};
use floorplan_engine::pick::HitTolerance;
use floorplan_engine::settings::EditorSettings;
use floorplan_io::{DocumentLoader, JsonFacade};
use tracing::{info, warn};

/// 指定启动文档的环境变量。
pub const DOCUMENT_ENV: &str = "FLOORPLAN_DOCUMENT";

/// 文档来源，便于前端呈现加载信息。
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    File(PathBuf),
    Demo,
}

/// 统一封装加载后的编辑会话与元信息。
#[derive(Debug)]
pub struct LoadedEditor {
    pub editor: Editor,
    pub source: DocumentSource,
    pub demo_entities: Option<DemoEntities>,
}

pub fn settings_from_config(config: &EditorConfig) -> EditorSettings {
    EditorSettings {
        grid: GridSettings {
            grid_size: config.grid_size,
            show_grid: config.show_grid,
            snap_to_grid: config.snap_to_grid,
        },
        max_history: config.max_history,
        hit_tolerance: HitTolerance {
            endpoint: config.endpoint_hit_radius,
            body: config.body_hit_radius,
        },
        min_wall_length: config.min_wall_length,
        min_zoom: config.min_zoom,
        max_zoom: config.max_zoom,
        zoom_step: config.zoom_step,
        rotation_step: config.rotation_step_degrees,
    }
}

/// 按配置创建空白文档。
pub fn new_plan(config: &DocumentConfig) -> FloorPlan {
    let mut plan = FloorPlan::default();
    plan.set_unit(match config.unit {
        UnitSetting::Imperial => MeasurementUnit::Imperial,
        UnitSetting::Metric => MeasurementUnit::Metric,
    });
    if let Err(err) = plan.set_scale(config.scale) {
        warn!(error = %err, "配置中的比例无效，使用默认比例");
    }
    plan
}

/// 启动文档路径的优先级：命令行 `--open`，其次环境变量，最后配置中的默认路径。
pub fn resolve_document_path(
    open: Option<&Path>,
    env_value: Option<PathBuf>,
    config: &DocumentConfig,
) -> Option<PathBuf> {
    open.map(Path::to_path_buf)
        .or(env_value)
        .or_else(|| config.default_path.clone())
}

/// 加载启动文档，失败时回退到内置演示户型。
pub fn load_editor(config: &AppConfig, open: Option<&Path>) -> LoadedEditor {
    let env_value = env::var_os(DOCUMENT_ENV).map(PathBuf::from);
    let path = resolve_document_path(open, env_value, &config.document);
    load_editor_from(config, path)
}

pub fn load_editor_from(config: &AppConfig, path: Option<PathBuf>) -> LoadedEditor {
    let settings = settings_from_config(&config.editor);
    if let Some(path) = path {
        match JsonFacade::new().load(&path) {
            Ok(plan) => {
                info!(path = %path.display(), "从 JSON 加载平面图成功");
                return LoadedEditor {
                    editor: Editor::with_plan(plan, settings),
                    source: DocumentSource::File(path),
                    demo_entities: None,
                };
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "加载平面图失败，回退到内置示例");
            }
        }
    }

    let mut editor = Editor::with_plan(new_plan(&config.document), settings);
    let demo_entities = editor.populate_demo();
    LoadedEditor {
        editor,
        source: DocumentSource::Demo,
        demo_entities: Some(demo_entities),
    }
}

#[cfg(test)]
mod tests {
    use floorplan_io::DocumentSaver;

    use super::*;

    #[test]
    fn open_flag_wins_over_env_and_config() {
        let config = DocumentConfig {
            default_path: Some(PathBuf::from("config.json")),
            ..DocumentConfig::default()
        };
        let from_open = resolve_document_path(
            Some(Path::new("open.json")),
            Some(PathBuf::from("env.json")),
            &config,
        );
        assert_eq!(from_open, Some(PathBuf::from("open.json")));

        let from_env = resolve_document_path(None, Some(PathBuf::from("env.json")), &config);
        assert_eq!(from_env, Some(PathBuf::from("env.json")));

        let from_config = resolve_document_path(None, None, &config);
        assert_eq!(from_config, Some(PathBuf::from("config.json")));

        assert_eq!(
            resolve_document_path(None, None, &DocumentConfig::default()),
            None
        );
    }

    #[test]
    fn loads_saved_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        let mut plan = FloorPlan::new("Saved");
        plan.add_wall(
            floorplan_core::geometry::Point2::new(0.0, 0.0),
            floorplan_core::geometry::Point2::new(80.0, 0.0),
        );
        JsonFacade::new().save(&plan, &path).unwrap();

        let loaded = load_editor_from(&AppConfig::default(), Some(path.clone()));
        assert_eq!(loaded.source, DocumentSource::File(path));
        assert!(loaded.demo_entities.is_none());
        assert_eq!(loaded.editor.plan(), &plan);
    }

    #[test]
    fn missing_document_falls_back_to_demo() {
        let mut config = AppConfig::default();
        config.document.unit = UnitSetting::Metric;
        let loaded = load_editor_from(&config, Some(PathBuf::from("/no/such/plan.json")));
        assert_eq!(loaded.source, DocumentSource::Demo);
        assert!(loaded.demo_entities.is_some());
        assert_eq!(loaded.editor.plan().unit(), MeasurementUnit::Metric);
        assert_eq!(loaded.editor.plan().wall_count(), 4);
    }

    #[test]
    fn editor_settings_follow_config() {
        let mut config = EditorConfig::default();
        config.grid_size = 12.0;
        config.max_history = 5;
        config.rotation_step_degrees = 45.0;
        let settings = settings_from_config(&config);
        assert_eq!(settings.grid.grid_size, 12.0);
        assert_eq!(settings.max_history, 5);
        assert_eq!(settings.rotation_step, 45.0);
        assert_eq!(settings.hit_tolerance, HitTolerance::default());
    }
}
