use std::fmt::Write as _;
use std::path::PathBuf;

use floorplan_config::AppConfig;
use floorplan_core::document::{FloorPlan, MeasurementUnit, OpeningKind};
use floorplan_core::geometry::Point2;
use floorplan_engine::command::{CommandBus, CommandContext, CommandRequest, CommandResponse};
use floorplan_engine::editor::{Editor, Selection};
use floorplan_io::{DocumentSaver, JsonFacade};
use tracing::{info, warn};

use crate::errors::FrontendError;
use crate::loader::{DocumentSource, LoadedEditor, load_editor};

/// 命令行参数中与文档相关的部分。
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub open: Option<PathBuf>,
    pub save: Option<PathBuf>,
}

/// 加载文档，依次执行配置中的脚本命令，打印平面图概览，并按需保存。
pub fn run(config: &AppConfig, options: &CliOptions) -> Result<(), FrontendError> {
    let LoadedEditor {
        mut editor,
        source,
        demo_entities,
    } = load_editor(config, options.open.as_deref());
    let bus = CommandBus::new();

    println!("Rust 版平面图编辑器 CLI");
    match &source {
        DocumentSource::File(path) => println!("已从 JSON 加载文档：{}", path.display()),
        DocumentSource::Demo => {
            if let Some(ids) = &demo_entities {
                println!("已构建内置示例户型：");
                println!("  - 房间 ID = {}", ids.room);
                println!("  - 沙发 ID = {}", ids.sofa);
                println!("  - 餐桌 ID = {}", ids.table);
                println!("  - 椅子 ID = {}", ids.chair);
            }
        }
    }

    let mut commands: Vec<&str> = bus.available_commands().copied().collect();
    commands.sort_unstable();
    println!("支持的命令: {}", commands.join(", "));

    for line in &config.frontend.script {
        match run_script_line(&bus, &mut editor, line) {
            Ok(Some(response)) => report(line, &response),
            Ok(None) => {}
            Err(err) => warn!(line = line.as_str(), error = %err, "脚本命令无法执行"),
        }
    }

    print!("{}", render_overview(&editor, config.frontend.list_entities));

    if let Some(path) = &options.save {
        JsonFacade::new().save(editor.plan(), path)?;
        println!("已保存到 {}", path.display());
    }
    Ok(())
}

/// 执行一行脚本。空行返回 `Ok(None)`，未注册的命令返回错误。
pub fn run_script_line(
    bus: &CommandBus,
    editor: &mut Editor,
    line: &str,
) -> Result<Option<CommandResponse>, FrontendError> {
    let Some(request) = CommandRequest::parse(line) else {
        return Ok(None);
    };
    if !bus.contains(&request.name) {
        return Err(FrontendError::UnknownCommand(request.name));
    }
    let mut context = CommandContext { editor };
    Ok(Some(bus.dispatch(&request, &mut context)))
}

fn report(line: &str, response: &CommandResponse) {
    let message = response.message.as_deref().unwrap_or_default();
    if response.success {
        println!("[命令] {message}");
    } else {
        warn!(line, "CLI 命令执行失败: {message}");
        println!("[失败] {line}: {message}");
    }
}

/// 生成平面图概览文本。
pub fn render_overview(editor: &Editor, list_entities: bool) -> String {
    let plan = editor.plan();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "平面图 \"{}\"：墙体 {} 段，房间 {} 个，家具 {} 件",
        plan.name(),
        plan.wall_count(),
        plan.rooms().count(),
        plan.furniture_items().len()
    );
    let _ = writeln!(
        out,
        "比例 = {} 像素/英寸，单位 = {}，网格 = {}（显示: {}，吸附: {}）",
        plan.scale(),
        plan.unit().display_unit(),
        plan.format_measurement(editor.settings().grid.grid_size),
        editor.settings().grid.show_grid,
        editor.settings().grid.snap_to_grid
    );

    if list_entities {
        describe_entities(plan, &mut out);
    }

    match editor.selection() {
        Some(selection) => {
            let _ = writeln!(out, "当前选中：{}", describe_selection(selection));
        }
        None => {
            let _ = writeln!(out, "当前尚未选中任何实体。");
        }
    }
    let viewport = editor.viewport();
    let _ = writeln!(
        out,
        "视口中心={}, 缩放={:.3}",
        format_point(viewport.center),
        viewport.zoom
    );
    let history = editor.history();
    let _ = writeln!(
        out,
        "历史：可撤销 {} 步，可重做 {} 步（上限 {}）",
        history.undo_len(),
        history.redo_len(),
        history.max_len()
    );
    out
}

fn describe_entities(plan: &FloorPlan, out: &mut String) {
    let _ = writeln!(out, "墙体：");
    for wall in plan.walls() {
        let doors = wall.openings.iter().filter(|o| o.is_door()).count();
        let windows = wall
            .openings
            .iter()
            .filter(|o| matches!(o.kind, OpeningKind::Window { .. }))
            .count();
        let _ = writeln!(
            out,
            "  - 墙 {} {} -> {}，长度 {}，门 {}，窗 {}",
            wall.id,
            format_point(wall.start_point),
            format_point(wall.end_point),
            plan.format_measurement(wall.length()),
            doors,
            windows
        );
    }

    let _ = writeln!(out, "房间：");
    for room in plan.rooms() {
        let _ = writeln!(
            out,
            "  - 房间 {} {}（{}），墙体 {} 段，面积 {}",
            room.id,
            room.name,
            room.room_type.display_name(),
            room.walls.len(),
            format_area(room.area, plan.unit())
        );
    }

    let _ = writeln!(out, "家具：");
    for item in plan.furniture_items() {
        let _ = writeln!(
            out,
            "  - 家具 {} {} [{}] 位置={} 尺寸={}x{} 旋转={}°",
            item.id,
            item.display_name(),
            item.furniture_id,
            format_point(item.position),
            item.width,
            item.height,
            item.rotation
        );
    }
}

fn describe_selection(selection: Selection) -> String {
    match selection {
        Selection::Wall(id) => format!("墙 {id}"),
        Selection::Furniture(id) => format!("家具 {id}"),
        Selection::Room(id) => format!("房间 {id}"),
    }
}

/// 面积以平方英寸存储，按文档单位换算为平方英尺或平方米。
fn format_area(square_inches: f64, unit: MeasurementUnit) -> String {
    match unit {
        MeasurementUnit::Imperial => format!("{:.1} sq ft", square_inches / 144.0),
        MeasurementUnit::Metric => format!("{:.2} m²", square_inches * 0.000_645_16),
    }
}

fn format_point(point: Point2) -> String {
    format!("({:.2}, {:.2})", point.x(), point.y())
}

pub(crate) fn log_startup(config: &AppConfig, options: &CliOptions) {
    info!(
        open = ?options.open,
        save = ?options.save,
        script_lines = config.frontend.script.len(),
        "启动 CLI 前端"
    );
}

#[cfg(test)]
mod tests {
    use floorplan_engine::editor::Editor;

    use super::*;

    #[test]
    fn script_lines_drive_the_editor() {
        let mut editor = Editor::default();
        editor.populate_demo();
        let bus = CommandBus::new();
        let before = editor.plan().furniture_items().len();

        let placed = run_script_line(&bus, &mut editor, "place cabinet 200 40")
            .unwrap()
            .unwrap();
        assert!(placed.success);
        assert_eq!(editor.plan().furniture_items().len(), before + 1);

        let undone = run_script_line(&bus, &mut editor, "undo").unwrap().unwrap();
        assert!(undone.success);
        assert_eq!(editor.plan().furniture_items().len(), before);

        assert!(run_script_line(&bus, &mut editor, "   ").unwrap().is_none());
    }

    #[test]
    fn unknown_script_command_is_an_error() {
        let mut editor = Editor::default();
        let bus = CommandBus::new();
        let err = run_script_line(&bus, &mut editor, "explode 1 2").unwrap_err();
        assert!(matches!(err, FrontendError::UnknownCommand(name) if name == "explode"));
    }

    #[test]
    fn overview_lists_demo_plan() {
        let mut editor = Editor::default();
        editor.populate_demo();
        let text = render_overview(&editor, true);
        assert!(text.contains("Demo Apartment"));
        assert!(text.contains("墙体 4 段"));
        assert!(text.contains("Living Room"));
        assert!(text.contains("300.0 sq ft"));
        assert!(text.contains("可撤销 0 步"));

        let brief = render_overview(&editor, false);
        assert!(!brief.contains("家具："));
    }

    #[test]
    fn area_follows_document_unit() {
        assert_eq!(format_area(144.0, MeasurementUnit::Imperial), "1.0 sq ft");
        assert_eq!(format_area(1550.0031, MeasurementUnit::Metric), "1.00 m²");
    }
}
