use std::collections::HashMap;
use std::str::FromStr;

use floorplan_core::catalog::FurniturePreset;
use floorplan_core::document::EntityId;
use floorplan_core::geometry::Point2;

use crate::editor::{Editor, Placement};

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// 按空白切分一行脚本，首个词为命令名。空行返回 `None`。
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let name = words.next()?;
        Some(Self {
            name: name.to_string(),
            args: words.map(str::to_string).collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub editor: &'a mut Editor,
}

/// 以普通函数实现的命令。
struct FnCommand {
    name: &'static str,
    run: fn(&CommandRequest, &mut Editor) -> CommandResponse,
}

impl CommandHandler for FnCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        (self.run)(request, context.editor)
    }
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register_fn("undo", undo);
        bus.register_fn("redo", redo);
        bus.register_fn("clear_history", clear_history);
        bus.register_fn("clear_selection", clear_selection);
        bus.register_fn("delete_selected", delete_selected);
        bus.register_fn("focus_selection", focus_selection);
        bus.register_fn("rotate_left", rotate_left);
        bus.register_fn("rotate_right", rotate_right);
        bus.register_fn("zoom_in", zoom_in);
        bus.register_fn("zoom_out", zoom_out);
        bus.register_fn("reset_zoom", reset_zoom);
        bus.register_fn("set_zoom", set_zoom);
        bus.register_fn("fit_to_content", fit_to_content);
        bus.register_fn("toggle_grid", toggle_grid);
        bus.register_fn("toggle_snap", toggle_snap);
        bus.register_fn("set_grid_size", set_grid_size);
        bus.register_fn("place", place);
        bus.register_fn("move", move_furniture);
        bus.register_fn("select_at", select_at);
        bus.register_fn("add_wall", add_wall);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    fn register_fn(
        &mut self,
        name: &'static str,
        run: fn(&CommandRequest, &mut Editor) -> CommandResponse,
    ) {
        self.register(FnCommand { name, run });
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

fn arg<T: FromStr>(request: &CommandRequest, index: usize, what: &str) -> Result<T, CommandResponse> {
    let raw = request
        .args
        .get(index)
        .ok_or_else(|| CommandResponse::err(format!("{} 缺少参数: {what}", request.name)))?;
    raw.parse()
        .map_err(|_| CommandResponse::err(format!("{} 参数无效: {what} = {raw}", request.name)))
}

fn point_arg(request: &CommandRequest, index: usize) -> Result<Point2, CommandResponse> {
    Ok(Point2::new(
        arg(request, index, "x")?,
        arg(request, index + 1, "y")?,
    ))
}

fn placement_response(placement: Placement, action: &str) -> CommandResponse {
    match placement {
        Placement::Placed(id) => CommandResponse::ok(format!("{action}完成: {id}")),
        Placement::Rejected { blocking } => {
            CommandResponse::err(format!("{action}被拒绝，与家具 {blocking} 重叠"))
        }
    }
}

fn undo(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    if editor.undo() {
        CommandResponse::ok("已撤销")
    } else {
        CommandResponse::ok("没有可撤销的操作")
    }
}

fn redo(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    if editor.redo() {
        CommandResponse::ok("已重做")
    } else {
        CommandResponse::ok("没有可重做的操作")
    }
}

fn clear_history(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    editor.clear_history();
    CommandResponse::ok("撤销历史已清空")
}

fn clear_selection(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    editor.clear_selection();
    CommandResponse::ok("选中集已清空")
}

fn delete_selected(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    match editor.delete_selected() {
        Ok(Some(selection)) => CommandResponse::ok(format!("已删除 {}", selection.entity())),
        Ok(None) => CommandResponse::ok("没有选中对象"),
        Err(err) => CommandResponse::err(err.to_string()),
    }
}

fn focus_selection(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    editor.focus_on_selection();
    CommandResponse::ok("视口已聚焦当前选中对象")
}

fn rotate(editor: &mut Editor, clockwise: bool) -> CommandResponse {
    match editor.rotate_selected(clockwise) {
        Ok(Some(rotation)) => CommandResponse::ok(format!("当前角度 {rotation}°")),
        Ok(None) => CommandResponse::err("未选中家具"),
        Err(err) => CommandResponse::err(err.to_string()),
    }
}

fn rotate_left(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    rotate(editor, false)
}

fn rotate_right(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    rotate(editor, true)
}

fn zoom_in(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    CommandResponse::ok(format!("缩放 {:.2}", editor.zoom_in()))
}

fn zoom_out(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    CommandResponse::ok(format!("缩放 {:.2}", editor.zoom_out()))
}

fn reset_zoom(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    CommandResponse::ok(format!("缩放 {:.2}", editor.reset_zoom()))
}

fn set_zoom(request: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    match arg::<f64>(request, 0, "zoom") {
        Ok(zoom) => CommandResponse::ok(format!("缩放 {:.2}", editor.set_zoom(zoom))),
        Err(response) => response,
    }
}

fn fit_to_content(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    match editor.fit_to_content() {
        Some(zoom) => CommandResponse::ok(format!("已适配内容，缩放 {zoom:.2}")),
        None => CommandResponse::ok("文档为空"),
    }
}

fn toggle_grid(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    let shown = editor.toggle_grid();
    CommandResponse::ok(if shown { "网格已显示" } else { "网格已隐藏" })
}

fn toggle_snap(_: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    let enabled = editor.toggle_snap();
    CommandResponse::ok(if enabled {
        "网格吸附已开启"
    } else {
        "网格吸附已关闭"
    })
}

fn set_grid_size(request: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    let size = match arg::<f64>(request, 0, "grid_size") {
        Ok(size) => size,
        Err(response) => return response,
    };
    match editor.set_grid_size(size) {
        Ok(()) => CommandResponse::ok(format!("网格尺寸 {size}")),
        Err(err) => CommandResponse::err(err.to_string()),
    }
}

/// `place <preset> <x> <y>`
fn place(request: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    let key: String = match arg(request, 0, "preset") {
        Ok(key) => key,
        Err(response) => return response,
    };
    let Some(preset) = FurniturePreset::from_key(&key) else {
        return CommandResponse::err(format!("未知家具: {key}"));
    };
    let location = match point_arg(request, 1) {
        Ok(point) => point,
        Err(response) => return response,
    };
    match editor.place_preset(preset, location) {
        Ok(placement) => placement_response(placement, "放置"),
        Err(err) => CommandResponse::err(err.to_string()),
    }
}

/// `move <id> <x> <y>`
fn move_furniture(request: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    let parsed = arg::<u64>(request, 0, "id").and_then(|id| Ok((id, point_arg(request, 1)?)));
    let (id, to) = match parsed {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    match editor.move_furniture(EntityId::new(id), to) {
        Ok(placement) => placement_response(placement, "移动"),
        Err(err) => CommandResponse::err(err.to_string()),
    }
}

/// `select_at <x> <y>`
fn select_at(request: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    let point = match point_arg(request, 0) {
        Ok(point) => point,
        Err(response) => return response,
    };
    match editor.select_at(point) {
        Some(hit) => CommandResponse::ok(format!("已选中 {}", hit.entity())),
        None => CommandResponse::ok("未命中任何对象"),
    }
}

/// `add_wall <x1> <y1> <x2> <y2>`
fn add_wall(request: &CommandRequest, editor: &mut Editor) -> CommandResponse {
    let points = point_arg(request, 0).and_then(|start| Ok((start, point_arg(request, 2)?)));
    match points {
        Ok((start, end)) => {
            let id = editor.add_wall(start, end);
            CommandResponse::ok(format!("新增墙体 {id}"))
        }
        Err(response) => response,
    }
}
