use std::fmt;

use floorplan_core::catalog::{FurnitureDragData, FurniturePreset};
use floorplan_core::document::{
    EntityId, FloorPlan, FurnitureItem, Room, RoomType, Wall, WallEndpoint, WallOpening,
};
use floorplan_core::geometry::{Bounds2D, Point2, Vector2};
use floorplan_core::grid::GridSettings;
use tracing::{debug, info, warn};

use crate::collision;
use crate::errors::EngineError;
use crate::history::{FurnitureCommand, History};
use crate::pick::{self, Pick};
use crate::settings::EditorSettings;
use crate::viewport::ViewportState;

/// 内容适配时留出的边距比例。
const FIT_MARGIN: f64 = 0.9;

/// 当前选中对象。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Wall(EntityId),
    Furniture(EntityId),
    Room(EntityId),
}

impl Selection {
    #[inline]
    pub fn entity(&self) -> EntityId {
        match *self {
            Selection::Wall(id) | Selection::Furniture(id) | Selection::Room(id) => id,
        }
    }
}

impl From<Pick> for Selection {
    fn from(pick: Pick) -> Self {
        match pick {
            Pick::WallEndpoint { wall, .. } | Pick::WallBody(wall) => Selection::Wall(wall),
            Pick::Furniture(id) => Selection::Furniture(id),
        }
    }
}

/// 已提交到文档的变更，按发生顺序推送给订阅者。
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    PlanLoaded,
    FurnitureAdded(EntityId),
    FurnitureRemoved(EntityId),
    FurnitureMoved { id: EntityId, position: Point2 },
    FurnitureRotated { id: EntityId, rotation: f64 },
    WallAdded(EntityId),
    WallRemoved(EntityId),
    WallChanged(EntityId),
    RoomAdded(EntityId),
    RoomRemoved(EntityId),
    RoomChanged(EntityId),
    Undone,
    Redone,
    GridChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&EditorEvent)>;

#[derive(Default)]
struct Listeners {
    next: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// 放置类操作的结果。碰撞被拒绝不是错误，文档保持不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Placed(EntityId),
    Rejected { blocking: EntityId },
}

impl Placement {
    #[inline]
    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed(_))
    }
}

/// 拖拽或拖放过程中的预览，不写入文档。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPreview {
    pub position: Point2,
    pub collides: bool,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    id: EntityId,
    origin: Point2,
    translation: Vector2,
}

#[derive(Debug, Clone, Copy)]
struct WallDraft {
    start: Point2,
    end: Option<Point2>,
}

#[derive(Debug, Clone, Copy)]
pub struct DemoEntities {
    pub walls: [EntityId; 4],
    pub room: EntityId,
    pub sofa: EntityId,
    pub table: EntityId,
    pub chair: EntityId,
}

/// 编辑会话：独占平面图文档，并维护选中、视口、撤销历史和拖拽/画墙的暂存状态。
/// 暂存状态只在提交时写入文档，取消不会留下任何痕迹。
#[derive(Debug)]
pub struct Editor {
    plan: FloorPlan,
    settings: EditorSettings,
    history: History,
    selection: Option<Selection>,
    viewport: ViewportState,
    drag: Option<DragState>,
    wall_draft: Option<WallDraft>,
    listeners: Listeners,
}

impl Editor {
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_plan(FloorPlan::default(), settings)
    }

    pub fn with_plan(mut plan: FloorPlan, settings: EditorSettings) -> Self {
        if let Err(err) = plan.apply_grid(&settings.grid) {
            warn!(error = %err, "网格设置无效，沿用文档网格");
        }
        let mut editor = Self {
            plan: FloorPlan::default(),
            history: History::with_limit(settings.max_history),
            settings,
            selection: None,
            viewport: ViewportState::default(),
            drag: None,
            wall_draft: None,
            listeners: Listeners::default(),
        };
        editor.load_plan(plan);
        editor
    }

    /// 替换当前文档，清空历史、选中与暂存状态，并将视口对准内容中心。
    pub fn load_plan(&mut self, plan: FloorPlan) {
        self.plan = plan;
        let grid = GridSettings {
            grid_size: self.plan.grid_size(),
            show_grid: self.plan.show_grid(),
            snap_to_grid: self.settings.grid.snap_to_grid,
        };
        if grid.validate().is_ok() {
            self.settings.grid = grid;
        }
        self.history.clear();
        self.selection = None;
        self.drag = None;
        self.wall_draft = None;

        let size = self.viewport.size;
        self.viewport = ViewportState {
            zoom: self.settings.clamp_zoom(ViewportState::DEFAULT_ZOOM),
            size,
            ..ViewportState::default()
        };
        if let Some(bounds) = self.plan.bounds() {
            self.viewport.center = bounds.center();
        }

        info!(
            name = self.plan.name(),
            walls = self.plan.wall_count(),
            furniture = self.plan.furniture_items().len(),
            "已载入平面图"
        );
        self.notify(EditorEvent::PlanLoaded);
    }

    #[inline]
    pub fn plan(&self) -> &FloorPlan {
        &self.plan
    }

    /// 取出文档，编辑会话随之结束。
    pub fn into_plan(self) -> FloorPlan {
        self.plan
    }

    #[inline]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    #[inline]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn allocate_id(&mut self) -> EntityId {
        self.plan.allocate_id()
    }

    #[inline]
    pub fn snap(&self, point: Point2) -> Point2 {
        self.settings.grid.snap_point(point)
    }

    // ---- 家具 ----

    /// 以撤销命令加入家具，位置不做吸附。ID 应由 `allocate_id` 分配。
    pub fn add_furniture(&mut self, item: FurnitureItem) -> Result<Placement, EngineError> {
        item.validate()?;
        if self.plan.contains_id(item.id) {
            return Err(EngineError::DuplicateEntity(item.id.get()));
        }
        if let Some(blocking) =
            collision::find_collision(&item, self.plan.furniture_items(), None).map(|b| b.id)
        {
            debug!(id = item.id.get(), blocking = blocking.get(), "家具放置与现有家具重叠");
            return Ok(Placement::Rejected { blocking });
        }
        let id = item.id;
        self.history.execute(FurnitureCommand::add(item), &mut self.plan);
        self.plan.reconcile_ids()?;
        self.notify(EditorEvent::FurnitureAdded(id));
        Ok(Placement::Placed(id))
    }

    /// 以目录预设在指定位置放置家具。
    pub fn place_preset(
        &mut self,
        preset: FurniturePreset,
        location: Point2,
    ) -> Result<Placement, EngineError> {
        self.drop_furniture(&preset.to_drag_data(), location)
    }

    /// 处理家具面板的拖放：吸附落点、检测碰撞，通过后以撤销命令加入文档。
    /// 被拒绝的拖放不消耗实体 ID。
    pub fn drop_furniture(
        &mut self,
        payload: &FurnitureDragData,
        location: Point2,
    ) -> Result<Placement, EngineError> {
        let position = self.snap(location);
        let footprint = Bounds2D::from_center_size(position, payload.size());
        let mut item = FurnitureItem::from_drag_data(EntityId::new(0), payload, position);
        item.validate()?;
        if let Some(blocking) =
            collision::first_blocking(&footprint, self.plan.furniture_items(), &[]).map(|b| b.id)
        {
            debug!(
                furniture = payload.furniture_id.as_str(),
                blocking = blocking.get(),
                "拖放位置被占用"
            );
            return Ok(Placement::Rejected { blocking });
        }

        let id = self.plan.allocate_id();
        item.id = id;
        self.history.execute(FurnitureCommand::add(item), &mut self.plan);
        self.notify(EditorEvent::FurnitureAdded(id));
        Ok(Placement::Placed(id))
    }

    /// 拖放悬停时的预览：吸附后的位置以及是否会被拒绝。
    pub fn preview_drop(&self, payload: &FurnitureDragData, location: Point2) -> DragPreview {
        let position = self.snap(location);
        let footprint = Bounds2D::from_center_size(position, payload.size());
        DragPreview {
            position,
            collides: collision::first_blocking(&footprint, self.plan.furniture_items(), &[])
                .is_some(),
        }
    }

    pub fn remove_furniture(&mut self, id: EntityId) -> Result<FurnitureItem, EngineError> {
        let command =
            FurnitureCommand::remove(&self.plan, id).ok_or(EngineError::EntityNotFound(id.get()))?;
        self.history.execute(command, &mut self.plan);
        let removed = match self.history.last_done() {
            Some(FurnitureCommand::Remove { item, .. }) => item.clone(),
            _ => return Err(EngineError::EntityNotFound(id.get())),
        };
        if self.selection == Some(Selection::Furniture(id)) {
            self.selection = None;
        }
        if self.drag.is_some_and(|drag| drag.id == id) {
            self.drag = None;
        }
        self.notify(EditorEvent::FurnitureRemoved(id));
        Ok(removed)
    }

    /// 将家具移动到吸附后的目标位置；与其他家具重叠时拒绝，文档不变。
    pub fn move_furniture(&mut self, id: EntityId, to: Point2) -> Result<Placement, EngineError> {
        let target = self.snap(to);
        self.commit_move(id, target)
    }

    fn commit_move(&mut self, id: EntityId, target: Point2) -> Result<Placement, EngineError> {
        let mut candidate = self
            .plan
            .furniture(id)
            .cloned()
            .ok_or(EngineError::EntityNotFound(id.get()))?;
        let from = candidate.position;
        candidate.position = target;

        if let Some(blocking) =
            collision::find_collision(&candidate, self.plan.furniture_items(), Some(id))
                .map(|b| b.id)
        {
            debug!(id = id.get(), blocking = blocking.get(), "移动目标与其他家具重叠");
            return Ok(Placement::Rejected { blocking });
        }
        if from == target {
            return Ok(Placement::Placed(id));
        }

        let command = FurnitureCommand::Move { id, from, to: target };
        self.history.execute(command, &mut self.plan);
        self.notify(EditorEvent::FurnitureMoved {
            id,
            position: target,
        });
        Ok(Placement::Placed(id))
    }

    /// 直接旋转家具（不进入撤销历史），返回新的角度。
    pub fn rotate_furniture(&mut self, id: EntityId, degrees: f64) -> Result<f64, EngineError> {
        let item = self
            .plan
            .furniture_mut(id)
            .ok_or(EngineError::EntityNotFound(id.get()))?;
        item.rotate_by(degrees);
        let rotation = item.rotation;
        self.notify(EditorEvent::FurnitureRotated { id, rotation });
        Ok(rotation)
    }

    /// 按配置步长旋转当前选中的家具；`clockwise` 为 `false` 时逆向旋转。
    /// 未选中家具时返回 `None`。
    pub fn rotate_selected(&mut self, clockwise: bool) -> Result<Option<f64>, EngineError> {
        let Some(Selection::Furniture(id)) = self.selection else {
            return Ok(None);
        };
        let step = if clockwise {
            self.settings.rotation_step
        } else {
            -self.settings.rotation_step
        };
        self.rotate_furniture(id, step).map(Some)
    }

    // ---- 拖拽暂存 ----

    pub fn begin_drag(&mut self, id: EntityId) -> Result<(), EngineError> {
        let origin = self
            .plan
            .furniture(id)
            .map(|item| item.position)
            .ok_or(EngineError::EntityNotFound(id.get()))?;
        self.drag = Some(DragState {
            id,
            origin,
            translation: Vector2::ZERO,
        });
        self.selection = Some(Selection::Furniture(id));
        Ok(())
    }

    /// 更新拖拽位移（相对拖拽起点），返回吸附后的预览。
    pub fn drag_to(&mut self, translation: Vector2) -> Result<DragPreview, EngineError> {
        let drag = self.drag.as_mut().ok_or(EngineError::NoDragInProgress)?;
        drag.translation = translation;
        let drag = *drag;
        self.drag_preview_for(drag)
    }

    pub fn drag_preview(&self) -> Option<DragPreview> {
        let drag = self.drag?;
        self.drag_preview_for(drag).ok()
    }

    fn drag_preview_for(&self, drag: DragState) -> Result<DragPreview, EngineError> {
        let mut candidate = self
            .plan
            .furniture(drag.id)
            .cloned()
            .ok_or(EngineError::EntityNotFound(drag.id.get()))?;
        candidate.position = self.snap(drag.origin.translate(drag.translation));
        Ok(DragPreview {
            position: candidate.position,
            collides: collision::check_collision(
                &candidate,
                self.plan.furniture_items(),
                Some(drag.id),
            ),
        })
    }

    /// 结束拖拽并提交移动。重叠时拒绝，家具留在原位。
    pub fn end_drag(&mut self) -> Result<Placement, EngineError> {
        let drag = self.drag.take().ok_or(EngineError::NoDragInProgress)?;
        let target = self.snap(drag.origin.translate(drag.translation));
        self.commit_move(drag.id, target)
    }

    /// 放弃拖拽，返回此前是否存在拖拽。
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // ---- 画墙暂存 ----

    pub fn begin_wall(&mut self, point: Point2) {
        self.wall_draft = Some(WallDraft {
            start: self.snap(point),
            end: None,
        });
    }

    pub fn update_wall(&mut self, point: Point2) -> Result<(), EngineError> {
        let end = self.snap(point);
        let draft = self
            .wall_draft
            .as_mut()
            .ok_or(EngineError::NoWallInProgress)?;
        draft.end = Some(end);
        Ok(())
    }

    /// 当前绘制中的墙段（起点，终点）。尚未移动时终点为 `None`。
    pub fn wall_draft(&self) -> Option<(Point2, Option<Point2>)> {
        self.wall_draft.map(|draft| (draft.start, draft.end))
    }

    /// 提交绘制中的墙。长度不超过最小墙长时不创建，返回 `Ok(None)`。
    pub fn finish_wall(&mut self) -> Result<Option<EntityId>, EngineError> {
        let draft = self.wall_draft.take().ok_or(EngineError::NoWallInProgress)?;
        let Some(end) = draft.end else {
            return Ok(None);
        };
        if draft.start.distance(end) <= self.settings.min_wall_length {
            debug!(length = draft.start.distance(end), "墙体过短，已丢弃");
            return Ok(None);
        }
        Ok(Some(self.add_wall(draft.start, end)))
    }

    pub fn cancel_wall(&mut self) -> bool {
        self.wall_draft.take().is_some()
    }

    // ---- 墙体 ----

    pub fn add_wall(&mut self, start: Point2, end: Point2) -> EntityId {
        let id = self.plan.add_wall(start, end);
        debug!(id = id.get(), "新增墙体");
        self.notify(EditorEvent::WallAdded(id));
        id
    }

    pub fn remove_wall(&mut self, id: EntityId) -> Result<Wall, EngineError> {
        let affected = self.rooms_referencing(id);
        let wall = self
            .plan
            .remove_wall(id)
            .ok_or(EngineError::WallNotFound(id.get()))?;
        if self.selection == Some(Selection::Wall(id)) {
            self.selection = None;
        }
        self.notify(EditorEvent::WallRemoved(id));
        self.refresh_rooms(&affected)?;
        Ok(wall)
    }

    pub fn move_wall(&mut self, id: EntityId, delta: Vector2) -> Result<(), EngineError> {
        self.plan
            .wall_mut(id)
            .ok_or(EngineError::WallNotFound(id.get()))?
            .move_by(delta);
        self.wall_changed(id)
    }

    /// 拖动墙端点到吸附后的位置。
    pub fn move_wall_endpoint(
        &mut self,
        id: EntityId,
        which: WallEndpoint,
        point: Point2,
    ) -> Result<(), EngineError> {
        let point = self.snap(point);
        self.plan
            .wall_mut(id)
            .ok_or(EngineError::WallNotFound(id.get()))?
            .set_endpoint(which, point);
        self.wall_changed(id)
    }

    pub fn add_opening(&mut self, wall: EntityId, opening: WallOpening) -> Result<(), EngineError> {
        self.plan
            .wall_mut(wall)
            .ok_or(EngineError::WallNotFound(wall.get()))?
            .add_opening(opening)?;
        self.notify(EditorEvent::WallChanged(wall));
        Ok(())
    }

    fn wall_changed(&mut self, id: EntityId) -> Result<(), EngineError> {
        self.notify(EditorEvent::WallChanged(id));
        let affected = self.rooms_referencing(id);
        self.refresh_rooms(&affected)
    }

    fn rooms_referencing(&self, wall: EntityId) -> Vec<EntityId> {
        self.plan
            .rooms()
            .filter(|room| room.walls.contains(&wall))
            .map(|room| room.id)
            .collect()
    }

    fn refresh_rooms(&mut self, rooms: &[EntityId]) -> Result<(), EngineError> {
        for room in rooms {
            self.plan.recompute_room_area(*room)?;
            self.notify(EditorEvent::RoomChanged(*room));
        }
        Ok(())
    }

    // ---- 房间 ----

    pub fn add_room(&mut self, name: impl Into<String>, room_type: RoomType) -> EntityId {
        let id = self.plan.add_room(name, room_type);
        self.notify(EditorEvent::RoomAdded(id));
        id
    }

    pub fn remove_room(&mut self, id: EntityId) -> Result<Room, EngineError> {
        let room = self
            .plan
            .remove_room(id)
            .ok_or(EngineError::RoomNotFound(id.get()))?;
        if self.selection == Some(Selection::Room(id)) {
            self.selection = None;
        }
        self.notify(EditorEvent::RoomRemoved(id));
        Ok(room)
    }

    /// 将墙体挂接到房间，返回重新计算后的面积。
    pub fn attach_wall_to_room(&mut self, room: EntityId, wall: EntityId) -> Result<f64, EngineError> {
        if self.plan.room(room).is_none() {
            return Err(EngineError::RoomNotFound(room.get()));
        }
        if self.plan.wall(wall).is_none() {
            return Err(EngineError::WallNotFound(wall.get()));
        }
        self.plan.attach_wall_to_room(room, wall)?;
        self.notify(EditorEvent::RoomChanged(room));
        Ok(self.plan.room(room).map(|room| room.area).unwrap_or_default())
    }

    // ---- 拾取与选中 ----

    /// 拾取光标下的实体：墙端点优先，其次家具，最后墙身。命中半径随缩放反比变化。
    pub fn pick(&self, point: Point2) -> Option<Pick> {
        pick::find_entity_at(
            point,
            &self.plan,
            self.settings.hit_tolerance,
            self.viewport.zoom,
        )
    }

    /// 拾取并选中；未命中时清空选中。
    pub fn select_at(&mut self, point: Point2) -> Option<Pick> {
        let hit = self.pick(point);
        self.selection = hit.map(Selection::from);
        hit
    }

    pub fn select(&mut self, selection: impl Into<Selection>) -> Result<(), EngineError> {
        let selection = selection.into();
        let exists = match selection {
            Selection::Wall(id) => self.plan.wall(id).is_some(),
            Selection::Furniture(id) => self.plan.furniture(id).is_some(),
            Selection::Room(id) => self.plan.room(id).is_some(),
        };
        if !exists {
            return Err(EngineError::EntityNotFound(selection.entity().get()));
        }
        self.selection = Some(selection);
        Ok(())
    }

    #[inline]
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// 删除选中对象，返回被删除的选中项；没有选中时返回 `None`。家具删除可撤销。
    pub fn delete_selected(&mut self) -> Result<Option<Selection>, EngineError> {
        let Some(selection) = self.selection else {
            return Ok(None);
        };
        match selection {
            Selection::Furniture(id) => {
                self.remove_furniture(id)?;
            }
            Selection::Wall(id) => {
                self.remove_wall(id)?;
            }
            Selection::Room(id) => {
                self.remove_room(id)?;
            }
        }
        self.selection = None;
        Ok(Some(selection))
    }

    pub fn selection_bounds(&self) -> Option<Bounds2D> {
        match self.selection? {
            Selection::Wall(id) => self.plan.wall(id).map(Wall::bounds),
            Selection::Furniture(id) => self.plan.furniture(id).map(|item| {
                let mut bounds = Bounds2D::empty();
                for corner in item.corners() {
                    bounds.include_point(corner);
                }
                bounds
            }),
            Selection::Room(id) => self.plan.room_bounds(id),
        }
    }

    /// 聚焦当前选中对象，若为空则退化到整个文档范围。
    pub fn focus_on_selection(&mut self) {
        let target = self.selection_bounds().or_else(|| self.plan.bounds());
        if let Some(bounds) = target {
            self.viewport.center = bounds.center();
        }
    }

    // ---- 视口 ----

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.viewport.zoom + self.settings.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.viewport.zoom - self.settings.zoom_step)
    }

    /// 设置缩放倍数（自动限制在配置范围内），返回实际生效的值。
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.viewport.zoom = self.settings.clamp_zoom(zoom);
        self.viewport.zoom
    }

    pub fn reset_zoom(&mut self) -> f64 {
        self.set_zoom(ViewportState::DEFAULT_ZOOM)
    }

    pub fn pan(&mut self, delta: Vector2) {
        self.viewport.pan(delta);
    }

    pub fn set_view_size(&mut self, width: f64, height: f64) {
        self.viewport.size.width = width.max(0.0);
        self.viewport.size.height = height.max(0.0);
    }

    /// 将视口中心对准内容并调整缩放，使全部墙体与家具落在画布内。
    /// 文档为空时返回 `None`，视口不变。
    pub fn fit_to_content(&mut self) -> Option<f64> {
        let bounds = self.plan.bounds()?;
        self.viewport.center = bounds.center();

        let scale = self.plan.scale();
        let size = self.viewport.size;
        let fit = |view: f64, content: f64| {
            (content > 0.0 && view > 0.0).then(|| view * FIT_MARGIN / (content * scale))
        };
        let zoom = match (
            fit(size.width, bounds.width()),
            fit(size.height, bounds.height()),
        ) {
            (Some(x), Some(y)) => x.min(y),
            (Some(z), None) | (None, Some(z)) => z,
            (None, None) => self.viewport.zoom,
        };
        Some(self.set_zoom(zoom))
    }

    // ---- 历史 ----

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.plan) {
            return false;
        }
        self.after_history_step();
        self.notify(EditorEvent::Undone);
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.plan) {
            return false;
        }
        self.after_history_step();
        self.notify(EditorEvent::Redone);
        true
    }

    fn after_history_step(&mut self) {
        self.drag = None;
        if let Some(Selection::Furniture(id)) = self.selection {
            if self.plan.furniture(id).is_none() {
                self.selection = None;
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- 网格 ----

    pub fn set_grid_size(&mut self, grid_size: f64) -> Result<(), EngineError> {
        let grid = GridSettings {
            grid_size,
            ..self.settings.grid
        };
        self.plan.apply_grid(&grid)?;
        self.settings.grid = grid;
        self.notify(EditorEvent::GridChanged);
        Ok(())
    }

    /// 切换网格显示，返回切换后的状态。
    pub fn toggle_grid(&mut self) -> bool {
        self.settings.grid.show_grid = !self.settings.grid.show_grid;
        self.plan.set_show_grid(self.settings.grid.show_grid);
        self.notify(EditorEvent::GridChanged);
        self.settings.grid.show_grid
    }

    /// 切换网格吸附，返回切换后的状态。吸附开关只属于会话，不写入文档。
    pub fn toggle_snap(&mut self) -> bool {
        self.settings.grid.snap_to_grid = !self.settings.grid.snap_to_grid;
        self.settings.grid.snap_to_grid
    }

    // ---- 订阅 ----

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        let id = SubscriptionId(self.listeners.next);
        self.listeners.next += 1;
        self.listeners.entries.push((id, Box::new(listener)));
        id
    }

    /// 取消订阅，返回该订阅此前是否存在。
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.entries.len();
        self.listeners.entries.retain(|(entry, _)| *entry != id);
        self.listeners.entries.len() != before
    }

    fn notify(&mut self, event: EditorEvent) {
        for (_, listener) in &mut self.listeners.entries {
            listener(&event);
        }
    }

    /// 以演示户型替换当前文档：四面墙围成的客厅（含一门一窗）与三件家具。
    pub fn populate_demo(&mut self) -> DemoEntities {
        let mut plan = FloorPlan::new("Demo Apartment");
        plan.set_unit(self.plan.unit());
        if let Err(err) = plan.set_scale(self.plan.scale()) {
            warn!(error = %err, "沿用默认比例");
        }
        if let Err(err) = plan.apply_grid(&self.settings.grid) {
            warn!(error = %err, "沿用默认网格");
        }

        let corners = [
            Point2::new(0.0, 0.0),
            Point2::new(240.0, 0.0),
            Point2::new(240.0, 180.0),
            Point2::new(0.0, 180.0),
        ];
        let walls = [0, 1, 2, 3].map(|i| plan.add_wall(corners[i], corners[(i + 1) % 4]));
        let room = plan.add_room("Living Room", RoomType::LivingRoom);
        for wall in walls {
            if let Err(err) = plan.attach_wall_to_room(room, wall) {
                warn!(error = %err, "演示房间挂接墙体失败");
            }
        }
        let openings = [
            (walls[0], WallOpening::door(0.5, 36.0)),
            (walls[2], WallOpening::window(0.5, 48.0)),
        ];
        for (wall_id, opening) in openings {
            if let Some(wall) = plan.wall_mut(wall_id) {
                if let Err(err) = wall.add_opening(opening) {
                    warn!(error = %err, "演示墙体添加门窗失败");
                }
            }
        }

        let mut place = |preset: FurniturePreset, position: Point2| {
            let id = plan.allocate_id();
            plan.insert_furniture(FurnitureItem::from_drag_data(
                id,
                &preset.to_drag_data(),
                position,
            ));
            id
        };
        let sofa = place(FurniturePreset::Sofa, Point2::new(120.0, 150.0));
        let table = place(FurniturePreset::Table, Point2::new(120.0, 80.0));
        let chair = place(FurniturePreset::Chair, Point2::new(40.0, 40.0));

        self.load_plan(plan);
        let ids = DemoEntities {
            walls,
            room,
            sofa,
            table,
            chair,
        };
        debug!(
            room = ids.room.get(),
            sofa = ids.sofa.get(),
            table = ids.table.get(),
            chair = ids.chair.get(),
            "已创建演示户型"
        );
        ids
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use floorplan_core::geometry::Size2;

    use super::*;

    fn item(editor: &mut Editor, x: f64, y: f64, width: f64, height: f64) -> FurnitureItem {
        let id = editor.allocate_id();
        FurnitureItem::new(id, "table", "Table", Point2::new(x, y), Size2::new(width, height))
    }

    #[test]
    fn demo_population_creates_entities() {
        let mut editor = Editor::default();
        let ids = editor.populate_demo();
        assert_eq!(editor.plan().wall_count(), 4);
        assert_eq!(editor.plan().furniture_items().len(), 3);
        let room = editor.plan().room(ids.room).unwrap();
        assert_eq!(room.walls, ids.walls.to_vec());
        assert!((room.area - 240.0 * 180.0).abs() < 1e-9);
        assert!(editor.plan().wall(ids.walls[0]).unwrap().openings[0].is_door());
        let window_wall = editor.plan().wall(ids.walls[2]).unwrap();
        assert_eq!(window_wall.openings.len(), 1);
        assert!(!window_wall.openings[0].is_door());
        assert!(editor.plan().validate().is_ok());
        assert!(!editor.can_undo());
    }

    #[test]
    fn drop_snaps_and_rejects_overlap() {
        let mut editor = Editor::default();
        let payload = FurniturePreset::Chair.to_drag_data();

        let placed = editor.drop_furniture(&payload, Point2::new(104.0, 93.0)).unwrap();
        let Placement::Placed(id) = placed else {
            panic!("first drop should be placed");
        };
        assert_eq!(editor.plan().furniture(id).unwrap().position, Point2::new(100.0, 100.0));

        let ids_before = editor.plan().clone();
        let rejected = editor.drop_furniture(&payload, Point2::new(121.0, 100.0)).unwrap();
        assert_eq!(rejected, Placement::Rejected { blocking: id });
        assert_eq!(editor.plan(), &ids_before);
        assert!(editor.preview_drop(&payload, Point2::new(121.0, 100.0)).collides);
        assert!(!editor.preview_drop(&payload, Point2::new(300.0, 100.0)).collides);
    }

    #[test]
    fn drag_is_staged_until_end() {
        let mut editor = Editor::default();
        let a = item(&mut editor, 0.0, 0.0, 40.0, 40.0);
        let b = item(&mut editor, 200.0, 0.0, 40.0, 40.0);
        let (a_id, b_id) = (a.id, b.id);
        editor.add_furniture(a).unwrap();
        editor.add_furniture(b).unwrap();

        editor.begin_drag(a_id).unwrap();
        let preview = editor.drag_to(Vector2::new(187.0, 3.0)).unwrap();
        assert_eq!(preview.position, Point2::new(180.0, 0.0));
        assert!(preview.collides);
        // 预览不修改文档
        assert_eq!(editor.plan().furniture(a_id).unwrap().position, Point2::ORIGIN);

        assert_eq!(editor.end_drag().unwrap(), Placement::Rejected { blocking: b_id });
        assert_eq!(editor.plan().furniture(a_id).unwrap().position, Point2::ORIGIN);
        assert!(matches!(editor.end_drag(), Err(EngineError::NoDragInProgress)));

        editor.begin_drag(a_id).unwrap();
        editor.drag_to(Vector2::new(58.0, 62.0)).unwrap();
        assert!(editor.end_drag().unwrap().is_placed());
        assert_eq!(editor.plan().furniture(a_id).unwrap().position, Point2::new(60.0, 60.0));

        assert!(editor.undo());
        assert_eq!(editor.plan().furniture(a_id).unwrap().position, Point2::ORIGIN);

        editor.begin_drag(a_id).unwrap();
        editor.drag_to(Vector2::new(100.0, 100.0)).unwrap();
        assert!(editor.cancel_drag());
        assert!(!editor.cancel_drag());
        assert_eq!(editor.plan().furniture(a_id).unwrap().position, Point2::ORIGIN);
    }

    #[test]
    fn moving_onto_self_footprint_is_allowed() {
        let mut editor = Editor::default();
        let a = item(&mut editor, 0.0, 0.0, 100.0, 100.0);
        let id = a.id;
        editor.add_furniture(a).unwrap();
        let outcome = editor.move_furniture(id, Point2::new(20.0, 0.0)).unwrap();
        assert_eq!(outcome, Placement::Placed(id));
        assert_eq!(editor.history().undo_len(), 2);
    }

    #[test]
    fn add_furniture_rejects_duplicates() {
        let mut editor = Editor::default();
        let a = item(&mut editor, 0.0, 0.0, 10.0, 10.0);
        editor.add_furniture(a.clone()).unwrap();
        let mut copy = a.clone();
        copy.position = Point2::new(500.0, 500.0);
        assert_eq!(
            editor.add_furniture(copy),
            Err(EngineError::DuplicateEntity(a.id.get()))
        );
    }

    #[test]
    fn furniture_cannot_reuse_a_wall_id() {
        let mut editor = Editor::default();
        let ids = editor.populate_demo();
        let clash = FurnitureItem::new(
            ids.walls[1],
            "chair",
            "Chair",
            Point2::new(500.0, 500.0),
            Size2::new(50.0, 50.0),
        );
        assert_eq!(
            editor.add_furniture(clash),
            Err(EngineError::DuplicateEntity(ids.walls[1].get()))
        );

        // 删除后撤销，家具数量与删除前一致
        let before = editor.plan().furniture_items().len();
        editor.remove_furniture(ids.table).unwrap();
        assert!(editor.undo());
        assert_eq!(editor.plan().furniture_items().len(), before);
        assert!(editor.plan().validate().is_ok());
    }

    #[test]
    fn invalid_drop_does_not_consume_an_id() {
        let mut editor = Editor::default();
        let mut payload = FurniturePreset::Chair.to_drag_data();
        payload.width = -5.0;
        let before = editor.plan().clone();
        assert!(matches!(
            editor.drop_furniture(&payload, Point2::new(100.0, 100.0)),
            Err(EngineError::Model(_))
        ));
        assert_eq!(editor.plan(), &before);

        let expected = editor.plan().clone().allocate_id();
        let placed = editor
            .drop_furniture(&FurniturePreset::Chair.to_drag_data(), Point2::new(100.0, 100.0))
            .unwrap();
        assert_eq!(placed, Placement::Placed(expected));
    }

    #[test]
    fn wall_drawing_respects_min_length() {
        let mut editor = Editor::default();
        assert!(matches!(
            editor.update_wall(Point2::ORIGIN),
            Err(EngineError::NoWallInProgress)
        ));

        editor.begin_wall(Point2::new(2.0, 3.0));
        editor.update_wall(Point2::new(8.0, 1.0)).unwrap();
        assert_eq!(editor.finish_wall().unwrap(), None);

        editor.begin_wall(Point2::new(2.0, 3.0));
        editor.update_wall(Point2::new(118.0, -4.0)).unwrap();
        assert_eq!(
            editor.wall_draft(),
            Some((Point2::ORIGIN, Some(Point2::new(120.0, 0.0))))
        );
        let id = editor.finish_wall().unwrap().unwrap();
        let wall = editor.plan().wall(id).unwrap();
        assert_eq!(wall.start_point, Point2::ORIGIN);
        assert_eq!(wall.end_point, Point2::new(120.0, 0.0));
        assert!(editor.wall_draft().is_none());

        editor.begin_wall(Point2::ORIGIN);
        assert!(editor.cancel_wall());
        assert_eq!(editor.plan().wall_count(), 1);
    }

    #[test]
    fn wall_edits_refresh_room_area() {
        let mut editor = Editor::default();
        let ids = editor.populate_demo();
        editor
            .move_wall_endpoint(ids.walls[1], WallEndpoint::End, Point2::new(300.0, 180.0))
            .unwrap();
        let area = editor.plan().room(ids.room).unwrap().area;
        assert!((area - 300.0 * 180.0).abs() < 1e-9);

        editor.remove_wall(ids.walls[1]).unwrap();
        let room = editor.plan().room(ids.room).unwrap();
        assert_eq!(room.walls.len(), 3);
        assert!(matches!(
            editor.move_wall(ids.walls[1], Vector2::new(1.0, 0.0)),
            Err(EngineError::WallNotFound(_))
        ));
    }

    #[test]
    fn pick_prefers_endpoint_then_furniture_then_body() {
        let mut editor = Editor::default();
        let ids = editor.populate_demo();
        assert_eq!(
            editor.pick(Point2::new(3.0, 2.0)),
            Some(Pick::WallEndpoint {
                wall: ids.walls[0],
                endpoint: WallEndpoint::Start
            })
        );
        assert_eq!(editor.pick(Point2::new(40.0, 40.0)), Some(Pick::Furniture(ids.chair)));
        assert_eq!(editor.pick(Point2::new(200.0, 4.0)), Some(Pick::WallBody(ids.walls[0])));

        // 放大后命中半径缩小
        editor.set_zoom(3.0);
        assert_eq!(editor.pick(Point2::new(200.0, 12.0)), None);
    }

    #[test]
    fn select_and_delete_furniture_is_undoable() {
        let mut editor = Editor::default();
        let ids = editor.populate_demo();
        assert_eq!(editor.select_at(Point2::new(120.0, 80.0)), Some(Pick::Furniture(ids.table)));
        assert_eq!(editor.selection(), Some(Selection::Furniture(ids.table)));

        let order_before: Vec<_> = editor.plan().furniture_items().to_vec();
        assert_eq!(
            editor.delete_selected().unwrap(),
            Some(Selection::Furniture(ids.table))
        );
        assert!(editor.plan().furniture(ids.table).is_none());
        assert_eq!(editor.selection(), None);
        assert_eq!(editor.delete_selected().unwrap(), None);

        assert!(editor.undo());
        assert_eq!(editor.plan().furniture_items(), order_before.as_slice());

        assert!(editor.select(Selection::Room(EntityId::new(999))).is_err());
        editor.select(Selection::Room(ids.room)).unwrap();
        editor.delete_selected().unwrap();
        assert!(editor.plan().room(ids.room).is_none());
    }

    #[test]
    fn rotation_uses_configured_step() {
        let mut editor = Editor::default();
        let ids = editor.populate_demo();
        assert_eq!(editor.rotate_selected(true).unwrap(), None);

        editor.select(Pick::Furniture(ids.sofa)).unwrap();
        assert_eq!(editor.rotate_selected(true).unwrap(), Some(90.0));
        assert_eq!(editor.rotate_selected(false).unwrap(), Some(0.0));
        assert_eq!(editor.rotate_selected(false).unwrap(), Some(270.0));
        // 旋转不进入撤销历史
        assert!(!editor.can_undo());
    }

    #[test]
    fn zoom_steps_and_clamps() {
        let mut editor = Editor::default();
        assert_eq!(editor.zoom_in(), 1.25);
        editor.set_zoom(2.9);
        assert_eq!(editor.zoom_in(), 3.0);
        assert_eq!(editor.zoom_in(), 3.0);
        editor.set_zoom(0.3);
        assert_eq!(editor.zoom_out(), 0.25);
        assert_eq!(editor.reset_zoom(), 1.0);
    }

    #[test]
    fn fit_to_content_centers_plan() {
        let mut editor = Editor::default();
        assert_eq!(editor.fit_to_content(), None);

        editor.add_wall(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0));
        editor.set_view_size(800.0, 600.0);
        let zoom = editor.fit_to_content().unwrap();
        let viewport = editor.viewport();
        assert!((viewport.center.x() - 50.0).abs() < 1e-9);
        assert!(viewport.center.y().abs() < 1e-9);
        // 内容 106x6（含墙厚），比例 4，宽度方向决定缩放
        assert!((zoom - 800.0 * 0.9 / (106.0 * 4.0)).abs() < 1e-9);
        assert_eq!(viewport.zoom, zoom);
    }

    #[test]
    fn grid_toggles_and_size() {
        let mut editor = Editor::default();
        assert!(!editor.toggle_grid());
        assert!(!editor.plan().show_grid());
        assert!(!editor.toggle_snap());
        assert_eq!(editor.snap(Point2::new(7.0, 7.0)), Point2::new(7.0, 7.0));
        editor.toggle_snap();

        assert!(editor.set_grid_size(0.0).is_err());
        editor.set_grid_size(12.0).unwrap();
        assert_eq!(editor.plan().grid_size(), 12.0);
        assert_eq!(editor.snap(Point2::new(7.0, 5.0)), Point2::new(12.0, 0.0));
    }

    #[test]
    fn load_plan_resets_session_state() {
        let mut editor = Editor::default();
        let ids = editor.populate_demo();
        editor.select(Pick::Furniture(ids.chair)).unwrap();
        assert!(
            editor
                .move_furniture(ids.chair, Point2::new(20.0, 100.0))
                .unwrap()
                .is_placed()
        );
        editor.begin_wall(Point2::ORIGIN);
        editor.set_zoom(2.0);
        assert!(editor.can_undo());

        let mut plan = FloorPlan::new("Empty");
        plan.add_wall(Point2::new(-10.0, -10.0), Point2::new(10.0, 10.0));
        editor.load_plan(plan);

        assert!(!editor.can_undo());
        assert_eq!(editor.selection(), None);
        assert!(editor.wall_draft().is_none());
        assert_eq!(editor.viewport().zoom, 1.0);
        assert_eq!(editor.viewport().center, Point2::ORIGIN);
    }

    #[test]
    fn subscribers_receive_committed_changes() {
        let mut editor = Editor::default();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription = editor.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let chair = editor
            .place_preset(FurniturePreset::Chair, Point2::new(0.0, 0.0))
            .unwrap();
        let Placement::Placed(id) = chair else {
            panic!("chair should be placed");
        };
        editor.undo();
        editor.begin_drag(id).ok();
        assert_eq!(
            events.borrow().as_slice(),
            &[EditorEvent::FurnitureAdded(id), EditorEvent::Undone]
        );

        assert!(editor.unsubscribe(subscription));
        assert!(!editor.unsubscribe(subscription));
        editor.redo();
        assert_eq!(events.borrow().len(), 2);
    }
}
