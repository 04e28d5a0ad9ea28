use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::geometry::{Bounds2D, Point2, Size2, Vector2, segment_contains_point};
use crate::grid::{DEFAULT_GRID_SIZE, GridSettings};
use crate::material::MaterialLibrary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// JSON 数值可精确表示的最大 ID。
    pub const MAX: u64 = (1 << 53) - 1;

    #[inline]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// 提供原始数值，便于序列化或日志输出。
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    pub fn check_range(self) -> Result<(), ModelError> {
        if self.0 > Self::MAX {
            Err(ModelError::IdOutOfRange(self.0))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// sRGB 颜色，各分量取值 0..=1。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    #[serde(default = "Color::opaque")]
    pub opacity: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red,
            green,
            blue,
            opacity: 1.0,
        }
    }

    pub const fn with_opacity(self, opacity: f64) -> Self {
        Self { opacity, ..self }
    }

    fn opaque() -> f64 {
        1.0
    }

    /// 解析 `#RRGGBB` 或 `#RRGGBBAA`。
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return None;
        }
        let channel = |index: usize| -> Option<f64> {
            u8::from_str_radix(&digits[index..index + 2], 16)
                .ok()
                .map(|value| f64::from(value) / 255.0)
        };
        let mut color = Self::rgb(channel(0)?, channel(2)?, channel(4)?);
        if digits.len() == 8 {
            color.opacity = channel(6)?;
        }
        Some(color)
    }

    pub fn to_hex(&self) -> String {
        let byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        let mut hex = format!(
            "#{:02X}{:02X}{:02X}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        );
        if self.opacity < 1.0 {
            hex.push_str(&format!("{:02X}", byte(self.opacity)));
        }
        hex
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnit {
    #[default]
    #[serde(alias = "Imperial (ft/in)")]
    Imperial,
    #[serde(alias = "Metric (m/cm)")]
    Metric,
}

impl MeasurementUnit {
    pub fn display_unit(self) -> &'static str {
        match self {
            MeasurementUnit::Imperial => "ft",
            MeasurementUnit::Metric => "m",
        }
    }

    pub fn small_display_unit(self) -> &'static str {
        match self {
            MeasurementUnit::Imperial => "in",
            MeasurementUnit::Metric => "cm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallEndpoint {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DoorType {
    #[default]
    Single,
    Double,
    Sliding,
    Pocket,
    French,
    Bifold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DoorMaterial {
    #[default]
    Wood,
    Glass,
    Metal,
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandleType {
    Knob,
    #[default]
    Lever,
    Pull,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwingDirection {
    #[default]
    Inward,
    Outward,
    /// 推拉门、口袋门没有开启方向。
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorStyle {
    #[serde(rename = "type")]
    pub door_type: DoorType,
    pub material: DoorMaterial,
    pub color: Color,
    pub handle_type: HandleType,
    pub swing_direction: SwingDirection,
}

impl Default for DoorStyle {
    fn default() -> Self {
        Self {
            door_type: DoorType::Single,
            material: DoorMaterial::Wood,
            color: Color::rgb(0.55, 0.4, 0.26),
            handle_type: HandleType::Lever,
            swing_direction: SwingDirection::Inward,
        }
    }
}

impl DoorStyle {
    /// 推拉类门型强制无开启方向。
    pub fn normalized(mut self) -> Self {
        if matches!(self.door_type, DoorType::Sliding | DoorType::Pocket) {
            self.swing_direction = SwingDirection::None;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowType {
    Curtains,
    Blinds,
    Shades,
    Shutters,
    Valance,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreatmentPattern {
    #[default]
    Solid,
    Striped,
    Patterned,
    Sheer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowTreatment {
    #[serde(rename = "type")]
    pub window_type: WindowType,
    pub color: Color,
    pub pattern: TreatmentPattern,
}

impl Default for WindowTreatment {
    fn default() -> Self {
        Self {
            window_type: WindowType::None,
            color: Color::WHITE,
            pattern: TreatmentPattern::Solid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OpeningKind {
    Door { style: DoorStyle },
    Window { treatment: WindowTreatment },
}

/// 墙上的门窗开口。`position` 为开口中心沿墙长度的比例，取值 [0, 1]。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallOpening {
    pub kind: OpeningKind,
    pub position: f64,
    pub width: f64,
}

impl WallOpening {
    pub fn door(position: f64, width: f64) -> Self {
        Self {
            kind: OpeningKind::Door {
                style: DoorStyle::default(),
            },
            position,
            width,
        }
    }

    pub fn window(position: f64, width: f64) -> Self {
        Self {
            kind: OpeningKind::Window {
                treatment: WindowTreatment::default(),
            },
            position,
            width,
        }
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        matches!(self.kind, OpeningKind::Door { .. })
    }
}

/// 墙体：带厚度与高度的直线段，坐标为真实世界单位。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    pub id: EntityId,
    pub start_point: Point2,
    pub end_point: Point2,
    #[serde(default = "Wall::default_thickness")]
    pub thickness: f64,
    #[serde(default = "Wall::default_height")]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub openings: Vec<WallOpening>,
}

impl Wall {
    pub const DEFAULT_THICKNESS: f64 = 6.0;
    pub const DEFAULT_HEIGHT: f64 = 96.0;

    fn default_thickness() -> f64 {
        Self::DEFAULT_THICKNESS
    }

    fn default_height() -> f64 {
        Self::DEFAULT_HEIGHT
    }

    pub fn new(id: EntityId, start_point: Point2, end_point: Point2) -> Self {
        Self {
            id,
            start_point,
            end_point,
            thickness: Self::DEFAULT_THICKNESS,
            height: Self::DEFAULT_HEIGHT,
            material: None,
            color: None,
            openings: Vec::new(),
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start_point.distance(self.end_point)
    }

    /// 墙体方向角（弧度）。
    #[inline]
    pub fn angle(&self) -> f64 {
        let delta = self.start_point.vector_to(self.end_point);
        delta.y().atan2(delta.x())
    }

    #[inline]
    pub fn center(&self) -> Point2 {
        self.start_point.midpoint(self.end_point)
    }

    /// 端点范围向外扩展半个墙厚。
    pub fn bounds(&self) -> Bounds2D {
        let mut bounds = Bounds2D::empty();
        bounds.include_point(self.start_point);
        bounds.include_point(self.end_point);
        let half = self.thickness.max(0.0) * 0.5;
        Bounds2D::new(
            bounds.min().translate(Vector2::new(-half, -half)),
            bounds.max().translate(Vector2::new(half, half)),
        )
    }

    #[inline]
    pub fn endpoint(&self, which: WallEndpoint) -> Point2 {
        match which {
            WallEndpoint::Start => self.start_point,
            WallEndpoint::End => self.end_point,
        }
    }

    #[inline]
    pub fn set_endpoint(&mut self, which: WallEndpoint, point: Point2) {
        match which {
            WallEndpoint::Start => self.start_point = point,
            WallEndpoint::End => self.end_point = point,
        }
    }

    #[inline]
    pub fn is_near_start(&self, point: Point2, hit_radius: f64) -> bool {
        self.start_point.distance(point) <= hit_radius
    }

    #[inline]
    pub fn is_near_end(&self, point: Point2, hit_radius: f64) -> bool {
        self.end_point.distance(point) <= hit_radius
    }

    /// 返回命中的端点，起点优先。
    pub fn endpoint_near(&self, point: Point2, hit_radius: f64) -> Option<WallEndpoint> {
        if self.is_near_start(point, hit_radius) {
            Some(WallEndpoint::Start)
        } else if self.is_near_end(point, hit_radius) {
            Some(WallEndpoint::End)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_on_wall(&self, point: Point2, hit_radius: f64) -> bool {
        segment_contains_point(self.start_point, self.end_point, point, hit_radius)
    }

    pub fn move_by(&mut self, delta: Vector2) {
        self.start_point = self.start_point.translate(delta);
        self.end_point = self.end_point.translate(delta);
    }

    pub fn add_opening(&mut self, opening: WallOpening) -> Result<(), ModelError> {
        self.check_opening(&opening)?;
        self.openings.push(opening);
        Ok(())
    }

    /// 开口中心点在平面上的位置。
    pub fn opening_center(&self, opening: &WallOpening) -> Point2 {
        let along = self.start_point.vector_to(self.end_point);
        self.start_point.translate(along.scale(opening.position))
    }

    fn check_opening(&self, opening: &WallOpening) -> Result<(), ModelError> {
        if !(0.0..=1.0).contains(&opening.position) {
            return Err(ModelError::OpeningOutOfRange {
                wall: self.id.get(),
                position: opening.position,
            });
        }
        non_negative("opening width", opening.width)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        non_negative("wall thickness", self.thickness)?;
        non_negative("wall height", self.height)?;
        self.openings
            .iter()
            .try_for_each(|opening| self.check_opening(opening))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomType {
    Bedroom,
    Bathroom,
    Kitchen,
    LivingRoom,
    DiningRoom,
    Office,
    Hallway,
    Closet,
    Garage,
    #[default]
    Other,
}

impl RoomType {
    pub const ALL: [RoomType; 10] = [
        RoomType::Bedroom,
        RoomType::Bathroom,
        RoomType::Kitchen,
        RoomType::LivingRoom,
        RoomType::DiningRoom,
        RoomType::Office,
        RoomType::Hallway,
        RoomType::Closet,
        RoomType::Garage,
        RoomType::Other,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            RoomType::Bedroom => "Bedroom",
            RoomType::Bathroom => "Bathroom",
            RoomType::Kitchen => "Kitchen",
            RoomType::LivingRoom => "Living Room",
            RoomType::DiningRoom => "Dining Room",
            RoomType::Office => "Office",
            RoomType::Hallway => "Hallway",
            RoomType::Closet => "Closet",
            RoomType::Garage => "Garage",
            RoomType::Other => "Other",
        }
    }

    pub fn default_color(self) -> Color {
        match self {
            RoomType::LivingRoom => Color::rgb(0.0, 0.48, 1.0).with_opacity(0.2),
            RoomType::Bedroom => Color::rgb(0.69, 0.32, 0.87).with_opacity(0.2),
            RoomType::Kitchen => Color::rgb(0.2, 0.78, 0.35).with_opacity(0.2),
            RoomType::Bathroom => Color::rgb(0.2, 0.68, 0.9).with_opacity(0.2),
            RoomType::DiningRoom => Color::rgb(1.0, 0.58, 0.0).with_opacity(0.2),
            RoomType::Office => Color::rgb(1.0, 0.8, 0.0).with_opacity(0.2),
            RoomType::Hallway => Color::GRAY.with_opacity(0.1),
            RoomType::Closet | RoomType::Garage | RoomType::Other => Color::GRAY.with_opacity(0.2),
        }
    }
}

/// 房间通过墙体 ID 引用平面图中的墙，墙体本身由 `FloorPlan` 独占。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub room_type: RoomType,
    #[serde(default)]
    pub walls: Vec<EntityId>,
    #[serde(default)]
    pub area: f64,
    #[serde(default = "Room::default_color")]
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_material: Option<String>,
}

impl Room {
    pub fn new(id: EntityId, name: impl Into<String>, room_type: RoomType) -> Self {
        Self {
            id,
            name: name.into(),
            room_type,
            walls: Vec::new(),
            area: 0.0,
            color: room_type.default_color(),
            floor_material: None,
        }
    }

    fn default_color() -> Color {
        RoomType::Other.default_color()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FurnitureStyle {
    Modern,
    Traditional,
    Minimalist,
    Industrial,
    Scandinavian,
    Rustic,
    Contemporary,
}

/// 已放置的家具实例。`rotation` 以角度存储，几何计算时再转换为弧度。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureItem {
    pub id: EntityId,
    pub furniture_id: String,
    pub name: String,
    pub position: Point2,
    #[serde(default)]
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<FurnitureStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

impl FurnitureItem {
    pub fn new(
        id: EntityId,
        furniture_id: impl Into<String>,
        name: impl Into<String>,
        position: Point2,
        size: Size2,
    ) -> Self {
        Self {
            id,
            furniture_id: furniture_id.into(),
            name: name.into(),
            position,
            rotation: 0.0,
            width: size.width,
            height: size.height,
            style: None,
            color: None,
            custom_name: None,
        }
    }

    #[inline]
    pub fn size(&self) -> Size2 {
        Size2::new(self.width, self.height)
    }

    pub fn display_name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.name)
    }

    #[inline]
    pub fn rotation_radians(&self) -> f64 {
        self.rotation.to_radians()
    }

    /// 旋转指定角度，结果归一化到 [0, 360)。
    pub fn rotate_by(&mut self, degrees: f64) {
        self.rotation = (self.rotation + degrees).rem_euclid(360.0);
    }

    /// 以 `position` 为中心的轴对齐矩形，忽略旋转。
    #[inline]
    pub fn bounds(&self) -> Bounds2D {
        Bounds2D::from_center_size(self.position, self.size())
    }

    /// 旋转后的四个角点，顺序为左下、右下、右上、左上（局部坐标）。
    pub fn corners(&self) -> [Point2; 4] {
        let half_width = self.width * 0.5;
        let half_height = self.height * 0.5;
        let angle = self.rotation_radians();
        [
            Point2::new(-half_width, -half_height),
            Point2::new(half_width, -half_height),
            Point2::new(half_width, half_height),
            Point2::new(-half_width, half_height),
        ]
        .map(|corner| {
            let rotated = corner.rotate_around_origin(angle);
            self.position.translate(Vector2::from(rotated.as_vec2()))
        })
    }

    /// 判定点是否落在旋转后的矩形内。
    pub fn contains_point(&self, point: Point2) -> bool {
        let local = Point2::from_vec(point.as_vec2() - self.position.as_vec2())
            .rotate_around_origin(-self.rotation_radians());
        local.x().abs() <= self.width.abs() * 0.5 && local.y().abs() <= self.height.abs() * 0.5
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.id.check_range()?;
        non_negative("furniture width", self.width)?;
        non_negative("furniture height", self.height)
    }
}

/// 平面图聚合根：独占墙体、房间与家具集合，作为单个文档持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    name: String,
    scale: f64,
    unit: MeasurementUnit,
    #[serde(default = "FloorPlan::default_grid_size")]
    grid_size: f64,
    #[serde(default = "FloorPlan::default_show_grid")]
    show_grid: bool,
    #[serde(default)]
    walls: Vec<Wall>,
    #[serde(default)]
    rooms: Vec<Room>,
    #[serde(default)]
    furniture_items: Vec<FurnitureItem>,
    #[serde(default)]
    material_library: MaterialLibrary,
    #[serde(default)]
    next_id: u64,
}

impl Default for FloorPlan {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}

impl FloorPlan {
    pub const DEFAULT_NAME: &'static str = "Untitled Floor Plan";
    /// 默认每英寸 4 像素。
    pub const DEFAULT_SCALE: f64 = 4.0;

    fn default_grid_size() -> f64 {
        DEFAULT_GRID_SIZE
    }

    fn default_show_grid() -> bool {
        true
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            scale: Self::DEFAULT_SCALE,
            unit: MeasurementUnit::Imperial,
            grid_size: DEFAULT_GRID_SIZE,
            show_grid: true,
            walls: Vec::new(),
            rooms: Vec::new(),
            furniture_items: Vec::new(),
            material_library: MaterialLibrary::default(),
            next_id: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<(), ModelError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ModelError::InvalidScale(scale));
        }
        self.scale = scale;
        Ok(())
    }

    #[inline]
    pub fn unit(&self) -> MeasurementUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: MeasurementUnit) {
        self.unit = unit;
    }

    #[inline]
    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    #[inline]
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.show_grid = show;
    }

    /// 应用网格设置中属于文档的部分（网格尺寸与显示开关）。
    pub fn apply_grid(&mut self, grid: &GridSettings) -> Result<(), ModelError> {
        grid.validate()?;
        self.grid_size = grid.grid_size;
        self.show_grid = grid.show_grid;
        Ok(())
    }

    #[inline]
    pub fn material_library(&self) -> &MaterialLibrary {
        &self.material_library
    }

    #[inline]
    pub fn material_library_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.material_library
    }

    /// 分配一个新的实体 ID，计数器单调递增且不复用。校验通过的文档计数器不超过 `EntityId::MAX`。
    pub fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// 解码后调用：保证计数器大于文档中已有的任何 ID。
    pub fn reconcile_ids(&mut self) -> Result<(), ModelError> {
        if let Some(max_id) = self.entity_ids().max() {
            let after = max_id
                .checked_add(1)
                .ok_or(ModelError::IdOutOfRange(max_id))?;
            self.next_id = self.next_id.max(after);
        }
        Ok(())
    }

    /// 墙体、房间与家具共用一个 ID 空间。
    pub fn contains_id(&self, id: EntityId) -> bool {
        self.entity_ids().any(|raw| raw == id.get())
    }

    fn entity_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.walls
            .iter()
            .map(|wall| wall.id.get())
            .chain(self.rooms.iter().map(|room| room.id.get()))
            .chain(self.furniture_items.iter().map(|item| item.id.get()))
    }

    // ---- 墙体 ----

    pub fn add_wall(&mut self, start: Point2, end: Point2) -> EntityId {
        let id = self.allocate_id();
        self.walls.push(Wall::new(id, start, end));
        id
    }

    #[inline]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    #[inline]
    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn wall(&self, id: EntityId) -> Option<&Wall> {
        self.walls.iter().find(|wall| wall.id == id)
    }

    pub fn wall_mut(&mut self, id: EntityId) -> Option<&mut Wall> {
        self.walls.iter_mut().find(|wall| wall.id == id)
    }

    /// 按 ID 替换墙体，返回是否找到。
    pub fn update_wall(&mut self, wall: Wall) -> bool {
        match self.wall_mut(wall.id) {
            Some(slot) => {
                *slot = wall;
                true
            }
            None => false,
        }
    }

    /// 删除墙体，并从所有房间的引用列表中移除。
    pub fn remove_wall(&mut self, id: EntityId) -> Option<Wall> {
        let index = self.walls.iter().position(|wall| wall.id == id)?;
        let wall = self.walls.remove(index);
        for room in &mut self.rooms {
            room.walls.retain(|wall_id| *wall_id != id);
        }
        Some(wall)
    }

    // ---- 房间 ----

    pub fn add_room(&mut self, name: impl Into<String>, room_type: RoomType) -> EntityId {
        let id = self.allocate_id();
        self.rooms.push(Room::new(id, name, room_type));
        id
    }

    #[inline]
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn room(&self, id: EntityId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn room_mut(&mut self, id: EntityId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| room.id == id)
    }

    pub fn remove_room(&mut self, id: EntityId) -> Option<Room> {
        let index = self.rooms.iter().position(|room| room.id == id)?;
        Some(self.rooms.remove(index))
    }

    /// 将墙体挂接到房间并重新计算面积。重复挂接不会产生重复引用。
    pub fn attach_wall_to_room(&mut self, room: EntityId, wall: EntityId) -> Result<(), ModelError> {
        if self.wall(wall).is_none() {
            return Err(ModelError::WallNotFound(wall.get()));
        }
        let target = self
            .room_mut(room)
            .ok_or(ModelError::RoomNotFound(room.get()))?;
        if !target.walls.contains(&wall) {
            target.walls.push(wall);
        }
        self.recompute_room_area(room)?;
        Ok(())
    }

    /// 房间引用墙体端点的包围盒，没有墙体时返回 `None`。
    pub fn room_bounds(&self, id: EntityId) -> Option<Bounds2D> {
        let room = self.room(id)?;
        let mut bounds = Bounds2D::empty();
        for wall in room.walls.iter().filter_map(|wall_id| self.wall(*wall_id)) {
            bounds.include_point(wall.start_point);
            bounds.include_point(wall.end_point);
        }
        if bounds.is_empty() { None } else { Some(bounds) }
    }

    /// 以包围盒面积更新房间面积，返回新面积。
    pub fn recompute_room_area(&mut self, id: EntityId) -> Result<f64, ModelError> {
        let area = self
            .room_bounds(id)
            .map(|bounds| bounds.width() * bounds.height())
            .unwrap_or(0.0);
        let room = self.room_mut(id).ok_or(ModelError::RoomNotFound(id.get()))?;
        room.area = area;
        Ok(area)
    }

    // ---- 家具 ----

    #[inline]
    pub fn furniture_items(&self) -> &[FurnitureItem] {
        &self.furniture_items
    }

    pub fn furniture(&self, id: EntityId) -> Option<&FurnitureItem> {
        self.furniture_items.iter().find(|item| item.id == id)
    }

    pub fn furniture_mut(&mut self, id: EntityId) -> Option<&mut FurnitureItem> {
        self.furniture_items.iter_mut().find(|item| item.id == id)
    }

    pub fn furniture_index(&self, id: EntityId) -> Option<usize> {
        self.furniture_items.iter().position(|item| item.id == id)
    }

    /// 追加家具；ID 已存在时不做修改并返回 `false`。
    pub fn insert_furniture(&mut self, item: FurnitureItem) -> bool {
        let index = self.furniture_items.len();
        self.insert_furniture_at(index, item)
    }

    /// 在指定位置插入家具，越界时追加到末尾；ID 已存在时返回 `false`。
    pub fn insert_furniture_at(&mut self, index: usize, item: FurnitureItem) -> bool {
        if self.furniture_index(item.id).is_some() {
            return false;
        }
        let index = index.min(self.furniture_items.len());
        self.furniture_items.insert(index, item);
        true
    }

    /// 删除家具，返回其原索引与值。
    pub fn remove_furniture(&mut self, id: EntityId) -> Option<(usize, FurnitureItem)> {
        let index = self.furniture_index(id)?;
        Some((index, self.furniture_items.remove(index)))
    }

    pub fn set_furniture_position(&mut self, id: EntityId, position: Point2) -> bool {
        match self.furniture_mut(id) {
            Some(item) => {
                item.position = position;
                true
            }
            None => false,
        }
    }

    /// 清空墙体、房间与家具，保留文档元数据与材质库。
    pub fn clear_all(&mut self) {
        self.walls.clear();
        self.rooms.clear();
        self.furniture_items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.rooms.is_empty() && self.furniture_items.is_empty()
    }

    /// 墙体与家具角点的整体范围。
    pub fn bounds(&self) -> Option<Bounds2D> {
        let mut bounds = Bounds2D::empty();
        for wall in &self.walls {
            bounds.include_bounds(&wall.bounds());
        }
        for item in &self.furniture_items {
            for corner in item.corners() {
                bounds.include_point(corner);
            }
        }
        if bounds.is_empty() { None } else { Some(bounds) }
    }

    // ---- 单位换算 ----

    #[inline]
    pub fn to_real_world(&self, screen_distance: f64) -> f64 {
        screen_distance / self.scale
    }

    #[inline]
    pub fn to_screen(&self, real_world_distance: f64) -> f64 {
        real_world_distance * self.scale
    }

    /// 格式化以英寸表示的长度。
    pub fn format_measurement(&self, inches: f64) -> String {
        match self.unit {
            MeasurementUnit::Imperial => {
                let feet = (inches / 12.0).trunc() as i64;
                let remaining = inches % 12.0;
                if feet > 0 {
                    format!("{feet}' {remaining:.1}\"")
                } else {
                    format!("{remaining:.1}\"")
                }
            }
            MeasurementUnit::Metric => {
                let centimeters = inches * 2.54;
                let meters = centimeters / 100.0;
                if meters >= 1.0 {
                    format!("{meters:.2} m")
                } else {
                    format!("{centimeters:.1} cm")
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ModelError::InvalidScale(self.scale));
        }
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(ModelError::InvalidGridSize(self.grid_size));
        }
        for wall in &self.walls {
            wall.validate()?;
        }
        for room in &self.rooms {
            non_negative("room area", room.area)?;
        }
        for item in &self.furniture_items {
            item.validate()?;
        }

        let mut seen = HashSet::new();
        for raw in self.entity_ids() {
            EntityId(raw).check_range()?;
            if !seen.insert(raw) {
                return Err(ModelError::DuplicateId(raw));
            }
        }
        if self.next_id > EntityId::MAX {
            return Err(ModelError::IdOutOfRange(self.next_id));
        }
        Ok(())
    }
}

fn non_negative(what: &'static str, value: f64) -> Result<(), ModelError> {
    if value < 0.0 || value.is_nan() {
        Err(ModelError::NegativeDimension { what, value })
    } else {
        Ok(())
    }
}
