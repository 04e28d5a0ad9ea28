use floorplan_core::document::{EntityId, FloorPlan, FurnitureItem, Wall, WallEndpoint};
use floorplan_core::geometry::Point2;

/// 命中半径（缩放为 1 时的真实世界单位），实际半径随缩放反比变化。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerance {
    pub endpoint: f64,
    pub body: f64,
}

impl HitTolerance {
    pub const DEFAULT_ENDPOINT: f64 = 20.0;
    pub const DEFAULT_BODY: f64 = 15.0;

    /// 按缩放倍数换算实际半径；非法缩放按 1 处理。
    pub fn scaled(&self, zoom: f64) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            1.0
        };
        Self {
            endpoint: self.endpoint / zoom,
            body: self.body / zoom,
        }
    }
}

impl Default for HitTolerance {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT,
            body: Self::DEFAULT_BODY,
        }
    }
}

/// 拾取结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    WallEndpoint {
        wall: EntityId,
        endpoint: WallEndpoint,
    },
    WallBody(EntityId),
    Furniture(EntityId),
}

impl Pick {
    #[inline]
    pub fn entity(&self) -> EntityId {
        match *self {
            Pick::WallEndpoint { wall, .. } => wall,
            Pick::WallBody(wall) => wall,
            Pick::Furniture(id) => id,
        }
    }
}

/// 第一个端点落在半径内的墙，按插入顺序。
fn find_wall_endpoint_at(point: Point2, walls: &[Wall], radius: f64) -> Option<Pick> {
    walls.iter().find_map(|wall| {
        wall.endpoint_near(point, radius)
            .map(|endpoint| Pick::WallEndpoint {
                wall: wall.id,
                endpoint,
            })
    })
}

fn find_wall_body_at(point: Point2, walls: &[Wall], radius: f64) -> Option<Pick> {
    walls
        .iter()
        .find(|wall| wall.is_on_wall(point, radius))
        .map(|wall| Pick::WallBody(wall.id))
}

/// 返回第一个包含该点的家具（考虑旋转）。
pub fn find_furniture_at(point: Point2, items: &[FurnitureItem]) -> Option<Pick> {
    items
        .iter()
        .find(|item| item.contains_point(point))
        .map(|item| Pick::Furniture(item.id))
}

/// 平面图整体拾取：墙端点优先，其次家具，最后墙身。同一类内按插入顺序取第一个命中。
pub fn find_entity_at(
    point: Point2,
    plan: &FloorPlan,
    tolerance: HitTolerance,
    zoom: f64,
) -> Option<Pick> {
    let radii = tolerance.scaled(zoom);
    find_wall_endpoint_at(point, plan.walls(), radii.endpoint)
        .or_else(|| find_furniture_at(point, plan.furniture_items()))
        .or_else(|| find_wall_body_at(point, plan.walls(), radii.body))
}
