use floorplan_core::document::{EntityId, FurnitureItem};
use floorplan_core::geometry::Bounds2D;

/// 基于轴对齐包围盒的重叠判定，不考虑旋转。
#[inline]
pub fn intersects(a: &FurnitureItem, b: &FurnitureItem) -> bool {
    a.bounds().intersects(&b.bounds())
}

/// 返回第一个与 `bounds` 重叠的家具，跳过 `skip` 中列出的 ID。线性扫描。
pub fn first_blocking<'a>(
    bounds: &Bounds2D,
    existing: &'a [FurnitureItem],
    skip: &[EntityId],
) -> Option<&'a FurnitureItem> {
    existing
        .iter()
        .filter(|item| !skip.contains(&item.id))
        .find(|item| item.bounds().intersects(bounds))
}

/// 候选家具是否与现有家具重叠。候选自身与 `excluding` 指定的 ID 不参与判定。
pub fn check_collision(
    candidate: &FurnitureItem,
    existing: &[FurnitureItem],
    excluding: Option<EntityId>,
) -> bool {
    find_collision(candidate, existing, excluding).is_some()
}

pub fn find_collision<'a>(
    candidate: &FurnitureItem,
    existing: &'a [FurnitureItem],
    excluding: Option<EntityId>,
) -> Option<&'a FurnitureItem> {
    let mut skip = vec![candidate.id];
    skip.extend(excluding);
    first_blocking(&candidate.bounds(), existing, &skip)
}
