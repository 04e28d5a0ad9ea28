use serde::{Deserialize, Serialize};

use crate::document::{EntityId, FurnitureItem};
use crate::geometry::{Point2, Size2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FurnitureCategory {
    Seating,
    Tables,
    Bedroom,
    Storage,
}

impl FurnitureCategory {
    pub fn label(self) -> &'static str {
        match self {
            FurnitureCategory::Seating => "Seating",
            FurnitureCategory::Tables => "Tables",
            FurnitureCategory::Bedroom => "Bedroom",
            FurnitureCategory::Storage => "Storage",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [
            FurnitureCategory::Seating,
            FurnitureCategory::Tables,
            FurnitureCategory::Bedroom,
            FurnitureCategory::Storage,
        ]
        .into_iter()
        .find(|category| category.label().eq_ignore_ascii_case(label))
    }
}

/// 家具面板中的预设条目。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FurniturePreset {
    Chair,
    Table,
    Bed,
    Sofa,
    Desk,
    Cabinet,
}

impl FurniturePreset {
    pub const ALL: [FurniturePreset; 6] = [
        FurniturePreset::Chair,
        FurniturePreset::Table,
        FurniturePreset::Bed,
        FurniturePreset::Sofa,
        FurniturePreset::Desk,
        FurniturePreset::Cabinet,
    ];

    /// 目录键，写入 `FurnitureItem::furniture_id`。
    pub fn key(self) -> &'static str {
        match self {
            FurniturePreset::Chair => "chair",
            FurniturePreset::Table => "table",
            FurniturePreset::Bed => "bed",
            FurniturePreset::Sofa => "sofa",
            FurniturePreset::Desk => "desk",
            FurniturePreset::Cabinet => "cabinet",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.key() == key)
    }

    pub fn default_size(self) -> Size2 {
        match self {
            FurniturePreset::Chair => Size2::new(50.0, 50.0),
            FurniturePreset::Table => Size2::new(100.0, 60.0),
            FurniturePreset::Bed => Size2::new(80.0, 120.0),
            FurniturePreset::Sofa => Size2::new(120.0, 60.0),
            FurniturePreset::Desk => Size2::new(100.0, 50.0),
            FurniturePreset::Cabinet => Size2::new(60.0, 40.0),
        }
    }

    pub fn category(self) -> FurnitureCategory {
        match self {
            FurniturePreset::Chair | FurniturePreset::Sofa => FurnitureCategory::Seating,
            FurniturePreset::Table | FurniturePreset::Desk => FurnitureCategory::Tables,
            FurniturePreset::Bed => FurnitureCategory::Bedroom,
            FurniturePreset::Cabinet => FurnitureCategory::Storage,
        }
    }

    pub fn to_drag_data(self) -> FurnitureDragData {
        let size = self.default_size();
        FurnitureDragData {
            furniture_id: self.key().to_string(),
            name: self.key().to_string(),
            width: size.width,
            height: size.height,
            category: self.category().label().to_string(),
        }
    }
}

/// 家具面板拖放到画布时携带的负载。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureDragData {
    pub furniture_id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub category: String,
}

impl FurnitureDragData {
    #[inline]
    pub fn size(&self) -> Size2 {
        Size2::new(self.width, self.height)
    }
}

impl FurnitureItem {
    /// 以拖放负载实例化家具，旋转角为 0。
    pub fn from_drag_data(id: EntityId, payload: &FurnitureDragData, position: Point2) -> Self {
        FurnitureItem::new(
            id,
            payload.furniture_id.clone(),
            payload.name.clone(),
            position,
            payload.size(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_keys_round_trip() {
        for preset in FurniturePreset::ALL {
            assert_eq!(FurniturePreset::from_key(preset.key()), Some(preset));
        }
        assert_eq!(FurniturePreset::from_key("piano"), None);
    }

    #[test]
    fn drag_data_builds_item() {
        let payload = FurniturePreset::Bed.to_drag_data();
        assert_eq!(payload.category, "Bedroom");
        assert_eq!(
            FurnitureCategory::from_label(&payload.category),
            Some(FurnitureCategory::Bedroom)
        );

        let item = FurnitureItem::from_drag_data(EntityId::new(4), &payload, Point2::new(40.0, 60.0));
        assert_eq!(item.furniture_id, "bed");
        assert_eq!(item.size(), Size2::new(80.0, 120.0));
        assert_eq!(item.rotation, 0.0);
    }

    #[test]
    fn drag_data_uses_camel_case_fields() {
        let json = serde_json::to_value(FurniturePreset::Chair.to_drag_data()).unwrap();
        assert_eq!(json["furnitureId"], "chair");
        assert_eq!(json["width"], 50.0);
    }
}
