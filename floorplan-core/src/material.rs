use serde::{Deserialize, Serialize};

use crate::document::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WallMaterialType {
    Paint,
    Wallpaper,
    Tile,
    WoodPaneling,
    Brick,
    Stone,
    Fabric,
    Metal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WallFinish {
    #[default]
    Matte,
    Eggshell,
    Satin,
    SemiGloss,
    Gloss,
    Metallic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WallPattern {
    Solid,
    Stripes,
    Dots,
    Geometric,
    Floral,
    Textured,
}

/// 墙面饰面材质（涂料、墙纸、瓷砖等）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallMaterial {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub material_type: WallMaterialType,
    pub color: Color,
    #[serde(default)]
    pub finish: WallFinish,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<WallPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_texture: Option<String>,
}

impl WallMaterial {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        material_type: WallMaterialType,
        color: Color,
        finish: WallFinish,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            material_type,
            color,
            finish,
            pattern: None,
            custom_texture: None,
        }
    }

    pub fn with_pattern(mut self, pattern: WallPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FloorType {
    Hardwood,
    Laminate,
    Tile,
    Carpet,
    Vinyl,
    Concrete,
    Stone,
    Bamboo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FloorPattern {
    #[default]
    Solid,
    WoodGrain,
    Tiles,
    Herringbone,
    Chevron,
    BasketWeave,
}

/// 木地板与瓷砖的铺设方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FloorDirection {
    #[default]
    Horizontal,
    Vertical,
    Diagonal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorMaterial {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub floor_type: FloorType,
    pub color: Color,
    #[serde(default)]
    pub pattern: FloorPattern,
    #[serde(default)]
    pub direction: FloorDirection,
}

impl FloorMaterial {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        floor_type: FloorType,
        color: Color,
        pattern: FloorPattern,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            floor_type,
            color,
            pattern,
            direction: FloorDirection::default(),
        }
    }
}

/// 文档级材质库。`Default` 返回内置预设，`empty` 返回空库。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLibrary {
    #[serde(default)]
    pub wall_materials: Vec<WallMaterial>,
    #[serde(default)]
    pub floor_materials: Vec<FloorMaterial>,
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self {
            wall_materials: default_wall_materials(),
            floor_materials: default_floor_materials(),
        }
    }
}

impl MaterialLibrary {
    pub fn empty() -> Self {
        Self {
            wall_materials: Vec::new(),
            floor_materials: Vec::new(),
        }
    }

    /// 同 ID 的材质会被替换而非重复添加。
    pub fn add_wall_material(&mut self, material: WallMaterial) {
        match self.wall_materials.iter_mut().find(|m| m.id == material.id) {
            Some(existing) => *existing = material,
            None => self.wall_materials.push(material),
        }
    }

    pub fn add_floor_material(&mut self, material: FloorMaterial) {
        match self.floor_materials.iter_mut().find(|m| m.id == material.id) {
            Some(existing) => *existing = material,
            None => self.floor_materials.push(material),
        }
    }

    pub fn remove_wall_material(&mut self, id: &str) -> Option<WallMaterial> {
        let index = self.wall_materials.iter().position(|m| m.id == id)?;
        Some(self.wall_materials.remove(index))
    }

    pub fn remove_floor_material(&mut self, id: &str) -> Option<FloorMaterial> {
        let index = self.floor_materials.iter().position(|m| m.id == id)?;
        Some(self.floor_materials.remove(index))
    }

    pub fn wall_material(&self, id: &str) -> Option<&WallMaterial> {
        self.wall_materials.iter().find(|m| m.id == id)
    }

    pub fn floor_material(&self, id: &str) -> Option<&FloorMaterial> {
        self.floor_materials.iter().find(|m| m.id == id)
    }
}

pub fn default_wall_materials() -> Vec<WallMaterial> {
    use WallFinish::*;
    use WallMaterialType::*;
    vec![
        WallMaterial::new("white-matte", "White Matte", Paint, Color::WHITE, Matte),
        WallMaterial::new("warm-beige", "Warm Beige", Paint, Color::rgb(0.96, 0.92, 0.84), Eggshell),
        WallMaterial::new("light-gray", "Light Gray", Paint, Color::rgb(0.85, 0.85, 0.85), Satin),
        WallMaterial::new("navy-blue", "Navy Blue", Paint, Color::rgb(0.0, 0.2, 0.4), Matte),
        WallMaterial::new("sage-green", "Sage Green", Paint, Color::rgb(0.7, 0.8, 0.7), Eggshell),
        WallMaterial::new("white-subway-tile", "White Subway Tile", Tile, Color::WHITE, Gloss),
        WallMaterial::new("exposed-brick", "Exposed Brick", Brick, Color::rgb(0.7, 0.4, 0.3), Matte)
            .with_pattern(WallPattern::Textured),
        WallMaterial::new(
            "light-oak-paneling",
            "Light Oak Paneling",
            WoodPaneling,
            Color::rgb(0.82, 0.71, 0.55),
            Satin,
        ),
    ]
}

pub fn default_floor_materials() -> Vec<FloorMaterial> {
    use FloorPattern::*;
    use FloorType::*;
    vec![
        FloorMaterial::new("light-oak", "Light Oak Hardwood", Hardwood, Color::rgb(0.82, 0.71, 0.55), WoodGrain),
        FloorMaterial::new("dark-walnut", "Dark Walnut", Hardwood, Color::rgb(0.4, 0.3, 0.2), WoodGrain),
        FloorMaterial::new("gray-laminate", "Gray Laminate", Laminate, Color::rgb(0.6, 0.6, 0.6), WoodGrain),
        FloorMaterial::new("white-marble", "White Marble Tile", Tile, Color::WHITE, Tiles),
        FloorMaterial::new("beige-carpet", "Beige Carpet", Carpet, Color::rgb(0.9, 0.85, 0.75), Solid),
        FloorMaterial::new("gray-concrete", "Gray Concrete", Concrete, Color::rgb(0.5, 0.5, 0.5), Solid),
        FloorMaterial::new("natural-bamboo", "Natural Bamboo", Bamboo, Color::rgb(0.85, 0.75, 0.55), WoodGrain),
    ]
}
