pub mod catalog;
pub mod document;
pub mod material;

pub mod errors {
    use thiserror::Error;

    /// 模型层校验错误。编辑器与 IO 层在提交或加载前调用校验。
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum ModelError {
        #[error("scale must be a positive finite number, got {0}")]
        InvalidScale(f64),
        #[error("grid size must be a positive finite number, got {0}")]
        InvalidGridSize(f64),
        #[error("opening on wall {wall} has position {position} outside [0, 1]")]
        OpeningOutOfRange { wall: u64, position: f64 },
        #[error("{what} must not be negative, got {value}")]
        NegativeDimension { what: &'static str, value: f64 },
        #[error("wall with id {0} not found")]
        WallNotFound(u64),
        #[error("room with id {0} not found")]
        RoomNotFound(u64),
        #[error("entity id {0} is used more than once")]
        DuplicateId(u64),
        #[error("entity id {0} exceeds the supported id range")]
        IdOutOfRange(u64),
    }
}

pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 坐标持久化格式：显式 `{x, y}` 对象，避免依赖具体数学库的序列化布局。
    #[derive(Debug, Clone, Copy, Serialize, Deserialize)]
    struct XyRecord {
        x: f64,
        y: f64,
    }

    /// 二维点，内部以 `glam::DVec2` 表示，单位为真实世界长度（默认英寸）。
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    #[serde(from = "XyRecord", into = "XyRecord")]
    pub struct Point2(pub DVec2);

    impl Point2 {
        pub const ORIGIN: Point2 = Point2(DVec2::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        #[inline]
        pub fn midpoint(self, other: Point2) -> Point2 {
            Self((self.0 + other.0) * 0.5)
        }

        /// 将点视为相对原点的向量并旋转 `angle` 弧度。
        #[inline]
        pub fn rotate_around_origin(self, angle: f64) -> Point2 {
            Self(DVec2::from_angle(angle).rotate(self.0))
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    impl From<XyRecord> for Point2 {
        fn from(value: XyRecord) -> Self {
            Self::new(value.x, value.y)
        }
    }

    impl From<Point2> for XyRecord {
        fn from(value: Point2) -> Self {
            Self {
                x: value.x(),
                y: value.y(),
            }
        }
    }

    /// 二维向量，用于拖拽位移与墙体平移。
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    #[serde(from = "XyRecord", into = "XyRecord")]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        pub const ZERO: Vector2 = Vector2(DVec2::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        #[inline]
        pub fn scale(self, factor: f64) -> Self {
            Self(self.0 * factor)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    impl From<XyRecord> for Vector2 {
        fn from(value: XyRecord) -> Self {
            Self::new(value.x, value.y)
        }
    }

    impl From<Vector2> for XyRecord {
        fn from(value: Vector2) -> Self {
            Self {
                x: value.x(),
                y: value.y(),
            }
        }
    }

    /// 宽高尺寸，供网格吸附与家具尺寸使用。
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Size2 {
        pub width: f64,
        pub height: f64,
    }

    impl Size2 {
        #[inline]
        pub fn new(width: f64, height: f64) -> Self {
            Self { width, height }
        }
    }

    /// 轴对齐边界框，用于家具碰撞、房间范围与视口适配。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        /// 以中心点与宽高构造矩形，负尺寸按绝对值处理。
        pub fn from_center_size(center: Point2, size: Size2) -> Self {
            let half = DVec2::new(size.width.abs(), size.height.abs()) * 0.5;
            Self {
                min: Point2(center.0 - half),
                max: Point2(center.0 + half),
            }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn width(&self) -> f64 {
            if self.is_empty() {
                0.0
            } else {
                self.max.x() - self.min.x()
            }
        }

        #[inline]
        pub fn height(&self) -> f64 {
            if self.is_empty() {
                0.0
            } else {
                self.max.y() - self.min.y()
            }
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            self.min.midpoint(self.max)
        }

        #[inline]
        pub fn contains_point(&self, point: Point2) -> bool {
            !self.is_empty()
                && point.x() >= self.min.x()
                && point.x() <= self.max.x()
                && point.y() >= self.min.y()
                && point.y() <= self.max.y()
        }

        /// 判定两个矩形是否重叠。仅共享边界（面积为零的交集）不算重叠。
        pub fn intersects(&self, other: &Bounds2D) -> bool {
            if self.is_empty() || other.is_empty() {
                return false;
            }
            self.min.x() < other.max.x()
                && other.min.x() < self.max.x()
                && self.min.y() < other.max.y()
                && other.min.y() < self.max.y()
        }
    }

    #[inline]
    pub fn distance(a: Point2, b: Point2) -> f64 {
        a.distance(b)
    }

    /// 点到线段的最短距离。线段退化为一点时退化为点距离。
    pub fn distance_to_segment(start: Point2, end: Point2, point: Point2) -> f64 {
        let segment = end.as_vec2() - start.as_vec2();
        let length_squared = segment.length_squared();
        if length_squared == 0.0 {
            return start.distance(point);
        }
        let t = ((point.as_vec2() - start.as_vec2()).dot(segment) / length_squared).clamp(0.0, 1.0);
        let projection = Point2(start.as_vec2() + segment * t);
        projection.distance(point)
    }

    /// 投影参数截断到 [0, 1] 后，判断点到投影点的距离是否不超过容差。
    #[inline]
    pub fn segment_contains_point(start: Point2, end: Point2, point: Point2, tolerance: f64) -> bool {
        distance_to_segment(start, end, point) <= tolerance
    }

    #[inline]
    pub fn rotate_around_origin(point: Point2, angle: f64) -> Point2 {
        point.rotate_around_origin(angle)
    }

}

pub mod grid {
    use serde::{Deserialize, Serialize};

    use crate::errors::ModelError;
    use crate::geometry::{Point2, Size2};

    pub const DEFAULT_GRID_SIZE: f64 = 20.0;

    /// 将数值吸附到最近的 `grid_size` 整数倍。调用方需保证 `grid_size > 0`。
    #[inline]
    pub fn snap(value: f64, grid_size: f64) -> f64 {
        (value / grid_size).round() * grid_size
    }

    /// 网格设置。关闭吸附时所有吸附函数原样返回输入。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GridSettings {
        pub grid_size: f64,
        pub show_grid: bool,
        pub snap_to_grid: bool,
    }

    impl GridSettings {
        pub fn new(grid_size: f64) -> Result<Self, ModelError> {
            let settings = Self {
                grid_size,
                ..Self::default()
            };
            settings.validate()?;
            Ok(settings)
        }

        pub fn validate(&self) -> Result<(), ModelError> {
            if self.grid_size.is_finite() && self.grid_size > 0.0 {
                Ok(())
            } else {
                Err(ModelError::InvalidGridSize(self.grid_size))
            }
        }

        #[inline]
        pub fn snap_value(&self, value: f64) -> f64 {
            if self.snap_to_grid {
                snap(value, self.grid_size)
            } else {
                value
            }
        }

        #[inline]
        pub fn snap_point(&self, point: Point2) -> Point2 {
            Point2::new(self.snap_value(point.x()), self.snap_value(point.y()))
        }

        #[inline]
        pub fn snap_size(&self, size: Size2) -> Size2 {
            Size2::new(self.snap_value(size.width), self.snap_value(size.height))
        }
    }

    impl Default for GridSettings {
        fn default() -> Self {
            Self {
                grid_size: DEFAULT_GRID_SIZE,
                show_grid: true,
                snap_to_grid: true,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn snaps_to_nearest_multiple() {
            let grid = GridSettings::default();
            assert_eq!(grid.snap_point(Point2::new(29.0, 31.0)), Point2::new(20.0, 40.0));
            assert_eq!(grid.snap_point(Point2::new(-9.0, -11.0)), Point2::new(0.0, -20.0));
            assert_eq!(grid.snap_size(Size2::new(45.0, 5.0)), Size2::new(40.0, 0.0));
        }

        #[test]
        fn snapping_is_idempotent() {
            let grid = GridSettings::new(0.3).unwrap();
            for raw in [0.0, 0.1, 0.45, 1.0, 7.77, -3.14, 123.456] {
                let once = grid.snap_point(Point2::new(raw, raw * 2.0));
                assert_eq!(grid.snap_point(once), once);
            }
        }

        #[test]
        fn disabled_snapping_returns_input() {
            let grid = GridSettings {
                snap_to_grid: false,
                ..GridSettings::default()
            };
            let p = Point2::new(13.7, -2.2);
            assert_eq!(grid.snap_point(p), p);
            assert_eq!(grid.snap_size(Size2::new(3.3, 4.4)), Size2::new(3.3, 4.4));
        }

        #[test]
        fn zero_grid_is_rejected() {
            assert_eq!(GridSettings::new(0.0), Err(ModelError::InvalidGridSize(0.0)));
            assert!(GridSettings::new(-1.0).is_err());
            assert!(GridSettings::new(f64::NAN).is_err());
        }
    }
}
