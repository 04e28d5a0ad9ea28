pub mod collision;
pub mod command;
pub mod editor;
pub mod history;
pub mod pick;

pub mod errors {
    use floorplan_core::errors::ModelError;
    use thiserror::Error;

    #[derive(Debug, Error, Clone, PartialEq)]
    pub enum EngineError {
        #[error("entity with id {0} not found")]
        EntityNotFound(u64),
        #[error("wall with id {0} not found")]
        WallNotFound(u64),
        #[error("room with id {0} not found")]
        RoomNotFound(u64),
        #[error("entity with id {0} already exists")]
        DuplicateEntity(u64),
        #[error("no furniture drag in progress")]
        NoDragInProgress,
        #[error("no wall drawing in progress")]
        NoWallInProgress,
        #[error(transparent)]
        Model(#[from] ModelError),
    }
}

pub mod settings {
    use floorplan_core::grid::GridSettings;

    use crate::history::DEFAULT_MAX_HISTORY;
    use crate::pick::HitTolerance;

    /// 编辑会话的运行参数，通常由配置层转换而来。
    #[derive(Debug, Clone, PartialEq)]
    pub struct EditorSettings {
        pub grid: GridSettings,
        pub max_history: usize,
        pub hit_tolerance: HitTolerance,
        /// 新绘制墙体的最小长度，短于该值的拖拽会被丢弃。
        pub min_wall_length: f64,
        pub min_zoom: f64,
        pub max_zoom: f64,
        pub zoom_step: f64,
        /// 旋转命令每次转动的角度。
        pub rotation_step: f64,
    }

    impl EditorSettings {
        pub const DEFAULT_MIN_WALL_LENGTH: f64 = 10.0;
        pub const DEFAULT_MIN_ZOOM: f64 = 0.25;
        pub const DEFAULT_MAX_ZOOM: f64 = 3.0;
        pub const DEFAULT_ZOOM_STEP: f64 = 0.25;
        pub const DEFAULT_ROTATION_STEP: f64 = 90.0;

        /// 将缩放倍数限制在合法范围内，非法输入退化为 1 后再限制。
        pub fn clamp_zoom(&self, zoom: f64) -> f64 {
            let zoom = if zoom.is_finite() { zoom } else { 1.0 };
            let (low, high) = if self.min_zoom <= self.max_zoom {
                (self.min_zoom, self.max_zoom)
            } else {
                (self.max_zoom, self.min_zoom)
            };
            zoom.clamp(low, high)
        }
    }

    impl Default for EditorSettings {
        fn default() -> Self {
            Self {
                grid: GridSettings::default(),
                max_history: DEFAULT_MAX_HISTORY,
                hit_tolerance: HitTolerance::default(),
                min_wall_length: Self::DEFAULT_MIN_WALL_LENGTH,
                min_zoom: Self::DEFAULT_MIN_ZOOM,
                max_zoom: Self::DEFAULT_MAX_ZOOM,
                zoom_step: Self::DEFAULT_ZOOM_STEP,
                rotation_step: Self::DEFAULT_ROTATION_STEP,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn zoom_is_clamped_to_range() {
            let settings = EditorSettings::default();
            assert_eq!(settings.clamp_zoom(0.01), 0.25);
            assert_eq!(settings.clamp_zoom(10.0), 3.0);
            assert_eq!(settings.clamp_zoom(1.5), 1.5);
            assert_eq!(settings.clamp_zoom(f64::NAN), 1.0);
        }
    }
}

pub mod viewport {
    use floorplan_core::geometry::{Point2, Size2, Vector2};

    /// 记录视口状态（中心点、缩放与屏幕尺寸）。中心点为真实世界坐标。
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ViewportState {
        pub center: Point2,
        pub zoom: f64,
        /// 画布的屏幕像素尺寸，用于适配内容。
        pub size: Size2,
    }

    impl ViewportState {
        pub const DEFAULT_ZOOM: f64 = 1.0;
        pub const DEFAULT_SIZE: Size2 = Size2 {
            width: 1024.0,
            height: 768.0,
        };

        #[inline]
        pub fn pan(&mut self, delta: Vector2) {
            self.center = self.center.translate(delta);
        }
    }

    impl Default for ViewportState {
        fn default() -> Self {
            Self {
                center: Point2::ORIGIN,
                zoom: Self::DEFAULT_ZOOM,
                size: Self::DEFAULT_SIZE,
            }
        }
    }
}
