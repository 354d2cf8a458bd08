use image::GrayImage;
use tracing::debug;

use crate::config::FieldFilter;
use crate::models::form::Coordinate;
use crate::my_utils::image::{all_contours, bounding_rects, edge_map};
use crate::my_utils::math::by_reading_order;
use super::engine::Engine;

/// 嵌套框判重时允许的误差
const NESTED_TOLERANCE: i32 = 2;

pub trait RectangleDetector {
    /// 从表格线掩码中找出字段框，按阅读顺序排好
    fn detect_field_rects(&self, grid_mask: &GrayImage) -> Vec<Coordinate>;
}

impl RectangleDetector for Engine {
    fn detect_field_rects(&self, grid_mask: &GrayImage) -> Vec<Coordinate> {
        let config = self.get_config();
        let edged = edge_map(grid_mask, &config.edges);
        self.dump("edged", &edged);

        let candidates = bounding_rects(&all_contours(&edged));
        let total = candidates.len();
        let mut rects: Vec<Coordinate> = candidates
            .into_iter()
            .filter(|rect| filter_rect(rect, &config.field_filter))
            .collect();
        rects.sort_by(by_reading_order);

        if config.dedupe_nested {
            rects = dedupe_nested(rects);
        }
        debug!(contours = total, kept = rects.len(), "filtered field rects");
        rects
    }
}

/// 高度在最小字段高度附近的窄带内、宽度够宽的才是字段框
/// 太小的是文字笔画，太大的是表单外框
pub fn filter_rect(rect: &Coordinate, filter: &FieldFilter) -> bool {
    rect.h > filter.min_rect_height - 2
        && rect.h < filter.min_rect_height + 6
        && rect.w > filter.min_rect_width - 6
}

/// 去掉被另一个更大的框包住的框，结果仍按阅读顺序
pub fn dedupe_nested(rects: Vec<Coordinate>) -> Vec<Coordinate> {
    let mut by_area = rects;
    // 面积相同时保持阅读顺序
    by_area.sort_by(|a, b| b.area().cmp(&a.area()));

    let mut kept: Vec<Coordinate> = Vec::with_capacity(by_area.len());
    for rect in by_area {
        if !kept.iter().any(|outer| outer.contains(&rect, NESTED_TOLERANCE)) {
            kept.push(rect);
        }
    }
    kept.sort_by(by_reading_order);
    kept
}
