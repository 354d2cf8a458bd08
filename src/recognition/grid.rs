use image::GrayImage;

use crate::my_utils::image::{binarize_otsu_inv, combine_masks};
use crate::my_utils::morphology::open_rect;
use super::engine::Engine;

pub trait GridMaskBuilder {
    /// 开运算去掉所有不够长的横向笔画，只留下水平线
    fn extract_horizontal_lines(&self, mask: &GrayImage) -> GrayImage;

    /// 同上，只留下竖直线
    fn extract_vertical_lines(&self, mask: &GrayImage) -> GrayImage;

    /// 二值化后把水平线和竖直线叠加，还原出字段框的轮廓
    fn build_grid_mask(&self, page: &GrayImage) -> GrayImage;
}

impl GridMaskBuilder for Engine {
    fn extract_horizontal_lines(&self, mask: &GrayImage) -> GrayImage {
        let args = &self.get_config().grid;
        open_rect(mask, args.horizontal_kernel, args.iterations)
    }

    fn extract_vertical_lines(&self, mask: &GrayImage) -> GrayImage {
        let args = &self.get_config().grid;
        open_rect(mask, args.vertical_kernel, args.iterations)
    }

    fn build_grid_mask(&self, page: &GrayImage) -> GrayImage {
        let thresholded = binarize_otsu_inv(page);
        self.dump("prepped_for_rect_detection", &thresholded);

        let horizontals = self.extract_horizontal_lines(&thresholded);
        self.dump("detected_horizontals", &horizontals);
        let verticals = self.extract_vertical_lines(&thresholded);
        self.dump("detected_verticals", &verticals);

        // 单个方向的开运算会抹掉另一个方向的边
        let grid_mask = combine_masks(&horizontals, &verticals);
        self.dump("grid_mask", &grid_mask);
        grid_mask
    }
}
