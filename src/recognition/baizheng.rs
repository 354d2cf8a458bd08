use image::GrayImage;
use tracing::debug;

use crate::error::FormError;
use crate::models::form::Insets;
use crate::my_utils::image::*;
use crate::my_utils::math::line_rotation_degrees;
use super::engine::Engine;
use super::grid::GridMaskBuilder;

pub trait Baizheng {
    /// 在边距之内找第一条水平线，按它的斜率估计页面需要旋转的角度，逆时针为正
    fn estimate_rotation_degrees(&self, page: &GrayImage, insets: &Insets) -> Result<f32, FormError>;

    /// 按角度绕中心旋转整页灰度图
    fn rotate_page(&self, page: &GrayImage, degrees: f32) -> GrayImage;
}

impl Baizheng for Engine {
    fn estimate_rotation_degrees(&self, page: &GrayImage, insets: &Insets) -> Result<f32, FormError> {
        let mask = binarize_otsu_inv(page);
        self.dump("prepped_for_rect_detection", &mask);

        // 边距外的页眉页脚、扫描边缘容易干扰
        let region = insets.region(mask.width(), mask.height())?;
        let region_img = crop_image(&mask, &region);
        self.dump("region/original", &region_img);

        let horizontals = self.extract_horizontal_lines(&region_img);
        self.dump("region/detected_horizontals", &horizontals);

        let contours = external_contours(&horizontals);
        let line = contours.first().ok_or(FormError::NoLineFound)?;
        let degrees = line_rotation_degrees(&line.points)?;
        debug!(degrees, lines = contours.len(), "estimated page rotation");
        Ok(degrees)
    }

    fn rotate_page(&self, page: &GrayImage, degrees: f32) -> GrayImage {
        if degrees == 0.0 {
            return page.clone();
        }
        rotate_gray(page, degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn engine() -> Engine {
        Engine::new(Config::default())
    }

    fn blank(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255]))
    }

    /// 画一条顺时针倾斜的粗线，x方向1000像素，y方向下降40像素
    fn draw_tilted_band(img: &mut GrayImage, x0: u32, y0: u32, thickness: u32) {
        for dx in 0..1000u32 {
            let y = y0 + (dx as f32 * 0.04).floor() as u32;
            for k in 0..thickness {
                img.put_pixel(x0 + dx, y + k, Luma([0]));
            }
        }
    }

    #[test]
    fn test_level_line_needs_no_rotation() {
        let mut page = blank(600, 400);
        draw_filled_rect_mut(&mut page, Rect::at(40, 100).of_size(520, 1), Luma([0]));
        let insets = Insets::new(60, 20, 200, 20);
        let degrees = engine().estimate_rotation_degrees(&page, &insets).unwrap();
        assert!(degrees.abs() < 1e-6, "{degrees}");
    }

    #[test]
    fn test_clockwise_tilt_gives_half_angle() {
        let mut page = blank(1200, 300);
        draw_tilted_band(&mut page, 100, 100, 6);
        let insets = Insets::new(50, 20, 50, 20);
        let degrees = engine().estimate_rotation_degrees(&page, &insets).unwrap();

        let expected = 40f32.atan2(1000.0).to_degrees() / 2.0;
        let raw = 40f32.atan2(1000.0).to_degrees();
        assert!(degrees > 0.0);
        assert!((degrees - expected).abs() < 0.35, "{degrees} vs {expected}");
        assert!((degrees - raw).abs() > 0.5);
    }

    #[test]
    fn test_no_line_in_region() {
        let mut page = blank(600, 400);
        // 线在边距之外
        draw_filled_rect_mut(&mut page, Rect::at(40, 20).of_size(520, 2), Luma([0]));
        let insets = Insets::new(60, 20, 200, 20);
        assert!(matches!(
            engine().estimate_rotation_degrees(&page, &insets),
            Err(FormError::NoLineFound)
        ));
    }

    #[test]
    fn test_short_marks_are_not_lines() {
        let mut page = blank(600, 400);
        for i in 0..10 {
            draw_filled_rect_mut(&mut page, Rect::at(50 + i * 40, 100).of_size(20, 8), Luma([0]));
        }
        let insets = Insets::new(60, 20, 200, 20);
        assert!(matches!(
            engine().estimate_rotation_degrees(&page, &insets),
            Err(FormError::NoLineFound)
        ));
    }

    #[test]
    fn test_empty_region_is_rejected() {
        let page = blank(100, 100);
        let insets = Insets::new(60, 0, 60, 0);
        assert!(matches!(
            engine().estimate_rotation_degrees(&page, &insets),
            Err(FormError::InvalidInsets { .. })
        ));
    }

    #[test]
    fn test_rotate_keeps_page_size() {
        let page = blank(300, 200);
        let rotated = engine().rotate_page(&page, 1.5);
        assert_eq!(rotated.dimensions(), (300, 200));
        // 角落填白
        assert_eq!(rotated.get_pixel(0, 0)[0], 255);
    }
}
