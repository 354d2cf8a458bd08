use image::GrayImage;
use tracing::debug;

use crate::error::FormError;
use crate::models::engine_rec::TextField;
use crate::models::form::Coordinate;
use crate::my_utils::image::*;
use crate::my_utils::math::by_height_then_y;
use crate::my_utils::morphology::{erode_rect, RectKernel};
use super::engine::Engine;

pub trait TextRegionRefiner {
    /// 估计框内文字的行高，返回 (不含偏移的高度, 上方偏移)
    fn estimate_text_height(&self, field_img: &GrayImage) -> Option<(u32, u32)>;

    /// 在字段框内找出真正有字的区域
    fn refine(&self, page: &GrayImage, rect: &Coordinate) -> Result<TextField, FormError>;
}

impl TextRegionRefiner for Engine {
    fn estimate_text_height(&self, field_img: &GrayImage) -> Option<(u32, u32)> {
        let edged = edge_map(field_img, &self.get_config().edges);
        let (w, h) = field_img.dimensions();
        bounding_rects(&all_contours(&edged))
            .into_iter()
            .filter(|rect| !rect.has_size(w, h))
            .max_by(by_height_then_y)
            .map(|rect| (rect.h.max(0) as u32, rect.y.max(0) as u32))
    }

    fn refine(&self, page: &GrayImage, rect: &Coordinate) -> Result<TextField, FormError> {
        let args = &self.get_config().text_region;
        let clamped = rect
            .clamp_to(page.width(), page.height())
            .ok_or(FormError::NoTextRegionFound { rect: *rect })?;

        let field_img = crop_image(page, &clamped);
        // 框线会被当成文字
        let field_img = fill_rect_sides(&field_img, args.border_thickness, args.bottom_border_thickness, 255);
        self.dump("text_box", &field_img);

        let (text_height, offset) = self
            .estimate_text_height(&field_img)
            .ok_or(FormError::NoTextRegionFound { rect: clamped })?;

        // 往右、往下腐蚀，把同一行的字连成一块
        let line_height = text_height + offset;
        let kernel = RectKernel::new(line_height, line_height / 2);
        let anchor = (kernel.width - 1, kernel.height / 2);
        let eroded = erode_rect(&field_img, kernel, Some(anchor), args.erode_iterations);
        self.dump("eroded", &eroded);

        let binary = binarize_inv(&eroded, args.binarization_threshold);
        self.dump("binary", &binary);

        let (w, h) = binary.dimensions();
        let blobs: Vec<Coordinate> = bounding_rects(&all_contours(&binary))
            .into_iter()
            .filter(|blob| !blob.has_size(w, h))
            .collect();
        debug!(rect = ?clamped, text_height, offset, blobs = blobs.len(), "refined text region");

        match blobs.as_slice() {
            [] => Err(FormError::NoTextRegionFound { rect: clamped }),
            [blob] => Ok(TextField {
                rect: Coordinate::new(clamped.x, clamped.y, blob.w, blob.h),
                line_height: text_height,
                line_offset: offset,
            }),
            _ => Err(FormError::AmbiguousTextRegion { rect: clamped, candidates: blobs }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use image::Luma;
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect;

    fn engine() -> Engine {
        Engine::new(Config::default())
    }

    /// 3像素粗的框
    fn draw_box(page: &mut GrayImage, rect: &Coordinate) {
        for i in 0..3 {
            let r = Rect::at(rect.x + i, rect.y + i).of_size((rect.w - 2 * i) as u32, (rect.h - 2 * i) as u32);
            draw_hollow_rect_mut(page, r, Luma([0]));
        }
    }

    fn page_with_words(rect: &Coordinate, words: &[(i32, i32, u32, u32)]) -> GrayImage {
        let mut page = GrayImage::from_pixel(400, 200, Luma([255]));
        draw_box(&mut page, rect);
        for &(x, y, w, h) in words {
            draw_filled_rect_mut(&mut page, Rect::at(rect.x + x, rect.y + y).of_size(w, h), Luma([0]));
        }
        page
    }

    #[test]
    fn test_single_word_gives_one_region() {
        let rect = Coordinate::new(50, 50, 200, 40);
        let page = page_with_words(&rect, &[(30, 12, 40, 14)]);
        let field = engine().refine(&page, &rect).unwrap();

        // 笔画外接框比字大一圈：上沿在第11行，高16
        assert_eq!((field.line_height, field.line_offset), (16, 11), "{field:?}");

        // 核 (L, L/2)，锚点 (L-1, L/4)，腐蚀两次：
        // 向右扩 2*(L-1)，向上扩 2*(L/2-1-L/4)，向下扩 2*(L/4)，再裁到框内
        let line = (field.line_height + field.line_offset) as i32;
        let (word_x, word_y, word_w, word_h) = (30, 12, 40, 14);
        let right = 2 * (line - 1);
        let up = 2 * (line / 2 - 1 - line / 4);
        let down = 2 * (line / 4);
        let width = (word_x + word_w + right).min(rect.w) - word_x;
        let top = (word_y - up).max(0);
        let bottom = (word_y + word_h + down).min(rect.h);
        assert_eq!(field.rect, Coordinate::new(50, 50, width, bottom - top));
        assert_eq!(field.rect, Coordinate::new(50, 50, 92, 38));
    }

    #[test]
    fn test_estimate_text_height_ignores_border() {
        let rect = Coordinate::new(50, 50, 200, 40);
        let page = page_with_words(&rect, &[(30, 12, 40, 14)]);
        let args = Config::default().text_region;
        let crop = fill_rect_sides(&crop_image(&page, &rect), args.border_thickness, args.bottom_border_thickness, 255);
        let (height, offset) = engine().estimate_text_height(&crop).unwrap();
        assert!(height < 20 && offset < 14, "{height} {offset}");
    }

    #[test]
    fn test_refine_is_deterministic() {
        let rect = Coordinate::new(50, 50, 200, 40);
        let page = page_with_words(&rect, &[(30, 12, 40, 14)]);
        let engine = engine();
        assert_eq!(engine.refine(&page, &rect).unwrap(), engine.refine(&page, &rect).unwrap());
    }

    #[test]
    fn test_separated_words_are_ambiguous() {
        let rect = Coordinate::new(40, 50, 300, 40);
        let page = page_with_words(&rect, &[(10, 12, 20, 14), (200, 12, 20, 14)]);
        match engine().refine(&page, &rect) {
            Err(FormError::AmbiguousTextRegion { rect: r, candidates }) => {
                assert_eq!(r, rect);
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].x != candidates[1].x);
            }
            other => panic!("expected ambiguous region, got {other:?}"),
        }
    }

    #[test]
    fn test_stacked_words_are_ambiguous() {
        // 上面的字更高，行高按它估计，腐蚀够不到下面的字
        let rect = Coordinate::new(40, 40, 300, 110);
        let page = page_with_words(&rect, &[(20, 10, 60, 20), (20, 80, 60, 10)]);
        match engine().refine(&page, &rect) {
            Err(FormError::AmbiguousTextRegion { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.iter().any(|c| c.y >= 60), "{candidates:?}");
            }
            other => panic!("expected ambiguous region, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_box_has_no_text() {
        let rect = Coordinate::new(50, 50, 200, 40);
        let page = page_with_words(&rect, &[]);
        assert!(matches!(
            engine().refine(&page, &rect),
            Err(FormError::NoTextRegionFound { .. })
        ));
    }

    #[test]
    fn test_rect_outside_page() {
        let page = GrayImage::from_pixel(100, 100, Luma([255]));
        let rect = Coordinate::new(150, 150, 50, 30);
        assert!(matches!(
            engine().refine(&page, &rect),
            Err(FormError::NoTextRegionFound { .. })
        ));
    }
}
