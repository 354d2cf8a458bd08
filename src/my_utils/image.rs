use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{otsu_level, threshold};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use crate::config::EdgeArgs;
use crate::models::form::Coordinate;

/// 大于thresh的置为255，其余为0
pub fn binarize(img: &GrayImage, thresh: u8) -> GrayImage {
    threshold(img, thresh)
}

/// 反向二值化，墨迹变为前景255
pub fn binarize_inv(img: &GrayImage, thresh: u8) -> GrayImage {
    let mut out = threshold(img, thresh);
    imageops::invert(&mut out);
    out
}

/// otsu求全局阈值后反向二值化
pub fn binarize_otsu_inv(img: &GrayImage) -> GrayImage {
    binarize_inv(img, otsu_level(img))
}

/**
 * 截取图像，超出原图的部分填白色
 */
pub fn crop_image(input_image: &GrayImage, coordinate: &Coordinate) -> GrayImage {
    let (width, height) = (coordinate.w.max(0) as u32, coordinate.h.max(0) as u32);
    ImageBuffer::from_fn(width, height, |x, y| {
        let src_x = coordinate.x + x as i32;
        let src_y = coordinate.y + y as i32;
        if src_x >= 0 && src_y >= 0 && (src_x as u32) < input_image.width() && (src_y as u32) < input_image.height() {
            *input_image.get_pixel(src_x as u32, src_y as u32)
        } else {
            Luma([255u8])
        }
    })
}

/// 把若干区域涂成value，返回新图。predicate存在时只涂满足条件的像素
pub fn fill_areas(img: &GrayImage, areas: &[Coordinate], value: u8, predicate: Option<&dyn Fn(u8) -> bool>) -> GrayImage {
    let mut out = img.clone();
    for area in areas {
        let Some(area) = area.clamp_to(out.width(), out.height()) else {
            continue;
        };
        for y in area.y..area.y + area.h {
            for x in area.x..area.x + area.w {
                let pixel = out.get_pixel_mut(x as u32, y as u32);
                if predicate.map_or(true, |keep| keep(pixel[0])) {
                    *pixel = Luma([value]);
                }
            }
        }
    }
    out
}

/// 把四条边涂成value，去掉字段框自身的边线
pub fn fill_rect_sides(img: &GrayImage, thickness: u32, bottom_thickness: u32, value: u8) -> GrayImage {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let t = thickness as i32;
    let b = bottom_thickness as i32;
    let sides = [
        Coordinate::new(0, 0, w, t),
        Coordinate::new(w - t, 0, t, h),
        Coordinate::new(0, h - b, w, b),
        Coordinate::new(0, 0, t, h),
    ];
    fill_areas(img, &sides, value, None)
}

/// 逐像素饱和相加
pub fn combine_masks(a: &GrayImage, b: &GrayImage) -> GrayImage {
    ImageBuffer::from_fn(a.width().min(b.width()), a.height().min(b.height()), |x, y| {
        Luma([a.get_pixel(x, y)[0].saturating_add(b.get_pixel(x, y)[0])])
    })
}

/// 逐像素按位或
pub fn bitwise_or(a: &GrayImage, b: &GrayImage) -> GrayImage {
    ImageBuffer::from_fn(a.width().min(b.width()), a.height().min(b.height()), |x, y| {
        Luma([a.get_pixel(x, y)[0] | b.get_pixel(x, y)[0]])
    })
}

/// 高斯模糊后canny
pub fn edge_map(img: &GrayImage, args: &EdgeArgs) -> GrayImage {
    let blurred = gaussian_blur_f32(img, args.gaussian_blur_sigma);
    canny(&blurred, args.canny_low, args.canny_high)
}

/// 所有轮廓，包括内边界
pub fn all_contours(img: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(img)
}

/// 只要最外层的外边界
pub fn external_contours(img: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(img)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .collect()
}

pub fn bounding_rects(contours: &[Contour<i32>]) -> Vec<Coordinate> {
    contours.iter().filter_map(|c| Coordinate::from_points(&c.points)).collect()
}

/// 绕中心旋转，degrees为正时逆时针，空出的角填白色
pub fn rotate_gray(img: &GrayImage, degrees: f32) -> GrayImage {
    // imageproc按顺时针旋转
    rotate_about_center(img, -degrees.to_radians(), Interpolation::Bilinear, Luma([255u8]))
}

/// 等比缩放，宽高向上取整
pub fn resize_by(img: &GrayImage, scale: f32) -> GrayImage {
    let width = ((img.width() as f32 * scale).ceil() as u32).max(1);
    let height = ((img.height() as f32 * scale).ceil() as u32).max(1);
    imageops::resize(img, width, height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binarize_inv_otsu_makes_ink_foreground() {
        let mut img = GrayImage::from_pixel(20, 20, Luma([250]));
        for x in 0..20 {
            img.put_pixel(x, 5, Luma([10]));
        }
        let mask = binarize_otsu_inv(&img);
        assert_eq!(mask.get_pixel(3, 5)[0], 255);
        assert_eq!(mask.get_pixel(3, 6)[0], 0);
    }

    #[test]
    fn test_crop_image_fills_outside_white() {
        let img = GrayImage::from_pixel(10, 10, Luma([0]));
        let crop = crop_image(&img, &Coordinate::new(8, 8, 4, 4));
        assert_eq!(crop.dimensions(), (4, 4));
        assert_eq!(crop.get_pixel(0, 0)[0], 0);
        assert_eq!(crop.get_pixel(3, 3)[0], 255);
    }

    #[test]
    fn test_fill_rect_sides() {
        let img = GrayImage::from_pixel(20, 20, Luma([0]));
        let filled = fill_rect_sides(&img, 4, 5, 255);
        assert_eq!(filled.get_pixel(3, 10)[0], 255);
        assert_eq!(filled.get_pixel(4, 10)[0], 0);
        assert_eq!(filled.get_pixel(15, 10)[0], 0);
        assert_eq!(filled.get_pixel(16, 10)[0], 255);
        assert_eq!(filled.get_pixel(10, 14)[0], 0);
        assert_eq!(filled.get_pixel(10, 15)[0], 255);
        assert_eq!(filled.get_pixel(10, 3)[0], 255);
        // 原图不变
        assert_eq!(img.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_fill_areas_with_predicate() {
        let mut img = GrayImage::from_pixel(4, 1, Luma([100]));
        img.put_pixel(1, 0, Luma([200]));
        let dark_only = |v: u8| v < 150;
        let filled = fill_areas(&img, &[Coordinate::new(0, 0, 4, 1)], 0, Some(&dark_only));
        assert_eq!(filled.as_raw(), &vec![0, 200, 0, 0]);
    }

    #[test]
    fn test_combine_masks_saturates() {
        let a = GrayImage::from_raw(3, 1, vec![255, 0, 200]).unwrap();
        let b = GrayImage::from_raw(3, 1, vec![255, 0, 100]).unwrap();
        assert_eq!(combine_masks(&a, &b).as_raw(), &vec![255, 0, 255]);
    }

    #[test]
    fn test_resize_by_rounds_up() {
        let img = GrayImage::from_pixel(10, 7, Luma([255]));
        assert_eq!(resize_by(&img, 1.5).dimensions(), (15, 11));
    }

    #[test]
    fn test_external_contours_skip_holes() {
        let mut img = GrayImage::from_pixel(20, 20, Luma([0]));
        for y in 2..12 {
            for x in 2..12 {
                if x == 2 || x == 11 || y == 2 || y == 11 {
                    img.put_pixel(x, y, Luma([255]));
                }
            }
        }
        assert_eq!(external_contours(&img).len(), 1);
        assert!(all_contours(&img).len() >= 2);
        let rects = bounding_rects(&external_contours(&img));
        assert_eq!(rects, vec![Coordinate::new(2, 2, 10, 10)]);
    }
}
