use std::cmp::Ordering;

use imageproc::point::Point;

use crate::error::FormError;
use crate::models::form::Coordinate;

/// 阅读顺序：先上后下，同一行从左到右
pub fn by_reading_order(a: &Coordinate, b: &Coordinate) -> Ordering {
    a.y.cmp(&b.y).then(a.x.cmp(&b.x))
}

/// 先按高度，再按y，估计行高时取排序后的最后一个
pub fn by_height_then_y(a: &Coordinate, b: &Coordinate) -> Ordering {
    a.h.cmp(&b.h).then(a.y.cmp(&b.y))
}

/// 一组点在x、y方向上的最值 (min_x, max_x, min_y, max_y)
pub fn axes_bounds(points: &[Point<i32>]) -> Option<(i32, i32, i32, i32)> {
    let rect = Coordinate::from_points(points)?;
    Some((rect.x, rect.x + rect.w - 1, rect.y, rect.y + rect.h - 1))
}

/// 线段两端的平均y，x取最小、最大的那一列
fn end_heights(points: &[Point<i32>], first_x: i32, last_x: i32) -> (f64, f64) {
    let mean_y = |x: i32| {
        let ys: Vec<i32> = points.iter().filter(|p| p.x == x).map(|p| p.y).collect();
        ys.iter().sum::<i32>() as f64 / ys.len().max(1) as f64
    };
    (mean_y(first_x), mean_y(last_x))
}

/// 由水平线轮廓计算需要旋转的角度
///
/// a为轮廓在y方向的跨度，b为x方向的跨度，`acos(b / hypot(a, b))` 得到的角度
/// 偏大，取一半作为结果。线段右端比左端高时结果为负。
pub fn line_rotation_degrees(points: &[Point<i32>]) -> Result<f32, FormError> {
    let mut points = points.to_vec();
    points.sort_by_key(|p| p.x);
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(FormError::NoLineFound),
    };
    let (_, _, min_y, max_y) = axes_bounds(&points).ok_or(FormError::NoLineFound)?;

    let a = (max_y - min_y) as f64;
    let b = (last.x - first.x) as f64;
    if b == 0.0 {
        return Err(FormError::DegenerateLine);
    }
    let c = (a.powi(2) + b.powi(2)).sqrt();
    let angle = (b / c).acos().to_degrees() / 2.0;

    let (left_y, right_y) = end_heights(&points, first.x, last.x);
    let sign = if right_y < left_y { -1.0 } else { 1.0 };
    Ok((sign * angle) as f32)
}
