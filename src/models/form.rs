/*
    表单上的几何结构：矩形框和边距
*/

use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// 轴对齐矩形，引擎所有坐标均使用i32
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Coordinate { x, y, w, h }
    }

    /// 一组点的外接矩形，宽高包含端点像素
    pub fn from_points(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for p in points.iter().skip(1) {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        Some(Coordinate::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    pub fn has_size(&self, w: u32, h: u32) -> bool {
        self.w == w as i32 && self.h == h as i32
    }

    /// other 是否落在 self 内，允许 tolerance 像素的误差
    pub fn contains(&self, other: &Coordinate, tolerance: i32) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.x + other.w <= self.x + self.w + tolerance
            && other.y + other.h <= self.y + self.h + tolerance
    }

    /// 裁掉超出 width*height 图片的部分，没有交集时返回None
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = (self.x + self.w).min(width as i32);
        let bottom = (self.y + self.h).min(height as i32);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Coordinate::new(left, top, right - left, bottom - top))
    }
}

/// 页面四边的边距，上右下左，单位像素
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insets {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Insets {
    pub fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Insets { top, right, bottom, left }
    }

    /// 去掉边距之后剩下的区域
    pub fn region(&self, width: u32, height: u32) -> Result<Coordinate, FormError> {
        let horizontal = self.left as u64 + self.right as u64;
        let vertical = self.top as u64 + self.bottom as u64;
        if horizontal >= width as u64 || vertical >= height as u64 {
            return Err(FormError::InvalidInsets {
                top: self.top,
                right: self.right,
                bottom: self.bottom,
                left: self.left,
                width,
                height,
            });
        }
        Ok(Coordinate::new(
            self.left as i32,
            self.top as i32,
            (width as u64 - horizontal) as i32,
            (height as u64 - vertical) as i32,
        ))
    }
}
