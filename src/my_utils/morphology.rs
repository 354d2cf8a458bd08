//! 矩形结构元的形态学操作
//!
//! imageproc 的 erode/dilate 只支持以 Norm 定义的方形邻域，这里补上任意宽高的
//! 矩形核、可指定锚点和迭代次数。矩形核可分离，先按行再按列做滑动窗口极值。
//!
//! 输出像素 (x, y) 取输入在 `[x - ax, x - ax + w) × [y - ay, y - ay + h)` 窗口内的
//! 极值，窗口超出图片的部分不参与计算。

use std::collections::VecDeque;

use image::GrayImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectKernel {
    pub width: u32,
    pub height: u32,
}

impl RectKernel {
    /// 宽高至少为1
    pub fn new(width: u32, height: u32) -> Self {
        RectKernel { width: width.max(1), height: height.max(1) }
    }

    pub fn center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

impl Extreme {
    /// 新值进入窗口后，队尾的旧值是否再也不可能成为极值
    fn dominates(self, new: u8, old: u8) -> bool {
        match self {
            Extreme::Min => new <= old,
            Extreme::Max => new >= old,
        }
    }
}

/// 腐蚀，anchor为None时取核中心
pub fn erode_rect(img: &GrayImage, kernel: RectKernel, anchor: Option<(u32, u32)>, iterations: u32) -> GrayImage {
    apply(img, kernel, anchor, iterations, Extreme::Min)
}

/// 膨胀，anchor为None时取核中心
pub fn dilate_rect(img: &GrayImage, kernel: RectKernel, anchor: Option<(u32, u32)>, iterations: u32) -> GrayImage {
    apply(img, kernel, anchor, iterations, Extreme::Max)
}

/// 开运算：先腐蚀iterations次，再用反射后的核膨胀iterations次，
/// 结果不会超出原前景
pub fn open_rect(img: &GrayImage, kernel: RectKernel, iterations: u32) -> GrayImage {
    let kernel = RectKernel::new(kernel.width, kernel.height);
    let (ax, ay) = kernel.center();
    let eroded = erode_rect(img, kernel, Some((ax, ay)), iterations);
    let reflected = (kernel.width - 1 - ax, kernel.height - 1 - ay);
    dilate_rect(&eroded, kernel, Some(reflected), iterations)
}

fn apply(img: &GrayImage, kernel: RectKernel, anchor: Option<(u32, u32)>, iterations: u32, extreme: Extreme) -> GrayImage {
    let kernel = RectKernel::new(kernel.width, kernel.height);
    let (ax, ay) = anchor.unwrap_or_else(|| kernel.center());
    let ax = ax.min(kernel.width - 1) as usize;
    let ay = ay.min(kernel.height - 1) as usize;

    let mut current = img.clone();
    for _ in 0..iterations {
        current = pass(&current, kernel, (ax, ay), extreme);
    }
    current
}

fn pass(img: &GrayImage, kernel: RectKernel, anchor: (usize, usize), extreme: Extreme) -> GrayImage {
    let (width, height) = (img.width() as usize, img.height() as usize);
    if width == 0 || height == 0 {
        return img.clone();
    }
    let src = img.as_raw();
    let mut rows = vec![0u8; src.len()];

    // 按行
    if kernel.width > 1 {
        for y in 0..height {
            let range = y * width..(y + 1) * width;
            sliding_extreme(&src[range.clone()], &mut rows[range], kernel.width as usize, anchor.0, extreme);
        }
    } else {
        rows.copy_from_slice(src);
    }

    // 按列
    let mut out = rows.clone();
    if kernel.height > 1 {
        let mut column = vec![0u8; height];
        let mut column_out = vec![0u8; height];
        for x in 0..width {
            for y in 0..height {
                column[y] = rows[y * width + x];
            }
            sliding_extreme(&column, &mut column_out, kernel.height as usize, anchor.1, extreme);
            for y in 0..height {
                out[y * width + x] = column_out[y];
            }
        }
    }

    GrayImage::from_raw(img.width(), img.height(), out).unwrap_or_else(|| img.clone())
}

/// 单调队列求滑动窗口极值，out[i] 取 line[i - anchor ..= i - anchor + size - 1] 中的极值
fn sliding_extreme(line: &[u8], out: &mut [u8], size: usize, anchor: usize, extreme: Extreme) {
    let n = line.len() as isize;
    let mut window: VecDeque<usize> = VecDeque::with_capacity(size);
    let mut next: isize = 0;

    for i in 0..line.len() {
        let lo = i as isize - anchor as isize;
        let hi = lo + size as isize - 1;
        while next <= hi && next < n {
            let value = line[next as usize];
            while let Some(&back) = window.back() {
                if extreme.dominates(value, line[back]) {
                    window.pop_back();
                } else {
                    break;
                }
            }
            window.push_back(next as usize);
            next += 1;
        }
        while let Some(&front) = window.front() {
            if (front as isize) < lo {
                window.pop_front();
            } else {
                break;
            }
        }
        out[i] = window.front().map(|&j| line[j]).unwrap_or(line[i]);
    }
}
