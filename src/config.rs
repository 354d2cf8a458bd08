use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::FormError;
use crate::models::form::Insets;
use crate::my_utils::morphology::RectKernel;

/// 字段框尺寸过滤参数
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FieldFilter {
    pub min_rect_width: i32,
    pub min_rect_height: i32,
}

impl Default for FieldFilter {
    fn default() -> Self {
        FieldFilter { min_rect_width: 45, min_rect_height: 30 }
    }
}

/// 图片摆正处理参数
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ImageBaizheng {
    pub insets: Insets,
    /// 设置后只在 top 往下 band_height 高的横条里找线，insets.bottom 被忽略
    pub band_height: Option<u32>,
}

impl Default for ImageBaizheng {
    fn default() -> Self {
        ImageBaizheng {
            insets: Insets::new(85, 50, 0, 50),
            band_height: Some(20),
        }
    }
}

impl ImageBaizheng {
    /// 根据页面高度得到实际使用的边距
    pub fn insets_for(&self, height: u32) -> Insets {
        let mut insets = self.insets;
        if let Some(band) = self.band_height {
            insets.bottom = height.saturating_sub(insets.top.saturating_add(band));
        }
        insets
    }
}

/// 表格线提取参数
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GridArgs {
    pub horizontal_kernel: RectKernel,
    pub vertical_kernel: RectKernel,
    pub iterations: u32,
}

impl Default for GridArgs {
    fn default() -> Self {
        GridArgs {
            horizontal_kernel: RectKernel::new(40, 1),
            vertical_kernel: RectKernel::new(1, 10),
            iterations: 2,
        }
    }
}

/// 高斯模糊和canny参数，找框和估计行高共用
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EdgeArgs {
    pub gaussian_blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
}

impl Default for EdgeArgs {
    fn default() -> Self {
        // 5x5高斯核对应的sigma
        EdgeArgs { gaussian_blur_sigma: 1.1, canny_low: 30.0, canny_high: 200.0 }
    }
}

/// 文本区域精修参数
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TextRegionArgs {
    pub border_thickness: u32,
    pub bottom_border_thickness: u32,
    pub erode_iterations: u32,
    pub binarization_threshold: u8,
}

impl Default for TextRegionArgs {
    fn default() -> Self {
        TextRegionArgs {
            border_thickness: 4,
            bottom_border_thickness: 5,
            erode_iterations: 2,
            binarization_threshold: 127,
        }
    }
}

/// OCR预处理参数
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OcrArgs {
    /// tesseract识别效果最好的行高
    pub target_line_height: f32,
    pub binarization_threshold: u8,
    pub dpi: u32,
    /// 开启tesseract特性时由TesseractEngine::from_config读取
    pub language: String,
}

impl Default for OcrArgs {
    fn default() -> Self {
        OcrArgs {
            target_line_height: 30.0,
            binarization_threshold: 190,
            dpi: 300,
            language: "eng".to_string(),
        }
    }
}

/// 配置参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub field_filter: FieldFilter,
    pub image_baizheng: ImageBaizheng,
    pub grid: GridArgs,
    pub edges: EdgeArgs,
    pub text_region: TextRegionArgs,
    pub ocr: OcrArgs,
    /// 只处理阅读顺序中的第几个字段，调试用
    pub selected_index: Option<usize>,
    /// 去掉被更大框包住的重复框
    pub dedupe_nested: bool,
}

impl Config {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, FormError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, FormError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
