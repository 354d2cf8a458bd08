//! 定义输入输出和公用结构体

pub mod form;
pub mod rec_result;

/// 定义引擎各阶段之间传递的结构体
pub mod engine_rec {
    use image::GrayImage;
    use serde::{Deserialize, Serialize};

    use super::form::Coordinate;

    /// 精修后的文本区域，以及缩放给OCR用的行高信息
    #[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
    pub struct TextField {
        /// 左上角沿用字段框的坐标，宽高取自腐蚀后的文本块
        pub rect: Coordinate,
        /// 文字笔画外接框的高度，不含上方偏移
        pub line_height: u32,
        /// 字段框上沿到文字开始处的距离
        pub line_offset: u32,
    }

    /// 交给OCR引擎的图，dpi只是标记，不会重采样
    #[derive(Debug, Clone)]
    pub struct OcrRaster {
        pub image: GrayImage,
        pub dpi: u32,
        /// 同一张图编码成的无压缩TIFF，带分辨率标签
        pub tiff: Vec<u8>,
    }

    /// 检测到的字段框和它的精修结果
    #[derive(Debug)]
    pub struct LocatedField {
        /// 在阅读顺序中的位置
        pub index: usize,
        pub rect: Coordinate,
        pub text_field: Result<TextField, crate::error::FormError>,
    }

    /// 摆正后的页面以及所有字段框
    #[derive(Debug)]
    pub struct LocatedFields {
        pub rotation_degrees: f32,
        pub righted: GrayImage,
        pub fields: Vec<LocatedField>,
    }
}
