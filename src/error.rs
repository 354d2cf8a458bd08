//! 引擎错误类型
//!
//! 摆正阶段的错误对整张表单是致命的；单个字段的错误只会让该字段被跳过，
//! 由引擎收集到输出的 failures 中。

use thiserror::Error;

use crate::models::form::Coordinate;
use crate::models::rec_result::FailureReason;

#[derive(Debug, Error)]
pub enum FormError {
    /// 裁剪区域内没有找到水平线
    #[error("no horizontal line found in the skew region")]
    NoLineFound,

    /// 水平线在x方向上没有跨度
    #[error("horizontal line has no extent along x")]
    DegenerateLine,

    /// 边距把页面裁没了
    #[error("insets {top}/{right}/{bottom}/{left} leave no region in a {width}x{height} page")]
    InvalidInsets {
        top: u32,
        right: u32,
        bottom: u32,
        left: u32,
        width: u32,
        height: u32,
    },

    #[error("no text region found in field {rect:?}")]
    NoTextRegionFound { rect: Coordinate },

    /// 腐蚀之后仍有多个连通块，无法确定文本区域
    #[error("ambiguous text region in field {rect:?}: {} candidates", candidates.len())]
    AmbiguousTextRegion {
        rect: Coordinate,
        candidates: Vec<Coordinate>,
    },

    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    #[error("tiff encode")]
    Encode(#[from] tiff::TiffError),

    #[error("config parse")]
    Config(#[from] serde_yaml::Error),

    #[error("io")]
    Io(#[from] std::io::Error),

    /// OCR引擎的错误原样透传，不做重试
    #[error("ocr engine failed: {0:#}")]
    Ocr(anyhow::Error),
}

impl FormError {
    /// 只影响单个字段的错误对应的失败原因，整体失败的错误返回None
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            FormError::NoTextRegionFound { .. } => Some(FailureReason::NoTextRegion),
            FormError::AmbiguousTextRegion { .. } => Some(FailureReason::AmbiguousTextRegion),
            FormError::Encode(_) => Some(FailureReason::Encode),
            FormError::Ocr(_) => Some(FailureReason::Ocr),
            FormError::NoLineFound
            | FormError::DegenerateLine
            | FormError::InvalidInsets { .. }
            | FormError::ImageLoad(_)
            | FormError::Config(_)
            | FormError::Io(_) => None,
        }
    }
}
