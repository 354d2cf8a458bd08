//! OCR前的预处理和OCR引擎接口
//!
//! 字段图按行高缩放到tesseract习惯的字号，再用阈值"或"运算把浅色背景提成纯白。
//! 交给引擎的图统一标记为300DPI。

use std::io::Cursor;

use image::GrayImage;
use tiff::encoder::{colortype, Rational, TiffEncoder};
use tiff::tags::ResolutionUnit;
use tracing::debug;

use crate::error::FormError;
use crate::models::engine_rec::{OcrRaster, TextField};
use crate::my_utils::image::{binarize, bitwise_or, crop_image, resize_by};
use super::engine::Engine;

/// 识别单个字段的OCR引擎，同步调用
pub trait OcrEngine {
    fn recognize(&mut self, raster: &OcrRaster) -> anyhow::Result<String>;
}

impl<F> OcrEngine for F
where
    F: FnMut(&OcrRaster) -> anyhow::Result<String>,
{
    fn recognize(&mut self, raster: &OcrRaster) -> anyhow::Result<String> {
        self(raster)
    }
}

impl OcrRaster {
    /// 编码失败时整个字段失败
    pub fn new(image: GrayImage, dpi: u32) -> Result<Self, FormError> {
        let tiff = encode_tiff(&image, dpi)?;
        Ok(OcrRaster { image, dpi, tiff })
    }
}

/// 无压缩8位灰度TIFF，带分辨率标签
pub fn encode_tiff(image: &GrayImage, dpi: u32) -> Result<Vec<u8>, FormError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf)?;
        let mut tiff_image = encoder.new_image::<colortype::Gray8>(image.width(), image.height())?;
        tiff_image.resolution(ResolutionUnit::Inch, Rational { n: dpi, d: 1 });
        tiff_image.write_data(image.as_raw())?;
    }
    Ok(buf.into_inner())
}

pub trait OcrPreprocessor {
    /// 截取文本区域，缩放到目标行高并提亮背景，编码成交给OCR的TIFF
    fn prepare(&self, page: &GrayImage, field: &TextField) -> Result<OcrRaster, FormError>;
}

impl OcrPreprocessor for Engine {
    fn prepare(&self, page: &GrayImage, field: &TextField) -> Result<OcrRaster, FormError> {
        let args = &self.get_config().ocr;
        let original = crop_image(page, &field.rect);
        self.dump("ocr/original", &original);

        let scale = args.target_line_height / field.line_height.max(1) as f32;
        let resized = resize_by(&original, scale);
        let binary = binarize(&resized, args.binarization_threshold);
        self.dump("ocr/binary", &binary);

        let prepared = bitwise_or(&resized, &binary);
        self.dump("ocr/or", &prepared);
        debug!(scale, width = prepared.width(), height = prepared.height(), "prepared field for ocr");

        OcrRaster::new(prepared, args.dpi)
    }
}

#[cfg(feature = "tesseract")]
pub use self::tesseract::TesseractEngine;

#[cfg(feature = "tesseract")]
mod tesseract {
    use anyhow::Context;
    use leptess::LepTess;

    use super::OcrEngine;
    use crate::config::OcrArgs;
    use crate::models::engine_rec::OcrRaster;

    /// 通过leptess调用本机的tesseract
    pub struct TesseractEngine {
        inner: LepTess,
    }

    impl TesseractEngine {
        pub fn new(language: &str) -> anyhow::Result<Self> {
            let inner = LepTess::new(None, language)
                .with_context(|| format!("failed to initialize tesseract with language {language}"))?;
            Ok(TesseractEngine { inner })
        }

        /// 语言取自配置的ocr段
        pub fn from_config(args: &OcrArgs) -> anyhow::Result<Self> {
            Self::new(&args.language)
        }
    }

    impl OcrEngine for TesseractEngine {
        fn recognize(&mut self, raster: &OcrRaster) -> anyhow::Result<String> {
            self.inner
                .set_image_from_mem(&raster.tiff)
                .context("failed to load field image into tesseract")?;
            // 必须在set_image之后设置
            self.inner.set_source_resolution(raster.dpi as i32);
            self.inner.get_utf8_text().context("failed to read text from tesseract")
        }
    }
}
