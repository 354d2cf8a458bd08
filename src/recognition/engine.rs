use std::fmt;
use std::path::Path;

use image::GrayImage;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::FormError;
use crate::models::engine_rec::{LocatedField, LocatedFields};
use crate::models::rec_result::{FieldFailure, FormOutput, RecognizedField};
use crate::my_utils::io::ArtifactSink;
use super::baizheng::Baizheng;
use super::grid::GridMaskBuilder;
use super::ocr::{OcrEngine, OcrPreprocessor};
use super::rects::RectangleDetector;
use super::text_region::TextRegionRefiner;

pub struct Engine {
    config: Config,
    sink: Option<Box<dyn ArtifactSink>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Engine { config, sink: None }
    }

    /// 挂上中间图观察者
    pub fn with_sink(mut self, sink: Box<dyn ArtifactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 跨模块实现方法的时候访问不到成员变量，需要调用此函数
    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn dump(&self, name: &str, img: &GrayImage) {
        if let Some(sink) = &self.sink {
            sink.on_artifact(name, img);
        }
    }

    /// 摆正+找框+精修文本区域，不做OCR
    /// 摆正失败时整体失败，单个字段的失败记录在字段里
    pub fn locate_fields(&self, page: &GrayImage) -> Result<LocatedFields, FormError> {
        let insets = self.config.image_baizheng.insets_for(page.height());
        let rotation_degrees = self.estimate_rotation_degrees(page, &insets)?;
        let righted = self.rotate_page(page, rotation_degrees);
        self.dump("righted", &righted);

        let grid_mask = self.build_grid_mask(&righted);
        let rects = self.detect_field_rects(&grid_mask);
        debug!(rects = rects.len(), "detected field rects");

        let fields = rects
            .into_iter()
            .enumerate()
            .filter(|(index, _)| self.config.selected_index.map_or(true, |selected| selected == *index))
            .map(|(index, rect)| LocatedField {
                index,
                rect,
                text_field: self.refine(&righted, &rect),
            })
            .collect();

        Ok(LocatedFields { rotation_degrees, righted, fields })
    }

    /// 识别，按阅读顺序逐个字段交给OCR引擎
    pub fn recognize<O>(&self, page: &GrayImage, ocr: &mut O) -> Result<FormOutput, FormError>
    where
        O: OcrEngine + ?Sized,
    {
        let located = self.locate_fields(page)?;
        let mut output = FormOutput {
            rotation_degrees: located.rotation_degrees,
            ..Default::default()
        };

        for field in located.fields {
            let result = field.text_field.and_then(|text_field| {
                let raster = self.prepare(&located.righted, &text_field)?;
                ocr.recognize(&raster).map_err(FormError::Ocr)
            });
            match result {
                Ok(text) => output.fields.push(RecognizedField {
                    index: field.index,
                    rect: field.rect,
                    text,
                }),
                Err(err) => {
                    warn!(index = field.index, rect = ?field.rect, %err, "field skipped");
                    match FieldFailure::from_error(field.index, field.rect, &err) {
                        Some(failure) => output.failures.push(failure),
                        None => return Err(err),
                    }
                }
            }
        }

        info!(
            recognized = output.fields.len(),
            failed = output.failures.len(),
            rotation = output.rotation_degrees,
            "form recognized"
        );
        Ok(output)
    }

    /// 从文件读取页面后识别
    pub fn recognize_path<P, O>(&self, path: P, ocr: &mut O) -> Result<FormOutput, FormError>
    where
        P: AsRef<Path>,
        O: OcrEngine + ?Sized,
    {
        let page = image::open(path)?.to_luma8();
        debug!(width = page.width(), height = page.height(), "loaded page");
        self.recognize(&page, ocr)
    }
}
