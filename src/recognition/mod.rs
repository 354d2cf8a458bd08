//! 识别流程的各个阶段，都以trait的形式实现在Engine上

pub mod baizheng;
pub mod engine;
pub mod grid;
pub mod ocr;
pub mod rects;
pub mod text_region;
