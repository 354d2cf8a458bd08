//! 图像处理、几何计算和文件相关的工具函数

pub mod image;
pub mod io;
pub mod math;
pub mod morphology;
