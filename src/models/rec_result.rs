/*
    输出结构
*/

use serde::{Deserialize, Serialize};

use crate::error::FormError;
use super::form::Coordinate;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct FormOutput {
    /// 页面摆正时旋转的角度，逆时针为正
    pub rotation_degrees: f32,
    /// 按阅读顺序排列的识别结果
    pub fields: Vec<RecognizedField>,
    pub failures: Vec<FieldFailure>,
}

impl FormOutput {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecognizedField {
    pub index: usize,
    pub rect: Coordinate,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NoTextRegion,
    AmbiguousTextRegion,
    Encode,
    Ocr,
}

/// 被跳过的字段，调用方据此决定重扫、人工处理或丢弃
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FieldFailure {
    pub index: usize,
    pub rect: Coordinate,
    pub reason: FailureReason,
    pub message: String,
}

impl FieldFailure {
    /// 非字段级的错误返回None，应由调用方作为整体失败处理
    pub fn from_error(index: usize, rect: Coordinate, err: &FormError) -> Option<Self> {
        let reason = err.failure_reason()?;
        Some(FieldFailure { index, rect, reason, message: err.to_string() })
    }
}
