// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/predictor.rs - 预测流程编排
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeMap;

use image::RgbImage;
use thiserror::Error;
use tracing::{error, info};

use crate::analysis::{calculate_area, split_by_class};
use crate::mask::ClassMask;
use crate::model::{ModelKind, ModelPredictionError, ModelRegistry};
use crate::visualizer::Visualizer;

#[derive(Error, Debug)]
pub enum PredictorError {
  #[error("模型 {0} 不可用（启动时未能加载）")]
  ModelUnavailable(ModelKind),
  #[error("模型推理失败: {0}")]
  Prediction(ModelPredictionError),
}

impl From<ModelPredictionError> for PredictorError {
  fn from(err: ModelPredictionError) -> Self {
    PredictorError::Prediction(err)
  }
}

/// 单次预测请求的完整输出
pub struct PredictOutcome {
  pub original: RgbImage,
  pub overlay: RgbImage,
  pub mask: ClassMask,
  pub split_images: Vec<RgbImage>,
  pub areas: BTreeMap<&'static str, u64>,
}

/// 对一张图像运行指定模型并做统计后处理。
/// 单次请求的失败不影响注册表与后续请求。
pub fn predict_image(
  registry: &ModelRegistry,
  kind: ModelKind,
  image: RgbImage,
) -> Result<PredictOutcome, PredictorError> {
  let model = registry
    .get(kind)
    .ok_or(PredictorError::ModelUnavailable(kind))?;

  info!("运行 {} 模型推理", kind);
  let prediction = model.predict(&image).map_err(|e| {
    error!("{} 推理失败: {}", kind, e);
    e
  })?;

  let areas = calculate_area(&prediction.mask);
  let visualizer = Visualizer::new();
  let split_images = split_by_class(&prediction.mask, &visualizer);

  Ok(PredictOutcome {
    original: image,
    overlay: prediction.overlay,
    mask: prediction.mask,
    split_images,
    areas,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::ModelPaths;

  #[test]
  fn missing_model_is_reported_by_name() {
    let registry = ModelRegistry::load(&ModelPaths {
      yolo: "does-not-exist/yolo.onnx".to_string(),
      unet: "does-not-exist/unet.onnx".to_string(),
      maskrcnn: "does-not-exist/maskrcnn.onnx".to_string(),
    });

    let image = RgbImage::new(4, 4);
    let result = predict_image(&registry, ModelKind::Unet, image);
    match result {
      Err(PredictorError::ModelUnavailable(kind)) => assert_eq!(kind, ModelKind::Unet),
      _ => panic!("应返回模型不可用错误"),
    }
  }
}
