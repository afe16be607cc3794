// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/model/mod.rs - 分割模型模块
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::HashMap;
use std::fmt;

use image::RgbImage;
use thiserror::Error;
use tracing::{error, info};

use crate::mask::ClassMask;

#[cfg(feature = "model_maskrcnn")]
mod maskrcnn;
#[cfg(feature = "model_unet")]
mod unet;
#[cfg(feature = "model_yolo")]
mod yolo;

#[cfg(feature = "model_maskrcnn")]
pub use maskrcnn::MaskRcnnSeg;
#[cfg(feature = "model_unet")]
pub use unet::UnetSeg;
#[cfg(feature = "model_yolo")]
pub use yolo::YoloSeg;

/// 单次推理的结果：叠加图与类别掩码，掩码与输入图像同尺寸
pub struct Prediction {
  pub overlay: RgbImage,
  pub mask: ClassMask,
}

#[derive(Error, Debug)]
pub enum ModelPredictionError {
  #[error("模型加载失败: {0}")]
  Load(ort::Error),
  #[error("ONNX 运行时错误: {0}")]
  Runtime(ort::Error),
  #[error("模型输出缺失: {0}")]
  MissingOutput(&'static str),
  #[error("模型输出形状无效: {0}")]
  OutputShape(String),
}

impl From<ort::Error> for ModelPredictionError {
  fn from(err: ort::Error) -> Self {
    ModelPredictionError::Runtime(err)
  }
}

/// 分割模型统一接口
pub trait SegModel: Send + Sync {
  fn predict(&self, image: &RgbImage) -> Result<Prediction, ModelPredictionError>;
}

/// 模型标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
  Yolo,
  Unet,
  MaskRcnn,
}

impl ModelKind {
  pub const ALL: [ModelKind; 3] = [ModelKind::Yolo, ModelKind::Unet, ModelKind::MaskRcnn];

  /// 解析命令行模型标签
  pub fn from_tag(tag: &str) -> Option<ModelKind> {
    match tag.to_lowercase().as_str() {
      "yolo" | "yolov11" => Some(ModelKind::Yolo),
      "unet" => Some(ModelKind::Unet),
      "maskrcnn" | "mask-rcnn" => Some(ModelKind::MaskRcnn),
      _ => None,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      ModelKind::Yolo => "YOLOv11",
      ModelKind::Unet => "UNet",
      ModelKind::MaskRcnn => "MaskRCNN",
    }
  }
}

impl fmt::Display for ModelKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// 模型权重文件路径
#[derive(Debug, Clone)]
pub struct ModelPaths {
  pub yolo: String,
  pub unet: String,
  pub maskrcnn: String,
}

/// 启动时构建的只读模型注册表。加载失败的模型记录日志后跳过，
/// 进程生命周期内保持不可用，不支持热加载。
pub struct ModelRegistry {
  models: HashMap<ModelKind, Box<dyn SegModel>>,
}

impl ModelRegistry {
  pub fn load(paths: &ModelPaths) -> ModelRegistry {
    let mut models: HashMap<ModelKind, Box<dyn SegModel>> = HashMap::new();

    #[cfg(feature = "model_yolo")]
    match YoloSeg::load(&paths.yolo) {
      Ok(model) => {
        models.insert(ModelKind::Yolo, Box::new(model));
        info!("{} 模型加载完成", ModelKind::Yolo);
      }
      Err(e) => error!("{} 模型加载失败: {}", ModelKind::Yolo, e),
    }

    #[cfg(feature = "model_unet")]
    match UnetSeg::load(&paths.unet) {
      Ok(model) => {
        models.insert(ModelKind::Unet, Box::new(model));
        info!("{} 模型加载完成", ModelKind::Unet);
      }
      Err(e) => error!("{} 模型加载失败: {}", ModelKind::Unet, e),
    }

    #[cfg(feature = "model_maskrcnn")]
    match MaskRcnnSeg::load(&paths.maskrcnn) {
      Ok(model) => {
        models.insert(ModelKind::MaskRcnn, Box::new(model));
        info!("{} 模型加载完成", ModelKind::MaskRcnn);
      }
      Err(e) => error!("{} 模型加载失败: {}", ModelKind::MaskRcnn, e),
    }

    info!("已加载 {} 个模型", models.len());
    ModelRegistry { models }
  }

  pub fn get(&self, kind: ModelKind) -> Option<&dyn SegModel> {
    self.models.get(&kind).map(|model| model.as_ref())
  }

  pub fn loaded(&self) -> Vec<ModelKind> {
    ModelKind::ALL
      .iter()
      .copied()
      .filter(|kind| self.models.contains_key(kind))
      .collect()
  }

  pub fn is_empty(&self) -> bool {
    self.models.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tag_parsing() {
    assert_eq!(ModelKind::from_tag("yolo"), Some(ModelKind::Yolo));
    assert_eq!(ModelKind::from_tag("YOLOv11"), Some(ModelKind::Yolo));
    assert_eq!(ModelKind::from_tag("UNet"), Some(ModelKind::Unet));
    assert_eq!(ModelKind::from_tag("mask-rcnn"), Some(ModelKind::MaskRcnn));
    assert_eq!(ModelKind::from_tag("resnet"), None);
  }

  #[test]
  fn display_names() {
    assert_eq!(ModelKind::Yolo.to_string(), "YOLOv11");
    assert_eq!(ModelKind::Unet.to_string(), "UNet");
    assert_eq!(ModelKind::MaskRcnn.to_string(), "MaskRCNN");
  }

  #[test]
  fn registry_skips_missing_artifacts() {
    let registry = ModelRegistry::load(&ModelPaths {
      yolo: "does-not-exist/yolo.onnx".to_string(),
      unet: "does-not-exist/unet.onnx".to_string(),
      maskrcnn: "does-not-exist/maskrcnn.onnx".to_string(),
    });
    assert!(registry.is_empty());
    assert!(registry.get(ModelKind::Yolo).is_none());
    assert!(registry.loaded().is_empty());
  }
}
