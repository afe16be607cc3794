// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/model/maskrcnn.rs - 备选检测模型（Mask R-CNN 变体）
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::sync::Mutex;

use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use tracing::{debug, info};

use super::{ModelPredictionError, Prediction, SegModel};
use crate::classes::LandClass;
use crate::mask::ClassMask;
use crate::visualizer::Visualizer;

const MASK_THRESHOLD: f32 = 0.5;
const SCORE_THRESHOLD: f32 = 0.5;

/// 实例分割备选模型。以原始分辨率推理，权重为 ONNX 导出，
/// 输出 masks (N,H,W)、classes (N)、boxes (N,4)、scores (N)。
/// 像素值保持 0-255，与训练时的预处理一致。
pub struct MaskRcnnSeg {
  session: Mutex<Session>,
  visualizer: Visualizer,
}

impl MaskRcnnSeg {
  pub fn load(path: &str) -> Result<MaskRcnnSeg, ModelPredictionError> {
    info!("加载模型文件: {}", path);
    let session = Session::builder()
      .and_then(|builder| builder.with_intra_threads(4))
      .and_then(|builder| builder.commit_from_file(path))
      .map_err(ModelPredictionError::Load)?;

    Ok(MaskRcnnSeg {
      session: Mutex::new(session),
      visualizer: Visualizer::new(),
    })
  }
}

impl SegModel for MaskRcnnSeg {
  fn predict(&self, image: &RgbImage) -> Result<Prediction, ModelPredictionError> {
    let (width, height) = image.dimensions();

    let mut input = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
      for channel in 0..3 {
        input[[0, channel, y as usize, x as usize]] = pixel[channel] as f32;
      }
    }

    let mut session = self.session.lock().expect("模型会话锁中毒");
    let outputs = session.run(ort::inputs!["images" => TensorRef::from_array_view(&input)?])?;

    let (mask_shape, mask_data) = outputs
      .get("masks")
      .ok_or(ModelPredictionError::MissingOutput("masks"))?
      .try_extract_tensor::<f32>()?;
    let (_, class_data) = outputs
      .get("classes")
      .ok_or(ModelPredictionError::MissingOutput("classes"))?
      .try_extract_tensor::<f32>()?;
    let (_, box_data) = outputs
      .get("boxes")
      .ok_or(ModelPredictionError::MissingOutput("boxes"))?
      .try_extract_tensor::<f32>()?;
    let (_, score_data) = outputs
      .get("scores")
      .ok_or(ModelPredictionError::MissingOutput("scores"))?
      .try_extract_tensor::<f32>()?;

    if mask_shape.len() != 3 {
      return Err(ModelPredictionError::OutputShape(format!(
        "masks 应为 (N,H,W)，实际 {:?}",
        mask_shape
      )));
    }
    let count = mask_shape[0] as usize;
    let mask_h = mask_shape[1] as usize;
    let mask_w = mask_shape[2] as usize;
    if class_data.len() < count || box_data.len() < count * 4 || score_data.len() < count {
      return Err(ModelPredictionError::OutputShape(format!(
        "classes/boxes/scores 数量与实例数 {} 不符",
        count
      )));
    }

    let mut mask = ClassMask::new(mask_w as u32, mask_h as u32);
    let mut kept = 0usize;
    for instance in 0..count {
      if score_data[instance] < SCORE_THRESHOLD {
        continue;
      }
      kept += 1;
      let class_index = class_data[instance] as u8;
      let plane = &mask_data[instance * mask_h * mask_w..(instance + 1) * mask_h * mask_w];
      for y in 0..mask_h {
        for x in 0..mask_w {
          if plane[y * mask_w + x] > MASK_THRESHOLD {
            mask.set(x as u32, y as u32, class_index);
          }
        }
      }
    }

    let mask = mask.resize_nearest(width, height);
    let mut overlay = mask.blend_over(image);

    for instance in 0..count {
      if score_data[instance] < SCORE_THRESHOLD {
        continue;
      }
      let Some(class) = LandClass::from_index(class_data[instance] as u8) else {
        continue;
      };
      let x1 = box_data[instance * 4] as i32;
      let y1 = box_data[instance * 4 + 1] as i32;
      let x2 = box_data[instance * 4 + 2] as i32;
      let y2 = box_data[instance * 4 + 3] as i32;

      self.visualizer.draw_box(&mut overlay, x1, y1, x2, y2, class.color());
      self
        .visualizer
        .draw_label(&mut overlay, x1, y1 - 10, class.color(), class.name());
    }

    debug!("保留 {} / {} 个实例", kept, count);
    Ok(Prediction { overlay, mask })
  }
}
