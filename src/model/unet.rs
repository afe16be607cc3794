// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/model/unet.rs - 语义分割模型（UNet 变体）
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::HashMap;
use std::sync::Mutex;

use image::{GrayImage, Luma, RgbImage, imageops::FilterType};
use imageproc::region_labelling::{Connectivity, connected_components};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use tracing::{debug, info};

use super::{ModelPredictionError, Prediction, SegModel};
use crate::classes::{CLASS_COUNT, LandClass};
use crate::mask::ClassMask;
use crate::visualizer::Visualizer;

const UNET_INPUT_SIZE: u32 = 256;

/// 语义分割模型。权重为 ONNX 导出，输入 256x256 归一化 RGB（NHWC），
/// 输出逐像素类别概率图 (1,H,W,类别数)。
pub struct UnetSeg {
  session: Mutex<Session>,
  visualizer: Visualizer,
}

impl UnetSeg {
  pub fn load(path: &str) -> Result<UnetSeg, ModelPredictionError> {
    info!("加载模型文件: {}", path);
    let session = Session::builder()
      .and_then(|builder| builder.with_intra_threads(4))
      .and_then(|builder| builder.commit_from_file(path))
      .map_err(ModelPredictionError::Load)?;

    Ok(UnetSeg {
      session: Mutex::new(session),
      visualizer: Visualizer::new(),
    })
  }
}

impl SegModel for UnetSeg {
  fn predict(&self, image: &RgbImage) -> Result<Prediction, ModelPredictionError> {
    let (orig_w, orig_h) = image.dimensions();
    let resized = image::imageops::resize(image, UNET_INPUT_SIZE, UNET_INPUT_SIZE, FilterType::Triangle);

    let size = UNET_INPUT_SIZE as usize;
    let mut input = Array4::<f32>::zeros((1, size, size, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
      for channel in 0..3 {
        input[[0, y as usize, x as usize, channel]] = pixel[channel] as f32 / 255.0;
      }
    }

    let mut session = self.session.lock().expect("模型会话锁中毒");
    let outputs = session.run(ort::inputs!["input" => TensorRef::from_array_view(&input)?])?;

    let (shape, probabilities) = outputs
      .get("output")
      .ok_or(ModelPredictionError::MissingOutput("output"))?
      .try_extract_tensor::<f32>()?;

    if shape.len() != 4 || shape[3] as usize != CLASS_COUNT {
      return Err(ModelPredictionError::OutputShape(format!(
        "概率图应为 (1,H,W,{})，实际 {:?}",
        CLASS_COUNT, shape
      )));
    }
    let map_h = shape[1] as usize;
    let map_w = shape[2] as usize;

    // 逐像素取概率最大的类别
    let mut mask = ClassMask::new(map_w as u32, map_h as u32);
    for y in 0..map_h {
      for x in 0..map_w {
        let mut best = 0u8;
        let mut best_score = f32::MIN;
        for class in 0..CLASS_COUNT {
          let score = probabilities[(y * map_w + x) * CLASS_COUNT + class];
          if score > best_score {
            best_score = score;
            best = class as u8;
          }
        }
        mask.set(x as u32, y as u32, best);
      }
    }

    let mask = mask.resize_nearest(orig_w, orig_h);
    let mut overlay = mask.blend_over(image);
    self.label_regions(&mask, &mut overlay);

    debug!("语义掩码尺寸: {}x{}", mask.width(), mask.height());
    Ok(Prediction { overlay, mask })
  }
}

impl UnetSeg {
  /// 在每个连通区域的质心处标注类别名
  fn label_regions(&self, mask: &ClassMask, overlay: &mut RgbImage) {
    for class in LandClass::ALL {
      let mut binary = GrayImage::new(mask.width(), mask.height());
      let mut present = false;
      for y in 0..mask.height() {
        for x in 0..mask.width() {
          if mask.get(x, y) == class.index() {
            binary.put_pixel(x, y, Luma([255u8]));
            present = true;
          }
        }
      }
      if !present {
        continue;
      }

      let components = connected_components(&binary, Connectivity::Four, Luma([0u8]));
      let mut regions: HashMap<u32, (u64, u64, u64)> = HashMap::new();
      for (x, y, label) in components.enumerate_pixels().map(|(x, y, l)| (x, y, l[0])) {
        if label == 0 {
          continue;
        }
        let entry = regions.entry(label).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 += x as u64;
        entry.2 += y as u64;
      }

      for (count, sum_x, sum_y) in regions.values() {
        let cx = (sum_x / count) as i32;
        let cy = (sum_y / count) as i32;
        self
          .visualizer
          .draw_label(overlay, cx, cy, class.color(), class.name());
      }
    }
  }
}
