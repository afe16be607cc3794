// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/output.rs - 结果输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::classes::LandClass;
use crate::predictor::PredictOutcome;

/// 预测结果写出器：每次请求写入一个带时间戳的子目录，
/// 包含原图、叠加图、各类别拆分图与面积统计 JSON。
pub struct ReportWriter {
  base: PathBuf,
}

impl ReportWriter {
  pub fn new(base: impl Into<PathBuf>) -> ReportWriter {
    ReportWriter { base: base.into() }
  }

  /// 写出本次请求的全部结果，返回结果目录
  pub fn write(&self, outcome: &PredictOutcome) -> Result<PathBuf> {
    let directory = self
      .base
      .join(Local::now().format("%Y%m%d-%H%M%S").to_string());
    fs::create_dir_all(&directory)
      .with_context(|| format!("无法创建输出目录: {}", directory.display()))?;

    outcome.original.save(directory.join("original.png"))?;
    outcome.overlay.save(directory.join("overlay.png"))?;

    for (class, image) in LandClass::ALL.iter().zip(&outcome.split_images) {
      let filename = format!("class_{}.png", class.name().to_lowercase());
      image.save(directory.join(filename))?;
    }

    let areas = serde_json::to_string_pretty(&outcome.areas)?;
    fs::write(directory.join("areas.json"), areas)?;

    info!("结果已写入: {}", directory.display());
    Ok(directory)
  }
}

#[cfg(test)]
mod tests {
  use image::RgbImage;

  use super::*;
  use crate::analysis::{calculate_area, split_by_class};
  use crate::mask::ClassMask;
  use crate::visualizer::Visualizer;

  #[test]
  fn writes_full_report() {
    let mask = ClassMask::from_raw(4, 4, vec![2u8; 16]);
    let visualizer = Visualizer::new();
    let outcome = PredictOutcome {
      original: RgbImage::new(4, 4),
      overlay: RgbImage::new(4, 4),
      split_images: split_by_class(&mask, &visualizer),
      areas: calculate_area(&mask),
      mask,
    };

    let base = std::env::temp_dir().join("tianmu-report-test");
    let writer = ReportWriter::new(&base);
    let directory = writer.write(&outcome).unwrap();

    assert!(directory.join("original.png").exists());
    assert!(directory.join("overlay.png").exists());
    assert!(directory.join("class_water.png").exists());

    let areas = fs::read_to_string(directory.join("areas.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&areas).unwrap();
    assert_eq!(parsed["Land"], 16);
    assert_eq!(parsed["Water"], 0);

    fs::remove_dir_all(&base).unwrap();
  }
}
