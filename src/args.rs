// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use clap::Parser;

/// Tianmu 卫星影像地物分割演示
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源
  /// 支持格式:
  /// - 图片: *.jpg, *.jpeg, *.png, *.bmp, *.gif, *.webp
  /// - 地图位置: map://22.9749,76.2168?zoom=16&grid=3
  #[arg(long, value_name = "SOURCE")]
  pub input: String,

  /// 分割模型 (yolo | unet | maskrcnn)
  #[arg(long, default_value = "yolo", value_name = "MODEL")]
  pub model: String,

  /// 输出目录
  #[arg(long, default_value = "output", value_name = "DIR")]
  pub output: String,

  /// YOLO 分割模型权重路径
  #[arg(long, default_value = "models/yolo_seg.onnx", value_name = "FILE")]
  pub yolo_model: String,

  /// UNet 分割模型权重路径
  #[arg(long, default_value = "models/unet_landcover.onnx", value_name = "FILE")]
  pub unet_model: String,

  /// Mask R-CNN 分割模型权重路径
  #[arg(long, default_value = "models/maskrcnn_landcover.onnx", value_name = "FILE")]
  pub maskrcnn_model: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let args = Args::parse_from(["tianmu", "--input", "scene.png"]);
    assert_eq!(args.input, "scene.png");
    assert_eq!(args.model, "yolo");
    assert_eq!(args.output, "output");
    assert_eq!(args.yolo_model, "models/yolo_seg.onnx");
  }

  #[test]
  fn map_input_passthrough() {
    let args = Args::parse_from([
      "tianmu",
      "--input",
      "map://22.9749,76.2168?zoom=16",
      "--model",
      "unet",
    ]);
    assert_eq!(args.input, "map://22.9749,76.2168?zoom=16");
    assert_eq!(args.model, "unet");
  }
}
