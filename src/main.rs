// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use tianmu::input::create_input_source;
use tianmu::model::{ModelKind, ModelPaths, ModelRegistry};
use tianmu::output::ReportWriter;
use tianmu::predictor::predict_image;

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("输入来源: {}", args.input);
  info!("分割模型: {}", args.model);
  info!("输出目录: {}", args.output);

  let kind = ModelKind::from_tag(&args.model)
    .ok_or_else(|| anyhow::anyhow!("未知的模型标签: {}", args.model))?;

  info!("正在加载模型...");
  let registry = ModelRegistry::load(&ModelPaths {
    yolo: args.yolo_model,
    unet: args.unet_model,
    maskrcnn: args.maskrcnn_model,
  });
  if registry.is_empty() {
    anyhow::bail!("没有任何模型加载成功");
  }
  info!("可用模型: {:?}", registry.loaded());

  let source = create_input_source(&args.input)?;
  info!("正在获取输入图像...");
  let image = source.capture()?;
  info!("输入图像尺寸: {}x{}", image.width(), image.height());

  let now = std::time::Instant::now();
  let outcome = predict_image(&registry, kind, image)?;
  info!("推理完成，耗时: {:.2?}", now.elapsed());

  for (name, count) in &outcome.areas {
    info!("类别 {}: {} 像素", name, count);
  }

  let writer = ReportWriter::new(&args.output);
  let directory = writer.write(&outcome)?;
  info!("处理完成，结果目录: {}", directory.display());

  Ok(())
}
