// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/input/image_source.rs - 图片文件输入
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::{Context, Result};
use image::{ImageReader, RgbImage};
use tracing::info;

use super::{InputSource, InputSourceType};

/// 图片文件输入源，解码后统一转为 RGB
pub struct ImageFileSource {
  path: String,
}

impl ImageFileSource {
  pub fn new(path: impl Into<String>) -> ImageFileSource {
    ImageFileSource { path: path.into() }
  }
}

impl InputSource for ImageFileSource {
  fn source_type(&self) -> InputSourceType {
    InputSourceType::Image
  }

  fn capture(&self) -> Result<RgbImage> {
    info!("读取图片文件: {}", self.path);
    let image = ImageReader::open(&self.path)
      .with_context(|| format!("无法打开图片文件: {}", self.path))?
      .decode()
      .with_context(|| format!("图片解码失败: {}", self.path))?;
    Ok(image.into_rgb8())
  }
}
