// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/input/mod.rs - 输入源模块
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod image_source;
mod map_source;

use anyhow::Result;
use image::RgbImage;

pub use image_source::ImageFileSource;
pub use map_source::{DEFAULT_GRID_SIZE, DEFAULT_ZOOM, MapSource, MapSourceError, ZOOM_RANGE};

use crate::{FromUrl, FromUrlWithScheme};

/// 输入源类型
pub enum InputSourceType {
  /// 图片文件
  Image,
  /// 地图位置截取
  Map,
}

/// 输入源 trait：每个预测请求取得一张 RGB 图像
pub trait InputSource {
  /// 获取输入源类型
  fn source_type(&self) -> InputSourceType;

  /// 获取输入图像
  fn capture(&self) -> Result<RgbImage>;
}

/// 从来源字符串创建输入源
///
/// - `map://22.9749,76.2168?zoom=16&grid=3` 形式为地图位置
/// - 其余按图片文件路径处理
pub fn create_input_source(source: &str) -> Result<Box<dyn InputSource>> {
  if source.contains("://") {
    let url = url::Url::parse(source)?;
    if url.scheme() == MapSource::SCHEME {
      return Ok(Box::new(MapSource::from_url(&url)?));
    }
    anyhow::bail!("不支持的输入方案: {}", url.scheme());
  }

  let lower = source.to_lowercase();
  if lower.ends_with(".jpg")
    || lower.ends_with(".jpeg")
    || lower.ends_with(".png")
    || lower.ends_with(".bmp")
    || lower.ends_with(".gif")
    || lower.ends_with(".webp")
  {
    return Ok(Box::new(ImageFileSource::new(source)));
  }

  anyhow::bail!("无法识别的输入来源: {}", source)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sniffs_image_files() {
    let source = create_input_source("scene.png").unwrap();
    assert!(matches!(source.source_type(), InputSourceType::Image));
    let source = create_input_source("photos/area.JPG").unwrap();
    assert!(matches!(source.source_type(), InputSourceType::Image));
  }

  #[test]
  fn sniffs_map_urls() {
    let source = create_input_source("map://22.9749,76.2168?zoom=16").unwrap();
    assert!(matches!(source.source_type(), InputSourceType::Map));
  }

  #[test]
  fn rejects_unknown_sources() {
    assert!(create_input_source("notes.txt").is_err());
    assert!(create_input_source("rtsp://camera/stream").is_err());
  }
}
