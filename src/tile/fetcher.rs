// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/tile/fetcher.rs - 影像瓦片抓取
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::time::Duration;

use image::RgbImage;
use thiserror::Error;
use tracing::debug;

use super::coords::TileIndex;

/// Esri World Imagery 瓦片服务地址
pub const ESRI_TILE_BASE_URL: &str =
  "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Error, Debug)]
pub enum TileFetchError {
  #[error("HTTP 请求失败: {0}")]
  Request(reqwest::Error),
  #[error("HTTP 状态异常: {0}")]
  Status(reqwest::StatusCode),
  #[error("瓦片图像解码失败: {0}")]
  Decode(image::ImageError),
  #[error("瓦片索引超出该缩放级别的范围")]
  OutOfRange,
}

impl From<reqwest::Error> for TileFetchError {
  fn from(err: reqwest::Error) -> Self {
    TileFetchError::Request(err)
  }
}

impl From<image::ImageError> for TileFetchError {
  fn from(err: image::ImageError) -> Self {
    TileFetchError::Decode(err)
  }
}

/// 瓦片抓取器。不做缓存，每次调用都重新请求，失败不重试。
pub struct TileFetcher {
  client: reqwest::blocking::Client,
  base_url: String,
}

impl TileFetcher {
  pub fn new() -> Result<TileFetcher, TileFetchError> {
    TileFetcher::with_base_url(ESRI_TILE_BASE_URL)
  }

  pub fn with_base_url(base_url: impl Into<String>) -> Result<TileFetcher, TileFetchError> {
    let client = reqwest::blocking::Client::builder()
      .timeout(FETCH_TIMEOUT)
      .user_agent(FETCH_USER_AGENT)
      .build()?;

    Ok(TileFetcher {
      client,
      base_url: base_url.into(),
    })
  }

  /// 瓦片请求地址，路径中 y 在 x 之前
  pub fn tile_url(&self, index: &TileIndex) -> String {
    format!("{}/{}/{}/{}", self.base_url, index.zoom, index.y, index.x)
  }

  /// 抓取单块 256x256 瓦片并解码为 RGB
  pub fn fetch(&self, index: &TileIndex) -> Result<RgbImage, TileFetchError> {
    let url = self.tile_url(index);
    debug!("抓取瓦片: {}", url);

    let response = self.client.get(&url).send()?;
    if !response.status().is_success() {
      return Err(TileFetchError::Status(response.status()));
    }

    let body = response.bytes()?;
    let image = image::load_from_memory(&body)?;
    Ok(image.into_rgb8())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tile_url_puts_y_before_x() {
    let fetcher = TileFetcher::with_base_url("https://tiles.example/base").unwrap();
    let index = TileIndex {
      x: 46642,
      y: 28468,
      zoom: 16,
    };
    assert_eq!(
      fetcher.tile_url(&index),
      "https://tiles.example/base/16/28468/46642"
    );
  }

  #[test]
  fn default_endpoint_is_esri() {
    let fetcher = TileFetcher::new().unwrap();
    let index = TileIndex {
      x: 1,
      y: 2,
      zoom: 3,
    };
    assert!(fetcher.tile_url(&index).starts_with(ESRI_TILE_BASE_URL));
  }
}
