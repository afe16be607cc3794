// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/input/map_source.rs - 地图位置输入
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

use anyhow::Result;
use image::RgbImage;
use thiserror::Error;
use tracing::info;
use url::Url;

use super::{InputSource, InputSourceType};
use crate::tile::{GeoPoint, TileFetchError, TileFetcher, stitch_map};
use crate::{FromUrl, FromUrlWithScheme};

/// 缺省缩放级别
pub const DEFAULT_ZOOM: u8 = 16;
/// 缺省拼接网格边长
pub const DEFAULT_GRID_SIZE: u32 = 3;
/// 允许的缩放级别范围，低于 14 的影像分辨率不足
pub const ZOOM_RANGE: std::ops::RangeInclusive<u8> = 14..=20;

#[derive(Error, Debug)]
pub enum MapSourceError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("地图位置格式无效: {0}（应为 lat,lon）")]
  BadLocation(String),
  #[error("缩放级别无效: {0}（允许 14-20）")]
  BadZoom(String),
  #[error("网格边长无效: {0}（应为正奇数）")]
  BadGridSize(String),
  #[error("HTTP 客户端创建失败: {0}")]
  Fetcher(TileFetchError),
}

impl From<TileFetchError> for MapSourceError {
  fn from(err: TileFetchError) -> Self {
    MapSourceError::Fetcher(err)
  }
}

/// 地图位置输入源：抓取并拼接以目标位置为中心的卫星影像
pub struct MapSource {
  center: GeoPoint,
  zoom: u8,
  grid_size: u32,
  fetcher: TileFetcher,
}

impl FromUrlWithScheme for MapSource {
  const SCHEME: &'static str = "map";
}

impl FromUrl for MapSource {
  type Error = MapSourceError;

  /// 形如 `map://22.9749,76.2168?zoom=16&grid=3`，
  /// zoom 与 grid 可省略
  fn from_url(url: &Url) -> Result<Self, MapSourceError> {
    if url.scheme() != Self::SCHEME {
      return Err(MapSourceError::SchemeMismatch);
    }

    let location = url.host_str().unwrap_or_default();
    let (lat, lon) = location
      .split_once(',')
      .ok_or_else(|| MapSourceError::BadLocation(location.to_string()))?;
    let latitude = lat
      .trim()
      .parse::<f64>()
      .map_err(|_| MapSourceError::BadLocation(location.to_string()))?;
    let longitude = lon
      .trim()
      .parse::<f64>()
      .map_err(|_| MapSourceError::BadLocation(location.to_string()))?;

    let mut zoom = DEFAULT_ZOOM;
    let mut grid_size = DEFAULT_GRID_SIZE;
    for (key, value) in url.query_pairs() {
      match key.as_ref() {
        "zoom" => {
          zoom = value
            .parse()
            .map_err(|_| MapSourceError::BadZoom(value.to_string()))?;
          if !ZOOM_RANGE.contains(&zoom) {
            return Err(MapSourceError::BadZoom(value.to_string()));
          }
        }
        "grid" => {
          grid_size = value
            .parse()
            .map_err(|_| MapSourceError::BadGridSize(value.to_string()))?;
          if grid_size == 0 || grid_size % 2 == 0 {
            return Err(MapSourceError::BadGridSize(value.to_string()));
          }
        }
        _ => {}
      }
    }

    Ok(MapSource {
      center: GeoPoint::new(latitude, longitude),
      zoom,
      grid_size,
      fetcher: TileFetcher::new()?,
    })
  }
}

impl InputSource for MapSource {
  fn source_type(&self) -> InputSourceType {
    InputSourceType::Map
  }

  fn capture(&self) -> Result<RgbImage> {
    info!(
      "截取地图影像: ({:.5}, {:.5}) zoom={} grid={}",
      self.center.latitude, self.center.longitude, self.zoom, self.grid_size
    );
    Ok(stitch_map(
      &self.fetcher,
      self.center,
      self.zoom,
      self.grid_size,
    )?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(source: &str) -> Result<MapSource, MapSourceError> {
    MapSource::from_url(&Url::parse(source).unwrap())
  }

  #[test]
  fn defaults_without_query() {
    let source = parse("map://22.9749,76.2168").unwrap();
    assert_eq!(source.center, GeoPoint::new(22.9749, 76.2168));
    assert_eq!(source.zoom, DEFAULT_ZOOM);
    assert_eq!(source.grid_size, DEFAULT_GRID_SIZE);
  }

  #[test]
  fn explicit_zoom_and_grid() {
    let source = parse("map://22.9749,76.2168?zoom=18&grid=5").unwrap();
    assert_eq!(source.zoom, 18);
    assert_eq!(source.grid_size, 5);
  }

  #[test]
  fn negative_coordinates() {
    let source = parse("map://-33.8688,151.2093?zoom=14").unwrap();
    assert_eq!(source.center, GeoPoint::new(-33.8688, 151.2093));
  }

  #[test]
  fn rejects_out_of_range_zoom() {
    assert!(matches!(
      parse("map://22.9749,76.2168?zoom=13"),
      Err(MapSourceError::BadZoom(_))
    ));
    assert!(matches!(
      parse("map://22.9749,76.2168?zoom=21"),
      Err(MapSourceError::BadZoom(_))
    ));
  }

  #[test]
  fn rejects_even_grid() {
    assert!(matches!(
      parse("map://22.9749,76.2168?grid=2"),
      Err(MapSourceError::BadGridSize(_))
    ));
    assert!(matches!(
      parse("map://22.9749,76.2168?grid=0"),
      Err(MapSourceError::BadGridSize(_))
    ));
  }

  #[test]
  fn rejects_bad_location() {
    assert!(matches!(
      parse("map://somewhere"),
      Err(MapSourceError::BadLocation(_))
    ));
  }

  #[test]
  fn rejects_wrong_scheme() {
    assert!(matches!(
      parse("tiles://22.9749,76.2168"),
      Err(MapSourceError::SchemeMismatch)
    ));
  }
}
