// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/tile/coords.rs - 经纬度与瓦片索引换算
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

use std::f64::consts::PI;

use thiserror::Error;

/// Web Mercator 投影的纬度有效界限（度），极区无定义
pub const WEB_MERCATOR_LAT_LIMIT: f64 = 85.05;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidCoordinate {
  #[error("纬度超出 Web Mercator 投影范围: {0}")]
  Latitude(f64),
  #[error("经度超出有效范围: {0}")]
  Longitude(f64),
}

/// 地理坐标点（十进制度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
  pub latitude: f64,
  pub longitude: f64,
}

impl GeoPoint {
  pub fn new(latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint {
      latitude,
      longitude,
    }
  }
}

/// 标准 XYZ（slippy map）瓦片索引，由经纬度推导，
/// 可直接作为瓦片服务的请求键。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
  pub x: u32,
  pub y: u32,
  pub zoom: u8,
}

impl TileIndex {
  /// 经纬度转瓦片索引:
  ///
  /// x = ⌊(lon + 180) / 360 · 2^zoom⌋
  /// y = ⌊(1 − ln(tan φ + sec φ) / π) / 2 · 2^zoom⌋
  pub fn from_geo(point: GeoPoint, zoom: u8) -> Result<TileIndex, InvalidCoordinate> {
    if !point.latitude.is_finite() || point.latitude.abs() >= WEB_MERCATOR_LAT_LIMIT {
      return Err(InvalidCoordinate::Latitude(point.latitude));
    }
    if !point.longitude.is_finite() || point.longitude.abs() > 180.0 {
      return Err(InvalidCoordinate::Longitude(point.longitude));
    }

    let n = (1u64 << zoom) as f64;
    let lat_rad = point.latitude.to_radians();
    let x = ((point.longitude + 180.0) / 360.0 * n).floor() as u64;
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor() as u64;

    // lon 恰为 180 时 x 会落在 n 上，收回最后一列
    let max = (1u64 << zoom) - 1;
    Ok(TileIndex {
      x: x.min(max) as u32,
      y: y.min(max) as u32,
      zoom,
    })
  }

  /// 相邻瓦片；超出该缩放级别的瓦片空间时返回 None
  pub fn offset(&self, dx: i64, dy: i64) -> Option<TileIndex> {
    let n = 1i64 << self.zoom;
    let x = self.x as i64 + dx;
    let y = self.y as i64 + dy;
    if x < 0 || y < 0 || x >= n || y >= n {
      return None;
    }
    Some(TileIndex {
      x: x as u32,
      y: y as u32,
      zoom: self.zoom,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_locations() {
    let index = TileIndex::from_geo(GeoPoint::new(22.9749, 76.2168), 16).unwrap();
    assert_eq!((index.x, index.y), (46642, 28468));

    let index = TileIndex::from_geo(GeoPoint::new(51.5074, -0.1278), 10).unwrap();
    assert_eq!((index.x, index.y), (511, 340));

    let index = TileIndex::from_geo(GeoPoint::new(-33.8688, 151.2093), 14).unwrap();
    assert_eq!((index.x, index.y), (15073, 9831));

    let index = TileIndex::from_geo(GeoPoint::new(0.0, 0.0), 1).unwrap();
    assert_eq!((index.x, index.y), (1, 1));
  }

  #[test]
  fn deterministic() {
    let point = GeoPoint::new(22.9749, 76.2168);
    let first = TileIndex::from_geo(point, 16).unwrap();
    let second = TileIndex::from_geo(point, 16).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn rejects_polar_latitude() {
    for latitude in [85.05, -85.05, 86.0, 90.0, -90.0] {
      let result = TileIndex::from_geo(GeoPoint::new(latitude, 0.0), 16);
      assert!(matches!(result, Err(InvalidCoordinate::Latitude(_))));
    }
  }

  #[test]
  fn rejects_out_of_range_longitude() {
    let result = TileIndex::from_geo(GeoPoint::new(0.0, 180.1), 16);
    assert!(matches!(result, Err(InvalidCoordinate::Longitude(_))));
    let result = TileIndex::from_geo(GeoPoint::new(0.0, -200.0), 16);
    assert!(matches!(result, Err(InvalidCoordinate::Longitude(_))));
  }

  #[test]
  fn antimeridian_clamps_to_last_column() {
    let index = TileIndex::from_geo(GeoPoint::new(0.0, 180.0), 4).unwrap();
    assert_eq!(index.x, 15);
  }

  #[test]
  fn offset_stays_inside_tile_space() {
    let index = TileIndex {
      x: 1,
      y: 1,
      zoom: 2,
    };
    assert_eq!(
      index.offset(1, -1),
      Some(TileIndex {
        x: 2,
        y: 0,
        zoom: 2
      })
    );
    assert_eq!(index.offset(-2, 0), None);
    assert_eq!(index.offset(0, 3), None);
  }
}
