// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/tile/stitcher.rs - 瓦片拼接
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::RgbImage;
use tracing::{info, warn};

use super::TILE_SIZE;
use super::coords::{GeoPoint, InvalidCoordinate, TileIndex};
use super::fetcher::{TileFetchError, TileFetcher};

/// 以目标位置所在瓦片为中心，抓取 grid_size × grid_size 块瓦片并拼接。
///
/// 单块瓦片失败只记录日志，对应格子保持背景填充，拼接不会中止；
/// 输出尺寸恒为 (256·grid_size)²。
pub fn stitch_map(
  fetcher: &TileFetcher,
  center: GeoPoint,
  zoom: u8,
  grid_size: u32,
) -> Result<RgbImage, InvalidCoordinate> {
  let center_tile = TileIndex::from_geo(center, zoom)?;
  info!(
    "中心瓦片: x={} y={} zoom={}",
    center_tile.x, center_tile.y, center_tile.zoom
  );
  Ok(stitch_tiles(center_tile, grid_size, |index| {
    fetcher.fetch(&index)
  }))
}

/// 按位移并发抓取瓦片并写入画布。位移 (dx, dy) 对应的瓦片
/// 放置在像素偏移 ((dx+half)·256, (dy+half)·256)，
/// 各瓦片写入互不重叠的区域，全部抓取结束后才返回。
pub fn stitch_tiles<F>(center: TileIndex, grid_size: u32, fetch: F) -> RgbImage
where
  F: Fn(TileIndex) -> Result<RgbImage, TileFetchError> + Sync,
{
  if grid_size % 2 == 0 {
    panic!("网格边长必须为奇数: {}", grid_size);
  }

  let half = (grid_size / 2) as i64;
  let mut canvas = RgbImage::new(TILE_SIZE * grid_size, TILE_SIZE * grid_size);

  std::thread::scope(|scope| {
    let mut pending = Vec::new();
    for dx in -half..=half {
      for dy in -half..=half {
        let fetch = &fetch;
        let handle = scope.spawn(move || {
          let index = center.offset(dx, dy).ok_or(TileFetchError::OutOfRange)?;
          fetch(index)
        });
        pending.push(((dx, dy), handle));
      }
    }

    for ((dx, dy), handle) in pending {
      match handle.join().expect("瓦片抓取线程异常退出") {
        Ok(tile) => {
          let px = ((dx + half) as u32 * TILE_SIZE) as i64;
          let py = ((dy + half) as u32 * TILE_SIZE) as i64;
          image::imageops::replace(&mut canvas, &tile, px, py);
        }
        Err(e) => {
          warn!(
            "跳过瓦片 ({}, {}): {}",
            center.x as i64 + dx,
            center.y as i64 + dy,
            e
          );
        }
      }
    }
  });

  canvas
}
