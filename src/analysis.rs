// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/analysis.rs - 面积统计与类别拆分
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

use std::collections::BTreeMap;

use image::{Rgb, RgbImage};

use crate::classes::{CLASS_COUNT, LandClass};
use crate::mask::ClassMask;
use crate::visualizer::Visualizer;

/// 拆分图顶部的文字横幅高度（像素）
const BANNER_HEIGHT: u32 = 50;

/// 统计各类别像素数。六类全部出现在结果中，无像素的类别计数为 0。
pub fn calculate_area(mask: &ClassMask) -> BTreeMap<&'static str, u64> {
  let mut counts = [0u64; CLASS_COUNT];
  for &value in mask.as_raw() {
    if let Some(class) = LandClass::from_index(value) {
      counts[class.index() as usize] += 1;
    }
  }

  LandClass::ALL
    .iter()
    .map(|class| (class.name(), counts[class.index() as usize]))
    .collect()
}

/// 按类别拆分掩码。每个类别生成一张黑底类别色图，
/// 顶部为白色横幅，标注 "{类别} - {像素数} px ({百分比:.2}%)"。
pub fn split_by_class(mask: &ClassMask, visualizer: &Visualizer) -> Vec<RgbImage> {
  let width = mask.width();
  let height = mask.height();
  let total = width as u64 * height as u64;

  let mut images = Vec::with_capacity(CLASS_COUNT);
  for class in LandClass::ALL {
    let mut labeled = RgbImage::from_pixel(width, height + BANNER_HEIGHT, Rgb([255, 255, 255]));

    let mut count = 0u64;
    for y in 0..height {
      for x in 0..width {
        let pixel = if mask.get(x, y) == class.index() {
          count += 1;
          class.color()
        } else {
          Rgb([0, 0, 0])
        };
        labeled.put_pixel(x, y + BANNER_HEIGHT, pixel);
      }
    }

    let percent = if total > 0 {
      count as f64 / total as f64 * 100.0
    } else {
      0.0
    };
    let text = format!("{} - {} px ({:.2}%)", class.name(), count, percent);
    visualizer.draw_banner_text(&mut labeled, BANNER_HEIGHT, &text);

    images.push(labeled);
  }

  images
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn area_counts_every_class() {
    let mask = ClassMask::from_raw(10, 10, vec![2u8; 100]);
    let areas = calculate_area(&mask);

    assert_eq!(areas["Buildings"], 0);
    assert_eq!(areas["Hills"], 0);
    assert_eq!(areas["Land"], 100);
    assert_eq!(areas["Road"], 0);
    assert_eq!(areas["Vegetation"], 0);
    assert_eq!(areas["Water"], 0);
    assert_eq!(areas.len(), CLASS_COUNT);
  }

  #[test]
  fn area_mixed_mask() {
    let mut mask = ClassMask::new(4, 1);
    mask.set(0, 0, 5);
    mask.set(1, 0, 5);
    mask.set(2, 0, 4);

    let areas = calculate_area(&mask);
    assert_eq!(areas["Water"], 2);
    assert_eq!(areas["Vegetation"], 1);
    assert_eq!(areas["Buildings"], 1);
  }

  #[test]
  fn split_produces_one_image_per_class() {
    let mask = ClassMask::from_raw(8, 6, vec![5u8; 48]);
    let visualizer = Visualizer::new();
    let images = split_by_class(&mask, &visualizer);

    assert_eq!(images.len(), CLASS_COUNT);
    for image in &images {
      assert_eq!(image.dimensions(), (8, 6 + BANNER_HEIGHT));
    }

    // Water 全覆盖：横幅下方为类别色
    let water = &images[LandClass::Water.index() as usize];
    assert_eq!(water.get_pixel(0, BANNER_HEIGHT), &LandClass::Water.color());
    // 其余类别无像素：横幅下方为黑底
    let land = &images[LandClass::Land.index() as usize];
    assert_eq!(land.get_pixel(0, BANNER_HEIGHT), &Rgb([0, 0, 0]));
  }
}
