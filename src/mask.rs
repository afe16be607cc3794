// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/mask.rs - 类别掩码定义
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

use image::{GrayImage, Rgb, RgbImage, imageops::FilterType};

use crate::classes::LandClass;

/// 逐像素类别掩码，像素值为类别序号。
/// 由推理产生，生成后不再修改。
#[derive(Debug, Clone)]
pub struct ClassMask {
  width: u32,
  height: u32,
  data: Box<[u8]>,
}

impl ClassMask {
  /// 全零掩码（类别 0）
  pub fn new(width: u32, height: u32) -> Self {
    let data = vec![0u8; (width as usize) * (height as usize)].into_boxed_slice();
    Self {
      width,
      height,
      data,
    }
  }

  pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Self {
    if data.len() != (width as usize) * (height as usize) {
      panic!(
        "掩码数据长度不匹配: 期望长度 {}, 实际长度 {}",
        (width as usize) * (height as usize),
        data.len()
      );
    }

    Self {
      width,
      height,
      data: data.into_boxed_slice(),
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn get(&self, x: u32, y: u32) -> u8 {
    self.data[(y as usize) * (self.width as usize) + (x as usize)]
  }

  pub fn set(&mut self, x: u32, y: u32, class_index: u8) {
    self.data[(y as usize) * (self.width as usize) + (x as usize)] = class_index;
  }

  pub fn as_raw(&self) -> &[u8] {
    &self.data
  }

  /// 最近邻缩放，类别序号不做插值
  pub fn resize_nearest(&self, width: u32, height: u32) -> ClassMask {
    if width == self.width && height == self.height {
      return self.clone();
    }

    let gray = GrayImage::from_raw(self.width, self.height, self.data.to_vec())
      .expect("掩码数据长度不匹配");
    let resized = image::imageops::resize(&gray, width, height, FilterType::Nearest);
    ClassMask::from_raw(width, height, resized.into_raw())
  }

  /// 按类别配色生成彩色掩码图；未知类别序号画为白色
  pub fn to_color_image(&self) -> RgbImage {
    let mut image = RgbImage::new(self.width, self.height);
    for y in 0..self.height {
      for x in 0..self.width {
        let color = LandClass::from_index(self.get(x, y))
          .map(LandClass::color)
          .unwrap_or(Rgb([255, 255, 255]));
        image.put_pixel(x, y, color);
      }
    }
    image
  }

  /// 与原图做 50/50 混合生成叠加图，尺寸必须一致
  pub fn blend_over(&self, image: &RgbImage) -> RgbImage {
    if image.dimensions() != (self.width, self.height) {
      panic!(
        "掩码与图像尺寸不匹配: {}x{} 与 {}x{}",
        self.width,
        self.height,
        image.width(),
        image.height()
      );
    }

    let color_mask = self.to_color_image();
    let mut overlay = RgbImage::new(self.width, self.height);
    for (x, y, pixel) in overlay.enumerate_pixels_mut() {
      let base = image.get_pixel(x, y);
      let tint = color_mask.get_pixel(x, y);
      for channel in 0..3 {
        pixel[channel] = ((base[channel] as u16 + tint[channel] as u16) / 2) as u8;
      }
    }
    overlay
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_and_get() {
    let mut mask = ClassMask::new(4, 3);
    assert_eq!(mask.get(0, 0), 0);
    mask.set(3, 2, 5);
    assert_eq!(mask.get(3, 2), 5);
    assert_eq!(mask.as_raw().len(), 12);
  }

  #[test]
  #[should_panic]
  fn from_raw_rejects_wrong_length() {
    let _ = ClassMask::from_raw(2, 2, vec![0u8; 3]);
  }

  #[test]
  fn resize_keeps_class_indices() {
    let mut mask = ClassMask::new(2, 2);
    mask.set(0, 0, 4);
    mask.set(1, 1, 5);

    let resized = mask.resize_nearest(4, 4);
    assert_eq!(resized.width(), 4);
    assert_eq!(resized.height(), 4);
    assert_eq!(resized.get(0, 0), 4);
    assert_eq!(resized.get(3, 3), 5);
  }

  #[test]
  fn blend_is_average() {
    let mut mask = ClassMask::new(1, 1);
    mask.set(0, 0, 5); // Water (19, 158, 244)

    let mut base = RgbImage::new(1, 1);
    base.put_pixel(0, 0, Rgb([100, 100, 100]));

    let overlay = mask.blend_over(&base);
    assert_eq!(overlay.get_pixel(0, 0), &Rgb([59, 129, 172]));
  }
}
