// 该文件是 Tianmu （天目观澜） 项目的一部分。
// src/visualizer.rs - 可视化工具
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

/// 可视化工具
pub struct Visualizer {
  /// 字体
  font: FontArc,
  /// 标签字体大小
  label_scale: PxScale,
  /// 横幅字体大小
  banner_scale: PxScale,
}

impl Default for Visualizer {
  fn default() -> Self {
    Self::new()
  }
}

impl Visualizer {
  /// 创建一个新的可视化工具
  pub fn new() -> Self {
    // 使用内置的默认字体数据
    let font_data = include_bytes!("../assets/DejaVuSans.ttf");
    let font = FontArc::try_from_slice(font_data).expect("无法加载字体");

    Self {
      font,
      label_scale: PxScale::from(16.0),
      banner_scale: PxScale::from(30.0),
    }
  }

  /// 绘制边界框（双线描边以增加可见度）
  pub fn draw_box(&self, image: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb<u8>) {
    let x = x1.max(0);
    let y = y1.max(0);
    let width = x2.min(image.width() as i32) - x;
    let height = y2.min(image.height() as i32) - y;
    if width <= 0 || height <= 0 {
      return;
    }

    let rect = Rect::at(x, y).of_size(width as u32, height as u32);
    draw_hollow_rect_mut(image, rect, color);

    if width > 2 && height > 2 {
      let inner = Rect::at(x + 1, y + 1).of_size(width as u32 - 2, height as u32 - 2);
      draw_hollow_rect_mut(image, inner, color);
    }
  }

  /// 在指定位置绘制文本标签
  pub fn draw_label(&self, image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
    draw_text_mut(
      image,
      color,
      x.max(0),
      y.max(0),
      self.label_scale,
      &self.font,
      text,
    );
  }

  /// 在图像顶部横幅区域居中绘制黑色文本
  pub fn draw_banner_text(&self, image: &mut RgbImage, banner_height: u32, text: &str) {
    let (text_width, text_height) = text_size(self.banner_scale, &self.font, text);
    let x = image.width().saturating_sub(text_width) / 2;
    let y = banner_height.saturating_sub(text_height) / 2;
    draw_text_mut(
      image,
      Rgb([0, 0, 0]),
      x as i32,
      y as i32,
      self.banner_scale,
      &self.font,
      text,
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn banner_text_marks_pixels() {
    let visualizer = Visualizer::new();
    let mut image = RgbImage::from_pixel(300, 50, Rgb([255, 255, 255]));
    visualizer.draw_banner_text(&mut image, 50, "Water - 100 px (100.00%)");
    assert!(image.pixels().any(|pixel| pixel != &Rgb([255, 255, 255])));
  }

  #[test]
  fn degenerate_box_is_ignored() {
    let visualizer = Visualizer::new();
    let mut image = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
    visualizer.draw_box(&mut image, 10, 10, 10, 10, Rgb([235, 16, 16]));
    assert!(image.pixels().all(|pixel| pixel == &Rgb([255, 255, 255])));
  }
}
