// 该文件是 Mailuo （脉络） 项目的一部分。
// src/segment.rs - 前景分割
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

use std::collections::HashSet;

use image::{GrayImage, Luma};
use imageproc::{
  contrast::otsu_level,
  region_labelling::{Connectivity, connected_components},
};
use thiserror::Error;
use tracing::debug;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentError {
  #[error("二值掩码中没有前景区域")]
  NoForeground,
  #[error("最大前景区域面积为零")]
  EmptyRegion,
}

/// 选中的前景区域（外轮廓内部，含被包围的空洞）
#[derive(Debug, Clone)]
pub struct Region {
  /// 二值化所用阈值，前景为严格大于该值的像素
  pub threshold: u8,
  /// 区域在行优先扫描中遇到的第一个像素 (x, y)
  pub origin: (u32, u32),
  /// 区域像素数，即 S_unoccluded
  pub pixel_count: u32,
  /// 仅包含该区域的掩码
  pub mask: GrayImage,
}

#[derive(Debug, Clone, Copy)]
struct RegionStats {
  label: u32,
  origin: (u32, u32),
  count: u32,
}

/// Otsu 二值化 + 最大外部连通区域
#[derive(Debug, Default, Clone, Copy)]
pub struct Segmenter;

impl Segmenter {
  /// 自动阈值。
  ///
  /// 图像只有单一灰度级时类间方差处处为零，此时约定阈值为 0：
  /// 非零的均匀图像整幅都是前景，全黑图像没有前景。
  pub fn threshold(&self, image: &GrayImage) -> u8 {
    if is_uniform(image) {
      debug!("图像只有单一灰度级，阈值取 0");
      return 0;
    }
    otsu_level(image)
  }

  pub fn binarize(&self, image: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
      if image.get_pixel(x, y)[0] > level {
        Luma([FOREGROUND])
      } else {
        Luma([BACKGROUND])
      }
    })
  }

  /// 填充被前景完全包围的背景空洞。
  ///
  /// 前景按 8 邻接，背景按 4 邻接；不与图像边界 4 连通的背景即为空洞。
  pub fn fill_holes(&self, mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
      return mask.clone();
    }

    let inverted = GrayImage::from_fn(width, height, |x, y| {
      if mask.get_pixel(x, y)[0] == FOREGROUND {
        Luma([BACKGROUND])
      } else {
        Luma([FOREGROUND])
      }
    });
    let gaps = connected_components(&inverted, Connectivity::Four, Luma([BACKGROUND]));

    let mut outside = HashSet::new();
    for x in 0..width {
      outside.insert(gaps.get_pixel(x, 0)[0]);
      outside.insert(gaps.get_pixel(x, height - 1)[0]);
    }
    for y in 0..height {
      outside.insert(gaps.get_pixel(0, y)[0]);
      outside.insert(gaps.get_pixel(width - 1, y)[0]);
    }

    GrayImage::from_fn(width, height, |x, y| {
      let label = gaps.get_pixel(x, y)[0];
      if label == 0 || !outside.contains(&label) {
        Luma([FOREGROUND])
      } else {
        Luma([BACKGROUND])
      }
    })
  }

  /// 分割图像并返回面积最大的外部区域。
  ///
  /// 面积相同时取扫描顺序（先行后列）中最先出现的区域。
  pub fn segment(&self, image: &GrayImage) -> Result<Region, SegmentError> {
    let threshold = self.threshold(image);
    let mask = self.binarize(image, threshold);
    let filled = self.fill_holes(&mask);
    let labels = connected_components(&filled, Connectivity::Eight, Luma([BACKGROUND]));

    let mut stats: Vec<Option<RegionStats>> = Vec::new();
    for (x, y, pixel) in labels.enumerate_pixels() {
      let label = pixel[0];
      if label == 0 {
        continue;
      }
      let index = label as usize;
      if index >= stats.len() {
        stats.resize(index + 1, None);
      }
      stats[index]
        .get_or_insert(RegionStats {
          label,
          origin: (x, y),
          count: 0,
        })
        .count += 1;
    }

    debug!(
      "阈值 {}, 外部区域数量 {}",
      threshold,
      stats.iter().flatten().count()
    );

    let largest = stats
      .iter()
      .flatten()
      .max_by(|a, b| {
        a.count.cmp(&b.count).then_with(|| {
          let (ax, ay) = a.origin;
          let (bx, by) = b.origin;
          (by, bx).cmp(&(ay, ax))
        })
      })
      .copied()
      .ok_or(SegmentError::NoForeground)?;

    let region_mask = GrayImage::from_fn(image.width(), image.height(), |x, y| {
      if labels.get_pixel(x, y)[0] == largest.label {
        Luma([FOREGROUND])
      } else {
        Luma([BACKGROUND])
      }
    });
    let pixel_count = region_mask
      .pixels()
      .filter(|p| p[0] == FOREGROUND)
      .count() as u32;

    if pixel_count == 0 {
      return Err(SegmentError::EmptyRegion);
    }

    debug!(
      "最大区域起点 ({}, {}), 像素数 {}",
      largest.origin.0, largest.origin.1, pixel_count
    );

    Ok(Region {
      threshold,
      origin: largest.origin,
      pixel_count,
      mask: region_mask,
    })
  }
}

fn is_uniform(image: &GrayImage) -> bool {
  let mut values = image.pixels().map(|p| p[0]);
  match values.next() {
    Some(first) => values.all(|v| v == first),
    None => true,
  }
}
