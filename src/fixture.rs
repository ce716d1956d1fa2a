// 该文件是 Mailuo （脉络） 项目的一部分。
// src/fixture.rs - 测试图像生成
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

use std::path::Path;

use image::{GrayImage, Luma};
use thiserror::Error;
use tracing::info;

use crate::segment::{BACKGROUND, FOREGROUND};

#[derive(Error, Debug)]
pub enum FixtureError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
}

/// 生成黑底白色前景的测试图像。
///
/// 前景为居中的正方形（边长 `floor(sqrt(n))`，不超过图像短边），
/// 剩余像素按行优先紧贴正方形下方补齐，下方放不下时再依次使用上方和整幅图像。
/// 请求数量超过图像总像素时截断。返回实际前景像素数。
pub fn render_test_image(width: u32, height: u32, foreground_pixels: u32) -> (GrayImage, u32) {
  let mut image = GrayImage::from_pixel(width, height, Luma([BACKGROUND]));

  let total = (width as u64 * height as u64).min(u32::MAX as u64) as u32;
  let actual = foreground_pixels.min(total);
  if actual == 0 {
    return (image, 0);
  }

  let side = actual.isqrt().min(width).min(height);
  let start_x = (width - side) / 2;
  let start_y = (height - side) / 2;
  let end_x = start_x + side;
  let end_y = start_y + side;

  for y in start_y..end_y {
    for x in start_x..end_x {
      image.put_pixel(x, y, Luma([FOREGROUND]));
    }
  }

  let mut remaining = actual - side * side;
  let below = (end_y..height).flat_map(move |y| (start_x..end_x).map(move |x| (x, y)));
  let above = (0..start_y)
    .rev()
    .flat_map(move |y| (start_x..end_x).map(move |x| (x, y)));
  let anywhere = (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)));

  for (x, y) in below.chain(above).chain(anywhere) {
    if remaining == 0 {
      break;
    }
    if image.get_pixel(x, y)[0] == BACKGROUND {
      image.put_pixel(x, y, Luma([FOREGROUND]));
      remaining -= 1;
    }
  }

  (image, actual)
}

/// 生成测试图像并写入 `output_path`，格式由扩展名决定（`.bmp` 为无压缩位图）
pub fn create_test_image(
  width: u32,
  height: u32,
  foreground_pixels: u32,
  output_path: impl AsRef<Path>,
) -> Result<u32, FixtureError> {
  let path = output_path.as_ref();
  let (image, actual) = render_test_image(width, height, foreground_pixels);

  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  image.save(path)?;

  info!(
    "已生成测试图像: {} ({}x{}, 前景像素 {})",
    path.display(),
    width,
    height,
    actual
  );

  Ok(actual)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::segment::Segmenter;

  fn foreground(image: &GrayImage) -> u32 {
    image.pixels().filter(|p| p[0] == FOREGROUND).count() as u32
  }

  #[test]
  fn exact_counts_for_reference_battery() {
    for count in [0, 5000, 10000, 20000, 25000] {
      let (image, actual) = render_test_image(200, 200, count);
      assert_eq!(actual, count);
      assert_eq!(foreground(&image), count);
    }
  }

  #[test]
  fn perfect_square_is_centered() {
    let (image, _) = render_test_image(200, 200, 10000);
    assert_eq!(image.get_pixel(50, 50)[0], FOREGROUND);
    assert_eq!(image.get_pixel(149, 149)[0], FOREGROUND);
    assert_eq!(image.get_pixel(49, 50)[0], BACKGROUND);
    assert_eq!(image.get_pixel(150, 149)[0], BACKGROUND);
  }

  #[test]
  fn foreground_is_a_single_region() {
    for (width, height, count) in [(200, 200, 5000), (200, 200, 25000), (300, 60, 10000)] {
      let (image, actual) = render_test_image(width, height, count);
      let region = Segmenter.segment(&image).unwrap();
      assert_eq!(region.pixel_count, actual, "{}x{} / {}", width, height, count);
    }
  }

  #[test]
  fn request_is_clamped_to_image_size() {
    let (image, actual) = render_test_image(10, 10, 500);
    assert_eq!(actual, 100);
    assert_eq!(foreground(&image), 100);
  }

  #[test]
  fn written_bitmap_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("fixture.bmp");
    let actual = create_test_image(64, 48, 700, &path).unwrap();
    assert_eq!(actual, 700);

    let loaded = image::open(&path).unwrap().to_luma8();
    assert_eq!(loaded.dimensions(), (64, 48));
    assert_eq!(foreground(&loaded), 700);
  }
}
