// 该文件是 Mailuo （脉络） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::{
  fmt,
  path::{Path, PathBuf},
  str::FromStr,
};

use image::{GrayImage, ImageReader};
use tracing::{debug, error};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, input::InputError};

/// 图像文件输入，读取后统一转换为单通道灰度图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFileInput {
  path: PathBuf,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }

    let path = urlencoding::decode(url.path())
      .map_err(|_| InputError::InvalidPath(url.to_string()))?;

    Ok(ImageFileInput::new(path.into_owned()))
  }
}

/// 既接受 `image:///path/to/file.bmp` 形式的 URL，也接受普通文件路径
impl FromStr for ImageFileInput {
  type Err = InputError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match Url::parse(s) {
      Ok(url) if url.scheme() == Self::SCHEME => Self::from_url(&url),
      _ => Ok(Self::new(s)),
    }
  }
}

impl fmt::Display for ImageFileInput {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.path.display())
  }
}

impl ImageFileInput {
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// 读取并解码图像，格式按文件内容识别
  pub fn load(&self) -> Result<GrayImage, InputError> {
    let image = ImageReader::open(&self.path)?
      .with_guessed_format()?
      .decode()?;
    debug!(
      "读取图像: {} ({}x{}, {:?})",
      self.path.display(),
      image.width(),
      image.height(),
      image.color()
    );
    Ok(image.to_luma8())
  }
}
