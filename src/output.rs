// 该文件是 Mailuo （脉络） 项目的一部分。
// src/output.rs - 结果输出
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

use image::GrayImage;
use thiserror::Error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  task::{RealImageReport, VerificationReport},
};

pub trait Render<Output>: Sized {
  type Error;
  fn render_result(&self, result: &Output) -> Result<(), Self::Error>;
}

mod console;
mod json_report;
pub use self::console::ConsoleOutput;
pub use self::json_report::{JsonReportError, JsonReportOutput};

/// 一次运行产生的全部报告
#[derive(Debug, Clone, Default)]
pub struct Session {
  pub verification: Option<VerificationReport>,
  pub real_image: Option<RealImageReport>,
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("JSON 报告输出错误: {0}")]
  JsonReportError(#[from] JsonReportError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum OutputWrapper {
  Console(ConsoleOutput),
  JsonReport(JsonReportOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ConsoleOutput::SCHEME => Ok(OutputWrapper::Console(ConsoleOutput::from_url(url)?)),
      JsonReportOutput::SCHEME => Ok(OutputWrapper::JsonReport(JsonReportOutput::from_url(url)?)),
      other => Err(OutputError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Render<Session> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, session: &Session) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::Console(output) => {
        output.render_result(session).map_err(|e| match e {})
      }
      OutputWrapper::JsonReport(output) => output
        .render_result(session)
        .map_err(OutputError::from),
    }
  }
}

/// 保存区域掩码，必要时创建父目录
pub fn save_mask(path: impl AsRef<Path>, mask: &GrayImage) -> Result<(), image::ImageError> {
  let path = path.as_ref();
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent).map_err(image::ImageError::IoError)?;
  }
  mask.save(path)?;
  tracing::info!("保存区域掩码到文件: {}", path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn selects_output_by_scheme() {
    let console = OutputWrapper::from_url(&Url::parse("console:").unwrap()).unwrap();
    assert!(matches!(console, OutputWrapper::Console(_)));

    let json = OutputWrapper::from_url(&Url::parse("json:///tmp/report.json").unwrap()).unwrap();
    assert!(matches!(json, OutputWrapper::JsonReport(_)));
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let result = OutputWrapper::from_url(&Url::parse("rtsp://localhost/live").unwrap());
    assert!(matches!(result, Err(OutputError::SchemeMismatch(s)) if s == "rtsp"));
  }

  #[test]
  fn mask_is_saved_with_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("masks").join("region.png");
    save_mask(&path, &GrayImage::new(8, 8)).unwrap();
    assert!(path.exists());
  }
}
