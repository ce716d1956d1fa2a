// 该文件是 Mailuo （脉络） 项目的一部分。
// src/output/json_report.rs - JSON 报告文件输出
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

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{Render, Session},
  task::{RealImageReport, VerificationReport},
};

#[derive(Error, Debug)]
pub enum JsonReportError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("无效的报告路径: {0}")]
  InvalidPath(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 将报告写入 JSON 文件，例如 `json:///tmp/q1_report.json`
#[derive(Debug, Clone)]
pub struct JsonReportOutput {
  path: PathBuf,
}

impl FromUrlWithScheme for JsonReportOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonReportOutput {
  type Error = JsonReportError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(JsonReportError::SchemeMismatch);
    }
    let path = urlencoding::decode(url.path())
      .map_err(|_| JsonReportError::InvalidPath(url.to_string()))?;
    Ok(JsonReportOutput::new(path.into_owned()))
  }
}

impl JsonReportOutput {
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

fn verification_json(report: &VerificationReport) -> Value {
  let cases: Vec<Value> = report
    .outcomes
    .iter()
    .map(|outcome| {
      json!({
        "id": outcome.case.id.to_string(),
        "name": outcome.case.name,
        "image": outcome.path.display().to_string(),
        "width": outcome.case.width,
        "height": outcome.case.height,
        "requested_pixels": outcome.case.foreground_pixels,
        "pixel_count": outcome.pixel_count,
        "expected": outcome.case.expected,
        "actual": outcome.actual,
        "status": outcome.status(),
      })
    })
    .collect();

  json!({
    "coefficient": report.coefficient,
    "cases": cases,
    "passed": report.passed(),
    "total": report.total(),
  })
}

fn real_image_json(report: &RealImageReport) -> Value {
  json!({
    "image": report.image,
    "found": report.found,
    "pixel_count": report.pixel_count,
    "score": report.score,
    "level": report.level().as_str(),
    "threshold": report.threshold,
    "error": report.error,
  })
}

pub fn session_json(session: &Session) -> Value {
  json!({
    "generated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    "verification": session.verification.as_ref().map(verification_json),
    "real_image": session.real_image.as_ref().map(real_image_json),
  })
}

impl Render<Session> for JsonReportOutput {
  type Error = JsonReportError;

  fn render_result(&self, session: &Session) -> Result<(), Self::Error> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(&session_json(session))?;
    std::fs::write(&self.path, text)?;
    info!("保存 JSON 报告到文件: {}", self.path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn writes_real_image_report() {
    let dir = tempfile::tempdir().unwrap();
    let output = JsonReportOutput::new(dir.path().join("out").join("report.json"));
    let session = Session {
      verification: None,
      real_image: Some(RealImageReport {
        image: "sample.bmp".to_string(),
        found: true,
        score: 50,
        pixel_count: 10000,
        threshold: Some(0),
        error: None,
      }),
    };
    output.render_result(&session).unwrap();

    let text = std::fs::read_to_string(output.path()).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["real_image"]["score"], 50);
    assert_eq!(value["real_image"]["level"], "Medium");
    assert!(value["verification"].is_null());
    assert!(value["generated_at"].is_string());
  }

  #[test]
  fn parses_file_url() {
    let url = Url::parse("json:///tmp/q1_report.json").unwrap();
    let output = JsonReportOutput::from_url(&url).unwrap();
    assert_eq!(output.path(), Path::new("/tmp/q1_report.json"));
  }
}
