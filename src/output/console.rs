// 该文件是 Mailuo （脉络） 项目的一部分。
// src/output/console.rs - 终端报告输出
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

use std::{convert::Infallible, fmt::Write};

use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{OutputError, Render, Session},
  task::{RealImageReport, VerificationReport},
};

const WIDE_RULE: usize = 80;
const NARROW_RULE: usize = 40;

/// 将报告打印到标准输出
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl FromUrlWithScheme for ConsoleOutput {
  const SCHEME: &'static str = "console";
}

impl FromUrl for ConsoleOutput {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OutputError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(ConsoleOutput)
  }
}

impl ConsoleOutput {
  pub fn format_verification(report: &VerificationReport) -> String {
    let wide = "=".repeat(WIDE_RULE);
    let narrow = "-".repeat(NARROW_RULE);
    let mut out = String::new();

    // 写入 String 不会失败
    let _ = writeln!(out, "{}", wide);
    let _ = writeln!(out, "ISO/IEC 29794-9 Q1（有效面积）验证测试");
    let _ = writeln!(out, "指静脉生物特征 - 第二指节 (Sc = {})", report.coefficient);
    let _ = writeln!(out, "{}", wide);
    let _ = writeln!(out);

    let mut edge_header_written = false;
    for outcome in &report.outcomes {
      let case = &outcome.case;
      if case.edge_case && !edge_header_written {
        let _ = writeln!(out, "附加边界测试");
        let _ = writeln!(out, "{}", narrow);
        let _ = writeln!(out);
        edge_header_written = true;
      }
      let _ = writeln!(out, "测试 {}: {}", case.id, case.name);
      let _ = writeln!(out, "{}", narrow);
      let _ = writeln!(out, "测试图像: {}", outcome.path.display());
      let _ = writeln!(out, "输入像素: {}", outcome.pixel_count);
      let _ = writeln!(out, "期望 Q1: {}", case.expected);
      let _ = writeln!(out, "实际 Q1: {}", outcome.actual);
      let _ = writeln!(out, "状态: {}", outcome.status());
      let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", wide);
    let _ = writeln!(out, "验证汇总");
    let _ = writeln!(out, "{}", wide);
    for outcome in &report.outcomes {
      let _ = writeln!(
        out,
        "测试 {} ({}): {}",
        outcome.case.id,
        outcome.case.name,
        outcome.status()
      );
    }
    let _ = writeln!(out);
    let _ = writeln!(
      out,
      "总体结果: {}/{} 项测试通过",
      report.passed(),
      report.total()
    );
    if report.all_passed() {
      let _ = writeln!(out, "✅ 全部通过 - ISO/IEC 29794-9 Q1 实现正确");
    } else {
      let _ = writeln!(out, "❌ 存在失败项 - ISO/IEC 29794-9 Q1 实现需要复查");
    }
    let _ = writeln!(out, "{}", wide);

    out
  }

  pub fn format_real_image(report: &RealImageReport) -> String {
    let wide = "=".repeat(WIDE_RULE);
    let mut out = String::new();

    let _ = writeln!(out, "{}", wide);
    let _ = writeln!(out, "真实图像测试");
    let _ = writeln!(out, "{}", wide);

    if !report.found {
      let _ = writeln!(out, "错误: 图像文件 '{}' 不存在", report.image);
      return out;
    }

    let _ = writeln!(out, "图像: {}", report.image);
    if let Some(error) = &report.error {
      let _ = writeln!(out, "处理出错: {}", error);
    }
    if let Some(threshold) = report.threshold {
      let _ = writeln!(out, "Otsu 阈值: {}", threshold);
    }
    let _ = writeln!(out, "前景像素: {}", report.pixel_count);
    let _ = writeln!(out, "Q1 分数: {}", report.score);
    let _ = writeln!(out, "质量评估: {}", report.level());
    let _ = writeln!(out, "{}", wide);

    out
  }
}

impl Render<VerificationReport> for ConsoleOutput {
  type Error = Infallible;

  fn render_result(&self, report: &VerificationReport) -> Result<(), Self::Error> {
    print!("{}", Self::format_verification(report));
    Ok(())
  }
}

impl Render<RealImageReport> for ConsoleOutput {
  type Error = Infallible;

  fn render_result(&self, report: &RealImageReport) -> Result<(), Self::Error> {
    print!("{}", Self::format_real_image(report));
    Ok(())
  }
}

impl Render<Session> for ConsoleOutput {
  type Error = Infallible;

  fn render_result(&self, session: &Session) -> Result<(), Self::Error> {
    if let Some(report) = &session.verification {
      self.render_result(report)?;
      println!();
    }
    if let Some(report) = &session.real_image {
      self.render_result(report)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;
  use crate::task::{CaseOutcome, VerificationCase};

  fn report_with(actuals: &[u8]) -> VerificationReport {
    let outcomes = VerificationCase::standard_battery()
      .into_iter()
      .zip(actuals)
      .map(|(case, &actual)| CaseOutcome {
        path: PathBuf::from("test_outputs").join(case.file_name),
        pixel_count: case.foreground_pixels,
        actual,
        case,
      })
      .collect();
    VerificationReport {
      coefficient: 20000,
      outcomes,
    }
  }

  #[test]
  fn passing_report_lists_every_case() {
    let text = ConsoleOutput::format_verification(&report_with(&[100, 50, 0, 100, 50, 25]));
    assert!(text.contains("测试 A: 上限检查"));
    assert!(text.contains("测试 F (四分之一阈值检查): PASS"));
    assert!(text.contains("总体结果: 6/6 项测试通过"));
    assert!(text.contains("✅"));
    assert_eq!(text.matches("附加边界测试").count(), 1);
  }

  #[test]
  fn failing_case_is_flagged() {
    let text = ConsoleOutput::format_verification(&report_with(&[100, 50, 0, 100, 50, 24]));
    assert!(text.contains("测试 F (四分之一阈值检查): FAIL"));
    assert!(text.contains("总体结果: 5/6 项测试通过"));
    assert!(text.contains("❌"));
  }

  #[test]
  fn real_image_report_shows_level() {
    let report = RealImageReport {
      image: "hand_sample.png".to_string(),
      found: true,
      score: 85,
      pixel_count: 17000,
      threshold: Some(97),
      error: None,
    };
    let text = ConsoleOutput::format_real_image(&report);
    assert!(text.contains("前景像素: 17000"));
    assert!(text.contains("Q1 分数: 85"));
    assert!(text.contains("质量评估: High"));
  }

  #[test]
  fn missing_real_image_prints_error_only() {
    let report = RealImageReport {
      image: "test_images/hand_sample.png".to_string(),
      found: false,
      score: 0,
      pixel_count: 0,
      threshold: None,
      error: None,
    };
    let text = ConsoleOutput::format_real_image(&report);
    assert!(text.contains("错误: 图像文件 'test_images/hand_sample.png' 不存在"));
    assert!(!text.contains("Q1 分数"));
  }
}
