// 该文件是 Mailuo （脉络） 项目的一部分。
// src/task.rs - 验证任务
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

use std::path::PathBuf;
#[cfg(feature = "fixture")]
use std::path::Path;

use tracing::{error, info, warn};

#[cfg(feature = "fixture")]
use crate::{fixture::create_test_image, quality::calculate_q1_with};
use crate::{input::ImageFileInput, output::save_mask, quality::EffectiveArea, score::QualityLevel};

pub trait Task: Sized {
  type Output;
  type Error;
  fn run_task(self, area: &EffectiveArea) -> Result<Self::Output, Self::Error>;
}

/// 一项固定的验证用例：生成指定前景像素数的图像并核对 Q1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCase {
  pub id: char,
  pub name: &'static str,
  pub file_name: &'static str,
  pub width: u32,
  pub height: u32,
  pub foreground_pixels: u32,
  pub expected: u8,
  /// 属于附加的边界用例
  pub edge_case: bool,
}

impl VerificationCase {
  /// 强制验证项 A–C 与附加边界项 D–F
  pub fn standard_battery() -> Vec<Self> {
    let case = |id: char,
                name: &'static str,
                file_name: &'static str,
                foreground_pixels: u32,
                expected: u8,
                edge_case: bool| VerificationCase {
      id,
      name,
      file_name,
      width: 200,
      height: 200,
      foreground_pixels,
      expected,
      edge_case,
    };

    vec![
      case('A', "上限检查", "test_a_cap.bmp", 25000, 100, false),
      case('B', "比例检查", "test_b_scaling.bmp", 10000, 50, false),
      case('C', "否决检查", "test_c_veto.bmp", 0, 0, false),
      case('D', "精确阈值检查", "test_d_exact.bmp", 20000, 100, true),
      case('E', "半阈值检查", "test_e_half.bmp", 10000, 50, true),
      case('F', "四分之一阈值检查", "test_f_quarter.bmp", 5000, 25, true),
    ]
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
  pub case: VerificationCase,
  pub path: PathBuf,
  pub pixel_count: u32,
  pub actual: u8,
}

impl CaseOutcome {
  pub fn passed(&self) -> bool {
    self.actual == self.case.expected
  }

  pub fn status(&self) -> &'static str {
    if self.passed() { "PASS" } else { "FAIL" }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
  pub coefficient: u32,
  pub outcomes: Vec<CaseOutcome>,
}

impl VerificationReport {
  pub fn passed(&self) -> usize {
    self.outcomes.iter().filter(|o| o.passed()).count()
  }

  pub fn total(&self) -> usize {
    self.outcomes.len()
  }

  pub fn all_passed(&self) -> bool {
    self.passed() == self.total()
  }
}

/// 在指定目录下生成测试图像并逐项核对
#[cfg(feature = "fixture")]
#[derive(Debug, Clone)]
pub struct VerificationTask {
  directory: PathBuf,
  cases: Vec<VerificationCase>,
}

#[cfg(feature = "fixture")]
impl VerificationTask {
  pub fn new(directory: impl AsRef<Path>) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
      cases: VerificationCase::standard_battery(),
    }
  }

  pub fn with_cases(mut self, cases: Vec<VerificationCase>) -> Self {
    self.cases = cases;
    self
  }
}

#[cfg(feature = "fixture")]
impl Task for VerificationTask {
  type Output = VerificationReport;
  type Error = std::convert::Infallible;

  fn run_task(self, area: &EffectiveArea) -> Result<Self::Output, Self::Error> {
    info!("开始验证任务，输出目录: {}", self.directory.display());
    let mut outcomes = Vec::with_capacity(self.cases.len());

    for case in self.cases {
      let path = self.directory.join(case.file_name);

      // 单个用例失败时以 (0, 0) 继续，不中断整轮验证
      let (actual, pixel_count) = match create_test_image(
        case.width,
        case.height,
        case.foreground_pixels,
        &path,
      ) {
        Ok(_) => calculate_q1_with(area, &path),
        Err(e) => {
          error!("生成测试图像 {} 失败: {}", path.display(), e);
          (0, 0)
        }
      };

      let outcome = CaseOutcome {
        case,
        path,
        pixel_count,
        actual,
      };
      if !outcome.passed() {
        warn!(
          "测试 {} 未通过: 期望 {}, 实际 {}",
          outcome.case.id, outcome.case.expected, outcome.actual
        );
      }
      outcomes.push(outcome);
    }

    let report = VerificationReport {
      coefficient: area.scorer().coefficient(),
      outcomes,
    };
    info!("验证完成: {}/{} 项通过", report.passed(), report.total());

    Ok(report)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealImageReport {
  pub image: String,
  pub found: bool,
  pub score: u8,
  pub pixel_count: u32,
  pub threshold: Option<u8>,
  pub error: Option<String>,
}

impl RealImageReport {
  pub fn level(&self) -> QualityLevel {
    QualityLevel::from(self.score)
  }
}

/// 对单幅真实图像计算 Q1
#[derive(Debug, Clone)]
pub struct RealImageTask {
  input: ImageFileInput,
  mask_output: Option<PathBuf>,
}

impl RealImageTask {
  pub fn new(input: ImageFileInput) -> Self {
    Self {
      input,
      mask_output: None,
    }
  }

  /// 同时保存选中前景区域的掩码
  pub fn with_mask_output(mut self, mask_output: Option<PathBuf>) -> Self {
    self.mask_output = mask_output;
    self
  }
}

impl Task for RealImageTask {
  type Output = RealImageReport;
  type Error = anyhow::Error;

  fn run_task(self, area: &EffectiveArea) -> Result<Self::Output, Self::Error> {
    let image = self.input.to_string();
    let mut report = RealImageReport {
      image,
      found: self.input.path().exists(),
      score: 0,
      pixel_count: 0,
      threshold: None,
      error: None,
    };

    if !report.found {
      error!("图像文件 '{}' 不存在", report.image);
      return Ok(report);
    }

    match area.assess(&self.input) {
      Ok(assessment) => {
        report.score = assessment.score;
        report.pixel_count = assessment.pixel_count;
        report.threshold = Some(assessment.region.threshold);
        if let Some(path) = &self.mask_output {
          save_mask(path, &assessment.region.mask)?;
        }
      }
      Err(e) => {
        error!("处理图像 {} 出错: {}", report.image, e);
        report.error = Some(e.to_string());
      }
    }

    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn standard_battery_matches_reference_expectations() {
    let cases = VerificationCase::standard_battery();
    let expected: Vec<_> = cases
      .iter()
      .map(|c| (c.id, c.foreground_pixels, c.expected))
      .collect();
    assert_eq!(
      expected,
      vec![
        ('A', 25000, 100),
        ('B', 10000, 50),
        ('C', 0, 0),
        ('D', 20000, 100),
        ('E', 10000, 50),
        ('F', 5000, 25),
      ]
    );
    assert!(cases.iter().all(|c| (c.width, c.height) == (200, 200)));
  }

  #[cfg(feature = "fixture")]
  #[test]
  fn verification_task_passes_every_case() {
    let dir = tempfile::tempdir().unwrap();
    let report = VerificationTask::new(dir.path())
      .run_task(&EffectiveArea::default())
      .unwrap();

    assert_eq!(report.total(), 6);
    assert!(report.all_passed(), "{:#?}", report.outcomes);
    let pixels: Vec<_> = report.outcomes.iter().map(|o| o.pixel_count).collect();
    assert_eq!(pixels, vec![25000, 10000, 0, 20000, 10000, 5000]);
    assert!(report.outcomes.iter().all(|o| o.path.exists()));
  }

  #[cfg(feature = "fixture")]
  #[test]
  fn unwritable_fixture_continues_with_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not a directory").unwrap();

    let report = VerificationTask::new(&blocker)
      .run_task(&EffectiveArea::default())
      .unwrap();

    assert_eq!(report.total(), 6);
    assert!(report.outcomes.iter().all(|o| o.pixel_count == 0 && o.actual == 0));
    // 只有否决检查恰好期望 0
    assert_eq!(report.passed(), 1);
  }

  #[test]
  fn missing_real_image_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = ImageFileInput::new(dir.path().join("hand_sample.png"));
    let report = RealImageTask::new(input)
      .run_task(&EffectiveArea::default())
      .unwrap();
    assert!(!report.found);
    assert_eq!((report.score, report.pixel_count), (0, 0));
    assert_eq!(report.level(), QualityLevel::Low);
  }

  #[test]
  fn undecodable_real_image_is_reported_with_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.bmp");
    std::fs::write(&path, b"BM not a bitmap").unwrap();
    let report = RealImageTask::new(ImageFileInput::new(&path))
      .run_task(&EffectiveArea::default())
      .unwrap();
    assert!(report.found);
    assert_eq!((report.score, report.pixel_count), (0, 0));
    assert!(report.error.is_some());
  }
}
