//! `flutter pub get`

use super::CheckContext;
use crate::models::{StepDetail, StepKind, StepReport, StepStatus};
use anyhow::Result;

pub fn run(ctx: &CheckContext<'_>) -> Result<StepReport> {
    ctx.flutter(&["pub", "get"], None)?.ensure_success()?;
    Ok(StepReport::new(
        StepKind::PubGet,
        StepStatus::Passed,
        StepDetail::None,
    ))
}
