//! 편집 권한 확인 명령어

use anyhow::Context as _;
use serde_json::{json, Value};

use rsv_core::permissions::{CallerContext, WorkflowEvaluator};
use rsv_core::workflow::RecordSchema;

use crate::OutputFormat;

pub fn run(
    caller: &CallerContext,
    alias: &str,
    row: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let row: Value = serde_json::from_str(row).context("--row must be a JSON object")?;

    let schema = RecordSchema::new(alias);
    let decision = WorkflowEvaluator::new(&schema).evaluate_edit(&row, caller);

    match format {
        OutputFormat::Json => {
            let output = json!({
                "allowed": decision.allowed,
                "reason": decision.reason,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => match decision.reason {
            None => println!("allowed"),
            Some(reason) => println!("denied: {}", reason),
        },
    }
    Ok(())
}
