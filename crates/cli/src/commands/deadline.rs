use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use remedy_core::{compute_deadline, DeadlineUnit};

use crate::{emit, fail, render, OutputFormat};

#[derive(Serialize)]
struct DeadlineOutput {
    #[serde(with = "time::serde::rfc3339")]
    start: OffsetDateTime,
    count: u32,
    unit: DeadlineUnit,
    #[serde(with = "time::serde::rfc3339")]
    deadline: OffsetDateTime,
    weekday: String,
}

pub(crate) fn cmd_deadline(start: &str, count: u32, unit: DeadlineUnit, output: OutputFormat, quiet: bool) {
    let start = OffsetDateTime::parse(start, &Rfc3339)
        .unwrap_or_else(|e| fail(&format!("error: invalid --start '{}': {}", start, e), output, quiet));
    let deadline = compute_deadline(start, count, unit);
    let result = DeadlineOutput {
        start,
        count,
        unit,
        deadline,
        weekday: deadline.weekday().to_string(),
    };
    emit(&result, output, quiet, || {
        format!("{} ({})", render::timestamp(deadline), result.weekday)
    });
}
