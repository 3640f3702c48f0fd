//! Cost extraction from `EXPLAIN FORMAT=JSON` output
//!
//! The extractor consumes only the planner's estimate. It never executes
//! the statement, so any latency attributed to a probe is the time spent
//! obtaining the plan.

use serde_json::Value;

/// Cost figures extracted from a planner explain payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanEstimate {
    /// The planner's dimensionless cost estimate for the statement
    pub query_cost: f64,
    /// Estimated rows scanned by the first table access, per scan
    pub rows_examined_per_scan: u64,
}

/// Explain payload not in the expected shape
#[derive(Debug, thiserror::Error)]
pub enum MalformedPlanError {
    #[error("explain payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("explain payload has no query_block")]
    MissingQueryBlock,

    #[error("query_cost is not numeric: {0}")]
    InvalidCost(String),
}

/// Extract `(query_cost, rows_examined_per_scan)` from a raw explain payload.
///
/// Both figures default to 0 when their node is absent (`cost_info` missing,
/// or a statement with no table access). A payload without a `query_block`
/// at all is malformed.
pub fn extract_estimate(raw: &str) -> Result<PlanEstimate, MalformedPlanError> {
    let payload: Value = serde_json::from_str(raw)?;

    let block = payload
        .get("query_block")
        .ok_or(MalformedPlanError::MissingQueryBlock)?;

    let query_cost = match block.get("cost_info").and_then(|c| c.get("query_cost")) {
        Some(cost) => parse_cost(cost)?,
        None => 0.0,
    };

    let rows_examined_per_scan = block
        .get("table")
        .and_then(|t| t.get("rows_examined_per_scan"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Ok(PlanEstimate {
        query_cost,
        rows_examined_per_scan,
    })
}

// MySQL emits query_cost as a quoted decimal string
fn parse_cost(value: &Value) -> Result<f64, MalformedPlanError> {
    match value {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => s
            .parse()
            .map_err(|_| MalformedPlanError::InvalidCost(s.clone())),
        other => Err(MalformedPlanError::InvalidCost(other.to_string())),
    }
}
