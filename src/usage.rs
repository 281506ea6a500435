use crate::checker::CheckResult;
use crate::provider::DataProvider;
use crate::threshold::{parse_capacity, Threshold};

/// Checks the used capacity of the `name` mount point against optional
/// inclusive bounds. Every problem is folded into a failing result.
pub fn status(
    provider: &dyn DataProvider,
    name: &str,
    maximum: Option<&Threshold>,
    minimum: Option<&Threshold>,
) -> CheckResult {
    let mut problems = Vec::new();

    let maximum = match maximum.map(Threshold::normalize).transpose() {
        Ok(max) => max,
        Err(e) => {
            problems.push(format!("max argument must be an integer ({})", e));
            None
        }
    };
    let minimum = match minimum.map(Threshold::normalize).transpose() {
        Ok(min) => min,
        Err(e) => {
            problems.push(format!("min argument must be an integer ({})", e));
            None
        }
    };
    if let (Some(min), Some(max)) = (minimum, maximum) {
        if min >= max {
            problems.push(format!("min must be less than max ({} >= {})", min, max));
        }
    }
    if !problems.is_empty() {
        return CheckResult::failure(name, problems.join("; "));
    }

    let mut usage = match provider.usage() {
        Ok(usage) => usage,
        Err(e) => return CheckResult::failure(name, format!("failed to gather disk usage: {}", e)),
    };
    let record = match usage.remove(name) {
        Some(record) => record,
        None => return CheckResult::failure(name, format!("named disk mount not present: {}", name)),
    };
    let capacity = match record.get("capacity").map(|c| parse_capacity(c)) {
        Some(Ok(capacity)) => capacity,
        Some(Err(e)) => return CheckResult::failure(name, format!("unreadable capacity: {}", e)),
        None => return CheckResult::failure(name, "usage record has no capacity"),
    };

    if let Some(min) = minimum {
        if capacity < min {
            return CheckResult::failure(
                name,
                format!("disk is below minimum of {}% at {}", min, capacity),
            )
            .with_data(record);
        }
    }
    if let Some(max) = maximum {
        if capacity > max {
            return CheckResult::failure(
                name,
                format!("disk is above maximum of {}% at {}", max, capacity),
            )
            .with_data(record);
        }
    }
    CheckResult::success(name, "disk in acceptable range", Some(record))
}
