use std::collections::HashMap;
use log::{debug, warn};
use crate::blkid::blkid;
use crate::provider::{DataProvider, Metrics};
use crate::threshold::Threshold;
use crate::usage::status;

/// Outcome of a single check. `changes` stays empty: checks never modify disks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub result: bool,
    pub comment: String,
    pub changes: HashMap<String, String>,
    pub data: Option<Metrics>,
}

impl CheckResult {
    pub fn success(name: &str, comment: impl Into<String>, data: Option<Metrics>) -> Self {
        Self {
            name: name.to_string(),
            result: true,
            comment: comment.into(),
            changes: HashMap::new(),
            data,
        }
    }

    pub fn failure(name: &str, comment: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            result: false,
            comment: comment.into(),
            changes: HashMap::new(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Metrics) -> Self {
        self.data = Some(data);
        self
    }
}

/// A configured check; `id` is the key it was declared under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Status {
        id: String,
        name: String,
        maximum: Option<Threshold>,
        minimum: Option<Threshold>,
    },
    Blkid {
        id: String,
        name: String,
        disktype: Option<String>,
    },
}

impl Check {
    pub fn id(&self) -> &str {
        match self {
            Check::Status { id, .. } | Check::Blkid { id, .. } => id,
        }
    }

    pub fn run(&self, provider: &dyn DataProvider) -> CheckResult {
        let result = match self {
            Check::Status { name, maximum, minimum, .. } => {
                status(provider, name, maximum.as_ref(), minimum.as_ref())
            }
            Check::Blkid { name, disktype, .. } => blkid(provider, name, disktype.as_deref()),
        };
        if result.result {
            debug!("{} ({}): {}", self.id(), result.name, result.comment);
        } else {
            warn!("{} ({}) failed: {}", self.id(), result.name, result.comment);
        }
        result
    }
}
