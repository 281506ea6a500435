use std::collections::{BTreeMap, HashMap};
use std::process::{Command, Output};
use log::{debug, warn};
use regex::Regex;
use crate::error::ProviderError;

/// Passthrough metrics of one mount point or device, keyed like the
/// underlying tool reports them (`capacity`, `TYPE`, ...).
pub type Metrics = BTreeMap<String, String>;

/// Source of current disk data. `usage` is keyed by mount point and must
/// carry `capacity`; `blkid` is keyed by device and must carry `TYPE`.
pub trait DataProvider {
    fn usage(&self) -> Result<HashMap<String, Metrics>, ProviderError>;
    fn blkid(&self) -> Result<HashMap<String, Metrics>, ProviderError>;
}

/// Reads the live system through `df` and `blkid`.
pub struct SystemProvider {
    df: String,
    blkid: String,
}

impl SystemProvider {
    pub fn new() -> Self {
        Self {
            df: String::from("df"),
            blkid: String::from("blkid"),
        }
    }
}

impl Default for SystemProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for SystemProvider {
    fn usage(&self) -> Result<HashMap<String, Metrics>, ProviderError> {
        let output = run(&self.df, &["-P", "-k"])?;
        parse_df(&df_stdout(&self.df, output)?)
    }

    fn blkid(&self) -> Result<HashMap<String, Metrics>, ProviderError> {
        let output = run(&self.blkid, &[])?;
        parse_blkid(&blkid_stdout(&self.blkid, output)?)
    }
}

fn run(command: &str, args: &[&str]) -> Result<Output, ProviderError> {
    debug!("Running {} {:?}", command, args);
    Command::new(command)
        .args(args)
        .output()
        .map_err(|e| ProviderError::Spawn { command: command.to_string(), source: e })
}

fn failed(command: &str, output: &Output) -> ProviderError {
    ProviderError::Failed {
        command: command.to_string(),
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

// df exits non-zero when a single mount is unreadable but still reports the others
fn df_stdout(command: &str, output: Output) -> Result<String, ProviderError> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() {
        return Ok(stdout);
    }
    if stdout.trim().is_empty() {
        return Err(failed(command, &output));
    }
    warn!(
        "{} exited with {}, using partial output: {}",
        command,
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    );
    Ok(stdout)
}

// blkid exits with 2 when no device could be identified
fn blkid_stdout(command: &str, output: Output) -> Result<String, ProviderError> {
    match output.status.code() {
        Some(0) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
        Some(2) => {
            debug!("{} found no devices", command);
            Ok(String::new())
        }
        _ => Err(failed(command, &output)),
    }
}

const DF_COLUMNS: [&str; 5] = ["filesystem", "1K-blocks", "used", "available", "capacity"];

/// Parses POSIX `df -P -k` output. The mount point is the last column and
/// may contain spaces.
pub fn parse_df(output: &str) -> Result<HashMap<String, Metrics>, ProviderError> {
    let mut usage = HashMap::new();
    for line in output.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() <= DF_COLUMNS.len() {
            return Err(ProviderError::Parse { command: String::from("df"), line: line.to_string() });
        }
        let mount_point = fields[DF_COLUMNS.len()..].join(" ");
        let metrics: Metrics = DF_COLUMNS
            .iter()
            .zip(fields.iter())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        usage.insert(mount_point, metrics);
    }
    Ok(usage)
}

/// Parses `blkid` output: `<device>: KEY="value" KEY="value" ...`.
pub fn parse_blkid(output: &str) -> Result<HashMap<String, Metrics>, ProviderError> {
    let pairs = Regex::new(r#"([A-Za-z_]+)="([^"]*)""#).unwrap();
    let mut devices = HashMap::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (device, attributes) = match line.split_once(": ") {
            Some(split) => split,
            None => {
                return Err(ProviderError::Parse { command: String::from("blkid"), line: line.to_string() })
            }
        };
        let metrics: Metrics = pairs
            .captures_iter(attributes)
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .collect();
        devices.insert(device.to_string(), metrics);
    }
    Ok(devices)
}

/// Fixed data, for callers that gathered metrics themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    usage: HashMap<String, Metrics>,
    blkid: HashMap<String, Metrics>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_usage(mut self, mount_point: &str, metrics: &[(&str, &str)]) -> Self {
        self.usage.insert(mount_point.to_string(), to_metrics(metrics));
        self
    }

    pub fn with_blkid(mut self, device: &str, metrics: &[(&str, &str)]) -> Self {
        self.blkid.insert(device.to_string(), to_metrics(metrics));
        self
    }
}

fn to_metrics(metrics: &[(&str, &str)]) -> Metrics {
    metrics.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

impl DataProvider for StaticProvider {
    fn usage(&self) -> Result<HashMap<String, Metrics>, ProviderError> {
        Ok(self.usage.clone())
    }

    fn blkid(&self) -> Result<HashMap<String, Metrics>, ProviderError> {
        Ok(self.blkid.clone())
    }
}
