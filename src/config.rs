use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use log::debug;
use yaml_rust::{Yaml, YamlLoader};
use crate::checker::Check;
use crate::error::ConfigError;
use crate::threshold::Threshold;

pub struct OutputConfig {
    pub output_name: String,
    pub config: HashMap<String, Yaml>,
}

pub struct Config {
    pub interval: Option<Duration>,
    pub checks: Vec<Check>,
    pub outputs: Vec<OutputConfig>,
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text_config = fs::read_to_string(path)?;
    parse_config(&text_config)
}

pub fn parse_config(text_config: &str) -> Result<Config, ConfigError> {
    let docs = YamlLoader::load_from_str(text_config)?;
    let cfg = docs.first().ok_or(ConfigError::Empty)?;

    let interval = match &cfg["interval"] {
        Yaml::BadValue | Yaml::Null => None,
        Yaml::Integer(secs) if *secs > 0 => Some(Duration::from_secs(*secs as u64)),
        _ => {
            return Err(ConfigError::InvalidValue {
                section: String::from("config"),
                key: String::from("interval"),
            })
        }
    };

    let mut checks = Vec::new();
    match cfg["checks"] {
        Yaml::Hash(ref h) => {
            for (key, value) in h {
                let id = yaml_string(key).ok_or_else(|| ConfigError::InvalidValue {
                    section: String::from("checks"),
                    key: format!("{:?}", key),
                })?;
                checks.push(parse_check(id, value)?);
            }
        }
        _ => return Err(ConfigError::NotAHash(String::from("checks"))),
    }

    let mut outputs = Vec::new();
    match cfg["outputs"] {
        Yaml::Array(ref h) => {
            for value in h {
                outputs.push(parse_output(value)?);
            }
        }
        Yaml::BadValue => outputs.push(OutputConfig {
            output_name: String::from("print"),
            config: HashMap::new(),
        }),
        _ => return Err(ConfigError::NotAnArray(String::from("outputs"))),
    }

    debug!("Loaded {} checks and {} outputs", checks.len(), outputs.len());
    Ok(Config { interval, checks, outputs })
}

fn parse_check(id: String, value: &Yaml) -> Result<Check, ConfigError> {
    if value.as_hash().is_none() {
        return Err(ConfigError::NotAHash(id));
    }
    let check_type = required_string(&id, value, "check")?;
    let name = required_string(&id, value, "name")?;
    match check_type.as_str() {
        "status" => Ok(Check::Status {
            maximum: threshold(&id, value, "maximum")?,
            minimum: threshold(&id, value, "minimum")?,
            id,
            name,
        }),
        "blkid" => {
            let disktype = match &value["disktype"] {
                Yaml::BadValue | Yaml::Null => None,
                other => Some(yaml_string(other).ok_or_else(|| ConfigError::InvalidValue {
                    section: id.clone(),
                    key: String::from("disktype"),
                })?),
            };
            Ok(Check::Blkid { id, name, disktype })
        }
        _ => Err(ConfigError::UnknownCheck(id, check_type)),
    }
}

fn parse_output(value: &Yaml) -> Result<OutputConfig, ConfigError> {
    let output_name = required_string("outputs", value, "output_name")?;
    let mut output = OutputConfig { output_name, config: HashMap::new() };
    match value["config"] {
        Yaml::Hash(ref l) => {
            for (m_name, m_value) in l {
                if let Some(m_name) = yaml_string(m_name) {
                    output.config.insert(m_name, m_value.clone());
                }
            }
        }
        Yaml::BadValue => {}
        _ => return Err(ConfigError::NotAHash(format!("{} config", output.output_name))),
    }
    Ok(output)
}

// Thresholds are kept raw; a bad string surfaces as a failing check result.
fn threshold(section: &str, value: &Yaml, key: &str) -> Result<Option<Threshold>, ConfigError> {
    match &value[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(i) => Ok(Some(Threshold::Integer(*i))),
        Yaml::String(s) | Yaml::Real(s) => Ok(Some(Threshold::Percent(s.clone()))),
        _ => Err(ConfigError::InvalidValue { section: section.to_string(), key: key.to_string() }),
    }
}

fn required_string(section: &str, value: &Yaml, key: &str) -> Result<String, ConfigError> {
    match &value[key] {
        Yaml::BadValue | Yaml::Null => Err(ConfigError::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        }),
        other => yaml_string(other).ok_or_else(|| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn yaml_string(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}
