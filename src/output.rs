use std::sync::mpsc::Receiver;
use log::{error, info};
use crate::checker::CheckResult;
use crate::config::OutputConfig;
use crate::error::ConfigError;
use crate::output_graphite::GraphiteOutput;
use crate::output_print::PrintOutput;

/// A check result tagged with the id of the check that produced it.
#[derive(Debug, Clone)]
pub struct Report {
    pub id: String,
    pub result: CheckResult,
}

pub trait Outputs {
    fn process_result(&mut self, report: &Report);
}

pub fn build_outputs(configs: &[OutputConfig]) -> Result<Vec<Box<dyn Outputs + Send>>, ConfigError> {
    let mut outputs: Vec<Box<dyn Outputs + Send>> = Vec::new();
    for new_output in configs {
        if new_output.output_name == "print" {
            info!("  Starting print output");
            outputs.push(Box::new(PrintOutput::new()));
        } else if new_output.output_name == "graphite" {
            info!("  Starting graphite output");
            outputs.push(Box::new(GraphiteOutput::new(new_output)?));
        } else {
            return Err(ConfigError::UnknownOutput(new_output.output_name.clone()));
        }
    }
    Ok(outputs)
}

/// Hands every report to every output until all senders are gone, then
/// returns how many failing results went through.
pub fn output_worker(mut outputs: Vec<Box<dyn Outputs + Send>>, receiver: Receiver<Report>) -> usize {
    let mut failures = 0;
    for report in receiver {
        if !report.result.result {
            failures += 1;
        }
        for output in outputs.iter_mut() {
            output.process_result(&report);
        }
    }
    if failures > 0 {
        error!("{} check(s) failed", failures);
    }
    failures
}
