use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use log::{debug, info};
use crate::checker::Check;
use crate::output::Report;
use crate::provider::DataProvider;

/// Runs every check once per round and forwards the results. Without an
/// interval a single round is run and the sender is dropped on return.
pub fn check_worker<P: DataProvider>(
    checks: Vec<Check>,
    provider: P,
    interval: Option<Duration>,
    sender: Sender<Report>,
) {
    loop {
        debug!("Running {} checks", checks.len());
        for check in &checks {
            let report = Report {
                id: check.id().to_string(),
                result: check.run(&provider),
            };
            if sender.send(report).is_err() {
                info!("Output worker is gone, stopping checks");
                return;
            }
        }
        match interval {
            Some(interval) => thread::sleep(interval),
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use std::sync::mpsc::channel;

    #[test]
    fn single_round_closes_the_channel() {
        let provider = StaticProvider::new().with_usage("/", &[("capacity", "12%")]);
        let checks = vec![
            Check::Status { id: String::from("root"), name: String::from("/"), maximum: None, minimum: None },
            Check::Blkid { id: String::from("boot"), name: String::from("/dev/sda1"), disktype: None },
        ];
        let (tx, rx) = channel();
        check_worker(checks, provider, None, tx);
        let reports: Vec<Report> = rx.iter().collect();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, "root");
        assert!(reports[0].result.result);
        assert_eq!(reports[1].id, "boot");
        assert!(!reports[1].result.result);
    }

    #[test]
    fn stops_when_receiver_is_dropped() {
        let provider = StaticProvider::new();
        let checks = vec![Check::Blkid { id: String::from("x"), name: String::from("/dev/x"), disktype: None }];
        let (tx, rx) = channel();
        drop(rx);
        check_worker(checks, provider, Some(Duration::from_secs(3600)), tx);
    }
}
