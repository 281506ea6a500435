use crate::config::OutputConfig;
use crate::error::ConfigError;
use crate::output::{Outputs, Report};
use crate::threshold::parse_capacity;
use log::{debug, warn};
use std::io;
use std::io::Write;
use std::net::TcpStream;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::{Duration, Instant};
use std::time::{SystemTime, UNIX_EPOCH};

const MIN_RECONNECT_DELAY_MS: u64 = 50;
const MAX_RECONNECT_DELAY_MS: u64 = 10_000;
const MAX_BUFFERED_LINES: usize = 10_000;

pub struct GraphiteOutput {
    prefix: String,
    buffer: Vec<String>,
    socket: RetrySocket,
}

struct RetrySocket {
    socket: Option<TcpStream>,
    address: Vec<SocketAddr>,
    next_try: Instant,
    retries: u32,
}

impl RetrySocket {
    fn new<A: ToSocketAddrs>(addresses: A) -> io::Result<Self> {
        let sockaddrs = addresses.to_socket_addrs()?.collect();
        Ok(Self {
            address: sockaddrs,
            retries: 0,
            next_try: Instant::now(),
            socket: None,
        })
    }

    fn try_connect(&mut self) -> io::Result<()> {
        if self.socket.is_some() {
            return Ok(());
        }
        if Instant::now() < self.next_try {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }
        let addresses: &[SocketAddr] = self.address.as_ref();
        match TcpStream::connect(addresses) {
            Ok(socket) => {
                self.socket = Some(socket);
                self.retries = 0;
                Ok(())
            }
            Err(e) => {
                self.retries = (self.retries + 1).min(16);
                let exp_delay = MIN_RECONNECT_DELAY_MS << self.retries;
                let max_delay = MAX_RECONNECT_DELAY_MS.min(exp_delay);
                self.next_try = Instant::now() + Duration::from_millis(max_delay);
                Err(e)
            }
        }
    }

    fn with_socket<F, T>(&mut self, operation: F) -> io::Result<T>
    where
        F: FnOnce(&mut TcpStream) -> io::Result<T>,
    {
        self.try_connect()?;
        let result = match self.socket {
            Some(ref mut socket) => operation(socket),
            None => Err(io::Error::from(io::ErrorKind::NotConnected)),
        };
        // drop a broken connection so the next write reconnects
        if result.is_err() {
            self.socket = None;
        }
        result
    }
}

impl io::Write for RetrySocket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_socket(|sock: &mut TcpStream| sock.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_socket(TcpStream::flush)
    }
}

impl GraphiteOutput {
    pub fn new(config: &OutputConfig) -> Result<Self, ConfigError> {
        let address = config
            .config
            .get("address")
            .and_then(|a| a.as_str())
            .ok_or_else(|| ConfigError::MissingKey {
                section: String::from("graphite"),
                key: String::from("address"),
            })?;
        let prefix = config
            .config
            .get("prefix")
            .and_then(|p| p.as_str())
            .unwrap_or("disk_checker");
        let socket = RetrySocket::new(address).map_err(|e| {
            warn!("Failed to resolve graphite address {}: {}", address, e);
            ConfigError::InvalidValue {
                section: String::from("graphite"),
                key: String::from("address"),
            }
        })?;
        Ok(Self {
            socket,
            buffer: Vec::new(),
            prefix: prefix.to_string(),
        })
    }
}

fn metric_name(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Plaintext protocol lines for one report.
pub fn graphite_lines(prefix: &str, report: &Report, timestamp: u64) -> Vec<String> {
    let path = format!("{}.{}", prefix, metric_name(&report.id));
    let mut lines = vec![format!(
        "{}.result {} {}\n",
        path,
        if report.result.result { 1 } else { 0 },
        timestamp
    )];
    let capacity = report
        .result
        .data
        .as_ref()
        .and_then(|d| d.get("capacity"))
        .and_then(|c| parse_capacity(c).ok());
    if let Some(capacity) = capacity {
        lines.push(format!("{}.capacity {} {}\n", path, capacity, timestamp));
    }
    lines
}

impl Outputs for GraphiteOutput {
    fn process_result(&mut self, report: &Report) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.buffer.extend(graphite_lines(&self.prefix, report, timestamp));
        if self.buffer.len() > MAX_BUFFERED_LINES {
            let overflow = self.buffer.len() - MAX_BUFFERED_LINES;
            warn!("Graphite buffer full, dropping {} lines", overflow);
            self.buffer.drain(..overflow);
        }
        let mut sent = 0;
        for line in &self.buffer {
            debug!("{:?}", line);
            if let Err(e) = self.socket.write_all(line.as_bytes()) {
                debug!("Graphite unavailable, keeping {} lines: {}", self.buffer.len() - sent, e);
                break;
            }
            sent += 1;
        }
        self.buffer.drain(..sent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckResult;
    use crate::provider::Metrics;
    use std::collections::HashMap;
    use std::io::Read;
    use std::net::TcpListener;
    use yaml_rust::Yaml;

    fn report(result: bool) -> Report {
        let mut data = Metrics::new();
        data.insert(String::from("capacity"), String::from("42%"));
        let result = if result {
            CheckResult::success("/media/sda1", "disk in acceptable range", Some(data))
        } else {
            CheckResult::failure("/media/sda1", "disk is above maximum of 40% at 42").with_data(data)
        };
        Report { id: String::from("media.sda1 status"), result }
    }

    #[test]
    fn lines_carry_result_and_capacity() {
        assert_eq!(
            graphite_lines("srv", &report(true), 1700000000),
            vec![
                String::from("srv.media_sda1_status.result 1 1700000000\n"),
                String::from("srv.media_sda1_status.capacity 42 1700000000\n"),
            ]
        );
        assert!(graphite_lines("srv", &report(false), 1)[0].contains(".result 0 1"));
    }

    #[test]
    fn lines_without_data_only_report_result() {
        let report = Report {
            id: String::from("boot"),
            result: CheckResult::failure("/dev/sda1", "named disk not present: /dev/sda1"),
        };
        assert_eq!(graphite_lines("srv", &report, 5), vec![String::from("srv.boot.result 0 5\n")]);
    }

    #[test]
    fn address_is_required() {
        let config = OutputConfig { output_name: String::from("graphite"), config: HashMap::new() };
        assert!(matches!(GraphiteOutput::new(&config), Err(ConfigError::MissingKey { .. })));
    }

    fn output_for(address: &str) -> GraphiteOutput {
        let mut config = HashMap::new();
        config.insert(String::from("address"), Yaml::String(address.to_string()));
        config.insert(String::from("prefix"), Yaml::String(String::from("test")));
        GraphiteOutput::new(&OutputConfig { output_name: String::from("graphite"), config }).unwrap()
    }

    // an address nothing listens on
    fn refused_address() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    }

    #[test]
    fn sends_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut output = output_for(&listener.local_addr().unwrap().to_string());
        output.process_result(&report(true));
        drop(output);

        let (mut stream, _) = listener.accept().unwrap();
        let mut received = String::new();
        stream.read_to_string(&mut received).unwrap();
        assert!(received.starts_with("test.media_sda1_status.result 1 "));
        assert!(received.contains("test.media_sda1_status.capacity 42 "));
    }

    #[test]
    fn unreachable_graphite_buffers_without_blocking() {
        let mut output = output_for(&refused_address());
        let start = Instant::now();
        for _ in 0..5 {
            output.process_result(&report(true));
        }
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(output.buffer.len(), 10);
        assert!(output.buffer[0].starts_with("test.media_sda1_status.result 1 "));
        assert!(output.socket.socket.is_none());
        assert!(output.socket.retries >= 1);
    }

    #[test]
    fn buffered_lines_are_flushed_once_graphite_is_back() {
        let address = refused_address();
        let mut output = output_for(&address);
        output.process_result(&report(false));
        assert_eq!(output.buffer.len(), 2);

        let listener = TcpListener::bind(address.as_str()).unwrap();
        output.socket.next_try = Instant::now();
        output.process_result(&report(true));
        assert!(output.buffer.is_empty());
        assert_eq!(output.socket.retries, 0);
        drop(output);

        let (mut stream, _) = listener.accept().unwrap();
        let mut received = String::new();
        stream.read_to_string(&mut received).unwrap();
        let lines: Vec<&str> = received.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("test.media_sda1_status.result 0 "));
        assert!(lines[2].starts_with("test.media_sda1_status.result 1 "));
    }

    #[test]
    fn full_buffer_drops_oldest_lines() {
        let mut output = output_for(&refused_address());
        output.buffer = (0..MAX_BUFFERED_LINES).map(|i| format!("old.{} 0 0\n", i)).collect();
        output.process_result(&report(true));
        assert_eq!(output.buffer.len(), MAX_BUFFERED_LINES);
        assert_eq!(output.buffer[0], "old.2 0 0\n");
        assert!(output.buffer[MAX_BUFFERED_LINES - 1].contains(".capacity 42 "));
    }
}
