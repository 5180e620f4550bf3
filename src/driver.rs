// Batch driver: loads routes and answers queries from line-oriented input
//
// Input layout:
//   <route count n>
//   n lines of "<a.b.c.d/m> <interface>"
//   <query count m>
//   m lines of "<a.b.c.d>"
// Blank lines are ignored.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

use crate::error::{AppError, AppResult};
use crate::routes::lookup::Router;
use crate::routes::{parser, RouteSummary, RoutingTable};

/// Format used when dumping the loaded routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Printed instead of an interface when no route matches
    pub miss_marker: String,
    pub dump_routes: bool,
    pub dump_format: DumpFormat,
}

impl Default for DriverOptions {
    fn default() -> Self {
        DriverOptions {
            miss_marker: "-1".to_string(),
            dump_routes: false,
            dump_format: DumpFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub routes_loaded: usize,
    pub queries: usize,
    pub misses: usize,
}

/// Line source that tracks line numbers and skips blank lines
struct LineReader<R> {
    inner: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> LineReader<R> {
    fn new(inner: R) -> Self {
        LineReader {
            inner,
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Next non-blank line, trimmed, with its 1-based line number
    fn next_line(&mut self, what: &str) -> AppResult<(usize, &str)> {
        loop {
            self.buf.clear();
            if self.inner.read_line(&mut self.buf)? == 0 {
                return Err(AppError::UnexpectedEof(what.to_string()));
            }
            self.line_no += 1;
            if !self.buf.trim().is_empty() {
                return Ok((self.line_no, self.buf.trim()));
            }
        }
    }

    fn next_count(&mut self, what: &str) -> AppResult<usize> {
        let (line, text) = self.next_line(what)?;
        parser::parse_count(text).ok_or_else(|| AppError::InvalidCount {
            line,
            value: text.to_string(),
        })
    }
}

/// Run a whole batch: read routes, optionally dump them, then answer every query.
///
/// Query results go to `output`, one per line in input order. The routing
/// table dump, when enabled, goes to `dump`.
pub fn run<R, W, D>(input: R, mut output: W, mut dump: D, opts: &DriverOptions) -> AppResult<RunSummary>
where
    R: BufRead,
    W: Write,
    D: Write,
{
    let mut lines = LineReader::new(input);
    let mut summary = RunSummary::default();

    let route_count = lines.next_count("the number of routes")?;
    let mut router = Router::new();
    for i in 0..route_count {
        let (line, text) = lines.next_line(&format!("route {} of {}", i + 1, route_count))?;
        let (subnet, interface) = parser::parse_route_line(text).map_err(|e| e.at_line(line))?;
        router.insert(subnet, interface);
    }
    summary.routes_loaded = router.len();
    tracing::info!(
        "Loaded {} route(s) from {} line(s)",
        summary.routes_loaded,
        route_count
    );

    if opts.dump_routes {
        write_dump(&router, opts.dump_format, &mut dump)?;
    }

    let query_count = lines.next_count("the number of queries")?;
    for i in 0..query_count {
        let (line, text) = lines.next_line(&format!("query {} of {}", i + 1, query_count))?;
        let addr = parser::parse_address(text).map_err(|e| e.at_line(line))?;

        summary.queries += 1;
        match router.lookup(addr) {
            Some(interface) => writeln!(output, "{}", interface)?,
            None => {
                summary.misses += 1;
                tracing::warn!("No route to {} (line {})", addr, line);
                writeln!(output, "{}", opts.miss_marker)?;
            }
        }
    }
    output.flush()?;

    tracing::info!(
        "Answered {} quer(ies), {} without a route",
        summary.queries,
        summary.misses
    );
    Ok(summary)
}

/// Write the routing table in the requested format
pub fn write_dump<W: Write>(router: &Router, format: DumpFormat, out: &mut W) -> AppResult<()> {
    let routes: Vec<RouteSummary> = router.routes().iter().map(RouteSummary::from).collect();
    match format {
        DumpFormat::Json => {
            let table = RoutingTable {
                count: routes.len(),
                routes,
            };
            serde_json::to_writer_pretty(&mut *out, &table)?;
            writeln!(out)?;
        }
        DumpFormat::Text => {
            for route in &routes {
                writeln!(
                    out,
                    "{} ===> {}  [{}]",
                    route.destination, route.interface, route.prefix_bits
                )?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_str(input: &str, opts: &DriverOptions) -> AppResult<(String, String, RunSummary)> {
        let mut out = Vec::new();
        let mut dump = Vec::new();
        let summary = run(input.as_bytes(), &mut out, &mut dump, opts)?;
        Ok((
            String::from_utf8(out).unwrap(),
            String::from_utf8(dump).unwrap(),
            summary,
        ))
    }

    #[test]
    fn test_run_answers_queries_in_order() {
        let input = "3\n10.0.0.0/8 1\n10.1.0.0/16 2\n0.0.0.0/0 0\n4\n10.1.2.3\n10.2.2.3\n8.8.8.8\n10.1.255.255\n";
        let (out, dump, summary) = run_str(input, &DriverOptions::default()).unwrap();
        assert_eq!(out, "2\n1\n0\n2\n");
        assert!(dump.is_empty());
        assert_eq!(
            summary,
            RunSummary {
                routes_loaded: 3,
                queries: 4,
                misses: 0
            }
        );
    }

    #[test]
    fn test_run_reports_misses() {
        let input = "1\n192.168.0.0/16 4\n2\n192.168.1.1\n10.0.0.1\n";
        let (out, _, summary) = run_str(input, &DriverOptions::default()).unwrap();
        assert_eq!(out, "4\n-1\n");
        assert_eq!(summary.misses, 1);

        let opts = DriverOptions {
            miss_marker: "none".to_string(),
            ..Default::default()
        };
        let (out, _, _) = run_str(input, &opts).unwrap();
        assert_eq!(out, "4\nnone\n");
    }

    #[test]
    fn test_run_overwrite_counts_once() {
        let input = "2\n10.0.0.0/8 1\n10.0.0.0/8 5\n1\n10.0.0.1\n";
        let (out, _, summary) = run_str(input, &DriverOptions::default()).unwrap();
        assert_eq!(out, "5\n");
        assert_eq!(summary.routes_loaded, 1);
    }

    #[test]
    fn test_run_skips_blank_lines_and_crlf() {
        let input = "\n1\r\n\r\n10.0.0.0/8 1\r\n1\r\n10.9.9.9\r\n";
        let (out, _, _) = run_str(input, &DriverOptions::default()).unwrap();
        assert_eq!(out, "1\n");
    }

    #[test]
    fn test_run_empty_batches() {
        let (out, _, summary) = run_str("0\n0\n", &DriverOptions::default()).unwrap();
        assert!(out.is_empty());
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn test_run_errors_carry_line_numbers() {
        let err = run_str("1\n10.0.0.0/40 1\n0\n", &DriverOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::AtLine { line: 2, .. }));

        let err = run_str("1\n10.0.0.0/8 1\n1\nnot-an-ip\n", &DriverOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::AtLine { line: 4, .. }));

        let err = run_str("many\n", &DriverOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidCount { line: 1, .. }));
    }

    #[test]
    fn test_run_unexpected_eof() {
        let err = run_str("2\n10.0.0.0/8 1\n", &DriverOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::UnexpectedEof(ref what) if what == "route 2 of 2"));

        let err = run_str("0\n", &DriverOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::UnexpectedEof(_)));
    }

    #[test]
    fn test_dump_text_and_json() {
        let input = "2\n10.1.0.0/16 2\n10.0.0.0/8 1\n0\n";
        let opts = DriverOptions {
            dump_routes: true,
            ..Default::default()
        };
        let (_, dump, _) = run_str(input, &opts).unwrap();
        assert_eq!(
            dump,
            "10.0.0.0/8 ===> 1  [0000 1010]\n10.1.0.0/16 ===> 2  [0000 1010 0000 0001]\n"
        );

        let opts = DriverOptions {
            dump_routes: true,
            dump_format: DumpFormat::Json,
            ..Default::default()
        };
        let (_, dump, _) = run_str(input, &opts).unwrap();
        let table: RoutingTable = serde_json::from_str(&dump).unwrap();
        assert_eq!(table.count, 2);
        assert_eq!(table.routes[1].destination, "10.1.0.0/16");
        assert_eq!(table.routes[1].network, "10.1.0.0");
    }
}
