//! Line-oriented command stream.
//!
//! Reads one command per line, writes the resulting status lines as soon as
//! each command is processed, and flushes after every input line. A line that
//! fails to parse or is rejected is reported on the error writer and the
//! stream carries on with the next line. Lines that are not valid UTF-8 are
//! rejected the same way.

use crate::codec::{Request, execute, parse_request};
use crate::error::{LockError, Result};
use crate::events::{Event, EventLog};
use crate::manager::{LockManager, Operation};
use std::io::{BufRead, ErrorKind, Write};

/// Counters for a processed stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Non-blank lines read.
    pub lines: usize,
    /// Lines reported on the error writer.
    pub rejected: usize,
}

/// Process every line of `input` against `manager`.
///
/// # Returns
///
/// * `Ok(StreamSummary)` - The input was exhausted
/// * `Err(LockError::Io)` - Reading input or writing output failed
pub fn process_stream<R, W, E>(
    manager: &mut LockManager,
    mut input: R,
    output: &mut W,
    errors: &mut E,
    events: Option<&EventLog>,
) -> Result<StreamSummary>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut summary = StreamSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .map_err(|e| LockError::Io(format!("failed to read input: {}", e)))?;
        if read == 0 {
            break;
        }

        let (line, decoded) = match std::str::from_utf8(&buf) {
            Ok(text) => (text.to_string(), true),
            Err(_) => (String::from_utf8_lossy(&buf).into_owned(), false),
        };
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        summary.lines += 1;

        let (request, result) = if decoded {
            handle_line(manager, line)
        } else {
            (None, Err(LockError::Parse(line.to_string())))
        };
        match result {
            Ok((operation, rendered)) => {
                for item in &rendered {
                    writeln!(output, "{}", item).map_err(output_error)?;
                }
                output.flush().map_err(output_error)?;
                if let (Some(log), Some(request)) = (events, &request) {
                    log.record(&Event::handled(request, operation, &rendered));
                }
            }
            Err(err) if err.is_request_error() => {
                summary.rejected += 1;
                writeln!(errors, "Error processing line: {}", err).map_err(output_error)?;
                errors.flush().map_err(output_error)?;
                if let Some(log) = events {
                    log.record(&Event::rejected(request.as_ref(), line, &err));
                }
            }
            Err(err) => return Err(err),
        }
    }

    Ok(summary)
}

fn handle_line(
    manager: &mut LockManager,
    line: &str,
) -> (Option<Request>, Result<(Operation, Vec<String>)>) {
    match parse_request(line) {
        Ok(request) => {
            let result = execute(manager, &request);
            (Some(request), result)
        }
        Err(err) => (None, Err(err)),
    }
}

fn output_error(e: std::io::Error) -> LockError {
    if e.kind() == ErrorKind::BrokenPipe {
        LockError::Io("output pipe closed early".to_string())
    } else {
        LockError::Io(format!("failed to write output: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventAction;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run(input: &str) -> (String, String, StreamSummary) {
        let mut manager = LockManager::new();
        let mut output = Vec::new();
        let mut errors = Vec::new();
        let summary = process_stream(
            &mut manager,
            Cursor::new(input),
            &mut output,
            &mut errors,
            None,
        )
        .unwrap();
        (
            String::from_utf8(output).unwrap(),
            String::from_utf8(errors).unwrap(),
            summary,
        )
    }

    #[test]
    fn test_processor_basic_operation() {
        let (output, errors, summary) = run("Start 1\nSLock 1 A\n");
        assert_eq!(
            output,
            "Start 1 : Transaction 1 started\nSLock 1 A: Lock granted\n"
        );
        assert_eq!(errors, "");
        assert_eq!(summary, StreamSummary { lines: 2, rejected: 0 });
    }

    #[test]
    fn test_processor_empty_input() {
        let (output, errors, summary) = run("");
        assert_eq!(output, "");
        assert_eq!(errors, "");
        assert_eq!(summary.lines, 0);
    }

    #[test]
    fn test_processor_error_handling() {
        let (output, errors, summary) = run("Start 1\nbad\nStart 1\nEnd 1\n");

        assert_eq!(
            output,
            "Start 1 : Transaction 1 started\nEnd 1 : Transaction 1 ended\n"
        );
        assert!(errors.contains("Error processing line: Text 'bad'"));
        assert!(errors.contains("Error processing line: Start 1 : Transaction 1 already exists"));
        assert_eq!(summary.rejected, 2);
    }

    #[test]
    fn test_processor_multiline_output() {
        let (output, _, _) = run("Start 1\nStart 2\nSLock 1 A\nXLock 2 A\nUnlock 1 A\n");
        assert!(output.ends_with("Unlock 1 A: Lock released\nX-Lock granted to 2\n"));
    }

    #[test]
    fn test_processor_skips_blank_lines_and_crlf() {
        let (output, errors, summary) = run("Start 1\r\n\r\n\nEnd 1\r\n");
        assert_eq!(
            output,
            "Start 1 : Transaction 1 started\nEnd 1 : Transaction 1 ended\n"
        );
        assert_eq!(errors, "");
        assert_eq!(summary.lines, 2);
    }

    #[test]
    fn test_processor_records_events() {
        let dir = TempDir::new().unwrap();
        let log = EventLog::new(dir.path().join("events.ndjson"));
        let mut manager = LockManager::new();

        process_stream(
            &mut manager,
            Cursor::new("Start 1\nXLock 1 A\nFoo 1\nnonsense\n"),
            &mut Vec::<u8>::new(),
            &mut Vec::<u8>::new(),
            Some(&log),
        )
        .unwrap();

        let events = log.read_all().unwrap();
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                EventAction::Start,
                EventAction::XLock,
                EventAction::Rejected,
                EventAction::Rejected
            ]
        );
        assert_eq!(events[1].resource.as_deref(), Some("A"));
        assert_eq!(events[2].txn, Some(1));
        assert_eq!(events[3].txn, None);
    }

    #[test]
    fn test_processor_continues_after_invalid_utf8() {
        let mut manager = LockManager::new();
        let mut output = Vec::new();
        let mut errors = Vec::new();
        let summary = process_stream(
            &mut manager,
            Cursor::new(&b"Start 1\n\xff\xfe bad\nStart 2\n"[..]),
            &mut output,
            &mut errors,
            None,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Start 1 : Transaction 1 started\nStart 2 : Transaction 2 started\n"
        );
        let errors = String::from_utf8(errors).unwrap();
        assert!(errors.starts_with("Error processing line: Text '"));
        assert_eq!(errors.lines().count(), 1);
        assert_eq!(summary, StreamSummary { lines: 3, rejected: 1 });
        assert!(manager.is_active(2));
    }

    #[test]
    fn test_processor_handles_last_line_without_newline() {
        let (output, _, summary) = run("Start 1\nEnd 1");
        assert!(output.ends_with("End 1 : Transaction 1 ended\n"));
        assert_eq!(summary.lines, 2);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_processor_stops_on_closed_output() {
        let mut manager = LockManager::new();
        let err = process_stream(
            &mut manager,
            Cursor::new("Start 1\nStart 2\n"),
            &mut ClosedPipe,
            &mut Vec::<u8>::new(),
            None,
        )
        .unwrap_err();

        assert_eq!(err, LockError::Io("output pipe closed early".to_string()));
        assert!(!err.is_request_error());
    }
}
