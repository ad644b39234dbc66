use log::{LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::JoinHandle;

const LOG_CAPACITY: usize = 500;

/// Most recent log lines, shared with the log panel.
pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

struct SharedLogger {
    level: LevelFilter,
    buffer: LogBuffer,
    echo_stderr: bool,
}

impl Log for SharedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!("[{}] {}", record.level(), record.args());
        if self.echo_stderr {
            eprintln!("{}", line);
        }

        push_line(&mut lock(&self.buffer), line);
    }

    fn flush(&self) {}
}

static LOG_BUFFER: OnceLock<LogBuffer> = OnceLock::new();
static LOGGER: OnceLock<SharedLogger> = OnceLock::new();

fn lock(buffer: &LogBuffer) -> MutexGuard<'_, VecDeque<String>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

fn push_line(buffer: &mut VecDeque<String>, line: String) {
    if buffer.len() >= LOG_CAPACITY {
        buffer.pop_front();
    }
    buffer.push_back(line);
}

fn parse_level(value: Option<&str>) -> LevelFilter {
    match value.map(str::to_lowercase).as_deref() {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Install the shared logger and return its line buffer.
///
/// `RUST_LOG` picks the level; `BIRDQUIZ_LOG_STDERR` set to anything but `0`
/// mirrors every line to stderr.
pub fn init() -> LogBuffer {
    let buffer = LOG_BUFFER
        .get_or_init(|| Arc::new(Mutex::new(VecDeque::with_capacity(LOG_CAPACITY))))
        .clone();

    let level = parse_level(std::env::var("RUST_LOG").ok().as_deref());
    let echo_stderr = std::env::var("BIRDQUIZ_LOG_STDERR")
        .map(|value| value != "0")
        .unwrap_or(false);

    let logger = SharedLogger {
        level,
        buffer: buffer.clone(),
        echo_stderr,
    };

    let logger_ref = LOGGER.get_or_init(|| logger);
    if log::set_logger(logger_ref).is_ok() {
        log::set_max_level(level);
    }

    buffer
}

pub fn snapshot(buffer: &LogBuffer) -> Vec<String> {
    lock(buffer).iter().cloned().collect()
}

/// Restores the original stderr when dropped.
pub struct StderrCaptureGuard {
    original_fd: RawFd,
    stderr_fd: RawFd,
    reader_handle: Option<JoinHandle<()>>,
}

impl Drop for StderrCaptureGuard {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.original_fd, self.stderr_fd);
            libc::close(self.original_fd);
        }
        if let Some(handle) = self.reader_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Markers of lines written by the sound stack rather than by us.
const AUDIO_BACKEND_MARKERS: [&str; 5] = ["ALSA", "alsa", "jack", "cpal", "pulse"];

/// Label a captured stderr line by where it most likely came from.
fn tag_captured(line: &str) -> String {
    let source = if AUDIO_BACKEND_MARKERS
        .iter()
        .any(|marker| line.contains(marker))
    {
        "AUDIO"
    } else {
        "STDERR"
    };
    format!("[{}] {}", source, line)
}

/// Copy captured lines into `buffer`, folding immediate repeats.
///
/// Audio backends tend to print the same warning once per opened stream;
/// a run of identical lines becomes one entry with a repeat count.
fn forward_captured<R: BufRead>(mut reader: R, buffer: &LogBuffer) {
    let mut line = String::new();
    let mut previous: Option<String> = None;
    let mut repeats = 0usize;

    loop {
        line.clear();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }

        let tagged = tag_captured(trimmed);
        let mut lines = lock(buffer);
        if previous.as_deref() == Some(tagged.as_str()) {
            repeats += 1;
            lines.pop_back();
            push_line(&mut lines, format!("{} (x{})", tagged, repeats + 1));
            continue;
        }
        repeats = 0;
        push_line(&mut lines, tagged.clone());
        previous = Some(tagged);
    }
}

fn close_all(fds: &[RawFd]) {
    for &fd in fds {
        unsafe {
            libc::close(fd);
        }
    }
}

/// Redirect process stderr into `buffer` while the TUI owns the screen.
///
/// The audio output writes diagnostics straight to fd 2, which would otherwise
/// scribble over the alternate screen.
pub fn capture_stderr(buffer: LogBuffer) -> Option<StderrCaptureGuard> {
    let stderr_fd = std::io::stderr().as_raw_fd();
    let mut fds = [0; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return None;
    }
    let [read_fd, write_fd] = fds;

    let original_fd = unsafe { libc::dup(stderr_fd) };
    if original_fd < 0 {
        close_all(&[read_fd, write_fd]);
        return None;
    }
    if unsafe { libc::dup2(write_fd, stderr_fd) } < 0 {
        close_all(&[read_fd, write_fd, original_fd]);
        return None;
    }

    let handle = std::thread::spawn(move || {
        let file = unsafe { std::fs::File::from_raw_fd(read_fd) };
        forward_captured(BufReader::new(file), &buffer);
    });

    // fd 2 now holds the only write end; restoring it ends the reader.
    close_all(&[write_fd]);

    Some(StderrCaptureGuard {
        original_fd,
        stderr_fd,
        reader_handle: Some(handle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_most_recent_lines() {
        let mut buffer = VecDeque::new();
        for index in 0..LOG_CAPACITY + 5 {
            push_line(&mut buffer, format!("line {}", index));
        }
        assert_eq!(buffer.len(), LOG_CAPACITY);
        assert_eq!(buffer.front().map(String::as_str), Some("line 5"));
    }

    #[test]
    fn level_parsing_defaults_to_info() {
        assert_eq!(parse_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(parse_level(Some("warn")), LevelFilter::Warn);
        assert_eq!(parse_level(Some("verbose")), LevelFilter::Info);
        assert_eq!(parse_level(None), LevelFilter::Info);
    }

    #[test]
    fn captured_lines_are_tagged_by_source() {
        assert_eq!(
            tag_captured("ALSA lib pcm.c:2664: Unknown PCM default"),
            "[AUDIO] ALSA lib pcm.c:2664: Unknown PCM default"
        );
        assert_eq!(tag_captured("thread panicked"), "[STDERR] thread panicked");
    }

    #[test]
    fn repeated_backend_lines_are_folded() {
        let buffer: LogBuffer = Arc::new(Mutex::new(VecDeque::new()));
        let input = "jack server is not running\njack server is not running\n\n\
                     jack server is not running\nother\n";
        forward_captured(input.as_bytes(), &buffer);

        assert_eq!(
            snapshot(&buffer),
            vec![
                "[AUDIO] jack server is not running (x3)".to_string(),
                "[STDERR] other".to_string(),
            ]
        );
    }
}
