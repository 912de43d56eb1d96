//! Console progress bar driven by an observer thread
//!
//! The reporter never touches the pool. It samples a [`ProgressCounter`] on a
//! fixed tick and redraws the bar in place whenever the whole percentage
//! went up.

use crate::core::{Result, ThreadError};
use crate::simulation::aggregate::ProgressCounter;
use crossbeam_channel::{select, tick, Sender};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Cells in a full-width bar
pub const BAR_WIDTH: usize = 100;

/// Cell for completed work
pub const FILLED: char = '█';

/// Cell for remaining work
pub const EMPTY: char = '░';

/// Render a bar `width` cells wide, `percent` of them filled.
pub fn render_bar(percent: u8, width: usize) -> String {
    let filled = width * usize::from(percent.min(100)) / 100;
    let mut bar = String::with_capacity(width * FILLED.len_utf8());
    bar.extend(std::iter::repeat(FILLED).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(width - filled));
    bar
}

/// Handle to a running progress observer thread
#[derive(Debug)]
pub struct ProgressReporter {
    thread: Option<thread::JoinHandle<Result<u8>>>,
    stop: Sender<()>,
}

impl ProgressReporter {
    /// Spawn an observer that draws into `sink` every `interval`.
    ///
    /// The thread exits on its own once the counter reports completion.
    pub fn spawn<W>(counter: Arc<ProgressCounter>, sink: W, interval: Duration) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        if interval.is_zero() {
            return Err(ThreadError::invalid_config(
                "progress_interval",
                "Progress interval must be non-zero",
            ));
        }

        let (stop, stop_rx) = crossbeam_channel::bounded(1);
        let thread = thread::Builder::new()
            .name("progress".to_string())
            .spawn(move || -> Result<u8> {
                let ticker = tick(interval);
                let mut bar = BarWriter::new(sink)?;
                loop {
                    bar.update(counter.percent())?;
                    if counter.is_complete() {
                        break;
                    }
                    select! {
                        recv(stop_rx) -> _ => {
                            bar.update(counter.percent())?;
                            break;
                        }
                        recv(ticker) -> _ => {}
                    }
                }
                bar.finish()
            })?;

        Ok(Self {
            thread: Some(thread),
            stop,
        })
    }

    /// Wait for the counter to complete and the observer to exit.
    ///
    /// Returns the last percentage drawn.
    pub fn join(mut self) -> Result<u8> {
        self.wait()
    }

    /// Draw the current state one last time and stop the observer.
    ///
    /// Use this when the counter may never reach its total, for example
    /// after failed jobs.
    pub fn stop(mut self) -> Result<u8> {
        let _ = self.stop.try_send(());
        self.wait()
    }

    fn wait(&mut self) -> Result<u8> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| ThreadError::other("progress reporter panicked"))?,
            None => Ok(0),
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.stop.try_send(());
            if let Err(e) = self.wait() {
                log::warn!("progress reporter failed: {}", e);
            }
        }
    }
}

/// Writes the bar and redraws it in place
struct BarWriter<W: Write> {
    sink: W,
    shown: u8,
}

impl<W: Write> BarWriter<W> {
    fn new(mut sink: W) -> Result<Self> {
        write!(sink, "{}", render_bar(0, BAR_WIDTH))?;
        sink.flush()?;
        Ok(Self { sink, shown: 0 })
    }

    fn update(&mut self, percent: u8) -> Result<()> {
        if percent > self.shown {
            write!(self.sink, "\r{}", render_bar(percent, BAR_WIDTH))?;
            self.sink.flush()?;
            self.shown = percent;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<u8> {
        writeln!(self.sink)?;
        self.sink.flush()?;
        Ok(self.shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Cloneable in-memory sink
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).expect("bar is valid utf-8")
        }
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(0, 4), "░░░░");
        assert_eq!(render_bar(50, 4), "██░░");
        assert_eq!(render_bar(100, 4), "████");
        assert_eq!(render_bar(200, 4), "████");
        assert_eq!(render_bar(37, BAR_WIDTH).chars().count(), BAR_WIDTH);
        assert_eq!(
            render_bar(37, BAR_WIDTH).chars().filter(|c| *c == FILLED).count(),
            37
        );
    }

    #[test]
    fn test_reporter_finishes_with_counter() {
        let counter = Arc::new(ProgressCounter::new(10));
        let sink = SharedBuf::default();
        let reporter =
            ProgressReporter::spawn(Arc::clone(&counter), sink.clone(), Duration::from_millis(5))
                .expect("spawn failed");

        for _ in 0..10 {
            counter.increment();
            thread::sleep(Duration::from_millis(2));
        }

        assert_eq!(reporter.join().expect("reporter failed"), 100);

        let out = sink.contents();
        assert!(out.starts_with(&render_bar(0, BAR_WIDTH)));
        assert!(out.ends_with(&format!("\r{}\n", render_bar(100, BAR_WIDTH))));
    }

    #[test]
    fn test_reporter_only_redraws_on_progress() {
        let counter = Arc::new(ProgressCounter::new(2));
        let sink = SharedBuf::default();
        let reporter =
            ProgressReporter::spawn(Arc::clone(&counter), sink.clone(), Duration::from_millis(2))
                .expect("spawn failed");

        // Idle ticks draw nothing new
        thread::sleep(Duration::from_millis(30));
        assert_eq!(sink.contents().matches('\r').count(), 0);

        counter.increment();
        assert_eq!(reporter.stop().expect("reporter failed"), 50);

        let out = sink.contents();
        assert_eq!(out.matches('\r').count(), 1);
        assert!(out.ends_with(&format!("\r{}\n", render_bar(50, BAR_WIDTH))));
    }

    #[test]
    fn test_reporter_with_empty_total_exits() {
        let counter = Arc::new(ProgressCounter::new(0));
        let reporter =
            ProgressReporter::spawn(counter, std::io::sink(), Duration::from_millis(5))
                .expect("spawn failed");
        assert_eq!(reporter.join().expect("reporter failed"), 100);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let counter = Arc::new(ProgressCounter::new(1));
        let result = ProgressReporter::spawn(counter, std::io::sink(), Duration::ZERO);
        assert!(matches!(result, Err(ThreadError::InvalidConfig { .. })));
    }
}
