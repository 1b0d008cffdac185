//! # Print Spooler
//!
//! The spooler is the only owner of the printer driver. It runs on a
//! dedicated thread and takes jobs from a channel one at a time.
//!
//! ## Loop
//!
//! ```text
//!   ┌──► connected? ── no ──► connect ── fail ──► sleep ─┐
//!   │        │ yes                                        │
//!   │   probe with set_size(S) ── fail ──► drop driver ───┤
//!   │        │ ok                                         │
//!   │   wait for job ── channel closed ──► exit           │
//!   │        │                                            │
//!   │   print job + 3 newlines ── transport fault ──► drop driver
//!   └────────┴────────────────────────────────────────────┘
//! ```
//!
//! A job that fails is logged and discarded; it is not retried. The queue is
//! bounded by [`QUEUE_CAPACITY`], so senders must cope with a full queue
//! while the printer is unreachable.

use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use uuid::Uuid;

use crate::error::Result;
use crate::markup::Markup;
use crate::printer::ThermalPrinter;
use crate::protocol::text::Size;
use crate::render::Bitmap;
use crate::transport::Transport;

/// Jobs the queue holds before new ones are refused.
pub const QUEUE_CAPACITY: usize = 100;

/// Delay before retrying a failed connection or probe.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Blank lines fed after each job so it clears the tear bar.
const TRAILING_FEED: &str = "\n\n\n";

/// Something to print.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintJob {
    /// Text printed as is
    Plain(String),
    /// Text in a markup format
    Markup(Markup, String),
    /// An already dithered image
    Bitmap(Bitmap),
}

impl PrintJob {
    /// Build a text job. Plain format becomes [`PrintJob::Plain`].
    pub fn text(format: Markup, body: impl Into<String>) -> Self {
        match format {
            Markup::Plain => Self::Plain(body.into()),
            other => Self::Markup(other, body.into()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::Markup(markup, _) => markup.name(),
            Self::Bitmap(_) => "bitmap",
        }
    }

    /// Print the job body.
    pub fn print<T: Transport>(&self, printer: &mut ThermalPrinter<T>) -> Result<()> {
        match self {
            Self::Plain(body) => printer.write(body),
            Self::Markup(markup, body) => markup.render(printer, body),
            Self::Bitmap(bitmap) => printer.print_packed(bitmap, false),
        }
    }
}

/// A queued job with an id for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: Uuid,
    pub job: PrintJob,
}

impl Ticket {
    pub fn new(job: PrintJob) -> Self {
        Self {
            id: Uuid::new_v4(),
            job,
        }
    }
}

type Connector<T> = Box<dyn FnMut() -> Result<ThermalPrinter<T>> + Send>;

/// Owns the driver and feeds it jobs.
pub struct Spooler<T: Transport> {
    connect: Connector<T>,
    retry_delay: Duration,
    printer: Option<ThermalPrinter<T>>,
}

impl<T: Transport + 'static> Spooler<T> {
    /// `connect` builds a ready driver; it is called again after every
    /// transport fault.
    pub fn new<F>(connect: F) -> Self
    where
        F: FnMut() -> Result<ThermalPrinter<T>> + Send + 'static,
    {
        Self {
            connect: Box::new(connect),
            retry_delay: DEFAULT_RETRY_DELAY,
            printer: None,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Run the loop on a named thread.
    pub fn spawn(self, jobs: Receiver<Ticket>) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("spooler".into())
            .spawn(move || self.run(jobs))
    }

    /// Process jobs until every sender is dropped.
    pub fn run(mut self, jobs: Receiver<Ticket>) {
        tracing::info!("spooler started");
        loop {
            if !self.ready() {
                thread::sleep(self.retry_delay);
                continue;
            }

            let ticket = match jobs.recv() {
                Ok(ticket) => ticket,
                Err(_) => break,
            };
            self.print(ticket);
        }
        tracing::info!("job queue closed, spooler stopping");
    }

    /// Connect if needed, then probe the link.
    fn ready(&mut self) -> bool {
        if self.printer.is_none() {
            match (self.connect)() {
                Ok(printer) => self.printer = Some(printer),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to connect to printer");
                    return false;
                }
            }
        }

        let Some(printer) = self.printer.as_mut() else {
            return false;
        };
        if let Err(e) = printer.set_size(Size::Small) {
            tracing::warn!(error = %e, "printer probe failed, reconnecting");
            self.printer = None;
            return false;
        }
        true
    }

    fn print(&mut self, ticket: Ticket) {
        let Some(printer) = self.printer.as_mut() else {
            return;
        };
        let kind = ticket.job.kind();
        tracing::debug!(job_id = %ticket.id, kind, "printing job");

        let result = ticket
            .job
            .print(printer)
            .and_then(|()| printer.write(TRAILING_FEED));

        match result {
            Ok(()) => tracing::info!(job_id = %ticket.id, kind, "job printed"),
            Err(e) if e.is_transport_fault() => {
                tracing::error!(job_id = %ticket.id, error = %e, "failed to print job, dropping printer");
                self.printer = None;
            }
            Err(e) => tracing::warn!(job_id = %ticket.id, error = %e, "failed to print job"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ThermalError;
    use crate::printer::PrinterConfig;
    use crate::transport::MemoryTransport;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    fn probe() -> Vec<u8> {
        vec![29, 33, 0]
    }

    #[test]
    fn test_jobs_print_in_order_with_trailing_feed() {
        let out = MemoryTransport::new();
        let sink = out.clone();
        let spooler = Spooler::new(move || {
            Ok(ThermalPrinter::new(sink.clone(), PrinterConfig::default()))
        })
        .with_retry_delay(Duration::ZERO);

        let (tx, rx) = mpsc::channel();
        tx.send(Ticket::new(PrintJob::Plain("one".into()))).unwrap();
        tx.send(Ticket::new(PrintJob::Plain("two".into()))).unwrap();
        drop(tx);
        spooler.run(rx);

        let mut expected = probe();
        expected.extend(b"one\n\n\n");
        expected.extend(probe());
        expected.extend(b"two\n\n\n");
        expected.extend(probe());
        assert_eq!(out.written(), expected);
    }

    #[test]
    fn test_connect_retries_until_success() {
        let attempts = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&attempts);
        let out = MemoryTransport::new();
        let sink = out.clone();
        let spooler = Spooler::new(move || {
            let mut n = counter.lock().unwrap();
            *n += 1;
            if *n < 3 {
                Err(ThermalError::Transport("no device".into()))
            } else {
                Ok(ThermalPrinter::new(sink.clone(), PrinterConfig::default()))
            }
        })
        .with_retry_delay(Duration::ZERO);

        let (tx, rx) = mpsc::channel();
        tx.send(Ticket::new(PrintJob::Plain("x".into()))).unwrap();
        drop(tx);
        spooler.run(rx);

        assert_eq!(*attempts.lock().unwrap(), 3);
        assert!(out.written().windows(4).any(|w| w == b"x\n\n\n"));
    }

    #[test]
    fn test_transport_fault_reconnects() {
        let attempts = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&attempts);
        let good = MemoryTransport::new();
        let good_sink = good.clone();
        let spooler = Spooler::new(move || {
            let mut n = counter.lock().unwrap();
            *n += 1;
            let transport = if *n == 1 {
                // Probe succeeds, the job dies part way through.
                MemoryTransport::new().failing_after(5)
            } else {
                good_sink.clone()
            };
            Ok(ThermalPrinter::new(transport, PrinterConfig::default()))
        })
        .with_retry_delay(Duration::ZERO);

        let (tx, rx) = mpsc::channel();
        tx.send(Ticket::new(PrintJob::Plain("lost job".into()))).unwrap();
        tx.send(Ticket::new(PrintJob::Plain("kept".into()))).unwrap();
        drop(tx);
        spooler.run(rx);

        assert_eq!(*attempts.lock().unwrap(), 2);
        let mut expected = probe();
        expected.extend(b"kept\n\n\n");
        expected.extend(probe());
        assert_eq!(good.written(), expected);
    }

    #[test]
    fn test_bad_bitmap_does_not_drop_printer() {
        let attempts = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&attempts);
        let spooler = Spooler::new(move || {
            *counter.lock().unwrap() += 1;
            Ok(ThermalPrinter::new(MemoryTransport::new(), PrinterConfig::default()))
        })
        .with_retry_delay(Duration::ZERO);

        let broken = Bitmap {
            width: 16,
            height: 4,
            data: vec![0; 3],
        };
        let (tx, rx) = mpsc::channel();
        tx.send(Ticket::new(PrintJob::Bitmap(broken))).unwrap();
        tx.send(Ticket::new(PrintJob::Plain("after".into()))).unwrap();
        drop(tx);
        spooler.run(rx);

        assert_eq!(*attempts.lock().unwrap(), 1);
    }

    #[test]
    fn test_job_kinds() {
        assert_eq!(PrintJob::text(Markup::Plain, "a").kind(), "plain");
        assert_eq!(PrintJob::text(Markup::Tag, "a").kind(), "tag");
        assert_eq!(
            PrintJob::text(Markup::BBCode, "a"),
            PrintJob::Markup(Markup::BBCode, "a".into())
        );
    }
}
