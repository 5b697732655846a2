//! CSV trace output.
//!
//! One row per convoy per trace tick:
//!
//! ```text
//! tick,convoy,speed_kmh,position_steps,section
//! 0,0,0,0,0
//! 1,0,3,0,0
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use cv_core::Tick;

use crate::{Convoy, FleetObserver, Route, SimError, SimResult};

pub const TRACE_HEADER: [&str; 5] = ["tick", "convoy", "speed_kmh", "position_steps", "section"];

/// One convoy's state at a trace tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRow {
    pub tick:           u64,
    pub convoy:         u32,
    pub speed_kmh:      i32,
    pub position_steps: u32,
    pub section:        u32,
}

impl TraceRow {
    pub fn of(tick: Tick, convoy: &Convoy) -> Self {
        Self {
            tick:           tick.0,
            convoy:         convoy.id.0,
            speed_kmh:      convoy.speed_kmh(),
            position_steps: convoy.position,
            section:        convoy.section.0,
        }
    }
}

/// A [`FleetObserver`] that writes [`TraceRow`]s as CSV.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After `fleet.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct CsvTraceObserver<W: Write = File> {
    writer:     Writer<W>,
    rows:       u64,
    finished:   bool,
    last_error: Option<SimError>,
}

impl CsvTraceObserver<File> {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: &Path) -> SimResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvTraceObserver<W> {
    /// Write the header row to `inner`.
    pub fn from_writer(inner: W) -> SimResult<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(TRACE_HEADER)?;
        Ok(Self {
            writer,
            rows: 0,
            finished: false,
            last_error: None,
        })
    }

    /// Data rows written so far.
    #[inline]
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Take the stored write error (if any) after `fleet.run()` returns.
    pub fn take_error(&mut self) -> Option<SimError> {
        self.last_error.take()
    }

    pub fn write_row(&mut self, row: &TraceRow) -> SimResult<()> {
        self.writer.write_record(&[
            row.tick.to_string(),
            row.convoy.to_string(),
            row.speed_kmh.to_string(),
            row.position_steps.to_string(),
            row.section.to_string(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    /// Flush buffered rows.  Idempotent.
    pub fn finish(&mut self) -> SimResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> SimResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| SimError::Io(e.into_error()))
    }

    fn store_err(&mut self, result: SimResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: Write> FleetObserver for CsvTraceObserver<W> {
    fn on_trace(&mut self, tick: Tick, convoys: &[Convoy], _route: &Route) {
        for convoy in convoys {
            let result = self.write_row(&TraceRow::of(tick, convoy));
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.finish();
        self.store_err(result);
    }
}
