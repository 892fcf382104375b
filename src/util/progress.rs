//! Progress reporting for long, loopy calculations.

use std::time::Instant;

use chrono::{DateTime, Local};

/// Seconds of runtime before the start banner becomes due.
const WAIT_TIME: f64 = 5.0;
/// Minimum predicted seconds remaining for the banner to be worth printing.
const MIN_REMAINING_LENGTH: f64 = 5.0;

/// Prints start and completion banners for a long-running loop to stdout.
///
/// Feed it the fraction of work done via [`update`](Self::update). Nothing
/// appears for the first few seconds; after that a start banner with an
/// estimated duration is printed once, provided enough work remains for the
/// estimate to be useful, and a completion line is printed when the fraction
/// reaches 1.
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    start: Option<Instant>,
    started_at: Option<DateTime<Local>>,
    frac_done: f64,
    start_printed: bool,
    end_printed: bool,
}

impl ProgressPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print a free-form status line.
    pub fn message(&self, text: &str) {
        println!("{text}");
    }

    /// Record progress as a fraction in [0, 1] and print any banner that has
    /// become due. The clock starts at the first call.
    pub fn update(&mut self, frac_done: f64) {
        let start = *self.start.get_or_insert_with(Instant::now);
        if self.started_at.is_none() {
            self.started_at = Some(Local::now());
        }
        let elapsed = start.elapsed().as_secs_f64();
        for line in self.advance(frac_done, elapsed) {
            println!("{line}");
        }
    }

    /// The state machine behind `update`, with elapsed time injected.
    fn advance(&mut self, frac_done: f64, elapsed: f64) -> Vec<String> {
        self.frac_done = frac_done;
        let mut lines = Vec::new();

        if elapsed > WAIT_TIME && !self.start_printed && self.frac_done > 0.0 {
            let est = elapsed / self.frac_done;
            if est - elapsed > MIN_REMAINING_LENGTH {
                let stamp = self.started_at.unwrap_or_else(Local::now);
                lines.push(
                    stamp
                        .format("Started on:         %Y-%m-%d at %H:%M:%S")
                        .to_string(),
                );
                lines.push(format!("Estimated duration: {}", format_estimate(est)));
                self.start_printed = true;
            }
        } else if self.frac_done == 1.0 && !self.end_printed {
            lines.push(format!("Completed in:       {}", format_total(elapsed)));
            self.end_printed = true;
        }

        lines
    }
}

/// Render a predicted duration; whole hours, then minutes (with seconds only
/// under the ten-minute mark).
fn format_estimate(est: f64) -> String {
    let mut out = String::new();
    if est > 3600.0 {
        out.push_str(&format!("{:.0} hr ", (est / 3600.0).floor()));
    }
    if est > 600.0 {
        out.push_str(&format!(
            "{:.0} min.",
            (est - 3600.0 * (est / 3600.0).floor()) / 60.0
        ));
    } else if est > 59.0 {
        out.push_str(&format!(
            "{:.0} min {:.0} sec.",
            (est / 60.0).floor(),
            est % 60.0
        ));
    } else {
        out.push_str(&format!("{est:.0} sec."));
    }
    out
}

/// Render a measured duration down to whole seconds.
fn format_total(tot: f64) -> String {
    let mut out = String::new();
    if tot > 3600.0 {
        out.push_str(&format!("{:.0} hr ", (tot / 3600.0).floor()));
    }
    if tot >= 59.0 {
        out.push_str(&format!(
            "{:.0} min ",
            ((tot - 3600.0 * (tot / 3600.0).floor()) / 60.0).floor()
        ));
    }
    out.push_str(&format!("{:.0} sec. ", tot - 60.0 * (tot / 60.0).floor()));
    out
}
