use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

pub struct StageSpinner {
    bar: Option<ProgressBar>,
    start: Instant,
    stage: u8,
    total_stages: u8,
    stage_start: Instant,
    finish_label: &'static str,
}

impl StageSpinner {
    pub fn new(total_stages: u8, finish_label: &'static str) -> Self {
        let now = Instant::now();
        Self {
            bar: None,
            start: now,
            stage: 0,
            total_stages,
            stage_start: now,
            finish_label,
        }
    }

    fn begin(&mut self) -> String {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        self.stage += 1;
        self.stage_start = Instant::now();
        format!("[{}/{}]", self.stage, self.total_stages)
    }

    pub fn stage(&mut self, description: &str) {
        let counter = self.begin();

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .expect("invalid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(format!("{} {}...", counter, description));

        self.bar = Some(bar);
    }

    pub fn run(&mut self, description: &str, steps: u64) {
        let counter = self.begin();

        let bar = ProgressBar::new(steps);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.cyan} {msg} {bar:28.cyan/blue} {pos}/{len} steps ({eta})")
                .expect("invalid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .progress_chars("━╸ "),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(format!("{} {}", counter, description));

        self.bar = Some(bar);
    }

    pub fn advance(&mut self, steps: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(steps);
        }
    }

    pub fn complete_stage(&mut self, description: &str, details: &[&str]) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        let elapsed = self.stage_start.elapsed();
        let mut stderr = io::stderr().lock();

        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            description,
            elapsed.as_secs_f64()
        );

        for detail in details {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", detail);
        }
    }

    pub fn finish(mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        print_footer(self.finish_label, self.start.elapsed());
    }
}

fn print_footer(label: &str, elapsed: Duration) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(
        stderr,
        "  \x1b[2m╺━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╸\x1b[0m"
    );
    let _ = writeln!(stderr);
    let _ = writeln!(
        stderr,
        "  \x1b[32m✓\x1b[0m {:<24} {:>26}",
        label,
        format!("Total: {:.2}s", elapsed.as_secs_f64())
    );
    let _ = writeln!(stderr);
}

/// Progress for the non-interactive case: stages are logged instead of drawn.
pub struct SilentProgress;

impl SilentProgress {
    pub fn stage(&mut self, description: &str) {
        log::info!("{}", description);
    }
}

pub enum Progress {
    Interactive(StageSpinner),
    Silent(SilentProgress),
}

impl Progress {
    pub fn new(interactive: bool, total_stages: u8, finish_label: &'static str) -> Self {
        if interactive {
            Self::Interactive(StageSpinner::new(total_stages, finish_label))
        } else {
            Self::Silent(SilentProgress)
        }
    }

    pub fn stage(&mut self, description: &str) {
        match self {
            Self::Interactive(s) => s.stage(description),
            Self::Silent(s) => s.stage(description),
        }
    }

    /// Starts a stage measured in integration steps.
    pub fn run(&mut self, description: &str, steps: u64) {
        match self {
            Self::Interactive(s) => s.run(description, steps),
            Self::Silent(s) => s.stage(description),
        }
    }

    pub fn advance(&mut self, steps: u64) {
        if let Self::Interactive(s) = self {
            s.advance(steps);
        }
    }

    pub fn complete_stage(&mut self, description: &str, details: &[&str]) {
        if let Self::Interactive(s) = self {
            s.complete_stage(description, details);
        }
    }

    pub fn finish(self) {
        if let Self::Interactive(s) = self {
            s.finish();
        }
    }
}
