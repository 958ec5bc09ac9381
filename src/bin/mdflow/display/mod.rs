mod banner;
mod error;
mod progress;
mod tables;

pub use banner::{banner_for_help, print_banner};
pub use error::print_error;
pub use progress::Progress;
pub use tables::{
    print_atom_types, print_histogram, print_measurement_summary, print_minimization, print_parameters,
    print_residue_breakdown, print_structure_info,
};

/// Terminal decoration settings shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// Spinners, progress bars and the banner are drawn on stderr.
    pub interactive: bool,
    /// Extra tables are printed even without a terminal.
    pub detailed: bool,
}

impl Context {
    pub fn new(quiet: bool, verbose: u8) -> Self {
        Self {
            interactive: !quiet && crate::io::stderr_is_tty(),
            detailed: verbose > 0,
        }
    }

    pub fn progress(&self, total_stages: u8, finish_label: &'static str) -> Progress {
        Progress::new(self.interactive, total_stages, finish_label)
    }

    /// Whether intermediate structure and parameter tables are worth printing.
    pub fn show_tables(&self) -> bool {
        self.interactive || self.detailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_disables_decoration() {
        let ctx = Context::new(true, 0);
        assert!(!ctx.interactive);
        assert!(!ctx.show_tables());
    }

    #[test]
    fn verbose_keeps_tables_when_quiet() {
        let ctx = Context::new(true, 1);
        assert!(!ctx.interactive);
        assert!(ctx.show_tables());
    }
}
