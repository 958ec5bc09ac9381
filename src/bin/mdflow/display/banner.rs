use std::io::{self, Write};
use std::sync::LazyLock;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const BANNER_ART: &str = r#"
   ███╗   ███╗██████╗ ███████╗██╗      ██████╗ ██╗    ██╗
   ████╗ ████║██╔══██╗██╔════╝██║     ██╔═══██╗██║    ██║
   ██╔████╔██║██║  ██║█████╗  ██║     ██║   ██║██║ █╗ ██║
   ██║╚██╔╝██║██║  ██║██╔══╝  ██║     ██║   ██║██║███╗██║
   ██║ ╚═╝ ██║██████╔╝██║     ███████╗╚██████╔╝╚███╔███╔╝
   ╚═╝     ╚═╝╚═════╝ ╚═╝     ╚══════╝ ╚═════╝  ╚══╝╚══╝

   ───────────────────────────────────────────────────────────
     minimize  ·  equilibrate  ·  produce  ·  analyze
   ───────────────────────────────────────────────────────────
   "#;

const UNITS_LINE: &str = "   units: nm · ps · amu · kJ/mol · K";

static BANNER_FOR_HELP: LazyLock<String> = LazyLock::new(|| banner_text(false));

fn banner_text(with_units: bool) -> String {
    let mut text = format!("\n{BANNER_ART}\n   Langevin Molecular Dynamics Workflow               v{VERSION}\n");
    if with_units {
        text.push_str(UNITS_LINE);
        text.push('\n');
    }
    text
}

pub fn banner_for_help() -> &'static str {
    &BANNER_FOR_HELP
}

/// Writes the banner to stderr; failures to write are ignored.
pub fn print_banner() {
    let _ = writeln!(io::stderr().lock(), "{}", banner_text(true));
}
