use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use mdflow::ParameterizedSystem;
use mdflow::System;
use mdflow::analysis::{Histogram, Summary};
use mdflow::dynamics::MinimizationReport;

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_structure_info(system: &System) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut rows = vec![
        ("Total Atoms", format!("{}", system.atom_count())),
        ("Total Bonds", format!("{}", system.bond_count())),
    ];

    if let Some(metadata) = &system.metadata {
        let residues = metadata.residues();
        let chains: HashSet<char> = residues.iter().map(|r| r.chain_id).collect();
        rows.push(("Residues", format!("{}", residues.len())));
        rows.push(("Chains", format!("{}", chains.len())));
    }

    match &system.box_vectors {
        Some(box_vectors) => {
            let [a, b, c] = [0, 1, 2].map(|i| vec_len(&box_vectors[i]));
            rows.push(("Box (nm)", format!("{:.3} × {:.3} × {:.3}", a, b, c)));

            let (alpha, beta, gamma) = calc_angles(box_vectors);
            rows.push((
                "Angles (α β γ)",
                format!("{:.1}° {:.1}° {:.1}°", alpha, beta, gamma),
            ));
        }
        None => rows.push(("Box", "none (non-periodic)".to_string())),
    }

    print_kv_table(&mut out, "Structure Summary", &rows);
}

pub fn print_residue_breakdown(system: &System) {
    let Some(metadata) = &system.metadata else {
        return;
    };

    let mut residue_counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let residues = metadata.residues();
    for residue in &residues {
        let entry = residue_counts.entry(residue.name.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += residue.atoms.len();
    }

    if residue_counts.is_empty() {
        return;
    }

    let mut sorted: Vec<_> = residue_counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.1.cmp(&a.1.1).then(a.0.cmp(b.0)));

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let name_w = 9usize;
    let count_w = 10usize;
    let sep_overhead = 6;
    let atoms_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + count_w + sep_overhead);

    let rule = |left: &str, mid: &str, right: &str| {
        format!(
            "{}{left}{}{mid}{}{mid}{}{right}",
            INDENT,
            "─".repeat(name_w + 2),
            "─".repeat(count_w + 2),
            "─".repeat(atoms_w + 2)
        )
    };

    let _ = writeln!(out, "{}┌─ Residue Breakdown ─┐", INDENT);
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<name_w$} │ {:>count_w$} │ {:>atoms_w$} │",
        INDENT, "Residue", "Count", "Atoms",
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for (name, (count, atoms)) in &sorted {
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>count_w$} │ {:>atoms_w$} │",
            INDENT,
            truncate(name, name_w),
            count,
            atoms,
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

pub fn print_atom_types(parameterized: &ParameterizedSystem) {
    let mut type_counts: HashMap<usize, usize> = HashMap::new();
    for param in &parameterized.atom_properties {
        *type_counts.entry(param.type_index).or_insert(0) += 1;
    }

    let total = parameterized.atom_properties.len();
    let mut sorted: Vec<_> = type_counts
        .into_iter()
        .map(|(idx, count)| {
            let name = parameterized
                .atom_types
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("type{}", idx));
            (name, count)
        })
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let name_w = 10usize;
    let count_w = 8usize;
    let sep_overhead = 6;
    let dist_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + count_w + sep_overhead);
    let max_bar_width = dist_w.saturating_sub(8).min(20);

    let rule = |left: &str, mid: &str, right: &str| {
        format!(
            "{}{left}{}{mid}{}{mid}{}{right}",
            INDENT,
            "─".repeat(name_w + 2),
            "─".repeat(count_w + 2),
            "─".repeat(dist_w + 2)
        )
    };

    let _ = writeln!(out, "{}┌─ Atom Type Distribution ─┐", INDENT);
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
        INDENT, "Type", "Count", "Distribution",
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for (name, count) in sorted.iter().take(15) {
        let pct = (*count as f64 / total as f64) * 100.0;
        let cell = format!("{}  {:>5.1}%", make_bar(pct / 100.0, max_bar_width), pct);
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
            INDENT,
            truncate(name, name_w),
            count,
            cell,
        );
    }

    if sorted.len() > 15 {
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
            INDENT,
            "...",
            "...",
            format!("({} more types)", sorted.len() - 15),
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

pub fn print_parameters(parameterized: &ParameterizedSystem) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let unique_types: HashSet<_> = parameterized
        .atom_properties
        .iter()
        .map(|p| p.type_index)
        .collect();
    let potentials = &parameterized.potentials;
    let nonbonded = &parameterized.nonbonded;

    let rows: [(&str, usize, &str); 6] = [
        ("Atom Types", unique_types.len(), "unique"),
        ("Bonds", potentials.bonds.len(), "terms"),
        ("Angles", potentials.angles.len(), "terms"),
        ("Torsions", potentials.torsions.len(), "terms"),
        ("Exclusions", nonbonded.exclusions.len(), "pairs"),
        ("1-4 Exceptions", nonbonded.exceptions.len(), "pairs"),
    ];

    let _ = writeln!(out, "{}┌─ Force Field Parameters ─┐", INDENT);
    let _ = writeln!(out, "{}┌─────────────────────┬────────┬────────┐", INDENT);
    let _ = writeln!(out, "{}│ Category            │  Count │ Type   │", INDENT);
    let _ = writeln!(out, "{}├─────────────────────┼────────┼────────┤", INDENT);

    for (category, count, kind) in &rows {
        let _ = writeln!(
            out,
            "{}│ {:<19} │ {:>6} │ {:<6} │",
            INDENT, category, count, kind
        );
    }

    let _ = writeln!(out, "{}├─────────────────────┴────────┴────────┤", INDENT);
    let _ = writeln!(
        out,
        "{}│ {:<19} {:>+17.4} │",
        INDENT,
        "Net charge (e)",
        parameterized.total_charge()
    );
    let _ = writeln!(out, "{}└──────────────────────────────────────┘", INDENT);
}

pub fn print_minimization(report: &MinimizationReport) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let rows = [
        (
            "Initial Energy",
            format!("{:.4} kJ/mol", report.initial_energy),
        ),
        ("Final Energy", format!("{:.4} kJ/mol", report.final_energy)),
        (
            "Max Force",
            format!("{:.4} kJ/mol/nm", report.max_force),
        ),
        ("Iterations", format!("{}", report.iterations)),
        (
            "Converged",
            if report.converged { "yes" } else { "no" }.to_string(),
        ),
    ];

    print_kv_table(&mut out, "Energy Minimization", &rows);
}

/// One row per measured series: label, unit and statistics.
pub fn print_measurement_summary(out: &mut impl Write, rows: &[(String, &str, Summary)]) {
    let label_w = 16usize;
    let num_w = 9usize;

    let rule = |left: &str, mid: &str, right: &str| {
        let cells: Vec<String> = std::iter::once("─".repeat(label_w + 2))
            .chain((0..4).map(|_| "─".repeat(num_w + 2)))
            .collect();
        format!("{}{left}{}{right}", INDENT, cells.join(mid))
    };

    let _ = writeln!(out, "{}┌─ Measurement Summary ─┐", INDENT);
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<label_w$} │ {:>num_w$} │ {:>num_w$} │ {:>num_w$} │ {:>num_w$} │",
        INDENT, "Measurement", "Mean", "Std Dev", "Min", "Max",
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for (label, unit, summary) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<label_w$} │ {:>num_w$.4} │ {:>num_w$.4} │ {:>num_w$.4} │ {:>num_w$.4} │",
            INDENT,
            truncate(&format!("{} ({})", label, unit), label_w),
            summary.mean,
            summary.std_dev,
            summary.min,
            summary.max,
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

pub fn print_histogram(out: &mut impl Write, label: &str, unit: &str, histogram: &Histogram) {
    let range_w = 21usize;
    let count_w = 7usize;
    let sep_overhead = 6;
    let bar_w = SAFE_TABLE_WIDTH.saturating_sub(range_w + count_w + sep_overhead);
    let max_count = histogram.counts().iter().copied().max().unwrap_or(0);

    let rule = |left: &str, mid: &str, right: &str| {
        format!(
            "{}{left}{}{mid}{}{mid}{}{right}",
            INDENT,
            "─".repeat(range_w + 2),
            "─".repeat(count_w + 2),
            "─".repeat(bar_w + 2)
        )
    };

    let title = format!("{} ({})", label, unit);
    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(&title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<range_w$} │ {:>count_w$} │ {:<bar_w$} │",
        INDENT, "Bin", "Count", "Distribution",
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    let edges = histogram.edges();
    for (i, &count) in histogram.counts().iter().enumerate() {
        let fraction = if max_count == 0 {
            0.0
        } else {
            count as f64 / max_count as f64
        };
        let range = format!("[{:>9.3}, {:>9.3})", edges[i], edges[i + 1]);
        let _ = writeln!(
            out,
            "{}│ {:<range_w$} │ {:>count_w$} │ {:<bar_w$} │",
            INDENT,
            range,
            count,
            make_bar(fraction, bar_w),
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
    if let Some(mode) = histogram.mode() {
        let _ = writeln!(out, "{}  mode {:.4} {}", INDENT, mode, unit);
    }
    let _ = writeln!(out);
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let rule = |left: &str, mid: &str, right: &str| {
        format!(
            "{}{left}{}{mid}{}{right}",
            INDENT,
            "─".repeat(key_w + 2),
            "─".repeat(val_w + 2)
        )
    };

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<key_w$} │ {:>val_w$} │",
        INDENT, "Metric", "Value",
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

/// A bar of `max_width` cells, `fraction` of them filled.
fn make_bar(fraction: f64, max_width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * max_width as f64).round() as usize;
    let empty = max_width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn vec_len(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn calc_angles(box_vectors: &[[f64; 3]; 3]) -> (f64, f64, f64) {
    let [a, b, c] = box_vectors;
    let dot = |u: &[f64; 3], v: &[f64; 3]| u[0] * v[0] + u[1] * v[1] + u[2] * v[2];
    let angle = |u: &[f64; 3], v: &[f64; 3]| {
        (dot(u, v) / (vec_len(u) * vec_len(v)))
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees()
    };

    (angle(b, c), angle(a, c), angle(a, b))
}
