use std::path::Path;

use mdflow::io::Format;

fn extension(path: &Path) -> Option<String> {
    Some(path.extension()?.to_str()?.to_lowercase())
}

pub fn structure(path: &Path) -> Option<Format> {
    match extension(path)?.as_str() {
        "pdb" | "ent" => Some(Format::Pdb),
        "dcd" => Some(Format::Dcd),
        _ => None,
    }
}

pub fn trajectory(path: &Path) -> Option<Format> {
    match extension(path)?.as_str() {
        "dcd" => Some(Format::Dcd),
        "pdb" | "ent" => Some(Format::Pdb),
        _ => None,
    }
}
