//! Built-in character documents

use std::path::Path;

use crate::error::LoadError;
use crate::sim::MoveTable;

const BUILTIN: [(&str, &str); 2] = [
    ("kaze", include_str!("../assets/characters/kaze.json")),
    ("tetsu", include_str!("../assets/characters/tetsu.json")),
];

/// Names of the built-in characters
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(name, _)| *name)
}

/// Load a built-in character by name
pub fn builtin(name: &str) -> Result<MoveTable, LoadError> {
    let (_, json) = BUILTIN
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .ok_or_else(|| LoadError::UnknownCharacter(name.to_string()))?;
    MoveTable::from_json(json)
}

/// Built-in name, or a path to a character document
pub fn resolve(name_or_path: &str) -> Result<MoveTable, LoadError> {
    match builtin(name_or_path) {
        Err(LoadError::UnknownCharacter(_)) if Path::new(name_or_path).is_file() => {
            let table = MoveTable::load(name_or_path)?;
            log::info!("Loaded character `{}` from {}", table.character(), name_or_path);
            Ok(table)
        }
        other => other,
    }
}
