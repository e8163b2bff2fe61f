//! JSON document helpers for `settings.json` and the theming config
//!
//! Merges are additive: keys already present are left alone unless the
//! caller asks to overwrite, and unknown keys are always preserved.

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{Result, VariantError};

/// Read a JSON document, `Ok(None)` if the file does not exist
pub fn read_document(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|e| VariantError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(Some(Value::Object(Map::new())));
    }
    let value = serde_json::from_str(&content).map_err(|e| VariantError::json(path, e))?;
    Ok(Some(value))
}

/// Write pretty-printed JSON, creating parent directories
pub fn write_document(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| VariantError::io(parent, e))?;
    }
    let content = serde_json::to_string_pretty(value).map_err(|e| VariantError::json(path, e))?;
    std::fs::write(path, format!("{}\n", content)).map_err(|e| VariantError::io(path, e))
}

/// The root object of `doc`; a non-object root is a malformed document
pub fn root_object<'a>(doc: &'a mut Value, path: &Path) -> Result<&'a mut Map<String, Value>> {
    match doc {
        Value::Object(map) => Ok(map),
        _ => Err(VariantError::Config(format!(
            "{} is not a JSON object",
            path.display()
        ))),
    }
}

/// Load, edit and save a document. Returns `Ok(false)` without writing
/// when the file is absent and `create` is false.
pub fn edit_document(
    path: &Path,
    create: bool,
    edit: impl FnOnce(&mut Map<String, Value>),
) -> Result<bool> {
    let mut doc = match read_document(path)? {
        Some(doc) => doc,
        None if create => Value::Object(Map::new()),
        None => return Ok(false),
    };
    edit(root_object(&mut doc, path)?);
    write_document(path, &doc)?;
    Ok(true)
}

/// `map[key]` as an object, created (or replaced if not an object)
pub fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let entry = map.entry(key.to_string()).or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(inner) => inner,
        _ => unreachable!("entry was just made an object"),
    }
}

/// `map[key]` as an array, created (or replaced if not an array)
pub fn array_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Vec<Value> {
    let entry = map.entry(key.to_string()).or_insert_with(|| Value::Array(Vec::new()));
    if !entry.is_array() {
        *entry = Value::Array(Vec::new());
    }
    match entry {
        Value::Array(items) => items,
        _ => unreachable!("entry was just made an array"),
    }
}

/// Set `key` only if it is absent or empty. Returns whether it was written.
pub fn set_if_absent(map: &mut Map<String, Value>, key: &str, value: &str) -> bool {
    let present = match map.get(key) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };
    if present {
        return false;
    }
    map.insert(key.to_string(), Value::String(value.to_string()));
    true
}

/// Append `token` unless an equal string is already in the array
pub fn push_unique(items: &mut Vec<Value>, token: &str) -> bool {
    if items.iter().any(|v| v.as_str() == Some(token)) {
        return false;
    }
    items.push(Value::String(token.to_string()));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_and_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        assert!(read_document(&path).unwrap().is_none());

        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(read_document(&path).unwrap(), Some(json!({})));
    }

    #[test]
    fn test_read_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(read_document(&path), Err(VariantError::Json { .. })));
    }

    #[test]
    fn test_set_if_absent_first_write_wins() {
        let mut map = Map::new();
        assert!(set_if_absent(&mut map, "CLAUDE_CODE_TEAM_MODE", "1"));
        assert!(!set_if_absent(&mut map, "CLAUDE_CODE_TEAM_MODE", "0"));
        assert_eq!(map["CLAUDE_CODE_TEAM_MODE"], json!("1"));

        map.insert("EMPTY".to_string(), json!(""));
        assert!(set_if_absent(&mut map, "EMPTY", "x"));
    }

    #[test]
    fn test_nested_entries_and_push_unique() {
        let mut doc = json!({ "permissions": "bogus", "keep": true });
        let path = Path::new("settings.json");
        let root = root_object(&mut doc, path).unwrap();
        let allow = array_entry(object_entry(root, "permissions"), "allow");
        assert!(push_unique(allow, "Skill(orchestration)"));
        assert!(!push_unique(allow, "Skill(orchestration)"));

        assert_eq!(
            doc,
            json!({ "permissions": { "allow": ["Skill(orchestration)"] }, "keep": true })
        );
    }

    #[test]
    fn test_root_must_be_object() {
        let mut doc = json!([1, 2]);
        assert!(root_object(&mut doc, Path::new("x.json")).is_err());
    }

    #[test]
    fn test_edit_document_respects_create_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        assert!(!edit_document(&path, false, |_| {}).unwrap());
        assert!(!path.exists());

        assert!(edit_document(&path, true, |map| {
            object_entry(map, "env").insert("A".to_string(), json!("1"));
        })
        .unwrap());
        assert_eq!(read_document(&path).unwrap(), Some(json!({ "env": { "A": "1" } })));
    }

    #[test]
    fn test_edit_document_leaves_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[broken").unwrap();
        assert!(edit_document(&path, true, |_| {}).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[broken");
    }

    #[test]
    fn test_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b.json");
        write_document(&path, &json!({ "x": 1 })).unwrap();
        assert_eq!(read_document(&path).unwrap(), Some(json!({ "x": 1 })));
    }
}
