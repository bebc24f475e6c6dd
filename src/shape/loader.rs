//! Shape registry and loading from disk
//!
//! A shape file holds either a single shape object or an array of shapes.
//! Shape names are unique ignoring case.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::errors::{ShapeError, ShapeResult};
use super::types::RecordShape;

#[derive(Deserialize)]
#[serde(untagged)]
enum ShapeFile {
    Many(Vec<RecordShape>),
    One(RecordShape),
}

/// In-memory shape registry
#[derive(Debug, Clone, Default)]
pub struct ShapeLoader {
    /// Lowercased shape name -> shape
    shapes: HashMap<String, RecordShape>,
}

impl ShapeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every shape from a JSON file.
    pub fn load_file(&mut self, path: &Path) -> ShapeResult<usize> {
        let content = fs::read_to_string(path).map_err(|e| ShapeError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.load_str(&content)
    }

    /// Loads every shape from a JSON document.
    pub fn load_str(&mut self, json: &str) -> ShapeResult<usize> {
        let file: ShapeFile =
            serde_json::from_str(json).map_err(|e| ShapeError::Malformed(e.to_string()))?;

        let shapes = match file {
            ShapeFile::Many(shapes) => shapes,
            ShapeFile::One(shape) => vec![shape],
        };

        let count = shapes.len();
        for shape in shapes {
            self.register(shape)?;
        }
        Ok(count)
    }

    /// Loads all `*.json` files of a directory, in file name order.
    pub fn load_dir(&mut self, dir: &Path) -> ShapeResult<usize> {
        let entries = fs::read_dir(dir).map_err(|e| ShapeError::Io {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ShapeError::Io {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut count = 0;
        for path in paths {
            count += self.load_file(&path)?;
        }
        Ok(count)
    }

    /// Registers a shape; names must be unique ignoring case.
    pub fn register(&mut self, shape: RecordShape) -> ShapeResult<()> {
        let key = shape.name().to_ascii_lowercase();
        if self.shapes.contains_key(&key) {
            return Err(ShapeError::DuplicateShape(shape.name().to_string()));
        }
        self.shapes.insert(key, shape);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RecordShape> {
        self.shapes.get(&name.to_ascii_lowercase())
    }

    /// Like `get`, but reports unknown names as an error
    pub fn require(&self, name: &str) -> ShapeResult<&RecordShape> {
        self.get(name)
            .ok_or_else(|| ShapeError::UnknownShape(name.to_string()))
    }

    /// Registered shapes, in no particular order
    pub fn shapes(&self) -> impl Iterator<Item = &RecordShape> {
        self.shapes.values()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const TWO_SHAPES: &str = r#"[
        {"name": "Accounts", "fields": [{"name": "id", "type": "int"}]},
        {"name": "account_rows", "fields": [{"name": "id", "type": "int"}]}
    ]"#;

    #[test]
    fn test_load_array() {
        let mut loader = ShapeLoader::new();
        assert_eq!(loader.load_str(TWO_SHAPES).unwrap(), 2);
        assert!(loader.get("accounts").is_some());
        assert!(loader.get("ACCOUNT_ROWS").is_some());
    }

    #[test]
    fn test_load_single_object() {
        let mut loader = ShapeLoader::new();
        let count = loader
            .load_str(r#"{"name": "solo", "fields": [{"name": "x", "type": "text"}]}"#)
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(loader.require("solo").unwrap().fields().len(), 1);
    }

    #[test]
    fn test_duplicate_shape_rejected() {
        let mut loader = ShapeLoader::new();
        loader.load_str(TWO_SHAPES).unwrap();
        let result = loader.load_str(r#"{"name": "ACCOUNTS", "fields": []}"#);
        assert!(matches!(result, Err(ShapeError::DuplicateShape(_))));
    }

    #[test]
    fn test_unknown_shape() {
        let loader = ShapeLoader::new();
        assert!(matches!(
            loader.require("nope"),
            Err(ShapeError::UnknownShape(_))
        ));
    }

    #[test]
    fn test_load_dir_skips_non_json() {
        let tmp = TempDir::new().unwrap();
        let mut f = std::fs::File::create(tmp.path().join("a.json")).unwrap();
        f.write_all(TWO_SHAPES.as_bytes()).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "not a shape").unwrap();

        let mut loader = ShapeLoader::new();
        assert_eq!(loader.load_dir(tmp.path()).unwrap(), 2);
        assert_eq!(loader.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let mut loader = ShapeLoader::new();
        let result = loader.load_file(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ShapeError::Io { .. })));
    }
}
