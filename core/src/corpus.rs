use crate::types::Document;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Load a corpus from a JSON file (array or single object), a JSONL file
/// (one document per line), or a directory walked recursively for
/// `.json`/`.jsonl`/`.txt` files. Directory entries are visited in sorted
/// path order so the corpus order, and with it the tie-break order, is
/// reproducible. A `.txt` file becomes one document with the file stem as id.
pub fn load_corpus(path: &Path) -> Result<Vec<Document>> {
    let mut docs = Vec::new();
    if path.is_dir() {
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        for file in files {
            match file.extension().and_then(|s| s.to_str()) {
                Some("json") | Some("jsonl") => load_file(&file, &mut docs)?,
                Some("txt") => {
                    let text = std::fs::read_to_string(&file)
                        .with_context(|| format!("reading {}", file.display()))?;
                    let id = file
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| file.display().to_string());
                    docs.push(Document::new(id, text));
                }
                _ => {}
            }
        }
    } else {
        load_file(path, &mut docs)?;
    }
    tracing::info!(docs = docs.len(), source = %path.display(), "loaded corpus");
    Ok(docs)
}

fn load_file(path: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        for (lineno, line) in BufReader::new(f).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: Document = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
            docs.push(doc);
        }
        return Ok(());
    }
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", path.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        other => docs.push(serde_json::from_value(other)?),
    }
    Ok(())
}

/// Process-wide read-through corpus cache keyed by source path. Loaded
/// lazily on first access, invalidated only by `reload` or process restart.
/// Callers get an `Arc` snapshot, so a reload never mutates a corpus that a
/// ranking in flight is reading.
pub struct CorpusCache {
    source: PathBuf,
    docs: RwLock<Option<Arc<Vec<Document>>>>,
}

impl CorpusCache {
    pub fn new<P: AsRef<Path>>(source: P) -> Self {
        Self { source: source.as_ref().to_path_buf(), docs: RwLock::new(None) }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Current corpus snapshot, loading from the source on first access.
    pub fn get(&self) -> Result<Arc<Vec<Document>>> {
        if let Some(docs) = self.docs.read().as_ref() {
            return Ok(Arc::clone(docs));
        }
        self.reload()
    }

    /// Re-read the source and swap the snapshot. Returns the new corpus.
    pub fn reload(&self) -> Result<Arc<Vec<Document>>> {
        let docs = Arc::new(load_corpus(&self.source)?);
        *self.docs.write() = Some(Arc::clone(&docs));
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_jsonl_skipping_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        let mut f = File::create(&path).unwrap();
        writeln!(f, r#"{{"id":"r1","category":"ENGINEERING","text":"rust developer"}}"#).unwrap();
        writeln!(f).unwrap();
        writeln!(f, r#"{{"id":"r2","text":"painter"}}"#).unwrap();
        drop(f);

        let docs = load_corpus(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "r1");
        assert_eq!(docs[0].category.as_deref(), Some("ENGINEERING"));
        assert_eq!(docs[1].category, None);
    }

    #[test]
    fn loads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(
            &path,
            r#"[{"id":"a","text":"java"},{"id":"b","text":"sql"}]"#,
        )
        .unwrap();
        let docs = load_corpus(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].id, "b");
    }

    #[test]
    fn directory_of_txt_files_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "second resume").unwrap();
        std::fs::write(dir.path().join("a.txt"), "first resume").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let docs = load_corpus(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "a");
        assert_eq!(docs[1].id, "b");
    }

    #[test]
    fn cache_loads_lazily_and_reloads_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.jsonl");
        std::fs::write(&path, r#"{"id":"a","text":"java"}"#.to_string() + "\n").unwrap();

        let cache = CorpusCache::new(&path);
        let first = cache.get().unwrap();
        assert_eq!(first.len(), 1);

        std::fs::write(
            &path,
            r#"{"id":"a","text":"java"}"#.to_string() + "\n" + r#"{"id":"b","text":"sql"}"# + "\n",
        )
        .unwrap();
        // cached snapshot until an explicit reload
        assert_eq!(cache.get().unwrap().len(), 1);
        assert_eq!(cache.reload().unwrap().len(), 2);
        assert_eq!(cache.get().unwrap().len(), 2);
        // the old snapshot is still intact for readers that held it
        assert_eq!(first.len(), 1);
    }
}
