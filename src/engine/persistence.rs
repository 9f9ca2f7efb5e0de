use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use crate::{Result, Movie};

#[allow(unused_imports)]
use crate::engine::MemStore;

/// On-disk shape of the movie database.
#[derive(Serialize, Deserialize, Debug, Default)]
struct MovieFile {
    #[serde(default)]
    movies: Vec<Movie>,
}

/// Handles disk I/O for the [`MemStore`].
///
/// The whole collection lives in a single JSON file of the form
/// `{"movies": [...]}`. It is read once at startup and written once at shutdown.
#[derive(Debug, Clone)]
pub struct Persistence {
    path: PathBuf,
}

impl Persistence {
    /// Creates a handler for the database file at `path`. No I/O happens here.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// The database file this handler reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the database file.
    ///
    /// A missing, unreadable or malformed file is an error; callers treat it as fatal.
    pub fn load(&self) -> Result<Vec<Movie>> {
        let content = fs::read(&self.path)?;
        let file: MovieFile = serde_json::from_slice(&content)?;
        Ok(file.movies)
    }

    /// Writes the collection to the database file with four-space indentation.
    ///
    /// Data goes to a temporary sibling first and is then renamed over the previous
    /// file, so a failed write leaves the old contents intact.
    pub fn save(&self, movies: &[Movie]) -> Result<()> {
        let temp_path = self.temp_path();

        let mut bytes = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        MovieFile { movies: movies.to_vec() }.serialize(&mut ser)?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MovieReader, MovieWriter};
    use tempfile::tempdir;

    fn movie(title: &str, rating: i64, id: i64) -> Movie {
        Movie { title: title.to_string(), rating, id }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path().join("db.json"));

        let movies = vec![movie("Heat", 8, 5), movie("Alien", 9, 2)];
        persistence.save(&movies).unwrap();

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded, movies);
    }

    #[tokio::test]
    async fn test_round_trip_recomputes_next_id() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path().join("db.json"));

        let store = MemStore::new(Vec::new());
        for title in ["a", "b", "c", "d"] {
            store.create(movie(title, 1, 0)).await.unwrap();
        }
        store.delete(3).await.unwrap();
        store.delete(0).await.unwrap();
        assert_eq!(store.next_id().unwrap(), 4);

        persistence.save(&store.list().await.unwrap()).unwrap();
        let reloaded = MemStore::new(persistence.load().unwrap());

        assert_eq!(reloaded.list().await.unwrap(), store.list().await.unwrap());
        assert_eq!(reloaded.next_id().unwrap(), 3);
    }

    #[test]
    fn test_atomic_rename() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path().join("db.json"));

        persistence.save(&[movie("Heat", 8, 0)]).unwrap();

        assert!(dir.path().join("db.json").exists());
        assert!(!dir.path().join("db.json.tmp").exists());
    }

    #[test]
    fn test_save_is_indented() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let persistence = Persistence::new(&path);

        persistence.save(&[movie("Heat", 8, 0)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let expected = r#"{
    "movies": [
        {
            "title": "Heat",
            "rating": 8,
            "id": 0
        }
    ]
}"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path().join("db.json"));

        persistence.save(&[movie("a", 1, 0), movie("b", 2, 1)]).unwrap();
        persistence.save(&[]).unwrap();

        assert!(persistence.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path().join("missing.json"));

        assert!(matches!(persistence.load(), Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{\"movies\": [").unwrap();

        let persistence = Persistence::new(&path);
        assert!(matches!(persistence.load(), Err(crate::Error::Serialization(_))));
    }

    #[test]
    fn test_load_tolerates_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, r#"{"movies": [{"title": "Heat"}], "extra": true}"#).unwrap();
        let persistence = Persistence::new(&path);
        assert_eq!(persistence.load().unwrap(), vec![movie("Heat", 0, 0)]);

        fs::write(&path, "{}").unwrap();
        assert!(persistence.load().unwrap().is_empty());
    }
}
