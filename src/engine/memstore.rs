use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use async_trait::async_trait;
use log::debug;
use crate::{Result, Error, Movie, MovieFields, MovieReader, MovieWriter};

struct StoreData {
    movies: Vec<Movie>,
    next_id: i64,
}

impl StoreData {
    fn find_index(&self, id: i64) -> Option<usize> {
        self.movies.iter().position(|m| m.id == id)
    }
}

/// The in-memory movie collection.
///
/// Movies are kept in insertion order and looked up by linear scan. The lock only
/// makes single operations memory safe; concurrent writers are not ordered.
pub struct MemStore {
    data: RwLock<StoreData>,
}

impl MemStore {
    /// Builds a store from already loaded movies.
    ///
    /// The id counter is recomputed as one past the highest existing id, or `0` for an
    /// empty collection. It is never read from disk. Past `i64::MAX` it wraps.
    pub fn new(movies: Vec<Movie>) -> Self {
        let next_id = movies.iter().map(|m| m.id).fold(-1, i64::max).wrapping_add(1);
        Self {
            data: RwLock::new(StoreData { movies, next_id }),
        }
    }

    /// Returns the position of the first movie with the given id.
    pub fn find_index(&self, id: i64) -> Result<Option<usize>> {
        Ok(self.read()?.find_index(id))
    }

    /// Returns the id the next id-less create will receive.
    pub fn next_id(&self) -> Result<i64> {
        Ok(self.read()?.next_id)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreData>> {
        self.data.read().map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreData>> {
        self.data.write().map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl MovieReader for MemStore {
    async fn list(&self) -> Result<Vec<Movie>> {
        Ok(self.read()?.movies.clone())
    }

    async fn get(&self, id: i64) -> Result<Movie> {
        let data = self.read()?;
        data.find_index(id)
            .map(|i| data.movies[i].clone())
            .ok_or(Error::NotFound)
    }
}

#[async_trait]
impl MovieWriter for MemStore {
    async fn create(&self, mut candidate: Movie) -> Result<Movie> {
        let mut data = self.write()?;
        // Zero doubles as "unset", so an explicit id of 0 is reassigned too.
        if candidate.id == 0 {
            candidate.id = data.next_id;
            data.next_id = data.next_id.wrapping_add(1);
        }
        data.movies.push(candidate.clone());
        debug!("Created movie {} ({} stored)", candidate.id, data.movies.len());
        Ok(candidate)
    }

    async fn update(&self, id: i64, fields: MovieFields) -> Result<Movie> {
        let mut data = self.write()?;
        let i = data.find_index(id).ok_or(Error::NotFound)?;
        let movie = Movie {
            title: fields.title,
            rating: fields.rating,
            id,
        };
        data.movies[i] = movie.clone();
        Ok(movie)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut data = self.write()?;
        let i = data.find_index(id).ok_or(Error::NotFound)?;
        data.movies.remove(i);
        Ok(())
    }
}
