use std::fmt;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A single movie record.
///
/// Decoding is lenient: keys match field names case-insensitively, unknown keys
/// are skipped, and missing or `null` fields keep their zero value. A bare `null`
/// decodes to [`Movie::default`]. An id of `0` means "let the store pick one" on
/// create.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Movie {
    pub title: String,
    pub rating: i64,
    pub id: i64,
}

/// The mutable part of a [`Movie`], as accepted by update. Decodes like a
/// [`Movie`] and drops the id.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFields {
    pub title: String,
    pub rating: i64,
}

enum Field {
    Title,
    Rating,
    Id,
    Other,
}

impl Field {
    fn from_key(key: &str) -> Self {
        if key.eq_ignore_ascii_case("title") {
            Field::Title
        } else if key.eq_ignore_ascii_case("rating") {
            Field::Rating
        } else if key.eq_ignore_ascii_case("id") {
            Field::Id
        } else {
            Field::Other
        }
    }
}

struct MovieVisitor;

impl<'de> Visitor<'de> for MovieVisitor {
    type Value = Movie;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a movie object or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Movie, E> {
        Ok(Movie::default())
    }

    // Later duplicates overwrite earlier ones, in document order.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Movie, A::Error> {
        let mut movie = Movie::default();
        while let Some(key) = map.next_key::<String>()? {
            match Field::from_key(&key) {
                Field::Title => {
                    if let Some(title) = map.next_value::<Option<String>>()? {
                        movie.title = title;
                    }
                }
                Field::Rating => {
                    if let Some(rating) = map.next_value::<Option<i64>>()? {
                        movie.rating = rating;
                    }
                }
                Field::Id => {
                    if let Some(id) = map.next_value::<Option<i64>>()? {
                        movie.id = id;
                    }
                }
                Field::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(movie)
    }
}

impl<'de> Deserialize<'de> for Movie {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MovieVisitor)
    }
}

impl<'de> Deserialize<'de> for MovieFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let movie = Movie::deserialize(deserializer)?;
        Ok(MovieFields { title: movie.title, rating: movie.rating })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, rating: i64, id: i64) -> Movie {
        Movie { title: title.to_string(), rating, id }
    }

    #[test]
    fn test_keys_match_case_insensitively() {
        let m: Movie = serde_json::from_str(r#"{"Title":"Caps","RATING":3,"Id":7}"#).unwrap();
        assert_eq!(m, movie("Caps", 3, 7));
    }

    #[test]
    fn test_missing_null_and_unknown_fields() {
        let m: Movie = serde_json::from_str(r#"{"title":null,"rating":4,"extra":[1,2]}"#).unwrap();
        assert_eq!(m, movie("", 4, 0));

        let m: Movie = serde_json::from_str("null").unwrap();
        assert_eq!(m, Movie::default());
    }

    #[test]
    fn test_last_duplicate_wins() {
        let m: Movie = serde_json::from_str(r#"{"TITLE":"first","title":"second"}"#).unwrap();
        assert_eq!(m.title, "second");
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        assert!(serde_json::from_str::<Movie>(r#"{"rating":"nine"}"#).is_err());
        assert!(serde_json::from_str::<Movie>(r#"{"rating":9.5}"#).is_err());
        assert!(serde_json::from_str::<Movie>("[1,2]").is_err());
        assert!(serde_json::from_str::<Movie>("\"movie\"").is_err());
    }

    #[test]
    fn test_fields_drop_id() {
        let f: MovieFields = serde_json::from_str(r#"{"Title":"t","rating":2,"id":9}"#).unwrap();
        assert_eq!(f, MovieFields { title: "t".to_string(), rating: 2 });
    }

    #[test]
    fn test_serialized_field_order() {
        let text = serde_json::to_string(&movie("Heat", 8, 1)).unwrap();
        assert_eq!(text, r#"{"title":"Heat","rating":8,"id":1}"#);
    }
}
