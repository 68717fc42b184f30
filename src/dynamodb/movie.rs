use serde::{Deserialize, Serialize};

pub const MOVIE_PARTITION_KEY: &str = "year";
pub const MOVIE_SORT_KEY: &str = "title";

/// A row of the sample movies table, keyed by `year` (N) and `title` (S).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub year: i32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<MovieInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl Movie {
    pub fn new(year: i32, title: impl Into<String>) -> Self {
        Self {
            year,
            title: title.into(),
            info: None,
        }
    }

    pub fn with_info(mut self, plot: Option<String>, rating: Option<f64>) -> Self {
        if plot.is_some() || rating.is_some() {
            self.info = Some(MovieInfo { plot, rating });
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamodb::Item;
    use aws_sdk_dynamodb::types::AttributeValue;
    use std::collections::HashMap;

    #[test]
    fn movie_keys_have_dynamodb_types() {
        let movie = Movie::new(2013, "Rush").with_info(Some("A race".to_string()), Some(8.3));
        let item: HashMap<String, AttributeValue> = serde_dynamo::to_item(&movie).unwrap();

        assert_eq!(item.get("year"), Some(&AttributeValue::N("2013".to_string())));
        assert_eq!(item.get("title"), Some(&AttributeValue::S("Rush".to_string())));
        let info = item.get("info").and_then(|v| v.as_m().ok()).unwrap();
        assert_eq!(info.get("plot"), Some(&AttributeValue::S("A race".to_string())));

        let back: Movie = serde_dynamo::from_item(item).unwrap();
        assert_eq!(back, movie);
    }

    #[test]
    fn movie_without_info_reads_from_plain_item() {
        let item = Item::new().set_number("year", 1999).set_string("title", "The Matrix");
        let movie: Movie = serde_dynamo::from_item(item.into_attributes()).unwrap();
        assert_eq!(movie, Movie::new(1999, "The Matrix"));
    }
}
