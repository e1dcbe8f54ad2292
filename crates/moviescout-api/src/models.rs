use serde::{Deserialize, Serialize};

const IMDB_TITLE_URL: &str = "https://www.imdb.com/title";

/// A movie as the catalog returns it
///
/// Field names on the wire are the catalog's (`Title`, `Year`, `imdbID`),
/// and favorites are persisted in the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub id: String,
}

impl Movie {
    pub fn new(title: impl Into<String>, year: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: year.into(),
            id: id.into(),
        }
    }

    /// Link to the movie's IMDb page
    pub fn imdb_url(&self) -> String {
        format!("{}/{}", IMDB_TITLE_URL, self.id)
    }
}

/// Filters for a catalog search
///
/// Every filter is optional. Empty strings are treated the same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub title: Option<String>,
    pub year: Option<String>,
    pub id: Option<String>,
    pub page: Option<u32>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// One page of catalog results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
    pub total_pages: u32,
    #[serde(rename = "data")]
    pub items: Vec<Movie>,
}

impl SearchResult {
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_uses_catalog_field_names() {
        let movie = Movie::new("Alien", "1979", "tt0078748");
        let json = serde_json::to_string(&movie).unwrap();
        assert_eq!(
            json,
            r#"{"Title":"Alien","Year":"1979","imdbID":"tt0078748"}"#
        );
    }

    #[test]
    fn test_search_result_parses_catalog_body() {
        let body = r#"{"page":2,"per_page":10,"total":14,"total_pages":2,
            "data":[{"Title":"Alien","Year":"1979","imdbID":"tt0078748"}]}"#;
        let result: SearchResult = serde_json::from_str(body).unwrap();

        assert_eq!(result.page, 2);
        assert_eq!(result.per_page, 10);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.items, vec![Movie::new("Alien", "1979", "tt0078748")]);
        assert!(!result.has_next_page());
    }

    #[test]
    fn test_imdb_url() {
        let movie = Movie::new("Inception", "2010", "tt1375666");
        assert_eq!(movie.imdb_url(), "https://www.imdb.com/title/tt1375666");
    }
}
