use handlebars::Handlebars;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct Label {
    pub name: String,
    pub catno: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Credit {
    pub name: String,
}

// Discogs detail record (release, master or artist), every field optional
#[derive(Debug, Deserialize)]
pub struct Details {
    pub title: Option<String>,
    pub year: Option<Value>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub artists: Vec<Credit>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
}

impl Details {
    pub fn catalog_number(&self) -> &str {
        self.labels
            .first()
            .and_then(|label| label.catno.as_deref())
            .unwrap_or("N/A")
    }

    pub fn year_text(&self) -> String {
        match &self.year {
            None | Some(Value::Null) => "Unknown".to_string(),
            Some(Value::String(year)) => year.clone(),
            Some(other) => other.to_string(),
        }
    }
}

pub fn detail_url(api_base: &str, entity_type: &str, discogs_id: &str) -> String {
    format!(
        "{api_base}/{}s/{}",
        urlencoding::encode(entity_type),
        urlencoding::encode(discogs_id)
    )
}

const PREVIEW_TEMPLATE: &str = "<html>
<body>
<h1>{{title}}</h1>
<p><strong>Artist:</strong> {{artists}}</p>
<p><strong>Label:</strong> {{labels}}</p>
<p><strong>Catalog Number:</strong> {{catno}}</p>
<p><strong>Year:</strong> {{year}}</p>
<p><strong>Genres:</strong> {{genres}}</p>
<p><strong>Styles:</strong> {{styles}}</p>
</body>
</html>
";

/// Fixed preview fragment for OpenRefine's hover pane.
///
/// Values go through handlebars `{{...}}`, which HTML-escapes them.
pub fn render(details: &Details) -> Result<String> {
    let labels: Vec<&str> = details.labels.iter().map(|label| label.name.as_str()).collect();
    let artists: Vec<&str> = details.artists.iter().map(|artist| artist.name.as_str()).collect();

    let view = json!({
        "title": details.title.as_deref().unwrap_or("No Title"),
        "artists": artists.join(", "),
        "labels": labels.join(", "),
        "catno": details.catalog_number(),
        "year": details.year_text(),
        "genres": details.genres.join(", "),
        "styles": details.styles.join(", "),
    });
    Ok(Handlebars::new().render_template(PREVIEW_TEMPLATE, &view)?)
}
