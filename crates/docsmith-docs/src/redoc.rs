//! ReDoc pages.
//!
//! ReDoc is read-only: the page renders the document and its schemas but
//! never calls the API. Options are serialized to a JSON object and passed
//! to `Redoc.init` along with the document source.
//!
//! ```rust,ignore
//! use docsmith_docs::ReDoc;
//!
//! let page = ReDoc::embedded("/redoc", &document)?.primary_color("#0b7285").html();
//! ```

use serde_json::{json, Value};

use crate::error::DocsResult;
use crate::openapi::OpenApi;
use crate::swagger::{html_escape, DocumentSource};

/// A ReDoc page for one generated document.
#[derive(Debug, Clone)]
pub struct ReDoc {
    path: String,
    source: DocumentSource,
    title: String,
    theme: ReDocTheme,
    expand_responses: ExpandResponses,
    hide_download_button: bool,
    hide_hostname: bool,
    disable_search: bool,
    redoc_version: String,
}

/// Which responses are unfolded when the page opens.
#[derive(Debug, Clone, Copy, Default)]
pub enum ExpandResponses {
    /// Every status.
    All,
    /// 200 and 201.
    #[default]
    Success,
    /// None.
    None,
}

impl ExpandResponses {
    fn as_option(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Success => "200,201",
            Self::None => "",
        }
    }
}

/// Colors and fonts passed to ReDoc's theme option.
#[derive(Debug, Clone)]
pub struct ReDocTheme {
    /// Links, buttons and the active menu entry.
    pub primary_color: String,
    /// 2xx response headings.
    pub success_color: String,
    /// 3xx response headings.
    pub warning_color: String,
    /// 4xx and 5xx response headings.
    pub error_color: String,
    /// Body text.
    pub font_family: String,
    /// Code samples and schema types.
    pub code_font_family: String,
}

impl Default for ReDocTheme {
    fn default() -> Self {
        Self {
            primary_color: "#32329f".to_string(),
            success_color: "#00aa00".to_string(),
            warning_color: "#d4ac0d".to_string(),
            error_color: "#e74c3c".to_string(),
            font_family: "Roboto, sans-serif".to_string(),
            code_font_family: "'Source Code Pro', monospace".to_string(),
        }
    }
}

impl ReDocTheme {
    fn to_option(&self) -> Value {
        json!({
            "colors": {
                "primary": {"main": self.primary_color},
                "success": {"main": self.success_color},
                "warning": {"main": self.warning_color},
                "error": {"main": self.error_color},
            },
            "typography": {
                "fontFamily": self.font_family,
                "code": {"fontFamily": self.code_font_family},
            },
            "sidebar": {"backgroundColor": "#fafafa"},
        })
    }
}

impl ReDoc {
    /// A page embedding `document`, titled after it.
    pub fn embedded(path: impl Into<String>, document: &OpenApi) -> DocsResult<Self> {
        let title = format!("{} - API Documentation", document.info.title);
        Ok(Self::new(path, DocumentSource::embed(document)?, title))
    }

    /// A page fetching the document from `url` when it loads.
    #[must_use]
    pub fn from_url(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(path, DocumentSource::Url(url.into()), "API Documentation".to_string())
    }

    fn new(path: impl Into<String>, source: DocumentSource, title: String) -> Self {
        Self {
            path: path.into(),
            source,
            title,
            theme: ReDocTheme::default(),
            expand_responses: ExpandResponses::Success,
            hide_download_button: false,
            hide_hostname: false,
            disable_search: false,
            redoc_version: "2.1.5".to_string(),
        }
    }

    /// Overrides the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replaces the whole theme.
    #[must_use]
    pub fn theme(mut self, theme: ReDocTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Replaces only the primary color of the current theme.
    #[must_use]
    pub fn primary_color(mut self, color: impl Into<String>) -> Self {
        self.theme.primary_color = color.into();
        self
    }

    /// Sets which responses start unfolded.
    #[must_use]
    pub fn expand_responses(mut self, expand: ExpandResponses) -> Self {
        self.expand_responses = expand;
        self
    }

    /// Hides the link that downloads the document.
    #[must_use]
    pub fn hide_download_button(mut self, hide: bool) -> Self {
        self.hide_download_button = hide;
        self
    }

    /// Shows server URLs as paths only.
    #[must_use]
    pub fn hide_hostname(mut self, hide: bool) -> Self {
        self.hide_hostname = hide;
        self
    }

    /// Removes the search box from the sidebar.
    #[must_use]
    pub fn disable_search(mut self, disable: bool) -> Self {
        self.disable_search = disable;
        self
    }

    /// Pins the ReDoc release loaded from `cdn.redoc.ly`.
    #[must_use]
    pub fn redoc_version(mut self, version: impl Into<String>) -> Self {
        self.redoc_version = version.into();
        self
    }

    /// Mount path of the page.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Where the page reads the document from.
    #[must_use]
    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// The options object passed to `Redoc.init`.
    #[must_use]
    pub fn options(&self) -> Value {
        json!({
            "expandResponses": self.expand_responses.as_option(),
            "hideDownloadButton": self.hide_download_button,
            "hideHostname": self.hide_hostname,
            "disableSearch": self.disable_search,
            "theme": self.theme.to_option(),
        })
    }

    /// Renders the page.
    ///
    /// `Redoc.init` takes the embedded document object or the URL string
    /// as its first argument.
    #[must_use]
    pub fn html(&self) -> String {
        let options = self.options().to_string().replace("</", "<\\/");
        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link href="https://fonts.googleapis.com/css2?family=Roboto:wght@300;400;500;700&family=Source+Code+Pro:wght@400;600&display=swap" rel="stylesheet">
    <style>body {{ margin: 0; padding: 0; }}</style>
</head>
<body>
    <div id="redoc-container"></div>
    <script src="https://cdn.redoc.ly/redoc/{version}/bundles/redoc.standalone.js"></script>
    <script>
        Redoc.init({source}, {options}, document.getElementById('redoc-container'));
    </script>
</body>
</html>"##,
            title = html_escape(&self.title),
            version = self.redoc_version,
            source = self.source.js_literal(),
        )
    }

    /// The rendered page as a response body.
    #[must_use]
    pub fn html_bytes(&self) -> bytes::Bytes {
        bytes::Bytes::from(self.html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::Info;

    fn document() -> OpenApi {
        OpenApi {
            openapi: "3.0.3".to_string(),
            info: Info {
                title: "Pet Store".to_string(),
                version: "1.0.0".to_string(),
                ..Info::default()
            },
            servers: vec![],
            paths: indexmap::IndexMap::new(),
            components: None,
            tags: vec![],
            external_docs: None,
        }
    }

    #[test]
    fn test_embedded_page() {
        let redoc = ReDoc::embedded("/redoc", &document()).unwrap();
        assert_eq!(redoc.path(), "/redoc");
        let html = redoc.html();
        assert!(html.contains("Pet Store - API Documentation"));
        assert!(html.contains("Redoc.init({"));
        assert!(matches!(redoc.source(), DocumentSource::Embedded(_)));
    }

    #[test]
    fn test_url_page_customization() {
        let redoc = ReDoc::from_url("/redoc", "/redoc/openapi.json")
            .title("Custom Docs")
            .primary_color("#ff0000")
            .expand_responses(ExpandResponses::All)
            .hide_download_button(true)
            .disable_search(true);
        let html = redoc.html();
        assert!(html.contains("Redoc.init(\"/redoc/openapi.json\""));
        assert!(html.contains("#ff0000"));

        let options = redoc.options();
        assert_eq!(options["expandResponses"], "all");
        assert_eq!(options["hideDownloadButton"], true);
        assert_eq!(options["disableSearch"], true);
        assert_eq!(options["hideHostname"], false);
    }

    #[test]
    fn test_custom_theme() {
        let theme = ReDocTheme {
            primary_color: "#123456".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            ..ReDocTheme::default()
        };
        let html = ReDoc::from_url("/redoc", "/openapi.json").theme(theme).html();
        assert!(html.contains("#123456"));
        assert!(html.contains("Arial"));
        assert!(html.contains("#00aa00"));
    }

    #[test]
    fn test_default_options() {
        let options = ReDoc::from_url("/redoc", "/openapi.json").options();
        assert_eq!(options["expandResponses"], "200,201");
        assert_eq!(options["theme"]["colors"]["primary"]["main"], "#32329f");
        assert_eq!(
            options["theme"]["typography"]["code"]["fontFamily"],
            "'Source Code Pro', monospace"
        );
    }

    #[test]
    fn test_options_cannot_close_the_script() {
        let html = ReDoc::from_url("/redoc", "/openapi.json")
            .primary_color("</script><script>")
            .html();
        assert!(!html.contains("</script><script>"));
    }
}
