//! Swagger UI pages.
//!
//! A page either carries the assembled document inline or fetches it from
//! wherever the host application serves it. Both variants load the Swagger
//! UI bundle from unpkg.
//!
//! ```rust,ignore
//! use docsmith_docs::SwaggerUi;
//!
//! let document = builder.generate(&mut registry)?;
//! let page = SwaggerUi::embedded("/docs", &document)?.html();
//!
//! // or point the page at a served document
//! let page = SwaggerUi::from_url("/docs", "/docs/openapi.json").html();
//! ```

use crate::error::DocsResult;
use crate::openapi::OpenApi;

/// Where a documentation page reads the document from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// The document is embedded in the page as JSON.
    Embedded(String),
    /// The page fetches the document from a URL.
    Url(String),
}

impl DocumentSource {
    /// Embeds `document` as pretty-printed JSON.
    pub fn embed(document: &OpenApi) -> DocsResult<Self> {
        Ok(Self::Embedded(document.to_json()?))
    }

    /// The JavaScript literal used by the page initializer.
    pub(crate) fn js_literal(&self) -> String {
        match self {
            Self::Embedded(json) => json.replace("</", "<\\/"),
            Self::Url(url) => serde_json::Value::String(url.clone()).to_string(),
        }
    }
}

/// A Swagger UI page for one generated document.
///
/// Embedded pages are titled after the document. Pages built from a URL
/// know nothing about the document and fall back to a generic title.
#[derive(Debug, Clone)]
pub struct SwaggerUi {
    path: String,
    source: DocumentSource,
    title: String,
    deep_linking: bool,
    doc_expansion: DocExpansion,
    display_request_duration: bool,
    swagger_version: String,
}

/// How far operations are unfolded when the page opens.
#[derive(Debug, Clone, Copy, Default)]
pub enum DocExpansion {
    /// Tags only.
    None,
    /// Tags and their operations.
    #[default]
    List,
    /// Operations with their details.
    Full,
}

impl DocExpansion {
    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::List => "list",
            Self::Full => "full",
        }
    }
}

impl SwaggerUi {
    /// A page embedding `document`.
    pub fn embedded(path: impl Into<String>, document: &OpenApi) -> DocsResult<Self> {
        let title = format!("{} - Swagger UI", document.info.title);
        Ok(Self::new(path, DocumentSource::embed(document)?, title))
    }

    /// A page loading the document served at `url`.
    #[must_use]
    pub fn from_url(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(path, DocumentSource::Url(url.into()), "Swagger UI".to_string())
    }

    fn new(path: impl Into<String>, source: DocumentSource, title: String) -> Self {
        Self {
            path: path.into(),
            source,
            title,
            deep_linking: true,
            doc_expansion: DocExpansion::List,
            display_request_duration: true,
            swagger_version: "5.18.2".to_string(),
        }
    }

    /// Overrides the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Whether expanding an operation updates the page fragment.
    #[must_use]
    pub fn deep_linking(mut self, enabled: bool) -> Self {
        self.deep_linking = enabled;
        self
    }

    /// Sets how far operations start unfolded.
    #[must_use]
    pub fn doc_expansion(mut self, expansion: DocExpansion) -> Self {
        self.doc_expansion = expansion;
        self
    }

    /// Whether "try it out" calls report how long they took.
    #[must_use]
    pub fn display_request_duration(mut self, enabled: bool) -> Self {
        self.display_request_duration = enabled;
        self
    }

    /// Pins the `swagger-ui-dist` release loaded from unpkg.
    #[must_use]
    pub fn swagger_version(mut self, version: impl Into<String>) -> Self {
        self.swagger_version = version.into();
        self
    }

    /// Mount path of the page.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Conventional path of the JSON document next to the page.
    #[must_use]
    pub fn document_path(&self) -> String {
        format!("{}/openapi.json", self.path.trim_end_matches('/'))
    }

    /// Where the page reads the document from.
    #[must_use]
    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Renders the page.
    ///
    /// Embedded documents are passed to the bundle as `spec`, URL sources
    /// as `url`.
    #[must_use]
    pub fn html(&self) -> String {
        let source_key = match self.source {
            DocumentSource::Embedded(_) => "spec",
            DocumentSource::Url(_) => "url",
        };
        let deep_linking = self.deep_linking.to_string();
        let doc_expansion = self.doc_expansion.as_str();
        let display_duration = self.display_request_duration.to_string();

        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
    <style>
        html {{
            box-sizing: border-box;
            overflow: -moz-scrollbars-vertical;
            overflow-y: scroll;
        }}
        *,
        *:before,
        *:after {{
            box-sizing: inherit;
        }}
        body {{
            margin: 0;
            background: #fafafa;
        }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {{
            window.ui = SwaggerUIBundle({{
                {source_key}: {source},
                dom_id: '#swagger-ui',
                deepLinking: {deep_linking},
                docExpansion: '{doc_expansion}',
                displayRequestDuration: {display_duration},
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                plugins: [
                    SwaggerUIBundle.plugins.DownloadUrl
                ],
                layout: "StandaloneLayout"
            }});
        }};
    </script>
</body>
</html>"##,
            title = html_escape(&self.title),
            version = self.swagger_version,
            source = self.source.js_literal(),
            deep_linking = deep_linking,
            doc_expansion = doc_expansion,
            display_duration = display_duration,
        )
    }

    /// The rendered page as a response body.
    #[must_use]
    pub fn html_bytes(&self) -> bytes::Bytes {
        bytes::Bytes::from(self.html())
    }
}

/// Escapes text placed in HTML element content.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
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
        let swagger = SwaggerUi::embedded("/docs/", &document()).unwrap();
        assert_eq!(swagger.path(), "/docs/");
        assert_eq!(swagger.document_path(), "/docs/openapi.json");

        let html = swagger.html();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Pet Store - Swagger UI"));
        assert!(html.contains("spec: {"));
        assert!(html.contains("\"openapi\": \"3.0.3\""));
    }

    #[test]
    fn test_url_page() {
        let html = SwaggerUi::from_url("/docs", "/docs/openapi.json")
            .title("Pets <v1>")
            .doc_expansion(DocExpansion::Full)
            .deep_linking(false)
            .html();
        assert!(html.contains("url: \"/docs/openapi.json\""));
        assert!(html.contains("Pets &lt;v1&gt;"));
        assert!(html.contains("docExpansion: 'full'"));
        assert!(html.contains("deepLinking: false"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }

    #[test]
    fn test_html_bytes() {
        let swagger = SwaggerUi::from_url("/docs", "/openapi.json").swagger_version("5.0.0");
        assert!(swagger.html_bytes().len() > 100);
    }
}
