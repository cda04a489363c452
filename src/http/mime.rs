//! Content-type resolution module
//!
//! Resolves a response `Content-Type` from the request path extension:
//! configured overrides win, then the stock extension table, then an HTML
//! default. A configured default charset is applied to text types only.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

/// Media type used when the extension is unknown to everyone.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Extension-based content-type resolver with override precedence.
#[derive(Debug, Clone)]
pub struct ContentTypeResolver {
    /// Extension (lowercase, no dot) to media type overrides.
    overrides: HashMap<String, String>,
    /// Charset appended to text types that do not carry one.
    default_charset: Option<String>,
}

impl ContentTypeResolver {
    /// Build a resolver from configured overrides and an optional charset.
    pub fn new(overrides: &HashMap<String, String>, default_charset: Option<&str>) -> Self {
        Self {
            overrides: overrides
                .iter()
                .map(|(ext, mime)| (ext.to_ascii_lowercase(), mime.clone()))
                .collect(),
            default_charset: default_charset.map(ToString::to_string),
        }
    }

    /// Resolve the `Content-Type` for a request path.
    ///
    /// # Examples
    /// ```
    /// use std::collections::HashMap;
    /// use assetserve::http::mime::ContentTypeResolver;
    ///
    /// let resolver = ContentTypeResolver::new(&HashMap::new(), Some("utf-8"));
    /// assert_eq!(resolver.resolve("/assets/example.txt"), "text/plain; charset=utf-8");
    /// assert_eq!(resolver.resolve("/assets/foo.mp4"), "video/mp4");
    /// ```
    pub fn resolve(&self, path: &str) -> String {
        let extension = Path::new(path)
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);

        let known = extension.as_deref().and_then(|ext| {
            self.overrides.get(ext).cloned().or_else(|| {
                mime_guess::from_ext(ext)
                    .first()
                    .map(|mime| mime.essence_str().to_string())
            })
        });

        match known {
            Some(media_type) => self.with_charset(media_type),
            None => DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    fn with_charset(&self, media_type: String) -> String {
        match &self.default_charset {
            Some(charset) if media_type.starts_with("text/") && !media_type.contains("charset=") => {
                format!("{media_type}; charset={charset}")
            }
            _ => media_type,
        }
    }
}

/// Whether a media type advertises `Accept-Ranges: bytes` even on full
/// responses. Audio and video clients commonly probe before seeking.
pub fn accepts_ranges(content_type: &str) -> bool {
    content_type.starts_with("audio/") || content_type.starts_with("video/")
}
