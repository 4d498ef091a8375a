//! Post store and the `blog.json` document.
//!
//! The document is one JSON object: site settings at the top level (see
//! [`config`](crate::config)) and a `blogs` object mapping post id → post:
//!
//! ```json
//! "blogs": {
//!     "hello-world": {
//!         "title": "SGVsbG8sIFdvcmxkIQ==",
//!         "content": "IyBIaQo=",
//!         "version": 1,
//!         "time": 1709294400.0,
//!         "keywords": "rust blog"
//!     }
//! }
//! ```
//!
//! ## Text encoding
//!
//! - `title` and `content` are base64 (standard alphabet, padded) of UTF-8.
//! - `keywords` is space separated and HTML-escaped (`&`, `<`, `>`, `"`, `'`).
//! - `time` is the creation time in seconds since the Unix epoch.
//!
//! In memory a [`Post`] always holds the decoded, unescaped text.
//!
//! ## Ordering
//!
//! `blogs` keeps its object order: that is the post order everywhere (listing,
//! picker, home page). Posts are appended on creation and the whole store is
//! sorted by creation time before it is written back.
//!
//! Unknown top-level keys are carried through a load/save cycle untouched.

use crate::config::{self, ConfigError, SiteConfig};
use crate::slug::SlugSet;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Schema version stamped on new posts.
pub const BLOG_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("post {id:?}: {field} is not base64-encoded UTF-8 text")]
    InvalidText { id: String, field: &'static str },
}

/// One blog post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Slug derived from the title at creation; never changes afterwards.
    pub id: String,
    pub title: String,
    /// Markdown source.
    pub content: String,
    pub version: u32,
    /// Seconds since the Unix epoch.
    pub created_at: f64,
    /// Space separated keywords.
    pub keywords: String,
}

impl Post {
    /// A new post at the current schema version.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        keywords: impl Into<String>,
        created_at: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            version: BLOG_VERSION,
            created_at,
            keywords: keywords.into(),
        }
    }

    pub fn keyword_list(&self) -> impl Iterator<Item = &str> {
        self.keywords.split_whitespace()
    }

    /// Warning text when the post was written by a different schema version.
    pub fn version_mismatch(&self) -> Option<String> {
        (self.version != BLOG_VERSION).then(|| {
            format!(
                "{}: unmatching version between {} and {}",
                self.id, self.version, BLOG_VERSION
            )
        })
    }
}

/// Current time as fractional seconds since the Unix epoch.
pub fn now_timestamp() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

/// On-disk shape of a post.
#[derive(Serialize, Deserialize)]
struct StoredPost {
    title: String,
    content: String,
    #[serde(default)]
    version: u32,
    #[serde(default)]
    time: f64,
    #[serde(default)]
    keywords: String,
}

impl StoredPost {
    fn encode(post: &Post) -> Self {
        Self {
            title: BASE64.encode(post.title.as_bytes()),
            content: BASE64.encode(post.content.as_bytes()),
            version: post.version,
            time: post.created_at,
            keywords: escape_html(&post.keywords),
        }
    }

    fn decode(self, id: String) -> Result<Post, StoreError> {
        let title = decode_text(&self.title).ok_or_else(|| StoreError::InvalidText {
            id: id.clone(),
            field: "title",
        })?;
        let content = decode_text(&self.content).ok_or_else(|| StoreError::InvalidText {
            id: id.clone(),
            field: "content",
        })?;
        Ok(Post {
            id,
            title,
            content,
            version: self.version,
            created_at: self.time,
            keywords: unescape_html(&self.keywords),
        })
    }
}

fn decode_text(encoded: &str) -> Option<String> {
    let bytes = BASE64.decode(encoded.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// =============================================================================
// Posts
// =============================================================================

/// Ordered collection of posts, unique by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Posts(Vec<Post>);

impl Posts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Posts in store order (oldest first once sorted).
    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Post] {
        &self.0
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.0.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.0.iter_mut().find(|p| p.id == id)
    }

    /// Append a post, or replace the post with the same id in place.
    pub fn insert(&mut self, post: Post) {
        match self.get_mut(&post.id) {
            Some(existing) => *existing = post,
            None => self.0.push(post),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Post> {
        let index = self.0.iter().position(|p| p.id == id)?;
        Some(self.0.remove(index))
    }

    /// The last post in store order.
    pub fn latest(&self) -> Option<&Post> {
        self.0.last()
    }

    /// Stable sort by creation time.
    pub fn sort_chronologically(&mut self) {
        self.0.sort_by(|a, b| a.created_at.total_cmp(&b.created_at));
    }
}

impl FromIterator<Post> for Posts {
    fn from_iter<I: IntoIterator<Item = Post>>(iter: I) -> Self {
        let mut posts = Posts::new();
        for post in iter {
            posts.insert(post);
        }
        posts
    }
}

impl<'a> IntoIterator for &'a Posts {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl SlugSet for Posts {
    fn contains_slug(&self, slug: &str) -> bool {
        self.contains(slug)
    }
}

impl Serialize for Posts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for post in &self.0 {
            map.serialize_entry(&post.id, &StoredPost::encode(post))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Posts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PostsVisitor;

        impl<'de> Visitor<'de> for PostsVisitor {
            type Value = Posts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping post ids to posts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Posts, A::Error> {
                let mut posts = Posts::new();
                while let Some((id, stored)) = map.next_entry::<String, StoredPost>()? {
                    posts.insert(stored.decode(id).map_err(de::Error::custom)?);
                }
                Ok(posts)
            }
        }

        deserializer.deserialize_map(PostsVisitor)
    }
}

// =============================================================================
// Document
// =============================================================================

/// The whole store document: site settings plus posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    pub config: SiteConfig,
    /// Top-level keys this version does not know about.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub blogs: Posts,
}

impl Document {
    /// Stock settings and no posts.
    pub fn stock() -> Self {
        Self {
            config: SiteConfig::default(),
            extra: serde_json::Map::new(),
            blogs: Posts::new(),
        }
    }

    /// Build a document from user JSON merged over the stock defaults.
    pub fn from_value(value: serde_json::Value) -> Result<Self, StoreError> {
        let config = config::resolve_config(value.clone())?;
        let Document { extra, blogs, .. } = serde_json::from_value(config::with_defaults(value))?;
        Ok(Self {
            config,
            extra,
            blogs,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Sort posts by creation time and serialize the document.
    ///
    /// `pretty` indents with four spaces; otherwise the output is compact.
    pub fn to_json(&mut self, pretty: bool) -> Result<Vec<u8>, StoreError> {
        self.blogs.sort_chronologically();

        let mut buf = Vec::new();
        if pretty {
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            self.serialize(&mut serializer)?;
        } else {
            serde_json::to_writer(&mut buf, self)?;
        }
        Ok(buf)
    }

    /// Sort posts by creation time and write the document to `path`.
    pub fn save(&mut self, path: &Path, pretty: bool) -> Result<(), StoreError> {
        let bytes = self.to_json(pretty)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_document, sample_posts};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn post_is_encoded_on_disk() {
        let mut posts = Posts::new();
        posts.insert(Post::new(
            "hello-world",
            "Hello, World!",
            "# Hi\n",
            "rust <3 q&a",
            1709294400.0,
        ));

        let value = serde_json::to_value(&posts).unwrap();
        let stored = &value["hello-world"];
        assert_eq!(stored["title"], "SGVsbG8sIFdvcmxkIQ==");
        assert_eq!(stored["content"], "IyBIaQo=");
        assert_eq!(stored["version"], 1);
        assert_eq!(stored["time"], 1709294400.0);
        assert_eq!(stored["keywords"], "rust &lt;3 q&amp;a");
    }

    #[test]
    fn post_is_decoded_on_load() {
        let posts: Posts = serde_json::from_value(json!({
            "hello-world": {
                "title": "SGVsbG8sIFdvcmxkIQ==",
                "content": "IyBIaQo=",
                "version": 1,
                "time": 1709294400.0,
                "keywords": "rust &lt;3 q&amp;a it&#x27;s"
            }
        }))
        .unwrap();

        let post = posts.get("hello-world").unwrap();
        assert_eq!(post.title, "Hello, World!");
        assert_eq!(post.content, "# Hi\n");
        assert_eq!(post.keywords, "rust <3 q&a it's");
        assert_eq!(post.created_at, 1709294400.0);
    }

    #[test]
    fn integer_time_is_accepted() {
        let posts: Posts = serde_json::from_value(json!({
            "x": { "title": "eA==", "content": "eA==", "version": 1, "time": 0, "keywords": "" }
        }))
        .unwrap();
        assert_eq!(posts.get("x").unwrap().created_at, 0.0);
    }

    #[test]
    fn invalid_base64_is_an_error() {
        let result: Result<Posts, _> = serde_json::from_value(json!({
            "x": { "title": "!!!", "content": "", "version": 1, "time": 0.0, "keywords": "" }
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("title"), "got {err}");
    }

    #[test]
    fn object_order_is_store_order() {
        let posts: Posts = serde_json::from_str(
            r#"{
                "zebra": {"title": "eg==", "content": "eg==", "version": 1, "time": 3.0, "keywords": ""},
                "apple": {"title": "YQ==", "content": "YQ==", "version": 1, "time": 1.0, "keywords": ""}
            }"#,
        )
        .unwrap();
        assert_eq!(posts.ids().collect::<Vec<_>>(), vec!["zebra", "apple"]);

        let json = serde_json::to_string(&posts).unwrap();
        assert!(json.find("zebra") < json.find("apple"));
    }

    #[test]
    fn sort_chronologically_orders_by_creation() {
        let mut posts: Posts = vec![
            Post::new("c", "C", "c", "", 30.0),
            Post::new("a", "A", "a", "", 10.0),
            Post::new("b", "B", "b", "", 20.0),
        ]
        .into_iter()
        .collect();
        posts.sort_chronologically();
        assert_eq!(posts.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(posts.latest().unwrap().id, "c");
    }

    #[test]
    fn insert_replaces_same_id_in_place() {
        let mut posts = sample_posts();
        let mut edited = posts.get("first-post").unwrap().clone();
        edited.title = "Renamed".to_string();
        posts.insert(edited);
        assert_eq!(posts.len(), 3);
        assert_eq!(posts.iter().next().unwrap().title, "Renamed");
    }

    #[test]
    fn remove_returns_the_post() {
        let mut posts = sample_posts();
        let removed = posts.remove("second-post").unwrap();
        assert_eq!(removed.title, "Second post");
        assert!(!posts.contains("second-post"));
        assert!(posts.remove("second-post").is_none());
    }

    #[test]
    fn store_is_a_slug_set() {
        let posts = sample_posts();
        let slug = crate::slug::generate_slug("First post", &posts).unwrap();
        assert_ne!(slug, "first-post");
        assert!(slug.starts_with("first-post-"));
    }

    #[test]
    fn version_mismatch_warning() {
        let mut post = Post::new("old", "Old", "x", "", 0.0);
        assert!(post.version_mismatch().is_none());
        post.version = 0;
        assert_eq!(
            post.version_mismatch().unwrap(),
            "old: unmatching version between 0 and 1"
        );
    }

    // =========================================================================
    // Document tests
    // =========================================================================

    #[test]
    fn sparse_document_gets_defaults() {
        let doc = Document::from_json(r#"{ "page-title": "Notes" }"#).unwrap();
        assert_eq!(doc.config.page_title, "Notes");
        assert_eq!(doc.config.blog_dir, "b");
        assert!(doc.blogs.is_empty());
    }

    #[test]
    fn document_round_trip() {
        let mut doc = sample_document();
        let bytes = doc.to_json(true).unwrap();
        let loaded = Document::from_json(std::str::from_utf8(&bytes).unwrap()).unwrap();
        assert_eq!(loaded.config, doc.config);
        assert_eq!(loaded.blogs, doc.blogs);
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let mut doc =
            Document::from_json(r#"{ "py-markdown-extensions": ["toc"], "blogs": {} }"#).unwrap();
        assert_eq!(doc.extra["py-markdown-extensions"], json!(["toc"]));

        let value: serde_json::Value = serde_json::from_slice(&doc.to_json(false).unwrap()).unwrap();
        assert_eq!(value["py-markdown-extensions"], json!(["toc"]));
        assert!(value.get("page-title").is_some());
        assert!(value.get("blogs").is_some());
    }

    #[test]
    fn to_json_sorts_posts() {
        let mut doc = Document::stock();
        doc.blogs.insert(Post::new("late", "Late", "x", "", 200.0));
        doc.blogs.insert(Post::new("early", "Early", "x", "", 100.0));

        let json = String::from_utf8(doc.to_json(false).unwrap()).unwrap();
        assert!(json.find("\"early\"") < json.find("\"late\""));
        assert_eq!(doc.blogs.ids().collect::<Vec<_>>(), vec!["early", "late"]);
    }

    #[test]
    fn pretty_output_uses_four_spaces() {
        let json = String::from_utf8(Document::stock().to_json(true).unwrap()).unwrap();
        assert!(json.contains("\n    \"editor-command\""));
    }

    #[test]
    fn compact_output_is_one_line() {
        let json = String::from_utf8(Document::stock().to_json(false).unwrap()).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = Document::from_json(r#"{ "blog-dir": ".." }"#);
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn mistyped_setting_is_a_config_error() {
        let result = Document::from_json(r#"{ "page-title": 3, "blogs": {} }"#);
        assert!(matches!(result, Err(StoreError::Config(ConfigError::Json(_)))));
    }

    #[test]
    fn settings_resolve_like_standalone_config() {
        let value = json!({ "page-title": "Notes", "custom": true });
        let doc = Document::from_value(value.clone()).unwrap();
        assert_eq!(doc.config, config::resolve_config(value).unwrap());
        assert_eq!(doc.extra["custom"], true);
    }

    #[test]
    fn save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blog.json");
        let mut doc = sample_document();
        doc.save(&path, true).unwrap();

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.blogs.len(), 3);
        assert_eq!(loaded.blogs.get("first-post").unwrap().title, "First post");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = Document::load(&tmp.path().join("blog.json"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
