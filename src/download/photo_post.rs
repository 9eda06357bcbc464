//! TikTok photo carousels
//!
//! yt-dlp does not handle photo posts, so the page HTML is fetched and the
//! client-state JSON that TikTok embeds for hydration is searched for image
//! URLs. The page layout changes without notice; the generic scan is a best
//! effort fallback for when the known field path moves.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::{self, download::MAX_PHOTO_IMAGES};
use crate::core::error::ErrorKind;

/// Title used when the post has no description
pub const DEFAULT_PHOTO_TITLE: &str = "TikTok photo post";

static UNIVERSAL_DATA_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r#"(?s)<script[^>]*id="__UNIVERSAL_DATA_FOR_REHYDRATION__"[^>]*>(.*?)</script>"#).ok()
});
static SIGI_SCRIPT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?s)<script[^>]*id="SIGI_STATE"[^>]*>(.*?)</script>"#).ok());
static SIGI_ASSIGN_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#"window\[['"]SIGI_STATE['"]\]\s*=\s*"#).ok());
static NEXT_DATA_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?s)<script[^>]*id="__NEXT_DATA__"[^>]*>(.*?)</script>"#).ok());

/// A photo post ready to be sent as a media group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPost {
    pub title: String,
    pub image_urls: Vec<String>,
}

#[derive(Error, Debug)]
pub enum PhotoPostError {
    /// None of the embedded state blobs could be found or parsed
    #[error("could not parse the photo post page")]
    ParseFailed,

    /// State parsed but contained no image URLs
    #[error("photo post contains no images")]
    ImagesNotFound,

    #[error("failed to fetch photo post page: {0}")]
    Http(#[from] reqwest::Error),
}

impl PhotoPostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PhotoPostError::ParseFailed => ErrorKind::PhotoParseFailed,
            PhotoPostError::ImagesNotFound => ErrorKind::PhotoImagesNotFound,
            PhotoPostError::Http(_) => ErrorKind::Generic,
        }
    }
}

/// True for any tiktok.com link, including short links
pub fn is_tiktok_url(url: &str) -> bool {
    host_of(url).is_some_and(|host| host == "tiktok.com" || host.ends_with(".tiktok.com"))
}

/// True for `vm.tiktok.com` / `vt.tiktok.com` redirect links
pub fn is_short_tiktok_link(url: &str) -> bool {
    host_of(url).is_some_and(|host| host == "vm.tiktok.com" || host == "vt.tiktok.com")
}

/// True when the (resolved) URL points at a photo post
pub fn is_photo_post_url(url: &str) -> bool {
    is_tiktok_url(url) && url.contains("/photo/")
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

/// HTTP client for TikTok pages
#[derive(Clone)]
pub struct PhotoPostClient {
    http: reqwest::Client,
}

impl PhotoPostClient {
    pub fn new() -> Result<Self, PhotoPostError> {
        let http = reqwest::Client::builder()
            .timeout(config::network::page_timeout())
            .user_agent(config::network::USER_AGENT)
            .build()?;
        Ok(Self { http })
    }

    /// Follows redirects of a short link and returns the final URL.
    ///
    /// Any failure falls back to the original URL.
    pub async fn resolve_short_link(&self, url: &str) -> String {
        match self.http.get(url).send().await {
            Ok(response) => {
                let resolved = response.url().to_string();
                log::debug!("Resolved {} -> {}", url, resolved);
                resolved
            }
            Err(e) => {
                log::warn!("Failed to resolve short link {}: {}", url, e);
                url.to_string()
            }
        }
    }

    /// Downloads the page and extracts the carousel images.
    pub async fn fetch_photo_post(&self, url: &str) -> Result<PhotoPost, PhotoPostError> {
        let html = self.http.get(url).send().await?.error_for_status()?.text().await?;
        let post = parse_photo_post(&html)?;
        log::info!("Photo post {} has {} image(s)", url, post.image_urls.len());
        Ok(post)
    }
}

/// Extracts the photo post from page HTML.
pub fn parse_photo_post(html: &str) -> Result<PhotoPost, PhotoPostError> {
    let blobs = extract_state_blobs(html);
    if blobs.is_empty() {
        return Err(PhotoPostError::ParseFailed);
    }

    for blob in &blobs {
        let mut images = find_images_targeted(blob);
        if images.is_empty() {
            images = collect_image_urls(blob);
        }
        if images.is_empty() {
            continue;
        }
        images.truncate(MAX_PHOTO_IMAGES);

        let title = find_description(blob)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PHOTO_TITLE.to_string());
        return Ok(PhotoPost {
            title,
            image_urls: images,
        });
    }

    Err(PhotoPostError::ImagesNotFound)
}

/// Parses every embedded state blob that is present, in priority order:
/// universal rehydration data, SIGI state (script tag or window assignment),
/// then Next.js data.
pub fn extract_state_blobs(html: &str) -> Vec<Value> {
    let mut blobs = Vec::new();

    for re in [&UNIVERSAL_DATA_RE, &SIGI_SCRIPT_RE] {
        if let Some(value) = capture_json(re, html) {
            blobs.push(value);
        }
    }

    if let Some(value) = SIGI_ASSIGN_RE
        .as_ref()
        .and_then(|re| re.find(html))
        .and_then(|m| first_json_value(&html[m.end()..]))
    {
        blobs.push(value);
    }

    if let Some(value) = capture_json(&NEXT_DATA_RE, html) {
        blobs.push(value);
    }

    blobs
}

fn capture_json(re: &Lazy<Option<Regex>>, html: &str) -> Option<Value> {
    let body = re.as_ref()?.captures(html)?.get(1)?.as_str();
    serde_json::from_str(body.trim()).ok()
}

// Parses the first JSON value and ignores whatever script follows it.
fn first_json_value(text: &str) -> Option<Value> {
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()
        .and_then(Result::ok)
}

/// Looks up `imagePost.images[].imageURL.urlList[0]` under the first object that has an `imagePost`.
pub fn find_images_targeted(root: &Value) -> Vec<String> {
    let Some(image_post) = find_key(root, "imagePost") else {
        return Vec::new();
    };

    image_post
        .get("images")
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .filter_map(|image| {
                    image
                        .get("imageURL")
                        .and_then(|u| u.get("urlList"))
                        .and_then(Value::as_array)
                        .and_then(|list| list.first())
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Generic scan: the first URL of every `urlList` found under a key whose name mentions "image".
///
/// Returns every match in document order, de-duplicated. Best effort only.
pub fn collect_image_urls(root: &Value) -> Vec<String> {
    let mut found = Vec::new();
    walk_for_images(root, false, &mut found);

    let mut seen = std::collections::HashSet::new();
    found.retain(|url| seen.insert(url.clone()));
    found
}

fn walk_for_images(value: &Value, under_image_key: bool, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if under_image_key {
                if let Some(url) = map
                    .get("urlList")
                    .and_then(Value::as_array)
                    .and_then(|list| list.first())
                    .and_then(Value::as_str)
                    .filter(|u| u.starts_with("http"))
                {
                    out.push(url.to_string());
                }
            }
            for (key, child) in map {
                let is_image_key = key.to_ascii_lowercase().contains("image");
                walk_for_images(child, under_image_key || is_image_key, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_for_images(item, under_image_key, out);
            }
        }
        _ => {}
    }
}

fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|child| find_key(child, key))),
        Value::Array(items) => items.iter().find_map(|item| find_key(item, key)),
        _ => None,
    }
}

// The post caption lives next to `imagePost` as `desc`.
fn find_description(root: &Value) -> Option<String> {
    fn walk(value: &Value) -> Option<String> {
        match value {
            Value::Object(map) => {
                if map.contains_key("imagePost") {
                    if let Some(desc) = map.get("desc").and_then(Value::as_str) {
                        return Some(desc.to_string());
                    }
                }
                map.values().find_map(walk)
            }
            Value::Array(items) => items.iter().find_map(walk),
            _ => None,
        }
    }
    walk(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn universal_page(state: &Value) -> String {
        format!(
            r#"<html><head><script id="__UNIVERSAL_DATA_FOR_REHYDRATION__" type="application/json">{}</script></head></html>"#,
            state
        )
    }

    fn image_post(urls: &[&str]) -> Value {
        let images: Vec<Value> = urls
            .iter()
            .map(|u| json!({"imageURL": {"urlList": [u, "https://backup.example/x.jpg"]}}))
            .collect();
        json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {
                    "itemInfo": {
                        "itemStruct": {
                            "id": "7300000000000000000",
                            "desc": "Beach day",
                            "imagePost": {"images": images}
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_url_detection() {
        assert!(is_tiktok_url("https://www.tiktok.com/@user/video/1"));
        assert!(is_tiktok_url("https://vm.tiktok.com/ZM123/"));
        assert!(!is_tiktok_url("https://nottiktok.com/photo/1"));
        assert!(is_short_tiktok_link("https://vt.tiktok.com/ZS123/"));
        assert!(!is_short_tiktok_link("https://www.tiktok.com/@u/video/1"));
        assert!(is_photo_post_url("https://www.tiktok.com/@user/photo/7300000000000000000"));
        assert!(!is_photo_post_url("https://www.tiktok.com/@user/video/7300000000000000000"));
    }

    #[test]
    fn test_universal_data_targeted_lookup() {
        let html = universal_page(&image_post(&["https://p16.example/1.jpg", "https://p16.example/2.jpg"]));
        let post = parse_photo_post(&html).unwrap();
        assert_eq!(
            post,
            PhotoPost {
                title: "Beach day".into(),
                image_urls: vec!["https://p16.example/1.jpg".into(), "https://p16.example/2.jpg".into()],
            }
        );
    }

    #[test]
    fn test_sigi_assignment() {
        let state = json!({
            "ItemModule": {
                "7300": {
                    "desc": "",
                    "imagePost": {"images": [{"imageURL": {"urlList": ["https://p16.example/a.jpg"]}}]}
                }
            }
        });
        let html = format!(
            "<script>window['SIGI_STATE'] = {};window['SIGI_RETRY']={{}};</script>",
            state
        );
        let post = parse_photo_post(&html).unwrap();
        assert_eq!(post.title, DEFAULT_PHOTO_TITLE);
        assert_eq!(post.image_urls, vec!["https://p16.example/a.jpg".to_string()]);
    }

    #[test]
    fn test_next_data_generic_scan() {
        let state = json!({
            "props": {"pageProps": {"post": {
                "slides": [
                    {"displayImage": {"urlList": ["https://img.example/1.webp"]}},
                    {"displayImage": {"urlList": ["https://img.example/2.webp"]}},
                    {"displayImage": {"urlList": ["https://img.example/1.webp"]}}
                ]
            }}}
        });
        let html = format!(r#"<script id="__NEXT_DATA__" type="application/json">{}</script>"#, state);
        let post = parse_photo_post(&html).unwrap();
        assert_eq!(
            post.image_urls,
            vec!["https://img.example/1.webp".to_string(), "https://img.example/2.webp".to_string()]
        );
    }

    #[test]
    fn test_image_cap() {
        let urls: Vec<String> = (0..14).map(|i| format!("https://p16.example/{}.jpg", i)).collect();
        let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let post = parse_photo_post(&universal_page(&image_post(&refs))).unwrap();
        assert_eq!(post.image_urls.len(), MAX_PHOTO_IMAGES);
        assert_eq!(post.image_urls[0], "https://p16.example/0.jpg");
    }

    #[test]
    fn test_parse_failed() {
        assert!(matches!(
            parse_photo_post("<html><body>nothing here</body></html>"),
            Err(PhotoPostError::ParseFailed)
        ));
        // Present but not JSON
        assert!(matches!(
            parse_photo_post(r#"<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__">{broken</script>"#),
            Err(PhotoPostError::ParseFailed)
        ));
    }

    #[test]
    fn test_images_not_found() {
        let html = universal_page(&json!({"__DEFAULT_SCOPE__": {"webapp.user-detail": {"userInfo": {}}}}));
        let err = parse_photo_post(&html).unwrap_err();
        assert!(matches!(err, PhotoPostError::ImagesNotFound));
        assert_eq!(err.kind(), ErrorKind::PhotoImagesNotFound);
    }
}
