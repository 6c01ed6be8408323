//! Rewrites embedded image references between the portable on-disk form
//! (`./<file>`) and a resolvable `file://` URL for display.

use crate::domain::Attachment;
use std::path::{Path, PathBuf};
use url::Url;

use super::markup::Document;

/// Prefix of a portable, directory-relative image reference.
pub const PORTABLE_PREFIX: &str = "./";

/// Image reference codec bound to one day directory.
#[derive(Debug, Clone)]
pub struct AssetCodec<'a> {
    dir: &'a Path,
}

/// Counts from one rewriting pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    /// The rewritten markup.
    pub markup: String,
    /// Image references rewritten.
    pub rewritten: usize,
    /// Local references that could not be resolved.
    pub unresolved: Vec<String>,
}

impl<'a> AssetCodec<'a> {
    pub fn new(dir: &'a Path) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        self.dir
    }

    /// Converts live markup to its portable form.
    ///
    /// For each image, in order of precedence:
    /// 1. a `data-filename` attribute becomes the `src` and is removed;
    /// 2. a `src` equal to a pending attachment's live reference or name
    ///    becomes `./<name>`;
    /// 3. a `file://` URL naming a file directly inside this directory
    ///    becomes `./<file>`.
    ///
    /// Other references (remote URLs, data URLs, files elsewhere) are left
    /// as they are.
    pub fn to_portable(&self, markup: &str, pending: &[Attachment]) -> String {
        self.rewrite_portable(markup, pending).markup
    }

    pub fn rewrite_portable(&self, markup: &str, pending: &[Attachment]) -> Rewrite {
        let mut doc = Document::parse(markup);
        let mut rewritten = 0;

        for img in doc.images_mut() {
            if let Some(filename) = img.remove_attr("data-filename") {
                img.set_src(&filename);
                rewritten += 1;
                continue;
            }

            let Some(src) = img.src() else { continue };
            if src.starts_with(PORTABLE_PREFIX) {
                continue;
            }

            let target = pending
                .iter()
                .find(|a| a.live_ref() == Some(src) || a.name() == src)
                .map(|a| a.name().to_string())
                .or_else(|| self.local_file_name(src));

            if let Some(name) = target {
                img.set_src(&format!("{}{}", PORTABLE_PREFIX, name));
                rewritten += 1;
            }
        }

        Rewrite {
            markup: doc.to_string(),
            rewritten,
            unresolved: Vec::new(),
        }
    }

    /// Converts portable markup to a form whose local images can be loaded.
    ///
    /// Each `./<file>` reference naming an existing file in this directory is
    /// replaced by a `file://` URL. Missing files are logged and left as
    /// broken references; they never fail the conversion.
    pub fn to_resolved(&self, markup: &str) -> String {
        self.rewrite_resolved(markup).markup
    }

    pub fn rewrite_resolved(&self, markup: &str) -> Rewrite {
        let mut doc = Document::parse(markup);
        let mut rewritten = 0;
        let mut unresolved = Vec::new();

        for img in doc.images_mut() {
            let Some(src) = img.src() else { continue };
            let Some(name) = src.strip_prefix(PORTABLE_PREFIX) else {
                continue;
            };

            let path = match portable_name(name) {
                Some(name) => self.dir.join(name),
                None => {
                    log::warn!("refusing to resolve image outside note directory: {}", src);
                    unresolved.push(src.to_string());
                    continue;
                }
            };

            if !path.is_file() {
                log::warn!("failed to resolve image {} in {}", src, self.dir.display());
                unresolved.push(src.to_string());
                continue;
            }
            if let Some(url) = file_url(&path) {
                img.set_src(&url);
                rewritten += 1;
            } else {
                log::warn!("cannot build a file URL for {}", path.display());
                unresolved.push(src.to_string());
            }
        }

        Rewrite {
            markup: doc.to_string(),
            rewritten,
            unresolved,
        }
    }

    /// Returns the file name if `src` is a file URL for a file directly
    /// inside this directory.
    fn local_file_name(&self, src: &str) -> Option<String> {
        let path = path_from_file_url(src)?;
        if path.parent()? != self.dir {
            return None;
        }
        let name = path.file_name()?.to_str()?;
        portable_name(name).map(str::to_string)
    }
}

/// Returns `name` if it is a plain file name: one path component, not `.`
/// or `..`.
pub fn portable_name(name: &str) -> Option<&str> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0');
    valid.then_some(name)
}

/// Builds a `file://` URL for an absolute path; `None` for a relative one.
pub fn file_url(path: &Path) -> Option<String> {
    Url::from_file_path(path).ok().map(|url| url.to_string())
}

/// Parses a `file://` URL back to a local path; `None` for any other
/// reference, including URLs naming a remote host.
pub fn path_from_file_url(src: &str) -> Option<PathBuf> {
    let url = Url::parse(src).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn day_dir() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().canonicalize().unwrap().join("2024").join("3").join("5");
        fs::create_dir_all(&dir).unwrap();
        (tmp, dir)
    }

    // ===========================================
    // to_portable
    // ===========================================

    #[test]
    fn to_portable_rewrites_pending_attachment_by_live_ref() {
        let (_tmp, dir) = day_dir();
        let codec = AssetCodec::new(&dir);
        let pending = [Attachment::new("img_1_photo.jpg", vec![]).with_live_ref("blob:abc")];

        let out = codec.to_portable(r#"<p>Hi</p><img src="blob:abc">"#, &pending);

        assert_eq!(out, r#"<p>Hi</p><img src="./img_1_photo.jpg">"#);
    }

    #[test]
    fn to_portable_prefers_data_filename() {
        let (_tmp, dir) = day_dir();
        let codec = AssetCodec::new(&dir);

        let out = codec.to_portable(r#"<img src="blob:x" data-filename="./a.png">"#, &[]);

        assert_eq!(out, r#"<img src="./a.png">"#);
    }

    #[test]
    fn to_portable_reverses_resolved_reference_from_same_directory() {
        let (_tmp, dir) = day_dir();
        fs::write(dir.join("old photo.png"), b"png").unwrap();
        let codec = AssetCodec::new(&dir);
        let resolved = codec.to_resolved(r#"<img src="./old photo.png">"#);

        let out = codec.to_portable(&resolved, &[]);

        assert_eq!(out, r#"<img src="./old photo.png">"#);
    }

    #[test]
    fn to_portable_keeps_file_url_from_other_directory() {
        let (_tmp, dir) = day_dir();
        let codec = AssetCodec::new(&dir);
        let other = dir.parent().unwrap().join("6").join("x.png");
        let markup = format!(r#"<img src="{}">"#, file_url(&other).unwrap());

        assert_eq!(codec.to_portable(&markup, &[]), markup);
    }

    #[test]
    fn to_portable_leaves_remote_and_data_urls() {
        let (_tmp, dir) = day_dir();
        let codec = AssetCodec::new(&dir);
        let markup = r#"<img src="https://example.com/a.png"><img src="data:image/png;base64,AAAA">"#;

        let rewrite = codec.rewrite_portable(markup, &[]);

        assert_eq!(rewrite.markup, markup);
        assert_eq!(rewrite.rewritten, 0);
    }

    #[test]
    fn to_portable_is_idempotent() {
        let (_tmp, dir) = day_dir();
        let codec = AssetCodec::new(&dir);
        let pending = [Attachment::new("a.png", vec![]).with_live_ref("/home/me/a.png")];
        let once = codec.to_portable(r#"<img src="/home/me/a.png"><p>x</p>"#, &pending);
        let twice = codec.to_portable(&once, &pending);
        assert_eq!(once, twice);
    }

    // ===========================================
    // to_resolved
    // ===========================================

    #[test]
    fn to_resolved_rewrites_existing_file_to_url() {
        let (_tmp, dir) = day_dir();
        fs::write(dir.join("photo.jpg"), b"jpg").unwrap();
        let codec = AssetCodec::new(&dir);

        let rewrite = codec.rewrite_resolved(r#"<p>x</p><img src="./photo.jpg">"#);

        let expected = format!(r#"<p>x</p><img src="{}">"#, file_url(&dir.join("photo.jpg")).unwrap());
        assert_eq!(rewrite.markup, expected);
        assert_eq!(rewrite.rewritten, 1);
        assert!(rewrite.unresolved.is_empty());
    }

    #[test]
    fn to_resolved_leaves_missing_file_broken() {
        let (_tmp, dir) = day_dir();
        let codec = AssetCodec::new(&dir);
        let markup = r#"<img src="./gone.png"><img src="https://x/y.png">"#;

        let rewrite = codec.rewrite_resolved(markup);

        assert_eq!(rewrite.markup, markup);
        assert_eq!(rewrite.unresolved, vec!["./gone.png".to_string()]);
    }

    #[test]
    fn to_resolved_refuses_path_traversal() {
        let (_tmp, dir) = day_dir();
        fs::write(dir.parent().unwrap().join("secret.png"), b"x").unwrap();
        let codec = AssetCodec::new(&dir);

        let rewrite = codec.rewrite_resolved(r#"<img src="./../secret.png">"#);

        assert_eq!(rewrite.rewritten, 0);
        assert_eq!(rewrite.unresolved.len(), 1);
    }

    #[test]
    fn to_resolved_does_not_mutate_input() {
        let (_tmp, dir) = day_dir();
        fs::write(dir.join("a.png"), b"x").unwrap();
        let codec = AssetCodec::new(&dir);
        let input = String::from(r#"<img src="./a.png">"#);

        let out = codec.to_resolved(&input);

        assert_ne!(out, input);
        assert_eq!(input, r#"<img src="./a.png">"#);
    }

    // ===========================================
    // file URLs
    // ===========================================

    #[test]
    fn file_url_percent_encodes_special_bytes() {
        let url = file_url(Path::new("/j/2024/3/5/my photo#1.png")).unwrap();
        assert_eq!(url, "file:///j/2024/3/5/my%20photo%231.png");
    }

    #[test]
    fn path_from_file_url_reverses_file_url() {
        let path = Path::new("/j/2024/3/5/ünïcode photo.png");
        assert_eq!(path_from_file_url(&file_url(path).unwrap()).unwrap(), path);
    }

    #[test]
    fn file_url_requires_absolute_path() {
        assert!(file_url(Path::new("j/a.png")).is_none());
    }

    #[test]
    fn path_from_file_url_rejects_remote_host() {
        assert!(path_from_file_url("file://host/j/a.png").is_none());
    }

    #[test]
    fn path_from_file_url_drops_query_and_fragment() {
        assert_eq!(
            path_from_file_url("file:///j/a.png?x=1#frag").unwrap(),
            Path::new("/j/a.png")
        );
    }

    #[test]
    fn path_from_file_url_keeps_invalid_escape_literal() {
        let path = path_from_file_url("file:///j/a%+1b.png").unwrap();
        assert!(!path.to_string_lossy().contains('\u{1}'));
        assert!(path.ends_with("a%+1b.png"));
    }

    #[test]
    fn path_from_file_url_rejects_other_schemes() {
        assert!(path_from_file_url("https://example.com/a.png").is_none());
        assert!(path_from_file_url("./a.png").is_none());
    }

    #[test]
    fn portable_name_rejects_separators_and_dots() {
        assert_eq!(portable_name("a.png"), Some("a.png"));
        assert!(portable_name("").is_none());
        assert!(portable_name("..").is_none());
        assert!(portable_name("a/b.png").is_none());
        assert!(portable_name("a\\b.png").is_none());
    }
}
