//! Template source fetching.
//!
//! A template reference is resolved against exactly one base: a source directory
//! on disk, or a base URL fetched over HTTP. [`Loader::from_options`] picks the
//! mode once (the base URL wins when both are configured), and the expander only
//! ever sees the [`TemplateLoader`] trait so tests can plug in an in-memory loader.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use tracing::debug;

use crate::config::ExpandOptions;
use crate::core::ExpandError;

/// Resolves a template reference to raw markup.
pub trait TemplateLoader {
    /// Fetch the markup for `reference`.
    ///
    /// # Errors
    ///
    /// [`ExpandError::NotFound`] when nothing exists at the resolved location,
    /// [`ExpandError::Io`] or [`ExpandError::Network`] when reading it failed.
    fn load(&self, reference: &str) -> impl Future<Output = Result<String, ExpandError>>;
}

/// Reads templates from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    src_dir: Option<PathBuf>,
}

impl FsLoader {
    pub const fn new(src_dir: Option<PathBuf>) -> Self {
        Self {
            src_dir,
        }
    }

    /// File location for `reference`: `src_dir/reference`, normalized, or the
    /// reference as-is when no source directory is configured.
    ///
    /// A leading separator on the reference does not escape `src_dir`.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        match &self.src_dir {
            Some(dir) => normalize_path(&PathBuf::from(format!("{}/{reference}", dir.display()))),
            None => PathBuf::from(reference),
        }
    }
}

impl TemplateLoader for FsLoader {
    async fn load(&self, reference: &str) -> Result<String, ExpandError> {
        let path = self.resolve(reference);
        let start = Instant::now();

        match tokio::fs::read_to_string(&path).await {
            Ok(body) => {
                debug!("Loaded {} in {:?}", path.display(), start.elapsed());
                Ok(body)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ExpandError::NotFound {
                reference: reference.to_string(),
                location: path.display().to_string(),
            }),
            Err(source) => Err(ExpandError::Io {
                reference: reference.to_string(),
                location: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Fetches templates over HTTP relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    base_url: String,
    client: reqwest::Client,
}

impl HttpLoader {
    /// # Errors
    ///
    /// Returns [`ExpandError::Config`] when the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExpandError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ngexpand/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExpandError::Config {
                message: format!("cannot create HTTP client: {e}"),
            })?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// `base_url/reference`, with one leading `/` of the reference dropped.
    pub fn url_for(&self, reference: &str) -> String {
        let reference = reference.strip_prefix('/').unwrap_or(reference);
        format!("{}/{reference}", self.base_url)
    }
}

impl TemplateLoader for HttpLoader {
    async fn load(&self, reference: &str) -> Result<String, ExpandError> {
        let url = self.url_for(reference);
        let start = Instant::now();

        let response = self.client.get(&url).send().await.map_err(|e| ExpandError::Network {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ExpandError::NotFound {
                reference: reference.to_string(),
                location: url,
            });
        }
        if !status.is_success() {
            return Err(ExpandError::Network {
                url,
                reason: format!("HTTP {status}"),
            });
        }

        let body = response.text().await.map_err(|e| ExpandError::Network {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        debug!("Fetched {url} in {:?}", start.elapsed());
        Ok(body)
    }
}

/// The loader selected by [`ExpandOptions`].
#[derive(Debug, Clone)]
pub enum Loader {
    Fs(FsLoader),
    Http(HttpLoader),
}

impl Loader {
    /// HTTP when `base_url` is set, the filesystem otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::Config`] when the HTTP client cannot be built.
    pub fn from_options(options: &ExpandOptions) -> Result<Self, ExpandError> {
        match &options.base_url {
            Some(base_url) => Ok(Self::Http(HttpLoader::new(base_url.clone())?)),
            None => Ok(Self::Fs(FsLoader::new(options.src_dir.clone()))),
        }
    }
}

impl TemplateLoader for Loader {
    async fn load(&self, reference: &str) -> Result<String, ExpandError> {
        match self {
            Self::Fs(loader) => loader.load(reference).await,
            Self::Http(loader) => loader.load(reference).await,
        }
    }
}

/// Lexically normalize `path`: drop `.`, resolve `..` against the preceding
/// component, and collapse repeated separators. Leading `..` of a relative path
/// is kept; `..` at the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    if components.is_empty() {
        return PathBuf::from(".");
    }
    components.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize_path(Path::new("/src//views/x.html")), PathBuf::from("/src/views/x.html"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_path(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_fs_resolution() {
        let loader = FsLoader::new(Some(PathBuf::from("/site/src")));
        assert_eq!(loader.resolve("views/a.html"), PathBuf::from("/site/src/views/a.html"));
        assert_eq!(loader.resolve("/views/a.html"), PathBuf::from("/site/src/views/a.html"));
        assert_eq!(loader.resolve("../shared/b.html"), PathBuf::from("/site/shared/b.html"));

        let bare = FsLoader::default();
        assert_eq!(bare.resolve("./a.html"), PathBuf::from("./a.html"));
    }

    #[test]
    fn test_url_resolution_strips_one_leading_slash() {
        let loader = HttpLoader::new("http://localhost:8080/app").unwrap();
        assert_eq!(loader.url_for("/views/a.html"), "http://localhost:8080/app/views/a.html");
        assert_eq!(loader.url_for("views/a.html"), "http://localhost:8080/app/views/a.html");
        assert_eq!(loader.url_for("//a.html"), "http://localhost:8080/app//a.html");
    }

    #[test]
    fn test_base_url_wins_over_src_dir() {
        let options = ExpandOptions::default()
            .with_src_dir("/site")
            .with_base_url("http://example.test");
        assert!(matches!(Loader::from_options(&options).unwrap(), Loader::Http(_)));

        let options = ExpandOptions::default().with_src_dir("/site");
        assert!(matches!(Loader::from_options(&options).unwrap(), Loader::Fs(_)));
    }

    #[tokio::test]
    async fn test_fs_load_and_not_found() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("main.html"), "<p>hi</p>").unwrap();
        let loader = FsLoader::new(Some(temp.path().to_path_buf()));

        assert_eq!(loader.load("main.html").await.unwrap(), "<p>hi</p>");

        let err = loader.load("missing.html").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("missing.html"));
    }

    #[tokio::test]
    async fn test_reading_a_directory_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("dir")).unwrap();
        let loader = FsLoader::new(Some(temp.path().to_path_buf()));

        let err = loader.load("dir").await.unwrap_err();
        assert!(matches!(err, ExpandError::Io { .. }));
    }
}
