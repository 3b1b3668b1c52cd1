//! Opening connections to resources.

use super::ResourceLocator;
use crate::{Error, Result};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use reqwest::StatusCode;
use url::Url;
use zip::ZipArchive;

/// A readable stream on a resource, closed when dropped.
pub type ResourceStream = Box<dyn Read + Send>;

/// HTTP client timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

/// Builds a blocking HTTP client with the given timeouts.
pub fn build_http_client(settings: HttpSettings) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if settings.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(settings.timeout_ms));
    }
    if settings.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(settings.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// Where a locator's bytes live.
enum Target {
    File(PathBuf),
    Archive { archive: PathBuf, entry: String },
    Remote,
}

/// Opens connections and byte streams on resource locators.
///
/// The HTTP client is only built when the first remote locator is seen.
#[derive(Debug, Default)]
pub struct ResourceConnector {
    http: HttpSettings,
    client: OnceLock<reqwest::blocking::Client>,
}

impl ResourceConnector {
    /// Creates a connector with default HTTP timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP timeouts used for remote resources.
    #[must_use]
    pub fn with_http_settings(mut self, settings: HttpSettings) -> Self {
        self.http = settings;
        self.client = OnceLock::new();
        self
    }

    fn client(&self) -> &reqwest::blocking::Client {
        self.client.get_or_init(|| build_http_client(self.http))
    }

    /// Checks that the resource can be reached without reading its content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file, archive entry or remote
    /// resource does not exist, or [`Error::UnsupportedScheme`] for locators
    /// that cannot be opened.
    pub fn probe(&self, locator: &ResourceLocator) -> Result<()> {
        match target(locator)? {
            Target::File(path) => probe_file(locator, &path),
            Target::Archive { archive, entry } => {
                probe_file(locator, &archive)?;
                let mut zip = open_archive(locator, &archive)?;
                let found = zip.by_name(&entry).map(|_| ());
                found.map_err(|e| not_found(locator, format!("archive entry '{entry}': {e}")))
            },
            Target::Remote => self.probe_remote(locator),
        }
    }

    /// `HEAD` must succeed; servers that do not implement it are asked with
    /// a `GET` whose body is dropped unread.
    fn probe_remote(&self, locator: &ResourceLocator) -> Result<()> {
        let response = self
            .client()
            .head(locator.url().clone())
            .send()
            .map_err(|e| not_found(locator, e))?;
        let mut status = response.status();

        if matches!(
            status,
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            tracing::debug!(resource = %locator, %status, "HEAD rejected, probing with GET");
            status = self
                .client()
                .get(locator.url().clone())
                .send()
                .map_err(|e| not_found(locator, e))?
                .status();
        }

        if status.is_success() {
            Ok(())
        } else {
            Err(not_found(locator, format!("status {status}")))
        }
    }

    /// Opens a byte stream on the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be opened or, for archive
    /// entries, read.
    pub fn open_stream(&self, locator: &ResourceLocator) -> Result<ResourceStream> {
        match target(locator)? {
            Target::File(path) => {
                let file = File::open(&path).map_err(|e| {
                    Error::operation("open_resource", format!("{}: {e}", path.display()))
                })?;
                Ok(Box::new(BufReader::new(file)))
            },
            Target::Archive { archive, entry } => {
                let mut zip = open_archive(locator, &archive)?;
                let mut file = zip
                    .by_name(&entry)
                    .map_err(|e| not_found(locator, format!("archive entry '{entry}': {e}")))?;
                let mut bytes = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
                file.read_to_end(&mut bytes)
                    .map_err(|e| Error::operation("read_archive_entry", e))?;
                Ok(Box::new(Cursor::new(bytes)))
            },
            Target::Remote => {
                let response = self
                    .client()
                    .get(locator.url().clone())
                    .send()
                    .map_err(|e| Error::operation("fetch_resource", e))?;
                if !response.status().is_success() {
                    return Err(Error::operation(
                        "fetch_resource",
                        format!("{locator} returned status {}", response.status()),
                    ));
                }
                Ok(Box::new(response))
            },
        }
    }

    /// Reads the whole resource as text.
    ///
    /// Bytes are decoded as UTF-8; invalid sequences are replaced rather than
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be opened or read.
    pub fn read_text(&self, locator: &ResourceLocator) -> Result<String> {
        let mut stream = self.open_stream(locator)?;
        let mut bytes = Vec::new();
        stream
            .read_to_end(&mut bytes)
            .map_err(|e| Error::operation("read_resource", e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn target(locator: &ResourceLocator) -> Result<Target> {
    match locator.scheme() {
        "file" => local_path(locator, locator.url()).map(Target::File),
        "jar" | "zip" => {
            let (Some(location), Some(entry)) = (locator.archive_location(), locator.archive_entry())
            else {
                return Err(not_found(locator, "missing '!/' archive entry separator"));
            };
            let archive_url = Url::parse(location).map_err(|e| not_found(locator, e))?;
            if archive_url.scheme() != "file" {
                return Err(Error::UnsupportedScheme(format!(
                    "{} archives",
                    archive_url.scheme()
                )));
            }
            let archive = local_path(locator, &archive_url)?;
            let entry = urlencoding::decode(entry)
                .map(Cow::into_owned)
                .map_err(|e| Error::InvalidInput(format!("archive entry '{entry}': {e}")))?;
            Ok(Target::Archive { archive, entry })
        },
        "http" | "https" => Ok(Target::Remote),
        other => Err(Error::UnsupportedScheme(other.to_string())),
    }
}

fn local_path(locator: &ResourceLocator, url: &Url) -> Result<PathBuf> {
    url.to_file_path()
        .map_err(|()| not_found(locator, "not a local file path"))
}

fn probe_file(locator: &ResourceLocator, path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| not_found(locator, e))?;
    if metadata.is_file() {
        Ok(())
    } else {
        Err(not_found(locator, format!("{} is not a file", path.display())))
    }
}

fn open_archive(locator: &ResourceLocator, path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| not_found(locator, e))?;
    ZipArchive::new(BufReader::new(file))
        .map_err(|e| Error::operation("open_archive", format!("{}: {e}", path.display())))
}

fn not_found(locator: &ResourceLocator, cause: impl std::fmt::Display) -> Error {
    Error::NotFound {
        resource: locator.to_string(),
        cause: cause.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_jar(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
        let path = dir.join("resources.jar");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    fn jar_locator(jar: &Path, entry: &str) -> ResourceLocator {
        let base = ResourceLocator::from_path(jar).unwrap();
        ResourceLocator::parse(&format!("jar:{base}!/{entry}")).unwrap()
    }

    #[test]
    fn test_probe_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anotherfile.content");
        std::fs::write(&path, "id:page\n").unwrap();

        let connector = ResourceConnector::new();
        let locator = ResourceLocator::from_path(&path).unwrap();
        assert!(connector.probe(&locator).is_ok());
    }

    #[test]
    fn test_probe_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ResourceLocator::from_path(&dir.path().join("missing.xml")).unwrap();

        let err = ResourceConnector::new().probe(&locator).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_probe_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ResourceLocator::from_path(dir.path()).unwrap();

        let err = ResourceConnector::new().probe(&locator).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_probe_file_url_with_host() {
        let locator = ResourceLocator::parse("file://this-file-does-not-exist.content").unwrap();
        assert!(ResourceConnector::new().probe(&locator).is_err());
    }

    #[test]
    fn test_probe_archive_entry() {
        let dir = tempfile::tempdir().unwrap();
        let jar = write_jar(dir.path(), &[("afile.content", "id:a\n")]);

        let connector = ResourceConnector::new();
        assert!(connector.probe(&jar_locator(&jar, "afile.content")).is_ok());

        let err = connector
            .probe(&jar_locator(&jar, "missing.content"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_read_text_from_archive_entry() {
        let dir = tempfile::tempdir().unwrap();
        let jar = write_jar(
            dir.path(),
            &[("afile.xml", "<batch/>"), ("nested/dir/b.xml", "<b/>")],
        );

        let connector = ResourceConnector::new();
        assert_eq!(
            connector.read_text(&jar_locator(&jar, "afile.xml")).unwrap(),
            "<batch/>"
        );
        assert_eq!(
            connector
                .read_text(&jar_locator(&jar, "nested/dir/b.xml"))
                .unwrap(),
            "<b/>"
        );
    }

    #[test]
    fn test_read_text_is_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.xml");
        std::fs::write(&path, b"<a>caf\xe9</a>").unwrap();

        let text = ResourceConnector::new()
            .read_text(&ResourceLocator::from_path(&path).unwrap())
            .unwrap();
        assert_eq!(text, "<a>caf\u{fffd}</a>");
    }

    #[test]
    fn test_unsupported_scheme() {
        let locator = ResourceLocator::parse("ftp://example.com/a.xml").unwrap();
        let err = ResourceConnector::new().probe(&locator).unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme(_)));
    }

    #[test]
    fn test_archive_without_separator() {
        let locator = ResourceLocator::parse("jar:file:///tmp/a.jar").unwrap();
        let err = ResourceConnector::new().probe(&locator).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    /// Answers each request with the status chosen for its method, then closes.
    fn serve_by_method(
        requests: usize,
        respond: fn(&str) -> (&'static str, &'static str),
    ) -> (String, std::thread::JoinHandle<Vec<String>>) {
        use std::io::{BufRead, BufReader};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let mut methods = Vec::new();
            for _ in 0..requests {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                }
                let method = request_line
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let (status, body) = respond(&method);
                write!(
                    stream,
                    "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    if method == "HEAD" { 0 } else { body.len() }
                )
                .unwrap();
                methods.push(method);
            }
            methods
        });

        (base, handle)
    }

    #[test]
    fn test_probe_falls_back_to_get_when_head_is_rejected() {
        let (base, server) = serve_by_method(2, |method| match method {
            "HEAD" => ("405 Method Not Allowed", ""),
            _ => ("200 OK", "<batch/>"),
        });
        let locator = ResourceLocator::parse(&format!("{base}/export/site.xml")).unwrap();

        ResourceConnector::new().probe(&locator).unwrap();

        assert_eq!(server.join().unwrap(), vec!["HEAD", "GET"]);
    }

    #[test]
    fn test_probe_remote_missing() {
        let (base, server) = serve_by_method(1, |_| ("404 Not Found", ""));
        let locator = ResourceLocator::parse(&format!("{base}/export/gone.xml")).unwrap();

        let err = ResourceConnector::new().probe(&locator).unwrap_err();

        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(server.join().unwrap(), vec!["HEAD"]);
    }
}
