//! Minimal HTTP/1.1 POST client.
//!
//! Speaks plain HTTP over `std::net::TcpStream` and HTTPS through rustls with
//! Mozilla's root store. One request per connection (`Connection: close`).

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use rustls::ClientConfig;
use rustls::pki_types::ServerName;

use crate::errors::HttpError;

/// Maximum response body size (8 MB).
const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP read timeout. Text generation can take a while.
const READ_TIMEOUT: Duration = Duration::from_secs(60);

type Result<T> = std::result::Result<T, HttpError>;

/// An absolute `http` or `https` URL split into the parts a request needs.
///
/// IPv6 literals and userinfo are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
}

impl Url {
    pub fn parse(s: &str) -> Option<Url> {
        let (scheme, rest) = s.split_once("://")?;
        let scheme = scheme.to_ascii_lowercase();

        let split = rest.find(|c: char| c == '/' || c == '?').unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(split);
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port.parse().ok()?)),
            None => (authority, None),
        };
        if host.is_empty() {
            return None;
        }

        let (path, query) = match tail.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (tail, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        Some(Url {
            scheme,
            host: host.to_string(),
            port,
            path: path.to_string(),
            query,
        })
    }

    fn is_https(&self) -> bool {
        self.scheme == "https"
    }

    fn default_port(&self) -> u16 {
        if self.is_https() { 443 } else { 80 }
    }

    fn effective_port(&self) -> u16 {
        self.port.unwrap_or(self.default_port())
    }

    fn request_target(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    fn host_header(&self) -> String {
        match self.port {
            Some(p) if p != self.default_port() => format!("{}:{}", self.host, p),
            _ => self.host.clone(),
        }
    }
}

/// A raw parsed HTTP response.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code (e.g. 200, 404).
    pub status_code: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Send `body` to `url` with a POST request and read the whole response.
pub fn http_post(url: &Url, content_type: &str, body: &[u8]) -> Result<HttpResponse> {
    if url.scheme != "http" && url.scheme != "https" {
        return Err(HttpError::UnsupportedScheme(url.scheme.clone()));
    }

    let stream = tcp_connect(&url.host, url.effective_port())?;
    let raw = if url.is_https() {
        let sni = ServerName::try_from(url.host.clone())
            .map_err(|e| HttpError::Tls(format!("invalid server name: {e}")))?;
        let conn = rustls::ClientConnection::new(tls_config(), sni)
            .map_err(|e| HttpError::Tls(e.to_string()))?;
        let mut tls = rustls::StreamOwned::new(conn, stream);
        send_request(&mut tls, url, content_type, body)?;
        read_response(&mut tls)?
    } else {
        let mut stream = stream;
        send_request(&mut stream, url, content_type, body)?;
        read_response(&mut stream)?
    };
    parse_response(&raw)
}

/// Shared TLS client configuration trusting Mozilla's root CA bundle.
fn tls_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            let root_store =
                rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            let config = ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();
            Arc::new(config)
        })
        .clone()
}

/// Open a TCP connection with connect and read timeouts.
fn tcp_connect(host: &str, port: u16) -> Result<TcpStream> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|_| HttpError::Resolve(format!("{host}:{port}")))?
        .next()
        .ok_or_else(|| HttpError::Resolve(format!("{host}:{port}")))?;

    let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(HttpError::Connect)?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    log::debug!("connected to {host}:{port}");
    Ok(stream)
}

fn send_request(stream: &mut impl Write, url: &Url, content_type: &str, body: &[u8]) -> Result<()> {
    let head = format!(
        "POST {target} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: kaiven/{version}\r\n\
         Accept: application/json\r\n\
         Content-Type: {content_type}\r\n\
         Content-Length: {length}\r\n\
         Connection: close\r\n\
         \r\n",
        target = url.request_target(),
        host = url.host_header(),
        version = env!("CARGO_PKG_VERSION"),
        length = body.len(),
    );
    stream.write_all(head.as_bytes())?;
    stream.write_all(body)?;
    stream.flush()?;
    Ok(())
}

/// Read the entire response until the peer closes the connection.
fn read_response(stream: &mut impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() + n > MAX_BODY_SIZE + 4096 {
                    return Err(HttpError::TooLarge);
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // Servers often close TLS connections without close_notify.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && !buf.is_empty() => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(buf)
}

/// Parse raw bytes into status code and body.
pub fn parse_response(data: &[u8]) -> Result<HttpResponse> {
    let header_end =
        find_subsequence(data, b"\r\n\r\n").ok_or(HttpError::Malformed("no header terminator"))?;

    let header_str = std::str::from_utf8(&data[..header_end])
        .map_err(|_| HttpError::Malformed("non-UTF-8 headers"))?;
    let mut lines = header_str.split("\r\n");

    let status_line = lines.next().ok_or(HttpError::Malformed("empty response"))?;
    let status_code = parse_status_line(status_line)?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let raw_body = &data[header_end + 4..];
    let body = if find_header(&headers, "transfer-encoding").is_some_and(|v| v.contains("chunked"))
    {
        decode_chunked(raw_body)?
    } else if let Some(cl) = find_header(&headers, "content-length") {
        let len: usize = cl
            .parse()
            .map_err(|_| HttpError::Malformed("bad Content-Length"))?;
        if len > MAX_BODY_SIZE {
            return Err(HttpError::TooLarge);
        }
        raw_body[..raw_body.len().min(len)].to_vec()
    } else {
        raw_body.to_vec()
    };

    if body.len() > MAX_BODY_SIZE {
        return Err(HttpError::TooLarge);
    }

    Ok(HttpResponse { status_code, body })
}

/// Parse the HTTP status code from a line like `HTTP/1.1 200 OK`.
fn parse_status_line(line: &str) -> Result<u16> {
    let mut parts = line.splitn(3, ' ');
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse()
            .map_err(|_| HttpError::Malformed("bad status code")),
        _ => Err(HttpError::Malformed("bad status line")),
    }
}

/// Case-insensitive header lookup.
fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let name = name.to_ascii_lowercase();
    headers
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.as_str())
}

/// Decode a chunked transfer-encoded body.
fn decode_chunked(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut pos = 0;

    while let Some(i) = find_subsequence(&data[pos..], b"\r\n") {
        let line_end = pos + i;
        let size_line = std::str::from_utf8(&data[pos..line_end])
            .map_err(|_| HttpError::Malformed("bad chunk size"))?;
        // Chunk extensions follow a `;`.
        let size_str = size_line.split(';').next().unwrap_or("").trim();
        let chunk_size = usize::from_str_radix(size_str, 16)
            .map_err(|_| HttpError::Malformed("bad chunk size"))?;

        if chunk_size == 0 {
            break;
        }

        if chunk_size > MAX_BODY_SIZE - result.len() {
            return Err(HttpError::TooLarge);
        }
        let chunk_start = line_end + 2;
        let chunk_end = chunk_start
            .checked_add(chunk_size)
            .ok_or(HttpError::Malformed("bad chunk size"))?;
        if chunk_end > data.len() {
            return Err(HttpError::Malformed("truncated chunk"));
        }

        result.extend_from_slice(&data[chunk_start..chunk_end]);
        pos = (chunk_end + 2).min(data.len());
    }

    Ok(result)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn url_parse_full() {
        let url = Url::parse("https://example.com:8443/v1/models/m:gen?key=abc").unwrap();
        assert_eq!(url.scheme, "https");
        assert_eq!(url.host, "example.com");
        assert_eq!(url.port, Some(8443));
        assert_eq!(url.path, "/v1/models/m:gen");
        assert_eq!(url.query.as_deref(), Some("key=abc"));
        assert_eq!(url.host_header(), "example.com:8443");
    }

    #[test]
    fn url_parse_defaults() {
        let url = Url::parse("HTTP://127.0.0.1").unwrap();
        assert_eq!(url.scheme, "http");
        assert_eq!(url.path, "/");
        assert_eq!(url.effective_port(), 80);
        assert_eq!(url.host_header(), "127.0.0.1");
        assert_eq!(url.request_target(), "/");
    }

    #[test]
    fn url_parse_rejects_garbage() {
        assert!(Url::parse("no scheme here").is_none());
        assert!(Url::parse("http://").is_none());
        assert!(Url::parse("http://host:notaport/").is_none());
    }

    #[test]
    fn parse_simple_response() {
        let raw = b"HTTP/1.1 200 OK\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: 2\r\n\
                     \r\n\
                     {}trailing";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.status_code, 200);
        assert!(resp.is_success());
        assert_eq!(resp.body, b"{}");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let headers = vec![("content-type".to_string(), "application/json".to_string())];
        assert_eq!(find_header(&headers, "Content-Type"), Some("application/json"));
        assert_eq!(find_header(&headers, "content-length"), None);
    }

    #[test]
    fn huge_chunk_size_is_rejected_without_overflow() {
        let raw = b"HTTP/1.1 200 OK\r\n\
                     Transfer-Encoding: chunked\r\n\
                     \r\n\
                     ffffffffffffffff\r\nab\r\n0\r\n\r\n";
        let err = parse_response(raw).unwrap_err();
        assert!(matches!(err, HttpError::TooLarge));
    }

    #[test]
    fn chunks_past_the_body_limit_are_rejected() {
        let raw = format!(
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n{:x}\r\nab\r\n0\r\n\r\n",
            MAX_BODY_SIZE + 1
        );
        let err = parse_response(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, HttpError::TooLarge));
    }

    #[test]
    fn parse_chunked_response() {
        let raw = b"HTTP/1.1 200 OK\r\n\
                     Transfer-Encoding: chunked\r\n\
                     \r\n\
                     5\r\nhello\r\n6;ext=1\r\n world\r\n0\r\n\r\n";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.body, b"hello world");
    }

    #[test]
    fn parse_error_status() {
        let raw = b"HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\n\r\n";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.status_code, 403);
        assert!(!resp.is_success());
    }

    #[test]
    fn malformed_responses_are_errors() {
        assert!(parse_response(b"garbage").is_err());
        assert!(parse_response(b"garbage\r\n\r\n").is_err());
        assert!(parse_response(b"HTTP/1.1 abc OK\r\n\r\n").is_err());
        let truncated = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nff\r\nshort";
        assert!(parse_response(truncated).is_err());
    }

    #[test]
    fn oversized_content_length_rejected() {
        let raw = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n",
            MAX_BODY_SIZE + 1
        );
        let err = parse_response(raw.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("8 MB"));
    }

    #[test]
    fn unsupported_scheme_rejected() {
        let url = Url::parse("ftp://example.com/file").unwrap();
        let err = http_post(&url, "text/plain", b"").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn post_round_trip_over_plain_http() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            // Read until the 5-byte body has arrived after the header block.
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let done = find_subsequence(&request, b"\r\n\r\n")
                    .is_some_and(|end| request.len() >= end + 4 + 5);
                if done {
                    break;
                }
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\npong")
                .unwrap();
            String::from_utf8(request).unwrap()
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/echo?x=1")).unwrap();
        let resp = http_post(&url, "text/plain", b"hello").unwrap();
        let request = handle.join().unwrap();

        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, b"pong");
        assert!(request.starts_with("POST /echo?x=1 HTTP/1.1\r\n"));
        assert!(request.contains(&format!("Host: 127.0.0.1:{port}\r\n")));
        assert!(request.contains("Content-Length: 5\r\n"));
        assert!(request.ends_with("\r\n\r\nhello"));
    }
}
