//! The single-client request dispatcher.
//!
//! [`WebGui::process_pending`] is called from the application's main loop.
//! Each call serves at most one client from start to finish:
//!
//! 1. read the request line byte by byte
//! 2. drain the headers up to the blank line
//! 3. answer a page, set-value or get-values request
//! 4. close the connection
//!
//! A stalled client blocks the caller until the transport's read timeout
//! fires. Widget changes made by a set-value request are visible to the
//! caller as soon as the call returns.

use std::io::{self, Read};
use std::net::SocketAddr;

use thiserror::Error;
use tracing::{debug, info, warn};

use webgui_core::{ChunkedWriter, ControlPanel, RenderMode};
use webgui_protocol::response::{write_head, write_response};
use webgui_protocol::{apply_set_query, complete_pairs, ContentType, RequestKind, RequestReader, SetOutcome, ValuesSnapshot, SET_OK_BODY};

use crate::config::ServerConfig;
use crate::transport::{Connection, TcpTransport, Transport};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode values: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What one call to [`WebGui::process_pending`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Page,
    SetValues(SetOutcome),
    GetValues,
    /// The client went away or timed out before finishing its request.
    Abandoned,
}

/// Control panel served over a [`Transport`].
pub struct WebGui<T> {
    panel: ControlPanel,
    transport: T,
    config: ServerConfig,
}

impl WebGui<TcpTransport> {
    /// Bind a TCP listener at `config.bind_addr`.
    pub fn bind(panel: ControlPanel, config: ServerConfig) -> Result<Self, ServerError> {
        let transport = TcpTransport::bind(config.bind_addr, config.read_timeout)?;
        info!("WebGUI listening on {}", transport.local_addr()?);
        Ok(Self::new(panel, transport, config))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.transport.local_addr()?)
    }
}

impl<T: Transport> WebGui<T> {
    pub fn new(panel: ControlPanel, transport: T, config: ServerConfig) -> Self {
        Self {
            panel,
            transport,
            config,
        }
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn into_panel(self) -> ControlPanel {
        self.panel
    }

    /// Serve at most one waiting client. Returns `None` when nobody was
    /// waiting.
    pub fn process_pending(&mut self) -> Result<Option<Handled>, ServerError> {
        let Some(mut conn) = self.transport.accept_pending()? else {
            return Ok(None);
        };

        let result = self.handle_connection(&mut conn);
        if let Err(e) = conn.close() {
            debug!("Error closing connection: {}", e);
        }
        result.map(Some)
    }

    /// Read one request from `conn` and answer it. The caller closes the
    /// connection.
    pub fn handle_connection<C: Connection>(&mut self, conn: &mut C) -> Result<Handled, ServerError> {
        let mut reader = RequestReader::new(self.config.max_request_line);
        let mut byte = [0u8; 1];

        let request = loop {
            match conn.read(&mut byte) {
                Ok(0) => {
                    debug!("Client closed before end of headers");
                    return Ok(Handled::Abandoned);
                }
                Ok(_) => {
                    if let Some(request) = reader.push(byte[0]) {
                        break request;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    debug!("Client timed out before end of headers");
                    return Ok(Handled::Abandoned);
                }
                Err(e) => return Err(e.into()),
            }
        };

        if reader.was_truncated() {
            debug!("Request line truncated to {} bytes", self.config.max_request_line);
        }
        // No version after the target means the cap fell inside the target.
        let target_cut =
            reader.was_truncated() && matches!(&request, Ok(line) if line.version.is_none());

        let kind = match &request {
            Ok(line) => {
                debug!("{} {}", line.method, line.target);
                line.kind()
            }
            Err(e) => {
                warn!("Serving page for unreadable request: {}", e);
                RequestKind::Page
            }
        };

        match kind {
            RequestKind::Page => {
                self.write_page(conn)?;
                Ok(Handled::Page)
            }
            RequestKind::SetValues(query) => {
                let query = if target_cut {
                    debug!("Dropping last parameter of truncated request");
                    complete_pairs(query)
                } else {
                    query
                };
                let outcome = apply_set_query(self.panel.registry_mut(), query);
                if outcome.ignored > 0 {
                    debug!("Ignored {} unknown parameters", outcome.ignored);
                }
                write_response(conn, ContentType::PlainText, SET_OK_BODY)?;
                Ok(Handled::SetValues(outcome))
            }
            RequestKind::GetValues => {
                let json = ValuesSnapshot::new(self.panel.registry()).to_json()?;
                write_response(conn, ContentType::Json, &json)?;
                Ok(Handled::GetValues)
            }
        }
    }

    fn write_page<C: Connection>(&self, conn: &mut C) -> Result<(), ServerError> {
        match self.config.render_mode {
            RenderMode::Streaming => {
                write_head(conn, ContentType::Html, None)?;
                let mut out = ChunkedWriter::new(&mut *conn, self.config.max_chunk);
                self.panel.stream_page(&mut out)?;
                debug!("Streamed {} byte page", out.written());
            }
            RenderMode::Buffered => {
                let html = self.panel.render_page();
                write_response(conn, ContentType::Html, &html)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    /// In-memory client: scripted request bytes in, response bytes out.
    struct MemoryConnection {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        largest_write: usize,
    }

    impl MemoryConnection {
        fn new(request: &str) -> Self {
            Self {
                input: Cursor::new(request.as_bytes().to_vec()),
                output: Vec::new(),
                largest_write: 0,
            }
        }

        fn response(&self) -> String {
            String::from_utf8(self.output.clone()).unwrap()
        }

        fn body(&self) -> String {
            let response = self.response();
            let (_, body) = response.split_once("\r\n\r\n").unwrap();
            body.to_string()
        }
    }

    impl Read for MemoryConnection {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MemoryConnection {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.largest_write = self.largest_write.max(buf.len());
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Connection for MemoryConnection {
        fn close(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Transport with nobody waiting.
    struct IdleTransport;

    impl Transport for IdleTransport {
        type Conn = MemoryConnection;

        fn accept_pending(&mut self) -> io::Result<Option<MemoryConnection>> {
            Ok(None)
        }
    }

    fn gui(render_mode: RenderMode) -> WebGui<IdleTransport> {
        let mut panel = ControlPanel::new();
        panel.add_button("Start");
        panel.add_slider("Speed", 0, 100, 50);
        panel.add_sensor_status("Temperature");
        let config = ServerConfig {
            render_mode,
            max_chunk: 128,
            ..Default::default()
        };
        WebGui::new(panel, IdleTransport, config)
    }

    fn serve(gui: &mut WebGui<IdleTransport>, request: &str) -> (Handled, MemoryConnection) {
        let mut conn = MemoryConnection::new(request);
        let handled = gui.handle_connection(&mut conn).unwrap();
        (handled, conn)
    }

    #[test]
    fn test_nothing_pending() {
        let mut gui = gui(RenderMode::Streaming);
        assert_eq!(gui.process_pending().unwrap(), None);
    }

    #[test]
    fn test_streamed_page() {
        let mut gui = gui(RenderMode::Streaming);
        let (handled, conn) = serve(&mut gui, "GET / HTTP/1.1\r\nHost: panel\r\n\r\n");

        assert_eq!(handled, Handled::Page);
        assert!(conn
            .response()
            .starts_with("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n"));
        assert!(conn.largest_write <= 128);
        assert_eq!(conn.body(), gui.panel().render_page());
    }

    #[test]
    fn test_buffered_page_has_length() {
        let mut gui = gui(RenderMode::Buffered);
        let (_, conn) = serve(&mut gui, "GET / HTTP/1.1\r\n\r\n");
        let page = gui.panel().render_page();

        assert!(conn.response().contains(&format!("Content-Length: {}\r\n", page.len())));
        assert_eq!(conn.body(), page);
    }

    #[test]
    fn test_unknown_path_gets_page() {
        let mut gui = gui(RenderMode::Streaming);
        let (handled, _) = serve(&mut gui, "GET /favicon.ico HTTP/1.1\r\n\r\n");
        assert_eq!(handled, Handled::Page);

        let (handled, _) = serve(&mut gui, "NONSENSE\r\n\r\n");
        assert_eq!(handled, Handled::Page);
    }

    #[test]
    fn test_set_values() {
        let mut gui = gui(RenderMode::Streaming);
        let (handled, conn) = serve(&mut gui, "GET /set?element0=1&element1=250&other=3 HTTP/1.1\r\n\r\n");

        assert_eq!(handled, Handled::SetValues(SetOutcome { applied: 2, ignored: 1 }));
        assert_eq!(conn.body(), "OK");

        let (_, conn) = serve(&mut gui, "GET /get HTTP/1.1\r\n\r\n");
        assert!(conn.response().contains("Content-Type: application/json"));
        assert_eq!(conn.body(), r#"{"element0":"1","element1":"100","element2":"0"}"#);
    }

    #[test]
    fn test_set_without_query() {
        let mut gui = gui(RenderMode::Streaming);
        let (handled, conn) = serve(&mut gui, "GET /set HTTP/1.1\r\n\r\n");
        assert_eq!(handled, Handled::SetValues(SetOutcome::default()));
        assert_eq!(conn.body(), "OK");
    }

    fn short_line_gui(max_request_line: usize) -> WebGui<IdleTransport> {
        let mut panel = ControlPanel::new();
        panel.add_text_box("SSID", "network");
        panel.add_slider("Speed", 0, 100, 50);
        let config = ServerConfig {
            max_request_line,
            ..Default::default()
        };
        WebGui::new(panel, IdleTransport, config)
    }

    fn value_of(gui: &WebGui<IdleTransport>, id: &str) -> String {
        gui.panel().registry().find(id).unwrap().as_control().value_string()
    }

    #[test]
    fn test_truncated_set_drops_cut_value() {
        let mut gui = short_line_gui(40);
        let request = format!("GET /set?element1=42&element0={} HTTP/1.1\r\n\r\n", "x".repeat(600));
        let (handled, conn) = serve(&mut gui, &request);

        assert_eq!(handled, Handled::SetValues(SetOutcome { applied: 1, ignored: 0 }));
        assert_eq!(conn.body(), "OK");
        assert_eq!(value_of(&gui, "element1"), "42");
        assert_eq!(value_of(&gui, "element0"), "");
    }

    #[test]
    fn test_truncated_version_keeps_query() {
        let mut gui = short_line_gui(24);
        let (handled, _) = serve(&mut gui, "GET /set?element1=7 HTTP/1.1\r\n\r\n");

        assert_eq!(handled, Handled::SetValues(SetOutcome { applied: 1, ignored: 0 }));
        assert_eq!(value_of(&gui, "element1"), "7");
    }

    #[test]
    fn test_abandoned_request() {
        let mut gui = gui(RenderMode::Streaming);
        let (handled, conn) = serve(&mut gui, "GET /set?element0=1 HTTP/1.1\r\nHost: x\r\n");

        assert_eq!(handled, Handled::Abandoned);
        assert!(conn.output.is_empty());
        assert_eq!(gui.panel().registry().find("element0").unwrap().as_control().value_string(), "0");
    }
}
