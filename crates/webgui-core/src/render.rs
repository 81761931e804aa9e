//! Page rendering.
//!
//! Two output modes share one walk over [`SHELL_TEMPLATE`]:
//!
//! - [`render_page`] collects the page into a `String` for HTTP stacks
//!   that send a body in one write.
//! - [`stream_page`] writes literal fragments, per-widget markup and script
//!   fragments straight to a sink, so the whole page never sits in memory.
//!
//! Because both modes visit the same segments in the same order, their
//! output is byte-identical.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::page::{PageConfig, Slot, CLIENT_SCRIPT, SHELL_TEMPLATE};
use crate::registry::Registry;
use crate::template::{segments, Segment};

/// How a page leaves the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Build the page in memory and send it in one write.
    Buffered,
    /// Write bounded fragments directly to the client.
    #[default]
    Streaming,
}

/// Destination for rendered fragments.
trait Sink {
    fn emit(&mut self, text: &str) -> io::Result<()>;
}

impl Sink for String {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        self.push_str(text);
        Ok(())
    }
}

struct WriteSink<'a, W: Write>(&'a mut W);

impl<W: Write> Sink for WriteSink<'_, W> {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        self.0.write_all(text.as_bytes())
    }
}

fn emit_slot<S: Sink>(sink: &mut S, slot: Slot, page: &PageConfig, registry: &Registry) -> io::Result<()> {
    match slot {
        Slot::Title => sink.emit(&page.title),
        Slot::Heading => sink.emit(&page.heading),
        Slot::Css => sink.emit(&page.stylesheet.css()),
        Slot::Elements => {
            for element in registry.iter() {
                sink.emit(&element.as_control().render_markup())?;
            }
            Ok(())
        }
        Slot::Javascript => {
            for fragment in CLIENT_SCRIPT {
                sink.emit(fragment)?;
            }
            for element in registry.iter() {
                let script = element.as_control().render_script();
                if !script.is_empty() {
                    sink.emit(&script)?;
                }
            }
            Ok(())
        }
    }
}

fn walk<S: Sink>(sink: &mut S, page: &PageConfig, registry: &Registry) -> io::Result<()> {
    for segment in segments(SHELL_TEMPLATE) {
        match segment {
            Segment::Literal(text) => sink.emit(text)?,
            Segment::Placeholder(name) => match Slot::from_name(name) {
                Some(slot) => emit_slot(sink, slot, page, registry)?,
                None => {
                    sink.emit("%")?;
                    sink.emit(name)?;
                    sink.emit("%")?;
                }
            },
        }
    }
    Ok(())
}

/// Render the complete page into one string.
pub fn render_page(page: &PageConfig, registry: &Registry) -> String {
    let mut out = String::with_capacity(SHELL_TEMPLATE.len() + 4096);
    // Writing into a String cannot fail.
    let _ = walk(&mut out, page, registry);
    out
}

/// Stream the page into `out` fragment by fragment.
pub fn stream_page<W: Write>(page: &PageConfig, registry: &Registry, out: &mut W) -> io::Result<()> {
    walk(&mut WriteSink(out), page, registry)?;
    out.flush()
}

/// Writer that never hands more than `max_chunk` bytes to the inner writer
/// in a single call.
#[derive(Debug)]
pub struct ChunkedWriter<W> {
    inner: W,
    max_chunk: usize,
    written: usize,
}

impl<W: Write> ChunkedWriter<W> {
    /// A `max_chunk` of zero is treated as one byte.
    pub fn new(inner: W, max_chunk: usize) -> Self {
        Self {
            inner,
            max_chunk: max_chunk.max(1),
            written: 0,
        }
    }

    /// Total bytes accepted by the inner writer so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ChunkedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len().min(self.max_chunk);
        let n = self.inner.write(&buf[..len])?;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{Stylesheet, Theme};
    use crate::widget::Control;
    use pretty_assertions::assert_eq;

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry.add_button("Start");
        registry.add_toggle("Pump");
        let slider = registry.add_slider("Speed", 0, 100, 40);
        registry.add_sensor_status("Temperature");
        registry.add_text_box("SSID", "network name");
        if let Some(slider) = registry.get_mut(slider) {
            slider.set_debounce_ms(150);
        }
        registry
    }

    /// Records every chunk the renderer hands over.
    #[derive(Default)]
    struct RecordingWriter {
        data: Vec<u8>,
        chunks: Vec<usize>,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.chunks.push(buf.len());
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_modes_are_byte_identical() {
        let registry = sample_registry();
        let mut page = PageConfig::default();
        page.stylesheet = Stylesheet::Themed(Theme::default());

        let buffered = render_page(&page, &registry);
        let mut streamed = Vec::new();
        stream_page(&page, &registry, &mut streamed).unwrap();

        assert_eq!(buffered, String::from_utf8(streamed).unwrap());
    }

    #[test]
    fn test_widgets_in_registration_order() {
        let registry = sample_registry();
        let html = render_page(&PageConfig::default(), &registry);

        let positions: Vec<usize> = registry
            .iter()
            .map(|e| html.find(&format!("id=\"{}", e.id())).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_page_contents() {
        let registry = sample_registry();
        let mut page = PageConfig::default();
        page.set_title("Greenhouse");
        let html = render_page(&page, &registry);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Greenhouse</title>"));
        assert!(html.contains("<h1>Greenhouse</h1>"));
        assert!(html.contains("setInterval(updateSensorDisplays, 500);"));
        assert!(html.contains("debouncedSliderChange('element2', this.value, 150)"));
        assert!(html.contains("id=\"element3_display\""));
        assert!(!html.contains("%ELEMENTS%"));
    }

    #[test]
    fn test_empty_registry_renders_shell() {
        let html = render_page(&PageConfig::default(), &Registry::new());
        assert!(html.contains("<h1>Control Panel</h1>"));
        assert!(html.contains("function buttonClick(id)"));
    }

    #[test]
    fn test_custom_css_not_escaped() {
        let mut page = PageConfig::default();
        page.set_custom_css("p > a { color: red; }");
        let html = render_page(&page, &Registry::new());
        assert!(html.contains("p > a { color: red; }"));
        assert!(!html.contains("webgui-toggle-switch"));
    }

    #[test]
    fn test_chunked_writer_bounds_each_write() {
        let registry = sample_registry();
        let page = PageConfig::default();
        let mut writer = ChunkedWriter::new(RecordingWriter::default(), 64);

        stream_page(&page, &registry, &mut writer).unwrap();

        let total = writer.written();
        let recorder = writer.into_inner();
        assert!(recorder.chunks.iter().all(|&n| n <= 64));
        assert_eq!(total, recorder.data.len());
        assert_eq!(
            String::from_utf8(recorder.data).unwrap(),
            render_page(&page, &registry)
        );
    }

    #[test]
    fn test_render_reflects_current_state() {
        let mut registry = Registry::new();
        let sensor = registry.add_sensor_status("Humidity");
        registry.get_mut(sensor).unwrap().set_float(55.5);

        let html = render_page(&PageConfig::default(), &registry);
        assert!(html.contains(&registry.get(sensor).unwrap().render_markup()));
        assert!(html.contains("55.50"));
    }
}
