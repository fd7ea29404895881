//! Decodes the Wikipedia export XML schema into a lazy sequence of
//! [`Page`] records. Namespace and redirect filtering are *not* performed
//! here — that is the orchestrator's job — so every `<page>` element is
//! handed to the caller, including redirects and non-main-namespace pages;
//! the decoder's only responsibility is turning XML events into plain
//! data.

use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::index_parser::IoErrorHandle;
use crate::model::Page;

/// A lazy, finite sequence of [`Page`] records decoded from a byte stream.
///
/// Decoder errors other than end-of-stream are logged and skipped; the
/// decoder resumes scanning for the next `<page>` start tag rather than
/// aborting the whole sequence. An I/O error from the underlying reader is
/// a different matter — the decompression stream itself has failed, so the
/// sequence ends there and the error is recorded in [`PageDecoder::error_handle`]
/// rather than retried (retrying a reader that keeps failing without making
/// progress would loop forever).
pub struct PageDecoder<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    finished: bool,
    error: IoErrorHandle,
}

impl<R: BufRead> PageDecoder<R> {
    pub fn new(reader: R) -> Self {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);
        Self {
            reader: xml_reader,
            buf: Vec::with_capacity(8 * 1024),
            finished: false,
            error: Rc::new(RefCell::new(None)),
        }
    }

    /// A handle to the fatal I/O error slot, clonable before the decoder is
    /// moved into iterator adapters (`.take()`, `.filter()`, …) so the
    /// caller can still inspect it once the sequence is exhausted.
    pub fn error_handle(&self) -> IoErrorHandle {
        self.error.clone()
    }
}

impl<R: BufRead> Iterator for PageDecoder<R> {
    type Item = Page;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"page" => {
                    match decode_page_body(&mut self.reader) {
                        Ok(page) => return Some(page),
                        Err(err) => {
                            if let Some(io_err) = as_io_error(&err) {
                                tracing::warn!("I/O error decoding <page>, stopping: {io_err}");
                                *self.error.borrow_mut() = Some(io_err);
                                self.finished = true;
                                return None;
                            }
                            tracing::warn!("error decoding <page>, resuming at next page: {err}");
                            continue;
                        }
                    }
                }
                Ok(Event::Eof) => {
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    if let Some(io_err) = as_io_error(&err) {
                        tracing::warn!("I/O error reading XML stream, stopping: {io_err}");
                        *self.error.borrow_mut() = Some(io_err);
                        self.finished = true;
                        return None;
                    }
                    tracing::warn!("XML parse error, resuming at next page: {err}");
                    continue;
                }
                _ => {}
            }
        }
    }
}

/// Extracts the underlying I/O error from a `quick_xml::Error`, if that's
/// what it is. `quick_xml::Error::Io` wraps an `Arc<std::io::Error>`, which
/// doesn't implement `Clone` into an owned `std::io::Error`, so this
/// reconstructs one from the original's kind and message.
fn as_io_error(err: &quick_xml::Error) -> Option<std::io::Error> {
    match err {
        quick_xml::Error::Io(io_err) => {
            Some(std::io::Error::new(io_err.kind(), io_err.to_string()))
        }
        _ => None,
    }
}

/// Decodes the body of a single `<page>...</page>` element, given that the
/// opening tag has already been consumed.
fn decode_page_body<R: BufRead>(reader: &mut Reader<R>) -> quick_xml::Result<Page> {
    let mut buf = Vec::with_capacity(4096);
    let mut page = Page::default();
    let mut in_revision = false;
    let mut seen_revision = false;
    let mut current_tag: Option<String> = None;
    let mut depth = 1u32; // already inside <page>

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                depth += 1;
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag_name.as_str() {
                    "revision" if !seen_revision => in_revision = true,
                    "title" | "id" | "ns" | "text" => current_tag = Some(tag_name),
                    _ => current_tag = None,
                }
            }
            Event::Empty(ref e) => {
                if e.name().as_ref() == b"redirect" && page.redirect.is_none() {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"title" {
                            page.redirect =
                                Some(attr.unescape_value().unwrap_or_default().to_string());
                        }
                    }
                }
            }
            Event::Text(ref e) => {
                if let Some(ref tag) = current_tag {
                    let val = e.unescape().unwrap_or_default().to_string();
                    match tag.as_str() {
                        "title" if !in_revision => page.title = val,
                        "id" if !in_revision && page.id == 0 => {
                            page.id = val.parse().unwrap_or(0)
                        }
                        "ns" if !in_revision => page.ns = val.parse().unwrap_or(0),
                        "text" if in_revision => page.text = val,
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => {
                if e.name().as_ref() == b"revision" && in_revision {
                    in_revision = false;
                    seen_revision = true;
                }
                current_tag = None;
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode_all(xml: &str) -> Vec<Page> {
        PageDecoder::new(Cursor::new(xml.to_string())).collect()
    }

    #[test]
    fn decodes_simple_page() {
        let xml = r#"<mediawiki>
            <page>
                <title>Anarchism</title>
                <ns>0</ns>
                <id>12</id>
                <revision>
                    <text>Anarchism is a political philosophy.</text>
                </revision>
            </page>
        </mediawiki>"#;
        let pages = decode_all(xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Anarchism");
        assert_eq!(pages[0].ns, 0);
        assert_eq!(pages[0].id, 12);
        assert_eq!(pages[0].redirect, None);
        assert_eq!(pages[0].text, "Anarchism is a political philosophy.");
    }

    #[test]
    fn decodes_redirect_target() {
        let xml = r#"<mediawiki>
            <page>
                <title>AccessibleComputing</title>
                <ns>0</ns>
                <id>10</id>
                <redirect title="Computer accessibility" />
                <revision>
                    <text>#REDIRECT [[Computer accessibility]]</text>
                </revision>
            </page>
        </mediawiki>"#;
        let pages = decode_all(xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(
            pages[0].redirect.as_deref(),
            Some("Computer accessibility")
        );
    }

    #[test]
    fn decodes_non_main_namespace_without_filtering() {
        let xml = r#"<mediawiki>
            <page>
                <title>Talk:Anarchism</title>
                <ns>1</ns>
                <id>13</id>
                <revision><text>discussion</text></revision>
            </page>
        </mediawiki>"#;
        let pages = decode_all(xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].ns, 1);
    }

    #[test]
    fn resumes_after_malformed_page() {
        let xml = r#"<mediawiki>
            <page>
                <title>Broken
                <ns>0</ns>
            </page>
            <page>
                <title>Good</title>
                <ns>0</ns>
                <id>2</id>
                <revision><text>fine</text></revision>
            </page>
        </mediawiki>"#;
        let pages = decode_all(xml);
        assert!(pages.iter().any(|p| p.title == "Good"));
    }

    #[test]
    fn multiple_pages_decode_in_order() {
        let xml = r#"<mediawiki>
            <page><title>A</title><ns>0</ns><id>1</id><revision><text>a</text></revision></page>
            <page><title>B</title><ns>0</ns><id>2</id><revision><text>b</text></revision></page>
        </mediawiki>"#;
        let pages = decode_all(xml);
        assert_eq!(pages.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(), vec!["A", "B"]);
    }

    /// A reader that yields one well-formed page, then a read error on every
    /// subsequent call — simulating an articles dump truncated mid-block by
    /// a corrupt bzip2 stream.
    struct FailingReader {
        remaining: Cursor<Vec<u8>>,
        failed: bool,
    }

    impl std::io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.remaining.position() as usize >= self.remaining.get_ref().len() {
                if !self.failed {
                    self.failed = true;
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "simulated corrupt bzip2 block",
                    ));
                }
                return Ok(0);
            }
            std::io::Read::read(&mut self.remaining, buf)
        }
    }

    impl std::io::BufRead for FailingReader {
        fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
            if self.remaining.position() as usize >= self.remaining.get_ref().len() && !self.failed
            {
                self.failed = true;
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "simulated corrupt bzip2 block",
                ));
            }
            std::io::BufRead::fill_buf(&mut self.remaining)
        }

        fn consume(&mut self, amt: usize) {
            std::io::BufRead::consume(&mut self.remaining, amt)
        }
    }

    #[test]
    fn io_error_mid_stream_is_recorded_and_stops_the_sequence() {
        let xml = br#"<mediawiki>
            <page><title>A</title><ns>0</ns><id>1</id><revision><text>a</text></revision></page>
            "#
        .to_vec();
        let reader = FailingReader {
            remaining: Cursor::new(xml),
            failed: false,
        };
        let decoder = PageDecoder::new(reader);
        let error_handle = decoder.error_handle();

        let pages: Vec<_> = decoder.collect();
        assert_eq!(pages.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(), vec!["A"]);
        assert!(error_handle.borrow().is_some());
    }
}
