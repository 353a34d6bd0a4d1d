use dualtrans::{
    backend::{ChatBackend, UnitBackend},
    config::{Config, Extract},
    error::{BackendError, ExtractError},
    extract::{self, SourceKind},
    pipeline::{NoProgress, Outcome, Pipeline},
};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dualtrans-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn write_docx(name: &str, paragraphs: &[&str]) -> PathBuf {
    let path = temp_path(name);

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}<w:sectPr/></w:body></w:document>"
    );

    let mut zout = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    zout.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zout.write_all(xml.as_bytes()).unwrap();
    zout.finish().unwrap();
    path
}

/// One PDF page per entry, one text object per line.
fn write_pdf(name: &str, pages: &[&[&str]]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new(
                "Td",
                vec![72.into(), (720 - 20 * i as i64).into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = temp_path(name);
    doc.save(&path).unwrap();
    path
}

/// Serves exactly one HTTP response on a local port and returns its URL.
fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut req = Vec::new();
        let mut buf = [0u8; 1024];
        while !req.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            req.extend_from_slice(&buf[..n]);
        }
        let resp = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(resp.as_bytes()).unwrap();
    });
    format!("http://{addr}/page")
}

#[test]
fn source_kind_from_shape() {
    assert_eq!(extract::detect("https://example.org/a").unwrap(), SourceKind::Web);
    assert_eq!(extract::detect("HTTP://example.org").unwrap(), SourceKind::Web);
    assert_eq!(extract::detect("docs/contract.pdf").unwrap(), SourceKind::Pdf);
    assert_eq!(extract::detect("docs/contract.DOCX").unwrap(), SourceKind::Docx);
}

#[test]
fn unknown_shape_is_rejected() {
    for bad in ["notes.txt", "contract", "ftp://example.org/a.html"] {
        let err = extract::extract(&Extract::default(), bad).unwrap_err();
        assert!(
            matches!(err, ExtractError::UnsupportedSourceKind(_)),
            "{bad}: {err}"
        );
    }
}

#[test]
fn docx_paragraphs_are_trimmed_and_non_empty() {
    let path = write_docx("trim.docx", &["  First clause. ", "   ", "Second &amp; last"]);
    let got = extract::extract(&Extract::default(), path.to_str().unwrap()).unwrap();
    assert_eq!(got, vec!["First clause.", "Second & last"]);
}

#[test]
fn extraction_is_repeatable() {
    let path = write_docx("same.docx", &["One", "Two", "Three"]);
    let src = path.to_str().unwrap();
    let a = extract::extract_paragraphs(&Extract::default(), src).unwrap();
    let b = extract::extract_paragraphs(&Extract::default(), src).unwrap();
    assert_eq!(a, b);
    assert_eq!(a[2].index, 3);
}

#[test]
fn ligatures_are_folded_when_normalizing() {
    let path = write_docx("lig.docx", &["ﬁnal ofﬁce"]);
    let src = path.to_str().unwrap();
    let got = extract::extract(&Extract::default(), src).unwrap();
    assert_eq!(got, vec!["final office"]);

    let raw = Extract {
        normalize_unicode: false,
        ..Extract::default()
    };
    assert_eq!(extract::extract(&raw, src).unwrap(), vec!["ﬁnal ofﬁce"]);
}

#[test]
fn web_page_paragraphs_are_trimmed_and_non_empty() {
    let url = serve_once(
        "200 OK",
        "<html><body><h1>Heading</h1><p>  First <em>clause</em>. </p><p> </p>\
         <div><p>Second</p></div></body></html>",
    );
    let got = extract::extract(&Extract::default(), &url).unwrap();
    assert_eq!(got, vec!["First clause.", "Second"]);
}

#[test]
fn web_error_status_is_a_fetch_error() {
    let url = serve_once("404 Not Found", "<p>gone</p>");
    let err = extract::extract(&Extract::default(), &url).unwrap_err();
    match err {
        ExtractError::FetchError { url: u, reason } => {
            assert_eq!(u, url);
            assert!(reason.contains("404"), "{reason}");
        }
        other => panic!("expected FetchError, got {other}"),
    }
}

#[test]
fn pdf_pages_are_read_in_order() {
    let path = write_pdf(
        "two-pages.pdf",
        &[&["Page one first line", "Page one second line"], &["Page two"]],
    );
    let got = extract::extract(&Extract::default(), path.to_str().unwrap()).unwrap();
    assert_eq!(
        got,
        vec!["Page one first line", "Page one second line", "Page two"]
    );
}

#[test]
fn missing_pdf_is_an_io_error() {
    let path = temp_path("does-not-exist.pdf");
    let err = extract::extract(&Extract::default(), path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ExtractError::Io { .. }), "{err}");
}

#[test]
fn pdf_lines_become_paragraphs() {
    let got = extract::pdf::split_lines("Title\n\n  wrapped sentence\ncontinues here  \n\n");
    assert_eq!(got, vec!["Title", "wrapped sentence", "continues here"]);
}

struct Unused;

impl UnitBackend for Unused {
    fn name(&self) -> &str {
        "google"
    }
    fn translate(&self, _text: &str) -> Result<String, BackendError> {
        panic!("no paragraphs should reach the backend");
    }
}

impl ChatBackend for Unused {
    fn name(&self) -> &str {
        "openai"
    }
    fn complete(&self, _system: &str, _user: &str) -> Result<String, BackendError> {
        panic!("no paragraphs should reach the backend");
    }
}

#[test]
fn blank_document_is_reported_as_empty() {
    let path = write_docx("blank.docx", &["", "  "]);
    let cfg = Config::default();
    let pipeline = Pipeline::new(&cfg, Unused, Unused);
    let outcome = pipeline
        .run_job(path.to_str().unwrap(), &NoProgress)
        .unwrap();
    assert!(matches!(outcome, Outcome::Empty));
}

#[test]
fn unsupported_source_fails_the_job() {
    let cfg = Config::default();
    let pipeline = Pipeline::new(&cfg, Unused, Unused);
    let err = pipeline.run_job("notes.txt", &NoProgress).err().unwrap();
    assert!(err.downcast_ref::<ExtractError>().is_some());
}
