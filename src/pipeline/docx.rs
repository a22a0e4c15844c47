//! Minimal WordprocessingML package editing: append styled paragraphs to the
//! end of a template's main document body and repackage it.

use std::io::{Cursor, Read, Write};

use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DOCUMENT_PART: &str = "word/document.xml";
const BODY_CLOSE: &str = "</w:body>";

pub const HEADING_STYLE: &str = "Heading1";
pub const LIST_BULLET_STYLE: &str = "ListBullet";

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("template is not a valid package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("i/o error while repackaging: {0}")]
    Io(#[from] std::io::Error),

    #[error("template package has no {0} part")]
    MissingPart(&'static str),

    #[error("main document part is malformed: {0}")]
    Malformed(&'static str),

    #[error("text contains U+{:04X}, which XML 1.0 does not allow", code_point(.0))]
    InvalidCharacter(char),
}

fn code_point(c: &char) -> u32 {
    *c as u32
}

/// A paragraph to append to the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: Option<&'static str>,
    pub text: String,
}

impl Paragraph {
    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            style: Some(HEADING_STYLE),
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            style: None,
            text: text.into(),
        }
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self {
            style: Some(LIST_BULLET_STYLE),
            text: text.into(),
        }
    }

    fn to_xml(&self) -> Result<String, DocxError> {
        let mut xml = String::from("<w:p>");
        if let Some(style) = self.style {
            xml.push_str(&format!(r#"<w:pPr><w:pStyle w:val="{style}"/></w:pPr>"#));
        }
        xml.push_str("<w:r>");
        push_run_content(&mut xml, &self.text)?;
        xml.push_str("</w:r></w:p>");
        Ok(xml)
    }
}

/// Copies every part of `template` into a new package, with `paragraphs`
/// appended to the main document body ahead of the final section properties.
pub fn append_paragraphs(template: &[u8], paragraphs: &[Paragraph]) -> Result<Vec<u8>, DocxError> {
    let rendered = paragraphs
        .iter()
        .map(Paragraph::to_xml)
        .collect::<Result<String, _>>()?;

    let mut archive = ZipArchive::new(Cursor::new(template))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut patched = false;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        if entry.is_dir() {
            writer.add_directory(name, options)?;
            continue;
        }

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;

        if name == DOCUMENT_PART {
            let xml = String::from_utf8(data)
                .map_err(|_| DocxError::Malformed("document part is not UTF-8"))?;
            data = insert_into_body(&xml, &rendered)?.into_bytes();
            patched = true;
        }

        writer.start_file(name, options)?;
        writer.write_all(&data)?;
    }

    if !patched {
        return Err(DocxError::MissingPart(DOCUMENT_PART));
    }

    Ok(writer.finish()?.into_inner())
}

fn insert_into_body(xml: &str, rendered: &str) -> Result<String, DocxError> {
    let at = body_insertion_point(xml).ok_or(DocxError::Malformed("no closing w:body tag"))?;

    let mut out = String::with_capacity(xml.len() + rendered.len());
    out.push_str(&xml[..at]);
    out.push_str(rendered);
    out.push_str(&xml[at..]);
    Ok(out)
}

/// Byte offset where new block content belongs: before the body-level
/// `w:sectPr` when the template has one, otherwise before `</w:body>`.
///
/// The body-level `w:sectPr` is the last child of `w:body`, so it is searched
/// for only after the last closed block element. Section properties nested in
/// a paragraph's `w:pPr` end before that point and are never matched.
fn body_insertion_point(xml: &str) -> Option<usize> {
    let body_end = xml.rfind(BODY_CLOSE)?;
    let body = &xml[..body_end];

    let body_start = body
        .find("<w:body")
        .and_then(|i| body[i..].find('>').map(|j| i + j + 1))
        .unwrap_or(0);

    let last_block_end = ["</w:p>", "<w:p/>", "</w:tbl>", "</w:sdt>"]
        .iter()
        .filter_map(|tag| body.rfind(tag).map(|i| i + tag.len()))
        .max()
        .unwrap_or(body_start)
        .max(body_start);

    let tail = &body[last_block_end..];
    let sect_pr = tail.match_indices("<w:sectPr").find(|(i, tag)| {
        matches!(
            tail[i + tag.len()..].chars().next(),
            Some('>' | ' ' | '/' | '\n' | '\r' | '\t')
        )
    });

    Some(match sect_pr {
        Some((offset, _)) => last_block_end + offset,
        None => body_end,
    })
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn push_run_content(xml: &mut String, text: &str) -> Result<(), DocxError> {
    let mut pending = String::new();
    for ch in text.chars() {
        match ch {
            '\n' | '\t' => {
                flush_text(xml, &mut pending);
                xml.push_str(if ch == '\n' { "<w:br/>" } else { "<w:tab/>" });
            }
            '\r' => {}
            c if !is_xml_char(c) => return Err(DocxError::InvalidCharacter(c)),
            _ => pending.push(ch),
        }
    }
    flush_text(xml, &mut pending);
    Ok(())
}

fn flush_text(xml: &mut String, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    escape_into(xml, pending);
    xml.push_str("</w:t>");
    pending.clear();
}

fn escape_into(xml: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => xml.push_str("&amp;"),
            '<' => xml.push_str("&lt;"),
            '>' => xml.push_str("&gt;"),
            '"' => xml.push_str("&quot;"),
            c => xml.push(c),
        }
    }
}
