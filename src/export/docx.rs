use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

use crate::generation::StudyNotes;

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:rPr><w:sz w:val="22"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="48"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr></w:style></w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

/// Render notes as a Word document: centered title, then Summary,
/// Key Points and Detailed Notes sections.
pub fn build_notes_docx(notes: &StudyNotes) -> Result<Vec<u8>> {
    let document_xml = render_document_xml(notes)?;

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes()),
        ("word/document.xml", &document_xml),
        ("word/styles.xml", STYLES_XML.as_bytes()),
        ("word/numbering.xml", NUMBERING_XML.as_bytes()),
    ];

    for (name, contents) in parts {
        zip.start_file(name, options)
            .with_context(|| format!("Failed to add {} to DOCX", name))?;
        zip.write_all(contents)
            .with_context(|| format!("Failed to write {}", name))?;
    }

    let cursor = zip.finish().context("Failed to finalize DOCX archive")?;
    Ok(cursor.into_inner())
}

fn render_document_xml(notes: &StudyNotes) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut document = BytesStart::new("w:document");
    document.push_attribute(("xmlns:w", WORDML_NS));
    writer.write_event(Event::Start(document))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    paragraph(&mut writer, Some("Title"), true, &notes.title)?;

    paragraph(&mut writer, Some("Heading1"), false, "Summary")?;
    paragraph(&mut writer, None, false, &notes.summary)?;

    paragraph(&mut writer, Some("Heading1"), false, "Key Points")?;
    for point in &notes.key_points {
        paragraph(&mut writer, Some("ListBullet"), false, point)?;
    }

    paragraph(&mut writer, Some("Heading1"), false, "Detailed Notes")?;
    for line in notes.detailed_notes.lines().filter(|l| !l.trim().is_empty()) {
        paragraph(&mut writer, None, false, line)?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;

    Ok(writer.into_inner().into_inner())
}

fn paragraph<W: Write>(
    writer: &mut Writer<W>,
    style: Option<&str>,
    centered: bool,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;

    if style.is_some() || centered {
        writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        if let Some(style) = style {
            writer.write_event(Event::Empty(
                BytesStart::new("w:pStyle").with_attributes([("w:val", style)]),
            ))?;
        }
        if centered {
            writer.write_event(Event::Empty(
                BytesStart::new("w:jc").with_attributes([("w:val", "center")]),
            ))?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    }

    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    writer.write_event(Event::Start(
        BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;

    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}
