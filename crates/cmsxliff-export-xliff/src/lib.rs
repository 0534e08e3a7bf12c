//! XLIFF 1.2 renderer.
//!
//! Source and target text is wrapped in CDATA so embedded markup in
//! rich-text fields survives the round trip byte for byte; entity-escaping
//! would corrupt it.

use chrono::Local;
use cmsxliff_core::{Document, Result, ToolInfo, Unit, XliffError, XliffVersion};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

fn write_err(e: impl std::fmt::Display) -> XliffError {
    XliffError::Format(format!("failed to render xliff: {e}"))
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name))).map_err(write_err)?;
    writer.write_event(Event::Text(BytesText::new(text))).map_err(write_err)?;
    writer.write_event(Event::End(BytesEnd::new(name))).map_err(write_err)?;
    Ok(())
}

fn write_cdata_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name))).map_err(write_err)?;
    writer.write_event(Event::CData(BytesCData::new(text))).map_err(write_err)?;
    writer.write_event(Event::End(BytesEnd::new(name))).map_err(write_err)?;
    Ok(())
}

fn write_trans_unit<W: std::io::Write>(writer: &mut Writer<W>, unit: &Unit) -> Result<()> {
    let unit_id = unit.unit_id();
    let mut element = BytesStart::new("trans-unit");
    element.push_attribute(("id", unit_id.as_str()));
    element.push_attribute(("resname", unit_id.as_str()));
    if let Some(max_length) = unit.max_length {
        element.push_attribute(("maxwidth", max_length.to_string().as_str()));
        element.push_attribute(("size-unit", "char"));
    }
    element.push_attribute(("extype", unit.field_type.as_str()));
    writer.write_event(Event::Start(element)).map_err(write_err)?;

    write_cdata_element(writer, "source", &unit.source)?;
    write_cdata_element(writer, "target", &unit.target)?;
    for note in unit.notes() {
        write_text_element(writer, "note", &note)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("trans-unit")))
        .map_err(write_err)?;
    Ok(())
}

/// Render `document` as an XLIFF document of the requested version.
pub fn render_document(
    version: XliffVersion,
    document: &Document,
    tool: &ToolInfo,
) -> Result<String> {
    let namespace = version.namespace()?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), Some("no"))))
        .map_err(write_err)?;

    let mut xliff = BytesStart::new("xliff");
    xliff.push_attribute(("xmlns", namespace));
    xliff.push_attribute(("version", version.as_str()));
    writer.write_event(Event::Start(xliff)).map_err(write_err)?;

    let mut file = BytesStart::new("file");
    file.push_attribute(("original", document.subject_path.as_str()));
    file.push_attribute(("datatype", "plaintext"));
    file.push_attribute(("source-language", document.source_language.as_str()));
    file.push_attribute(("target-language", document.target_language.as_str()));
    writer.write_event(Event::Start(file)).map_err(write_err)?;

    let tool_id = document.tool_id();
    let mut tool_element = BytesStart::new("tool");
    tool_element.push_attribute(("tool-id", tool_id.as_str()));
    tool_element.push_attribute(("tool-name", tool.name.as_str()));
    tool_element.push_attribute(("tool-company-name", tool.company.as_str()));
    writer.write_event(Event::Empty(tool_element)).map_err(write_err)?;

    writer.write_event(Event::Start(BytesStart::new("body"))).map_err(write_err)?;
    for unit in &document.units {
        write_trans_unit(&mut writer, unit)?;
    }
    writer.write_event(Event::End(BytesEnd::new("body"))).map_err(write_err)?;
    writer.write_event(Event::End(BytesEnd::new("file"))).map_err(write_err)?;
    writer.write_event(Event::End(BytesEnd::new("xliff"))).map_err(write_err)?;

    String::from_utf8(writer.into_inner()).map_err(write_err)
}

/// File name for a downloaded export: the subject path with the leading
/// language segment dropped, the target language, and a timestamp.
pub fn export_file_name(subject_path: &str, target_language: &str) -> String {
    let parts: Vec<&str> = subject_path.split('/').filter(|part| !part.is_empty()).collect();
    let name = parts.iter().skip(1).copied().collect::<Vec<_>>().join("_");
    let stamp = Local::now().format("%y%m%d%H%M%S");
    format!("{name}_{target_language}_{stamp}.xliff")
}
