//! XLIFF 1.2 parser.
//!
//! Input is untrusted upload content: quick-xml expands no DTDs or external
//! entities, malformed XML maps to a format error, and text content is
//! entity-decoded so hand-edited files that escape instead of CDATA-wrapping
//! still import correctly.

use std::borrow::Cow;

use cmsxliff_core::{
    split_unit_id, Document, Result, SubjectId, Unit, XliffError, XliffVersion,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

fn invalid_xml(e: impl std::fmt::Display) -> XliffError {
    XliffError::Format(format!("invalid xml: {e}"))
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    match element.try_get_attribute(name).map_err(invalid_xml)? {
        Some(attr) => {
            let value = attr.unescape_value().map_err(invalid_xml)?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

fn required_attribute(element: &BytesStart<'_>, name: &str, context: &str) -> Result<String> {
    attribute(element, name)?.ok_or_else(|| {
        XliffError::Format(format!("missing \"{name}\" attribute on <{context}>"))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextSlot {
    Source,
    Target,
    Note,
}

#[derive(Debug, Default)]
struct UnitBuilder {
    group_id: String,
    field_name: String,
    field_type: String,
    max_length: Option<usize>,
    source: Option<String>,
    target: Option<String>,
    notes: Vec<String>,
    slot: Option<TextSlot>,
}

impl UnitBuilder {
    fn from_element(element: &BytesStart<'_>) -> Result<Self> {
        let unit_id = required_attribute(element, "id", "trans-unit")?;
        let (group_id, field_name) = split_unit_id(&unit_id)?;
        let max_length = match attribute(element, "maxwidth")? {
            Some(raw) if !raw.is_empty() => Some(raw.parse::<usize>().map_err(|_| {
                XliffError::Format(format!(
                    "invalid maxwidth \"{raw}\" on trans-unit \"{unit_id}\""
                ))
            })?),
            _ => None,
        };
        Ok(Self {
            group_id: group_id.to_string(),
            field_name: field_name.to_string(),
            field_type: required_attribute(element, "extype", "trans-unit")?,
            max_length,
            ..Self::default()
        })
    }

    fn push_text(&mut self, text: &str) {
        let buffer = match self.slot {
            Some(TextSlot::Source) => self.source.get_or_insert_with(String::new),
            Some(TextSlot::Target) => self.target.get_or_insert_with(String::new),
            Some(TextSlot::Note) => match self.notes.last_mut() {
                Some(last) => last,
                None => return,
            },
            None => return,
        };
        buffer.push_str(text);
    }

    fn finish(self) -> Result<Unit> {
        let source = self
            .source
            .ok_or_else(|| XliffError::Format("missing <source> in <trans-unit>".into()))?;
        let target = self
            .target
            .ok_or_else(|| XliffError::Format("missing <target> in <trans-unit>".into()))?;
        // An empty target means the translator left the unit untouched.
        let target = if target.is_empty() { source.clone() } else { target };
        let field_label = self.notes.get(2).filter(|label| !label.is_empty()).cloned();
        Ok(Unit {
            group_id: self.group_id,
            group_type: self.notes.first().cloned().unwrap_or_default(),
            group_label: self.notes.get(1).cloned().unwrap_or_default(),
            field_name: self.field_name,
            field_type: self.field_type,
            field_label,
            source,
            target,
            max_length: self.max_length,
        })
    }
}

#[derive(Default)]
struct ParserState {
    version: Option<XliffVersion>,
    source_language: Option<String>,
    target_language: Option<String>,
    subject_path: Option<String>,
    tool_id: Option<String>,
    saw_file: bool,
    saw_body: bool,
    units: Vec<Unit>,
    current: Option<UnitBuilder>,
}

impl ParserState {
    /// Handle an opening tag. `has_children` is false for self-closing
    /// elements, which get no matching end event.
    fn open(&mut self, element: &BytesStart<'_>, has_children: bool) -> Result<()> {
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        match name.as_str() {
            "xliff" => {
                let raw = required_attribute(element, "version", "xliff")?;
                self.version = Some(XliffVersion::parse(&raw)?);
            }
            "file" => {
                self.saw_file = true;
                self.source_language =
                    Some(required_attribute(element, "source-language", "file")?);
                self.target_language =
                    Some(required_attribute(element, "target-language", "file")?);
                self.subject_path = Some(required_attribute(element, "original", "file")?);
            }
            "tool" => {
                self.tool_id = Some(required_attribute(element, "tool-id", "tool")?);
            }
            "body" => self.saw_body = true,
            "trans-unit" => {
                let builder = UnitBuilder::from_element(element)?;
                if has_children {
                    self.current = Some(builder);
                } else {
                    // A self-closing trans-unit can never carry its required
                    // source and target children.
                    self.units.push(builder.finish()?);
                }
            }
            "source" => {
                if let Some(unit) = self.current.as_mut() {
                    unit.source.get_or_insert_with(String::new);
                    unit.slot = has_children.then_some(TextSlot::Source);
                }
            }
            "target" => {
                if let Some(unit) = self.current.as_mut() {
                    unit.target.get_or_insert_with(String::new);
                    unit.slot = has_children.then_some(TextSlot::Target);
                }
            }
            "note" => {
                if let Some(unit) = self.current.as_mut() {
                    unit.notes.push(String::new());
                    unit.slot = has_children.then_some(TextSlot::Note);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        match name {
            "source" | "target" | "note" => {
                if let Some(unit) = self.current.as_mut() {
                    unit.slot = None;
                }
            }
            "trans-unit" => {
                if let Some(builder) = self.current.take() {
                    self.units.push(builder.finish()?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(unit) = self.current.as_mut() {
            unit.push_text(text);
        }
    }

    fn finish(self) -> Result<Document> {
        if self.version.is_none() {
            return Err(XliffError::Format("missing <xliff> root element".into()));
        }
        if !self.saw_file {
            return Err(XliffError::Format("missing <file> element".into()));
        }
        let Some(tool_id) = self.tool_id else {
            return Err(XliffError::Format("missing <tool> in <file>".into()));
        };
        if !self.saw_body {
            return Err(XliffError::Format("missing <body> in <file>".into()));
        }
        Ok(Document {
            source_language: self.source_language.unwrap_or_default(),
            target_language: self.target_language.unwrap_or_default(),
            subject: SubjectId::from_tool_id(&tool_id),
            subject_path: self.subject_path.unwrap_or_default(),
            units: self.units,
        })
    }
}

/// Parse an XLIFF document. The declared version decides the layout; only
/// 1.2 is understood today, anything else is a configuration error.
pub fn parse_document(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut state = ParserState::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Err(e) => return Err(invalid_xml(e)),
            Ok(Event::Start(e)) => state.open(&e, true)?,
            Ok(Event::Empty(e)) => state.open(&e, false)?,
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                state.close(&name)?;
            }
            Ok(Event::Text(t)) => {
                // Entity decode; tolerate unknown entities in hand-edited
                // files by keeping the raw text.
                let text = t.unescape().unwrap_or_else(|_| {
                    Cow::Owned(String::from_utf8_lossy(t.as_ref()).into_owned())
                });
                state.text(&text);
            }
            Ok(Event::CData(c)) => {
                // CDATA passes through untouched so markup round-trips byte
                // for byte.
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                state.text(&text);
            }
            Ok(Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    state.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsxliff_core::{SubjectKind, ToolInfo};
    use cmsxliff_export_xliff::render_document;

    #[test]
    fn parses_a_simple_1_2_document() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
        <xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
            <file original="test" datatype="plaintext" source-language="en" target-language="de">
                <tool tool-id="page__1" tool-name="cmsxliff" tool-company-name="cms-xliff"/>
                <body>
                    <trans-unit id="123__title" resname="123__title" maxwidth="30" size-unit="char" extype="char">
                        <note>TestPlugin</note>
                        <note>Test Plugin</note>
                        <note>Title</note>
                        <source><![CDATA[Welcome]]></source>
                        <target><![CDATA[Willkommen]]></target>
                    </trans-unit>
                </body>
            </file>
        </xliff>"#;

        let document = parse_document(xml).unwrap();
        assert_eq!(document.source_language, "en");
        assert_eq!(document.target_language, "de");
        assert_eq!(document.subject, SubjectId::new(SubjectKind::Page, "1"));
        assert_eq!(document.subject_path, "test");
        assert_eq!(
            document.units,
            vec![Unit {
                group_id: "123".into(),
                group_type: "TestPlugin".into(),
                group_label: "Test Plugin".into(),
                field_name: "title".into(),
                field_type: "char".into(),
                field_label: Some("Title".into()),
                source: "Welcome".into(),
                target: "Willkommen".into(),
                max_length: Some(30),
            }]
        );
    }

    #[test]
    fn parses_multiple_units_with_utf_8_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
        <xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
            <file original="test/example" datatype="plaintext" source-language="de" target-language="fr">
                <tool tool-id="page__1" tool-name="cmsxliff" tool-company-name="cms-xliff" />
                <body>
                    <trans-unit id="5917__title" resname="5917__title" maxwidth="60" size-unit="char" extype="char">
                        <source><![CDATA[Willkommen]]></source>
                        <target><![CDATA[Accueillir]]></target>
                        <note>TestBlockPlugin</note>
                        <note>Test Block Plugin</note>
                        <note>Title</note>
                    </trans-unit>
                    <trans-unit id="5918__title" resname="5918__title" maxwidth="35" size-unit="char" extype="char">
                        <source><![CDATA[Das ist ein Beispiel]]></source>
                        <target><![CDATA[Ceci est un exemple]]></target>
                        <note>TestBlockSlidePlugin</note>
                        <note>Test Block Slide Plugin</note>
                        <note>Title</note>
                    </trans-unit>
                </body>
            </file>
        </xliff>"#;

        let document = parse_document(xml).unwrap();
        assert_eq!(document.units.len(), 2);
        assert_eq!(document.units[0].target, "Accueillir");
        assert_eq!(document.units[1].group_id, "5918");
        assert_eq!(document.units[1].max_length, Some(35));
    }

    #[test]
    fn markup_inside_cdata_is_kept_verbatim() {
        let source = "<h2>Willkommen</h2>\n<p>Welche Funktionen bietet das Paket?</p>\n<ul>\n    <li>Export als XLIFF</li>\n</ul>";
        let target = "<h2>Bienvenue</h2>\n<p>Quelles fonctions offre le paquet?</p>\n<ul>\n    <li>Export au format XLIFF</li>\n</ul>";
        let xml = format!(
            r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
            <xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
                <file original="test/example" datatype="plaintext" source-language="de" target-language="fr">
                    <tool tool-id="page__2" tool-name="cmsxliff" tool-company-name="cms-xliff" />
                    <body>
                        <trans-unit id="6008__body" resname="6008__body" extype="text">
                            <source><![CDATA[{source}]]></source>
                            <target><![CDATA[{target}]]></target>
                            <note>Richtext</note>
                            <note>Richtext</note>
                            <note>Body</note>
                        </trans-unit>
                    </body>
                </file>
            </xliff>"#
        );

        let document = parse_document(&xml).unwrap();
        assert_eq!(document.units[0].source, source);
        assert_eq!(document.units[0].target, target);
        assert_eq!(document.units[0].max_length, None);
    }

    #[test]
    fn entity_escaped_text_is_decoded() {
        // A hand-edited file using entity escaping instead of CDATA.
        let xml = r#"<?xml version="1.0"?>
        <xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
            <file original="t" datatype="plaintext" source-language="de" target-language="fr">
                <tool tool-id="page__1"/>
                <body>
                    <trans-unit id="7__body" resname="7__body" extype="text">
                        <source>&lt;b&gt;Hallo&lt;/b&gt; &amp; Welt</source>
                        <target>&lt;b&gt;Salut&lt;/b&gt; &amp; monde</target>
                        <note>Text</note>
                        <note>Text</note>
                        <note>Body</note>
                    </trans-unit>
                </body>
            </file>
        </xliff>"#;

        let document = parse_document(xml).unwrap();
        assert_eq!(document.units[0].source, "<b>Hallo</b> & Welt");
        assert_eq!(document.units[0].target, "<b>Salut</b> & monde");
    }

    #[test]
    fn empty_target_defaults_to_the_source_text() {
        let xml = r#"<?xml version="1.0"?>
        <xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
            <file original="t" datatype="plaintext" source-language="de" target-language="fr">
                <tool tool-id="page__1"/>
                <body>
                    <trans-unit id="7__title" extype="char">
                        <source><![CDATA[Willkommen]]></source>
                        <target><![CDATA[]]></target>
                        <note>T</note><note>T</note><note>Title</note>
                    </trans-unit>
                    <trans-unit id="8__title" extype="char">
                        <source>Hallo</source>
                        <target/>
                        <note>T</note><note>T</note><note>Title</note>
                    </trans-unit>
                </body>
            </file>
        </xliff>"#;

        let document = parse_document(xml).unwrap();
        assert_eq!(document.units[0].target, "Willkommen");
        assert_eq!(document.units[1].target, "Hallo");
    }

    #[test]
    fn unit_ids_split_on_the_last_delimiter() {
        let xml = r#"<?xml version="1.0"?>
        <xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
            <file original="t" datatype="plaintext" source-language="de" target-language="fr">
                <tool tool-id="page__1"/>
                <body>
                    <trans-unit id="METADATA__page_content__4__title" extype="char">
                        <source>Titel</source>
                        <target>Titre</target>
                    </trans-unit>
                </body>
            </file>
        </xliff>"#;

        let document = parse_document(xml).unwrap();
        assert_eq!(document.units[0].group_id, "METADATA__page_content__4");
        assert_eq!(document.units[0].field_name, "title");
        // Units without notes still parse; the annotations just stay empty.
        assert_eq!(document.units[0].group_type, "");
        assert_eq!(document.units[0].field_label, None);
    }

    #[test]
    fn legacy_tool_ids_default_to_a_page_subject() {
        let xml = r#"<?xml version="1.0"?>
        <xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
            <file original="t" datatype="plaintext" source-language="de" target-language="fr">
                <tool tool-id="17"/>
                <body/>
            </file>
        </xliff>"#;

        let document = parse_document(xml).unwrap();
        assert_eq!(document.subject, SubjectId::new(SubjectKind::Page, "17"));
    }

    #[test]
    fn unsupported_versions_are_a_configuration_error() {
        let xml = r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:2.0" version="2.0"><file/></xliff>"#;
        assert!(matches!(
            parse_document(xml),
            Err(XliffError::Configuration(_))
        ));
    }

    #[test]
    fn malformed_xml_is_a_format_error() {
        assert!(matches!(
            parse_document("<xliff version=\"1.2\"><file></xliff>"),
            Err(XliffError::Format(_))
        ));
        assert!(matches!(parse_document("not xml at all"), Err(XliffError::Format(_))));
    }

    #[test]
    fn missing_structure_elements_are_format_errors() {
        let missing_file =
            r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2"></xliff>"#;
        let err = parse_document(missing_file).unwrap_err();
        assert!(matches!(&err, XliffError::Format(m) if m.contains("file")), "{err}");

        let missing_tool = r#"<xliff version="1.2">
            <file original="t" datatype="plaintext" source-language="de" target-language="fr">
                <body/>
            </file>
        </xliff>"#;
        let err = parse_document(missing_tool).unwrap_err();
        assert!(matches!(&err, XliffError::Format(m) if m.contains("tool")), "{err}");

        let missing_body = r#"<xliff version="1.2">
            <file original="t" datatype="plaintext" source-language="de" target-language="fr">
                <tool tool-id="page__1"/>
            </file>
        </xliff>"#;
        let err = parse_document(missing_body).unwrap_err();
        assert!(matches!(&err, XliffError::Format(m) if m.contains("body")), "{err}");

        let missing_source = r#"<xliff version="1.2">
            <file original="t" datatype="plaintext" source-language="de" target-language="fr">
                <tool tool-id="page__1"/>
                <body><trans-unit id="1__t" extype="char"><target>x</target></trans-unit></body>
            </file>
        </xliff>"#;
        let err = parse_document(missing_source).unwrap_err();
        assert!(matches!(&err, XliffError::Format(m) if m.contains("source")), "{err}");

        let missing_target = r#"<xliff version="1.2">
            <file original="t" datatype="plaintext" source-language="de" target-language="fr">
                <tool tool-id="page__1"/>
                <body><trans-unit id="1__t" extype="char"><source>x</source></trans-unit></body>
            </file>
        </xliff>"#;
        let err = parse_document(missing_target).unwrap_err();
        assert!(matches!(&err, XliffError::Format(m) if m.contains("target")), "{err}");
    }

    #[test]
    fn render_then_parse_reproduces_the_document() {
        let units = vec![
            Unit {
                group_id: "10".into(),
                group_type: "TextPlugin".into(),
                group_label: "Text".into(),
                field_name: "body".into(),
                field_type: "text".into(),
                field_label: Some("Body".into()),
                source: "<h2>Hallo & Welt</h2>\n<p>Zeile zwei</p>".into(),
                target: "<h2>Salut & monde</h2>\n<p>Ligne deux</p>".into(),
                max_length: None,
            },
            Unit {
                group_id: "METADATA__page_content__4".into(),
                group_type: "PageContent".into(),
                group_label: "page content".into(),
                field_name: "title".into(),
                field_type: "char".into(),
                field_label: Some("Title".into()),
                source: "Startseite".into(),
                target: "Accueil".into(),
                max_length: Some(255),
            },
        ];
        let document = Document {
            source_language: "de".into(),
            target_language: "fr".into(),
            subject: SubjectId::new(SubjectKind::Page, "1"),
            subject_path: "/de/startseite".into(),
            units,
        };

        let xml = render_document(XliffVersion::V1_2, &document, &ToolInfo::default()).unwrap();
        let parsed = parse_document(&xml).unwrap();
        assert_eq!(parsed, document);
    }
}
