use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use utoipa::openapi::path::{Operation, PathItem};
use utoipa::openapi::{OpenApi, RefOr, Schema};
use wine_domain::error::format_context;

#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    #[error("Failed to read documentation comments{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
    #[error("Malformed documentation comments{}: {source}", format_context(.context))]
    Parse { source: quick_xml::Error, context: Option<Cow<'static, str>> },
}

/// Member element whose text is being collected.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Summary,
    Remarks,
    Returns,
    Param(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct MemberDoc {
    summary: Option<String>,
    remarks: Option<String>,
    returns: Option<String>,
    params: HashMap<String, String>,
}

impl MemberDoc {
    fn set(&mut self, section: Section, text: Option<String>) {
        match section {
            Section::Summary => self.summary = text,
            Section::Remarks => self.remarks = text,
            Section::Returns => self.returns = text,
            Section::Param(name) => {
                if let Some(text) = text {
                    self.params.insert(name, text);
                }
            },
        }
    }
}

/// Documentation comments read from an XML file next to the executable.
///
/// Members are keyed the way the file names them:
/// * `M:<operation_id>` documents an operation (`summary`, `remarks`, `param`, `returns`),
/// * `T:<Schema>` documents a component schema,
/// * `P:<Schema>.<property>` documents one schema property.
#[derive(Debug, Clone, Default)]
pub struct XmlComments {
    members: HashMap<String, MemberDoc>,
}

impl XmlComments {
    /// `<executable stem>.xml` in the executable's directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        std::env::current_exe().ok().map(|exe| exe.with_extension("xml"))
    }

    /// Reads the file at `path`. A missing file yields `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`DocsError`] when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>, DocsError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No documentation comments file");
                return Ok(None);
            },
            Err(source) => {
                return Err(DocsError::Io {
                    source,
                    context: Some(path.display().to_string().into()),
                });
            },
        };

        let comments = Self::parse(&raw).map_err(|e| match e {
            DocsError::Parse { source, .. } => {
                DocsError::Parse { source, context: Some(path.display().to_string().into()) }
            },
            other => other,
        })?;

        info!(path = %path.display(), members = comments.len(), "Loaded documentation comments");
        Ok(Some(comments))
    }

    /// Parses the XML text of a documentation comments file.
    ///
    /// # Errors
    /// Returns [`DocsError::Parse`] on malformed XML.
    pub fn parse(raw: &str) -> Result<Self, DocsError> {
        read_members(raw)
            .map(|members| Self { members })
            .map_err(|source| DocsError::Parse { source, context: None })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Summary of a member such as `M:health_handler`.
    #[must_use]
    pub fn summary(&self, member: &str) -> Option<&str> {
        self.members.get(member).and_then(|m| m.summary.as_deref())
    }

    /// Merges the comments into `doc`. Existing text is overwritten.
    pub fn apply(&self, doc: &mut OpenApi) {
        for item in doc.paths.paths.values_mut() {
            for operation in operations_mut(item) {
                self.apply_operation(operation);
            }
        }

        let Some(components) = doc.components.as_mut() else {
            return;
        };
        for (name, schema) in &mut components.schemas {
            let RefOr::T(Schema::Object(object)) = schema else {
                continue;
            };
            if let Some(summary) = self.summary(&format!("T:{name}")) {
                object.description = Some(summary.to_owned());
            }
            for (property, property_schema) in &mut object.properties {
                if let Some(summary) = self.summary(&format!("P:{name}.{property}")) {
                    set_description(property_schema, summary);
                }
            }
        }
    }

    fn apply_operation(&self, operation: &mut Operation) {
        let Some(member) =
            operation.operation_id.as_ref().and_then(|id| self.members.get(&format!("M:{id}")))
        else {
            return;
        };

        if member.summary.is_some() {
            operation.summary.clone_from(&member.summary);
        }
        if member.remarks.is_some() {
            operation.description.clone_from(&member.remarks);
        }
        if let Some(parameters) = operation.parameters.as_mut() {
            for parameter in parameters {
                if let Some(text) = member.params.get(&parameter.name) {
                    parameter.description = Some(text.clone());
                }
            }
        }
        if let Some(returns) = &member.returns {
            if let Some(RefOr::T(response)) = operation.responses.responses.get_mut("200") {
                response.description.clone_from(returns);
            }
        }
    }
}

fn operations_mut(item: &mut PathItem) -> impl Iterator<Item = &mut Operation> {
    [
        &mut item.get,
        &mut item.put,
        &mut item.post,
        &mut item.delete,
        &mut item.options,
        &mut item.head,
        &mut item.patch,
        &mut item.trace,
    ]
    .into_iter()
    .filter_map(Option::as_mut)
}

fn set_description(schema: &mut RefOr<Schema>, text: &str) {
    match schema {
        RefOr::Ref(reference) => text.clone_into(&mut reference.description),
        RefOr::T(Schema::Object(object)) => object.description = Some(text.to_owned()),
        RefOr::T(Schema::Array(array)) => array.description = Some(text.to_owned()),
        RefOr::T(_) => {},
    }
}

/// Reads `<member>` elements; inline markup inside their sections is flattened to text.
fn read_members(raw: &str) -> Result<HashMap<String, MemberDoc>, quick_xml::Error> {
    let mut reader = Reader::from_str(raw);
    let mut members = HashMap::new();
    let mut open: Vec<String> = Vec::new();
    let mut member: Option<(String, MemberDoc)> = None;
    let mut section: Option<(Section, usize)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                if section.is_some() {
                    text.push_str(inline_open(&name));
                } else if name == "member" {
                    member = attribute(&e, "name")?.map(|id| (id, MemberDoc::default()));
                } else if member.is_some() {
                    section = match name.as_str() {
                        "summary" => Some(Section::Summary),
                        "remarks" => Some(Section::Remarks),
                        "returns" => Some(Section::Returns),
                        "param" => attribute(&e, "name")?.map(Section::Param),
                        _ => None,
                    }
                    .map(|s| (s, open.len()));
                    text.clear();
                }
                open.push(name);
            },
            Event::Empty(e) => {
                if section.is_some() {
                    text.push_str(&inline_empty(&e)?);
                }
            },
            Event::End(_) => {
                let name = open.pop().unwrap_or_default();
                match section.take() {
                    Some((kind, depth)) if depth == open.len() => {
                        if let Some((_, doc)) = member.as_mut() {
                            doc.set(kind, normalize(&text));
                        }
                    },
                    Some(active) => {
                        text.push_str(inline_close(&name));
                        section = Some(active);
                    },
                    None if name == "member" => {
                        if let Some((id, doc)) = member.take() {
                            members.insert(id, doc);
                        }
                    },
                    None => {},
                }
            },
            Event::Text(e) if section.is_some() => text.push_str(&e.unescape()?),
            Event::CData(e) if section.is_some() => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Eof => break,
            _ => {},
        }
    }

    match open.pop() {
        Some(unclosed) => Err(IllFormedError::MissingEndTag(unclosed).into()),
        None => Ok(members),
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, quick_xml::Error> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn inline_open(name: &str) -> &'static str {
    match name {
        "c" => "`",
        "para" | "br" | "list" | "item" | "code" => " ",
        _ => "",
    }
}

fn inline_close(name: &str) -> &'static str {
    match name {
        "c" => "`",
        "para" | "list" | "item" | "code" => " ",
        _ => "",
    }
}

/// Text for self-closing inline tags: `<see cref="T:Grape"/>` reads as `Grape`.
fn inline_empty(e: &BytesStart<'_>) -> Result<String, quick_xml::Error> {
    let reference = match local_name(e).as_str() {
        "see" | "seealso" => match attribute(e, "cref")? {
            Some(cref) => Some(cref),
            None => match attribute(e, "langword")? {
                Some(word) => Some(word),
                None => attribute(e, "href")?,
            },
        },
        "paramref" | "typeparamref" => attribute(e, "name")?,
        "br" | "para" => return Ok(" ".to_owned()),
        _ => None,
    };
    Ok(reference.map(|r| short_name(&r).to_owned()).unwrap_or_default())
}

/// `T:Wine.Api.Grape` becomes `Grape`.
fn short_name(reference: &str) -> &str {
    let name = reference.split_once(':').map_or(reference, |(_, name)| name);
    name.rsplit('.').next().unwrap_or(name)
}

/// Collapses runs of whitespace; empty text becomes `None`.
fn normalize(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn};
    use utoipa::openapi::schema::{ComponentsBuilder, ObjectBuilder, Type};
    use utoipa::openapi::{OpenApiBuilder, PathsBuilder, ResponseBuilder};

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<doc>
    <assembly><name>wine-server</name></assembly>
    <members>
        <member name="M:grape_by_id">
            <summary>
                Looks up a grape
                by its VIVC number.
            </summary>
            <remarks>Served from the catalog.</remarks>
            <param name="id">VIVC variety number</param>
            <returns>The grape variety</returns>
        </member>
        <member name="T:Grape">
            <summary>A grape variety.</summary>
        </member>
        <member name="P:Grape.color">
            <summary>Berry skin color.</summary>
        </member>
        <member name="M:empty">
            <summary>   </summary>
        </member>
    </members>
</doc>"#;

    fn sample_doc() -> OpenApi {
        let operation = OperationBuilder::new()
            .operation_id(Some("grape_by_id"))
            .parameter(ParameterBuilder::new().name("id").parameter_in(ParameterIn::Path))
            .response("200", ResponseBuilder::new().description("OK").build());
        let paths = PathsBuilder::new()
            .path("/grapes/{id}", PathItem::new(HttpMethod::Get, operation))
            .build();
        let grape = ObjectBuilder::new()
            .property("color", ObjectBuilder::new().schema_type(Type::String))
            .property("name", ObjectBuilder::new().schema_type(Type::String));
        let components = ComponentsBuilder::new().schema("Grape", grape).build();

        OpenApiBuilder::new().paths(paths).components(Some(components)).build()
    }

    #[test]
    fn parses_members_and_collapses_whitespace() {
        let comments = XmlComments::parse(SAMPLE).expect("valid xml");

        assert_eq!(comments.len(), 4);
        assert_eq!(comments.summary("M:grape_by_id"), Some("Looks up a grape by its VIVC number."));
        assert_eq!(comments.summary("M:empty"), None);
        assert_eq!(comments.summary("M:unknown"), None);
    }

    #[test]
    fn merges_into_operations_and_schemas() {
        let comments = XmlComments::parse(SAMPLE).expect("valid xml");
        let mut doc = sample_doc();
        comments.apply(&mut doc);

        let operation =
            doc.paths.paths["/grapes/{id}"].get.as_ref().expect("get operation is present");
        assert_eq!(operation.summary.as_deref(), Some("Looks up a grape by its VIVC number."));
        assert_eq!(operation.description.as_deref(), Some("Served from the catalog."));

        let params = operation.parameters.as_ref().expect("parameters");
        assert_eq!(params[0].description.as_deref(), Some("VIVC variety number"));

        let Some(RefOr::T(ok)) = operation.responses.responses.get("200") else {
            panic!("200 response missing");
        };
        assert_eq!(ok.description, "The grape variety");

        let components = doc.components.expect("components");
        let Some(RefOr::T(Schema::Object(grape))) = components.schemas.get("Grape") else {
            panic!("Grape schema missing");
        };
        assert_eq!(grape.description.as_deref(), Some("A grape variety."));
        let Some(RefOr::T(Schema::Object(color))) = grape.properties.get("color") else {
            panic!("color property missing");
        };
        assert_eq!(color.description.as_deref(), Some("Berry skin color."));
        let Some(RefOr::T(Schema::Object(name))) = grape.properties.get("name") else {
            panic!("name property missing");
        };
        assert!(name.description.is_none());
    }

    #[test]
    fn inline_markup_is_flattened_to_text() {
        let raw = r#"<doc><members>
            <member name="M:grape_by_id">
                <summary>Looks up a <c>Grape</c> by id. See <see cref="T:Wine.Api.Grape"/>.</summary>
                <remarks><para>First.</para><para>Returns <see langword="null"/> when absent.</para></remarks>
                <param name="id">The <paramref name="id"/> &amp; nothing else.</param>
                <returns><![CDATA[The <grape>]]></returns>
            </member>
        </members></doc>"#;

        let comments = XmlComments::parse(raw).expect("inline markup is valid");
        let member = &comments.members["M:grape_by_id"];

        assert_eq!(member.summary.as_deref(), Some("Looks up a `Grape` by id. See Grape."));
        assert_eq!(member.remarks.as_deref(), Some("First. Returns null when absent."));
        assert_eq!(member.params["id"], "The id & nothing else.");
        assert_eq!(member.returns.as_deref(), Some("The <grape>"));
    }

    #[test]
    fn missing_file_is_tolerated() {
        let dir = tempdir().expect("temp dir");
        let loaded = XmlComments::load(&dir.path().join("absent.xml")).expect("no error");
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_file_fails() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.xml");
        fs::write(&path, "<doc><members><member name=\"M:x\">").expect("write");

        let err = XmlComments::load(&path).expect_err("malformed xml");
        assert!(matches!(err, DocsError::Parse { context: Some(_), .. }));
    }

    #[test]
    fn default_path_uses_xml_extension() {
        let path = XmlComments::default_path().expect("current exe");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("xml"));
    }
}
