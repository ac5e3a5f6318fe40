use serde::{Deserialize, Serialize};

/// WordprocessingML main namespace (`w:`).
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Runtime identity of a node in the document tree.
///
/// Two nodes can hold identical content and still be distinct nodes; ids are how the
/// model tells them apart (e.g. a cloned row versus its source). Ids are not part of the
/// serialized form: they are regenerated whenever a node is deserialized or copied.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(uuid::Uuid);

impl NodeId {
    /// Allocate a new, never-before-seen identity.
    #[must_use]
    pub fn fresh() -> Self {
        Self(crate::new_uuid())
    }

    pub const fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

/// A namespace declaration (`xmlns` / `xmlns:prefix`) in scope on a table element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub uri: String,
}

impl Namespace {
    pub fn new(prefix: Option<&str>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            uri: uri.into(),
        }
    }
}

/// An element the model does not interpret, preserved as-is.
///
/// Names are kept qualified (`w:p`, `w14:paraId`) so the element can be written back
/// without re-resolving namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmlContent {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlContent::Element(child));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlContent::Text(text.into()));
        self
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlContent::Element(el) => Some(el),
            XmlContent::Text(_) => None,
        })
    }

    /// Visible text of a paragraph-like subtree (`w:t`, with tabs and breaks).
    pub fn run_text(&self) -> String {
        let mut out = String::new();
        collect_run_text(self, &mut out);
        out
    }
}

fn collect_run_text(el: &XmlElement, out: &mut String) {
    match el.local_name() {
        "t" => {
            for child in &el.children {
                if let XmlContent::Text(text) = child {
                    out.push_str(text);
                }
            }
        }
        "tab" => out.push('\t'),
        "br" | "cr" => out.push('\n'),
        _ => {
            for child in el.elements() {
                collect_run_text(child, out);
            }
        }
    }
}

pub(crate) fn local_name(qualified: &str) -> &str {
    qualified
        .split_once(':')
        .map_or(qualified, |(_, local)| local)
}

/// An `ST_OnOff` toggle such as `<w:cantSplit/>` or `<w:tblHeader w:val="false"/>`.
///
/// The element's presence is meaningful on its own: an entry with no `w:val` is "on".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OnOff {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<bool>,
}

impl OnOff {
    pub const fn new(val: bool) -> Self {
        Self { val: Some(val) }
    }

    pub const fn is_set_val(self) -> bool {
        self.val.is_some()
    }

    /// Effective value of a present entry.
    pub const fn resolve(self) -> bool {
        match self.val {
            Some(val) => val,
            None => true,
        }
    }

    /// Parse an `ST_OnOff` attribute value.
    pub fn parse_val(value: &str) -> Option<bool> {
        match value.trim() {
            "true" | "1" | "on" => Some(true),
            "false" | "0" | "off" => Some(false),
            _ => None,
        }
    }
}
