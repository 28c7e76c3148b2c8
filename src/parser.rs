//! CBS response parsing utilities.
//!
//! CBS emits ampersands and bare hyphens that strict XML rejects, so bodies
//! go through [`sanitize_xml`] before [`parse_document`]. The parsed tree
//! groups every element's children by local name into sequences, which is
//! the shape CBS payloads are navigated in: one level of sequence per step.

use crate::error::CbsError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Escape every `&` and `-` in a raw CBS body.
///
/// Applied to the whole document, markup included. Entities that are already
/// escaped get escaped a second time (`&amp;` becomes `&amp;amp;`), hyphens in
/// attribute values become `&#45;`, and XML comments no longer parse. CBS
/// compatibility depends on exactly this rewriting.
pub fn sanitize_xml(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('-', "&#45;")
}

/// A node of the parsed response tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    /// Leaf element without attributes
    Text(String),
    /// Element with attributes or child elements
    Element(XmlElement),
}

impl XmlValue {
    /// The value if it is a plain text leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Element(_) => None,
        }
    }

    /// Text of a leaf, or the character data of a structured element.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Element(e) => e.text.as_deref(),
        }
    }

    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            Self::Element(e) => Some(e),
            Self::Text(_) => None,
        }
    }
}

/// A structured element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Attributes by qualified name, namespace declarations excluded
    pub attributes: BTreeMap<String, String>,
    /// Character data directly inside this element
    pub text: Option<String>,
    /// Child elements grouped by local name, in document order
    pub children: BTreeMap<String, Vec<XmlValue>>,
}

impl XmlElement {
    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlValue> {
        self.children.get(name).and_then(|values| values.first())
    }

    /// All children with the given local name.
    pub fn children_named(&self, name: &str) -> &[XmlValue] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Walk a path of local names, unwrapping one sequence level per step.
    pub fn path(&self, names: &[&str]) -> Option<&XmlValue> {
        let (last, init) = names.split_last()?;
        let mut current = self;
        for name in init {
            current = current.child(name)?.as_element()?;
        }
        current.child(last)
    }

    /// Structured element at `names`.
    pub fn element_at(&self, names: &[&str]) -> Option<&XmlElement> {
        self.path(names).and_then(XmlValue::as_element)
    }

    /// Text at `names`, see [`XmlValue::text`].
    pub fn text_at(&self, names: &[&str]) -> Option<&str> {
        self.path(names).and_then(XmlValue::text)
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.text {
            Some(ref mut existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    fn into_value(self) -> XmlValue {
        if self.attributes.is_empty() && self.children.is_empty() {
            XmlValue::Text(self.text.unwrap_or_default())
        } else {
            XmlValue::Element(self)
        }
    }
}

/// Parse a (sanitized) XML document.
///
/// Returns a synthetic root whose single child is the document element.
pub fn parse_document(xml: &str) -> Result<XmlElement, CbsError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // (local name, element under construction)
    let mut stack: Vec<(String, XmlElement)> = Vec::new();
    let mut root = XmlElement::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let element = XmlElement {
                    attributes: read_attributes(e)?,
                    ..Default::default()
                };
                stack.push((local_name_str(e), element));
            }

            Ok(Event::Empty(ref e)) => {
                let element = XmlElement {
                    attributes: read_attributes(e)?,
                    ..Default::default()
                };
                let parent = stack.last_mut().map(|(_, p)| p).unwrap_or(&mut root);
                parent
                    .children
                    .entry(local_name_str(e))
                    .or_default()
                    .push(element.into_value());
            }

            Ok(Event::End(_)) => {
                let (name, element) = stack.pop().ok_or_else(|| {
                    CbsError::XmlParse("closing tag without matching opening tag".to_string())
                })?;
                let parent = stack.last_mut().map(|(_, p)| p).unwrap_or(&mut root);
                parent
                    .children
                    .entry(name)
                    .or_default()
                    .push(element.into_value());
            }

            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| CbsError::XmlParse(format!("XML parse error: {}", e)))?;
                if let Some((_, current)) = stack.last_mut() {
                    current.push_text(&text);
                }
            }

            Ok(Event::CData(ref e)) => {
                if let Some((_, current)) = stack.last_mut() {
                    current.push_text(&String::from_utf8_lossy(e));
                }
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(CbsError::XmlParse(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }

            _ => {}
        }

        buf.clear();
    }

    if let Some((name, _)) = stack.last() {
        return Err(CbsError::XmlParse(format!("unclosed element <{}>", name)));
    }
    if root.children.is_empty() {
        return Err(CbsError::XmlParse("document has no root element".to_string()));
    }

    Ok(root)
}

/// Extract local name from element.
fn local_name_str(e: &BytesStart) -> String {
    let name = e.local_name();
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn read_attributes(e: &BytesStart) -> Result<BTreeMap<String, String>, CbsError> {
    let mut attributes = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| CbsError::XmlParse(format!("invalid attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| CbsError::XmlParse(format!("invalid attribute value: {}", e)))?;
        attributes.insert(key, value.into_owned());
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <result:QueryBasicInfoResultMsg xmlns:result="http://www.huawei.com/bme/cbsinterface/cbs/businessmgrmsg">
      <ResultHeader>
        <cbs:ResultCode xmlns:cbs="http://www.huawei.com/bme/cbsinterface/common">405000000</cbs:ResultCode>
        <cbs:ResultDesc xmlns:cbs="http://www.huawei.com/bme/cbsinterface/common">Operation successful</cbs:ResultDesc>
      </ResultHeader>
      <QueryBasicInfoResult>
        <Customer>
          <Name>Tom Jones</Name>
          <Nickname/>
          <Birthday xsi:nil="true"/>
        </Customer>
      </QueryBasicInfoResult>
    </result:QueryBasicInfoResultMsg>
  </soapenv:Body>
</soapenv:Envelope>"#;

    #[test]
    fn test_sanitize_xml() {
        assert_eq!(sanitize_xml("A&B-C"), "A&amp;B&#45;C");
    }

    #[test]
    fn test_sanitize_xml_double_escapes() {
        assert_eq!(sanitize_xml("&amp;"), "&amp;amp;");
        assert_eq!(sanitize_xml("&#45;"), "&amp;#45;");
    }

    #[test]
    fn test_sanitized_text_round_trips() {
        let xml = sanitize_xml("<Desc>Fish & Chips - Ltd</Desc>");
        let doc = parse_document(&xml).unwrap();
        assert_eq!(doc.text_at(&["Desc"]), Some("Fish & Chips - Ltd"));
    }

    #[test]
    fn test_parse_groups_children_by_local_name() {
        let doc = parse_document(&sanitize_xml(RESULT_SAMPLE)).unwrap();
        let msg = doc
            .element_at(&["Envelope", "Body", "QueryBasicInfoResultMsg"])
            .unwrap();
        assert_eq!(msg.text_at(&["ResultHeader", "ResultCode"]), Some("405000000"));
        assert_eq!(
            msg.text_at(&["ResultHeader", "ResultDesc"]),
            Some("Operation successful")
        );
    }

    #[test]
    fn test_leaf_shapes() {
        let doc = parse_document(RESULT_SAMPLE).unwrap();
        let customer = doc
            .element_at(&[
                "Envelope",
                "Body",
                "QueryBasicInfoResultMsg",
                "QueryBasicInfoResult",
                "Customer",
            ])
            .unwrap();

        assert_eq!(customer.child("Name").and_then(XmlValue::as_str), Some("Tom Jones"));
        assert_eq!(customer.child("Nickname").and_then(XmlValue::as_str), Some(""));

        let birthday = customer.child("Birthday").unwrap();
        assert!(birthday.as_str().is_none());
        assert_eq!(
            birthday.as_element().unwrap().attributes.get("xsi:nil").map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn test_repeated_children_keep_order() {
        let doc = parse_document("<List><Item>1</Item><Item>2</Item><Item>3</Item></List>").unwrap();
        let list = doc.element_at(&["List"]).unwrap();
        let items: Vec<_> = list
            .children_named("Item")
            .iter()
            .filter_map(XmlValue::as_str)
            .collect();
        assert_eq!(items, vec!["1", "2", "3"]);
        assert!(list.children_named("Missing").is_empty());
    }

    #[test]
    fn test_path_missing_returns_none() {
        let doc = parse_document(RESULT_SAMPLE).unwrap();
        assert!(doc.path(&["Envelope", "Body", "Fault"]).is_none());
        assert!(doc.path(&[]).is_none());
        // Cannot descend through a text leaf
        assert!(doc
            .path(&["Envelope", "Body", "QueryBasicInfoResultMsg", "ResultHeader", "ResultCode", "X"])
            .is_none());
    }

    #[test]
    fn test_malformed_xml() {
        let result = parse_document("<Envelope><Body></Envelope>");
        assert!(matches!(result, Err(CbsError::XmlParse(_))));
    }

    #[test]
    fn test_unclosed_element() {
        let result = parse_document("<Envelope><Body>");
        assert!(matches!(result, Err(CbsError::XmlParse(_))));
    }

    #[test]
    fn test_unsanitized_ampersand_fails() {
        let result = parse_document("<Desc>Fish & Chips</Desc>");
        assert!(matches!(result, Err(CbsError::XmlParse(_))));
    }
}
