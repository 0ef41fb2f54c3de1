//! Report text to JSON conversion
//!
//! XML reports are mapped the way XML-to-JSON bridges usually do it: the
//! root element becomes the single top-level key, attributes and child
//! elements become members, repeated siblings collapse into arrays and
//! text sitting next to other members is stored under `content`.
//! Reports that are already JSON are re-emitted compactly.

use super::JsonConverter;
use crate::errors::SerializationError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use serde_json::{Map, Value};

const CONTENT_KEY: &str = "content";

#[derive(Debug, Clone, Default)]
pub struct ReportJsonConverter {
    /// Keep every scalar as a string instead of coercing numbers and booleans
    pub keep_strings: bool,
}

impl ReportJsonConverter {
    pub fn new(keep_strings: bool) -> Self {
        Self { keep_strings }
    }

    fn xml_to_json(&self, xml: &str) -> Result<String, SerializationError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut root = Map::new();
        // (element name, members collected so far)
        let mut stack: Vec<(String, Map<String, Value>)> = Vec::new();

        loop {
            match reader.read_event()? {
                XmlEvent::Start(ref e) => {
                    let name = element_name(e);
                    let members = self.attributes(e)?;
                    stack.push((name, members));
                }
                XmlEvent::Empty(ref e) => {
                    let name = element_name(e);
                    let members = self.attributes(e)?;
                    let value = element_value(members);
                    accumulate(parent(&mut stack, &mut root), name, value);
                }
                XmlEvent::Text(ref t) => {
                    if let Some((_, members)) = stack.last_mut() {
                        let text = t.unescape()?;
                        accumulate(members, CONTENT_KEY.to_string(), self.scalar(&text));
                    }
                }
                XmlEvent::CData(t) => {
                    if let Some((_, members)) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                        accumulate(members, CONTENT_KEY.to_string(), Value::String(text));
                    }
                }
                XmlEvent::End(_) => {
                    if let Some((name, members)) = stack.pop() {
                        let value = element_value(members);
                        accumulate(parent(&mut stack, &mut root), name, value);
                    }
                }
                XmlEvent::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if root.is_empty() {
            return Err(SerializationError::NoRootElement);
        }
        Ok(serde_json::to_string(&Value::Object(root))?)
    }

    fn attributes(&self, e: &BytesStart<'_>) -> Result<Map<String, Value>, SerializationError> {
        let mut members = Map::new();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?;
            accumulate(&mut members, key, self.scalar(&value));
        }
        Ok(members)
    }

    fn scalar(&self, text: &str) -> Value {
        if self.keep_strings {
            Value::String(text.to_string())
        } else {
            coerce(text)
        }
    }
}

impl JsonConverter for ReportJsonConverter {
    fn to_json(&self, report: &str) -> Result<String, SerializationError> {
        let trimmed = report.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            let value: Value = serde_json::from_str(trimmed)?;
            return Ok(serde_json::to_string(&value)?);
        }
        self.xml_to_json(report)
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn parent<'a>(
    stack: &'a mut [(String, Map<String, Value>)],
    root: &'a mut Map<String, Value>,
) -> &'a mut Map<String, Value> {
    match stack.last_mut() {
        Some((_, members)) => members,
        None => root,
    }
}

/// Text-only elements collapse to their text, empty ones to ""
fn element_value(mut members: Map<String, Value>) -> Value {
    if members.is_empty() {
        return Value::String(String::new());
    }
    if members.len() == 1 {
        if let Some(content) = members.remove(CONTENT_KEY) {
            return content;
        }
    }
    Value::Object(members)
}

/// Insert `value` under `key`, turning repeated keys into an array
fn accumulate(members: &mut Map<String, Value>, key: String, value: Value) {
    match members.get_mut(&key) {
        None => {
            members.insert(key, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

/// Numbers without leading zeros and the literals true/false/null become
/// typed JSON values; everything else stays a string.
fn coerce(text: &str) -> Value {
    match text {
        "" => return Value::String(String::new()),
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }

    let digits = text.strip_prefix('-').unwrap_or(text);
    let leading_zero = digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
    let numeric_shape = digits.starts_with(|c: char| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'));

    if numeric_shape && !leading_zero {
        if digits.chars().all(|c| c.is_ascii_digit()) {
            // Integers too wide for i64/u64 stay exact as strings
            if let Ok(n) = text.parse::<i64>() {
                return Value::from(n);
            }
            if let Ok(n) = text.parse::<u64>() {
                return Value::from(n);
            }
        } else if let Ok(f) = text.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(xml: &str) -> Value {
        let json = ReportJsonConverter::default().to_json(xml).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_last_scan_report_shape() {
        let xml = r#"<?xml version="1.0"?>
            <OWASPZAPReport version="2.8.0" generated="Mon, 1 Jul 2019">
              <site name="https://example.com" host="example.com" port="443" ssl="true">
                <alerts>
                  <alertitem><pluginid>10016</pluginid><alert>Web Browser XSS Protection Not Enabled</alert><riskcode>1</riskcode></alertitem>
                  <alertitem><pluginid>10021</pluginid><alert>X-Content-Type-Options Header Missing</alert><riskcode>1</riskcode></alertitem>
                </alerts>
              </site>
            </OWASPZAPReport>"#;

        let value = convert(xml);
        let report = &value["OWASPZAPReport"];
        assert_eq!(report["version"], "2.8.0");
        assert_eq!(report["site"]["port"], 443);
        assert_eq!(report["site"]["ssl"], true);

        let items = report["site"]["alerts"]["alertitem"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["pluginid"], 10016);
        assert_eq!(items[1]["alert"], "X-Content-Type-Options Header Missing");
    }

    #[test]
    fn test_mixed_content_and_empty_elements() {
        let value = convert(r#"<a id="1">hello<b/></a>"#);
        assert_eq!(value, json!({"a": {"id": 1, "content": "hello", "b": ""}}));
    }

    #[test]
    fn test_entities_and_cdata() {
        let value = convert("<r><x>a &amp; b</x><y><![CDATA[<p>raw</p>]]></y></r>");
        assert_eq!(value["r"]["x"], "a & b");
        assert_eq!(value["r"]["y"], "<p>raw</p>");
    }

    #[test]
    fn test_keep_strings() {
        let json = ReportJsonConverter::new(true).to_json("<r><n>42</n></r>").unwrap();
        assert_eq!(json, r#"{"r":{"n":"42"}}"#);
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("12"), json!(12));
        assert_eq!(coerce("-3.5"), json!(-3.5));
        assert_eq!(coerce("007"), json!("007"));
        assert_eq!(coerce("0.5"), json!(0.5));
        assert_eq!(coerce("1.2.3"), json!("1.2.3"));
        assert_eq!(coerce("false"), json!(false));
        assert_eq!(coerce("High (Medium)"), json!("High (Medium)"));
    }

    #[test]
    fn test_wide_integers_stay_exact() {
        assert_eq!(coerce("18446744073709551615"), json!(18446744073709551615u64));
        assert_eq!(
            convert("<r><id>12345678901234567891</id></r>"),
            json!({"r": {"id": "12345678901234567891"}})
        );
    }

    #[test]
    fn test_json_report_is_compacted() {
        let json = ReportJsonConverter::default()
            .to_json("{\n  \"site\": []\n}")
            .unwrap();
        assert_eq!(json, r#"{"site":[]}"#);
    }

    #[test]
    fn test_malformed_input() {
        let converter = ReportJsonConverter::default();
        assert!(matches!(
            converter.to_json("{\"broken\": "),
            Err(SerializationError::Json(_))
        ));
        assert!(matches!(
            converter.to_json("<a><b></a>"),
            Err(SerializationError::Xml(_))
        ));
        assert!(matches!(
            converter.to_json("just words"),
            Err(SerializationError::NoRootElement)
        ));
    }
}
