//! SOAP 1.1 envelopes and response parsing for DomainsAPI.asmx

use livedns_core::config::Credentials;
use livedns_core::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// A `ZoneRecord` element as the service reports it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawZoneRecord {
    pub host: String,
    pub record_type: String,
    pub data: String,
    pub ttl: String,
}

/// Build a request envelope
///
/// Every operation takes the account credentials first, followed by its own
/// parameters. All values are XML-escaped.
pub(crate) fn envelope(
    namespace: &str,
    operation: &str,
    credentials: &Credentials,
    params: &[(&str, &str)],
) -> String {
    let mut body = String::new();
    let fields = [
        ("UserName", credentials.username.as_str()),
        ("Password", credentials.password.as_str()),
        ("DomainName", credentials.domain.as_str()),
    ];
    for (name, value) in fields.iter().chain(params.iter()) {
        body.push_str(&format!("<{name}>{}</{name}>", escape(*value)));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
            r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" "#,
            r#"xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<soap:Body><{op} xmlns="{ns}">{body}</{op}></soap:Body>"#,
            r#"</soap:Envelope>"#
        ),
        op = operation,
        ns = escape(namespace),
        body = body,
    )
}

/// `SOAPAction` header value for an operation
pub(crate) fn soap_action(namespace: &str, operation: &str) -> String {
    format!("\"{}{}\"", namespace, operation)
}

fn malformed(e: impl std::fmt::Display) -> Error {
    Error::provider("livedns", format!("Malformed SOAP response: {}", e))
}

/// Walk every element, calling `visit(path, text)` for each text node.
/// `path` holds the local names of the open elements, outermost first.
fn walk(xml: &str, mut visit: impl FnMut(&[String], Option<&str>) -> Result<()>) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                visit(&path, None)?;
            }
            Event::Empty(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                visit(&path, None)?;
                path.pop();
                visit(&path, None)?;
            }
            Event::End(_) => {
                path.pop();
                visit(&path, None)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(malformed)?;
                visit(&path, Some(&*text))?;
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                visit(&path, Some(text.as_str()))?;
            }
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

/// Extract `faultstring` from a SOAP fault, if the document is one
pub(crate) fn parse_fault(xml: &str) -> Option<String> {
    let mut fault: Option<String> = None;
    let walked = walk(xml, |path, text| {
        if let (Some(last), Some(text)) = (path.last(), text)
            && last == "faultstring"
        {
            fault.get_or_insert_with(String::new).push_str(text);
        }
        Ok(())
    });
    walked.ok().and(fault)
}

/// Extract the text of `<{operation}Result>`
///
/// An empty or self-closing result element yields an empty string. A SOAP
/// fault or a document without the result element is an error.
pub(crate) fn parse_result(xml: &str, operation: &str) -> Result<String> {
    if let Some(fault) = parse_fault(xml) {
        return Err(Error::provider("livedns", format!("SOAP fault: {}", fault)));
    }

    let element = format!("{}Result", operation);
    let mut result: Option<String> = None;
    walk(xml, |path, text| {
        if path.last() == Some(&element) {
            let value = result.get_or_insert_with(String::new);
            if let Some(text) = text {
                value.push_str(text);
            }
        }
        Ok(())
    })?;

    result.ok_or_else(|| malformed(format!("missing {} element", element)))
}

/// Extract every `ZoneRecord` element of a GetZoneRecords response
pub(crate) fn parse_zone_records(xml: &str) -> Result<Vec<RawZoneRecord>> {
    if let Some(fault) = parse_fault(xml) {
        return Err(Error::provider("livedns", format!("SOAP fault: {}", fault)));
    }

    let mut records = Vec::new();
    let mut current: Option<RawZoneRecord> = None;
    let mut saw_result = false;

    walk(xml, |path, text| {
        if path.iter().any(|name| name == "GetZoneRecordsResult") {
            saw_result = true;
        }

        let inside = path.iter().rposition(|name| name == "ZoneRecord");
        match (inside, text) {
            // Entered a record
            (Some(depth), None) if depth + 1 == path.len() && current.is_none() => {
                current = Some(RawZoneRecord::default());
            }
            // Text of a direct child of the record
            (Some(depth), Some(text)) if depth + 2 == path.len() => {
                if let Some(record) = current.as_mut() {
                    let field = match path[depth + 1].as_str() {
                        "Host" => &mut record.host,
                        "Type" => &mut record.record_type,
                        "Data" => &mut record.data,
                        "TTL" => &mut record.ttl,
                        _ => return Ok(()),
                    };
                    field.push_str(text);
                }
            }
            // Left the record
            (None, None) => {
                if let Some(record) = current.take() {
                    records.push(record);
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    if !saw_result {
        return Err(malformed("missing GetZoneRecordsResult element"));
    }
    Ok(records)
}
