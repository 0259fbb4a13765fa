//! SOAP Faults

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Deserializer};

use crate::envelope::{SOAP_ENV_NS, SOAP_PREFIX, XmlWriter, emit};
use crate::error::EncodeError;

/// Erreur SOAP (Fault) renvoyée par le serveur
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Fault {
    /// Code d'erreur (ex: "soap:Client", "soap:Server")
    #[serde(rename = "faultcode", default)]
    pub code: String,

    /// Description de l'erreur (`faultstring`)
    #[serde(rename = "faultstring", default)]
    pub message: String,

    /// Acteur à l'origine du fault, optionnel
    #[serde(rename = "faultactor", default)]
    pub actor: Option<String>,

    /// Texte du détail, optionnel
    #[serde(rename = "detail", default, deserialize_with = "detail_text")]
    pub detail: Option<String>,
}

#[derive(Deserialize)]
struct FaultDetail {
    #[serde(rename = "$text", default)]
    text: String,
}

fn detail_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let detail = FaultDetail::deserialize(deserializer)?;
    let text = detail.text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

impl Fault {
    /// Crée un fault SOAP simple
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            actor: None,
            detail: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Écrit l'élément `<soap:Fault>` dans `writer`
    pub(crate) fn write_xml(&self, writer: &mut XmlWriter) -> Result<(), EncodeError> {
        let name = format!("{SOAP_PREFIX}:Fault");
        emit(writer, Event::Start(BytesStart::new(name.as_str())))?;

        write_text_element(writer, "faultcode", &self.code)?;
        write_text_element(writer, "faultstring", &self.message)?;
        if let Some(actor) = &self.actor {
            write_text_element(writer, "faultactor", actor)?;
        }
        if let Some(detail) = &self.detail {
            write_text_element(writer, "detail", detail)?;
        }

        emit(writer, Event::End(BytesEnd::new(name.as_str())))
    }

    /// Construit une enveloppe complète contenant ce fault
    ///
    /// Utile côté serveur ou pour simuler un pair SOAP dans les tests.
    pub fn to_envelope_xml(&self) -> Result<String, EncodeError> {
        let mut writer = Writer::new(Vec::new());
        let envelope = format!("{SOAP_PREFIX}:Envelope");
        let body = format!("{SOAP_PREFIX}:Body");
        let xmlns = format!("xmlns:{SOAP_PREFIX}");

        emit(
            &mut writer,
            Event::Start(
                BytesStart::new(envelope.as_str()).with_attributes([(xmlns.as_str(), SOAP_ENV_NS)]),
            ),
        )?;
        emit(&mut writer, Event::Start(BytesStart::new(body.as_str())))?;
        self.write_xml(&mut writer)?;
        emit(&mut writer, Event::End(BytesEnd::new(body.as_str())))?;
        emit(&mut writer, Event::End(BytesEnd::new(envelope.as_str())))?;

        String::from_utf8(writer.into_inner()).map_err(|e| EncodeError::Write(e.to_string()))
    }
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), EncodeError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_simple_fault() {
        let xml = Fault::new("soap:Client", "Invalid Action")
            .to_envelope_xml()
            .unwrap();

        assert!(xml.contains("<soap:Fault>"));
        assert!(xml.contains("<faultcode>soap:Client</faultcode>"));
        assert!(xml.contains("<faultstring>Invalid Action</faultstring>"));
        assert!(!xml.contains("<detail>"));
        assert!(!xml.contains("<faultactor>"));
    }

    #[test]
    fn test_build_fault_with_detail_escapes_text() {
        let xml = Fault::new("soap:Server", "boom")
            .with_actor("urn:secret-server")
            .with_detail("a < b")
            .to_envelope_xml()
            .unwrap();

        assert!(xml.contains("<faultactor>urn:secret-server</faultactor>"));
        assert!(xml.contains("<detail>a &lt; b</detail>"));
    }

    #[test]
    fn test_deserialize_fault_with_detail() {
        let xml = r#"<soap:Fault xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
            <faultcode>soap:Server</faultcode>
            <faultstring>Server was unable to process request.</faultstring>
            <detail>stack trace</detail>
        </soap:Fault>"#;

        let fault: Fault = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(fault.code, "soap:Server");
        assert_eq!(fault.message, "Server was unable to process request.");
        assert_eq!(fault.actor, None);
        assert_eq!(fault.detail.as_deref(), Some("stack trace"));
    }

    #[test]
    fn test_deserialize_fault_drops_structured_detail() {
        let xml = r#"<soap:Fault xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
            <faultcode>soap:Server</faultcode>
            <faultstring>boom</faultstring>
            <detail><code>42</code></detail>
        </soap:Fault>"#;

        let fault: Fault = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(fault.detail, None);
    }
}
