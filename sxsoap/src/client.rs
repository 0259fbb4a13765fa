//! RPC engine: encode, POST, decode

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::envelope::{Body, Envelope, Header, HeaderItem, SoapPayload};
use crate::error::{Result, SoapError};
use crate::transport::{ClientConfig, Transport};

/// Client SOAP 1.1.
///
/// Built once per session. Header items registered with [`add_header`] are
/// serialized into every later call. Registration needs `&mut self`, calls
/// only `&self`, so a client can be shared between threads once set up.
///
/// [`add_header`]: SoapClient::add_header
#[derive(Debug)]
pub struct SoapClient {
    config: ClientConfig,
    transport: Transport,
    headers: Header,
}

impl SoapClient {
    pub fn new(config: ClientConfig) -> Self {
        let transport = Transport::new(&config);
        Self {
            config,
            transport,
            headers: Header::default(),
        }
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Ajoute un élément de header envoyé avec chaque appel suivant
    pub fn add_header(&mut self, item: impl HeaderItem + 'static) {
        self.headers.push(Arc::new(item));
    }

    pub fn add_shared_header(&mut self, item: Arc<dyn HeaderItem>) {
        self.headers.push(item);
    }

    pub fn headers(&self) -> &Header {
        &self.headers
    }

    pub fn build_envelope<'r, Req>(&self, request: &'r Req) -> Envelope<&'r Req> {
        Envelope::with_header(self.headers.clone(), Body::Content(request))
    }

    /// Sérialise la requête telle qu'elle serait envoyée pour `action`
    pub fn encode_request<Req>(&self, action: &str, request: &Req) -> Result<Vec<u8>>
    where
        Req: Serialize + SoapPayload,
    {
        self.build_envelope(request)
            .to_xml()
            .map_err(|e| SoapError::encode(action, e))
    }

    /// Appelle `action` et remplit `response` avec le contenu du Body
    ///
    /// An empty reply, or a Body without any child, leaves `response`
    /// untouched. A Fault is returned as [`SoapError::Fault`] and `response`
    /// is not modified either.
    pub fn call<Req, Resp>(&self, action: &str, request: &Req, response: &mut Resp) -> Result<()>
    where
        Req: Serialize + SoapPayload,
        Resp: DeserializeOwned,
    {
        let payload = self.encode_request(action, request)?;
        debug!(
            action = %action,
            element = Req::ELEMENT,
            headers = self.headers.len(),
            bytes = payload.len(),
            "SOAP call"
        );

        let raw = self
            .transport
            .post(action, &payload)
            .map_err(|e| SoapError::transport(action, e))?;

        if raw.is_empty() {
            debug!(action = %action, "empty SOAP response");
            return Ok(());
        }

        let envelope = Envelope::<Resp>::from_xml(&raw).map_err(|e| {
            debug!(
                action = %action,
                body = %String::from_utf8_lossy(&raw),
                "undecodable SOAP response"
            );
            SoapError::decode(action, e)
        })?;

        match envelope.body {
            Body::Content(content) => {
                *response = content;
                Ok(())
            }
            Body::Fault(fault) => {
                debug!(action = %action, code = %fault.code, message = %fault.message, "SOAP fault");
                Err(SoapError::fault(action, fault))
            }
            Body::Empty => Ok(()),
        }
    }

    /// Variante de [`call`](SoapClient::call) qui renvoie une réponse neuve
    pub fn invoke<Req, Resp>(&self, action: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + SoapPayload,
        Resp: DeserializeOwned + Default,
    {
        let mut response = Resp::default();
        self.call(action, request, &mut response)?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::SecurityHeader;

    #[derive(Serialize)]
    struct VersionGet {}

    impl SoapPayload for VersionGet {
        const ELEMENT: &'static str = "VersionGet";
        const NAMESPACE: &'static str = "urn:thesecretserver.com";
    }

    #[test]
    fn request_without_headers_has_no_header_element() {
        let client = SoapClient::new(ClientConfig::new("http://localhost:1/ws"));
        let xml = client.encode_request("urn:thesecretserver.com/VersionGet", &VersionGet {}).unwrap();
        let xml = String::from_utf8(xml).unwrap();

        assert!(!xml.contains("Header"));
        assert!(xml.contains(r#"<VersionGet xmlns="urn:thesecretserver.com"/>"#)
            || xml.contains(r#"<VersionGet xmlns="urn:thesecretserver.com"></VersionGet>"#));
    }

    #[test]
    fn registered_header_goes_into_every_request() {
        let mut client = SoapClient::new(ClientConfig::new("http://localhost:1/ws"));
        client.add_header(SecurityHeader::new("alice", "pw", "1"));
        assert_eq!(client.headers().len(), 1);

        for _ in 0..2 {
            let xml = client.encode_request("a", &VersionGet {}).unwrap();
            let xml = String::from_utf8(xml).unwrap();
            assert!(xml.contains("<soap:Header><wsse:Security"));
            assert!(xml.contains("<wsse:Username>alice</wsse:Username>"));
        }
    }
}
