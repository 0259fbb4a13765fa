//! Structures de l'enveloppe SOAP et leur (dé)sérialisation XML
//!
//! L'encodage produit :
//!
//! ```text
//! <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
//!   <soap:Header>...</soap:Header>        (seulement si des items sont enregistrés)
//!   <soap:Body><Operation xmlns="urn:...">...</Operation></soap:Body>
//! </soap:Envelope>
//! ```
//!
//! Le décodage est un seul passage sur les événements XML : le premier
//! élément enfant du Body décide entre Fault et contenu, un second élément
//! est une erreur.

use std::fmt;
use std::sync::Arc;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Reader, Writer};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{DecodeError, EncodeError};
use crate::fault::Fault;

/// Namespace SOAP 1.1 de l'enveloppe
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Préfixe utilisé pour les éléments de l'enveloppe à l'encodage
pub const SOAP_PREFIX: &str = "soap";

/// Writer XML utilisé pour construire les enveloppes
pub type XmlWriter = Writer<Vec<u8>>;

/// A value that travels as the single child element of a SOAP Body.
///
/// The element keeps its own name and namespace: the Body is a transparent
/// container.
pub trait SoapPayload {
    /// Local name of the wrapping element
    const ELEMENT: &'static str;

    /// Default namespace declared on the wrapping element, if any
    const NAMESPACE: &'static str = "";
}

impl<T: SoapPayload + ?Sized> SoapPayload for &T {
    const ELEMENT: &'static str = T::ELEMENT;
    const NAMESPACE: &'static str = T::NAMESPACE;
}

/// An opaque item of the SOAP Header, serialized on its own.
pub trait HeaderItem: fmt::Debug + Send + Sync {
    fn write_xml(&self, writer: &mut XmlWriter) -> Result<(), EncodeError>;
}

/// En-tête SOAP : séquence ordonnée d'items
#[derive(Debug, Clone, Default)]
pub struct Header {
    items: Vec<Arc<dyn HeaderItem>>,
}

impl Header {
    pub fn new(items: Vec<Arc<dyn HeaderItem>>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: Arc<dyn HeaderItem>) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[Arc<dyn HeaderItem>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Corps SOAP : un fault, un contenu typé, ou rien
#[derive(Debug, Clone, PartialEq)]
pub enum Body<T> {
    Content(T),
    Fault(Fault),
    /// Body sans élément enfant ("no data returned")
    Empty,
}

impl<T> Body<T> {
    pub fn content(&self) -> Option<&T> {
        match self {
            Body::Content(content) => Some(content),
            _ => None,
        }
    }

    pub fn into_content(self) -> Option<T> {
        match self {
            Body::Content(content) => Some(content),
            _ => None,
        }
    }

    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Body::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

/// Enveloppe SOAP complète
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    /// En-tête SOAP optionnel
    pub header: Option<Header>,

    /// Corps SOAP
    pub body: Body<T>,
}

impl<T> Envelope<T> {
    /// Crée une nouvelle enveloppe SOAP
    pub fn new(body: Body<T>) -> Self {
        Self { header: None, body }
    }

    /// Crée une nouvelle enveloppe avec header
    ///
    /// Un header vide est ignoré : aucun `<soap:Header/>` n'est émis.
    pub fn with_header(header: Header, body: Body<T>) -> Self {
        Self {
            header: (!header.is_empty()).then_some(header),
            body,
        }
    }
}

impl<T: Serialize + SoapPayload> Envelope<T> {
    /// Sérialise l'enveloppe en XML
    pub fn to_xml(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer = Writer::new(Vec::new());
        let envelope = format!("{SOAP_PREFIX}:Envelope");
        let header = format!("{SOAP_PREFIX}:Header");
        let body = format!("{SOAP_PREFIX}:Body");
        let xmlns = format!("xmlns:{SOAP_PREFIX}");

        emit(
            &mut writer,
            Event::Start(
                BytesStart::new(envelope.as_str()).with_attributes([(xmlns.as_str(), SOAP_ENV_NS)]),
            ),
        )?;

        if let Some(items) = self.header.as_ref().filter(|h| !h.is_empty()) {
            emit(&mut writer, Event::Start(BytesStart::new(header.as_str())))?;
            for item in items.items() {
                item.write_xml(&mut writer)?;
            }
            emit(&mut writer, Event::End(BytesEnd::new(header.as_str())))?;
        }

        emit(&mut writer, Event::Start(BytesStart::new(body.as_str())))?;
        match &self.body {
            Body::Content(content) => write_payload(&mut writer, content)?,
            Body::Fault(fault) => fault.write_xml(&mut writer)?,
            Body::Empty => {}
        }
        emit(&mut writer, Event::End(BytesEnd::new(body.as_str())))?;
        emit(&mut writer, Event::End(BytesEnd::new(envelope.as_str())))?;

        Ok(writer.into_inner())
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Parse une enveloppe SOAP dont le contenu est de type `T`
    pub fn from_xml(xml: &[u8]) -> Result<Self, DecodeError> {
        let input = std::str::from_utf8(xml).map_err(|e| DecodeError::Xml(e.to_string()))?;
        let mut reader = NsReader::from_str(input);
        reader.config_mut().trim_text(true);

        // Racine : soap:Envelope
        loop {
            let (resolve, event) = reader.read_resolved_event().map_err(xml_error)?;
            match event {
                Event::Start(e) if is_soap(&resolve, e.local_name().as_ref(), b"Envelope") => {
                    break;
                }
                Event::Empty(e) if is_soap(&resolve, e.local_name().as_ref(), b"Envelope") => {
                    return Err(DecodeError::MissingBody);
                }
                Event::Start(_) | Event::Empty(_) | Event::Eof => {
                    return Err(DecodeError::MissingEnvelope);
                }
                _ => {}
            }
        }

        // Enfants de l'enveloppe : on saute tout jusqu'au Body
        loop {
            let (resolve, event) = reader.read_resolved_event().map_err(xml_error)?;
            match event {
                Event::Start(e) => {
                    let is_body = is_soap(&resolve, e.local_name().as_ref(), b"Body");
                    if is_body {
                        let body = decode_body(&mut reader, input)?;
                        return Ok(Envelope::new(body));
                    }
                    reader.read_to_end(e.name()).map_err(xml_error)?;
                }
                Event::Empty(e) if is_soap(&resolve, e.local_name().as_ref(), b"Body") => {
                    return Ok(Envelope::new(Body::Empty));
                }
                Event::End(_) | Event::Eof => return Err(DecodeError::MissingBody),
                _ => {}
            }
        }
    }
}

/// Décode le contenu du Body ; le reader est positionné juste après `<soap:Body>`
///
/// The first child is only located here; it is deserialized once `</Body>`
/// has been reached, so a second sibling always wins as the reported error.
fn decode_body<T: DeserializeOwned>(
    reader: &mut NsReader<&[u8]>,
    input: &str,
) -> Result<Body<T>, DecodeError> {
    // (début, fin, fault, nom local) du premier enfant
    let mut first: Option<(usize, usize, bool, Vec<u8>)> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let (resolve, event) = reader.read_resolved_event().map_err(xml_error)?;
        match event {
            Event::Start(e) => {
                if first.is_some() {
                    return Err(DecodeError::MultipleBodyElements);
                }
                let is_fault = is_soap(&resolve, e.local_name().as_ref(), b"Fault");
                reader.read_to_end(e.name()).map_err(xml_error)?;
                let end = reader.buffer_position() as usize;
                first = Some((start, end, is_fault, e.local_name().as_ref().to_vec()));
            }
            Event::Empty(e) => {
                if first.is_some() {
                    return Err(DecodeError::MultipleBodyElements);
                }
                let is_fault = is_soap(&resolve, e.local_name().as_ref(), b"Fault");
                let end = reader.buffer_position() as usize;
                first = Some((start, end, is_fault, e.local_name().as_ref().to_vec()));
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(DecodeError::Xml(
                    "unexpected end of document inside SOAP Body".to_string(),
                ));
            }
            _ => {}
        }
    }

    match first {
        Some((start, end, is_fault, local_name)) => {
            decode_element(&input[start..end], is_fault, &local_name)
        }
        None => Ok(Body::Empty),
    }
}

fn decode_element<T: DeserializeOwned>(
    fragment: &str,
    is_fault: bool,
    local_name: &[u8],
) -> Result<Body<T>, DecodeError> {
    let fragment = fragment.trim_start();
    let content_error = |e: quick_xml::DeError| DecodeError::Content {
        element: String::from_utf8_lossy(local_name).into_owned(),
        message: e.to_string(),
    };

    if is_fault {
        let fault: Fault = quick_xml::de::from_str(fragment).map_err(content_error)?;
        Ok(Body::Fault(fault))
    } else {
        let content: T = quick_xml::de::from_str(fragment).map_err(content_error)?;
        Ok(Body::Content(content))
    }
}

fn is_soap(resolve: &ResolveResult, local_name: &[u8], expected: &[u8]) -> bool {
    local_name == expected
        && matches!(resolve, ResolveResult::Bound(Namespace(ns)) if *ns == SOAP_ENV_NS.as_bytes())
}

fn xml_error(e: quick_xml::Error) -> DecodeError {
    DecodeError::Xml(e.to_string())
}

pub(crate) fn emit<'a>(writer: &mut XmlWriter, event: Event<'a>) -> Result<(), EncodeError> {
    writer
        .write_event(event)
        .map_err(|e| EncodeError::Write(e.to_string()))
}

/// Sérialise `payload` comme élément unique, en déclarant son namespace
///
/// Le payload passe d'abord par le sérialiseur serde de quick-xml, puis ses
/// événements sont recopiés dans `writer` en ajoutant `xmlns` sur la racine.
pub fn write_payload<T: Serialize + SoapPayload>(
    writer: &mut XmlWriter,
    payload: &T,
) -> Result<(), EncodeError> {
    let xml = quick_xml::se::to_string_with_root(T::ELEMENT, payload)
        .map_err(|e| EncodeError::Serialize(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut root = true;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| EncodeError::Serialize(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(start) if root => {
                root = false;
                emit(writer, Event::Start(with_namespace(start, T::NAMESPACE)))?;
            }
            Event::Empty(start) if root => {
                root = false;
                emit(writer, Event::Empty(with_namespace(start, T::NAMESPACE)))?;
            }
            other => emit(writer, other)?,
        }
    }
    Ok(())
}

fn with_namespace<'a>(mut start: BytesStart<'a>, namespace: &str) -> BytesStart<'a> {
    if !namespace.is_empty() {
        start.push_attribute(("xmlns", namespace));
    }
    start
}
