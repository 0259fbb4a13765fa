//! WS-Security `UsernameToken` header (PasswordText profile)

use std::fmt;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::envelope::{HeaderItem, SOAP_PREFIX, XmlWriter, emit};
use crate::error::EncodeError;

pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
pub const PASSWORD_TEXT_TYPE: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

const TOKEN_ID_PREFIX: &str = "UsernameToken-";
const TOKEN_ID_LEN: usize = 9;

/// Credentials carried by a WS-Security header.
///
/// The `id` only has to be unique; it is not a security control.
#[derive(Clone, PartialEq, Eq)]
pub struct UsernameToken {
    pub id: String,
    pub username: String,
    pub password: String,
}

impl UsernameToken {
    /// Builds a token with a freshly generated `UsernameToken-XXXXXXXXX` id
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: generate_token_id(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Same credentials, new id
    pub fn renew(&self) -> Self {
        Self::new(self.username.clone(), self.password.clone())
    }

    pub fn password_type(&self) -> &'static str {
        PASSWORD_TEXT_TYPE
    }

    fn write_xml(&self, writer: &mut XmlWriter) -> Result<(), EncodeError> {
        emit(
            writer,
            Event::Start(BytesStart::new("wsse:UsernameToken").with_attributes([
                ("xmlns:wsu", WSU_NS),
                ("wsu:Id", self.id.as_str()),
            ])),
        )?;

        emit(writer, Event::Start(BytesStart::new("wsse:Username")))?;
        emit(writer, Event::Text(BytesText::new(&self.username)))?;
        emit(writer, Event::End(BytesEnd::new("wsse:Username")))?;

        emit(
            writer,
            Event::Start(
                BytesStart::new("wsse:Password").with_attributes([("Type", PASSWORD_TEXT_TYPE)]),
            ),
        )?;
        emit(writer, Event::Text(BytesText::new(&self.password)))?;
        emit(writer, Event::End(BytesEnd::new("wsse:Password")))?;

        emit(writer, Event::End(BytesEnd::new("wsse:UsernameToken")))
    }
}

impl fmt::Debug for UsernameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernameToken")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// `<wsse:Security>` header item.
///
/// Every serialization renews the token, so each call that carries this
/// header gets its own `wsu:Id` while the credentials stay the same.
#[derive(Debug, Clone)]
pub struct SecurityHeader {
    pub must_understand: Option<String>,
    token: UsernameToken,
}

impl SecurityHeader {
    /// `must_understand` is emitted as `soap:mustUnderstand` unless empty
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        must_understand: &str,
    ) -> Self {
        Self {
            must_understand: (!must_understand.is_empty()).then(|| must_understand.to_string()),
            token: UsernameToken::new(username, password),
        }
    }

    pub fn token(&self) -> &UsernameToken {
        &self.token
    }

    /// Serializes the header with the given token
    pub fn write_with_token(
        &self,
        writer: &mut XmlWriter,
        token: &UsernameToken,
    ) -> Result<(), EncodeError> {
        let must_understand_attr = format!("{SOAP_PREFIX}:mustUnderstand");
        let mut start = BytesStart::new("wsse:Security").with_attributes([("xmlns:wsse", WSSE_NS)]);
        if let Some(flag) = &self.must_understand {
            start.push_attribute((must_understand_attr.as_str(), flag.as_str()));
        }

        emit(writer, Event::Start(start))?;
        token.write_xml(writer)?;
        emit(writer, Event::End(BytesEnd::new("wsse:Security")))
    }
}

impl HeaderItem for SecurityHeader {
    fn write_xml(&self, writer: &mut XmlWriter) -> Result<(), EncodeError> {
        self.write_with_token(writer, &self.token.renew())
    }
}

fn generate_token_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_ID_LEN)
        .map(char::from)
        .collect();
    format!("{TOKEN_ID_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Writer;
    use std::collections::HashSet;

    fn render(header: &SecurityHeader) -> String {
        let mut writer = Writer::new(Vec::new());
        header.write_xml(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn token_id_has_prefix_and_fixed_length() {
        let token = UsernameToken::new("user", "pass");

        assert!(token.id.starts_with("UsernameToken-"));
        let suffix = &token.id["UsernameToken-".len()..];
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn token_ids_do_not_repeat() {
        let ids: HashSet<String> = (0..500).map(|_| UsernameToken::new("u", "p").id).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn renew_keeps_credentials() {
        let token = UsernameToken::new("alice", "s3cret");
        let renewed = token.renew();

        assert_ne!(token.id, renewed.id);
        assert_eq!(renewed.username, "alice");
        assert_eq!(renewed.password, "s3cret");
    }

    #[test]
    fn header_xml_shape() {
        let header = SecurityHeader::new("alice", "p<w", "1");
        let token = UsernameToken {
            id: "UsernameToken-fixed0001".to_string(),
            username: "alice".to_string(),
            password: "p<w".to_string(),
        };
        let mut writer = Writer::new(Vec::new());
        header.write_with_token(&mut writer, &token).unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();

        assert_eq!(
            xml,
            format!(
                concat!(
                    r#"<wsse:Security xmlns:wsse="{wsse}" soap:mustUnderstand="1">"#,
                    r#"<wsse:UsernameToken xmlns:wsu="{wsu}" wsu:Id="UsernameToken-fixed0001">"#,
                    r#"<wsse:Username>alice</wsse:Username>"#,
                    r#"<wsse:Password Type="{ty}">p&lt;w</wsse:Password>"#,
                    r#"</wsse:UsernameToken></wsse:Security>"#
                ),
                wsse = WSSE_NS,
                wsu = WSU_NS,
                ty = PASSWORD_TEXT_TYPE
            )
        );
    }

    #[test]
    fn empty_must_understand_is_omitted() {
        let xml = render(&SecurityHeader::new("u", "p", ""));
        assert!(!xml.contains("mustUnderstand"));
    }

    #[test]
    fn each_serialization_uses_a_new_id() {
        let header = SecurityHeader::new("u", "p", "1");
        let first = render(&header);
        let second = render(&header);

        assert_ne!(first, second);
        assert!(!first.contains(&header.token().id));
    }

    #[test]
    fn debug_output_redacts_password() {
        let header = SecurityHeader::new("alice", "hunter2", "1");
        let debug = format!("{header:?}");

        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
