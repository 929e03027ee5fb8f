//! WS-Security UsernameToken header generation
//!
//! ONVIF devices authenticate SOAP requests with the UsernameToken profile
//! using a password digest: `Base64(SHA1(nonce + created + password))`.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use sha1::{Digest, Sha1};

use crate::escape_xml;

const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
const PASSWORD_DIGEST: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";
const BASE64_BINARY: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// Username and password used to sign every request
#[derive(Clone)]
pub struct UsernameToken {
    username: String,
    password: String,
}

impl UsernameToken {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Build a `wsse:Security` header block with a fresh nonce
    pub fn header(&self) -> String {
        let nonce: [u8; 16] = rand::random();
        self.header_with(&nonce, Utc::now())
    }

    pub(crate) fn header_with(&self, nonce: &[u8], created: DateTime<Utc>) -> String {
        let created = created.to_rfc3339_opts(SecondsFormat::Millis, true);
        let digest = password_digest(nonce, &created, &self.password);

        format!(
            r#"<wsse:Security s:mustUnderstand="1" xmlns:wsse="{wsse}" xmlns:wsu="{wsu}"><wsse:UsernameToken><wsse:Username>{username}</wsse:Username><wsse:Password Type="{digest_type}">{digest}</wsse:Password><wsse:Nonce EncodingType="{encoding}">{nonce}</wsse:Nonce><wsu:Created>{created}</wsu:Created></wsse:UsernameToken></wsse:Security>"#,
            wsse = WSSE_NS,
            wsu = WSU_NS,
            username = escape_xml(&self.username),
            digest_type = PASSWORD_DIGEST,
            digest = digest,
            encoding = BASE64_BINARY,
            nonce = STANDARD.encode(nonce),
            created = created,
        )
    }
}

// The password must never reach a log line.
impl std::fmt::Debug for UsernameToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsernameToken")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Compute the UsernameToken password digest
pub fn password_digest(nonce: &[u8], created: &str, password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}
