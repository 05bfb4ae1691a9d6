use std::str::FromStr;

use mime::Mime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Optional MIME type that serializes as its string form
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaybeMime(pub Option<Mime>);

impl MaybeMime {
    /// The MIME string, falling back to `application/octet-stream`
    pub fn as_str(&self) -> &str {
        self.0
            .as_ref()
            .map(|mime| mime.as_ref())
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
    }
}

impl From<Mime> for MaybeMime {
    fn from(mime: Mime) -> Self {
        MaybeMime(Some(mime))
    }
}

impl Serialize for MaybeMime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Some(mime) => serializer.serialize_str(mime.as_ref()),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for MaybeMime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => Mime::from_str(&s)
                .map(|mime| MaybeMime(Some(mime)))
                .map_err(serde::de::Error::custom),
            None => Ok(MaybeMime(None)),
        }
    }
}
