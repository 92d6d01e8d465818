use std::collections::BTreeMap;
use std::path::PathBuf;

/// Identifier of a raw transport knob.
///
/// Named variants cover the knobs this crate sets itself; [`OptionId::Raw`]
/// carries any other numeric option straight to transports that understand it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionId {
    Url,
    CustomRequest,
    PostFields,
    PostRedirect,
    FollowLocation,
    MaxRedirects,
    AutoReferer,
    Referer,
    UserAgent,
    HttpHeader,
    Encoding,
    CookieFile,
    CookieJar,
    CaInfo,
    SslVerifyPeer,
    ConnectTimeout,
    Timeout,
    Proxy,
    HttpProxyTunnel,
    ReturnTransfer,
    HeaderOut,
    Raw(u32),
}

/// Value for a transport knob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
    Path(PathBuf),
}

impl OptionValue {
    /// Truthiness the way libcurl reads long-valued flags.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            OptionValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            OptionValue::Path(p) => p.to_str(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(l) => Some(l),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        OptionValue::List(value)
    }
}

impl From<PathBuf> for OptionValue {
    fn from(value: PathBuf) -> Self {
        OptionValue::Path(value)
    }
}

/// An open map of transport knobs.
///
/// Merging is overwrite-by-key: the layer applied last wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    values: BTreeMap<OptionId, OptionValue>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: OptionId, value: impl Into<OptionValue>) {
        self.values.insert(id, value.into());
    }

    pub fn get(&self, id: OptionId) -> Option<&OptionValue> {
        self.values.get(&id)
    }

    pub fn remove(&mut self, id: OptionId) -> Option<OptionValue> {
        self.values.remove(&id)
    }

    pub fn contains(&self, id: OptionId) -> bool {
        self.values.contains_key(&id)
    }

    /// Overlay `layer` on top of `self`.
    pub fn merge(&mut self, layer: &TransportOptions) {
        for (id, value) in &layer.values {
            self.values.insert(*id, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionId, &OptionValue)> {
        self.values.iter().map(|(id, v)| (*id, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Into<OptionValue>> FromIterator<(OptionId, V)> for TransportOptions {
    fn from_iter<I: IntoIterator<Item = (OptionId, V)>>(iter: I) -> Self {
        let mut options = TransportOptions::new();
        for (id, value) in iter {
            options.set(id, value);
        }
        options
    }
}
