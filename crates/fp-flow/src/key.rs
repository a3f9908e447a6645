use core::fmt;
use std::borrow::Borrow;

/// Identifies a distinguishable quantity: an item, a fluid or an energy channel.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowKey(String);

impl FlowKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlowKey({:?})", self.0)
    }
}

impl From<&str> for FlowKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FlowKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&FlowKey> for FlowKey {
    fn from(key: &FlowKey) -> Self {
        key.clone()
    }
}

impl Borrow<str> for FlowKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
