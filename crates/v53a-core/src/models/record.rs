use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A V53a record. Field set is defined by the server, so it is kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn did(&self) -> Option<i64> {
        self.0.get("did").and_then(Value::as_i64)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Fields whose value is a JSON array, in record order
    pub fn array_fields(&self) -> impl Iterator<Item = (&String, &Vec<Value>)> {
        self.0
            .iter()
            .filter_map(|(key, value)| value.as_array().map(|items| (key, items)))
    }
}

/// One page of the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    #[serde(default)]
    pub results: Vec<Record>,
}

impl RecordPage {
    /// Try to view a response as a list page
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.get("results").is_some_and(Value::is_array) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.count.div_ceil(self.page_size)
    }

    /// Find the first record on this page with the given DID
    pub fn find_by_did(&self, did: i64) -> Option<&Record> {
        self.results.iter().find(|r| r.did() == Some(did))
    }
}

/// Response of the last-elements endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastElements {
    #[serde(rename = "ID")]
    pub id: Value,
    #[serde(rename = "DID")]
    pub did: Value,
    #[serde(default)]
    pub lookup_method: Value,
    #[serde(default)]
    pub ctime: Value,
    pub last_elements: Map<String, Value>,
}

impl LastElements {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.get("last_elements").is_some_and(Value::is_object) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}
