//! In-memory tables backing the mock server.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

/// One queue, ticket, asset or user.
#[derive(Clone, Debug)]
pub struct Record {
    pub id: u64,
    pub attributes: Map<String, Value>,
    pub history: Vec<Value>,
}

impl Record {
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("Name").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("id".to_string(), json!(self.id));
        for (k, v) in &self.attributes {
            out.insert(k.clone(), v.clone());
        }
        Value::Object(out)
    }

    pub fn record(&mut self, kind: &str, description: String) {
        let entry = json!({
            "id": self.history.len() + 1,
            "type": kind,
            "description": description,
        });
        self.history.push(entry);
    }
}

#[derive(Debug)]
pub struct Table {
    next_id: u64,
    records: BTreeMap<u64, Record>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: BTreeMap::new(),
        }
    }
}

impl Table {
    pub fn insert(&mut self, attributes: Map<String, Value>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let mut record = Record {
            id,
            attributes,
            history: Vec::new(),
        };
        record.record("Create", "Created".to_string());
        self.records.insert(id, record);
        id
    }

    /// Numeric keys match ids; anything else matches the `Name` attribute.
    pub fn find(&self, key: &str) -> Option<&Record> {
        match key.parse::<u64>() {
            Ok(id) => self.records.get(&id),
            Err(_) => self.records.values().find(|r| r.name() == Some(key)),
        }
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut Record> {
        match key.parse::<u64>() {
            Ok(id) => self.records.get_mut(&id),
            Err(_) => self.records.values_mut().find(|r| r.name() == Some(key)),
        }
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.records.values().any(|r| r.name() == Some(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// All four tables. A fresh store holds the `General` queue and the `root`
/// user, as a fresh RT install does.
#[derive(Debug)]
pub struct Store {
    pub queues: Table,
    pub tickets: Table,
    pub assets: Table,
    pub users: Table,
}

impl Default for Store {
    fn default() -> Self {
        let mut store = Store {
            queues: Table::default(),
            tickets: Table::default(),
            assets: Table::default(),
            users: Table::default(),
        };
        store.queues.insert(attributes(json!({"Name": "General", "Lifecycle": "default", "Disabled": 0})));
        store.users.insert(attributes(json!({"Name": "root", "RealName": "Enoch Root", "Disabled": 0})));
        store
    }
}

fn attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Apply `changes` to `record`, returning one message per changed field.
/// `CustomFields` are merged key by key rather than replaced.
pub fn apply_changes(label: &str, record: &mut Record, changes: Map<String, Value>) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, value) in changes {
        if field == "CustomFields" {
            if let Value::Object(custom) = value {
                let slot = record
                    .attributes
                    .entry("CustomFields")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(existing) = slot {
                    for (name, v) in custom {
                        messages.push(format!("{name} {v} added"));
                        existing.insert(name, v);
                    }
                }
            }
            continue;
        }
        let old = record.attributes.insert(field.clone(), value.clone());
        let message = match old {
            Some(old) => format!("{label} {}: {field} changed from {old} to {value}", record.id),
            None => format!("{label} {}: {field} set to {value}", record.id),
        };
        record.record("Set", message.clone());
        messages.push(message);
    }
    messages
}

/// A TicketSQL subset: `Field = 'value'` clauses joined by `AND`.
///
/// Returns `None` when the query cannot be understood.
pub fn parse_query(query: &str) -> Option<Vec<(String, String)>> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    query
        .split(" AND ")
        .map(|clause| {
            let (field, value) = clause.split_once('=')?;
            let field = field.trim();
            let value = value.trim();
            let value = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
                .unwrap_or(value);
            if field.is_empty() || value.is_empty() || !field.chars().all(|c| c.is_alphanumeric() || c == '.') {
                return None;
            }
            Some((field.to_string(), value.to_string()))
        })
        .collect()
}

pub fn matches(record: &Record, clauses: &[(String, String)]) -> bool {
    clauses.iter().all(|(field, expected)| {
        let actual = if field == "id" {
            Some(Value::from(record.id))
        } else {
            record.attributes.get(field).cloned()
        };
        match actual {
            Some(Value::String(s)) => s.eq_ignore_ascii_case(expected),
            Some(Value::Number(n)) => n.to_string() == *expected,
            _ => false,
        }
    })
}
