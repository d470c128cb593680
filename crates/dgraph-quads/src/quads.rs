//! Deduplicating quad batch builder with server-resolved upsert variables.
//!
//! A [`Quads`] value accumulates one transaction's worth of set/delete facts
//! and edges. Facts may reference nodes whose identity is not yet known to
//! the caller: [`Quads::add_upsert_query`] registers a filtered lookup that
//! the server resolves as part of the same transaction, and returns a
//! variable usable wherever a node reference is expected.

use crate::api::{Facet, NQuad, Request, Value};
use crate::filter::sanitize;
use std::collections::HashMap;
use std::fmt;

/// Object placed by a delete-property quad to remove every value of the
/// predicate.
const STAR_ALL: &str = "_STAR_ALL";

/// Variable bound server-side to the uid of a node matched by an upsert
/// lookup. Obtained from [`Quads::add_upsert_query`]; valid for the batch
/// that allocated it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpsertId(String);

impl fmt::Display for UpsertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a graph node in subject or object position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    /// Transaction-local blank node, rendered as `_:label`.
    Blank(String),
    /// Node already known by uid.
    Uid(String),
    /// Node located by an upsert lookup, rendered as `uid(upsert_id_N)`.
    Upsert(UpsertId),
}

impl NodeRef {
    /// Blank-node reference. The label is sanitized, so a caller-supplied
    /// `_:` prefix or stray structural characters cannot corrupt the quad.
    pub fn blank(label: &str) -> NodeRef {
        NodeRef::Blank(sanitize(label))
    }

    /// Reference to an existing node by uid.
    pub fn uid(uid: &str) -> NodeRef {
        NodeRef::Uid(sanitize(uid))
    }

    /// Reference through an upsert variable.
    pub fn upsert(id: UpsertId) -> NodeRef {
        NodeRef::Upsert(id)
    }

    fn render(&self) -> String {
        match self {
            NodeRef::Blank(label) => format!("_:{label}"),
            NodeRef::Uid(uid) => uid.clone(),
            NodeRef::Upsert(id) => format!("uid({id})"),
        }
    }
}

/// Object of a quad: exactly one of the variants, enforced at construction.
#[derive(Debug, Clone, PartialEq)]
enum Object {
    Str(String),
    Int(i64),
    Bool(bool),
    Node(NodeRef),
    /// Wildcard object of a delete-property quad.
    Wildcard,
}

/// One accumulated fact or edge.
#[derive(Debug, Clone, PartialEq)]
struct Quad {
    subject: NodeRef,
    predicate: String,
    object: Object,
    facets: Vec<Facet>,
}

impl Quad {
    fn to_wire(&self) -> NQuad {
        let (object_value, object_id) = match &self.object {
            Object::Str(s) => (Some(Value::Str(s.clone())), None),
            Object::Int(i) => (Some(Value::Int(*i)), None),
            Object::Bool(b) => (Some(Value::Bool(*b)), None),
            Object::Node(r) => (None, Some(r.render())),
            Object::Wildcard => (Some(Value::Default(STAR_ALL.to_string())), None),
        };
        NQuad {
            subject: self.subject.render(),
            predicate: self.predicate.clone(),
            object_value,
            object_id,
            facets: self.facets.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct UpsertRecord {
    id: UpsertId,
    field: String,
    value: String,
    node_type: String,
}

/// One transaction's mutation batch: set quads, delete quads, and the
/// registry of upsert variables they reference.
///
/// A batch is grown by one workload round, submitted atomically, and
/// [`clear`](Quads::clear)ed for reuse. The same batch object is resubmitted
/// verbatim across a retry sequence; nothing here mutates on submission.
#[derive(Debug, Default)]
pub struct Quads {
    set: Vec<Quad>,
    del: Vec<Quad>,
    // Insertion order drives both id allocation and query synthesis, so the
    // records live in a Vec with a key -> index map alongside.
    upsert_records: Vec<UpsertRecord>,
    upsert_index: HashMap<String, usize>,
}

impl Quads {
    pub fn new() -> Quads {
        Quads::default()
    }

    /// Add a string property. The value is sanitized first; if nothing
    /// remains, the quad is skipped entirely.
    pub fn set_str(&mut self, subject: NodeRef, predicate: &str, value: &str) {
        self.set_str_with_facets(subject, predicate, value, Vec::new());
    }

    pub fn set_str_with_facets(
        &mut self,
        subject: NodeRef,
        predicate: &str,
        value: &str,
        facets: Vec<Facet>,
    ) {
        let clean = sanitize(value);
        if clean.is_empty() {
            return;
        }
        self.set.push(Quad {
            subject,
            predicate: predicate.to_string(),
            object: Object::Str(clean),
            facets,
        });
    }

    /// Add an integer property. Never sanitized, never dropped.
    pub fn set_int(&mut self, subject: NodeRef, predicate: &str, value: i64) {
        self.set_int_with_facets(subject, predicate, value, Vec::new());
    }

    pub fn set_int_with_facets(
        &mut self,
        subject: NodeRef,
        predicate: &str,
        value: i64,
        facets: Vec<Facet>,
    ) {
        self.set.push(Quad {
            subject,
            predicate: predicate.to_string(),
            object: Object::Int(value),
            facets,
        });
    }

    /// Add a boolean property. Never sanitized, never dropped.
    pub fn set_bool(&mut self, subject: NodeRef, predicate: &str, value: bool) {
        self.set_bool_with_facets(subject, predicate, value, Vec::new());
    }

    pub fn set_bool_with_facets(
        &mut self,
        subject: NodeRef,
        predicate: &str,
        value: bool,
        facets: Vec<Facet>,
    ) {
        self.set.push(Quad {
            subject,
            predicate: predicate.to_string(),
            object: Object::Bool(value),
            facets,
        });
    }

    /// Add a node-to-node edge. Either end may be a blank node, a uid, or an
    /// upsert variable.
    pub fn set_edge(&mut self, subject: NodeRef, predicate: &str, object: NodeRef) {
        self.set_edge_with_facets(subject, predicate, object, Vec::new());
    }

    pub fn set_edge_with_facets(
        &mut self,
        subject: NodeRef,
        predicate: &str,
        object: NodeRef,
        facets: Vec<Facet>,
    ) {
        self.set.push(Quad {
            subject,
            predicate: predicate.to_string(),
            object: Object::Node(object),
            facets,
        });
    }

    /// Delete every value of a node property.
    pub fn del_prop(&mut self, subject: NodeRef, predicate: &str) {
        self.del.push(Quad {
            subject,
            predicate: predicate.to_string(),
            object: Object::Wildcard,
            facets: Vec::new(),
        });
    }

    /// Delete a specific edge.
    pub fn del_edge(&mut self, subject: NodeRef, predicate: &str, object: NodeRef) {
        self.del.push(Quad {
            subject,
            predicate: predicate.to_string(),
            object: Object::Node(object),
            facets: Vec::new(),
        });
    }

    /// Register a filtered lookup for the node(s) where
    /// `field == value` and the type matches `node_type`, and return the
    /// variable bound to its uid.
    ///
    /// Requests with an equal `(sanitized value, field, node_type)` key reuse
    /// the existing variable; otherwise the next sequential id is allocated.
    /// This is the sole mechanism for referencing a node whose identity is
    /// not yet known to the caller.
    pub fn add_upsert_query(&mut self, field: &str, value: &str, node_type: &str) -> UpsertId {
        let clean = sanitize(value);
        let key = format!("{clean}:{field}:{node_type}");
        if let Some(&idx) = self.upsert_index.get(&key) {
            return self.upsert_records[idx].id.clone();
        }
        let id = UpsertId(format!("upsert_id_{}", self.upsert_records.len()));
        self.upsert_index.insert(key, self.upsert_records.len());
        self.upsert_records.push(UpsertRecord {
            id: id.clone(),
            field: field.to_string(),
            value: clean,
            node_type: node_type.to_string(),
        });
        id
    }

    /// Quads accumulated for set plus delete. Upsert variables are
    /// bookkeeping and are not counted.
    pub fn size(&self) -> usize {
        self.set.len() + self.del.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Reset the batch for the next round. Variable ids restart from 0.
    pub fn clear(&mut self) {
        self.set.clear();
        self.del.clear();
        self.upsert_records.clear();
        self.upsert_index.clear();
    }

    /// Build the wire-level transaction payload: set and delete lists, the
    /// synthesized lookup query (present iff at least one upsert variable is
    /// registered), and the commit-immediately flag.
    pub fn request(&self) -> Request {
        let query = if self.upsert_records.is_empty() {
            None
        } else {
            Some(self.upsert_query())
        };
        Request {
            query,
            set: self.set.iter().map(Quad::to_wire).collect(),
            delete: self.del.iter().map(Quad::to_wire).collect(),
            commit_now: true,
        }
    }

    /// One stanza per distinct variable, in allocation order, each binding
    /// the variable name to the uid of any node matching its filter.
    fn upsert_query(&self) -> String {
        let mut buf = String::from("query {\n");
        for (i, rec) in self.upsert_records.iter().enumerate() {
            buf.push_str(&format!(
                "\tqu{i}(func: eq({}, \"{}\")) @filter(type({})) {{\n",
                rec.field, rec.value, rec.node_type
            ));
            buf.push_str(&format!("\t\t{} as uid\n", rec.id));
            buf.push_str("\t}\n");
        }
        buf.push('}');
        buf
    }
}

/// Human-readable rendering of the batch: the lookup query and every quad.
/// Diagnostics only; the transport layer never parses this.
impl fmt::Display for Quads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.upsert_records.is_empty() {
            writeln!(f, "# Upsert Query")?;
            writeln!(f, "{}", self.upsert_query())?;
            writeln!(f)?;
        }
        if !self.set.is_empty() {
            writeln!(f, "# Set Quads")?;
            for q in &self.set {
                writeln!(f, "{}", render_quad(q))?;
            }
        }
        if !self.del.is_empty() {
            writeln!(f, "# Del Quads")?;
            for q in &self.del {
                writeln!(f, "{}", render_quad(q))?;
            }
        }
        Ok(())
    }
}

fn render_quad(q: &Quad) -> String {
    let object = match &q.object {
        Object::Str(s) => format!("\"{s}\""),
        Object::Int(i) => i.to_string(),
        Object::Bool(b) => b.to_string(),
        Object::Node(r) => r.render(),
        Object::Wildcard => STAR_ALL.to_string(),
    };
    format!("{} {} {object} .", q.subject.render(), q.predicate)
}
