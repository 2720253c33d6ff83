//! Operation catalogue.
//!
//! Every service operation is a variant of [`Operation`]; the permission it
//! demands, its conventional name and its error-code ordinal are all derived
//! from the variant and the owning [`Resource`].

use depot_auth::Permission;
use depot_core::{Association, Resource};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Get,
    Update,
    Delete,
    ListChildren(Association),
    AddChildren(Association),
    GetChild(Association),
    UpdateChild(Association),
    RemoveChild(Association),
}

impl Operation {
    /// All operations a resource exposes: its own CRUD plus five per owned
    /// association.
    pub fn all_for(resource: Resource) -> Vec<Operation> {
        let mut ops = vec![
            Operation::List,
            Operation::Create,
            Operation::Get,
            Operation::Update,
            Operation::Delete,
        ];
        for a in resource.associations() {
            ops.extend([
                Operation::ListChildren(a),
                Operation::AddChildren(a),
                Operation::GetChild(a),
                Operation::UpdateChild(a),
                Operation::RemoveChild(a),
            ]);
        }
        ops
    }

    pub fn association(self) -> Option<Association> {
        match self {
            Operation::ListChildren(a)
            | Operation::AddChildren(a)
            | Operation::GetChild(a)
            | Operation::UpdateChild(a)
            | Operation::RemoveChild(a) => Some(a),
            _ => None,
        }
    }

    /// Whether the operation is scoped to an existing parent record.
    pub fn needs_parent(self) -> bool {
        !matches!(self, Operation::List | Operation::Create)
    }

    /// Whether the operation targets a single child of the parent.
    pub fn needs_child(self) -> bool {
        matches!(
            self,
            Operation::GetChild(_) | Operation::UpdateChild(_) | Operation::RemoveChild(_)
        )
    }

    /// Whether a successful call creates something (HTTP 201).
    pub fn creates(self) -> bool {
        matches!(self, Operation::Create | Operation::AddChildren(_))
    }

    /// 1-based ordinal within the resource, used in error codes (`..H<ordinal>-..`).
    pub fn ordinal(self) -> u8 {
        let nested = |a: Association, k: u8| 6 + a.position() * 5 + k;
        match self {
            Operation::List => 1,
            Operation::Create => 2,
            Operation::Get => 3,
            Operation::Update => 4,
            Operation::Delete => 5,
            Operation::ListChildren(a) => nested(a, 0),
            Operation::AddChildren(a) => nested(a, 1),
            Operation::GetChild(a) => nested(a, 2),
            Operation::UpdateChild(a) => nested(a, 3),
            Operation::RemoveChild(a) => nested(a, 4),
        }
    }

    /// The single permission required to run this operation on `resource`.
    pub fn permission(self, resource: Resource) -> Permission {
        let one = resource.singular();
        let name = match self {
            Operation::List => format!("get {}", resource.plural()),
            Operation::Create => format!("create {}", resource.plural()),
            Operation::Get => format!("get {one}"),
            Operation::Update => format!("update {one}"),
            Operation::Delete => format!("delete {one}"),
            Operation::ListChildren(a) => format!("get {} from {one}", a.plural()),
            Operation::AddChildren(a) => format!("add {} to {one}", a.plural()),
            Operation::GetChild(a) => format!("get {} from {one}", a.singular()),
            Operation::UpdateChild(a) => format!("update {} from {one}", a.singular()),
            Operation::RemoveChild(a) => format!("remove {} from {one}", a.singular()),
        };
        Permission::new(name)
    }

    /// Conventional camelCase name, e.g. `getOrders`, `addItems`, `removeItem`.
    pub fn name(self, resource: Resource) -> String {
        let (verb, noun) = match self {
            Operation::List => ("get", resource.plural()),
            Operation::Create => ("create", resource.plural()),
            Operation::Get => ("get", resource.singular()),
            Operation::Update => ("update", resource.singular()),
            Operation::Delete => ("delete", resource.singular()),
            Operation::ListChildren(a) => ("get", a.plural()),
            Operation::AddChildren(a) => ("add", a.plural()),
            Operation::GetChild(a) => ("get", a.singular()),
            Operation::UpdateChild(a) => ("update", a.singular()),
            Operation::RemoveChild(a) => ("remove", a.singular()),
        };
        let mut out = String::with_capacity(verb.len() + noun.len());
        out.push_str(verb);
        let mut chars = noun.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
        out
    }
}
