//! Field schemas of every resource and join table.
//!
//! The schema is static data: it drives request validation and the
//! constraints the in-memory store enforces (unique columns, references).

use depot_core::{Association, AssociationKind, Resource};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// 1 to 255 characters.
    String,
    Integer,
    Number,
    Boolean,
    Uuid,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    Date,
}

impl FieldType {
    pub const fn describe(self) -> &'static str {
        match self {
            FieldType::String => "a string of 1 to 255 characters",
            FieldType::Integer => "an integer",
            FieldType::Number => "a number",
            FieldType::Boolean => "a boolean",
            FieldType::Uuid => "a uuid",
            FieldType::Date => "an RFC 3339 date",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

const fn req(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec { name, ty, required: true }
}

const fn opt(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec { name, ty, required: false }
}

use FieldType::{Boolean, Date, Integer, Number, String as Str, Uuid};

const CREATED_BY: FieldSpec = opt("created_by", Uuid);

const CATEGORY: &[FieldSpec] = &[req("name", Str), opt("description", Str), CREATED_BY];
const CUSTOMER: &[FieldSpec] = &[
    req("name", Str),
    opt("email", Str),
    opt("phone", Str),
    opt("address", Str),
    CREATED_BY,
];
const DEPARTMENT: &[FieldSpec] = &[req("name", Str), opt("description", Str), CREATED_BY];
const EMPLOYEE: &[FieldSpec] = &[
    req("first_name", Str),
    req("last_name", Str),
    opt("email", Str),
    opt("title", Str),
    opt("hired_at", Date),
    CREATED_BY,
];
const ORDER: &[FieldSpec] = &[
    req("reference", Str),
    req("customer_id", Uuid),
    opt("status", Str),
    opt("placed_at", Date),
    opt("notes", Str),
    CREATED_BY,
];
const PERMISSION: &[FieldSpec] = &[req("name", Str), opt("description", Str), CREATED_BY];
const QUOTE: &[FieldSpec] = &[
    req("title", Str),
    opt("amount", Number),
    opt("valid_until", Date),
    opt("employee_id", Uuid),
    CREATED_BY,
];
const ROLE: &[FieldSpec] = &[req("name", Str), opt("description", Str), CREATED_BY];
const STOCK: &[FieldSpec] = &[
    req("name", Str),
    req("sku", Str),
    opt("quantity", Integer),
    opt("unit_price", Number),
    opt("category_id", Uuid),
    CREATED_BY,
];
const USER: &[FieldSpec] = &[
    req("username", Str),
    req("email", Str),
    opt("employee_id", Uuid),
    CREATED_BY,
];

/// Columns of a resource.
pub fn fields(resource: Resource) -> &'static [FieldSpec] {
    match resource {
        Resource::Category => CATEGORY,
        Resource::Customer => CUSTOMER,
        Resource::Department => DEPARTMENT,
        Resource::Employee => EMPLOYEE,
        Resource::Order => ORDER,
        Resource::Permission => PERMISSION,
        Resource::Quote => QUOTE,
        Resource::Role => ROLE,
        Resource::Stock => STOCK,
        Resource::User => USER,
    }
}

pub fn field(resource: Resource, name: &str) -> Option<&'static FieldSpec> {
    fields(resource).iter().find(|f| f.name == name)
}

/// Attributes carried by the join rows of a many-to-many association.
/// Has-many associations have none.
pub fn join_attributes(association: Association) -> &'static [FieldSpec] {
    const SUPERVISORS: &[FieldSpec] = &[opt("since", Date), opt("primary", Boolean)];
    const ITEMS: &[FieldSpec] = &[opt("quantity", Integer), opt("unit_price", Number)];
    const EMPLOYEES: &[FieldSpec] = &[opt("role", Str)];
    const PERMISSIONS: &[FieldSpec] = &[opt("extra", Str)];

    match association {
        Association::EmployeeSupervisors => SUPERVISORS,
        Association::OrderItems => ITEMS,
        Association::OrderEmployees => EMPLOYEES,
        Association::RolePermissions => PERMISSIONS,
        Association::CategoryStocks
        | Association::EmployeeQuotes
        | Association::OrderDepartments
        | Association::UserRoles => &[],
    }
}

/// Columns whose values must be unique within the table.
pub fn unique_columns(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::Category | Resource::Department | Resource::Permission | Resource::Role => &["name"],
        Resource::Order => &["reference"],
        Resource::Stock => &["sku"],
        Resource::User => &["username"],
        Resource::Customer | Resource::Employee | Resource::Quote => &[],
    }
}

/// `(column, referenced resource)` pairs checked as foreign keys.
pub fn references(resource: Resource) -> &'static [(&'static str, Resource)] {
    match resource {
        Resource::Order => &[("customer_id", Resource::Customer)],
        Resource::Quote => &[("employee_id", Resource::Employee)],
        Resource::Stock => &[("category_id", Resource::Category)],
        Resource::User => &[("employee_id", Resource::Employee)],
        _ => &[],
    }
}

/// Bookkeeping columns that can be sorted on but never written.
pub const TIMESTAMPS: [&str; 2] = ["created_at", "updated_at"];

pub fn is_sortable(resource: Resource, name: &str) -> bool {
    TIMESTAMPS.contains(&name) || field(resource, name).is_some()
}

/// Fields an association update may change: join attributes for
/// many-to-many, the child's own columns for has-many.
pub fn child_update_fields(association: Association) -> &'static [FieldSpec] {
    match association.kind() {
        AssociationKind::HasMany { .. } => fields(association.target()),
        AssociationKind::BelongsToMany => join_attributes(association),
    }
}
