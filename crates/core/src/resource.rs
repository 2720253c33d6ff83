//! Resource and association catalogue.
//!
//! Everything the service layer needs to know about a resource at compile time
//! lives here: names used in permission strings and "not found" messages, the
//! ordinals used to build stable error codes, and the shape of each
//! relationship.

use serde::{Deserialize, Serialize};

/// A top-level resource exposed by the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Category,
    Customer,
    Department,
    Employee,
    Order,
    Permission,
    Quote,
    Role,
    Stock,
    User,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Category,
        Resource::Customer,
        Resource::Department,
        Resource::Employee,
        Resource::Order,
        Resource::Permission,
        Resource::Quote,
        Resource::Role,
        Resource::Stock,
        Resource::User,
    ];

    /// 1-based position, used in error codes (`C<ordinal>H..`).
    pub const fn ordinal(self) -> u8 {
        match self {
            Resource::Category => 1,
            Resource::Customer => 2,
            Resource::Department => 3,
            Resource::Employee => 4,
            Resource::Order => 5,
            Resource::Permission => 6,
            Resource::Quote => 7,
            Resource::Role => 8,
            Resource::Stock => 9,
            Resource::User => 10,
        }
    }

    pub const fn singular(self) -> &'static str {
        match self {
            Resource::Category => "category",
            Resource::Customer => "customer",
            Resource::Department => "department",
            Resource::Employee => "employee",
            Resource::Order => "order",
            Resource::Permission => "permission",
            Resource::Quote => "quote",
            Resource::Role => "role",
            Resource::Stock => "stock",
            Resource::User => "user",
        }
    }

    pub const fn plural(self) -> &'static str {
        match self {
            Resource::Category => "categories",
            Resource::Customer => "customers",
            Resource::Department => "departments",
            Resource::Employee => "employees",
            Resource::Order => "orders",
            Resource::Permission => "permissions",
            Resource::Quote => "quotes",
            Resource::Role => "roles",
            Resource::Stock => "stocks",
            Resource::User => "users",
        }
    }

    /// Relationships owned by this resource (in declaration order).
    pub fn associations(self) -> impl Iterator<Item = Association> {
        Association::ALL.into_iter().filter(move |a| a.parent() == self)
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.singular())
    }
}

/// How a relationship is stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AssociationKind {
    /// One-to-many: the child row carries the parent's id in `foreign_key`.
    HasMany { foreign_key: &'static str },
    /// Many-to-many through a join table whose rows may carry attributes.
    BelongsToMany,
}

/// A nested resource reachable from a parent record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Association {
    CategoryStocks,
    EmployeeQuotes,
    EmployeeSupervisors,
    OrderItems,
    OrderDepartments,
    OrderEmployees,
    RolePermissions,
    UserRoles,
}

impl Association {
    pub const ALL: [Association; 8] = [
        Association::CategoryStocks,
        Association::EmployeeQuotes,
        Association::EmployeeSupervisors,
        Association::OrderItems,
        Association::OrderDepartments,
        Association::OrderEmployees,
        Association::RolePermissions,
        Association::UserRoles,
    ];

    pub const fn parent(self) -> Resource {
        match self {
            Association::CategoryStocks => Resource::Category,
            Association::EmployeeQuotes | Association::EmployeeSupervisors => Resource::Employee,
            Association::OrderItems | Association::OrderDepartments | Association::OrderEmployees => {
                Resource::Order
            }
            Association::RolePermissions => Resource::Role,
            Association::UserRoles => Resource::User,
        }
    }

    /// Resource type of the records on the child side.
    pub const fn target(self) -> Resource {
        match self {
            Association::CategoryStocks => Resource::Stock,
            Association::EmployeeQuotes => Resource::Quote,
            Association::EmployeeSupervisors | Association::OrderEmployees => Resource::Employee,
            Association::OrderItems => Resource::Stock,
            Association::OrderDepartments => Resource::Department,
            Association::RolePermissions => Resource::Permission,
            Association::UserRoles => Resource::Role,
        }
    }

    pub const fn kind(self) -> AssociationKind {
        match self {
            Association::CategoryStocks => AssociationKind::HasMany { foreign_key: "category_id" },
            Association::EmployeeQuotes => AssociationKind::HasMany { foreign_key: "employee_id" },
            _ => AssociationKind::BelongsToMany,
        }
    }

    /// Child name as used in routes, permissions and messages ("supervisor").
    pub const fn singular(self) -> &'static str {
        match self {
            Association::CategoryStocks => "stock",
            Association::EmployeeQuotes => "quote",
            Association::EmployeeSupervisors => "supervisor",
            Association::OrderItems => "item",
            Association::OrderDepartments => "department",
            Association::OrderEmployees => "employee",
            Association::RolePermissions => "permission",
            Association::UserRoles => "role",
        }
    }

    pub const fn plural(self) -> &'static str {
        match self {
            Association::CategoryStocks => "stocks",
            Association::EmployeeQuotes => "quotes",
            Association::EmployeeSupervisors => "supervisors",
            Association::OrderItems => "items",
            Association::OrderDepartments => "departments",
            Association::OrderEmployees => "employees",
            Association::RolePermissions => "permissions",
            Association::UserRoles => "roles",
        }
    }

    /// 0-based position among the parent's associations.
    pub fn position(self) -> u8 {
        let mut pos = 0;
        for a in self.parent().associations() {
            if a == self {
                break;
            }
            pos += 1;
        }
        pos
    }
}

impl core::fmt::Display for Association {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.parent().singular(), self.plural())
    }
}
