use serde::{Deserialize, Serialize};

use workpass_core::{CompanyId, EmployeeId};

/// Role granted to an employee within their company.
///
/// The role set is closed by policy; the scope guards branch on it, so this
/// is a real enum rather than an opaque string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Role::Admin => f.write_str("ADMIN"),
            Role::Manager => f.write_str("MANAGER"),
            Role::Employee => f.write_str("EMPLOYEE"),
        }
    }
}

/// The authenticated identity a request acts as.
///
/// Immutable per request; derived by transport middleware from a validated
/// token. Authentication itself (login, token issuance) happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub id: EmployeeId,
    pub role: Role,
    pub company_id: CompanyId,
}

impl ActorIdentity {
    pub fn new(id: EmployeeId, role: Role, company_id: CompanyId) -> Self {
        Self {
            id,
            role,
            company_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
