//! Users and roles.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{RoleId, UserId, dates};

/// A user role (client, administrator, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier.
    pub id_rol: RoleId,
    /// Role name.
    pub nombre_rol: String,
}

/// A platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id_usuario: UserId,
    /// Full name.
    pub nombres: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    #[serde(default)]
    pub telefono: Option<String>,
    /// National identity document number.
    #[serde(default)]
    pub dui: Option<String>,
    /// Registration date.
    #[serde(default, with = "dates::option_date")]
    pub fecha_registro: Option<NaiveDate>,
    /// Role reference.
    #[serde(default)]
    pub id_rol: Option<RoleId>,
    /// Embedded role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<Role>,
}

impl User {
    /// Role name, when the role is embedded.
    #[must_use]
    pub fn role_name(&self) -> Option<&str> {
        self.rol.as_ref().map(|r| r.nombre_rol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_with_embedded_role() {
        let json = r#"{
            "id_usuario": 4,
            "nombres": "Ana López",
            "email": "ana@example.com",
            "telefono": "5551234567",
            "dui": null,
            "fecha_registro": "2025-03-02",
            "id_rol": 2,
            "rol": {"id_rol": 2, "nombre_rol": "Cliente"}
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id_usuario, UserId::new(4));
        assert_eq!(user.role_name(), Some("Cliente"));
        assert!(user.dui.is_none());
    }
}
