use strum::{Display, FromRepr};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, FromRepr)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        Role::from_repr(id)
    }

    /// Roles allowed to read reports and delete attendance rows.
    pub fn can_review_attendance(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}
