#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    /// Approves or rejects pending gallon requests.
    Administrator = 1,
    /// Verifies stock on approved requests.
    Warehouse = 2,
    /// Manages employee records.
    HrAdmin = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Administrator),
            2 => Some(Role::Warehouse),
            3 => Some(Role::HrAdmin),
            _ => None,
        }
    }
}
