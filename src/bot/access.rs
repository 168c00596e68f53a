use std::collections::HashSet;

/// Fixed allow-list of Telegram user ids.
#[derive(Debug, Clone)]
pub struct AccessGate {
    allowed: HashSet<u64>,
}

impl AccessGate {
    pub fn new(users: impl IntoIterator<Item = u64>) -> Self {
        Self {
            allowed: users.into_iter().collect(),
        }
    }

    pub fn is_allowed(&self, user_id: u64) -> bool {
        self.allowed.contains(&user_id)
    }
}
