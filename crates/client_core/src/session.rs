use shared::{domain::UserId, protocol::SignInResponse};

/// The signed-in user, held for the lifetime of the running client only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Session {
    pub fn display_name(&self) -> String {
        let name = [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            "Guest".to_string()
        } else {
            name
        }
    }
}

impl From<SignInResponse> for Session {
    fn from(value: SignInResponse) -> Self {
        Self {
            user_id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
        }
    }
}
