use serde::{Deserialize, Serialize};

/// Investment plan tiers offered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Starter,
    Silver,
    Bonus,
    Flexible,
}

impl Plan {
    pub fn code(&self) -> &'static str {
        match self {
            Plan::Starter => "starter",
            Plan::Silver => "silver",
            Plan::Bonus => "bonus",
            Plan::Flexible => "flexible",
        }
    }

    pub fn parse(code: &str) -> Option<Plan> {
        match code {
            "starter" => Some(Plan::Starter),
            "silver" => Some(Plan::Silver),
            "bonus" => Some(Plan::Bonus),
            "flexible" => Some(Plan::Flexible),
            _ => None,
        }
    }
}

// Account stored in DynamoDB. The password hash never leaves the server;
// responses carry PublicAccount instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub plan: Plan,
    pub amount: i64,
    pub join_date: String,
}

impl Account {
    pub fn public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            plan: self.plan,
            amount: self.amount,
            join_date: self.join_date.clone(),
        }
    }
}

/// Account as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub plan: Plan,
    pub amount: i64,
    pub join_date: String,
}

// New account row; id and join_date are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub plan: Plan,
    pub amount: i64,
}

/// Validated plan/amount pair written by the investment record service.
#[derive(Debug, Clone, Copy)]
pub struct InvestmentUpdate {
    pub plan: Plan,
    pub amount: i64,
}

// Contact message stored in DynamoDB. Append-only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Caller identity resolved at the request boundary. The operator is a
/// configured credential pair, never a stored account row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Account { id: i64 },
    Operator,
}

impl Identity {
    pub fn is_operator(&self) -> bool {
        matches!(self, Identity::Operator)
    }

    /// Self-or-operator rule applied to every investment read and write.
    pub fn can_access(&self, account_id: i64) -> bool {
        match self {
            Identity::Operator => true,
            Identity::Account { id } => *id == account_id,
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_codes_round_trip() {
        for code in ["starter", "silver", "bonus", "flexible"] {
            assert_eq!(Plan::parse(code).unwrap().code(), code);
        }
        assert_eq!(Plan::parse("gold"), None);
        assert_eq!(Plan::parse("Starter"), None);
    }

    #[test]
    fn operator_accesses_any_account() {
        assert!(Identity::Operator.can_access(7));
        assert!(Identity::Account { id: 7 }.can_access(7));
        assert!(!Identity::Account { id: 7 }.can_access(8));
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("alice@nodot"));
        assert!(!is_valid_email("alice @x.com"));
        assert!(!is_valid_email("alice@.com"));
    }

    #[test]
    fn public_account_omits_password_hash() {
        let account = Account {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            plan: Plan::Silver,
            amount: 2000,
            join_date: "2024-01-01T00:00:00+00:00".to_string(),
        };
        let json = serde_json::to_value(account.public()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["plan"], "silver");
        assert_eq!(json["joinDate"], "2024-01-01T00:00:00+00:00");
    }
}
