use chrono::{DateTime, NaiveDate, Utc};

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Client {
    /// An unsaved client; `id == 0` until the insert returns one.
    pub fn blank() -> Self {
        Self {
            id: 0,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            birthdate: None,
            address: None,
            notes: None,
            created_at: None,
        }
    }

    /// Case-insensitive match on name and e-mail, plain substring on phone.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        let lower = term.to_lowercase();
        self.name.to_lowercase().contains(&lower)
            || self.email.to_lowercase().contains(&lower)
            || self.phone.contains(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Client {
        Client {
            name: "Ana Silva".into(),
            email: "Ana@Example.com".into(),
            phone: "(11) 98765-4321".into(),
            ..Client::blank()
        }
    }

    #[test]
    fn search_matches_name_email_and_phone() {
        let client = ana();
        assert!(client.matches("silva"));
        assert!(client.matches("ana@example"));
        assert!(client.matches("98765"));
        assert!(client.matches("   "));
        assert!(!client.matches("carlos"));
    }
}
