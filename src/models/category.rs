#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub active: bool,
}

impl Category {
    pub fn blank() -> Self {
        Self {
            id: 0,
            name: String::new(),
            description: None,
            display_order: 0,
            active: true,
        }
    }
}
