#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Service {
    pub id: i32,
    pub category_id: Option<i32>,
    /// Filled by the joined list queries, `None` otherwise.
    #[sqlx(default)]
    pub category_name: Option<String>,
    pub title: String,
    pub description: String,
    pub full_description: Option<String>,
    pub price: f64,
    pub duration_minutes: i32,
    pub active: bool,
    pub featured: bool,
    pub image_url: Option<String>,
}

impl Service {
    pub fn blank() -> Self {
        Self {
            id: 0,
            category_id: None,
            category_name: None,
            title: String::new(),
            description: String::new(),
            full_description: None,
            price: 0.0,
            duration_minutes: 60,
            active: true,
            featured: false,
            image_url: None,
        }
    }

    pub fn price_label(&self) -> String {
        format!("$ {:.2}", self.price)
    }

    pub fn duration_label(&self) -> String {
        let hours = self.duration_minutes / 60;
        let minutes = self.duration_minutes % 60;
        match (hours, minutes) {
            (0, m) => format!("{} min", m),
            (h, 0) => format!("{}h", h),
            (h, m) => format!("{}h{:02}", h, m),
        }
    }
}
