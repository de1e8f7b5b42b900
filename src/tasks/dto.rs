use serde::Deserialize;

/// Form body for adding a task.
#[derive(Debug, Deserialize)]
pub struct NewTaskForm {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_apply() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn pagination_accepts_overrides() {
        let p: Pagination = serde_json::from_str(r#"{"limit":10,"offset":30}"#).unwrap();
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset, 30);
    }
}
