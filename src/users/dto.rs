use serde::{Deserialize, Serialize};

use crate::users::model::PublicUser;

/// `GET /users?page=&limit=&search=`
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersPage {
    pub users: Vec<PublicUser>,
    pub total_users: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_page_serializes_camel_case() {
        let page = UsersPage {
            users: vec![],
            total_users: 0,
            total_pages: 0,
            current_page: 1,
        };
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("totalUsers"));
        assert!(json.contains("totalPages"));
        assert!(json.contains("currentPage"));
    }

    #[test]
    fn list_query_fields_are_optional() {
        let q: ListUsersQuery = serde_json::from_str("{}").unwrap();
        assert!(q.page.is_none());
        assert!(q.limit.is_none());
        assert!(q.search.is_none());
    }
}
