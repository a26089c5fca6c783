// Remote API entity types.
// Defines structs for (de)serializing the JSON bodies of the posts/users API.

use serde::{Deserialize, Serialize};

/// A post. Identity is assigned by the remote and is not durable for created posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

/// Geographic coordinate pair, transmitted as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

/// Postal address of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    pub street: String,
    #[serde(default)]
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    #[serde(default)]
    pub geo: Geo,
}

/// Company a user works for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub catch_phrase: String,
    #[serde(default)]
    pub bs: String,
}

/// A user. Read-only from this application's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub company: Company,
}

/// A comment attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Payload for creating or replacing a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_wire_names() {
        let post: Post = serde_json::from_str(
            r#"{"userId": 1, "id": 3, "title": "ea molestias", "body": "et iusto"}"#,
        )
        .unwrap();
        assert_eq!(post.user_id, 1);
        assert_eq!(post.id, 3);

        let json = serde_json::to_value(&NewPost {
            user_id: 2,
            title: "t".into(),
            body: "b".into(),
        })
        .unwrap();
        assert_eq!(json["userId"], 2);
    }

    #[test]
    fn test_user_nested_shapes() {
        let user: User = serde_json::from_str(
            r#"{
                "id": 7,
                "name": "Kurtis Weissnat",
                "username": "Elwyn.Skiles",
                "email": "Telly.Hoeger@billy.biz",
                "address": {
                    "street": "Rex Trail",
                    "suite": "Suite 280",
                    "city": "Howemouth",
                    "zipcode": "58804-1099",
                    "geo": { "lat": "24.8918", "lng": "21.8984" }
                },
                "phone": "210.067.6132",
                "website": "elvis.io",
                "company": {
                    "name": "Johns Group",
                    "catchPhrase": "Configurable multimedia task-force",
                    "bs": "generate enterprise e-tailers"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(user.address.geo.lat, "24.8918");
        assert_eq!(user.company.catch_phrase, "Configurable multimedia task-force");
    }
}
