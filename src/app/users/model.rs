use crate::domain::ports::{Notification, Request};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub age: i32,
}

/// 建立使用者的命令
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl Request for CreateUser {
    type Response = User;
    const NAME: &'static str = "CreateUser";
}

/// 依 id 查詢使用者；不存在時回傳 `None`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUser {
    pub id: u64,
}

impl Request for GetUser {
    type Response = Option<User>;
    const NAME: &'static str = "GetUser";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreated {
    pub user: User,
}

impl Notification for UserCreated {
    const NAME: &'static str = "UserCreated";
}
