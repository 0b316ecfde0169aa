use super::model::{CreateUser, GetUser};
use super::store::UserStore;
use crate::core::validation::RuleSet;
use std::sync::Arc;

pub fn create_user_validator(store: Arc<UserStore>) -> RuleSet<CreateUser> {
    RuleSet::new()
        .rule_for("email", |c: &CreateUser| c.email.clone())
        .not_empty()
        .email()
        .must_be_async(move |email: String| {
            let store = store.clone();
            async move { !store.email_taken(&email).await }
        })
        .with_message("Email is already registered")
        .rule_for("name", |c: &CreateUser| c.name.clone())
        .not_empty()
        .max_length(100)
        .rule_for("age", |c: &CreateUser| c.age)
        .range(0, 120)
        .with_message("Age must be between 0 and 120")
        .build()
}

pub fn get_user_validator() -> RuleSet<GetUser> {
    RuleSet::new()
        .rule_for("id", |q: &GetUser| q.id)
        .greater_than_or_equal_to(1)
        .build()
}
