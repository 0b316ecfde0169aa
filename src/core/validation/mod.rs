//! 流式驗證規則引擎
//!
//! `RuleSet<T>` 為模型的每個屬性保存一條規則鏈。驗證時依宣告順序執行全部規則，
//! 同一條鏈中的條件預設不會短路，最後依結構去除重複的失敗紀錄。

mod rule;
mod rule_set;
mod value;

pub use rule::CascadeMode;
pub(crate) use rule::panic_message;
pub use rule_set::{RuleBuilder, RuleSet};
pub use value::PropertyValue;
