use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::fmt;

/// 請求 / 通知的類型識別：以 `TypeId` 查找，以名稱記錄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeIdentity {
    pub id: TypeId,
    pub name: &'static str,
}

impl TypeIdentity {
    pub fn of<T: 'static>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 單一屬性的驗證失敗紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub property_name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempted_value: Option<serde_json::Value>,
}

impl ValidationFailure {
    pub fn new(
        property_name: impl Into<String>,
        message: impl Into<String>,
        attempted_value: Option<serde_json::Value>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            message: message.into(),
            attempted_value,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property_name, self.message)
    }
}

/// 一次驗證的彙總結果，每次驗證都重新建立
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationFailure>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    /// 由失敗清單建立結果，依出現順序去除結構相同的紀錄
    pub fn from_failures(failures: impl IntoIterator<Item = ValidationFailure>) -> Self {
        let mut errors: Vec<ValidationFailure> = Vec::new();
        for failure in failures {
            if !errors.contains(&failure) {
                errors.push(failure);
            }
        }
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// 取得指定屬性的失敗紀錄
    pub fn errors_for<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a ValidationFailure> + 'a {
        self.errors.iter().filter(move |e| e.property_name == property)
    }
}
