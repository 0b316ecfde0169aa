use serde::Serialize;

/// 規則可檢查的屬性值
///
/// 各種內建規則透過此介面讀取值的「形狀」：是否已定義、文字內容、長度、數值。
/// 不適用的規則對該值直接通過，例如對數值檢查 `email`。
pub trait PropertyValue: Clone + Serialize + Send + Sync + 'static {
    fn is_defined(&self) -> bool {
        true
    }

    fn as_text(&self) -> Option<&str> {
        None
    }

    fn length(&self) -> Option<usize> {
        self.as_text().map(|s| s.chars().count())
    }

    fn as_number(&self) -> Option<f64> {
        None
    }

    /// `not_empty` 的判斷依據
    fn is_blank(&self) -> bool {
        !self.is_defined() || self.length() == Some(0)
    }
}

impl PropertyValue for String {
    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }

    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl PropertyValue for &'static str {
    fn as_text(&self) -> Option<&str> {
        Some(*self)
    }

    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl PropertyValue for bool {}

macro_rules! impl_numeric_value {
    ($($t:ty),*) => {
        $(
            impl PropertyValue for $t {
                fn as_number(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

impl_numeric_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<U: PropertyValue> PropertyValue for Vec<U> {
    fn length(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<U: PropertyValue> PropertyValue for Option<U> {
    fn is_defined(&self) -> bool {
        self.is_some()
    }

    fn as_text(&self) -> Option<&str> {
        self.as_ref().and_then(|v| v.as_text())
    }

    fn length(&self) -> Option<usize> {
        self.as_ref().and_then(|v| v.length())
    }

    fn as_number(&self) -> Option<f64> {
        self.as_ref().and_then(|v| v.as_number())
    }

    fn is_blank(&self) -> bool {
        match self {
            Some(v) => v.is_blank(),
            None => true,
        }
    }
}
