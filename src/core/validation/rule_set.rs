use crate::core::validation::rule::{
    CascadeMode, Check, ErasedRule, Predicate, PropertyRule,
};
use crate::core::validation::value::PropertyValue;
use crate::domain::model::ValidationResult;
use crate::domain::ports::Validator;
use async_trait::async_trait;
use futures::FutureExt;
use regex::Regex;
use std::fmt::Display;
use std::future::Future;
use std::sync::OnceLock;
use url::Url;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// 針對模型 `T` 的宣告式驗證器
///
/// 每個屬性以 `rule_for` 開始一條規則鏈，規則在建構階段加入、建構完成後不再變動。
///
/// ```
/// use small_mediator::core::validation::RuleSet;
///
/// struct Signup {
///     email: String,
///     age: i32,
/// }
///
/// let rules = RuleSet::<Signup>::new()
///     .rule_for("email", |s: &Signup| s.email.clone())
///     .not_empty()
///     .email()
///     .rule_for("age", |s: &Signup| s.age)
///     .range(0, 120)
///     .with_message("Age must be between 0 and 120")
///     .build();
///
/// assert_eq!(rules.len(), 2);
/// ```
pub struct RuleSet<T: Send + Sync + 'static> {
    rules: Vec<Box<dyn ErasedRule<T>>>,
}

impl<T: Send + Sync + 'static> Default for RuleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> RuleSet<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// 為指定屬性開始一條規則鏈；屬性名稱會寫入每筆失敗紀錄
    pub fn rule_for<V, F>(self, property: impl Into<String>, accessor: F) -> RuleBuilder<T, V>
    where
        V: PropertyValue,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        RuleBuilder {
            set: self,
            rule: PropertyRule::new(property.into(), Box::new(accessor)),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 已宣告規則的屬性名稱（依宣告順序）
    pub fn properties(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.property()).collect()
    }

    /// 執行全部規則並回傳去重後的結果
    pub async fn validate_async(&self, instance: &T) -> ValidationResult {
        let mut failures = Vec::new();
        for rule in &self.rules {
            failures.extend(rule.evaluate(instance).await);
        }
        ValidationResult::from_failures(failures)
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Validator<T> for RuleSet<T> {
    async fn validate(&self, instance: &T) -> ValidationResult {
        self.validate_async(instance).await
    }
}

/// 單一屬性規則鏈的流式建構器
pub struct RuleBuilder<T: Send + Sync + 'static, V> {
    set: RuleSet<T>,
    rule: PropertyRule<T, V>,
}

impl<T, V> RuleBuilder<T, V>
where
    T: Send + Sync + 'static,
    V: PropertyValue,
{
    fn push(mut self, message: String, predicate: Predicate<V>) -> Self {
        self.rule.checks.push(Check { predicate, message });
        self
    }

    fn check<F>(self, message: String, predicate: F) -> Self
    where
        F: Fn(&V) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.push(message, Predicate::Sync(Box::new(predicate)))
    }

    fn property(&self) -> &str {
        &self.rule.property
    }

    pub fn must_be_defined(self) -> Self {
        let message = format!("{} must be defined", self.property());
        self.check(message, |v: &V| Ok(v.is_defined()))
    }

    pub fn not_empty(self) -> Self {
        let message = format!("{} must not be empty", self.property());
        self.check(message, |v: &V| Ok(!v.is_blank()))
    }

    pub fn email(self) -> Self {
        let message = format!("{} must be a valid email address", self.property());
        self.check(message, |v: &V| {
            Ok(v.as_text().map_or(true, |text| email_regex().is_match(text)))
        })
    }

    /// 僅接受 http / https 網址
    pub fn url(self) -> Self {
        let message = format!("{} must be a valid http(s) URL", self.property());
        self.check(message, |v: &V| {
            Ok(v.as_text().map_or(true, |text| match Url::parse(text) {
                Ok(url) => matches!(url.scheme(), "http" | "https"),
                Err(_) => false,
            }))
        })
    }

    pub fn matches(self, pattern: Regex) -> Self {
        let message = format!("{} is not in the correct format", self.property());
        self.check(message, move |v: &V| {
            Ok(v.as_text().map_or(true, |text| pattern.is_match(text)))
        })
    }

    pub fn min_length(self, min: usize) -> Self {
        let message = format!("{} must be at least {} characters long", self.property(), min);
        self.check(message, move |v: &V| Ok(v.length().map_or(true, |len| len >= min)))
    }

    pub fn max_length(self, max: usize) -> Self {
        let message = format!("{} must be at most {} characters long", self.property(), max);
        self.check(message, move |v: &V| Ok(v.length().map_or(true, |len| len <= max)))
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        let message = format!(
            "{} must be between {} and {} characters long",
            self.property(),
            min,
            max
        );
        self.check(message, move |v: &V| {
            Ok(v.length().map_or(true, |len| len >= min && len <= max))
        })
    }

    pub fn range<N>(self, min: N, max: N) -> Self
    where
        N: Into<f64> + Display + Copy,
    {
        let message = format!("{} must be between {} and {}", self.property(), min, max);
        let (lo, hi) = (min.into(), max.into());
        self.check(message, move |v: &V| {
            Ok(v.as_number().map_or(true, |n| n >= lo && n <= hi))
        })
    }

    pub fn greater_than_or_equal_to<N>(self, min: N) -> Self
    where
        N: Into<f64> + Display + Copy,
    {
        let message = format!(
            "{} must be greater than or equal to {}",
            self.property(),
            min
        );
        let lo = min.into();
        self.check(message, move |v: &V| Ok(v.as_number().map_or(true, |n| n >= lo)))
    }

    pub fn less_than_or_equal_to<N>(self, max: N) -> Self
    where
        N: Into<f64> + Display + Copy,
    {
        let message = format!("{} must be less than or equal to {}", self.property(), max);
        let hi = max.into();
        self.check(message, move |v: &V| Ok(v.as_number().map_or(true, |n| n <= hi)))
    }

    /// 自訂同步條件
    pub fn must_be<F>(self, predicate: F) -> Self
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        let message = format!("{} is invalid", self.property());
        self.check(message, move |v: &V| Ok(predicate(v)))
    }

    /// 可能失敗的同步條件；錯誤會轉成驗證失敗
    pub fn must_satisfy<F>(self, predicate: F) -> Self
    where
        F: Fn(&V) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        let message = format!("{} is invalid", self.property());
        self.check(message, predicate)
    }

    pub fn must_be_async<F, Fut>(self, predicate: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.must_satisfy_async(move |v| {
            let pending = predicate(v);
            async move { Ok::<bool, anyhow::Error>(pending.await) }
        })
    }

    pub fn must_satisfy_async<F, Fut>(self, predicate: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        let message = format!("{} is invalid", self.property());
        self.push(
            message,
            Predicate::Async(Box::new(move |v| predicate(v).boxed())),
        )
    }

    /// 覆寫前一個條件的失敗訊息
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        match self.rule.checks.last_mut() {
            Some(check) => check.message = text.into(),
            None => tracing::warn!(
                "with_message on '{}' has no preceding predicate; ignored",
                self.rule.property
            ),
        }
        self
    }

    pub fn cascade(mut self, mode: CascadeMode) -> Self {
        self.rule.cascade = mode;
        self
    }

    /// 結束目前規則並為下一個屬性開始新規則
    pub fn rule_for<W, F>(self, property: impl Into<String>, accessor: F) -> RuleBuilder<T, W>
    where
        W: PropertyValue,
        F: Fn(&T) -> W + Send + Sync + 'static,
    {
        self.build().rule_for(property, accessor)
    }

    pub fn build(self) -> RuleSet<T> {
        let mut set = self.set;
        set.rules.push(Box::new(self.rule));
        set
    }
}

impl<T, V> From<RuleBuilder<T, V>> for RuleSet<T>
where
    T: Send + Sync + 'static,
    V: PropertyValue,
{
    fn from(builder: RuleBuilder<T, V>) -> Self {
        builder.build()
    }
}
