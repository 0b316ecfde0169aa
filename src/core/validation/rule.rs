use crate::core::validation::value::PropertyValue;
use crate::domain::model::ValidationFailure;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// 同一條規則內，前一個檢查失敗後是否繼續執行後續檢查
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadeMode {
    #[default]
    Continue,
    Stop,
}

pub(crate) type SyncPredicate<V> = Box<dyn Fn(&V) -> anyhow::Result<bool> + Send + Sync>;
pub(crate) type AsyncPredicate<V> =
    Box<dyn Fn(V) -> BoxFuture<'static, anyhow::Result<bool>> + Send + Sync>;

pub(crate) enum Predicate<V> {
    Sync(SyncPredicate<V>),
    Async(AsyncPredicate<V>),
}

pub(crate) struct Check<V> {
    pub(crate) predicate: Predicate<V>,
    pub(crate) message: String,
}

/// 綁定在單一屬性上的檢查序列
pub(crate) struct PropertyRule<T, V> {
    pub(crate) property: String,
    pub(crate) accessor: Box<dyn Fn(&T) -> V + Send + Sync>,
    pub(crate) checks: Vec<Check<V>>,
    pub(crate) cascade: CascadeMode,
}

impl<T, V> PropertyRule<T, V> {
    pub(crate) fn new(property: String, accessor: Box<dyn Fn(&T) -> V + Send + Sync>) -> Self {
        Self {
            property,
            accessor,
            checks: Vec::new(),
            cascade: CascadeMode::Continue,
        }
    }

    fn raised(&self, reason: impl std::fmt::Display) -> String {
        format!("Validation of '{}' raised an error: {}", self.property, reason)
    }
}

/// 抹除屬性值型別後的規則，供 `RuleSet` 統一保存
#[async_trait]
pub(crate) trait ErasedRule<T: Send + Sync>: Send + Sync {
    fn property(&self) -> &str;

    async fn evaluate(&self, instance: &T) -> Vec<ValidationFailure>;
}

#[async_trait]
impl<T, V> ErasedRule<T> for PropertyRule<T, V>
where
    T: Send + Sync + 'static,
    V: PropertyValue,
{
    fn property(&self) -> &str {
        &self.property
    }

    async fn evaluate(&self, instance: &T) -> Vec<ValidationFailure> {
        let value = match catch_unwind(AssertUnwindSafe(|| (self.accessor)(instance))) {
            Ok(value) => value,
            Err(payload) => {
                let message = self.raised(panic_message(payload.as_ref()));
                return vec![ValidationFailure::new(&self.property, message, None)];
            }
        };
        let attempted_value = serde_json::to_value(&value).ok();

        let mut failures = Vec::new();
        for check in &self.checks {
            let outcome = match &check.predicate {
                Predicate::Sync(predicate) => run_sync(predicate, &value),
                Predicate::Async(predicate) => run_async(predicate, value.clone()).await,
            };

            let message = match outcome {
                Ok(true) => continue,
                Ok(false) => check.message.clone(),
                Err(e) => {
                    tracing::debug!("Predicate on '{}' raised an error: {}", self.property, e);
                    self.raised(e)
                }
            };

            failures.push(ValidationFailure::new(
                &self.property,
                message,
                attempted_value.clone(),
            ));

            if self.cascade == CascadeMode::Stop {
                break;
            }
        }

        failures
    }
}

fn run_sync<V>(predicate: &SyncPredicate<V>, value: &V) -> anyhow::Result<bool> {
    catch_unwind(AssertUnwindSafe(|| predicate(value)))
        .unwrap_or_else(|payload| Err(anyhow::anyhow!(panic_message(payload.as_ref()))))
}

async fn run_async<V>(predicate: &AsyncPredicate<V>, value: V) -> anyhow::Result<bool> {
    // 建立 future 本身也可能 panic
    let future = match catch_unwind(AssertUnwindSafe(|| predicate(value))) {
        Ok(future) => future,
        Err(payload) => return Err(anyhow::anyhow!(panic_message(payload.as_ref()))),
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => Err(anyhow::anyhow!(panic_message(payload.as_ref()))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
