use async_trait::async_trait;
use small_mediator::app::users::{CreateUser, GetUser, UserCreated, UsersModule};
use small_mediator::core::behaviors::{standard_pipeline, TelemetryStats};
use small_mediator::core::pipeline::{BoxResponse, DispatchContext, Next, PipelineBehavior};
use small_mediator::{
    HandlerRegistry, Mediator, MediatorConfig, MediatorError, Notification, NotificationHandler,
    Pipeline, Request, RequestHandler, Result,
};
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

type Trace = Arc<Mutex<Vec<String>>>;

fn users_mediator() -> (Arc<Mediator>, UsersModule) {
    let module = UsersModule::new();
    let mut builder = HandlerRegistry::builder();
    builder.install(&module).unwrap();
    let mediator = Mediator::new(Arc::new(builder.build()), &MediatorConfig::default());
    (Arc::new(mediator), module)
}

fn ada() -> CreateUser {
    CreateUser {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        age: 36,
    }
}

#[tokio::test]
async fn test_send_returns_handler_value() {
    let (mediator, module) = users_mediator();

    let user = assert_ok!(mediator.send(ada()).await);
    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(module.store().len().await, 1);

    let found = assert_ok!(mediator.send(GetUser { id: user.id }).await);
    assert_eq!(found, Some(user));
}

#[tokio::test]
async fn test_unregistered_request_is_not_found() {
    #[derive(Debug)]
    struct DeleteUser;

    impl Request for DeleteUser {
        type Response = ();
        const NAME: &'static str = "DeleteUser";
    }

    let (mediator, _) = users_mediator();
    let err = assert_err!(mediator.send(DeleteUser).await);

    assert!(matches!(err, MediatorError::HandlerNotFound { .. }));
    assert_eq!(err.status_hint(), 404);
}

#[tokio::test]
async fn test_invalid_request_reports_every_property_and_skips_handler() {
    let (mediator, module) = users_mediator();

    let err = assert_err!(
        mediator
            .send(CreateUser {
                name: String::new(),
                email: "invalid-email".to_string(),
                age: -5,
            })
            .await
    );

    let failures = err.failures().expect("validation error");
    assert!(failures.len() >= 3);
    for property in ["email", "name", "age"] {
        assert!(failures.iter().any(|f| f.property_name == property));
    }
    assert_eq!(err.status_hint(), 400);
    assert!(module.store().is_empty().await);
}

#[tokio::test]
async fn test_handler_error_propagates_unchanged() {
    #[derive(Debug)]
    struct Charge;

    impl Request for Charge {
        type Response = u32;
        const NAME: &'static str = "Charge";
    }

    struct DecliningHandler;

    #[async_trait]
    impl RequestHandler for DecliningHandler {
        type Request = Charge;

        async fn handle(&self, _request: &Charge) -> Result<u32> {
            Err(anyhow::anyhow!("card declined").into())
        }
    }

    let mut builder = HandlerRegistry::builder();
    builder.register_handler(DecliningHandler).unwrap();
    let mediator = Mediator::new(Arc::new(builder.build()), &MediatorConfig::default());

    let err = assert_err!(mediator.send(Charge).await);
    assert!(matches!(err, MediatorError::Handler(_)));
    assert_eq!(err.to_string(), "card declined");

    let stats = mediator.telemetry().for_request("Charge").unwrap();
    assert_eq!(stats.failed, 1);
}

struct Recording {
    label: &'static str,
    trace: Trace,
    record_exit: bool,
}

#[async_trait]
impl PipelineBehavior for Recording {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn handle<'a>(&self, _ctx: &'a DispatchContext<'a>, next: Next<'a>) -> Result<BoxResponse> {
        self.trace.lock().unwrap().push(format!("{}-enter", self.label));
        let result = next().await;
        if self.record_exit {
            self.trace.lock().unwrap().push(format!("{}-exit", self.label));
        }
        result
    }
}

#[derive(Debug)]
struct Echo(&'static str);

impl Request for Echo {
    type Response = &'static str;
    const NAME: &'static str = "Echo";
}

struct EchoHandler(Trace);

#[async_trait]
impl RequestHandler for EchoHandler {
    type Request = Echo;

    async fn handle(&self, request: &Echo) -> Result<&'static str> {
        self.0.lock().unwrap().push("Handler".to_string());
        Ok(request.0)
    }
}

#[tokio::test]
async fn test_behaviors_run_in_fixed_onion_order() {
    let trace: Trace = Arc::default();
    let mut builder = HandlerRegistry::builder();
    builder.register_handler(EchoHandler(trace.clone())).unwrap();

    let pipeline = Pipeline::builder()
        .then(Arc::new(Recording { label: "Validation", trace: trace.clone(), record_exit: false }))
        .then(Arc::new(Recording { label: "Logging", trace: trace.clone(), record_exit: true }))
        .then(Arc::new(Recording { label: "Telemetry", trace: trace.clone(), record_exit: true }))
        .build();
    let mediator = Mediator::with_pipeline(Arc::new(builder.build()), pipeline);

    assert_eq!(assert_ok!(mediator.send(Echo("hi")).await), "hi");
    assert_eq!(
        *trace.lock().unwrap(),
        vec![
            "Validation-enter",
            "Logging-enter",
            "Telemetry-enter",
            "Handler",
            "Telemetry-exit",
            "Logging-exit",
        ]
    );
}

#[tokio::test]
async fn test_standard_pipeline_matches_documented_order() {
    let registry = Arc::new(HandlerRegistry::builder().build());
    let pipeline = standard_pipeline(registry, &MediatorConfig::default(), TelemetryStats::new());
    assert_eq!(pipeline.behavior_names(), vec!["Validation", "Logging", "Telemetry"]);
}

#[derive(Debug)]
struct Broadcast;

impl Notification for Broadcast {
    const NAME: &'static str = "Broadcast";
}

struct Subscriber {
    id: usize,
    fail: bool,
    calls: Trace,
}

#[async_trait]
impl NotificationHandler for Subscriber {
    type Notification = Broadcast;

    async fn handle(&self, _notification: &Broadcast) -> Result<()> {
        self.calls.lock().unwrap().push(format!("subscriber-{}", self.id));
        if self.fail {
            return Err(anyhow::anyhow!("subscriber {} is down", self.id).into());
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_publish_runs_every_handler_despite_one_failure() {
    let calls: Trace = Arc::default();
    let mut builder = HandlerRegistry::builder();
    for id in 0..4 {
        builder
            .register_notification_handler(Subscriber { id, fail: id == 1, calls: calls.clone() })
            .unwrap();
    }
    let mediator = Mediator::with_pipeline(Arc::new(builder.build()), Pipeline::empty());

    let report = mediator.publish(Broadcast).await;

    assert_eq!(
        *calls.lock().unwrap(),
        vec!["subscriber-0", "subscriber-1", "subscriber-2", "subscriber-3"]
    );
    assert_eq!(report.handlers, 4);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].message, "subscriber 1 is down");
}

#[tokio::test]
async fn test_publish_user_created_reaches_subscribers() {
    let (mediator, module) = users_mediator();
    let user = assert_ok!(mediator.send(ada()).await);

    let report = mediator.publish(UserCreated { user }).await;
    assert!(report.is_success());
    assert_eq!(report.handlers, 2);

    let journal = module.journal();
    let entries = journal.lock().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], "welcome:ada@example.com");
}

#[tokio::test]
async fn test_concurrent_dispatches_do_not_interfere() {
    let (mediator, module) = users_mediator();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let mediator = mediator.clone();
            tokio::spawn(async move {
                mediator
                    .send(CreateUser {
                        name: format!("user-{}", i),
                        email: format!("user{}@example.com", i),
                        age: 20 + i,
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert_ok!(task.await.unwrap());
    }
    assert_eq!(module.store().len().await, 16);
    assert_eq!(
        mediator.telemetry().for_request("CreateUser").unwrap().succeeded,
        16
    );
}

#[tokio::test]
async fn test_dispatch_timeout_from_config() {
    #[derive(Debug)]
    struct Slow;

    impl Request for Slow {
        type Response = ();
        const NAME: &'static str = "Slow";
    }

    struct SlowHandler;

    #[async_trait]
    impl RequestHandler for SlowHandler {
        type Request = Slow;

        async fn handle(&self, _request: &Slow) -> Result<()> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(())
        }
    }

    let config = MediatorConfig::from_toml_str("[mediator]\ndispatch_timeout_ms = 20\n").unwrap();
    let mut builder = HandlerRegistry::builder();
    builder.register_handler(SlowHandler).unwrap();
    let mediator = Mediator::new(Arc::new(builder.build()), &config);

    let err = assert_err!(mediator.send(Slow).await);
    assert!(matches!(err, MediatorError::Timeout { request: "Slow", .. }));
    assert_eq!(err.status_hint(), 504);

    let stats = mediator.telemetry().for_request("Slow").unwrap();
    assert_eq!(stats.cancelled, 1);
}
