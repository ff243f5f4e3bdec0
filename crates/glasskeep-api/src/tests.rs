//! Handler-level tests, driving the extractors directly against an
//! in-memory store and stub collaborators.

use std::sync::{Arc, Mutex};

use axum::{Json, extract::{Path, State}, http::StatusCode};
use chrono::NaiveDate;
use glasskeep_core::{
  backup::{BackupError, BackupReport, BackupTarget},
  change::{ChangeReceipt, GlassChange},
  customer::{Customer, CustomerRow, CustomerSummary, NewCustomer},
  error::ChangeError,
  notify::{Notifier, NotifyError},
  plan::Plan,
  store::SubscriptionStore,
};
use glasskeep_store_sqlite::SqliteStore;

use crate::{
  ApiState,
  changes::{self, LogChangeBody, NotificationStatus},
  customers::{self, RegisterBody},
  error::ApiError,
  maintenance::{self, BackupBody},
};

// ─── Stub collaborators ──────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingNotifier {
  sent: Mutex<Vec<(String, String)>>,
  fail: bool,
}

impl Notifier for RecordingNotifier {
  async fn notify(
    &self,
    to: &str,
    _subject: &str,
    body: &str,
  ) -> Result<(), NotifyError> {
    if self.fail {
      return Err(NotifyError("mail relay unreachable".into()));
    }
    self.sent.lock().unwrap().push((to.to_owned(), body.to_owned()));
    Ok(())
  }
}

/// Store whose reads fail while the write path still works — simulates a
/// backend hiccup between committing a change and looking up the contact.
struct ReadFailingStore {
  inner: SqliteStore,
}

#[derive(Debug, thiserror::Error)]
#[error("injected read failure")]
struct ReadFailure;

impl SubscriptionStore for ReadFailingStore {
  type Error = ReadFailure;

  async fn register(
    &self,
    input: NewCustomer,
  ) -> Result<Customer, ReadFailure> {
    self.inner.register(input).await.map_err(|_| ReadFailure)
  }

  async fn get_customer(
    &self,
    _id: i64,
  ) -> Result<Option<Customer>, ReadFailure> {
    Err(ReadFailure)
  }

  async fn list_customers(&self) -> Result<Vec<CustomerSummary>, ReadFailure> {
    self.inner.list_customers().await.map_err(|_| ReadFailure)
  }

  async fn customer_table(&self) -> Result<Vec<CustomerRow>, ReadFailure> {
    self.inner.customer_table().await.map_err(|_| ReadFailure)
  }

  async fn changes_for(
    &self,
    customer_id: i64,
  ) -> Result<Vec<GlassChange>, ReadFailure> {
    self.inner.changes_for(customer_id).await.map_err(|_| ReadFailure)
  }

  async fn log_change(
    &self,
    customer_id: i64,
    on: NaiveDate,
  ) -> Result<ChangeReceipt, ChangeError<ReadFailure>> {
    self.inner.log_change(customer_id, on).await.map_err(|e| match e {
      ChangeError::CustomerNotFound(id) => ChangeError::CustomerNotFound(id),
      ChangeError::SubscriptionExpired { customer_id, expired_on } => {
        ChangeError::SubscriptionExpired { customer_id, expired_on }
      }
      ChangeError::QuotaExhausted(id) => ChangeError::QuotaExhausted(id),
      ChangeError::Store(_) => ChangeError::Store(ReadFailure),
    })
  }
}

struct StubBackup;

impl BackupTarget for StubBackup {
  async fn snapshot(&self, _message: &str) -> Result<BackupReport, BackupError> {
    Err(BackupError::Precondition("database file missing".into()))
  }
}

type TestState = ApiState<SqliteStore, RecordingNotifier, StubBackup>;

async fn state() -> TestState {
  ApiState {
    store:    Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    notifier: None,
    backup:   None,
  }
}

fn register_body(name: &str, plan: &str) -> RegisterBody {
  RegisterBody {
    name:           name.to_owned(),
    contact:        "a@x.com".to_owned(),
    photo:          None,
    family_members: "Bob, Carol".to_owned(),
    plan:           plan.to_owned(),
  }
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_creates_customer() {
  let st = state().await;
  let (status, Json(customer)) = customers::register(
    State(st.clone()),
    Json(register_body("Asha", Plan::ThreeIn90.label())),
  )
  .await
  .unwrap();

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(customer.remaining_changes, 3);
  assert_eq!(customer.validity_period, 90);
  assert_eq!(customer.family_members, vec!["Bob", "Carol"]);

  // Read-back round trip.
  let Json(fetched) =
    customers::get_one(State(st), Path(customer.id)).await.unwrap();
  assert_eq!(fetched.name, "Asha");
  assert_eq!(fetched.plan, Plan::ThreeIn90);
}

#[tokio::test]
async fn register_rejects_unknown_plan() {
  let st = state().await;
  let err = customers::register(
    State(st),
    Json(register_body("Asha", "Lifetime Glass - 1 Rs")),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn register_rejects_blank_name() {
  let st = state().await;
  let err = customers::register(
    State(st),
    Json(register_body("  ", Plan::SixIn180.label())),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn register_rejects_invalid_photo_encoding() {
  let st = state().await;
  let mut body = register_body("Asha", Plan::ThreeIn90.label());
  body.photo = Some("not base64 !!".to_owned());
  let err = customers::register(State(st), Json(body)).await.unwrap_err();
  assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn names_lists_registered_customers_in_order() {
  let st = state().await;
  for name in ["first", "second"] {
    customers::register(
      State(st.clone()),
      Json(register_body(name, Plan::ThreeIn90.label())),
    )
    .await
    .unwrap();
  }

  let Json(summaries) = customers::names(State(st)).await.unwrap();
  let names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
  assert_eq!(names, ["first", "second"]);
}

#[tokio::test]
async fn get_one_missing_is_not_found() {
  let st = state().await;
  let err = customers::get_one(State(st), Path(99)).await.unwrap_err();
  assert!(matches!(err, ApiError::NotFound(_)));
}

// ─── Change logging ──────────────────────────────────────────────────────────

#[tokio::test]
async fn log_change_without_notifier_is_skipped() {
  let st = state().await;
  let (_, Json(customer)) = customers::register(
    State(st.clone()),
    Json(register_body("Asha", Plan::ThreeIn90.label())),
  )
  .await
  .unwrap();

  let (status, Json(resp)) =
    changes::log(State(st), Path(customer.id), None).await.unwrap();

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(resp.remaining_changes, 2);
  assert_eq!(resp.notification, NotificationStatus::Skipped);
}

#[tokio::test]
async fn log_change_sends_notification_with_remaining_count() {
  let mut st = state().await;
  let notifier = Arc::new(RecordingNotifier::default());
  st.notifier = Some(Arc::clone(&notifier));

  let (_, Json(customer)) = customers::register(
    State(st.clone()),
    Json(register_body("Asha", Plan::SixIn180.label())),
  )
  .await
  .unwrap();

  let (_, Json(resp)) = changes::log(
    State(st),
    Path(customer.id),
    Some(Json(LogChangeBody::default())),
  )
  .await
  .unwrap();

  assert_eq!(resp.notification, NotificationStatus::Sent);
  let sent = notifier.sent.lock().unwrap();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].0, "a@x.com");
  assert!(sent[0].1.contains("5 change(s) remaining"));
}

#[tokio::test]
async fn notification_failure_does_not_roll_back_the_change() {
  let mut st = state().await;
  st.notifier = Some(Arc::new(RecordingNotifier {
    sent: Mutex::new(vec![]),
    fail: true,
  }));

  let (_, Json(customer)) = customers::register(
    State(st.clone()),
    Json(register_body("Asha", Plan::ThreeIn90.label())),
  )
  .await
  .unwrap();

  let (_, Json(resp)) =
    changes::log(State(st.clone()), Path(customer.id), None).await.unwrap();

  assert!(matches!(resp.notification, NotificationStatus::Failed { .. }));
  assert_eq!(resp.remaining_changes, 2);

  // The change is committed despite the failed notification.
  let Json(history) =
    changes::history(State(st), Path(customer.id)).await.unwrap();
  assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn failed_contact_lookup_reports_notification_failure_not_an_error() {
  let sqlite = SqliteStore::open_in_memory().await.unwrap();
  let customer = sqlite
    .register(
      NewCustomer::new(
        "Asha",
        "a@x.com",
        None,
        "",
        Plan::ThreeIn90,
        chrono::Local::now().date_naive(),
      )
      .unwrap(),
    )
    .await
    .unwrap();

  let st = ApiState {
    store:    Arc::new(ReadFailingStore { inner: sqlite.clone() }),
    notifier: Some(Arc::new(RecordingNotifier::default())),
    backup:   None::<Arc<StubBackup>>,
  };

  let (status, Json(resp)) =
    changes::log(State(st), Path(customer.id), None).await.unwrap();

  // The change itself committed; only the notification reports the failure.
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(resp.remaining_changes, 2);
  assert!(matches!(resp.notification, NotificationStatus::Failed { .. }));
  assert_eq!(sqlite.changes_for(customer.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn inert_family_member_id_is_accepted() {
  let st = state().await;
  let (_, Json(customer)) = customers::register(
    State(st.clone()),
    Json(register_body("Asha", Plan::ThreeIn90.label())),
  )
  .await
  .unwrap();

  let (_, Json(resp)) = changes::log(
    State(st),
    Path(customer.id),
    Some(Json(LogChangeBody { family_member_id: Some(7) })),
  )
  .await
  .unwrap();

  // Quota behaves exactly as if the field were absent.
  assert_eq!(resp.remaining_changes, 2);
}

#[tokio::test]
async fn log_change_unknown_customer_is_not_found() {
  let st = state().await;
  let err = changes::log(State(st), Path(404), None).await.unwrap_err();
  assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn quota_exhaustion_maps_to_conflict() {
  let st = state().await;
  let (_, Json(customer)) = customers::register(
    State(st.clone()),
    Json(register_body("Asha", Plan::ThreeIn90.label())),
  )
  .await
  .unwrap();

  for _ in 0..3 {
    changes::log(State(st.clone()), Path(customer.id), None).await.unwrap();
  }
  let err =
    changes::log(State(st), Path(customer.id), None).await.unwrap_err();
  assert!(matches!(err, ApiError::QuotaExhausted(_)));
}

#[tokio::test]
async fn history_for_unknown_customer_is_not_found() {
  let st = state().await;
  let err = changes::history(State(st), Path(404)).await.unwrap_err();
  assert!(matches!(err, ApiError::NotFound(_)));
}

// ─── Backup ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn backup_without_target_is_rejected() {
  let st = state().await;
  let err = maintenance::backup(State(st), None).await.unwrap_err();
  assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn backup_precondition_maps_to_precondition_failed() {
  let mut st = state().await;
  st.backup = Some(Arc::new(StubBackup));

  let err = maintenance::backup(
    State(st),
    Some(Json(BackupBody { message: Some("nightly".into()) })),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, ApiError::BackupPrecondition(_)));
}
