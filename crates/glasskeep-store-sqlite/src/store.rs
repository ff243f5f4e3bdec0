//! [`SqliteStore`] — the SQLite implementation of [`SubscriptionStore`].

use std::path::Path;

use chrono::{Days, NaiveDate};
use rusqlite::OptionalExtension as _;

use glasskeep_core::{
  change::{ChangeReceipt, GlassChange},
  customer::{Customer, CustomerRow, CustomerSummary, NewCustomer},
  error::ChangeError,
  store::SubscriptionStore,
};

use crate::{
  Error, Result,
  encode::{RawCustomer, encode_family_members, encode_plan},
  schema::SCHEMA,
};

const CUSTOMER_COLUMNS: &str = "id, name, contact, photo_id, \
   subscription_start_date, remaining_changes, validity_period, \
   family_members, plan";

/// What the `log_change` transaction decided. Smuggled out of the connection
/// closure so business outcomes are not conflated with database errors.
enum LogOutcome {
  NotFound,
  Expired { expired_on: NaiveDate },
  Exhausted,
  Logged { change_id: i64, remaining: u32 },
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Glasskeep subscription store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn map_customer_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCustomer> {
    Ok(RawCustomer {
      id: row.get(0)?,
      name: row.get(1)?,
      contact: row.get(2)?,
      photo_id: row.get(3)?,
      subscription_start_date: row.get(4)?,
      remaining_changes: row.get(5)?,
      validity_period: row.get(6)?,
      family_members: row.get(7)?,
      plan: row.get(8)?,
    })
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = Error;

  // ── Registration ──────────────────────────────────────────────────────────

  async fn register(&self, input: NewCustomer) -> Result<Customer> {
    // Quota and validity come from the plan table, nowhere else.
    let customer = Customer {
      id: 0, // assigned below
      name: input.name,
      contact: input.contact,
      photo_id: input.photo_id,
      subscription_start_date: input.subscription_start_date,
      remaining_changes: input.plan.change_quota(),
      validity_period: input.plan.validity_days(),
      family_members: input.family_members,
      plan: input.plan,
    };

    let name = customer.name.clone();
    let contact = customer.contact.clone();
    let photo_id = customer.photo_id.clone();
    let start_date = customer.subscription_start_date;
    let remaining = customer.remaining_changes as i64;
    let validity = customer.validity_period as i64;
    let family_str = encode_family_members(&customer.family_members)?;
    let plan_label = encode_plan(customer.plan).to_owned();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO customers (
             name, contact, photo_id, subscription_start_date,
             remaining_changes, validity_period, family_members, plan
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            name,
            contact,
            photo_id,
            start_date,
            remaining,
            validity,
            family_str,
            plan_label,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Customer { id, ..customer })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"),
              rusqlite::params![id],
              Self::map_customer_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn list_customers(&self) -> Result<Vec<CustomerSummary>> {
    let summaries = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, name FROM customers ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(CustomerSummary { id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(summaries)
  }

  async fn customer_table(&self) -> Result<Vec<CustomerRow>> {
    let raws: Vec<RawCustomer> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id"
        ))?;
        let rows = stmt
          .query_map([], Self::map_customer_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| Ok(raw.into_customer()?.to_row()))
      .collect()
  }

  async fn changes_for(&self, customer_id: i64) -> Result<Vec<GlassChange>> {
    let changes = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, customer_id, change_date FROM changes_log
           WHERE customer_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![customer_id], |row| {
            Ok(GlassChange {
              id:          row.get(0)?,
              customer_id: row.get(1)?,
              change_date: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(changes)
  }

  // ── The one decision path ─────────────────────────────────────────────────

  async fn log_change(
    &self,
    customer_id: i64,
    on: NaiveDate,
  ) -> Result<ChangeReceipt, ChangeError<Error>> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let row: Option<(NaiveDate, i64, i64)> = tx
          .query_row(
            "SELECT subscription_start_date, validity_period,
                    remaining_changes
             FROM customers WHERE id = ?1",
            rusqlite::params![customer_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;

        let Some((start, validity, remaining)) = row else {
          return Ok(LogOutcome::NotFound);
        };

        // Validity is checked before the quota, so an expired subscription
        // reports expiry even with changes left.
        let expiry = start + Days::new(validity as u64);
        if on > expiry {
          return Ok(LogOutcome::Expired { expired_on: expiry });
        }
        if remaining <= 0 {
          return Ok(LogOutcome::Exhausted);
        }

        // Conditional decrement: the WHERE clause makes the quota check and
        // the write one atomic statement, so a concurrent logger cannot race
        // past it and drive the count negative.
        let updated = tx.execute(
          "UPDATE customers SET remaining_changes = remaining_changes - 1
           WHERE id = ?1 AND remaining_changes > 0",
          rusqlite::params![customer_id],
        )?;
        if updated == 0 {
          return Ok(LogOutcome::Exhausted);
        }

        tx.execute(
          "INSERT INTO changes_log (customer_id, change_date) VALUES (?1, ?2)",
          rusqlite::params![customer_id, on],
        )?;
        let change_id = tx.last_insert_rowid();

        let remaining_after: i64 = tx.query_row(
          "SELECT remaining_changes FROM customers WHERE id = ?1",
          rusqlite::params![customer_id],
          |r| r.get(0),
        )?;

        tx.commit()?;
        Ok(LogOutcome::Logged { change_id, remaining: remaining_after as u32 })
      })
      .await
      .map_err(|e| ChangeError::Store(Error::Database(e)))?;

    match outcome {
      LogOutcome::NotFound => Err(ChangeError::CustomerNotFound(customer_id)),
      LogOutcome::Expired { expired_on } => {
        Err(ChangeError::SubscriptionExpired { customer_id, expired_on })
      }
      LogOutcome::Exhausted => Err(ChangeError::QuotaExhausted(customer_id)),
      LogOutcome::Logged { change_id, remaining } => Ok(ChangeReceipt {
        change: GlassChange { id: change_id, customer_id, change_date: on },
        remaining_changes: remaining,
      }),
    }
  }
}
