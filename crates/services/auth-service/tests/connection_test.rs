//! Startup connection retry behavior, driven by fake connectors on a paused clock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DbErr;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

use auth_service_lib::infra::{ConnectionManager, Connector, RetryPolicy};
use common::AppError;

/// Refuses the first `fail_opens` opens and the first `fail_pings` pings.
#[derive(Default)]
struct FlakyConnector {
    fail_opens: u32,
    fail_pings: u32,
    opens: Arc<AtomicU32>,
    pings: Arc<AtomicU32>,
}

impl FlakyConnector {
    fn failing_opens(n: u32) -> Self {
        Self {
            fail_opens: n,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Connector for FlakyConnector {
    type Connection = u32;

    async fn open(&self, _dsn: &str) -> Result<u32, DbErr> {
        let n = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.fail_opens {
            return Err(DbErr::Custom("connection refused".to_string()));
        }
        Ok(n)
    }

    async fn ping(&self, _connection: &u32) -> Result<(), DbErr> {
        let n = self.pings.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.fail_pings {
            return Err(DbErr::Custom("the database system is starting up".to_string()));
        }
        Ok(())
    }
}

fn policy(max_attempts: u32, backoff_secs: u64) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff: Duration::from_secs(backoff_secs),
    }
}

#[tokio::test(start_paused = true)]
async fn test_exhausts_after_first_attempt_plus_max_retries() {
    let connector = FlakyConnector::failing_opens(u32::MAX);
    let opens = connector.opens.clone();
    let manager = ConnectionManager::new(connector, policy(10, 2));

    let started = Instant::now();
    let result = manager.connect("postgres://unreachable").await;
    let elapsed = started.elapsed();

    assert!(matches!(
        result,
        Err(AppError::ConnectionExhausted { attempts: 11 })
    ));
    assert_eq!(opens.load(Ordering::SeqCst), 11);
    // Ten sleeps between eleven attempts, none after the last
    assert!(elapsed >= Duration::from_secs(20));
    assert!(elapsed < Duration::from_secs(21));
}

#[tokio::test(start_paused = true)]
async fn test_single_retry_budget_sleeps_once() {
    let connector = FlakyConnector::failing_opens(u32::MAX);
    let opens = connector.opens.clone();
    let manager = ConnectionManager::new(connector, policy(1, 2));

    let started = Instant::now();
    let err = assert_err!(manager.connect("postgres://unreachable").await);

    assert!(matches!(err, AppError::ConnectionExhausted { attempts: 2 }));
    assert_eq!(opens.load(Ordering::SeqCst), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_once_store_comes_up() {
    let connector = FlakyConnector::failing_opens(3);
    let opens = connector.opens.clone();
    let manager = ConnectionManager::new(connector, policy(10, 2));

    let started = Instant::now();
    let connection = assert_ok!(manager.connect("postgres://db").await);

    assert_eq!(connection, 4);
    assert_eq!(opens.load(Ordering::SeqCst), 4);
    assert!(started.elapsed() >= Duration::from_secs(6));
    assert!(started.elapsed() < Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn test_failed_ping_counts_as_failed_attempt() {
    let connector = FlakyConnector {
        fail_pings: 2,
        ..FlakyConnector::default()
    };
    let opens = connector.opens.clone();
    let pings = connector.pings.clone();
    let manager = ConnectionManager::new(connector, policy(5, 2));

    assert_ok!(manager.connect("postgres://db").await);

    assert_eq!(opens.load(Ordering::SeqCst), 3);
    assert_eq!(pings.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_does_not_sleep() {
    let manager = ConnectionManager::new(FlakyConnector::default(), policy(10, 2));

    let started = Instant::now();
    manager.connect("postgres://db").await.unwrap();

    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_zero_budget_still_tries_once() {
    let connector = FlakyConnector::failing_opens(u32::MAX);
    let opens = connector.opens.clone();
    let manager = ConnectionManager::new(connector, policy(0, 2));

    let err = assert_err!(manager.connect("postgres://unreachable").await);

    assert!(matches!(err, AppError::ConnectionExhausted { attempts: 1 }));
    assert_eq!(opens.load(Ordering::SeqCst), 1);
}
