use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use crate::domains::auth::services::RefreshTokenLedger;

/// 만료된 Refresh Token 정리 스케줄러
/// Ledger Cleanup Scheduler
///
/// 역할:
/// - 주기적으로 만료된 Ledger 행 삭제
/// - 정리는 저장 공간 관리용일 뿐, 만료된 행은 정리 전에도 이미 무효
#[derive(Clone)]
pub struct LedgerCleanupScheduler {
    ledger: RefreshTokenLedger,
    period: Duration,
}

impl LedgerCleanupScheduler {
    pub fn new(ledger: RefreshTokenLedger, period_secs: u64) -> Self {
        Self {
            ledger,
            period: Duration::from_secs(period_secs.max(1)),
        }
    }

    /// 스케줄러 시작
    /// Start the background task
    pub fn start(&self) -> JoinHandle<()> {
        let scheduler = self.clone();

        tokio::spawn(async move {
            let mut interval = interval(scheduler.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                scheduler.run_once().await;
            }
        })
    }

    /// 한 번 정리 실행
    pub async fn run_once(&self) -> u64 {
        match self.ledger.purge_expired().await {
            Ok(0) => 0,
            Ok(purged) => {
                tracing::info!(purged, "purged expired refresh tokens");
                purged
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to purge expired refresh tokens");
                0
            }
        }
    }
}
