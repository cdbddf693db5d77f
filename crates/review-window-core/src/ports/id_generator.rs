//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::CompletionId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator hands out identities for scheduled completions.
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数のイベント処理から同時に呼ばれる）
pub trait IdGenerator: Send + Sync {
    fn generate_completion_id(&self) -> CompletionId;
}

/// ULID generator whose timestamp part comes from the injected clock.
///
/// With a `FixedClock` the timestamp is deterministic; the random part still
/// keeps ids unique.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_completion_id(&self) -> CompletionId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        CompletionId::from(ulid)
    }
}
