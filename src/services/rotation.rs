//! Rotation assigner: fair round-robin ordering of masters for display
//!
//! Advisory only. Never consulted by conflict or availability logic.

use std::collections::HashMap;

use anyhow::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{rotation_repository, RotationRepository};
use crate::models::{Master, RotationCounter};

pub struct RotationService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RotationService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Order the master pool so the master least often shown first comes
    /// first, and persist the updated counters in the same transaction.
    pub async fn next_order(&self, tenant_id: Uuid, pool: Vec<Master>) -> Result<Vec<Master>> {
        let counters = RotationRepository::new(self.pool).counters_for(tenant_id).await?;
        let ordered = assign_ranks(pool, &counters);

        let mut tx = self.pool.begin().await?;
        for (rank, master) in ordered.iter().enumerate() {
            rotation_repository::increment_tx(&mut *tx, tenant_id, master.id, rank as u32).await?;
        }
        tx.commit().await?;

        Ok(ordered)
    }
}

/// Greedy fair assignment: for each rank in turn, pick the remaining master
/// who has occupied that rank least often. Master id breaks ties so the
/// result is deterministic.
pub fn assign_ranks(pool: Vec<Master>, counters: &[RotationCounter]) -> Vec<Master> {
    let counts: HashMap<(Uuid, u32), i64> = counters
        .iter()
        .map(|c| ((c.master_id, c.rank), c.count))
        .collect();

    let mut remaining = pool;
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut rank: u32 = 0;

    while !remaining.is_empty() {
        let (index, _) = remaining
            .iter()
            .enumerate()
            .min_by_key(|(_, m)| (counts.get(&(m.id, rank)).copied().unwrap_or(0), m.id))
            .unwrap_or((0, &remaining[0]));
        ordered.push(remaining.remove(index));
        rank += 1;
    }

    ordered
}
