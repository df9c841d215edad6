/// Barrel pool and spawners.
///
/// ## Ownership
///
/// A `Barrel` is a plain value that moves between two places:
///   - `BarrelPool::idle`: waiting to be reused
///   - `Spawner::barrels`: rolling, owned by exactly one spawner
///
/// Moving the value is the hand-off, so a barrel can never be in both
/// places or under two spawners at once. All spawners share one pool by
/// `&mut` borrow from the loop thread, which makes acquire/release
/// mutually exclusive without a lock.
///
/// Conservation: `idle_count() + Σ active_count() == constructed()`.
///
/// The difficulty's barrels-in-flight figure never changes how often a
/// spawner fires. It sizes the pool up front (`reserve`) so a level's
/// opening releases reuse barrels instead of building them mid-tick.

use rand::{Rng, RngCore};

use crate::domain::barrel::Barrel;
use crate::domain::entity::{Entity, Pos};

/// Per-tick chance that a spawner under its cap releases a barrel.
pub const SPAWN_CHANCE: f64 = 1.0 / 15.0;
/// Most barrels one spawner keeps rolling at once.
pub const MAX_BARRELS: usize = 30;

#[derive(Debug, Default)]
pub struct BarrelPool {
    idle: Vec<Barrel>,
    constructed: usize,
}

impl BarrelPool {
    pub fn new() -> Self {
        BarrelPool::default()
    }

    /// Reuse the most recently released barrel, or build a new one.
    pub fn acquire(&mut self) -> Barrel {
        match self.idle.pop() {
            Some(b) => b,
            None => {
                self.constructed += 1;
                log::debug!("barrel pool grew to {}", self.constructed);
                Barrel::new()
            }
        }
    }

    pub fn release(&mut self, barrel: Barrel) {
        self.idle.push(barrel);
    }

    /// Build barrels until at least `n` are idle.
    pub fn reserve(&mut self, n: usize) {
        let missing = n.saturating_sub(self.idle.len());
        if missing == 0 {
            return;
        }
        self.idle.extend((0..missing).map(|_| Barrel::new()));
        self.constructed += missing;
        log::debug!("barrel pool reserved {missing}, {} built", self.constructed);
    }

    #[cfg(test)]
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Barrels ever built by this pool.
    #[cfg(test)]
    pub fn constructed(&self) -> usize {
        self.constructed
    }
}

/// A `V` in the level: releases barrels at its origin.
#[derive(Debug)]
pub struct Spawner {
    origin: Pos,
    barrels: Vec<Barrel>,
}

impl Spawner {
    pub fn new(origin: Pos) -> Self {
        Spawner { origin, barrels: Vec::new() }
    }

    pub fn origin(&self) -> Pos {
        self.origin
    }

    pub fn active_count(&self) -> usize {
        self.barrels.len()
    }

    pub fn barrels(&self) -> &[Barrel] {
        &self.barrels
    }

    pub fn barrel_mut(&mut self, idx: usize) -> &mut Barrel {
        &mut self.barrels[idx]
    }

    /// Maybe release a barrel this tick: `SPAWN_CHANCE` while under
    /// `MAX_BARRELS`. Returns true if a barrel was released.
    pub fn update(&mut self, pool: &mut BarrelPool, rng: &mut dyn RngCore) -> bool {
        if self.barrels.len() >= MAX_BARRELS {
            return false;
        }
        let roll: f64 = rng.random();
        if roll >= SPAWN_CHANCE {
            return false;
        }
        let mut barrel = pool.acquire();
        barrel.place(self.origin);
        self.barrels.push(barrel);
        true
    }

    /// Hand the barrel at `idx` back to the pool.
    pub fn recycle(&mut self, idx: usize, pool: &mut BarrelPool) {
        let barrel = self.barrels.remove(idx);
        log::debug!("barrel recycled at {:?}", barrel.pos());
        pool.release(barrel);
    }

    /// Return every active barrel to the pool.
    pub fn clear(&mut self, pool: &mut BarrelPool) {
        while let Some(b) = self.barrels.pop() {
            pool.release(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn total_active(spawners: &[Spawner]) -> usize {
        spawners.iter().map(Spawner::active_count).sum()
    }

    #[test]
    fn acquire_reuses_released_barrels() {
        let mut pool = BarrelPool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.constructed(), 2);
        pool.release(a);
        pool.release(b);
        let _c = pool.acquire();
        assert_eq!(pool.constructed(), 2);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn conservation_over_random_traffic() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut pool = BarrelPool::new();
        let mut spawners: Vec<Spawner> =
            (0..3).map(|i| Spawner::new(Pos::new(0, i * 4))).collect();

        for _ in 0..5_000 {
            let which = rng.random_range(0..spawners.len());
            match rng.random_range(0..4u32) {
                0 | 1 => {
                    spawners[which].update(&mut pool, &mut rng);
                }
                2 => {
                    let n = spawners[which].active_count();
                    if n > 0 {
                        let idx = rng.random_range(0..n);
                        spawners[which].recycle(idx, &mut pool);
                    }
                }
                _ => {
                    if rng.random_bool(0.05) {
                        spawners[which].clear(&mut pool);
                    }
                }
            }
            assert_eq!(pool.idle_count() + total_active(&spawners), pool.constructed());
        }
    }

    #[test]
    fn spawner_respects_cap() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut pool = BarrelPool::new();
        let mut sp = Spawner::new(Pos::new(2, 3));
        for _ in 0..10_000 {
            sp.update(&mut pool, &mut rng);
        }
        assert_eq!(sp.active_count(), MAX_BARRELS);
        assert!(sp.barrels().iter().all(|b| b.pos() == Pos::new(2, 3)));
        for _ in 0..1_000 {
            assert!(!sp.update(&mut pool, &mut rng));
        }
    }

    #[test]
    fn a_fresh_spawner_opens_slowly() {
        // 15 ticks at 1/15 average one release; never a burst
        let mut pool = BarrelPool::new();
        let mut total = 0;
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut sp = Spawner::new(Pos::default());
            for _ in 0..15 {
                sp.update(&mut pool, &mut rng);
            }
            assert!(sp.active_count() <= 8, "seed {seed}: {}", sp.active_count());
            total += sp.active_count();
            sp.clear(&mut pool);
        }
        assert!((100..320).contains(&total), "released {total} over 200 openings");
    }

    #[test]
    fn reserve_prebuilds_idle_barrels() {
        let mut pool = BarrelPool::new();
        pool.reserve(5);
        assert_eq!((pool.idle_count(), pool.constructed()), (5, 5));
        let held = pool.acquire();
        pool.reserve(5);
        assert_eq!((pool.idle_count(), pool.constructed()), (5, 6));
        pool.release(held);
        pool.reserve(3);
        assert_eq!((pool.idle_count(), pool.constructed()), (6, 6));
    }

    #[test]
    fn random_spawn_rate_is_about_one_in_fifteen() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut pool = BarrelPool::new();
        let mut spawned = 0;
        for _ in 0..15_000 {
            let mut sp = Spawner::new(Pos::default());
            if sp.update(&mut pool, &mut rng) {
                spawned += 1;
                sp.clear(&mut pool);
            }
        }
        assert!((800..1200).contains(&spawned), "spawned {spawned}");
    }

    #[test]
    fn clear_returns_everything() {
        let mut rng = Pcg32::seed_from_u64(10);
        let mut pool = BarrelPool::new();
        let mut sp = Spawner::new(Pos::default());
        while sp.active_count() < 4 {
            sp.update(&mut pool, &mut rng);
        }
        sp.clear(&mut pool);
        assert_eq!(sp.active_count(), 0);
        assert_eq!(pool.idle_count(), 4);
    }
}
