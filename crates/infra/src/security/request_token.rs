//! Keyed BLAKE3 request tokens.
//!
//! A token binds an action and a subject to a half-day tick. Tokens issued
//! in the current or the previous tick verify, so a token stays valid for
//! between 12 and 24 hours.

use chrono::{DateTime, Utc};
use launder_core::RequestTokenGuard;
use rand::RngCore;

const TICK_SECONDS: i64 = 12 * 60 * 60;
const TOKEN_HEX_LEN: usize = 10;
const KEY_CONTEXT: &str = "event-laundry 2024 settings request tokens";

pub struct Blake3RequestTokenGuard {
    key: [u8; 32],
}

impl Blake3RequestTokenGuard {
    /// Guard whose key is derived from a configured secret. Tokens survive
    /// restarts.
    pub fn from_secret(secret: &str) -> Self {
        Self { key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()) }
    }

    /// Guard with a fresh random key. Tokens are invalidated on restart.
    pub fn random() -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    fn token_for_tick(&self, tick: i64, action: &str, subject: &str) -> String {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(&tick.to_le_bytes());
        hasher.update(&(action.len() as u64).to_le_bytes());
        hasher.update(action.as_bytes());
        hasher.update(subject.as_bytes());
        let mut token = hex::encode(hasher.finalize().as_bytes());
        token.truncate(TOKEN_HEX_LEN);
        token
    }
}

impl std::fmt::Debug for Blake3RequestTokenGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blake3RequestTokenGuard").finish_non_exhaustive()
    }
}

fn tick(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(TICK_SECONDS) + 1
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl RequestTokenGuard for Blake3RequestTokenGuard {
    fn issue(&self, action: &str, subject: &str, now: DateTime<Utc>) -> String {
        self.token_for_tick(tick(now), action, subject)
    }

    fn verify(&self, token: &str, action: &str, subject: &str, now: DateTime<Utc>) -> bool {
        let current = tick(now);
        [current, current - 1].into_iter().any(|tick| {
            let expected = self.token_for_tick(tick, action, subject);
            constant_time_eq(token.as_bytes(), expected.as_bytes())
        })
    }
}
