//! Synthetic scenario generation.
//!
//! Seeded generator for test fixtures and benchmarks: background traffic
//! plus injectable laundering patterns (cycle rings, fan-in/fan-out
//! bursts, shell chains) and benign patterns (salary streams). A fixed
//! seed reproduces the exact same batch.

use crate::types::Transaction;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DAY_SECS: i64 = 86_400;

/// Seeded transaction scenario generator.
#[derive(Debug)]
pub struct ScenarioGenerator {
    rng: StdRng,
    seq: u64,
}

impl ScenarioGenerator {
    /// Create a generator with a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seq: 0,
        }
    }

    /// Generate `n` account ids with the given prefix (`ACC0001`, ...).
    #[must_use]
    pub fn account_ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{prefix}{i:04}")).collect()
    }

    fn next_id(&mut self) -> String {
        self.seq += 1;
        format!("TX{:06}", self.seq)
    }

    fn record(&mut self, sender: &str, receiver: &str, amount: f64, ts: i64) -> Transaction {
        let id = self.next_id();
        Transaction::from_epoch(id, sender, receiver, (amount * 100.0).round() / 100.0, ts)
    }

    /// Random background traffic between `accounts`, spread over
    /// `span_secs` starting at `start`.
    pub fn background(
        &mut self,
        accounts: &[String],
        transactions: usize,
        start: i64,
        span_secs: i64,
    ) -> Vec<Transaction> {
        let mut out = Vec::with_capacity(transactions);
        if accounts.len() < 2 {
            return out;
        }
        for _ in 0..transactions {
            let s = self.rng.gen_range(0..accounts.len());
            let mut r = self.rng.gen_range(0..accounts.len());
            while r == s {
                r = self.rng.gen_range(0..accounts.len());
            }
            let amount = self.rng.gen_range(50.0..5_000.0);
            let ts = start + self.rng.gen_range(0..span_secs.max(1));
            out.push(self.record(&accounts[s], &accounts[r], amount, ts));
        }
        out
    }

    /// A directed cycle through `members`, one hop every `step_secs`.
    pub fn cycle_ring(
        &mut self,
        members: &[String],
        amount: f64,
        start: i64,
        step_secs: i64,
    ) -> Vec<Transaction> {
        let mut out = Vec::with_capacity(members.len());
        for (i, sender) in members.iter().enumerate() {
            let receiver = &members[(i + 1) % members.len()];
            out.push(self.record(sender, receiver, amount, start + i as i64 * step_secs));
        }
        out
    }

    /// Fan-in burst: every sender pays `receiver` once within
    /// `window_secs`, amounts jittered around `base_amount`.
    pub fn fan_in(
        &mut self,
        receiver: &str,
        senders: &[String],
        base_amount: f64,
        jitter: f64,
        start: i64,
        window_secs: i64,
    ) -> Vec<Transaction> {
        let mut out = Vec::with_capacity(senders.len());
        for sender in senders {
            let amount = base_amount + self.rng.gen_range(-jitter..=jitter);
            let ts = start + self.rng.gen_range(0..window_secs.max(1));
            out.push(self.record(sender, receiver, amount, ts));
        }
        out
    }

    /// Fan-out burst: `sender` pays every receiver once within
    /// `window_secs`.
    pub fn fan_out(
        &mut self,
        sender: &str,
        receivers: &[String],
        base_amount: f64,
        jitter: f64,
        start: i64,
        window_secs: i64,
    ) -> Vec<Transaction> {
        let mut out = Vec::with_capacity(receivers.len());
        for receiver in receivers {
            let amount = base_amount + self.rng.gen_range(-jitter..=jitter);
            let ts = start + self.rng.gen_range(0..window_secs.max(1));
            out.push(self.record(sender, receiver, amount, ts));
        }
        out
    }

    /// A layered chain along `path`, the amount shrinking by `step_down`
    /// per hop (a skim at each shell).
    pub fn shell_chain(
        &mut self,
        path: &[String],
        start_amount: f64,
        step_down: f64,
        start: i64,
        step_secs: i64,
    ) -> Vec<Transaction> {
        let mut out = Vec::new();
        let mut amount = start_amount;
        for (i, pair) in path.windows(2).enumerate() {
            out.push(self.record(&pair[0], &pair[1], amount, start + i as i64 * step_secs));
            amount = (amount - step_down).max(1.0);
        }
        out
    }

    /// A monthly salary stream from `employer` to `employee`.
    pub fn salary(
        &mut self,
        employer: &str,
        employee: &str,
        amount: f64,
        months: usize,
        start: i64,
    ) -> Vec<Transaction> {
        (0..months)
            .map(|i| self.record(employer, employee, amount, start + i as i64 * 30 * DAY_SECS))
            .collect()
    }
}
