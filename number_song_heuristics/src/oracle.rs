// Growable prime and Fibonacci caches.
//
// `NumberOracle` owns two ascending sequences that only ever grow: the
// primes discovered so far (seeded with 2 and 3) and the Fibonacci numbers
// generated so far (seeded with 0 and 1). A membership query for `n`
// extends the relevant cache up to the first element >= n and then does a
// binary search, so the cost of a sweep over increasing beats is amortized
// across the whole run.
//
// Factoring leans on the same cache: `prime_factors` first asks `is_prime`,
// which extends the prime list past `n`, so every prime divisor of `n` is
// guaranteed to be cached before trial division starts.

use tracing::trace;

/// Owner of the monotonic number caches.
#[derive(Debug, Clone)]
pub struct NumberOracle {
    primes: Vec<u64>,
    fibonacci: Vec<u64>,
}

impl Default for NumberOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberOracle {
    pub fn new() -> Self {
        NumberOracle {
            primes: vec![2, 3],
            fibonacci: vec![0, 1],
        }
    }

    /// The primes discovered so far, ascending.
    pub fn primes(&self) -> &[u64] {
        &self.primes
    }

    /// The Fibonacci numbers generated so far, ascending (1 appears twice).
    pub fn fibonacci(&self) -> &[u64] {
        &self.fibonacci
    }

    /// Grow the prime cache until its largest element is >= `n`.
    fn extend_primes_to(&mut self, n: u64) {
        let before = self.primes.len();
        while let Some(&last) = self.primes.last() {
            if last >= n {
                break;
            }
            let mut candidate = last + 2;
            while self.has_cached_divisor(candidate) {
                candidate += 2;
            }
            self.primes.push(candidate);
        }
        if self.primes.len() > before {
            trace!(
                added = self.primes.len() - before,
                largest = self.primes.last().copied(),
                "extended prime cache"
            );
        }
    }

    /// Trial division of an odd candidate by cached primes up to its root.
    fn has_cached_divisor(&self, candidate: u64) -> bool {
        self.primes
            .iter()
            .take_while(|&&p| p.saturating_mul(p) <= candidate)
            .any(|&p| candidate % p == 0)
    }

    pub fn is_prime(&mut self, n: u64) -> bool {
        self.extend_primes_to(n);
        self.primes.binary_search(&n).is_ok()
    }

    /// Prime factorization with multiplicity, ascending.
    ///
    /// A prime returns itself; 0 and 1 have no prime factors.
    pub fn prime_factors(&mut self, n: u64) -> Vec<u64> {
        if n < 2 {
            return Vec::new();
        }
        if self.is_prime(n) {
            return vec![n];
        }
        let mut remaining = n;
        let mut factors = Vec::new();
        for &p in &self.primes {
            while remaining % p == 0 {
                factors.push(p);
                remaining /= p;
            }
            if remaining == 1 {
                break;
            }
        }
        factors
    }

    pub fn sum_of_prime_factors(&mut self, n: u64) -> u64 {
        self.prime_factors(n).into_iter().sum()
    }

    pub fn is_fibonacci(&mut self, n: u64) -> bool {
        while let [.., a, b] = self.fibonacci[..] {
            if b >= n {
                break;
            }
            match a.checked_add(b) {
                Some(next) => self.fibonacci.push(next),
                // n is larger than every Fibonacci number representable in u64
                None => return false,
            }
        }
        self.fibonacci.binary_search(&n).is_ok()
    }
}
