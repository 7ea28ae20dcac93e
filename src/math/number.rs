//! Integer kernels for Euler's theorem: gcd, modular exponentiation,
//! factorization and the totient / Carmichael functions.

use crate::error::{try_with_capacity, ResourceError, Result};

/// Greatest common divisor by the Euclidean algorithm.
#[must_use]
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Least common multiple. Returns 0 if either argument is 0.
#[must_use]
pub fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        return 0;
    }
    a / gcd(a, b) * b
}

/// Computes `base^exp mod modulus` by binary exponentiation.
///
/// Intermediate products are widened to 128 bits, so any `u64` modulus is
/// safe. A modulus of 1 yields 0.
///
/// # Panics
///
/// Panics if `modulus` is 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn mod_pow(base: u64, mut exp: u64, modulus: u64) -> u64 {
    assert!(modulus != 0, "modulus must be non-zero");
    if modulus == 1 {
        return 0;
    }
    let m = u128::from(modulus);
    let mut result: u128 = 1;
    let mut b = u128::from(base) % m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % m;
        }
        b = b * b % m;
        exp >>= 1;
    }
    // result < modulus <= u64::MAX
    result as u64
}

/// Prime factorization by trial division up to `sqrt(n)`.
///
/// Returns `(prime, exponent)` pairs in increasing prime order. `n <= 1`
/// has no factors. Whenever the unfactored part is prime the search stops
/// early, so large prime moduli cost one primality test instead of
/// `sqrt(n)` divisions.
#[must_use]
pub fn factorize(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    if n <= 1 {
        return factors;
    }
    if is_prime(n) {
        factors.push((n, 1));
        return factors;
    }

    let mut push = |n: &mut u64, p: u64| {
        let mut k = 0;
        while *n % p == 0 {
            *n /= p;
            k += 1;
        }
        if k > 0 {
            factors.push((p, k));
        }
    };

    push(&mut n, 2);
    push(&mut n, 3);
    let mut done = is_prime(n);
    // 6k +- 1 wheel
    let mut p = 5u64;
    while !done && p.saturating_mul(p) <= n {
        let before = n;
        push(&mut n, p);
        push(&mut n, p + 2);
        if n != before {
            done = is_prime(n);
        }
        p += 6;
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

/// Euler's totient `phi(n)`: the number of integers in `[1, n]` coprime to `n`.
#[must_use]
pub fn euler_phi(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    factorize(n)
        .into_iter()
        .fold(n, |acc, (p, _)| acc / p * (p - 1))
}

/// Carmichael's function `lambda(n)`: the exponent of the unit group mod `n`.
///
/// `lambda(n)` divides `phi(n)`, so `a^lambda(n) = 1 (mod n)` is a strictly
/// stronger check than Euler's theorem.
#[must_use]
pub fn carmichael_lambda(n: u64) -> u64 {
    if n <= 2 {
        return 1;
    }
    factorize(n).into_iter().fold(1, |acc, (p, k)| {
        let lambda_pk = if p == 2 && k >= 3 {
            1u64 << (k - 2)
        } else {
            (p - 1) * p.pow(k - 1)
        };
        lcm(acc, lambda_pk)
    })
}

/// Deterministic Miller-Rabin primality test, exact for every `u64`.
#[must_use]
pub fn is_prime(n: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

    if n < 2 {
        return false;
    }
    for &p in &WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut r = 0;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }

    'witness: for &a in &WITNESSES {
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..r {
            x = mod_pow(x, 2, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Sieve of Eratosthenes. `sieve(limit)?[n]` is true iff `n` is prime.
///
/// # Errors
///
/// Returns [`ResourceError::AllocationFailed`] if the table cannot be
/// allocated.
pub fn sieve(limit: usize) -> Result<Vec<bool>> {
    let len = limit.checked_add(1).ok_or(ResourceError::AllocationFailed {
        what: "prime sieve",
        requested: limit,
    })?;
    let mut is_prime = try_with_capacity("prime sieve", len)?;
    is_prime.resize(len, true);
    is_prime[0] = false;
    if limit >= 1 {
        is_prime[1] = false;
    }
    let mut i = 2;
    while i * i <= limit {
        if is_prime[i] {
            let mut j = i * i;
            while j <= limit {
                is_prime[j] = false;
                j += i;
            }
        }
        i += 1;
    }
    Ok(is_prime)
}

/// Prefix prime counts: `prime_counts(s)?[n] = pi(n)` for a sieve `s`.
///
/// # Errors
///
/// Returns [`ResourceError::AllocationFailed`] if the table cannot be
/// allocated.
pub fn prime_counts(is_prime: &[bool]) -> Result<Vec<u32>> {
    let mut counts = try_with_capacity("prime counts", is_prime.len())?;
    let mut count = 0;
    for &p in is_prime {
        if p {
            count += 1;
        }
        counts.push(count);
    }
    Ok(counts)
}
