use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::options::GistOptions;
use crate::signature::Signature;

pub fn same(a: &Signature, b: &Signature) -> bool {
    a == b
}

pub fn union<'a, I>(signatures: I) -> Signature
where
    I: IntoIterator<Item = &'a Signature>,
{
    let mut acc = Signature::empty();
    for sig in signatures {
        acc.union_with(sig);
        if acc.is_saturated() {
            trace!("union absorbed by saturated child");
            return acc;
        }
    }
    compress(acc)
}

pub fn penalty(origin: &Signature, candidate: &Signature) -> f32 {
    origin.distance(candidate) as f32
}

pub fn compress(signature: Signature) -> Signature {
    signature.normalize()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
    pub left_union: Signature,
    pub right_union: Signature,
}

/// Splits an overflowing node into two groups.
pub fn pick_split(entries: &[Signature], options: &GistOptions) -> Result<Split> {
    let n = entries.len();
    if n < 2 {
        return Err(Error::SplitTooSmall { got: n });
    }

    let (seed_left, seed_right) = pick_seeds(entries);
    let mut left_union = entries[seed_left];
    let mut right_union = entries[seed_right];

    let mut costs: Vec<(usize, u32)> = (0..n)
        .filter(|&i| i != seed_left && i != seed_right)
        .map(|i| {
            let to_left = left_union.distance(&entries[i]);
            let to_right = right_union.distance(&entries[i]);
            (i, to_left.abs_diff(to_right))
        })
        .collect();
    costs.sort_by_key(|&(_, cost)| cost);

    let mut left = Vec::with_capacity(n - 1);
    let mut right = Vec::with_capacity(n - 1);
    left.push(seed_left);
    right.push(seed_right);

    let factor = options.balance_factor();
    for (i, _) in costs {
        let sig = &entries[i];
        let to_left = left_union.distance(sig) as f64;
        let to_right = right_union.distance(sig) as f64;
        if to_left < to_right + balance_bias(left.len(), right.len(), factor) {
            left_union.union_with(sig);
            left.push(i);
        } else {
            right_union.union_with(sig);
            right.push(i);
        }
    }

    trace!(
        seed_left,
        seed_right,
        n_left = left.len(),
        n_right = right.len(),
        "picksplit done"
    );

    Ok(Split {
        left,
        right,
        left_union: compress(left_union),
        right_union: compress(right_union),
    })
}

/// `-(n_left - n_right)^3 * factor`
fn balance_bias(n_left: usize, n_right: usize, factor: f64) -> f64 {
    let diff = n_left as f64 - n_right as f64;
    -(diff * diff * diff) * factor
}

fn pick_seeds(entries: &[Signature]) -> (usize, usize) {
    let mut best: Option<(usize, usize, u32)> = None;
    for k in 0..entries.len() {
        for j in k + 1..entries.len() {
            let waste = entries[k].distance(&entries[j]);
            if best.map_or(true, |(_, _, w)| waste > w) {
                best = Some((k, j, waste));
            }
        }
    }
    match best {
        Some((k, j, waste)) if waste > 0 => (k, j),
        _ => {
            debug!(entries = entries.len(), "no distinct pair, using default seeds");
            (0, 1)
        }
    }
}
