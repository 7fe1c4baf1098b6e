//! Non-interactive fallback: a fixed-size output from random attribute subsets.
//!
//! Each round samples `d_hat_2` of the final attributes, computes the skyline on
//! them and asks the heuristic for `d_hat_2 + 1` representatives. The union over
//! rounds is cut or padded to exactly `K` tuples (or the whole skyline when it is
//! smaller).

use std::collections::HashMap;

use rand::seq::index::sample;
use rand::Rng;
use tracing::debug;

use crate::error::ConfigError;
use crate::point::{PointId, PointSet};
use crate::regret_set::RegretHeuristic;
use crate::skyline::projected_skyline;

/// Cap on sampling rounds.
pub const MAX_ROUNDS: usize = 50;

/// Select `min(k, |skyline|)` distinct tuples of `skyline`.
///
/// `skyline` lives in the final attribute space (one coordinate per final
/// attribute). When the rounds find more than `k` tuples, the ones selected in
/// most rounds are kept, earlier discoveries first on ties. When they find fewer,
/// random skyline tuples fill the gap.
pub fn attribute_subset<H, R>(
    skyline: &PointSet,
    d_hat_2: usize,
    k: usize,
    heuristic: &H,
    rng: &mut R,
) -> Result<Vec<PointId>, ConfigError>
where
    H: RegretHeuristic + ?Sized,
    R: Rng + ?Sized,
{
    let final_d = skyline.dim();
    if final_d < d_hat_2 {
        return Err(ConfigError::ProjectionTooNarrow { final_d, d_hat_2 });
    }
    if skyline.is_empty() {
        return Err(ConfigError::EmptyPointSet);
    }

    // id -> (rounds selected, first seen)
    let mut tally: HashMap<PointId, (usize, usize)> = HashMap::new();
    let mut rounds = 0;
    while tally.len() < k && rounds < MAX_ROUNDS {
        let mut attributes = sample(rng, final_d, d_hat_2).into_vec();
        attributes.sort_unstable();
        let reduced = projected_skyline(skyline, &attributes);
        for id in heuristic.select(&reduced, d_hat_2 + 1) {
            let seen = tally.len();
            tally.entry(id).or_insert((0, seen)).0 += 1;
        }
        rounds += 1;
    }

    let mut ranked: Vec<(PointId, usize, usize)> =
        tally.into_iter().map(|(id, (count, seen))| (id, count, seen)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(k);
    let mut selected: Vec<PointId> = ranked.into_iter().map(|(id, _, _)| id).collect();

    let target = k.min(skyline.len());
    if selected.len() < target {
        let spare: Vec<PointId> = skyline
            .ids()
            .into_iter()
            .filter(|id| !selected.contains(id))
            .collect();
        let need = (target - selected.len()).min(spare.len());
        selected.extend(sample(rng, spare.len(), need).into_iter().map(|i| spare[i]));
    }

    debug!(rounds, selected = selected.len(), k, "attribute-subset selection");
    Ok(selected)
}
