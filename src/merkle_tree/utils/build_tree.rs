use ark_std::{end_timer, start_timer};
use halo2_proofs::halo2curves::bn256::Fr as Fp;
use std::thread;

use crate::errors::{InclusionError, Result};
use crate::merkle_tree::{CompressedAccount, MerkleHasher};

// Levels narrower than this are hashed on the calling thread
const PARALLELIZATION_THRESHOLD: usize = 1 << 10;

/// Splits `items` into one chunk per cpu and maps every chunk on its own thread, keeping the order.
fn map_chunks_in_parallel<T, F>(items: &[T], chunk_size: usize, f: F) -> Result<Vec<Fp>>
where
    T: Sync,
    F: Fn(&[T]) -> Result<Vec<Fp>> + Sync,
{
    let f = &f;

    thread::scope(|scope| {
        let handles = items
            .chunks(chunk_size.max(1))
            .map(|chunk| scope.spawn(move || f(chunk)))
            .collect::<Vec<_>>();

        let mut result = Vec::with_capacity(items.len());
        for handle in handles {
            let chunk = handle
                .join()
                .map_err(|_| InclusionError::Hash("hashing worker panicked".into()))??;
            result.extend(chunk);
        }
        Ok(result)
    })
}

/// Computes the empty subtree roots: `zeros[0]` is the empty leaf and `zeros[i + 1] = H(zeros[i], zeros[i])`.
pub fn zero_hashes<H: MerkleHasher>(depth: usize) -> Result<Vec<Fp>> {
    let mut zeros = Vec::with_capacity(depth + 1);
    zeros.push(Fp::from(0));

    for level in 0..depth {
        zeros.push(H::hash_node(zeros[level], zeros[level])?);
    }

    Ok(zeros)
}

/// Hashes every account into its leaf. Account `i` must declare leaf index `i`.
pub fn compute_leaves<H: MerkleHasher>(
    accounts: &[CompressedAccount],
    domain_offset: Fp,
) -> Result<Vec<Fp>> {
    if let Some((slot, account)) = accounts
        .iter()
        .enumerate()
        .find(|(slot, account)| account.leaf_index != *slot as u64)
    {
        return Err(InclusionError::LeafIndexMismatch {
            slot,
            declared: account.leaf_index,
        });
    }

    let pf_time = start_timer!(|| "compute leaves");

    let chunk_size = (accounts.len() + num_cpus::get() - 1) / num_cpus::get();
    let leaves = map_chunks_in_parallel(accounts, chunk_size, |chunk| {
        chunk
            .iter()
            .map(|account| account.compute_leaf::<H>(domain_offset))
            .collect()
    })?;

    end_timer!(pf_time);
    Ok(leaves)
}

fn hash_pairs<H: MerkleHasher>(nodes: &[Fp], zero: Fp) -> Result<Vec<Fp>> {
    nodes
        .chunks(2)
        .map(|pair| H::hash_node(pair[0], pair.get(1).copied().unwrap_or(zero)))
        .collect()
}

/// Builds the populated part of every level, from the leaves (level 0) to the root (level `depth`).
///
/// Only the nodes covering at least one leaf are stored. A missing right child stands for an empty
/// subtree and is replaced by the zero hash of its level.
pub fn build_levels<H: MerkleHasher>(
    leaves: Vec<Fp>,
    zeros: &[Fp],
    depth: usize,
) -> Result<Vec<Vec<Fp>>> {
    let mut levels = Vec::with_capacity(depth + 1);
    levels.push(leaves);

    for level in 0..depth {
        let pf_time = start_timer!(|| format!("compute level {}", level + 1));
        let previous = &levels[level];
        let zero = zeros[level];

        let next = if previous.len() < PARALLELIZATION_THRESHOLD {
            hash_pairs::<H>(previous, zero)?
        } else {
            // keep chunks aligned on sibling pairs
            let chunk_size = ((previous.len() + num_cpus::get() - 1) / num_cpus::get() + 1) & !1;
            map_chunks_in_parallel(previous, chunk_size, |chunk| hash_pairs::<H>(chunk, zero))?
        };

        end_timer!(pf_time);
        levels.push(next);
    }

    Ok(levels)
}
