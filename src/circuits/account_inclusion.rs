use crate::chips::account_inclusion::{AccountInclusionChip, AccountInclusionConfig};
use crate::chips::poseidon::hash::{LeafHashChip, LeafHashConfig, NodeHashChip, NodeHashConfig};
use crate::circuits::traits::CircuitBase;
use crate::circuits::WithInstances;
use crate::errors::{InclusionError, Result};
use crate::merkle_tree::{
    discriminator_domain_offset, validate_path, AccountTree, CompressedAccount, MerkleProof,
    Pow5Poseidon,
};
use halo2_proofs::circuit::{Layouter, SimpleFloorPlanner};
use halo2_proofs::halo2curves::bn256::Fr as Fp;
use halo2_proofs::plonk::{
    Advice, Circuit, Column, ConstraintSystem, Error, Fixed, Instance, Selector,
};

// Instance rows of the public inputs
const OWNER_HASHED_ROW: usize = 0;
const MERKLE_TREE_HASHED_ROW: usize = 1;
const DISCRIMINATOR_ROW: usize = 2;
const DATA_HASH_ROW: usize = 3;
const ROOT_ROW: usize = 4;

/// Circuit proving that a compressed account is committed to by a leaf of a tree with a given root.
///
/// # Type Parameters
///
/// * `DEPTH`: The number of levels of the tree
///
/// # Fields
///
/// * `account`: the compressed account. Its owner, tree, discriminator and data hash are public,
///   its leaf index is private
/// * `merkle_proof`: the `DEPTH` sibling hashes from the leaf up and the expected root
/// * `domain_offset`: the constant added to the discriminator before hashing. It is baked into the
///   circuit, so keys generated for one offset only verify proofs for that offset
#[derive(Clone, Debug)]
pub struct AccountInclusionCircuit<const DEPTH: usize> {
    pub account: CompressedAccount,
    pub merkle_proof: MerkleProof,
    pub domain_offset: Fp,
}

impl<const DEPTH: usize> WithInstances for AccountInclusionCircuit<DEPTH> {
    /// The owner, the tree, the discriminator, the data hash and the root
    fn num_instances(&self) -> usize {
        5
    }

    fn instances(&self) -> Vec<Vec<Fp>> {
        vec![vec![
            self.account.owner_hashed,
            self.account.merkle_tree_hashed,
            self.account.discriminator,
            self.account.data_hash,
            self.merkle_proof.root,
        ]]
    }
}

impl<const DEPTH: usize> CircuitBase for AccountInclusionCircuit<DEPTH> {}

impl<const DEPTH: usize> AccountInclusionCircuit<DEPTH> {
    pub fn init_empty() -> Self {
        Self {
            account: CompressedAccount::init_empty(),
            merkle_proof: MerkleProof::init_empty(DEPTH),
            domain_offset: discriminator_domain_offset(),
        }
    }

    /// Initializes the circuit with an account and the proof of its leaf.
    ///
    /// Fails when the path is malformed, when the proof is about another leaf index or when the
    /// proof leaf is not the account leaf under the Poseidon family the circuit constrains.
    pub fn init(
        account: CompressedAccount,
        merkle_proof: MerkleProof,
        domain_offset: Fp,
    ) -> Result<Self> {
        validate_path(&merkle_proof.sibling_hashes, merkle_proof.leaf_index, DEPTH)?;

        if account.leaf_index != merkle_proof.leaf_index {
            return Err(InclusionError::LeafIndexMismatch {
                slot: merkle_proof.leaf_index as usize,
                declared: account.leaf_index,
            });
        }

        if account.compute_leaf::<Pow5Poseidon>(domain_offset)? != merkle_proof.leaf {
            return Err(InclusionError::LeafNotFound);
        }

        Ok(Self {
            account,
            merkle_proof,
            domain_offset,
        })
    }

    /// Initializes the circuit for the account at `index` of `tree`, which must have been built
    /// with the same `domain_offset`
    pub fn init_from_tree(
        tree: &AccountTree<Pow5Poseidon>,
        index: usize,
        domain_offset: Fp,
    ) -> Result<Self> {
        let account = tree
            .get_account(index)
            .cloned()
            .ok_or(InclusionError::LeafNotFound)?;
        let merkle_proof = tree.generate_proof(index)?;

        Self::init(account, merkle_proof, domain_offset)
    }
}

/// Configuration for the account inclusion circuit
///
/// # Fields
///
/// * `account_inclusion_config`: Configuration of the decomposition, domain offset and swap gates
/// * `poseidon_leaf_config`: Poseidon with WIDTH = 6 and RATE = 5 over the 5 account fields
/// * `poseidon_node_config`: Poseidon with WIDTH = 3 and RATE = 2 over two sibling nodes
/// * `instance`: Instance column used to store the public inputs
/// * `advices`: Advice columns used to store the private inputs
#[derive(Debug, Clone)]
pub struct AccountInclusionCircuitConfig {
    account_inclusion_config: AccountInclusionConfig,
    poseidon_leaf_config: LeafHashConfig,
    poseidon_node_config: NodeHashConfig,
    instance: Column<Instance>,
    advices: [Column<Advice>; 7],
}

impl AccountInclusionCircuitConfig {
    pub fn configure(meta: &mut ConstraintSystem<Fp>) -> Self {
        // the widest poseidon state needs WIDTH + 1 = 7 advice columns, every other gate lives in the first three
        let advices: [Column<Advice>; 7] = std::array::from_fn(|_| meta.advice_column());

        // 2 * WIDTH fixed columns for the round constants of the widest poseidon chip, shared with the narrow one
        let fixed_columns: [Column<Fixed>; 12] = std::array::from_fn(|_| meta.fixed_column());

        let selectors: [Selector; 3] = std::array::from_fn(|_| meta.selector());

        // constants are needed for the poseidon initial state, the running sum and the domain offset
        meta.enable_constant(fixed_columns[6]);

        let poseidon_leaf_config = LeafHashChip::configure(
            meta,
            std::array::from_fn(|i| advices[i]),
            advices[6],
            std::array::from_fn(|i| fixed_columns[i]),
            std::array::from_fn(|i| fixed_columns[6 + i]),
        );

        let poseidon_node_config = NodeHashChip::configure(
            meta,
            std::array::from_fn(|i| advices[i]),
            advices[3],
            std::array::from_fn(|i| fixed_columns[i]),
            std::array::from_fn(|i| fixed_columns[6 + i]),
        );

        // enable permutation for all the advice columns
        for col in &advices {
            meta.enable_equality(*col);
        }

        let account_inclusion_config = AccountInclusionChip::configure(
            meta,
            std::array::from_fn(|i| advices[i]),
            selectors,
        );

        let instance = meta.instance_column();
        meta.enable_equality(instance);

        Self {
            account_inclusion_config,
            poseidon_leaf_config,
            poseidon_node_config,
            instance,
            advices,
        }
    }
}

impl<const DEPTH: usize> Circuit<Fp> for AccountInclusionCircuit<DEPTH> {
    type Config = AccountInclusionCircuitConfig;
    type FloorPlanner = SimpleFloorPlanner;

    // the domain offset is a circuit constant and must survive key generation
    fn without_witnesses(&self) -> Self {
        Self {
            domain_offset: self.domain_offset,
            ..Self::init_empty()
        }
    }

    fn configure(meta: &mut ConstraintSystem<Fp>) -> Self::Config {
        AccountInclusionCircuitConfig::configure(meta)
    }

    fn synthesize(
        &self,
        config: Self::Config,
        mut layouter: impl Layouter<Fp>,
    ) -> std::result::Result<(), Error> {
        let account_inclusion_chip =
            AccountInclusionChip::construct(config.account_inclusion_config);

        let poseidon_leaf_chip = LeafHashChip::construct(config.poseidon_leaf_config);

        let poseidon_node_chip = NodeHashChip::construct(config.poseidon_node_config);

        let [owner_hashed, leaf_index, merkle_tree_hashed, discriminator, data_hash] = self
            .assign_row_to_witness(
                layouter.namespace(|| "assign account"),
                [
                    self.account.owner_hashed,
                    Fp::from(self.account.leaf_index),
                    self.account.merkle_tree_hashed,
                    self.account.discriminator,
                    self.account.data_hash,
                ],
                "account field",
                std::array::from_fn(|i| config.advices[i]),
            )?;

        self.expose_public(
            layouter.namespace(|| "public owner"),
            &owner_hashed,
            OWNER_HASHED_ROW,
            config.instance,
        )?;
        self.expose_public(
            layouter.namespace(|| "public merkle tree"),
            &merkle_tree_hashed,
            MERKLE_TREE_HASHED_ROW,
            config.instance,
        )?;
        self.expose_public(
            layouter.namespace(|| "public discriminator"),
            &discriminator,
            DISCRIMINATOR_ROW,
            config.instance,
        )?;
        self.expose_public(
            layouter.namespace(|| "public data hash"),
            &data_hash,
            DATA_HASH_ROW,
            config.instance,
        )?;

        let offset_discriminator = account_inclusion_chip.assign_discriminator_offset(
            layouter.namespace(|| "domain separate discriminator"),
            &discriminator,
            self.domain_offset,
        )?;

        // the leaf is the poseidon hash of the account, in commitment order
        let mut current_hash = poseidon_leaf_chip.hash(
            layouter.namespace(|| "perform poseidon leaf hash"),
            [
                owner_hashed,
                leaf_index.clone(),
                merkle_tree_hashed,
                offset_discriminator,
                data_hash,
            ],
        )?;

        // one path bit per level, which also bounds the leaf index to DEPTH bits
        let swap_bits = account_inclusion_chip.decompose_leaf_index(
            layouter.namespace(|| "decompose leaf index"),
            &leaf_index,
            DEPTH,
        )?;

        for (level, swap_bit) in swap_bits.iter().enumerate() {
            let namespace_prefix = format!("level {}", level);

            let sibling_value = self
                .merkle_proof
                .sibling_hashes
                .get(level)
                .copied()
                .ok_or(Error::Synthesis)?;

            let sibling_hash = self.assign_value_to_witness(
                layouter.namespace(|| format!("{}: assign sibling hash", namespace_prefix)),
                sibling_value,
                "sibling hash",
                config.advices[1],
            )?;

            let (hash_left_current, hash_right_current) = account_inclusion_chip
                .swap_hashes_per_level(
                    layouter.namespace(|| format!("{}: swap hashes", namespace_prefix)),
                    &current_hash,
                    &sibling_hash,
                    swap_bit,
                )?;

            current_hash = poseidon_node_chip.hash(
                layouter.namespace(|| format!("{}: perform poseidon hash", namespace_prefix)),
                [hash_left_current, hash_right_current],
            )?;
        }

        // expose the last current hash, namely the root hash, as public input
        self.expose_public(
            layouter.namespace(|| "public root"),
            &current_hash,
            ROOT_ROW,
            config.instance,
        )?;

        Ok(())
    }
}
