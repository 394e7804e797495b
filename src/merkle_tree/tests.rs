#[cfg(test)]
mod test {

    use crate::errors::InclusionError;
    use crate::merkle_tree::{
        compute_root, discriminator_domain_offset, verify_inclusion, AccountTree, CircomPoseidon,
        MerkleHasher, MerkleProof, Pow5Poseidon, TREE_DEPTH,
    };
    use halo2_proofs::halo2curves::{bn256::Fr as Fp, group::ff::PrimeField};

    const CSV_PATH: &str = "src/merkle_tree/csv/accounts_8.csv";

    fn flip_bit(fp: Fp, bit: usize) -> Fp {
        let mut repr = fp.to_repr();
        repr.as_mut()[bit / 8] ^= 1 << (bit % 8);
        Fp::from_repr(repr).unwrap()
    }

    fn csv_tree<H: MerkleHasher>(depth: usize) -> AccountTree<H> {
        AccountTree::<H>::from_csv(CSV_PATH, depth, discriminator_domain_offset()).unwrap()
    }

    fn check_all_proofs_verify<H: MerkleHasher>() {
        let tree = csv_tree::<H>(TREE_DEPTH);

        assert_eq!(*tree.depth(), TREE_DEPTH);
        assert_eq!(tree.leaves().len(), 8);

        for index in 0..8 {
            let proof = tree.generate_proof(index).unwrap();
            assert_eq!(proof.sibling_hashes.len(), TREE_DEPTH);
            assert!(tree.verify_proof(&proof).unwrap());
            assert!(proof.verify::<H>(TREE_DEPTH).unwrap());
        }

        // the leaf is the account commitment
        let account = tree.get_account(5).unwrap();
        let leaf = account
            .compute_leaf::<H>(discriminator_domain_offset())
            .unwrap();
        assert_eq!(tree.index_of(&leaf), Some(5));
    }

    fn check_single_bit_flips_reject<H: MerkleHasher>() {
        let tree = csv_tree::<H>(TREE_DEPTH);
        let proof = tree.generate_proof(3).unwrap();

        for bit in [0, 7, 64, 200] {
            let mut tampered = proof.clone();
            tampered.leaf = flip_bit(proof.leaf, bit);
            assert!(!tampered.verify::<H>(TREE_DEPTH).unwrap());

            let mut tampered = proof.clone();
            tampered.root = flip_bit(proof.root, bit);
            assert!(!tampered.verify::<H>(TREE_DEPTH).unwrap());

            for level in 0..TREE_DEPTH {
                let mut tampered = proof.clone();
                tampered.sibling_hashes[level] = flip_bit(proof.sibling_hashes[level], bit);
                assert!(!tampered.verify::<H>(TREE_DEPTH).unwrap());
            }
        }

        for level in 0..TREE_DEPTH {
            let mut tampered = proof.clone();
            tampered.leaf_index ^= 1 << level;
            assert!(!tampered.verify::<H>(TREE_DEPTH).unwrap());
        }
    }

    fn check_depth_two_scenario<H: MerkleHasher>() {
        let leaves = [1u64, 2, 3, 4].map(Fp::from);

        let h01 = H::hash_node(leaves[0], leaves[1]).unwrap();
        let h23 = H::hash_node(leaves[2], leaves[3]).unwrap();
        let root = H::hash_node(h01, h23).unwrap();

        let path = [leaves[1], h23];

        assert_eq!(compute_root::<H>(leaves[0], &path, 0, 2).unwrap(), root);
        assert!(verify_inclusion::<H>(leaves[0], &path, 0, root, 2).unwrap());

        // L0 misclassified as a right child
        assert_ne!(compute_root::<H>(leaves[0], &path, 1, 2).unwrap(), root);
        assert!(!verify_inclusion::<H>(leaves[0], &path, 1, root, 2).unwrap());

        // the tree builder agrees with the hand computed root
        let tree = AccountTree::<H>::new(2, leaves.to_vec()).unwrap();
        assert_eq!(*tree.root(), root);
        assert_eq!(tree.generate_proof(0).unwrap().sibling_hashes, path);
    }

    #[test]
    fn test_all_proofs_verify_circom() {
        check_all_proofs_verify::<CircomPoseidon>();
    }

    #[test]
    fn test_all_proofs_verify_pow5() {
        check_all_proofs_verify::<Pow5Poseidon>();
    }

    #[test]
    fn test_single_bit_flips_reject_circom() {
        check_single_bit_flips_reject::<CircomPoseidon>();
    }

    #[test]
    fn test_single_bit_flips_reject_pow5() {
        check_single_bit_flips_reject::<Pow5Poseidon>();
    }

    #[test]
    fn test_depth_two_scenario_circom() {
        check_depth_two_scenario::<CircomPoseidon>();
    }

    #[test]
    fn test_depth_two_scenario_pow5() {
        check_depth_two_scenario::<Pow5Poseidon>();
    }

    #[test]
    fn test_swapped_siblings_reject_unless_equal() {
        let tree = csv_tree::<CircomPoseidon>(TREE_DEPTH);
        let proof = tree.generate_proof(6).unwrap();

        let mut swapped = proof.clone();
        swapped.sibling_hashes.swap(0, 1);
        assert!(!swapped.verify::<CircomPoseidon>(TREE_DEPTH).unwrap());

        // equal siblings are indistinguishable once swapped
        let leaf = Fp::from(9);
        let mut siblings = vec![Fp::from(5); 4];
        siblings[2] = Fp::from(6);
        let root = compute_root::<CircomPoseidon>(leaf, &siblings, 0b1010, 4).unwrap();

        let equal_swap = MerkleProof {
            leaf,
            sibling_hashes: {
                let mut swapped = siblings.clone();
                swapped.swap(0, 1);
                swapped
            },
            leaf_index: 0b1010,
            root,
        };
        assert!(equal_swap.verify::<CircomPoseidon>(4).unwrap());
    }

    #[test]
    fn test_verification_is_idempotent() {
        let tree = csv_tree::<Pow5Poseidon>(TREE_DEPTH);
        let proof = tree.generate_proof(2).unwrap();

        let outcomes = (0..3)
            .map(|_| proof.verify::<Pow5Poseidon>(TREE_DEPTH).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(outcomes, vec![true; 3]);

        let mut tampered = proof;
        tampered.root = Fp::from(1000);
        let outcomes = (0..3)
            .map(|_| tampered.verify::<Pow5Poseidon>(TREE_DEPTH).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(outcomes, vec![false; 3]);
    }

    // Folding along the path directions by hand reaches the tree root
    #[test]
    fn test_path_indices() {
        let tree = csv_tree::<Pow5Poseidon>(4);
        let proof = tree.generate_proof(5).unwrap();

        assert_eq!(proof.path_indices(), vec![true, false, true, false]);
        assert_eq!(MerkleProof::init_empty(3).path_indices(), vec![false; 3]);

        let mut node = proof.leaf;
        for (is_right, sibling) in proof.path_indices().into_iter().zip(&proof.sibling_hashes) {
            node = if is_right {
                Pow5Poseidon::hash_node(*sibling, node).unwrap()
            } else {
                Pow5Poseidon::hash_node(node, *sibling).unwrap()
            };
        }
        assert_eq!(node, *tree.root());
    }

    #[test]
    fn test_malformed_paths_are_rejected_before_hashing() {
        let tree = csv_tree::<CircomPoseidon>(TREE_DEPTH);
        let proof = tree.generate_proof(0).unwrap();

        let mut short = proof.clone();
        short.sibling_hashes.pop();
        assert!(matches!(
            short.verify::<CircomPoseidon>(TREE_DEPTH),
            Err(InclusionError::InvalidPathLength {
                expected: 26,
                actual: 25
            })
        ));

        let mut out_of_range = proof;
        out_of_range.leaf_index = 1 << TREE_DEPTH;
        assert!(matches!(
            out_of_range.verify::<CircomPoseidon>(TREE_DEPTH),
            Err(InclusionError::LeafIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_tree_shape() {
        // reordering the accounts changes the root
        let tree = csv_tree::<CircomPoseidon>(3);
        let mut leaves = tree.leaves().to_vec();
        leaves.swap(0, 1);
        let switched = AccountTree::<CircomPoseidon>::new(3, leaves).unwrap();
        assert_ne!(tree.root(), switched.root());

        // a full tree of depth 3 and the same leaves padded into depth 26 relate through zero hashes
        let deep = csv_tree::<CircomPoseidon>(TREE_DEPTH);
        let proof = deep.generate_proof(0).unwrap();
        assert_eq!(
            compute_root::<CircomPoseidon>(*tree.root(), &proof.sibling_hashes[3..], 0, 23)
                .unwrap(),
            *deep.root()
        );

        // empty tree root is the top zero hash
        let empty = AccountTree::<CircomPoseidon>::new(2, vec![]).unwrap();
        let zero_1 = CircomPoseidon::hash_node(Fp::from(0), Fp::from(0)).unwrap();
        assert_eq!(
            *empty.root(),
            CircomPoseidon::hash_node(zero_1, zero_1).unwrap()
        );
        assert!(matches!(
            empty.generate_proof(0),
            Err(InclusionError::LeafNotFound)
        ));
    }

    #[test]
    fn test_invalid_tree_construction() {
        assert!(matches!(
            csv_tree_result(2),
            Err(InclusionError::TooManyLeaves { leaves: 8, depth: 2 })
        ));
        assert!(matches!(
            AccountTree::<CircomPoseidon>::new(0, vec![]),
            Err(InclusionError::InvalidTreeDepth { .. })
        ));
        assert!(matches!(
            AccountTree::<CircomPoseidon>::new(33, vec![]),
            Err(InclusionError::InvalidTreeDepth { .. })
        ));
        assert!(matches!(
            AccountTree::<CircomPoseidon>::from_csv(
                "src/merkle_tree/csv/accounts_bad_index.csv",
                4,
                discriminator_domain_offset()
            ),
            Err(InclusionError::LeafIndexMismatch {
                slot: 1,
                declared: 2
            })
        ));
        assert!(matches!(
            AccountTree::<CircomPoseidon>::from_csv(
                "src/merkle_tree/csv/missing.csv",
                4,
                discriminator_domain_offset()
            ),
            Err(InclusionError::Io(_))
        ));
    }

    fn csv_tree_result(depth: usize) -> crate::errors::Result<AccountTree<CircomPoseidon>> {
        AccountTree::<CircomPoseidon>::from_csv(CSV_PATH, depth, discriminator_domain_offset())
    }
}
