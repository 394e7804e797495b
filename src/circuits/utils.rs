use std::fs::File;
use std::path::Path;

use ark_std::{end_timer, start_timer};
use halo2_proofs::{
    halo2curves::bn256::{Bn256, Fr as Fp, G1Affine},
    plonk::{create_proof, keygen_pk, keygen_vk, verify_proof, Circuit, ProvingKey, VerifyingKey},
    poly::{
        commitment::{Params, ParamsProver},
        kzg::{
            commitment::{KZGCommitmentScheme, ParamsKZG},
            multiopen::{ProverSHPLONK, VerifierSHPLONK},
            strategy::SingleStrategy,
        },
    },
    transcript::{
        Blake2bRead, Blake2bWrite, Challenge255, TranscriptReadBuffer, TranscriptWriterBuffer,
    },
};
use rand::rngs::OsRng;
use tracing::{info, warn};

use crate::errors::{InclusionError, Result};

/// Location of the powers of tau for `2^k` rows when no explicit path is given
pub fn default_params_path(k: u32) -> String {
    format!("ptau/hermez-raw-{}", k)
}

fn load_params(path: &str, k: u32) -> Result<ParamsKZG<Bn256>> {
    let timer = start_timer!(|| "Loading params");
    let mut params_fs = File::open(path)?;
    let mut params = ParamsKZG::<Bn256>::read(&mut params_fs)?;
    end_timer!(timer);

    if params.k() < k {
        return Err(InclusionError::Setup(format!(
            "{} holds params for 2^{} rows, the circuit needs 2^{}",
            path,
            params.k(),
            k
        )));
    }

    if params.k() > k {
        let timer = start_timer!(|| "Downsizing params");
        params.downsize(k);
        end_timer!(timer);
    }

    Ok(params)
}

/// Loads the KZG params for `2^k` rows and generates the proving and verifying keys of `circuit`.
///
/// The params are read from `params_path`, or from [`default_params_path`] when it is `None`.
/// If that file does not exist a fresh setup is sampled locally: fine for tests, not for
/// production, where the params must come from a ceremony.
pub fn generate_setup_artifacts<C: Circuit<Fp>>(
    k: u32,
    params_path: Option<&str>,
    circuit: &C,
) -> Result<(
    ParamsKZG<Bn256>,
    ProvingKey<G1Affine>,
    VerifyingKey<G1Affine>,
)> {
    let path = params_path
        .map(str::to_owned)
        .unwrap_or_else(|| default_params_path(k));

    let params = if Path::new(&path).exists() {
        info!(path = %path, k, "loading setup params");
        load_params(&path, k)?
    } else {
        warn!(
            path = %path,
            k,
            "setup params not found, generating a local setup. Download a ceremony ptau from https://github.com/han0110/halo2-kzg-srs"
        );
        let timer = start_timer!(|| "Creating params");
        let params = ParamsKZG::<Bn256>::setup(k, OsRng);
        end_timer!(timer);
        params
    };

    let timer = start_timer!(|| "Generating keys");
    let vk = keygen_vk(&params, circuit)?;
    let pk = keygen_pk(&params, vk.clone(), circuit)?;
    end_timer!(timer);

    Ok((params, pk, vk))
}

/// Generates a proof given the public setup, the proving key, the initialized circuit and its public inputs.
pub fn full_prover<C: Circuit<Fp>>(
    params: &ParamsKZG<Bn256>,
    pk: &ProvingKey<G1Affine>,
    circuit: C,
    public_inputs: Vec<Vec<Fp>>,
) -> Result<Vec<u8>> {
    let pf_time = start_timer!(|| "Creating proof");

    let instance: Vec<&[Fp]> = public_inputs.iter().map(|input| &input[..]).collect();
    let instances = &[&instance[..]];

    let mut transcript = Blake2bWrite::<_, _, Challenge255<_>>::init(vec![]);
    create_proof::<
        KZGCommitmentScheme<Bn256>,
        ProverSHPLONK<'_, Bn256>,
        Challenge255<G1Affine>,
        _,
        Blake2bWrite<Vec<u8>, G1Affine, Challenge255<G1Affine>>,
        _,
    >(params, pk, &[circuit], instances, OsRng, &mut transcript)?;
    let proof = transcript.finalize();
    end_timer!(pf_time);
    Ok(proof)
}

/// Verifies a proof given the public setup, the verification key, the proof and the public inputs of the circuit.
pub fn full_verifier(
    params: &ParamsKZG<Bn256>,
    vk: &VerifyingKey<G1Affine>,
    proof: Vec<u8>,
    public_inputs: Vec<Vec<Fp>>,
) -> bool {
    let verifier_params = params.verifier_params();
    let strategy = SingleStrategy::new(params);
    let mut transcript = Blake2bRead::<_, _, Challenge255<_>>::init(&proof[..]);

    let instance: Vec<&[Fp]> = public_inputs.iter().map(|input| &input[..]).collect();
    let instances = &[&instance[..]];

    verify_proof::<
        KZGCommitmentScheme<Bn256>,
        VerifierSHPLONK<'_, Bn256>,
        Challenge255<G1Affine>,
        Blake2bRead<&[u8], G1Affine, Challenge255<G1Affine>>,
        SingleStrategy<'_, Bn256>,
    >(verifier_params, vk, strategy, instances, &mut transcript)
    .is_ok()
}
