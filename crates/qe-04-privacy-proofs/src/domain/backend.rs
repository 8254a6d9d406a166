//! # Proof Backends
//!
//! The proof system is a pluggable capability selected at configuration
//! time. Every backend binds its proof to [`Statement::transcript_bytes`],
//! and every prover refuses a witness that does not satisfy the statement.
//!
//! | Backend | Proof bytes | Trust model |
//! |---|---|---|
//! | `Transcript` | keyed BLAKE3 over the statement (32 bytes) | designated verifier sharing the key |
//! | `Attested` | Ed25519 signature over the statement (64 bytes) | registered prover key |

use super::{
    derive_nullifier, Commitment, ProofError, ProofResult, PublicInputs, Statement, Witness,
    ZkProof,
};
use shared_crypto::{blake3_keyed_hash, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use shared_types::Epoch;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Prove/verify capability.
pub trait ProofSystem: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce proof bytes for `statement`. Fails if `witness` does not
    /// satisfy it.
    fn prove(&self, statement: &Statement, witness: &Witness) -> ProofResult<Vec<u8>>;

    fn verify(&self, statement: &Statement, proof_bytes: &[u8]) -> bool;
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct TranscriptKey([u8; 32]);

/// Designated-verifier backend: prover and verifier share a MAC key.
pub struct TranscriptBackend {
    key: TranscriptKey,
}

impl TranscriptBackend {
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            key: TranscriptKey(key),
        }
    }

    fn tag(&self, statement: &Statement) -> [u8; 32] {
        blake3_keyed_hash(&self.key.0, &statement.transcript_bytes())
    }
}

impl ProofSystem for TranscriptBackend {
    fn name(&self) -> &'static str {
        "transcript"
    }

    fn prove(&self, statement: &Statement, witness: &Witness) -> ProofResult<Vec<u8>> {
        if !witness.satisfies(statement) {
            return Err(ProofError::WitnessMismatch);
        }
        Ok(self.tag(statement).to_vec())
    }

    fn verify(&self, statement: &Statement, proof_bytes: &[u8]) -> bool {
        proof_bytes.len() == 32 && constant_time_eq(&self.tag(statement), proof_bytes)
    }
}

/// Attestation backend: a registered prover signs statements it has checked.
pub struct AttestedBackend {
    verifying_key: Ed25519PublicKey,
    prover: Option<Ed25519KeyPair>,
}

impl AttestedBackend {
    /// Verify-only backend.
    pub fn verifier(verifying_key: Ed25519PublicKey) -> Self {
        Self {
            verifying_key,
            prover: None,
        }
    }

    /// Backend able to prove and verify.
    pub fn prover(keypair: Ed25519KeyPair) -> Self {
        Self {
            verifying_key: keypair.public_key(),
            prover: Some(keypair),
        }
    }
}

impl ProofSystem for AttestedBackend {
    fn name(&self) -> &'static str {
        "attested"
    }

    fn prove(&self, statement: &Statement, witness: &Witness) -> ProofResult<Vec<u8>> {
        let keypair = self
            .prover
            .as_ref()
            .ok_or(ProofError::ProverUnavailable("attested backend holds no signing key"))?;
        if !witness.satisfies(statement) {
            return Err(ProofError::WitnessMismatch);
        }
        Ok(keypair
            .sign(&statement.transcript_bytes())
            .as_bytes()
            .to_vec())
    }

    fn verify(&self, statement: &Statement, proof_bytes: &[u8]) -> bool {
        Ed25519Signature::from_slice(proof_bytes)
            .map(|sig| {
                self.verifying_key
                    .verify(&statement.transcript_bytes(), &sig)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

/// Backend chosen at configuration time.
pub enum ProofBackend {
    Transcript(TranscriptBackend),
    Attested(AttestedBackend),
}

impl ProofSystem for ProofBackend {
    fn name(&self) -> &'static str {
        match self {
            ProofBackend::Transcript(b) => b.name(),
            ProofBackend::Attested(b) => b.name(),
        }
    }

    fn prove(&self, statement: &Statement, witness: &Witness) -> ProofResult<Vec<u8>> {
        match self {
            ProofBackend::Transcript(b) => b.prove(statement, witness),
            ProofBackend::Attested(b) => b.prove(statement, witness),
        }
    }

    fn verify(&self, statement: &Statement, proof_bytes: &[u8]) -> bool {
        match self {
            ProofBackend::Transcript(b) => b.verify(statement, proof_bytes),
            ProofBackend::Attested(b) => b.verify(statement, proof_bytes),
        }
    }
}

/// Build a complete proof for spending the commitment opened by `witness`.
pub fn prove_transfer(
    system: &dyn ProofSystem,
    witness: &Witness,
    sender: [u8; 20],
    recipient: [u8; 20],
    epoch: Epoch,
) -> ProofResult<ZkProof> {
    let commitment = Commitment::commit(witness.amount, &witness.blinding);
    let statement = Statement {
        commitment,
        nullifier: derive_nullifier(&witness.spend_secret, &commitment),
        public_inputs: PublicInputs {
            sender,
            recipient,
            amount: witness.amount,
        },
        epoch,
    };
    let proof_bytes = system.prove(&statement, witness)?;

    Ok(ZkProof {
        nullifier: statement.nullifier,
        commitment,
        proof_bytes,
        public_inputs: statement.public_inputs,
        bound_epoch: epoch,
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
