//! Vocabulary IRIs shared by the proof engine and the presentation layer.

/// `sec:proof`, linking a credential or presentation to its proof graph.
pub const SEC_PROOF: &str = "https://w3id.org/security#proof";
/// `sec:proofValue`, the encoded signature or derived proof.
pub const SEC_PROOF_VALUE: &str = "https://w3id.org/security#proofValue";
/// `sec:challenge`, the verifier-supplied nonce bound into a derived proof.
pub const SEC_CHALLENGE: &str = "https://w3id.org/security#challenge";
/// `sec:cryptosuite`, naming the suite that produced a proof.
pub const SEC_CRYPTOSUITE: &str = "https://w3id.org/security#cryptosuite";
/// `sec:publicKeyMultibase`, the encoded public key of a verification method.
pub const SEC_PUBLIC_KEY_MULTIBASE: &str = "https://w3id.org/security#publicKeyMultibase";
/// `sec:DataIntegrityProof` class.
pub const SEC_DATA_INTEGRITY_PROOF: &str = "https://w3id.org/security#DataIntegrityProof";

/// `cred:VerifiableCredential` class.
pub const CRED_VERIFIABLE_CREDENTIAL: &str =
    "https://www.w3.org/2018/credentials#VerifiableCredential";
/// `cred:VerifiablePresentation` class.
pub const CRED_VERIFIABLE_PRESENTATION: &str =
    "https://www.w3.org/2018/credentials#VerifiablePresentation";
/// `cred:verifiableCredential`, linking a presentation to a credential graph.
pub const CRED_VERIFIABLE_CREDENTIAL_PROP: &str =
    "https://www.w3.org/2018/credentials#verifiableCredential";

/// `dcterms:created`.
pub const DCTERMS_CREATED: &str = "http://purl.org/dc/terms/created";
