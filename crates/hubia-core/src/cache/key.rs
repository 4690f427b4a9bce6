use sha2::{Digest, Sha256};

/// Memo key for one generation call: model, prompt scope and the question
/// exactly as sent to the model (after normalization and enrichment).
pub fn memo_key(model: &str, scope: &str, question: &str) -> String {
    let mut h = Sha256::new();
    h.update(model.as_bytes());
    h.update(b"\n");
    h.update(scope.as_bytes());
    h.update(b"\n");
    h.update(question.as_bytes());
    hex::encode(h.finalize())
}
