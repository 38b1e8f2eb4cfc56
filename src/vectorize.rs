//! Query vectorization into the corpus TF-IDF coordinate space.

use crate::corpus::VocabularyIndex;

/// Lowercase and split on runs of non-word characters, dropping empties.
/// Word characters are ASCII alphanumerics and underscore, matching the
/// tokenization the embedding pipeline applies to chunk text.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Project query text into the vocabulary's vector space.
///
/// vector[i] = tf(term_i) * idf(term_i), where tf is the token's share of the
/// total token count. Out-of-vocabulary tokens still count toward the total
/// but contribute no dimension; a tokenless query maps to the zero vector.
pub fn query_vector(text: &str, vocabulary: &VocabularyIndex) -> Vec<f32> {
    let tokens = tokenize(text);
    let mut vector = vec![0.0f32; vocabulary.len()];

    if tokens.is_empty() {
        return vector;
    }

    let total = tokens.len() as f32;
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for token in &tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }

    for (token, count) in counts {
        if let Some(idx) = vocabulary.index_of(token) {
            let tf = count as f32 / total;
            vector[idx] = tf * vocabulary.idf(idx);
        }
    }

    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::VocabularyIndex;

    fn vocab(terms: &[&str], idf: &[f32]) -> VocabularyIndex {
        VocabularyIndex::new(
            terms.iter().map(|t| t.to_string()).collect(),
            idf.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn tokenize_lowercases_and_splits_on_non_word_runs() {
        assert_eq!(
            tokenize("How do I change my iPad's passcode?"),
            vec!["how", "do", "i", "change", "my", "ipad", "s", "passcode"]
        );
        assert!(tokenize("--- !!! ---").is_empty());
    }

    #[test]
    fn vector_weights_are_tf_times_idf() {
        let v = vocab(&["ipad", "passcode", "change"], &[1.0, 2.0, 4.0]);
        // 4 tokens: "change" once -> tf 0.25.
        let vec = query_vector("change my ipad passcode", &v);
        assert_eq!(vec.len(), 3);
        assert!((vec[0] - 0.25).abs() < 1e-6);
        assert!((vec[1] - 0.5).abs() < 1e-6);
        assert!((vec[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_vocabulary_tokens_are_ignored_but_count_toward_total() {
        let v = vocab(&["ipad"], &[1.0]);
        let vec = query_vector("ipad stylus", &v);
        // "stylus" is OOV: contributes no dimension, halves the tf of "ipad".
        assert!((vec[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_query_maps_to_zero_vector() {
        let v = vocab(&["ipad"], &[1.0]);
        assert_eq!(query_vector("", &v), vec![0.0]);
        assert_eq!(query_vector("?!", &v), vec![0.0]);
    }

    #[test]
    fn vectorization_is_deterministic() {
        let v = vocab(&["ipad", "passcode", "change"], &[1.0, 1.0, 1.0]);
        let a = query_vector("How do I change my iPad passcode?", &v);
        let b = query_vector("How do I change my iPad passcode?", &v);
        assert_eq!(a, b);
    }
}
