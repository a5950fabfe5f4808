use std::sync::Arc;

use crate::alphabet::{RangeAlphabet, SimpleAlphabet};
use crate::dictionary::{Dictionary, InMemoryDictionary};
use crate::errors::SuggestError;
use crate::lm::{
    read_ngrams, LanguageModel, LanguageModelBuilder, SentenceRetriever, BACKOFF_ALPHA,
    UNKNOWN_WORD_SCORE,
};
use crate::mph::Mph;
use crate::spellchecker::SpellChecker;

const SAM_TXT: &str = include_str!("./resources/sam.txt");
const ONE_GM: &str = include_str!("./resources/1-gm");
const TWO_GM: &str = include_str!("./resources/2-gm");
const THREE_GM: &str = include_str!("./resources/3-gm");

fn google_model() -> (LanguageModel, Arc<InMemoryDictionary>) {
    let mut builder = LanguageModelBuilder::new(3).unwrap();
    for (k, ngrams) in [ONE_GM, TWO_GM, THREE_GM].into_iter().enumerate() {
        read_ngrams(ngrams.as_bytes(), k + 1, &mut builder).unwrap();
    }
    builder.build().unwrap()
}

fn corpus_model() -> (LanguageModel, Arc<InMemoryDictionary>) {
    let retriever = SentenceRetriever::new(
        SAM_TXT.as_bytes(),
        Box::new(RangeAlphabet::english()),
        Box::new(SimpleAlphabet::new(".!?")),
    );
    LanguageModelBuilder::from_sentences(retriever, 3)
        .unwrap()
        .build()
        .unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "actual: {actual}, expected: {expected}"
    );
}

#[test]
fn test_score_sentences() {
    let (model, _) = google_model();

    let score = model.score_sentence(&["i", "am", "sam"]).unwrap();
    assert_close(score, 0.25f64.ln());
    assert!((score - -1.3862).abs() < 1e-4);

    let score = model.score_sentence(&["sam", "i", "am"]).unwrap();
    assert_close(score, 0.5f64.ln());
    assert!((score - -0.6931).abs() < 1e-4);

    // Two windows end in unseen words; "</S>" backs off to its unigram.
    let score = model.score_sentence(&["no", "one", "word"]).unwrap();
    let expected = 2.0 * UNKNOWN_WORD_SCORE + (3.0f64 / 20.0).ln() + 2.0 * BACKOFF_ALPHA.ln();
    assert_close(score, expected);
    assert!((score - -203.73).abs() < 1e-3);
}

#[test]
fn test_score_is_sum_of_components() {
    let (model, _) = google_model();
    let words = ["i", "do", "like", "green", "ham"];
    let mut ids = vec![model.word_id("<S>").unwrap()];
    for w in words {
        ids.push(model.word_id(w).unwrap());
    }
    ids.push(model.word_id("</S>").unwrap());
    let expected: f64 = ids.windows(3).map(|w| model.score(w)).sum();
    assert_close(model.score_sentence(&words).unwrap(), expected);
    assert_eq!(model.score(&[]), UNKNOWN_WORD_SCORE);
}

#[test]
fn test_corpus_and_google_files_agree() {
    let (google, google_dict) = google_model();
    let (corpus, corpus_dict) = corpus_model();
    assert_eq!(google_dict, corpus_dict);
    for k in 0..3 {
        assert_eq!(google.vector(k), corpus.vector(k));
    }
    assert_eq!(google.vector(0).unwrap().total_count(), 20);
}

#[test]
fn test_mph_covers_vocabulary() {
    let (model, dict) = google_model();
    let mph = Mph::from_dictionary(dict.as_ref()).unwrap();
    dict.iterate(&mut |id, word| {
        assert_eq!(mph.get(word), Some(id));
        assert_eq!(model.word_id(word).unwrap(), id);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_write_read_with_vocabulary() {
    let (model, dict) = google_model();
    let mut lm = vec![];
    model.write(&mut lm).unwrap();
    let mut vocab = vec![];
    dict.write(&mut vocab).unwrap();

    let dict = Arc::new(InMemoryDictionary::from_reader(&vocab[..]).unwrap());
    let other = LanguageModel::read(&lm[..], dict).unwrap();
    assert_close(
        other.score_sentence(&["i", "am", "sam"]).unwrap(),
        0.25f64.ln(),
    );

    let short = Arc::new(InMemoryDictionary::new(["<S>", "</S>"]));
    assert!(matches!(
        LanguageModel::read(&lm[..], short),
        Err(SuggestError::InvalidFormat(_))
    ));
}

#[test]
fn test_spellchecker_next_word() {
    let (model, _) = google_model();
    let checker = SpellChecker::from_model(model, 3).unwrap();
    let predictions = checker.predict("I ", 5, 0.5).unwrap();
    let words: Vec<_> = predictions.iter().map(|(w, _)| w.as_str()).collect();
    assert_eq!(words, vec!["am", "do"]);
}

#[test]
fn test_spellchecker_completes_and_corrects() {
    let (model, _) = google_model();
    let checker = SpellChecker::from_model(model, 2).unwrap();

    let predictions = checker.predict("green eg", 3, 0.5).unwrap();
    // "<S> green eggs" was never seen; backs off to "green eggs".
    assert_eq!(predictions[0].0, "eggs");
    assert_close(predictions[0].1, BACKOFF_ALPHA.ln());

    let predictions = checker.predict("i am sm", 1, 0.3).unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].0, "sam");

    assert!(checker.predict("i", 0, 0.5).is_err());
    assert!(checker.predict("i", 1, 1.5).is_err());
}
