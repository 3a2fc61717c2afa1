// core/tests/training_invariants.rs
//
// Properties of trained matrices:
// - every probability lies in [0, 1]
// - transition rows sum to (unigram - sentence_final) / unigram, so exactly 1
//   for observed states that never end a sentence
// - counting shards separately and merging raw counts equals one pass
// - vocabulary ids are stable across runs

use hmmseg_core::{count_shard, finish, train, Counts, State, Vocabulary, STATE_COUNT};
use proptest::prelude::*;

fn corpus() -> impl Strategy<Value = Vec<String>> {
    let word = "[一点外语知识数理化也没有还攀什么高峰]{1,4}";
    let sentence = prop::collection::vec(word, 1..8).prop_map(|w| w.join(" "));
    prop::collection::vec(prop_oneof![9 => sentence, 1 => Just(String::new())], 1..12)
}

proptest! {
    #[test]
    fn probabilities_are_in_unit_range(lines in corpus()) {
        let (model, _) = train(&lines).expect("train");
        for row in model.transition() {
            for &p in row {
                prop_assert!((0.0..=1.0).contains(&p), "transition {}", p);
            }
        }
        for row in model.emission() {
            for &p in row {
                prop_assert!((0.0..=1.0).contains(&p), "emission {}", p);
            }
        }
    }

    #[test]
    fn transition_rows_account_for_sentence_ends(lines in corpus()) {
        let vocab = Vocabulary::build(&lines);
        let (counts, _) = count_shard(&lines, &vocab);
        let model = finish(&counts, vocab).expect("finish");
        for s in State::ALL {
            let i = s.index();
            let unigram = counts.unigram()[i];
            let sum: f64 = model.transition()[i].iter().sum();
            if unigram == 0 {
                prop_assert_eq!(sum, 0.0);
                continue;
            }
            let expected = (unigram - counts.sentence_final()[i]) as f64 / unigram as f64;
            prop_assert!((sum - expected).abs() < 1e-9, "{}: {} vs {}", s, sum, expected);
            prop_assert!(sum <= 1.0 + 1e-9);
            if counts.sentence_final()[i] == 0 {
                prop_assert!((sum - 1.0).abs() < 1e-9);
            } else {
                prop_assert!(sum < 1.0);
            }
        }
    }

    #[test]
    fn merged_shards_equal_single_pass(lines in corpus(), split in 0usize..12) {
        let split = split.min(lines.len());
        let vocab = Vocabulary::build(&lines);

        let (whole, _) = count_shard(&lines, &vocab);
        let (mut left, _) = count_shard(&lines[..split], &vocab);
        let (right, _) = count_shard(&lines[split..], &vocab);
        left.merge(&right).expect("same vocabulary");

        prop_assert_eq!(&left, &whole);
        let merged = finish(&left, vocab.clone()).expect("finish merged");
        let single = finish(&whole, vocab).expect("finish whole");
        prop_assert_eq!(merged, single);
    }
}

#[test]
fn b_and_m_never_end_a_sentence() {
    let lines = ["一点 外语 知识", "还 攀", "数理化"];
    let vocab = Vocabulary::build(lines);
    let (counts, _) = count_shard(&lines, &vocab);
    assert_eq!(counts.sentence_final()[State::B.index()], 0);
    assert_eq!(counts.sentence_final()[State::M.index()], 0);
    assert_eq!(counts.sentences(), 3);
}

#[test]
fn vocabulary_is_order_stable() {
    let lines = [
        "一点 外语 知识 、 数理化 知识 也 没有 ， 还 攀 什么 高峰",
        "今天 天气 真 好 啊",
    ];
    let first = Vocabulary::build(lines);
    let second = Vocabulary::build(lines);
    assert_eq!(first.chars(), second.chars());
    for (id, ch) in first.chars().iter().enumerate() {
        assert_eq!(second.id(*ch), Some(id as u32));
    }
}

#[test]
fn empty_corpus_trains_an_empty_model() {
    let lines: [&str; 0] = [];
    let (model, stats) = train(&lines).expect("train");
    assert_eq!(stats.sentences, 0);
    assert!(model.vocabulary().is_empty());
    assert_eq!(model.emission().len(), STATE_COUNT);
    assert!(model.transition().iter().flatten().all(|&p| p == 0.0));
}

#[test]
fn shards_with_different_vocabularies_do_not_merge() {
    let mut a = Counts::new(Vocabulary::build(["一点"]).len());
    let b = Counts::new(Vocabulary::build(["一点外语"]).len());
    assert!(a.merge(&b).is_err());
}
