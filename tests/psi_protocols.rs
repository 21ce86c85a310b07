//! Cross-protocol checks: the partitioned protocol must agree with the dense one.

use num_bigint::{BigInt, BigUint};
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

use privacypsi::paillier::{self, PrivateKey, PublicKey};
use privacypsi::{PartitionedPsi, PartitionedPsiEncryptum, PsiConfig, RuanPsi};

fn vocabulary() -> Vec<String> {
    (0..60).map(|i| format!("term-{i:03}")).collect()
}

fn random_subset<'a>(vocab: &'a [String], p: f64) -> Vec<&'a str> {
    let mut rng = thread_rng();
    vocab
        .iter()
        .filter(|_| rng.gen_bool(p))
        .map(String::as_str)
        .collect()
}

fn keys() -> (PublicKey, PrivateKey) {
    paillier::key_gen_blocking(128).unwrap()
}

#[test]
fn test_partitioned_agrees_with_ruan() {
    let (public, private) = keys();
    let vocab = vocabulary();
    let ruan = RuanPsi::new(vocab.iter().cloned());

    for partitions in [1, 3, 7, 16] {
        let partitioned =
            PartitionedPsi::new(&BigUint::from(424242u32), partitions, vocab.as_slice()).unwrap();
        for _ in 0..3 {
            let ours = random_subset(&vocab, 0.5);
            let theirs = random_subset(&vocab, 0.3);
            let expected = ours.iter().filter(|t| theirs.contains(t)).count();

            let dense = ruan.prepare(&public, &theirs).unwrap();
            let dense = ruan.cardinality(&public, &ours, &dense).unwrap();

            let sparse = partitioned.encode(&public, &theirs).unwrap();
            let sparse = partitioned.cardinality(&public, &sparse, &ours).unwrap();

            assert_eq!(paillier::decrypt(&private, &dense), BigInt::from(expected));
            assert_eq!(paillier::decrypt(&private, &sparse), BigInt::from(expected));
        }
    }
}

#[test]
fn test_cardinality_all_matches_individual_queries() {
    let (public, private) = keys();
    let vocab = vocabulary();
    let mut partitioned =
        PartitionedPsi::new(&BigUint::from(7u32), 5, vocab.as_slice()).unwrap();

    let mut rng = thread_rng();
    let sets: Vec<(String, Vec<&str>)> = (0..4)
        .map(|i| {
            let mut terms: Vec<&str> = vocab.iter().map(String::as_str).collect();
            terms.shuffle(&mut rng);
            terms.truncate(10 + i * 5);
            (format!("set-{i}"), terms)
        })
        .collect();
    for (label, terms) in &sets {
        partitioned.add_set(label, terms).unwrap();
    }

    let query = random_subset(&vocab, 0.4);
    let encryptum = partitioned.encode(&public, &query).unwrap();
    let all = partitioned.cardinality_all(&public, &encryptum).unwrap();

    for (label, terms) in &sets {
        let expected = terms.iter().filter(|t| query.contains(t)).count();
        let single = partitioned.cardinality(&public, &encryptum, terms).unwrap();
        assert_eq!(paillier::decrypt(&private, &single), BigInt::from(expected));
        if let Some(c) = all.get(label) {
            assert_eq!(paillier::decrypt(&private, c), BigInt::from(expected), "{label}");
        } else {
            // label owns no slot in any queried partition
            assert_eq!(expected, 0, "{label} missing from cardinality_all");
        }
    }
}

#[test]
fn test_encryptum_survives_json_transport() {
    let (public, private) = keys();
    let cfg = PsiConfig::from_toml_str(
        r#"
partitions = 4
partition_key = "99"
vocabulary = ["apple", "banana", "cherry", "date", "elderberry", "fig"]

[[sets]]
label = "fruit-bowl"
terms = ["apple", "cherry", "fig"]
"#,
    )
    .unwrap();
    let server = cfg.build_index().unwrap();

    // the key holder only needs the shared key and vocabulary
    let client = PartitionedPsi::new(
        &cfg.partition_key().unwrap(),
        cfg.partitions,
        cfg.vocabulary.as_slice(),
    )
    .unwrap();
    let encryptum = client.encode(&public, &["apple", "fig", "date"]).unwrap();

    let wire = serde_json::to_string(&(&public, &encryptum)).unwrap();
    let (received_key, received): (PublicKey, PartitionedPsiEncryptum) =
        serde_json::from_str(&wire).unwrap();
    assert_eq!(received, encryptum);

    let res = server.cardinality_all(&received_key, &received).unwrap();
    let wire = serde_json::to_string(&res).unwrap();
    let res: std::collections::BTreeMap<String, paillier::Ciphertext> =
        serde_json::from_str(&wire).unwrap();
    assert_eq!(
        paillier::decrypt(&private, &res["fruit-bowl"]),
        BigInt::from(2)
    );
}
