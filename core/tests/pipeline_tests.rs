use simsearch_core::{rank, CorpusIndex, CorpusRecord, ResultFormatter, SearchError, Tokenizer};

fn records(descs: &[&str]) -> Vec<CorpusRecord> {
    descs
        .iter()
        .enumerate()
        .map(|(i, d)| CorpusRecord::new((i + 1).to_string(), format!("Pattern {}", i + 1), *d))
        .collect()
}

fn sample() -> Vec<CorpusRecord> {
    records(&[
        "An adversary exploits a buffer overflow to execute arbitrary code on the target.",
        "SQL injection lets an attacker alter database queries through unsanitized input.",
        "Cross site scripting injects script into pages viewed by other users.",
        "The attacker sends crafted input that overflows a fixed size stack buffer.",
        "Phishing email tricks users into revealing credentials on a fake site.",
        "",
    ])
}

fn build(recs: Vec<CorpusRecord>) -> CorpusIndex {
    CorpusIndex::build(recs, Tokenizer::default()).unwrap()
}

#[test]
fn building_twice_is_identical() {
    let a = build(sample());
    let b = build(sample());
    assert_eq!(a.vocabulary(), b.vocabulary());
    let bits = |idx: &CorpusIndex| idx.idf().iter().map(|w| w.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.documents(), b.documents());
}

#[test]
fn vectors_are_unit_or_zero() {
    let idx = build(sample());
    for (i, doc) in idx.documents().iter().enumerate() {
        if doc.is_zero() {
            assert!(idx.records()[i].description.is_empty());
        } else {
            assert!((doc.norm() - 1.0).abs() < 1e-9, "doc {i} norm {}", doc.norm());
        }
    }
    let q = idx.encode("stack buffer overflow with crafted input");
    assert!((q.norm() - 1.0).abs() < 1e-9);
}

#[test]
fn a_description_finds_itself_first() {
    let idx = build(sample());
    for (pos, rec) in idx.records().iter().enumerate() {
        if rec.description.is_empty() {
            continue;
        }
        let ranked = rank(&idx, &idx.encode(&rec.description), 0.1);
        assert_eq!(ranked[0].position, pos);
        assert!((ranked[0].score - 1.0).abs() < 1e-3);
        assert!(ranked.iter().all(|s| s.score <= ranked[0].score));
    }
}

#[test]
fn raising_the_threshold_only_removes_results() {
    let idx = build(sample());
    let q = idx.encode("attacker input buffer injection");
    let mut prev: Option<Vec<usize>> = None;
    for t in [0.0, 0.05, 0.1, 0.2, 0.4, 0.8] {
        let positions: Vec<usize> = rank(&idx, &q, t).iter().map(|s| s.position).collect();
        if let Some(looser) = &prev {
            assert!(positions.iter().all(|p| looser.contains(p)), "threshold {t}");
        }
        prev = Some(positions);
    }
}

#[test]
fn ranking_is_idempotent() {
    let idx = build(sample());
    let q = idx.encode("users site");
    assert_eq!(rank(&idx, &q, 0.1), rank(&idx, &q, 0.1));
}

#[test]
fn equal_scores_keep_corpus_order() {
    let idx = build(records(&["heap spray", "token theft", "spray heap", "heap spray heap spray"]));
    let ranked = rank(&idx, &idx.encode("heap"), 0.1);
    let positions: Vec<usize> = ranked.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![0, 2, 3]);
    assert_eq!(ranked[0].score, ranked[2].score);
}

#[test]
fn buffer_overflow_scenario() {
    let recs = vec![
        CorpusRecord::new("1", "A", "buffer overflow attack"),
        CorpusRecord::new("2", "B", "overflow in buffer"),
    ];
    let idx = build(recs);
    let ranked = rank(&idx, &idx.encode("buffer overflow"), 0.1);
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|s| s.score > 0.1));
    // B holds exactly the query terms; A adds the rarer "attack"
    assert_eq!(ranked[0].position, 1);
    assert_eq!(ranked[0].score, 1.0);
    assert_eq!(ranked[1].score, 0.709);

    let hits = ResultFormatter::default().format(idx.records(), &ranked).unwrap();
    assert_eq!(hits[0].title, "B");
    assert_eq!(hits[1].url, "https://capec.mitre.org/data/definitions/1.html");
}

#[test]
fn unknown_terms_return_nothing() {
    let idx = build(sample());
    assert!(rank(&idx, &idx.encode("kerberoasting golden ticket"), 0.1).is_empty());
    assert!(rank(&idx, &idx.encode(""), 0.1).is_empty());
}

#[test]
fn empty_corpus_cannot_be_indexed() {
    let err = CorpusIndex::build(Vec::<CorpusRecord>::new(), Tokenizer::default()).unwrap_err();
    assert!(matches!(err, SearchError::EmptyCorpus));
    assert!(err.is_corpus_error());
}
