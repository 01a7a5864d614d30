use weighted_voting::builder::Builder;
use weighted_voting::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rules(parallelism: Parallelism) -> EvaluationRules {
    EvaluationRules {
        parallelism,
        min_ballots_per_shard: 1,
    }
}

fn all_rules() -> Vec<EvaluationRules> {
    vec![
        EvaluationRules::SEQUENTIAL_RULES,
        rules(Parallelism::MaxWorkers(2)),
        rules(Parallelism::MaxWorkers(3)),
        rules(Parallelism::Available),
        EvaluationRules::DEFAULT_RULES,
    ]
}

#[test]
fn median_example_1() {
    init();
    let votes = vec![
        MedianVote::new(4, 200),
        MedianVote::new(3, 1000),
        MedianVote::new(2, 700),
        MedianVote::new(2, 500),
    ];
    let res = evaluate_median(&votes, 0.5);
    assert_eq!(res.votes_required, 5);
    assert_eq!(res.value, 500);
}

#[test]
fn median_example_2() {
    init();
    let votes = vec![
        MedianVote::new(1, 0),
        MedianVote::new(2, 150),
        MedianVote::new(3, 200),
    ];
    let res = evaluate_median(&votes, 0.5);
    assert_eq!(res.votes_required, 3);
    assert_eq!(res.value, 150);
}

#[test]
fn median_without_ballots() {
    init();
    let res = evaluate_median(&[], 0.5);
    assert_eq!(
        res,
        MedianResult {
            value: 0,
            votes_required: 0
        }
    );
}

#[test]
fn median_required_grows_with_percent() {
    init();
    let votes = vec![
        MedianVote::new(4, 200),
        MedianVote::new(3, 1000),
        MedianVote::new(2, 700),
    ];
    let mut last = 0;
    for step in 1..100 {
        let res = evaluate_median(&votes, step as f64 / 100.0);
        assert!(res.votes_required >= last);
        last = res.votes_required;
    }
    // A two-thirds majority only agrees on the smallest value.
    assert_eq!(evaluate_median(&votes, 2.0 / 3.0).value, 200);
}

fn six_options() -> Vec<SchulzeVote> {
    vec![
        SchulzeVote::new(1, vec![0, 0, 0, 0, 0, 1]),
        SchulzeVote::new(2, vec![0, 0, 1, 3, 0, 2]),
        SchulzeVote::new(3, vec![1, 1, 0, 2, 2, 3]),
    ]
}

#[test]
fn schulze_six_options() {
    init();
    for r in all_rules() {
        let res = evaluate_schulze_with_rules(&six_options(), 6, 0.5, &r).unwrap();
        assert_eq!(res.votes_required, 3);
        assert_eq!(
            res.d.to_rows(),
            vec![
                vec![0, 0, 2, 5, 3, 6],
                vec![0, 0, 2, 5, 3, 6],
                vec![3, 3, 0, 5, 3, 6],
                vec![0, 0, 0, 0, 0, 4],
                vec![0, 0, 2, 2, 0, 6],
                vec![0, 0, 0, 2, 0, 0],
            ]
        );
        assert_eq!(
            res.p.to_rows(),
            vec![
                vec![0, 0, 0, 5, 3, 6],
                vec![0, 0, 0, 5, 3, 6],
                vec![3, 3, 0, 5, 3, 6],
                vec![0, 0, 0, 0, 0, 4],
                vec![0, 0, 0, 2, 0, 6],
                vec![0, 0, 0, 0, 0, 0],
            ]
        );
        assert_eq!(res.ranked, vec![vec![2], vec![0, 1], vec![4], vec![3], vec![5]]);
        assert_eq!(res.winners(), &[2]);
        assert_eq!(res.percentages, vec![1.0, 1.0, 1.0, 4.0 / 6.0, 1.0]);
    }
}

fn wikipedia() -> Vec<SchulzeVote> {
    vec![
        SchulzeVote::new(5, vec![0, 2, 1, 4, 3]),
        SchulzeVote::new(5, vec![0, 4, 3, 1, 2]),
        SchulzeVote::new(8, vec![3, 0, 4, 2, 1]),
        SchulzeVote::new(3, vec![1, 2, 0, 4, 3]),
        SchulzeVote::new(7, vec![1, 3, 0, 4, 2]),
        SchulzeVote::new(2, vec![2, 1, 0, 3, 4]),
        SchulzeVote::new(7, vec![4, 3, 1, 0, 2]),
        SchulzeVote::new(8, vec![2, 1, 4, 3, 0]),
    ]
}

#[test]
fn schulze_wikipedia() {
    init();
    for r in all_rules() {
        let res = evaluate_schulze_with_rules(&wikipedia(), 5, 0.5, &r).unwrap();
        assert_eq!(res.votes_required, 22);
        assert_eq!(
            res.d.to_rows(),
            vec![
                vec![0, 20, 26, 30, 22],
                vec![25, 0, 16, 33, 18],
                vec![19, 29, 0, 17, 24],
                vec![15, 12, 28, 0, 14],
                vec![23, 27, 21, 31, 0],
            ]
        );
        assert_eq!(
            res.p.to_rows(),
            vec![
                vec![0, 28, 28, 30, 24],
                vec![25, 0, 28, 33, 24],
                vec![25, 29, 0, 29, 24],
                vec![25, 28, 28, 0, 24],
                vec![25, 28, 28, 31, 0],
            ]
        );
        assert_eq!(res.ranked, vec![vec![4], vec![0], vec![2], vec![1], vec![3]]);
        assert_eq!(
            res.percentages,
            vec![22.0 / 45.0, 18.0 / 45.0, 24.0 / 45.0, 14.0 / 45.0]
        );
    }
}

#[test]
fn schulze_cycle_is_a_tie() {
    init();
    let votes = vec![
        SchulzeVote::new(1, vec![0, 1, 2]),
        SchulzeVote::new(1, vec![1, 2, 0]),
        SchulzeVote::new(1, vec![2, 0, 1]),
    ];
    let res = evaluate_schulze(&votes, 3, 0.5).unwrap();
    assert_eq!(
        res.d.to_rows(),
        vec![vec![0, 2, 1], vec![1, 0, 2], vec![2, 1, 0]]
    );
    assert_eq!(
        res.p.to_rows(),
        vec![vec![0, 2, 2], vec![2, 0, 2], vec![2, 2, 0]]
    );
    assert_eq!(res.ranked, vec![vec![0, 1, 2]]);
}

#[test]
fn schulze_without_ballots() {
    init();
    let res = evaluate_schulze(&[], 3, 0.5).unwrap();
    assert_eq!(res.votes_required, 0);
    assert_eq!(res.d, IntMatrix::new(3));
    assert_eq!(res.ranked, vec![vec![0, 1, 2]]);
    assert_eq!(res.percentages, vec![0.0, 0.0]);
}

#[test]
fn schulze_wrong_ranking_length() {
    init();
    let votes = vec![
        SchulzeVote::new(1, vec![0, 1, 2]),
        SchulzeVote::new(1, vec![0, 1]),
    ];
    assert_eq!(
        evaluate_schulze(&votes, 3, 0.5).err(),
        Some(VotingErrors::RankingLength {
            expected: 3,
            actual: 2
        })
    );
    assert!(pairwise::compute_d(&votes, 3, 1, 1).is_err());
}

#[test]
fn builder_matches_raw_rankings() {
    init();
    let names: Vec<String> = ["A", "B", "C", "D", "E"].iter().map(|s| s.to_string()).collect();
    let mut builder = Builder::new(&EvaluationRules::DEFAULT_RULES)
        .unwrap()
        .options(&names)
        .unwrap();
    for vote in wikipedia() {
        let mut order: Vec<usize> = (0..5).collect();
        order.sort_by_key(|&i| vote.ranking[i]);
        let tiers: Vec<Vec<String>> = order.iter().map(|&i| vec![names[i].clone()]).collect();
        builder.add_vote(&tiers, vote.weight).unwrap();
    }
    let res = builder.evaluate(0.5).unwrap();
    assert_eq!(res.ranked, vec![vec![4], vec![0], vec![2], vec![1], vec![3]]);
}
